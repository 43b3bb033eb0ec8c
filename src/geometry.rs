//! 2D rotation and angle utilities.
//!
//! All angles are in degrees. Puzzle space uses screen orientation (y grows
//! downwards), so a positive angle turns clockwise on screen. Every caller uses
//! the same sign convention, which is all the engine relies on.

use serde::{Deserialize, Serialize};

/// A point in puzzle space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from `center` in direction `degrees`.
    pub fn polar(center: Point, radius: f64, degrees: f64) -> Self {
        Self::new(center.x + radius * cosd(degrees), center.y + radius * sind(degrees))
    }
}

#[inline]
pub fn cosd(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

#[inline]
pub fn sind(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

/// Rotates `point` about `center` by `degrees`.
pub fn rotate_point(center: Point, point: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

/// Raw angle from ray `vertex -> p2` to ray `vertex -> p1`, in (-360, 360).
///
/// Use [`signed_angle`] or [`bearing`] to bring it into a canonical range.
pub fn angle_between(p1: Point, vertex: Point, p2: Point) -> f64 {
    let first = (p1.y - vertex.y).atan2(p1.x - vertex.x);
    let second = (p2.y - vertex.y).atan2(p2.x - vertex.x);
    (first - second).to_degrees()
}

/// Normalizes an angle to the shortest-path range (-180, 180].
pub fn signed_angle(degrees: f64) -> f64 {
    let wrapped = 180.0 - (180.0 - degrees).rem_euclid(360.0);
    // rem_euclid can land exactly on 360 for tiny negative inputs
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Normalizes an angle to a positive bearing in [0, 360).
pub fn bearing(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(p1: Point, p2: Point) -> f64 {
    (p2.x - p1.x).hypot(p2.y - p1.y)
}

/// Rounds `degrees` to the nearest multiple of `step`.
pub fn snap_angle(degrees: f64, step: f64) -> f64 {
    (degrees / step).round() * step
}
