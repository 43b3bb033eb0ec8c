//! Rotation zones.

use crate::error::{Error, Result};
use crate::geometry::{distance, Point};

/// A disk or annulus whose contents turn together.
///
/// `steps` is the symmetry order: rotations on this circle snap to multiples
/// of `360 / steps` degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    center: Point,
    outer_radius: f64,
    inner_radius: f64,
    steps: u32,
}

impl Circle {
    /// Creates a disk of `radius` around `center`.
    pub fn new(center: Point, radius: f64, steps: u32) -> Result<Self> {
        Self::annulus(center, 0.0, radius, steps)
    }

    /// Creates an annulus between `inner_radius` and `outer_radius`.
    pub fn annulus(center: Point, inner_radius: f64, outer_radius: f64, steps: u32) -> Result<Self> {
        if steps == 0 {
            return Err(Error::DegenerateCircle("steps must be at least 1".into()));
        }
        if !center.x.is_finite() || !center.y.is_finite() {
            return Err(Error::DegenerateCircle(format!("non-finite center {center:?}")));
        }
        if !inner_radius.is_finite() || !outer_radius.is_finite() {
            return Err(Error::DegenerateCircle("radii must be finite".into()));
        }
        if inner_radius < 0.0 {
            return Err(Error::DegenerateCircle(format!(
                "negative inner radius {inner_radius}"
            )));
        }
        if inner_radius >= outer_radius {
            return Err(Error::DegenerateCircle(format!(
                "inner radius {inner_radius} not below outer radius {outer_radius}"
            )));
        }
        Ok(Self {
            center,
            outer_radius,
            inner_radius,
            steps,
        })
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Smallest legal rotation on this circle, in degrees.
    pub fn step_angle(&self) -> f64 {
        360.0 / self.steps as f64
    }

    /// Closed-interval membership test on the distance from the center.
    #[inline]
    pub fn contains_point(&self, point: Point) -> bool {
        let d = distance(point, self.center);
        self.inner_radius <= d && d <= self.outer_radius
    }
}
