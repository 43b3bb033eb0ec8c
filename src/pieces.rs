//! Puzzle piece definitions and poses.
//!
//! A piece is a rigid body: it has a live pose that gestures mutate and a
//! solved pose fixed at construction. Pieces differ only by their renderable
//! shape and their win group, so there is a single concrete type.

use serde::{Deserialize, Serialize};

use crate::geometry::{rotate_point, Point};

/// Position plus rotation in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub a: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, a: f64) -> Self {
        Self { x, y, a }
    }

    pub fn at(position: Point, a: f64) -> Self {
        Self::new(position.x, position.y, a)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Compares position and angle within `tolerance`.
    ///
    /// Angles are compared modulo 360.
    pub fn approx_eq(&self, other: &Pose, tolerance: f64) -> bool {
        let angle_diff = (self.a - other.a).rem_euclid(360.0);
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && angle_diff.min(360.0 - angle_diff) <= tolerance
    }
}

/// Display color of a piece. The renderer decides what each tint looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tint {
    Red,
    Green,
    Yellow,
    Cyan,
    Blue,
    Orange,
    Purple,
    White,
}

/// Opaque handle the renderer uses to map a hit target back to a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeHandle(pub u32);

/// What a piece looks like. The engine never interprets it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shape {
    /// Artwork identifier, e.g. `"shield-4"`.
    pub name: &'static str,
    pub tint: Tint,
}

impl Shape {
    pub const fn new(name: &'static str, tint: Tint) -> Self {
        Self { name, tint }
    }
}

/// A rigid puzzle element.
#[derive(Clone, Debug)]
pub struct Piece {
    pub shape: Shape,
    pub handle: ShapeHandle,
    /// Win group; selects which branch of the level's win rule applies.
    pub group: u32,
    pose: Pose,
    solved_pose: Pose,
    restore_pose: Option<Pose>,
    drag_start: Option<Pose>,
}

impl Piece {
    /// Creates a piece resting at its solved pose.
    pub fn new(shape: Shape, handle: ShapeHandle, solved_pose: Pose, group: u32) -> Self {
        Self {
            shape,
            handle,
            group,
            pose: solved_pose,
            solved_pose,
            restore_pose: None,
            drag_start: None,
        }
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.pose.position()
    }

    pub fn solved_pose(&self) -> Pose {
        self.solved_pose
    }

    pub fn restore_pose(&self) -> Option<Pose> {
        self.restore_pose
    }

    pub(crate) fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Snapshots the live pose as the reference for the next `rotate` calls.
    pub fn begin_rotation(&mut self) {
        self.drag_start = Some(self.pose);
    }

    /// Sets the pose to the drag snapshot turned about `pivot` by `delta` degrees.
    ///
    /// Always computed from the snapshot, so repeated calls within one drag do
    /// not accumulate error. Returns the new pose, or `None` when no snapshot
    /// was taken.
    pub fn rotate(&mut self, pivot: Point, delta: f64) -> Option<Pose> {
        let start = self.drag_start?;
        let position = rotate_point(pivot, start.position(), delta);
        self.pose = Pose::at(position, start.a + delta);
        Some(self.pose)
    }

    pub fn reset_to_solved(&mut self) {
        self.pose = self.solved_pose;
    }

    /// Captures the live pose so `reset_to_restore` can bring it back.
    pub fn save_restore(&mut self) {
        self.restore_pose = Some(self.pose);
    }

    /// Returns to the saved pose. A piece with nothing saved keeps its pose.
    pub fn reset_to_restore(&mut self) {
        if let Some(restore) = self.restore_pose {
            self.pose = restore;
        }
    }
}
