//! Seams to the rendering layer: coordinate mapping and pose refresh.

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::pieces::Pose;

/// Screen rectangle that hosts the puzzle, plus its scale.
///
/// The puzzle origin sits at the center of the rectangle. `scale` is puzzle
/// units per screen pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl Viewport {
    pub const fn new(left: f64, top: f64, width: f64, height: f64, scale: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            scale,
        }
    }

    /// A viewport whose screen coordinates equal puzzle coordinates over a
    /// square of half-size `extent`.
    pub const fn centered(extent: f64) -> Self {
        Self::new(-extent, -extent, 2.0 * extent, 2.0 * extent, 1.0)
    }

    /// Checks that the size and scale are finite and positive and the
    /// corner is finite.
    pub fn validate(&self) -> Result<()> {
        let positive = [("width", self.width), ("height", self.height), ("scale", self.scale)];
        if let Some((name, value)) = positive
            .iter()
            .find(|(_, value)| !(value.is_finite() && *value > 0.0))
        {
            return Err(Error::InvalidViewport(format!("{name} is {value}")));
        }
        if !(self.left.is_finite() && self.top.is_finite()) {
            return Err(Error::InvalidViewport(format!(
                "corner ({}, {}) is not finite",
                self.left, self.top
            )));
        }
        Ok(())
    }

    fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Maps a screen point into puzzle space, or `None` off the surface.
    pub fn to_local(&self, screen: Point) -> Option<Point> {
        let inside = (self.left..=self.left + self.width).contains(&screen.x)
            && (self.top..=self.top + self.height).contains(&screen.y);
        if !inside {
            return None;
        }
        let center = self.center();
        Some(Point::new(
            (screen.x - center.x) * self.scale,
            (screen.y - center.y) * self.scale,
        ))
    }

    /// Maps a puzzle point back to the screen.
    pub fn to_screen(&self, local: Point) -> Point {
        let center = self.center();
        Point::new(
            center.x + local.x / self.scale,
            center.y + local.y / self.scale,
        )
    }
}

/// Receives the engine's output: pose changes and status text.
pub trait View {
    /// Piece `index` now rests at `pose`; redraw it.
    fn refresh_piece(&mut self, index: usize, pose: Pose);

    /// Human readable status: `""`, `"Inspect Mode"`, `"Congratulations!"`, ...
    fn show_message(&mut self, text: &str);

    /// Drops any directional hints shown for the previous gesture.
    fn clear_hints(&mut self) {}
}

/// A view that draws nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullView;

impl View for NullView {
    fn refresh_piece(&mut self, _index: usize, _pose: Pose) {}

    fn show_message(&mut self, _text: &str) {}
}
