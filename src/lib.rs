//! Circle Puzzle Engine Library
//!
//! Provides the core of circular twisty puzzles: pieces resting on
//! overlapping rotation circles, turned by dragging a piece around the circle
//! it sits on.

pub mod catalog;
pub mod circle;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod level;
pub mod persistence;
pub mod pieces;
pub mod scramble;
pub mod session;
pub mod surface;

pub use catalog::{Catalog, LevelRegistry};
pub use circle::Circle;
pub use error::{Error, Result};
pub use geometry::Point;
pub use level::{Level, LevelId};
pub use pieces::{Piece, Pose};
pub use session::{Mode, Session};
pub use surface::{View, Viewport};
