//! Error type shared by the engine, the level model and the progress store.

use thiserror::Error;

use crate::level::LevelId;

/// Errors reported by the puzzle engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A zone turned a piece that had no `begin_rotation` snapshot.
    #[error("piece {piece} rotated without begin_rotation")]
    RotationNotStarted { piece: usize },

    /// The level registry has no level with this id.
    #[error("level {0} not found")]
    UnknownLevel(LevelId),

    /// An operation needs a loaded level.
    #[error("no level loaded")]
    NoLevelLoaded,

    /// Pointer input arrived before `initialize_interaction`.
    #[error("interaction not initialized")]
    InteractionNotInitialized,

    /// A circle violates `steps >= 1` or `0 <= inner < outer`.
    #[error("degenerate circle: {0}")]
    DegenerateCircle(String),

    /// A viewport with a non-positive or non-finite size or scale.
    #[error("invalid viewport: {0}")]
    InvalidViewport(String),

    /// A level description is inconsistent.
    #[error("invalid level: {0}")]
    InvalidLevel(String),

    /// A programmatic turn named a circle the level does not have.
    #[error("circle {0} does not exist")]
    UnknownCircle(usize),

    #[error("progress store I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("progress store format: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
