use std::path::PathBuf;

use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Could not allocate a grid of {cells} cells")]
    Allocation { cells: usize },
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board dimensions out of range")]
    InvalidDimensions,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Why a save buffer was rejected by the decoder.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SaveDefect {
    #[error("buffer shorter than the header")]
    Truncated,
    #[error("buffer length does not match the declared board size")]
    LengthMismatch,
    #[error("declared size is not width * height")]
    SizeMismatch,
    #[error("width and height must be positive and in range")]
    InvalidDimension,
    #[error("mine count must be positive")]
    NonPositiveMineCount,
    #[error("more mines than cells")]
    TooManyMines,
    #[error("unrecognized cell byte {0:#04x}")]
    InvalidCell(u8),
    #[error("expected {expected} mines, found {found}")]
    MineCountMismatch { expected: CellCount, found: CellCount },
    #[error("expected {declared} flags, found {found}")]
    FlagCountMismatch { declared: i32, found: CellCount },
    #[error("unknown game flag bits {0:#x}")]
    UnknownFlags(u32),
    #[error("cursor outside the board")]
    CursorOutOfRange,
    #[error("elapsed time is not a valid duration")]
    InvalidDuration,
}

/// Errors raised while persisting or restoring a session.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("corrupt save data: {0}")]
    Corrupt(#[from] SaveDefect),

    #[error("no save file at {0}")]
    NotFound(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Game(#[from] GameError),
}

pub type SaveResult<T> = core::result::Result<T, SaveError>;

impl SaveError {
    /// A missing save file is ordinary control flow for the driver, not a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
