//! Board engine for a terminal minesweeper.
//!
//! The engine owns the bordered cell grid, places mines with a first-click
//! safety guarantee, flood-fills zero regions, resolves chords, and persists a
//! session to a flat binary save file. It renders nothing; drivers query
//! [`Board`] and [`Session`] and draw what they like.

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use error::*;
pub use generator::*;
pub use reveal::*;
pub use savegame::*;
pub use session::*;
pub use types::*;

mod board;
mod cell;
mod error;
mod generator;
mod reveal;
mod savegame;
mod session;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Builds a config, clamping dimensions and mine count into playable ranges.
    pub fn new((size_x, size_y): Coord2, mines: CellCount) -> Self {
        let size_x = size_x.clamp(1, MAX_DIMENSION);
        let size_y = size_y.clamp(1, MAX_DIMENSION);
        let mines = mines.clamp(1, mult(size_x, size_y));
        Self::new_unchecked((size_x, size_y), mines)
    }

    /// Builds a config, rejecting values [`GameConfig::new`] would clamp.
    pub fn try_new(size: Coord2, mines: CellCount) -> Result<Self> {
        let (size_x, size_y) = size;
        if !(1..=MAX_DIMENSION).contains(&size_x) || !(1..=MAX_DIMENSION).contains(&size_y) {
            return Err(GameError::InvalidDimensions);
        }
        if mines == 0 || mines > mult(size_x, size_y) {
            return Err(GameError::TooManyMines);
        }
        Ok(Self::new_unchecked(size, mines))
    }

    pub const fn beginner() -> Self {
        Self::new_unchecked((9, 9), 10)
    }

    pub const fn intermediate() -> Self {
        Self::new_unchecked((16, 16), 40)
    }

    pub const fn expert() -> Self {
        Self::new_unchecked((30, 16), 99)
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::beginner()
    }
}
