use crate::*;
pub use random::*;

mod random;

/// How many full re-placements the first-click loop tries before giving up a mine.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 100;

/// Result of placing mines around the first opened cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// The cell is mine-free and has no adjacent mines.
    Safe { attempts: u32 },
    /// No zero cell was found; one mine was dropped and the cell was cleared.
    Degraded { attempts: u32 },
}

impl Placement {
    pub const fn attempts(self) -> u32 {
        match self {
            Self::Safe { attempts } | Self::Degraded { attempts } => attempts,
        }
    }

    pub const fn is_degraded(self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

pub trait MinePlacer {
    /// Clears every mine, then places exactly `board.mine_count()` mines on distinct interior cells.
    fn place_mines(&mut self, board: &mut Board);

    /// Moves the mine at `from` onto some other mine-free interior cell.
    fn relocate_mine(&mut self, board: &mut Board, from: Coord2);

    /// Re-places the whole layout until `safe` is mine-free with no adjacent mines.
    ///
    /// Some boards are too dense for that to be possible, so after
    /// [`MAX_PLACEMENT_ATTEMPTS`] re-placements one mine is dropped, the layout is
    /// placed once more, and the mine under `safe` (if any) is moved elsewhere.
    /// Moving it instead of clearing it keeps the placed count at `mine_count`.
    ///
    /// A board whose layout is incomplete gets a full placement first, which
    /// does not count as an attempt.
    fn place_mines_avoiding(&mut self, board: &mut Board, safe: Coord2) -> Placement {
        if board.placed_mines() != board.mine_count() {
            self.place_mines(board);
        }

        let mut attempts = 0;
        while board[safe].mine || board.count_adjacent_mines(safe) > 0 {
            self.place_mines(board);
            attempts += 1;
            if attempts > MAX_PLACEMENT_ATTEMPTS {
                let mine_count = board.mine_count().saturating_sub(1);
                log::warn!(
                    "No zero cell at {:?} after {} attempts, dropping to {} mines",
                    safe,
                    attempts,
                    mine_count
                );
                board.set_mine_count(mine_count);
                self.place_mines(board);
                if board[safe].mine {
                    self.relocate_mine(board, safe);
                }
                return Placement::Degraded { attempts };
            }
        }
        log::debug!("First cell {:?} made safe after {} attempts", safe, attempts);
        Placement::Safe { attempts }
    }
}
