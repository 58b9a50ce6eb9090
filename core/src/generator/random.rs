use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;

/// Uniformly random placement driven by a seeded small RNG.
#[derive(Clone, Debug)]
pub struct RandomMinePlacer {
    rng: SmallRng,
}

impl RandomMinePlacer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn random_interior(&mut self, (width, height): Coord2) -> Coord2 {
        use rand::prelude::*;

        (
            self.rng.random_range(1..=width),
            self.rng.random_range(1..=height),
        )
    }
}

impl MinePlacer for RandomMinePlacer {
    fn place_mines(&mut self, board: &mut Board) {
        board.clear_mines();

        let total_cells = board.total_cells();
        let mut target = board.mine_count();
        if target > total_cells {
            log::warn!(
                "Board already full, requested {} mines but only fits {}",
                target,
                total_cells
            );
            target = total_cells;
        }

        // duplicates are simply drawn again
        let mut placed = 0;
        while placed < target {
            let pos = self.random_interior(board.size());
            if !board[pos].mine {
                board[pos].mine = true;
                placed += 1;
            }
        }
        log::trace!("Placed {} mines", placed);
    }

    fn relocate_mine(&mut self, board: &mut Board, from: Coord2) {
        if board.placed_mines() >= board.total_cells() {
            log::warn!("No free cell to move the mine at {:?} to", from);
            return;
        }

        loop {
            let pos = self.random_interior(board.size());
            if pos != from && !board[pos].mine {
                board[from].mine = false;
                board[pos].mine = true;
                log::debug!("Moved mine from {:?} to {:?}", from, pos);
                return;
            }
        }
    }
}
