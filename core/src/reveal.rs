use std::collections::VecDeque;

use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::*;

/// Outcome of a chord on an opened cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChordOutcome {
    /// The cell does not show a number.
    NotNumbered,
    /// The adjacent flags do not add up to the number.
    Mismatch,
    /// Every covered neighbor was safe; this many cells were opened.
    Opened(CellCount),
    /// A covered neighbor held a mine; it was opened and the chord stopped there.
    Detonated(Coord2),
}

impl ChordOutcome {
    pub const fn has_update(self) -> bool {
        use ChordOutcome::*;
        match self {
            NotNumbered => false,
            Mismatch => false,
            Opened(count) => count > 0,
            Detonated(_) => true,
        }
    }
}

impl Board {
    fn is_openable(&self, coords: Coord2) -> bool {
        if !self.is_interior(coords) {
            return false;
        }
        let cell = self[coords];
        cell.glyph.is_covered() && !cell.mine
    }

    /// Opens a covered safe cell, and the whole zero region connected to it.
    ///
    /// Cells with no adjacent mines spread to their 8 neighbors; numbered cells
    /// stop the spread. Opened, flagged, mined and border cells are left alone.
    /// Returns how many cells were opened.
    pub fn open_squares(&mut self, coords: Coord2) -> CellCount {
        if !self.is_openable(coords) {
            return 0;
        }

        let mut opened = 0;
        let mut visited = HashSet::new();
        visited.insert(coords);
        let mut to_visit = VecDeque::from([coords]);

        while let Some(visit_coords) = to_visit.pop_front() {
            if !self.is_openable(visit_coords) {
                log::trace!("Skipping cell at {:?}", visit_coords);
                continue;
            }

            let count = self.count_adjacent_mines(visit_coords);
            self[visit_coords].glyph = Glyph::Open(count);
            opened += 1;
            log::trace!("Opened cell at {:?}, mine count: {}", visit_coords, count);

            if count == 0 {
                for pos in self.iter_neighbors(visit_coords) {
                    if self.is_openable(pos) && visited.insert(pos) {
                        to_visit.push_back(pos);
                    }
                }
            }
        }

        log::debug!("Opened {} cells from {:?}", opened, coords);
        opened
    }

    /// Opens the covered neighbors of a numbered cell once enough flags surround it.
    pub fn chord(&mut self, coords: Coord2) -> ChordOutcome {
        let Some(number) = self[coords].glyph.number() else {
            return ChordOutcome::NotNumbered;
        };

        let flags = self.count_adjacent_flags(coords);
        if flags != number {
            log::debug!("Chord at {:?} rejected, {} flags for {}", coords, flags, number);
            return ChordOutcome::Mismatch;
        }

        let covered: SmallVec<[Coord2; 8]> = self
            .iter_neighbors(coords)
            .filter(|&pos| self.is_interior(pos) && self[pos].glyph.is_covered())
            .collect();

        let mut opened = 0;
        for pos in covered {
            // an earlier neighbor's flood may already have opened it
            if !self[pos].glyph.is_covered() {
                continue;
            }
            if self[pos].mine {
                self[pos].glyph = Glyph::Detonated;
                log::debug!("Chord at {:?} detonated mine at {:?}", coords, pos);
                return ChordOutcome::Detonated(pos);
            }
            opened += self.open_squares(pos);
        }
        ChordOutcome::Opened(opened)
    }
}
