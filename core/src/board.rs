use core::ops::{Index, IndexMut};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// The cell grid of one game, surrounded by a one-cell border of covered, mine-free cells.
///
/// Interior coordinates run over `1..=width` and `1..=height`. The border keeps
/// the 8-neighbor lookups of every interior cell inside the allocation, and it is
/// never mined, opened, or counted by the win check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    grid: Array2<Cell>,
    size: Coord2,
    mine_count: CellCount,
}

impl Board {
    /// Allocates a covered board for `config`. Mines are not placed yet.
    pub fn new(config: GameConfig) -> Result<Self> {
        let GameConfig { size, mines } = GameConfig::try_new(config.size, config.mines)?;
        let dim = (usize::from(size.0) + 2, usize::from(size.1) + 2);
        let cells = dim.0 * dim.1;

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(cells)
            .map_err(|_| GameError::Allocation { cells })?;
        storage.resize(cells, Cell::COVERED);
        let grid =
            Array2::from_shape_vec(dim, storage).map_err(|_| GameError::InvalidDimensions)?;

        log::debug!("allocated {}x{} board with {} mines", size.0, size.1, mines);
        Ok(Self {
            grid,
            size,
            mine_count: mines,
        })
    }

    pub fn config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size, self.mine_count)
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn width(&self) -> Coord {
        self.size.0
    }

    pub fn height(&self) -> Coord {
        self.size.1
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub(crate) fn set_mine_count(&mut self, mine_count: CellCount) {
        self.mine_count = mine_count;
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub fn get(&self, coords: Coord2) -> Cell {
        self[coords]
    }

    pub fn set(&mut self, coords: Coord2, cell: Cell) {
        self[coords] = cell;
    }

    pub fn is_interior(&self, (x, y): Coord2) -> bool {
        (1..=self.size.0).contains(&x) && (1..=self.size.1).contains(&y)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.is_interior(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// Interior coordinates in row-major order, the order cells are saved in.
    pub fn iter_interior(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (width, height) = self.size;
        (1..=height).flat_map(move |y| (1..=width).map(move |x| (x, y)))
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, (self.size.0 + 2, self.size.1 + 2))
    }

    pub fn count_adjacent_mines(&self, coords: Coord2) -> u8 {
        self.count_neighbors(coords, |cell| cell.mine)
    }

    pub fn count_adjacent_flags(&self, coords: Coord2) -> u8 {
        self.count_neighbors(coords, |cell| cell.glyph.is_flagged())
    }

    fn count_neighbors(&self, coords: Coord2, pred: impl Fn(Cell) -> bool) -> u8 {
        let mut count = 0;
        for pos in self.iter_neighbors(coords) {
            if pred(self[pos]) {
                count += 1;
            }
        }
        count
    }

    /// Win condition: no safe interior cell is still covered.
    pub fn all_clear(&self) -> bool {
        self.iter_interior().all(|pos| {
            let cell = self[pos];
            cell.mine || !cell.glyph.is_covered()
        })
    }

    /// Whether a mine has been opened, i.e. the game on this board is lost.
    pub fn has_detonated(&self) -> bool {
        self.iter_interior()
            .any(|pos| self[pos].glyph == Glyph::Detonated)
    }

    /// Number of interior cells carrying a mine.
    pub fn placed_mines(&self) -> CellCount {
        self.count_interior(|cell| cell.mine)
    }

    /// Number of interior cells showing a flag.
    pub fn flag_count(&self) -> CellCount {
        self.count_interior(|cell| cell.glyph.is_flagged())
    }

    /// Number of interior cells not yet opened or flagged.
    pub fn covered_count(&self) -> CellCount {
        self.count_interior(|cell| cell.glyph.is_covered())
    }

    fn count_interior(&self, pred: impl Fn(Cell) -> bool) -> CellCount {
        let mut count = 0;
        for pos in self.iter_interior() {
            if pred(self[pos]) {
                count += 1;
            }
        }
        count
    }

    pub(crate) fn clear_mines(&mut self) {
        for cell in self.grid.iter_mut() {
            cell.mine = false;
        }
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.grid[coords.to_nd_index()]
    }
}

impl IndexMut<Coord2> for Board {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.grid[coords.to_nd_index()]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a board with mines at `mines`, all cells covered.
    pub(crate) fn board_with_mines(size: Coord2, mines: &[Coord2]) -> Board {
        let config = GameConfig::try_new(size, mines.len() as CellCount).unwrap();
        let mut board = Board::new(config).unwrap();
        for &pos in mines {
            board[pos].mine = true;
        }
        board
    }

    #[test]
    fn new_board_is_covered_with_border() {
        let board = Board::new(GameConfig::beginner()).unwrap();

        assert_eq!(board.size(), (9, 9));
        assert_eq!(board.mine_count(), 10);
        assert_eq!(board.placed_mines(), 0);
        assert_eq!(board.covered_count(), 81);
        for x in 0..=10 {
            assert_eq!(board[(x, 0)], Cell::COVERED);
            assert_eq!(board[(x, 10)], Cell::COVERED);
        }
        assert!(!board.is_interior((0, 5)));
        assert!(!board.is_interior((10, 5)));
        assert!(board.is_interior((9, 9)));
    }

    #[test]
    fn new_rejects_impossible_configs() {
        let err = Board::new(GameConfig::new_unchecked((3, 3), 10)).unwrap_err();
        assert_eq!(err, GameError::TooManyMines);

        let err = Board::new(GameConfig::new_unchecked((0, 3), 1)).unwrap_err();
        assert_eq!(err, GameError::InvalidDimensions);
    }

    #[test]
    fn iter_interior_is_row_major() {
        let board = Board::new(GameConfig::new((3, 2), 1)).unwrap();
        let coords: Vec<_> = board.iter_interior().collect();
        assert_eq!(coords, vec![(1, 1), (2, 1), (3, 1), (1, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn corner_neighbors_stay_in_grid() {
        let board = Board::new(GameConfig::new((1, 1), 1)).unwrap();
        assert_eq!(board.iter_neighbors((1, 1)).count(), 8);
        assert_eq!(board.count_adjacent_mines((1, 1)), 0);
    }

    #[test]
    fn counts_adjacent_mines_and_flags() {
        let mut board = board_with_mines((3, 3), &[(1, 1), (3, 1), (2, 3)]);
        board[(1, 2)].glyph = Glyph::Flagged;

        assert_eq!(board.count_adjacent_mines((2, 2)), 3);
        assert_eq!(board.count_adjacent_mines((1, 3)), 1);
        assert_eq!(board.count_adjacent_flags((2, 2)), 1);
        assert_eq!(board.flag_count(), 1);
    }

    #[test]
    fn all_clear_ignores_mines_and_accepts_flags() {
        let mut board = board_with_mines((2, 1), &[(1, 1)]);
        assert!(!board.all_clear());

        board[(2, 1)].glyph = Glyph::Open(1);
        assert!(board.all_clear());

        board[(2, 1)].glyph = Glyph::Flagged;
        assert!(board.all_clear());
    }

    #[test]
    fn get_and_set_address_interior_cells() {
        let mut board = Board::new(GameConfig::new((4, 3), 1)).unwrap();
        let cell = Cell::new(Glyph::Open(2), false);

        board.set((4, 3), cell);

        assert_eq!(board.get((4, 3)), cell);
        assert_eq!(board[(4, 3)], cell);
        assert_eq!(board.get((3, 3)), Cell::COVERED);
        assert_eq!(board.get((5, 4)), Cell::COVERED);
    }

    #[test]
    fn detonation_is_detected() {
        let mut board = board_with_mines((3, 3), &[(2, 2)]);
        assert!(!board.has_detonated());

        board.set((2, 2), Cell::new(Glyph::Detonated, true));
        assert!(board.has_detonated());
    }

    #[test]
    fn clear_mines_resets_every_mine() {
        let mut board = board_with_mines((3, 3), &[(1, 1), (2, 2)]);
        board.clear_mines();
        assert_eq!(board.placed_mines(), 0);
    }
}
