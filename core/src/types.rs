/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u16;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u32;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

/// Largest interior width or height; leaves room for the border on both sides.
pub const MAX_DIMENSION: Coord = Coord::MAX - 2;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Walks the 3x3 window around a cell in row-major order, skipping the cell
/// itself and anything outside a grid of `bounds`.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    min_x: Coord,
    max_x: Coord,
    max_y: Coord,
    next: Option<Coord2>,
}

impl NeighborIter {
    pub(crate) fn new(center: Coord2, bounds: Coord2) -> Self {
        let (x, y) = center;
        let (width, height) = bounds;
        let min_x = x.saturating_sub(1);
        let min_y = y.saturating_sub(1);
        let max_x = x.saturating_add(1).min(width.saturating_sub(1));
        let max_y = y.saturating_add(1).min(height.saturating_sub(1));

        let empty = width == 0 || height == 0 || min_x > max_x || min_y > max_y;
        Self {
            center,
            min_x,
            max_x,
            max_y,
            next: (!empty).then_some((min_x, min_y)),
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let pos @ (x, y) = self.next?;
            self.next = if x < self.max_x {
                Some((x + 1, y))
            } else if y < self.max_y {
                Some((self.min_x, y + 1))
            } else {
                None
            };

            if pos != self.center {
                return Some(pos);
            }
        }
    }
}
