use serde::{Deserialize, Serialize};

/// Bit of a packed cell byte that marks a mine.
pub const MINE_BIT: u8 = 0x80;

/// Bits of a packed cell byte that hold the display character.
pub const GLYPH_MASK: u8 = 0x7F;

/// What the player sees on a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Glyph {
    /// Not opened yet.
    Covered,
    /// Covered and marked by the player.
    Flagged,
    /// Opened, showing the number of adjacent mines.
    Open(u8),
    /// A mine that was opened.
    Detonated,
}

impl Glyph {
    pub const fn is_covered(self) -> bool {
        matches!(self, Self::Covered)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }

    /// The adjacency number shown on the cell, if it shows one.
    pub const fn number(self) -> Option<u8> {
        match self {
            Self::Open(count) if count > 0 => Some(count),
            _ => None,
        }
    }

    /// Display character of the glyph as stored in the low bits of a packed cell.
    pub const fn to_ascii(self) -> u8 {
        match self {
            Self::Covered => b'+',
            Self::Flagged => b'P',
            Self::Open(0) => b'#',
            Self::Open(count) => b'0' + count,
            Self::Detonated => b'#',
        }
    }
}

impl Default for Glyph {
    fn default() -> Self {
        Self::Covered
    }
}

/// One grid position: the glyph the player sees plus whether a mine hides under it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub glyph: Glyph,
    pub mine: bool,
}

impl Cell {
    pub const COVERED: Cell = Cell {
        glyph: Glyph::Covered,
        mine: false,
    };

    pub const fn new(glyph: Glyph, mine: bool) -> Self {
        Self { glyph, mine }
    }

    pub const fn pack(self) -> u8 {
        pack_cell(self.glyph, self.mine)
    }

    pub const fn unpack(byte: u8) -> Option<Self> {
        match glyph_of(byte) {
            Some(glyph) => Some(Self::new(glyph, is_mine_of(byte))),
            None => None,
        }
    }
}

/// Combines a glyph and a mine flag into the single byte used on disk.
pub const fn pack_cell(glyph: Glyph, is_mine: bool) -> u8 {
    let mine_bit = if is_mine { MINE_BIT } else { 0 };
    (glyph.to_ascii() & GLYPH_MASK) | mine_bit
}

/// Decodes the glyph of a packed cell; `'#'` is an opened blank unless the mine bit is set.
///
/// Opened numbers never sit on a mine, so a digit with the mine bit is rejected.
pub const fn glyph_of(byte: u8) -> Option<Glyph> {
    let mine = is_mine_of(byte);
    match byte & GLYPH_MASK {
        b'+' => Some(Glyph::Covered),
        b'P' => Some(Glyph::Flagged),
        b'#' if mine => Some(Glyph::Detonated),
        b'#' => Some(Glyph::Open(0)),
        b'0' if !mine => Some(Glyph::Open(0)),
        digit @ b'1'..=b'8' if !mine => Some(Glyph::Open(digit - b'0')),
        _ => None,
    }
}

pub const fn is_mine_of(byte: u8) -> bool {
    byte & MINE_BIT != 0
}
