//! Flat binary save format.
//!
//! All integers are little-endian with no padding:
//!
//! | offset | type  | field                                   |
//! |--------|-------|-----------------------------------------|
//! | 0      | i64   | size, `width * height`                  |
//! | 8      | i32   | width                                   |
//! | 12     | i32   | height                                  |
//! | 16     | i32   | mine count                              |
//! | 20     | i32   | flags placed                            |
//! | 24     | u32   | [`GameBools`]                           |
//! | 28     | i32   | cursor y                                |
//! | 32     | i32   | cursor x                                |
//! | 36     | i64   | elapsed seconds                         |
//! | 44     | i64   | elapsed nanoseconds                     |
//! | 52     | bytes | `size` packed cells, interior, row-major |

use core::time::Duration;
use std::io::ErrorKind;
use std::path::Path;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::*;

pub const HEADER_LEN: usize = 52;

const NANOS_PER_SEC: i64 = 1_000_000_000;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct GameBools: u32 {
        const FLAG_MODE   = 1;
        const FIRST_CLICK = 1 << 1;
    }
}

impl GameBools {
    fn of(meta: &SessionMeta) -> Self {
        let mut bools = Self::empty();
        bools.set(Self::FLAG_MODE, meta.flag_mode);
        bools.set(Self::FIRST_CLICK, meta.first_click);
        bools
    }
}

fn saturating_i32(value: impl TryInto<i32>) -> i32 {
    value.try_into().unwrap_or(i32::MAX)
}

/// Serializes a board and its session metadata.
pub fn encode(board: &Board, meta: &SessionMeta) -> Vec<u8> {
    let (width, height) = board.size();
    let size = board.total_cells();
    let mut out = Vec::with_capacity(HEADER_LEN + size as usize);

    out.extend_from_slice(&i64::from(size).to_le_bytes());
    out.extend_from_slice(&i32::from(width).to_le_bytes());
    out.extend_from_slice(&i32::from(height).to_le_bytes());
    out.extend_from_slice(&saturating_i32(board.mine_count()).to_le_bytes());
    out.extend_from_slice(&saturating_i32(meta.flags_placed).to_le_bytes());
    out.extend_from_slice(&GameBools::of(meta).bits().to_le_bytes());
    out.extend_from_slice(&i32::from(meta.cursor.1).to_le_bytes());
    out.extend_from_slice(&i32::from(meta.cursor.0).to_le_bytes());

    let secs = i64::try_from(meta.elapsed.as_secs()).unwrap_or(i64::MAX);
    out.extend_from_slice(&secs.to_le_bytes());
    out.extend_from_slice(&i64::from(meta.elapsed.subsec_nanos()).to_le_bytes());

    out.extend(board.iter_interior().map(|pos| board.get(pos).pack()));
    debug_assert_eq!(out.len(), HEADER_LEN + size as usize);
    out
}

/// Consumes fixed-width fields from the front of a buffer.
struct Reader<'a> {
    rest: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take<const N: usize>(&mut self) -> core::result::Result<[u8; N], SaveDefect> {
        let (head, rest) = self
            .rest
            .split_first_chunk::<N>()
            .ok_or(SaveDefect::Truncated)?;
        self.rest = rest;
        Ok(*head)
    }

    fn i32(&mut self) -> core::result::Result<i32, SaveDefect> {
        self.take().map(i32::from_le_bytes)
    }

    fn u32(&mut self) -> core::result::Result<u32, SaveDefect> {
        self.take().map(u32::from_le_bytes)
    }

    fn i64(&mut self) -> core::result::Result<i64, SaveDefect> {
        self.take().map(i64::from_le_bytes)
    }
}

fn dimension(value: i32) -> core::result::Result<Coord, SaveDefect> {
    Coord::try_from(value)
        .ok()
        .filter(|dim| (1..=MAX_DIMENSION).contains(dim))
        .ok_or(SaveDefect::InvalidDimension)
}

fn duration(secs: i64, nanos: i64) -> core::result::Result<Duration, SaveDefect> {
    if secs < 0 || !(0..NANOS_PER_SEC).contains(&nanos) {
        return Err(SaveDefect::InvalidDuration);
    }
    let secs = u64::try_from(secs).map_err(|_| SaveDefect::InvalidDuration)?;
    let nanos = u32::try_from(nanos).map_err(|_| SaveDefect::InvalidDuration)?;
    Ok(Duration::new(secs, nanos))
}

/// Rebuilds a board and its metadata from bytes produced by [`encode`].
///
/// Every field is checked before it is trusted, so arbitrary input yields
/// [`SaveError::Corrupt`] rather than a panic or an inconsistent board.
pub fn decode(bytes: &[u8]) -> SaveResult<(Board, SessionMeta)> {
    if bytes.len() < HEADER_LEN {
        return Err(SaveDefect::Truncated.into());
    }
    let mut reader = Reader { rest: bytes };

    let size = reader.i64()?;
    let width = dimension(reader.i32()?)?;
    let height = dimension(reader.i32()?)?;
    let mines = reader.i32()?;
    let flags_placed = reader.i32()?;
    let bools = reader.u32()?;
    let cursor_y = reader.i32()?;
    let cursor_x = reader.i32()?;
    let secs = reader.i64()?;
    let nanos = reader.i64()?;

    let mines = CellCount::try_from(mines)
        .ok()
        .filter(|&mines| mines > 0)
        .ok_or(SaveDefect::NonPositiveMineCount)?;
    let total_cells = mult(width, height);
    if size != i64::from(total_cells) {
        return Err(SaveDefect::SizeMismatch.into());
    }
    if mines > total_cells {
        return Err(SaveDefect::TooManyMines.into());
    }

    let cells = reader.rest;
    match cells.len().cmp(&(total_cells as usize)) {
        core::cmp::Ordering::Less => return Err(SaveDefect::Truncated.into()),
        core::cmp::Ordering::Greater => return Err(SaveDefect::LengthMismatch.into()),
        core::cmp::Ordering::Equal => {}
    }

    let bools = GameBools::from_bits(bools).ok_or(SaveDefect::UnknownFlags(bools))?;
    let cursor = match (Coord::try_from(cursor_x), Coord::try_from(cursor_y)) {
        (Ok(x), Ok(y)) if (1..=width).contains(&x) && (1..=height).contains(&y) => (x, y),
        _ => return Err(SaveDefect::CursorOutOfRange.into()),
    };
    let elapsed = duration(secs, nanos)?;

    let mut board = Board::new(GameConfig::new_unchecked((width, height), mines))?;
    for (pos, &byte) in board.iter_interior().zip(cells) {
        let cell = Cell::unpack(byte).ok_or(SaveDefect::InvalidCell(byte))?;
        board.set(pos, cell);
    }

    let found = board.placed_mines();
    if found != mines {
        return Err(SaveDefect::MineCountMismatch {
            expected: mines,
            found,
        }
        .into());
    }
    let found = board.flag_count();
    if i64::from(flags_placed) != i64::from(found) {
        return Err(SaveDefect::FlagCountMismatch {
            declared: flags_placed,
            found,
        }
        .into());
    }

    let meta = SessionMeta {
        flags_placed: found,
        flag_mode: bools.contains(GameBools::FLAG_MODE),
        first_click: bools.contains(GameBools::FIRST_CLICK),
        cursor,
        elapsed,
    };
    Ok((board, meta))
}

/// Writes `bytes` to `path`, replacing any previous save.
pub fn write_to_file(path: impl AsRef<Path>, bytes: &[u8]) -> SaveResult<()> {
    let path = path.as_ref();
    std::fs::write(path, bytes).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Reads a whole save file. A missing file is [`SaveError::NotFound`].
pub fn read_from_file(path: impl AsRef<Path>) -> SaveResult<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => SaveError::NotFound(path.to_path_buf()),
        _ => SaveError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Removes a save file if it exists. Returns whether a file was removed.
pub fn delete_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match std::fs::remove_file(path) {
        Ok(()) => {
            log::info!("Deleted save file {}", path.display());
            true
        }
        Err(err) => {
            log::debug!("Could not delete {}: {}", path.display(), err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::board_with_mines;

    fn sample() -> (Board, SessionMeta) {
        let mut board = board_with_mines((4, 3), &[(1, 1), (4, 3)]);
        board.open_squares((4, 1));
        board[(1, 1)].glyph = Glyph::Flagged;
        board[(2, 3)].glyph = Glyph::Flagged;
        let meta = SessionMeta {
            flags_placed: 2,
            flag_mode: true,
            first_click: true,
            cursor: (3, 2),
            elapsed: Duration::new(75, 250_000_000),
        };
        (board, meta)
    }

    fn patch_i32(bytes: &mut [u8], offset: usize, value: i32) {
        bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn defect(bytes: &[u8]) -> SaveDefect {
        match decode(bytes) {
            Err(SaveError::Corrupt(defect)) => defect,
            other => panic!("expected a corrupt save, got {other:?}"),
        }
    }

    #[test]
    fn header_layout() {
        let (board, meta) = sample();
        let bytes = encode(&board, &meta);

        assert_eq!(bytes.len(), HEADER_LEN + 12);
        assert_eq!(bytes[0..8], 12i64.to_le_bytes());
        assert_eq!(bytes[8..12], 4i32.to_le_bytes());
        assert_eq!(bytes[12..16], 3i32.to_le_bytes());
        assert_eq!(bytes[16..20], 2i32.to_le_bytes());
        assert_eq!(bytes[20..24], 2i32.to_le_bytes());
        assert_eq!(bytes[24..28], 3u32.to_le_bytes());
        assert_eq!(bytes[28..32], 2i32.to_le_bytes());
        assert_eq!(bytes[32..36], 3i32.to_le_bytes());
        assert_eq!(bytes[36..44], 75i64.to_le_bytes());
        assert_eq!(bytes[44..52], 250_000_000i64.to_le_bytes());
        // first row: flagged mine, then the opened cells
        assert_eq!(bytes[HEADER_LEN], b'P' | MINE_BIT);
        assert_eq!(bytes[HEADER_LEN + 3], b'#');
    }

    #[test]
    fn decode_restores_encoded_state() {
        let (board, meta) = sample();

        let (decoded, decoded_meta) = decode(&encode(&board, &meta)).unwrap();

        assert_eq!(decoded, board);
        assert_eq!(decoded_meta, meta);
    }

    #[test]
    fn random_games_survive_a_save() {
        for seed in 0..30u64 {
            let size = (3 + (seed % 11) as Coord, 2 + (seed % 6) as Coord);
            let mines = 1 + (seed % 5) as CellCount;
            let mut board = Board::new(GameConfig::try_new(size, mines).unwrap()).unwrap();
            RandomMinePlacer::new(seed).place_mines(&mut board);

            let cells: Vec<_> = board.iter_interior().collect();
            let mut index = seed as usize;
            for _ in 0..4 {
                index = (index * 13 + 5) % cells.len();
                board.open_squares(cells[index]);
            }
            for &pos in cells.iter().step_by(3) {
                if board[pos].glyph.is_covered() {
                    board[pos].glyph = Glyph::Flagged;
                }
            }
            let meta = SessionMeta {
                flags_placed: board.flag_count(),
                flag_mode: seed % 2 == 0,
                first_click: seed % 3 != 0,
                cursor: cells[index],
                elapsed: Duration::new(seed * 17, (seed as u32) * 1_000_003),
            };

            let (decoded, decoded_meta) = decode(&encode(&board, &meta)).unwrap();

            assert_eq!(decoded, board, "seed {seed}");
            assert_eq!(decoded_meta, meta, "seed {seed}");
        }
    }

    #[test]
    fn detonated_cell_survives_a_save() {
        let mut board = board_with_mines((2, 2), &[(2, 2)]);
        board[(2, 2)].glyph = Glyph::Detonated;

        let (decoded, _) = decode(&encode(&board, &SessionMeta::default())).unwrap();
        assert_eq!(decoded[(2, 2)].glyph, Glyph::Detonated);
        assert!(decoded[(2, 2)].mine);
    }

    #[test]
    fn truncated_buffers_are_corrupt() {
        let (board, meta) = sample();
        let bytes = encode(&board, &meta);

        assert_eq!(defect(&bytes[..HEADER_LEN - 1]), SaveDefect::Truncated);
        assert_eq!(defect(&bytes[..bytes.len() - 1]), SaveDefect::Truncated);
        assert_eq!(defect(&[]), SaveDefect::Truncated);

        let mut padded = bytes.clone();
        padded.push(b'+');
        assert_eq!(defect(&padded), SaveDefect::LengthMismatch);
    }

    #[test]
    fn header_fields_are_validated() {
        let (board, meta) = sample();
        let bytes = encode(&board, &meta);

        let mut bad = bytes.clone();
        patch_i32(&mut bad, 8, 0);
        assert_eq!(defect(&bad), SaveDefect::InvalidDimension);

        let mut bad = bytes.clone();
        patch_i32(&mut bad, 12, -3);
        assert_eq!(defect(&bad), SaveDefect::InvalidDimension);

        let mut bad = bytes.clone();
        patch_i32(&mut bad, 16, 0);
        assert_eq!(defect(&bad), SaveDefect::NonPositiveMineCount);

        let mut bad = bytes.clone();
        bad[0..8].copy_from_slice(&13i64.to_le_bytes());
        assert_eq!(defect(&bad), SaveDefect::SizeMismatch);

        let mut bad = bytes.clone();
        patch_i32(&mut bad, 16, 13);
        assert_eq!(defect(&bad), SaveDefect::TooManyMines);

        let mut bad = bytes.clone();
        bad[24..28].copy_from_slice(&0x7u32.to_le_bytes());
        assert_eq!(defect(&bad), SaveDefect::UnknownFlags(0x7));

        let mut bad = bytes.clone();
        patch_i32(&mut bad, 32, 5);
        assert_eq!(defect(&bad), SaveDefect::CursorOutOfRange);

        let mut bad = bytes.clone();
        bad[44..52].copy_from_slice(&NANOS_PER_SEC.to_le_bytes());
        assert_eq!(defect(&bad), SaveDefect::InvalidDuration);
    }

    #[test]
    fn cell_bytes_are_validated() {
        let (board, meta) = sample();
        let bytes = encode(&board, &meta);

        let mut bad = bytes.clone();
        bad[HEADER_LEN + 5] = b'9';
        assert_eq!(defect(&bad), SaveDefect::InvalidCell(b'9'));

        // (2,2) shows a 1; a number cannot hide a mine
        let mut bad = bytes.clone();
        bad[HEADER_LEN + 5] |= MINE_BIT;
        assert_eq!(defect(&bad), SaveDefect::InvalidCell(b'1' | MINE_BIT));

        // (3,3) is covered, so an extra mine there is only a count mismatch
        let mut bad = bytes.clone();
        bad[HEADER_LEN + 10] |= MINE_BIT;
        assert_eq!(
            defect(&bad),
            SaveDefect::MineCountMismatch {
                expected: 2,
                found: 3
            }
        );

        let mut bad = bytes.clone();
        patch_i32(&mut bad, 20, 5);
        assert_eq!(
            defect(&bad),
            SaveDefect::FlagCountMismatch {
                declared: 5,
                found: 2
            }
        );
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("savefile");
        let (board, meta) = sample();

        write_to_file(&path, &encode(&board, &meta)).unwrap();
        let (decoded, _) = decode(&read_from_file(&path).unwrap()).unwrap();
        assert_eq!(decoded, board);

        assert!(delete_file(&path));
        assert!(!delete_file(&path));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_from_file(dir.path().join("absent")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("savefile");

        let err = write_to_file(&path, b"data").unwrap_err();
        assert!(matches!(err, SaveError::Io { .. }));
    }
}
