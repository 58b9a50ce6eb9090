use core::fmt::Write as _;
use core::time::Duration;

use mineterm_core::{Board, CellCount, Coord2, Glyph, MinePlacer, Session, SessionState};

/// Character shown for one cell.
///
/// While playing this is the glyph byte itself. Once the game is over mines
/// are overlaid: `*` for hidden mines, `F` for flagged ones and `X` for the
/// one that went off.
fn cell_char(board: &Board, pos: Coord2, overlay: bool) -> char {
    let cell = board[pos];
    if overlay && cell.mine {
        return match cell.glyph {
            Glyph::Detonated => 'X',
            Glyph::Flagged => 'F',
            _ => '*',
        };
    }
    char::from(cell.glyph.to_ascii())
}

/// Draws the grid with column and row numbers, bracketing the cursor if given.
pub fn board_text(board: &Board, cursor: Option<Coord2>, overlay: bool) -> String {
    let (width, height) = board.size();
    let mut out = String::new();

    out.push_str("    ");
    for x in 1..=width {
        let _ = write!(out, "{:>3}", x % 1000);
    }
    out.push('\n');

    for y in 1..=height {
        let _ = write!(out, "{:>3} ", y);
        for x in 1..=width {
            let ch = cell_char(board, (x, y), overlay);
            if cursor == Some((x, y)) {
                let _ = write!(out, "[{ch}]");
            } else {
                let _ = write!(out, " {ch} ");
            }
        }
        out.push('\n');
    }
    out
}

pub fn hud_line(flags: CellCount, mines: CellCount, elapsed: Duration, finished: bool) -> String {
    if finished {
        format!("[ {flags:02}/{mines:02} ][ {:.3} ]", elapsed.as_secs_f64())
    } else {
        format!("[ {flags:02}/{mines:02} ][ {:03} ]", elapsed.as_secs())
    }
}

pub fn mode_line(flag_mode: bool) -> &'static str {
    if flag_mode {
        "[ Flag mode    ]"
    } else {
        "[ Normal mode  ]"
    }
}

/// Full frame for a session: grid, counters and mode or result line.
pub fn frame<P: MinePlacer>(session: &Session<P>) -> String {
    let state = session.state();
    let finished = state.is_finished();
    let board = session.board();
    let cursor = (!finished).then(|| session.cursor());

    let mut out = board_text(board, cursor, finished);
    out.push_str(&hud_line(
        session.flags_placed(),
        board.mine_count(),
        session.elapsed(),
        finished,
    ));
    out.push('\n');
    out.push_str(match state {
        SessionState::Playing => mode_line(session.is_flag_mode()),
        SessionState::Won => "[ You won!        ]",
        SessionState::Lost => "[ You lost!       ]",
    });
    out.push('\n');
    out
}
