//! Line-oriented game loop around a [`Session`].

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use mineterm_core::{Coord, Coord2, MinePlacer, MoveOutcome, Session, SessionState};
use thiserror::Error;

use crate::render;

pub const HELP: &str = "\
Commands:
  w a s d        move the cursor up, left, down, right
  z | o [X Y]    open (flag in flag mode), at X Y or the cursor
  x | f [X Y]    flag (open in flag mode), at X Y or the cursor
  m              toggle flag mode
  e | save       save the game
  r              restart with a new board
  q              quit, optionally saving first
  help           show this help
Acting on a numbered cell opens its neighbors once the flags around it add up.";

/// How a single game ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameCode {
    Restart,
    Exit,
    Won,
    Lost,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Move(i32, i32),
    Primary(Option<Coord2>),
    Secondary(Option<Coord2>),
    ToggleMode,
    Save,
    Restart,
    Quit,
    Help,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command {0:?}, type help for a list")]
    Unknown(String),
    #[error("expected two coordinates, e.g. `z 3 4`")]
    BadCoords,
}

fn parse_coords(args: &[&str]) -> Result<Option<Coord2>, CommandError> {
    match args {
        [] => Ok(None),
        [x, y] => {
            let x = x.parse::<Coord>().map_err(|_| CommandError::BadCoords)?;
            let y = y.parse::<Coord>().map_err(|_| CommandError::BadCoords)?;
            Ok(Some((x, y)))
        }
        _ => Err(CommandError::BadCoords),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Err(CommandError::Unknown(String::new()));
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "w" => Command::Move(0, -1),
            "a" => Command::Move(-1, 0),
            "s" => Command::Move(0, 1),
            "d" => Command::Move(1, 0),
            "z" | "o" => return parse_coords(args).map(Command::Primary),
            "x" | "f" => return parse_coords(args).map(Command::Secondary),
            "m" => Command::ToggleMode,
            "e" | "save" => Command::Save,
            "r" => Command::Restart,
            "q" | "quit" => Command::Quit,
            "h" | "help" | "?" => Command::Help,
            _ => return Err(CommandError::Unknown(line.trim().to_string())),
        };
        if !args.is_empty() {
            return Err(CommandError::Unknown(line.trim().to_string()));
        }
        Ok(command)
    }
}

/// Reads commands from `input`, applies them to a session and prints frames to `output`.
pub struct Driver<R, W> {
    input: R,
    output: W,
    save_path: PathBuf,
}

impl<R: BufRead, W: Write> Driver<R, W> {
    pub fn new(input: R, output: W, save_path: impl Into<PathBuf>) -> Self {
        Self {
            input,
            output,
            save_path: save_path.into(),
        }
    }

    pub fn save_path(&self) -> &Path {
        &self.save_path
    }

    /// Prints `prompt` and reads one line. `None` at end of input.
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn save<P: MinePlacer>(&mut self, session: &Session<P>) -> io::Result<()> {
        match session.save(&self.save_path) {
            Ok(()) => writeln!(self.output, "Game saved to {}", self.save_path.display()),
            Err(err) => {
                log::warn!("Save failed: {err}");
                writeln!(self.output, "Could not save: {err}")
            }
        }
    }

    /// Asks whether to save before quitting. `false` means the player cancelled.
    fn confirm_quit<P: MinePlacer>(&mut self, session: &mut Session<P>) -> io::Result<bool> {
        session.pause();
        let answer = self.prompt("Save before exiting? [y]es/[n]o/[c]ancel: ")?;
        match answer.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("y" | "yes") => {
                self.save(session)?;
                Ok(true)
            }
            Some("n" | "no") | None => Ok(true),
            Some(_) => {
                session.resume_clock();
                Ok(false)
            }
        }
    }

    fn apply<P: MinePlacer>(
        &mut self,
        session: &mut Session<P>,
        at: Option<Coord2>,
        secondary: bool,
    ) -> io::Result<Option<GameCode>> {
        if let Some(coords) = at {
            if let Err(err) = session.board().validate_coords(coords) {
                writeln!(self.output, "{err}: {:?}", coords)?;
                return Ok(None);
            }
            session.set_cursor(coords);
        }

        let outcome = if secondary {
            session.secondary()
        } else {
            session.primary()
        };
        match outcome {
            Ok(MoveOutcome::Rejected) => {
                // bell, the flags around that number do not add up
                write!(self.output, "\x07")?;
                Ok(None)
            }
            Ok(MoveOutcome::HitMine) => Ok(Some(GameCode::Lost)),
            Ok(MoveOutcome::Won) => Ok(Some(GameCode::Won)),
            Ok(_) => Ok(None),
            Err(err) => {
                writeln!(self.output, "{err}")?;
                Ok(None)
            }
        }
    }

    /// Plays one session to the end and reports how it ended.
    pub fn play<P: MinePlacer>(&mut self, session: &mut Session<P>) -> io::Result<GameCode> {
        match session.state() {
            SessionState::Playing => {}
            SessionState::Won => return Ok(GameCode::Won),
            SessionState::Lost => return Ok(GameCode::Lost),
        }

        loop {
            write!(self.output, "{}", render::frame(session))?;
            let Some(line) = self.prompt("> ")? else {
                log::debug!("Input closed, leaving the game");
                return Ok(GameCode::Exit);
            };
            if line.is_empty() {
                continue;
            }

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(err) => {
                    writeln!(self.output, "{err}")?;
                    continue;
                }
            };

            let code = match command {
                Command::Move(dx, dy) => {
                    session.move_cursor(dx, dy);
                    None
                }
                Command::Primary(at) => self.apply(session, at, false)?,
                Command::Secondary(at) => self.apply(session, at, true)?,
                Command::ToggleMode => {
                    session.toggle_flag_mode();
                    None
                }
                Command::Save => {
                    self.save(session)?;
                    None
                }
                Command::Restart => Some(GameCode::Restart),
                Command::Quit => self.confirm_quit(session)?.then_some(GameCode::Exit),
                Command::Help => {
                    session.pause();
                    writeln!(self.output, "{HELP}")?;
                    session.resume_clock();
                    None
                }
            };

            if let Some(code) = code {
                if matches!(code, GameCode::Won | GameCode::Lost) {
                    write!(self.output, "{}", render::frame(session))?;
                }
                log::info!("Game ended: {:?}", code);
                return Ok(code);
            }
        }
    }
}
