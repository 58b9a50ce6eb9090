use core::time::Duration;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Non-grid state of a session, persisted next to the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    pub flags_placed: CellCount,
    pub flag_mode: bool,
    pub first_click: bool,
    pub cursor: Coord2,
    pub elapsed: Duration,
}

impl Default for SessionMeta {
    fn default() -> Self {
        Self {
            flags_placed: 0,
            flag_mode: false,
            first_click: false,
            cursor: (1, 1),
            elapsed: Duration::ZERO,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Open,
    Flag,
}

impl Action {
    const fn swapped(self) -> Self {
        match self {
            Self::Open => Self::Flag,
            Self::Flag => Self::Open,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Playing,
    Won,
    Lost,
}

impl SessionState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Outcome of a single move
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    NoChange,
    /// One or more cells were opened.
    Revealed,
    /// A flag was placed or removed.
    Marked,
    /// A chord whose flags did not match the number; drivers usually beep.
    Rejected,
    HitMine,
    Won,
}

impl MoveOutcome {
    /// Whether this outcome could have caused an update to the board
    pub const fn has_update(self) -> bool {
        use MoveOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            Marked => true,
            Rejected => false,
            HitMine => true,
            Won => true,
        }
    }
}

/// Play-time stopwatch; menu time is excluded by pausing it.
#[derive(Clone, Debug)]
struct PlayClock {
    banked: Duration,
    running_since: Option<Instant>,
    paused: bool,
}

impl PlayClock {
    fn new(banked: Duration) -> Self {
        Self {
            banked,
            running_since: None,
            paused: false,
        }
    }

    fn start(&mut self) {
        if self.running_since.is_none() && !self.paused {
            self.running_since = Some(Instant::now());
        }
    }

    fn stop(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.banked += since.elapsed();
        }
    }

    fn pause(&mut self) {
        if self.running_since.is_some() {
            self.stop();
            self.paused = true;
        }
    }

    fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.start();
        }
    }

    fn elapsed(&self) -> Duration {
        self.banked + self.running_since.map_or(Duration::ZERO, |since| since.elapsed())
    }
}

/// One game from first move to win, loss or exit: the board, its metadata and the clock.
#[derive(Debug)]
pub struct Session<P: MinePlacer = RandomMinePlacer> {
    board: Board,
    meta: SessionMeta,
    placer: P,
    clock: PlayClock,
    state: SessionState,
    origin: Option<PathBuf>,
}

impl Session<RandomMinePlacer> {
    /// Starts a fresh game with randomly placed mines.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        Self::with_placer(config, RandomMinePlacer::new(seed))
    }

    /// Reads and decodes a save file. A loss in the loaded game deletes that file.
    pub fn load(path: impl AsRef<Path>, seed: u64) -> SaveResult<Self> {
        let path = path.as_ref();
        let bytes = read_from_file(path)?;
        let (board, meta) = decode(&bytes)?;
        log::info!("Loaded {}x{} game from {}", board.width(), board.height(), path.display());

        let mut session = Self::resume(board, meta, RandomMinePlacer::new(seed));
        if session.state == SessionState::Lost {
            log::warn!("Save at {} holds a lost game", path.display());
            delete_file(path);
        } else {
            session.origin = Some(path.to_path_buf());
        }
        Ok(session)
    }
}

impl<P: MinePlacer> Session<P> {
    pub fn with_placer(config: GameConfig, mut placer: P) -> Result<Self> {
        let mut board = Board::new(config)?;
        placer.place_mines(&mut board);
        Ok(Self::resume(board, SessionMeta::default(), placer))
    }

    /// Continues a game from a board and metadata, e.g. ones returned by [`decode`].
    ///
    /// A board showing a detonated mine resumes as lost.
    pub fn resume(board: Board, meta: SessionMeta, placer: P) -> Self {
        let state = if board.has_detonated() {
            SessionState::Lost
        } else if board.all_clear() {
            SessionState::Won
        } else {
            SessionState::Playing
        };
        let mut clock = PlayClock::new(meta.elapsed);
        if meta.first_click && state == SessionState::Playing {
            clock.start();
        }

        let mut session = Self {
            board,
            meta,
            placer,
            clock,
            state,
            origin: None,
        };
        session.set_cursor(meta.cursor);
        session
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn meta(&self) -> &SessionMeta {
        &self.meta
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cursor(&self) -> Coord2 {
        self.meta.cursor
    }

    pub fn flags_placed(&self) -> CellCount {
        self.meta.flags_placed
    }

    pub fn is_flag_mode(&self) -> bool {
        self.meta.flag_mode
    }

    /// Path of the save file this session was loaded from, while it still counts.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Flips flag mode and returns the new mode.
    pub fn toggle_flag_mode(&mut self) -> bool {
        self.meta.flag_mode = !self.meta.flag_mode;
        self.meta.flag_mode
    }

    /// Places the cursor, clamped into the board interior.
    pub fn set_cursor(&mut self, (x, y): Coord2) {
        let (width, height) = self.board.size();
        self.meta.cursor = (x.clamp(1, width), y.clamp(1, height));
    }

    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        let (x, y) = self.meta.cursor;
        let shift = |value: Coord, delta: i32| {
            let moved = i32::from(value).saturating_add(delta).max(1);
            Coord::try_from(moved).unwrap_or(Coord::MAX)
        };
        self.set_cursor((shift(x, dx), shift(y, dy)));
    }

    /// Stops the clock while a menu is shown.
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume_clock(&mut self) {
        self.clock.resume();
    }

    /// Current metadata, with the elapsed time taken now.
    pub fn snapshot(&self) -> SessionMeta {
        SessionMeta {
            elapsed: self.elapsed(),
            ..self.meta
        }
    }

    /// Serializes the game in progress. Finished games are not saved.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.state.is_finished() {
            return Err(GameError::AlreadyEnded);
        }
        Ok(encode(&self.board, &self.snapshot()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SaveResult<()> {
        write_to_file(path, &self.encode()?)
    }

    /// Main button at the cursor: opens, or flags in flag mode.
    pub fn primary(&mut self) -> Result<MoveOutcome> {
        self.act_at_cursor(Action::Open)
    }

    /// Second button at the cursor: flags, or opens in flag mode.
    pub fn secondary(&mut self) -> Result<MoveOutcome> {
        self.act_at_cursor(Action::Flag)
    }

    fn act_at_cursor(&mut self, action: Action) -> Result<MoveOutcome> {
        let action = if self.meta.flag_mode {
            action.swapped()
        } else {
            action
        };
        self.act(action, self.meta.cursor)
    }

    /// Applies one move. Either action on a numbered cell is a chord.
    pub fn act(&mut self, action: Action, coords: Coord2) -> Result<MoveOutcome> {
        let coords = self.board.validate_coords(coords)?;
        if self.state.is_finished() {
            return Err(GameError::AlreadyEnded);
        }

        let outcome = if self.board[coords].glyph.number().is_some() {
            self.chord(coords)
        } else {
            match action {
                Action::Open => self.open(coords),
                Action::Flag => self.toggle_flag(coords),
            }
        };
        log::debug!("{:?} at {:?}: {:?}", action, coords, outcome);

        Ok(match outcome {
            MoveOutcome::HitMine => {
                self.mark_lost();
                MoveOutcome::HitMine
            }
            _ if self.board.all_clear() => {
                self.mark_won();
                MoveOutcome::Won
            }
            other => other,
        })
    }

    fn open(&mut self, coords: Coord2) -> MoveOutcome {
        if self.board[coords].glyph.is_flagged() {
            return MoveOutcome::NoChange;
        }

        if !self.meta.first_click {
            let placement = self.placer.place_mines_avoiding(&mut self.board, coords);
            if placement.is_degraded() {
                log::info!("Playing with {} mines", self.board.mine_count());
            }
        }

        if self.board[coords].mine {
            self.board[coords].glyph = Glyph::Detonated;
            return MoveOutcome::HitMine;
        }

        let opened = self.board.open_squares(coords);
        if !self.meta.first_click {
            self.meta.first_click = true;
            self.clock.start();
        }

        if opened > 0 {
            MoveOutcome::Revealed
        } else {
            MoveOutcome::NoChange
        }
    }

    fn toggle_flag(&mut self, coords: Coord2) -> MoveOutcome {
        let cell = &mut self.board[coords];
        match cell.glyph {
            Glyph::Covered => {
                cell.glyph = Glyph::Flagged;
                self.meta.flags_placed += 1;
                MoveOutcome::Marked
            }
            Glyph::Flagged => {
                cell.glyph = Glyph::Covered;
                self.meta.flags_placed = self.meta.flags_placed.saturating_sub(1);
                MoveOutcome::Marked
            }
            _ => MoveOutcome::NoChange,
        }
    }

    fn chord(&mut self, coords: Coord2) -> MoveOutcome {
        match self.board.chord(coords) {
            ChordOutcome::NotNumbered => MoveOutcome::NoChange,
            ChordOutcome::Mismatch => MoveOutcome::Rejected,
            ChordOutcome::Opened(0) => MoveOutcome::NoChange,
            ChordOutcome::Opened(_) => MoveOutcome::Revealed,
            ChordOutcome::Detonated(_) => MoveOutcome::HitMine,
        }
    }

    fn mark_won(&mut self) {
        self.state = SessionState::Won;
        self.clock.stop();
        log::info!("Won after {:.3}s", self.elapsed().as_secs_f64());
    }

    fn mark_lost(&mut self) {
        self.state = SessionState::Lost;
        self.clock.stop();
        log::info!("Lost after {:.3}s", self.elapsed().as_secs_f64());

        // a loaded game gets one life: its save goes with it
        if let Some(path) = self.origin.take() {
            delete_file(&path);
        }
    }
}
