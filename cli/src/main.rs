//! Terminal minesweeper.
//!
//! Reads one command per line from stdin and prints the board after every move.
//! Type `help` in game for the command list.
use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use mineterm_core::{CellCount, Coord, GameConfig, Session};

mod config;
mod driver;
mod render;

use config::Config;
use driver::{Driver, GameCode};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    Beginner,
    Intermediate,
    Expert,
}

impl From<Preset> for GameConfig {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Beginner => GameConfig::beginner(),
            Preset::Intermediate => GameConfig::intermediate(),
            Preset::Expert => GameConfig::expert(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Configuration file path
    #[arg(short, long, default_value = "mineterm.toml")]
    config: PathBuf,

    /// Board preset, applied before --width/--height/--mines
    #[arg(short, long, value_enum)]
    preset: Option<Preset>,

    #[arg(long)]
    width: Option<Coord>,

    #[arg(long)]
    height: Option<Coord>,

    #[arg(short, long)]
    mines: Option<CellCount>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Where the game is saved and resumed from
    #[arg(long)]
    save_file: Option<PathBuf>,

    /// Start a new game even if a save file exists
    #[arg(short, long)]
    new: bool,
}

impl Args {
    fn resolve_config(&self) -> Result<Config, config::ConfigError> {
        let mut config = Config::load_or_default(&self.config)?;
        if let Some(preset) = self.preset {
            config.set_game(preset.into());
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(mines) = self.mines {
            config.mines = mines;
        }
        if let Some(save_file) = &self.save_file {
            config.save_file = save_file.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

/// Resumes the saved game if there is a usable one, otherwise starts fresh.
fn open_session(config: &Config, seed: u64, resume: bool) -> Result<Session> {
    if resume {
        match Session::load(&config.save_file, seed) {
            Ok(session) => return Ok(session),
            Err(err) if err.is_not_found() => {
                log::debug!("No save at {}", config.save_file.display());
            }
            Err(err) => {
                log::warn!("Ignoring save file: {err}");
                eprintln!("Could not load {}: {err}", config.save_file.display());
            }
        }
    }
    Session::new(config.game()?, seed).context("could not start a new game")
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(level) = args.verbose.log_level() {
        env_logger::Builder::new()
            .filter_level(level.to_level_filter())
            .init();
    }

    let config = args.resolve_config()?;
    let mut seed = args.seed.unwrap_or_else(time_seed);
    log::debug!("config: {:?}, seed: {}", config, seed);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut driver = Driver::new(stdin.lock(), stdout.lock(), &config.save_file);
    let mut resume = !args.new;

    loop {
        let mut session = open_session(&config, seed, resume)?;
        resume = false;
        seed = seed.wrapping_add(1);

        match driver.play(&mut session)? {
            GameCode::Restart => {
                log::debug!("Restarting");
                continue;
            }
            GameCode::Exit => break,
            GameCode::Won | GameCode::Lost => {
                log::debug!("Finished, save file is {}", driver.save_path().display());
                break;
            }
        }
    }
    Ok(())
}
