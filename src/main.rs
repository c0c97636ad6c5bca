mod assets;
mod config;
mod constants;
mod entities;
mod error;
mod game;
mod rendering;
mod runner;
mod terminal_io;
mod types;

use std::env;
use std::io;

use crossterm::terminal::size;
use log::{error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assets::{Assets, ensure_assets_dir};
use crate::config::Config;
use crate::error::GameResult;
use crate::game::Game;
use crate::rendering::{OutputTarget, ScreenBuffer};
use crate::runner::Runner;
use crate::terminal_io::{SimulatedInput, TerminalGuard};

/// Scripted debug runs stop here unless a frame count is given.
const DEFAULT_DEBUG_FRAMES: u64 = 600;

fn main() -> GameResult<()> {
    let config = Config::from_args(env::args().skip(1))?;
    simple_logging::log_to_file(&config.log_file, log::LevelFilter::Info)?;
    info!("Starting asteroids application.");

    if let Err(e) = ensure_assets_dir(&config.assets_dir) {
        warn!("Could not create assets directory {}: {}", config.assets_dir.display(), e);
    }
    let assets = Assets::load(&config.assets_dir);
    info!("Assets loaded from {}", assets.dir.display());

    let rng = match config.seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let mut game = Game::new(assets, rng);

    let result = if config.debug {
        run_debug(&config, &mut game)
    } else {
        run_terminal(&config, &mut game)
    };

    result.map_err(|e| {
        error!("Game exited with error: {}", e);
        e.into()
    })
}

fn run_debug(config: &Config, game: &mut Game) -> io::Result<()> {
    info!("Debug mode enabled. Resolution {}x{}", config.debug_width, config.debug_height);
    let quit_frame = config.max_frames.unwrap_or(DEFAULT_DEBUG_FRAMES);
    let mut runner = Runner::new(
        config.debug_width,
        config.debug_height,
        OutputTarget::ScreenBuffer(ScreenBuffer::new(config.debug_width, config.debug_height)),
        Some(SimulatedInput::demo_script(quit_frame)),
        false,
        config.max_frames,
    );
    runner.run(game)
}

fn run_terminal(config: &Config, game: &mut Game) -> io::Result<()> {
    let guard = TerminalGuard::enter()?;
    let (width, height) = size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
    info!("Terminal size: {}x{}", width, height);

    let mut runner = Runner::new(
        width,
        height,
        OutputTarget::Stdout(io::stdout()),
        None,
        guard.reports_releases(),
        config.max_frames,
    );
    runner.run(game)
    // guard restores the terminal here
}
