//! Runtime configuration, built from defaults and command-line arguments.

use std::path::PathBuf;

use crate::constants::{DEBUG_HEIGHT, DEBUG_WIDTH, DEFAULT_ASSETS_DIR, DEFAULT_LOG_FILE};
use crate::error::{GameError, GameResult};

pub const USAGE: &str =
    "usage: asteroids [--debug [WIDTH HEIGHT [FRAMES]]] [--frames N] [--assets DIR] [--seed N] [--log FILE]";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Render into an in-memory screen buffer, dumped to the log, with scripted input.
    pub debug: bool,
    /// Grid size used in debug mode; a real terminal reports its own size.
    pub debug_width: u16,
    pub debug_height: u16,
    /// Stop after this many frames.
    pub max_frames: Option<u64>,
    pub assets_dir: PathBuf,
    pub seed: Option<u64>,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            debug_width: DEBUG_WIDTH,
            debug_height: DEBUG_HEIGHT,
            max_frames: None,
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            seed: None,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    /// Parses arguments without the program name.
    pub fn from_args<I, S>(args: I) -> GameResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        let mut config = Config::default();
        let mut i = 0;

        while i < args.len() {
            match args[i].as_str() {
                "--debug" => {
                    config.debug = true;
                    // Optional positional WIDTH HEIGHT [FRAMES]
                    if let Some(width) = args.get(i + 1).and_then(|s| s.parse::<u16>().ok()) {
                        let height = args
                            .get(i + 2)
                            .ok_or_else(|| GameError::Config("--debug WIDTH needs a HEIGHT".to_string()))?;
                        config.debug_width = width;
                        config.debug_height = parse_value("--debug HEIGHT", height)?;
                        i += 2;
                        if let Some(frames) = args.get(i + 1).and_then(|s| s.parse::<u64>().ok()) {
                            config.max_frames = Some(frames);
                            i += 1;
                        }
                    }
                }
                "--frames" => {
                    config.max_frames = Some(parse_value("--frames", next_value(&args, i, "--frames")?)?);
                    i += 1;
                }
                "--assets" => {
                    config.assets_dir = PathBuf::from(next_value(&args, i, "--assets")?);
                    i += 1;
                }
                "--seed" => {
                    config.seed = Some(parse_value("--seed", next_value(&args, i, "--seed")?)?);
                    i += 1;
                }
                "--log" => {
                    config.log_file = PathBuf::from(next_value(&args, i, "--log")?);
                    i += 1;
                }
                other => {
                    return Err(GameError::Config(format!("unknown argument '{}'\n{}", other, USAGE)));
                }
            }
            i += 1;
        }

        if config.debug && (config.debug_width == 0 || config.debug_height == 0) {
            return Err(GameError::Config("debug grid must be at least 1x1".to_string()));
        }

        Ok(config)
    }
}

fn next_value<'a>(args: &'a [String], i: usize, flag: &str) -> GameResult<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| GameError::Config(format!("{} expects a value", flag)))
}

fn parse_value<T: std::str::FromStr>(flag: &str, raw: &str) -> GameResult<T> {
    raw.parse::<T>()
        .map_err(|_| GameError::Config(format!("invalid value '{}' for {}", raw, flag)))
}
