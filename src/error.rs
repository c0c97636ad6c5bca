use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Audio error: {0}")]
    #[cfg_attr(not(feature = "audio"), allow(dead_code))]
    Audio(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type GameResult<T> = Result<T, GameError>;
