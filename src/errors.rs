use crate::Point2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WormError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("Couldn't find a preset with the name '{0}', please check your spelling")]
    UnknownPreset(String),
    #[error("Cell {0} is outside the {1}x{2} board")]
    OutOfBounds(Point2, usize, usize),
    #[error("Cell {0} is already occupied")]
    CellOccupied(Point2),
    #[error("Worm thread '{0}' panicked")]
    WormPanicked(String),
}
