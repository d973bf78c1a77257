use thiserror::Error;

use crate::sim::GamePhase;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("Scores can only be submitted after a game ends (phase: {0:?})")]
    NotGameOver(GamePhase),

    #[error("Score submission failed: {0}")]
    Submission(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
