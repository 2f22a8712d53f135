use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("could not allocate a {mb} MB transposition table")]
    TtAllocation { mb: usize },

    #[error("operation not allowed while a search is running")]
    SearchInProgress,

    #[error("no search is running")]
    NoActiveSearch,

    #[error("search workers did not stop within {0:?}")]
    WorkerJoinTimeout(Duration),

    #[error("could not start search threads: {0}")]
    ThreadStart(String),

    #[error("search worker panicked")]
    WorkerPanicked,

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
