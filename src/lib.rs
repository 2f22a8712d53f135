// Bitboard position, alpha-beta search and Lazy-SMP pool
pub mod board;
pub mod error;
pub mod perft;
pub mod search;

pub use error::{EngineError, Result};
