pub mod bitboard;
pub mod movegen;
pub mod moves;
pub mod position;
pub mod types;
pub mod zobrist;

pub use bitboard::Bitboard;
pub use movegen::{generate_legal, generate_tactical, GenMode};
pub use moves::{Move, MoveList};
pub use position::{NullToken, Position, UndoToken, START_FEN};
pub use types::{CastleRights, Color, Piece, Square};
