//! Bitboard position with incremental Zobrist hashing.
//!
//! `make` returns an [`UndoToken`] holding everything needed to reverse the
//! move exactly; `unmake` consumes it. The hash of every position reached
//! through `make` is kept in a history stack used for repetition detection.

use std::fmt;

use super::bitboard::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks, Bitboard};
use super::moves::Move;
use super::types::{CastleRights, Color, Piece, Square};
use super::zobrist::keys;
use crate::error::{EngineError, Result};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pieces: [[Bitboard; 6]; 2],
    colors: [Bitboard; 2],
    occupied: Bitboard,
    mailbox: [Option<Piece>; 64],
    side: Color,
    castling: CastleRights,
    ep: Option<Square>,
    halfmove: u16,
    fullmove: u16,
    hash: u64,
    plies_from_null: u16,
    history: Vec<u64>,
}

/// Reversal record for one `make`. Deliberately not `Clone`: each token
/// can be spent on exactly one `unmake`.
#[must_use = "a made move must be reversed with Position::unmake"]
#[derive(Debug)]
pub struct UndoToken {
    mv: Move,
    captured: Option<Piece>,
    castling: CastleRights,
    ep: Option<Square>,
    halfmove: u16,
    plies_from_null: u16,
    hash: u64,
}

impl UndoToken {
    pub fn mv(&self) -> Move {
        self.mv
    }

    pub fn captured(&self) -> Option<Piece> {
        self.captured
    }
}

#[must_use = "a null move must be reversed with Position::unmake_null"]
#[derive(Debug)]
pub struct NullToken {
    ep: Option<Square>,
    halfmove: u16,
    plies_from_null: u16,
    hash: u64,
}

/// Rook origin and destination for a castling king move to `king_to`.
#[inline]
pub(crate) fn castle_rook_squares(king_to: Square) -> (Square, Square) {
    let rank = king_to.rank();
    if king_to.file() == 6 { (Square::new(7, rank), Square::new(5, rank)) } else { (Square::new(0, rank), Square::new(3, rank)) }
}

impl Position {
    fn empty() -> Self {
        Position {
            pieces: [[Bitboard::EMPTY; 6]; 2],
            colors: [Bitboard::EMPTY; 2],
            occupied: Bitboard::EMPTY,
            mailbox: [None; 64],
            side: Color::White,
            castling: CastleRights::NONE,
            ep: None,
            halfmove: 0,
            fullmove: 1,
            hash: 0,
            plies_from_null: 0,
            history: Vec::with_capacity(256),
        }
    }

    pub fn startpos() -> Self {
        match Self::from_fen(START_FEN) {
            Ok(pos) => pos,
            Err(e) => unreachable!("start position must parse: {e}"),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let invalid = |msg: &str| EngineError::InvalidPosition(format!("{msg} in '{fen}'"));
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 || fields.len() > 6 {
            return Err(invalid("expected 4 to 6 fields"));
        }

        let mut pos = Position::empty();
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(invalid("placement must have 8 ranks"));
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(d) = c.to_digit(10) {
                    if !(1..=8).contains(&d) {
                        return Err(invalid("bad empty-square count"));
                    }
                    file += d as u8;
                } else {
                    let (color, piece) = Piece::from_char(c).ok_or_else(|| invalid("unknown piece letter"))?;
                    if file >= 8 {
                        return Err(invalid("rank overflows 8 files"));
                    }
                    pos.put_piece(color, piece, Square::new(file, rank));
                    file += 1;
                }
                if file > 8 {
                    return Err(invalid("rank overflows 8 files"));
                }
            }
            if file != 8 {
                return Err(invalid("rank does not cover 8 files"));
            }
        }

        for color in Color::ALL {
            if pos.pieces(color, Piece::King).count() != 1 {
                return Err(invalid("each side needs exactly one king"));
            }
            if pos.pieces(color, Piece::Pawn).count() > 8 {
                return Err(invalid("more than 8 pawns for one side"));
            }
        }
        let pawns = pos.pieces(Color::White, Piece::Pawn) | pos.pieces(Color::Black, Piece::Pawn);
        if (pawns & (super::bitboard::RANK_1 | super::bitboard::RANK_8)).any() {
            return Err(invalid("pawn on first or last rank"));
        }

        pos.side = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(invalid("side to move must be 'w' or 'b'")),
        };

        if fields[2] != "-" {
            for c in fields[2].chars() {
                let (flag, color, rook_file) = match c {
                    'K' => (CastleRights::WHITE_KING, Color::White, 7),
                    'Q' => (CastleRights::WHITE_QUEEN, Color::White, 0),
                    'k' => (CastleRights::BLACK_KING, Color::Black, 7),
                    'q' => (CastleRights::BLACK_QUEEN, Color::Black, 0),
                    _ => return Err(invalid("bad castling field")),
                };
                let rank = color.back_rank();
                let king_home = pos.pieces(color, Piece::King).contains(Square::new(4, rank));
                let rook_home = pos.pieces(color, Piece::Rook).contains(Square::new(rook_file, rank));
                if !king_home || !rook_home {
                    return Err(invalid("castling rights without king and rook on home squares"));
                }
                pos.castling.insert(flag);
            }
        }

        if fields[3] != "-" {
            let sq = Square::parse(fields[3]).ok_or_else(|| invalid("bad en-passant square"))?;
            let us = pos.side;
            let them = !us;
            let expected_rank = if us == Color::White { 5 } else { 2 };
            if sq.rank() != expected_rank {
                return Err(invalid("en-passant square inconsistent with placement"));
            }
            let pushed = sq.offset(-us.forward());
            let origin = sq.offset(us.forward());
            if pos.occupied.contains(sq)
                || pos.occupied.contains(origin)
                || !pos.pieces(them, Piece::Pawn).contains(pushed)
            {
                return Err(invalid("en-passant square inconsistent with placement"));
            }
            // Only kept when a capture is actually available, so equal
            // positions hash equally.
            if (pawn_attacks(them, sq) & pos.pieces(us, Piece::Pawn)).any() {
                pos.ep = Some(sq);
            }
        }

        if fields.len() > 4 {
            pos.halfmove = fields[4].parse().map_err(|_| invalid("bad halfmove clock"))?;
        }
        if fields.len() > 5 {
            pos.fullmove = fields[5].parse().map_err(|_| invalid("bad fullmove number"))?;
            pos.fullmove = pos.fullmove.max(1);
        }

        let them = !pos.side;
        if pos.is_square_attacked(pos.king_square(them), pos.side, pos.occupied) {
            return Err(invalid("side not to move is in check"));
        }

        pos.hash = pos.hash_from_scratch();
        Ok(pos)
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(90);
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                let sq = Square::new(file, rank);
                match self.mailbox[sq.index()] {
                    Some(piece) => {
                        if empty > 0 {
                            out.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        let color = if self.colors[0].contains(sq) { Color::White } else { Color::Black };
                        out.push(piece.to_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                out.push('/');
            }
        }
        let side = if self.side == Color::White { 'w' } else { 'b' };
        let ep = self.ep.map_or_else(|| "-".to_string(), |sq| sq.to_string());
        format!("{out} {side} {} {ep} {} {}", self.castling, self.halfmove, self.fullmove)
    }

    /// Full recomputation of the Zobrist key; the search never calls this.
    pub fn hash_from_scratch(&self) -> u64 {
        let k = keys();
        let mut h = 0u64;
        for color in Color::ALL {
            for piece in Piece::ALL {
                for sq in self.pieces(color, piece) {
                    h ^= k.piece(color, piece, sq);
                }
            }
        }
        if self.side == Color::Black {
            h ^= k.side();
        }
        h ^= k.castling(self.castling);
        if let Some(sq) = self.ep {
            h ^= k.ep(sq);
        }
        h
    }

    #[inline]
    fn put_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        let b = sq.bb();
        self.pieces[color.index()][piece.index()] |= b;
        self.colors[color.index()] |= b;
        self.occupied |= b;
        self.mailbox[sq.index()] = Some(piece);
    }

    #[inline]
    fn remove_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        let b = sq.bb();
        self.pieces[color.index()][piece.index()] ^= b;
        self.colors[color.index()] ^= b;
        self.occupied ^= b;
        self.mailbox[sq.index()] = None;
    }

    /// Applies a legal move. Passing a move that is not legal in this
    /// position breaks the board invariants.
    pub fn make(&mut self, mv: Move) -> UndoToken {
        let k = keys();
        let us = self.side;
        let them = !us;
        let from = mv.from();
        let to = mv.to();
        let moved = match self.mailbox[from.index()] {
            Some(p) => p,
            None => panic!("make {mv}: no piece on {from} in {}", self.to_fen()),
        };
        let cap_sq = if mv.is_en_passant() { to.offset(-us.forward()) } else { to };
        let captured = if mv.is_capture() { self.mailbox[cap_sq.index()] } else { None };
        debug_assert!(mv.is_capture() == captured.is_some(), "capture flag mismatch for {mv}");

        let token = UndoToken {
            mv,
            captured,
            castling: self.castling,
            ep: self.ep,
            halfmove: self.halfmove,
            plies_from_null: self.plies_from_null,
            hash: self.hash,
        };
        self.history.push(self.hash);

        let mut h = self.hash ^ k.castling(self.castling) ^ k.side();
        if let Some(ep) = self.ep {
            h ^= k.ep(ep);
        }

        if let Some(cap) = captured {
            self.remove_piece(them, cap, cap_sq);
            h ^= k.piece(them, cap, cap_sq);
        }

        let landed = mv.promotion().unwrap_or(moved);
        self.remove_piece(us, moved, from);
        self.put_piece(us, landed, to);
        h ^= k.piece(us, moved, from) ^ k.piece(us, landed, to);

        if mv.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(to);
            self.remove_piece(us, Piece::Rook, rook_from);
            self.put_piece(us, Piece::Rook, rook_to);
            h ^= k.piece(us, Piece::Rook, rook_from) ^ k.piece(us, Piece::Rook, rook_to);
        }

        self.castling = self.castling.after_move(from, to);
        h ^= k.castling(self.castling);

        self.ep = None;
        if mv.is_double_push() {
            let ep = from.offset(us.forward());
            if (pawn_attacks(us, ep) & self.pieces(them, Piece::Pawn)).any() {
                self.ep = Some(ep);
                h ^= k.ep(ep);
            }
        }

        if moved == Piece::Pawn || captured.is_some() {
            self.halfmove = 0;
        } else {
            self.halfmove = self.halfmove.saturating_add(1);
        }
        if us == Color::Black {
            self.fullmove = self.fullmove.saturating_add(1);
        }
        self.plies_from_null = self.plies_from_null.saturating_add(1);
        self.side = them;
        self.hash = h;
        token
    }

    pub fn unmake(&mut self, token: UndoToken) {
        let them = self.side;
        let us = !them;
        let mv = token.mv;
        let from = mv.from();
        let to = mv.to();
        let popped = self.history.pop();
        debug_assert_eq!(popped, Some(token.hash), "unmake {mv} without matching make");

        let landed = match self.mailbox[to.index()] {
            Some(p) => p,
            None => panic!("unmake {mv}: destination {to} is empty"),
        };
        let moved = if mv.promotion().is_some() { Piece::Pawn } else { landed };

        if mv.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(to);
            self.remove_piece(us, Piece::Rook, rook_to);
            self.put_piece(us, Piece::Rook, rook_from);
        }
        self.remove_piece(us, landed, to);
        self.put_piece(us, moved, from);
        if let Some(cap) = token.captured {
            let cap_sq = if mv.is_en_passant() { to.offset(-us.forward()) } else { to };
            self.put_piece(them, cap, cap_sq);
        }

        if us == Color::Black {
            self.fullmove -= 1;
        }
        self.side = us;
        self.castling = token.castling;
        self.ep = token.ep;
        self.halfmove = token.halfmove;
        self.plies_from_null = token.plies_from_null;
        self.hash = token.hash;
    }

    /// Passes the turn. Callers must not pass while in check.
    pub fn make_null(&mut self) -> NullToken {
        debug_assert!(!self.is_in_check());
        let k = keys();
        let token = NullToken { ep: self.ep, halfmove: self.halfmove, plies_from_null: self.plies_from_null, hash: self.hash };
        self.history.push(self.hash);
        if let Some(ep) = self.ep.take() {
            self.hash ^= k.ep(ep);
        }
        self.hash ^= k.side();
        self.side = !self.side;
        self.halfmove = self.halfmove.saturating_add(1);
        self.plies_from_null = 0;
        token
    }

    pub fn unmake_null(&mut self, token: NullToken) {
        let popped = self.history.pop();
        debug_assert_eq!(popped, Some(token.hash));
        self.side = !self.side;
        self.ep = token.ep;
        self.halfmove = token.halfmove;
        self.plies_from_null = token.plies_from_null;
        self.hash = token.hash;
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn castling(&self) -> CastleRights {
        self.castling
    }

    #[inline]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove
    }

    #[inline]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    #[inline]
    pub fn pieces_of_type(&self, piece: Piece) -> Bitboard {
        self.pieces[0][piece.index()] | self.pieces[1][piece.index()]
    }

    #[inline]
    pub fn color_bb(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.mailbox[sq.index()]
    }

    #[inline]
    pub fn color_on(&self, sq: Square) -> Option<Color> {
        if self.colors[0].contains(sq) {
            Some(Color::White)
        } else if self.colors[1].contains(sq) {
            Some(Color::Black)
        } else {
            None
        }
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces(color, Piece::King).lsb()
    }

    #[inline]
    pub fn piece_count(&self) -> u32 {
        self.occupied.count()
    }

    /// Anything besides king and pawns.
    #[inline]
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let kp = self.pieces(color, Piece::Pawn) | self.pieces(color, Piece::King);
        (self.color_bb(color) ^ kp).any()
    }

    /// All pieces of both colors attacking `sq` given occupancy `occ`.
    pub fn attackers_to(&self, sq: Square, occ: Bitboard) -> Bitboard {
        let bishops_queens = self.pieces_of_type(Piece::Bishop) | self.pieces_of_type(Piece::Queen);
        let rooks_queens = self.pieces_of_type(Piece::Rook) | self.pieces_of_type(Piece::Queen);
        (pawn_attacks(Color::White, sq) & self.pieces(Color::Black, Piece::Pawn))
            | (pawn_attacks(Color::Black, sq) & self.pieces(Color::White, Piece::Pawn))
            | (knight_attacks(sq) & self.pieces_of_type(Piece::Knight))
            | (king_attacks(sq) & self.pieces_of_type(Piece::King))
            | (bishop_attacks(sq, occ) & bishops_queens)
            | (rook_attacks(sq, occ) & rooks_queens)
    }

    #[inline]
    pub fn is_square_attacked(&self, sq: Square, by: Color, occ: Bitboard) -> bool {
        (self.attackers_to(sq, occ) & occ & self.color_bb(by)).any()
    }

    /// Enemy pieces giving check to the side to move.
    #[inline]
    pub fn checkers(&self) -> Bitboard {
        self.attackers_to(self.king_square(self.side), self.occupied) & self.color_bb(!self.side)
    }

    #[inline]
    pub fn is_in_check(&self) -> bool {
        self.checkers().any()
    }

    /// True when the current position already occurred with the same side
    /// to move since the last irreversible move or null move.
    ///
    /// One earlier occurrence is enough, including occurrences from the game
    /// history before the search root; this does not wait for a threefold
    /// repetition. The search never asks this of the root itself.
    pub fn is_repetition(&self) -> bool {
        let window = self.halfmove.min(self.plies_from_null) as usize;
        let len = self.history.len();
        let mut back = 4;
        while back <= window && back <= len {
            if self.history[len - back] == self.hash {
                return true;
            }
            back += 2;
        }
        false
    }

    /// Neither side can deliver mate by any sequence of legal moves.
    pub fn is_insufficient_material(&self) -> bool {
        let heavy = self.pieces_of_type(Piece::Pawn) | self.pieces_of_type(Piece::Rook) | self.pieces_of_type(Piece::Queen);
        if heavy.any() {
            return false;
        }
        let knights = self.pieces_of_type(Piece::Knight);
        let bishops = self.pieces_of_type(Piece::Bishop);
        if (knights | bishops).count() <= 1 {
            return true;
        }
        const DARK: u64 = 0xAA55_AA55_AA55_AA55;
        knights.is_empty() && (bishops.0 & DARK == 0 || bishops.0 & !DARK == 0)
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove >= 100 && (!self.is_in_check() || self.has_legal_move())
    }

    /// Draw by rule (fifty moves, insufficient material, or repetition).
    pub fn is_draw(&self) -> bool {
        self.is_insufficient_material() || self.is_repetition() || self.is_fifty_move_draw()
    }

    /// Finds the legal move whose UCI text is `text`.
    pub fn parse_uci_move(&self, text: &str) -> Result<Move> {
        let illegal = || EngineError::IllegalMove(format!("{text} in {}", self.to_fen()));
        let lower = text.trim().to_ascii_lowercase();
        let text = lower.as_str();
        let (from, to) = match (text.get(0..2).and_then(Square::parse), text.get(2..4).and_then(Square::parse)) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(illegal()),
        };
        let promo = match text.get(4..) {
            None | Some("") => None,
            Some(p) => match p.chars().next().and_then(|c| Piece::from_char(c)) {
                Some((_, piece)) if p.len() == 1 => Some(piece),
                _ => return Err(illegal()),
            },
        };
        let wanted = Move::new(from, to, promo, 0);
        self.legal_moves().iter().copied().find(|m| m.same_squares(wanted)).ok_or_else(illegal)
    }

    /// Parses and plays a UCI move permanently, extending the game history.
    pub fn play_uci(&mut self, text: &str) -> Result<Move> {
        let mv = self.parse_uci_move(text)?;
        let _ = self.make(mv);
        Ok(mv)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let sq = Square::new(file, rank);
                let c = match (self.piece_on(sq), self.color_on(sq)) {
                    (Some(p), Some(c)) => p.to_char(c),
                    _ => '.',
                };
                write!(f, "{c} ")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "{}", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_round_trips() {
        let pos = Position::startpos();
        assert_eq!(pos.to_fen(), START_FEN);
        assert_eq!(pos.piece_count(), 32);
        assert_eq!(pos.hash(), pos.hash_from_scratch());
        assert!(!pos.is_in_check());
    }

    #[test]
    fn rejects_malformed_fens() {
        for fen in [
            "",
            "8/8/8/8/8/8/8/8 w - - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "4k3/8/8/8/8/8/8/4K2R w Qk - 0 1",
            "P3k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K2r b - - 0 1",
        ] {
            assert!(matches!(Position::from_fen(fen), Err(EngineError::InvalidPosition(_))), "{fen}");
        }
    }

    #[test]
    fn ep_square_dropped_without_capturer() {
        let pos = Position::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(pos.ep_square(), None);
        let pos = Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(pos.ep_square(), Square::parse("e3"));
    }

    #[test]
    fn null_move_restores_state() {
        let mut pos = Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap();
        let before = pos.clone();
        let t = pos.make_null();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.ep_square(), None);
        assert_eq!(pos.hash(), pos.hash_from_scratch());
        pos.unmake_null(t);
        assert_eq!(pos, before);
    }

    #[test]
    fn insufficient_material_cases() {
        let draw = ["8/8/4k3/8/8/3K4/8/8 w - - 0 1", "8/8/4k3/8/8/3KN3/8/8 w - - 0 1", "8/2b5/4k3/8/8/3KB3/8/8 w - - 0 1"];
        for fen in draw {
            assert!(Position::from_fen(fen).unwrap().is_insufficient_material(), "{fen}");
        }
        let live = ["8/8/4k3/8/8/3KNN2/8/8 w - - 0 1", "8/8/4k3/8/8/3KP3/8/8 w - - 0 1", "8/1b6/4k3/8/8/3KB3/8/8 w - - 0 1"];
        for fen in live {
            assert!(!Position::from_fen(fen).unwrap().is_insufficient_material(), "{fen}");
        }
    }
}
