//! Pseudo-legal generation plus a non-mutating legality filter.

use super::bitboard::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks, Bitboard};
use super::moves::{Move, MoveList};
use super::position::Position;
use super::types::{CastleRights, Color, Piece, Square};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenMode {
    /// Every pseudo-legal move.
    All,
    /// Captures, capture-promotions and quiet queen promotions.
    Tactical,
}

fn push_pawn_move(list: &mut MoveList, from: Square, to: Square, flags: u32, mode: GenMode, us: Color) {
    if to.relative_rank(us) == 7 {
        for promo in Piece::PROMOTIONS {
            if mode == GenMode::Tactical && flags & Move::CAPTURE == 0 && promo != Piece::Queen {
                continue;
            }
            list.push(Move::new(from, to, Some(promo), flags));
        }
    } else if mode == GenMode::All || flags & Move::CAPTURE != 0 {
        list.push(Move::new(from, to, None, flags));
    }
}

fn generate_pawns(pos: &Position, mode: GenMode, list: &mut MoveList) {
    let us = pos.side_to_move();
    let them = !us;
    let occ = pos.occupied();
    let enemy = pos.color_bb(them);
    for from in pos.pieces(us, Piece::Pawn) {
        let one = from.offset(us.forward());
        if !occ.contains(one) {
            push_pawn_move(list, from, one, 0, mode, us);
            if mode == GenMode::All && from.relative_rank(us) == 1 {
                let two = one.offset(us.forward());
                if !occ.contains(two) {
                    list.push(Move::new(from, two, None, Move::DOUBLE_PUSH));
                }
            }
        }
        for to in pawn_attacks(us, from) & enemy {
            push_pawn_move(list, from, to, Move::CAPTURE, mode, us);
        }
    }
    if let Some(ep) = pos.ep_square() {
        for from in pawn_attacks(them, ep) & pos.pieces(us, Piece::Pawn) {
            list.push(Move::new(from, ep, None, Move::CAPTURE | Move::EN_PASSANT));
        }
    }
}

fn generate_castles(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let them = !us;
    let rights = pos.castling();
    let rank = us.back_rank();
    let occ = pos.occupied();
    let king = Square::new(4, rank);
    if pos.is_in_check() {
        return;
    }
    let free = |files: &[u8]| files.iter().all(|&f| !occ.contains(Square::new(f, rank)));
    let safe = |files: &[u8]| files.iter().all(|&f| !pos.is_square_attacked(Square::new(f, rank), them, occ));
    if rights.has(CastleRights::kingside(us)) && free(&[5, 6]) && safe(&[5, 6]) {
        list.push(Move::new(king, Square::new(6, rank), None, Move::CASTLE));
    }
    if rights.has(CastleRights::queenside(us)) && free(&[1, 2, 3]) && safe(&[2, 3]) {
        list.push(Move::new(king, Square::new(2, rank), None, Move::CASTLE));
    }
}

/// Appends pseudo-legal moves for the side to move.
pub fn generate_pseudo(pos: &Position, mode: GenMode, list: &mut MoveList) {
    let us = pos.side_to_move();
    let occ = pos.occupied();
    let enemy = pos.color_bb(!us);
    let targets = match mode {
        GenMode::All => !pos.color_bb(us),
        GenMode::Tactical => enemy,
    };

    generate_pawns(pos, mode, list);

    let mut push_targets = |from: Square, attacks: Bitboard| {
        for to in attacks & targets {
            let flags = if enemy.contains(to) { Move::CAPTURE } else { 0 };
            list.push(Move::new(from, to, None, flags));
        }
    };
    for from in pos.pieces(us, Piece::Knight) {
        push_targets(from, knight_attacks(from));
    }
    for from in pos.pieces(us, Piece::Bishop) {
        push_targets(from, bishop_attacks(from, occ));
    }
    for from in pos.pieces(us, Piece::Rook) {
        push_targets(from, rook_attacks(from, occ));
    }
    for from in pos.pieces(us, Piece::Queen) {
        push_targets(from, queen_attacks(from, occ));
    }
    let king = pos.king_square(us);
    push_targets(king, king_attacks(king));

    if mode == GenMode::All {
        generate_castles(pos, list);
    }
}

/// Whether a pseudo-legal move leaves the mover's king safe. Castling
/// safety is settled during generation.
pub fn is_legal(pos: &Position, mv: Move) -> bool {
    if mv.is_castle() {
        return true;
    }
    let us = pos.side_to_move();
    let them = !us;
    let from = mv.from();
    let to = mv.to();
    let king = pos.king_square(us);
    let mut occ = pos.occupied() ^ from.bb() | to.bb();
    if from == king {
        return !pos.is_square_attacked(to, them, occ);
    }
    let mut removed = to.bb();
    if mv.is_en_passant() {
        let cap_sq = to.offset(-us.forward());
        occ ^= cap_sq.bb();
        removed |= cap_sq.bb();
    }
    (pos.attackers_to(king, occ) & pos.color_bb(them) & !removed).is_empty()
}

pub fn generate(pos: &Position, mode: GenMode) -> MoveList {
    let mut list = MoveList::new();
    generate_pseudo(pos, mode, &mut list);
    list.retain(|mv| is_legal(pos, mv));
    list
}

pub fn generate_legal(pos: &Position) -> MoveList {
    generate(pos, GenMode::All)
}

pub fn generate_tactical(pos: &Position) -> MoveList {
    generate(pos, GenMode::Tactical)
}

impl Position {
    #[inline]
    pub fn legal_moves(&self) -> MoveList {
        generate_legal(self)
    }

    pub fn has_legal_move(&self) -> bool {
        let mut list = MoveList::new();
        generate_pseudo(self, GenMode::All, &mut list);
        list.iter().any(|&mv| is_legal(self, mv))
    }

    /// Whether `mv` (e.g. a hash move of unknown provenance) is legal here.
    pub fn is_legal_move(&self, mv: Move) -> bool {
        !mv.is_null() && self.legal_moves().iter().any(|&m| m == mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_has_twenty_moves() {
        let pos = Position::startpos();
        assert_eq!(pos.legal_moves().len(), 20);
        assert!(generate_tactical(&pos).is_empty());
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        // Knight on e2 is pinned by the rook on e8.
        let pos = Position::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        assert!(pos.legal_moves().iter().all(|m| m.from() != Square::parse("e2").unwrap()));
    }

    #[test]
    fn en_passant_discovered_check_is_illegal() {
        let pos = Position::from_fen("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1").unwrap();
        assert!(pos.legal_moves().iter().all(|m| !m.is_en_passant()));
    }

    #[test]
    fn castling_through_attack_is_rejected() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq - 0 1").unwrap();
        let castles: Vec<String> = pos.legal_moves().iter().filter(|m| m.is_castle()).map(|m| m.to_string()).collect();
        assert_eq!(castles, vec!["e1c1".to_string()]);
    }

    #[test]
    fn tactical_mode_keeps_captures_and_queen_pushes() {
        let pos = Position::from_fen("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let tactical: Vec<String> = generate_tactical(&pos).iter().map(|m| m.to_string()).collect();
        assert!(tactical.contains(&"a7a8q".to_string()));
        assert!(!tactical.contains(&"a7a8n".to_string()));
        assert!(tactical.contains(&"a7b8n".to_string()));
        assert_eq!(tactical.len(), 5);
    }
}
