use crate::board::bitboard::{bishop_attacks, rook_attacks};
use crate::board::{Move, Piece, Position};

const SEE_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 20000];

#[inline]
fn piece_value(piece: Piece) -> i32 {
    SEE_VALUES[piece.index()]
}

/// Static exchange evaluation of `mv` on its destination square: the net
/// material gain in centipawns for the side to move, assuming both sides
/// keep recapturing with their least valuable attacker while it pays.
pub fn see(pos: &Position, mv: Move) -> i32 {
    if mv.is_castle() {
        return 0;
    }
    let us = pos.side_to_move();
    let from = mv.from();
    let to = mv.to();
    let Some(attacker) = pos.piece_on(from) else {
        return 0;
    };

    let mut occ = pos.occupied() ^ from.bb();
    let mut gains = [0i32; 32];
    gains[0] = if mv.is_en_passant() {
        occ ^= to.offset(-us.forward()).bb();
        piece_value(Piece::Pawn)
    } else {
        pos.piece_on(to).map_or(0, piece_value)
    };
    let mut on_square = attacker;
    if let Some(promo) = mv.promotion() {
        gains[0] += piece_value(promo) - piece_value(Piece::Pawn);
        on_square = promo;
    }

    let diag = pos.pieces_of_type(Piece::Bishop) | pos.pieces_of_type(Piece::Queen);
    let straight = pos.pieces_of_type(Piece::Rook) | pos.pieces_of_type(Piece::Queen);
    let mut attackers = pos.attackers_to(to, occ) & occ;
    let mut side = !us;
    let mut d = 0usize;

    loop {
        let mine = attackers & pos.color_bb(side);
        if mine.is_empty() {
            break;
        }
        // Least valuable attacker.
        let Some((piece, from_bb)) = Piece::ALL
            .iter()
            .map(|&p| (p, mine & pos.pieces(side, p)))
            .find(|(_, bb)| bb.any())
        else {
            break;
        };
        if piece == Piece::King && (attackers & pos.color_bb(!side)).any() {
            break;
        }
        d += 1;
        if d >= gains.len() {
            break;
        }
        gains[d] = piece_value(on_square) - gains[d - 1];
        if (-gains[d - 1]).max(gains[d]) < 0 {
            break;
        }
        occ ^= from_bb.lsb().bb();
        attackers |= (bishop_attacks(to, occ) & diag) | (rook_attacks(to, occ) & straight);
        attackers &= occ;
        on_square = piece;
        side = !side;
    }

    while d > 0 {
        gains[d - 1] = -(-gains[d - 1]).max(gains[d]);
        d -= 1;
    }
    gains[0]
}

#[inline]
pub fn see_ge(pos: &Position, mv: Move, threshold: i32) -> bool {
    see(pos, mv) >= threshold
}
