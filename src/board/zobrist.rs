use std::sync::OnceLock;

use super::types::{CastleRights, Color, Piece, Square};

pub struct Keys {
    piece: [[[u64; 64]; 6]; 2],
    side: u64,
    castling: [u64; 16],
    ep_file: [u64; 8],
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

static KEYS: OnceLock<Keys> = OnceLock::new();

pub fn keys() -> &'static Keys {
    KEYS.get_or_init(|| {
        let mut seed = 0xF00D_F00D_DEAD_BEEF_u64;
        let mut next = || {
            seed = splitmix64(seed);
            seed
        };
        let mut piece = [[[0u64; 64]; 6]; 2];
        for side in piece.iter_mut() {
            for table in side.iter_mut() {
                for v in table.iter_mut() {
                    *v = next();
                }
            }
        }
        let side = next();
        let mut castling = [0u64; 16];
        // Combined rights hash as the XOR of their single-flag keys.
        let flags = [next(), next(), next(), next()];
        for (bits, v) in castling.iter_mut().enumerate() {
            for (i, k) in flags.iter().enumerate() {
                if bits & (1 << i) != 0 {
                    *v ^= k;
                }
            }
        }
        let mut ep_file = [0u64; 8];
        for v in ep_file.iter_mut() {
            *v = next();
        }
        Keys { piece, side, castling, ep_file }
    })
}

impl Keys {
    #[inline]
    pub fn piece(&self, color: Color, piece: Piece, sq: Square) -> u64 {
        self.piece[color.index()][piece.index()][sq.index()]
    }

    #[inline]
    pub fn side(&self) -> u64 {
        self.side
    }

    #[inline]
    pub fn castling(&self, rights: CastleRights) -> u64 {
        self.castling[rights.bits() as usize]
    }

    #[inline]
    pub fn ep(&self, sq: Square) -> u64 {
        self.ep_file[sq.file() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct_and_stable() {
        let k = keys();
        let a = k.piece(Color::White, Piece::Pawn, Square::A1);
        let b = k.piece(Color::Black, Piece::Pawn, Square::A1);
        assert_ne!(a, b);
        assert_ne!(k.side(), 0);
        assert_eq!(k.castling(CastleRights::NONE), 0);
        assert_eq!(
            k.castling(CastleRights::ALL),
            k.castling(CastleRights::from_bits(3)) ^ k.castling(CastleRights::from_bits(12))
        );
        assert_eq!(a, keys().piece(Color::White, Piece::Pawn, Square::A1));
    }
}
