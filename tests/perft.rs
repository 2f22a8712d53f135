use cozy_chess::Board;
use titan_smp::board::Position;
use titan_smp::perft::{divide, perft, perft_parallel};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const POS3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const POS4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
const POS5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

fn cozy_perft(board: &Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0u64;
    board.generate_moves(|moves| {
        for mv in moves {
            if depth == 1 {
                nodes += 1;
            } else {
                let mut child = board.clone();
                child.play_unchecked(mv);
                nodes += cozy_perft(&child, depth - 1);
            }
        }
        false
    });
    nodes
}

#[test]
fn perft_startpos_small_depths() {
    let mut pos = Position::startpos();
    assert_eq!(perft(&mut pos, 1), 20);
    assert_eq!(perft(&mut pos, 2), 400);
    assert_eq!(perft(&mut pos, 3), 8902);
    assert_eq!(perft(&mut pos, 4), 197281);
}

#[test]
fn perft_reference_positions() {
    let cases: [(&str, &[u64]); 4] = [
        (KIWIPETE, &[48, 2039, 97862]),
        (POS3, &[14, 191, 2812, 43238]),
        (POS4, &[6, 264, 9467]),
        (POS5, &[44, 1486, 62379]),
    ];
    for (fen, counts) in cases {
        let mut pos = Position::from_fen(fen).unwrap();
        for (i, &expected) in counts.iter().enumerate() {
            assert_eq!(perft(&mut pos, i as u32 + 1), expected, "{fen} depth {}", i + 1);
        }
    }
}

#[test]
fn parallel_and_divide_agree_with_serial() {
    let mut pos = Position::from_fen(KIWIPETE).unwrap();
    let serial = perft(&mut pos, 3);
    assert_eq!(perft_parallel(&pos, 3), serial);
    let split: u64 = divide(&mut pos, 3).iter().map(|(_, n)| n).sum();
    assert_eq!(split, serial);
}

#[test]
fn matches_cozy_chess_oracle() {
    for fen in [KIWIPETE, POS3, POS4, POS5] {
        let board = Board::from_fen(fen, false).unwrap();
        let mut pos = Position::from_fen(fen).unwrap();
        assert_eq!(perft(&mut pos, 3), cozy_perft(&board, 3), "{fen}");
    }
}

#[test]
fn random_walk_move_counts_match_oracle() {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..20 {
        let mut pos = Position::startpos();
        for _ in 0..60 {
            let moves = pos.legal_moves();
            let board = Board::from_fen(&pos.to_fen(), false).unwrap();
            assert_eq!(moves.len() as u64, cozy_perft(&board, 1), "{}", pos.to_fen());
            if moves.is_empty() {
                break;
            }
            let mv = moves[rng.gen_range(0..moves.len())];
            let _ = pos.make(mv);
        }
    }
}
