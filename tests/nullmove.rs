use titan_smp::board::Position;
use titan_smp::search::{SearchConfig, SearchLimits, SearchTuning, ThreadPool};

fn search(fen: &str, depth: u32, tuning: SearchTuning) -> titan_smp::search::SearchOutcome {
    let cfg = SearchConfig { hash_mb: 8, tuning, ..Default::default() };
    let mut pool = ThreadPool::new(cfg).unwrap();
    pool.search(&Position::from_fen(fen).unwrap(), SearchLimits::depth(depth)).unwrap()
}

#[test]
fn nullmove_reduces_nodes_kiwipete() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    let without = search(fen, 6, SearchTuning { null_move_min_depth: u32::MAX, ..Default::default() });
    let with = search(fen, 6, SearchTuning::default());
    assert!(with.nodes < without.nodes, "nullmove did not reduce nodes: {} vs {}", with.nodes, without.nodes);
}

#[test]
fn nullmove_never_tried_without_pieces() {
    // Blocked pawns that cannot promote within the horizon: the tree is
    // identical with null move on or off.
    let fen = "8/8/4k3/4p3/4P3/4K3/8/8 w - - 0 1";
    let without = search(fen, 7, SearchTuning { null_move_min_depth: u32::MAX, ..Default::default() });
    let with = search(fen, 7, SearchTuning::default());
    assert_eq!(with.nodes, without.nodes);
    assert_eq!(with.best_move, without.best_move);
}

#[test]
fn zugzwang_ending_still_finds_the_winning_push() {
    // King and pawn only: null move is disabled, and the pawn promotes.
    let out = search("8/4P3/8/8/8/2k5/8/4K3 w - - 0 1", 6, SearchTuning::default());
    assert_eq!(out.best_move.map(|m| m.to_string()).as_deref(), Some("e7e8q"));
}

#[test]
fn has_non_pawn_material_guard() {
    use titan_smp::board::Color;
    let pos = Position::from_fen("8/4P3/8/8/8/2k5/8/4K3 w - - 0 1").unwrap();
    assert!(!pos.has_non_pawn_material(Color::White));
    let pos = Position::startpos();
    assert!(pos.has_non_pawn_material(Color::Black));
}
