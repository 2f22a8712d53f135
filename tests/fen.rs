use pretty_assertions::assert_eq;
use titan_smp::board::{Position, START_FEN};
use titan_smp::EngineError;

#[test]
fn fen_round_trips() {
    for fen in [
        START_FEN,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        "8/8/4k3/8/8/3K4/8/8 b - - 42 90",
    ] {
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.to_fen(), fen);
    }
    assert_eq!(Position::startpos().to_fen(), START_FEN);
}

#[test]
fn uncapturable_en_passant_square_is_dropped() {
    let pos = Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
    assert_eq!(pos.ep_square(), None);
    let mut played = Position::startpos();
    played.play_uci("e2e4").unwrap();
    assert_eq!(played.hash(), pos.hash());
}

#[test]
fn rejects_malformed_and_illegal_setups() {
    let bad = [
        "",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
        "rnbq1bnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQ - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNP w - - 0 1",
        "4k3/8/8/8/8/8/8/4K2R w KQ - 0 1",
        "4k3/8/8/8/8/8/8/R3K3 w - e6 0 1",
        // Pawn on e5, but its starting square e7 is occupied.
        "rnbqkbnr/ppppnppp/8/3Pp3/8/8/PPP2PPP/RNBQKB1R w KQkq e6 0 3",
        "4k3/4R3/8/8/8/8/8/4K3 w - - 0 1",
        "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    ];
    for fen in bad {
        assert!(matches!(Position::from_fen(fen), Err(EngineError::InvalidPosition(_))), "accepted '{fen}'");
    }
}

#[test]
fn illegal_uci_moves_are_rejected() {
    let mut pos = Position::startpos();
    assert!(matches!(pos.play_uci("e2e5"), Err(EngineError::IllegalMove(_))));
    assert!(matches!(pos.play_uci("zz"), Err(EngineError::IllegalMove(_))));
    assert!(matches!(pos.play_uci("e2e4q"), Err(EngineError::IllegalMove(_))));
    assert_eq!(pos.parse_uci_move(" G1F3 ").unwrap().to_string(), "g1f3");
    assert_eq!(pos.play_uci("e2e4").unwrap().to_string(), "e2e4");
}
