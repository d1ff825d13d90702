extern crate sofcheck;

use sofcheck::board::fen::FenParseError;
use sofcheck::Board;

#[test]
fn start_position_fen_round_trip() {
    sofcheck::init();
    let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    let board = Board::from_fen(fen).unwrap();
    assert_eq!(board.to_fen(), fen);
}

#[test]
fn tricky_fens_round_trip() {
    sofcheck::init();
    let fens = [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
        "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2",
        "4k3/8/8/8/8/8/8/4K2R w K - 11 40",
        "8/8/8/8/8/4k3/8/r3K3 w - - 0 1",
    ];
    for fen in fens.iter() {
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(&board.to_fen(), fen, "round trip failed");
        // Parsing the output again gives an identical board.
        let again = Board::from_fen(&board.to_fen()).unwrap();
        assert_eq!(again, board);
    }
}

#[test]
fn self_play_positions_round_trip() {
    extern crate rand;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use sofcheck::board::movegen::{is_move_legal, MoveGen};
    use sofcheck::board::move_make;
    use sofcheck::MoveList;

    sofcheck::init();
    let mut rng = StdRng::seed_from_u64(177);
    for _ in 0..10 {
        let mut board = Board::initial();
        for _ in 0..80 {
            let mut list = MoveList::new();
            MoveGen::new(&board).gen_all(&mut list);
            let legal: Vec<_> = list
                .iter()
                .cloned()
                .filter(|&m| is_move_legal(&board, m))
                .collect();
            if legal.is_empty() {
                break;
            }
            move_make(&mut board, legal[rng.gen_range(0..legal.len())]);
            let reparsed = Board::from_fen(&board.to_fen()).unwrap();
            assert_eq!(reparsed, board);
            assert_eq!(reparsed.hash(), board.hash());
        }
    }
}

#[test]
fn bad_fens_are_rejected() {
    sofcheck::init();
    let cases: [(&str, FenParseError); 4] = [
        (
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            FenParseError::ExpectedSpace,
        ),
        (
            "rnbqkbnr/pppppppp/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            FenParseError::NotEnoughRows,
        ),
        (
            "rnbqkbnr/pppppppp/8/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            FenParseError::TooManyRows,
        ),
        (
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 99999",
            FenParseError::ExpectedUint16,
        ),
    ];
    for (fen, want) in cases.iter() {
        assert_eq!(&Board::from_fen(fen).unwrap_err(), want, "for {}", fen);
    }
}
