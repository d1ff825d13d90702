extern crate rand;
extern crate sofcheck;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sofcheck::board::movegen::{is_move_legal, is_move_valid, was_move_legal, MoveGen};
use sofcheck::board::{move_make, move_unmake};
use sofcheck::core::piece_move::move_parse;
use sofcheck::{Board, Move, MoveKind, MoveList, SQ};

const TRICKY_FENS: [&str; 5] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
    "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2",
];

#[test]
fn make_unmake_restores_bit_identically() {
    sofcheck::init();
    for fen in TRICKY_FENS.iter() {
        let mut board = Board::from_fen(fen).unwrap();
        let saved = board.clone();
        let mut list = MoveList::new();
        MoveGen::new(&board).gen_all(&mut list);
        for &mov in list.iter() {
            let p = move_make(&mut board, mov);
            move_unmake(&mut board, mov, p);
            assert_eq!(board, saved, "make+unmake of {} broke {}", mov, fen);
            assert_eq!(board.hash(), saved.hash());
        }
        // The null move reverses too (the positions are not in check).
        if !sofcheck::board::movegen::is_check(&board) {
            let p = move_make(&mut board, Move::null());
            move_unmake(&mut board, Move::null(), p);
            assert_eq!(board, saved);
        }
    }
}

#[test]
fn legality_pre_and_post_checks_agree() {
    sofcheck::init();
    for fen in TRICKY_FENS.iter() {
        let board = Board::from_fen(fen).unwrap();
        let mut list = MoveList::new();
        MoveGen::new(&board).gen_all(&mut list);
        for &mov in list.iter() {
            let mut child = board.clone();
            move_make(&mut child, mov);
            assert_eq!(
                is_move_legal(&board, mov),
                was_move_legal(&child),
                "legality mismatch on {} for {}",
                mov,
                fen
            );
        }
    }
}

// The set of well-formed valid+legal moves must be exactly the legality
// filtered generator output.
#[test]
fn validity_scan_matches_generator() {
    sofcheck::init();
    for fen in TRICKY_FENS.iter() {
        let board = Board::from_fen(fen).unwrap();
        let mut generated = MoveList::new();
        MoveGen::new(&board).gen_all(&mut generated);
        let mut gen_legal: Vec<u32> = generated
            .iter()
            .filter(|&&m| is_move_legal(&board, m))
            .map(|m| m.as_u32())
            .collect();
        gen_legal.sort_unstable();

        // Enumerate every well-formed move for the side to move.
        let mut scanned: Vec<u32> = Vec::new();
        for kind_bits in 1..=9u8 {
            for src in 0..64u8 {
                for dst in 0..64u8 {
                    let mov = Move::from_u32(
                        (kind_bits as u32) | ((src as u32) << 8) | ((dst as u32) << 16),
                    );
                    if mov.kind == MoveKind::Null || mov.is_invalid() {
                        continue;
                    }
                    if !mov.is_well_formed(board.side()) {
                        continue;
                    }
                    if is_move_valid(&board, mov) && is_move_legal(&board, mov) {
                        scanned.push(mov.as_u32());
                    }
                }
            }
        }
        scanned.sort_unstable();
        assert_eq!(scanned, gen_legal, "move scan mismatch for {}", fen);
    }
}

#[test]
fn random_games_stay_reversible() {
    sofcheck::init();
    let mut rng = StdRng::seed_from_u64(829_347);
    for _ in 0..8 {
        let mut board = Board::initial();
        let mut path: Vec<(Move, sofcheck::board::MovePersistence, Board)> = Vec::new();
        for _ in 0..120 {
            let mut list = MoveList::new();
            MoveGen::new(&board).gen_all(&mut list);
            let legal: Vec<Move> = list
                .iter()
                .cloned()
                .filter(|&m| is_move_legal(&board, m))
                .collect();
            if legal.is_empty() {
                break;
            }
            let mov = legal[rng.gen_range(0..legal.len())];
            let snapshot = board.clone();
            let p = move_make(&mut board, mov);
            assert!(was_move_legal(&board));
            path.push((mov, p, snapshot));
        }
        while let Some((mov, p, snapshot)) = path.pop() {
            move_unmake(&mut board, mov, p);
            assert_eq!(board, snapshot);
        }
        assert_eq!(board, Board::initial());
    }
}

#[test]
fn move_parsing() {
    sofcheck::init();
    let board = Board::initial();

    let e2e4 = move_parse("e2e4", &board);
    assert_eq!(e2e4.kind, MoveKind::PawnDoubleMove);
    assert_eq!(e2e4.src, SQ::E2);
    assert_eq!(e2e4.dst, SQ::E4);

    assert_eq!(move_parse("0000", &board), Move::null());
    assert!(move_parse("e2e5", &board).is_invalid());
    assert!(move_parse("e2", &board).is_invalid());
    assert!(move_parse("e2e4x", &board).is_invalid());
    assert!(move_parse("i2i4", &board).is_invalid());

    // Promotions and castling get their kinds from the board.
    let promo_board = Board::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let promo = move_parse("a7a8q", &promo_board);
    assert_eq!(promo.kind, MoveKind::PromoteQueen);

    let castle_board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    let castle = move_parse("e1g1", &castle_board);
    assert_eq!(castle.kind, MoveKind::CastlingKingside);

    // A move that is well-formed but not legal in this position parses as
    // pseudo-legal and is caught by the legality check.
    let pinned = Board::from_fen("8/8/8/8/8/4k3/4r3/4KB2 w - - 0 1").unwrap();
    let mov = move_parse("f1g2", &pinned);
    assert!(!mov.is_invalid());
    assert!(!is_move_legal(&pinned, mov));
}
