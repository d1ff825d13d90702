extern crate rand;
extern crate sofcheck;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sofcheck::board::movegen::{is_move_legal, MoveGen};
use sofcheck::board::{move_make, move_unmake};
use sofcheck::{Board, MoveList};

use std::collections::HashMap;

#[test]
fn hash_is_restored_by_unmake() {
    sofcheck::init();
    let mut board = Board::initial();
    let mut rng = StdRng::seed_from_u64(41);
    let mut hash_stack = Vec::new();
    let mut move_stack = Vec::new();
    for _ in 0..300 {
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
        hash_stack.push(board.hash());
        let mov = legal[rng.gen_range(0..legal.len())];
        let p = move_make(&mut board, mov);
        move_stack.push((mov, p));
    }
    while let Some((mov, p)) = move_stack.pop() {
        move_unmake(&mut board, mov, p);
        assert_eq!(board.hash(), hash_stack.pop().unwrap());
    }
}

#[test]
fn incremental_hash_matches_recomputed() {
    sofcheck::init();
    let mut board = Board::initial();
    let mut rng = StdRng::seed_from_u64(4099);
    for _ in 0..200 {
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
        let mut rebuilt = Board::from_fen(&board.to_fen()).unwrap();
        rebuilt.update();
        assert_eq!(board.hash(), rebuilt.hash());
    }
}

// Distinct positions from self-play practically never share a hash; a
// collision here would mean the Zobrist keys are broken, not that we got
// astronomically unlucky.
#[test]
fn no_collisions_in_self_play() {
    sofcheck::init();
    let mut rng = StdRng::seed_from_u64(777);
    let mut seen: HashMap<u64, String> = HashMap::new();
    for _ in 0..40 {
        let mut board = Board::initial();
        for _ in 0..100 {
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
            // Strip the move counters: they are not part of the hash.
            let fen = board.to_fen();
            let key: String = fen.split(' ').take(4).collect::<Vec<_>>().join(" ");
            if let Some(existing) = seen.insert(board.hash(), key.clone()) {
                assert_eq!(existing, key, "hash collision between distinct positions");
            }
        }
    }
}
