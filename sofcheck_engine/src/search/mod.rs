//! The main searching functions: the per-thread iterative-deepening driver
//! and the recursive alpha-beta with quiescence.
//!
//! Each [`Job`] owns its board copy, evaluator state, killers, history and
//! repetition table; the only mutable state shared between jobs is the
//! transposition table and the [`JobCommunicator`]. Cancellation is
//! cooperative: the searcher polls the stop flag and returns a dummy score,
//! which the callers discard because they re-check the flag themselves.
//!
//! [`Job`]: struct.Job.html
//! [`JobCommunicator`]: ../sync/struct.JobCommunicator.html

use crate::consts::*;
use crate::movepick::{MovePicker, MovePickerStage, QuiescenceMovePicker, RootMovePicker};
use crate::sync::JobCommunicator;
use crate::tables::{HistoryTable, KillerLine, RepetitionTable};
use crate::time::SearchLimits;

use sofcheck::board::movegen::{is_check, is_move_legal, was_move_legal, MoveGen};
use sofcheck::board::{move_make, move_unmake};
use sofcheck::core::move_list::MoveList;
use sofcheck::core::score::*;
use sofcheck::eval::{ScoreEvaluator, Tag};
use sofcheck::tools::tt::{Bound, Data, TranspositionTable};
use sofcheck::{Board, Move};

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// The evaluator tag type the search carries on its stack.
pub type ScoreTag = Tag<Value>;

/// A position with the move history that led to it.
#[derive(Clone, Debug)]
pub struct Position {
    pub first: Board,
    pub moves: Vec<Move>,
    pub last: Board,
}

impl Position {
    /// Builds a `Position` from a base board and the moves played from it.
    pub fn from_moves(first: Board, moves: Vec<Move>) -> Position {
        let mut last = first.clone();
        for &mov in moves.iter() {
            move_make(&mut last, mov);
        }
        Position { first, moves, last }
    }
}

/// The number of moves two positions share from the start, or `None` when
/// their base boards differ.
pub fn common_prefix(p1: &Position, p2: &Position) -> Option<usize> {
    if p1.first != p2.first {
        return None;
    }
    let mut count = 0;
    for (m1, m2) in p1.moves.iter().zip(p2.moves.iter()) {
        if m1 != m2 {
            break;
        }
        count += 1;
    }
    Some(count)
}

/// Statistic counters of a job. Single-writer: each job increments only its
/// own counters; the control thread reads them with relaxed loads.
pub enum JobStat {
    Nodes = 0,
    TtHits = 1,
    TtExactHits = 2,
}

const JOB_STAT_SZ: usize = 3;

pub struct JobResults {
    stats: [AtomicU64; JOB_STAT_SZ],
    depth: AtomicUsize,
    best_move: AtomicU64,
}

impl JobResults {
    pub fn new() -> JobResults {
        JobResults {
            stats: [AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0)],
            depth: AtomicUsize::new(0),
            best_move: AtomicU64::new(Move::null().as_u32() as u64),
        }
    }

    #[inline(always)]
    pub fn inc(&self, stat: JobStat) {
        let cell = &self.stats[stat as usize];
        let value = cell.load(Ordering::Relaxed) + 1;
        cell.store(value, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn get(&self, stat: JobStat) -> u64 {
        self.stats[stat as usize].load(Ordering::Relaxed)
    }

    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    pub fn best_move(&self) -> Move {
        Move::from_u32(self.best_move.load(Ordering::Relaxed) as u32)
    }

    pub fn set_best_move(&self, depth: usize, mov: Move) {
        self.best_move.store(mov.as_u32() as u64, Ordering::Relaxed);
        self.depth.store(depth, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        for cell in self.stats.iter() {
            cell.store(0, Ordering::Relaxed);
        }
        self.depth.store(0, Ordering::Relaxed);
        self.best_move
            .store(Move::null().as_u32() as u64, Ordering::Relaxed);
    }
}

impl Default for JobResults {
    fn default() -> Self {
        JobResults::new()
    }
}

/// A completed-depth result handed to the front end.
pub struct SearchResult<'a> {
    pub depth: usize,
    pub pv: &'a [Move],
    pub score: Value,
    pub bound: Bound,
}

/// The consumer of search results; implemented by the job runner, which
/// relays them to the protocol layer.
pub trait SearchHandler: Sync {
    fn on_result(&self, result: SearchResult);
}

bitflags! {
    /// Flags describing the path that led to the current search node.
    struct Flags: u8 {
        /// The last move was a capture.
        const CAPTURE = 1;
        /// We are inside a null-move search.
        const NULL_MOVE = 2;
        /// Null-move reduction was applied in this branch.
        const NULL_MOVE_REDUCTION = 4;
        /// Late-move reduction was applied in this branch.
        const LATE_MOVE_REDUCTION = 8;

        /// Flags that survive a recursive call.
        const INHERIT = Self::NULL_MOVE.bits
            | Self::NULL_MOVE_REDUCTION.bits
            | Self::LATE_MOVE_REDUCTION.bits;
        /// Each of these flags disables the null-move heuristics.
        const NULL_MOVE_DISABLE = Self::NULL_MOVE.bits
            | Self::NULL_MOVE_REDUCTION.bits
            | Self::CAPTURE.bits;
    }
}

/// Node kinds of the main search.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum NodeKind {
    Root,
    Pv,
    Simple,
}

impl NodeKind {
    #[inline(always)]
    fn is_pv(self) -> bool {
        self != NodeKind::Simple
    }

    /// The node kind a child enters after the first move improved alpha.
    #[inline(always)]
    fn child(self) -> NodeKind {
        match self {
            NodeKind::Simple => NodeKind::Simple,
            _ => NodeKind::Pv,
        }
    }
}

struct Frame {
    killers: KillerLine,
    best_move: Move,
}

/// One worker's search over a fixed position.
pub struct Job<'a> {
    pub id: usize,
    pub tt: &'a TranspositionTable,
    pub communicator: &'a JobCommunicator,
    pub results: &'a JobResults,
}

impl<'a> Job<'a> {
    /// Runs iterative deepening over `position` until the limits run out or
    /// the communicator is stopped. Only the first job to complete a depth
    /// publishes its result through `handler`.
    pub fn run(
        &self,
        position: &Position,
        limits: &SearchLimits,
        evaluator: &mut ScoreEvaluator,
        handler: &dyn SearchHandler,
    ) {
        // Apply the history moves, collecting the hashes seen on the way:
        // hashes seen twice are one repetition away from a draw.
        let mut board = position.first.clone();
        let mut single_repeat = RepetitionTable::new();
        let mut double_repeat = RepetitionTable::new();
        for &mov in position.moves.iter() {
            if !single_repeat.insert(board.hash()) {
                double_repeat.insert(board.hash());
            }
            move_make(&mut board, mov);
        }

        let mut searcher = Searcher {
            board: &mut board,
            tt: self.tt,
            comm: self.communicator,
            results: self.results,
            repetitions: double_repeat,
            limits: limits.clone(),
            evaluator,
            job_id: self.id,
            stack: (0..MAX_STACK_DEPTH)
                .map(|_| Frame {
                    killers: KillerLine::new(),
                    best_move: Move::null(),
                })
                .collect(),
            history: HistoryTable::new(),
            depth: 0,
            counter: 0,
            start_time: Instant::now(),
        };

        let max_depth = limits.depth.min(MAX_DEPTH);
        for depth in 1..=max_depth {
            let (score, best_move) = searcher.run(depth);
            if self.communicator.is_stopped() {
                return;
            }
            if self.communicator.finish_depth(depth) {
                // `best_move` stays null when the root position is already a
                // draw on the path; the runner falls back to a random legal
                // move in that case.
                self.results.set_best_move(depth, best_move);
                let pv = unwind_pv(searcher.board.clone(), best_move, self.tt);
                handler.on_result(SearchResult {
                    depth,
                    pv: &pv,
                    score,
                    bound: Bound::Exact,
                });
            }
        }

        self.communicator.stop();
    }
}

/// Follows the exact-bound transposition entries from `best_move` to rebuild
/// the principal variation. A repetition table guards the walk from looping
/// over a hash cycle.
pub fn unwind_pv(mut board: Board, best_move: Move, tt: &TranspositionTable) -> Vec<Move> {
    if best_move.is_null() {
        return vec![best_move];
    }
    let mut repetitions = RepetitionTable::new();
    repetitions.insert(board.hash());
    let mut pv = vec![best_move];
    move_make(&mut board, best_move);
    repetitions.insert(board.hash());
    loop {
        let data = tt.probe(board.hash());
        if !data.is_valid() || data.mov() == Move::null() || data.bound() != Bound::Exact {
            break;
        }
        // Refresh the entry, as it may come from an older epoch.
        tt.refresh(board.hash(), data);
        let mov = data.mov();
        if !mov.is_well_formed(board.side()) || !sofcheck::board::movegen::is_move_valid(&board, mov)
        {
            break;
        }
        move_make(&mut board, mov);
        if !repetitions.insert(board.hash()) {
            break;
        }
        pv.push(mov);
    }
    pv
}

struct Searcher<'a> {
    board: &'a mut Board,
    tt: &'a TranspositionTable,
    comm: &'a JobCommunicator,
    results: &'a JobResults,
    repetitions: RepetitionTable,
    limits: SearchLimits,
    evaluator: &'a mut ScoreEvaluator,
    job_id: usize,
    stack: Vec<Frame>,
    history: HistoryTable,
    depth: usize,
    counter: u64,
    start_time: Instant,
}

impl<'a> Searcher<'a> {
    /// One iterative-deepening step: a full-width search to `depth`.
    fn run(&mut self, depth: usize) -> (Value, Move) {
        self.depth = depth;
        let tag = ScoreTag::from_board(self.board);
        let score = self.search(
            NodeKind::Root,
            depth as i32,
            0,
            -SCORE_INF,
            SCORE_INF,
            &tag,
            Flags::empty(),
        );
        (score, self.stack[0].best_move)
    }

    /// Checks the cooperative stop conditions. Called after every recursive
    /// search; also polls the deadline every `STOP_POLL_MASK + 1` calls.
    fn must_stop(&mut self) -> bool {
        if self.comm.is_stopped() {
            return true;
        }
        self.counter += 1;
        if self.counter & STOP_POLL_MASK == 0 {
            if let Some(time) = self.limits.time {
                if self.start_time.elapsed() >= time {
                    self.comm.stop();
                    return true;
                }
            }
        }
        self.comm.depth() != self.depth
    }

    /// The search entry point wrapping [`do_search`] with the repetition
    /// bookkeeping: entering a position whose hash is already on the path is
    /// a draw, and the hash is guaranteed to be erased again on every exit
    /// path.
    ///
    /// [`do_search`]: #method.do_search
    fn search(
        &mut self,
        node: NodeKind,
        depth: i32,
        idepth: usize,
        alpha: Value,
        beta: Value,
        tag: &ScoreTag,
        flags: Flags,
    ) -> Value {
        self.tt.prefetch(self.board.hash());
        let hash = self.board.hash();
        if !self.repetitions.insert(hash) {
            return 0;
        }
        let score = self.do_search(node, depth, idepth, alpha, beta, tag, flags);
        debug_assert_eq!(self.board.hash(), hash);
        self.repetitions.erase(hash);
        score
    }

    fn do_search(
        &mut self,
        node: NodeKind,
        mut depth: i32,
        idepth: usize,
        mut alpha: Value,
        beta: Value,
        tag: &ScoreTag,
        mut flags: Flags,
    ) -> Value {
        let orig_alpha = alpha;
        let orig_beta = beta;
        self.stack[idepth].best_move = Move::null();

        // Draws by the 50-move rule and by bare material.
        if node != NodeKind::Root {
            if self.board.move_counter() >= 100 {
                return 0;
            }
            if self.board.is_insufficient_material() {
                return 0;
            }
        }

        // Dive into quiescence at the leaves, and also when the search stack
        // is about to overflow. The latter is unlikely but keeps deep
        // reduction chains from running off the stack.
        if depth <= 0 || idepth + 1 == MAX_STACK_DEPTH {
            if alpha >= SCORE_CHECKMATE_THRESHOLD {
                return alpha;
            }
            if beta <= -SCORE_CHECKMATE_THRESHOLD {
                return beta;
            }
            return self.quiescence_search(alpha, beta, tag);
        }

        // Probe the transposition table.
        let mut hash_move = Move::null();
        let tt_data = self.tt.probe(self.board.hash());
        if tt_data.is_valid() {
            self.results.inc(JobStat::TtHits);
            hash_move = tt_data.mov();
            // Deep 50-move-rule positions may repeat with different
            // histories, so stop trusting stored scores near the clock edge.
            if node != NodeKind::Root
                && tt_data.depth() >= depth
                && self.board.move_counter() < 90
            {
                let score = adjust_checkmate(tt_data.score(), idepth as i16);
                match tt_data.bound() {
                    Bound::Exact => {
                        self.stack[idepth].best_move = hash_move;
                        self.results.inc(JobStat::TtExactHits);
                        // Refresh the entry, as it may come from an older
                        // epoch.
                        self.tt.refresh(self.board.hash(), tt_data);
                        return score;
                    }
                    Bound::Lowerbound => {
                        if score >= beta {
                            return beta;
                        }
                    }
                    Bound::Upperbound => {
                        if alpha >= score {
                            return alpha;
                        }
                    }
                }
            }
        }

        let in_check = is_check(self.board);
        let mate_bounds =
            alpha <= -SCORE_CHECKMATE_THRESHOLD || beta >= SCORE_CHECKMATE_THRESHOLD;

        // Futility pruning: when the static evaluation beats beta by a solid
        // margin near the leaves, believe it.
        if !node.is_pv()
            && depth <= futility::MAX_DEPTH
            && !in_check
            && !mate_bounds
        {
            let threshold = beta.saturating_add(futility::MARGIN);
            if self.evaluator.eval_for_cur(self.board, tag) >= threshold {
                return beta;
            }
        }

        // Null-move heuristics, implemented as a reduction rather than
        // pruning: a fail-high of the null search shrinks the remaining
        // depth instead of cutting the branch, which is less prone to
        // zugzwang.
        let can_null_move = !node.is_pv()
            && depth >= null_move::MIN_DEPTH
            && !in_check
            && !mate_bounds
            && (flags & Flags::NULL_MOVE_DISABLE).is_empty();
        if can_null_move {
            let null = Move::null();
            let new_tag = tag.updated(self.board, null);
            let p = move_make(self.board, null);
            debug_assert!(was_move_legal(self.board));
            self.results.inc(JobStat::Nodes);
            let new_flags = (flags & Flags::INHERIT) | Flags::NULL_MOVE;
            let score = -self.search(
                NodeKind::Simple,
                depth - null_move::DEPTH_DEC,
                idepth + 1,
                -beta,
                -beta + 1,
                &new_tag,
                new_flags,
            );
            move_unmake(self.board, null, p);
            if self.must_stop() {
                return 0;
            }
            if score >= beta {
                depth -= null_move::REDUCTION_DEC;
                flags |= Flags::NULL_MOVE_REDUCTION;
                debug_assert!(depth > 0);
            }
        }

        // Iterate over the moves in the sorted order.
        let killers = self.stack[idepth].killers;
        let mut root_picker;
        let mut main_picker;
        enum PickerRef<'p> {
            Root(&'p mut RootMovePicker),
            Main(&'p mut MovePicker),
        }
        let mut picker = if node == NodeKind::Root {
            root_picker =
                RootMovePicker::new(self.board, hash_move, killers, &self.history, self.job_id);
            PickerRef::Root(&mut root_picker)
        } else {
            main_picker = MovePicker::new(hash_move, killers);
            PickerRef::Main(&mut main_picker)
        };

        let mut has_move = false;
        let mut num_history_moves = 0usize;
        loop {
            let (mov, stage) = match picker {
                PickerRef::Root(ref mut p) => (p.next(), MovePickerStage::Start),
                PickerRef::Main(ref mut p) => {
                    let mov = p.next(self.board, &self.history);
                    (mov, p.stage())
                }
            };
            if mov.is_invalid() {
                break;
            }
            if mov.is_null() {
                continue;
            }

            let is_capture = sofcheck::board::movegen::is_move_capture(self.board, mov);
            let new_tag = tag.updated(self.board, mov);
            let p = move_make(self.board, mov);
            if !was_move_legal(self.board) {
                move_unmake(self.board, mov, p);
                continue;
            }
            if node != NodeKind::Root && stage == MovePickerStage::History {
                num_history_moves += 1;
            }
            self.results.inc(JobStat::Nodes);
            let new_flags = (flags & Flags::INHERIT)
                | if is_capture {
                    Flags::CAPTURE
                } else {
                    Flags::empty()
                };

            // Late move reduction: the late quiet moves first get a shallow
            // null-window look; only a surprise improvement earns the full
            // search.
            if node != NodeKind::Root {
                let lmr_enabled = has_move
                    && !node.is_pv()
                    && depth >= late_move::MIN_DEPTH
                    && stage == MovePickerStage::History
                    && num_history_moves > late_move::MOVES_NO_REDUCE
                    && !is_check(self.board);
                if lmr_enabled {
                    let score = -self.search(
                        NodeKind::Simple,
                        depth - 1 - late_move::REDUCE_DEPTH,
                        idepth + 1,
                        -alpha - 1,
                        -alpha,
                        &new_tag,
                        new_flags | Flags::LATE_MOVE_REDUCTION,
                    );
                    if self.must_stop() {
                        move_unmake(self.board, mov, p);
                        return 0;
                    }
                    if score <= alpha {
                        move_unmake(self.board, mov, p);
                        continue;
                    }
                }
            }

            // Principal variation search: after the first move, siblings get
            // a null window, and only a fail-high earns the re-search.
            if has_move && beta != alpha + 1 {
                let score = -self.search(
                    NodeKind::Simple,
                    depth - 1,
                    idepth + 1,
                    -alpha - 1,
                    -alpha,
                    &new_tag,
                    new_flags,
                );
                if self.must_stop() {
                    move_unmake(self.board, mov, p);
                    return 0;
                }
                if score <= alpha {
                    move_unmake(self.board, mov, p);
                    continue;
                }
            }
            has_move = true;
            let score = -self.search(
                node.child(),
                depth - 1,
                idepth + 1,
                -beta,
                -alpha,
                &new_tag,
                new_flags,
            );
            move_unmake(self.board, mov, p);
            if self.must_stop() {
                return 0;
            }
            if score > alpha {
                alpha = score;
                self.stack[idepth].best_move = mov;
            }
            if alpha >= beta {
                if node != NodeKind::Root && stage >= MovePickerStage::Killer {
                    self.stack[idepth].killers.add(mov);
                    self.history[mov] += (depth as u64) * (depth as u64);
                }
                self.tt_store(idepth, depth, orig_alpha, orig_beta, node, beta);
                return beta;
            }
        }

        // No legal moves: checkmate or stalemate.
        if !has_move {
            return if is_check(self.board) {
                score_checkmate_lose(idepth as i16)
            } else {
                0
            };
        }

        self.tt_store(idepth, depth, orig_alpha, orig_beta, node, alpha);
        alpha
    }

    // Stores the node result with the bound determined by the original
    // window. Mate distances are made position-relative before storing.
    fn tt_store(
        &self,
        idepth: usize,
        depth: i32,
        orig_alpha: Value,
        orig_beta: Value,
        node: NodeKind,
        mut score: Value,
    ) {
        let mut bound = Bound::Exact;
        if score <= orig_alpha {
            score = orig_alpha;
            bound = Bound::Upperbound;
        }
        if score >= orig_beta {
            score = orig_beta;
            bound = Bound::Lowerbound;
        }
        score = adjust_checkmate(score, -(idepth as i16));
        let data = Data::new(
            self.stack[idepth].best_move,
            score,
            depth,
            bound,
            node.is_pv(),
        );
        self.tt.store(self.board.hash(), data);
    }

    fn quiescence_search(&mut self, mut alpha: Value, beta: Value, tag: &ScoreTag) -> Value {
        if self.board.is_insufficient_material() {
            return 0;
        }

        let eval_score = self.evaluator.eval_for_cur(self.board, tag);
        alpha = alpha.max(eval_score);
        if alpha >= beta {
            return beta;
        }

        let mut picker = QuiescenceMovePicker::new(self.board);
        loop {
            let mov = picker.next(self.board);
            if mov.is_invalid() {
                break;
            }
            if mov.is_null() {
                continue;
            }
            let new_tag = tag.updated(self.board, mov);
            let p = move_make(self.board, mov);
            if !was_move_legal(self.board) {
                move_unmake(self.board, mov, p);
                continue;
            }
            self.results.inc(JobStat::Nodes);
            let score = -self.quiescence_search(-beta, -alpha, &new_tag);
            move_unmake(self.board, mov, p);
            if self.must_stop() {
                return 0;
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                return beta;
            }
        }

        alpha
    }
}

/// Picks a uniformly random legal move; the runner's last resort when no
/// depth completed before the stop.
pub fn random_legal_move(board: &Board) -> Move {
    use rand::seq::SliceRandom;

    let mut list = MoveList::new();
    MoveGen::new(board).gen_all(&mut list);
    let legal: Vec<Move> = list
        .iter()
        .cloned()
        .filter(|&m| is_move_legal(board, m))
        .collect();
    legal
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_else(Move::null)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullHandler;

    impl SearchHandler for NullHandler {
        fn on_result(&self, _result: SearchResult) {}
    }

    fn search_position(fen: &str, depth: usize) -> (Move, usize) {
        sofcheck::init();
        let board = Board::from_fen(fen).unwrap();
        let position = Position::from_moves(board, Vec::new());
        let tt = TranspositionTable::with_size(1 << 20);
        let comm = JobCommunicator::new();
        let results = JobResults::new();
        let mut evaluator = ScoreEvaluator::new();
        let job = Job {
            id: 0,
            tt: &tt,
            communicator: &comm,
            results: &results,
        };
        job.run(
            &position,
            &SearchLimits::with_fixed_depth(depth),
            &mut evaluator,
            &NullHandler,
        );
        (results.best_move(), results.depth())
    }

    #[test]
    fn finds_mate_in_one() {
        let (best, depth) = search_position("4k3/8/4K3/8/8/8/8/7R w - - 0 1", 3);
        assert!(depth >= 1);
        assert_eq!(best.to_string(), "h1h8");
    }

    #[test]
    fn grabs_a_hanging_queen() {
        let (best, _) = search_position("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1", 3);
        assert_eq!(best.to_string(), "e4d5");
    }

    #[test]
    fn common_prefix_counts_shared_moves() {
        sofcheck::init();
        let base = Board::initial();
        let mut list = MoveList::new();
        MoveGen::new(&base).gen_all(&mut list);
        let m1 = list[0];
        let m2 = list[1];
        let p1 = Position::from_moves(base.clone(), vec![m1, m2]);
        let p2 = Position::from_moves(base.clone(), vec![m1]);
        assert_eq!(common_prefix(&p1, &p2), Some(1));
        assert_eq!(common_prefix(&p1, &p1), Some(2));
        let other = Position::from_moves(
            Board::from_fen("4k3/8/4K3/8/8/8/8/7R w - - 0 1").unwrap(),
            Vec::new(),
        );
        assert_eq!(common_prefix(&p1, &other), None);
    }

    #[test]
    fn repetition_on_path_scores_zero() {
        sofcheck::init();
        // Shuffle the knights back and forth twice; any further search must
        // see the draw.
        let base = Board::initial();
        let mut moves = Vec::new();
        let mut b = base.clone();
        for token in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"].iter() {
            let mov = sofcheck::core::piece_move::move_parse(token, &b);
            assert!(!mov.is_invalid());
            move_make(&mut b, mov);
            moves.push(mov);
        }
        let position = Position::from_moves(base, moves);
        let tt = TranspositionTable::with_size(1 << 20);
        let comm = JobCommunicator::new();
        let results = JobResults::new();
        let mut evaluator = ScoreEvaluator::new();
        let job = Job {
            id: 0,
            tt: &tt,
            communicator: &comm,
            results: &results,
        };

        struct Capture(std::sync::Mutex<Vec<Value>>);
        impl SearchHandler for Capture {
            fn on_result(&self, result: SearchResult) {
                self.0.lock().unwrap().push(result.score);
            }
        }
        let capture = Capture(std::sync::Mutex::new(Vec::new()));
        job.run(
            &position,
            &SearchLimits::with_fixed_depth(3),
            &mut evaluator,
            &capture,
        );
        let scores = capture.0.lock().unwrap();
        assert!(!scores.is_empty());
        // The position repeated twice already; the draw score shows up.
        assert!(scores.iter().any(|&s| s == 0), "scores were {:?}", scores);
    }
}
