//! The job runner: drives N parallel search jobs over a shared transposition
//! table, enforces the limits, reports progress, and picks the final best
//! move.
//!
//! The parallelization is "lazy SMP": the jobs are independent searchers on
//! the same position which communicate only through the transposition table
//! and the shared depth counter, with the root move order perturbed per job
//! so they do not duplicate each other's work.

use crate::search::{
    common_prefix, random_legal_move, Job, JobResults, JobStat, Position, SearchHandler,
    SearchResult,
};
use crate::sync::JobCommunicator;
use crate::time::SearchLimits;
use crate::uci::Server;

use sofcheck::eval::ScoreEvaluator;
use sofcheck::tools::tt::TranspositionTable;
use sofcheck::Move;

use crossbeam_utils::thread as crossbeam_thread;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Default number of search jobs.
pub const DEFAULT_NUM_JOBS: usize = 1;

/// Interval of the control thread's wake-ups.
const CONTROL_TICK: Duration = Duration::from_millis(30);

/// How often progress info is sent to the front end.
const PROGRESS_INTERVAL: Duration = Duration::from_secs(3);

/// Position edit distances above this reset the aging instead of growing it.
const EPOCH_GROW_CLAMP: usize = 32;

// State the search owns while it is running. Config changes need the lock,
// which the main search thread holds for the whole search; this is the
// "cannot apply config while searching" rule expressed as ownership.
struct SearchState {
    tt: TranspositionTable,
    evaluators: Vec<ScoreEvaluator>,
}

/// Runs multiple search jobs simultaneously and controls them.
pub struct JobRunner {
    server: Arc<dyn Server>,
    comm: Arc<JobCommunicator>,
    state: Arc<Mutex<SearchState>>,
    search_active: Arc<AtomicBool>,
    debug: Arc<AtomicBool>,
    main_thread: Option<JoinHandle<()>>,

    num_jobs: usize,
    hash_size: Option<usize>,
    need_clear_hash: bool,
    need_new_game: bool,
    last_position: Option<Position>,
}

impl JobRunner {
    pub fn new(server: Arc<dyn Server>) -> JobRunner {
        JobRunner {
            server,
            comm: Arc::new(JobCommunicator::new()),
            state: Arc::new(Mutex::new(SearchState {
                tt: TranspositionTable::new(),
                evaluators: (0..DEFAULT_NUM_JOBS).map(|_| ScoreEvaluator::new()).collect(),
            })),
            search_active: Arc::new(AtomicBool::new(false)),
            debug: Arc::new(AtomicBool::new(false)),
            main_thread: None,
            num_jobs: DEFAULT_NUM_JOBS,
            hash_size: None,
            need_clear_hash: false,
            need_new_game: false,
            last_position: None,
        }
    }

    /// Returns the number of jobs the next search will run.
    pub fn num_jobs(&self) -> usize {
        self.num_jobs
    }

    /// Sets the number of jobs. Applied on the next search.
    pub fn set_num_jobs(&mut self, jobs: usize) {
        self.num_jobs = jobs.max(1);
    }

    /// Requests a new hash table size in bytes. Deferred while a search is
    /// running.
    pub fn set_hash_size(&mut self, bytes: usize) {
        self.hash_size = Some(bytes);
        self.try_apply_config();
    }

    /// Requests a hash table wipe. Deferred while a search is running.
    pub fn clear_hash(&mut self) {
        self.need_clear_hash = true;
        self.try_apply_config();
    }

    /// Signals that the following searches belong to a new game.
    pub fn new_game(&mut self) {
        self.need_new_game = true;
        self.try_apply_config();
    }

    /// Enables or disables debug output.
    pub fn set_debug_mode(&mut self, enable: bool) {
        self.debug.store(enable, Ordering::Release);
    }

    pub fn is_debug_mode(&self) -> bool {
        self.debug.load(Ordering::Acquire)
    }

    /// Returns `true` while a search is in progress.
    pub fn is_searching(&self) -> bool {
        self.search_active.load(Ordering::Acquire)
    }

    /// Stops the current search asynchronously; the jobs may run for a short
    /// moment after this returns.
    pub fn stop(&mut self) {
        self.comm.stop();
    }

    /// Stops the search and waits until it has really stopped.
    pub fn join(&mut self) {
        self.comm.stop();
        if let Some(handle) = self.main_thread.take() {
            handle.join().unwrap_or_else(|_| {
                self.server.send_string("search thread panicked");
            });
        }
    }

    // Applies deferred configuration if no search holds the state. Never
    // blocks: a running search keeps the lock, and the work stays deferred.
    fn try_apply_config(&mut self) {
        if self.is_searching() {
            return;
        }
        let state = Arc::clone(&self.state);
        let mut state = match state.try_lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        // Table maintenance parallelizes over the whole machine, not just
        // the configured search threads.
        let workers = num_cpus::get().max(1);
        if let Some(bytes) = self.hash_size.take() {
            state.tt.resize(bytes, false, workers);
        }
        if self.need_clear_hash {
            state.tt.clear(workers);
            self.need_clear_hash = false;
        }
        if self.need_new_game {
            state.tt.reset_epoch();
            self.last_position = None;
            self.need_new_game = false;
        }
        while state.evaluators.len() < self.num_jobs {
            state.evaluators.push(ScoreEvaluator::new());
        }
        state.evaluators.truncate(self.num_jobs);
    }

    /// Starts a search. A search already in progress is stopped and joined
    /// first.
    pub fn start(&mut self, position: Position, limits: SearchLimits) {
        self.join();
        self.try_apply_config();

        {
            // Age the table according to how far the new position is from
            // the previous one, so entries from related searches stay warm.
            let mut state = self.state.lock().unwrap();
            let grow = match self.last_position.as_ref() {
                Some(last) => match common_prefix(last, &position) {
                    Some(prefix) => {
                        (last.moves.len() - prefix) + (position.moves.len() - prefix)
                    }
                    None => EPOCH_GROW_CLAMP,
                },
                None => 1,
            };
            if grow >= EPOCH_GROW_CLAMP {
                state.tt.reset_epoch();
            } else {
                state.tt.grow_epoch(grow.max(1) as u8);
            }
        }
        self.last_position = Some(position.clone());

        self.comm.reset();
        self.search_active.store(true, Ordering::Release);

        let server = Arc::clone(&self.server);
        let comm = Arc::clone(&self.comm);
        let state = Arc::clone(&self.state);
        let search_active = Arc::clone(&self.search_active);
        let debug = Arc::clone(&self.debug);
        let num_jobs = self.num_jobs;

        self.main_thread = Some(std::thread::spawn(move || {
            run_main_thread(server, comm, state, debug, num_jobs, position, limits);
            search_active.store(false, Ordering::Release);
        }));
    }
}

impl Drop for JobRunner {
    fn drop(&mut self) {
        self.join();
    }
}

// Relays per-depth results from the winning job to the front end.
struct ResultRelay<'a> {
    server: &'a dyn Server,
    start: Instant,
}

impl<'a> SearchHandler for ResultRelay<'a> {
    fn on_result(&self, result: SearchResult) {
        self.server
            .send_result(result.depth, self.start.elapsed(), result.pv, result.score, result.bound);
    }
}

fn run_main_thread(
    server: Arc<dyn Server>,
    comm: Arc<JobCommunicator>,
    state: Arc<Mutex<SearchState>>,
    debug: Arc<AtomicBool>,
    num_jobs: usize,
    position: Position,
    limits: SearchLimits,
) {
    let mut state = state.lock().unwrap();
    let state = &mut *state;
    let start = comm.start_time();
    // Split the state so the workers can borrow the evaluators mutably
    // while everyone shares the table.
    let tt: &TranspositionTable = &state.tt;
    let evaluators = &mut state.evaluators;

    let results: Vec<JobResults> = (0..num_jobs).map(|_| JobResults::new()).collect();
    let relay = ResultRelay {
        server: &*server,
        start,
    };

    crossbeam_thread::scope(|scope| {
        for (id, evaluator) in evaluators.iter_mut().enumerate().take(num_jobs) {
            let job = Job {
                id,
                tt,
                communicator: &comm,
                results: &results[id],
            };
            let position = &position;
            let limits = &limits;
            let relay = &relay;
            scope.spawn(move |_| {
                job.run(position, limits, evaluator, relay);
            });
        }

        // Control loop: wake up frequently, watch the limits, report
        // progress every few seconds.
        let mut last_progress = start;
        loop {
            let tick = match limits.time {
                Some(total) => {
                    let left = total.checked_sub(start.elapsed()).unwrap_or_default();
                    (left + Duration::from_micros(100)).min(CONTROL_TICK)
                }
                None => CONTROL_TICK,
            };
            let stopped = comm.wait(tick);

            let nodes: u64 = results.iter().map(|r| r.get(JobStat::Nodes)).sum();
            if nodes >= limits.nodes {
                comm.stop();
            }
            if let Some(total) = limits.time {
                if start.elapsed() >= total {
                    comm.stop();
                }
            }

            if stopped || comm.is_stopped() {
                break;
            }

            if last_progress.elapsed() >= PROGRESS_INTERVAL {
                last_progress = Instant::now();
                server.send_nodes(nodes, start.elapsed());
                server.send_hashfull(tt.hash_full());
                if debug.load(Ordering::Acquire) {
                    let tt_hits: u64 = results.iter().map(|r| r.get(JobStat::TtHits)).sum();
                    let tt_exact: u64 =
                        results.iter().map(|r| r.get(JobStat::TtExactHits)).sum();
                    server.send_string(&format!(
                        "nodes {} ttHits {} ttExactHits {} hashfull {}",
                        nodes,
                        tt_hits,
                        tt_exact,
                        tt.hash_full()
                    ));
                }
            }
        }
    })
    .unwrap_or_else(|_| server.send_string("search worker panicked"));

    // All the jobs are done; pick the result of the deepest one.
    let mut best_move = Move::null();
    let mut best_depth = 0;
    for r in results.iter() {
        let depth = r.depth();
        let mov = r.best_move();
        if depth > best_depth && !mov.is_null() {
            best_depth = depth;
            best_move = mov;
        }
    }
    if best_move.is_null() {
        // No depth completed in time; any legal move beats forfeiting.
        best_move = random_legal_move(&position.last);
    }

    let nodes: u64 = results.iter().map(|r| r.get(JobStat::Nodes)).sum();
    server.send_nodes(nodes, start.elapsed());
    server.send_best_move(best_move);
}
