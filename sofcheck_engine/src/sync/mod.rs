//! Synchronization between the search jobs and the control thread.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Shared state between the running jobs and the control thread: the stop
/// flag, the globally claimed search depth, and the condition variable the
/// control thread sleeps on.
pub struct JobCommunicator {
    stopped: AtomicUsize,
    depth: AtomicUsize,
    start_time: Mutex<Instant>,
    stop_lock: Mutex<()>,
    stop_event: Condvar,
}

impl JobCommunicator {
    pub fn new() -> JobCommunicator {
        JobCommunicator {
            stopped: AtomicUsize::new(0),
            depth: AtomicUsize::new(1),
            start_time: Mutex::new(Instant::now()),
            stop_lock: Mutex::new(()),
            stop_event: Condvar::new(),
        }
    }

    /// Tells all the jobs that they must stop the search.
    pub fn stop(&self) {
        if self
            .stopped
            .compare_exchange(0, 1, Ordering::Release, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        // Take and drop `stop_lock` so a waiter that already tested the flag
        // is either inside `wait` (and will get the notification) or past the
        // lock (and will re-test the flag). Without this fence the notify may
        // fire between the test and the sleep and get lost.
        drop(self.stop_lock.lock().unwrap());
        self.stop_event.notify_all();
    }

    /// Returns `true` if the jobs must stop the search.
    #[inline(always)]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire) != 0
    }

    /// The depth the jobs should currently search at.
    #[inline(always)]
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    /// Indicates that a job finished searching depth `depth`. Returns `true`
    /// for the single job that was first to do so.
    pub fn finish_depth(&self, depth: usize) -> bool {
        self.depth
            .compare_exchange(depth, depth + 1, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }

    /// The instant the current search started.
    pub fn start_time(&self) -> Instant {
        *self.start_time.lock().unwrap()
    }

    /// Waits until `stop()` is called or `time` passes, whichever comes
    /// first; may also wake spuriously earlier. Returns whether the search
    /// was stopped.
    pub fn wait(&self, time: Duration) -> bool {
        let guard = self.stop_lock.lock().unwrap();
        if self.is_stopped() {
            return true;
        }
        let _unused = self.stop_event.wait_timeout(guard, time).unwrap();
        self.is_stopped()
    }

    /// Resets the communicator for a new search. Must not be called while
    /// jobs are running.
    pub fn reset(&self) {
        self.depth.store(1, Ordering::Relaxed);
        self.stopped.store(0, Ordering::Relaxed);
        *self.start_time.lock().unwrap() = Instant::now();
    }
}

impl Default for JobCommunicator {
    fn default() -> Self {
        JobCommunicator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn finish_depth_has_one_winner() {
        let comm = JobCommunicator::new();
        assert_eq!(comm.depth(), 1);
        assert!(comm.finish_depth(1));
        assert!(!comm.finish_depth(1));
        assert_eq!(comm.depth(), 2);
    }

    #[test]
    fn stop_wakes_waiter() {
        let comm = Arc::new(JobCommunicator::new());
        let comm2 = Arc::clone(&comm);
        let waiter = thread::spawn(move || comm2.wait(Duration::from_secs(30)));
        thread::sleep(Duration::from_millis(20));
        comm.stop();
        assert!(waiter.join().unwrap());
        assert!(comm.is_stopped());
    }

    #[test]
    fn wait_times_out_without_stop() {
        let comm = JobCommunicator::new();
        assert!(!comm.wait(Duration::from_millis(5)));
    }

    #[test]
    fn reset_rearms_the_flag() {
        let comm = JobCommunicator::new();
        comm.stop();
        assert!(comm.is_stopped());
        comm.reset();
        assert!(!comm.is_stopped());
        assert_eq!(comm.depth(), 1);
    }
}
