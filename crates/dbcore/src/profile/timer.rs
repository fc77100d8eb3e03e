use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A fresh, collision-resistant timer name for one profiled execution.
pub fn timer_name() -> String {
    format!("query-exec-{}", uuid::Uuid::new_v4())
}

/// Named stopwatches with start / stop / reset.
///
/// Names only need to be unique among timers running at the same time;
/// [`timer_name`] produces such names for concurrent executions.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    running: Mutex<HashMap<String, Instant>>,
    stopped: Mutex<HashMap<String, Duration>>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the timer `name`.
    pub fn start(&self, name: &str) {
        lock(&self.stopped).remove(name);
        lock(&self.running).insert(name.to_string(), Instant::now());
    }

    /// Stop the timer `name` and return its elapsed time.
    ///
    /// Returns `None` if the timer was never started. A stopped timer keeps
    /// its reading until [`reset`](Self::reset).
    pub fn stop(&self, name: &str) -> Option<Duration> {
        let started = lock(&self.running).remove(name)?;
        let elapsed = started.elapsed();
        lock(&self.stopped).insert(name.to_string(), elapsed);
        Some(elapsed)
    }

    /// Reading of a stopped timer.
    pub fn elapsed(&self, name: &str) -> Option<Duration> {
        lock(&self.stopped).get(name).copied()
    }

    /// Discard the timer `name`, running or stopped.
    pub fn reset(&self, name: &str) {
        lock(&self.running).remove(name);
        lock(&self.stopped).remove(name);
    }

    /// Number of timers currently running or holding a reading.
    pub fn len(&self) -> usize {
        lock(&self.running).len() + lock(&self.stopped).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
