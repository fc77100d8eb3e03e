use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// One profiled statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileEntry {
    /// Caller-supplied label for where the statement came from.
    pub context: String,
    /// Statement text as sent to the backend.
    pub query: String,
    /// Wall-clock execution time in milliseconds.
    pub elapsed_ms: f64,
}

impl ProfileEntry {
    pub fn new(context: impl Into<String>, query: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            context: context.into(),
            query: query.into(),
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        }
    }
}

/// Append-only, thread-safe log of profiled statements.
#[derive(Debug, Default)]
pub struct ProfileLog {
    entries: Mutex<Vec<ProfileEntry>>,
}

impl ProfileLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&self, entry: ProfileEntry) {
        self.lock().push(entry);
    }

    /// Copy of all entries in append order.
    pub fn snapshot(&self) -> Vec<ProfileEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sum of all recorded execution times.
    pub fn total_elapsed_ms(&self) -> f64 {
        self.lock().iter().map(|e| e.elapsed_ms).sum()
    }

    // A panic while holding the lock cannot leave a half-pushed Vec, so a
    // poisoned log is still consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<ProfileEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Plain-text profile summary for one database connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSummary {
    pub database_index: usize,
    pub profiling_enabled: bool,
    pub query_count: usize,
    pub total_elapsed_ms: f64,
}

impl fmt::Display for ProfileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.profiling_enabled {
            return write!(
                f,
                "Profiling was not enabled for this database connection (#{}).",
                self.database_index
            );
        }
        write!(
            f,
            "PROFILING INFORMATION FOR DATABASE CONNECTION #{}: ",
            self.database_index
        )?;
        match self.query_count {
            0 => f.write_str("No queries performed."),
            1 => f.write_str("1 query performed."),
            n => write!(f, "{n} queries performed."),
        }
    }
}
