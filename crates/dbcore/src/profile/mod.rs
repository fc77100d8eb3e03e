//! Per-connection statement profiling.
//!
//! When profiling is enabled on a [`Database`](crate::Database), every
//! successful `query` / `non_query` appends a [`ProfileEntry`] to the
//! connection's [`ProfileLog`]. The log only grows; it is dropped with the
//! connection.
//!
//! # Example
//!
//! ```rust,ignore
//! db.enable_profiling();
//! db.non_query_tagged("UPDATE users SET active = 1", "nightly-sync").await?;
//!
//! for entry in db.profile() {
//!     println!("{} {:.3}ms {}", entry.context, entry.elapsed_ms, entry.query);
//! }
//! println!("{}", db.profile_summary());
//! ```

mod timer;
mod types;


pub use timer::{TimerRegistry, timer_name};
pub use types::{ProfileEntry, ProfileLog, ProfileSummary};
