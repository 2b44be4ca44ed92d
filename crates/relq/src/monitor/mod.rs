//! Statement monitoring.
//!
//! Every statement a [`crate::Connection`] executes is reported to its
//! [`QueryMonitor`]. The default monitor, [`TracingMonitor`], emits one `tracing`
//! event per statement under the `relq.sql` target.
//!
//! ```
//! use relq::monitor::{CompositeMonitor, StatsMonitor, TracingMonitor};
//! use std::sync::Arc;
//!
//! let stats = Arc::new(StatsMonitor::new());
//! let monitor = CompositeMonitor::new()
//!     .add(TracingMonitor::new())
//!     .add_arc(stats.clone());
//! # let _ = monitor;
//! assert_eq!(stats.stats().total_queries, 0);
//! ```

mod monitors;
mod types;

#[cfg(test)]
mod tests;

pub use monitors::{CompositeMonitor, NoopMonitor, QueryStats, StatsMonitor, TracingMonitor};
pub use types::{QueryContext, QueryMonitor, QueryResult, QueryType};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
