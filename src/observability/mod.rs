//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and middleware produce:
//!     → logging.rs (request and todo channel entries)
//!     → metrics.rs (counters, gauges, histograms)
//!     → tracing (process events, HTTP spans)
//!
//! Consumers:
//!     → logs/requests.log, logs/todos.log, stdout echo
//!     → Metrics endpoint (Prometheus scrape)
//!     → tracing subscriber on stderr
//! ```
//!
//! # Design Decisions
//! - Every entry of one request carries the same request number
//! - Channel levels can change at runtime; tracing filter is fixed at startup
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the process-wide tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
