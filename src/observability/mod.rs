//! Observability for the select pipeline
//!
//! - Structured logging through `tracing`; every line carries an `event`
//!   field naming one of the typed `Event`s
//! - Counters in `MetricsRegistry`
//! - One span per select call, keyed by request id
//!
//! Observability is read-only: nothing here influences what a select
//! returns.

mod events;
mod metrics;

pub use events::Event;
pub use metrics::{MetricsRegistry, MetricsSnapshot};

use tracing::Span;
use uuid::Uuid;

/// Span wrapping one select call
pub fn select_span(request_id: Uuid) -> Span {
    tracing::info_span!("select", request_id = %request_id)
}
