//! # FailureLogger: default sink for failure reports
//!
//! Installed by [`Dispatcher::new`](crate::Dispatcher::new) as the first listener of
//! [`FailureEvent`]. Logs every report at `ERROR` through `tracing`, so failures are
//! visible without the dispatcher depending on a logger itself.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! ERROR typebus::listeners::log: listener failed origin_class="app::Audit" origin_method="on_saved" kind=handler_failed event="app::Saved" seq=3 error=disk full
//! ```

use crate::events::FailureEvent;
use crate::listeners::{Handler, Listener};

/// Failure report writer.
#[derive(Debug, Default)]
pub struct FailureLogger;

impl FailureLogger {
    /// Construct a new [`FailureLogger`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn on_failure(&self, e: &FailureEvent) -> anyhow::Result<()> {
        tracing::error!(
            origin_class = e.origin_class(),
            origin_method = e.origin_method(),
            kind = %e.kind,
            event = %e.event_type,
            seq = e.seq,
            error = %e.cause(),
            "listener failed"
        );
        Ok(())
    }
}

impl Listener<FailureEvent> for FailureLogger {
    fn handler(&self, method: &str) -> Option<Handler<Self, FailureEvent>> {
        match method {
            "on_failure" => Some(Self::on_failure),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        "FailureLogger"
    }
}
