//! # Failure policies for dispatch.
//!
//! [`FailurePolicy`] decides what happens to a `fire` call after a listener's handler
//! body returned an error. Resolution failures (missing handler, wrong event) and
//! panics always abort; only body errors are subject to the policy.
//!
//! ```text
//! FailurePolicy::Report  → report FailureEvent, continue with next listener (default)
//! FailurePolicy::Strict  → report FailureEvent, abort with DispatchError::HandlerFailed
//! ```

/// Policy applied when a handler body returns `Err`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the failure and keep dispatching to the remaining listeners (default).
    Report,
    /// Report the failure, then abort the whole `fire` call.
    Strict,
}

impl FailurePolicy {
    /// True if a failed handler body aborts dispatch.
    #[inline]
    pub fn aborts_on_handler_error(&self) -> bool {
        matches!(self, FailurePolicy::Strict)
    }
}

impl Default for FailurePolicy {
    /// Returns [`FailurePolicy::Report`].
    fn default() -> Self {
        FailurePolicy::Report
    }
}
