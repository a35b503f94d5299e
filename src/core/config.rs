//! # Dispatcher configuration.
//!
//! Provides [`Config`], the settings a [`Dispatcher`](crate::Dispatcher) is built with.
//!
//! ## Sentinel values
//! - `max_failure_depth = 0` → unbounded failure-report recursion

use crate::policies::FailurePolicy;

/// Configuration for a dispatcher.
///
/// ## Field semantics
/// - `failure_policy`: what a failed handler body does to the current `fire` call
/// - `max_failure_depth`: how many failure reports may nest (`0` = unbounded)
/// - `install_failure_logger`: register [`FailureLogger`](crate::FailureLogger) at construction
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over checking sentinels directly.
#[derive(Clone, Debug)]
pub struct Config {
    /// Policy for handler body errors.
    pub failure_policy: FailurePolicy,

    /// Maximum nesting of failure reports.
    ///
    /// A failure raised while a `FailureEvent` is being dispatched is reported again
    /// through the dispatcher. Past this depth the report is logged directly instead
    /// of being redispatched.
    ///
    /// - `0` = unbounded
    /// - `n > 0` = at most `n` nested reports
    pub max_failure_depth: usize,

    /// Register the built-in [`FailureLogger`](crate::FailureLogger) as the first
    /// `FailureEvent` listener.
    pub install_failure_logger: bool,
}

impl Config {
    /// Returns the failure-report depth limit as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` nested reports
    #[inline]
    pub fn failure_depth_limit(&self) -> Option<usize> {
        if self.max_failure_depth == 0 {
            None
        } else {
            Some(self.max_failure_depth)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `failure_policy = FailurePolicy::Report`
    /// - `max_failure_depth = 8`
    /// - `install_failure_logger = true`
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            max_failure_depth: 8,
            install_failure_logger: true,
        }
    }
}
