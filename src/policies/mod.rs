//! Dispatch policies.
//!
//! ## Contents
//! - [`FailurePolicy`] whether a failing handler body aborts the `fire` call
//!
//! ## Quick wiring
//! ```text
//! Config { failure_policy: FailurePolicy, max_failure_depth, .. }
//!      └─► core::dispatcher::Dispatcher uses:
//!           - failure_policy to continue/abort after HandlerFailed
//!           - max_failure_depth to bound failure-report recursion
//! ```

mod failure;

pub use failure::FailurePolicy;
