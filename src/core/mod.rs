//! Dispatch core: registry, dispatcher and their configuration.
//!
//! The public API from this module is [`Dispatcher`] (with its [`DispatcherBuilder`]
//! and [`Config`]) and the [`Registry`] it owns.
//!
//! Internal modules:
//! - [`binding`]: type-erased listener registrations and guarded invocation;
//! - [`registry`]: event type → ordered listener list, behind one reentrant lock;
//! - [`dispatcher`]: fire, failure classification and failure reporting;
//! - [`builder`]: optional construction knobs;
//! - [`config`]: dispatcher settings.

mod binding;
mod builder;
mod config;
mod dispatcher;
mod registry;

pub use builder::DispatcherBuilder;
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use registry::Registry;
