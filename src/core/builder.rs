use std::sync::Arc;

use crate::core::{Config, Dispatcher};
use crate::events::FailureEvent;
use crate::listeners::Listener;
use crate::policies::FailurePolicy;

type Install = Box<dyn FnOnce(&Dispatcher) + Send>;

/// Builder for constructing a [`Dispatcher`] with optional features.
pub struct DispatcherBuilder {
    cfg: Config,
    failure_listeners: Vec<Install>,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            failure_listeners: Vec::new(),
        }
    }

    /// Sets the policy for handler body errors.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.cfg.failure_policy = policy;
        self
    }

    /// Sets the maximum nesting of failure reports (`0` = unbounded).
    pub fn with_max_failure_depth(mut self, depth: usize) -> Self {
        self.cfg.max_failure_depth = depth;
        self
    }

    /// Skips installing the built-in [`FailureLogger`](crate::FailureLogger).
    pub fn without_failure_logger(mut self) -> Self {
        self.cfg.install_failure_logger = false;
        self
    }

    /// Registers `listener` for failure reports right after construction.
    ///
    /// Listeners are registered in call order, after the built-in logger (if any).
    pub fn with_failure_listener<L: Listener<FailureEvent>>(mut self, listener: Arc<L>) -> Self {
        self.failure_listeners.push(Box::new(move |d: &Dispatcher| {
            d.register(&listener);
        }));
        self
    }

    /// Builds the dispatcher.
    pub fn build(self) -> Dispatcher {
        let dispatcher = Dispatcher::with_config(self.cfg);
        for install in self.failure_listeners {
            install(&dispatcher);
        }
        dispatcher
    }
}
