//! # Function-backed listener (`ListenerFn`)
//!
//! [`ListenerFn`] wraps a closure `F: Fn(&E) -> anyhow::Result<()>` and answers to a
//! single handler name: [`Event::HANDLER`] by default, or a custom one via
//! [`ListenerFn::named`].
//!
//! Identity is still per allocation: wrapping the same closure twice yields two
//! distinct listeners.
//!
//! ## Example
//! ```rust
//! use typebus::{Dispatcher, Event, ListenerFn};
//!
//! #[derive(Debug)]
//! struct Saved { path: String }
//! impl Event for Saved {
//!     const HANDLER: &'static str = "on_saved";
//! }
//!
//! let dispatcher = Dispatcher::new();
//! let printer = ListenerFn::arc(|e: &Saved| {
//!     println!("saved {}", e.path);
//!     Ok(())
//! });
//! dispatcher.register(&printer);
//! dispatcher.fire(&Saved { path: "a.txt".into() }).unwrap();
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::events::Event;
use crate::listeners::{Handler, Listener};

/// Closure-backed listener for events of type `E`.
pub struct ListenerFn<E, F> {
    method: &'static str,
    callback: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> ListenerFn<E, F>
where
    E: Event,
    F: Fn(&E) -> anyhow::Result<()> + Send + Sync + 'static,
{
    /// Creates a listener answering to `E::HANDLER`.
    pub fn new(callback: F) -> Self {
        Self::named(E::HANDLER, callback)
    }

    /// Creates a listener answering to `method`.
    pub fn named(method: &'static str, callback: F) -> Self {
        Self {
            method,
            callback,
            _event: PhantomData,
        }
    }

    /// Creates the listener and returns it as a shared handle, ready to register.
    pub fn arc(callback: F) -> Arc<Self> {
        Arc::new(Self::new(callback))
    }

    /// Handler name this listener answers to.
    pub fn method(&self) -> &'static str {
        self.method
    }

    fn call(&self, event: &E) -> anyhow::Result<()> {
        (self.callback)(event)
    }
}

impl<E, F> Listener<E> for ListenerFn<E, F>
where
    E: Event,
    F: Fn(&E) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn handler(&self, method: &str) -> Option<Handler<Self, E>> {
        (method == self.method).then_some(Self::call as Handler<Self, E>)
    }

    fn name(&self) -> &'static str {
        "ListenerFn"
    }
}

impl<E, F> fmt::Debug for ListenerFn<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerFn")
            .field("event", &std::any::type_name::<E>())
            .field("method", &self.method)
            .finish()
    }
}
