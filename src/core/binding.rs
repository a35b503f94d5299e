//! # Type-erased listener bindings.
//!
//! The registry stores listeners of many concrete types side by side. Each
//! registration is wrapped in a [`Binding<L, E>`] and kept as `Arc<dyn Bound>`;
//! the binding restores the static types at invocation time.
//!
//! ## Invocation
//! ```text
//! invoke(method, &dyn Any)
//!     ├─ listener.handler(method) == None  ─► Outcome::NotFound
//!     ├─ event.downcast_ref::<E>() == None ─► Outcome::WrongEvent
//!     └─ catch_unwind(handler(&L, &E))
//!            ├─ Ok(Ok(()))   ─► Ok
//!            ├─ Ok(Err(e))   ─► Outcome::Failed(e)
//!            └─ Err(panic)   ─► Outcome::Panicked(message)
//! ```
//!
//! **Warning**: `AssertUnwindSafe` is used, so a listener that panics while holding
//! its own lock may leave that state poisoned or inconsistent.

use std::any::Any;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::events::Event;
use crate::listeners::{Listener, ListenerId};

/// Why a single invocation did not complete normally.
pub(crate) enum Outcome {
    NotFound,
    WrongEvent,
    Failed(anyhow::Error),
    Panicked(String),
}

/// Object-safe view of a registered listener.
pub(crate) trait Bound: Send + Sync {
    fn id(&self) -> ListenerId;

    /// Type name of the listener, used as the failure origin.
    fn class(&self) -> &'static str;

    /// Listener's self-reported name, used in logs.
    fn name(&self) -> &'static str;

    fn listener(&self) -> Arc<dyn Any + Send + Sync>;

    fn invoke(&self, method: &str, event: &dyn Any) -> Result<(), Outcome>;
}

/// Registration of listener `L` for events of type `E`.
pub(crate) struct Binding<L, E> {
    listener: Arc<L>,
    _event: PhantomData<fn(&E)>,
}

impl<L, E> Binding<L, E> {
    pub(crate) fn new(listener: Arc<L>) -> Self {
        Self {
            listener,
            _event: PhantomData,
        }
    }
}

impl<L, E> Bound for Binding<L, E>
where
    L: Listener<E>,
    E: Event,
{
    fn id(&self) -> ListenerId {
        ListenerId::of(&self.listener)
    }

    fn class(&self) -> &'static str {
        std::any::type_name::<L>()
    }

    fn name(&self) -> &'static str {
        self.listener.name()
    }

    fn listener(&self) -> Arc<dyn Any + Send + Sync> {
        Arc::clone(&self.listener) as Arc<dyn Any + Send + Sync>
    }

    fn invoke(&self, method: &str, event: &dyn Any) -> Result<(), Outcome> {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            let Some(handler) = self.listener.handler(method) else {
                return Err(Outcome::NotFound);
            };
            let Some(event) = event.downcast_ref::<E>() else {
                return Err(Outcome::WrongEvent);
            };
            handler(self.listener.as_ref(), event).map_err(Outcome::Failed)
        }));

        match attempt {
            Ok(res) => res,
            Err(payload) => Err(Outcome::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

/// Renders a panic payload as text.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
