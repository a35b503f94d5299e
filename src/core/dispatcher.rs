//! # Dispatcher: delivers events to registered listeners and reports their failures.
//!
//! The [`Dispatcher`] owns a [`Registry`] and its [`Config`]. `fire` looks up the
//! listeners of the event's type and invokes the named handler on each of them, in
//! registration order, on the caller's thread.
//!
//! ## Dispatch
//! ```text
//! fire_with(&event, name)
//!   ├─► hold registry lock (reentrant, released when fire returns)
//!   ├─► snapshot(EventType::of::<E>())          empty → Ok(())
//!   └─► for each listener:
//!          invoke(name, &event)
//!            ├─ Ok                → next
//!            ├─ Failed(err)       → report(HandlerFailed, err)
//!            │                      ├─ FailurePolicy::Report → next
//!            │                      └─ FailurePolicy::Strict → Err(HandlerFailed)
//!            ├─ NotFound          → report, Err(HandlerNotFound)
//!            ├─ WrongEvent        → report, Err(WrongEvent)
//!            └─ Panicked(msg)     → report, Err(Panicked)
//!
//! report(..)
//!   ├─ depth < max_failure_depth → fire_with(&FailureEvent, "on_failure")
//!   └─ otherwise                 → tracing::error!, not redispatched
//! ```
//!
//! ## Locking
//! The registry lock is held for the whole `fire`, including every handler. Handlers
//! may call back into the same dispatcher (`register`, `unregister_*`, `fire`) from the
//! same thread; other threads block until the outermost `fire` returns. Changes made
//! by a handler apply to later `fire` calls, not to the one in progress.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use tracing::{error, trace};

use crate::core::binding::{Bound, Outcome};
use crate::core::{Config, DispatcherBuilder, Registry};
use crate::error::DispatchError;
use crate::events::{Event, EventType, FailureEvent, FailureKind};
use crate::listeners::{FailureLogger, Listener};

/// Synchronous, type-keyed event dispatcher.
pub struct Dispatcher {
    registry: Registry,
    cfg: Config,
    failure_logger: Option<Arc<FailureLogger>>,
    /// Nesting of failure reports; only touched while the registry lock is held.
    depth: AtomicUsize,
}

impl Dispatcher {
    /// Creates a dispatcher with [`Config::default`] and the default failure logger.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a dispatcher with `cfg`.
    pub fn with_config(cfg: Config) -> Self {
        let failure_logger = cfg.install_failure_logger.then(|| Arc::new(FailureLogger::new()));
        let dispatcher = Self {
            registry: Registry::new(),
            cfg,
            failure_logger,
            depth: AtomicUsize::new(0),
        };
        if let Some(logger) = &dispatcher.failure_logger {
            dispatcher.registry.register(logger);
        }
        dispatcher
    }

    /// Returns a builder starting from `cfg`.
    pub fn builder(cfg: Config) -> DispatcherBuilder {
        DispatcherBuilder::new(cfg)
    }

    /// The configuration this dispatcher was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// The listener registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The failure logger installed at construction, if any.
    ///
    /// Unregister it to silence the default failure output:
    /// `dispatcher.unregister_one::<FailureEvent, _>(logger)`.
    pub fn failure_logger(&self) -> Option<&Arc<FailureLogger>> {
        self.failure_logger.as_ref()
    }

    /// Subscribes `listener` to events of type `E`. See [`Registry::register`].
    pub fn register<E, L>(&self, listener: &Arc<L>) -> bool
    where
        E: Event,
        L: Listener<E>,
    {
        self.registry.register::<E, L>(listener)
    }

    /// Unsubscribes `listener` from events of type `E`. See [`Registry::unregister_one`].
    pub fn unregister_one<E, L>(&self, listener: &Arc<L>) -> bool
    where
        E: Event,
        L: ?Sized,
    {
        self.registry.unregister_one::<E, L>(listener)
    }

    /// Unsubscribes every listener of `E`. See [`Registry::unregister_all`].
    pub fn unregister_all<E: Event>(&self) -> usize {
        self.registry.unregister_all::<E>()
    }

    /// Fires `event` through the handler named [`Event::HANDLER`].
    pub fn fire<E: Event>(&self, event: &E) -> Result<(), DispatchError> {
        self.fire_with(event, E::HANDLER)
    }

    /// Fires `event` through the handler named `method` on every listener of `E`.
    ///
    /// ### Errors
    /// - [`DispatchError::HandlerNotFound`], [`DispatchError::WrongEvent`],
    ///   [`DispatchError::Panicked`]: a listener could not be invoked; reported first,
    ///   remaining listeners are skipped.
    /// - [`DispatchError::HandlerFailed`] under [`FailurePolicy::Strict`](crate::FailurePolicy::Strict) only.
    /// - Any error raised while reporting a failure propagates as is.
    pub fn fire_with<E: Event>(&self, event: &E, method: &str) -> Result<(), DispatchError> {
        let ty = EventType::of::<E>();
        let _held = self.registry.hold();
        let listeners = self.registry.snapshot(ty);
        if listeners.is_empty() {
            trace!(event = %ty, method, "no listeners");
            return Ok(());
        }
        trace!(event = %ty, method, listeners = listeners.len(), "dispatching");

        for listener in &listeners {
            let outcome = match listener.invoke(method, event) {
                Ok(()) => continue,
                Err(outcome) => outcome,
            };
            self.handle_outcome(listener.as_ref(), ty, method, outcome)?;
        }
        Ok(())
    }

    /// Reports one failed invocation and decides whether dispatch goes on.
    fn handle_outcome(
        &self,
        listener: &dyn Bound,
        ty: EventType,
        method: &str,
        outcome: Outcome,
    ) -> Result<(), DispatchError> {
        let class = listener.class();
        let (kind, fatal) = match outcome {
            Outcome::Failed(cause) => {
                let cause = Arc::new(cause);
                self.report(listener, ty, method, FailureKind::HandlerFailed, Arc::clone(&cause))?;
                if !self.cfg.failure_policy.aborts_on_handler_error() {
                    return Ok(());
                }
                return Err(DispatchError::HandlerFailed {
                    listener: class,
                    method: method.to_string(),
                    event: ty,
                    cause,
                });
            }
            Outcome::NotFound => (
                FailureKind::HandlerNotFound,
                DispatchError::HandlerNotFound {
                    listener: class,
                    method: method.to_string(),
                    event: ty,
                },
            ),
            Outcome::WrongEvent => (
                FailureKind::WrongEvent,
                DispatchError::WrongEvent {
                    listener: class,
                    method: method.to_string(),
                    event: ty,
                },
            ),
            Outcome::Panicked(message) => (
                FailureKind::Panicked,
                DispatchError::Panicked {
                    listener: class,
                    method: method.to_string(),
                    event: ty,
                    message,
                },
            ),
        };

        let cause = Arc::new(anyhow::Error::new(fatal.clone()));
        self.report(listener, ty, method, kind, cause)?;
        Err(fatal)
    }

    /// Fires a [`FailureEvent`] for `listener` through this dispatcher.
    fn report(
        &self,
        listener: &dyn Bound,
        ty: EventType,
        method: &str,
        kind: FailureKind,
        cause: Arc<anyhow::Error>,
    ) -> Result<(), DispatchError> {
        let depth = self.depth.load(AtomicOrdering::Relaxed);
        if self.cfg.failure_depth_limit().is_some_and(|limit| depth >= limit) {
            error!(
                origin_class = listener.class(),
                origin_method = method,
                kind = %kind,
                event = %ty,
                depth,
                error = %cause,
                "failure report depth exceeded; not redispatched"
            );
            return Ok(());
        }

        let report = FailureEvent::from_parts(
            kind,
            ty,
            listener.listener(),
            listener.class(),
            method,
            cause,
        );

        self.depth.fetch_add(1, AtomicOrdering::Relaxed);
        let _depth = DepthGuard(&self.depth);
        self.fire_with(&report, FailureEvent::HANDLER)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("cfg", &self.cfg)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Decrements the failure-report depth when a report completes.
struct DepthGuard<'a>(&'a AtomicUsize);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, AtomicOrdering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicBool;
    use std::sync::{Mutex, Weak, mpsc};
    use std::thread;
    use std::time::Duration;

    use crate::listeners::{Captured, Handler, ListenerFn};
    use crate::policies::FailurePolicy;

    #[derive(Debug)]
    struct Ping;
    impl Event for Ping {
        const HANDLER: &'static str = "on_ping";
    }

    #[derive(Debug)]
    struct Pong(u32);
    impl Event for Pong {
        const HANDLER: &'static str = "on_pong";
    }

    /// Shared call log: every listener appends its label.
    type Calls = Arc<Mutex<Vec<&'static str>>>;

    struct Recorder {
        label: &'static str,
        calls: Calls,
    }

    impl Recorder {
        fn arc(label: &'static str, calls: &Calls) -> Arc<Self> {
            Arc::new(Self {
                label,
                calls: Arc::clone(calls),
            })
        }

        fn on_ping(&self, _: &Ping) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(self.label);
            Ok(())
        }
    }

    impl Listener<Ping> for Recorder {
        fn handler(&self, method: &str) -> Option<Handler<Self, Ping>> {
            match method {
                "on_ping" => Some(Self::on_ping),
                _ => None,
            }
        }
    }

    /// Handler body always fails with "boom".
    struct Boom;

    impl Boom {
        fn on_ping(&self, _: &Ping) -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }
    }

    impl Listener<Ping> for Boom {
        fn handler(&self, method: &str) -> Option<Handler<Self, Ping>> {
            (method == "on_ping").then_some(Self::on_ping as Handler<Self, Ping>)
        }
    }

    /// Collects every failure report it receives.
    #[derive(Default)]
    struct Failures(Mutex<Vec<FailureEvent>>);

    impl Failures {
        fn on_failure(&self, e: &FailureEvent) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(e.clone());
            Ok(())
        }

        fn taken(&self) -> Vec<FailureEvent> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl Listener<FailureEvent> for Failures {
        fn handler(&self, method: &str) -> Option<Handler<Self, FailureEvent>> {
            (method == "on_failure").then_some(Self::on_failure as Handler<Self, FailureEvent>)
        }
    }

    fn quiet() -> Config {
        Config {
            install_failure_logger: false,
            ..Config::default()
        }
    }

    fn with_failures(cfg: Config) -> (Dispatcher, Arc<Failures>) {
        let d = Dispatcher::with_config(cfg);
        let failures = Arc::new(Failures::default());
        d.register(&failures);
        (d, failures)
    }

    fn calls() -> Calls {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn test_fire_without_listeners_is_noop() {
        let d = Dispatcher::new();
        assert!(d.fire(&Ping).is_ok());
        assert!(d.fire_with(&Pong(1), "anything").is_ok());
    }

    #[test]
    fn test_empty_handler_name_without_listeners_is_noop() {
        let d = Dispatcher::new();
        assert!(d.fire_with(&Ping, "").is_ok());
    }

    #[test]
    fn test_empty_handler_name_is_reported_as_not_found() {
        let (d, failures) = with_failures(quiet());
        let log = calls();
        d.register(&Recorder::arc("l1", &log));

        let err = d.fire_with(&Ping, "").unwrap_err();
        assert!(matches!(err, DispatchError::HandlerNotFound { ref method, .. } if method.is_empty()));
        assert!(log.lock().unwrap().is_empty());

        let reports = failures.taken();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, FailureKind::HandlerNotFound);
        assert_eq!(reports[0].origin_method(), "");
    }

    #[test]
    fn test_duplicate_registration_invokes_once() {
        let d = Dispatcher::new();
        let log = calls();
        let l1 = Recorder::arc("l1", &log);

        d.register(&l1);
        d.register(&l1);
        d.fire(&Ping).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["l1"]);
    }

    #[test]
    fn test_register_order_then_unregister_one() {
        let d = Dispatcher::new();
        let log = calls();
        let l1 = Recorder::arc("l1", &log);
        let l2 = Recorder::arc("l2", &log);
        d.register(&l1);
        d.register(&l2);

        d.fire_with(&Ping, "on_ping").unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["l1", "l2"]);

        log.lock().unwrap().clear();
        assert!(d.unregister_one::<Ping, _>(&l1));
        d.fire_with(&Ping, "on_ping").unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["l2"]);
    }

    #[test]
    fn test_unregister_one_keeps_relative_order() {
        let d = Dispatcher::new();
        let log = calls();
        let ls: Vec<_> = ["a", "b", "c", "d"]
            .into_iter()
            .map(|l| Recorder::arc(l, &log))
            .collect();
        for l in &ls {
            d.register(l);
        }

        d.unregister_one::<Ping, _>(&ls[1]);
        d.fire(&Ping).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_unregister_all_silences_type() {
        let d = Dispatcher::new();
        let log = calls();
        d.register(&Recorder::arc("l1", &log));
        d.register(&Recorder::arc("l2", &log));

        assert_eq!(d.unregister_all::<Ping>(), 2);
        d.fire(&Ping).unwrap();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handler_error_is_reported_and_dispatch_continues() {
        let (d, failures) = with_failures(quiet());
        let log = calls();
        let boom = Arc::new(Boom);
        d.register(&boom);
        d.register(&Recorder::arc("after", &log));

        assert!(d.fire(&Ping).is_ok());
        assert_eq!(*log.lock().unwrap(), vec!["after"]);

        let reports = failures.taken();
        assert_eq!(reports.len(), 1);
        let r = &reports[0];
        assert_eq!(r.kind, FailureKind::HandlerFailed);
        assert!(r.is_from(&boom));
        assert_eq!(r.cause().to_string(), "boom");
        assert!(r.origin_class().ends_with("Boom"));
        assert_eq!(r.origin_method(), "on_ping");
        assert_eq!(r.event_type, EventType::of::<Ping>());
    }

    #[test]
    fn test_missing_handler_is_fatal_after_one_report() {
        let (d, failures) = with_failures(quiet());
        let log = calls();
        let l1 = Recorder::arc("l1", &log);
        let l2 = Recorder::arc("l2", &log);
        d.register(&l1);
        d.register(&l2);

        let err = d.fire_with(&Ping, "on_pong").unwrap_err();
        assert!(matches!(err, DispatchError::HandlerNotFound { .. }), "{err}");
        assert!(err.to_string().ends_with("no method"));
        assert!(log.lock().unwrap().is_empty());

        let reports = failures.taken();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, FailureKind::HandlerNotFound);
        assert!(reports[0].is_from(&l1));
        assert_eq!(reports[0].origin_method(), "on_pong");
    }

    #[test]
    fn test_panic_is_fatal_after_one_report() {
        let (d, failures) = with_failures(quiet());
        let log = calls();
        let panicky = ListenerFn::arc(|_: &Ping| -> anyhow::Result<()> { panic!("kaboom") });
        d.register(&panicky);
        d.register(&Recorder::arc("after", &log));

        let err = d.fire(&Ping).unwrap_err();
        match &err {
            DispatchError::Panicked { message, .. } => assert_eq!(message, "kaboom"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(log.lock().unwrap().is_empty());

        let reports = failures.taken();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, FailureKind::Panicked);
        assert!(reports[0].cause().to_string().contains("kaboom"));
    }

    #[test]
    fn test_strict_policy_aborts_on_handler_error() {
        let cfg = Config {
            failure_policy: FailurePolicy::Strict,
            ..quiet()
        };
        let (d, failures) = with_failures(cfg);
        let log = calls();
        d.register(&Arc::new(Boom));
        d.register(&Recorder::arc("after", &log));

        let err = d.fire(&Ping).unwrap_err();
        match &err {
            DispatchError::HandlerFailed { cause, .. } => assert_eq!(cause.to_string(), "boom"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(failures.taken().len(), 1);
    }

    #[test]
    fn test_failing_failure_listener_is_bounded() {
        let cfg = Config {
            max_failure_depth: 3,
            ..quiet()
        };
        let d = Dispatcher::with_config(cfg);
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in = Arc::clone(&seen);
        let always_fails = ListenerFn::arc(move |_: &FailureEvent| {
            seen_in.fetch_add(1, AtomicOrdering::SeqCst);
            anyhow::bail!("failure handler failed")
        });
        d.register(&always_fails);
        d.register(&Arc::new(Boom));

        let out = Captured::default();
        tracing::subscriber::with_default(out.subscriber(), || {
            assert!(d.fire(&Ping).is_ok());
        });
        assert_eq!(seen.load(AtomicOrdering::SeqCst), 3);
        assert_eq!(d.depth.load(AtomicOrdering::SeqCst), 0);

        let text = out.contents();
        let fallback = "failure report depth exceeded; not redispatched";
        assert_eq!(text.matches(fallback).count(), 1, "{text}");
        assert!(text.contains("ERROR"), "{text}");
        assert!(text.contains("depth=3"), "{text}");
        assert!(text.contains("failure handler failed"), "{text}");
    }

    #[test]
    fn test_default_logger_reports_handler_error() {
        let out = Captured::default();
        tracing::subscriber::with_default(out.subscriber(), || {
            let d = Dispatcher::new();
            d.register(&Arc::new(Boom));
            assert!(d.fire(&Ping).is_ok());
        });

        let text = out.contents();
        assert!(text.contains("ERROR"), "{text}");
        assert!(text.contains("listener failed"), "{text}");
        assert!(text.contains("Boom"), "{text}");
        assert!(text.contains("on_ping"), "{text}");
        assert!(text.contains("boom"), "{text}");
    }

    #[test]
    fn test_failure_logger_can_be_replaced() {
        let d = Dispatcher::new();
        let logger = Arc::clone(d.failure_logger().unwrap());
        assert!(d.registry().contains::<FailureEvent, _>(&logger));

        let failures = Arc::new(Failures::default());
        d.register(&failures);
        d.unregister_one::<FailureEvent, _>(&logger);
        d.register(&Arc::new(Boom));
        d.fire(&Ping).unwrap();

        assert_eq!(failures.taken().len(), 1);
        assert_eq!(d.registry().len::<FailureEvent>(), 1);
    }

    #[test]
    fn test_no_logger_when_disabled() {
        let d = Dispatcher::with_config(quiet());
        assert!(d.failure_logger().is_none());
        assert_eq!(d.registry().len::<FailureEvent>(), 0);
        d.register(&Arc::new(Boom));
        assert!(d.fire(&Ping).is_ok());
    }

    /// Registers a new listener and fires a nested event from inside its handler.
    struct Reentrant {
        dispatcher: Weak<Dispatcher>,
        late: Arc<Recorder>,
        pongs: AtomicUsize,
    }

    impl Reentrant {
        fn on_ping(&self, _: &Ping) -> anyhow::Result<()> {
            let d = self
                .dispatcher
                .upgrade()
                .ok_or_else(|| anyhow::anyhow!("dispatcher gone"))?;
            d.register(&self.late);
            d.fire(&Pong(1))?;
            Ok(())
        }

        fn on_pong(&self, e: &Pong) -> anyhow::Result<()> {
            self.pongs.fetch_add(e.0 as usize, AtomicOrdering::SeqCst);
            Ok(())
        }
    }

    impl Listener<Ping> for Reentrant {
        fn handler(&self, method: &str) -> Option<Handler<Self, Ping>> {
            (method == "on_ping").then_some(Self::on_ping as Handler<Self, Ping>)
        }
    }

    impl Listener<Pong> for Reentrant {
        fn handler(&self, method: &str) -> Option<Handler<Self, Pong>> {
            (method == "on_pong").then_some(Self::on_pong as Handler<Self, Pong>)
        }
    }

    #[test]
    fn test_reentrant_mutation_and_fire_from_handler() {
        let (d, failures) = with_failures(quiet());
        let d = Arc::new(d);
        let log = calls();
        let r = Arc::new(Reentrant {
            dispatcher: Arc::downgrade(&d),
            late: Recorder::arc("late", &log),
            pongs: AtomicUsize::new(0),
        });
        d.register::<Ping, _>(&r);
        d.register::<Pong, _>(&r);

        d.fire(&Ping).unwrap();
        assert_eq!(r.pongs.load(AtomicOrdering::SeqCst), 1);
        // registered during dispatch: not part of the in-flight snapshot
        assert!(log.lock().unwrap().is_empty());

        d.fire(&Ping).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["late"]);
        assert!(failures.taken().is_empty());
    }

    #[test]
    fn test_unregister_all_from_handler_spares_in_flight_snapshot() {
        let d = Arc::new(Dispatcher::with_config(quiet()));
        let log = calls();
        let weak = Arc::downgrade(&d);
        let clearer = ListenerFn::arc(move |_: &Ping| {
            if let Some(d) = weak.upgrade() {
                d.unregister_all::<Ping>();
            }
            Ok(())
        });
        d.register(&clearer);
        d.register(&Recorder::arc("second", &log));

        d.fire(&Ping).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["second"]);
        assert_eq!(d.registry().len::<Ping>(), 0);
    }

    #[test]
    fn test_other_threads_wait_for_fire() {
        let d = Arc::new(Dispatcher::with_config(quiet()));
        let (entered_tx, entered_rx) = mpsc::channel::<()>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);

        let blocker = ListenerFn::arc(move |_: &Ping| {
            entered_tx.send(()).ok();
            release_rx.lock().unwrap().recv().ok();
            Ok(())
        });
        d.register(&blocker);

        let firing = {
            let d = Arc::clone(&d);
            thread::spawn(move || d.fire(&Ping))
        };
        entered_rx.recv().unwrap();

        let registered = Arc::new(AtomicBool::new(false));
        let registering = {
            let d = Arc::clone(&d);
            let registered = Arc::clone(&registered);
            thread::spawn(move || {
                d.register(&ListenerFn::arc(|_: &Pong| Ok(())));
                registered.store(true, AtomicOrdering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!registered.load(AtomicOrdering::SeqCst));

        release_tx.send(()).unwrap();
        firing.join().unwrap().unwrap();
        registering.join().unwrap();
        assert!(registered.load(AtomicOrdering::SeqCst));
        assert_eq!(d.registry().len::<Pong>(), 1);
    }
}
