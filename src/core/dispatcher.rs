//! # Dispatcher
//!
//! The [`Router`] is the only thing producers talk to. It is a cheap,
//! cloneable handle onto a single worker task, the *main context*, which
//! owns the registry and all mutable presentation state.
//!
//! ```text
//!   producer ──dispatch──┐
//!   producer ──dispatch──┼──► FIFO queue ──► worker ──► handler(route, &mut S)
//!   composition root ────┘        ▲             │
//!        register ──► registrations channel ────┘ (installed before each lookup)
//! ```
//!
//! Delivery is single-flight: the worker awaits each handler before it
//! pops the next envelope, so handlers never interleave their mutations of
//! `S`. A slow handler delays everything queued behind it.
//!
//! The surface may also own deadlines (toast timers). While idle, the worker
//! sleeps until the earliest one and fires it on the main context.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Instant, sleep_until};

use super::failure::{Reporter, RouteFailure};
use super::registry::{Handler, HandlerFuture, RouteRegistry};
use super::route::{Route, RouteId};

/// State owned by the main context.
pub trait Surface: Send + 'static {
    /// Earliest pending deadline, if the surface has timers running.
    fn next_deadline(&self) -> Option<Instant> {
        None
    }

    /// Called on the main context once `next_deadline` has passed.
    fn on_deadline(&mut self, _now: Instant) {}
}

/// A route waiting in the queue.
struct PendingDispatch {
    route: RouteId,
    value: Box<dyn Any + Send>,
    enqueued_at: DateTime<Utc>,
    sequence: u64,
}

type Job<S> = Box<dyn FnOnce(&mut S) + Send>;

enum Envelope<S> {
    Dispatch(PendingDispatch),
    Run(Job<S>),
}

pub struct Router<S> {
    queue: mpsc::UnboundedSender<Envelope<S>>,
    registrations: mpsc::UnboundedSender<Handler<S>>,
    reporter: Reporter,
    sequence: Arc<AtomicU64>,
}

impl<S> Clone for Router<S> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            registrations: self.registrations.clone(),
            reporter: self.reporter.clone(),
            sequence: self.sequence.clone(),
        }
    }
}

impl<S: Surface> Router<S> {
    /// Spawn the worker on the current tokio runtime. The worker stops once
    /// every `Router` clone has been dropped.
    pub fn spawn(surface: S, reporter: Reporter) -> Self {
        let (queue, queue_rx) = mpsc::unbounded_channel();
        let (registrations, registrations_rx) = mpsc::unbounded_channel();

        let worker = Worker {
            surface,
            registry: RouteRegistry::new(),
            queue: queue_rx,
            registrations: registrations_rx,
            reporter: reporter.clone(),
        };
        tokio::spawn(worker.run());

        Self {
            queue,
            registrations,
            reporter,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register the handler for route type `R`. Replaces any earlier one.
    pub fn register<R, F>(&self, handler: F)
    where
        R: Route,
        F: for<'a> Fn(R, &'a mut S) -> HandlerFuture<'a> + Send + Sync + 'static,
    {
        if self.registrations.send(Handler::new::<R, F>(handler)).is_err() {
            warn!(
                "Router worker stopped; dropping registration for {}",
                RouteId::of::<R>()
            );
        }
    }

    /// Queue a route for delivery. Never blocks and never fails the caller.
    pub fn dispatch<R: Route>(&self, route: R) {
        let pending = PendingDispatch {
            route: RouteId::of::<R>(),
            value: Box::new(route),
            enqueued_at: Utc::now(),
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
        };
        debug!("Dispatching route: {} (#{})", pending.route, pending.sequence);
        let route = pending.route;
        if self.queue.send(Envelope::Dispatch(pending)).is_err() {
            warn!("Router worker stopped; dropping route: {}", route);
        }
    }

    /// Bind `route` into a deferred action. Each call of the returned
    /// closure dispatches a fresh copy, so a button or timer can hold it.
    pub fn action<R: Route + Clone + Sync>(&self, route: R) -> impl Fn() + Send + Sync + use<R, S> {
        let router = self.clone();
        move || router.dispatch(route.clone())
    }

    /// Queue a mutation to run on the main context, in order with dispatches.
    pub(crate) fn post<F>(&self, job: F)
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        if self.queue.send(Envelope::Run(Box::new(job))).is_err() {
            warn!("Router worker stopped; dropping posted job");
        }
    }

    /// Read main-context state after everything queued so far has been
    /// delivered. Returns `None` if the worker has stopped.
    pub async fn inspect<T, F>(&self, f: F) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.post(move |surface| {
            let _ = tx.send(f(surface));
        });
        rx.await.ok()
    }

    /// Wait until everything queued so far has been delivered.
    pub async fn flush(&self) {
        let _ = self.inspect(|_| ()).await;
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Subscribe to failure reports from the worker and its handlers.
    pub fn failures(&self) -> broadcast::Receiver<RouteFailure> {
        self.reporter.subscribe()
    }
}

struct Worker<S> {
    surface: S,
    registry: RouteRegistry<S>,
    queue: mpsc::UnboundedReceiver<Envelope<S>>,
    registrations: mpsc::UnboundedReceiver<Handler<S>>,
    reporter: Reporter,
}

impl<S: Surface> Worker<S> {
    async fn run(mut self) {
        info!("Router worker started");
        loop {
            let deadline = self.surface.next_deadline();
            tokio::select! {
                biased;
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.surface.on_deadline(Instant::now());
                }
                Some(handler) = self.registrations.recv() => {
                    self.install(handler);
                }
                envelope = self.queue.recv() => match envelope {
                    Some(envelope) => self.deliver(envelope).await,
                    None => break,
                },
            }
        }
        info!(
            "Router worker stopped: all routers dropped ({} handlers registered)",
            self.registry.len()
        );
    }

    fn install(&mut self, handler: Handler<S>) {
        let route = handler.route();
        if self.registry.register(handler).is_some() {
            self.reporter.report(RouteFailure::HandlerCollision {
                route: route.name(),
            });
        }
    }

    /// Registrations sent before this point must be visible to the lookup below.
    fn drain_registrations(&mut self) {
        while let Ok(handler) = self.registrations.try_recv() {
            self.install(handler);
        }
    }

    async fn deliver(&mut self, envelope: Envelope<S>) {
        self.drain_registrations();
        match envelope {
            Envelope::Run(job) => job(&mut self.surface),
            Envelope::Dispatch(pending) => {
                let Some(handler) = self.registry.lookup(&pending.route) else {
                    error!("No handler registered for route: {}", pending.route);
                    self.reporter.report(RouteFailure::UnregisteredRoute {
                        route: pending.route.name(),
                    });
                    return;
                };
                info!(
                    "Handling route: {} (#{}, enqueued {})",
                    pending.route,
                    pending.sequence,
                    pending.enqueued_at.to_rfc3339()
                );
                let started = std::time::Instant::now();
                handler.invoke(pending.value, &mut self.surface).await;
                debug!(
                    "Route {} (#{}) handled in {}ms",
                    pending.route,
                    pending.sequence,
                    started.elapsed().as_millis()
                );
            }
        }
    }
}
