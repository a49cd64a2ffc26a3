//! # Failures
//!
//! Nothing in the routing core returns an error to a producer: `dispatch`
//! has already returned by the time anything can go wrong. Failures are
//! logged where they are detected and then broadcast through a [`Reporter`]
//! so tests and diagnostics can observe them.
//!
//! Two near-simultaneous overlay toggles are not a failure. The main
//! context serializes them and the last one wins.

use std::fmt;

use log::debug;
use tokio::sync::broadcast;

/// Buffered reports per subscriber before the oldest are dropped.
const REPORT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteFailure {
    /// A route was dispatched but no handler is registered for its type.
    UnregisteredRoute { route: &'static str },
    /// A second handler was registered for the same route type. The new one wins.
    HandlerCollision { route: &'static str },
    /// An operation was asked for in a state that cannot support it. Nothing changed.
    PreconditionViolation {
        operation: &'static str,
        reason: String,
    },
}

impl RouteFailure {
    pub fn precondition(operation: &'static str, reason: impl Into<String>) -> Self {
        RouteFailure::PreconditionViolation {
            operation,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RouteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteFailure::UnregisteredRoute { route } => {
                write!(f, "no handler registered for route: {route}")
            }
            RouteFailure::HandlerCollision { route } => {
                write!(f, "overwrote existing handler for route: {route}")
            }
            RouteFailure::PreconditionViolation { operation, reason } => {
                write!(f, "{operation} skipped: {reason}")
            }
        }
    }
}

impl std::error::Error for RouteFailure {}

/// Fan-out for [`RouteFailure`] reports.
#[derive(Clone)]
pub struct Reporter {
    tx: broadcast::Sender<RouteFailure>,
}

impl Reporter {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(REPORT_CAPACITY);
        Self { tx }
    }

    /// Broadcast a failure. Having no subscribers is fine.
    pub fn report(&self, failure: RouteFailure) {
        debug!("Reporting failure: {}", failure);
        let _ = self.tx.send(failure);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RouteFailure> {
        self.tx.subscribe()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
