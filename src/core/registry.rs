//! # Route Registry
//!
//! Maps a route type to the one handler that consumes it.
//!
//! Handlers are stored type-erased: the route value travels as
//! `Box<dyn Any + Send>` and is downcast back to its concrete type right
//! before the typed handler runs. Because the map is keyed by the same
//! `TypeId` the value was boxed from, that downcast cannot miss.
//!
//! The registry is owned by the router's worker task and is never shared,
//! so it needs no synchronization.

use std::any::Any;
use std::collections::HashMap;

use futures::future::BoxFuture;
use log::{debug, error, warn};

use super::route::{Route, RouteId};

/// Future returned by a route handler. Borrows the main-context state for `'a`.
pub type HandlerFuture<'a> = BoxFuture<'a, ()>;

type ErasedHandler<S> =
    Box<dyn for<'a> Fn(Box<dyn Any + Send>, &'a mut S) -> HandlerFuture<'a> + Send + Sync>;

/// Pins down the higher-ranked signature for the erasing closure.
fn erase<S, F>(f: F) -> ErasedHandler<S>
where
    S: 'static,
    F: for<'a> Fn(Box<dyn Any + Send>, &'a mut S) -> HandlerFuture<'a> + Send + Sync + 'static,
{
    Box::new(f)
}

/// A handler bound to one route type.
pub struct Handler<S> {
    route: RouteId,
    call: ErasedHandler<S>,
}

impl<S: 'static> Handler<S> {
    pub fn new<R, F>(handler: F) -> Self
    where
        R: Route,
        F: for<'a> Fn(R, &'a mut S) -> HandlerFuture<'a> + Send + Sync + 'static,
    {
        let route = RouteId::of::<R>();
        Self {
            route,
            call: erase(move |value: Box<dyn Any + Send>, surface: &mut S| {
                match value.downcast::<R>() {
                    Ok(value) => handler(*value, surface),
                    Err(_) => {
                        error!("Route value did not match handler type {}", route);
                        Box::pin(async {})
                    }
                }
            }),
        }
    }

    pub fn route(&self) -> RouteId {
        self.route
    }

    pub fn invoke<'a>(&self, value: Box<dyn Any + Send>, surface: &'a mut S) -> HandlerFuture<'a> {
        (self.call)(value, surface)
    }
}

pub struct RouteRegistry<S> {
    handlers: HashMap<RouteId, Handler<S>>,
}

impl<S> RouteRegistry<S> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Install a handler. The last registration for a route wins; the
    /// displaced handler is returned so the caller can report the collision.
    pub fn register(&mut self, handler: Handler<S>) -> Option<Handler<S>> {
        let route = handler.route;
        let previous = self.handlers.insert(route, handler);
        if previous.is_some() {
            warn!("Overwriting an existing handler for route: {}", route);
        } else {
            debug!("Registered handler for route: {}", route);
        }
        previous
    }

    pub fn lookup(&self, route: &RouteId) -> Option<&Handler<S>> {
        self.handlers.get(route)
    }

    #[cfg(test)]
    pub fn contains(&self, route: &RouteId) -> bool {
        self.handlers.contains_key(route)
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<S> Default for RouteRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
