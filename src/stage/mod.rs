//! # Stage
//!
//! Everything the router's main context owns: one [`Navigator`] over one
//! [`Window`], plus the [`OverlayManager`] whose overlays are drawn into that
//! same window.
//!
//! The [`Shell`] is moved into the router worker at startup and never leaves
//! it. Handlers receive `&mut Shell` one at a time, so there is no locking
//! anywhere in here.

pub mod navigator;
pub mod overlay;
pub mod window;

pub use navigator::{Alert, Content, Dismissal, Modal, ModalStyle, Navigator, Presentation, PresentationState, Screen};
pub use overlay::{OverlayClass, OverlayEvent, OverlayManager, OverlayRequest, OverlayTimings};
pub use window::{HeadlessWindow, TerminalWindow, Transition, Window, WindowEvent};

use tokio::time::Instant;

use crate::core::dispatcher::{Router, Surface};
use crate::core::failure::{Reporter, RouteFailure};

pub struct Shell<W> {
    navigator: Navigator<W>,
    overlays: OverlayManager,
    reporter: Reporter,
}

impl<W: Window> Shell<W> {
    pub fn new(window: W, timings: OverlayTimings, reporter: Reporter) -> Self {
        Self {
            navigator: Navigator::new(window),
            overlays: OverlayManager::new(timings),
            reporter,
        }
    }

    pub fn navigator(&self) -> &Navigator<W> {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator<W> {
        &mut self.navigator
    }

    pub fn overlays(&self) -> &OverlayManager {
        &self.overlays
    }

    pub fn set_overlay(&mut self, request: OverlayRequest) {
        match self.overlays.set_overlay(request, Instant::now()) {
            Ok(events) => self.forward(events),
            Err(failure) => self.reporter.report(failure),
        }
    }

    /// Report a failure a handler recovered from.
    pub fn report(&self, failure: RouteFailure) {
        self.reporter.report(failure);
    }

    fn forward(&mut self, events: Vec<OverlayEvent>) {
        let window = self.navigator.window_mut();
        for event in events {
            window.apply(WindowEvent::Overlay(event));
        }
    }
}

impl<W: Window> Surface for Shell<W> {
    fn next_deadline(&self) -> Option<Instant> {
        self.overlays.next_deadline()
    }

    fn on_deadline(&mut self, now: Instant) {
        let events = self.overlays.advance(now);
        self.forward(events);
    }
}

impl<W: Window> Router<Shell<W>> {
    /// Show or hide an overlay. Applied on the main context, in order with
    /// routes already queued; the last toggle for a class wins.
    pub fn set_overlay(&self, request: OverlayRequest) {
        self.post(move |shell| shell.set_overlay(request));
    }
}
