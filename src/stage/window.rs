//! # Window
//!
//! The display backend the navigator draws into. Every presentation or
//! overlay change is handed to the window as a [`WindowEvent`] after the
//! state has already been updated, so a window can never veto or delay a
//! change. Transitions are fire-and-forget for the same reason.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::navigator::{Content, Modal, Screen};
use super::overlay::{Eviction, OverlayEvent};

pub const DEFAULT_TRANSITION_MS: u64 = 250;

/// Named root-swap animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Fade,
    Reveal,
    Push,
    Pop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Edge {
    Bottom,
    Right,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransitionEffect {
    CrossFade,
    Reveal(Edge),
}

impl Transition {
    pub fn effect(self) -> TransitionEffect {
        match self {
            Transition::Fade => TransitionEffect::CrossFade,
            Transition::Reveal => TransitionEffect::Reveal(Edge::Bottom),
            Transition::Push => TransitionEffect::Reveal(Edge::Right),
            Transition::Pop => TransitionEffect::Reveal(Edge::Left),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WindowEvent {
    RootReplaced(Content),
    Animated {
        transition: Transition,
        effect: TransitionEffect,
    },
    Pushed(Screen),
    Popped(Screen),
    Presented(Modal),
    Dismissed(Modal),
    Overlay(OverlayEvent),
}

pub trait Window: Send + 'static {
    fn apply(&mut self, event: WindowEvent);
}

/// Records every event. Used for headless runs and tests.
#[derive(Debug, Default)]
pub struct HeadlessWindow {
    events: Vec<WindowEvent>,
}

impl HeadlessWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[WindowEvent] {
        &self.events
    }
}

impl Window for HeadlessWindow {
    fn apply(&mut self, event: WindowEvent) {
        self.events.push(event);
    }
}

/// Prints one line per change to stdout.
pub struct TerminalWindow {
    transition_duration: Duration,
}

impl TerminalWindow {
    pub fn new(transition_duration: Duration) -> Self {
        Self {
            transition_duration,
        }
    }

    fn describe(&self, event: &WindowEvent) -> String {
        match event {
            WindowEvent::RootReplaced(content) => format!("root    → {}", content.label()),
            WindowEvent::Animated { transition, effect } => format!(
                "animate   {:?} ({:?}, {}ms)",
                transition,
                effect,
                self.transition_duration.as_millis()
            ),
            WindowEvent::Pushed(screen) => format!("push    → {}", screen.id),
            WindowEvent::Popped(screen) => format!("pop     ← {}", screen.id),
            WindowEvent::Presented(modal) => {
                format!("present → {} [{:?}]", modal.content.label(), modal.style)
            }
            WindowEvent::Dismissed(modal) => format!("dismiss ← {}", modal.content.label()),
            WindowEvent::Overlay(OverlayEvent::Attached(overlay)) => match &overlay.toast {
                Some(toast) => format!(
                    "overlay + {:?} [{}] {}",
                    overlay.class,
                    toast.kind.symbol(),
                    toast.message
                ),
                None => format!("overlay + {:?}", overlay.class),
            },
            WindowEvent::Overlay(OverlayEvent::PhaseChanged { class, phase, .. }) => {
                format!("overlay ~ {:?} {:?}", class, phase)
            }
            WindowEvent::Overlay(OverlayEvent::Detached { class, reason, .. }) => {
                let why = match reason {
                    Eviction::Replaced => "replaced",
                    Eviction::Hidden => "hidden",
                    Eviction::Expired => "expired",
                };
                format!("overlay - {:?} ({})", class, why)
            }
        }
    }
}

impl Window for TerminalWindow {
    fn apply(&mut self, event: WindowEvent) {
        println!("{}", self.describe(&event));
    }
}
