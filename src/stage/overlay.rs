//! # Overlay Manager
//!
//! Transient UI drawn above everything else: the loading spinner and the
//! toast. Each class has one slot and at most one live overlay. Showing a
//! class that is already live evicts the old instance first, so overlays of
//! one class never stack.
//!
//! A toast owns its own lifetime through a deadline:
//!
//! ```text
//! show ──► FadingIn ──fade──► Visible ──visible──► FadingOut ──fade──► evicted (Expired)
//!    hide at any point ──► evicted (Hidden), deadline gone with the slot
//! ```
//!
//! The manager never reads a clock itself. Callers pass `now`, and the
//! shell calls [`OverlayManager::advance`] when [`OverlayManager::next_deadline`]
//! passes. That keeps it a plain state machine.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::core::failure::RouteFailure;
use crate::core::route::ToastKind;

pub const DEFAULT_TOAST_FADE_MS: u64 = 300;
pub const DEFAULT_TOAST_VISIBLE_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayClass {
    Loading,
    Toast,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToastPayload {
    pub message: String,
    pub kind: ToastKind,
}

/// A request to show or hide one overlay class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayRequest {
    pub class: OverlayClass,
    pub visible: bool,
    pub payload: Option<ToastPayload>,
}

impl OverlayRequest {
    pub fn loading(visible: bool) -> Self {
        Self {
            class: OverlayClass::Loading,
            visible,
            payload: None,
        }
    }

    pub fn toast(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            class: OverlayClass::Toast,
            visible: true,
            payload: Some(ToastPayload {
                message: message.into(),
                kind,
            }),
        }
    }

    pub fn hide_toast() -> Self {
        Self {
            class: OverlayClass::Toast,
            visible: false,
            payload: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Shown until explicitly hidden. Loading overlays live here.
    Pinned,
    FadingIn,
    Visible,
    FadingOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Eviction {
    /// A new instance of the same class took the slot.
    Replaced,
    Hidden,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub id: Uuid,
    pub class: OverlayClass,
    pub toast: Option<ToastPayload>,
    pub phase: Phase,
    #[serde(skip)]
    deadline: Option<Instant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OverlayEvent {
    Attached(Overlay),
    PhaseChanged {
        id: Uuid,
        class: OverlayClass,
        phase: Phase,
    },
    Detached {
        id: Uuid,
        class: OverlayClass,
        reason: Eviction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayTimings {
    pub fade: Duration,
    pub visible: Duration,
}

impl Default for OverlayTimings {
    fn default() -> Self {
        Self {
            fade: Duration::from_millis(DEFAULT_TOAST_FADE_MS),
            visible: Duration::from_millis(DEFAULT_TOAST_VISIBLE_MS),
        }
    }
}

pub struct OverlayManager {
    slots: HashMap<OverlayClass, Overlay>,
    timings: OverlayTimings,
}

impl OverlayManager {
    pub fn new(timings: OverlayTimings) -> Self {
        Self {
            slots: HashMap::new(),
            timings,
        }
    }

    pub fn live(&self, class: OverlayClass) -> Option<&Overlay> {
        self.slots.get(&class)
    }

    pub fn live_count(&self) -> usize {
        self.slots.len()
    }

    pub fn set_overlay(
        &mut self,
        request: OverlayRequest,
        now: Instant,
    ) -> Result<Vec<OverlayEvent>, RouteFailure> {
        let mut events = Vec::new();

        if !request.visible {
            events.extend(self.evict(request.class, Eviction::Hidden));
            return Ok(events);
        }

        let (toast, phase, deadline) = match request.class {
            OverlayClass::Loading => {
                if request.payload.is_some() {
                    debug!("Ignoring payload on loading overlay");
                }
                (None, Phase::Pinned, None)
            }
            OverlayClass::Toast => {
                let Some(payload) = request.payload else {
                    warn!("Toast requested without a message");
                    return Err(RouteFailure::precondition(
                        "set_overlay",
                        "toast requires a message payload",
                    ));
                };
                (Some(payload), Phase::FadingIn, Some(now + self.timings.fade))
            }
        };

        events.extend(self.evict(request.class, Eviction::Replaced));

        let overlay = Overlay {
            id: Uuid::new_v4(),
            class: request.class,
            toast,
            phase,
            deadline,
        };
        info!("Showing {:?} overlay {}", overlay.class, overlay.id);
        self.slots.insert(request.class, overlay.clone());
        events.push(OverlayEvent::Attached(overlay));
        Ok(events)
    }

    /// Earliest deadline across live overlays.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.values().filter_map(|o| o.deadline).min()
    }

    /// Apply every deadline at or before `now`, in order.
    pub fn advance(&mut self, now: Instant) -> Vec<OverlayEvent> {
        let mut events = Vec::new();
        let mut classes: Vec<OverlayClass> = self.slots.keys().copied().collect();
        classes.sort();

        for class in classes {
            while let Some(overlay) = self.slots.get_mut(&class) {
                let Some(deadline) = overlay.deadline.filter(|d| *d <= now) else {
                    break;
                };
                let next = match overlay.phase {
                    Phase::FadingIn => Some((Phase::Visible, deadline + self.timings.visible)),
                    Phase::Visible => Some((Phase::FadingOut, deadline + self.timings.fade)),
                    Phase::FadingOut | Phase::Pinned => None,
                };
                match next {
                    Some((phase, deadline)) => {
                        overlay.phase = phase;
                        overlay.deadline = Some(deadline);
                        events.push(OverlayEvent::PhaseChanged {
                            id: overlay.id,
                            class,
                            phase,
                        });
                    }
                    None => {
                        events.extend(self.evict(class, Eviction::Expired));
                        break;
                    }
                }
            }
        }
        events
    }

    fn evict(&mut self, class: OverlayClass, reason: Eviction) -> Option<OverlayEvent> {
        let overlay = self.slots.remove(&class)?;
        debug!("Evicting {:?} overlay {} ({:?})", class, overlay.id, reason);
        Some(OverlayEvent::Detached {
            id: overlay.id,
            class,
            reason,
        })
    }
}

impl Default for OverlayManager {
    fn default() -> Self {
        Self::new(OverlayTimings::default())
    }
}
