//! # Navigator
//!
//! The presentation stack. One root context, and a chain of modal contexts
//! layered above it.
//!
//! ```text
//! modals[1]   Alert("Network")         ← topmost, dismissed first
//! modals[0]   Stack[city_search]
//! root        Stack[weather_home, details]   ← push/pop act here when no modal
//! ```
//!
//! States: `NoRoot` → `set_root` → `RootOnly` ⇄ `RootWithModalChain(n)`.
//! `present` adds one modal, `dismiss` removes one, down to `RootOnly`.
//! Push and pop stay inside the topmost stack and never change modal depth.

use log::{debug, info, warn};
use serde::Serialize;

use super::window::{Transition, Window, WindowEvent};
use crate::core::failure::RouteFailure;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screen {
    pub id: String,
}

impl Screen {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertActionStyle {
    Default,
    Cancel,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertAction {
    pub title: String,
    pub style: AlertActionStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: Option<String>,
    pub actions: Vec<AlertAction>,
}

impl Alert {
    /// Error alert with a single "OK" button.
    pub fn error(title: impl Into<String>, message: Option<String>) -> Self {
        Self {
            title: title.into(),
            message,
            actions: vec![AlertAction {
                title: "OK".to_string(),
                style: AlertActionStyle::Default,
            }],
        }
    }
}

/// What a display context holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Content {
    /// A single screen. Cannot be pushed onto.
    Screen(Screen),
    /// A navigation stack, never empty. Supports push and pop.
    Stack(Vec<Screen>),
    Alert(Alert),
}

impl Content {
    pub fn stack(root: Screen) -> Self {
        Content::Stack(vec![root])
    }

    pub fn is_alert(&self) -> bool {
        matches!(self, Content::Alert(_))
    }

    pub fn is_stackable(&self) -> bool {
        matches!(self, Content::Stack(_))
    }

    pub fn label(&self) -> String {
        match self {
            Content::Screen(screen) => screen.id.clone(),
            Content::Stack(screens) => {
                let ids: Vec<&str> = screens.iter().map(|s| s.id.as_str()).collect();
                format!("stack[{}]", ids.join("/"))
            }
            Content::Alert(alert) => format!("alert[{}]", alert.title),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ModalStyle {
    #[default]
    Automatic,
    FullScreen,
    PageSheet,
    OverFullScreen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modal {
    pub content: Content,
    pub style: ModalStyle,
}

/// Everything currently on screen, root first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Presentation {
    pub root: Option<Content>,
    pub modals: Vec<Modal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationState {
    NoRoot,
    RootOnly,
    RootWithModalChain(usize),
}

/// What a `dismiss` call removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dismissal {
    Modal(Modal),
    Popped(Screen),
    Nothing,
}

pub struct Navigator<W> {
    window: W,
    presentation: Presentation,
}

impl<W: Window> Navigator<W> {
    pub fn new(window: W) -> Self {
        Self {
            window,
            presentation: Presentation::default(),
        }
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn state(&self) -> PresentationState {
        match (&self.presentation.root, self.presentation.modals.len()) {
            (None, _) => PresentationState::NoRoot,
            (Some(_), 0) => PresentationState::RootOnly,
            (Some(_), depth) => PresentationState::RootWithModalChain(depth),
        }
    }

    /// The innermost context: the last modal, or the root.
    pub fn top(&self) -> Option<&Content> {
        self.presentation
            .modals
            .last()
            .map(|m| &m.content)
            .or(self.presentation.root.as_ref())
    }

    fn top_mut(&mut self) -> Option<&mut Content> {
        match self.presentation.modals.last_mut() {
            Some(modal) => Some(&mut modal.content),
            None => self.presentation.root.as_mut(),
        }
    }

    /// Replace everything on screen. Modals above the old root go with it.
    pub fn set_root(&mut self, content: Content, transition: Option<Transition>) {
        info!("Setting root: {}", content.label());
        self.presentation.modals.clear();
        self.presentation.root = Some(content.clone());
        self.window.apply(WindowEvent::RootReplaced(content));
        if let Some(transition) = transition {
            self.window.apply(WindowEvent::Animated {
                transition,
                effect: transition.effect(),
            });
        }
    }

    pub fn push(&mut self, screen: Screen) -> Result<(), RouteFailure> {
        match self.top_mut() {
            Some(Content::Stack(screens)) => {
                debug!("Pushing screen: {}", screen.id);
                screens.push(screen.clone());
                self.window.apply(WindowEvent::Pushed(screen));
                Ok(())
            }
            Some(other) => {
                let reason = format!("top context {} is not a stack", other.label());
                warn!("Cannot push {}: {}", screen.id, reason);
                Err(RouteFailure::precondition("push", reason))
            }
            None => {
                warn!("Cannot push {}: no root", screen.id);
                Err(RouteFailure::precondition("push", "no root context"))
            }
        }
    }

    /// Pop the topmost stack. Its root screen is never popped.
    pub fn pop(&mut self) -> Option<Screen> {
        let popped = match self.top_mut() {
            Some(Content::Stack(screens)) if screens.len() > 1 => screens.pop(),
            _ => None,
        };
        if let Some(screen) = &popped {
            debug!("Popped screen: {}", screen.id);
            self.window.apply(WindowEvent::Popped(screen.clone()));
        }
        popped
    }

    pub fn present(&mut self, content: Content, style: Option<ModalStyle>) -> Result<(), RouteFailure> {
        if self.presentation.root.is_none() {
            warn!("Cannot present {}: no root", content.label());
            return Err(RouteFailure::precondition("present", "no root context"));
        }
        let modal = Modal {
            content,
            style: style.unwrap_or_default(),
        };
        info!(
            "Presenting {} at depth {}",
            modal.content.label(),
            self.presentation.modals.len() + 1
        );
        self.presentation.modals.push(modal.clone());
        self.window.apply(WindowEvent::Presented(modal));
        Ok(())
    }

    pub fn dismiss(&mut self) -> Dismissal {
        if let Some(modal) = self.presentation.modals.pop() {
            info!("Dismissed {}", modal.content.label());
            self.window.apply(WindowEvent::Dismissed(modal.clone()));
            return Dismissal::Modal(modal);
        }
        match self.pop() {
            Some(screen) => Dismissal::Popped(screen),
            None => {
                debug!("Dismiss with nothing to dismiss");
                Dismissal::Nothing
            }
        }
    }

    /// Present `alert` unless an alert is already topmost.
    ///
    /// `Ok(false)` means an alert was already showing. With no root the
    /// precondition failure from [`Self::present`] is handed back.
    pub fn present_alert_if_possible(&mut self, alert: Alert) -> Result<bool, RouteFailure> {
        self.present_alert_if_possible_then(alert, || {})
    }

    /// Like [`Self::present_alert_if_possible`]; `on_presented` runs once, only if it did.
    pub fn present_alert_if_possible_then<F: FnOnce()>(
        &mut self,
        alert: Alert,
        on_presented: F,
    ) -> Result<bool, RouteFailure> {
        if self.top().is_some_and(Content::is_alert) {
            debug!("Alert already showing, skipping: {}", alert.title);
            return Ok(false);
        }
        self.present(Content::Alert(alert), None)?;
        on_presented();
        Ok(true)
    }
}
