//! # Routes
//!
//! A route is an immutable value describing something the app should do
//! next: show a screen, raise an alert, flash a toast. Producers build one
//! and hand it to the router; they never learn who handles it.
//!
//! Dispatch identity is the route's *type*, not its field values. Two
//! `ShowToast` values with different messages go to the same handler.
//!
//! ```text
//! ShowToast { message: "Saved", kind: Success }
//!     │
//!     └── RouteId::of::<ShowToast>()  →  handler registered for ShowToast
//! ```
//!
//! Adding a route means adding a type and implementing [`Route`] for it.
//! The dispatcher never changes.

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marker for values that can be dispatched through the router.
pub trait Route: Any + Send + fmt::Debug {}

/// Static identity of a route type.
///
/// Equality and hashing use only the `TypeId`; the name is carried for logs.
#[derive(Clone, Copy, Debug)]
pub struct RouteId {
    type_id: TypeId,
    name: &'static str,
}

impl RouteId {
    pub fn of<R: Route>() -> Self {
        Self {
            type_id: TypeId::of::<R>(),
            name: short_type_name(std::any::type_name::<R>()),
        }
    }

    /// Short type name, e.g. `ShowToast`.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for RouteId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for RouteId {}

impl Hash for RouteId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Strips the module path (and any generic arguments) from a type name.
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ============================================================================
// Known routes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    #[default]
    Info,
}

impl ToastKind {
    /// Glyph shown next to the toast message.
    pub fn symbol(self) -> &'static str {
        match self {
            ToastKind::Success => "✓",
            ToastKind::Error => "!",
            ToastKind::Info => "i",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowSplash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowWeatherHome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowErrorAlert {
    pub title: String,
    pub message: Option<String>,
}

impl ShowErrorAlert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowToast {
    pub message: String,
    pub kind: ToastKind,
}

impl ShowToast {
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetLoadingOverlay {
    pub visible: bool,
}

/// Opens the city search sheet above the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowCitySearch;

/// Pushes the detail screen for one city onto the current stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowWeatherDetails {
    pub city: String,
}

/// Closes whatever is innermost: a modal if one is up, else the top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissPresented;

impl Route for ShowSplash {}
impl Route for ShowWeatherHome {}
impl Route for ShowErrorAlert {}
impl Route for ShowToast {}
impl Route for SetLoadingOverlay {}
impl Route for ShowCitySearch {}
impl Route for ShowWeatherDetails {}
impl Route for DismissPresented {}
