//! # Routing Core
//!
//! Decouples whoever *wants* something shown from whoever *shows* it.
//! It knows nothing about screens or windows.
//!
//! ```text
//!     producers (view models, request wrappers, timers)
//!            │  router.dispatch(ShowToast { .. })
//!            ▼
//!  ┌──────────────────────────────┐
//!  │           CORE               │
//!  │  (this module)               │
//!  │                              │
//!  │  • Route (what to do)        │
//!  │  • RouteRegistry (who does)  │
//!  │  • Router (when, in order)   │
//!  │  • RouteFailure (what broke) │
//!  └──────────────┬───────────────┘
//!                 │ handler(route, &mut Surface)
//!                 ▼
//!        ┌────────────────┐
//!        │     STAGE      │
//!        │ navigator +    │
//!        │ overlays       │
//!        └────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`route`]: The `Route` trait, `RouteId`, and the app's route types
//! - [`registry`]: Type-erased handler storage
//! - [`dispatcher`]: The `Router` handle and its single worker
//! - [`failure`]: `RouteFailure` and the `Reporter` that broadcasts it
//! - [`config`]: Settings and their override hierarchy

pub mod config;
pub mod dispatcher;
pub mod failure;
pub mod registry;
pub mod route;

pub use dispatcher::{Router, Surface};
pub use failure::{Reporter, RouteFailure};
pub use registry::HandlerFuture;
