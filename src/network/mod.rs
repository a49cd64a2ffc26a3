//! # Network Boundary
//!
//! The routing core does not speak HTTP. It only needs something that can
//! perform a request and hand back a decoded value, plus the habit of
//! raising the loading overlay around it.

pub mod client;

pub use client::{Method, NetworkClient, NetworkError, Request, fetch};
