//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::dispatcher::{Router, Surface};
use crate::core::failure::Reporter;
use crate::stage::{HeadlessWindow, OverlayTimings, Shell};

/// A surface that only records what handlers did to it.
#[derive(Default)]
pub struct Recorder {
    pub log: Vec<String>,
    pub count: usize,
}

impl Surface for Recorder {}

/// Creates a router over a headless shell with default overlay timings.
pub fn test_router() -> Router<Shell<HeadlessWindow>> {
    let reporter = Reporter::new();
    let shell = Shell::new(HeadlessWindow::new(), OverlayTimings::default(), reporter.clone());
    Router::spawn(shell, reporter)
}
