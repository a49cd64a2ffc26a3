//! Wayfinder library exports for testing

use clap::ValueEnum;

pub mod app;
pub mod core;
pub mod network;
pub mod stage;

#[cfg(test)]
pub mod test_support;

/// Scripted flows the binary can run.
#[derive(Clone, Debug, Default, ValueEnum)]
pub enum Scenario {
    /// Splash, home, then a successful forecast fetch.
    #[default]
    Startup,
    /// Same as startup, but the forecast fetch fails.
    Offline,
    /// Push details, open search, raise an alert, then unwind.
    Modal,
}
