//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.wayfinder/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::stage::overlay::{DEFAULT_TOAST_FADE_MS, DEFAULT_TOAST_VISIBLE_MS, OverlayTimings};
use crate::stage::window::DEFAULT_TRANSITION_MS;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WayfinderConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NavigationConfig {
    pub transition_ms: Option<u64>,
    pub splash_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OverlayConfig {
    pub toast_fade_ms: Option<u64>,
    pub toast_visible_ms: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_FILE: &str = "wayfinder.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;
pub const DEFAULT_SPLASH_MS: u64 = 1200;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
    pub transition: Duration,
    pub splash: Duration,
    pub overlay_timings: OverlayTimings,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.wayfinder/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".wayfinder").join("config.toml"))
}

/// Load config from `~/.wayfinder/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `WayfinderConfig::default()`.
pub fn load_config() -> Result<WayfinderConfig, ConfigError> {
    match config_path() {
        Some(path) => {
            if !path.exists() {
                info!("No config file found, generating default at {}", path.display());
                generate_default_config(&path);
                return Ok(WayfinderConfig::default());
            }
            load_config_from(&path)
        }
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(WayfinderConfig::default())
        }
    }
}

/// Load config from an explicit path. A missing file is an error here.
pub fn load_config_from(path: &Path) -> Result<WayfinderConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: WayfinderConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Wayfinder Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# log_level = "debug"                # "off", "error", "warn", "info", "debug", "trace"
# log_file = "wayfinder.log"         # Or set WAYFINDER_LOG_FILE

# [navigation]
# transition_ms = 250                # Root swap animation length
# splash_ms = 1200                   # How long the splash stays before home

# [overlay]
# toast_fade_ms = 300
# toast_visible_ms = 2000
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &WayfinderConfig, cli_log_level: Option<&str>) -> ResolvedConfig {
    // Log level: CLI → env → config → default
    let log_level = cli_log_level
        .map(|s| s.to_string())
        .or_else(|| std::env::var("WAYFINDER_LOG_LEVEL").ok())
        .or_else(|| config.general.log_level.clone())
        .and_then(|s| parse_level(&s))
        .unwrap_or(DEFAULT_LOG_LEVEL);

    // Log file: env → config → default
    let log_file = std::env::var("WAYFINDER_LOG_FILE")
        .ok()
        .or_else(|| config.general.log_file.clone())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

    let millis = |value: Option<u64>, default: u64| Duration::from_millis(value.unwrap_or(default));

    ResolvedConfig {
        log_level,
        log_file: PathBuf::from(log_file),
        transition: millis(config.navigation.transition_ms, DEFAULT_TRANSITION_MS),
        splash: millis(config.navigation.splash_ms, DEFAULT_SPLASH_MS),
        overlay_timings: OverlayTimings {
            fade: millis(config.overlay.toast_fade_ms, DEFAULT_TOAST_FADE_MS),
            visible: millis(config.overlay.toast_visible_ms, DEFAULT_TOAST_VISIBLE_MS),
        },
    }
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    match LevelFilter::from_str(value) {
        Ok(level) => Some(level),
        Err(_) => {
            warn!("Unknown log level '{}', using default", value);
            None
        }
    }
}
