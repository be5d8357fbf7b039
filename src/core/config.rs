//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.threadview/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ThreadviewConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SourceConfig {
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub time_format: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SOURCE_URL: &str = "http://localhost:3000/api/messages";
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub source_url: String,
    pub time_format: String,
    pub log_level: LevelFilter,
}

/// Values given on the command line. `None` means "not specified".
#[derive(Debug, Default)]
pub struct CliOverrides<'a> {
    pub url: Option<&'a str>,
    pub log_level: Option<&'a str>,
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

/// Returns the path to `~/.threadview/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".threadview").join("config.toml"))
}

/// Load config from `~/.threadview/config.toml`.
pub fn load_config() -> Result<ThreadviewConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(ThreadviewConfig::default())
        }
    }
}

/// Load config from an explicit path.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ThreadviewConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config_from(path: &Path) -> Result<ThreadviewConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(ThreadviewConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ThreadviewConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Threadview Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# log_level = "debug"                # "error", "warn", "info", "debug", "trace"

# [source]
# url = "http://localhost:3000/api/messages"   # Or set THREADVIEW_SOURCE_URL

# [display]
# time_format = "%H:%M"              # strftime format for message timestamps
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
pub fn resolve(config: &ThreadviewConfig, cli: &CliOverrides<'_>) -> ResolvedConfig {
    // Source URL: CLI → env → config → default
    let source_url = cli
        .url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("THREADVIEW_SOURCE_URL").ok())
        .or_else(|| config.source.url.clone())
        .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());

    // Log level: CLI → env → config → default. Unknown names fall through.
    let log_level = cli
        .log_level
        .and_then(parse_level)
        .or_else(|| {
            std::env::var("THREADVIEW_LOG_LEVEL")
                .ok()
                .as_deref()
                .and_then(parse_level)
        })
        .or_else(|| config.general.log_level.as_deref().and_then(parse_level))
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let time_format = config
        .display
        .time_format
        .clone()
        .filter(|format| !format.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TIME_FORMAT.to_string());

    ResolvedConfig {
        source_url,
        time_format,
        log_level,
    }
}

fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}
