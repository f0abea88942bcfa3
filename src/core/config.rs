//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.parley/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SimulatorConfig {
    /// Delay before a canned reply is delivered, in milliseconds.
    pub reply_delay_ms: Option<u64>,
    /// RNG seed for deterministic reply selection.
    pub seed: Option<u64>,
    /// Override for the fixed transcription sentence.
    pub transcript: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Delay before the simulated sign-in resolves, in milliseconds.
    pub delay_ms: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_REPLY_DELAY_MS: u64 = 1000;
pub const DEFAULT_AUTH_DELAY_MS: u64 = 1000;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub reply_delay_ms: u64,
    pub auth_delay_ms: u64,
    pub seed: Option<u64>,
    pub transcript: String,
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

/// Returns the path to `~/.parley/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".parley").join("config.toml"))
}

/// Load config from `~/.parley/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ParleyConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ParleyConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ParleyConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(ParleyConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: ParleyConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Parley Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [simulator]
# reply_delay_ms = 1000     # Simulated assistant latency
# seed = 42                 # Deterministic reply selection
# transcript = "This is a simulated voice message transcription."

# [auth]
# delay_ms = 1000           # Simulated sign-in latency
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

/// Resolve the final config by collapsing: defaults → config file → env
/// vars → CLI flags. `cli_reply_delay_ms` and `cli_seed` come from CLI
/// flags (None = not specified).
pub fn resolve(
    config: &ParleyConfig,
    cli_reply_delay_ms: Option<u64>,
    cli_seed: Option<u64>,
) -> ResolvedConfig {
    // Reply delay: CLI → env → config → default
    let reply_delay_ms = cli_reply_delay_ms
        .or_else(|| env_u64("PARLEY_REPLY_DELAY_MS"))
        .or(config.simulator.reply_delay_ms)
        .unwrap_or(DEFAULT_REPLY_DELAY_MS);

    // Auth delay: env → config → default
    let auth_delay_ms = env_u64("PARLEY_AUTH_DELAY_MS")
        .or(config.auth.delay_ms)
        .unwrap_or(DEFAULT_AUTH_DELAY_MS);

    // Seed: CLI → env → config (no default: unseeded means OS entropy)
    let seed = cli_seed
        .or_else(|| env_u64("PARLEY_SEED"))
        .or(config.simulator.seed);

    let transcript = config
        .simulator
        .transcript
        .clone()
        .unwrap_or_else(|| crate::backend::simulated::DEFAULT_TRANSCRIPT.to_string());

    ResolvedConfig {
        reply_delay_ms,
        auth_delay_ms,
        seed,
        transcript,
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring non-numeric {name}={raw}");
            None
        }
    }
}
