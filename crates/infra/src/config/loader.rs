//! Configuration loader
//!
//! Loads the gateway configuration from a file and the environment.
//!
//! ## Loading Strategy
//! 1. Reads `.env` into the process environment if present
//! 2. Loads the file named by `BACKOFFICE_CONFIG`, or the first file found among the search paths
//! 3. Falls back to built-in defaults when no file exists
//! 4. Applies environment overrides
//! 5. Validates addresses and structural invariants
//!
//! ## Environment Variables
//! - `BACKOFFICE_CONFIG`: Path to a JSON or TOML config file
//! - `BACKOFFICE_DEFAULT_ADDRESS`: Candidate for families without addresses
//! - `BACKOFFICE_OFFLINE_STORE`: Offline store path (`memory` or empty keeps
//!   the queue in memory only)
//! - `BACKOFFICE_MAX_ATTEMPTS`: Attempts per candidate
//! - `BACKOFFICE_BACKOFF_STEP_MS`: Linear backoff step in milliseconds
//! - `BACKOFFICE_WALK_DEADLINE_MS`: Upper bound on one failover walk
//!
//! ## File Locations
//! Without `BACKOFFICE_CONFIG` the loader searches, in order:
//! 1. `./backoffice.toml`
//! 2. `./backoffice.json`
//! 3. `./config/backoffice.toml`

use std::path::{Path, PathBuf};
use std::str::FromStr;

use backoffice_domain::{GatewayConfig, GatewayError, Result};
use url::Url;

pub const CONFIG_PATH_VAR: &str = "BACKOFFICE_CONFIG";
pub const DEFAULT_ADDRESS_VAR: &str = "BACKOFFICE_DEFAULT_ADDRESS";
pub const OFFLINE_STORE_VAR: &str = "BACKOFFICE_OFFLINE_STORE";
pub const MAX_ATTEMPTS_VAR: &str = "BACKOFFICE_MAX_ATTEMPTS";
pub const BACKOFF_STEP_VAR: &str = "BACKOFFICE_BACKOFF_STEP_MS";
pub const WALK_DEADLINE_VAR: &str = "BACKOFFICE_WALK_DEADLINE_MS";

const SEARCHED_PATHS: [&str; 3] = ["backoffice.toml", "backoffice.json", "config/backoffice.toml"];

/// Load configuration with the full strategy described in the module docs
///
/// # Errors
/// Returns `GatewayError::Config` if:
/// - `BACKOFFICE_CONFIG` names a missing or unreadable file
/// - The file format is invalid
/// - An environment override does not parse
/// - Validation fails
pub fn load() -> Result<GatewayConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let mut config = match std::env::var(CONFIG_PATH_VAR).ok().filter(|p| !p.trim().is_empty()) {
        Some(path) => load_from_file(Path::new(path.trim()))?,
        None => match find_config_file() {
            Some(path) => load_from_file(&path)?,
            None => {
                tracing::info!("no configuration file found, using defaults");
                GatewayConfig::default()
            }
        },
    };

    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

/// Load and parse a configuration file. Format is detected by extension.
///
/// # Errors
/// Returns `GatewayError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: &Path) -> Result<GatewayConfig> {
    if !path.exists() {
        return Err(GatewayError::Config(format!("Config file not found: {}", path.display())));
    }

    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| GatewayError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

fn parse_config(contents: &str, path: &Path) -> Result<GatewayConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GatewayError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GatewayError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(GatewayError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing file among the searched locations, relative to the
/// working directory
pub fn find_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    SEARCHED_PATHS.iter().map(|relative| cwd.join(relative)).find(|path| path.exists())
}

/// Apply `BACKOFFICE_*` overrides on top of `config`
///
/// # Errors
/// Returns `GatewayError::Config` when a numeric override does not parse.
pub fn apply_env_overrides(config: &mut GatewayConfig) -> Result<()> {
    if let Some(address) = env_string(DEFAULT_ADDRESS_VAR) {
        config.default_address = address;
    }
    if let Ok(store) = std::env::var(OFFLINE_STORE_VAR) {
        let store = store.trim();
        config.offline.store_path =
            if store.is_empty() || store.eq_ignore_ascii_case("memory") { None } else { Some(store.to_string()) };
    }
    if let Some(attempts) = env_number::<u32>(MAX_ATTEMPTS_VAR)? {
        config.retry.max_attempts = attempts;
    }
    if let Some(step) = env_number::<u64>(BACKOFF_STEP_VAR)? {
        config.retry.backoff_step_ms = step;
    }
    if let Some(deadline) = env_number::<u64>(WALK_DEADLINE_VAR)? {
        config.walk_deadline_ms = (deadline > 0).then_some(deadline);
    }
    Ok(())
}

/// Structural validation plus address syntax
///
/// # Errors
/// Returns `GatewayError::Config` describing the first violation found.
pub fn validate(config: &GatewayConfig) -> Result<()> {
    config.validate()?;
    validate_address("default_address", &config.default_address)?;
    for (name, family) in &config.families {
        for address in &family.addresses {
            validate_address(&format!("families.{name}"), address)?;
        }
    }
    Ok(())
}

fn validate_address(context: &str, address: &str) -> Result<()> {
    let url = Url::parse(address.trim())
        .map_err(|e| GatewayError::Config(format!("{context}: invalid address '{address}': {e}")))?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(()),
        _ => Err(GatewayError::Config(format!(
            "{context}: address '{address}' must be an absolute http(s) URL"
        ))),
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_number<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| GatewayError::Config(format!("Invalid {key} '{raw}': {e}")))
        })
        .transpose()
}
