//! Configuration loader for the sleep dashboard service.
//!
//! This module centralizes all runtime configuration values and their
//! defaults, loading from environment variables (with optional `.env` file
//! support provided by the caller). By consolidating configuration logic
//! here, we avoid scattering `env::var` calls throughout the codebase.

use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent
/// configuration snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Sleep data microservice base URL.
    pub api_base_url: String,

    /// Timeout for outbound requests to the microservice, in seconds.
    pub api_timeout_secs: u32,

    /// Default page size for listing UIs.
    pub items_per_page: u32,

    /// Dashboard date-range length when the request does not supply one.
    pub default_range_days: u32,

    /// Session-signing secret, kept on the configuration surface for
    /// deployment parity. Masked when logged.
    pub secret_key: String,

    /// Debug toggle; lifts the default log verbosity.
    pub debug: bool,

    /// Address the HTTP server binds to.
    pub bind_addr: String,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `SLEEP_API_BASE_URL` – sleep data microservice base URL
///
/// Optional:
/// - `SLEEP_API_TIMEOUT_SECS` – outbound request timeout (default: 10)
/// - `ITEMS_PER_PAGE` – listing page size (default: 10)
/// - `DEFAULT_DATE_RANGE_DAYS` – dashboard window fallback (default: 7)
/// - `SECRET_KEY` – session-signing secret (default: dev placeholder)
/// - `DEBUG` – `true` to lift log verbosity (default: false)
/// - `BIND_ADDR` – listen address (default: `0.0.0.0:8080`)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let api_base_url = require_env!("SLEEP_API_BASE_URL");
    let api_timeout_secs = parse_env_u32!("SLEEP_API_TIMEOUT_SECS", 10);
    let items_per_page = parse_env_u32!("ITEMS_PER_PAGE", 10);
    let default_range_days = parse_env_u32!("DEFAULT_DATE_RANGE_DAYS", 7);
    let secret_key = env::var("SECRET_KEY")
        .unwrap_or_else(|_| "dev-secret-key-change-in-production".to_string());
    let debug = matches!(
        env::var("DEBUG").ok().as_deref(),
        Some("true") | Some("True") | Some("1")
    );
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    Ok(Config {
        api_base_url,
        api_timeout_secs,
        items_per_page,
        default_range_days,
        secret_key,
        debug,
        bind_addr,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the session secret while showing all configuration values
    /// that were loaded.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  SLEEP_API_BASE_URL      : {}", self.api_base_url);
        tracing::info!("  SLEEP_API_TIMEOUT_SECS  : {}", self.api_timeout_secs);
        tracing::info!("  ITEMS_PER_PAGE          : {}", self.items_per_page);
        tracing::info!("  DEFAULT_DATE_RANGE_DAYS : {}", self.default_range_days);
        tracing::info!("  SECRET_KEY              : ****");
        tracing::info!("  DEBUG                   : {}", self.debug);
        tracing::info!("  BIND_ADDR               : {}", self.bind_addr);
    }
}
