//! Configuration module for the validation engine.
//!
//! Provides configuration loading, validation, and environment variable
//! interpolation for all engine components.
//!
//! # Usage
//!
//! ```rust,ignore
//! use validation_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Access configuration values
//! println!("min RR: {}", config.decision.min_rr_ratio);
//! ```

mod decision;
mod guard;
mod journal;
mod observability;
mod platforms;
mod risk;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use decision::DecisionConfig;
pub use guard::GuardConfig;
pub use journal::JournalConfig;
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use platforms::{PlatformToggle, PlatformsConfig};
pub use risk::RiskConfig;

/// Configuration errors.
///
/// All of these are fatal at startup; there is no mid-session recovery
/// from a bad configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration (including missing required keys).
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
///
/// The `decision` and `risk` sections are required; everything else has
/// sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Decision Engine rules.
    pub decision: DecisionConfig,
    /// Risk Engine limits.
    pub risk: RiskConfig,
    /// Drawdown Guard thresholds.
    #[serde(default)]
    pub guard: GuardConfig,
    /// Per-platform enablement.
    #[serde(default)]
    pub platforms: PlatformsConfig,
    /// Trade journal persistence.
    #[serde(default)]
    pub journal: JournalConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let mut result = input.to_string();

    // Match ${VAR} or ${VAR:-default} patterns
    let re = ENV_VAR_REGEX.get_or_init(|| {
        // This regex pattern is compile-time constant and always valid
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    for cap in re.captures_iter(input) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let Some(var_match) = cap.get(1) else {
            continue;
        };
        let full_match = full_match.as_str();
        let var_name = var_match.as_str();
        let default_value = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        };

        result = result.replace(full_match, &value);
    }

    result
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !config.decision.min_rr_ratio.is_finite() || config.decision.min_rr_ratio <= 0.0 {
        return Err(ConfigError::ValidationError(
            "decision.min_rr_ratio must be positive".to_string(),
        ));
    }

    for (name, value) in [
        ("risk.max_risk_per_trade", config.risk.max_risk_per_trade),
        ("risk.max_daily_drawdown", config.risk.max_daily_drawdown),
        ("risk.max_total_drawdown", config.risk.max_total_drawdown),
    ] {
        if !value.is_finite() || value <= 0.0 || value > 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "{name} must be a fraction in (0.0, 1.0]"
            )));
        }
    }

    if config.risk.max_concurrent_trades == 0 {
        return Err(ConfigError::ValidationError(
            "risk.max_concurrent_trades must be at least 1".to_string(),
        ));
    }

    let g = &config.guard;
    for (name, value) in [
        ("guard.breakeven_trigger", g.breakeven_trigger),
        ("guard.partial_trigger", g.partial_trigger),
        ("guard.trailing_trigger", g.trailing_trigger),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "{name} must be positive"
            )));
        }
    }

    if !g.trail_factor.is_finite() || g.trail_factor <= 0.0 || g.trail_factor >= 1.0 {
        return Err(ConfigError::ValidationError(
            "guard.trail_factor must be in (0.0, 1.0)".to_string(),
        ));
    }

    Ok(())
}
