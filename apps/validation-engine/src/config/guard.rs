//! Drawdown Guard threshold configuration.

use serde::{Deserialize, Serialize};

/// Profit thresholds driving position protection.
///
/// All values are signed profit fractions relative to the entry price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Profit at which the stop moves to breakeven.
    #[serde(default = "default_breakeven_trigger")]
    pub breakeven_trigger: f64,
    /// Profit at which a partial-profit signal is emitted.
    #[serde(default = "default_partial_trigger")]
    pub partial_trigger: f64,
    /// Profit at which the trailing stop engages.
    #[serde(default = "default_trailing_trigger")]
    pub trailing_trigger: f64,
    /// Fraction of current profit kept as trailing distance.
    #[serde(default = "default_trail_factor")]
    pub trail_factor: f64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            breakeven_trigger: default_breakeven_trigger(),
            partial_trigger: default_partial_trigger(),
            trailing_trigger: default_trailing_trigger(),
            trail_factor: default_trail_factor(),
        }
    }
}

const fn default_breakeven_trigger() -> f64 {
    0.01
}

const fn default_partial_trigger() -> f64 {
    0.015
}

const fn default_trailing_trigger() -> f64 {
    0.02
}

const fn default_trail_factor() -> f64 {
    0.5
}
