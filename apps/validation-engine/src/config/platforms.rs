//! Per-platform enablement configuration.

use serde::{Deserialize, Serialize};

use crate::models::Platform;

/// Enablement flag for a single platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformToggle {
    /// Whether commands may be routed to this platform.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for PlatformToggle {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

const fn default_enabled() -> bool {
    true
}

/// Enablement flags for every supported platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformsConfig {
    /// TradingView charting.
    #[serde(default)]
    pub tradingview: PlatformToggle,
    /// Binance spot exchange.
    #[serde(default)]
    pub binance: PlatformToggle,
    /// Bybit derivatives exchange.
    #[serde(default)]
    pub bybit: PlatformToggle,
    /// MetaTrader 5 terminal.
    #[serde(default)]
    pub mt5: PlatformToggle,
}

impl PlatformsConfig {
    /// Whether the given platform is enabled.
    #[must_use]
    pub const fn is_enabled(&self, platform: Platform) -> bool {
        match platform {
            Platform::Tradingview => self.tradingview.enabled,
            Platform::Binance => self.binance.enabled,
            Platform::Bybit => self.bybit.enabled,
            Platform::Mt5 => self.mt5.enabled,
        }
    }
}
