//! Risk Engine limit configuration.

use serde::{Deserialize, Serialize};

/// Account-level risk limits.
///
/// Drawdown and per-trade limits are fractions of account equity. All keys
/// are required: a missing key is a startup failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Maximum fraction of equity at risk on a single trade.
    pub max_risk_per_trade: f64,
    /// Maximum daily cumulative loss fraction.
    pub max_daily_drawdown: f64,
    /// Maximum total (since inception) cumulative loss fraction.
    pub max_total_drawdown: f64,
    /// Maximum number of concurrently open trades.
    pub max_concurrent_trades: u32,
    /// Latch the emergency stop when a drawdown limit is breached.
    pub emergency_stop_enabled: bool,
}
