//! Risk Engine - account-level limit enforcement.
//!
//! Owns the single mutable risk state: running drawdown fractions, the
//! open-trade count, and the emergency-stop latch. Trading commands are
//! checked against the configured limits in a fixed order with
//! short-circuit rejection; breaching a drawdown limit can trip the
//! emergency stop, which only a manual reset clears.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RiskConfig;
use crate::models::{Command, Verdict};

/// Fraction of the per-trade maximum assumed while real position sizing
/// (stop distance x quantity / equity) is not wired in.
const RISK_ESTIMATE_FACTOR: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Snapshot of the current risk state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskStatus {
    /// Cumulative loss fraction for the current day.
    pub daily_drawdown: Decimal,
    /// Cumulative loss fraction since inception.
    pub total_drawdown: Decimal,
    /// Number of currently open trades.
    pub active_trades: u32,
    /// Whether the emergency stop is latched.
    pub emergency_stopped: bool,
    /// Remaining concurrent-trade capacity.
    pub available_slots: u32,
}

/// Enforces account-level risk limits over mutable running state.
#[derive(Debug)]
pub struct RiskEngine {
    max_risk_per_trade: Decimal,
    max_daily_drawdown: Decimal,
    max_total_drawdown: Decimal,
    max_concurrent_trades: u32,
    emergency_stop_enabled: bool,

    daily_drawdown: Decimal,
    current_drawdown: Decimal,
    active_trades: u32,
    emergency_stopped: bool,
}

impl RiskEngine {
    /// Build from configuration with fresh running state.
    #[must_use]
    pub fn new(config: &RiskConfig) -> Self {
        Self {
            max_risk_per_trade: Decimal::try_from(config.max_risk_per_trade)
                .unwrap_or_else(|_| Decimal::new(2, 2)),
            max_daily_drawdown: Decimal::try_from(config.max_daily_drawdown)
                .unwrap_or_else(|_| Decimal::new(5, 2)),
            max_total_drawdown: Decimal::try_from(config.max_total_drawdown)
                .unwrap_or_else(|_| Decimal::new(10, 2)),
            max_concurrent_trades: config.max_concurrent_trades,
            emergency_stop_enabled: config.emergency_stop_enabled,
            daily_drawdown: Decimal::ZERO,
            current_drawdown: Decimal::ZERO,
            active_trades: 0,
            emergency_stopped: false,
        }
    }

    /// Validate a command against the risk limits.
    ///
    /// Checks run in a fixed order and the first failure rejects. Takes
    /// `&mut self` because a drawdown breach may trip the emergency-stop
    /// latch as a side effect of validation.
    pub fn validate(&mut self, command: &Command) -> Verdict {
        // Only order-entry actions consume risk budget.
        if !command.action.is_trading() {
            return Verdict::approve("Non-trading action approved");
        }

        if self.emergency_stopped {
            tracing::warn!("risk: emergency stop active, rejecting trading command");
            return Verdict::reject("Emergency stop activated");
        }

        if self.daily_drawdown >= self.max_daily_drawdown {
            self.maybe_trip_emergency_stop("daily drawdown");
            return Verdict::reject(format!(
                "Daily drawdown limit reached ({:.2}%)",
                self.daily_drawdown * HUNDRED
            ));
        }

        if self.current_drawdown >= self.max_total_drawdown {
            self.maybe_trip_emergency_stop("total drawdown");
            return Verdict::reject(format!(
                "Total drawdown limit reached ({:.2}%)",
                self.current_drawdown * HUNDRED
            ));
        }

        if self.active_trades >= self.max_concurrent_trades {
            return Verdict::reject(format!(
                "Max concurrent trades reached ({})",
                self.active_trades
            ));
        }

        let risk_estimate = self.estimated_trade_risk();
        if risk_estimate > self.max_risk_per_trade {
            return Verdict::reject(format!(
                "Trade risk {:.2}% exceeds max {:.2}%",
                risk_estimate * HUNDRED,
                self.max_risk_per_trade * HUNDRED
            ));
        }

        Verdict::approve("Within risk limits")
    }

    /// Estimate the per-trade risk as a fraction of equity.
    ///
    /// Placeholder pending account-balance and stop-distance integration:
    /// assumes 80% of the configured per-trade maximum.
    fn estimated_trade_risk(&self) -> Decimal {
        self.max_risk_per_trade * RISK_ESTIMATE_FACTOR
    }

    fn maybe_trip_emergency_stop(&mut self, trigger: &str) {
        if self.emergency_stop_enabled && !self.emergency_stopped {
            self.emergency_stopped = true;
            tracing::warn!(trigger, "risk: emergency stop tripped");
        }
    }

    /// Record a trade opening.
    pub fn register_trade_opened(&mut self) {
        self.active_trades += 1;
    }

    /// Record a trade closing with its realized PnL fraction.
    ///
    /// A loss adds its magnitude to both drawdown horizons. A win reduces
    /// the total drawdown by half its magnitude, floored at zero: recovery
    /// is asymmetric because equity volatility, not just net PnL, drives
    /// the risk budget.
    pub fn register_trade_closed(&mut self, pnl_fraction: Decimal) {
        self.active_trades = self.active_trades.saturating_sub(1);

        if pnl_fraction < Decimal::ZERO {
            let loss = pnl_fraction.abs();
            self.daily_drawdown += loss;
            self.current_drawdown += loss;
        } else {
            let credit = pnl_fraction * Decimal::new(5, 1);
            self.current_drawdown = (self.current_drawdown - credit).max(Decimal::ZERO);
        }
    }

    /// Reset the daily drawdown counter (start of a new trading day).
    pub fn reset_daily(&mut self) {
        self.daily_drawdown = Decimal::ZERO;
    }

    /// Clear the emergency-stop latch. Manual intervention only; nothing
    /// in the engine calls this.
    pub fn reset_emergency_stop(&mut self) {
        self.emergency_stopped = false;
        tracing::info!("risk: emergency stop reset");
    }

    /// Current risk metrics.
    #[must_use]
    pub const fn risk_status(&self) -> RiskStatus {
        RiskStatus {
            daily_drawdown: self.daily_drawdown,
            total_drawdown: self.current_drawdown,
            active_trades: self.active_trades,
            emergency_stopped: self.emergency_stopped,
            available_slots: self.max_concurrent_trades.saturating_sub(self.active_trades),
        }
    }

    /// Whether the emergency stop is latched.
    #[must_use]
    pub const fn is_emergency_stopped(&self) -> bool {
        self.emergency_stopped
    }
}
