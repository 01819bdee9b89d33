//! Drawdown Guard - active protection for open positions.
//!
//! One state machine per monitored position, driven by price updates:
//! breakeven move, partial-profit signal, trailing stop. The guard owns
//! no execution effects; each price update returns the protection events
//! that fired so the caller can act on them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::GuardConfig;
use crate::models::Side;

/// Protection event fired by a price update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardEvent {
    /// Stop-loss moved to the entry price.
    BreakevenMoved {
        /// Position the event applies to.
        position_id: String,
        /// The new stop-loss (the entry price).
        stop_loss: Decimal,
    },
    /// Partial profit should be taken. Pure notification; the execution
    /// layer owns the actual order.
    PartialProfitSignal {
        /// Position the event applies to.
        position_id: String,
    },
    /// Trailing stop tightened to a new level.
    TrailingStopTightened {
        /// Position the event applies to.
        position_id: String,
        /// The new stop-loss level.
        stop_loss: Decimal,
    },
}

/// A position under guard protection.
///
/// The `breakeven_moved` and `partial_taken` latches are monotonic: they
/// transition false to true at most once and never revert while the
/// position is monitored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoredPosition {
    entry_price: Decimal,
    stop_loss: Decimal,
    take_profit: Decimal,
    side: Side,
    breakeven_moved: bool,
    partial_taken: bool,
    added_at: DateTime<Utc>,
}

impl MonitoredPosition {
    fn new(entry_price: Decimal, stop_loss: Decimal, take_profit: Decimal, side: Side) -> Self {
        Self {
            entry_price,
            stop_loss,
            take_profit,
            side,
            breakeven_moved: false,
            partial_taken: false,
            added_at: Utc::now(),
        }
    }

    /// Entry price.
    #[must_use]
    pub const fn entry_price(&self) -> Decimal {
        self.entry_price
    }

    /// Current stop-loss level.
    #[must_use]
    pub const fn stop_loss(&self) -> Decimal {
        self.stop_loss
    }

    /// Take-profit target.
    #[must_use]
    pub const fn take_profit(&self) -> Decimal {
        self.take_profit
    }

    /// Position side.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Whether the stop has been moved to breakeven.
    #[must_use]
    pub const fn breakeven_moved(&self) -> bool {
        self.breakeven_moved
    }

    /// Whether partial profit has been signalled.
    #[must_use]
    pub const fn partial_taken(&self) -> bool {
        self.partial_taken
    }

    /// When monitoring started.
    #[must_use]
    pub const fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    /// Signed profit fraction relative to entry at the given price.
    fn profit_fraction(&self, price: Decimal) -> Decimal {
        match self.side {
            Side::Buy => (price - self.entry_price) / self.entry_price,
            Side::Sell => (self.entry_price - price) / self.entry_price,
        }
    }
}

/// Monitors open positions and drives their protection state machines.
#[derive(Debug)]
pub struct DrawdownGuard {
    breakeven_trigger: Decimal,
    partial_trigger: Decimal,
    trailing_trigger: Decimal,
    trail_factor: Decimal,
    positions: HashMap<String, MonitoredPosition>,
}

impl DrawdownGuard {
    /// Build from configuration with no monitored positions.
    #[must_use]
    pub fn new(config: &GuardConfig) -> Self {
        Self {
            breakeven_trigger: Decimal::try_from(config.breakeven_trigger)
                .unwrap_or_else(|_| Decimal::new(1, 2)),
            partial_trigger: Decimal::try_from(config.partial_trigger)
                .unwrap_or_else(|_| Decimal::new(15, 3)),
            trailing_trigger: Decimal::try_from(config.trailing_trigger)
                .unwrap_or_else(|_| Decimal::new(2, 2)),
            trail_factor: Decimal::try_from(config.trail_factor)
                .unwrap_or_else(|_| Decimal::new(5, 1)),
            positions: HashMap::new(),
        }
    }

    /// Start monitoring a position. Overwrites (and resets the latches of)
    /// any existing position with the same id.
    pub fn add_position(
        &mut self,
        position_id: impl Into<String>,
        entry_price: Decimal,
        stop_loss: Decimal,
        take_profit: Decimal,
        side: Side,
    ) {
        let position_id = position_id.into();
        tracing::info!(position_id, %entry_price, "guard: monitoring position");
        self.positions.insert(
            position_id,
            MonitoredPosition::new(entry_price, stop_loss, take_profit, side),
        );
    }

    /// Stop monitoring a position. Unknown ids are ignored.
    pub fn remove_position(&mut self, position_id: &str) -> Option<MonitoredPosition> {
        let removed = self.positions.remove(position_id);
        if removed.is_some() {
            tracing::info!(position_id, "guard: stopped monitoring");
        }
        removed
    }

    /// Feed a price update to a position and run its protection checks.
    ///
    /// Returns the events that fired this tick, in check order. No-op for
    /// unknown ids. The three checks are independent (several can fire on
    /// the same tick) and evaluated in a fixed order so a later stop
    /// computation is never undone by an earlier one within the tick.
    pub fn update_price(&mut self, position_id: &str, current_price: Decimal) -> Vec<GuardEvent> {
        let Some(position) = self.positions.get_mut(position_id) else {
            return Vec::new();
        };
        if position.entry_price.is_zero() {
            return Vec::new();
        }

        let profit = position.profit_fraction(current_price);
        let mut events = Vec::new();

        if !position.breakeven_moved && profit >= self.breakeven_trigger {
            position.stop_loss = position.entry_price;
            position.breakeven_moved = true;
            tracing::info!(position_id, "guard: moved stop to breakeven");
            events.push(GuardEvent::BreakevenMoved {
                position_id: position_id.to_string(),
                stop_loss: position.stop_loss,
            });
        }

        if !position.partial_taken && profit >= self.partial_trigger {
            position.partial_taken = true;
            tracing::info!(position_id, "guard: partial profit signal");
            events.push(GuardEvent::PartialProfitSignal {
                position_id: position_id.to_string(),
            });
        }

        if profit >= self.trailing_trigger {
            let trail_distance = profit * self.trail_factor;
            let (candidate, tightened) = match position.side {
                Side::Buy => {
                    let candidate = current_price * (Decimal::ONE - trail_distance);
                    (candidate, candidate > position.stop_loss)
                }
                Side::Sell => {
                    let candidate = current_price * (Decimal::ONE + trail_distance);
                    (candidate, candidate < position.stop_loss)
                }
            };

            // The trailing stop only ever tightens.
            if tightened {
                position.stop_loss = candidate;
                tracing::info!(position_id, stop_loss = %candidate, "guard: trailing stop tightened");
                events.push(GuardEvent::TrailingStopTightened {
                    position_id: position_id.to_string(),
                    stop_loss: candidate,
                });
            }
        }

        events
    }

    /// A monitored position by id.
    #[must_use]
    pub fn position(&self, position_id: &str) -> Option<&MonitoredPosition> {
        self.positions.get(position_id)
    }

    /// Read-only snapshot of all monitored positions.
    #[must_use]
    pub fn protected_positions(&self) -> HashMap<String, MonitoredPosition> {
        self.positions.clone()
    }

    /// Number of monitored positions.
    #[must_use]
    pub fn monitored_count(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn guard() -> DrawdownGuard {
        DrawdownGuard::new(&GuardConfig::default())
    }

    fn dec(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    #[test]
    fn breakeven_move_at_one_percent() {
        let mut guard = guard();
        guard.add_position("P1", dec(100, 0), dec(98, 0), dec(105, 0), Side::Buy);

        let events = guard.update_price("P1", dec(101, 0));

        let position = guard.position("P1").unwrap();
        assert_eq!(position.stop_loss(), dec(100, 0));
        assert!(position.breakeven_moved());
        assert_eq!(
            events,
            vec![GuardEvent::BreakevenMoved {
                position_id: "P1".to_string(),
                stop_loss: dec(100, 0),
            }]
        );
    }

    #[test]
    fn no_action_below_threshold() {
        let mut guard = guard();
        guard.add_position("P1", dec(100, 0), dec(98, 0), dec(105, 0), Side::Buy);

        let events = guard.update_price("P1", dec(1005, 1)); // +0.5%
        assert!(events.is_empty());

        let position = guard.position("P1").unwrap();
        assert_eq!(position.stop_loss(), dec(98, 0));
        assert!(!position.breakeven_moved());
    }

    #[test]
    fn unknown_position_is_noop() {
        let mut guard = guard();
        assert!(guard.update_price("missing", dec(100, 0)).is_empty());
    }

    #[test]
    fn partial_profit_fires_once() {
        let mut guard = guard();
        guard.add_position("P1", dec(100, 0), dec(98, 0), dec(105, 0), Side::Buy);

        let events = guard.update_price("P1", dec(1016, 1)); // +1.6%
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GuardEvent::PartialProfitSignal { .. }))
        );

        // Same profit again: latch prevents a second signal
        let events = guard.update_price("P1", dec(1016, 1));
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GuardEvent::PartialProfitSignal { .. }))
        );
        assert!(guard.position("P1").unwrap().partial_taken());
    }

    #[test]
    fn latches_never_revert() {
        let mut guard = guard();
        guard.add_position("P1", dec(100, 0), dec(98, 0), dec(110, 0), Side::Buy);

        guard.update_price("P1", dec(102, 0));
        assert!(guard.position("P1").unwrap().breakeven_moved());
        assert!(guard.position("P1").unwrap().partial_taken());

        // Price falls back below every threshold; latches stay set
        guard.update_price("P1", dec(99, 0));
        assert!(guard.position("P1").unwrap().breakeven_moved());
        assert!(guard.position("P1").unwrap().partial_taken());
    }

    #[test]
    fn all_three_checks_fire_on_one_tick() {
        let mut guard = guard();
        guard.add_position("P1", dec(100, 0), dec(98, 0), dec(110, 0), Side::Buy);

        // +3% crosses breakeven, partial, and trailing thresholds at once
        let events = guard.update_price("P1", dec(103, 0));
        assert_eq!(events.len(), 3);

        // Trailing stop must end above breakeven: 103 * (1 - 0.015) = 101.455
        let position = guard.position("P1").unwrap();
        assert_eq!(position.stop_loss(), dec(101_455, 3));
    }

    #[test]
    fn trailing_stop_tightens_for_buy() {
        let mut guard = guard();
        guard.add_position("P1", dec(100, 0), dec(98, 0), dec(120, 0), Side::Buy);

        guard.update_price("P1", dec(102, 0)); // +2%: trail = 102 * 0.99 = 100.98
        let first = guard.position("P1").unwrap().stop_loss();
        assert_eq!(first, dec(100_98, 2));

        guard.update_price("P1", dec(104, 0)); // +4%: trail = 104 * 0.98 = 101.92
        let second = guard.position("P1").unwrap().stop_loss();
        assert_eq!(second, dec(101_92, 2));
        assert!(second > first);
    }

    #[test]
    fn trailing_stop_never_loosens() {
        let mut guard = guard();
        guard.add_position("P1", dec(100, 0), dec(98, 0), dec(120, 0), Side::Buy);

        guard.update_price("P1", dec(110, 0)); // +10%: trail = 110 * 0.95 = 104.5
        let high_water = guard.position("P1").unwrap().stop_loss();
        assert_eq!(high_water, dec(104_5, 1));

        // Price retreats but stays above the trailing trigger; the
        // candidate stop would be lower and must be ignored.
        let events = guard.update_price("P1", dec(103, 0));
        assert!(events.is_empty());
        assert_eq!(guard.position("P1").unwrap().stop_loss(), high_water);
    }

    #[test]
    fn sell_side_protection() {
        let mut guard = guard();
        guard.add_position("P1", dec(100, 0), dec(102, 0), dec(95, 0), Side::Sell);

        // -1% in price is +1% profit for a short
        guard.update_price("P1", dec(99, 0));
        let position = guard.position("P1").unwrap();
        assert!(position.breakeven_moved());
        assert_eq!(position.stop_loss(), dec(100, 0));

        // +4% profit: trail = 96 * 1.02 = 97.92, below the breakeven stop
        guard.update_price("P1", dec(96, 0));
        assert_eq!(guard.position("P1").unwrap().stop_loss(), dec(97_92, 2));
    }

    #[test]
    fn add_position_overwrites_by_id() {
        let mut guard = guard();
        guard.add_position("P1", dec(100, 0), dec(98, 0), dec(105, 0), Side::Buy);
        guard.update_price("P1", dec(102, 0));
        assert!(guard.position("P1").unwrap().breakeven_moved());

        guard.add_position("P1", dec(200, 0), dec(196, 0), dec(210, 0), Side::Buy);
        let position = guard.position("P1").unwrap();
        assert_eq!(position.entry_price(), dec(200, 0));
        assert!(!position.breakeven_moved());
        assert_eq!(guard.monitored_count(), 1);
    }

    #[test]
    fn remove_position_stops_monitoring() {
        let mut guard = guard();
        guard.add_position("P1", dec(100, 0), dec(98, 0), dec(105, 0), Side::Buy);

        assert!(guard.remove_position("P1").is_some());
        assert!(guard.remove_position("P1").is_none());
        assert!(guard.update_price("P1", dec(105, 0)).is_empty());
    }

    #[test]
    fn snapshot_is_detached() {
        let mut guard = guard();
        guard.add_position("P1", dec(100, 0), dec(98, 0), dec(105, 0), Side::Buy);

        let snapshot = guard.protected_positions();
        guard.update_price("P1", dec(101, 0));

        // The snapshot reflects the state at capture time
        assert!(!snapshot["P1"].breakeven_moved());
        assert!(guard.position("P1").unwrap().breakeven_moved());
    }

    proptest! {
        /// For a BUY position the stop only ever moves up across
        /// monotonically increasing prices.
        #[test]
        fn buy_stop_is_monotone_under_rising_prices(
            steps in proptest::collection::vec(1u32..50, 1..30),
        ) {
            let mut guard = guard();
            guard.add_position("P1", dec(1000, 1), dec(98, 0), dec(200, 0), Side::Buy);

            let mut price = dec(1000, 1);
            let mut last_stop = dec(98, 0);
            for step in steps {
                price += Decimal::new(i64::from(step), 1);
                guard.update_price("P1", price);
                let stop = guard.position("P1").unwrap().stop_loss();
                prop_assert!(stop >= last_stop);
                last_stop = stop;
            }
        }
    }
}
