//! Command pipeline - the fixed validation and execution sequence.
//!
//! Every command flows Decision Engine, then Risk Engine, then the
//! execution router; executed trades are journaled, counted against risk
//! capacity, and handed to the Drawdown Guard for protection. Rejections
//! are terminal for the command but never abort a batch.

mod router;

pub use router::{ExecutionReceipt, ExecutionRouter, PaperRouter, RouterError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::decision::DecisionEngine;
use crate::guard::{DrawdownGuard, GuardEvent};
use crate::journal::{JournalError, TradeJournal, TradeOpen, TradeStats};
use crate::models::Command;
use crate::risk::{RiskEngine, RiskStatus};

/// Validation stage that rejected a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectStage {
    /// Trade-quality checks (RR, session, structure).
    Decision,
    /// Account-level limit checks.
    Risk,
}

impl std::fmt::Display for RejectStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decision => write!(f, "decision"),
            Self::Risk => write!(f, "risk"),
        }
    }
}

/// Terminal result of processing one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandOutcome {
    /// The command passed validation and the router accepted it.
    Executed {
        /// Router-assigned order id.
        order_id: String,
        /// Journal id for trading commands, `None` for chart actions.
        trade_id: Option<String>,
    },
    /// A validation stage rejected the command.
    Rejected {
        /// The stage that rejected.
        stage: RejectStage,
        /// The stage's reason string.
        reason: String,
    },
    /// Validation passed but routing or journaling failed.
    Failed {
        /// Description of the failure.
        error: String,
    },
}

impl CommandOutcome {
    /// Returns true for the executed outcome.
    #[must_use]
    pub const fn is_executed(&self) -> bool {
        matches!(self, Self::Executed { .. })
    }
}

/// Serializable counters describing pipeline activity since start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    /// Commands seen.
    pub processed: u64,
    /// Commands executed.
    pub executed: u64,
    /// Commands rejected by a validation stage.
    pub rejected: u64,
    /// Commands that failed at the router.
    pub failed: u64,
    /// Realized PnL fraction for the current day.
    pub daily_pnl: Decimal,
    /// Realized PnL fraction since start.
    pub total_pnl: Decimal,
    /// Current risk metrics.
    pub risk: RiskStatus,
    /// Positions currently under guard protection.
    pub monitored_positions: usize,
    /// Journal statistics.
    pub journal: TradeStats,
}

/// Owns the engines and drives commands through them in order.
pub struct CommandPipeline<R: ExecutionRouter> {
    decision: DecisionEngine,
    risk: RiskEngine,
    guard: DrawdownGuard,
    journal: TradeJournal,
    router: Arc<R>,
    processed: u64,
    executed: u64,
    rejected: u64,
    failed: u64,
    daily_pnl: Decimal,
    total_pnl: Decimal,
}

impl<R: ExecutionRouter> CommandPipeline<R> {
    /// Assemble the pipeline from configuration.
    #[must_use]
    pub fn new(config: &Config, router: Arc<R>, journal: TradeJournal) -> Self {
        Self {
            decision: DecisionEngine::new(&config.decision),
            risk: RiskEngine::new(&config.risk),
            guard: DrawdownGuard::new(&config.guard),
            journal,
            router,
            processed: 0,
            executed: 0,
            rejected: 0,
            failed: 0,
            daily_pnl: Decimal::ZERO,
            total_pnl: Decimal::ZERO,
        }
    }

    /// Run one command through validation and execution.
    ///
    /// Rejections short-circuit before any state changes. The journal is
    /// written only after the router accepts the command, and the risk
    /// slot is taken only after the journal write succeeds, so a routing
    /// or journaling failure leaves the account state exactly as it was.
    pub async fn process(&mut self, command: &Command) -> CommandOutcome {
        self.processed += 1;

        let verdict = self.decision.validate(command);
        if !verdict.is_approved() {
            self.rejected += 1;
            tracing::warn!(
                action = command.action.as_str(),
                reason = verdict.reason,
                "pipeline: rejected by decision engine"
            );
            return CommandOutcome::Rejected {
                stage: RejectStage::Decision,
                reason: verdict.reason,
            };
        }

        let verdict = self.risk.validate(command);
        if !verdict.is_approved() {
            self.rejected += 1;
            tracing::warn!(
                action = command.action.as_str(),
                reason = verdict.reason,
                "pipeline: rejected by risk engine"
            );
            return CommandOutcome::Rejected {
                stage: RejectStage::Risk,
                reason: verdict.reason,
            };
        }

        let receipt = match self.router.route(command).await {
            Ok(receipt) => receipt,
            Err(err) => {
                self.failed += 1;
                tracing::error!(
                    action = command.action.as_str(),
                    error = %err,
                    "pipeline: routing failed"
                );
                return CommandOutcome::Failed {
                    error: err.to_string(),
                };
            }
        };

        let trade_id = if command.is_trading() {
            match self.open_trade(command, &receipt) {
                Ok(trade_id) => trade_id,
                Err(err) => {
                    self.failed += 1;
                    tracing::error!(error = %err, "pipeline: journaling failed");
                    return CommandOutcome::Failed {
                        error: err.to_string(),
                    };
                }
            }
        } else {
            None
        };

        self.executed += 1;
        tracing::info!(
            action = command.action.as_str(),
            order_id = receipt.order_id,
            trade_id = ?trade_id,
            "pipeline: executed"
        );
        CommandOutcome::Executed {
            order_id: receipt.order_id,
            trade_id,
        }
    }

    /// Journal an executed trading command and put it under guard.
    ///
    /// The risk slot is taken only after the journal write succeeds, so a
    /// journaling failure changes nothing that `record_close` would have
    /// to undo.
    fn open_trade(
        &mut self,
        command: &Command,
        receipt: &ExecutionReceipt,
    ) -> Result<Option<String>, JournalError> {
        // The decision engine rejects side-less order commands, so this
        // only trips on a misconfigured custom router path.
        let Some(side) = command.side else {
            tracing::warn!(
                order_id = receipt.order_id,
                "pipeline: trade executed without side, nothing to track"
            );
            return Ok(None);
        };

        let entry_price = command.price.unwrap_or(Decimal::ZERO);
        let trade_id = self.journal.log_trade(TradeOpen {
            symbol: command
                .symbol
                .clone()
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            platform: receipt.platform,
            side,
            quantity: command.quantity.unwrap_or(Decimal::ZERO),
            entry_price,
            stop_loss: command.stop_loss,
            take_profit: command.take_profit,
            rr_ratio: command.rr_ratio,
        })?;
        self.risk.register_trade_opened();

        if let (Some(stop_loss), Some(take_profit)) = (command.stop_loss, command.take_profit)
            && !entry_price.is_zero()
        {
            self.guard
                .add_position(trade_id.clone(), entry_price, stop_loss, take_profit, side);
        }

        Ok(Some(trade_id))
    }

    /// Run a batch in order. A rejected or failed command never stops the
    /// rest of the batch.
    pub async fn process_batch(&mut self, commands: &[Command]) -> Vec<CommandOutcome> {
        let mut outcomes = Vec::with_capacity(commands.len());
        for command in commands {
            outcomes.push(self.process(command).await);
        }
        outcomes
    }

    /// Close a journaled trade: records the result, releases its risk
    /// slot, feeds the realized PnL into the drawdown accounting, and
    /// stops guard monitoring.
    pub fn record_close(
        &mut self,
        trade_id: &str,
        exit_price: Decimal,
    ) -> Result<Decimal, JournalError> {
        let pnl_fraction = self.journal.close_trade(trade_id, exit_price)?;
        self.risk.register_trade_closed(pnl_fraction);
        self.guard.remove_position(trade_id);
        self.daily_pnl += pnl_fraction;
        self.total_pnl += pnl_fraction;
        Ok(pnl_fraction)
    }

    /// Feed a price tick to a protected position.
    pub fn update_price(&mut self, trade_id: &str, price: Decimal) -> Vec<GuardEvent> {
        self.guard.update_price(trade_id, price)
    }

    /// Current risk metrics.
    #[must_use]
    pub const fn risk_status(&self) -> RiskStatus {
        self.risk.risk_status()
    }

    /// Start a new trading day.
    pub fn reset_daily(&mut self) {
        self.risk.reset_daily();
        self.daily_pnl = Decimal::ZERO;
    }

    /// Clear the emergency-stop latch (operator action).
    pub fn reset_emergency_stop(&mut self) {
        self.risk.reset_emergency_stop();
    }

    /// The trade journal.
    #[must_use]
    pub const fn journal(&self) -> &TradeJournal {
        &self.journal
    }

    /// The drawdown guard.
    #[must_use]
    pub const fn guard(&self) -> &DrawdownGuard {
        &self.guard
    }

    /// Serializable state snapshot.
    #[must_use]
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            processed: self.processed,
            executed: self.executed,
            rejected: self.rejected,
            failed: self.failed,
            daily_pnl: self.daily_pnl,
            total_pnl: self.total_pnl,
            risk: self.risk.risk_status(),
            monitored_positions: self.guard.monitored_count(),
            journal: self.journal.stats(),
        }
    }
}
