// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Validation Engine - Rust Core Library
//!
//! Deterministic validation and risk gating for structured trading
//! commands. Commands arrive already parsed; this crate decides whether
//! they execute and protects the resulting positions.
//!
//! # Pipeline
//!
//! Every command flows through a fixed sequence:
//!
//! 1. **Decision Engine** (`decision`): trade-quality rules - RR ratio,
//!    session window, H4 structure, multi-timeframe confirmation.
//! 2. **Risk Engine** (`risk`): account-level limits - drawdown budgets,
//!    concurrency cap, emergency stop.
//! 3. **Execution routing** (`pipeline`): platform capability checks and
//!    dispatch via the [`pipeline::ExecutionRouter`] port.
//! 4. **Drawdown Guard** (`guard`): breakeven, partial-profit, and
//!    trailing-stop protection for open positions.
//!
//! Rejection at any stage is terminal for that command and never an
//! error; batches continue past rejected commands.
//!
//! All monetary and fractional values use [`rust_decimal::Decimal`];
//! floats appear only at the configuration boundary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Configuration loading, validation, and env interpolation.
pub mod config;

/// Decision Engine - trade-quality validation rules.
pub mod decision;

/// Top-level error type.
pub mod error;

/// Drawdown Guard - open-position protection.
pub mod guard;

/// Trade journal - system of record for trades.
pub mod journal;

/// Core command and verdict models.
pub mod models;

/// Command pipeline and execution routing.
pub mod pipeline;

/// Risk Engine - account-level limit enforcement.
pub mod risk;

pub use config::{Config, load_config, load_config_from_string};
pub use decision::DecisionEngine;
pub use error::EngineError;
pub use guard::{DrawdownGuard, GuardEvent, MonitoredPosition};
pub use journal::{TradeJournal, TradeOpen, TradeRecord, TradeStatus};
pub use models::{Command, CommandAction, Platform, Side, Verdict};
pub use pipeline::{
    CommandOutcome, CommandPipeline, ExecutionReceipt, ExecutionRouter, PaperRouter, RejectStage,
};
pub use risk::{RiskEngine, RiskStatus};
