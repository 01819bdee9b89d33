//! Trade journal - the system of record for opened and closed trades.
//!
//! Records persist as a JSON file when a path is configured; an in-memory
//! journal backs tests and dry runs. Every trade goes through exactly one
//! terminal transition from open to closed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{Platform, Side};

/// Errors from journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Reading or writing the journal file failed.
    #[error("journal I/O error at {path}: {source}")]
    Io {
        /// The journal file path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Journal records could not be serialized or deserialized.
    #[error("journal serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No trade with the given id exists.
    #[error("trade not found: {0}")]
    TradeNotFound(String),

    /// The trade has already been closed.
    #[error("trade already closed: {0}")]
    AlreadyClosed(String),
}

/// Lifecycle state of a journaled trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    /// Position is open.
    Open,
    /// Position has been closed and its result recorded.
    Closed,
}

/// Parameters for opening a journal entry.
#[derive(Debug, Clone)]
pub struct TradeOpen {
    /// Instrument symbol.
    pub symbol: String,
    /// Platform the trade executes on.
    pub platform: Platform,
    /// Trade direction.
    pub side: Side,
    /// Position size.
    pub quantity: Decimal,
    /// Fill price at open.
    pub entry_price: Decimal,
    /// Initial stop-loss, if any.
    pub stop_loss: Option<Decimal>,
    /// Take-profit target, if any.
    pub take_profit: Option<Decimal>,
    /// Risk-reward ratio the trade was approved with, if any.
    pub rr_ratio: Option<Decimal>,
}

/// A single journaled trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Journal-assigned trade id.
    pub id: String,
    /// Instrument symbol.
    pub symbol: String,
    /// Platform the trade executed on.
    pub platform: Platform,
    /// Trade direction.
    pub side: Side,
    /// Position size.
    pub quantity: Decimal,
    /// Fill price at open.
    pub entry_price: Decimal,
    /// Initial stop-loss, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Decimal>,
    /// Take-profit target, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Decimal>,
    /// Risk-reward ratio at approval time, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rr_ratio: Option<Decimal>,
    /// When the trade was opened.
    pub opened_at: DateTime<Utc>,
    /// When the trade was closed, if it has been.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Exit price, set at close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<Decimal>,
    /// Realized profit or loss as a signed fraction of entry, set at close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl_fraction: Option<Decimal>,
    /// Realized profit or loss in quote currency, set at close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl: Option<Decimal>,
    /// Lifecycle state.
    pub status: TradeStatus,
}

/// Aggregate performance statistics over closed trades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeStats {
    /// All trades ever journaled, open or closed.
    pub total_trades: usize,
    /// Closed trades with positive pnl.
    pub wins: usize,
    /// Closed trades with negative pnl.
    pub losses: usize,
    /// Wins over closed trades, zero when nothing has closed.
    pub win_rate: Decimal,
    /// Mean pnl fraction across wins, zero when there are none.
    pub avg_win: Decimal,
    /// Mean pnl fraction across losses (negative), zero when there are none.
    pub avg_loss: Decimal,
    /// Gross wins over gross loss magnitude, `None` with no losing trades.
    pub profit_factor: Option<Decimal>,
}

/// Append-style trade log with optional file persistence.
#[derive(Debug)]
pub struct TradeJournal {
    path: Option<PathBuf>,
    records: Vec<TradeRecord>,
    next_seq: u64,
}

impl TradeJournal {
    /// Open a journal backed by the given file, loading any existing
    /// records. A missing file starts an empty journal.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        let records: Vec<TradeRecord> = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|source| JournalError::Io {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };
        let next_seq = records.len() as u64 + 1;
        Ok(Self {
            path: Some(path),
            records,
            next_seq,
        })
    }

    /// Journal with no persistence.
    #[must_use]
    pub const fn in_memory() -> Self {
        Self {
            path: None,
            records: Vec::new(),
            next_seq: 1,
        }
    }

    /// Record a newly opened trade and return its journal id.
    pub fn log_trade(&mut self, open: TradeOpen) -> Result<String, JournalError> {
        let opened_at = Utc::now();
        let id = format!("TRADE_{}_{}", self.next_seq, opened_at.format("%Y%m%d%H%M%S"));
        self.next_seq += 1;

        self.records.push(TradeRecord {
            id: id.clone(),
            symbol: open.symbol,
            platform: open.platform,
            side: open.side,
            quantity: open.quantity,
            entry_price: open.entry_price,
            stop_loss: open.stop_loss,
            take_profit: open.take_profit,
            rr_ratio: open.rr_ratio,
            opened_at,
            closed_at: None,
            exit_price: None,
            pnl_fraction: None,
            pnl: None,
            status: TradeStatus::Open,
        });
        // A record that never reached disk must not survive in memory
        // either, or it would haunt stats() as a phantom open trade.
        if let Err(err) = self.persist() {
            self.records.pop();
            self.next_seq -= 1;
            return Err(err);
        }

        tracing::info!(trade_id = %id, "journal: trade opened");
        Ok(id)
    }

    /// Close an open trade at the given exit price and return the realized
    /// pnl as a signed fraction of the entry price.
    pub fn close_trade(
        &mut self,
        trade_id: &str,
        exit_price: Decimal,
    ) -> Result<Decimal, JournalError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == trade_id)
            .ok_or_else(|| JournalError::TradeNotFound(trade_id.to_string()))?;
        if record.status == TradeStatus::Closed {
            return Err(JournalError::AlreadyClosed(trade_id.to_string()));
        }

        let price_move = match record.side {
            Side::Buy => exit_price - record.entry_price,
            Side::Sell => record.entry_price - exit_price,
        };
        let pnl_fraction = if record.entry_price.is_zero() {
            Decimal::ZERO
        } else {
            price_move / record.entry_price
        };

        record.status = TradeStatus::Closed;
        record.closed_at = Some(Utc::now());
        record.exit_price = Some(exit_price);
        record.pnl_fraction = Some(pnl_fraction);
        record.pnl = Some(price_move * record.quantity);

        tracing::info!(
            trade_id,
            pnl_fraction = %pnl_fraction,
            "journal: trade closed"
        );

        self.persist()?;
        Ok(pnl_fraction)
    }

    /// A record by id.
    #[must_use]
    pub fn trade(&self, trade_id: &str) -> Option<&TradeRecord> {
        self.records.iter().find(|r| r.id == trade_id)
    }

    /// All records, oldest first.
    #[must_use]
    pub fn trades(&self) -> &[TradeRecord] {
        &self.records
    }

    /// Records still open.
    #[must_use]
    pub fn open_trades(&self) -> Vec<&TradeRecord> {
        self.records
            .iter()
            .filter(|r| r.status == TradeStatus::Open)
            .collect()
    }

    /// Aggregate statistics over the journal.
    #[must_use]
    pub fn stats(&self) -> TradeStats {
        let closed: Vec<Decimal> = self
            .records
            .iter()
            .filter_map(|r| r.pnl_fraction)
            .collect();
        let winners: Vec<Decimal> = closed.iter().copied().filter(|p| p.is_sign_positive() && !p.is_zero()).collect();
        let losers: Vec<Decimal> = closed.iter().copied().filter(Decimal::is_sign_negative).collect();

        let win_rate = if closed.is_empty() {
            Decimal::ZERO
        } else {
            Decimal::from(winners.len() as u64) / Decimal::from(closed.len() as u64)
        };
        let avg_win = mean(&winners);
        let avg_loss = mean(&losers);
        let gross_loss: Decimal = losers.iter().map(|p| p.abs()).sum();
        let profit_factor = if gross_loss.is_zero() {
            None
        } else {
            Some(winners.iter().sum::<Decimal>() / gross_loss)
        };

        TradeStats {
            total_trades: self.records.len(),
            wins: winners.len(),
            losses: losers.len(),
            win_rate,
            avg_win,
            avg_loss,
            profit_factor,
        }
    }

    fn persist(&self) -> Result<(), JournalError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| JournalError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        let raw = serde_json::to_string_pretty(&self.records)?;
        std::fs::write(path, raw).map_err(|source| JournalError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        Decimal::ZERO
    } else {
        values.iter().sum::<Decimal>() / Decimal::from(values.len() as u64)
    }
}
