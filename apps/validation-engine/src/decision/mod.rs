//! Decision Engine - structural trade validation.
//!
//! Validates trade setups against static rules: reward-to-risk ratio,
//! session membership, and higher-timeframe confirmation flags. Pure
//! function of command + configuration; no side effects, no state.

use rust_decimal::Decimal;

use crate::config::DecisionConfig;
use crate::models::{Command, Verdict};

/// Validates commands against structural trading rules.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    require_h4: bool,
    require_mtf: bool,
    min_rr: Decimal,
    /// Allowed sessions, lowercased for case-insensitive matching.
    allowed_sessions: Vec<String>,
}

impl DecisionEngine {
    /// Build from configuration.
    #[must_use]
    pub fn new(config: &DecisionConfig) -> Self {
        Self {
            require_h4: config.require_h4_structure,
            require_mtf: config.require_mtf_confirmation,
            min_rr: Decimal::try_from(config.min_rr_ratio).unwrap_or_else(|_| Decimal::new(2, 0)),
            allowed_sessions: config
                .allowed_sessions
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
        }
    }

    /// Validate a command against the decision rules.
    ///
    /// Non-trading actions are always approved; trading actions go through
    /// the structural checks in a fixed order, first failure wins.
    #[must_use]
    pub fn validate(&self, command: &Command) -> Verdict {
        if !command.action.is_trading() {
            return Verdict::approve("Non-trading action approved");
        }

        self.validate_trade(command)
    }

    fn validate_trade(&self, command: &Command) -> Verdict {
        // An order without a direction cannot be journaled, risk-tracked,
        // or protected downstream.
        if command.side.is_none() {
            return Verdict::reject("Order side not specified");
        }

        // Absent RR ratio is treated as zero and rejected against any
        // positive minimum.
        let rr_ratio = command.rr_ratio.unwrap_or(Decimal::ZERO);
        if rr_ratio < self.min_rr {
            return Verdict::reject(format!(
                "RR ratio {:.2} below minimum {:.2}",
                rr_ratio, self.min_rr
            ));
        }

        if let Some(session) = &command.session {
            let session = session.to_lowercase();
            if !session.is_empty() && !self.allowed_sessions.contains(&session) {
                return Verdict::reject(format!("Session {session} not in allowed sessions"));
            }
        }

        // An absent flag approves: the check only bites when the upstream
        // producer sets it explicitly.
        if self.require_h4 && !command.h4_structure_aligned.unwrap_or(true) {
            return Verdict::reject("H4 structure not aligned");
        }

        if self.require_mtf && !command.mtf_confirmed.unwrap_or(true) {
            return Verdict::reject("Multi-timeframe not confirmed");
        }

        Verdict::approve("Structure aligned, RR valid, session approved")
    }
}
