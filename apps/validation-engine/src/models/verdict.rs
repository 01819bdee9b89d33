//! Approve/reject verdicts returned by the validation engines.

use serde::{Deserialize, Serialize};

/// Outcome of a single validation stage.
///
/// A rejection is a normal, expected outcome and is never surfaced as an
/// error; the reason string is meant for the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the command may proceed.
    pub approved: bool,
    /// Human-readable explanation.
    pub reason: String,
}

impl Verdict {
    /// Create an approving verdict.
    #[must_use]
    pub fn approve(reason: impl Into<String>) -> Self {
        Self {
            approved: true,
            reason: reason.into(),
        }
    }

    /// Create a rejecting verdict.
    #[must_use]
    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            reason: reason.into(),
        }
    }

    /// Returns true if the command was approved.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        self.approved
    }
}
