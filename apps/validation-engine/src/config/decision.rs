//! Decision Engine rule configuration.

use serde::{Deserialize, Serialize};

/// Structural trade-validation rules.
///
/// All keys are required: a missing key is a startup failure, never a
/// silent default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Require the H4 structure to agree with the trade direction.
    pub require_h4_structure: bool,
    /// Require multi-timeframe confirmation.
    pub require_mtf_confirmation: bool,
    /// Minimum reward-to-risk ratio for a setup.
    pub min_rr_ratio: f64,
    /// Sessions in which trading is allowed (matched case-insensitively).
    pub allowed_sessions: Vec<String>,
}
