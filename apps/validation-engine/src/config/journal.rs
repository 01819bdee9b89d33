//! Trade journal persistence configuration.

use serde::{Deserialize, Serialize};

/// Trade journal persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Path of the JSON journal file.
    #[serde(default = "default_journal_path")]
    pub path: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: default_journal_path(),
        }
    }
}

fn default_journal_path() -> String {
    "journal/trades.json".to_string()
}
