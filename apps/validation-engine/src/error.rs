//! Top-level error type for the engine binary.

use crate::config::ConfigError;
use crate::journal::JournalError;
use crate::pipeline::RouterError;

/// Umbrella error for engine startup and operation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Trade journal operation failed.
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// Command routing failed.
    #[error(transparent)]
    Router(#[from] RouterError),

    /// An I/O operation outside the journal failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A command line could not be parsed.
    #[error("invalid command on line {line}: {source}")]
    InvalidCommand {
        /// 1-based input line number.
        line: usize,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An outcome or snapshot could not be serialized for output.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
