//! Validation Engine Binary
//!
//! Reads structured trading commands as JSON lines, runs each through the
//! validation pipeline, and reports the outcomes.
//!
//! # Usage
//!
//! ```bash
//! # Commands from a file
//! cargo run --bin validation-engine -- commands.jsonl
//!
//! # Commands from stdin
//! cat commands.jsonl | cargo run --bin validation-engine
//! ```
//!
//! # Environment Variables
//!
//! - `VALIDATION_ENGINE_CONFIG`: Config file path (default: config.yaml)
//! - `RUST_LOG`: Log level override (default: from config)

use std::io::BufRead;
use std::sync::Arc;

use validation_engine::config::{Config, load_config};
use validation_engine::error::EngineError;
use validation_engine::journal::TradeJournal;
use validation_engine::models::Command;
use validation_engine::pipeline::{CommandPipeline, PaperRouter};

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    let config_path = std::env::var("VALIDATION_ENGINE_CONFIG").ok();
    let config = load_config(config_path.as_deref())?;

    init_tracing(&config);
    tracing::info!("Starting validation engine");

    let commands = read_commands(std::env::args().nth(1).as_deref())?;
    tracing::info!(count = commands.len(), "commands loaded");

    let journal = TradeJournal::new(&config.journal.path)?;
    let router = Arc::new(PaperRouter::new(config.platforms.clone()));
    let mut pipeline = CommandPipeline::new(&config, router, journal);

    let outcomes = pipeline.process_batch(&commands).await;
    for outcome in &outcomes {
        println!("{}", serde_json::to_string(outcome)?);
    }

    let snapshot = pipeline.snapshot();
    tracing::info!(
        processed = snapshot.processed,
        executed = snapshot.executed,
        rejected = snapshot.rejected,
        failed = snapshot.failed,
        "run complete"
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}

/// Read JSON-lines commands from a file, or stdin when no path is given.
fn read_commands(path: Option<&str>) -> Result<Vec<Command>, EngineError> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut lines = Vec::new();
            for line in std::io::stdin().lock().lines() {
                lines.push(line?);
            }
            lines.join("\n")
        }
    };

    let mut commands = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let command = serde_json::from_str(line).map_err(|source| EngineError::InvalidCommand {
            line: index + 1,
            source,
        })?;
        commands.push(command);
    }
    Ok(commands)
}

fn init_tracing(config: &Config) {
    let directive = format!("validation_engine={}", config.observability.logging.level);
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(
        directive
            .parse()
            .unwrap_or_else(|_| "validation_engine=info".parse().expect("static directive")),
    );

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.observability.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
