//! End-to-end tests for the command pipeline: decision gating, risk
//! gating, execution routing, journaling, and position protection
//! working together against a realistic configuration.

use std::sync::Arc;

use rust_decimal::Decimal;
use validation_engine::config::load_config_from_string;
use validation_engine::journal::TradeJournal;
use validation_engine::models::{Command, CommandAction, Platform, Side};
use validation_engine::pipeline::{CommandOutcome, CommandPipeline, PaperRouter, RejectStage};
use validation_engine::{Config, GuardEvent};

const CONFIG_YAML: &str = r"
decision:
  require_h4_structure: true
  require_mtf_confirmation: true
  min_rr_ratio: 2.0
  allowed_sessions:
    - london
    - new_york
risk:
  max_risk_per_trade: 0.02
  max_daily_drawdown: 0.05
  max_total_drawdown: 0.10
  max_concurrent_trades: 3
  emergency_stop_enabled: true
platforms:
  mt5:
    enabled: false
";

fn config() -> Config {
    load_config_from_string(CONFIG_YAML).expect("inline config is valid")
}

fn pipeline() -> CommandPipeline<PaperRouter> {
    let config = config();
    let router = Arc::new(PaperRouter::new(config.platforms.clone()));
    CommandPipeline::new(&config, router, TradeJournal::in_memory())
}

fn trade(entry: i64) -> Command {
    let mut command = Command::market_order(Platform::Binance, "BTCUSDT", Side::Buy, Decimal::ONE);
    command.price = Some(Decimal::new(entry, 0));
    command.stop_loss = Some(Decimal::new(entry - 2, 0));
    command.take_profit = Some(Decimal::new(entry + 4, 0));
    command.rr_ratio = Some(Decimal::new(2, 0));
    command.session = Some("london".to_string());
    command
}

fn trade_id(outcome: CommandOutcome) -> String {
    match outcome {
        CommandOutcome::Executed { trade_id, .. } => trade_id.expect("trading command"),
        other => panic!("expected execution, got {other:?}"),
    }
}

#[tokio::test]
async fn full_lifecycle_open_protect_close() {
    let mut pipeline = pipeline();

    let id = trade_id(pipeline.process(&trade(100)).await);
    assert_eq!(pipeline.risk_status().active_trades, 1);

    // +1% moves the stop to breakeven
    let events = pipeline.update_price(&id, Decimal::new(101, 0));
    assert!(matches!(
        events.as_slice(),
        [GuardEvent::BreakevenMoved { stop_loss, .. }] if *stop_loss == Decimal::new(100, 0)
    ));

    // Close at +3%
    let pnl = pipeline.record_close(&id, Decimal::new(103, 0)).unwrap();
    assert_eq!(pnl, Decimal::new(3, 2));

    let status = pipeline.risk_status();
    assert_eq!(status.active_trades, 0);
    assert_eq!(status.daily_drawdown, Decimal::ZERO);

    let stats = pipeline.journal().stats();
    assert_eq!(stats.wins, 1);
    assert_eq!(stats.losses, 0);
}

#[tokio::test]
async fn decision_rejections_report_stage_and_reason() {
    let mut pipeline = pipeline();

    let mut low_rr = trade(100);
    low_rr.rr_ratio = Some(Decimal::new(15, 1));
    let mut bad_session = trade(100);
    bad_session.session = Some("tokyo".to_string());
    let mut no_structure = trade(100);
    no_structure.h4_structure_aligned = Some(false);

    let outcomes = pipeline
        .process_batch(&[low_rr, bad_session, no_structure])
        .await;

    let reasons: Vec<(RejectStage, String)> = outcomes
        .into_iter()
        .map(|outcome| match outcome {
            CommandOutcome::Rejected { stage, reason } => (stage, reason),
            other => panic!("expected rejection, got {other:?}"),
        })
        .collect();

    assert!(reasons[0].1.contains("1.5") && reasons[0].1.contains("2.0"));
    assert!(reasons[1].1.contains("tokyo"));
    assert!(reasons[2].1.contains("H4"));
    assert!(reasons.iter().all(|(stage, _)| *stage == RejectStage::Decision));

    // None of the rejections consumed a risk slot
    assert_eq!(pipeline.risk_status().active_trades, 0);
}

#[tokio::test]
async fn concurrency_cap_then_slot_reuse() {
    let mut pipeline = pipeline();

    let first = trade_id(pipeline.process(&trade(100)).await);
    trade_id(pipeline.process(&trade(200)).await);
    trade_id(pipeline.process(&trade(300)).await);

    let outcome = pipeline.process(&trade(400)).await;
    assert!(matches!(
        outcome,
        CommandOutcome::Rejected {
            stage: RejectStage::Risk,
            ..
        }
    ));

    // Closing one trade frees a slot
    pipeline.record_close(&first, Decimal::new(101, 0)).unwrap();
    assert!(pipeline.process(&trade(400)).await.is_executed());
}

#[tokio::test]
async fn losses_trip_emergency_stop_and_reset_recovers() {
    let mut pipeline = pipeline();

    // Three trades closed at -2% each: daily drawdown 6% > 5% limit
    for entry in [100, 200, 300] {
        let id = trade_id(pipeline.process(&trade(entry)).await);
        let exit = Decimal::new(entry, 0) * Decimal::new(98, 2);
        pipeline.record_close(&id, exit).unwrap();
    }

    let outcome = pipeline.process(&trade(400)).await;
    let CommandOutcome::Rejected { stage, reason } = outcome else {
        panic!("expected rejection");
    };
    assert_eq!(stage, RejectStage::Risk);
    assert!(reason.contains("Daily drawdown"));
    assert!(pipeline.risk_status().emergency_stopped);

    // Latch holds even after the daily counter resets
    pipeline.reset_daily();
    let outcome = pipeline.process(&trade(400)).await;
    assert!(matches!(
        outcome,
        CommandOutcome::Rejected { reason, .. } if reason.contains("Emergency stop")
    ));

    // Manual reset restores trading
    pipeline.reset_emergency_stop();
    assert!(pipeline.process(&trade(400)).await.is_executed());
}

#[tokio::test]
async fn disabled_platform_fails_without_state_changes() {
    let mut pipeline = pipeline();
    let mut command = trade(100);
    command.platform = Some(Platform::Mt5);

    let outcome = pipeline.process(&command).await;
    let CommandOutcome::Failed { error } = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert!(error.contains("mt5"));

    let snapshot = pipeline.snapshot();
    assert_eq!(snapshot.failed, 1);
    assert_eq!(snapshot.risk.active_trades, 0);
    assert_eq!(snapshot.journal.total_trades, 0);
}

#[tokio::test]
async fn chart_commands_pass_without_trade_fields() {
    let mut pipeline = pipeline();
    let command = Command::non_trading(CommandAction::ApplyFib, Platform::Tradingview);

    let outcome = pipeline.process(&command).await;
    assert!(outcome.is_executed());
    assert_eq!(pipeline.risk_status().active_trades, 0);
}

#[tokio::test]
async fn snapshot_counts_every_outcome() {
    let mut pipeline = pipeline();
    let mut rejected = trade(100);
    rejected.rr_ratio = Some(Decimal::ONE);
    let mut failed = trade(100);
    failed.platform = Some(Platform::Mt5);

    pipeline
        .process_batch(&[trade(100), rejected, failed])
        .await;

    let snapshot = pipeline.snapshot();
    assert_eq!(snapshot.processed, 3);
    assert_eq!(snapshot.executed, 1);
    assert_eq!(snapshot.rejected, 1);
    assert_eq!(snapshot.failed, 1);
    assert_eq!(snapshot.monitored_positions, 1);
}
