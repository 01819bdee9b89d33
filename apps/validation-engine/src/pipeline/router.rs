//! Execution routing port.
//!
//! The pipeline hands approved commands to an [`ExecutionRouter`]; the
//! trait is the seam where real platform adapters plug in. [`PaperRouter`]
//! is the built-in simulated implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::PlatformsConfig;
use crate::models::{Command, Platform};

/// Confirmation returned by a router for an executed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    /// Router-assigned order id.
    pub order_id: String,
    /// Platform the command was routed to.
    pub platform: Platform,
}

/// Errors from routing a command to a platform.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The command names no platform to route to.
    #[error("Platform not specified in command")]
    PlatformMissing,

    /// The platform exists but is disabled in configuration.
    #[error("Platform {0} is disabled")]
    PlatformDisabled(Platform),

    /// The platform cannot perform the requested action.
    #[error("Platform {platform} does not support {action}")]
    UnsupportedAction {
        /// The target platform.
        platform: Platform,
        /// The unsupported action.
        action: String,
    },

    /// The platform adapter itself failed.
    #[error("execution failed: {0}")]
    Execution(String),
}

/// Dispatches approved commands to a trading platform.
#[async_trait]
pub trait ExecutionRouter: Send + Sync {
    /// Route one command, returning a receipt on success.
    async fn route(&self, command: &Command) -> Result<ExecutionReceipt, RouterError>;
}

/// Simulated router: validates platform support, records the command,
/// and fabricates an order id. No external side effects.
#[derive(Debug)]
pub struct PaperRouter {
    platforms: PlatformsConfig,
    routed: RwLock<Vec<Command>>,
}

impl PaperRouter {
    /// Build from platform toggles.
    #[must_use]
    pub fn new(platforms: PlatformsConfig) -> Self {
        Self {
            platforms,
            routed: RwLock::new(Vec::new()),
        }
    }

    /// Commands routed so far, oldest first.
    pub async fn routed(&self) -> Vec<Command> {
        self.routed.read().await.clone()
    }
}

#[async_trait]
impl ExecutionRouter for PaperRouter {
    async fn route(&self, command: &Command) -> Result<ExecutionReceipt, RouterError> {
        let platform = command.platform.ok_or(RouterError::PlatformMissing)?;
        if !self.platforms.is_enabled(platform) {
            return Err(RouterError::PlatformDisabled(platform));
        }
        if !platform.supports(command.action) {
            return Err(RouterError::UnsupportedAction {
                platform,
                action: command.action.as_str().to_string(),
            });
        }

        let order_id = format!("PAPER-{}", uuid::Uuid::new_v4());
        tracing::info!(
            %platform,
            action = command.action.as_str(),
            order_id,
            "paper router: command accepted"
        );
        self.routed.write().await.push(command.clone());

        Ok(ExecutionReceipt { order_id, platform })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlatformToggle;
    use crate::models::{CommandAction, Side};
    use rust_decimal::Decimal;

    fn market_command(platform: Platform) -> Command {
        Command::market_order(platform, "BTCUSDT", Side::Buy, Decimal::ONE)
    }

    #[tokio::test]
    async fn routes_supported_command() {
        let router = PaperRouter::new(PlatformsConfig::default());
        let receipt = router.route(&market_command(Platform::Binance)).await.unwrap();

        assert_eq!(receipt.platform, Platform::Binance);
        assert!(receipt.order_id.starts_with("PAPER-"));
        assert_eq!(router.routed().await.len(), 1);
    }

    #[tokio::test]
    async fn rejects_missing_platform() {
        let router = PaperRouter::new(PlatformsConfig::default());
        let mut command = market_command(Platform::Binance);
        command.platform = None;

        let err = router.route(&command).await.unwrap_err();
        assert!(matches!(err, RouterError::PlatformMissing));
        assert!(router.routed().await.is_empty());
    }

    #[tokio::test]
    async fn rejects_disabled_platform() {
        let platforms = PlatformsConfig {
            binance: PlatformToggle { enabled: false },
            ..PlatformsConfig::default()
        };
        let router = PaperRouter::new(platforms);

        let err = router.route(&market_command(Platform::Binance)).await.unwrap_err();
        assert!(matches!(err, RouterError::PlatformDisabled(Platform::Binance)));
    }

    #[tokio::test]
    async fn rejects_unsupported_action() {
        let router = PaperRouter::new(PlatformsConfig::default());
        let mut command = market_command(Platform::Tradingview);
        command.action = CommandAction::ExecuteLimitOrder;

        let err = router.route(&command).await.unwrap_err();
        assert!(matches!(err, RouterError::UnsupportedAction { .. }));
    }

    #[tokio::test]
    async fn chart_actions_route_on_tradingview() {
        let router = PaperRouter::new(PlatformsConfig::default());
        let command = Command::non_trading(CommandAction::DrawTrendline, Platform::Tradingview);

        let receipt = router.route(&command).await.unwrap();
        assert_eq!(receipt.platform, Platform::Tradingview);
    }
}
