//! Structured trading commands produced by the upstream parser.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action requested by a command.
///
/// Closed set: the upstream parser only ever emits these. Chart and panel
/// actions are non-trading and bypass risk checks entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    /// Switch the active chart timeframe.
    ChangeTimeframe,
    /// Draw a trendline on the chart.
    DrawTrendline,
    /// Apply a Fibonacci retracement.
    ApplyFib,
    /// Open the trade panel.
    OpenTradePanel,
    /// Submit a market order.
    ExecuteMarketOrder,
    /// Submit a limit order.
    ExecuteLimitOrder,
    /// Submit a stop order.
    ExecuteStopOrder,
    /// Attach or move a stop-loss on an open position.
    SetStopLoss,
    /// Attach or move a take-profit on an open position.
    SetTakeProfit,
}

impl CommandAction {
    /// Returns true for the order-entry actions that must pass the
    /// Decision and Risk engines.
    #[must_use]
    pub const fn is_trading(&self) -> bool {
        matches!(
            self,
            Self::ExecuteMarketOrder | Self::ExecuteLimitOrder | Self::ExecuteStopOrder
        )
    }

    /// Wire name of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ChangeTimeframe => "change_timeframe",
            Self::DrawTrendline => "draw_trendline",
            Self::ApplyFib => "apply_fib",
            Self::OpenTradePanel => "open_trade_panel",
            Self::ExecuteMarketOrder => "execute_market_order",
            Self::ExecuteLimitOrder => "execute_limit_order",
            Self::ExecuteStopOrder => "execute_stop_order",
            Self::SetStopLoss => "set_stop_loss",
            Self::SetTakeProfit => "set_take_profit",
        }
    }
}

impl fmt::Display for CommandAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Target platform for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// TradingView charting (chart actions plus panel-driven market orders).
    Tradingview,
    /// Binance spot exchange.
    Binance,
    /// Bybit derivatives exchange.
    Bybit,
    /// MetaTrader 5 forex terminal.
    Mt5,
}

impl Platform {
    /// Whether this platform can carry out the given action.
    ///
    /// Compile-time-checked replacement for the skill-registry dictionary
    /// lookup: adding a variant forces this match to be revisited.
    #[must_use]
    pub const fn supports(&self, action: CommandAction) -> bool {
        match self {
            Self::Tradingview => matches!(
                action,
                CommandAction::ChangeTimeframe
                    | CommandAction::DrawTrendline
                    | CommandAction::ApplyFib
                    | CommandAction::OpenTradePanel
                    | CommandAction::ExecuteMarketOrder
            ),
            Self::Binance | Self::Bybit | Self::Mt5 => matches!(
                action,
                CommandAction::ExecuteMarketOrder
                    | CommandAction::ExecuteLimitOrder
                    | CommandAction::ExecuteStopOrder
                    | CommandAction::SetStopLoss
                    | CommandAction::SetTakeProfit
            ),
        }
    }

    /// Wire name of the platform.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tradingview => "tradingview",
            Self::Binance => "binance",
            Self::Bybit => "bybit",
            Self::Mt5 => "mt5",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Long entry.
    Buy,
    /// Short entry.
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// A structured trading intent.
///
/// Immutable once constructed for validation purposes; only the execution
/// layer enriches it with an `order_id` after routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    /// Requested action.
    pub action: CommandAction,
    /// Target platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// Instrument symbol (e.g. "BTCUSDT").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Order side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    /// Order quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    /// Limit/stop price, or entry price reference for market orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Initial stop-loss price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Decimal>,
    /// Take-profit target price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Decimal>,
    /// Reward-to-risk ratio of the setup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rr_ratio: Option<Decimal>,
    /// Trading session the setup belongs to (e.g. "london").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    /// Whether the H4 structure agrees with the trade direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h4_structure_aligned: Option<bool>,
    /// Whether multiple timeframes confirm the setup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtf_confirmed: Option<bool>,
    /// Order ID assigned by the execution layer after routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl Command {
    /// A non-trading chart/panel command.
    #[must_use]
    pub fn non_trading(action: CommandAction, platform: Platform) -> Self {
        Self {
            action,
            platform: Some(platform),
            symbol: None,
            side: None,
            quantity: None,
            price: None,
            stop_loss: None,
            take_profit: None,
            rr_ratio: None,
            session: None,
            h4_structure_aligned: None,
            mtf_confirmed: None,
            order_id: None,
        }
    }

    /// A market-order command with the given core fields.
    #[must_use]
    pub fn market_order(
        platform: Platform,
        symbol: impl Into<String>,
        side: Side,
        quantity: Decimal,
    ) -> Self {
        Self {
            action: CommandAction::ExecuteMarketOrder,
            platform: Some(platform),
            symbol: Some(symbol.into()),
            side: Some(side),
            quantity: Some(quantity),
            price: None,
            stop_loss: None,
            take_profit: None,
            rr_ratio: None,
            session: None,
            h4_structure_aligned: None,
            mtf_confirmed: None,
            order_id: None,
        }
    }

    /// Returns true if this command submits an order.
    #[must_use]
    pub const fn is_trading(&self) -> bool {
        self.action.is_trading()
    }
}
