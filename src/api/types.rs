//! Wire types for the trading backend.
//!
//! Money fields use `Decimal`, which accepts both the JSON numbers served by
//! the database-backed endpoints and the stringified amounts passed through
//! from the broker.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Access token issued by `/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

/// Body of `/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub is_active: bool,
}

/// Broker account snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    #[serde(default)]
    pub buying_power: Option<Decimal>,
    #[serde(default)]
    pub cash: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub paper_trading: Option<bool>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Cash, equity and buying power.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioBalance {
    pub balance: Option<Decimal>,
    pub equity: Option<Decimal>,
    pub buying_power: Option<Decimal>,
}

/// One point of the equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioHistoryPoint {
    pub date: String,
    pub equity: Decimal,
}

/// Aggregated dashboard counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub user_email: String,
    pub algorithm_count: u32,
    pub open_position_count: u32,
    pub recent_trade_count: u32,
    pub account_equity: Option<Decimal>,
    pub account_buying_power: Option<Decimal>,
}

/// Position lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
    Pending,
}

impl std::fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Closed => write!(f, "Closed"),
            Self::Pending => write!(f, "Pending"),
        }
    }
}

/// A position tracked by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRecord {
    pub id: i64,
    pub symbol: String,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub current_price: Decimal,
    pub status: PositionStatus,
    pub entry_time: NaiveDateTime,
    pub last_updated: NaiveDateTime,
    #[serde(default)]
    pub additional_data: Option<Value>,
}

impl PositionRecord {
    /// Current market value.
    pub fn market_value(&self) -> Decimal {
        self.quantity * self.current_price
    }

    /// Unrealized P&L.
    pub fn unrealized_pnl(&self) -> Decimal {
        (self.current_price - self.entry_price) * self.quantity
    }

    /// Unrealized P&L as a percentage of the entry price.
    pub fn unrealized_pnl_percent(&self) -> Decimal {
        if self.entry_price.is_zero() {
            Decimal::ZERO
        } else {
            ((self.current_price - self.entry_price) / self.entry_price) * Decimal::ONE_HUNDRED
        }
    }

    /// Check if position is profitable.
    pub fn is_profitable(&self) -> bool {
        self.unrealized_pnl() > Decimal::ZERO
    }
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// A trade recorded for the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: i64,
    pub symbol: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub price: Option<Decimal>,
    pub side: String,
    pub status: String,
    pub order_id: String,
    pub created_at: NaiveDateTime,
}

impl TradeRecord {
    /// Quantity times fill price, when filled.
    pub fn notional_value(&self) -> Option<Decimal> {
        self.price.map(|p| p * self.quantity)
    }
}

/// An order still working at the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenOrder {
    pub id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub qty: Option<Decimal>,
    #[serde(default)]
    pub filled_qty: Option<Decimal>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default, rename = "type")]
    pub order_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Body of `/place-order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    pub side: OrderSide,
}

impl OrderRequest {
    pub fn new(symbol: impl Into<String>, quantity: Decimal, side: OrderSide) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            side,
        }
    }

    /// Reject requests the backend would refuse anyway.
    pub fn validate(&self) -> crate::Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(crate::Error::invalid_input("Symbol must not be empty"));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(crate::Error::invalid_input("Quantity must be greater than 0"));
        }
        Ok(())
    }
}

/// Broker acknowledgement of an order, also returned by `/trade-status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub qty: Option<Decimal>,
    #[serde(default)]
    pub filled_qty: Option<Decimal>,
    #[serde(default)]
    pub filled_avg_price: Option<Decimal>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Supported algorithm families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmType {
    MovingAverageCrossover,
    Rsi,
    Macd,
    BollingerBands,
}

impl std::fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MovingAverageCrossover => write!(f, "MA Crossover"),
            Self::Rsi => write!(f, "RSI"),
            Self::Macd => write!(f, "MACD"),
            Self::BollingerBands => write!(f, "Bollinger"),
        }
    }
}

/// A configured algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmRecord {
    pub id: i64,
    pub user_id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub algorithm_type: AlgorithmType,
    pub parameters: HashMap<String, Value>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl AlgorithmRecord {
    /// Integer parameter, e.g. `short_window`.
    pub fn int_parameter(&self, name: &str) -> Option<u32> {
        self.parameters
            .get(name)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
    }

    /// Crossover run request derived from this algorithm's parameters.
    pub fn run_request(&self) -> AlgoRunRequest {
        let mut request = AlgoRunRequest::new(&self.symbol);
        if let Some(short) = self.int_parameter("short_window") {
            request.short_window = short;
        }
        if let Some(long) = self.int_parameter("long_window") {
            request.long_window = long;
        }
        request
    }
}

/// Body of `/api/algorithms/:algorithm_id/status`.
#[derive(Debug, Clone, Serialize)]
pub struct AlgorithmStatusUpdate {
    pub is_active: bool,
}

/// Bar size used by the crossover run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeframeUnit {
    Minute,
    Hour,
    #[default]
    Day,
}

/// Body of `/run-algo`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgoRunRequest {
    pub symbol: String,
    pub timeframe_unit: TimeframeUnit,
    pub timeframe_value: u32,
    pub lookback_days: u32,
    pub short_window: u32,
    pub long_window: u32,
}

impl AlgoRunRequest {
    /// Request with the backend's default windows (10/20 over 60 days of daily bars).
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe_unit: TimeframeUnit::Day,
            timeframe_value: 1,
            lookback_days: 60,
            short_window: 10,
            long_window: 20,
        }
    }

    /// Reject window combinations the backend would refuse.
    pub fn validate(&self) -> crate::Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(crate::Error::invalid_input("Symbol must not be empty"));
        }
        if self.timeframe_value == 0
            || self.lookback_days == 0
            || self.short_window == 0
            || self.long_window == 0
        {
            return Err(crate::Error::invalid_input(
                "Timeframe, lookback and windows must be greater than 0",
            ));
        }
        if self.short_window >= self.long_window {
            return Err(crate::Error::invalid_input(
                "Short window must be less than long window",
            ));
        }
        Ok(())
    }
}

/// Direction implied by a crossover signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

/// Result of `/run-algo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgoRunResult {
    pub symbol: String,
    /// `1.0` buy, `-1.0` sell, `0.0` hold.
    pub latest_signal: f64,
    pub num_prices: u32,
    #[serde(default)]
    pub short_ma_last: Option<f64>,
    #[serde(default)]
    pub long_ma_last: Option<f64>,
}

impl AlgoRunResult {
    pub fn signal(&self) -> SignalKind {
        if self.latest_signal > 0.0 {
            SignalKind::Buy
        } else if self.latest_signal < 0.0 {
            SignalKind::Sell
        } else {
            SignalKind::Hold
        }
    }
}

/// Body of `/api/automated-trading/config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomatedTradingConfig {
    /// Fraction of buying power per trade (0.0 to 1.0).
    #[serde(default)]
    pub position_size: Option<f64>,
    /// Loss fraction that stops trading (0.0 to 1.0).
    #[serde(default)]
    pub max_loss_percent: Option<f64>,
    pub is_active: bool,
}

impl AutomatedTradingConfig {
    pub fn validate(&self) -> crate::Result<()> {
        let in_unit = |v: Option<f64>| v.is_none_or(|v| (0.0..=1.0).contains(&v));
        if !in_unit(self.position_size) || !in_unit(self.max_loss_percent) {
            return Err(crate::Error::invalid_input(
                "Position size and max loss must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

/// State of the backend's automated trading loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingStatus {
    pub is_active: bool,
    #[serde(default)]
    pub current_position: Option<Value>,
    #[serde(default)]
    pub last_trade_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub pnl: Option<f64>,
    #[serde(default)]
    pub config: Option<Value>,
}

/// Metadata of a database backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupInfo {
    pub path: String,
    pub size: u64,
    pub created_at: NaiveDateTime,
    pub algorithm_count: u32,
    pub signal_count: u32,
    pub position_count: u32,
    pub trade_count: u32,
}

/// Body of `/api/backup/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupList {
    pub backups: Vec<BackupInfo>,
}

/// Plain `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Convert a naive backend timestamp (UTC) for display.
pub fn as_utc(ts: NaiveDateTime) -> DateTime<Utc> {
    ts.and_utc()
}
