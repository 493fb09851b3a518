use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::Result;

/// OHLCV candlestick data
///
/// Deserialized candles go through the same checks as `Candle::new`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawCandle")]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Deserialize)]
struct RawCandle {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl TryFrom<RawCandle> for Candle {
    type Error = Error;

    fn try_from(raw: RawCandle) -> Result<Self> {
        Candle::new(
            raw.timestamp,
            raw.open,
            raw.high,
            raw.low,
            raw.close,
            raw.volume,
        )
    }
}

impl Candle {
    /// Build a candle, rejecting non-positive prices, negative volume and high < low
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self> {
        let candle = Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        };
        candle.validate()?;
        Ok(candle)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, price) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !price.is_finite() || price <= 0.0 {
                return Err(Error::validation(format!(
                    "candle {} must be a positive number, got {}",
                    name, price
                )));
            }
        }

        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(Error::validation(format!(
                "candle volume must be non-negative, got {}",
                self.volume
            )));
        }

        if self.high < self.low {
            return Err(Error::validation(format!(
                "candle high ({}) cannot be below low ({})",
                self.high, self.low
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Sideways,
}

/// Trading signal derived from the moving-average crossover
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    Wait,
}

/// Point-in-time view of a symbol. Recomputed on every request, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub current_price: f64,
    pub moving_average_fast: f64,
    pub moving_average_slow: f64,
    pub trend: Trend,
    pub signal: Signal,
    pub candles: Vec<Candle>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Whether a market signal points the same way as this side
    pub fn aligns_with(&self, signal: Signal) -> bool {
        matches!(
            (self, signal),
            (OrderSide::Buy, Signal::Buy) | (OrderSide::Sell, Signal::Sell)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Pending,
    Executed,
    Canceled,
    /// Reserved for broker-side rejections; no transition produces it yet.
    Rejected,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Executed | OrderStatus::Canceled | OrderStatus::Rejected
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Generate an order id of the form `ord_<12 hex chars>`
pub fn new_order_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("ord_{}", &hex[..12])
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BrokerSession {
    pub status: ConnectionStatus,
    pub account: Option<String>,
    pub connected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRequest {
    pub account: String,
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionResponse {
    pub status: ConnectionStatus,
    pub connected_at: Option<DateTime<Utc>>,
}

impl From<&BrokerSession> for ConnectionResponse {
    fn from(session: &BrokerSession) -> Self {
        Self {
            status: session.status,
            connected_at: session.connected_at,
        }
    }
}

pub const MIN_SYMBOL_LEN: usize = 3;
pub const MAX_SYMBOL_LEN: usize = 20;

/// Trim and uppercase a symbol, checking its length
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    let len = symbol.chars().count();
    if !(MIN_SYMBOL_LEN..=MAX_SYMBOL_LEN).contains(&len) {
        return Err(Error::validation(format!(
            "symbol must have between {} and {} characters, got {}",
            MIN_SYMBOL_LEN, MAX_SYMBOL_LEN, len
        )));
    }
    Ok(symbol)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub amount: f64,
    #[serde(default)]
    pub expiration_seconds: Option<u64>,
}

/// Order placement parameters after validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrder {
    pub symbol: String,
    pub side: OrderSide,
    pub amount: f64,
    pub expiration_seconds: u64,
}

impl OrderRequest {
    /// Check symbol, amount and expiration, filling in the default expiration
    pub fn validate(
        &self,
        default_expiration: u64,
        expiration_bounds: (u64, u64),
    ) -> Result<ValidatedOrder> {
        let symbol = normalize_symbol(&self.symbol)?;

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::validation(format!(
                "amount must be greater than zero, got {}",
                self.amount
            )));
        }

        let (min, max) = expiration_bounds;
        let expiration_seconds = self.expiration_seconds.unwrap_or(default_expiration);
        if !(min..=max).contains(&expiration_seconds) {
            return Err(Error::validation(format!(
                "expiration_seconds must be between {} and {}, got {}",
                min, max, expiration_seconds
            )));
        }

        Ok(ValidatedOrder {
            symbol,
            side: self.side,
            amount: self.amount,
            expiration_seconds,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderActionResponse {
    pub order: Order,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
        }
    }
}
