//! Moving-average crossover analysis
//!
//! Compares a fast and a slow simple moving average of closes. A relative
//! band of 0.2% around the slow average keeps small noise from flipping the
//! trend back and forth.

use crate::error::Error;
use crate::indicators::{calculate_sma, round_to};
use crate::models::{Candle, MarketSnapshot, Signal, Trend};
use crate::Result;

const BAND_UPPER: f64 = 1.002;
const BAND_LOWER: f64 = 0.998;
const PRICE_DECIMALS: i32 = 5;

#[derive(Debug, Clone)]
pub struct MarketAnalyzer {
    fast_period: usize,
    slow_period: usize,
}

impl MarketAnalyzer {
    /// Fails with a configuration error unless `0 < fast_period < slow_period`
    pub fn new(fast_period: usize, slow_period: usize) -> Result<Self> {
        if fast_period == 0 {
            return Err(Error::Configuration(
                "fast_period must be greater than zero".to_string(),
            ));
        }
        if fast_period >= slow_period {
            return Err(Error::Configuration(format!(
                "fast_period ({}) must be smaller than slow_period ({})",
                fast_period, slow_period
            )));
        }

        Ok(Self {
            fast_period,
            slow_period,
        })
    }

    pub fn fast_period(&self) -> usize {
        self.fast_period
    }

    pub fn slow_period(&self) -> usize {
        self.slow_period
    }

    /// Build a snapshot from a candle series, most recent candle last
    pub fn snapshot(&self, symbol: &str, candles: Vec<Candle>) -> Result<MarketSnapshot> {
        if candles.len() < self.slow_period {
            return Err(Error::InsufficientData {
                required: self.slow_period,
                available: candles.len(),
            });
        }
        for candle in &candles {
            candle.validate()?;
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let insufficient = || Error::InsufficientData {
            required: self.slow_period,
            available: closes.len(),
        };
        let fast_ma = calculate_sma(&closes, self.fast_period).ok_or_else(insufficient)?;
        let slow_ma = calculate_sma(&closes, self.slow_period).ok_or_else(insufficient)?;
        let current_price = closes[closes.len() - 1];

        let (trend, signal) = classify(fast_ma, slow_ma);

        tracing::debug!(
            "{}: price {:.5}, fast MA {:.5}, slow MA {:.5} -> {:?}",
            symbol,
            current_price,
            fast_ma,
            slow_ma,
            signal
        );

        Ok(MarketSnapshot {
            symbol: symbol.to_string(),
            current_price: round_to(current_price, PRICE_DECIMALS),
            moving_average_fast: round_to(fast_ma, PRICE_DECIMALS),
            moving_average_slow: round_to(slow_ma, PRICE_DECIMALS),
            trend,
            signal,
            candles,
        })
    }
}

impl Default for MarketAnalyzer {
    fn default() -> Self {
        Self {
            fast_period: 5,
            slow_period: 20,
        }
    }
}

/// Map the two averages to a trend and signal; the checks run in this order
pub fn classify(fast_ma: f64, slow_ma: f64) -> (Trend, Signal) {
    if fast_ma > slow_ma * BAND_UPPER {
        (Trend::Bullish, Signal::Buy)
    } else if fast_ma < slow_ma * BAND_LOWER {
        (Trend::Bearish, Signal::Sell)
    } else {
        (Trend::Sideways, Signal::Wait)
    }
}
