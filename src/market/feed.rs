use crate::indicators::round_to;
use crate::models::Candle;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PRICE_DECIMALS: i32 = 5;
const VOLUME_DECIMALS: i32 = 2;

/// Generates synthetic one-minute candles for any symbol
///
/// The random source is seeded once when the generator is created. Successive
/// calls continue the same stream, so two generators built with the same seed
/// and driven with the same call sequence produce identical prices.
pub struct CandleGenerator {
    rng: StdRng,
    interval_minutes: i64,
}

impl CandleGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            interval_minutes: 1,
        }
    }

    /// Starting price for a symbol: `100 + (sum of char codes mod 30)`
    pub fn base_price(symbol: &str) -> f64 {
        let code_sum: u64 = symbol.chars().map(|c| c as u64).sum();
        100.0 + (code_sum % 30) as f64
    }

    /// Generate `count` candles ending now, most recent last
    pub fn generate(&mut self, symbol: &str, count: usize) -> Vec<Candle> {
        self.generate_at(symbol, count, Utc::now())
    }

    /// Generate `count` candles ending at `end_time`
    ///
    /// The last candle is stamped one interval before `end_time`.
    pub fn generate_at(
        &mut self,
        symbol: &str,
        count: usize,
        end_time: DateTime<Utc>,
    ) -> Vec<Candle> {
        let mut candles = Vec::with_capacity(count);
        let mut previous_close = Self::base_price(symbol);
        let steps = count.max(1) as f64;

        for i in 0..count {
            let offset = (count - i) as i64 * self.interval_minutes;
            let timestamp = end_time - Duration::minutes(offset);

            let noise = self.rng.gen_range(-1.2..=1.2);
            // Drift grows with the step index so later candles trend harder
            let drift = (i as f64 / steps) * self.rng.gen_range(-0.4..=0.4);

            let open = previous_close;
            let close = (open + noise + drift).max(1.0);
            let high = open.max(close) + self.rng.gen_range(0.05..=0.7);
            let low = (open.min(close) - self.rng.gen_range(0.05..=0.7)).max(0.1);
            let volume = self.rng.gen_range(50.0..=1000.0);

            candles.push(Candle {
                timestamp,
                open: round_to(open, PRICE_DECIMALS),
                high: round_to(high, PRICE_DECIMALS),
                low: round_to(low, PRICE_DECIMALS),
                close: round_to(close, PRICE_DECIMALS),
                volume: round_to(volume, VOLUME_DECIMALS),
            });

            previous_close = close;
        }

        tracing::debug!("Generated {} candles for {}", count, symbol);
        candles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_generate_length() {
        let mut gen = CandleGenerator::new(42);
        let candles = gen.generate("EURUSD", 30);
        assert_eq!(candles.len(), 30);
    }

    #[test]
    fn test_zero_count_is_empty() {
        let mut gen = CandleGenerator::new(42);
        assert!(gen.generate("EURUSD", 0).is_empty());
    }

    #[test]
    fn test_base_price_depends_on_symbol() {
        // E(69)+U(85)+R(82)+U(85)+S(83)+D(68) = 472, 472 % 30 = 22
        assert_eq!(CandleGenerator::base_price("EURUSD"), 122.0);
        assert_eq!(CandleGenerator::base_price(""), 100.0);

        let mut gen = CandleGenerator::new(7);
        let candles = gen.generate("EURUSD", 5);
        assert_eq!(candles[0].open, 122.0);
    }

    #[test]
    fn test_same_seed_same_output() {
        let mut first = CandleGenerator::new(42);
        let mut second = CandleGenerator::new(42);

        for symbol in ["EURUSD", "BTCUSD", "EURUSD"] {
            assert_eq!(
                first.generate_at(symbol, 30, fixed_end()),
                second.generate_at(symbol, 30, fixed_end())
            );
        }
    }

    #[test]
    fn test_stream_continues_between_calls() {
        let mut gen = CandleGenerator::new(42);
        let first = gen.generate_at("EURUSD", 30, fixed_end());
        let second = gen.generate_at("EURUSD", 30, fixed_end());
        assert_ne!(first, second);
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = CandleGenerator::new(1);
        let mut b = CandleGenerator::new(2);
        assert_ne!(
            a.generate_at("EURUSD", 30, fixed_end()),
            b.generate_at("EURUSD", 30, fixed_end())
        );
    }

    #[test]
    fn test_open_chains_previous_close() {
        let mut gen = CandleGenerator::new(42);
        let candles = gen.generate("GBPJPY", 50);

        for i in 1..candles.len() {
            assert_eq!(candles[i].open, candles[i - 1].close);
        }
    }

    #[test]
    fn test_timestamps_are_sequential_and_end_before_now() {
        let mut gen = CandleGenerator::new(42);
        let end = fixed_end();
        let candles = gen.generate_at("EURUSD", 30, end);

        for i in 1..candles.len() {
            assert_eq!(
                (candles[i].timestamp - candles[i - 1].timestamp).num_minutes(),
                1
            );
        }
        assert_eq!(candles.last().unwrap().timestamp, end - Duration::minutes(1));
        assert_eq!(candles[0].timestamp, end - Duration::minutes(30));
    }

    #[test]
    fn test_ohlc_consistency() {
        let mut gen = CandleGenerator::new(42);
        let candles = gen.generate("EURUSD", 500);

        for candle in &candles {
            assert!(candle.validate().is_ok());
            assert!(candle.high >= candle.close, "High should be >= close");
            assert!(candle.high >= candle.open, "High should be >= open");
            assert!(candle.low <= candle.close, "Low should be <= close");
            assert!(candle.low <= candle.open, "Low should be <= open");
            assert!(candle.close >= 1.0);
            assert!(candle.low >= 0.1);
            assert!(candle.volume >= 50.0 && candle.volume <= 1000.0);
        }
    }

    #[test]
    fn test_values_are_rounded() {
        let mut gen = CandleGenerator::new(42);
        for candle in gen.generate("EURUSD", 30) {
            assert_eq!(candle.close, round_to(candle.close, PRICE_DECIMALS));
            assert_eq!(candle.high, round_to(candle.high, PRICE_DECIMALS));
            assert_eq!(candle.volume, round_to(candle.volume, VOLUME_DECIMALS));
        }
    }
}
