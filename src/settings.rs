use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::execution::session::CredentialPolicy;
use crate::Result;

/// Environment variables look like `ROBOSIM__MARKET__SEED=7`
pub const ENV_PREFIX: &str = "ROBOSIM";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub market: MarketSettings,
    pub session: CredentialPolicy,
    pub orders: OrderSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub seed: u64,
    pub candle_limit: usize,
    pub fast_period: usize,
    pub slow_period: usize,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            candle_limit: 30,
            fast_period: 5,
            slow_period: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderSettings {
    /// Expiration used by the monitor endpoint
    pub monitor_expiration_seconds: u64,
    /// Expiration used when a placement request omits one
    pub default_expiration_seconds: u64,
    pub min_expiration_seconds: u64,
    pub max_expiration_seconds: u64,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            monitor_expiration_seconds: 60,
            default_expiration_seconds: 60,
            min_expiration_seconds: 10,
            max_expiration_seconds: 3600,
        }
    }
}

impl OrderSettings {
    pub fn expiration_bounds(&self) -> (u64, u64) {
        (self.min_expiration_seconds, self.max_expiration_seconds)
    }
}

impl Settings {
    /// Load settings from an optional TOML file, then environment overrides
    ///
    /// Missing keys fall back to the defaults above; a missing file is not an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_string_lossy().to_string();

        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(&path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.orders.min_expiration_seconds > self.orders.max_expiration_seconds {
            return Err(Error::Configuration(format!(
                "min_expiration_seconds ({}) exceeds max_expiration_seconds ({})",
                self.orders.min_expiration_seconds, self.orders.max_expiration_seconds
            )));
        }
        if self.market.candle_limit < self.market.slow_period {
            return Err(Error::Configuration(format!(
                "candle_limit ({}) must cover slow_period ({})",
                self.market.candle_limit, self.market.slow_period
            )));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| {
                Error::Configuration(format!(
                    "invalid server address {}:{}: {}",
                    self.server.host, self.server.port, e
                ))
            })
    }
}
