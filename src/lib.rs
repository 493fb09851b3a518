// Core modules
pub mod api;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod market;
pub mod models;
pub mod settings;

// Re-export commonly used types
pub use error::Error;
pub use execution::TradingEngine;
pub use models::*;
pub use settings::Settings;

// Error handling
pub type Result<T> = std::result::Result<T, Error>;
