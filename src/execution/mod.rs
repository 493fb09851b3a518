// Order lifecycle: session gating, the order book and the engine driving both
pub mod engine;
pub mod order_book;
pub mod session;

pub use engine::TradingEngine;
pub use order_book::OrderBook;
pub use session::{CredentialPolicy, SessionGuard};
