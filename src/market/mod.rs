// Synthetic market data and its analysis
pub mod analyzer;
pub mod feed;

pub use analyzer::MarketAnalyzer;
pub use feed::CandleGenerator;
