// Technical indicators used by the market analyzer

pub mod moving_average;

pub use moving_average::{calculate_sma, round_to};
