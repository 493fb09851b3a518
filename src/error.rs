use thiserror::Error;

/// Every failure the simulator reports back to its caller.
///
/// None of these are retried: all operations are local and deterministic, so
/// the caller decides what to do with the message.
#[derive(Error, Debug)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("robot is disconnected from the platform")]
    NotConnected,

    #[error("order not found: {0}")]
    NotFound(String),

    #[error("insufficient candles for analysis: need {required}, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("invalid analyzer configuration: {0}")]
    Configuration(String),

    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
