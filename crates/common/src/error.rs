use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Insufficient data: got {got} candles, need at least {need}")]
    InsufficientData { got: usize, need: usize },

    #[error("Invalid indicator data: {0}")]
    InvalidIndicator(String),

    #[error("Invalid candle series: {0}")]
    InvalidSeries(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Upstream data error: {0}")]
    Upstream(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid arguments: {0}")]
    Usage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Stable tag used in JSON error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InsufficientData { .. } => "insufficient_data",
            Error::InvalidIndicator(_) => "invalid_indicator",
            Error::InvalidSeries(_) => "invalid_series",
            Error::Http(_) => "http",
            Error::Upstream(_) => "upstream",
            Error::Json(_) => "json",
            Error::Config(_) => "config",
            Error::Usage(_) => "usage",
            Error::Io(_) => "io",
            Error::Other(_) => "other",
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
