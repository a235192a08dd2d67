//! Error types for tnwatch

use thiserror::Error;

/// Result type alias using tnwatch's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for tnwatch operations
///
/// Everything except [`Error::NonFiniteValue`] is fatal for a run and is
/// propagated up to `main`, which decides on the exit code.
#[derive(Error, Debug)]
pub enum Error {
    /// The signing credential is absent or empty
    #[error("{0} not found in environment")]
    MissingCredential(String),

    /// Provider address is not a valid `0x` address
    #[error("Invalid provider address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Stream identifier could not be used
    #[error("Invalid stream id '{0}'")]
    InvalidStreamId(String),

    /// Date range is inverted or unparseable
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// Network client could not be constructed or authenticated
    #[error("Failed to initialize network client: {0}")]
    ClientInit(String),

    /// Record retrieval failed
    #[error("Failed to fetch {what} for stream {stream}: {cause}")]
    Fetch {
        stream: String,
        what: String,
        cause: String,
    },

    /// A record value could not be represented as a finite number.
    /// Recoverable: the record is skipped and a diagnostic is logged.
    #[error("Non-finite value '{value}' on {date}")]
    NonFiniteValue { date: String, value: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid address error
    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Create a fetch error
    pub fn fetch(
        stream: impl Into<String>,
        what: impl Into<String>,
        cause: impl std::fmt::Display,
    ) -> Self {
        Self::Fetch {
            stream: stream.into(),
            what: what.into(),
            cause: cause.to_string(),
        }
    }

    /// Create a client init error
    pub fn client_init(msg: impl Into<String>) -> Self {
        Self::ClientInit(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether processing may continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NonFiniteValue { .. })
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
