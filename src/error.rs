use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading errors.
///
/// Any of these is fatal at startup: the process logs the cause and exits
/// with a non-zero status.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("unsupported database dialect: {0}")]
    UnsupportedDialect(String),

    #[error("certificate unreadable: {}: {source}", .path.display())]
    CertificateUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Database connection errors.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// The handshake or a borrowed connection failed. Carries the transport
    /// or authentication cause from the driver.
    #[error("database connection failed: {0}")]
    Handshake(#[source] sqlx::Error),

    /// No connection became available within the pool's acquire timeout.
    #[error("timed out acquiring a database connection")]
    AcquireTimeout,

    /// The pool was closed before or during the operation.
    #[error("connection pool is closed")]
    PoolClosed,
}

impl From<sqlx::Error> for ConnectionError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => ConnectionError::AcquireTimeout,
            sqlx::Error::PoolClosed => ConnectionError::PoolClosed,
            other => ConnectionError::Handshake(other),
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("internal server error: {0}")]
    Internal(String),
}

/// Result type alias for AppResult
pub type AppResult<T> = Result<T, AppError>;
