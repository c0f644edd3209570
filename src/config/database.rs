use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database server hostname
    pub host: String,

    /// Database server port (1-65535)
    pub port: u16,

    /// Account used for the authentication handshake
    pub user: String,

    /// Account password, redacted from all diagnostics
    pub password: Secret,

    /// Name of the database to open
    pub database: String,

    /// Relational engine identifier
    pub dialect: Dialect,

    /// PEM trust anchor the server certificate must chain to
    pub trust_anchor: TrustAnchor,

    /// Connection pool bounds
    #[serde(default)]
    pub pool: PoolSettings,
}

impl DatabaseConfig {
    /// Validate database configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DB_PORT".to_string(),
                reason: "port must be between 1 and 65535".to_string(),
            });
        }

        self.pool.validate()
    }
}

/// Supported relational engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
        }
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySql),
            other => Err(ConfigError::UnsupportedDialect(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection pool bounds.
///
/// These are fixed resource limits, not tunables: at most 5 live
/// connections, none kept warm, 30s to acquire before timing out, idle
/// connections reclaimed after 10s.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolSettings {
    /// Maximum number of database connections in the pool
    pub max_connections: u32,

    /// Minimum number of database connections to maintain
    pub min_connections: u32,

    /// Timeout for acquiring a connection from the pool
    pub acquire_timeout: Duration,

    /// Idle time after which a connection beyond the minimum is reclaimed
    pub idle_timeout: Duration,
}

impl PoolSettings {
    pub const MAX_CONNECTIONS: u32 = 5;
    pub const MIN_CONNECTIONS: u32 = 0;
    pub const ACQUIRE_TIMEOUT: Duration = Duration::from_millis(30_000);
    pub const IDLE_TIMEOUT: Duration = Duration::from_millis(10_000);

    /// Validate pool bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_connections > self.max_connections {
            return Err(ConfigError::InvalidValue {
                key: "pool.min_connections".to_string(),
                reason: "cannot be greater than max_connections".to_string(),
            });
        }

        if self.acquire_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "pool.acquire_timeout".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: Self::MAX_CONNECTIONS,
            min_connections: Self::MIN_CONNECTIONS,
            acquire_timeout: Self::ACQUIRE_TIMEOUT,
            idle_timeout: Self::IDLE_TIMEOUT,
        }
    }
}

/// A string that must never appear in logs or error output.
///
/// `Debug` prints a fixed placeholder; there is no `Display` and no
/// `Serialize`, so the value cannot leak through formatting by accident.
/// Code that genuinely needs the value calls [`Secret::expose`].
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the underlying value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

/// Raw PEM bytes used to verify the database server's certificate chain.
///
/// Contents are opaque at load time; a malformed certificate surfaces as a
/// connection-time failure. `Debug` prints only the byte length.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct TrustAnchor(Vec<u8>);

impl TrustAnchor {
    pub fn new(pem: Vec<u8>) -> Self {
        Self(pem)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.clone()
    }
}

impl fmt::Debug for TrustAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrustAnchor({} bytes)", self.0.len())
    }
}
