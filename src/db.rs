use crate::config::database::DatabaseConfig;
use crate::error::ConnectionError;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlSslMode},
    pool::PoolConnection,
    ConnectOptions, Connection, MySql, MySqlPool,
};
use tracing::{debug, info};

/// Pooled database handle.
///
/// Lifecycle: built once from validated configuration, verified with
/// [`Database::connect`] before the server accepts traffic, torn down with
/// [`Database::close`]. A closed pool stays closed; reconnecting means
/// building a new one.
pub struct Database {
    pool: MySqlPool,
}

impl Database {
    /// Shape the connection pool from configuration.
    ///
    /// Pure construction: nothing touches the network here, connections are
    /// opened lazily on first acquire. TLS verification is strict; the
    /// server certificate must chain to the configured trust anchor and
    /// there is no insecure fallback.
    pub fn build(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(config.password.expose())
            .database(&config.database)
            .ssl_mode(MySqlSslMode::VerifyCa)
            .ssl_ca_from_pem(config.trust_anchor.to_vec())
            .disable_statement_logging();

        let pool = MySqlPoolOptions::new()
            .max_connections(config.pool.max_connections)
            .min_connections(config.pool.min_connections)
            .acquire_timeout(config.pool.acquire_timeout)
            .idle_timeout(config.pool.idle_timeout)
            .connect_lazy_with(options);

        Self { pool }
    }

    /// Verify connectivity with one authentication round-trip.
    ///
    /// Acquires a pooled connection and pings it. No internal retry; retry
    /// policy belongs to the caller.
    pub async fn connect(&self) -> Result<(), ConnectionError> {
        let mut conn = self.acquire().await?;
        conn.ping().await.map_err(ConnectionError::from)?;
        debug!("database handshake verified");
        Ok(())
    }

    /// Borrow a connection from the pool.
    ///
    /// Blocks up to the pool's acquire timeout. A failed borrow surfaces
    /// only to the borrowing caller; the pool evicts and replaces broken
    /// physical connections on its own.
    pub async fn acquire(&self) -> Result<PoolConnection<MySql>, ConnectionError> {
        self.pool.acquire().await.map_err(ConnectionError::from)
    }

    /// Release every pooled connection.
    ///
    /// Safe to call without ever having connected; closing an already
    /// closed pool is a logged no-op.
    pub async fn close(&self) {
        if self.pool.is_closed() {
            info!("database pool already closed");
            return;
        }

        self.pool.close().await;
        info!("database pool closed");
    }

    /// Whether the pool has been closed.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

/// Clone implementation for Database
impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::database::{Dialect, PoolSettings, Secret, TrustAnchor};

    fn config() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            user: "svc".to_string(),
            password: Secret::new("p"),
            database: "app".to_string(),
            dialect: Dialect::MySql,
            trust_anchor: TrustAnchor::new(b"not a certificate".to_vec()),
            pool: PoolSettings::default(),
        }
    }

    #[tokio::test]
    async fn build_does_not_touch_the_network() {
        // Host/port point nowhere; construction must still succeed.
        let db = Database::build(&config());
        assert!(!db.is_closed());
        db.close().await;
    }

    #[tokio::test]
    async fn clones_share_the_pool() {
        let db = Database::build(&config());
        let other = db.clone();
        db.close().await;
        assert!(other.is_closed());
    }
}
