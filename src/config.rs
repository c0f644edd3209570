pub mod cors;
pub mod database;
pub mod env_file;
pub mod server;

use crate::error::ConfigError;
use cors::CorsConfig;
use database::{DatabaseConfig, Dialect, PoolSettings, Secret, TrustAnchor};
use env_file::EnvMap;
use serde::Deserialize;
use server::ServerConfig;
use std::path::Path;
use tracing::info;

/// Environment definition file expected under the base directory.
pub const ENV_FILE_NAME: &str = ".env";

/// Trust anchor expected next to the environment file.
pub const CERT_FILE_NAME: &str = "ca.pem";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
}

impl Config {
    /// Load configuration from the process environment and the `.env` file
    /// under `base_dir`.
    ///
    /// This is the single initialization entry point: it runs once at
    /// process start and the result is immutable afterwards. The process
    /// environment is snapshotted, never written back.
    pub fn load(base_dir: &Path) -> Result<Self, ConfigError> {
        let process_env: EnvMap = std::env::vars().collect();
        Self::from_sources(base_dir, process_env)
    }

    /// Resolve configuration from an explicit environment snapshot merged
    /// with the `.env` file under `base_dir`, first source wins.
    pub fn from_sources(base_dir: &Path, mut vars: EnvMap) -> Result<Self, ConfigError> {
        let env_path = base_dir.join(ENV_FILE_NAME);
        env_file::merge_env_file(&env_path, &mut vars);

        // Aggregate report: every missing key, not just the first.
        let missing = env_file::missing_keys(&vars);
        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables(missing));
        }

        let db_port: u16 = vars["DB_PORT"]
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "DB_PORT".to_string(),
                reason: format!("'{}' is not a port number", vars["DB_PORT"].trim()),
            })?;

        let dialect: Dialect = vars["DB_DIALECT"].parse()?;

        let cert_path = base_dir.join(CERT_FILE_NAME);
        let trust_anchor = std::fs::read(&cert_path)
            .map(TrustAnchor::new)
            .map_err(|source| ConfigError::CertificateUnreadable {
                path: cert_path,
                source,
            })?;

        let server_host = vars
            .get("SERVER_HOST")
            .cloned()
            .unwrap_or_else(|| "127.0.0.1".to_string());
        let server_port = match vars.get("SERVER_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "SERVER_PORT".to_string(),
                reason: format!("'{}' is not a port number", value.trim()),
            })?,
            None => 3000,
        };

        let allowed_origins_str = vars
            .get("ALLOWED_ORIGINS")
            .cloned()
            .unwrap_or_else(|| "*".to_string());
        let allowed_origins: Vec<String> = if allowed_origins_str == "*" {
            vec!["*".to_string()]
        } else {
            allowed_origins_str
                .split(',')
                .map(|s| s.trim().to_string())
                .collect()
        };

        let config = Config {
            server: ServerConfig {
                host: server_host,
                port: server_port,
            },
            database: DatabaseConfig {
                host: vars["DB_HOST"].trim().to_string(),
                port: db_port,
                user: vars["DB_USER"].trim().to_string(),
                password: Secret::new(vars["DB_PASSWORD"].clone()),
                database: vars["DB_NAME"].trim().to_string(),
                dialect,
                trust_anchor,
                pool: PoolSettings::default(),
            },
            cors: CorsConfig { allowed_origins },
        };

        config.validate()?;
        config.log_summary(&env_path);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()
    }

    /// Emit the resolved database target. Logs the host, port, dialect,
    /// database name and whether a user is set; never the password or the
    /// certificate bytes.
    fn log_summary(&self, env_path: &Path) {
        info!(
            env_path = %env_path.display(),
            host = %self.database.host,
            port = self.database.port,
            dialect = %self.database.dialect,
            database = %self.database.database,
            user_set = !self.database.user.is_empty(),
            "database configuration resolved"
        );
    }
}
