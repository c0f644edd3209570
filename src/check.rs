//! Database connectivity check.
//!
//! The `check` command runs the startup smoke test on its own: build the
//! pool from loaded configuration, perform one authentication round-trip,
//! and close the pool whether or not the round-trip succeeded. `main`
//! turns the outcome into the process exit code (0 on success, 1 on
//! failure).

use crate::config::Config;
use crate::db::Database;
use crate::error::AppResult;
use tracing::{error, info};

/// Verify database connectivity and tear the pool down again.
pub async fn run(config: Config) -> AppResult<()> {
    info!("Database check: starting...");

    let database = Database::build(&config.database);

    let result = database.connect().await;
    match &result {
        Ok(()) => info!("Database check: connection established successfully"),
        Err(err) => error!("Database check: unable to connect to the database: {}", err),
    }

    // Close even after a failed handshake so teardown is always observed.
    database.close().await;
    info!("Database check: connection closed");

    result.map_err(Into::into)
}
