use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Pool sized for the short read-mostly queries the booking core issues.
const MAX_CONNECTIONS: u32 = 20;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    let mut options = ConnectOptions::new(&config.database_url);
    options
        .max_connections(MAX_CONNECTIONS)
        .connect_timeout(CONNECT_TIMEOUT);

    Database::connect(options)
        .await
        .map_err(|e| AppError::Internal(format!("Database connection failed: {}", e)))
}
