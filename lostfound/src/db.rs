mod handle;

pub use handle::*;

use std::str::FromStr;

use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

use crate::config::DatabaseConfig;

// Application default db driver
pub type AppDbDriver = sqlx::MySql;
pub type AppDbPool = sqlx::Pool<AppDbDriver>;
pub type AppDbHandle<'c> = Handle<'c>;

pub fn map_err(e: sqlx::Error) -> crate::Error {
    crate::Error::Database(anyhow::Error::new(e))
}

/// Builds connect options from the url, then applies the explicit
/// username/password when configured.
pub fn connect_options(
    config: &DatabaseConfig,
) -> crate::Result<MySqlConnectOptions> {
    let mut options = MySqlConnectOptions::from_str(&config.url)
        .map_err(|e| crate::Error::Config(anyhow::Error::new(e)))?;
    if let Some(username) = config.username.as_deref() {
        options = options.username(username);
    }
    if let Some(password) = config.password.as_deref() {
        options = options.password(password);
    }
    Ok(options)
}

pub async fn connect(config: &DatabaseConfig) -> crate::Result<AppDbPool> {
    let options = connect_options(config)?;
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(map_err)?;
    tracing::info!(
        max_connections = config.max_connections,
        "database pool ready"
    );
    Ok(pool)
}

/// Pool that opens connections on first use.
pub fn connect_lazy(config: &DatabaseConfig) -> crate::Result<AppDbPool> {
    let options = connect_options(config)?;
    Ok(MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy_with(options))
}
