// Wagebook Library
// Work time tracking with wage analytics, served over a local HTTP API

pub mod analytics;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod storage;

use std::future::Future;

use tracing::info;

use error::AppError;
use server::{Server, ServerConfig};
use storage::Database;

/// Opens the database, serves until `shutdown` resolves, then stops gracefully
pub async fn run<F>(config: ServerConfig, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()>,
{
    config.validate()?;

    if let Some(dir) = config
        .database_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        std::fs::create_dir_all(dir)?;
    }
    let db = Database::new(&config.database_path)?;
    info!(path = %config.database_path.display(), "Database ready");

    let handle = Server::new(config, db).start().await?;
    shutdown.await;
    handle.shutdown().await;
    Ok(())
}
