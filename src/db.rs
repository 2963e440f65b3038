use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::migrator::Migrator;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Establishes a connection pool using the application configuration.
pub async fn establish_connection(config: &AppConfig) -> Result<DbPool, ServiceError> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(!config.is_production());

    let db = Database::connect(options)
        .await
        .map_err(ServiceError::db_error)?;

    if config.auto_migrate {
        info!("running schema migrations");
        Migrator::up(&db, None).await.map_err(ServiceError::db_error)?;
    }

    info!(
        max_connections = config.db_max_connections,
        "database connection established"
    );
    Ok(db)
}
