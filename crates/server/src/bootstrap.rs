use std::sync::Arc;

use cartwise_agent::embedding::EmbeddingProvider;
use cartwise_agent::hydrate::{hydrate_index, HydrationReport};
use cartwise_agent::index::ProductIndex;
use cartwise_agent::providers::{build_embedder, build_index, build_runtime, ProviderError};
use cartwise_agent::{AgentRuntime, SearchError};
use cartwise_core::config::{AppConfig, ConfigError, LoadOptions};
use cartwise_db::{
    connect_with_config, migrations, CatalogRepository, DbPool, RepositoryError,
    SqlCatalogRepository,
};
use thiserror::Error;
use tracing::{info, warn};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub index: Arc<dyn ProductIndex>,
    pub agent_runtime: Arc<AgentRuntime>,
    pub hydration: HydrationReport,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("catalog read failed: {0}")]
    Catalog(#[from] RepositoryError),
    #[error("search backend initialisation failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("index hydration failed: {0}")]
    Hydration(#[from] SearchError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Connects the catalog, applies migrations, hydrates the product index and
/// assembles the agent runtime.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        classifier = ?config.router.classifier,
        index_backend = ?config.index.backend,
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let catalog = SqlCatalogRepository::new(db_pool.clone());
    let products = catalog.list_all().await?;
    if products.is_empty() {
        warn!(
            event_name = "system.bootstrap.catalog_empty",
            correlation_id = "bootstrap",
            "product catalog is empty; every search will return no matches until it is seeded"
        );
    }

    let embedder = build_embedder(&config.embedding)?;
    let index = build_index(&config.index)?;
    let hydration = hydrate_index(&products, Arc::clone(&embedder), index.as_ref()).await?;
    info!(
        event_name = "system.bootstrap.index_hydrated",
        correlation_id = "bootstrap",
        collection = %hydration.collection,
        indexed = hydration.indexed,
        created_collection = hydration.created_collection,
        embedder = embedder.name(),
        "product index hydrated"
    );

    let agent_runtime = Arc::new(build_runtime(&config, embedder, Arc::clone(&index))?);
    info!(
        event_name = "system.bootstrap.runtime_ready",
        correlation_id = "bootstrap",
        classifier = agent_runtime.router().classifier_name(),
        "agent runtime assembled"
    );

    Ok(Application { config, db_pool, index, agent_runtime, hydration })
}
