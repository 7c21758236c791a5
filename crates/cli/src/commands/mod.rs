pub mod ask;
pub mod config;
pub mod doctor;
pub mod index;
pub mod migrate;
pub mod seed;

use std::sync::Arc;

use cartwise_agent::embedding::EmbeddingProvider;
use cartwise_agent::hydrate::{hydrate_index, HydrationReport};
use cartwise_agent::index::ProductIndex;
use cartwise_agent::providers::{build_embedder, build_index};
use cartwise_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use cartwise_db::{connect_with_config, migrations, CatalogRepository, DbPool};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    fn from_failure(command: &str, failure: Failure) -> Self {
        let (error_class, message, exit_code) = failure;
        Self::failure(command, error_class, message, exit_code)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Error class, message and exit code of a failed step.
pub(crate) type Failure = (&'static str, String, u8);

pub(crate) fn load_config(
    command: &str,
    overrides: ConfigOverrides,
) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

pub(crate) fn build_async_runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

/// Connects to the catalog database and applies pending migrations.
pub(crate) async fn open_catalog(config: &AppConfig) -> Result<DbPool, Failure> {
    let pool = connect_with_config(&config.database)
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
    migrations::run_pending(&pool)
        .await
        .map_err(|error| ("migration", error.to_string(), 5u8))?;
    Ok(pool)
}

pub(crate) struct PreparedIndex {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub index: Arc<dyn ProductIndex>,
    pub report: HydrationReport,
}

/// Builds the configured embedder and index and hydrates the index from
/// the catalog.
pub(crate) async fn prepare_index(
    config: &AppConfig,
    catalog: &dyn CatalogRepository,
) -> Result<PreparedIndex, Failure> {
    let products = catalog
        .list_all()
        .await
        .map_err(|error| ("catalog_read", error.to_string(), 4u8))?;
    let embedder =
        build_embedder(&config.embedding).map_err(|error| ("provider_init", error.to_string(), 6u8))?;
    let index =
        build_index(&config.index).map_err(|error| ("provider_init", error.to_string(), 6u8))?;

    let report = hydrate_index(&products, Arc::clone(&embedder), index.as_ref())
        .await
        .map_err(|error| ("index_hydration", error.to_string(), 7u8))?;

    Ok(PreparedIndex { embedder, index, report })
}
