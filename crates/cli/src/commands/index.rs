use cartwise_agent::embedding::EmbeddingProvider;
use cartwise_core::config::{ConfigOverrides, IndexBackend};
use cartwise_db::SqlCatalogRepository;

use crate::commands::{
    build_async_runtime, load_config, open_catalog, prepare_index, CommandResult,
};

/// Hydrates the configured product index from the catalog store.
pub fn run() -> CommandResult {
    let config = match load_config("index", ConfigOverrides::default()) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_async_runtime("index") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_catalog(&config).await?;
        let catalog = SqlCatalogRepository::new(pool.clone());
        let prepared = prepare_index(&config, &catalog).await;
        pool.close().await;
        prepared
    });

    match result {
        Ok(prepared) => {
            let report = prepared.report;
            let mut message = format!(
                "indexed {} products into collection `{}` using {}",
                report.indexed,
                report.collection,
                prepared.embedder.name()
            );
            if report.created_collection {
                message.push_str(" (collection created)");
            }
            if config.index.backend == IndexBackend::Memory {
                message.push_str("; the in-memory index is rebuilt by every process that serves searches");
            }
            CommandResult::success("index", message)
        }
        Err(failure) => CommandResult::from_failure("index", failure),
    }
}
