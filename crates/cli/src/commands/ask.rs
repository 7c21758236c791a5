use cartwise_agent::providers::build_runtime;
use cartwise_core::config::{ClassifierKind, ConfigOverrides};
use cartwise_core::domain::conversation::{ConversationState, Message};
use cartwise_db::{CatalogRepository, SqlCatalogRepository};

use crate::commands::{
    build_async_runtime, load_config, open_catalog, prepare_index, CommandResult, Failure,
};

/// Runs one conversation turn for `message` and reports the assistant reply.
pub fn run(message: &str, classifier: Option<ClassifierKind>) -> CommandResult {
    if message.trim().is_empty() {
        return CommandResult::failure("ask", "invalid_input", "message must not be empty", 2);
    }

    let overrides = ConfigOverrides { classifier, ..ConfigOverrides::default() };
    let config = match load_config("ask", overrides) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_async_runtime("ask") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_catalog(&config).await?;
        let catalog = SqlCatalogRepository::new(pool.clone());

        let outcome = async {
            let products = catalog
                .count()
                .await
                .map_err(|error| ("catalog_read", error.to_string(), 4u8))?;
            if products == 0 {
                return Err((
                    "catalog_empty",
                    "the product catalog is empty; run `cartwise seed` first".to_string(),
                    6u8,
                ));
            }

            let prepared = prepare_index(&config, &catalog).await?;
            let agent = build_runtime(&config, prepared.embedder, prepared.index)
                .map_err(|error| ("provider_init", error.to_string(), 6u8))?;

            let state = ConversationState::from_history(vec![Message::user(message)]);
            let next = agent.advance(state).await.map_err(|error| {
                (error.error_class(), error.to_string(), 8u8)
            })?;

            next.last_message()
                .map(|reply| reply.content.clone())
                .ok_or(("empty_reply", "the assistant produced no reply".to_string(), 8u8))
        }
        .await;

        pool.close().await;
        outcome
    });

    match result {
        Ok(reply) => CommandResult::success("ask", reply),
        Err(failure) => CommandResult::from_failure("ask", failure),
    }
}
