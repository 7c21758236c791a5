use std::sync::Arc;

use cartwise_core::domain::product::ProductRecord;
use tracing::info;

use crate::embedding::EmbeddingProvider;
use crate::errors::SearchError;
use crate::index::{IndexEntry, ProductIndex};

const EMBED_BATCH_SIZE: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HydrationReport {
    pub collection: String,
    pub created_collection: bool,
    pub indexed: usize,
}

/// Loads `products` into the product index, creating the collection first
/// when it is missing. Re-running overwrites entries by product id.
pub async fn hydrate_index(
    products: &[ProductRecord],
    embedder: Arc<dyn EmbeddingProvider>,
    index: &dyn ProductIndex,
) -> Result<HydrationReport, SearchError> {
    let created_collection = !index.collection_exists().await?;
    if created_collection {
        index.create_collection(embedder.dimensions()).await?;
    }

    let mut indexed = 0usize;
    for chunk in products.chunks(EMBED_BATCH_SIZE) {
        let texts = chunk.iter().map(ProductRecord::embedding_text).collect::<Vec<_>>();
        let batch_embedder = Arc::clone(&embedder);
        let vectors = tokio::task::spawn_blocking(move || batch_embedder.embed_batch(&texts))
            .await
            .map_err(|error| SearchError::Embedding(error.to_string()))?
            .map_err(|error| SearchError::Embedding(error.to_string()))?;

        let entries = chunk
            .iter()
            .zip(vectors)
            .map(|(product, vector)| IndexEntry { vector, payload: product.payload() })
            .collect::<Vec<_>>();
        indexed += index.upsert(entries).await?;
    }

    info!(
        event_name = "catalog.hydrate.completed",
        collection = index.collection(),
        created_collection,
        indexed,
        "product index hydrated"
    );

    Ok(HydrationReport { collection: index.collection().to_string(), created_collection, indexed })
}
