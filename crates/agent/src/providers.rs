//! Builds collaborators from configuration.

use std::sync::Arc;

use cartwise_core::config::{
    AppConfig, ClassifierKind, EmbeddingConfig, EmbeddingProviderKind, IndexBackend, IndexConfig,
};
use thiserror::Error;

use crate::classifier::{Classifier, LlmClassifier};
use crate::embedding::{EmbeddingError, EmbeddingProvider, HashingEmbedder};
use crate::errors::SearchError;
use crate::index::{InMemoryProductIndex, ProductIndex};
use crate::llm::{LlmError, OpenAiCompatibleClient};
use crate::router::IntentRouter;
use crate::rules::RuleBasedClassifier;
use crate::runtime::AgentRuntime;
use crate::search::{SearchExecutor, SearchSettings};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error(transparent)]
    Index(#[from] SearchError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("{0}")]
    Unsupported(String),
    #[error("embedder produces {actual}-dimensional vectors but embedding.dimensions is {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>, ProviderError> {
    let embedder: Arc<dyn EmbeddingProvider> = match config.provider {
        EmbeddingProviderKind::Hashing => Arc::new(HashingEmbedder::new(config.dimensions)),
        EmbeddingProviderKind::Fastembed => build_fastembed(config)?,
    };

    if embedder.dimensions() != config.dimensions {
        return Err(ProviderError::DimensionMismatch {
            expected: config.dimensions,
            actual: embedder.dimensions(),
        });
    }
    Ok(embedder)
}

#[cfg(feature = "local-embeddings")]
fn build_fastembed(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>, ProviderError> {
    let embedder = crate::embedding::FastEmbedder::new(&config.model, &config.cache_dir)?;
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "local-embeddings"))]
fn build_fastembed(_config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>, ProviderError> {
    Err(ProviderError::Unsupported(
        "fastembed support is not compiled in; enable the `local-embeddings` feature or set embedding.provider = \"hashing\"".to_string(),
    ))
}

pub fn build_index(config: &IndexConfig) -> Result<Arc<dyn ProductIndex>, ProviderError> {
    match config.backend {
        IndexBackend::Memory => Ok(Arc::new(InMemoryProductIndex::new(config.collection.clone()))),
        IndexBackend::Qdrant => build_qdrant(config),
    }
}

#[cfg(feature = "qdrant")]
fn build_qdrant(config: &IndexConfig) -> Result<Arc<dyn ProductIndex>, ProviderError> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| ProviderError::Unsupported("index.url is required for qdrant".to_string()))?;
    let index = crate::qdrant::QdrantProductIndex::connect(url, config.collection.clone())?;
    Ok(Arc::new(index))
}

#[cfg(not(feature = "qdrant"))]
fn build_qdrant(_config: &IndexConfig) -> Result<Arc<dyn ProductIndex>, ProviderError> {
    Err(ProviderError::Unsupported(
        "qdrant support is not compiled in; enable the `qdrant` feature or set index.backend = \"memory\"".to_string(),
    ))
}

pub fn build_classifier(config: &AppConfig) -> Result<Arc<dyn Classifier>, ProviderError> {
    match config.router.classifier {
        ClassifierKind::Rules => Ok(Arc::new(RuleBasedClassifier::new())),
        ClassifierKind::Llm => {
            let client = OpenAiCompatibleClient::from_config(&config.llm)?;
            Ok(Arc::new(LlmClassifier::new(Arc::new(client))))
        }
    }
}

pub fn build_runtime(
    config: &AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn ProductIndex>,
) -> Result<AgentRuntime, ProviderError> {
    let router = IntentRouter::new(build_classifier(config)?);
    let search = SearchExecutor::new(embedder, index, SearchSettings::from(&config.search));
    Ok(AgentRuntime::new(router, search))
}

#[cfg(test)]
mod tests {
    use cartwise_core::config::{AppConfig, ClassifierKind, EmbeddingProviderKind, IndexBackend};

    use super::{build_classifier, build_embedder, build_index};

    #[test]
    fn hashing_embedder_honours_configured_dimensions() {
        let mut config = AppConfig::default();
        config.embedding.provider = EmbeddingProviderKind::Hashing;
        config.embedding.dimensions = 128;

        let embedder = build_embedder(&config.embedding).expect("embedder");
        assert_eq!(embedder.dimensions(), 128);
        assert_eq!(embedder.name(), "hashing");
    }

    #[test]
    fn memory_index_uses_configured_collection() {
        let mut config = AppConfig::default();
        config.index.backend = IndexBackend::Memory;

        let index = build_index(&config.index).expect("index");
        assert_eq!(index.collection(), "ecommerce_products");
    }

    #[test]
    fn classifier_kind_selects_implementation() {
        let mut config = AppConfig::default();
        config.router.classifier = ClassifierKind::Rules;
        assert_eq!(build_classifier(&config).expect("classifier").name(), "rules");

        config.router.classifier = ClassifierKind::Llm;
        assert_eq!(build_classifier(&config).expect("classifier").name(), "llm");
    }
}
