//! Text embedding providers.
//!
//! Every provider must be deterministic: the same text always yields the same
//! vector, so repeated searches are reproducible.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding model initialization failed: {0}")]
    InitFailed(String),
    #[error("embedding generation failed: {0}")]
    EmbeddingFailed(String),
    #[error("unknown embedding model `{0}`")]
    InvalidModel(String),
}

pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &str;

    fn dimensions(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Feature-hashing bag-of-words embedder.
///
/// Lowercased alphanumeric tokens are hashed (FNV-1a) into a fixed number of
/// signed buckets and the result is L2-normalised. Texts sharing words land
/// close under cosine similarity, which is enough for offline use and tests.
#[derive(Clone, Debug)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1) }
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|character: char| !character.is_ascii_alphanumeric())
            .filter(|token| !token.is_empty())
        {
            let token = token.to_ascii_lowercase();
            let token = singular(&token);
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|value| *value /= norm);
        }
        Ok(vector)
    }
}

fn singular(token: &str) -> &str {
    if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") {
        &token[..token.len() - 1]
    } else {
        token
    }
}

pub(crate) fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes.iter().fold(OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}

#[cfg(feature = "local-embeddings")]
pub use local::FastEmbedder;

#[cfg(feature = "local-embeddings")]
mod local {
    use std::path::Path;
    use std::sync::Mutex;

    use fastembed::{InitOptions, TextEmbedding};

    use super::{EmbeddingError, EmbeddingProvider};

    /// ONNX sentence embedder. Models are downloaded into `cache_dir/models`
    /// on first use.
    pub struct FastEmbedder {
        model: Mutex<TextEmbedding>,
        model_name: String,
        dimensions: usize,
    }

    impl FastEmbedder {
        pub fn new(model_name: &str, cache_dir: &Path) -> Result<Self, EmbeddingError> {
            let model_enum = parse_model_name(model_name)?;
            let models_dir = cache_dir.join("models");
            std::fs::create_dir_all(&models_dir).map_err(|error| {
                EmbeddingError::InitFailed(format!("failed to create models directory: {error}"))
            })?;

            let options = InitOptions::new(model_enum)
                .with_cache_dir(models_dir)
                .with_show_download_progress(false);
            let mut model = TextEmbedding::try_new(options)
                .map_err(|error| EmbeddingError::InitFailed(error.to_string()))?;
            let dimensions = probe_dimensions(&mut model)?;

            Ok(Self { model: Mutex::new(model), model_name: model_name.to_string(), dimensions })
        }
    }

    impl EmbeddingProvider for FastEmbedder {
        fn name(&self) -> &str {
            &self.model_name
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.embed_batch(&[text.to_string()])?
                .into_iter()
                .next()
                .ok_or_else(|| EmbeddingError::EmbeddingFailed("no embedding returned".to_string()))
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }

            let mut model = self.model.lock().map_err(|error| {
                EmbeddingError::EmbeddingFailed(format!("failed to acquire model lock: {error}"))
            })?;
            model
                .embed(texts.to_vec(), None)
                .map_err(|error| EmbeddingError::EmbeddingFailed(error.to_string()))
        }
    }

    fn parse_model_name(name: &str) -> Result<fastembed::EmbeddingModel, EmbeddingError> {
        match name.to_lowercase().as_str() {
            "bge-small-en-v1.5" | "baai/bge-small-en-v1.5" => {
                Ok(fastembed::EmbeddingModel::BGESmallENV15)
            }
            "bge-small-en-v1.5-q" => Ok(fastembed::EmbeddingModel::BGESmallENV15Q),
            "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
            "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
            _ => Err(EmbeddingError::InvalidModel(name.to_string())),
        }
    }

    fn probe_dimensions(model: &mut TextEmbedding) -> Result<usize, EmbeddingError> {
        model
            .embed(vec!["probe"], None)
            .map_err(|error| EmbeddingError::InitFailed(format!("failed to probe dimensions: {error}")))?
            .first()
            .map(Vec::len)
            .ok_or_else(|| EmbeddingError::InitFailed("model returned no embedding".to_string()))
    }
}
