use async_trait::async_trait;
use thiserror::Error;

use cartwise_core::domain::product::{ProductId, ProductRecord};

pub mod catalog;
pub mod memory;

pub use catalog::SqlCatalogRepository;
pub use memory::InMemoryCatalogRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Source of truth for product records. Read in bulk by index hydration,
/// never per conversation turn.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<ProductRecord>, RepositoryError>;

    /// Every product, ordered by id.
    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepositoryError>;

    async fn save(&self, product: ProductRecord) -> Result<(), RepositoryError>;

    /// Inserts or replaces `products` atomically. Returns the number written.
    async fn save_all(&self, products: Vec<ProductRecord>) -> Result<usize, RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;
}
