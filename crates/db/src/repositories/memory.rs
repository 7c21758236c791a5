use std::collections::BTreeMap;

use tokio::sync::RwLock;

use cartwise_core::domain::product::{ProductId, ProductRecord};

use super::{CatalogRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryCatalogRepository {
    products: RwLock<BTreeMap<String, ProductRecord>>,
}

impl InMemoryCatalogRepository {
    pub fn with_products(products: Vec<ProductRecord>) -> Self {
        let products =
            products.into_iter().map(|product| (product.id.0.clone(), product)).collect();
        Self { products: RwLock::new(products) }
    }
}

#[async_trait::async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<ProductRecord>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(&id.0).cloned())
    }

    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.values().cloned().collect())
    }

    async fn save(&self, product: ProductRecord) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        products.insert(product.id.0.clone(), product);
        Ok(())
    }

    async fn save_all(&self, products: Vec<ProductRecord>) -> Result<usize, RepositoryError> {
        let mut stored = self.products.write().await;
        let written = products.len();
        for product in products {
            stored.insert(product.id.0.clone(), product);
        }
        Ok(written)
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.products.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use cartwise_core::domain::product::{ProductId, ProductRecord};

    use crate::repositories::{CatalogRepository, InMemoryCatalogRepository};

    #[tokio::test]
    async fn in_memory_catalog_round_trip() {
        let repo = InMemoryCatalogRepository::default();
        let product = ProductRecord {
            id: ProductId("prod-0100".to_string()),
            title: "Unisex Grey Sunglasses".to_string(),
            description: "Premium quality grey sunglasses for unisex.".to_string(),
            price: 899.0,
            category: "Sunglasses".to_string(),
            color: "Grey".to_string(),
            size: "Standard Size".to_string(),
            stock: 3,
        };

        repo.save(product.clone()).await.expect("save product");
        let found = repo.find_by_id(&product.id).await.expect("find product");

        assert_eq!(found, Some(product));
        assert_eq!(repo.count().await.expect("count"), 1);
    }
}
