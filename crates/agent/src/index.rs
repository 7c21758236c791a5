use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use cartwise_core::domain::product::{ProductId, ProductPayload, SearchHit};
use tokio::sync::RwLock;

use crate::errors::SearchError;

/// One vector plus the payload stored beside it.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexEntry {
    pub vector: Vec<f32>,
    pub payload: ProductPayload,
}

/// Hard payload predicate applied before ranking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PayloadFilter {
    /// `payload.price <= ceiling`, inclusive.
    PriceAtMost(f64),
}

impl PayloadFilter {
    pub fn validate(&self) -> Result<(), SearchError> {
        match self {
            Self::PriceAtMost(ceiling) if !ceiling.is_finite() || *ceiling < 0.0 => {
                Err(SearchError::InvalidFilter(format!("price ceiling {ceiling} is not usable")))
            }
            Self::PriceAtMost(_) => Ok(()),
        }
    }

    pub fn matches(&self, payload: &ProductPayload) -> bool {
        match self {
            Self::PriceAtMost(ceiling) => payload.price <= *ceiling,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexQuery {
    pub vector: Vec<f32>,
    pub filter: Option<PayloadFilter>,
    pub limit: usize,
}

/// A vector similarity store over one named collection, cosine metric.
///
/// `query` returns hits by descending similarity; equal scores are ordered
/// by product id so a single call is always consistent.
#[async_trait]
pub trait ProductIndex: Send + Sync {
    fn collection(&self) -> &str;

    async fn collection_exists(&self) -> Result<bool, SearchError>;

    async fn create_collection(&self, dimensions: usize) -> Result<(), SearchError>;

    /// Inserts or overwrites entries keyed by product id.
    async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<usize, SearchError>;

    async fn query(&self, query: IndexQuery) -> Result<Vec<SearchHit>, SearchError>;

    async fn count(&self) -> Result<usize, SearchError>;
}

struct Collection {
    dimensions: usize,
    entries: BTreeMap<ProductId, IndexEntry>,
}

pub struct InMemoryProductIndex {
    name: String,
    collection: RwLock<Option<Collection>>,
}

impl InMemoryProductIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), collection: RwLock::new(None) }
    }

    fn check_dimensions(&self, expected: usize, actual: usize) -> Result<(), SearchError> {
        if expected == actual {
            Ok(())
        } else {
            Err(SearchError::DimensionMismatch { collection: self.name.clone(), expected, actual })
        }
    }
}

#[async_trait]
impl ProductIndex for InMemoryProductIndex {
    fn collection(&self) -> &str {
        &self.name
    }

    async fn collection_exists(&self) -> Result<bool, SearchError> {
        Ok(self.collection.read().await.is_some())
    }

    async fn create_collection(&self, dimensions: usize) -> Result<(), SearchError> {
        let mut guard = self.collection.write().await;
        if guard.is_none() {
            *guard = Some(Collection { dimensions, entries: BTreeMap::new() });
        }
        Ok(())
    }

    async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<usize, SearchError> {
        let mut guard = self.collection.write().await;
        let collection =
            guard.as_mut().ok_or_else(|| SearchError::CollectionMissing(self.name.clone()))?;

        for entry in &entries {
            self.check_dimensions(collection.dimensions, entry.vector.len())?;
        }
        let written = entries.len();
        for entry in entries {
            collection.entries.insert(entry.payload.id.clone(), entry);
        }
        Ok(written)
    }

    async fn query(&self, query: IndexQuery) -> Result<Vec<SearchHit>, SearchError> {
        let guard = self.collection.read().await;
        let collection =
            guard.as_ref().ok_or_else(|| SearchError::CollectionMissing(self.name.clone()))?;
        self.check_dimensions(collection.dimensions, query.vector.len())?;
        if let Some(filter) = &query.filter {
            filter.validate()?;
        }

        let mut scored = collection
            .entries
            .values()
            .filter(|entry| query.filter.map(|filter| filter.matches(&entry.payload)).unwrap_or(true))
            .map(|entry| (cosine_similarity(&query.vector, &entry.vector), &entry.payload))
            .collect::<Vec<_>>();

        scored.sort_by(|(left_score, left), (right_score, right)| {
            right_score
                .partial_cmp(left_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| left.id.cmp(&right.id))
        });

        Ok(scored
            .into_iter()
            .take(query.limit)
            .enumerate()
            .map(|(position, (score, payload))| {
                SearchHit::from_payload(payload.clone(), position + 1, score)
            })
            .collect())
    }

    async fn count(&self) -> Result<usize, SearchError> {
        let guard = self.collection.read().await;
        guard
            .as_ref()
            .map(|collection| collection.entries.len())
            .ok_or_else(|| SearchError::CollectionMissing(self.name.clone()))
    }
}

/// Cosine similarity; zero when either side has no magnitude.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    let dot = left.iter().zip(right).map(|(a, b)| a * b).sum::<f32>();
    let left_norm = left.iter().map(|value| value * value).sum::<f32>().sqrt();
    let right_norm = right.iter().map(|value| value * value).sum::<f32>().sqrt();
    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }
    dot / (left_norm * right_norm)
}

#[cfg(test)]
mod tests {
    use cartwise_core::domain::product::{ProductId, ProductPayload};

    use super::{InMemoryProductIndex, IndexEntry, IndexQuery, PayloadFilter, ProductIndex};
    use crate::errors::SearchError;

    fn entry(id: &str, price: f64, vector: Vec<f32>) -> IndexEntry {
        IndexEntry {
            vector,
            payload: ProductPayload {
                id: ProductId(id.to_string()),
                title: format!("Product {id}"),
                price,
                category: "Sun Hat".to_string(),
            },
        }
    }

    async fn seeded_index() -> InMemoryProductIndex {
        let index = InMemoryProductIndex::new("test_products");
        index.create_collection(2).await.expect("collection");
        index
            .upsert(vec![
                entry("a", 100.0, vec![1.0, 0.0]),
                entry("b", 100.01, vec![0.9, 0.1]),
                entry("c", 40.0, vec![0.0, 1.0]),
            ])
            .await
            .expect("upsert");
        index
    }

    #[tokio::test]
    async fn query_orders_by_similarity_and_assigns_ranks() {
        let index = seeded_index().await;
        let hits = index
            .query(IndexQuery { vector: vec![1.0, 0.0], filter: None, limit: 10 })
            .await
            .expect("hits");

        let ids = hits.iter().map(|hit| hit.id.0.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(hits[0].similarity_rank, 1);
        assert_eq!(hits[2].similarity_rank, 3);
    }

    #[tokio::test]
    async fn price_ceiling_is_inclusive() {
        let index = seeded_index().await;
        let hits = index
            .query(IndexQuery {
                vector: vec![1.0, 0.0],
                filter: Some(PayloadFilter::PriceAtMost(100.0)),
                limit: 10,
            })
            .await
            .expect("hits");

        let ids = hits.iter().map(|hit| hit.id.0.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn missing_collection_and_wrong_dimensions_fail() {
        let index = InMemoryProductIndex::new("absent");
        let error = index
            .query(IndexQuery { vector: vec![1.0], filter: None, limit: 5 })
            .await
            .expect_err("collection is missing");
        assert!(matches!(error, SearchError::CollectionMissing(name) if name == "absent"));

        let index = seeded_index().await;
        let error = index
            .query(IndexQuery { vector: vec![1.0, 0.0, 0.0], filter: None, limit: 5 })
            .await
            .expect_err("dimension mismatch");
        assert!(matches!(error, SearchError::DimensionMismatch { expected: 2, actual: 3, .. }));
    }

    #[tokio::test]
    async fn upsert_overwrites_by_id() {
        let index = seeded_index().await;
        index.upsert(vec![entry("a", 55.0, vec![1.0, 0.0])]).await.expect("upsert");

        assert_eq!(index.count().await.expect("count"), 3);
        let hits = index
            .query(IndexQuery { vector: vec![1.0, 0.0], filter: None, limit: 1 })
            .await
            .expect("hits");
        assert_eq!(hits[0].price, 55.0);
    }

    #[tokio::test]
    async fn zero_vector_query_still_returns_filtered_candidates() {
        let index = seeded_index().await;
        let hits = index
            .query(IndexQuery { vector: vec![0.0, 0.0], filter: None, limit: 2 })
            .await
            .expect("hits");
        let ids = hits.iter().map(|hit| hit.id.0.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn non_finite_ceiling_is_an_invalid_filter() {
        assert!(matches!(
            PayloadFilter::PriceAtMost(f64::NAN).validate(),
            Err(SearchError::InvalidFilter(_))
        ));
    }
}
