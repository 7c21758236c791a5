use std::collections::HashMap;

use async_trait::async_trait;
use cartwise_core::domain::product::{ProductId, ProductPayload, SearchHit};
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, PointStruct, Query,
    QueryPointsBuilder, Range, UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;

use crate::embedding::fnv1a;
use crate::errors::SearchError;
use crate::index::{IndexEntry, IndexQuery, PayloadFilter, ProductIndex};

/// Product index stored in a Qdrant collection.
///
/// Qdrant point ids must be integers or UUIDs, so each product id is hashed
/// to a `u64` and the original id travels in the payload.
pub struct QdrantProductIndex {
    client: Qdrant,
    collection: String,
}

impl QdrantProductIndex {
    pub fn connect(url: &str, collection: impl Into<String>) -> Result<Self, SearchError> {
        let client =
            Qdrant::from_url(url).build().map_err(|error| SearchError::Index(error.to_string()))?;
        Ok(Self { client, collection: collection.into() })
    }
}

#[async_trait]
impl ProductIndex for QdrantProductIndex {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn collection_exists(&self) -> Result<bool, SearchError> {
        self.client
            .collection_exists(&self.collection)
            .await
            .map_err(|error| SearchError::Index(error.to_string()))
    }

    async fn create_collection(&self, dimensions: usize) -> Result<(), SearchError> {
        if self.collection_exists().await? {
            return Ok(());
        }
        self.client
            .create_collection(
                CreateCollectionBuilder::new(self.collection.clone())
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(|error| SearchError::Index(error.to_string()))?;
        Ok(())
    }

    async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<usize, SearchError> {
        let written = entries.len();
        let points = entries
            .into_iter()
            .map(|entry| {
                let payload = Payload::try_from(json!({
                    "id": entry.payload.id.0,
                    "title": entry.payload.title,
                    "price": entry.payload.price,
                    "category": entry.payload.category,
                }))
                .map_err(|error| SearchError::Index(error.to_string()))?;
                Ok(PointStruct::new(point_id(&entry.payload.id), entry.vector, payload))
            })
            .collect::<Result<Vec<_>, SearchError>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(self.collection.clone(), points).wait(true))
            .await
            .map_err(|error| SearchError::Index(error.to_string()))?;
        Ok(written)
    }

    async fn query(&self, query: IndexQuery) -> Result<Vec<SearchHit>, SearchError> {
        if !self.collection_exists().await? {
            return Err(SearchError::CollectionMissing(self.collection.clone()));
        }

        let mut request = QueryPointsBuilder::new(self.collection.clone())
            .query(Query::new_nearest(query.vector))
            .with_payload(true)
            .limit(query.limit as u64);
        if let Some(filter) = query.filter {
            filter.validate()?;
            request = request.filter(qdrant_filter(filter));
        }

        let response =
            self.client.query(request).await.map_err(|error| SearchError::Index(error.to_string()))?;

        response
            .result
            .into_iter()
            .enumerate()
            .map(|(position, point)| {
                let payload = decode_payload(&point.payload)?;
                Ok(SearchHit::from_payload(payload, position + 1, point.score))
            })
            .collect()
    }

    async fn count(&self) -> Result<usize, SearchError> {
        let response = self
            .client
            .count(CountPointsBuilder::new(self.collection.clone()).exact(true))
            .await
            .map_err(|error| SearchError::Index(error.to_string()))?;
        Ok(response.result.map(|result| result.count as usize).unwrap_or_default())
    }
}

fn point_id(id: &ProductId) -> u64 {
    fnv1a(id.0.as_bytes())
}

fn qdrant_filter(filter: PayloadFilter) -> Filter {
    match filter {
        PayloadFilter::PriceAtMost(ceiling) => Filter::must([Condition::range(
            "price",
            Range { lte: Some(ceiling), ..Default::default() },
        )]),
    }
}

fn decode_payload(payload: &HashMap<String, Value>) -> Result<ProductPayload, SearchError> {
    let text = |key: &str| match payload.get(key).and_then(|value| value.kind.as_ref()) {
        Some(Kind::StringValue(value)) => Ok(value.clone()),
        _ => Err(SearchError::Index(format!("point payload is missing `{key}`"))),
    };
    let price = match payload.get("price").and_then(|value| value.kind.as_ref()) {
        Some(Kind::DoubleValue(value)) => *value,
        Some(Kind::IntegerValue(value)) => *value as f64,
        _ => return Err(SearchError::Index("point payload is missing `price`".to_string())),
    };

    Ok(ProductPayload {
        id: ProductId(text("id")?),
        title: text("title")?,
        price,
        category: text("category")?,
    })
}
