use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog row as held by the relational store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub color: String,
    pub size: String,
    pub stock: u32,
}

impl ProductRecord {
    /// Text fed to the embedding provider when the product is indexed.
    pub fn embedding_text(&self) -> String {
        format!("{} - {}", self.title, self.description)
    }

    pub fn payload(&self) -> ProductPayload {
        ProductPayload {
            id: self.id.clone(),
            title: self.title.clone(),
            price: self.price,
            category: self.category.clone(),
        }
    }
}

/// The subset of a product stored next to its vector in the product index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub category: String,
}

/// A transient retrieval result. Rendered into text and then dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub category: String,
    /// 1-based position in the similarity ordering returned by the index.
    pub similarity_rank: usize,
    pub score: f32,
}

impl SearchHit {
    pub fn from_payload(payload: ProductPayload, similarity_rank: usize, score: f32) -> Self {
        Self {
            id: payload.id,
            title: payload.title,
            price: payload.price,
            category: payload.category,
            similarity_rank,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ProductId, ProductRecord, SearchHit};

    fn jacket() -> ProductRecord {
        ProductRecord {
            id: ProductId("prod-0001".to_string()),
            title: "Men's Black Winter Jacket (Clearance)".to_string(),
            description: "Premium quality black winter jacket for men's.".to_string(),
            price: 99.0,
            category: "Winter Jacket".to_string(),
            color: "Black".to_string(),
            size: "M".to_string(),
            stock: 12,
        }
    }

    #[test]
    fn embedding_text_joins_title_and_description() {
        assert_eq!(
            jacket().embedding_text(),
            "Men's Black Winter Jacket (Clearance) - Premium quality black winter jacket for men's."
        );
    }

    #[test]
    fn payload_keeps_only_indexed_fields() {
        let payload = jacket().payload();
        let hit = SearchHit::from_payload(payload, 3, 0.5);

        assert_eq!(hit.id.to_string(), "prod-0001");
        assert_eq!(hit.price, 99.0);
        assert_eq!(hit.category, "Winter Jacket");
        assert_eq!(hit.similarity_rank, 3);
    }
}
