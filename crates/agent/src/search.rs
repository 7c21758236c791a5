use std::sync::Arc;

use cartwise_core::config::SearchConfig;
use cartwise_core::domain::conversation::{Message, SearchFilters, SortBy};
use cartwise_core::domain::product::SearchHit;
use tracing::{info, warn};

use crate::embedding::EmbeddingProvider;
use crate::errors::SearchError;
use crate::index::{IndexQuery, PayloadFilter, ProductIndex};

#[derive(Clone, Debug, PartialEq)]
pub struct SearchSettings {
    /// Hits shown to the user.
    pub result_limit: usize,
    /// Candidates fetched before a price re-sort.
    pub candidate_pool: usize,
    pub currency_symbol: String,
    pub currency_code: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            result_limit: 5,
            candidate_pool: 20,
            currency_symbol: "\u{20b9}".to_string(),
            currency_code: "INR".to_string(),
        }
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            result_limit: config.result_limit,
            candidate_pool: config.candidate_pool.max(config.result_limit),
            currency_symbol: config.currency_symbol.clone(),
            currency_code: config.currency_code.clone(),
        }
    }
}

pub struct SearchExecutor {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn ProductIndex>,
    settings: SearchSettings,
}

impl SearchExecutor {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn ProductIndex>,
        settings: SearchSettings,
    ) -> Self {
        Self { embedder, index, settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Runs one search and renders exactly one assistant message. Backend
    /// failures become the message text instead of an error.
    pub async fn search(&self, filters: &SearchFilters) -> Message {
        match self.retrieve(filters).await {
            Ok(hits) => {
                info!(
                    event_name = "agent.search.completed",
                    sort_by = filters.sort_by.as_str(),
                    max_price = filters.max_price,
                    hits = hits.len(),
                    "search completed"
                );
                Message::assistant(self.render_hits(&hits, filters))
            }
            Err(error) => {
                warn!(
                    event_name = "agent.search.failed",
                    error = %error,
                    collection = self.index.collection(),
                    "search failed"
                );
                Message::assistant(render_error(&error))
            }
        }
    }

    pub async fn retrieve(&self, filters: &SearchFilters) -> Result<Vec<SearchHit>, SearchError> {
        let vector = self.vectorize(&filters.query).await?;
        let filter = filters.price_ceiling().map(PayloadFilter::PriceAtMost);
        let limit = if filters.sort_by.is_price_ordering() {
            self.settings.candidate_pool
        } else {
            self.settings.result_limit
        };

        let candidates = self.index.query(IndexQuery { vector, filter, limit }).await?;
        Ok(rank_candidates(candidates, filters.sort_by, self.settings.result_limit))
    }

    async fn vectorize(&self, query: &str) -> Result<Vec<f32>, SearchError> {
        let dimensions = self.embedder.dimensions();
        if query.trim().is_empty() {
            return Ok(vec![0.0; dimensions]);
        }

        let embedder = Arc::clone(&self.embedder);
        let text = query.to_string();
        let vector = tokio::task::spawn_blocking(move || embedder.embed(&text))
            .await
            .map_err(|error| SearchError::Embedding(error.to_string()))?
            .map_err(|error| SearchError::Embedding(error.to_string()))?;

        if vector.len() != dimensions {
            return Err(SearchError::DimensionMismatch {
                collection: self.index.collection().to_string(),
                expected: dimensions,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }

    pub fn render_hits(&self, hits: &[SearchHit], filters: &SearchFilters) -> String {
        if hits.is_empty() {
            return self.render_empty(filters);
        }

        let mut text = String::from("Here are the top matches I found:\n");
        for (position, hit) in hits.iter().enumerate() {
            text.push_str(&format!(
                "\n{}. **{}** - {}{}\n   *ID: {}*",
                position + 1,
                hit.title,
                self.settings.currency_symbol,
                format_amount(hit.price),
                hit.id
            ));
        }
        text
    }

    fn render_empty(&self, filters: &SearchFilters) -> String {
        match filters.price_ceiling() {
            Some(ceiling) => format!(
                "I couldn't find any products matching your strict criteria (e.g., price <= {} {}). Try increasing your budget!",
                format_amount(ceiling),
                self.settings.currency_code
            ),
            None => "I couldn't find any products matching your search. Try describing the item differently!"
                .to_string(),
        }
    }
}

/// Price orderings re-sort the wider pool (stable, so similarity breaks ties)
/// before truncating; relevance keeps the index order.
pub fn rank_candidates(mut hits: Vec<SearchHit>, sort_by: SortBy, limit: usize) -> Vec<SearchHit> {
    match sort_by {
        SortBy::Relevance => {}
        SortBy::PriceAsc => hits.sort_by(|left, right| left.price.total_cmp(&right.price)),
        SortBy::PriceDesc => hits.sort_by(|left, right| right.price.total_cmp(&left.price)),
    }
    hits.truncate(limit);
    hits
}

pub fn render_error(error: &SearchError) -> String {
    format!("Database Search Error: {error}")
}

fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}
