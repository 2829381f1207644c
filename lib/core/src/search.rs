use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::{EmbeddingProvider, Error, Hit, Mission, ProductFilter, Result, Slot, VectorStore};

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(3);

/// Synthetic query phrase used for a slot search, e.g. `"smart_casual shoes"`
#[must_use]
pub fn slot_query(mission: Mission, slot: Slot) -> String {
    format!("{} {}", mission, slot)
}

/// Embeds a query and runs a constrained nearest-neighbour lookup
#[derive(Clone)]
pub struct SearchEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    store_timeout: Duration,
}

impl SearchEngine {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Search for the `limit` closest products.
    ///
    /// `None` constraints are not applied. Hits come back closest first, ties
    /// ordered by product id. Any embedding or store failure fails the call.
    pub async fn search(
        &self,
        query_text: &str,
        limit: usize,
        max_price: Option<f64>,
        min_eco: Option<i32>,
        slot: Option<Slot>,
    ) -> Result<Vec<Hit>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(query_text).await?;
        if query.is_empty() {
            return Err(Error::Upstream("no embedding returned".to_string()));
        }

        let filter = ProductFilter::constraints(slot, min_eco, max_price);
        let lookup = self.store.nearest(&query, limit, &filter);
        let mut matches = tokio::time::timeout(self.store_timeout, lookup)
            .await
            .map_err(|_| Error::Timeout(self.store_timeout.as_millis() as u64))??;

        matches.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        matches.truncate(limit);

        debug!(query = query_text, hits = matches.len(), "search complete");

        Ok(matches
            .into_iter()
            .map(|(product, distance)| Hit::from_match(product, distance))
            .collect())
    }
}
