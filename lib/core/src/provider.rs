//! Collaborator seams of the engine.
//!
//! The engine never talks to a network or a database directly; it goes
//! through these traits so production clients and test fakes are
//! interchangeable.

use async_trait::async_trait;

use crate::{ProductFilter, ProductRecord, Result, Vector};

/// Maps text onto a fixed-length embedding
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vector>;
}

/// Nearest-neighbour lookup over product records.
///
/// Implementations return at most `limit` records that satisfy `filter`,
/// ordered by ascending distance with ties broken by product id.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn nearest(
        &self,
        query: &Vector,
        limit: usize,
        filter: &ProductFilter,
    ) -> Result<Vec<(ProductRecord, f64)>>;
}

/// Free-form text generation (prompt in, raw completion out)
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
