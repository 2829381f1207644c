//! # OutfitX
//!
//! Outfit completion: given a mission and the garments already in a cart,
//! recommend products for the slots still missing, under a budget and an
//! eco-score floor, and explain the picks in a few short bullets.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! OPENAI_API_KEY=... outfitx --http-port 8181 --data-dir ./data
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use outfitx::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> outfitx::Result<()> {
//! let store = Arc::new(CatalogStore::new(1536));
//! let client = Arc::new(OpenAiClient::new(OpenAiConfig::default())?);
//! let composer = OutfitComposer::new(SearchEngine::new(client.clone(), store));
//!
//! let request = OutfitRequest {
//!     mission: Mission::SmartCasual,
//!     budget_gbp: Some(120.0),
//!     cart_slots: vec![Slot::Top],
//!     ..Default::default()
//! };
//! let response = composer.complete_outfit(&request).await?;
//! let bullets = Explainer::new(client).explain(&response).await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - [`outfitx-core`](https://docs.rs/outfitx-core) - Slots, budgets, constrained search, composition, explanation
//! - [`outfitx-storage`](https://docs.rs/outfitx-storage) - In-memory product catalog with gzip snapshots
//! - [`outfitx-api`](https://docs.rs/outfitx-api) - REST API and OpenAI-compatible clients

// Re-export core types
pub use outfitx_core::{
    Mission, Slot, Vector,
    ProductRecord, Hit,
    OutfitRequest, OutfitResponse, SlotResult,
    OutfitComposer, SearchEngine, Explainer,
    EmbeddingProvider, VectorStore, LanguageModel,
    Filter, ProductFilter, FilterCondition,
    Error, Result,
};

// Re-export storage
pub use outfitx_storage::{CatalogStore, StorageManager};

// Re-export API
pub use outfitx_api::{AppState, OpenAiClient, OpenAiConfig, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Mission, Slot, Vector,
        ProductRecord, Hit,
        OutfitRequest, OutfitResponse, SlotResult,
        OutfitComposer, SearchEngine, Explainer,
        EmbeddingProvider, VectorStore, LanguageModel,
        Error, Result,
        CatalogStore, StorageManager,
        OpenAiClient, OpenAiConfig,
    };
}
