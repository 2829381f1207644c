//! # OutfitX Core
//!
//! The outfit-completion recommendation engine.
//!
//! This crate provides the decision logic and leaves I/O to collaborators:
//!
//! - [`required_slots`] / [`missing_slots`] - which garment slots a mission still needs
//! - [`per_slot_budget`] - equal split of the budget across missing slots
//! - [`SearchEngine`] - embedding + constrained nearest-neighbour search
//! - [`OutfitComposer`] - one search per missing slot, with rationale
//! - [`Explainer`] - short bullets via a language model, with deterministic fallback
//!
//! Collaborators are the [`EmbeddingProvider`], [`VectorStore`] and
//! [`LanguageModel`] traits.
//!
//! ## Example
//!
//! ```rust,no_run
//! use outfitx_core::{OutfitComposer, OutfitRequest, SearchEngine, Mission, Slot};
//! # async fn run(embedder: std::sync::Arc<dyn outfitx_core::EmbeddingProvider>,
//! #              store: std::sync::Arc<dyn outfitx_core::VectorStore>) -> outfitx_core::Result<()> {
//! let composer = OutfitComposer::new(SearchEngine::new(embedder, store));
//!
//! let request = OutfitRequest {
//!     mission: Mission::BusinessCasual,
//!     budget_gbp: Some(90.0),
//!     min_eco_score: Some(50),
//!     cart_slots: vec![Slot::Top],
//!     limit_per_slot: 2,
//! };
//! let response = composer.complete_outfit(&request).await?;
//! assert_eq!(response.missing_slots, vec![Slot::Bottom, Slot::Shoes]);
//! # Ok(())
//! # }
//! ```

pub mod budget;
pub mod composer;
pub mod error;
pub mod explain;
pub mod filter;
pub mod product;
pub mod provider;
pub mod search;
pub mod slot;
pub mod vector;

pub use budget::per_slot_budget;
pub use composer::{OutfitComposer, OutfitRequest, OutfitResponse, SlotResult, DEFAULT_LIMIT_PER_SLOT};
pub use error::{Error, Result};
pub use explain::{fallback_bullets, parse_bullets, Explainer, MAX_BULLETS};
pub use filter::{Filter, FilterCondition, ProductFilter};
pub use product::{similarity_score, Hit, ProductRecord};
pub use provider::{EmbeddingProvider, LanguageModel, VectorStore};
pub use search::{slot_query, SearchEngine, DEFAULT_STORE_TIMEOUT};
pub use slot::{missing_slots, required_slots, Mission, Slot};
pub use vector::Vector;
