use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::slot::Slot;
use crate::vector::Vector;

/// A catalog product as seen by the recommendation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    /// `None` for products whose category is not one of the known slots
    #[serde(default, deserialize_with = "deserialize_product_slot")]
    pub slot: Option<Slot>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
    /// 0 means unknown
    #[serde(default)]
    pub eco_score: i32,
    #[serde(default)]
    pub price_gbp: f64,
    /// Not yet computed when `None`; such records never match a search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vector>,
}

impl ProductRecord {
    #[must_use]
    pub fn new(id: impl Into<String>, slot: Option<Slot>) -> Self {
        Self {
            id: id.into(),
            slot,
            title: String::new(),
            thumbnail: String::new(),
            eco_score: 0,
            price_gbp: 0.0,
            embedding: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }

    #[must_use]
    pub fn with_eco_score(mut self, eco_score: i32) -> Self {
        self.eco_score = eco_score;
        self
    }

    #[must_use]
    pub fn with_price(mut self, price_gbp: f64) -> Self {
        self.price_gbp = price_gbp;
        self
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vector) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

fn deserialize_product_slot<'de, D>(deserializer: D) -> std::result::Result<Option<Slot>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(|name| {
        let slot = Slot::parse(name);
        if slot.is_none() && !name.trim().is_empty() {
            warn!(category = name, "unrecognized product category, storing as unclassified");
        }
        slot
    }))
}

/// Map a raw distance onto a 0-100 display score.
///
/// Strictly decreasing in `distance`; exactly 100 at distance 0.
#[inline]
#[must_use]
pub fn similarity_score(distance: f64) -> f64 {
    (-distance).exp() * 100.0
}

/// Round a distance to two decimal places for display
#[inline]
#[must_use]
pub fn display_distance(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}

/// A product matched by a search, with its distance and display score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub product_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub eco_score: i32,
    #[serde(default)]
    pub price_gbp: f64,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub similarity: f64,
    /// Rationale for the pick; empty and omitted for plain searches
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

impl Hit {
    /// Project a store match into a hit.
    ///
    /// The similarity is computed from the exact distance before it is rounded.
    #[must_use]
    pub fn from_match(product: ProductRecord, distance: f64) -> Self {
        Self {
            product_id: product.id,
            title: product.title,
            thumbnail: product.thumbnail,
            eco_score: product.eco_score,
            price_gbp: product.price_gbp,
            similarity: similarity_score(distance),
            distance: display_distance(distance),
            reason: String::new(),
        }
    }
}
