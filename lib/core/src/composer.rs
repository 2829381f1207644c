use futures_util::future::try_join_all;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::budget::per_slot_budget;
use crate::search::{slot_query, SearchEngine};
use crate::slot::{deserialize_cart_slots, missing_slots, required_slots};
use crate::{Hit, Mission, Result, Slot};

pub const DEFAULT_LIMIT_PER_SLOT: usize = 3;

/// Outfit completion request.
///
/// A missing, null or non-positive budget or eco floor means "unconstrained".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutfitRequest {
    #[serde(default)]
    pub mission: Mission,
    #[serde(default, deserialize_with = "positive_f64", skip_serializing_if = "Option::is_none")]
    pub budget_gbp: Option<f64>,
    #[serde(default, deserialize_with = "positive_i32", skip_serializing_if = "Option::is_none")]
    pub min_eco_score: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_cart_slots")]
    pub cart_slots: Vec<Slot>,
    #[serde(default)]
    pub limit_per_slot: i64,
}

impl OutfitRequest {
    /// Result limit per slot; unset or non-positive values use the default
    #[must_use]
    pub fn limit(&self) -> usize {
        if self.limit_per_slot <= 0 {
            DEFAULT_LIMIT_PER_SLOT
        } else {
            self.limit_per_slot as usize
        }
    }
}

/// Recommendations for one missing slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotResult {
    pub slot: Slot,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hits: Vec<Hit>,
    /// Why nothing matched; only set when `hits` is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutfitResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub missing_slots: Vec<Slot>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<SlotResult>,
}

impl OutfitResponse {
    #[must_use]
    pub fn has_hits(&self) -> bool {
        self.results.iter().any(|r| !r.hits.is_empty())
    }
}

/// Runs slot resolution, budget allocation and one search per missing slot
#[derive(Clone)]
pub struct OutfitComposer {
    search: SearchEngine,
}

impl OutfitComposer {
    pub fn new(search: SearchEngine) -> Self {
        Self { search }
    }

    pub fn search_engine(&self) -> &SearchEngine {
        &self.search
    }

    /// Complete an outfit.
    ///
    /// Slot searches run concurrently; results keep the order of the missing
    /// slots. The first failing search fails the whole request.
    pub async fn complete_outfit(&self, request: &OutfitRequest) -> Result<OutfitResponse> {
        let limit = request.limit();
        let missing = missing_slots(required_slots(request.mission), &request.cart_slots);

        if missing.is_empty() {
            info!(mission = %request.mission, "cart already complete");
            return Ok(OutfitResponse::default());
        }

        let slot_budget = per_slot_budget(request.budget_gbp, missing.len());
        let searches = missing.iter().map(|&slot| {
            self.recommend_slot(request.mission, slot, limit, slot_budget, request.min_eco_score)
        });
        let results = try_join_all(searches).await?;

        info!(
            mission = %request.mission,
            missing = missing.len(),
            hits = results.iter().map(|r| r.hits.len()).sum::<usize>(),
            "outfit completed"
        );

        Ok(OutfitResponse {
            missing_slots: missing,
            results,
        })
    }

    async fn recommend_slot(
        &self,
        mission: Mission,
        slot: Slot,
        limit: usize,
        slot_budget: Option<f64>,
        min_eco: Option<i32>,
    ) -> Result<SlotResult> {
        let query = slot_query(mission, slot);
        let mut hits = self
            .search
            .search(&query, limit, slot_budget, min_eco, Some(slot))
            .await?;
        debug!(%slot, hits = hits.len(), "slot searched");

        if hits.is_empty() {
            return Ok(SlotResult {
                slot,
                hits,
                reason: Some(no_match_reason(slot, slot_budget, min_eco)),
            });
        }

        for hit in &mut hits {
            hit.reason = hit_rationale(slot, hit, slot_budget);
        }
        Ok(SlotResult {
            slot,
            hits,
            reason: None,
        })
    }
}

fn no_match_reason(slot: Slot, slot_budget: Option<f64>, min_eco: Option<i32>) -> String {
    let budget = match slot_budget {
        Some(b) => format!("slotBudget<=£{:.2}", b),
        None => "slotBudget=unlimited".to_string(),
    };
    let eco = match min_eco {
        Some(e) => format!("minEco={}", e),
        None => "minEco=none".to_string(),
    };
    format!("No products satisfy constraints for slot={} ({}, {}).", slot, budget, eco)
}

fn hit_rationale(slot: Slot, hit: &Hit, slot_budget: Option<f64>) -> String {
    let fit = match slot_budget {
        Some(b) => format!("within slot budget £{:.2}", b),
        None => "with no slot budget ceiling".to_string(),
    };
    format!(
        "Matches slot={}. Eco={}. Price=£{:.2} {}.",
        slot, hit.eco_score, hit.price_gbp, fit
    )
}

fn positive_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<f64> = Option::deserialize(deserializer)?;
    Ok(v.filter(|b| *b > 0.0))
}

fn positive_i32<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<i32> = Option::deserialize(deserializer)?;
    Ok(v.filter(|e| *e > 0))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let v: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(v.unwrap_or_default())
}
