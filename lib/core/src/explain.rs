//! Short natural-language explanations of an outfit response.
//!
//! A language model writes the bullets when there is something to explain.
//! Whenever it is skipped, fails, or answers with anything other than a list
//! of strings, a deterministic summary built from the response is used.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{Error, LanguageModel, OutfitResponse, Result};

pub const MAX_BULLETS: usize = 5;

const METHOD_BULLET: &str =
    "Items were retrieved by semantic similarity for each slot, then filtered by price and eco constraints.";

const INSTRUCTIONS: &str = "\
You are a precise shopping assistant.

Given this JSON result, write 3-5 concise bullet points explaining the selection.

Rules:
- Write like a helpful shopping assistant, not a technical report.
- Avoid repeating field names (do not say \"eco score for bottom\").
- Combine eco + price naturally in the same sentence.
- First bullet MUST state the missing slots exactly as provided in INPUT_JSON.missing_slots.
- Mention mission, eco_score, and price/budget fit.
- If a slot has zero hits, clearly explain why using the reason field.
- Each bullet must be <= 18 words.
- Do NOT invent information.
- When referencing an item, use its title from INPUT_JSON exactly.
- Return ONLY a JSON array of strings. No extra text.
- Base every statement strictly on INPUT_JSON. Do not generalise beyond it.";

pub struct Explainer {
    model: Arc<dyn LanguageModel>,
}

impl Explainer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Explain a response in at most [`MAX_BULLETS`] bullets. Never fails.
    pub async fn explain(&self, response: &OutfitResponse) -> Vec<String> {
        if !response.has_hits() {
            debug!("no hits in response, explaining deterministically");
            return fallback_bullets(response);
        }

        match self.generate(response).await {
            Ok(mut bullets) => {
                bullets.truncate(MAX_BULLETS);
                bullets
            }
            Err(e) => {
                warn!(error = %e, "explanation model unusable, using fallback");
                fallback_bullets(response)
            }
        }
    }

    async fn generate(&self, response: &OutfitResponse) -> Result<Vec<String>> {
        let prompt = build_prompt(response)?;
        let raw = self.model.generate(&prompt).await?;
        debug!(raw = %raw, "explanation model answered");
        parse_bullets(&raw)
    }
}

pub fn build_prompt(response: &OutfitResponse) -> Result<String> {
    let input = serde_json::to_string(response)?;
    Ok(format!("{}\n\nINPUT_JSON:\n{}\n", INSTRUCTIONS, input))
}

/// Deterministic bullets summarising `response`
#[must_use]
pub fn fallback_bullets(response: &OutfitResponse) -> Vec<String> {
    let slots: Vec<&str> = response.missing_slots.iter().map(|s| s.as_str()).collect();
    let mut out = vec![
        format!("Missing slots detected: [{}].", slots.join(", ")),
        METHOD_BULLET.to_string(),
    ];

    for result in &response.results {
        match result.hits.first() {
            None => out.push(format!(
                "No results for {}: {}",
                result.slot,
                result.reason.as_deref().unwrap_or("no products matched")
            )),
            Some(top) => out.push(format!(
                "Top {} pick fits constraints: Eco={}, Price=£{:.2}.",
                result.slot, top.eco_score, top.price_gbp
            )),
        }
    }

    out.truncate(MAX_BULLETS);
    out
}

#[derive(Deserialize)]
struct WrappedBullets {
    bullets: Vec<String>,
}

/// Decode model output as a list of bullets.
///
/// Accepts a bare JSON array or an object with a `bullets` array, optionally
/// wrapped in a Markdown code fence. An empty list is an error.
pub fn parse_bullets(raw: &str) -> Result<Vec<String>> {
    let body = strip_code_fence(raw);

    let bullets = serde_json::from_str::<Vec<String>>(body)
        .or_else(|_| serde_json::from_str::<WrappedBullets>(body).map(|w| w.bullets))
        .map_err(|_| Error::Upstream(format!("invalid explain JSON: {}", raw)))?;

    if bullets.is_empty() {
        return Err(Error::Upstream("explanation contained no bullets".to_string()));
    }
    Ok(bullets)
}

fn strip_code_fence(raw: &str) -> &str {
    let mut s = raw.trim();
    if s.starts_with("```") {
        // the opening fence line may carry a language tag
        if let Some(i) = s.find('\n') {
            s = &s[i + 1..];
        }
        if let Some(j) = s.rfind("```") {
            s = &s[..j];
        }
        s = s.trim();
    }
    s
}
