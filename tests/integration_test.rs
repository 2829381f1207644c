// Integration tests for OutfitX
use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use outfitx::prelude::*;
use outfitx::AppState;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Places each slot keyword on its own axis of a 4-d space
struct SlotEmbedder;

#[async_trait]
impl EmbeddingProvider for SlotEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        let mut v = vec![0.0f32; 4];
        for (i, slot) in Slot::ALL.iter().enumerate() {
            if text.contains(slot.as_str()) {
                v[i] = 1.0;
            }
        }
        Ok(Vector::new(v))
    }
}

/// Returns a fixed completion and counts calls
struct CannedModel {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl CannedModel {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    fn down() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LanguageModel for CannedModel {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .ok_or_else(|| Error::Upstream("model unavailable".to_string()))
    }
}

fn item(id: &str, slot: Slot, eco: i32, price: f64, embedding: [f32; 4]) -> ProductRecord {
    ProductRecord::new(id, Some(slot))
        .with_title(id.replace('-', " "))
        .with_eco_score(eco)
        .with_price(price)
        .with_embedding(Vector::new(embedding.to_vec()))
}

fn seed(store: &CatalogStore) {
    store
        .batch_upsert(vec![
            item("tee-1", Slot::Top, 90, 15.0, [1.0, 0.0, 0.0, 0.0]),
            item("chino-1", Slot::Bottom, 70, 40.0, [0.0, 1.0, 0.0, 0.0]),
            item("chino-2", Slot::Bottom, 60, 42.0, [0.0, 0.9, 0.1, 0.0]),
            item("jeans-1", Slot::Bottom, 20, 30.0, [0.0, 1.0, 0.0, 0.0]),
            item("cord-1", Slot::Bottom, 80, 65.0, [0.0, 1.0, 0.0, 0.0]),
            item("loafer-1", Slot::Shoes, 80, 95.0, [0.0, 0.0, 1.0, 0.0]),
            item("sneaker-1", Slot::Shoes, 30, 40.0, [0.0, 0.0, 1.0, 0.0]),
            item("shell-1", Slot::Outerwear, 65, 60.0, [0.0, 0.0, 0.0, 1.0]),
        ])
        .unwrap();
    // no embedding yet, never returned
    store
        .upsert(ProductRecord::new("boot-1", Some(Slot::Shoes)).with_eco_score(99).with_price(10.0))
        .unwrap();
}

fn composer(store: Arc<CatalogStore>) -> OutfitComposer {
    OutfitComposer::new(SearchEngine::new(Arc::new(SlotEmbedder), store))
}

fn business_casual() -> OutfitRequest {
    serde_json::from_value(json!({
        "mission": "business_casual",
        "budget_gbp": 90,
        "min_eco_score": 50,
        "cart_slots": ["top"],
        "limit_per_slot": 2
    }))
    .unwrap()
}

#[tokio::test]
async fn test_business_casual_outfit() {
    let store = Arc::new(CatalogStore::new(4));
    seed(&store);

    let resp = composer(store).complete_outfit(&business_casual()).await.unwrap();

    assert_eq!(resp.missing_slots, vec![Slot::Bottom, Slot::Shoes]);

    let bottoms = &resp.results[0];
    let ids: Vec<&str> = bottoms.hits.iter().map(|h| h.product_id.as_str()).collect();
    assert_eq!(ids, vec!["chino-1", "chino-2"]);
    assert_eq!(bottoms.hits[0].distance, 0.0);
    assert_eq!(bottoms.hits[0].similarity, 100.0);
    assert!(bottoms.hits[1].similarity < 100.0);
    assert_eq!(
        bottoms.hits[0].reason,
        "Matches slot=bottom. Eco=70. Price=£40.00 within slot budget £45.00."
    );

    let shoes = &resp.results[1];
    assert!(shoes.hits.is_empty());
    assert_eq!(
        shoes.reason.as_deref(),
        Some("No products satisfy constraints for slot=shoes (slotBudget<=£45.00, minEco=50).")
    );
}

#[tokio::test]
async fn test_unconstrained_request_searches_every_missing_slot() {
    let store = Arc::new(CatalogStore::new(4));
    seed(&store);

    let req: OutfitRequest = serde_json::from_value(json!({
        "mission": "outdoor_rain",
        "budget_gbp": null,
        "cart_slots": ["hat", "shoes"]
    }))
    .unwrap();
    let resp = composer(store).complete_outfit(&req).await.unwrap();

    assert_eq!(resp.missing_slots, vec![Slot::Outerwear, Slot::Bottom]);
    let outerwear = &resp.results[0];
    assert_eq!(outerwear.hits[0].product_id, "shell-1");
    assert!(outerwear.hits[0].reason.ends_with("with no slot budget ceiling."));
    // equal distances break ties by id
    let bottoms: Vec<&str> = resp.results[1].hits.iter().map(|h| h.product_id.as_str()).collect();
    assert_eq!(bottoms, vec!["chino-1", "cord-1", "jeans-1"]);
}

#[tokio::test]
async fn test_explanation_uses_model_bullets() {
    let store = Arc::new(CatalogStore::new(4));
    seed(&store);
    let resp = composer(store).complete_outfit(&business_casual()).await.unwrap();

    let model = Arc::new(CannedModel::replying(
        "```json\n{\"bullets\": [\"Chinos fit the budget.\", \"No shoes met the eco floor.\"]}\n```",
    ));
    let bullets = Explainer::new(model.clone()).explain(&resp).await;

    assert_eq!(bullets, vec!["Chinos fit the budget.", "No shoes met the eco floor."]);
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_explanation_falls_back_when_model_is_down() {
    let store = Arc::new(CatalogStore::new(4));
    seed(&store);
    let resp = composer(store).complete_outfit(&business_casual()).await.unwrap();

    let model = Arc::new(CannedModel::down());
    let bullets = Explainer::new(model.clone()).explain(&resp).await;

    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    assert_eq!(bullets.len(), 4);
    assert_eq!(bullets[0], "Missing slots detected: [bottom, shoes].");
    assert_eq!(bullets[2], "Top bottom pick fits constraints: Eco=70, Price=£40.00.");
    assert!(bullets[3].starts_with("No results for shoes: No products satisfy constraints"));
}

#[tokio::test]
async fn test_catalog_snapshot_restores_search_results() {
    let dir = TempDir::new().unwrap();
    {
        let storage = StorageManager::new(dir.path(), 4).unwrap();
        seed(&storage.store());
        storage.save().unwrap();
    }

    let storage = StorageManager::new(dir.path(), 4).unwrap();
    assert_eq!(storage.store().count(), 9);

    let resp = composer(storage.store()).complete_outfit(&business_casual()).await.unwrap();
    assert_eq!(resp.results[0].hits.len(), 2);
}

#[actix_web::test]
async fn test_http_pipeline() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(StorageManager::new(dir.path(), 4).unwrap());
    seed(&storage.store());

    let state = AppState {
        composer: composer(storage.store()),
        explainer: Explainer::new(Arc::new(CannedModel::down())),
        embedder: Arc::new(SlotEmbedder),
        storage,
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(outfitx_api::routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/complete-outfit")
        .set_json(business_casual())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let outfit: Value = test::read_body_json(resp).await;
    assert_eq!(outfit["missing_slots"], json!(["bottom", "shoes"]));
    assert_eq!(outfit["results"][1]["hits"], json!([]));

    let req = test::TestRequest::post()
        .uri("/explain-outfit")
        .set_json(&outfit)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["bullets"][0], "Missing slots detected: [bottom, shoes].");
}
