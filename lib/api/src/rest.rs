use actix_cors::Cors;
use actix_web::{error, web, App, HttpRequest, HttpResponse, HttpServer, Result as ActixResult};
use outfitx_core::{
    EmbeddingProvider, Error, Explainer, OutfitComposer, OutfitRequest, OutfitResponse,
    ProductRecord, Slot,
};
use outfitx_storage::StorageManager;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_SEARCH_LIMIT: i64 = 5;
const DEMO_BUDGET_GBP: f64 = 120.0;

/// Everything a request handler needs
pub struct AppState {
    pub composer: OutfitComposer,
    pub explainer: Explainer,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub storage: Arc<StorageManager>,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    max_price_gbp: Option<f64>,
    #[serde(default)]
    min_eco_score: Option<i32>,
    #[serde(default)]
    slot: Option<String>,
}

#[derive(Deserialize)]
struct EmbedProductRequest {
    product_id: String,
    #[serde(default, alias = "category")]
    slot: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    thumbnail: String,
    text: String,
    #[serde(default)]
    eco_score: i32,
    #[serde(default)]
    price_gbp: f64,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: Arc<AppState>, port: u16, cors_origin: String) -> std::io::Result<()> {
        let state = web::Data::from(state);
        HttpServer::new(move || {
            let cors = Cors::default()
                .allowed_origin(&cors_origin)
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(state.clone())
                .configure(routes)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Register every endpoint and the JSON body error handler
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/complete-outfit", web::post().to(complete_outfit))
        .route("/demo", web::post().to(demo))
        .route("/explain-outfit", web::post().to(explain_outfit))
        .route("/search", web::post().to(search))
        .route("/embed-product", web::post().to(embed_product))
        .route("/health", web::get().to(health))
        .route("/db-check", web::get().to(db_check));
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = serde_json::json!({ "error": format!("invalid JSON: {}", err) });
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

fn error_response(e: &Error) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        Error::InvalidRequest(_) | Error::InvalidDimension { .. } => HttpResponse::BadRequest().json(body),
        Error::Upstream(_) => HttpResponse::BadGateway().json(body),
        Error::Timeout(_) => HttpResponse::GatewayTimeout().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

async fn run_outfit(state: &AppState, request: &OutfitRequest) -> HttpResponse {
    match state.composer.complete_outfit(request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            warn!(error = %e, mission = %request.mission, "outfit completion failed");
            error_response(&e)
        }
    }
}

async fn complete_outfit(
    state: web::Data<AppState>,
    req: web::Json<OutfitRequest>,
) -> ActixResult<HttpResponse> {
    Ok(run_outfit(&state, &req).await)
}

/// Same as `/complete-outfit`, but any missing field gets a demo default
async fn demo(state: web::Data<AppState>, body: web::Bytes) -> ActixResult<HttpResponse> {
    let mut request: OutfitRequest = serde_json::from_slice(&body).unwrap_or_default();
    if request.budget_gbp.is_none() {
        request.budget_gbp = Some(DEMO_BUDGET_GBP);
    }
    if request.cart_slots.is_empty() {
        request.cart_slots = vec![Slot::Top];
    }
    Ok(run_outfit(&state, &request).await)
}

async fn explain_outfit(
    state: web::Data<AppState>,
    req: web::Json<OutfitResponse>,
) -> ActixResult<HttpResponse> {
    let bullets = state.explainer.explain(&req).await;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "bullets": bullets })))
}

async fn search(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> ActixResult<HttpResponse> {
    let slot = match req.slot.as_deref().filter(|s| !s.trim().is_empty()) {
        None => None,
        Some(name) => match Slot::parse(name) {
            Some(slot) => Some(slot),
            None => {
                return Ok(error_response(&Error::InvalidRequest(format!("unknown slot: {}", name))));
            }
        },
    };
    let limit = req.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_SEARCH_LIMIT) as usize;
    let max_price = req.max_price_gbp.filter(|p| *p > 0.0);
    let min_eco = req.min_eco_score.filter(|e| *e > 0);

    match state
        .composer
        .search_engine()
        .search(&req.query, limit, max_price, min_eco, slot)
        .await
    {
        Ok(hits) => Ok(HttpResponse::Ok().json(serde_json::json!({ "hits": hits }))),
        Err(e) => {
            warn!(error = %e, "search failed");
            Ok(error_response(&e))
        }
    }
}

async fn embed_product(
    state: web::Data<AppState>,
    req: web::Json<EmbedProductRequest>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();
    if req.product_id.trim().is_empty() {
        return Ok(error_response(&Error::InvalidRequest("product_id is required".to_string())));
    }
    if req.text.trim().is_empty() {
        return Ok(error_response(&Error::InvalidRequest("text is required".to_string())));
    }
    if req.price_gbp < 0.0 {
        return Ok(error_response(&Error::InvalidRequest("price_gbp must not be negative".to_string())));
    }

    let slot = req.slot.as_deref().and_then(Slot::parse);
    if slot.is_none() {
        warn!(product_id = %req.product_id, category = ?req.slot, "storing product as unclassified");
    }

    let embedding = match state.embedder.embed(&req.text).await {
        Ok(v) => v,
        Err(e) => return Ok(error_response(&e)),
    };

    let product = ProductRecord::new(req.product_id.clone(), slot)
        .with_title(req.title)
        .with_thumbnail(req.thumbnail)
        .with_eco_score(req.eco_score)
        .with_price(req.price_gbp)
        .with_embedding(embedding);

    match state.storage.store().upsert(product) {
        Ok(()) => {
            info!(product_id = %req.product_id, "product embedded");
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "result": true,
                "product_id": req.product_id,
            })))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

async fn db_check(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let store = state.storage.store();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "products": store.count(),
        "embedded": store.embedded_count(),
        "vector_dim": store.vector_dim(),
    })))
}
