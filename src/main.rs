use clap::Parser;
use outfitx_api::{AppState, OpenAiClient, OpenAiConfig, RestApi};
use outfitx_core::{Explainer, OutfitComposer, SearchEngine};
use outfitx_storage::StorageManager;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Outfit completion service
#[derive(Parser, Debug)]
#[command(name = "outfitx")]
#[command(about = "Completes an outfit from a partial cart", long_about = None)]
struct Args {
    /// Path to the data directory
    #[arg(short, long, env = "OUTFITX_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// HTTP API port
    #[arg(long, env = "OUTFITX_HTTP_PORT", default_value_t = 8181)]
    http_port: u16,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// API key for the embeddings and chat endpoints
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = outfitx_api::openai::DEFAULT_BASE_URL)]
    openai_base_url: String,

    #[arg(long, default_value = outfitx_api::openai::DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    #[arg(long, default_value = outfitx_api::openai::DEFAULT_CHAT_MODEL)]
    chat_model: String,

    /// Embedding dimension of the catalog
    #[arg(long, default_value_t = 1536)]
    vector_dim: usize,

    /// Per-query vector store timeout in milliseconds
    #[arg(long, default_value_t = 3000)]
    store_timeout_ms: u64,

    /// Origin allowed by CORS
    #[arg(long, env = "OUTFITX_CORS_ORIGIN", default_value = "http://localhost:5173")]
    cors_origin: String,

    /// Seconds between background catalog saves
    #[arg(long, default_value_t = 300)]
    save_interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting OutfitX v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);
    info!("HTTP API port: {}", args.http_port);

    let storage = Arc::new(StorageManager::new(&args.data_dir, args.vector_dim)?);
    storage.start_background_save(Duration::from_secs(args.save_interval_secs));
    info!(products = storage.store().count(), "Storage initialized");

    if args.openai_api_key.as_deref().map_or(true, str::is_empty) {
        warn!("OPENAI_API_KEY not set; searches will fail and explanations use the fallback");
    }
    let client = Arc::new(OpenAiClient::new(OpenAiConfig {
        api_key: args.openai_api_key,
        base_url: args.openai_base_url,
        embedding_model: args.embedding_model,
        chat_model: args.chat_model,
        ..Default::default()
    })?);

    let search = SearchEngine::new(client.clone(), storage.store())
        .with_store_timeout(Duration::from_millis(args.store_timeout_ms));
    let state = Arc::new(AppState {
        composer: OutfitComposer::new(search),
        explainer: Explainer::new(client.clone()),
        embedder: client,
        storage: storage.clone(),
    });

    let http_port = args.http_port;
    let cors_origin = args.cors_origin;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, http_port, cors_origin).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("OutfitX started successfully");
    info!("HTTP API: http://localhost:{}/", http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    match storage.save_if_dirty() {
        Ok(Some(desc)) => info!(products = desc.products, "Catalog saved to {:?}", desc.path),
        Ok(None) => {}
        Err(e) => error!("Failed to save catalog: {}", e),
    }
    Ok(())
}
