use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use mycoder::application::ports::{FileLoader, FileStore, LibraryStore};
use mycoder::application::services::{ContextAssembler, ModelRelay};
use mycoder::infrastructure::llm::create_streaming_llm_client;
use mycoder::infrastructure::observability::{TracingConfig, init_tracing};
use mycoder::infrastructure::storage::{JsonLibraryStore, LocalFileStore};
use mycoder::infrastructure::text_processing::TextExtractor;
use mycoder::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(
        TracingConfig::from_settings(environment, &settings.logging),
        settings.server.port,
    );

    let local_store = LocalFileStore::new(settings.storage.uploads_dir.clone())?;
    let library_store: Arc<dyn LibraryStore> = Arc::new(JsonLibraryStore::new(
        settings.storage.library_index(),
        local_store.object_store(),
    )?);
    let file_store: Arc<dyn FileStore> = Arc::new(local_store);
    let file_loader: Arc<dyn FileLoader> = Arc::new(TextExtractor::with_default_adapters());

    let context_assembler = Arc::new(ContextAssembler::new(
        Arc::clone(&file_store),
        Arc::clone(&library_store),
        file_loader,
        settings.context.budget_floor,
    ));

    let llm_client = Arc::new(create_streaming_llm_client(&settings.llm)?);
    if !settings.llm.is_configured() {
        tracing::warn!(
            provider = %settings.llm.provider,
            "No API key configured; ask endpoints will answer 503"
        );
    }

    let model_relay = Arc::new(ModelRelay::new(
        llm_client,
        Duration::from_secs(settings.llm.first_delta_timeout_seconds),
    ));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        context_assembler,
        model_relay,
        file_store,
        library_store,
        settings,
    };

    let router = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
