use lyrcatalog::{CacheSettings, CatalogCache, NeteaseClient, TrackResolver};
use lyrchat::ChatClient;
use lyrconfig::Config;
use lyrserver::{create_router, AnswerService, AppState, RequestDeduplicator};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load(".")?;

    // Chat backend
    let mut chat_builder = ChatClient::builder()
        .base_url(config.get_ai_base_url())
        .api_key(config.get_ai_api_key())
        .model(config.get_ai_model())
        .timeout(Duration::from_secs(config.get_ai_timeout_secs()))
        .max_tokens(config.get_ai_max_tokens() as u32)
        .temperature(config.get_ai_temperature());
    if let Some((host, port)) = config.get_proxy() {
        info!("Routing chat requests through proxy {}:{}", host, port);
        chat_builder = chat_builder.proxy(host, port);
    }
    let chat = Arc::new(chat_builder.build()?);

    // Music catalog
    let catalog = NeteaseClient::builder()
        .search_url(config.get_catalog_search_url())
        .song_url(config.get_catalog_song_url())
        .quality(config.get_catalog_quality())
        .timeout(Duration::from_secs(config.get_catalog_timeout_secs()))
        .build()?;
    let cache = CatalogCache::with_settings(CacheSettings {
        search_capacity: config.get_search_cache_capacity(),
        search_ttl: Duration::from_secs(config.get_search_cache_ttl_secs()),
        search_tti: Duration::from_secs(config.get_search_cache_tti_secs()),
        url_capacity: config.get_url_cache_capacity(),
        url_ttl: Duration::from_secs(config.get_url_cache_ttl_secs()),
    });
    let resolver = TrackResolver::new(Arc::new(catalog), cache);

    let state = AppState {
        answer: Arc::new(AnswerService::new(chat, resolver)),
        dedup: Arc::new(RequestDeduplicator::new(
            config.get_dedup_window_ms(),
            config.get_dedup_sweep_interval_ms(),
        )),
        max_question_length: config.get_max_question_length(),
    };
    let router = create_router(state);

    let port = config.get_http_port();
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("LyricBox listening on http://0.0.0.0:{}", port);
    info!("Swagger UI at {}/swagger-ui", config.get_base_url());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("LyricBox stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C received, shutting down"),
        Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
    }
}
