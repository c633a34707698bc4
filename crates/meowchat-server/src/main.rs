use std::sync::Arc;

use anyhow::Context;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use meowchat::{CompletionProvider, PersonaCatalog, TurnOrchestrator};

mod adapters;
mod application;
mod config;
mod models;
mod routes;

use adapters::catalog_file::{embedded_catalog, load_catalog};
use adapters::OpenAiProvider;
use application::ChatService;
use config::Config;

const DEFAULT_LOG_FILTER: &str = "meowchat=info,meowchat_server=info,tower_http=info";

/// Chat service over whichever completion provider was configured at startup
pub type AppChatService = ChatService<dyn CompletionProvider>;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<AppChatService>,
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
    model: String,
    sessions: usize,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Meowchat API is running - the cats are listening".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.chat_service.model_id().to_string(),
        sessions: state.chat_service.session_count().await,
    })
}

/// Full application router: health, swagger and the API routes
fn app(state: AppState) -> Router {
    let openapi = routes::swagger::ApiDoc::openapi();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(routes::persona::router())
        .merge(routes::session::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn catalog_from(config: &Config) -> Result<PersonaCatalog, meowchat::DomainError> {
    match &config.personas_path {
        Some(path) => {
            tracing::info!("📖 Loading persona catalog from {}", path.display());
            load_catalog(path).await
        }
        None => embedded_catalog(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🐾 Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    tracing::info!("🐱 Meowchat API initializing...");

    let config = Config::from_env()
        .inspect_err(|e| tracing::error!("❌ {}", e))
        .context("Invalid configuration")?;

    let catalog = catalog_from(&config)
        .await
        .inspect_err(|e| tracing::error!("❌ {}", e))
        .context("Failed to load persona catalog")?;
    tracing::info!(
        "✅ Persona catalog loaded: {} personas, default {}",
        catalog.len(),
        catalog.default_persona().id
    );

    let provider: Arc<dyn CompletionProvider> = Arc::new(
        OpenAiProvider::new(
            &config.base_url,
            &config.api_key,
            &config.model,
            config.request_timeout,
        )
        .context("Failed to create completion provider")?,
    );
    tracing::info!(
        "🧠 Completion provider: {} ({})",
        provider.provider_name(),
        provider.model_id()
    );

    let orchestrator = TurnOrchestrator::new(provider).with_retry(config.retry_policy());
    let chat_service = Arc::new(ChatService::new(Arc::new(catalog), orchestrator));

    let router = app(AppState { chat_service });

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!("📚 Swagger UI: http://{}/swagger-ui", config.bind_addr);
    tracing::info!("✅ Meowchat API listening on http://{}", config.bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

/// Router backed by the in-memory echo provider
#[cfg(test)]
pub(crate) fn test_app(fail: bool) -> Router {
    let chat_service = Arc::new(application::test_support::service(fail));
    app(AppState { chat_service })
}
