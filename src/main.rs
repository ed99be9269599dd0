//! minaarly-gateway server entry point.
//!
//! Connects to PostgreSQL, wires the outbound clients into the services and
//! starts the Axum HTTP server.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use minaarly_gateway::api;
use minaarly_gateway::app_state::AppState;
use minaarly_gateway::clients::{AiGatewayExtractor, PostcodesIoGeocoder};
use minaarly_gateway::config::ServiceConfig;
use minaarly_gateway::domain::ports::{Geocoder, MosqueRepository, TimetableRepository};
use minaarly_gateway::persistence::{self, MIGRATOR, PostgresStore};
use minaarly_gateway::service::{ImportService, TimetableService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServiceConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(addr = %config.listen_addr, "starting minaarly-gateway");

    // Persistence
    let pool = persistence::connect(&config)
        .await
        .context("connecting to PostgreSQL")?;
    if config.run_migrations {
        MIGRATOR.run(&pool).await.context("running migrations")?;
        tracing::info!("migrations applied");
    }
    let store = PostgresStore::new(pool);
    let mosques: Arc<dyn MosqueRepository> = Arc::new(store.clone());
    let timetables: Arc<dyn TimetableRepository> = Arc::new(store);

    // Outbound clients
    let geocoder: Arc<dyn Geocoder> = Arc::new(PostcodesIoGeocoder::new(
        &config.postcodes_api_url,
        config.http_client_timeout(),
    )?);
    let extractor = Arc::new(AiGatewayExtractor::new(
        &config.ai_gateway_url,
        config.ai_gateway_api_key.clone(),
        config.ai_model.clone(),
        config.ai_client_timeout(),
    )?);
    if config.ai_gateway_api_key.is_empty() {
        tracing::warn!(
            "AI_GATEWAY_API_KEY is not set; timetable extraction will be rejected upstream"
        );
    }

    // Build service layer
    let import_service = Arc::new(ImportService::new(
        Arc::clone(&geocoder),
        mosques,
        config.import.clone(),
    ));
    let timetable_service = Arc::new(TimetableService::new(extractor, timetables));

    // Build application state
    let app_state = AppState {
        import_service,
        timetable_service,
        geocoder,
    };

    // Build router
    let app = Router::new().merge(api::build_router());
    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;
        app.merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", api::doc::ApiDoc::openapi()),
        )
    };
    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
