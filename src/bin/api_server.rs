// src/bin/api_server.rs

use herb_catalog::infra::config::{Config, StoreBackend};
use herb_catalog::infra::telemetry;
use herb_catalog::transport;
use herb_catalog::{CatalogService, HerbStore, MemoryHerbStore, PostgresHerbStore};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;

    // --- Store Initialization ---
    let store: Arc<dyn HerbStore> = match &config.store {
        StoreBackend::Postgres { database_url } => {
            info!(
                max_connections = config.pool.max_connections,
                "connecting to PostgreSQL"
            );
            Arc::new(PostgresHerbStore::connect(database_url, &config.pool).await?)
        }
        StoreBackend::Memory => {
            warn!("using the in-memory store; herbs are lost on exit");
            Arc::new(MemoryHerbStore::new())
        }
    };

    let catalog = Arc::new(CatalogService::with_timeout(store, config.store_timeout));
    let app_state = transport::http::AppState {
        catalog,
        environment: config.environment.clone(),
    };

    // --- API Server Initialization ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);
    let app = transport::http::create_router(app_state)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        env = %config.environment,
        "herb catalog listening (Swagger UI at /swagger-ui)"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    info!("server stopped");
    Ok(())
}
