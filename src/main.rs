//! Episode Harvester API Server
//!
//! Main entry point for the episode acquisition REST API service.

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use episode_harvester::config::Config;
use episode_harvester::routes::{configure_routes, ApiDoc, AppState};

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_address = format!("{}:{}", config.host, config.port);

    let app_state = web::Data::new(AppState {
        config: config.clone(),
    });

    info!("Starting Episode Harvester API server on {}", bind_address);
    if config.metadata_api_key.is_none() {
        info!("No metadata API key configured; api mode is disabled");
    }
    if config.enrichment_api_key.is_none() {
        info!("No enrichment API key configured; description backfill is disabled");
    }

    let openapi = ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .route("/health", web::get().to(health_check))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
