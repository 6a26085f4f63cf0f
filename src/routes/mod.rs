//! API Routes module for the episode harvester
//!
//! This module contains the HTTP route handlers exposing the episode
//! acquisition pipeline to the caller (the form-filling UI layer). The
//! handlers are thin plumbing: validate, delegate to the orchestrator,
//! wrap the result.

use actix_web::{web, HttpResponse};
use tracing::info;
use utoipa::OpenApi;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{
    ApiError, ApiResponse, DescriptionSource, Episode, EpisodeSet, FetchRequest, SourceMode,
};
use crate::orchestrator::FallbackOrchestrator;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
}

/// POST /api/episodes/fetch - Run the acquisition pipeline for one season
///
/// The caller selects a source mode; the orchestrator drives the
/// corresponding adapter chain and returns the assembled season result,
/// or one terminal error naming the tiers that were attempted.
#[utoipa::path(
    post,
    path = "/api/episodes/fetch",
    tag = "episodes",
    request_body = FetchRequest,
    responses(
        (status = 200, description = "Episode set assembled successfully", body = EpisodeSet),
        (status = 400, description = "Invalid locator or request", body = ApiError),
        (status = 404, description = "No episodes found in any attempted tier", body = ApiError),
        (status = 502, description = "Upstream failure", body = ApiError)
    )
)]
pub async fn fetch_episodes(
    data: web::Data<AppState>,
    body: web::Json<FetchRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    info!(
        mode = ?request.mode,
        season = request.season,
        "Fetching episodes"
    );

    let mut orchestrator = FallbackOrchestrator::from_config(&data.config);
    let set = orchestrator
        .fetch_episodes(
            &request.locator,
            request.season,
            request.mode,
            request.enrichment_id.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(set)))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Episode Harvester API",
        version = "0.1.0",
        description = "Season-scoped episode acquisition and normalization pipeline"
    ),
    paths(fetch_episodes),
    components(
        schemas(
            FetchRequest,
            EpisodeSet,
            Episode,
            DescriptionSource,
            SourceMode,
            ApiError
        )
    ),
    tags(
        (name = "episodes", description = "Episode acquisition endpoints")
    )
)]
pub struct ApiDoc;

/// Configure API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api").route("/episodes/fetch", web::post().to(fetch_episodes)),
    );
}
