pub mod config;
pub mod cutout;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod imaging;
pub mod inference;
pub mod models;
pub mod pipeline;
pub mod repository;
pub mod routes;
pub mod state;

use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::StorageBackend;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Crackle Crack Collector API",
        version = "1.0.0",
        description = "Analyzes photos of surface cracks and collects the findings into per-user eggs"
    ),
    paths(
        handlers::analyze::analyze,
        handlers::egg::provision_egg,
        handlers::egg::get_egg,
        handlers::reset::reset_user_cracks,
    ),
    tags(
        (name = "Analyses", description = "Crack photo ingestion"),
        (name = "Eggs", description = "Per-user collection aggregates"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let api = ApiDoc::openapi();
    let cors = state.config.server.cors.layer();
    let serve_segments = match state.config.storage.backend {
        StorageBackend::Filesystem => Some(ServeDir::new(state.config.storage.root.clone())),
        StorageBackend::S3 => None,
    };

    let mut router = axum::Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state);

    if let Some(serve) = serve_segments {
        router = router.nest_service("/segments", serve);
    }

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}
