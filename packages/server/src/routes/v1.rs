use axum::{
    Router,
    routing::{delete, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/analyses", analysis_routes())
        .nest("/users/{user_id}", user_routes())
}

fn analysis_routes() -> Router<AppState> {
    Router::new().route("/", post(handlers::analyze::analyze))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/egg",
            post(handlers::egg::provision_egg).get(handlers::egg::get_egg),
        )
        .route("/cracks", delete(handlers::reset::reset_user_cracks))
}
