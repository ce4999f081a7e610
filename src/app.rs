use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/state", get(handlers::get_state))
        .route("/api/dates", get(handlers::get_dates))
        .route("/api/sections", get(handlers::get_sections))
        .route("/api/totals", get(handlers::get_totals))
        .route("/api/items", post(handlers::add_item))
        .route("/api/items/:id/deactivate", post(handlers::deactivate_item))
        .route("/api/checks", post(handlers::toggle_check))
        .route("/api/themes", post(handlers::add_theme))
        .with_state(state)
}
