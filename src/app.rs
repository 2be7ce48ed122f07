use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/analytics", get(handlers::get_analytics))
        .route("/api/today", get(handlers::get_today))
        .route("/api/today/:date", get(handlers::get_day))
        .route("/api/view", get(handlers::get_view))
        .route("/api/view/granularity", post(handlers::set_granularity))
        .route("/api/view/previous", post(handlers::previous_page))
        .route("/api/view/next", post(handlers::next_page))
        .route("/api/view/category", post(handlers::toggle_category))
        .with_state(state)
}
