use crate::errors::AppError;
use crate::models::{
    parse_feed_date, Aggregation, AggregationRequest, Granularity, TodaySnapshot, ViewResponse,
};
use crate::state::AppState;
use crate::stats::{aggregate_at, today_snapshot};
use crate::view::AnalyticsView;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub granularity: Option<String>,
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct GranularityRequest {
    pub granularity: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub category: String,
}

pub async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<Aggregation>, AppError> {
    let granularity = match query.granularity.as_deref() {
        Some(raw) => raw.parse::<Granularity>()?,
        None => Granularity::default(),
    };
    let request = AggregationRequest {
        granularity,
        offset: query.offset.unwrap_or(0),
    };

    let aggregation = aggregate_at(today(), &state.dataset, request, &state.ranges)?;
    debug!(
        ?granularity,
        offset = request.offset,
        points = aggregation.points.len(),
        "aggregated"
    );
    Ok(Json(aggregation))
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodaySnapshot>, AppError> {
    Ok(Json(today_snapshot(&state.dataset, today(), &state.ranges)?))
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<TodaySnapshot>, AppError> {
    let date = parse_feed_date(&date)?;
    Ok(Json(today_snapshot(&state.dataset, date, &state.ranges)?))
}

pub async fn get_view(State(state): State<AppState>) -> Result<Json<ViewResponse>, AppError> {
    let view = state.view.lock().await;
    Ok(Json(render_view(&state, &view)?))
}

pub async fn set_granularity(
    State(state): State<AppState>,
    Json(payload): Json<GranularityRequest>,
) -> Result<Json<ViewResponse>, AppError> {
    let granularity = payload.granularity.parse::<Granularity>()?;
    let mut view = state.view.lock().await;
    view.set_granularity(granularity);
    info!(?granularity, "view granularity changed");
    Ok(Json(render_view(&state, &view)?))
}

pub async fn previous_page(State(state): State<AppState>) -> Result<Json<ViewResponse>, AppError> {
    let mut view = state.view.lock().await;
    let current = aggregate_at(today(), &state.dataset, view.request(), &state.ranges)?;
    if current.has_more_previous {
        view.previous_page();
    }
    Ok(Json(render_view(&state, &view)?))
}

pub async fn next_page(State(state): State<AppState>) -> Result<Json<ViewResponse>, AppError> {
    let mut view = state.view.lock().await;
    view.next_page();
    Ok(Json(render_view(&state, &view)?))
}

pub async fn toggle_category(
    State(state): State<AppState>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<ViewResponse>, AppError> {
    let mut view = state.view.lock().await;
    let selected = view
        .toggle_category(payload.category.trim())
        .map_err(|err| AppError::bad_request(err.to_string()))?;
    debug!(category = payload.category.trim(), selected, "category toggled");
    Ok(Json(render_view(&state, &view)?))
}

fn render_view(state: &AppState, view: &AnalyticsView) -> Result<ViewResponse, AppError> {
    let aggregation = aggregate_at(today(), &state.dataset, view.request(), &state.ranges)?;
    Ok(ViewResponse {
        selected: view.selected.iter().cloned().collect(),
        aggregation: view.series(aggregation),
    })
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
