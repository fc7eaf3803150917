use axum::{
    routing::{get, post},
    Router,
    extract::{Json, Query, State},
    http::StatusCode,
};
use serde_json::{Map, Value};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;

use crate::error::{Result, AppError};
use crate::api::extract::EchoBody;
use crate::api::models::{AppInfo, ScrapeQuery, APP_INFO};
use crate::api::response;
use crate::scraper::scrape_fragment;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/info", get(info_handler))
        .route("/api/v1/getback", post(echo_handler))
        .route("/users", get(scrape_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn info_handler() -> (StatusCode, Json<AppInfo>) {
    response::success(APP_INFO)
}

async fn echo_handler(EchoBody(body): EchoBody) -> (StatusCode, Json<Map<String, Value>>) {
    tracing::debug!(keys = body.len(), "echoing request body");
    response::success(body)
}

/// Any failure, including a missing `url`, renders through `AppError` as the
/// fixed failure body.
async fn scrape_handler(
    State(state): State<AppState>,
    query: Option<Query<ScrapeQuery>>,
) -> Result<(StatusCode, Json<String>)> {
    let url = query
        .and_then(|Query(q)| q.url)
        .ok_or(AppError::MissingUrl)?;

    let contents = scrape_fragment(&state.client, &url, &state.fragment_selector).await?;
    tracing::info!(%url, chars = contents.chars().count(), "scrape succeeded");
    Ok(response::success(contents))
}
