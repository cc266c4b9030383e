use std::collections::HashMap;
use std::sync::Arc;

use shuttle_axum::axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::aggregator::Aggregator;
use crate::display::relative_date;
use crate::error::Notice;
use crate::feed::{FeedItem, PlatformFilter};
use crate::state::{FeedHandle, FeedSnapshot, LoadStatus};

#[derive(Clone)]
pub struct AppState {
    pub feed: FeedHandle,
    pub aggregator: Arc<Aggregator>,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            feed: FeedHandle::new(),
            aggregator: Arc::new(aggregator),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/feed", get(get_feed))
        .route("/feed/load", post(load_feed))
        .route("/feed/filter", post(filter_feed))
        .route("/feed/clear", post(clear_feed))
        .nest_service("/static", ServeDir::new("static"))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct CardOut {
    #[serde(flatten)]
    item: FeedItem,
    display_date: String,
}

#[derive(serde::Serialize)]
struct FeedView {
    filter: String,
    total: usize,
    items: Vec<CardOut>,
    errors: Vec<Notice>,
    loaded_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    superseded: Option<bool>,
}

impl From<FeedSnapshot> for FeedView {
    fn from(s: FeedSnapshot) -> Self {
        let now = chrono::Utc::now();
        Self {
            filter: s.filter.to_string(),
            total: s.total,
            items: s
                .visible
                .into_iter()
                .map(|item| CardOut {
                    display_date: relative_date(item.date(), now),
                    item,
                })
                .collect(),
            errors: s.errors.iter().map(|e| e.notice()).collect(),
            loaded_at: s.loaded_at.map(|t| t.to_rfc3339()),
            superseded: None,
        }
    }
}

async fn get_feed(State(state): State<AppState>) -> Json<FeedView> {
    Json(state.feed.snapshot().into())
}

async fn load_feed(State(state): State<AppState>) -> Json<FeedView> {
    let status = state.feed.load(Arc::clone(&state.aggregator)).await;
    let mut view: FeedView = state.feed.snapshot().into();
    if status == LoadStatus::Superseded {
        view.superseded = Some(true);
    }
    Json(view)
}

async fn filter_feed(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<FeedView>, (StatusCode, String)> {
    let raw = q.get("platform").map(String::as_str).unwrap_or("all");
    let filter: PlatformFilter = raw
        .parse()
        .map_err(|e: crate::feed::UnknownPlatform| (StatusCode::BAD_REQUEST, e.to_string()))?;
    state.feed.set_filter(filter);
    Ok(Json(state.feed.snapshot().into()))
}

async fn clear_feed(State(state): State<AppState>) -> Json<FeedView> {
    state.feed.clear();
    Json(state.feed.snapshot().into())
}
