use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;

use crate::domain::page::PageResult;
use crate::domain::target::normalize_url;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::web::utils::{auto_refresh_page, shell_page};

const FEATURES: &[&str] = &["fetch-and-render", "ttl-cache", "session-keep-alive", "auto-refresh"];

#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    pub url: Option<String>,
}

impl UrlQuery {
    fn requested(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

#[derive(Serialize)]
struct FetchResponse<'a> {
    #[serde(flatten)]
    page: &'a PageResult,
    cached: bool,
}

#[derive(Serialize)]
struct Pong {
    status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
}

#[derive(Serialize)]
struct Alive {
    status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    last_access: OffsetDateTime,
    message: &'static str,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    status: &'static str,
    service: &'static str,
    target_url: Option<&'a str>,
    #[serde(with = "time::serde::rfc3339")]
    last_access: OffsetDateTime,
    uptime_seconds: u64,
    idle_seconds: u64,
    cache_size: usize,
    features: &'static [&'static str],
}

pub async fn index(State(state): State<AppState>, Query(query): Query<UrlQuery>) -> impl IntoResponse {
    state.activity.touch().await;

    let Some(url) = query.requested() else {
        return (StatusCode::OK, Html(shell_page(None, None)));
    };
    let loaded = state.browser.load(url).await;
    let status = if loaded.page.is_success() { StatusCode::OK } else { StatusCode::BAD_GATEWAY };
    (status, Html(shell_page(Some(url), Some(&loaded))))
}

pub async fn api_fetch(State(state): State<AppState>, Query(query): Query<UrlQuery>) -> Response {
    let Some(url) = query.requested() else {
        let body = json!({ "status": "error", "error": "url parameter is required" });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    let loaded = state.browser.load(url).await;
    let status = if loaded.page.is_success() { StatusCode::OK } else { StatusCode::BAD_GATEWAY };
    let body = FetchResponse { page: &loaded.page, cached: loaded.cached };
    (status, Json(body)).into_response()
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let cache_size = state.browser.cache_size();
    Json(json!({ "status": "ok", "cache_size": cache_size }))
}

pub async fn ping() -> impl IntoResponse {
    Json(Pong { status: "pong", timestamp: OffsetDateTime::now_utc() })
}

pub async fn keep_alive(State(state): State<AppState>) -> impl IntoResponse {
    let last_access = state.activity.touch().await;
    tracing::debug!(%last_access, "keep-alive");
    Json(Alive { status: "alive", last_access, message: "session maintained" })
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.activity.snapshot().await;
    let cache_size = state.browser.cache_size();
    Json(StatusReport {
        status: "running",
        service: "cloud-browser",
        target_url: state.config.target_url.as_deref(),
        last_access: snapshot.last_access,
        uptime_seconds: snapshot.uptime.as_secs(),
        idle_seconds: snapshot.idle.as_secs(),
        cache_size,
        features: FEATURES,
    })
    .into_response()
}

pub async fn auto_refresh(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Html<String>> {
    let raw = query
        .requested()
        .or(state.config.target_url.as_deref())
        .ok_or(AppError::MissingUrl)?;
    let url = normalize_url(raw)?;
    state.activity.touch().await;
    Ok(Html(auto_refresh_page(&url, state.config.refresh_secs)))
}
