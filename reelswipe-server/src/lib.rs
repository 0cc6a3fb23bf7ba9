//! HTTP surface of the aggregator.
//!
//! One GET route per provider plus a liveness probe:
//!
//! | Route | Params | Body |
//! |---|---|---|
//! | `/api/youtube` | `q`, `max`, `pageToken` | `{ items, nextPageToken }` |
//! | `/api/pexels` | `q`, `perPage` | `{ items }` |
//! | `/api/pixabay` | `q`, `perPage` | `{ items }` |
//! | `/api/reddit` | `subreddit`, `limit` | `{ items }` |
//! | `/api/health` | | `{ ok, app }` |
//!
//! Adapter failures become `500 { error: "<Provider> fetch failed", details }`;
//! a YouTube error payload is returned as-is with `400`.
use std::path::Path;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use reelswipe_common::{NormalizedItem, ProviderKind, SearchPage};
use reelswipe_providers::{ProviderError, ProviderSet, SearchQuery};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    providers: ProviderSet,
    app_name: Arc<str>,
}

impl AppState {
    pub fn new(providers: ProviderSet, app_name: impl Into<Arc<str>>) -> Self {
        Self {
            providers,
            app_name: app_name.into(),
        }
    }
}

/// API routes only, without middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/youtube", get(youtube))
        .route("/api/pexels", get(pexels))
        .route("/api/pixabay", get(pixabay))
        .route("/api/reddit", get(reddit))
        .route("/api/health", get(health))
        .with_state(state)
}

/// Full application: API routes, optional static assets, CORS and request tracing.
pub fn app(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = router(state);
    if let Some(dir) = static_dir {
        tracing::info!(static_dir = %dir.display(), "server.static.enabled");
        app = app.fallback_service(ServeDir::new(dir));
    }
    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        app: state.app_name.to_string(),
    })
}

async fn youtube(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<YoutubeEnvelope>, ApiError> {
    let query = SearchQuery::from_params(
        ProviderKind::YouTube,
        param(&params, "q").as_deref(),
        param(&params, "max").as_deref(),
        param(&params, "pageToken").as_deref(),
    );
    let page = search(&state, ProviderKind::YouTube, &query).await?;
    Ok(Json(YoutubeEnvelope {
        items: page.items,
        next_page_token: page.next_page_token,
    }))
}

async fn pexels(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<ItemsEnvelope>, ApiError> {
    stock(&state, ProviderKind::Pexels, &params).await
}

async fn pixabay(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<ItemsEnvelope>, ApiError> {
    stock(&state, ProviderKind::Pixabay, &params).await
}

async fn stock(
    state: &AppState,
    kind: ProviderKind,
    params: &QueryPairs,
) -> Result<Json<ItemsEnvelope>, ApiError> {
    let query = SearchQuery::from_params(
        kind,
        param(params, "q").as_deref(),
        param(params, "perPage").as_deref(),
        None,
    );
    let page = search(state, kind, &query).await?;
    Ok(Json(ItemsEnvelope { items: page.items }))
}

async fn reddit(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<ItemsEnvelope>, ApiError> {
    let query = SearchQuery::from_params(
        ProviderKind::Reddit,
        param(&params, "subreddit").as_deref(),
        param(&params, "limit").as_deref(),
        None,
    );
    let page = search(&state, ProviderKind::Reddit, &query).await?;
    Ok(Json(ItemsEnvelope { items: page.items }))
}

async fn search(
    state: &AppState,
    kind: ProviderKind,
    query: &SearchQuery,
) -> Result<SearchPage, ApiError> {
    state
        .providers
        .get(kind)
        .search(query)
        .await
        .map_err(|err| ApiError::from_provider(kind, err))
}

// Raw pairs rather than a typed struct: a typed extractor rejects repeated
// keys and non-numeric counts with a plain-text 400.
type QueryPairs = Vec<(String, String)>;

/// Value of `name`; repeats are joined with `,` (`?q=a&q=b` is `"a,b"`).
fn param(pairs: &[(String, String)], name: &str) -> Option<String> {
    let values: Vec<&str> = pairs
        .iter()
        .filter(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .collect();
    (!values.is_empty()).then(|| values.join(","))
}

#[derive(Debug, Serialize)]
pub struct ItemsEnvelope {
    pub items: Vec<NormalizedItem>,
}

#[derive(Debug, Serialize)]
pub struct YoutubeEnvelope {
    pub items: Vec<NormalizedItem>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub app: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Upstream error payload returned to the caller unchanged.
    #[error("upstream rejected the request")]
    Upstream(serde_json::Value),
    #[error("{provider} fetch failed: {details}")]
    Fetch {
        provider: ProviderKind,
        details: String,
    },
}

impl ApiError {
    fn from_provider(provider: ProviderKind, err: ProviderError) -> Self {
        match err {
            ProviderError::Upstream(body) => {
                tracing::warn!(%provider, "api.search.upstream_error");
                ApiError::Upstream(body)
            }
            other => {
                tracing::warn!(%provider, error = %other, "api.search.failed");
                ApiError::Fetch {
                    provider,
                    details: other.to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Upstream(body) => (StatusCode::BAD_REQUEST, Json(body)).into_response(),
            ApiError::Fetch { provider, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: format!("{provider} fetch failed"),
                    details,
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> QueryPairs {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn param_joins_repeats_in_order() {
        let p = pairs(&[("q", "cats"), ("perPage", "5"), ("q", "dogs")]);
        assert_eq!(param(&p, "q").as_deref(), Some("cats,dogs"));
        assert_eq!(param(&p, "perPage").as_deref(), Some("5"));
        assert_eq!(param(&p, "limit"), None);
    }

    #[test]
    fn empty_value_is_present_but_blank() {
        let p = pairs(&[("q", "")]);
        assert_eq!(param(&p, "q").as_deref(), Some(""));
    }
}
