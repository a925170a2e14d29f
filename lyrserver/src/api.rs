//! REST endpoints
//!
//! All handlers answer the uniform `ApiResponse` envelope. Duplicate
//! questions are answered 200 with a soft error so clients retrying in a
//! loop do not see a failure cascade.

use crate::answer::{AnswerError, AnswerService, Preferences};
use crate::dedup::{DedupDecision, RequestDeduplicator};
use crate::dto::{AnswerResponse, ApiResponse, MusicInfo, QuestionRequest, SearchSongRequest};
use crate::error::ApiError;
use crate::messages::{self, codes};
use crate::openapi::ApiDoc;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use lyrchat::Language;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

/// Shared handler dependencies
#[derive(Clone)]
pub struct AppState {
    pub answer: Arc<AnswerService>,
    pub dedup: Arc<RequestDeduplicator>,
    pub max_question_length: usize,
}

/// Builds the application router, Swagger UI included
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/ask", post(ask))
        .route("/api/music/search", post(search_song))
        .route("/health", get(health))
        .route("/api/health", get(api_health))
        .route("/api/health/detailed", get(api_health_detailed))
        .route("/api/health/ready", get(api_health_ready))
        .route("/api/health/live", get(api_health_live))
        .route("/api/cache/stats", get(cache_stats))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

/// Language for this request: explicit `lang` field first, then the
/// Accept-Language header, then the service default
fn resolve_language(lang_field: Option<&str>, headers: &HeaderMap) -> Language {
    if let Some(tag) = lang_field {
        return Language::from_tag(tag);
    }
    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .map(Language::from_accept_language)
        .unwrap_or_default()
}

/// Client address as seen through reverse proxies
fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        // First entry of a multi-proxy chain is the client
        let first = forwarded.split(',').next().unwrap_or("").trim();
        if !first.is_empty() && !first.eq_ignore_ascii_case("unknown") {
            return first.to_string();
        }
    }
    if let Some(real_ip) = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
    {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() && !real_ip.eq_ignore_ascii_case("unknown") {
            return real_ip.to_string();
        }
    }
    "unknown".to_string()
}

fn request_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Answers a question with lyric lines and playable tracks
#[utoipa::path(
    post,
    path = "/api/ask",
    request_body = QuestionRequest,
    responses(
        (status = 200, description = "Answer with resolved tracks", body = ApiResponse<AnswerResponse>),
        (status = 400, description = "Invalid request body"),
        (status = 503, description = "Chat backend unavailable"),
    ),
    tag = "ask",
)]
pub(crate) async fn ask(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<ApiResponse<AnswerResponse>>, ApiError> {
    let language = resolve_language(request.lang.as_deref(), &headers);
    request
        .validate(state.max_question_length)
        .map_err(|kind| ApiError::validation(kind, language))?;

    let question = request.question.trim().to_string();
    let request_id = request_id();
    let ip = client_ip(&headers);

    let preferences = Preferences {
        music_count: request.music_count(),
        language,
        genres: request.genres(),
        regions: request.regions(),
    };

    let fingerprint = RequestDeduplicator::fingerprint(
        &ip,
        &question,
        preferences.music_count,
        &preferences.genres,
        &preferences.regions,
    );
    if state.dedup.check(&fingerprint) == DedupDecision::Duplicate {
        let stats = state.dedup.stats();
        let rate = stats.duplicate_requests as f64 * 100.0 / stats.total_requests.max(1) as f64;
        warn!(
            request_id = %request_id,
            client_ip = %ip,
            question = %question,
            total = stats.total_requests,
            duplicates = stats.duplicate_requests,
            "Duplicate request suppressed ({:.2}% duplicate rate)",
            rate
        );
        return Ok(Json(ApiResponse::error(messages::error_message(
            codes::DUPLICATE_REQUEST,
            language,
        ))));
    }

    info!(request_id = %request_id, client_ip = %ip, question = %question, "Question received");

    let bundle = state
        .answer
        .answer(&question, &preferences)
        .await
        .map_err(|e| match e {
            AnswerError::ServiceUnavailable => ApiError::service_unavailable(language),
            AnswerError::NoResponse => ApiError::no_response(language),
        })?;

    if bundle.tracks.is_empty() {
        info!(request_id = %request_id, "No tracks resolved for this answer");
    }
    for (index, track) in bundle.tracks.iter().enumerate() {
        info!(
            request_id = %request_id,
            "Track {}: {} - {} (id {})",
            index + 1,
            track.artist,
            track.title,
            track.track_id
        );
    }

    Ok(Json(ApiResponse::success(AnswerResponse::new(
        bundle.question,
        bundle.answer,
        bundle.tracks,
    ))))
}

/// Looks up a single track by artist and song name
#[utoipa::path(
    post,
    path = "/api/music/search",
    request_body = SearchSongRequest,
    responses(
        (status = 200, description = "Best match, or empty data when nothing was found", body = ApiResponse<MusicInfo>),
        (status = 400, description = "Invalid request body"),
    ),
    tag = "music",
)]
pub(crate) async fn search_song(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SearchSongRequest>,
) -> Result<Json<ApiResponse<MusicInfo>>, ApiError> {
    let language = resolve_language(None, &headers);
    request
        .validate()
        .map_err(|kind| ApiError::validation(kind, language))?;

    let artist = request.artist.trim();
    let song_name = request.song_name.trim();
    info!(artist, song_name, "Single song search");

    let track = state.answer.search_single(artist, song_name).await;
    Ok(Json(ApiResponse::success_opt(track.map(MusicInfo::from))))
}

/// Plain liveness probe for load balancers
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "health",
)]
pub(crate) async fn health() -> &'static str {
    "OK"
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Basic health report")),
    tag = "health",
)]
pub(crate) async fn api_health() -> Json<Value> {
    Json(json!({
        "status": "UP",
        "application": "LyricBox",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Health report including downstream component probes
#[utoipa::path(
    get,
    path = "/api/health/detailed",
    responses((status = 200, description = "Per-component health report")),
    tag = "health",
)]
pub(crate) async fn api_health_detailed(State(state): State<AppState>) -> Json<Value> {
    let chat_up = state.answer.backend_available().await;
    Json(json!({
        "status": if chat_up { "UP" } else { "DEGRADED" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "components": {
            "chat_backend": if chat_up { "UP" } else { "DOWN" },
        },
    }))
}

/// Readiness probe: not ready while the chat backend is down
#[utoipa::path(
    get,
    path = "/api/health/ready",
    responses(
        (status = 200, description = "Ready to serve"),
        (status = 503, description = "Chat backend is down"),
    ),
    tag = "health",
)]
pub(crate) async fn api_health_ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.answer.backend_available().await {
        (StatusCode::OK, Json(json!({"status": "READY"})))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "NOT_READY"})),
        )
    }
}

#[utoipa::path(
    get,
    path = "/api/health/live",
    responses((status = 200, description = "Process is alive")),
    tag = "health",
)]
pub(crate) async fn api_health_live() -> Json<Value> {
    Json(json!({"status": "ALIVE"}))
}

/// Cache and deduplication counters
#[utoipa::path(
    get,
    path = "/api/cache/stats",
    responses((status = 200, description = "Cache and dedup counters")),
    tag = "monitoring",
)]
pub(crate) async fn cache_stats(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "catalog": state.answer.resolver().cache().stats(),
        "dedup": state.dedup.stats(),
    }))
}
