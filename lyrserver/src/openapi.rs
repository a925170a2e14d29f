//! OpenAPI document served at `/api-docs/openapi.json`

use crate::dto::{AnswerResponse, ApiResponse, MusicInfo, QuestionRequest, SearchSongRequest};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LyricBox API",
        description = "Answers questions with song lyrics and playable tracks",
    ),
    paths(
        crate::api::ask,
        crate::api::search_song,
        crate::api::health,
        crate::api::api_health,
        crate::api::api_health_detailed,
        crate::api::api_health_ready,
        crate::api::api_health_live,
        crate::api::cache_stats,
    ),
    components(schemas(
        QuestionRequest,
        SearchSongRequest,
        MusicInfo,
        AnswerResponse,
        ApiResponse<AnswerResponse>,
        ApiResponse<MusicInfo>,
    )),
    tags(
        (name = "ask", description = "Question answering"),
        (name = "music", description = "Track search"),
        (name = "health", description = "Health probes"),
        (name = "monitoring", description = "Runtime counters"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_covers_the_public_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/ask"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/music/search"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/health"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/cache/stats"));
    }
}
