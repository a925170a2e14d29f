//! Localized user-facing messages
//!
//! Every message that leaves the service goes through this catalog, keyed
//! by error code and language. Unknown codes fall back to a generic
//! internal-error message so a missing mapping never leaks a raw code to
//! the client.

use lyrchat::Language;

/// Stable error codes used in logs and the message catalog
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const DUPLICATE_REQUEST: &str = "DUPLICATE_REQUEST";
    pub const AI_SERVICE_UNAVAILABLE: &str = "AI_SERVICE_UNAVAILABLE";
    pub const AI_NO_RESPONSE: &str = "AI_NO_RESPONSE";
    pub const SEARCH_SONG_ERROR: &str = "SEARCH_SONG_ERROR";
    pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
}

/// Message shown when an error code has no catalog entry
fn fallback(lang: Language) -> &'static str {
    match lang {
        Language::Zh => "服务器内部错误，请稍后重试",
        Language::En => "Internal server error, please try again later",
    }
}

/// Localized message for an error code
pub fn error_message(code: &str, lang: Language) -> &'static str {
    match (code, lang) {
        (codes::DUPLICATE_REQUEST, Language::Zh) => "请求过于频繁，请稍后再试",
        (codes::DUPLICATE_REQUEST, Language::En) => {
            "Too many identical requests, please try again later"
        }
        (codes::AI_SERVICE_UNAVAILABLE, Language::Zh) => "AI服务暂时不可用，请稍后重试",
        (codes::AI_SERVICE_UNAVAILABLE, Language::En) => {
            "The AI service is temporarily unavailable, please try again later"
        }
        (codes::AI_NO_RESPONSE, Language::Zh) => "AI服务未返回有效回答，请重试",
        (codes::AI_NO_RESPONSE, Language::En) => {
            "The AI service returned no valid answer, please retry"
        }
        (codes::SEARCH_SONG_ERROR, Language::Zh) => "搜索歌曲失败，请稍后重试",
        (codes::SEARCH_SONG_ERROR, Language::En) => {
            "Song search failed, please try again later"
        }
        (codes::VALIDATION_ERROR, Language::Zh) => "请求参数错误",
        (codes::VALIDATION_ERROR, Language::En) => "Invalid request parameters",
        _ => fallback(lang),
    }
}

/// Localized message for a request-body validation failure
pub fn validation_message(kind: crate::dto::ValidationKind, lang: Language) -> &'static str {
    use crate::dto::ValidationKind::*;
    match (kind, lang) {
        (QuestionRequired, Language::Zh) => "问题不能为空",
        (QuestionRequired, Language::En) => "The question must not be empty",
        (QuestionLength, Language::Zh) => "问题长度必须在2-500个字符之间",
        (QuestionLength, Language::En) => "The question must be between 2 and 500 characters",
        (QuestionCharset, Language::Zh) => "问题包含非法字符",
        (QuestionCharset, Language::En) => "The question contains unsupported characters",
        (MusicCountRange, Language::Zh) => "歌曲数量必须在1-20之间",
        (MusicCountRange, Language::En) => "The music count must be between 1 and 20",
        (ArtistRequired, Language::Zh) => "歌手名称不能为空",
        (ArtistRequired, Language::En) => "The artist name must not be empty",
        (ArtistTooLong, Language::Zh) => "歌手名称长度不能超过50个字符",
        (ArtistTooLong, Language::En) => "The artist name must not exceed 50 characters",
        (SongNameRequired, Language::Zh) => "歌曲名称不能为空",
        (SongNameRequired, Language::En) => "The song name must not be empty",
        (SongNameTooLong, Language::Zh) => "歌曲名称长度不能超过100个字符",
        (SongNameTooLong, Language::En) => "The song name must not exceed 100 characters",
    }
}
