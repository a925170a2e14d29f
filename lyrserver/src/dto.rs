//! Request and response bodies for the public API

use lazy_static::lazy_static;
use lyrcatalog::ResolvedTrack;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Smallest accepted question length, in characters
pub const MIN_QUESTION_LENGTH: usize = 2;

/// Largest accepted music count
pub const MAX_MUSIC_COUNT: usize = 20;

/// Music count used when the client does not send one
pub const DEFAULT_MUSIC_COUNT: usize = 10;

lazy_static! {
    /// Accepted question alphabet: Han ideographs, ASCII alphanumerics,
    /// whitespace and punctuation
    static ref QUESTION_CHARSET: Regex =
        Regex::new(r"^[\u{4e00}-\u{9fa5}a-zA-Z0-9\s\p{P}]+$").unwrap();
}

/// Which validation rule a request body violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    QuestionRequired,
    QuestionLength,
    QuestionCharset,
    MusicCountRange,
    ArtistRequired,
    ArtistTooLong,
    SongNameRequired,
    SongNameTooLong,
}

/// Body of `POST /api/ask`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    /// The user's question
    pub question: String,
    /// How many tracks to ask for (1..=20, defaults to 10)
    #[serde(default)]
    pub music_count: Option<usize>,
    /// Preferred genre tags
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    /// Preferred region tags
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    /// Response language tag ("zh", "en"); falls back to Accept-Language
    #[serde(default)]
    pub lang: Option<String>,
}

impl QuestionRequest {
    /// Validates the body against the configured question length cap
    pub fn validate(&self, max_question_length: usize) -> Result<(), ValidationKind> {
        let question = self.question.trim();
        if question.is_empty() {
            return Err(ValidationKind::QuestionRequired);
        }

        let length = question.chars().count();
        if length < MIN_QUESTION_LENGTH || length > max_question_length {
            return Err(ValidationKind::QuestionLength);
        }

        if !QUESTION_CHARSET.is_match(question) {
            return Err(ValidationKind::QuestionCharset);
        }

        if let Some(count) = self.music_count {
            if count < 1 || count > MAX_MUSIC_COUNT {
                return Err(ValidationKind::MusicCountRange);
            }
        }

        Ok(())
    }

    /// Requested track count, defaulted
    pub fn music_count(&self) -> usize {
        self.music_count.unwrap_or(DEFAULT_MUSIC_COUNT)
    }

    /// Genre tags, defaulted to pop when absent or empty
    pub fn genres(&self) -> Vec<String> {
        match &self.genres {
            Some(genres) if !genres.is_empty() => genres.clone(),
            _ => vec!["pop".to_string()],
        }
    }

    /// Region tags, defaulted to mainland China when absent or empty
    pub fn regions(&self) -> Vec<String> {
        match &self.regions {
            Some(regions) if !regions.is_empty() => regions.clone(),
            _ => vec!["china".to_string()],
        }
    }
}

/// Body of `POST /api/music/search`
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchSongRequest {
    pub artist: String,
    pub song_name: String,
}

impl SearchSongRequest {
    pub fn validate(&self) -> Result<(), ValidationKind> {
        let artist = self.artist.trim();
        if artist.is_empty() {
            return Err(ValidationKind::ArtistRequired);
        }
        if artist.chars().count() > 50 {
            return Err(ValidationKind::ArtistTooLong);
        }

        let song_name = self.song_name.trim();
        if song_name.is_empty() {
            return Err(ValidationKind::SongNameRequired);
        }
        if song_name.chars().count() > 100 {
            return Err(ValidationKind::SongNameTooLong);
        }

        Ok(())
    }
}

/// Uniform response envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Success envelope around an optional payload ("found nothing" is
    /// still a success, with `data` absent)
    pub fn success_opt(data: Option<T>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// One playable track in an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MusicInfo {
    pub artist: String,
    pub song: String,
    pub song_id: String,
    pub play_url: String,
}

impl From<ResolvedTrack> for MusicInfo {
    fn from(track: ResolvedTrack) -> Self {
        Self {
            artist: track.artist,
            song: track.title,
            song_id: track.track_id,
            play_url: track.play_url,
        }
    }
}

/// Payload of a successful `POST /api/ask`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub question: String,
    pub answer: String,
    /// First entry of `music_list`, kept for older clients
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music: Option<MusicInfo>,
    pub music_list: Vec<MusicInfo>,
}

impl AnswerResponse {
    pub fn new(question: String, answer: String, tracks: Vec<ResolvedTrack>) -> Self {
        let music_list: Vec<MusicInfo> = tracks.into_iter().map(MusicInfo::from).collect();
        Self {
            question,
            answer,
            music: music_list.first().cloned(),
            music_list,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(question: &str) -> QuestionRequest {
        QuestionRequest {
            question: question.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_chinese_question_passes() {
        assert!(ask("感到迷茫怎么办？").validate(500).is_ok());
    }

    #[test]
    fn empty_and_short_questions_are_rejected() {
        assert_eq!(
            ask("   ").validate(500),
            Err(ValidationKind::QuestionRequired)
        );
        assert_eq!(ask("嗯").validate(500), Err(ValidationKind::QuestionLength));
    }

    #[test]
    fn question_length_uses_characters_not_bytes() {
        // 500 Han characters are 1500 bytes but still within the cap
        let question: String = std::iter::repeat('好').take(500).collect();
        assert!(ask(&question).validate(500).is_ok());
        let too_long: String = std::iter::repeat('好').take(501).collect();
        assert_eq!(
            ask(&too_long).validate(500),
            Err(ValidationKind::QuestionLength)
        );
    }

    #[test]
    fn illegal_characters_are_rejected() {
        assert_eq!(
            ask("what about ∑ symbols").validate(500),
            Err(ValidationKind::QuestionCharset)
        );
    }

    #[test]
    fn music_count_bounds() {
        let mut request = ask("最近心情不好");
        request.music_count = Some(0);
        assert_eq!(request.validate(500), Err(ValidationKind::MusicCountRange));
        request.music_count = Some(21);
        assert_eq!(request.validate(500), Err(ValidationKind::MusicCountRange));
        request.music_count = Some(20);
        assert!(request.validate(500).is_ok());
    }

    #[test]
    fn preference_defaults() {
        let request = ask("最近心情不好");
        assert_eq!(request.music_count(), DEFAULT_MUSIC_COUNT);
        assert_eq!(request.genres(), vec!["pop".to_string()]);
        assert_eq!(request.regions(), vec!["china".to_string()]);

        let mut request = ask("最近心情不好");
        request.genres = Some(vec![]);
        assert_eq!(request.genres(), vec!["pop".to_string()]);
    }

    #[test]
    fn search_request_limits() {
        let request = SearchSongRequest {
            artist: "王菲".to_string(),
            song_name: "岁月如歌".to_string(),
        };
        assert!(request.validate().is_ok());

        let request = SearchSongRequest {
            artist: "".to_string(),
            song_name: "岁月如歌".to_string(),
        };
        assert_eq!(request.validate(), Err(ValidationKind::ArtistRequired));

        let request = SearchSongRequest {
            artist: "甲".repeat(51),
            song_name: "岁月如歌".to_string(),
        };
        assert_eq!(request.validate(), Err(ValidationKind::ArtistTooLong));
    }

    #[test]
    fn answer_response_exposes_first_track_as_music() {
        let tracks = vec![
            ResolvedTrack {
                artist: "王菲".to_string(),
                title: "岁月如歌".to_string(),
                track_id: "186016".to_string(),
                play_url: "https://u/1".to_string(),
            },
            ResolvedTrack {
                artist: "陈奕迅".to_string(),
                title: "十年".to_string(),
                track_id: "66842".to_string(),
                play_url: "https://u/2".to_string(),
            },
        ];
        let response = AnswerResponse::new("q".to_string(), "a".to_string(), tracks);
        assert_eq!(response.music_list.len(), 2);
        assert_eq!(response.music.as_ref().unwrap().artist, "王菲");
    }

    #[test]
    fn empty_track_list_has_no_music() {
        let response = AnswerResponse::new("q".to_string(), "a".to_string(), vec![]);
        assert!(response.music.is_none());
        assert!(response.music_list.is_empty());
    }

    #[test]
    fn envelope_serialization_skips_absent_fields() {
        let ok = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "data": 1}));

        let err = serde_json::to_value(ApiResponse::<i32>::error("bad")).unwrap();
        assert_eq!(err, serde_json::json!({"success": false, "error": "bad"}));

        let miss = serde_json::to_value(ApiResponse::<i32>::success_opt(None)).unwrap();
        assert_eq!(miss, serde_json::json!({"success": true}));
    }
}
