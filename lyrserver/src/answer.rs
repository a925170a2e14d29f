//! Question-to-tracks orchestration
//!
//! One call chain per question: availability probe, prompt construction,
//! chat completion, lyric-line parsing, catalog resolution. Enrichment is
//! best-effort: catalog trouble shortens the track list but never fails
//! the question.

use lyrcatalog::{parse_candidates, ResolvedTrack, TrackResolver};
use lyrchat::{ChatBackend, Language, PromptBuilder};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Per-request answering preferences, already validated and defaulted
#[derive(Debug, Clone)]
pub struct Preferences {
    pub music_count: usize,
    pub language: Language,
    pub genres: Vec<String>,
    pub regions: Vec<String>,
}

/// Everything a successful question produces
#[derive(Debug, Clone)]
pub struct AnswerBundle {
    pub question: String,
    pub answer: String,
    pub tracks: Vec<ResolvedTrack>,
}

#[derive(Debug, Error)]
pub enum AnswerError {
    /// The chat backend failed its availability probe
    #[error("chat backend unavailable")]
    ServiceUnavailable,
    /// The chat call yielded no usable answer
    #[error("chat backend returned no answer")]
    NoResponse,
}

/// Drives a question end to end
pub struct AnswerService {
    chat: Arc<dyn ChatBackend>,
    resolver: TrackResolver,
    prompt: PromptBuilder,
}

impl AnswerService {
    pub fn new(chat: Arc<dyn ChatBackend>, resolver: TrackResolver) -> Self {
        Self {
            chat,
            resolver,
            prompt: PromptBuilder::new(),
        }
    }

    /// Shared resolver handle (for the search endpoint and cache stats)
    pub fn resolver(&self) -> &TrackResolver {
        &self.resolver
    }

    /// Probes the chat backend (for the health endpoints)
    pub async fn backend_available(&self) -> bool {
        self.chat.is_available().await
    }

    /// Answers a question with lyric lines and the tracks they come from.
    ///
    /// An empty answer is a valid outcome (no tracks); only a missing
    /// answer is an error.
    pub async fn answer(
        &self,
        question: &str,
        preferences: &Preferences,
    ) -> Result<AnswerBundle, AnswerError> {
        if !self.chat.is_available().await {
            return Err(AnswerError::ServiceUnavailable);
        }

        let system_prompt = self.prompt.build(
            preferences.music_count,
            preferences.language,
            &preferences.genres,
            &preferences.regions,
        );

        let answer = match self.chat.complete(&system_prompt, question).await {
            Ok(Some(answer)) => answer,
            Ok(None) => return Err(AnswerError::NoResponse),
            Err(e) => {
                error!("Chat completion failed: {}", e);
                return Err(AnswerError::NoResponse);
            }
        };

        info!("Chat answer:\n{}", answer);

        let candidates = parse_candidates(&answer);
        let tracks = self
            .resolver
            .resolve_batch(&candidates, preferences.music_count)
            .await;

        Ok(AnswerBundle {
            question: question.to_string(),
            answer,
            tracks,
        })
    }

    /// Resolves a single (artist, title) pair for the search endpoint
    pub async fn search_single(&self, artist: &str, title: &str) -> Option<ResolvedTrack> {
        self.resolver.resolve_one(artist, title).await
    }
}
