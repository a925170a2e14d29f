//! # lyrserver - HTTP surface of LyricBox
//!
//! Routes, request/response bodies, input validation, duplicate-request
//! suppression and the orchestration that turns one question into a lyric
//! answer with playable tracks.
//!
//! The [`api::create_router`] function assembles the whole surface from an
//! [`api::AppState`]; the binary crate wires the state together from
//! configuration.

pub mod answer;
pub mod api;
pub mod dedup;
pub mod dto;
pub mod error;
pub mod messages;
pub mod openapi;

pub use answer::{AnswerBundle, AnswerError, AnswerService, Preferences};
pub use api::{create_router, AppState};
pub use dedup::{DedupDecision, DedupStats, RequestDeduplicator};
pub use dto::{AnswerResponse, ApiResponse, MusicInfo, QuestionRequest, SearchSongRequest};
pub use error::ApiError;
