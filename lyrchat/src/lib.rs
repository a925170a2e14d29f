//! # lyrchat - language-model backend for LyricBox
//!
//! This crate talks to an OpenAI-compatible chat-completion backend and
//! builds the localized system prompt that demands lyric-formatted answers.
//!
//! - [`PromptBuilder`] renders the system prompt for a requested number of
//!   lyric lines, language, and genre/region preferences.
//! - [`ChatBackend`] is the capability trait, [`ChatClient`] its production
//!   implementation (reqwest, bounded timeout, optional proxy).

pub mod client;
pub mod error;
pub mod models;
pub mod prompt;

pub use client::{ChatBackend, ChatClient, ChatClientBuilder};
pub use error::{ChatError, Result};
pub use models::{ChatMessage, ChatRequest, ChatResponse};
pub use prompt::{Language, PromptBuilder};
