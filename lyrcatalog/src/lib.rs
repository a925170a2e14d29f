//! # lyrcatalog - music catalog enrichment for LyricBox
//!
//! Takes the raw lyric-formatted answer produced by the chat backend and
//! turns it into playable tracks:
//!
//! - [`parse::parse_candidates`] extracts (artist, title) pairs from the
//!   `歌词--歌手《歌名》` line grammar.
//! - [`NeteaseClient`] queries the public catalog for track identifiers and
//!   playable URLs, behind the [`CatalogApi`] capability trait.
//! - [`TrackResolver`] drives the two lookups per candidate with
//!   per-candidate failure isolation, memoized through [`CatalogCache`].

pub mod cache;
pub mod client;
pub mod error;
pub mod models;
pub mod parse;
pub mod resolver;

pub use cache::{CacheSettings, CatalogCache, CatalogCacheStats};
pub use client::{CatalogApi, NeteaseClient, NeteaseClientBuilder};
pub use error::{CatalogError, Result};
pub use models::{ResolvedTrack, TrackCandidate};
pub use parse::parse_candidates;
pub use resolver::TrackResolver;
