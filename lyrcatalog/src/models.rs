//! Data models for answer parsing and track resolution

use serde::{Deserialize, Deserializer, Serialize};

/// An (artist, title) pair parsed from one line of model output.
///
/// Ephemeral: lives only within one orchestration call, not yet verified to
/// exist in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCandidate {
    pub artist: String,
    pub title: String,
}

impl TrackCandidate {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

/// A candidate successfully matched to a catalog identifier and a playable URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTrack {
    pub artist: String,
    pub title: String,
    pub track_id: String,
    pub play_url: String,
}

/// Deserializes a catalog identifier that may arrive as a number or a string
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        Number(i64),
        String(String),
    }

    match IdValue::deserialize(deserializer)? {
        IdValue::Number(n) => Ok(n.to_string()),
        IdValue::String(s) => Ok(s),
    }
}
