//! Core domain types for the songpress pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sentinel written for absent optional fields when a record crosses the
/// oracle boundary. Inside the type system absence is `Option::None`; the
/// literal only appears in serialized prompts so no field is dropped
/// silently.
pub const UNKNOWN: &str = "unknown";

// ---------------------------------------------------------------------------
// SourceRecord
// ---------------------------------------------------------------------------

/// One provider's extracted view of a song query.
///
/// `title` is always present (providers fall back to the query string).
/// Every other field is optional; a record is only produced at all when the
/// provider located the main lyrics text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Provider name (registration identifier, e.g. `genius`).
    pub source: String,
    /// Canonical URL of the page the record was extracted from.
    pub url: String,
    /// Song title. Falls back to the original query string.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arranger: Option<String>,
    /// Cover image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    /// Main content text (lyrics).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
}

impl SourceRecord {
    /// Create a record with only the mandatory fields set.
    pub fn new(source: impl Into<String>, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            url: url.into(),
            title: title.into(),
            artist: None,
            album: None,
            released: None,
            label: None,
            composer: None,
            arranger: None,
            cover_url: None,
            lyrics: None,
        }
    }
}

/// Ordered collection of successful provider records for one query.
///
/// Order follows provider registration priority. Empty is a valid,
/// terminal "not found" state.
pub type Aggregate = Vec<SourceRecord>;

// ---------------------------------------------------------------------------
// SongReport
// ---------------------------------------------------------------------------

/// The reconciled single record parsed back out of the oracle's report.
///
/// Same field set as [`SourceRecord`] but single-valued, with `lyrics`
/// required — a report without usable lyrics never leaves the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arranger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    /// Main content text. Required — the parser rejects reports without it.
    pub lyrics: String,
    /// Keys the parser recognized syntactically but does not map to a
    /// field, retained under their normalized names.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl SongReport {
    /// A report carrying only lyrics, everything else absent.
    pub fn with_lyrics(lyrics: impl Into<String>) -> Self {
        Self {
            artist: None,
            title: None,
            label: None,
            released: None,
            album: None,
            arranger: None,
            composer: None,
            cover_url: None,
            lyrics: lyrics.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Display title for the generated post: `Title — Artist` when both are
    /// known, bare title otherwise.
    pub fn post_title(&self) -> String {
        match (&self.title, &self.artist) {
            (Some(t), Some(a)) => format!("{t} — {a}"),
            (Some(t), None) => t.clone(),
            (None, Some(a)) => a.clone(),
            (None, None) => "Untitled".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Query helpers
// ---------------------------------------------------------------------------

/// Split an `Artist - Title` query into its halves.
///
/// Returns `(None, query)` when the query has no ` - ` separator.
pub fn split_artist_title(query: &str) -> (Option<&str>, &str) {
    match query.split_once(" - ") {
        Some((artist, title)) => (Some(artist.trim()), title.trim()),
        None => (None, query.trim()),
    }
}
