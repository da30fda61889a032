//! Plain lyrics JSON API provider (lyrics.ovh-compatible).
//!
//! Keyed by `artist/title`, so it only activates for queries shaped as
//! `Artist - Title`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use songpress_shared::{Result, SongpressError, SourceRecord, split_artist_title};

use crate::Provider;

/// Provider backed by a `GET {base}/{artist}/{title}` lyrics API.
pub struct LyricsOvhProvider {
    client: Client,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct LyricsResponse {
    #[serde(default)]
    lyrics: String,
}

impl LyricsOvhProvider {
    pub fn new(client: Client, api_base: String) -> Self {
        Self { client, api_base }
    }

    async fn fetch_record(&self, query: &str) -> Result<Option<SourceRecord>> {
        let (Some(artist), title) = split_artist_title(query) else {
            debug!(query, "query has no artist part, lyrics API skipped");
            return Ok(None);
        };

        let mut url = url::Url::parse(&self.api_base)
            .map_err(|e| SongpressError::Network(format!("{}: {e}", self.api_base)))?;
        url.path_segments_mut()
            .map_err(|_| SongpressError::Network(format!("{}: not a base URL", self.api_base)))?
            .pop_if_empty()
            .push(artist)
            .push(title);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SongpressError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            // 404 here just means the song is not in the catalog.
            debug!(%url, %status, "lyrics API returned non-success");
            return Ok(None);
        }

        let body: LyricsResponse = response
            .json()
            .await
            .map_err(|e| SongpressError::Network(format!("{url}: invalid body: {e}")))?;

        let lyrics = body.lyrics.trim();
        if lyrics.is_empty() {
            return Ok(None);
        }

        let mut record = SourceRecord::new("lyricsovh", url, title);
        record.artist = Some(artist.to_string());
        record.lyrics = Some(lyrics.to_string());

        Ok(Some(record))
    }
}

#[async_trait]
impl Provider for LyricsOvhProvider {
    fn name(&self) -> &'static str {
        "lyricsovh"
    }

    async fn fetch(&self, query: &str) -> Option<SourceRecord> {
        match self.fetch_record(query).await {
            Ok(record) => record,
            Err(e) => {
                warn!(provider = "lyricsovh", error = %e, "provider fetch failed");
                None
            }
        }
    }
}
