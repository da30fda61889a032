//! Genius provider: structured search API, then a detail-page scrape.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use songpress_shared::{Result, SongpressError, SourceRecord, split_artist_title};

use crate::{Provider, extract};

/// Lyrics container selectors on Genius song pages, tried in order.
const LYRICS_SELECTORS: &[&str] = &[r#"div[data-lyrics-container="true"]"#, ".lyrics"];

/// Provider backed by the Genius search API plus a song-page scrape.
pub struct GeniusProvider {
    client: Client,
    api_base: String,
    token: String,
}

// ---------------------------------------------------------------------------
// Search API response shapes (only the fields we read)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    result: HitResult,
}

#[derive(Debug, Deserialize)]
struct HitResult {
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    primary_artist: Option<HitArtist>,
    #[serde(default)]
    song_art_image_thumbnail_url: Option<String>,
    #[serde(default)]
    header_image_thumbnail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HitArtist {
    name: String,
}

impl GeniusProvider {
    pub fn new(client: Client, api_base: String, token: String) -> Self {
        Self {
            client,
            api_base,
            token,
        }
    }

    /// Search the Genius API for the top hit.
    async fn search(&self, query: &str) -> Result<Option<HitResult>> {
        let url = format!("{}/search", self.api_base);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| SongpressError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SongpressError::Network(format!("{url}: HTTP {status}")));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SongpressError::Network(format!("{url}: invalid search body: {e}")))?;

        Ok(body.response.hits.into_iter().next().map(|h| h.result))
    }

    /// Full fetch: search, scrape the hit page, assemble a record.
    async fn fetch_record(&self, query: &str) -> Result<Option<SourceRecord>> {
        let Some(hit) = self.search(query).await? else {
            debug!(query, "no genius search hits");
            return Ok(None);
        };

        let page = fetch_html(&self.client, &hit.url).await?;

        // No lyrics container means the whole record is absent.
        let Some(lyrics) = extract::first_match_text(&page, LYRICS_SELECTORS) else {
            debug!(url = %hit.url, "lyrics container not found on genius page");
            return Ok(None);
        };

        let (query_artist, query_title) = split_artist_title(query);

        let mut record = SourceRecord::new(
            "genius",
            hit.url.clone(),
            hit.title.unwrap_or_else(|| query_title.to_string()),
        );
        record.artist = hit
            .primary_artist
            .map(|a| a.name)
            .or_else(|| query_artist.map(str::to_string));
        record.cover_url = hit
            .song_art_image_thumbnail_url
            .or(hit.header_image_thumbnail_url)
            .filter(|u| !u.is_empty());
        record.released = extract::meta_content(&page, "music:release_date");
        record.album = extract::meta_content(&page, "music:album");
        record.lyrics = Some(lyrics);

        Ok(Some(record))
    }
}

#[async_trait]
impl Provider for GeniusProvider {
    fn name(&self) -> &'static str {
        "genius"
    }

    async fn fetch(&self, query: &str) -> Option<SourceRecord> {
        match self.fetch_record(query).await {
            Ok(record) => record,
            Err(e) => {
                warn!(provider = "genius", error = %e, "provider fetch failed");
                None
            }
        }
    }
}

/// GET a page and return its body on 2xx.
pub(crate) async fn fetch_html(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SongpressError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SongpressError::Network(format!("{url}: HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| SongpressError::Network(format!("{url}: body read failed: {e}")))
}
