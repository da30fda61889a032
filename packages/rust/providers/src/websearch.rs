//! Web search provider: HTML search results, then a scrape of the top hit.
//!
//! No API token required — this is the always-available fallback source.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use songpress_shared::{Result, SourceRecord, split_artist_title};

use crate::genius::fetch_html;
use crate::{Provider, extract};

/// First organic result link in the HTML results page.
const RESULT_LINK_SELECTOR: &str = "a.result__a";

/// Lyrics container selectors on arbitrary lyrics pages, tried in order.
const LYRICS_SELECTORS: &[&str] = &[
    ".lyrics",
    r#"[class*="Lyrics__Container"]"#,
    r#"[class*="lyric"]"#,
    "pre",
];

/// Provider that searches the web and scrapes the top result page.
pub struct WebSearchProvider {
    client: Client,
    search_base: String,
}

impl WebSearchProvider {
    pub fn new(client: Client, search_base: String) -> Self {
        Self {
            client,
            search_base,
        }
    }

    /// Run the HTML search and return the top result URL.
    async fn search(&self, query: &str) -> Result<Option<String>> {
        let url = format!("{}/html/", self.search_base);
        let results = self
            .client
            .get(&url)
            .query(&[("q", format!("{query} lyrics"))])
            .send()
            .await
            .map_err(|e| songpress_shared::SongpressError::Network(format!("{url}: {e}")))?;

        let status = results.status();
        if !status.is_success() {
            return Err(songpress_shared::SongpressError::Network(format!(
                "{url}: HTTP {status}"
            )));
        }

        let body = results.text().await.map_err(|e| {
            songpress_shared::SongpressError::Network(format!("{url}: body read failed: {e}"))
        })?;

        Ok(extract::first_href(&body, RESULT_LINK_SELECTOR))
    }

    async fn fetch_record(&self, query: &str) -> Result<Option<SourceRecord>> {
        let Some(target) = self.search(query).await? else {
            debug!(query, "no usable search result link");
            return Ok(None);
        };

        let page = fetch_html(&self.client, &target).await?;

        let Some(lyrics) = extract::first_match_text(&page, LYRICS_SELECTORS) else {
            debug!(url = %target, "no lyrics container on result page");
            return Ok(None);
        };

        let (query_artist, query_title) = split_artist_title(query);

        let title = extract::meta_content(&page, "og:title")
            .unwrap_or_else(|| query_title.to_string());

        let mut record = SourceRecord::new("websearch", target, title);
        record.artist = query_artist.map(str::to_string);
        record.cover_url = extract::meta_content(&page, "og:image");
        record.released = extract::meta_content(&page, "music:release_date")
            .or_else(|| extract::meta_content(&page, "release_date"));
        record.lyrics = Some(lyrics);

        Ok(Some(record))
    }
}

#[async_trait]
impl Provider for WebSearchProvider {
    fn name(&self) -> &'static str {
        "websearch"
    }

    async fn fetch(&self, query: &str) -> Option<SourceRecord> {
        match self.fetch_record(query).await {
            Ok(record) => record,
            Err(e) => {
                warn!(provider = "websearch", error = %e, "provider fetch failed");
                None
            }
        }
    }
}
