//! Content providers and the aggregation fan-out.
//!
//! Each provider independently resolves a free-text song query into a
//! [`SourceRecord`]. Providers are best-effort: every network or extraction
//! failure is absorbed at the provider boundary and reported as an absent
//! result, never as an error that could destabilize the other providers.

pub mod extract;

mod genius;
mod lyricsovh;
mod websearch;

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use tracing::{debug, info, warn};

use songpress_shared::{Aggregate, PipelineConfig, Result, SongpressError, SourceRecord, optional_secret};

pub use genius::GeniusProvider;
pub use lyricsovh::LyricsOvhProvider;
pub use websearch::WebSearchProvider;

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("songpress/", env!("CARGO_PKG_VERSION"));

/// Maximum redirects followed on provider requests.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A single external content source capable of producing a candidate record
/// for a query.
///
/// `fetch` is the whole contract: `Some(record)` on success, `None` for any
/// soft miss (no search hit, lyrics container not found, transport error,
/// non-success status). Implementations must not let errors escape.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name for registration, records, and tracing.
    fn name(&self) -> &'static str;

    /// Resolve a query to a record, or absent.
    async fn fetch(&self, query: &str) -> Option<SourceRecord>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds registered providers in priority order. Registration order is the
/// order records appear in the aggregate.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create a registry from an explicit provider list (priority order).
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// Create the built-in registry from runtime config.
    ///
    /// Genius goes first when its token is available (structured API data
    /// beats scraped data), then the web search scraper, then the plain
    /// lyrics API.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let client = build_client(config.provider_timeout_secs)?;

        let mut providers: Vec<Box<dyn Provider>> = Vec::new();

        match optional_secret(&config.genius_token_env) {
            Some(token) => providers.push(Box::new(GeniusProvider::new(
                client.clone(),
                config.genius_api_base.clone(),
                token,
            ))),
            None => debug!(
                var = %config.genius_token_env,
                "genius token not set, provider disabled"
            ),
        }

        providers.push(Box::new(WebSearchProvider::new(
            client.clone(),
            config.search_base.clone(),
        )));
        providers.push(Box::new(LyricsOvhProvider::new(
            client,
            config.lyrics_api_base.clone(),
        )));

        Ok(Self { providers })
    }

    /// Registered provider names, in priority order.
    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Build the pooled HTTP client shared by all providers of one registry.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| SongpressError::Network(format!("failed to build HTTP client: {e}")))
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Query every registered provider concurrently and collect the successes
/// in registration order.
///
/// Each provider runs under its own deadline, so total wall time is bounded
/// by the slowest provider budget rather than the sum. The futures are
/// polled inside this one — dropping the returned future abandons all
/// in-flight provider calls.
pub async fn aggregate(
    registry: &ProviderRegistry,
    query: &str,
    per_request_timeout: Duration,
) -> Aggregate {
    // A provider makes at most two bounded requests (search + detail page).
    let fetch_budget = per_request_timeout * 2;

    let fetches = registry.providers.iter().map(|provider| async move {
        match tokio::time::timeout(fetch_budget, provider.fetch(query)).await {
            Ok(record) => record,
            Err(_) => {
                warn!(provider = provider.name(), "provider deadline exceeded");
                None
            }
        }
    });

    let records: Aggregate = join_all(fetches).await.into_iter().flatten().collect();

    info!(
        query,
        providers = registry.len(),
        records = records.len(),
        "aggregation complete"
    );

    records
}
