//! Text-generation oracle client.
//!
//! The oracle is an external free-form text-generation service used to merge
//! and clean the aggregated provider records. Its response is untrusted
//! opaque text: we ask for a fixed line-oriented report format and re-parse
//! it with a strict contract ([`report::parse_report`]) rather than assuming
//! well-formed structured output.
//!
//! The wire schema is OpenAI-compatible chat completions; base URL and path
//! are configurable so a different deployment can be swapped in.

pub mod report;

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use songpress_shared::{
    PipelineConfig, Result, SongpressError, SourceRecord, UNKNOWN, optional_secret,
};

pub use report::{normalize_key, parse_report};

/// User-Agent string for oracle requests.
const USER_AGENT: &str = concat!("songpress/", env!("CARGO_PKG_VERSION"));

/// Per-record prompt budget for lyrics text, in characters.
const PROMPT_LYRICS_BUDGET: usize = 6_000;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Outcome of one merge attempt.
///
/// `Unavailable` is a recoverable condition (the caller falls back to raw
/// provider text), never an error. A single attempt is made per query; the
/// oracle is never retried automatically.
#[derive(Debug, Clone)]
pub enum MergeOutcome {
    /// The oracle responded; the payload is its raw report text.
    Report(String),
    /// Transport error, non-success status, or timeout.
    Unavailable,
}

// ---------------------------------------------------------------------------
// Wire types (OpenAI-compatible chat completions)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the merge oracle.
pub struct OracleClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OracleClient {
    /// Create a client against an explicit endpoint.
    pub fn new(
        base_url: &str,
        chat_path: &str,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SongpressError::Oracle(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), chat_path),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Create a client from runtime config, reading the API key from the
    /// configured environment variable.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let api_key = optional_secret(&config.oracle_api_key_env).ok_or_else(|| {
            SongpressError::config(format!(
                "oracle API key not found. Set the {} environment variable.",
                config.oracle_api_key_env
            ))
        })?;

        Self::new(
            &config.oracle_base_url,
            &config.oracle_chat_path,
            config.oracle_model.clone(),
            api_key,
            Duration::from_secs(config.oracle_timeout_secs),
        )
    }

    /// Ask the oracle to merge the aggregated records into one report.
    ///
    /// Single bounded attempt; every failure mode collapses to
    /// [`MergeOutcome::Unavailable`].
    #[instrument(skip_all, fields(records = records.len(), model = %self.model))]
    pub async fn merge(&self, records: &[SourceRecord]) -> MergeOutcome {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: merge_prompt(records),
            }],
            temperature: 0.3,
            max_tokens: 1200,
        };

        let response = match self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "oracle request failed");
                return MergeOutcome::Unavailable;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "oracle returned non-success status");
            return MergeOutcome::Unavailable;
        }

        let body: ChatResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "oracle response body unreadable");
                return MergeOutcome::Unavailable;
            }
        };

        match body.choices.into_iter().next() {
            Some(choice) if !choice.message.content.trim().is_empty() => {
                info!("oracle merge succeeded");
                MergeOutcome::Report(choice.message.content)
            }
            _ => {
                debug!("oracle response carried no usable choice");
                MergeOutcome::Unavailable
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt serialization
// ---------------------------------------------------------------------------

/// Serialize the aggregate into the merge prompt.
///
/// Every field of every record is written out; absent fields carry the
/// literal `unknown` sentinel so nothing is dropped silently at this
/// boundary. The oracle is asked for the fixed report format that
/// [`report::parse_report`] understands, with the lyrics on a single line.
pub fn merge_prompt(records: &[SourceRecord]) -> String {
    let mut prompt = String::from(
        "Below are partial descriptions of one song, collected from several \
         sources. Merge them into a single clean report.\n\
         Respond with exactly these lines and nothing else:\n\
         artist: <value>\n\
         song: <value>\n\
         label: <value>\n\
         release date: <value>\n\
         album: <value>\n\
         arranger: <value>\n\
         composer: <value>\n\
         cover: <image URL>\n\
         lyrics: <the full cleaned lyrics on this single line, with ' / ' \
         between sung lines>\n\
         Write 'unknown' for any value you cannot determine.\n",
    );

    for (i, record) in records.iter().enumerate() {
        prompt.push_str(&format!(
            "\nSource {} ({}) — {}\n",
            i + 1,
            record.source,
            record.url
        ));
        push_field(&mut prompt, "artist", record.artist.as_deref());
        push_field(&mut prompt, "song", Some(&record.title));
        push_field(&mut prompt, "label", record.label.as_deref());
        push_field(&mut prompt, "release date", record.released.as_deref());
        push_field(&mut prompt, "album", record.album.as_deref());
        push_field(&mut prompt, "arranger", record.arranger.as_deref());
        push_field(&mut prompt, "composer", record.composer.as_deref());
        push_field(&mut prompt, "cover", record.cover_url.as_deref());

        let lyrics = record.lyrics.as_deref().unwrap_or(UNKNOWN);
        let lyrics: String = lyrics.chars().take(PROMPT_LYRICS_BUDGET).collect();
        prompt.push_str(&format!("lyrics: {}\n", lyrics.replace('\n', " / ")));
    }

    prompt
}

fn push_field(prompt: &mut String, key: &str, value: Option<&str>) {
    let value = value.filter(|v| !v.trim().is_empty()).unwrap_or(UNKNOWN);
    prompt.push_str(&format!("{key}: {value}\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_records() -> Vec<SourceRecord> {
        let mut rec = SourceRecord::new("genius", "https://genius.test/x", "My Mystery");
        rec.artist = Some("Isyana Sarasvati".into());
        rec.lyrics = Some("Every night I wonder\nWhy the stars align".into());
        vec![rec]
    }

    fn client(server: &MockServer) -> OracleClient {
        OracleClient::new(
            &server.uri(),
            "/chat/completions",
            "test-model",
            "test-key",
            Duration::from_millis(500),
        )
        .unwrap()
    }

    #[test]
    fn prompt_writes_unknown_for_absent_fields() {
        let prompt = merge_prompt(&sample_records());
        assert!(prompt.contains("artist: Isyana Sarasvati"));
        assert!(prompt.contains("label: unknown"));
        assert!(prompt.contains("composer: unknown"));
        // Multi-line lyrics are flattened onto one report line
        assert!(prompt.contains("lyrics: Every night I wonder / Why the stars align"));
    }

    #[test]
    fn prompt_numbers_sources_in_order() {
        let mut second = SourceRecord::new("websearch", "https://w.test/x", "My Mystery");
        second.lyrics = Some("la".into());
        let mut records = sample_records();
        records.push(second);

        let prompt = merge_prompt(&records);
        let first = prompt.find("Source 1 (genius)").unwrap();
        let second = prompt.find("Source 2 (websearch)").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn merge_returns_report_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant",
                    "content": "artist: Isyana Sarasvati\nlyrics: la la la"}}]
            })))
            .mount(&server)
            .await;

        match client(&server).merge(&sample_records()).await {
            MergeOutcome::Report(text) => assert!(text.contains("artist: Isyana Sarasvati")),
            MergeOutcome::Unavailable => panic!("expected Report"),
        }
    }

    #[tokio::test]
    async fn merge_unavailable_on_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(matches!(
            client(&server).merge(&sample_records()).await,
            MergeOutcome::Unavailable
        ));
    }

    #[tokio::test]
    async fn merge_unavailable_on_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"choices": []}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        // Client timeout is 500ms — the delayed response must collapse to
        // Unavailable, not hang or error out.
        assert!(matches!(
            client(&server).merge(&sample_records()).await,
            MergeOutcome::Unavailable
        ));
    }

    #[tokio::test]
    async fn merge_unavailable_on_empty_choices() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        assert!(matches!(
            client(&server).merge(&sample_records()).await,
            MergeOutcome::Unavailable
        ));
    }
}
