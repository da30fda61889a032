//! Application configuration for songpress.
//!
//! User config lives at `~/.songpress/songpress.toml`.
//! CLI flags override config file values, which override defaults.
//! Secrets are never stored in the file — the config only names the
//! environment variables that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SongpressError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "songpress.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".songpress";

// ---------------------------------------------------------------------------
// Config structs (matching songpress.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Text-generation oracle settings.
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Content provider settings.
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory where generated post documents are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Per-provider request timeout in seconds.
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            provider_timeout_secs: default_provider_timeout(),
        }
    }
}

fn default_output_dir() -> String {
    "~/songpress-posts".into()
}
fn default_provider_timeout() -> u64 {
    8
}

/// `[oracle]` section — the external text-generation service used to merge
/// and clean aggregated records.
///
/// The wire schema is OpenAI-compatible chat completions; both the base URL
/// and the request path are configurable so a different deployment can be
/// swapped in without code changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_oracle_key_env")]
    pub api_key_env: String,

    /// Base URL of the oracle API.
    #[serde(default = "default_oracle_base_url")]
    pub base_url: String,

    /// Request path appended to the base URL.
    #[serde(default = "default_oracle_chat_path")]
    pub chat_path: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_oracle_model")]
    pub model: String,

    /// Request timeout in seconds. A timed-out merge is recoverable — the
    /// pipeline falls back to raw provider text.
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_oracle_key_env(),
            base_url: default_oracle_base_url(),
            chat_path: default_oracle_chat_path(),
            model: default_oracle_model(),
            timeout_secs: default_oracle_timeout(),
        }
    }
}

fn default_oracle_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_oracle_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_oracle_chat_path() -> String {
    "/chat/completions".into()
}
fn default_oracle_model() -> String {
    "llama-3.1-8b-instant".into()
}
fn default_oracle_timeout() -> u64 {
    20
}

/// `[providers]` section — endpoint targets for the content providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Genius structured search API base.
    #[serde(default = "default_genius_api_base")]
    pub genius_api_base: String,

    /// Name of the env var holding the Genius API token (optional provider —
    /// it is skipped when the var is unset).
    #[serde(default = "default_genius_token_env")]
    pub genius_token_env: String,

    /// HTML search endpoint base for the search-then-scrape provider.
    #[serde(default = "default_search_base")]
    pub search_base: String,

    /// Plain lyrics JSON API base.
    #[serde(default = "default_lyrics_api_base")]
    pub lyrics_api_base: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            genius_api_base: default_genius_api_base(),
            genius_token_env: default_genius_token_env(),
            search_base: default_search_base(),
            lyrics_api_base: default_lyrics_api_base(),
        }
    }
}

fn default_genius_api_base() -> String {
    "https://api.genius.com".into()
}
fn default_genius_token_env() -> String {
    "GENIUS_TOKEN".into()
}
fn default_search_base() -> String {
    "https://html.duckduckgo.com".into()
}
fn default_lyrics_api_base() -> String {
    "https://api.lyrics.ovh/v1".into()
}

// ---------------------------------------------------------------------------
// Pipeline config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Per-provider request timeout in seconds.
    pub provider_timeout_secs: u64,
    /// Genius API base URL.
    pub genius_api_base: String,
    /// Env var holding the Genius token.
    pub genius_token_env: String,
    /// HTML search endpoint base.
    pub search_base: String,
    /// Lyrics JSON API base.
    pub lyrics_api_base: String,
    /// Oracle base URL.
    pub oracle_base_url: String,
    /// Oracle request path.
    pub oracle_chat_path: String,
    /// Oracle model identifier.
    pub oracle_model: String,
    /// Env var holding the oracle API key.
    pub oracle_api_key_env: String,
    /// Oracle request timeout in seconds.
    pub oracle_timeout_secs: u64,
    /// Output directory for generated documents.
    pub output_dir: String,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            provider_timeout_secs: config.defaults.provider_timeout_secs,
            genius_api_base: config.providers.genius_api_base.clone(),
            genius_token_env: config.providers.genius_token_env.clone(),
            search_base: config.providers.search_base.clone(),
            lyrics_api_base: config.providers.lyrics_api_base.clone(),
            oracle_base_url: config.oracle.base_url.clone(),
            oracle_chat_path: config.oracle.chat_path.clone(),
            oracle_model: config.oracle.model.clone(),
            oracle_api_key_env: config.oracle.api_key_env.clone(),
            oracle_timeout_secs: config.oracle.timeout_secs,
            output_dir: config.defaults.output_dir.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.songpress/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SongpressError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.songpress/songpress.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SongpressError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SongpressError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SongpressError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SongpressError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SongpressError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the oracle API key env var is set and non-empty.
pub fn validate_oracle_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.oracle.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(SongpressError::config(format!(
            "oracle API key not found. Set the {var_name} environment variable."
        ))),
    }
}

/// Read an optional secret from the environment by the configured var name.
/// Empty values count as unset.
pub fn optional_secret(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.is_empty())
}
