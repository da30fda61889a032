//! Shared types, error model, and configuration for songpress.
//!
//! This crate is the foundation depended on by all other songpress crates.
//! It provides:
//! - [`SongpressError`] — the unified error type
//! - Domain types ([`SourceRecord`], [`Aggregate`], [`SongReport`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, OracleConfig, PipelineConfig, ProvidersConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, optional_secret,
    validate_oracle_key,
};
pub use error::{Result, SongpressError};
pub use types::{Aggregate, SongReport, SourceRecord, UNKNOWN, split_artist_title};
