//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use songpress_core::{Delivery, Outcome, publish};
use songpress_oracle::OracleClient;
use songpress_providers::ProviderRegistry;
use songpress_shared::{
    AppConfig, PipelineConfig, SongpressError, init_config, load_config, validate_oracle_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// songpress — turn a song query into a publish-ready post.
#[derive(Parser)]
#[command(
    name = "songpress",
    version,
    about = "Aggregate song data, merge it with AI, and render an HTML post.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build a post for a song query (`Artist - Title` works best).
    Post {
        /// Song query; multiple words are joined with spaces.
        query: Vec<String>,

        /// Output directory for the post document (overrides config).
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "songpress=info",
        1 => "songpress=debug",
        _ => "songpress=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Post { query, out } => cmd_post(&query, out.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// post
// ---------------------------------------------------------------------------

async fn cmd_post(query_words: &[String], out: Option<&str>) -> Result<()> {
    let query = query_words.join(" ").trim().to_string();
    if query.is_empty() {
        return Err(eyre!("empty query: pass a song name, e.g. `songpress post Artist - Title`"));
    }

    // Validate the oracle key before doing anything
    let config = load_config()?;
    validate_oracle_key(&config)?;

    let mut pipeline = PipelineConfig::from(&config);
    if let Some(out) = out {
        pipeline.output_dir = out.to_string();
    }
    let output_dir = resolve_output_dir(&pipeline.output_dir)?;

    let registry = ProviderRegistry::from_config(&pipeline)?;
    let oracle = OracleClient::from_config(&pipeline)?;

    info!(query, providers = ?registry.names(), "building post");

    let start = std::time::Instant::now();
    let delivery = CliDelivery::new(output_dir);

    let outcome = publish(
        &query,
        &registry,
        &oracle,
        &delivery,
        Duration::from_secs(pipeline.provider_timeout_secs),
    )
    .await?;

    delivery.spinner.finish_and_clear();

    println!();
    match &outcome {
        Outcome::Published { document_name } => {
            println!("  Post document written: {}", delivery.output_dir.join(document_name).display());
        }
        Outcome::Fallback => {
            println!("  Delivered raw text (no document rendered).");
        }
        Outcome::NotFound | Outcome::MissingContent => {
            println!("  Nothing to publish for this query.");
        }
    }
    println!("  Time: {:.1}s", start.elapsed().as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI delivery sink
// ---------------------------------------------------------------------------

/// Delivery sink for terminal use: text goes to stdout, documents go to the
/// output directory. An indicatif spinner keeps the terminal alive while the
/// pipeline runs.
struct CliDelivery {
    spinner: ProgressBar,
    output_dir: PathBuf,
}

impl CliDelivery {
    fn new(output_dir: PathBuf) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner.set_message("Collecting song data");
        Self {
            spinner,
            output_dir,
        }
    }
}

impl Delivery for CliDelivery {
    fn deliver_text(&self, text: &str) -> songpress_shared::Result<()> {
        self.spinner.println(text);
        Ok(())
    }

    fn deliver_document(&self, name: &str, html: &str) -> songpress_shared::Result<()> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| SongpressError::io(&self.output_dir, e))?;

        let path = self.output_dir.join(name);
        std::fs::write(&path, html).map_err(|e| SongpressError::io(&path, e))?;

        self.spinner.println(format!("Wrote {}", path.display()));
        Ok(())
    }
}

/// Expand a leading `~/` against the user's home directory.
fn resolve_output_dir(raw: &str) -> Result<PathBuf> {
    if let Some(rest) = raw.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| eyre!("could not determine home directory"))?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(raw))
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
