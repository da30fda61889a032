//! End-to-end `publish` pipeline: query → aggregate → merge → render → deliver.

use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};
use uuid::Uuid;

use songpress_oracle::{MergeOutcome, OracleClient, parse_report};
use songpress_post::assemble_fallback;
use songpress_providers::{ProviderRegistry, aggregate};
use songpress_shared::{Result, SongReport, SourceRecord};

/// Delivered when no provider produced any record for the query.
pub const NOT_FOUND_MESSAGE: &str =
    "Song not found. Check the spelling, or try the `Artist - Title` form.";

/// Delivered ahead of raw fallback text when the merge step was skipped.
pub const FALLBACK_NOTICE: &str =
    "The cleanup service was unavailable, so here is the collected text as-is:";

/// Delivered when providers responded but nothing publishable survived.
pub const MISSING_CONTENT_MESSAGE: &str =
    "Sources were found, but no usable lyrics came back. Try a more specific query.";

/// Destination for pipeline output.
///
/// The pipeline never touches the terminal or the filesystem itself; it
/// hands finished text and documents to whatever sink the caller wires in.
pub trait Delivery: Send + Sync {
    /// Deliver a short status or fallback message.
    fn deliver_text(&self, text: &str) -> Result<()>;

    /// Deliver the finished post document under the given file name.
    fn deliver_document(&self, name: &str, html: &str) -> Result<()>;
}

/// Terminal state of one `publish` run. Every variant means the user got a
/// message — only delivery failures surface as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Merged report rendered and delivered as a document.
    Published { document_name: String },
    /// Raw provider text delivered instead of a rendered document.
    Fallback,
    /// No provider produced a record.
    NotFound,
    /// Sources responded but nothing publishable survived processing:
    /// either the oracle's report lacked usable content, or an outage
    /// left no raw text to fall back on.
    MissingContent,
}

/// Run the full publish pipeline for one query.
///
/// 1. Aggregate: fan out to every registered provider
/// 2. Merge: one bounded oracle attempt, report re-parsed strictly
/// 3. Render & deliver, or fall back to raw provider text
///
/// The merge step never fails the run: an unavailable oracle routes to the
/// raw-text fallback, an unusable report ends as a content miss.
#[instrument(skip_all, fields(query))]
pub async fn publish(
    query: &str,
    registry: &ProviderRegistry,
    oracle: &OracleClient,
    delivery: &dyn Delivery,
    provider_timeout: Duration,
) -> Result<Outcome> {
    let start = Instant::now();
    let run_id = Uuid::now_v7();

    info!(%run_id, query, providers = registry.len(), "starting publish pipeline");

    // --- Phase 1: Aggregate ---
    let records = aggregate(registry, query, provider_timeout).await;

    if records.is_empty() {
        info!(%run_id, "no provider produced a record");
        delivery.deliver_text(NOT_FOUND_MESSAGE)?;
        return Ok(Outcome::NotFound);
    }

    // --- Phase 2: Merge, then render & deliver ---
    // Raw-text fallback is reserved for oracle outages. A report that came
    // back without usable content is a terminal miss, not a fallback case.
    let outcome = match oracle.merge(&records).await {
        MergeOutcome::Report(text) => match parse_report(&text) {
            Some(report) => deliver_document(&report, delivery)?,
            None => {
                warn!(%run_id, "oracle report failed the format contract");
                delivery.deliver_text(MISSING_CONTENT_MESSAGE)?;
                Outcome::MissingContent
            }
        },
        MergeOutcome::Unavailable => deliver_fallback(&records, delivery)?,
    };

    info!(
        %run_id,
        ?outcome,
        records = records.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "publish pipeline complete"
    );

    Ok(outcome)
}

fn deliver_document(report: &SongReport, delivery: &dyn Delivery) -> Result<Outcome> {
    let html = songpress_post::render(report);
    let name = songpress_post::document_name(report);

    delivery.deliver_text(&summary_message(report))?;
    delivery.deliver_document(&name, &html)?;

    Ok(Outcome::Published {
        document_name: name,
    })
}

fn deliver_fallback(records: &[SourceRecord], delivery: &dyn Delivery) -> Result<Outcome> {
    let text = assemble_fallback(records);

    if text.is_empty() {
        delivery.deliver_text(MISSING_CONTENT_MESSAGE)?;
        return Ok(Outcome::MissingContent);
    }

    delivery.deliver_text(FALLBACK_NOTICE)?;
    delivery.deliver_text(&text)?;
    Ok(Outcome::Fallback)
}

/// Short status line sent before the document itself.
fn summary_message(report: &SongReport) -> String {
    match report.released.as_deref() {
        Some(date) => format!("Post ready: {} (released {date})", report.post_title()),
        None => format!("Post ready: {}", report.post_title()),
    }
}
