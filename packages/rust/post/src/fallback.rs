//! Raw-text fallback assembly.
//!
//! When the merge oracle is unavailable or its report is unusable, the
//! pipeline publishes the raw provider lyrics instead of failing the run.

use songpress_shared::SourceRecord;
use tracing::debug;

/// Character limit for the assembled fallback text.
pub const FALLBACK_LIMIT: usize = 4_000;

/// Appended after the limit when the assembled text was cut.
pub const TRUNCATION_MARKER: &str = "\n[... truncated]";

/// Separator line between lyrics blocks from different sources.
const SEPARATOR: &str = "\n---\n";

/// Concatenate the raw lyrics of every record that has any, in aggregate
/// order, separated by a `---` line.
///
/// Output longer than [`FALLBACK_LIMIT`] characters is cut at the limit and
/// [`TRUNCATION_MARKER`] is appended after it, so the marker itself is never
/// counted against the limit.
pub fn assemble_fallback(records: &[SourceRecord]) -> String {
    let combined = records
        .iter()
        .filter_map(|r| r.lyrics.as_deref())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR);

    if combined.chars().count() <= FALLBACK_LIMIT {
        return combined;
    }

    debug!(limit = FALLBACK_LIMIT, "fallback text truncated");
    let mut cut: String = combined.chars().take(FALLBACK_LIMIT).collect();
    cut.push_str(TRUNCATION_MARKER);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_lyrics(source: &str, lyrics: Option<&str>) -> SourceRecord {
        let mut record = SourceRecord::new(source, format!("https://{source}.test/x"), "T");
        record.lyrics = lyrics.map(str::to_string);
        record
    }

    #[test]
    fn joins_lyrics_in_aggregate_order() {
        let records = vec![
            record_with_lyrics("genius", Some("first block")),
            record_with_lyrics("websearch", None),
            record_with_lyrics("lyricsovh", Some("second block")),
        ];
        assert_eq!(
            assemble_fallback(&records),
            "first block\n---\nsecond block"
        );
    }

    #[test]
    fn empty_when_no_record_has_lyrics() {
        let records = vec![
            record_with_lyrics("genius", None),
            record_with_lyrics("websearch", Some("   ")),
        ];
        assert_eq!(assemble_fallback(&records), "");
    }

    #[test]
    fn exactly_at_limit_is_untouched() {
        let records = vec![record_with_lyrics("genius", Some(&"x".repeat(FALLBACK_LIMIT)))];
        let text = assemble_fallback(&records);
        assert_eq!(text.chars().count(), FALLBACK_LIMIT);
        assert!(!text.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn one_past_limit_is_cut_and_marked() {
        let records =
            vec![record_with_lyrics("genius", Some(&"x".repeat(FALLBACK_LIMIT + 1)))];
        let text = assemble_fallback(&records);
        assert_eq!(
            text.chars().count(),
            FALLBACK_LIMIT + TRUNCATION_MARKER.chars().count()
        );
        assert!(text.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn limit_is_measured_in_chars_not_bytes() {
        // Multi-byte chars: é is 2 bytes in UTF-8
        let records = vec![record_with_lyrics("genius", Some(&"é".repeat(FALLBACK_LIMIT)))];
        let text = assemble_fallback(&records);
        assert!(!text.contains(TRUNCATION_MARKER));
    }
}
