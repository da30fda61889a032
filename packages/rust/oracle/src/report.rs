//! Line-oriented parser for the oracle's merge report.
//!
//! The contract is strict: a line with a `:` separator is a `key: value`
//! pair, split at the first separator; every other line is ignored. Keys
//! are case- and whitespace-normalized before lookup so the oracle's
//! formatting quirks cannot lose fields. The only required field is the
//! lyrics line — a report without it is invalid.

use std::collections::BTreeMap;

use songpress_shared::{SongReport, UNKNOWN};

/// Normalize a report key: lowercase, `_` to space, internal whitespace
/// collapsed, trimmed.
pub fn normalize_key(raw: &str) -> String {
    raw.to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the oracle's report text into a [`SongReport`].
///
/// Returns `None` when the lyrics field is absent or empty — the single
/// required-field check. Every other missing field simply stays absent.
pub fn parse_report(text: &str) -> Option<SongReport> {
    let mut fields: BTreeMap<String, String> = BTreeMap::new();

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let key = normalize_key(key);
        if key.is_empty() {
            continue;
        }

        fields.insert(key, value.trim().to_string());
    }

    let lyrics = take_field(&mut fields, &["lyrics", "content"])?;

    let mut report = SongReport::with_lyrics(lyrics);
    report.artist = take_field(&mut fields, &["artist"]);
    report.title = take_field(&mut fields, &["song", "title"]);
    report.label = take_field(&mut fields, &["label"]);
    report.released = take_field(&mut fields, &["release date", "released", "release"]);
    report.album = take_field(&mut fields, &["album", "album/single", "single"]);
    report.arranger = take_field(&mut fields, &["arranger"]);
    report.composer = take_field(&mut fields, &["composer"]);
    report.cover_url = take_field(&mut fields, &["cover", "cover image", "cover url", "image"]);
    report.extra = fields;

    Some(report)
}

/// Remove all aliases of a field from the parsed map and return the first
/// usable value. The literal `unknown` sentinel counts as absent.
fn take_field(fields: &mut BTreeMap<String, String>, aliases: &[&str]) -> Option<String> {
    let mut found: Option<String> = None;

    for alias in aliases {
        if let Some(value) = fields.remove(*alias) {
            let trimmed = value.trim();
            if found.is_none() && !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(UNKNOWN) {
                found = Some(trimmed.to_string());
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_REPORT: &str = "\
artist: Isyana Sarasvati
song: My Mystery
label: Sony Music Indonesia
release date: 2016-02-19
album: Explore!
arranger: Isyana Sarasvati
composer: Isyana Sarasvati
cover: https://img.genius.test/cover.jpg
lyrics: Every night I wonder / Why the stars align";

    #[test]
    fn parses_full_report() {
        let report = parse_report(FULL_REPORT).expect("valid report");
        assert_eq!(report.artist.as_deref(), Some("Isyana Sarasvati"));
        assert_eq!(report.title.as_deref(), Some("My Mystery"));
        assert_eq!(report.label.as_deref(), Some("Sony Music Indonesia"));
        assert_eq!(report.released.as_deref(), Some("2016-02-19"));
        assert_eq!(report.album.as_deref(), Some("Explore!"));
        assert_eq!(report.arranger.as_deref(), Some("Isyana Sarasvati"));
        assert_eq!(report.composer.as_deref(), Some("Isyana Sarasvati"));
        assert_eq!(
            report.cover_url.as_deref(),
            Some("https://img.genius.test/cover.jpg")
        );
        assert_eq!(report.lyrics, "Every night I wonder / Why the stars align");
        assert!(report.extra.is_empty());
    }

    #[test]
    fn key_normalization_variants_populate_same_field() {
        for line in [
            "Release Date: 2016-02-19",
            "release_date: 2016-02-19",
            "  RELEASE DATE : 2016-02-19",
        ] {
            let text = format!("{line}\nlyrics: la");
            let report = parse_report(&text).expect("valid");
            assert_eq!(report.released.as_deref(), Some("2016-02-19"), "line: {line}");
        }
    }

    #[test]
    fn normalize_key_collapses_spacing_and_case() {
        assert_eq!(normalize_key("Release Date"), "release date");
        assert_eq!(normalize_key("release_date"), "release date");
        assert_eq!(normalize_key("  RELEASE   DATE "), "release date");
    }

    #[test]
    fn invalid_without_lyrics() {
        assert!(parse_report("artist: A\nsong: B").is_none());
    }

    #[test]
    fn invalid_with_empty_lyrics() {
        assert!(parse_report("artist: A\nlyrics:   ").is_none());
    }

    #[test]
    fn invalid_with_unknown_lyrics_sentinel() {
        assert!(parse_report("artist: A\nlyrics: unknown").is_none());
    }

    #[test]
    fn separatorless_lines_are_ignored() {
        let text = "here is your report\nartist: A\njust some chatter\nlyrics: la";
        let report = parse_report(text).expect("valid");
        assert_eq!(report.artist.as_deref(), Some("A"));
        assert_eq!(report.lyrics, "la");
        assert!(report.extra.is_empty());
    }

    #[test]
    fn unknown_keys_are_retained_under_normalized_names() {
        let text = "Fun_Fact: recorded in one take\nlyrics: la";
        let report = parse_report(text).expect("valid");
        assert_eq!(
            report.extra.get("fun fact").map(String::as_str),
            Some("recorded in one take")
        );
    }

    #[test]
    fn unknown_sentinel_values_stay_absent() {
        let text = "artist: unknown\nlabel: Unknown\nlyrics: la";
        let report = parse_report(text).expect("valid");
        assert!(report.artist.is_none());
        assert!(report.label.is_none());
    }

    #[test]
    fn value_keeps_text_after_first_separator() {
        let text = "song: Mystery: The Sequel\nlyrics: la";
        let report = parse_report(text).expect("valid");
        assert_eq!(report.title.as_deref(), Some("Mystery: The Sequel"));
    }

    #[test]
    fn parse_is_idempotent() {
        let first = parse_report(FULL_REPORT).expect("valid");
        let second = parse_report(FULL_REPORT).expect("valid");
        assert_eq!(first, second);
    }

    #[test]
    fn later_duplicate_key_wins() {
        let text = "artist: A\nartist: B\nlyrics: la";
        let report = parse_report(text).expect("valid");
        assert_eq!(report.artist.as_deref(), Some("B"));
    }
}
