//! Post document rendering.
//!
//! Pure, deterministic string substitution against a fixed HTML template.
//! Every field slot resolves to either the report's value or a fixed
//! default — no placeholder ever survives into the output, no network or
//! file access happens here.

pub mod fallback;

use std::sync::LazyLock;

use regex::Regex;
use songpress_shared::SongReport;

pub use fallback::{FALLBACK_LIMIT, TRUNCATION_MARKER, assemble_fallback};

/// Default for absent informational table values.
const TABLE_DEFAULT: &str = "-";

/// Fixed placeholder shown when no cover image was found.
const DEFAULT_COVER_URL: &str = "https://placehold.co/600x600?text=No+Cover";

/// Fixed token for an unknown release date.
const UNKNOWN_DATE: &str = "DD/MM/YYYY";

/// The compact informational-card template. Section order is fixed for
/// downstream publishing consumers: informational table, centered cover
/// block, preformatted lyrics block.
const TEMPLATE: &str = r#"<h2 style="text-align: center; font-size: 28px; margin-bottom: 15px;">
  {post_title}
</h2>
<h3>Song Information</h3>
<div class="table" style="overflow-x:auto;">
  <table style="width: 100%; border-collapse: collapse; font-size: 15px;">
    <tbody>
      <tr><td>Artist</td><td>{artist}</td></tr>
      <tr><td>Song</td><td>{song}</td></tr>
      <tr><td>Label</td><td>{label}</td></tr>
      <tr><td>Release Date</td><td>{release_date}</td></tr>
      <tr><td>Album / Single</td><td>{album}</td></tr>
      <tr><td>Arranger</td><td>{arranger}</td></tr>
      <tr><td>Composer</td><td>{composer}</td></tr>
    </tbody>
  </table>
</div>
<h3>Cover</h3>
<div style="text-align: center; margin: 20px 0;">
  <img src="{cover_url}" alt="{post_title}" style="max-width: 100%; border-radius: 12px;">
</div>
<h3>Lyrics</h3>
<pre style="background: #f4f4f4; padding: 15px; border-radius: 8px; font-size: 14px; white-space: pre-wrap; word-wrap: break-word;">
{lyrics}
</pre>
"#;

/// Render a report into the publish-ready HTML document.
pub fn render(report: &SongReport) -> String {
    let mut html = TEMPLATE.to_string();
    for (token, value) in slot_values(report) {
        html = html.replace(token, &value);
    }
    html
}

/// The declarative field-to-slot mapping. Swapping the template shape only
/// means touching this table and [`TEMPLATE`], never the upstream pipeline.
fn slot_values(report: &SongReport) -> Vec<(&'static str, String)> {
    vec![
        ("{post_title}", escape(&report.post_title())),
        ("{artist}", table_value(report.artist.as_deref())),
        ("{song}", table_value(report.title.as_deref())),
        ("{label}", table_value(report.label.as_deref())),
        (
            "{release_date}",
            match report.released.as_deref() {
                Some(d) => escape(d),
                None => UNKNOWN_DATE.to_string(),
            },
        ),
        ("{album}", table_value(report.album.as_deref())),
        ("{arranger}", table_value(report.arranger.as_deref())),
        ("{composer}", table_value(report.composer.as_deref())),
        (
            "{cover_url}",
            match report.cover_url.as_deref() {
                Some(u) => escape(u),
                None => DEFAULT_COVER_URL.to_string(),
            },
        ),
        // The oracle report carries lyrics on one line with ` / ` between
        // sung lines; expand them back for the whitespace-preserving block.
        ("{lyrics}", escape(&report.lyrics.replace(" / ", "\n"))),
    ]
}

fn table_value(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => escape(v.trim()),
        _ => TABLE_DEFAULT.to_string(),
    }
}

/// Minimal HTML escaping for substituted values.
fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Derive a filesystem-safe document file name from the report.
pub fn document_name(report: &SongReport) -> String {
    // Anything outside word chars, dash, dot, and space becomes '_'.
    static SANITIZE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\w\-. ]").expect("valid regex"));

    let title = report.post_title();
    let base = SANITIZE_RE.replace_all(&title, "_");
    let base: String = base.chars().take(120).collect();
    format!("{}.html", base.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every slot token that must be resolved by `render`.
    const TOKENS: &[&str] = &[
        "{post_title}",
        "{artist}",
        "{song}",
        "{label}",
        "{release_date}",
        "{album}",
        "{arranger}",
        "{composer}",
        "{cover_url}",
        "{lyrics}",
    ];

    fn full_report() -> SongReport {
        let mut report = SongReport::with_lyrics("Every night I wonder / Why the stars align");
        report.artist = Some("Isyana Sarasvati".into());
        report.title = Some("My Mystery".into());
        report.label = Some("Sony Music Indonesia".into());
        report.released = Some("2016-02-19".into());
        report.album = Some("Explore!".into());
        report.arranger = Some("Isyana Sarasvati".into());
        report.composer = Some("Isyana Sarasvati".into());
        report.cover_url = Some("https://img.genius.test/cover.jpg".into());
        report
    }

    #[test]
    fn render_resolves_every_slot() {
        for report in [full_report(), SongReport::with_lyrics("la")] {
            let html = render(&report);
            for token in TOKENS {
                assert!(!html.contains(token), "unresolved slot {token}");
            }
        }
    }

    #[test]
    fn render_full_report_has_no_defaults() {
        let html = render(&full_report());
        assert!(!html.contains("<td>-</td>"));
        assert!(html.contains("https://img.genius.test/cover.jpg"));
        assert!(!html.contains(DEFAULT_COVER_URL));
        assert!(!html.contains(UNKNOWN_DATE));
    }

    #[test]
    fn render_bare_report_uses_fixed_defaults() {
        let html = render(&SongReport::with_lyrics("la"));
        // Six dash-defaulted rows; the release date row gets its own token
        assert_eq!(html.matches("<td>-</td>").count(), 6);
        assert!(html.contains(DEFAULT_COVER_URL));
        assert!(html.contains(UNKNOWN_DATE));
    }

    #[test]
    fn render_keeps_section_order() {
        let html = render(&full_report());
        let table = html.find("Song Information").unwrap();
        let cover = html.find("<h3>Cover</h3>").unwrap();
        let lyrics = html.find("<h3>Lyrics</h3>").unwrap();
        assert!(table < cover && cover < lyrics);
    }

    #[test]
    fn render_expands_lyric_line_marks() {
        let html = render(&full_report());
        assert!(html.contains("Every night I wonder\nWhy the stars align"));
    }

    #[test]
    fn render_escapes_values() {
        let mut report = SongReport::with_lyrics("la <script>alert(1)</script>");
        report.title = Some("Tom & Jerry".into());
        let html = render(&report);
        assert!(html.contains("Tom &amp; Jerry"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn render_is_deterministic() {
        let report = full_report();
        assert_eq!(render(&report), render(&report));
    }

    #[test]
    fn document_name_is_sanitized_and_bounded() {
        let mut report = SongReport::with_lyrics("la");
        report.title = Some("My Mystery?!".into());
        report.artist = Some("Isyana/Sarasvati".into());

        let name = document_name(&report);
        assert!(name.ends_with(".html"));
        assert!(!name.contains('/'));
        assert!(!name.contains('?'));

        report.title = Some("x".repeat(400));
        assert!(document_name(&report).len() <= 120 + ".html".len());
    }
}
