//! HTML extraction helpers shared by the scraping providers.
//!
//! All helpers take raw HTML as `&str` and return owned values, so parsed
//! documents never live across an `.await` point in the callers.

use scraper::{Html, Selector};

/// Read a `<meta>` tag's `content` by `property` or `name` attribute.
pub fn meta_content(html: &str, key: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    for attr in ["property", "name"] {
        let sel = Selector::parse(&format!(r#"meta[{attr}="{key}"]"#)).ok()?;
        if let Some(content) = doc
            .select(&sel)
            .find_map(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            return Some(content.to_string());
        }
    }

    None
}

/// Extract text using a prioritized selector list; the first selector with
/// any match wins. Text from all elements matching the winning selector is
/// concatenated line by line.
///
/// Returns `None` when no selector matches or the matched text is empty.
pub fn first_match_text(html: &str, selectors: &[&str]) -> Option<String> {
    let doc = Html::parse_document(html);

    for sel_str in selectors {
        let Ok(sel) = Selector::parse(sel_str) else {
            continue;
        };

        let mut lines: Vec<String> = Vec::new();
        for el in doc.select(&sel) {
            for segment in el.text() {
                let segment = segment.trim();
                if !segment.is_empty() {
                    lines.push(segment.to_string());
                }
            }
        }

        if !lines.is_empty() {
            return Some(lines.join("\n"));
        }
    }

    None
}

/// Extract the first `href` matching a selector, as an absolute URL string.
/// Protocol-relative hrefs (`//host/...`) are resolved to https.
pub fn first_href(html: &str, selector: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse(selector).ok()?;

    let href = doc
        .select(&sel)
        .find_map(|el| el.value().attr("href"))?
        .trim()
        .to_string();

    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href
    };

    // Only absolute http(s) targets are usable for a follow-up fetch.
    match url::Url::parse(&absolute) {
        Ok(u) if u.scheme() == "http" || u.scheme() == "https" => Some(absolute),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_content_by_property() {
        let html = r#"<html><head>
            <meta property="og:image" content="https://img.example.com/cover.jpg">
        </head><body></body></html>"#;
        assert_eq!(
            meta_content(html, "og:image").as_deref(),
            Some("https://img.example.com/cover.jpg")
        );
    }

    #[test]
    fn meta_content_by_name_fallback() {
        let html = r#"<html><head>
            <meta name="release_date" content="2023-05-12">
        </head></html>"#;
        assert_eq!(
            meta_content(html, "release_date").as_deref(),
            Some("2023-05-12")
        );
    }

    #[test]
    fn meta_content_missing_or_empty() {
        let html = r#"<html><head><meta property="og:image" content=""></head></html>"#;
        assert!(meta_content(html, "og:image").is_none());
        assert!(meta_content(html, "og:title").is_none());
    }

    #[test]
    fn first_match_text_selector_priority() {
        let html = r#"<html><body>
            <div class="lyrics">First verse<br>Second verse</div>
            <pre>should not win</pre>
        </body></html>"#;
        let text = first_match_text(html, &[".lyrics", "pre"]).unwrap();
        assert_eq!(text, "First verse\nSecond verse");
    }

    #[test]
    fn first_match_text_falls_through_to_later_selector() {
        let html = r#"<html><body><pre>fallback text</pre></body></html>"#;
        let text = first_match_text(html, &[".lyrics", "pre"]).unwrap();
        assert_eq!(text, "fallback text");
    }

    #[test]
    fn first_match_text_joins_multiple_containers() {
        let html = r#"<html><body>
            <div data-lyrics-container="true">Verse one</div>
            <div data-lyrics-container="true">Verse two</div>
        </body></html>"#;
        let text = first_match_text(html, &[r#"div[data-lyrics-container="true"]"#]).unwrap();
        assert_eq!(text, "Verse one\nVerse two");
    }

    #[test]
    fn first_match_text_none_when_absent() {
        let html = "<html><body><p>no lyrics here</p></body></html>";
        assert!(first_match_text(html, &[".lyrics"]).is_none());
    }

    #[test]
    fn first_href_resolves_protocol_relative() {
        let html = r#"<a class="result__a" href="//lyrics.example.com/song">hit</a>"#;
        assert_eq!(
            first_href(html, "a.result__a").as_deref(),
            Some("https://lyrics.example.com/song")
        );
    }

    #[test]
    fn first_href_rejects_relative_and_javascript() {
        let html = r#"<a class="result__a" href="/local/path">hit</a>"#;
        assert!(first_href(html, "a.result__a").is_none());

        let html = r#"<a class="result__a" href="javascript:void(0)">hit</a>"#;
        assert!(first_href(html, "a.result__a").is_none());
    }
}
