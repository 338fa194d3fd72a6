// src/links/extract.rs
// =============================================================================
// Link Extractor: every distinct URL a page references.
//
// Looks at:
//   <a href>, <link href>, <script src>
//
// A value is kept only if, after trimming:
// - it is not empty and not an in-page fragment ("#top")
// - it is absolute ("https://..."), root-relative ("/docs") or
//   protocol-relative ("//cdn.example.com/x.js")
// - it resolves against the page URL to an http(s) URL
//
// Path-relative values ("docs/a", "../b") and anything that fails to parse
// are dropped silently. That is not an error.
// =============================================================================

use crate::error::ScanError;
use crate::markup;
use std::collections::BTreeSet;
use url::Url;

// Extracts all distinct absolute URLs from raw markup
//
// Parameters:
//   markup: the raw page markup
//   base: the URL of the page (for resolving "/x" and "//host/x")
//
// Returns: sorted, de-duplicated absolute URLs
//
// Example:
//   markup = "<a href='/docs'>Docs</a><a href='/docs'>Again</a>"
//   base   = "https://example.com"
//   result = ["https://example.com/docs"]
pub fn extract_links(markup: &str, base: &Url) -> Result<Vec<String>, ScanError> {
    let links: BTreeSet<String> = markup::url_values(markup)?
        .iter()
        .filter_map(|value| resolve_candidate(base, value))
        .collect();
    Ok(links.into_iter().collect())
}

// Applies the acceptance rules to one attribute value
//
// Returns: Some(absolute_url) or None if the value should be dropped
fn resolve_candidate(base: &Url, raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() || value.starts_with('#') {
        return None;
    }

    let url = if value.starts_with('/') {
        // "/path" and "//host/path" both resolve against the page
        base.join(value).ok()?
    } else {
        // Must carry its own scheme; "docs/a" fails here and is dropped
        Url::parse(value).ok()?
    };

    if !is_checkable(&url) {
        return None;
    }
    Some(url.to_string())
}

// Only http/https can be probed; mailto:, tel:, javascript:, data: are skipped
fn is_checkable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/page/").unwrap()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://www.rust-lang.org">Rust</a>"#;
        let links = extract_links(html, &base()).unwrap();
        assert_eq!(links, vec!["https://www.rust-lang.org/"]);
    }

    #[test]
    fn test_resolve_root_and_protocol_relative() {
        let html = r#"
            <a href="/docs">Docs</a>
            <script src="//cdn.example.net/app.js"></script>
            <link rel="stylesheet" href="  /style.css  ">
        "#;
        let links = extract_links(html, &base()).unwrap();
        assert_eq!(
            links,
            vec![
                "https://cdn.example.net/app.js",
                "https://example.com/docs",
                "https://example.com/style.css",
            ]
        );
    }

    #[test]
    fn test_skip_fragments_relative_paths_and_other_schemes() {
        let html = r##"
            <a href="#section">Jump</a>
            <a href="">Empty</a>
            <a href="../about">Relative</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="javascript:void(0)">JS</a>
            <a href="http://[broken">Broken</a>
            <img src="/image.png">
        "##;
        assert!(extract_links(html, &base()).unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_collapse_after_resolution() {
        let html = r#"
            <a href="https://example.com/docs">A</a>
            <a href="/docs">B</a>
            <link href="//example.com/docs">
        "#;
        assert_eq!(extract_links(html, &base()).unwrap(), vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_extraction_ignores_tag_order() {
        let forward = r#"<a href="/a"></a><script src="/b"></script><a href="https://x.org/c"></a>"#;
        let backward = r#"<a href="https://x.org/c"></a><script src="/b"></script><a href="/a"></a>"#;
        let first = extract_links(forward, &base()).unwrap();
        assert_eq!(first, extract_links(backward, &base()).unwrap());
        assert_eq!(first, extract_links(forward, &base()).unwrap());
    }

    #[test]
    fn test_links_hidden_in_comments_and_scripts_are_not_extracted() {
        let html = r#"
            <!-- <a href="/old-page">Old</a> -->
            <script>document.write('<a href="/from-js">')</script>
            <textarea><a href="/in-textarea"></a></textarea>
            <a href="/real">Real</a>
        "#;
        assert_eq!(extract_links(html, &base()).unwrap(), vec!["https://example.com/real"]);
    }
}
