// src/analyzers/doctype.rs
// =============================================================================
// Declared HTML version, read from the <!DOCTYPE ...> declaration.
//
// Legacy doctypes are recognised by their public identifier; a bare
// "<!DOCTYPE html>" (or the about:legacy-compat form) is HTML5. Anything
// else, including no declaration at all, is "Unknown".
// =============================================================================

use super::{Analyzer, FactValue};
use crate::error::AnalyzeError;
use crate::page::ParsedPage;
use async_trait::async_trait;
use tracing::debug;

const UNKNOWN_VERSION: &str = "Unknown";
const HTML5: &str = "HTML5";

/// Public identifier -> version name. Compared case-insensitively.
const PUBLIC_IDENTIFIERS: &[(&str, &str)] = &[
    ("-//W3C//DTD HTML 4.01//EN", "HTML 4.01 Strict"),
    ("-//W3C//DTD HTML 4.01 Transitional//EN", "HTML 4.01 Transitional"),
    ("-//W3C//DTD HTML 4.01 Frameset//EN", "HTML 4.01 Frameset"),
    ("-//W3C//DTD XHTML 1.0 Strict//EN", "XHTML 1.0 Strict"),
    ("-//W3C//DTD XHTML 1.0 Transitional//EN", "XHTML 1.0 Transitional"),
    ("-//W3C//DTD XHTML 1.0 Frameset//EN", "XHTML 1.0 Frameset"),
    ("-//W3C//DTD XHTML 1.1//EN", "XHTML 1.1"),
];

pub struct DoctypeAnalyzer;

#[async_trait]
impl Analyzer for DoctypeAnalyzer {
    fn key(&self) -> &'static str {
        "htmlVersion"
    }

    async fn analyze(&self, page: &ParsedPage) -> Result<FactValue, AnalyzeError> {
        let version = detect_version(page.markup());
        debug!(version, "doctype analyzer completed");
        Ok(FactValue::Text(version.to_string()))
    }
}

/// Maps the page's doctype declaration to a version name.
pub fn detect_version(markup: &str) -> &'static str {
    let Some(declaration) = doctype_declaration(markup) else {
        return UNKNOWN_VERSION;
    };

    if let Some(name) = PUBLIC_IDENTIFIERS
        .iter()
        .find(|(id, _)| declaration.contains(&id.to_ascii_lowercase()))
        .map(|(_, name)| *name)
    {
        return name;
    }

    // "<!doctype html>" or "<!doctype html system "about:legacy-compat">"
    let rest = declaration.trim_start_matches("<!doctype").trim();
    let mut words = rest.split_whitespace();
    match (words.next(), words.next()) {
        (Some("html"), None) => HTML5,
        (Some("html"), Some("system")) if rest.contains("about:legacy-compat") => HTML5,
        _ => UNKNOWN_VERSION,
    }
}

// Lowercased "<!doctype ...>" text (without the closing '>'), if present
fn doctype_declaration(markup: &str) -> Option<String> {
    let lower = markup.to_ascii_lowercase();
    let start = lower.find("<!doctype")?;
    let end = lower[start..].find('>')? + start;
    Some(lower[start..end].to_string())
}
