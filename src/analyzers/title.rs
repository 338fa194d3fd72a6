// src/analyzers/title.rs
// Text of the page's first <title> element, trimmed. Empty if there is none.

use super::{Analyzer, FactValue};
use crate::error::AnalyzeError;
use crate::page::ParsedPage;
use async_trait::async_trait;
use scraper::Selector;
use std::sync::LazyLock;
use std::time::Instant;
use tracing::debug;

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

pub struct TitleAnalyzer;

#[async_trait]
impl Analyzer for TitleAnalyzer {
    fn key(&self) -> &'static str {
        "title"
    }

    async fn analyze(&self, page: &ParsedPage) -> Result<FactValue, AnalyzeError> {
        let started = Instant::now();
        let title = read_title(page);
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "title analyzer completed");
        Ok(FactValue::Text(title))
    }
}

// Holds the document lock, so it stays a plain sync helper
fn read_title(page: &ParsedPage) -> String {
    let document = page.document();
    let first = document.select(&TITLE).next();
    first
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}
