// src/analyzers/links.rs
// =============================================================================
// The link analyzer is a small pipeline of its own:
//
//   extract -> classify -> submit all to the verification pool
//           -> wait for every probe -> tally -> one "links" fact
//
// It waits on its own batch only. The pool is shared with every other request
// running at the same time, so this analyzer may spend most of its life
// queued behind other pages' links.
// =============================================================================

use super::{Analyzer, FactValue};
use crate::error::AnalyzeError;
use crate::links::{classify, extract_links, LinkInventory, LinkRecord, VerificationPool};
use crate::page::ParsedPage;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub struct LinkAnalyzer {
    pool: Arc<VerificationPool>,
}

impl LinkAnalyzer {
    pub fn new(pool: Arc<VerificationPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Analyzer for LinkAnalyzer {
    fn key(&self) -> &'static str {
        "links"
    }

    async fn analyze(&self, page: &ParsedPage) -> Result<FactValue, AnalyzeError> {
        let started = Instant::now();

        let urls = extract_links(page.markup(), page.url())?;
        let origin = page.effective_domain();
        debug!(page = %page.url(), origin = ?origin, links = urls.len(), "links extracted");

        let types: Vec<_> = urls.iter().map(|url| classify(url, origin)).collect();
        let outcomes = self.pool.verify_all(&urls).await;

        if outcomes.len() != urls.len() {
            return Err(AnalyzeError::new(format!(
                "verification returned {} results for {} links",
                outcomes.len(),
                urls.len()
            )));
        }

        let records: Vec<LinkRecord> = urls
            .into_iter()
            .zip(types)
            .zip(outcomes)
            .map(|((url, link_type), outcome)| LinkRecord::new(url, link_type, outcome))
            .collect();
        let inventory = LinkInventory::from_records(records);

        info!(
            page = %page.url(),
            total = inventory.total_count,
            internal = inventory.internal_count,
            external = inventory.external_count,
            unknown = inventory.unknown_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "link analyzer completed"
        );
        Ok(FactValue::Links(inventory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::{LinkType, Prober};
    use parking_lot::Mutex;
    use url::Url;

    /// Answers 200 for everything and remembers what it was asked.
    #[derive(Default)]
    struct RecordingProber {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Prober for RecordingProber {
        async fn probe(&self, url: &str) -> u16 {
            self.seen.lock().push(url.to_string());
            if url.ends_with("/missing") {
                404
            } else {
                200
            }
        }
    }

    fn inventory(value: FactValue) -> LinkInventory {
        match value {
            FactValue::Links(inventory) => inventory,
            other => panic!("expected links, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_single_internal_link() {
        let pool = Arc::new(VerificationPool::start(2, Arc::new(RecordingProber::default())));
        let page = ParsedPage::new(
            Url::parse("https://example.com").unwrap(),
            r#"<html><body><a href="https://example.com/about">About</a></body></html>"#,
        );

        let inventory = inventory(LinkAnalyzer::new(pool).analyze(&page).await.unwrap());

        assert_eq!(inventory.total_count, 1);
        assert_eq!(inventory.link_records.len(), 1);
        assert_eq!(inventory.link_records[0].link_type, LinkType::Internal);
        assert_eq!(inventory.link_records[0].status_code, 200);
    }

    #[tokio::test]
    async fn test_mixed_links_are_deduplicated_classified_and_probed_once() {
        let prober = Arc::new(RecordingProber::default());
        let pool = Arc::new(VerificationPool::start(3, prober.clone()));
        let page = ParsedPage::new(
            Url::parse("https://www.example.co.uk/index.html").unwrap(),
            r##"
            <a href="/missing">Missing</a>
            <a href="https://blog.example.co.uk/">Blog</a>
            <a href="https://www.rust-lang.org/">Rust</a>
            <a href="https://www.rust-lang.org/">Rust again</a>
            <script src="http://localhost:9/app.js"></script>
            <a href="#top">Top</a>
            "##,
        );

        let inventory = inventory(LinkAnalyzer::new(pool).analyze(&page).await.unwrap());

        assert_eq!(inventory.total_count, 4);
        assert_eq!(inventory.internal_count, 2);
        assert_eq!(inventory.external_count, 1);
        assert_eq!(inventory.unknown_count, 1);
        assert_eq!(
            inventory.total_count,
            inventory.internal_count + inventory.external_count + inventory.unknown_count
        );

        let missing = inventory
            .link_records
            .iter()
            .find(|r| r.url == "https://www.example.co.uk/missing")
            .unwrap();
        assert_eq!(missing.status_code, 404);

        let mut seen = prober.seen.lock().clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 4);
        assert_eq!(prober.seen.lock().len(), 4);
    }

    #[tokio::test]
    async fn test_page_without_links() {
        let pool = Arc::new(VerificationPool::start(1, Arc::new(RecordingProber::default())));
        let page = ParsedPage::new(Url::parse("https://example.com").unwrap(), "<p>plain</p>");

        let inventory = inventory(LinkAnalyzer::new(pool).analyze(&page).await.unwrap());

        assert_eq!(inventory, LinkInventory::default());
    }
}
