// src/service.rs
// =============================================================================
// Inspector: the one operation the rest of the program calls.
//
//   analyze_page(page) -> AnalysisReport     (page already fetched)
//   analyze_url(url)   -> fetch, then analyze_page
//
// The Inspector owns nothing request-scoped. It holds the fetcher, the
// analyzer engine, the analyzer set and a handle to the process-wide
// verification pool, and can be shared (Arc) across concurrent requests.
// =============================================================================

use crate::analyzers::{self, Analyzer, Fact, FactValue};
use crate::config::AppConfig;
use crate::engine::AnalyzerEngine;
use crate::error::FetchError;
use crate::fetcher::Fetcher;
use crate::links::{LinkInventory, VerificationPool};
use crate::page::ParsedPage;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Every fact produced for one page.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub url: String,
    pub facts: Vec<Fact>,
}

impl AnalysisReport {
    pub fn fact(&self, key: &str) -> Option<&Fact> {
        self.facts.iter().find(|f| f.key == key)
    }

    pub fn links(&self) -> Option<&LinkInventory> {
        match self.fact("links")?.value.as_ref()? {
            FactValue::Links(inventory) => Some(inventory),
            _ => None,
        }
    }

    // Merges facts into one keyed object
    //
    // { "title": "...", "links": {...}, "headings": { "error": "..." } }
    pub fn data(&self) -> Value {
        let mut data = Map::new();
        for fact in &self.facts {
            let entry = match (&fact.value, &fact.error) {
                (_, Some(error)) => json!({ "error": error }),
                (Some(value), None) => serde_json::to_value(value)
                    .unwrap_or_else(|e| json!({ "error": e.to_string() })),
                (None, None) => Value::Null,
            };
            data.insert(fact.key.clone(), entry);
        }
        Value::Object(data)
    }
}

pub struct Inspector {
    fetcher: Fetcher,
    engine: AnalyzerEngine,
    analyzers: Vec<Arc<dyn Analyzer>>,
    pool: Arc<VerificationPool>,
}

impl Inspector {
    pub fn new(fetcher: Fetcher, engine: AnalyzerEngine, pool: Arc<VerificationPool>) -> Self {
        let analyzers = analyzers::standard_set(Arc::clone(&pool));
        Self {
            fetcher,
            engine,
            analyzers,
            pool,
        }
    }

    /// Builds the fetcher and engine from configuration around an existing pool.
    pub fn from_config(config: &AppConfig, pool: Arc<VerificationPool>) -> reqwest::Result<Self> {
        let fetcher = Fetcher::new(config.fetch_timeout())?;
        let engine = AnalyzerEngine::new(config.dispatch_parallelism);
        Ok(Self::new(fetcher, engine, pool))
    }

    /// Runs every analyzer against an already-fetched page.
    pub async fn analyze_page(&self, page: ParsedPage) -> AnalysisReport {
        let started = Instant::now();
        let url = page.url().to_string();

        let facts = self.engine.execute(&self.analyzers, Arc::new(page)).await;

        let stats = self.pool.stats();
        info!(
            %url,
            facts = facts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            pool_in_flight = stats.in_flight,
            pool_peak = stats.peak_in_flight,
            dispatch_workers = self.engine.parallelism(),
            pool_completed = stats.completed,
            "analysis completed"
        );
        AnalysisReport { url, facts }
    }

    /// Fetches the page, then analyzes it. A failed fetch fails the request.
    pub async fn analyze_url(&self, url: &str) -> Result<AnalysisReport, FetchError> {
        let page = self.fetcher.fetch(url).await?;
        Ok(self.analyze_page(page).await)
    }
}
