// src/page.rs
// =============================================================================
// ParsedPage: everything an analyzer may read about one fetched page.
//
// - the resolved origin URL (scheme, host)
// - the effective registrable domain of that host, computed once
// - the raw markup exactly as it was received
// - the document tree (scraper::Html), parsed once when the page is built
//
// A ParsedPage is created by the fetcher, wrapped in an Arc and shared
// read-only by every analyzer of one request.
// =============================================================================

use crate::links::effective_domain;
use parking_lot::{Mutex, MutexGuard};
use scraper::Html;
use url::Url;

#[derive(Debug)]
pub struct ParsedPage {
    url: Url,
    markup: String,
    effective_domain: Option<String>,
    // The tree is Send but not Sync; readers take turns. Nobody mutates it.
    document: Mutex<Html>,
}

impl ParsedPage {
    /// Parses `markup` into a document tree. CPU-bound; async callers should
    /// build pages off the runtime threads (see `Fetcher::fetch`).
    pub fn new(url: Url, markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let document = Html::parse_document(&markup);
        let effective_domain = effective_domain(&url);
        Self {
            url,
            markup,
            effective_domain,
            document: Mutex::new(document),
        }
    }

    /// The URL the page was fetched from.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Effective registrable domain of the origin host, if it has one.
    pub fn effective_domain(&self) -> Option<&str> {
        self.effective_domain.as_deref()
    }

    /// The parsed document. Hold the guard only inside synchronous code.
    pub fn document(&self) -> MutexGuard<'_, Html> {
        self.document.lock()
    }
}
