// src/fetcher/mod.rs
// =============================================================================
// Fetching the page under analysis.
//
// This is the only step that can fail a whole request: if the page can't be
// fetched (bad URL, DNS failure, timeout, non-2xx) nothing else runs.
// =============================================================================

mod fetch;

pub use fetch::{validate_url, Fetcher};
