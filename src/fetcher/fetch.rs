// src/fetcher/fetch.rs
// =============================================================================
// Validates a target URL, downloads it and wraps the result in a ParsedPage.
//
// Failure taxonomy (see error::FetchError):
// - not an absolute http(s) URL with a host   -> InvalidUrl
// - DNS lookup failed                          -> HostNotFound
// - no response within the fetch timeout       -> Timeout
// - response status outside 2xx                -> Status(code)
// - body larger than the size cap              -> Body
// - anything else on the wire                  -> Transport
//
// The page is parsed on the blocking pool so a large document never stalls
// the runtime threads that drive link probes.
// =============================================================================

use crate::error::FetchError;
use crate::page::ParsedPage;
use reqwest::Client;
use std::error::Error as _;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Largest page body we are willing to hold in memory.
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Hints in a transport error chain that point at name resolution.
const DNS_HINTS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "no such host",
    "name or service not known",
];

// Checks that the input is something we can fetch
//
// Examples:
//   " https://example.com "  -> Ok (trimmed)
//   "example.com"            -> Err(InvalidUrl)  (no scheme)
//   "ftp://example.com"      -> Err(InvalidUrl)
pub fn validate_url(raw: &str) -> Result<Url, FetchError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|_| FetchError::InvalidUrl(trimmed.to_string()))?;

    let has_host = url.host_str().is_some_and(|h| !h.is_empty());
    if !matches!(url.scheme(), "http" | "https") || !has_host {
        return Err(FetchError::InvalidUrl(trimmed.to_string()));
    }
    Ok(url)
}

pub struct Fetcher {
    client: Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            timeout,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    // Fetches a page and returns it ready for analysis
    //
    // The page's origin is the final URL after redirects, so relative links
    // resolve the way a browser would resolve them.
    pub async fn fetch(&self, raw_url: &str) -> Result<ParsedPage, FetchError> {
        let url = validate_url(raw_url)?;
        info!(%url, "fetching page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.categorize_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().clone();
        let markup = self.read_body(response).await?;
        debug!(url = %final_url, bytes = markup.len(), "page fetched");

        tokio::task::spawn_blocking(move || ParsedPage::new(final_url, markup))
            .await
            .map_err(|e| FetchError::Body(format!("page parsing failed: {e}")))
    }

    // Reads the body chunk by chunk, refusing anything over the cap
    async fn read_body(&self, mut response: reqwest::Response) -> Result<String, FetchError> {
        let limit = self.max_body_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(too_large(limit));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    FetchError::Body(e.to_string())
                }
            })?
        {
            if body.len() + chunk.len() > limit {
                return Err(too_large(limit));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn categorize_error(&self, url: &Url, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout(self.timeout.as_millis() as u64);
        }

        let chain = error_chain(&error);
        let lower = chain.to_lowercase();
        if DNS_HINTS.iter().any(|hint| lower.contains(hint)) {
            return FetchError::HostNotFound(url.host_str().unwrap_or_default().to_string());
        }
        FetchError::Transport(chain)
    }
}

fn too_large(limit: usize) -> FetchError {
    FetchError::Body(format!("page is larger than {limit} bytes"))
}

// reqwest keeps the interesting part (e.g. "dns error") in the source chain
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixtureServer, Route};

    #[test]
    fn test_validate_url() {
        assert!(validate_url("  https://example.com/path  ").is_ok());
        assert!(validate_url("http://127.0.0.1:8080/").is_ok());
        assert!(matches!(validate_url("example.com"), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(validate_url("ftp://example.com"), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(validate_url("mailto:me@example.com"), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(validate_url(""), Err(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = FixtureServer::start(vec![(
            "/",
            Route::page(200, "<!DOCTYPE html><title>Hello</title>"),
        )])
        .await;
        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();

        let page = fetcher.fetch(&server.url("/")).await.unwrap();

        assert_eq!(page.markup(), "<!DOCTYPE html><title>Hello</title>");
        assert_eq!(page.url().as_str(), server.url("/"));
        assert_eq!(page.effective_domain(), Some("127.0.0.1"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_fatal() {
        let server = FixtureServer::start(vec![
            ("/private", Route::page(403, "no")),
            ("/nowhere", Route::page(404, "gone")),
        ])
        .await;
        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();

        let err = fetcher.fetch(&server.url("/private")).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(403)));

        let err = fetcher.fetch(&server.url("/nowhere")).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(404)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_fetch_timeout() {
        let server = FixtureServer::start(vec![("/slow", Route::Hang)]).await;
        let fetcher = Fetcher::new(Duration::from_millis(200)).unwrap();

        let err = fetcher.fetch(&server.url("/slow")).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout(200)));
        assert_eq!(err.http_status(), 504);
    }

    #[tokio::test]
    async fn test_fetch_refuses_oversized_pages() {
        let big = format!("<html><body>{}</body></html>", "x".repeat(4096));
        let server = FixtureServer::start(vec![
            ("/big", Route::page(200, big)),
            ("/small", Route::page(200, "<p>ok</p>")),
        ])
        .await;
        let fetcher = Fetcher::new(Duration::from_secs(5))
            .unwrap()
            .with_max_body_bytes(1024);

        let err = fetcher.fetch(&server.url("/big")).await.unwrap_err();
        assert!(matches!(&err, FetchError::Body(msg) if msg.contains("larger than 1024 bytes")));

        let page = fetcher.fetch(&server.url("/small")).await.unwrap();
        assert_eq!(page.markup(), "<p>ok</p>");
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_never_hits_the_network() {
        let fetcher = Fetcher::new(Duration::from_secs(1)).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
