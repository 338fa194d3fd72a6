// src/test_support.rs
// =============================================================================
// HTTP fixtures for tests, served by mockito on 127.0.0.1.
//
// `Route::Page` answers with a canned status and body. `Route::Hang` holds
// back the whole response (headers included) for HANG_DELAY, longer than
// any timeout the tests use, which is how timeout paths are exercised
// without touching the internet. Tests that use it run on a multi-thread
// runtime.
// =============================================================================

use mockito::{Mock, Server, ServerGuard};
use std::time::Duration;

const HANG_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub enum Route {
    Page { status: u16, body: String },
    Hang,
}

impl Route {
    pub fn page(status: u16, body: impl Into<String>) -> Self {
        Route::Page {
            status,
            body: body.into(),
        }
    }
}

pub struct FixtureServer {
    server: ServerGuard,
    // A held-back answer blocks the mock server that gives it, so every
    // hanging route gets a server of its own
    hanging: Vec<(String, ServerGuard)>,
    _mocks: Vec<Mock>,
}

impl FixtureServer {
    pub async fn start(routes: Vec<(&str, Route)>) -> Self {
        let mut server = Server::new_async().await;
        let mut hanging = Vec::new();
        let mut mocks = Vec::new();

        for (path, route) in routes {
            match route {
                Route::Page { status, body } => {
                    let mock = server
                        .mock("GET", path)
                        .with_status(usize::from(status))
                        .with_header("content-type", "text/html; charset=utf-8")
                        .with_body(body)
                        .create_async()
                        .await;
                    mocks.push(mock);
                }
                Route::Hang => {
                    let mut slow = Server::new_async().await;
                    let mock = slow
                        .mock("GET", path)
                        .with_status(200)
                        .with_body_from_request(|_| {
                            std::thread::sleep(HANG_DELAY);
                            b"too late".to_vec()
                        })
                        .create_async()
                        .await;
                    mocks.push(mock);
                    hanging.push((path.to_string(), slow));
                }
            }
        }

        Self {
            server,
            hanging,
            _mocks: mocks,
        }
    }

    pub fn url(&self, path: &str) -> String {
        let base = self
            .hanging
            .iter()
            .find(|(hanging_path, _)| hanging_path == path)
            .map_or_else(|| self.server.url(), |(_, slow)| slow.url());
        format!("{base}{path}")
    }
}
