// src/server.rs
// =============================================================================
// HTTP API.
//
//   GET /v1/analyze?url=<target>
//
// Success (200):
//   { "status": "success", "message": "Analyzed successfully", "data": {...} }
// Failure (4xx/5xx, status taken from the fetch failure):
//   { "status": "error", "message": "Host not found. Check domain name." }
//
// Every connection is served on its own task; all of them share one
// Inspector and therefore one verification pool.
// =============================================================================

use crate::fetcher::validate_url;
use crate::service::Inspector;
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use serde_json::Value;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

const ANALYZE_PATH: &str = "/v1/analyze";

#[derive(Debug, Serialize)]
struct Envelope {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Accepts connections until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, inspector: Arc<Inspector>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    info!("page inspector listening on http://{}", listener.local_addr()?);
    tokio::pin!(shutdown);

    loop {
        let (stream, remote_addr) = tokio::select! {
            _ = &mut shutdown => {
                info!("shutting down server");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    error!("failed to accept connection: {}", e);
                    continue;
                }
            },
        };

        let io = TokioIo::new(stream);
        let inspector = Arc::clone(&inspector);

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let inspector = Arc::clone(&inspector);
                async move { Ok::<_, Infallible>(route(req, &inspector).await) }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!("error serving connection from {}: {}", remote_addr, err);
            }
        });
    }
}

async fn route(req: Request<Incoming>, inspector: &Inspector) -> Response<Full<Bytes>> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, ANALYZE_PATH) => analyze(req.uri().query(), inspector).await,
        (&Method::OPTIONS, _) => with_cors(Response::builder().status(StatusCode::NO_CONTENT))
            .body(Full::new(Bytes::new()))
            .unwrap_or_else(|_| fallback_response()),
        _ => error_response(StatusCode::NOT_FOUND, "Route not found".to_string()),
    }
}

async fn analyze(query: Option<&str>, inspector: &Inspector) -> Response<Full<Bytes>> {
    let target = query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "url")
                .map(|(_, value)| value.trim().to_string())
        })
        .unwrap_or_default();
    debug!(%target, "analyze requested");

    if let Err(e) = validate_url(&target) {
        return error_response(StatusCode::BAD_REQUEST, e.user_message());
    }

    match inspector.analyze_url(&target).await {
        Ok(report) => json_response(
            StatusCode::OK,
            &Envelope {
                status: "success",
                message: "Analyzed successfully".to_string(),
                data: Some(report.data()),
            },
        ),
        Err(e) => {
            warn!(%target, error = %e, "analysis failed");
            let status = StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::BAD_GATEWAY);
            error_response(status, e.user_message())
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response<Full<Bytes>> {
    json_response(
        status,
        &Envelope {
            status: "error",
            message,
            data: None,
        },
    )
}

fn json_response(status: StatusCode, envelope: &Envelope) -> Response<Full<Bytes>> {
    let body = match serde_json::to_vec(envelope) {
        Ok(body) => body,
        Err(e) => {
            error!("failed to serialize response: {}", e);
            return fallback_response();
        }
    };

    with_cors(Response::builder().status(status))
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| fallback_response())
}

fn with_cors(builder: hyper::http::response::Builder) -> hyper::http::response::Builder {
    builder
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS")
        .header(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type")
}

fn fallback_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(
        br#"{"status":"error","message":"internal error"}"#,
    )));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
