// src/main.rs
// =============================================================================
// Entry point.
//
// What happens here:
// 1. Set up logging (tracing, to stderr so stdout stays clean for --json)
// 2. Parse command-line arguments and load the configuration
// 3. Start the process-wide link verification pool
// 4. Run `analyze` once, or `serve` until Ctrl+C
// 5. Exit with proper code (0 = success, 1 = broken links, 2 = error)
// =============================================================================

mod analyzers;     // src/analyzers/ - one module per page fact
mod cli;           // src/cli.rs - command-line parsing
mod config;        // src/config.rs - AppConfig (TOML + overrides)
mod engine;        // src/engine.rs - parallel analyzer dispatch
mod error;         // src/error.rs - error types
mod fetcher;       // src/fetcher/ - page fetching
mod links;         // src/links/ - extraction, classification, verification
mod markup;        // src/markup.rs - streaming tag scans (lol_html)
mod page;          // src/page.rs - ParsedPage
mod report;        // src/report.rs - terminal output
mod server;        // src/server.rs - HTTP API
mod service;       // src/service.rs - Inspector

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::AppConfig;
use links::{HttpProber, VerificationPool};
use service::Inspector;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins when set; otherwise only our own info-level events
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("page_inspector=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = no broken links (or the server stopped cleanly)
//   Ok(1) = broken links found
//   Err   = anything else, reported as exit code 2
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), &cli.overrides())
        .context("failed to load configuration")?;

    let prober = HttpProber::new(config.link_timeout()).context("failed to build link prober")?;
    let pool = Arc::new(VerificationPool::start(config.thread_count, Arc::new(prober)));
    info!(
        workers = pool.size(),
        dispatch_parallelism = config.dispatch_parallelism,
        "inspector ready"
    );
    let inspector = Inspector::from_config(&config, Arc::clone(&pool))
        .context("failed to build page fetcher")?;

    match cli.command {
        Commands::Analyze { url, json } => {
            let code = handle_analyze(inspector, &url, json).await?;
            shutdown_pool(pool).await;
            Ok(code)
        }
        // The server path leaves the workers to process exit
        Commands::Serve { .. } => {
            handle_serve(inspector, config.service_port).await?;
            Ok(0)
        }
    }
}

// Handles the 'analyze' subcommand; the inspector is dropped on return so the
// pool can be shut down afterwards
async fn handle_analyze(inspector: Inspector, url: &str, json: bool) -> Result<i32> {
    if !json {
        println!("🔍 Analyzing: {}\n", url);
    }

    let report = inspector
        .analyze_url(url)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .with_context(|| format!("failed to analyze {}", url))?;

    report::print_report(&report, json)?;

    let broken = report.links().map(|l| l.broken().count()).unwrap_or(0);
    Ok(if broken > 0 { 1 } else { 0 })
}

// Handles the 'serve' subcommand; returns after Ctrl+C
async fn handle_serve(inspector: Inspector, port: u16) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;

    server::serve(listener, Arc::new(inspector), async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
        }
    })
    .await
    .context("server failed")?;
    Ok(())
}

// Joins the verification workers once every other handle is gone
async fn shutdown_pool(pool: Arc<VerificationPool>) {
    match Arc::try_unwrap(pool) {
        Ok(pool) => {
            pool.shutdown().await;
            info!("verification pool stopped");
        }
        Err(_) => warn!("verification pool still in use, skipping graceful shutdown"),
    }
}
