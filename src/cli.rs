// src/cli.rs
// =============================================================================
// Command-line interface (clap derive API).
//
//   page-inspector analyze <URL> [--json]
//   page-inspector serve [--port N]
//
// Global flags override individual values from the config file. Each one can
// also come from an environment variable.
// =============================================================================

use crate::config::ConfigOverrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "page-inspector",
    version,
    about = "Analyze a web page: title, doctype, headings, login form and links",
    long_about = "page-inspector fetches one page and reports its title, HTML version, heading \
                  inventory, whether it has a login form, and every link it references \
                  (internal/external) with a live status check and latency."
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "PAGE_INSPECTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of link verification workers shared by all requests
    #[arg(long, global = true, env = "PAGE_INSPECTOR_WORKERS")]
    pub workers: Option<usize>,

    /// Timeout for each link probe, in milliseconds
    #[arg(long, global = true, env = "PAGE_INSPECTOR_PROBE_TIMEOUT_MS")]
    pub probe_timeout_ms: Option<u64>,

    /// Timeout for fetching the analyzed page, in milliseconds
    #[arg(long, global = true, env = "PAGE_INSPECTOR_FETCH_TIMEOUT_MS")]
    pub fetch_timeout_ms: Option<u64>,

    /// Analyzer dispatch workers per request
    #[arg(long, global = true, env = "PAGE_INSPECTOR_DISPATCH_PARALLELISM")]
    pub dispatch_parallelism: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a single page and print the report
    ///
    /// Example: page-inspector analyze https://example.com --json
    Analyze {
        /// Page URL (e.g., https://example.com)
        url: String,

        /// Output the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Run the HTTP API (GET /v1/analyze?url=...)
    Serve {
        /// Port to listen on
        #[arg(long, env = "PAGE_INSPECTOR_PORT")]
        port: Option<u16>,
    },
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        let service_port = match &self.command {
            Commands::Serve { port } => *port,
            Commands::Analyze { .. } => None,
        };
        ConfigOverrides {
            service_port,
            thread_count: self.workers,
            link_timeout_ms: self.probe_timeout_ms,
            fetch_timeout_ms: self.fetch_timeout_ms,
            dispatch_parallelism: self.dispatch_parallelism,
        }
    }
}
