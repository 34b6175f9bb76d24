//! # Trellis - lazy graph pipelines
//!
//! The main binary for the Trellis graph engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                 apps/trellis (THE BINARY)             │
//! │                                                       │
//! │  ┌─────────────┐          ┌──────────────────────┐    │
//! │  │   CLI       │ ───────▶ │  Pipeline config     │    │
//! │  │  (clap)     │          │  (TOML source+stages)│    │
//! │  └─────────────┘          └──────────┬───────────┘    │
//! │                                      ▼                │
//! │                           ┌───────────────────┐       │
//! │                           │   trellis-core    │       │
//! │                           │   (THE ENGINE)    │       │
//! │                           └───────────────────┘       │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! trellis generate --kind complete --count 4
//! trellis run --pipeline pipeline.toml --limit 100
//! trellis capabilities --pipeline pipeline.toml --json-mode
//! ```

use clap::Parser;
use trellis::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // TRELLIS_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("TRELLIS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "trellis=debug,trellis_core=debug"
    } else {
        "trellis=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so stdout stays clean for JSON lines.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Trellis startup banner to stderr.
fn print_banner() {
    eprintln!(
        r#"
  ┌┬┐┬─┐┌─┐┬  ┬  ┬┌─┐
   │ ├┬┘├┤ │  │  │└─┐
   ┴ ┴└─└─┘┴─┘┴─┘┴└─┘

  Lazy graph pipelines v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
