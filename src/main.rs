//! Chaos Mock Engine - CLI Entry Point
//!
//! Loads an endpoint configuration and dispatches a single synthetic
//! request through the engine, printing the response. Useful as a
//! dry-run harness for endpoint configurations; the embedding HTTP
//! layer owns actual port wiring.

use anyhow::{Context, Result};
use chaos_mock_engine::config::{EngineConfig, HttpMethod};
use chaos_mock_engine::engine::MockEngine;
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "chaos-mock-engine",
    about = "Chaos mock API engine - request validation, schema synthesis, and latency simulation",
    version
)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "chaos-mock.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: Level,

    /// Print a sample configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,

    /// Group name of the request to dispatch
    #[arg(short, long)]
    group: Option<String>,

    /// HTTP method of the request to dispatch
    #[arg(short, long, default_value = "GET")]
    method: HttpMethod,

    /// Path of the request to dispatch (relative to the group)
    #[arg(short, long)]
    path: Option<String>,

    /// Request header, as name=value (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME=VALUE")]
    headers: Vec<String>,

    /// Query parameter, as name=value (repeatable)
    #[arg(short = 'q', long = "query", value_name = "NAME=VALUE")]
    query: Vec<String>,

    /// Request body
    #[arg(short, long)]
    data: Option<String>,
}

fn parse_pairs(pairs: &[String], what: &str) -> Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .with_context(|| format!("Invalid {}: {:?} (expected NAME=VALUE)", what, pair))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Print sample config if requested
    if args.print_config {
        let sample_config = include_str!("../demos/sample-config.yaml");
        println!("{}", sample_config);
        return Ok(());
    }

    // Load configuration
    let config = if args.config.exists() {
        info!(path = ?args.config, "Loading configuration");
        EngineConfig::from_file(&args.config)?
    } else if args.validate {
        anyhow::bail!("Configuration file not found: {:?}", args.config);
    } else {
        info!("Using default configuration (no endpoints)");
        EngineConfig::default()
    };

    // Validate and exit if requested
    if args.validate {
        config.validate()?;
        println!(
            "Configuration is valid ({} endpoints in {} groups)",
            config.endpoint_count(),
            config.groups.len()
        );
        return Ok(());
    }

    let group = args
        .group
        .context("--group is required to dispatch a request")?;
    let path = args
        .path
        .context("--path is required to dispatch a request")?;
    let headers = parse_pairs(&args.headers, "header")?;
    let query = parse_pairs(&args.query, "query parameter")?;

    let engine = MockEngine::from_config(&config);
    let response = engine
        .handle(
            &group,
            args.method,
            &path,
            &headers,
            &query,
            args.data.as_deref().map(str::as_bytes),
        )
        .await;

    println!("{} {}", args.method, path);
    println!("-> {}", response.status);
    for (name, value) in &response.headers {
        println!("-> {}: {}", name, value);
    }
    if !response.body.is_empty() {
        println!("{}", response.body_text());
    }

    Ok(())
}
