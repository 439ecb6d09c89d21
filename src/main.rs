//! Wikipedia MCP Server - Rust Implementation
//!
//! A Model Context Protocol (MCP) server for Wikipedia.
//! Provides tools for searching and reading Wikipedia articles.

use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use wikipedia_mcp_server::config::Config;
use wikipedia_mcp_server::mcp::catalog::ToolCatalog;
use wikipedia_mcp_server::wikipedia::client::WikipediaClient;
use wikipedia_mcp_server::wikipedia::ContentProvider;

/// Wikipedia MCP Server
#[derive(Parser)]
#[command(name = "wikipedia-mcp-server")]
#[command(author, version, about = "Wikipedia MCP Server - A Model Context Protocol server for Wikipedia")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Wikipedia language edition (overrides WIKIPEDIA_LANGUAGE)
    #[arg(long, global = true)]
    language: Option<String>,

    /// MediaWiki API endpoint (overrides WIKIPEDIA_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// HTTP timeout in seconds (overrides WIKIPEDIA_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Minimum log level written to stderr
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the Wikipedia API is reachable
    Check {
        /// Query used for the test search
        #[arg(default_value = "Rust programming language")]
        query: String,
    },

    /// Print the tool catalog as JSON
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(cli.log_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Check { query }) => check(&config, &query).await,
        Some(Commands::Tools) => {
            let catalog = ToolCatalog::wikipedia()?;
            println!("{}", serde_json::to_string_pretty(&catalog.tools())?);
            Ok(())
        }
        None => {
            tracing::info!(api = %config.api_url, "Serving Wikipedia tools on stdio");
            let server = wikipedia_mcp_server::build_server(&config)?;
            server.run_stdio().await?;
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::new().context("Failed to load configuration")?;

    if let Some(language) = &cli.language {
        config = config.with_language(language.clone());
    }
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    config.validate().context("Invalid command-line options")?;
    Ok(config)
}

async fn check(config: &Config, query: &str) -> anyhow::Result<()> {
    let client = WikipediaClient::new(config)?;
    eprintln!("Checking {} ...", client.api_url());

    match client.search(query, 3).await {
        Ok(titles) if titles.is_empty() => {
            bail!("Wikipedia API reachable but returned no results for '{}'", query)
        }
        Ok(titles) => {
            eprintln!("Wikipedia API reachable. Top results for '{}':", query);
            for title in titles {
                eprintln!("  - {}", title);
            }
            Ok(())
        }
        Err(e) => Err(e).context("Wikipedia API check failed"),
    }
}
