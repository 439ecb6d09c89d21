//! Wikipedia MCP Server Library
//!
//! A Model Context Protocol (MCP) server for Wikipedia.
//! Provides tools for searching articles and reading summaries, full
//! content and page metadata via the MediaWiki API.

pub mod config;
pub mod error;
pub mod mcp;
pub mod wikipedia;

use std::sync::Arc;

pub use config::Config;
pub use error::{Result, WikiMcpError};

use mcp::catalog::ToolCatalog;
use mcp::dispatcher::Dispatcher;
use mcp::server::McpServer;
use wikipedia::client::WikipediaClient;

/// Wire the production server: Wikipedia client, catalog and dispatcher
pub fn build_server(config: &Config) -> Result<McpServer> {
    let client = WikipediaClient::new(config)?;
    let catalog = Arc::new(ToolCatalog::wikipedia()?);
    Ok(McpServer::new(Dispatcher::new(catalog, Arc::new(client))))
}
