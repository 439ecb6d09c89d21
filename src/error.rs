//! Error types for the Wikipedia MCP Server
//!
//! This module defines the error hierarchy for all operations in the server.
//! Tool-level failures never travel through these types to the client: the
//! dispatcher turns them into [`ToolResult`](crate::mcp::result::ToolResult)
//! values. These errors cover startup, the upstream client and the transport.

use thiserror::Error;

/// Main error type for the Wikipedia MCP Server
#[derive(Error, Debug)]
pub enum WikiMcpError {
    /// Wikipedia API errors
    #[error("Wikipedia API error: {0}")]
    Wikipedia(#[from] WikipediaApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tool catalog construction errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failures reported by the upstream content provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WikipediaApiError {
    /// The title resolves to a disambiguation page
    #[error("\"{title}\" may refer to several pages")]
    Disambiguation { title: String, options: Vec<String> },

    #[error("Page not found: {title}")]
    PageNotFound { title: String },

    /// Transport, HTTP status or MediaWiki `error` object
    #[error("{message}")]
    RequestFailed { message: String },

    #[error("Unexpected API response: {message}")]
    InvalidResponse { message: String },
}

impl From<reqwest::Error> for WikipediaApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WikipediaApiError::InvalidResponse {
                message: err.to_string(),
            }
        } else {
            WikipediaApiError::RequestFailed {
                message: err.to_string(),
            }
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid language code: {code}")]
    InvalidLanguage { code: String },

    #[error("Invalid API URL: {url}")]
    InvalidApiUrl { url: String },

    #[error("Invalid value for {var}: {value}")]
    InvalidEnvVar { var: String, value: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Tool argument validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Unknown field: {field}")]
    UnknownField { field: String },

    #[error("Invalid parameter: {name} - {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Invalid arguments: {message}")]
    Malformed { message: String },
}

/// Tool catalog construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate tool name: {name}")]
    DuplicateTool { name: String },
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Malformed frame: {message}")]
    MalformedFrame { message: String },
}

/// Result type alias for Wikipedia MCP operations
pub type Result<T> = std::result::Result<T, WikiMcpError>;
