//! Configuration management for the Wikipedia MCP Server
//!
//! Handles environment variables, defaults and validation.

use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Configuration for the Wikipedia MCP Server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Language edition, e.g. `en` for en.wikipedia.org
    pub language: String,

    /// MediaWiki Action API endpoint
    pub api_url: String,

    /// User-Agent sent with every request
    pub user_agent: String,

    /// Per-request HTTP timeout
    pub timeout: Duration,
}

impl Config {
    /// Create a configuration from the process environment
    pub fn new() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Create a configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let language = lookup(env::LANGUAGE)
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| wikipedia::DEFAULT_LANGUAGE.to_string());

        let api_url = lookup(env::API_URL)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| wikipedia::api_url_for(&language));

        let user_agent = lookup(env::USER_AGENT)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(default_user_agent);

        let timeout = match lookup(env::TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
                    var: env::TIMEOUT_SECS.to_string(),
                    value: raw.clone(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(wikipedia::DEFAULT_TIMEOUT_SECS),
        };

        let config = Self {
            language,
            api_url,
            user_agent,
            timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Switch language edition
    ///
    /// The API URL follows the language only while it is still the derived
    /// default; an explicitly configured endpoint is kept.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let derived = self.api_url == wikipedia::api_url_for(&self.language);
        self.language = language.into();
        if derived {
            self.api_url = wikipedia::api_url_for(&self.language);
        }
        self
    }

    /// Point the client at a specific API endpoint
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check the configuration for values the client cannot work with
    pub fn validate(&self) -> Result<()> {
        let valid_language = !self.language.is_empty()
            && self
                .language
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_language {
            return Err(ConfigError::InvalidLanguage {
                code: self.language.clone(),
            }
            .into());
        }

        match reqwest::Url::parse(&self.api_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::InvalidApiUrl {
                    url: self.api_url.clone(),
                }
                .into())
            }
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidConfig {
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

fn default_user_agent() -> String {
    format!(
        "wikipedia-mcp-server/{} (Model Context Protocol server)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Environment variable names
pub mod env {
    pub const LANGUAGE: &str = "WIKIPEDIA_LANGUAGE";
    pub const API_URL: &str = "WIKIPEDIA_API_URL";
    pub const USER_AGENT: &str = "WIKIPEDIA_USER_AGENT";
    pub const TIMEOUT_SECS: &str = "WIKIPEDIA_TIMEOUT_SECS";
}

/// Wikipedia API constants
pub mod wikipedia {
    pub const DEFAULT_LANGUAGE: &str = "en";

    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Upper bound on `continue` round-trips for one list property
    pub const MAX_CONTINUATIONS: usize = 50;

    /// Suggestions kept from an ambiguous search
    pub const SEARCH_SUGGESTIONS: usize = 5;

    /// Suggestions kept from an ambiguous title lookup
    pub const TITLE_SUGGESTIONS: usize = 3;

    /// Categories listed by `wikipedia_page_info`
    pub const MAX_CATEGORIES: usize = 10;

    /// Action API endpoint for a language edition
    pub fn api_url_for(language: &str) -> String {
        format!("https://{}.wikipedia.org/w/api.php", language)
    }
}
