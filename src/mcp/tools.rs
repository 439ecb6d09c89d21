//! Wikipedia tool handlers
//!
//! Turns validated tool requests into provider calls and renders the outcome
//! as text. Every path ends in a [`ToolResult`]; provider errors are mapped
//! here and never escape.

use std::sync::Arc;

use crate::config::wikipedia::{MAX_CATEGORIES, SEARCH_SUGGESTIONS, TITLE_SUGGESTIONS};
use crate::error::WikipediaApiError;
use crate::mcp::catalog::ToolRequest;
use crate::mcp::result::{FailureKind, ToolResult};
use crate::wikipedia::types::PageDetails;
use crate::wikipedia::ContentProvider;

/// How a lookup was keyed, which decides how ambiguity is reported
#[derive(Debug, Clone, Copy)]
enum Lookup {
    Query,
    Title,
}

/// Tool handler
pub struct WikipediaTools {
    provider: Arc<dyn ContentProvider>,
}

impl WikipediaTools {
    /// Create a new tool handler
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self { provider }
    }

    /// Run a validated request
    pub async fn execute(&self, request: ToolRequest) -> ToolResult {
        match request {
            ToolRequest::Search(args) => self.search(&args.query, args.results).await,
            ToolRequest::Summary(args) => self.summary(&args.title, args.sentences).await,
            ToolRequest::Content(args) => self.content(&args.title).await,
            ToolRequest::PageInfo(args) => self.page_info(&args.title).await,
        }
    }

    // ==================== Tool Handlers ====================

    pub async fn search(&self, query: &str, limit: u32) -> ToolResult {
        match self.provider.search(query, limit).await {
            Ok(titles) if titles.is_empty() => {
                ToolResult::text(format!("No results found for query: {}", query))
            }
            Ok(titles) => {
                let mut text = format!("Wikipedia search results for '{}':\n\n", query);
                text.push_str(&numbered(&titles));
                ToolResult::text(text)
            }
            Err(e) => failure(e, query, Lookup::Query),
        }
    }

    pub async fn summary(&self, title: &str, sentences: u32) -> ToolResult {
        match self.provider.summary(title, sentences).await {
            Ok(summary) => ToolResult::text(format!("Summary of '{}':\n\n{}", title, summary)),
            Err(e) => failure(e, title, Lookup::Title),
        }
    }

    pub async fn content(&self, title: &str) -> ToolResult {
        match self.provider.page_content(title).await {
            Ok(page) => ToolResult::text(format!(
                "Title: {}\nURL: {}\n\nContent:\n{}",
                page.title, page.url, page.body
            )),
            Err(e) => failure(e, title, Lookup::Title),
        }
    }

    pub async fn page_info(&self, title: &str) -> ToolResult {
        match self.provider.page_info(title).await {
            Ok(details) => ToolResult::text(format_page_info(&details)),
            Err(e) => failure(e, title, Lookup::Title),
        }
    }
}

fn format_page_info(details: &PageDetails) -> String {
    let categories: Vec<&str> = details
        .categories
        .iter()
        .take(MAX_CATEGORIES)
        .map(String::as_str)
        .collect();

    let mut text = format!(
        "Title: {}\nURL: {}\nPage ID: {}\nCategories: {}\nLinks count: {}\nReferences count: {}\n",
        details.title,
        details.url,
        details.page_id,
        categories.join(", "),
        details.link_count,
        details.reference_count
    );

    if let Some(first) = details.images.first() {
        text.push_str(&format!("Images: {} found\n", details.images.len()));
        text.push_str(&format!("First image: {}\n", first));
    }

    text
}

/// Map a provider error onto the failure taxonomy
fn failure(err: WikipediaApiError, input: &str, lookup: Lookup) -> ToolResult {
    match err {
        WikipediaApiError::Disambiguation { options, .. } => {
            let suggestions: Vec<String> = match lookup {
                Lookup::Query => options.into_iter().take(SEARCH_SUGGESTIONS).collect(),
                Lookup::Title => options.into_iter().take(TITLE_SUGGESTIONS).collect(),
            };

            let mut text = format!("Multiple articles found for '{}'. Did you mean:\n", input);
            match lookup {
                Lookup::Query => {
                    text.push('\n');
                    text.push_str(&numbered(&suggestions));
                }
                Lookup::Title => {
                    for suggestion in &suggestions {
                        text.push_str(&format!("- {}\n", suggestion));
                    }
                }
            }

            ToolResult::ambiguous(text, suggestions)
        }
        WikipediaApiError::PageNotFound { .. } => ToolResult::failure(
            FailureKind::NotFound,
            format!("No Wikipedia page found for '{}'", input),
        ),
        other => {
            tracing::warn!(input, error = %other, "Wikipedia request failed");
            ToolResult::failure(FailureKind::Upstream, other.to_string())
        }
    }
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}\n", i + 1, item))
        .collect()
}
