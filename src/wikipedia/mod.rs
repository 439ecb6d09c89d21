//! Wikipedia upstream module
//!
//! Contains the provider seam used by the tool layer and the MediaWiki
//! client that implements it.

pub mod client;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod stub;

use async_trait::async_trait;

use crate::error::WikipediaApiError;
use crate::wikipedia::types::{PageContent, PageDetails};

/// Result type for upstream calls
pub type ProviderResult<T> = std::result::Result<T, WikipediaApiError>;

/// The external content source behind the tools
///
/// Implementations report ambiguity with [`WikipediaApiError::Disambiguation`],
/// unknown titles with [`WikipediaApiError::PageNotFound`] and everything else
/// with one of the remaining variants.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Titles matching `query`, best match first
    async fn search(&self, query: &str, limit: u32) -> ProviderResult<Vec<String>>;

    /// Lead section of `title`, cut to `sentences` sentences
    async fn summary(&self, title: &str, sentences: u32) -> ProviderResult<String>;

    async fn page_content(&self, title: &str) -> ProviderResult<PageContent>;

    async fn page_info(&self, title: &str) -> ProviderResult<PageDetails>;
}
