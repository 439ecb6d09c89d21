//! Response helpers for the MediaWiki client
//!
//! Pure functions so the interpretation of API responses can be tested
//! without a network.

use serde_json::{Map, Value};

use crate::error::WikipediaApiError;
use crate::wikipedia::types::{ApiErrorBody, ApiPage, ApiResponse, TitleRef};
use crate::wikipedia::ProviderResult;

/// Namespace number of category pages on every wiki
const CATEGORY_NAMESPACE: i64 = 14;

/// Turn a MediaWiki `error` object into a provider error
pub fn api_failure(error: &ApiErrorBody) -> WikipediaApiError {
    WikipediaApiError::RequestFailed {
        message: if error.info.is_empty() {
            error.code.clone()
        } else {
            format!("{}: {}", error.code, error.info)
        },
    }
}

pub fn check_api_error(response: &ApiResponse) -> ProviderResult<()> {
    match &response.error {
        Some(error) => Err(api_failure(error)),
        None => Ok(()),
    }
}

/// Extract the single page of a title lookup
///
/// Missing and invalid titles both map to [`WikipediaApiError::PageNotFound`].
pub fn into_single_page(response: ApiResponse, requested: &str) -> ProviderResult<ApiPage> {
    check_api_error(&response)?;

    let page = response
        .query
        .and_then(|q| q.pages.into_iter().next())
        .ok_or_else(|| WikipediaApiError::InvalidResponse {
            message: format!("no page returned for '{}'", requested),
        })?;

    if page.missing || page.invalid {
        if let Some(reason) = &page.invalidreason {
            tracing::debug!(title = requested, reason = %reason, "Invalid title");
        }
        return Err(WikipediaApiError::PageNotFound {
            title: requested.to_string(),
        });
    }

    Ok(page)
}

/// Article titles linked from a disambiguation page, in provider order
pub fn disambiguation_options(links: &[TitleRef]) -> Vec<String> {
    links
        .iter()
        .filter(|link| link.ns == 0)
        .map(|link| link.title.clone())
        .collect()
}

/// First article link of each list item in a page's wikitext, in page order
///
/// Duplicates keep their first position.
pub fn list_item_links(wikitext: &str) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();

    for line in wikitext.lines() {
        let Some(item) = line.trim_start().strip_prefix('*') else {
            continue;
        };
        if let Some(title) = first_article_link(item) {
            if !options.contains(&title) {
                options.push(title);
            }
        }
    }

    options
}

fn first_article_link(text: &str) -> Option<String> {
    let mut rest = text;

    while let Some(start) = rest.find("[[") {
        let inner = &rest[start + 2..];
        let end = inner.find("]]")?;
        let link = &inner[..end];
        rest = &inner[end + 2..];

        let target = link.split('|').next().unwrap_or_default();
        let target = target.split('#').next().unwrap_or_default().trim();
        if let Some(title) = article_title(target) {
            return Some(title);
        }
    }

    None
}

/// Normalize a link target, rejecting namespaced and interwiki targets
fn article_title(target: &str) -> Option<String> {
    if target.is_empty() || target.starts_with(':') {
        return None;
    }
    if let Some((prefix, _)) = target.split_once(':') {
        if !prefix.contains(' ') {
            return None;
        }
    }

    let normalized = target.replace('_', " ");
    let mut chars = normalized.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Category name without its localized namespace prefix
pub fn category_name(category: &TitleRef) -> &str {
    if category.ns != CATEGORY_NAMESPACE {
        return &category.title;
    }
    category
        .title
        .split_once(':')
        .map_or(category.title.as_str(), |(_, name)| name)
}

/// Flatten a `continue` object into query parameters
pub fn continuation_params(continuation: &Map<String, Value>) -> Vec<(String, String)> {
    continuation
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}
