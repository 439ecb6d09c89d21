//! Wikipedia API type definitions
//!
//! The `Api*` types mirror MediaWiki Action API responses (`formatversion=2`)
//! and are only used for deserialization. [`PageContent`] and [`PageDetails`]
//! are what the provider hands back to the tool layer.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Top-level Action API response
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiResponse {
    #[serde(default)]
    pub query: Option<ApiQuery>,

    /// MediaWiki reports request-level failures here with a 200 status
    #[serde(default)]
    pub error: Option<ApiErrorBody>,

    /// Continuation parameters to merge into the next request
    #[serde(default, rename = "continue")]
    pub continuation: Option<Map<String, Value>>,
}

/// The `query` block of a response
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiQuery {
    #[serde(default)]
    pub pages: Vec<ApiPage>,

    #[serde(default)]
    pub search: Vec<SearchHit>,
}

/// MediaWiki `error` object
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,

    #[serde(default)]
    pub info: String,
}

/// Top-level `action=parse` response
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ParseResponse {
    #[serde(default)]
    pub parse: Option<ParsedPage>,

    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// The `parse` block for `prop=wikitext`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ParsedPage {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub wikitext: String,
}

/// A `list=search` hit
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub title: String,
}

/// One entry of `query.pages`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiPage {
    #[serde(default)]
    pub pageid: Option<u64>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub missing: bool,

    #[serde(default)]
    pub invalid: bool,

    #[serde(default)]
    pub invalidreason: Option<String>,

    /// Canonical URL (`prop=info&inprop=url`)
    #[serde(default)]
    pub fullurl: Option<String>,

    /// Plain-text extract (`prop=extracts&explaintext=1`)
    #[serde(default)]
    pub extract: Option<String>,

    #[serde(default)]
    pub pageprops: Option<Map<String, Value>>,

    #[serde(default)]
    pub links: Vec<TitleRef>,

    #[serde(default)]
    pub extlinks: Vec<ExternalLink>,

    #[serde(default)]
    pub categories: Vec<TitleRef>,

    #[serde(default)]
    pub images: Vec<TitleRef>,

    #[serde(default)]
    pub imageinfo: Vec<ImageInfo>,
}

impl ApiPage {
    /// Whether MediaWiki flagged this page as a disambiguation page
    pub fn is_disambiguation(&self) -> bool {
        self.pageprops
            .as_ref()
            .is_some_and(|props| props.contains_key("disambiguation"))
    }
}

/// Namespaced title reference used by links, categories and images
#[derive(Debug, Clone, Deserialize)]
pub struct TitleRef {
    #[serde(default)]
    pub ns: i64,

    pub title: String,
}

/// External link (`prop=extlinks`)
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalLink {
    pub url: String,
}

/// File information (`prop=imageinfo&iiprop=url`)
#[derive(Debug, Clone, Deserialize)]
pub struct ImageInfo {
    #[serde(default)]
    pub url: Option<String>,
}

/// Full article text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageContent {
    pub title: String,
    pub url: String,
    pub body: String,
}

/// Page metadata for `wikipedia_page_info`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageDetails {
    pub title: String,
    pub url: String,
    pub page_id: u64,

    /// Category names without the namespace prefix
    pub categories: Vec<String>,

    pub link_count: usize,
    pub reference_count: usize,

    /// Image references, first entry resolved to a URL when possible
    pub images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_deserialization() {
        let json = r#"{"parse": {"title": "Mercury", "pageid": 100, "wikitext": "* [[Mercury (planet)]]"}}"#;
        let response: ParseResponse = serde_json::from_str(json).unwrap();
        let parsed = response.parse.unwrap();
        assert_eq!(parsed.title, "Mercury");
        assert_eq!(parsed.wikitext, "* [[Mercury (planet)]]");
        assert!(response.error.is_none());
    }

    #[test]
    fn test_page_deserialization() {
        let json = r#"{
            "pageid": 23862,
            "ns": 0,
            "title": "Python (programming language)",
            "fullurl": "https://en.wikipedia.org/wiki/Python_(programming_language)",
            "extract": "Python is a high-level programming language."
        }"#;

        let page: ApiPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.pageid, Some(23862));
        assert!(!page.missing);
        assert!(!page.is_disambiguation());
        assert!(page.fullurl.unwrap().ends_with("Python_(programming_language)"));
    }

    #[test]
    fn test_missing_page_deserialization() {
        let json = r#"{"ns": 0, "title": "Zzzzz no such page", "missing": true}"#;
        let page: ApiPage = serde_json::from_str(json).unwrap();
        assert!(page.missing);
        assert_eq!(page.pageid, None);
    }

    #[test]
    fn test_disambiguation_flag() {
        let json = r#"{"pageid": 1, "title": "Mercury", "pageprops": {"disambiguation": ""}}"#;
        let page: ApiPage = serde_json::from_str(json).unwrap();
        assert!(page.is_disambiguation());
    }

    #[test]
    fn test_response_with_error_and_continue() {
        let json = r#"{
            "error": {"code": "maxlag", "info": "Waiting for a database server"},
            "continue": {"plcontinue": "736|0|Foo", "continue": "||"}
        }"#;

        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.error.unwrap().code, "maxlag");
        let cont = response.continuation.unwrap();
        assert_eq!(cont["plcontinue"], "736|0|Foo");
        assert!(response.query.is_none());
    }
}
