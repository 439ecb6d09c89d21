//! Wikipedia API client
//!
//! High-level client for the MediaWiki Action API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::wikipedia::MAX_CONTINUATIONS;
use crate::config::Config;
use crate::error::{Result, WikipediaApiError};
use crate::wikipedia::types::*;
use crate::wikipedia::utils::{
    api_failure, category_name, check_api_error, continuation_params, disambiguation_options,
    into_single_page, list_item_links,
};
use crate::wikipedia::{ContentProvider, ProviderResult};

/// Parameters sent with every request
const FORMAT_PARAMS: &[(&str, &str)] = &[("format", "json"), ("formatversion", "2")];

const QUERY_PARAMS: &[(&str, &str)] = &[("action", "query"), ("redirects", "1")];

const PARSE_PARAMS: &[(&str, &str)] = &[("action", "parse"), ("prop", "wikitext")];

/// Wikipedia API client
pub struct WikipediaClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// Action API endpoint
    api_url: String,
}

impl WikipediaClient {
    /// Create a new Wikipedia client
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_url: config.api_url.clone(),
        })
    }

    /// Endpoint this client talks to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Send one GET request and decode the JSON body
    async fn get<T: DeserializeOwned>(
        &self,
        action: &[(&str, &str)],
        params: &[(String, String)],
    ) -> ProviderResult<T> {
        tracing::debug!(url = %self.api_url, ?action, ?params, "Wikipedia API request");

        let response = self
            .http_client
            .get(&self.api_url)
            .query(FORMAT_PARAMS)
            .query(action)
            .query(params)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(WikipediaApiError::RequestFailed {
                message: format!("Wikipedia API request failed ({}): {}", status, text),
            })
        }
    }

    /// Run one `action=query` request
    async fn query(&self, params: &[(String, String)]) -> ProviderResult<ApiResponse> {
        self.get(QUERY_PARAMS, params).await
    }

    /// Source wikitext of a page
    async fn wikitext(&self, page_id: u64) -> ProviderResult<String> {
        let page_id = page_id.to_string();
        let response: ParseResponse = self
            .get(PARSE_PARAMS, &params(&[("pageid", page_id.as_str())]))
            .await?;

        if let Some(error) = &response.error {
            return Err(api_failure(error));
        }
        Ok(response.parse.map(|p| p.wikitext).unwrap_or_default())
    }

    /// Candidate articles of a disambiguation page, in the order the page lists them
    ///
    /// Falls back to the page's article links when the wikitext has no list
    /// items or cannot be fetched.
    async fn disambiguation(&self, page_id: u64) -> ProviderResult<Vec<String>> {
        match self.wikitext(page_id).await {
            Ok(wikitext) => {
                let options = list_item_links(&wikitext);
                if !options.is_empty() {
                    return Ok(options);
                }
            }
            Err(e) => tracing::debug!(page_id, error = %e, "Could not fetch disambiguation wikitext"),
        }

        let links = self
            .collect_list(page_id, "links", &[("plnamespace", "0"), ("pllimit", "max")], |p| {
                p.links
            })
            .await?;
        Ok(disambiguation_options(&links))
    }

    /// Resolve a title to a single article, following redirects
    ///
    /// Disambiguation pages are reported as errors carrying the articles they
    /// link to.
    async fn lookup(&self, title: &str, prop: &str, extra: &[(&str, &str)]) -> ProviderResult<ApiPage> {
        let mut request = params(&[
            ("titles", title),
            ("prop", prop),
            ("inprop", "url"),
            ("ppprop", "disambiguation"),
        ]);
        request.extend(params(extra));

        let page = into_single_page(self.query(&request).await?, title)?;

        if page.is_disambiguation() {
            let options = self.disambiguation(page_id(&page)?).await?;

            tracing::debug!(title, options = options.len(), "Title is ambiguous");
            return Err(WikipediaApiError::Disambiguation {
                title: page.title,
                options,
            });
        }

        Ok(page)
    }

    /// Collect a list property of one page across `continue` round-trips
    async fn collect_list<T, F>(
        &self,
        page_id: u64,
        prop: &str,
        extra: &[(&str, &str)],
        take: F,
    ) -> ProviderResult<Vec<T>>
    where
        T: Send,
        F: Fn(ApiPage) -> Vec<T> + Send,
    {
        let page_id = page_id.to_string();
        let mut items = Vec::new();
        let mut continuation = Vec::new();

        for _ in 0..MAX_CONTINUATIONS {
            let mut request = params(&[("pageids", page_id.as_str()), ("prop", prop)]);
            request.extend(params(extra));
            request.append(&mut continuation);

            let response = self.query(&request).await?;
            check_api_error(&response)?;

            if let Some(page) = response.query.and_then(|q| q.pages.into_iter().next()) {
                items.extend(take(page));
            }

            match response.continuation {
                Some(next) => continuation = continuation_params(&next),
                None => return Ok(items),
            }
        }

        tracing::warn!(page_id = %page_id, prop, collected = items.len(), "Continuation limit reached");
        Ok(items)
    }

    /// Resolve a `File:` title to its upload URL
    async fn image_url(&self, file_title: &str) -> ProviderResult<Option<String>> {
        let response = self
            .query(&params(&[
                ("titles", file_title),
                ("prop", "imageinfo"),
                ("iiprop", "url"),
            ]))
            .await?;
        check_api_error(&response)?;

        Ok(response
            .query
            .and_then(|q| q.pages.into_iter().next())
            .and_then(|p| p.imageinfo.into_iter().next())
            .and_then(|info| info.url))
    }
}

#[async_trait]
impl ContentProvider for WikipediaClient {
    async fn search(&self, query: &str, limit: u32) -> ProviderResult<Vec<String>> {
        let limit = limit.to_string();
        let response = self
            .query(&params(&[
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("srprop", ""),
            ]))
            .await?;
        check_api_error(&response)?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn summary(&self, title: &str, sentences: u32) -> ProviderResult<String> {
        let sentences = sentences.to_string();
        let page = self
            .lookup(
                title,
                "info|pageprops|extracts",
                &[
                    ("explaintext", "1"),
                    ("exintro", "1"),
                    ("exsentences", sentences.as_str()),
                ],
            )
            .await?;

        Ok(page.extract.unwrap_or_default().trim().to_string())
    }

    async fn page_content(&self, title: &str) -> ProviderResult<PageContent> {
        let page = self
            .lookup(title, "info|pageprops|extracts", &[("explaintext", "1")])
            .await?;

        Ok(PageContent {
            url: page.fullurl.unwrap_or_default(),
            body: page.extract.unwrap_or_default(),
            title: page.title,
        })
    }

    async fn page_info(&self, title: &str) -> ProviderResult<PageDetails> {
        let page = self.lookup(title, "info|pageprops", &[]).await?;
        let page_id = page_id(&page)?;

        let categories = self
            .collect_list(page_id, "categories", &[("cllimit", "max")], |p| {
                p.categories
                    .iter()
                    .map(|c| category_name(c).to_string())
                    .collect()
            })
            .await?;

        let links = self
            .collect_list(page_id, "links", &[("plnamespace", "0"), ("pllimit", "max")], |p| {
                p.links
            })
            .await?;

        let references = self
            .collect_list(page_id, "extlinks", &[("ellimit", "max")], |p| p.extlinks)
            .await?;

        let mut images = self
            .collect_list(page_id, "images", &[("imlimit", "max")], |p| {
                p.images.into_iter().map(|i| i.title).collect()
            })
            .await?;

        if let Some(first) = images.first().cloned() {
            match self.image_url(&first).await {
                Ok(Some(url)) => images[0] = url,
                Ok(None) => {}
                Err(e) => tracing::debug!(file = %first, error = %e, "Could not resolve image URL"),
            }
        }

        Ok(PageDetails {
            title: page.title,
            url: page.fullurl.unwrap_or_default(),
            page_id,
            categories,
            link_count: links.len(),
            reference_count: references.len(),
            images,
        })
    }
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn page_id(page: &ApiPage) -> ProviderResult<u64> {
    page.pageid.ok_or_else(|| WikipediaApiError::InvalidResponse {
        message: format!("page '{}' has no id", page.title),
    })
}
