//! Canned provider for unit tests

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::wikipedia::types::{PageContent, PageDetails};
use crate::wikipedia::{ContentProvider, ProviderResult};

pub(crate) struct StubProvider {
    search: ProviderResult<Vec<String>>,
    summary: ProviderResult<String>,
    content: ProviderResult<PageContent>,
    info: ProviderResult<PageDetails>,
    panics: bool,
    calls: AtomicUsize,
}

impl Default for StubProvider {
    fn default() -> Self {
        Self {
            search: Ok(Vec::new()),
            summary: Ok(String::new()),
            content: Ok(PageContent::default()),
            info: Ok(PageDetails::default()),
            panics: false,
            calls: AtomicUsize::new(0),
        }
    }
}

impl StubProvider {
    pub fn with_search(mut self, result: ProviderResult<Vec<String>>) -> Self {
        self.search = result;
        self
    }

    pub fn with_summary(mut self, result: ProviderResult<String>) -> Self {
        self.summary = result;
        self
    }

    pub fn with_content(mut self, result: ProviderResult<PageContent>) -> Self {
        self.content = result;
        self
    }

    pub fn with_info(mut self, result: ProviderResult<PageDetails>) -> Self {
        self.info = result;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panics {
            panic!("stub provider exploded");
        }
    }
}

#[async_trait]
impl ContentProvider for StubProvider {
    async fn search(&self, _query: &str, limit: u32) -> ProviderResult<Vec<String>> {
        self.record();
        self.search
            .clone()
            .map(|titles| titles.into_iter().take(limit as usize).collect())
    }

    async fn summary(&self, _title: &str, _sentences: u32) -> ProviderResult<String> {
        self.record();
        self.summary.clone()
    }

    async fn page_content(&self, _title: &str) -> ProviderResult<PageContent> {
        self.record();
        self.content.clone()
    }

    async fn page_info(&self, _title: &str) -> ProviderResult<PageDetails> {
        self.record();
        self.info.clone()
    }
}
