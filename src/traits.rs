use async_trait::async_trait;

use crate::error::ScraperError;
use crate::types::{CaseKey, DetailDocument, ProcessDetails};

/// Reaches the detail page of one case and walks its movement pages.
///
/// One navigator owns one session or browser and serves a single retrieval.
#[async_trait]
pub trait Navigator: Send {
    /// Acquire the session / browser
    async fn open(&mut self) -> Result<(), ScraperError>;

    /// Navigate to the detail page of `key`
    async fn locate(&mut self, key: &CaseKey) -> Result<DetailDocument, ScraperError>;

    /// 1-based index of the movement page currently shown
    fn current_page_index(&self) -> usize;

    /// Movement page count, 1 when the page has no pager
    async fn total_pages(&mut self) -> Result<usize, ScraperError>;

    /// Switch the movement table to `page` and return the refreshed document
    async fn advance_to_page(&mut self, page: usize) -> Result<DetailDocument, ScraperError>;

    /// Release the resource. Safe to call after a failed or missing `open`.
    async fn close(&mut self) -> Result<(), ScraperError>;
}

/// Case lookup as seen by the HTTP boundary
#[async_trait]
pub trait ProcessLookup: Send + Sync {
    /// `Ok(None)` when the case could not be retrieved
    async fn lookup(&self, case_key: &str) -> Result<Option<ProcessDetails>, ScraperError>;
}
