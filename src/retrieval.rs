//! Process retrieval orchestrator
//!
//! Drives a [`Navigator`] through one lookup, extracts the fields once and
//! the movements of every page, and turns every failure into `None`.

use std::sync::Arc;
use std::time::Duration;

use scraper::Html;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::ScraperError;
use crate::extract::{
    extract_movements, sort_descending, FieldExtractor, LabelFieldExtractor, ProcessField,
};
use crate::traits::Navigator;
use crate::types::{CaseKey, DetailDocument, ProcessDetails};

pub struct ProcessRetriever {
    extractor: Arc<dyn FieldExtractor>,
    page_delay: Duration,
}

impl Default for ProcessRetriever {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl ProcessRetriever {
    /// `page_delay` is slept before every movement page advance.
    pub fn new(page_delay: Duration) -> Self {
        Self {
            extractor: Arc::new(LabelFieldExtractor),
            page_delay,
        }
    }

    pub fn with_extractor(mut self, extractor: impl FieldExtractor + 'static) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    /// Look up one case. `None` when the case cannot be retrieved for any reason.
    ///
    /// The navigator is closed exactly once before returning.
    pub async fn fetch_process_details(
        &self,
        navigator: &mut dyn Navigator,
        key: &CaseKey,
    ) -> Option<ProcessDetails> {
        info!(key = %key, "Fetching process details");

        let outcome = self.retrieve(navigator, key).await;

        if let Err(e) = navigator.close().await {
            warn!("Failed to release navigator: {}", e);
        }

        match outcome {
            Ok(details) => {
                info!(
                    key = %key,
                    movements = details.movements.len(),
                    "Process details retrieved"
                );
                Some(details)
            }
            Err(e) => {
                error!(key = %key, "Process lookup failed: {}", e);
                None
            }
        }
    }

    async fn retrieve(
        &self,
        navigator: &mut dyn Navigator,
        key: &CaseKey,
    ) -> Result<ProcessDetails, ScraperError> {
        navigator.open().await?;
        let mut document = navigator.locate(key).await?;
        info!(url = %document.url, "Detail page loaded");

        let mut details = self.extract_fields(&document);
        if details.has_no_fields() {
            warn!(key = %key, "Detail page reached but no field label matched");
        }

        let total = navigator.total_pages().await?;
        let mut movements = Vec::new();

        for page in 1..=total {
            let found = page_movements(&document);
            debug!(
                page,
                total,
                shown = navigator.current_page_index(),
                count = found.len(),
                "Movements extracted"
            );
            movements.extend(found);

            if page < total {
                sleep(self.page_delay).await;
                document = navigator.advance_to_page(page + 1).await?;
            }
        }

        details.movements = sort_descending(movements);
        Ok(details)
    }

    fn extract_fields(&self, document: &DetailDocument) -> ProcessDetails {
        let html = Html::parse_document(&document.html);
        let field = |f: ProcessField| self.extractor.extract(&html, f);

        ProcessDetails {
            process_number: field(ProcessField::ProcessNumber),
            distribution_date: field(ProcessField::DistributionDate),
            judicial_class: field(ProcessField::JudicialClass),
            subject: field(ProcessField::Subject),
            jurisdiction: field(ProcessField::Jurisdiction),
            judging_body: field(ProcessField::JudgingBody),
            movements: Vec::new(),
        }
    }
}

fn page_movements(document: &DetailDocument) -> Vec<String> {
    extract_movements(&Html::parse_document(&document.html))
}
