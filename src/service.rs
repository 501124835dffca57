use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use tower::Service;
use tracing::info;

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::navigation::build_navigator;
use crate::retrieval::ProcessRetriever;
use crate::traits::ProcessLookup;
use crate::types::{CaseKey, ProcessDetails};

/// Lookup request
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    /// Case number or detail-page token
    pub case_key: String,
}

impl ProcessRequest {
    pub fn new(case_key: impl Into<String>) -> Self {
        Self {
            case_key: case_key.into(),
        }
    }
}

/// tower::Service running one retrieval per call, each with its own navigator
#[derive(Clone)]
pub struct ProcessService {
    config: Arc<ScraperConfig>,
    retriever: Arc<ProcessRetriever>,
}

impl ProcessService {
    pub fn new(config: ScraperConfig) -> Self {
        let retriever = ProcessRetriever::new(config.page_delay);
        Self {
            config: Arc::new(config),
            retriever: Arc::new(retriever),
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// `Err` only for a malformed key; lookup failures are `Ok(None)`.
    pub async fn fetch(&self, case_key: &str) -> Result<Option<ProcessDetails>, ScraperError> {
        let key = CaseKey::parse(case_key)?;
        info!(key = %key, strategy = ?self.config.strategy, "Lookup request received");

        let mut navigator = build_navigator(&self.config);
        Ok(self
            .retriever
            .fetch_process_details(navigator.as_mut(), &key)
            .await)
    }
}

impl Service<ProcessRequest> for ProcessService {
    type Response = Option<ProcessDetails>;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ProcessRequest) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { service.fetch(&req.case_key).await })
    }
}

#[async_trait]
impl ProcessLookup for ProcessService {
    async fn lookup(&self, case_key: &str) -> Result<Option<ProcessDetails>, ScraperError> {
        self.fetch(case_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tower::ServiceExt;

    #[test]
    fn test_process_request_new() {
        let req = ProcessRequest::new("5002739-49.2023.8.13.0604");
        assert_eq!(req.case_key, "5002739-49.2023.8.13.0604");
    }

    #[test]
    fn test_service_keeps_config() {
        let config = ScraperConfig::default().with_page_delay(Duration::from_millis(10));
        let service = ProcessService::new(config);
        assert_eq!(service.config().page_delay, Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_invalid_key_is_error() {
        let service = ProcessService::new(ScraperConfig::default());
        let result = service.oneshot(ProcessRequest::new("not a key!")).await;
        assert!(matches!(result, Err(ScraperError::InvalidCaseKey(_))));
    }

    #[tokio::test]
    async fn test_unreachable_portal_is_none() {
        // Nothing listens on port 9 locally; the session fails to connect.
        let config = ScraperConfig::default()
            .with_base_url("http://127.0.0.1:9")
            .with_request_timeout(Duration::from_secs(2));
        let service = ProcessService::new(config);

        let result = service
            .oneshot(ProcessRequest::new("5002739-49.2023.8.13.0604"))
            .await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    #[ignore] // live portal: cargo test live_session_lookup -- --ignored --nocapture
    async fn test_live_session_lookup() {
        let service = ProcessService::new(ScraperConfig::from_env());
        let details = service
            .lookup("5002739-49.2023.8.13.0604")
            .await
            .expect("valid key");
        println!("{details:#?}");
    }
}
