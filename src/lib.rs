//! PJe public lookup scraper
//!
//! - Resolves a case number (or detail-page token) to its detail page, either
//!   by replaying the search form over HTTP or by driving Chromium
//! - Extracts the descriptive fields and every movement page
//! - Serves lookups over HTTP
//!
//! # Example
//!
//! ```rust,ignore
//! use pje_scraper::{ProcessRequest, ProcessService, ScraperConfig, Strategy};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScraperConfig::new(Strategy::Browser).with_headless(false);
//!     let mut service = ProcessService::new(config);
//!
//!     let details = service
//!         .call(ProcessRequest::new("5002739-49.2023.8.13.0604"))
//!         .await
//!         .unwrap();
//!     println!("{:?}", details.map(|d| d.movements));
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod navigation;
pub mod pagination;
pub mod retrieval;
pub mod service;
pub mod traits;
pub mod types;
pub mod web;

pub use config::{ScraperConfig, Strategy};
pub use error::ScraperError;
pub use navigation::{build_navigator, BrowserNavigator, SessionNavigator};
pub use retrieval::ProcessRetriever;
pub use service::{ProcessRequest, ProcessService};
pub use traits::{Navigator, ProcessLookup};
pub use types::{CaseKey, DetailDocument, ProcessDetails};
