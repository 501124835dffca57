use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("browser initialization failed: {0}")]
    BrowserInit(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("unexpected markup: {0}")]
    Parse(String),

    #[error("script evaluation failed: {0}")]
    JavaScript(String),

    #[error("invalid case key: {0:?}")]
    InvalidCaseKey(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
