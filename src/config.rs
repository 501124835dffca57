use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// TJMG public lookup host.
pub const DEFAULT_BASE_URL: &str = "https://pje-consulta-publica.tjmg.jus.br";

/// How a retrieval reaches the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Replay the search form over HTTP and follow the popup token.
    #[default]
    SessionReplay,
    /// Drive a headless Chromium through the search UI.
    Browser,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "session" | "session-replay" | "http" => Ok(Self::SessionReplay),
            "browser" | "chrome" | "chromium" => Ok(Self::Browser),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub strategy: Strategy,
    pub headless: bool,
    /// Upper bound for every wait-for-element poll.
    pub timeout: Duration,
    /// Per-request timeout of the HTTP session.
    pub request_timeout: Duration,
    /// Delay before every movement page advance. The portal rejects
    /// pager changes issued back to back.
    pub page_delay: Duration,
    pub chrome_path: Option<PathBuf>,
    pub debug: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            strategy: Strategy::default(),
            headless: true,
            timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            page_delay: Duration::from_secs(2),
            chrome_path: None,
            debug: false,
        }
    }
}

impl ScraperConfig {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Read overrides from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("PJE_BASE_URL") {
            config = config.with_base_url(url);
        }
        if let Some(strategy) = env_parse::<Strategy>("PJE_STRATEGY") {
            config.strategy = strategy;
        }
        if let Some(headless) = env_parse::<bool>("PJE_HEADLESS") {
            config.headless = headless;
        }
        if let Some(secs) = env_parse::<u64>("PJE_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = env_parse::<u64>("PJE_PAGE_DELAY_MS") {
            config.page_delay = Duration::from_millis(ms);
        }
        if let Some(debug) = env_parse::<bool>("PJE_DEBUG") {
            config.debug = debug;
        }
        config.chrome_path = std::env::var("CHROME_PATH")
            .or_else(|_| std::env::var("CHROMIUM_PATH"))
            .ok()
            .map(PathBuf::from);

        config
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn search_url(&self) -> String {
        format!("{}/pje/ConsultaPublica/listView.seam", self.base_url)
    }

    pub fn detail_url(&self, token: &str) -> String {
        format!(
            "{}/pje/ConsultaPublica/DetalheProcessoConsultaPublica/listView.seam?ca={}",
            self.base_url, token
        )
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
