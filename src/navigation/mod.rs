//! Navigation strategies
//!
//! - [`SessionNavigator`]: replays the search form over HTTP
//! - [`BrowserNavigator`]: drives Chromium through the search UI

mod browser;
mod session;

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{ScraperConfig, Strategy};
use crate::traits::Navigator;

pub use browser::BrowserNavigator;
pub use session::{build_search_form, extract_form_fields, FormFields, SessionNavigator};

/// Popup URL embedded in the "Ver Detalhes" link of a search result.
static DETAIL_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"DetalheProcessoConsultaPublica/listView\.seam\?ca=([0-9A-Za-z]+)").unwrap()
});

/// Detail-page token from a search response or a link's `onclick`.
pub fn find_detail_token(body: &str) -> Option<String> {
    DETAIL_TOKEN_RE
        .captures(body)
        .map(|caps| caps[1].to_string())
}

/// Fresh navigator for the configured strategy. Each retrieval gets its own.
pub fn build_navigator(config: &ScraperConfig) -> Box<dyn Navigator> {
    match config.strategy {
        Strategy::SessionReplay => Box::new(SessionNavigator::new(config.clone())),
        Strategy::Browser => Box::new(BrowserNavigator::new(config.clone())),
    }
}
