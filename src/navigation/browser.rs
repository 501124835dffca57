use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use scraper::Html;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::extract::parse_total_pages;
use crate::traits::Navigator;
use crate::types::{CaseKey, DetailDocument};

use super::find_detail_token;

const CASE_NUMBER_INPUT: &str = "input[id$='numProcesso-inputNumeroProcesso']";
const SEARCH_BUTTON: &str = "input[id='fPP:searchProcessos']";
const RESULTS_TABLE: &str = "table[id='fPP:processosTable']";
const DETAIL_LINK: &str = "table[id='fPP:processosTable'] a[title='Ver Detalhes']";
const DETAIL_READY: &str = "div.propertyView";
const PAGER_INPUT: &str = "input.rich-inslider-field-right";
/// A4J status indicator, visible while an AJAX request is in flight.
const AJAX_STATUS: &str = "span[id='_viewRoot:status.start']";

const POLL_INTERVAL: Duration = Duration::from_millis(500);
/// How long to wait for the AJAX indicator to appear after a pager change.
const TRANSITION_START_GRACE: Duration = Duration::from_secs(2);

/// Headless Chromium session driven through the public search UI.
pub struct BrowserNavigator {
    config: ScraperConfig,
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    user_data_dir: Option<PathBuf>,
    page_index: usize,
    total_pages: Option<usize>,
}

impl BrowserNavigator {
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            config,
            browser: None,
            page: None,
            handler_task: None,
            user_data_dir: None,
            page_index: 0,
            total_pages: None,
        }
    }

    fn get_page(&self) -> Result<Page, ScraperError> {
        self.page
            .clone()
            .ok_or_else(|| ScraperError::BrowserInit("browser is not open".into()))
    }

    async fn goto(page: &Page, url: &str) -> Result<(), ScraperError> {
        page.goto(url)
            .await
            .map_err(|e| ScraperError::Navigation(format!("{url}: {e}")))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| ScraperError::Navigation(format!("{url}: {e}")))?;
        Ok(())
    }

    async fn eval_bool(page: &Page, script: &str) -> Result<bool, ScraperError> {
        page.evaluate(script)
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?
            .into_value::<bool>()
            .map_err(|e| ScraperError::JavaScript(e.to_string()))
    }

    /// Poll `check` until it holds or `limit` elapses.
    async fn poll(page: &Page, check: &str, limit: Duration) -> Result<bool, ScraperError> {
        let start = Instant::now();
        loop {
            match Self::eval_bool(page, check).await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) => debug!("Wait check error: {}", e),
            }
            if start.elapsed() >= limit {
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait for `selector` to exist, failing with `Timeout` after the configured limit.
    async fn wait_for_element(
        &self,
        page: &Page,
        selector: &str,
        what: &str,
    ) -> Result<(), ScraperError> {
        let check = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        if Self::poll(page, &check, self.config.timeout).await? {
            debug!(selector, "{} present", what);
            return Ok(());
        }
        self.debug_screenshot(page, what).await;
        Err(ScraperError::Timeout(format!(
            "{what} ({selector}) not present after {:?}",
            self.config.timeout
        )))
    }

    /// Wait for the AJAX indicator to show up briefly, then to disappear.
    async fn wait_for_transition(&self, page: &Page) -> Result<(), ScraperError> {
        let sel = serde_json::to_string(AJAX_STATUS)?;
        let visible = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                const style = window.getComputedStyle(el);
                return style.display !== 'none' && style.visibility !== 'hidden';
            }})()"#
        );
        let hidden = format!("!{visible}");

        if !Self::poll(page, &visible, TRANSITION_START_GRACE).await? {
            debug!("AJAX indicator never became visible");
        }
        if Self::poll(page, &hidden, self.config.timeout).await? {
            return Ok(());
        }
        self.debug_screenshot(page, "page transition").await;
        Err(ScraperError::Timeout(format!(
            "page transition not finished after {:?}",
            self.config.timeout
        )))
    }

    async fn debug_screenshot(&self, page: &Page, what: &str) {
        if !self.config.debug {
            return;
        }
        if let Ok(screenshot) = page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
        {
            use base64::Engine;
            let encoded = base64::engine::general_purpose::STANDARD.encode(&screenshot);
            debug!("Screenshot ({}): data:image/png;base64,{}", what, encoded);
        }
    }

    async fn snapshot(page: &Page) -> Result<DetailDocument, ScraperError> {
        let html = page
            .content()
            .await
            .map_err(|e| ScraperError::Navigation(format!("page content: {e}")))?;
        let url = page.url().await.ok().flatten().unwrap_or_default();
        Ok(DetailDocument::new(url, html))
    }

    /// Follow the popup target of the first "Ver Detalhes" link in the results.
    async fn activate_detail_link(&self, page: &Page) -> Result<(), ScraperError> {
        let script = format!(
            r#"(() => {{
                const link = document.querySelector({});
                if (!link) return '';
                return link.getAttribute('onclick') || link.getAttribute('href') || '';
            }})()"#,
            serde_json::to_string(DETAIL_LINK)?
        );
        let target: String = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?
            .into_value()
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;

        if target.is_empty() {
            return Err(ScraperError::Navigation(
                "search returned no result for the case".into(),
            ));
        }
        let token = find_detail_token(&target).ok_or_else(|| {
            ScraperError::Parse(format!("detail link without popup target: {target}"))
        })?;

        info!(token = %token, "Opening detail view");
        Self::goto(page, &self.config.detail_url(&token)).await
    }

    async fn search(&self, page: &Page, case_number: &str) -> Result<(), ScraperError> {
        Self::goto(page, &self.config.search_url()).await?;
        self.wait_for_element(page, CASE_NUMBER_INPUT, "case number input")
            .await?;

        page.find_element(CASE_NUMBER_INPUT)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("case number input: {e}")))?
            .click()
            .await
            .map_err(|e| ScraperError::Navigation(format!("case number input: {e}")))?
            .type_str(case_number)
            .await
            .map_err(|e| ScraperError::Navigation(format!("typing case number: {e}")))?;
        debug!("Case number typed");

        page.find_element(SEARCH_BUTTON)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("search button: {e}")))?
            .click()
            .await
            .map_err(|e| ScraperError::Navigation(format!("search button: {e}")))?;
        debug!("Search submitted");

        self.wait_for_element(page, RESULTS_TABLE, "results table")
            .await?;
        self.activate_detail_link(page).await
    }
}

#[async_trait]
impl Navigator for BrowserNavigator {
    async fn open(&mut self) -> Result<(), ScraperError> {
        info!("Launching browser...");

        // Isolated profile per retrieval
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("pje-scraper-{unique_id}"));

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&user_data_dir)
            .window_size(1280, 800)
            .no_sandbox()
            .request_timeout(self.config.request_timeout)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        if let Some(path) = &self.config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        if !self.config.headless {
            builder = builder.with_head();
        }
        if self.config.debug {
            builder = builder.arg("--enable-logging=stderr").arg("--v=1");
        }

        let browser_config = builder.build().map_err(ScraperError::BrowserInit)?;
        self.user_data_dir = Some(user_data_dir);

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        self.handler_task = Some(tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        }));

        // Held before new_page so a failure here is still reaped by close().
        let browser = self.browser.insert(browser);
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        self.page = Some(page);
        info!("Browser ready");
        Ok(())
    }

    async fn locate(&mut self, key: &CaseKey) -> Result<DetailDocument, ScraperError> {
        let page = self.get_page()?;

        match key {
            CaseKey::Number(number) => self.search(&page, number).await?,
            CaseKey::Token(token) => Self::goto(&page, &self.config.detail_url(token)).await?,
        }
        self.wait_for_element(&page, DETAIL_READY, "detail view")
            .await?;

        self.page_index = 1;
        self.total_pages = None;
        Self::snapshot(&page).await
    }

    fn current_page_index(&self) -> usize {
        self.page_index
    }

    async fn total_pages(&mut self) -> Result<usize, ScraperError> {
        if let Some(total) = self.total_pages {
            return Ok(total);
        }
        let document = Self::snapshot(&self.get_page()?).await?;
        let total = parse_total_pages(&Html::parse_document(&document.html));
        debug!(total, "Movement pages");
        self.total_pages = Some(total);
        Ok(total)
    }

    async fn advance_to_page(&mut self, target: usize) -> Result<DetailDocument, ScraperError> {
        let page = self.get_page()?;
        let total = self.total_pages().await?;
        if !pager_move_needed(self.page_index, target, total)? {
            return Self::snapshot(&page).await;
        }

        let script = format!(
            r#"(() => {{
                const input = document.querySelector({});
                if (!input) return false;
                input.value = '{target}';
                input.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            serde_json::to_string(PAGER_INPUT)?
        );
        if !Self::eval_bool(&page, &script).await? {
            return Err(ScraperError::ElementNotFound(format!(
                "pager input ({PAGER_INPUT})"
            )));
        }

        self.wait_for_transition(&page).await?;
        self.page_index = target;
        info!(page = target, total, "Movement page loaded");
        Self::snapshot(&page).await
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        self.page = None;
        self.page_index = 0;
        self.total_pages = None;

        if let Some(mut browser) = self.browser.take() {
            info!("Closing browser...");
            if let Err(e) = browser.close().await {
                warn!("Browser close failed: {}", e);
            }
            if let Err(e) = browser.wait().await {
                warn!("Browser process wait failed: {}", e);
            }
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
        if let Some(dir) = self.user_data_dir.take() {
            if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                debug!("Failed to remove profile {:?}: {}", dir, e);
            }
        }
        Ok(())
    }
}

/// Teardown for a navigator dropped without `close()`, e.g. when the
/// retrieval future is cancelled. Chromium itself is killed on drop.
impl Drop for BrowserNavigator {
    fn drop(&mut self) {
        self.page = None;
        drop(self.browser.take());
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
        if let Some(dir) = self.user_data_dir.take() {
            warn!("Browser navigator dropped without close, removing profile {:?}", dir);
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                debug!("Failed to remove profile {:?}: {}", dir, e);
            }
        }
    }
}

/// `Ok(false)` when `target` is already shown, `Ok(true)` when the pager has to move.
fn pager_move_needed(current: usize, target: usize, total: usize) -> Result<bool, ScraperError> {
    if target == 0 || target > total {
        return Err(ScraperError::Navigation(format!(
            "page {target} out of range 1..={total}"
        )));
    }
    Ok(target != current)
}
