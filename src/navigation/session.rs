use std::sync::LazyLock;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::Navigator;
use crate::types::{CaseKey, DetailDocument};

use super::find_detail_token;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Inputs of the search form (`fPP`).
static FORM_INPUT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form[id='fPP'] input").unwrap());

const VIEW_STATE_FIELD: &str = "javax.faces.ViewState";
const CASE_NUMBER_FIELD: &str =
    "fPP:numProcesso-inputNumeroProcessoDecoration:numProcesso-inputNumeroProcesso";
const SEARCH_BUTTON_FIELD: &str = "fPP:searchProcessos";

/// Search form fields, in page order. The portal rejects a POST that does not
/// round-trip all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(pub Vec<(String, String)>);

impl FormFields {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn set(&mut self, name: &str, value: &str) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = value.to_string(),
            None => self.0.push((name.to_string(), value.to_string())),
        }
    }
}

/// Collect the search form inputs from the landing page.
///
/// Buttons are left out (only sent when clicked); radios and checkboxes only
/// when checked. A page without a ViewState cannot be posted back.
pub fn extract_form_fields(body: &str) -> Result<FormFields, ScraperError> {
    let html = Html::parse_document(body);
    let mut fields = FormFields::default();

    for input in html.select(&FORM_INPUT_SEL) {
        let name = match input.attr("name") {
            Some(n) if !n.is_empty() => n,
            _ => continue,
        };
        let input_type = input.attr("type").unwrap_or("text").to_ascii_lowercase();

        if matches!(input_type.as_str(), "submit" | "image" | "button") {
            continue;
        }
        if matches!(input_type.as_str(), "radio" | "checkbox") && input.attr("checked").is_none() {
            continue;
        }

        fields
            .0
            .push((name.to_string(), input.attr("value").unwrap_or_default().to_string()));
    }

    if fields.get(VIEW_STATE_FIELD).is_none() {
        return Err(ScraperError::Parse(format!(
            "search form has no {VIEW_STATE_FIELD}"
        )));
    }

    Ok(fields)
}

/// POST body of an AJAX search for `case_number`.
pub fn build_search_form(fields: &FormFields, case_number: &str) -> Vec<(String, String)> {
    let mut form = fields.clone();
    form.set("AJAXREQUEST", "_viewRoot");
    form.set("fPP", "fPP");
    form.set(CASE_NUMBER_FIELD, case_number);
    form.set(SEARCH_BUTTON_FIELD, SEARCH_BUTTON_FIELD);
    form.set("AJAX:EVENTS_COUNT", "1");
    form.0
}

/// Anonymous HTTP session against the lookup portal.
///
/// The detail page carries every movement, so there is a single page.
pub struct SessionNavigator {
    config: ScraperConfig,
    client: Option<Client>,
    current: Option<DetailDocument>,
    page_index: usize,
}

impl SessionNavigator {
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            config,
            client: None,
            current: None,
            page_index: 0,
        }
    }

    fn client(&self) -> Result<&Client, ScraperError> {
        self.client
            .as_ref()
            .ok_or_else(|| ScraperError::Navigation("session is not open".into()))
    }

    async fn fetch(request: RequestBuilder, what: &str) -> Result<String, ScraperError> {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::Navigation(format!("{what} returned {status}")));
        }
        Ok(resp.text().await?)
    }

    /// Run the search form and return the detail token of the first hit.
    async fn search(&self, case_number: &str) -> Result<String, ScraperError> {
        let client = self.client()?;
        let search_url = self.config.search_url();

        let landing = Self::fetch(client.get(&search_url), "search page").await?;
        let fields = extract_form_fields(&landing)?;
        debug!(count = fields.0.len(), "Search form fields collected");

        let form = build_search_form(&fields, case_number);
        let results = Self::fetch(client.post(&search_url).form(&form), "search").await?;

        find_detail_token(&results).ok_or_else(|| {
            ScraperError::Navigation(format!(
                "no detail link for {case_number}: case not found or search form changed"
            ))
        })
    }
}

#[async_trait]
impl Navigator for SessionNavigator {
    async fn open(&mut self) -> Result<(), ScraperError> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(self.config.request_timeout)
            .build()?;
        self.client = Some(client);
        debug!("HTTP session opened");
        Ok(())
    }

    async fn locate(&mut self, key: &CaseKey) -> Result<DetailDocument, ScraperError> {
        let token = match key {
            CaseKey::Number(number) => self.search(number).await?,
            CaseKey::Token(token) => token.clone(),
        };
        info!(token = %token, "Detail token resolved");

        let url = self.config.detail_url(&token);
        let html = Self::fetch(self.client()?.get(&url), "detail page").await?;

        let document = DetailDocument::new(url, html);
        self.current = Some(document.clone());
        self.page_index = 1;
        Ok(document)
    }

    fn current_page_index(&self) -> usize {
        self.page_index
    }

    async fn total_pages(&mut self) -> Result<usize, ScraperError> {
        Ok(1)
    }

    async fn advance_to_page(&mut self, page: usize) -> Result<DetailDocument, ScraperError> {
        match (&self.current, page) {
            (Some(document), 1) => Ok(document.clone()),
            (None, _) => Err(ScraperError::Navigation("no detail page loaded".into())),
            (Some(_), _) => Err(ScraperError::Navigation(format!(
                "page {page} requested but the session serves a single page"
            ))),
        }
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        if self.client.take().is_some() {
            debug!("HTTP session discarded");
        }
        self.current = None;
        self.page_index = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDING: &str = r#"<html><body>
        <form id="fPP" name="fPP" method="post" action="/pje/ConsultaPublica/listView.seam">
            <input type="hidden" name="fPP" value="fPP" />
            <input type="text" name="fPP:numProcesso-inputNumeroProcessoDecoration:numProcesso-inputNumeroProcesso" value="" />
            <input type="radio" name="mascaraProcessoReferenciaRadio" value="on" checked="checked" />
            <input type="radio" name="mascaraProcessoReferenciaRadio" value="off" />
            <input type="checkbox" name="fPP:somenteAtivos" value="true" />
            <input type="text" name="fPP:dnp:nomeParte" value="" />
            <input type="button" name="fPP:searchProcessos" value="PESQUISAR" />
            <input type="hidden" name="javax.faces.ViewState" value="j_id3" />
        </form>
        <form id="other"><input type="hidden" name="unrelated" value="x" /></form>
    </body></html>"#;

    #[test]
    fn test_extract_form_fields() {
        let fields = extract_form_fields(LANDING).unwrap();
        let names: Vec<&str> = fields.0.iter().map(|(n, _)| n.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "fPP",
                CASE_NUMBER_FIELD,
                "mascaraProcessoReferenciaRadio",
                "fPP:dnp:nomeParte",
                VIEW_STATE_FIELD,
            ]
        );
        assert_eq!(fields.get("mascaraProcessoReferenciaRadio"), Some("on"));
        assert_eq!(fields.get(VIEW_STATE_FIELD), Some("j_id3"));
    }

    #[test]
    fn test_extract_form_fields_without_view_state() {
        let body = r#"<form id="fPP"><input type="hidden" name="fPP" value="fPP" /></form>"#;
        assert!(matches!(
            extract_form_fields(body),
            Err(ScraperError::Parse(_))
        ));
    }

    #[test]
    fn test_build_search_form() {
        let fields = extract_form_fields(LANDING).unwrap();
        let form = build_search_form(&fields, "5002739-49.2023.8.13.0604");
        let get = |name: &str| {
            form.iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get(CASE_NUMBER_FIELD), Some("5002739-49.2023.8.13.0604"));
        assert_eq!(get(VIEW_STATE_FIELD), Some("j_id3"));
        assert_eq!(get("AJAXREQUEST"), Some("_viewRoot"));
        assert_eq!(get(SEARCH_BUTTON_FIELD), Some(SEARCH_BUTTON_FIELD));
        assert_eq!(get("AJAX:EVENTS_COUNT"), Some("1"));
        // Overrides replace in place instead of duplicating.
        assert_eq!(form.iter().filter(|(n, _)| n == CASE_NUMBER_FIELD).count(), 1);
        assert_eq!(form.iter().filter(|(n, _)| n == "fPP").count(), 1);
    }

    #[tokio::test]
    async fn test_locate_requires_open_session() {
        let mut navigator = SessionNavigator::new(ScraperConfig::default());
        let key = CaseKey::Token("abc".into());
        assert!(matches!(
            navigator.locate(&key).await,
            Err(ScraperError::Navigation(_))
        ));
    }

    #[tokio::test]
    async fn test_single_page() {
        let mut navigator = SessionNavigator::new(ScraperConfig::default());
        assert_eq!(navigator.total_pages().await.unwrap(), 1);

        navigator.current = Some(DetailDocument::new("u", "<html></html>"));
        navigator.page_index = 1;
        assert_eq!(navigator.advance_to_page(1).await.unwrap().url, "u");
        assert!(navigator.advance_to_page(2).await.is_err());
    }

    #[tokio::test]
    async fn test_close_without_open() {
        let mut navigator = SessionNavigator::new(ScraperConfig::default());
        navigator.close().await.unwrap();
        assert_eq!(navigator.current_page_index(), 0);
    }
}
