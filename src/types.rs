//! Shared types for a process lookup

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ScraperError;

/// Masked CNJ number, e.g. `5002739-49.2023.8.13.0604`.
static CASE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{7}-\d{2}\.\d{4}\.\d\.\d{2}\.\d{4}$").unwrap());

/// CNJ number typed without its mask.
static BARE_CASE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{7})(\d{2})(\d{4})(\d)(\d{2})(\d{4})$").unwrap());

/// Detail-page `ca` parameter.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9A-Za-z]+$").unwrap());

/// Process details as shown on the public detail page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDetails {
    pub process_number: String,
    pub distribution_date: String,
    pub judicial_class: String,
    pub subject: String,
    pub jurisdiction: String,
    pub judging_body: String,
    /// "event - date" strings, most recent first
    pub movements: Vec<String>,
}

impl ProcessDetails {
    /// True when none of the six descriptive fields were found.
    pub fn has_no_fields(&self) -> bool {
        [
            &self.process_number,
            &self.distribution_date,
            &self.judicial_class,
            &self.subject,
            &self.jurisdiction,
            &self.judging_body,
        ]
        .iter()
        .all(|f| f.is_empty())
    }
}

/// What a lookup starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseKey {
    /// Case number typed into the search form
    Number(String),
    /// Opaque detail-page token, skips the search step
    Token(String),
}

impl CaseKey {
    pub fn parse(raw: &str) -> Result<Self, ScraperError> {
        let key = raw.trim();
        if CASE_NUMBER_RE.is_match(key) {
            Ok(Self::Number(key.to_string()))
        } else if let Some(caps) = BARE_CASE_NUMBER_RE.captures(key) {
            Ok(Self::Number(format!(
                "{}-{}.{}.{}.{}.{}",
                &caps[1], &caps[2], &caps[3], &caps[4], &caps[5], &caps[6]
            )))
        } else if TOKEN_RE.is_match(key) {
            Ok(Self::Token(key.to_string()))
        } else {
            Err(ScraperError::InvalidCaseKey(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Number(n) => n,
            Self::Token(t) => t,
        }
    }
}

impl fmt::Display for CaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "number {n}"),
            Self::Token(t) => write!(f, "token {t}"),
        }
    }
}

/// Raw HTML of the page a navigator currently shows.
///
/// Kept unparsed so it can cross await points; extractors parse it on demand.
#[derive(Debug, Clone)]
pub struct DetailDocument {
    pub url: String,
    pub html: String,
}

impl DetailDocument {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_key_number() {
        let key = CaseKey::parse(" 5002739-49.2023.8.13.0604 ").unwrap();
        assert_eq!(key, CaseKey::Number("5002739-49.2023.8.13.0604".into()));
        assert_eq!(key.as_str(), "5002739-49.2023.8.13.0604");
    }

    #[test]
    fn test_case_key_unmasked_number() {
        let key = CaseKey::parse("50027394920238130604").unwrap();
        assert_eq!(key, CaseKey::Number("5002739-49.2023.8.13.0604".into()));
    }

    #[test]
    fn test_case_key_token() {
        let key = CaseKey::parse("a1b2c3d4e5f6").unwrap();
        assert_eq!(key, CaseKey::Token("a1b2c3d4e5f6".into()));
    }

    #[test]
    fn test_case_key_rejects_garbage() {
        assert!(matches!(
            CaseKey::parse(""),
            Err(ScraperError::InvalidCaseKey(_))
        ));
        assert!(matches!(
            CaseKey::parse("12/34 ; drop"),
            Err(ScraperError::InvalidCaseKey(_))
        ));
    }

    #[test]
    fn test_process_details_json_shape() {
        let details = ProcessDetails {
            process_number: "5002739-49.2023.8.13.0604".into(),
            movements: vec!["Distribuído - 01/01/2023".into()],
            ..Default::default()
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["processNumber"], "5002739-49.2023.8.13.0604");
        assert_eq!(json["judgingBody"], "");
        assert_eq!(json["movements"][0], "Distribuído - 01/01/2023");
    }

    #[test]
    fn test_has_no_fields() {
        assert!(ProcessDetails::default().has_no_fields());
        let details = ProcessDetails {
            subject: "Cobrança".into(),
            ..Default::default()
        };
        assert!(!details.has_no_fields());
    }
}
