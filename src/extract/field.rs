use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

static LABEL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("label").unwrap());

/// Class of the container that groups a label with its value.
const PROPERTY_VIEW_CLASS: &str = "propertyView";

/// Descriptive fields of the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessField {
    ProcessNumber,
    DistributionDate,
    JudicialClass,
    Subject,
    Jurisdiction,
    JudgingBody,
}

impl ProcessField {
    pub const ALL: [ProcessField; 6] = [
        Self::ProcessNumber,
        Self::DistributionDate,
        Self::JudicialClass,
        Self::Subject,
        Self::Jurisdiction,
        Self::JudgingBody,
    ];

    /// Label text shown next to the value on the portal.
    pub fn label(self) -> &'static str {
        match self {
            Self::ProcessNumber => "Número Processo",
            Self::DistributionDate => "Data da Distribuição",
            Self::JudicialClass => "Classe Judicial",
            Self::Subject => "Assunto",
            Self::Jurisdiction => "Jurisdição",
            Self::JudgingBody => "Órgão Julgador",
        }
    }

    /// Where the value sits inside the property view.
    pub fn value_selector(self) -> &'static str {
        match self {
            Self::ProcessNumber | Self::Subject => ".value .col-sm-12",
            _ => ".value",
        }
    }
}

/// Maps a field to its text on a parsed detail page.
///
/// Implementations must not fail: a field that cannot be located is `""`.
pub trait FieldExtractor: Send + Sync {
    fn extract(&self, document: &Html, field: ProcessField) -> String;
}

/// Finds fields by label text and `propertyView` proximity.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelFieldExtractor;

impl FieldExtractor for LabelFieldExtractor {
    fn extract(&self, document: &Html, field: ProcessField) -> String {
        extract_field(document, field.label(), field.value_selector())
    }
}

/// Text of the value next to the first `<label>` containing `label`.
///
/// Walks from the label to the closest `propertyView` ancestor and reads every
/// element matching `value_selector` inside it. Returns `""` when any step
/// comes up empty.
pub fn extract_field(document: &Html, label: &str, value_selector: &str) -> String {
    let value_sel = match Selector::parse(value_selector) {
        Ok(sel) => sel,
        Err(e) => {
            warn!(selector = value_selector, "Invalid value selector: {}", e);
            return String::new();
        }
    };

    let Some(label_el) = document
        .select(&LABEL_SEL)
        .find(|el| el.text().collect::<String>().contains(label))
    else {
        debug!(label, "Label not found");
        return String::new();
    };

    let Some(container) = label_el
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().classes().any(|c| c == PROPERTY_VIEW_CLASS))
    else {
        debug!(label, "Label has no propertyView container");
        return String::new();
    };

    container
        .select(&value_sel)
        .flat_map(|el| el.text())
        .collect::<String>()
        .trim()
        .to_string()
}
