//! Detail page extraction
//!
//! Pure functions over parsed HTML. Nothing here touches the network.

mod field;
mod movements;
mod normalize;

pub use field::{extract_field, FieldExtractor, LabelFieldExtractor, ProcessField};
pub use movements::{extract_movements, parse_total_pages};
pub use normalize::{parse_date_token, sort_descending};
