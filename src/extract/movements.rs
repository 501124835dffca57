use std::sync::LazyLock;

use scraper::{Html, Selector};

static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.rich-table tbody tr").unwrap());

static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("td.rich-table-cell.text-break.text-left span").unwrap()
});

/// Maximum of the movement pager (RichFaces input slider).
static PAGER_MAX_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".rich-inslider-right-num").unwrap());

/// Movement strings of the rendered table page, in row order.
///
/// Rows without the text cell (headers, spacer rows) are skipped. Identical
/// rows are kept: each row is its own event.
pub fn extract_movements(document: &Html) -> Vec<String> {
    document
        .select(&ROW_SEL)
        .filter_map(|row| {
            let mut cells = row.select(&CELL_SEL).peekable();
            cells.peek()?;
            Some(
                cells
                    .flat_map(|span| span.text())
                    .collect::<String>()
                    .trim()
                    .to_string(),
            )
        })
        .collect()
}

/// Number of movement pages announced by the pager, 1 without a pager.
pub fn parse_total_pages(document: &Html) -> usize {
    document
        .select(&PAGER_MAX_SEL)
        .next()
        .and_then(|el| el.text().collect::<String>().trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}
