use crate::adapters::memory_source::RowSnapshot;
use crate::core::extract::FieldSelectors;
use crate::domain::ports::RowSource;
use crate::utils::error::{Result, SummaryError};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Selectors describing the grid and its pager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSelectors {
    pub rows: String,
    pub page_token: String,
    pub next_control: String,
    pub disabled_class: String,
    /// Element holding one value inside a multi-box cell.
    pub box_item: String,
}

impl Default for GridSelectors {
    fn default() -> Self {
        Self {
            rows: "table tbody tr".to_string(),
            page_token: "#orderitemGrid_page-current".to_string(),
            next_control: ".admin__data-grid-pager .action-next".to_string(),
            disabled_class: "disabled".to_string(),
            box_item: "b > u".to_string(),
        }
    }
}

pub fn compile_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| SummaryError::SelectorError {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

struct Compiled {
    rows: Selector,
    page_token: Selector,
    next_control: Selector,
    box_item: Selector,
    fields: Vec<(String, Selector)>,
    repeated: Vec<(String, Selector)>,
}

impl Compiled {
    fn new(grid: &GridSelectors, fields: &FieldSelectors) -> Result<Self> {
        let single = [
            &fields.order_id,
            &fields.ordered_qty,
            &fields.packed_qty,
            &fields.price,
        ];
        let repeated: Vec<&String> = if fields.tracks_boxes() {
            vec![&fields.box_id, &fields.box_size]
        } else {
            Vec::new()
        };

        Ok(Self {
            rows: compile_selector(&grid.rows)?,
            page_token: compile_selector(&grid.page_token)?,
            next_control: compile_selector(&grid.next_control)?,
            box_item: compile_selector(&grid.box_item)?,
            fields: compile_named(single)?,
            repeated: compile_named(repeated)?,
        })
    }
}

fn compile_named<'a>(names: impl IntoIterator<Item = &'a String>) -> Result<Vec<(String, Selector)>> {
    let mut compiled = Vec::new();
    for name in names {
        compiled.push((name.clone(), compile_selector(name)?));
    }
    Ok(compiled)
}

#[derive(Debug, Clone)]
struct SnapshotPage {
    name: String,
    token: String,
    rows: Vec<RowSnapshot>,
    next_enabled: Option<bool>,
}

/// A [`RowSource`] over saved HTML pages of the grid, shown in file name order.
///
/// Each page is parsed once up front; rows are read through the configured
/// selectors into owned snapshots.
#[derive(Debug)]
pub struct HtmlPageSource {
    pages: Vec<SnapshotPage>,
    current: usize,
}

impl HtmlPageSource {
    /// Loads every `.html`/`.htm` file in `dir`.
    pub fn from_dir(
        dir: impl AsRef<Path>,
        grid: &GridSelectors,
        fields: &FieldSelectors,
    ) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(SummaryError::ConfigValidationError {
                field: "source.pages_dir".to_string(),
                message: format!("no HTML pages found in {}", dir.display()),
            });
        }

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let html = std::fs::read_to_string(&path)?;
            documents.push((name, html));
        }

        tracing::debug!("Loaded {} page snapshots from {}", documents.len(), dir.display());
        Self::from_documents(documents, grid, fields)
    }

    /// Builds a source from `(name, html)` pairs, in the given order.
    pub fn from_documents<N, H>(
        documents: impl IntoIterator<Item = (N, H)>,
        grid: &GridSelectors,
        fields: &FieldSelectors,
    ) -> Result<Self>
    where
        N: Into<String>,
        H: AsRef<str>,
    {
        let compiled = Compiled::new(grid, fields)?;
        let pages = documents
            .into_iter()
            .map(|(name, html)| parse_page(name.into(), html.as_ref(), &compiled, grid))
            .collect();

        Ok(Self { pages, current: 0 })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page_name(&self) -> Option<&str> {
        self.pages.get(self.current).map(|p| p.name.as_str())
    }
}

fn parse_page(name: String, html: &str, compiled: &Compiled, grid: &GridSelectors) -> SnapshotPage {
    let document = Html::parse_document(html);

    let token = document
        .select(&compiled.page_token)
        .next()
        .and_then(|el| {
            el.value()
                .attr("value")
                .map(str::to_string)
                .or_else(|| Some(element_text(&el)))
        })
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| name.clone());

    let next_enabled = document.select(&compiled.next_control).next().map(|el| {
        let disabled_class = el.value().classes().any(|c| c == grid.disabled_class);
        !disabled_class && el.value().attr("disabled").is_none()
    });

    let rows = document
        .select(&compiled.rows)
        .map(|row| snapshot_row(&row, compiled))
        .collect();

    SnapshotPage {
        name,
        token,
        rows,
        next_enabled,
    }
}

fn snapshot_row(row: &ElementRef<'_>, compiled: &Compiled) -> RowSnapshot {
    let mut snapshot = RowSnapshot::new();

    for (name, selector) in &compiled.fields {
        if let Some(cell) = row.select(selector).next() {
            snapshot.set_field(name, element_text(&cell));
        }
    }

    for (name, selector) in &compiled.repeated {
        if let Some(cell) = row.select(selector).next() {
            let values = cell
                .select(&compiled.box_item)
                .map(|item| element_text(&item).trim().to_string())
                .collect();
            snapshot.set_repeated(name, values);
        }
    }

    snapshot
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

impl RowSource for HtmlPageSource {
    type Row = RowSnapshot;

    fn current_rows(&self) -> Vec<RowSnapshot> {
        self.pages
            .get(self.current)
            .map(|page| page.rows.clone())
            .unwrap_or_default()
    }

    fn current_page_token(&self) -> Option<String> {
        self.pages.get(self.current).map(|page| page.token.clone())
    }

    fn has_next_page(&self) -> Option<bool> {
        let page = self.pages.get(self.current)?;
        match page.next_enabled {
            Some(true) if self.current + 1 >= self.pages.len() => {
                tracing::warn!(
                    "Page '{}' has an enabled next control but no later snapshot was saved",
                    page.name
                );
                Some(false)
            }
            other => other,
        }
    }

    fn advance_to_next_page(&mut self) {
        if self.current + 1 < self.pages.len() {
            self.current += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::RawRow;

    const PAGE_ONE: &str = r##"
<html><body>
<div class="admin__data-grid-pager">
  <input id="orderitemGrid_page-current" value="1">
  <button class="action-next">Next</button>
</div>
<table><tbody>
  <tr>
    <td class="col-increment_id"><a href="#"> A1 </a></td>
    <td class="col-qty_ordered">2</td>
    <td class="col-packed_qty">1</td>
    <td class="col-price">₹100.00</td>
    <td class="col-packing_box_barcode"><b><u>BX1</u></b><br><b><u>BX2</u></b></td>
    <td class="col-pack_box_items"><b><u>50x40x30</u></b></td>
  </tr>
  <tr>
    <td class="col-qty_ordered">9</td>
  </tr>
</tbody></table>
</body></html>"##;

    const PAGE_TWO: &str = r#"
<html><body>
<div class="admin__data-grid-pager">
  <input id="orderitemGrid_page-current" value="2">
  <button class="action-next disabled">Next</button>
</div>
<table><tbody>
  <tr>
    <td class="col-increment_id"><a>B2</a></td>
    <td class="col-qty_ordered">5</td>
    <td class="col-packed_qty">5</td>
    <td class="col-price">20</td>
  </tr>
</tbody></table>
</body></html>"#;

    fn source() -> HtmlPageSource {
        HtmlPageSource::from_documents(
            [("page1.html", PAGE_ONE), ("page2.html", PAGE_TWO)],
            &GridSelectors::default(),
            &FieldSelectors::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_reads_rows_and_boxes() {
        let fields = FieldSelectors::default();
        let source = source();
        let rows = source.current_rows();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.read_field(&fields.order_id).as_deref(), Some(" A1 "));
        assert_eq!(first.read_field(&fields.price).as_deref(), Some("₹100.00"));
        assert_eq!(first.read_repeated_subfield(&fields.box_id), vec!["BX1", "BX2"]);
        assert_eq!(first.read_repeated_subfield(&fields.box_size), vec!["50x40x30"]);

        assert_eq!(rows[1].read_field(&fields.order_id), None);
    }

    #[test]
    fn test_pager_state_and_tokens() {
        let mut source = source();
        assert_eq!(source.current_page_token().as_deref(), Some("1"));
        assert_eq!(source.has_next_page(), Some(true));

        source.advance_to_next_page();
        assert_eq!(source.current_page_token().as_deref(), Some("2"));
        assert_eq!(source.has_next_page(), Some(false));
        assert_eq!(source.current_page_name(), Some("page2.html"));
    }

    #[test]
    fn test_missing_pager_and_token_fallback() {
        let html = "<table><tbody><tr><td>x</td></tr></tbody></table>";
        let source = HtmlPageSource::from_documents(
            [("only.html", html)],
            &GridSelectors::default(),
            &FieldSelectors::default(),
        )
        .unwrap();

        assert_eq!(source.has_next_page(), None);
        assert_eq!(source.current_page_token().as_deref(), Some("only.html"));
    }

    #[test]
    fn test_rejects_bad_selector() {
        let grid = GridSelectors {
            rows: "tr[".to_string(),
            ..GridSelectors::default()
        };
        let err = HtmlPageSource::from_documents(
            [("p.html", PAGE_ONE)],
            &grid,
            &FieldSelectors::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SummaryError::SelectorError { .. }));
    }
}
