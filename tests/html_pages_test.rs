use anyhow::Result;
use packing_summary::domain::ports::PresentationSink;
use packing_summary::{
    FieldSelectors, FileReport, GridSelectors, HtmlPageSource, LocalStorage, MemoryDiagnostics,
    NavigatorConfig, ReportFormat, SummaryConfig, SummaryEngine,
};
use std::time::Duration;
use tempfile::TempDir;

fn grid_page(token: &str, next_disabled: bool, rows: &str) -> String {
    let next_class = if next_disabled {
        "action-next disabled"
    } else {
        "action-next"
    };
    format!(
        r#"<html><body>
<div class="admin__data-grid-header"></div>
<div class="admin__data-grid-pager">
  <input id="orderitemGrid_page-current" value="{token}">
  <button class="{next_class}">Next</button>
</div>
<table><tbody>{rows}</tbody></table>
</body></html>"#
    )
}

fn grid_row(order: &str, qty: &str, packed: &str, price: &str, boxes: &[(&str, &str)]) -> String {
    let ids: String = boxes
        .iter()
        .map(|(id, _)| format!("<b><u>{}</u></b><br>", id))
        .collect();
    let sizes: String = boxes
        .iter()
        .map(|(_, size)| format!("<b><u>{}</u></b><br>", size))
        .collect();
    format!(
        r#"<tr>
  <td class="col-increment_id"><a href="/order/{order}">{order}</a></td>
  <td class="col-qty_ordered">{qty}</td>
  <td class="col-packed_qty">{packed}</td>
  <td class="col-price">₹{price}</td>
  <td class="col-packing_box_barcode">{ids}</td>
  <td class="col-pack_box_items">{sizes}</td>
</tr>"#
    )
}

fn write_pages(dir: &TempDir) -> Result<()> {
    let page1 = grid_page(
        "1",
        false,
        &[
            grid_row("A1", "2", "1", "100.00", &[("BX1", "50x40x30")]),
            grid_row("C3", "1", "1", "1,000.00", &[("BX9", "10x10x10")]),
            "<tr><td class=\"col-price\">9</td></tr>".to_string(),
        ]
        .concat(),
    );
    let page2 = grid_page(
        "2",
        true,
        &[
            grid_row("A1", "3", "3", "100.00", &[("BX1", "50x40x30"), ("BX2", "")]),
            grid_row("C3", "1", "0", "1,000.00", &[("BX9", "20x20x20")]),
        ]
        .concat(),
    );
    std::fs::write(dir.path().join("page-01.html"), page1)?;
    std::fs::write(dir.path().join("page-02.html"), page2)?;
    std::fs::write(dir.path().join("notes.txt"), "not a page")?;
    Ok(())
}

fn fast() -> NavigatorConfig {
    NavigatorConfig {
        wait_timeout: Duration::from_millis(100),
        poll_interval: Duration::from_millis(1),
        settle_delay: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn test_summarizes_saved_pages() -> Result<()> {
    let pages = TempDir::new()?;
    write_pages(&pages)?;

    let source =
        HtmlPageSource::from_dir(pages.path(), &GridSelectors::default(), &FieldSelectors::default())?;
    assert_eq!(source.page_count(), 2);

    let mut engine = SummaryEngine::new(
        source,
        FieldSelectors::default(),
        fast(),
        MemoryDiagnostics::default(),
    );
    let result = engine.run().await?;

    assert_eq!(result.pages_processed, 2);
    assert_eq!(result.rows_skipped, 1);

    let a1 = result.order("A1").expect("A1 present");
    assert_eq!(a1.row_count(), 2);
    assert_eq!(a1.balance_qty(), 1.0);
    assert_eq!(a1.total_order_value(), 500.0);
    // BX2 has no size of its own and falls back to the first one listed.
    assert_eq!(a1.box_volumes().len(), 2);
    assert!((a1.total_cbm() - 0.12).abs() < 1e-9);

    let c3 = result.order("C3").expect("C3 present");
    assert!((c3.total_cbm() - 0.001).abs() < 1e-12);
    assert_eq!(c3.total_order_value(), 2000.0);
    Ok(())
}

#[tokio::test]
async fn test_configured_run_writes_reports() -> Result<()> {
    let pages = TempDir::new()?;
    let output = TempDir::new()?;
    write_pages(&pages)?;

    let config = SummaryConfig::from_toml_str(&format!(
        r#"
[source]
pages_dir = "{}"

[navigator]
wait_timeout_ms = 200
poll_interval_ms = 1
settle_delay_ms = 1

[report]
output_path = "{}"
formats = ["csv", "tsv", "json"]
bundle = "summary.zip"
"#,
        pages.path().display(),
        output.path().display()
    ))?;

    let source = HtmlPageSource::from_dir(config.pages_dir()?, &config.grid, &config.fields)?;
    let mut engine = SummaryEngine::new(
        source,
        config.fields.clone(),
        config.navigator_config(),
        MemoryDiagnostics::default(),
    );
    let mut report = FileReport::new(
        LocalStorage::new(config.report.output_path.clone()),
        config.report.formats.clone(),
    )
    .with_bundle(config.report.bundle.clone());

    let result = engine.run_and_present(&mut report).await?;

    assert_eq!(
        report.written_files(),
        ["summary.csv", "summary.tsv", "summary.json", "summary.zip"]
    );
    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output.path().join("summary.json"))?)?;
    assert_eq!(json["orders"]["A1"]["row_count"], 2);
    assert_eq!(json["grand_total"]["row_count"], 4);
    assert_eq!(json["pages_processed"], 2);

    let csv = std::fs::read_to_string(output.path().join("summary.csv"))?;
    assert_eq!(csv.lines().count(), 1 + result.orders.len() + 1);
    assert_eq!(config.report.formats[1], ReportFormat::Tsv);
    Ok(())
}

#[tokio::test]
async fn test_report_can_be_presented_directly() -> Result<()> {
    let pages = TempDir::new()?;
    let output = TempDir::new()?;
    write_pages(&pages)?;

    let source =
        HtmlPageSource::from_dir(pages.path(), &GridSelectors::default(), &FieldSelectors::default())?;
    let mut engine = SummaryEngine::new(
        source,
        FieldSelectors::default(),
        fast(),
        MemoryDiagnostics::default(),
    )
    .with_grand_total(false);
    let result = engine.run().await?;

    let mut report = FileReport::new(LocalStorage::new(output.path()), vec![ReportFormat::Csv]);
    report.present(&result).await?;

    let csv = std::fs::read_to_string(output.path().join("summary.csv"))?;
    assert!(!csv.contains("TOTAL"));
    Ok(())
}
