use crate::domain::model::{OrderAggregate, RunResult};
use crate::domain::ports::{PresentationSink, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Csv,
    Tsv,
    Json,
}

impl ReportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "summary.csv",
            ReportFormat::Tsv => "summary.tsv",
            ReportFormat::Json => "summary.json",
        }
    }
}

/// Renders one text panel per order, then the grand total.
pub fn render_panels(result: &RunResult, currency: &str) -> String {
    let mut out = String::new();
    for (order_id, order) in &result.orders {
        render_panel(&mut out, &format!("Order {}", order_id), order, currency);
    }
    if let Some(total) = &result.grand_total {
        render_panel(&mut out, "Summary", total, currency);
    }
    out
}

fn render_panel(out: &mut String, title: &str, order: &OrderAggregate, currency: &str) {
    let lines = [
        format!("📦 {} ({} rows)", title, order.row_count()),
        format!("  🔢 Total Order Qty: {}", order.total_ordered_qty()),
        format!("  📦 Total Packed Qty: {}", order.total_packed_qty()),
        format!("  🧮 Balance Qty: {}", order.balance_qty()),
        format!("  💰 Total Order Value: {}{:.2}", currency, order.total_order_value()),
        format!("  📦 Packed Goods Value: {}{:.2}", currency, order.packed_goods_value()),
        format!("  📏 Total CBM (Unique Boxes): {:.3} m³", order.total_cbm()),
    ];
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
}

/// Prints the panels to stdout.
#[derive(Debug, Clone)]
pub struct ConsoleReport {
    currency: String,
}

impl ConsoleReport {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }
}

#[async_trait]
impl PresentationSink for ConsoleReport {
    async fn present(&mut self, result: &RunResult) -> Result<()> {
        print!("{}", render_panels(result, &self.currency));
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    order_id: &'a str,
    rows: usize,
    total_ordered_qty: f64,
    total_packed_qty: f64,
    balance_qty: f64,
    total_order_value: f64,
    packed_goods_value: f64,
    boxes: usize,
    total_cbm: f64,
}

impl<'a> From<&'a OrderAggregate> for ReportRow<'a> {
    fn from(order: &'a OrderAggregate) -> Self {
        Self {
            order_id: order.order_id(),
            rows: order.row_count(),
            total_ordered_qty: order.total_ordered_qty(),
            total_packed_qty: order.total_packed_qty(),
            balance_qty: order.balance_qty(),
            total_order_value: round_to(order.total_order_value(), 2),
            packed_goods_value: round_to(order.packed_goods_value(), 2),
            boxes: order.box_volumes().len(),
            total_cbm: round_to(order.total_cbm(), 6),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn delimited(result: &RunResult, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    for order in result.orders.values() {
        writer.serialize(ReportRow::from(order))?;
    }
    if let Some(total) = &result.grand_total {
        writer.serialize(ReportRow::from(total))?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| crate::utils::error::SummaryError::ReportError {
            message: e.to_string(),
        })
}

/// Writes the result as files through a [`Storage`], optionally bundled
/// into a zip archive.
pub struct FileReport<S: Storage> {
    storage: S,
    formats: Vec<ReportFormat>,
    bundle: Option<String>,
    written: Vec<String>,
}

impl<S: Storage> FileReport<S> {
    pub fn new(storage: S, formats: Vec<ReportFormat>) -> Self {
        Self {
            storage,
            formats,
            bundle: None,
            written: Vec::new(),
        }
    }

    pub fn with_bundle(mut self, bundle: Option<String>) -> Self {
        self.bundle = bundle;
        self
    }

    /// File names written by the last `present` call.
    pub fn written_files(&self) -> &[String] {
        &self.written
    }

    fn render(&self, result: &RunResult) -> Result<Vec<(&'static str, Vec<u8>)>> {
        let mut files = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            let data = match format {
                ReportFormat::Csv => delimited(result, b',')?,
                ReportFormat::Tsv => delimited(result, b'\t')?,
                ReportFormat::Json => serde_json::to_vec_pretty(result)?,
            };
            files.push((format.file_name(), data));
        }
        Ok(files)
    }
}

fn zip_files(files: &[(&'static str, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in files {
        zip.start_file::<_, ()>(*name, FileOptions::default())?;
        zip.write_all(data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[async_trait]
impl<S: Storage> PresentationSink for FileReport<S> {
    async fn present(&mut self, result: &RunResult) -> Result<()> {
        let files = self.render(result)?;
        self.written.clear();

        for (name, data) in &files {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(name, data).await?;
            self.written.push(name.to_string());
        }

        if let Some(bundle) = &self.bundle {
            let archive = zip_files(&files)?;
            tracing::debug!("Writing bundle {} ({} bytes)", bundle, archive.len());
            self.storage.write_file(bundle, &archive).await?;
            self.written.push(bundle.clone());
        }

        Ok(())
    }
}

/// Presents to several sinks in order, stopping at the first failure.
#[derive(Default)]
pub struct MultiReport {
    sinks: Vec<Box<dyn PresentationSink>>,
}

impl MultiReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl PresentationSink + 'static) {
        self.sinks.push(Box::new(sink));
    }
}

#[async_trait]
impl PresentationSink for MultiReport {
    async fn present(&mut self, result: &RunResult) -> Result<()> {
        for sink in &mut self.sinks {
            sink.present(result).await?;
        }
        Ok(())
    }
}
