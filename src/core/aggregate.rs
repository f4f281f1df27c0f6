use crate::core::extract::{extract_row, FieldSelectors};
use crate::core::parse::parse_volume;
use crate::domain::model::{OrderAggregate, PageSummary};
use crate::domain::ports::{DiagnosticEvent, DiagnosticSink, RawRow};

/// Folds one page of rows into per-order aggregates.
///
/// Invalid rows are skipped and reported; they never abort the page. A box
/// whose dimensions do not parse to a positive volume is not recorded and may
/// be recorded by a later row that lists the same box.
pub fn summarize_page<R, D>(
    page: usize,
    rows: &[R],
    selectors: &FieldSelectors,
    diagnostics: &mut D,
) -> PageSummary
where
    R: RawRow,
    D: DiagnosticSink + ?Sized,
{
    let mut summary = PageSummary {
        page,
        rows_seen: rows.len(),
        ..PageSummary::default()
    };

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;
        let fields = match extract_row(row, selectors) {
            Ok(fields) => fields,
            Err(invalid) => {
                tracing::warn!("Skipping row {} on page {}: {}", row_number, page, invalid);
                summary.rows_skipped += 1;
                diagnostics.record(DiagnosticEvent::RowSkipped {
                    page,
                    row: row_number,
                    reason: invalid.to_string(),
                });
                continue;
            }
        };

        let order = summary
            .orders
            .entry(fields.order_id.clone())
            .or_insert_with(|| OrderAggregate::new(fields.order_id.clone()));
        order.add_row(&fields);

        for sighting in &fields.boxes {
            if order.has_box(&sighting.box_id) {
                continue;
            }
            let cbm = parse_volume(&sighting.dimensions);
            if order.insert_box(&sighting.box_id, cbm) {
                tracing::debug!(
                    "[{}] Box: {}, Size: {}, CBM: {:.3}",
                    fields.order_id,
                    sighting.box_id,
                    sighting.dimensions,
                    cbm
                );
                diagnostics.record(DiagnosticEvent::BoxRecorded {
                    order_id: fields.order_id.clone(),
                    box_id: sighting.box_id.clone(),
                    dimensions: sighting.dimensions.clone(),
                    cbm,
                });
            }
        }
    }

    summary
}
