use crate::core::parse::parse_number;
use crate::domain::model::{BoxSighting, RowFields};
use crate::domain::ports::RawRow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the fields read from each row. For HTML sources these are CSS
/// selectors relative to the row element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSelectors {
    pub order_id: String,
    pub ordered_qty: String,
    pub packed_qty: String,
    pub price: String,
    /// Empty disables box tracking.
    pub box_id: String,
    pub box_size: String,
}

impl Default for FieldSelectors {
    fn default() -> Self {
        Self {
            order_id: ".col-increment_id a".to_string(),
            ordered_qty: ".col-qty_ordered".to_string(),
            packed_qty: ".col-packed_qty".to_string(),
            price: ".col-price".to_string(),
            box_id: ".col-packing_box_barcode".to_string(),
            box_size: ".col-pack_box_items".to_string(),
        }
    }
}

impl FieldSelectors {
    pub fn tracks_boxes(&self) -> bool {
        !self.box_id.is_empty() && !self.box_size.is_empty()
    }

    /// Every non-empty selector, labelled by the field it reads.
    pub fn named(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            ("fields.order_id", self.order_id.as_str()),
            ("fields.ordered_qty", self.ordered_qty.as_str()),
            ("fields.packed_qty", self.packed_qty.as_str()),
            ("fields.price", self.price.as_str()),
        ];
        if self.tracks_boxes() {
            fields.push(("fields.box_id", self.box_id.as_str()));
            fields.push(("fields.box_size", self.box_size.as_str()));
        }
        fields
    }
}

/// Mandatory row field that could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MandatoryField {
    OrderId,
    OrderedQty,
    PackedQty,
    Price,
}

impl fmt::Display for MandatoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MandatoryField::OrderId => "order id",
            MandatoryField::OrderedQty => "ordered qty",
            MandatoryField::PackedQty => "packed qty",
            MandatoryField::Price => "price",
        };
        f.write_str(name)
    }
}

/// A row that cannot be aggregated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRow {
    pub missing: Vec<MandatoryField>,
}

impl fmt::Display for InvalidRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.missing.iter().map(ToString::to_string).collect();
        write!(f, "missing required column(s): {}", names.join(", "))
    }
}

impl std::error::Error for InvalidRow {}

/// Reads the structured fields of one row.
pub fn extract_row<R: RawRow>(row: &R, selectors: &FieldSelectors) -> Result<RowFields, InvalidRow> {
    let order_id = row
        .read_field(&selectors.order_id)
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    let ordered = row.read_field(&selectors.ordered_qty);
    let packed = row.read_field(&selectors.packed_qty);
    let price = row.read_field(&selectors.price);

    let mut missing = Vec::new();
    if order_id.is_none() {
        missing.push(MandatoryField::OrderId);
    }
    if ordered.is_none() {
        missing.push(MandatoryField::OrderedQty);
    }
    if packed.is_none() {
        missing.push(MandatoryField::PackedQty);
    }
    if price.is_none() {
        missing.push(MandatoryField::Price);
    }

    match (order_id, ordered, packed, price) {
        (Some(order_id), Some(ordered), Some(packed), Some(price)) => Ok(RowFields {
            order_id,
            ordered_qty: parse_number(&ordered),
            packed_qty: parse_number(&packed),
            price: parse_number(&price),
            boxes: read_boxes(row, selectors),
        }),
        _ => Err(InvalidRow { missing }),
    }
}

fn read_boxes<R: RawRow>(row: &R, selectors: &FieldSelectors) -> Vec<BoxSighting> {
    if !selectors.tracks_boxes() {
        return Vec::new();
    }
    let ids = row.read_repeated_subfield(&selectors.box_id);
    let sizes = row.read_repeated_subfield(&selectors.box_size);
    pair_boxes(&ids, &sizes)
}

/// Pairs box ids with dimension strings by position.
///
/// A missing or empty dimension at position `i` falls back to the first
/// dimension; with no dimensions at all the box gets an empty string.
/// Blank box ids are dropped.
pub fn pair_boxes(ids: &[String], sizes: &[String]) -> Vec<BoxSighting> {
    let first = sizes.first().map(|s| s.trim()).unwrap_or("");

    ids.iter()
        .enumerate()
        .filter_map(|(i, id)| {
            let box_id = id.trim();
            if box_id.is_empty() {
                return None;
            }
            let dimensions = sizes
                .get(i)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .unwrap_or(first);
            Some(BoxSighting {
                box_id: box_id.to_string(),
                dimensions: dimensions.to_string(),
            })
        })
        .collect()
}
