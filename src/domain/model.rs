use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One box listed on a row: its identifier and raw `LxWxH` dimension text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxSighting {
    pub box_id: String,
    pub dimensions: String,
}

/// Structured fields read from one valid row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFields {
    pub order_id: String,
    pub ordered_qty: f64,
    pub packed_qty: f64,
    pub price: f64,
    pub boxes: Vec<BoxSighting>,
}

/// Running totals for one order id.
///
/// `balance_qty` and `total_cbm` are derived values; every mutating method
/// recomputes them before returning, so they are never stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAggregate {
    order_id: String,
    row_count: usize,
    total_ordered_qty: f64,
    total_packed_qty: f64,
    balance_qty: f64,
    total_order_value: f64,
    packed_goods_value: f64,
    box_volumes: BTreeMap<String, f64>,
    total_cbm: f64,
}

impl OrderAggregate {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            row_count: 0,
            total_ordered_qty: 0.0,
            total_packed_qty: 0.0,
            balance_qty: 0.0,
            total_order_value: 0.0,
            packed_goods_value: 0.0,
            box_volumes: BTreeMap::new(),
            total_cbm: 0.0,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn total_ordered_qty(&self) -> f64 {
        self.total_ordered_qty
    }

    pub fn total_packed_qty(&self) -> f64 {
        self.total_packed_qty
    }

    pub fn balance_qty(&self) -> f64 {
        self.balance_qty
    }

    pub fn total_order_value(&self) -> f64 {
        self.total_order_value
    }

    pub fn packed_goods_value(&self) -> f64 {
        self.packed_goods_value
    }

    pub fn box_volumes(&self) -> &BTreeMap<String, f64> {
        &self.box_volumes
    }

    pub fn total_cbm(&self) -> f64 {
        self.total_cbm
    }

    pub fn has_box(&self, box_id: &str) -> bool {
        self.box_volumes.contains_key(box_id)
    }

    /// Adds one row's quantities and values.
    pub fn add_row(&mut self, fields: &RowFields) {
        self.row_count += 1;
        self.total_ordered_qty += fields.ordered_qty;
        self.total_packed_qty += fields.packed_qty;
        self.total_order_value += fields.ordered_qty * fields.price;
        self.packed_goods_value += fields.packed_qty * fields.price;
        self.recompute();
    }

    /// Records a box volume unless the box is already known or the volume is
    /// not strictly positive. Returns whether the volume was recorded.
    pub fn insert_box(&mut self, box_id: &str, cbm: f64) -> bool {
        if cbm <= 0.0 || !cbm.is_finite() || self.box_volumes.contains_key(box_id) {
            return false;
        }
        self.box_volumes.insert(box_id.to_string(), cbm);
        self.recompute();
        true
    }

    /// Adds another aggregate's counters into this one. Box volumes already
    /// present here win over the other aggregate's sightings.
    pub fn absorb(&mut self, other: OrderAggregate) {
        self.row_count += other.row_count;
        self.total_ordered_qty += other.total_ordered_qty;
        self.total_packed_qty += other.total_packed_qty;
        self.total_order_value += other.total_order_value;
        self.packed_goods_value += other.packed_goods_value;
        for (box_id, cbm) in other.box_volumes {
            self.box_volumes.entry(box_id).or_insert(cbm);
        }
        self.recompute();
    }

    /// Adds an aggregate's totals without looking at box identity.
    pub(crate) fn add_totals(&mut self, other: &OrderAggregate) {
        self.row_count += other.row_count;
        self.total_ordered_qty += other.total_ordered_qty;
        self.total_packed_qty += other.total_packed_qty;
        self.total_order_value += other.total_order_value;
        self.packed_goods_value += other.packed_goods_value;
        self.balance_qty = self.total_ordered_qty - self.total_packed_qty;
        self.total_cbm += other.total_cbm;
    }

    fn recompute(&mut self) {
        self.balance_qty = self.total_ordered_qty - self.total_packed_qty;
        self.total_cbm = self.box_volumes.values().sum();
    }
}

/// Per-order aggregates for a single page.
#[derive(Debug, Clone, Default)]
pub struct PageSummary {
    pub page: usize,
    pub orders: BTreeMap<String, OrderAggregate>,
    pub rows_seen: usize,
    pub rows_skipped: usize,
}

/// Final output of a run, handed to the presentation sink once.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub orders: BTreeMap<String, OrderAggregate>,
    pub grand_total: Option<OrderAggregate>,
    pub pages_processed: usize,
    pub rows_skipped: usize,
    pub completed_at: DateTime<Utc>,
}

pub const GRAND_TOTAL_ID: &str = "TOTAL";

impl RunResult {
    pub fn new(
        orders: BTreeMap<String, OrderAggregate>,
        pages_processed: usize,
        rows_skipped: usize,
        with_grand_total: bool,
    ) -> Self {
        let grand_total = with_grand_total.then(|| grand_total(orders.values()));
        Self {
            orders,
            grand_total,
            pages_processed,
            rows_skipped,
            completed_at: Utc::now(),
        }
    }

    pub fn order(&self, order_id: &str) -> Option<&OrderAggregate> {
        self.orders.get(order_id)
    }
}

/// Sums every aggregate into one. The total CBM is the sum of per-order CBM
/// figures since box identity is scoped to an order.
pub fn grand_total<'a>(orders: impl IntoIterator<Item = &'a OrderAggregate>) -> OrderAggregate {
    let mut total = OrderAggregate::new(GRAND_TOTAL_ID);
    for order in orders {
        total.add_totals(order);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(order: &str, qty: f64, packed: f64, price: f64) -> RowFields {
        RowFields {
            order_id: order.to_string(),
            ordered_qty: qty,
            packed_qty: packed,
            price,
            boxes: Vec::new(),
        }
    }

    #[test]
    fn test_add_row_keeps_balance_current() {
        let mut order = OrderAggregate::new("A1");
        order.add_row(&row("A1", 2.0, 1.0, 100.0));
        assert_eq!(order.balance_qty(), 1.0);
        order.add_row(&row("A1", 3.0, 3.0, 100.0));
        assert_eq!(order.row_count(), 2);
        assert_eq!(order.balance_qty(), 1.0);
        assert_eq!(order.total_order_value(), 500.0);
        assert_eq!(order.packed_goods_value(), 400.0);
    }

    #[test]
    fn test_insert_box_first_wins_and_rejects_zero() {
        let mut order = OrderAggregate::new("C3");
        assert!(!order.insert_box("BX1", 0.0));
        assert!(order.insert_box("BX1", 0.001));
        assert!(!order.insert_box("BX1", 0.008));
        assert!((order.total_cbm() - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_grand_total_sums_orders() {
        let mut a = OrderAggregate::new("A");
        a.add_row(&row("A", 5.0, 4.0, 10.0));
        a.insert_box("B1", 0.5);
        let mut b = OrderAggregate::new("B");
        b.add_row(&row("B", 1.0, 1.0, 20.0));
        b.insert_box("B1", 0.25);

        let total = grand_total([&a, &b]);
        assert_eq!(total.order_id(), GRAND_TOTAL_ID);
        assert_eq!(total.row_count(), 2);
        assert_eq!(total.balance_qty(), 1.0);
        assert_eq!(total.total_order_value(), 70.0);
        assert!((total.total_cbm() - 0.75).abs() < 1e-12);
        assert!(total.box_volumes().is_empty());
    }
}
