use crate::domain::model::{OrderAggregate, PageSummary};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Merges one page's aggregates into the running totals.
///
/// Orders seen for the first time are moved in as-is. For known orders the
/// counters are added and box volumes already present keep their first value.
/// Merging the same page twice double counts; callers submit each page once.
pub fn merge_page(global: &mut BTreeMap<String, OrderAggregate>, page: PageSummary) {
    for (order_id, incoming) in page.orders {
        match global.entry(order_id) {
            Entry::Vacant(slot) => {
                slot.insert(incoming);
            }
            Entry::Occupied(mut slot) => {
                slot.get_mut().absorb(incoming);
            }
        }
    }
}
