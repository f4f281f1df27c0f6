use crate::domain::ports::{RawRow, RowSource};
use std::cell::Cell;
use std::collections::HashMap;

/// An owned copy of one row's fields, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSnapshot {
    fields: HashMap<String, String>,
    repeated: HashMap<String, Vec<String>>,
}

impl RowSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.set_field(name, value.to_string());
        self
    }

    pub fn with_repeated(mut self, name: &str, values: &[&str]) -> Self {
        self.set_repeated(name, values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn set_field(&mut self, name: &str, value: String) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn set_repeated(&mut self, name: &str, values: Vec<String>) {
        self.repeated.insert(name.to_string(), values);
    }
}

impl RawRow for RowSnapshot {
    fn read_field(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    fn read_repeated_subfield(&self, name: &str) -> Vec<String> {
        self.repeated.get(name).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct MemoryPage {
    pub token: String,
    pub rows: Vec<RowSnapshot>,
}

/// Pages held in memory. Can simulate a source that needs a few polls
/// before a requested page shows up.
#[derive(Debug)]
pub struct MemoryRowSource {
    pages: Vec<MemoryPage>,
    requested: usize,
    displayed: Cell<usize>,
    pending_polls: Cell<usize>,
    load_polls: usize,
    frozen: bool,
    pager: bool,
}

impl MemoryRowSource {
    pub fn new(pages: Vec<Vec<RowSnapshot>>) -> Self {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, rows)| MemoryPage {
                token: (i + 1).to_string(),
                rows,
            })
            .collect();
        Self::from_pages(pages)
    }

    pub fn from_pages(pages: Vec<MemoryPage>) -> Self {
        Self {
            pages,
            requested: 0,
            displayed: Cell::new(0),
            pending_polls: Cell::new(0),
            load_polls: 0,
            frozen: false,
            pager: true,
        }
    }

    /// Every page, the first included, only shows up after `polls` reads.
    pub fn with_load_polls(mut self, polls: usize) -> Self {
        self.load_polls = polls;
        self.pending_polls.set(polls);
        self
    }

    /// Ignore advance requests, so the page never changes.
    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    /// Pretend there is no pagination control at all.
    pub fn without_pager(mut self) -> Self {
        self.pager = false;
        self
    }

    pub fn displayed_page(&self) -> usize {
        self.displayed.get()
    }

    fn poll(&self) -> Option<usize> {
        let pending = self.pending_polls.get();
        if pending > 0 {
            self.pending_polls.set(pending - 1);
            return None;
        }
        self.displayed.set(self.requested);
        Some(self.requested)
    }
}

impl RowSource for MemoryRowSource {
    type Row = RowSnapshot;

    fn current_rows(&self) -> Vec<RowSnapshot> {
        match self.poll() {
            Some(index) => self
                .pages
                .get(index)
                .map(|page| page.rows.clone())
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    fn current_page_token(&self) -> Option<String> {
        self.poll();
        self.pages
            .get(self.displayed.get())
            .map(|page| page.token.clone())
    }

    fn has_next_page(&self) -> Option<bool> {
        if !self.pager {
            return None;
        }
        Some(self.displayed.get() + 1 < self.pages.len())
    }

    fn advance_to_next_page(&mut self) {
        if self.frozen || self.requested + 1 >= self.pages.len() {
            return;
        }
        self.requested += 1;
        self.pending_polls.set(self.load_polls);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_appear_after_load_polls() {
        let row = RowSnapshot::new().with_field("id", "A1");
        let source = MemoryRowSource::new(vec![vec![row]]).with_load_polls(2);

        assert!(source.current_rows().is_empty());
        assert!(source.current_rows().is_empty());
        assert_eq!(source.current_rows().len(), 1);
    }

    #[test]
    fn test_advance_changes_token() {
        let mut source = MemoryRowSource::new(vec![vec![], vec![]]);
        assert_eq!(source.current_page_token().as_deref(), Some("1"));
        assert_eq!(source.has_next_page(), Some(true));

        source.advance_to_next_page();
        assert_eq!(source.current_page_token().as_deref(), Some("2"));
        assert_eq!(source.has_next_page(), Some(false));
    }

    #[test]
    fn test_frozen_source_keeps_page() {
        let mut source = MemoryRowSource::new(vec![vec![], vec![]]).frozen();
        source.advance_to_next_page();
        assert_eq!(source.current_page_token().as_deref(), Some("1"));
        assert_eq!(source.displayed_page(), 0);
    }

    #[test]
    fn test_snapshot_reads() {
        let row = RowSnapshot::new()
            .with_field("price", "10")
            .with_repeated("boxes", &["B1", "B2"]);
        assert_eq!(row.read_field("price").as_deref(), Some("10"));
        assert_eq!(row.read_field("qty"), None);
        assert_eq!(row.read_repeated_subfield("boxes").len(), 2);
        assert!(row.read_repeated_subfield("sizes").is_empty());
    }
}
