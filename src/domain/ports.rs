use crate::domain::model::RunResult;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read access to one row of the paginated grid.
pub trait RawRow {
    /// Text of the field matched by `name`, or `None` when the row has no such field.
    fn read_field(&self, name: &str) -> Option<String>;

    /// Every sub-value listed inside the field matched by `name`. Empty when
    /// the field is absent.
    fn read_repeated_subfield(&self, name: &str) -> Vec<String>;
}

/// The paginated data source. Reads are side-effect free; only
/// `advance_to_next_page` changes what the source shows.
pub trait RowSource {
    type Row: RawRow;

    /// Rows currently displayed. May be empty while the source is still loading.
    fn current_rows(&self) -> Vec<Self::Row>;

    /// Opaque token that changes whenever the displayed page changes.
    fn current_page_token(&self) -> Option<String>;

    /// `Some(true)` when an enabled "next page" control exists, `Some(false)`
    /// when it exists but is disabled, `None` when no pagination control can be found.
    fn has_next_page(&self) -> Option<bool>;

    /// Fire-and-forget request to show the next page.
    fn advance_to_next_page(&mut self);
}

/// Observational events emitted while a run is in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    PageStarted {
        page: usize,
    },
    RowSkipped {
        page: usize,
        row: usize,
        reason: String,
    },
    BoxRecorded {
        order_id: String,
        box_id: String,
        dimensions: String,
        cbm: f64,
    },
    PageProcessed {
        page: usize,
        rows: usize,
        skipped: usize,
        orders: usize,
    },
    NoNextControl {
        page: usize,
    },
    RunCompleted {
        pages: usize,
        orders: usize,
    },
    RunFailed {
        page: usize,
        message: String,
    },
}

pub trait DiagnosticSink {
    fn record(&mut self, event: DiagnosticEvent);
}

impl<D: DiagnosticSink + ?Sized> DiagnosticSink for &mut D {
    fn record(&mut self, event: DiagnosticEvent) {
        (**self).record(event)
    }
}

/// Receives the finished result of a successful run.
#[async_trait]
pub trait PresentationSink: Send {
    async fn present(&mut self, result: &RunResult) -> Result<()>;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
