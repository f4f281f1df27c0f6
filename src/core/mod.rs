pub mod aggregate;
pub mod engine;
pub mod extract;
pub mod merge;
pub mod navigator;
pub mod parse;

pub use crate::domain::model::{OrderAggregate, PageSummary, RowFields, RunResult};
pub use crate::domain::ports::{DiagnosticSink, PresentationSink, RawRow, RowSource, Storage};
pub use crate::utils::error::Result;
