pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::SummaryConfig;

pub use adapters::diagnostics::{MemoryDiagnostics, TracingDiagnostics};
pub use adapters::html_source::{GridSelectors, HtmlPageSource};
pub use adapters::memory_source::{MemoryRowSource, RowSnapshot};
pub use adapters::report::{ConsoleReport, FileReport, MultiReport, ReportFormat};
pub use adapters::storage::LocalStorage;
pub use crate::core::{
    engine::SummaryEngine,
    extract::FieldSelectors,
    navigator::{NavigatorConfig, PageNavigator},
};
pub use domain::model::{OrderAggregate, RunResult};
pub use utils::error::{Result, SummaryError};
