use thiserror::Error;

/// Which of the navigator's bounded waits ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitKind {
    RowsReady,
    PageChanged,
}

impl std::fmt::Display for WaitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitKind::RowsReady => write!(f, "rows-ready"),
            WaitKind::PageChanged => write!(f, "page-changed"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Timed out after {timeout_ms}ms waiting for rows on page {page}")]
    RowsTimeout { page: usize, timeout_ms: u64 },

    #[error("Timed out after {timeout_ms}ms waiting for page {page} to change")]
    PageChangeTimeout { page: usize, timeout_ms: u64 },

    #[error("Engine already ran (stopped on page {page}); build a new engine to run again")]
    EngineSpent { page: usize },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid CSS selector '{selector}': {message}")]
    SelectorError { selector: String, message: String },

    #[error("Report error: {message}")]
    ReportError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Navigation,
    Configuration,
    Io,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SummaryError {
    pub fn wait_kind(&self) -> Option<WaitKind> {
        match self {
            SummaryError::RowsTimeout { .. } => Some(WaitKind::RowsReady),
            SummaryError::PageChangeTimeout { .. } => Some(WaitKind::PageChanged),
            _ => None,
        }
    }

    /// Page index (1-based) the failure happened on, for navigation errors.
    pub fn page(&self) -> Option<usize> {
        match self {
            SummaryError::RowsTimeout { page, .. } | SummaryError::PageChangeTimeout { page, .. } => {
                Some(*page)
            }
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SummaryError::RowsTimeout { .. }
            | SummaryError::PageChangeTimeout { .. }
            | SummaryError::EngineSpent { .. } => ErrorCategory::Navigation,
            SummaryError::ConfigError { .. }
            | SummaryError::ConfigValidationError { .. }
            | SummaryError::InvalidConfigValueError { .. }
            | SummaryError::MissingConfigError { .. }
            | SummaryError::SelectorError { .. } => ErrorCategory::Configuration,
            SummaryError::IoError(_) => ErrorCategory::Io,
            SummaryError::ZipError(_)
            | SummaryError::CsvError(_)
            | SummaryError::SerializationError(_)
            | SummaryError::ReportError { .. } => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Navigation => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SummaryError::RowsTimeout { .. } => {
                "Check that the page actually lists rows and that the row selector matches them"
            }
            SummaryError::PageChangeTimeout { .. } => {
                "Check the page token selector; the pager may not have moved to the next page"
            }
            SummaryError::EngineSpent { .. } => {
                "Create a new engine over a fresh page source for every run"
            }
            SummaryError::SelectorError { .. } => "Fix the CSS selector in the configuration file",
            SummaryError::ConfigError { .. }
            | SummaryError::ConfigValidationError { .. }
            | SummaryError::InvalidConfigValueError { .. }
            | SummaryError::MissingConfigError { .. } => {
                "Review the configuration file and command line arguments"
            }
            SummaryError::IoError(_) => "Check that the paths exist and are readable/writable",
            SummaryError::ZipError(_)
            | SummaryError::CsvError(_)
            | SummaryError::SerializationError(_)
            | SummaryError::ReportError { .. } => {
                "Check the report settings and free space in the output directory"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SummaryError::RowsTimeout { page, .. } => {
                format!("No rows showed up on page {}", page)
            }
            SummaryError::PageChangeTimeout { page, .. } => {
                format!("Could not move past page {}", page)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SummaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_carry_wait_kind_and_page() {
        let rows = SummaryError::RowsTimeout {
            page: 1,
            timeout_ms: 10_000,
        };
        assert_eq!(rows.wait_kind(), Some(WaitKind::RowsReady));
        assert_eq!(rows.page(), Some(1));

        let change = SummaryError::PageChangeTimeout {
            page: 3,
            timeout_ms: 50,
        };
        assert_eq!(change.wait_kind(), Some(WaitKind::PageChanged));
        assert_eq!(change.page(), Some(3));
        assert!(change.to_string().contains("page 3"));
    }

    #[test]
    fn test_severity_by_category() {
        let config = SummaryError::MissingConfigError {
            field: "source.pages_dir".to_string(),
        };
        assert_eq!(config.category(), ErrorCategory::Configuration);
        assert_eq!(config.severity(), ErrorSeverity::High);
        assert_eq!(config.wait_kind(), None);

        let io = SummaryError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.severity(), ErrorSeverity::Critical);
    }
}
