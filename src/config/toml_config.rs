use crate::adapters::html_source::{compile_selector, GridSelectors};
use crate::adapters::report::ReportFormat;
use crate::core::extract::FieldSelectors;
use crate::core::navigator::NavigatorConfig;
use crate::utils::error::{SummaryError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub source: SourceConfig,
    pub grid: GridSelectors,
    pub fields: FieldSelectors,
    pub navigator: NavigatorSettings,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory holding the saved grid pages.
    pub pages_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorSettings {
    pub wait_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub settle_delay_ms: u64,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        let defaults = NavigatorConfig::default();
        Self {
            wait_timeout_ms: defaults.wait_timeout.as_millis() as u64,
            poll_interval_ms: defaults.poll_interval.as_millis() as u64,
            settle_delay_ms: defaults.settle_delay.as_millis() as u64,
        }
    }
}

impl NavigatorSettings {
    pub fn to_config(&self) -> NavigatorConfig {
        NavigatorConfig {
            wait_timeout: Duration::from_millis(self.wait_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_path: String,
    pub formats: Vec<ReportFormat>,
    pub grand_total: bool,
    /// Zip archive name; unset writes loose files only.
    pub bundle: Option<String>,
    pub currency: String,
    pub console: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            formats: vec![ReportFormat::Csv, ReportFormat::Json],
            grand_total: true,
            bundle: None,
            currency: "₹".to_string(),
            console: true,
        }
    }
}

impl SummaryConfig {
    /// Loads a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration text, substituting `${VAR}` from the environment first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| SummaryError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SummaryError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn navigator_config(&self) -> NavigatorConfig {
        self.navigator.to_config()
    }

    pub fn pages_dir(&self) -> Result<&str> {
        validation::validate_required_field("source.pages_dir", &self.source.pages_dir)
            .map(String::as_str)
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(dir) = &self.source.pages_dir {
            validation::validate_path("source.pages_dir", dir)?;
        }

        for (field, selector) in [
            ("grid.rows", &self.grid.rows),
            ("grid.page_token", &self.grid.page_token),
            ("grid.next_control", &self.grid.next_control),
            ("grid.box_item", &self.grid.box_item),
        ] {
            validation::validate_non_empty_string(field, selector)?;
            compile_selector(selector)?;
        }
        validation::validate_non_empty_string("grid.disabled_class", &self.grid.disabled_class)?;

        for (field, selector) in self.fields.named() {
            validation::validate_non_empty_string(field, selector)?;
            compile_selector(selector)?;
        }

        validation::validate_range(
            "navigator.wait_timeout_ms",
            self.navigator.wait_timeout_ms,
            1,
            600_000,
        )?;
        validation::validate_range(
            "navigator.poll_interval_ms",
            self.navigator.poll_interval_ms,
            1,
            1_000,
        )?;
        validation::validate_range(
            "navigator.settle_delay_ms",
            self.navigator.settle_delay_ms,
            0,
            60_000,
        )?;

        validation::validate_path("report.output_path", &self.report.output_path)?;
        if let Some(bundle) = &self.report.bundle {
            validation::validate_path("report.bundle", bundle)?;
        }

        Ok(())
    }
}

impl Validate for SummaryConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
