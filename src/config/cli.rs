use crate::config::toml_config::SummaryConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "packing-summary")]
#[command(about = "Summarize packing status by order id across every page of the order item grid")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory of saved grid pages (overrides source.pages_dir)
    #[arg(short, long)]
    pub pages: Option<String>,

    /// Output directory for report files (overrides report.output_path)
    #[arg(short, long)]
    pub output: Option<String>,

    /// How long to wait for rows or a page change, in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Pause after each page change, in milliseconds
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Leave out the grand-total record
    #[arg(long)]
    pub no_grand_total: bool,

    /// Do not print order panels to stdout
    #[arg(short, long)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliConfig {
    /// Loads the configuration file (or defaults) and applies command line overrides.
    pub fn resolve(&self) -> Result<SummaryConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                SummaryConfig::from_file(path)?
            }
            None => SummaryConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut SummaryConfig) {
        if let Some(pages) = &self.pages {
            config.source.pages_dir = Some(pages.clone());
        }
        if let Some(output) = &self.output {
            config.report.output_path = output.clone();
        }
        if let Some(timeout) = self.timeout_ms {
            config.navigator.wait_timeout_ms = timeout;
        }
        if let Some(settle) = self.settle_ms {
            config.navigator.settle_delay_ms = settle;
        }
        if self.no_grand_total {
            config.report.grand_total = false;
        }
        if self.quiet {
            config.report.console = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win_over_defaults() {
        let cli = CliConfig::parse_from([
            "packing-summary",
            "--pages",
            "./grid",
            "--timeout-ms",
            "250",
            "--no-grand-total",
            "-q",
        ]);

        let config = cli.resolve().unwrap();

        assert_eq!(config.source.pages_dir.as_deref(), Some("./grid"));
        assert_eq!(config.navigator.wait_timeout_ms, 250);
        assert_eq!(config.navigator.settle_delay_ms, 500);
        assert!(!config.report.grand_total);
        assert!(!config.report.console);
    }

    #[test]
    fn test_missing_config_file_fails() {
        let cli = CliConfig {
            config: Some("/definitely/not/here.toml".to_string()),
            ..CliConfig::default()
        };
        assert!(cli.resolve().is_err());
    }
}
