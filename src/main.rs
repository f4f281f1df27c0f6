use clap::Parser;
use packing_summary::utils::error::ErrorSeverity;
use packing_summary::utils::{logger, validation::Validate};
use packing_summary::{
    CliConfig, ConsoleReport, FileReport, HtmlPageSource, LocalStorage, MemoryDiagnostics,
    MultiReport, SummaryConfig, SummaryEngine, SummaryError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting packing-summary");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    match run(&config).await {
        Ok((orders, pages)) => {
            tracing::info!("✅ Summary complete: {} orders over {} pages", orders, pages);
            if !config.report.formats.is_empty() {
                tracing::info!("📁 Reports saved to: {}", config.report.output_path);
            }
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

async fn run(config: &SummaryConfig) -> Result<(usize, usize), SummaryError> {
    let pages_dir = config.pages_dir()?;
    let source = HtmlPageSource::from_dir(pages_dir, &config.grid, &config.fields)?;
    tracing::info!("📄 Loaded {} saved pages from {}", source.page_count(), pages_dir);

    let mut reports = MultiReport::new();
    if config.report.console {
        reports.push(ConsoleReport::new(config.report.currency.clone()));
    }
    if !config.report.formats.is_empty() || config.report.bundle.is_some() {
        let storage = LocalStorage::new(config.report.output_path.clone());
        reports.push(
            FileReport::new(storage, config.report.formats.clone())
                .with_bundle(config.report.bundle.clone()),
        );
    }

    let mut engine = SummaryEngine::new(
        source,
        config.fields.clone(),
        config.navigator_config(),
        MemoryDiagnostics::with_tracing(),
    )
    .with_grand_total(config.report.grand_total);

    let result = engine.run_and_present(&mut reports).await?;

    let skipped = engine.diagnostics().skipped_rows();
    if skipped > 0 {
        tracing::warn!("⚠️ {} rows were skipped for missing columns", skipped);
    }

    Ok((result.orders.len(), result.pages_processed))
}

fn exit_with(e: &SummaryError) -> ! {
    tracing::error!(
        "❌ Summary failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
