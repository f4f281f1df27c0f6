use crate::core::aggregate::summarize_page;
use crate::core::extract::FieldSelectors;
use crate::core::merge::merge_page;
use crate::core::navigator::{Advance, NavState, NavigatorConfig, PageNavigator};
use crate::domain::model::{OrderAggregate, RunResult};
use crate::domain::ports::{DiagnosticEvent, DiagnosticSink, PresentationSink, RowSource};
use crate::utils::error::{Result, SummaryError};
use std::collections::BTreeMap;

/// Drives the navigator page by page, aggregating and merging every page
/// until the source runs out of pages.
///
/// `run` takes `&mut self`, so one engine never runs twice at the same time.
/// An engine runs once; later calls fail with [`SummaryError::EngineSpent`].
pub struct SummaryEngine<S: RowSource, D: DiagnosticSink> {
    navigator: PageNavigator<S>,
    selectors: FieldSelectors,
    diagnostics: D,
    grand_total: bool,
}

struct Traversal {
    orders: BTreeMap<String, OrderAggregate>,
    pages: usize,
    rows_skipped: usize,
}

impl<S: RowSource, D: DiagnosticSink> SummaryEngine<S, D> {
    pub fn new(source: S, selectors: FieldSelectors, config: NavigatorConfig, diagnostics: D) -> Self {
        Self {
            navigator: PageNavigator::new(source, config),
            selectors,
            diagnostics,
            grand_total: true,
        }
    }

    pub fn with_grand_total(mut self, enabled: bool) -> Self {
        self.grand_total = enabled;
        self
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn navigator(&self) -> &PageNavigator<S> {
        &self.navigator
    }

    /// Traverses every page and returns the finished result.
    ///
    /// On failure nothing is returned but the diagnostics recorded so far stay
    /// available through [`SummaryEngine::diagnostics`].
    pub async fn run(&mut self) -> Result<RunResult> {
        if self.navigator.state() != NavState::Idle {
            tracing::warn!("Refusing to rerun an engine stopped on page {}", self.navigator.page());
            return Err(SummaryError::EngineSpent {
                page: self.navigator.page(),
            });
        }
        tracing::info!("Starting multi-page summary");

        let traversal = match self.traverse().await {
            Ok(traversal) => traversal,
            Err(e) => {
                let page = e.page().unwrap_or_else(|| self.navigator.page());
                self.diagnostics.record(DiagnosticEvent::RunFailed {
                    page,
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let result = RunResult::new(
            traversal.orders,
            traversal.pages,
            traversal.rows_skipped,
            self.grand_total,
        );
        tracing::info!(
            "Summary complete: {} orders across {} pages",
            result.orders.len(),
            result.pages_processed
        );
        self.diagnostics.record(DiagnosticEvent::RunCompleted {
            pages: result.pages_processed,
            orders: result.orders.len(),
        });
        Ok(result)
    }

    /// Runs to completion and hands the result to `sink` exactly once.
    pub async fn run_and_present<P>(&mut self, sink: &mut P) -> Result<RunResult>
    where
        P: PresentationSink + ?Sized,
    {
        let result = self.run().await?;
        sink.present(&result).await?;
        Ok(result)
    }

    async fn traverse(&mut self) -> Result<Traversal> {
        let mut traversal = Traversal {
            orders: BTreeMap::new(),
            pages: 0,
            rows_skipped: 0,
        };

        loop {
            let page = self.navigator.page();
            tracing::info!("Processing page {}...", page);
            self.diagnostics.record(DiagnosticEvent::PageStarted { page });

            let rows = self.navigator.current_rows().await?;
            tracing::info!("Found {} rows on page {}", rows.len(), page);

            let summary = summarize_page(page, &rows, &self.selectors, &mut self.diagnostics);
            self.diagnostics.record(DiagnosticEvent::PageProcessed {
                page,
                rows: summary.rows_seen,
                skipped: summary.rows_skipped,
                orders: summary.orders.len(),
            });
            traversal.pages += 1;
            traversal.rows_skipped += summary.rows_skipped;
            merge_page(&mut traversal.orders, summary);

            match self.navigator.try_advance().await? {
                Advance::Moved => continue,
                Advance::LastPage => {
                    tracing::info!("No more pages. Finishing summary.");
                    break;
                }
                Advance::NoNextControl => {
                    self.diagnostics.record(DiagnosticEvent::NoNextControl { page });
                    break;
                }
            }
        }

        Ok(traversal)
    }
}
