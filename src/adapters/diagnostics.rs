use crate::domain::ports::{DiagnosticEvent, DiagnosticSink};

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn record(&mut self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::PageStarted { page } => {
                tracing::debug!(target: "packing_summary::diagnostics", page, "page started");
            }
            DiagnosticEvent::RowSkipped { page, row, reason } => {
                tracing::warn!(target: "packing_summary::diagnostics", page, row, %reason, "row skipped");
            }
            DiagnosticEvent::BoxRecorded {
                order_id,
                box_id,
                dimensions,
                cbm,
            } => {
                tracing::debug!(
                    target: "packing_summary::diagnostics",
                    %order_id, %box_id, %dimensions, cbm,
                    "box recorded"
                );
            }
            DiagnosticEvent::PageProcessed {
                page,
                rows,
                skipped,
                orders,
            } => {
                tracing::info!(
                    target: "packing_summary::diagnostics",
                    page, rows, skipped, orders,
                    "page processed"
                );
            }
            DiagnosticEvent::NoNextControl { page } => {
                tracing::warn!(target: "packing_summary::diagnostics", page, "no next-page control, stopping");
            }
            DiagnosticEvent::RunCompleted { pages, orders } => {
                tracing::info!(target: "packing_summary::diagnostics", pages, orders, "run completed");
            }
            DiagnosticEvent::RunFailed { page, message } => {
                tracing::error!(target: "packing_summary::diagnostics", page, %message, "run failed");
            }
        }
    }
}

/// Keeps every event, optionally forwarding to another sink as well.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    events: Vec<DiagnosticEvent>,
    forward: Option<TracingDiagnostics>,
}

impl MemoryDiagnostics {
    pub fn with_tracing() -> Self {
        Self {
            events: Vec::new(),
            forward: Some(TracingDiagnostics),
        }
    }

    pub fn events(&self) -> &[DiagnosticEvent] {
        &self.events
    }

    pub fn skipped_rows(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, DiagnosticEvent::RowSkipped { .. }))
            .count()
    }

    pub fn into_events(self) -> Vec<DiagnosticEvent> {
        self.events
    }
}

impl DiagnosticSink for MemoryDiagnostics {
    fn record(&mut self, event: DiagnosticEvent) {
        if let Some(forward) = self.forward.as_mut() {
            forward.record(event.clone());
        }
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_diagnostics_collects_in_order() {
        let mut sink = MemoryDiagnostics::with_tracing();
        sink.record(DiagnosticEvent::PageStarted { page: 1 });
        sink.record(DiagnosticEvent::RowSkipped {
            page: 1,
            row: 4,
            reason: "missing required column(s): price".to_string(),
        });

        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.skipped_rows(), 1);
        assert_eq!(sink.into_events()[0], DiagnosticEvent::PageStarted { page: 1 });
    }
}
