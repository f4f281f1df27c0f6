use crate::domain::ports::RowSource;
use crate::utils::error::{Result, SummaryError};
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(10_000);
/// One rendering frame at 60Hz.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(16);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorConfig {
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    pub settle_delay: Duration,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    WaitingForRows,
    Ready,
    AdvanceRequested,
    WaitingForPageChange,
    Exhausted,
}

/// Outcome of asking the navigator to move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The next page is displayed and settled.
    Moved,
    /// The next-page control is disabled.
    LastPage,
    /// No pagination control was found; treated as the last page.
    NoNextControl,
}

/// Walks a [`RowSource`] page by page.
///
/// Both waits poll the source once per `poll_interval` and give up after
/// `wait_timeout`.
pub struct PageNavigator<S: RowSource> {
    source: S,
    config: NavigatorConfig,
    state: NavState,
    page: usize,
}

impl<S: RowSource> PageNavigator<S> {
    pub fn new(source: S, config: NavigatorConfig) -> Self {
        Self {
            source,
            config,
            state: NavState::Idle,
            page: 1,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// 1-based index of the page currently displayed.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Waits until the current page lists at least one row.
    pub async fn current_rows(&mut self) -> Result<Vec<S::Row>> {
        self.state = NavState::WaitingForRows;
        tracing::debug!("Waiting for rows on page {}", self.page);

        let source = &self.source;
        let rows = poll_until(self.config, || {
            let rows = source.current_rows();
            (!rows.is_empty()).then_some(rows)
        })
        .await
        .ok_or(SummaryError::RowsTimeout {
            page: self.page,
            timeout_ms: millis(self.config.wait_timeout),
        })?;

        self.state = NavState::Ready;
        Ok(rows)
    }

    /// Moves to the next page if the source offers one.
    ///
    /// Must only be called once the current page's rows are fully consumed.
    pub async fn try_advance(&mut self) -> Result<Advance> {
        match self.source.has_next_page() {
            Some(true) => {}
            Some(false) => {
                tracing::debug!("Next page control disabled on page {}", self.page);
                self.state = NavState::Exhausted;
                return Ok(Advance::LastPage);
            }
            None => {
                tracing::warn!("No pagination control found on page {}", self.page);
                self.state = NavState::Exhausted;
                return Ok(Advance::NoNextControl);
            }
        }

        let previous = self.source.current_page_token();
        self.state = NavState::AdvanceRequested;
        self.source.advance_to_next_page();

        self.state = NavState::WaitingForPageChange;
        tracing::debug!("Waiting for page {} to change (token {:?})", self.page, previous);

        let source = &self.source;
        poll_until(self.config, || {
            source
                .current_page_token()
                .filter(|token| previous.as_ref() != Some(token))
        })
        .await
        .ok_or(SummaryError::PageChangeTimeout {
            page: self.page,
            timeout_ms: millis(self.config.wait_timeout),
        })?;

        time::sleep(self.config.settle_delay).await;
        self.page += 1;
        self.state = NavState::Ready;
        Ok(Advance::Moved)
    }
}

/// Runs `check` once per poll interval until it yields a value or the wait
/// budget runs out. The first check happens immediately.
async fn poll_until<T>(config: NavigatorConfig, mut check: impl FnMut() -> Option<T>) -> Option<T> {
    let mut ticker = time::interval(config.poll_interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let polling = async {
        loop {
            ticker.tick().await;
            if let Some(value) = check() {
                return value;
            }
        }
    };

    time::timeout(config.wait_timeout, polling).await.ok()
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
