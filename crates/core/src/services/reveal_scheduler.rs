use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::models::series::{RevealedPrefix, SimulationSeries};
use crate::models::state::RunToken;

/// The single "currently displayed" prefix, owned by exactly one run.
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    owner: RunToken,
    prefix: RevealedPrefix,
}

pub type SharedDisplay = Arc<Mutex<DisplayState>>;

/// Outcome of one reveal tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    /// The prefix grew to this length.
    Advanced(usize),
    /// The prefix already covers the whole series.
    Complete,
    /// Another run owns the display; nothing was written.
    NotOwner,
}

impl DisplayState {
    /// Hand the display to `token` and clear it. Older tokens cannot reclaim it.
    pub fn claim(&mut self, token: RunToken) -> bool {
        if token < self.owner {
            return false;
        }
        self.owner = token;
        self.prefix = RevealedPrefix::empty();
        true
    }

    /// Attach the series of the owning run, with nothing revealed yet.
    pub fn attach(&mut self, token: RunToken, series: Arc<SimulationSeries>) -> bool {
        if token != self.owner {
            return false;
        }
        self.prefix = RevealedPrefix::new(series, 0);
        true
    }

    /// Drop whatever `token` had revealed (failure path).
    pub fn clear(&mut self, token: RunToken) {
        if token == self.owner {
            self.prefix = RevealedPrefix::empty();
        }
    }

    /// Expose one more point of the owner's series.
    pub fn reveal_next(&mut self, token: RunToken) -> RevealStep {
        if token != self.owner {
            return RevealStep::NotOwner;
        }
        if self.prefix.is_complete() {
            return RevealStep::Complete;
        }
        let next = self.prefix.len() + 1;
        self.prefix = RevealedPrefix::new(Arc::clone(self.prefix.series()), next);
        RevealStep::Advanced(next)
    }

    pub fn owner(&self) -> RunToken {
        self.owner
    }

    pub fn prefix(&self) -> &RevealedPrefix {
        &self.prefix
    }
}

/// Reveals a completed series one point per tick.
///
/// Runs as a spawned task on the current tokio runtime. Dropping the scheduler
/// cancels it, so a replaced or torn-down scheduler never keeps writing.
pub struct ProgressiveRevealScheduler {
    token: RunToken,
    cancelled: Arc<AtomicBool>,
    done: watch::Receiver<bool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressiveRevealScheduler {
    /// Start revealing `series` into `display` on behalf of run `token`.
    ///
    /// `on_complete` runs once, after the last point is exposed, and never
    /// after [`cancel`](Self::cancel).
    pub fn start<F>(
        token: RunToken,
        series: Arc<SimulationSeries>,
        display: SharedDisplay,
        period: Duration,
        on_complete: F,
    ) -> Self
    where
        F: FnOnce(RunToken) + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let (done_tx, done) = watch::channel(false);
        let total = series.len();

        {
            let mut guard = display.lock().unwrap_or_else(|e| e.into_inner());
            guard.attach(token, series);
        }

        let flag = Arc::clone(&cancelled);
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                if total > 0 {
                    ticker.tick().await;
                }
                if flag.load(Ordering::SeqCst) {
                    debug!(run = %token, "reveal cancelled");
                    return;
                }

                let step = {
                    let mut guard = display.lock().unwrap_or_else(|e| e.into_inner());
                    // Re-check under the lock: cancel() may have raced the tick.
                    if flag.load(Ordering::SeqCst) {
                        return;
                    }
                    guard.reveal_next(token)
                };

                match step {
                    RevealStep::Advanced(len) if len < total => {
                        trace!(run = %token, len, total, "revealed point");
                    }
                    RevealStep::Advanced(_) | RevealStep::Complete => {
                        debug!(run = %token, points = total, "reveal complete");
                        on_complete(token);
                        let _ = done_tx.send(true);
                        return;
                    }
                    RevealStep::NotOwner => {
                        debug!(run = %token, "display taken by a newer run, stopping reveal");
                        return;
                    }
                }
            }
        });

        Self {
            token,
            cancelled,
            done,
            handle: Some(handle),
        }
    }

    pub fn token(&self) -> RunToken {
        self.token
    }

    /// Stop all future ticks. Idempotent.
    pub fn cancel(&mut self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            debug!(run = %self.token, "cancelling reveal");
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// True once the last point has been revealed.
    pub fn is_complete(&self) -> bool {
        *self.done.borrow()
    }

    /// Resolves when the reveal completes, or when it stops for any other
    /// reason (cancelled, lost ownership). Returns whether it completed.
    pub fn completion(&self) -> impl std::future::Future<Output = bool> + Send + 'static {
        let mut done = self.done.clone();
        async move { done.wait_for(|d| *d).await.map(|_| ()).is_ok() }
    }
}

impl Drop for ProgressiveRevealScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
