use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::request::SimulationRequest;
use crate::models::series::RevealedPrefix;
use crate::models::state::{RunEvent, RunPhase, RunState, RunToken};
use crate::providers::traits::SimulationProvider;
use crate::services::reveal_scheduler::{DisplayState, ProgressiveRevealScheduler, SharedDisplay};

/// Validates and submits simulation requests and owns the run lifecycle.
///
/// Every `run()` gets a fresh [`RunToken`]. Only the latest token may change
/// the run state or the displayed prefix, so overlapping runs (a second
/// submit while the first is still fetching or revealing) never mix data.
///
/// Methods take `&self`; two `run()` futures may be in flight at once.
pub struct SimulationRequestController<P: SimulationProvider + ?Sized> {
    provider: Arc<P>,
    state: Arc<Mutex<RunState>>,
    display: SharedDisplay,
    scheduler: Mutex<Option<ProgressiveRevealScheduler>>,
    last_token: AtomicU64,
    reveal_interval: Duration,
    /// Request of the latest run, kept for metrics (monthly amount).
    active_request: Mutex<Option<(RunToken, SimulationRequest)>>,
}

fn apply(state: &Mutex<RunState>, event: RunEvent) -> RunState {
    let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
    *guard = guard.transition(event);
    guard.clone()
}

impl<P: SimulationProvider + ?Sized> SimulationRequestController<P> {
    pub fn new(provider: Arc<P>, reveal_interval: Duration) -> Self {
        Self {
            provider,
            state: Arc::new(Mutex::new(RunState::default())),
            display: Arc::new(Mutex::new(DisplayState::default())),
            scheduler: Mutex::new(None),
            last_token: AtomicU64::new(0),
            reveal_interval,
            active_request: Mutex::new(None),
        }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Submit `request` and, on success, start revealing the returned series.
    ///
    /// Any reveal from an earlier run is cancelled before validation starts.
    /// Validation, transport, service and parse errors all end in
    /// `Failure(message)` and are also returned. If a newer run started while
    /// this one was waiting on the network, its result is discarded and
    /// [`CoreError::Superseded`] is returned.
    pub async fn run(&self, request: SimulationRequest) -> Result<RunToken, CoreError> {
        self.cancel_reveal();

        let token = RunToken(self.last_token.fetch_add(1, Ordering::SeqCst) + 1);
        apply(&self.state, RunEvent::Started(token));
        {
            let mut active = self.active_request.lock().unwrap_or_else(|e| e.into_inner());
            if active.as_ref().map_or(true, |(t, _)| *t < token) {
                *active = Some((token, request.clone()));
            }
        }
        self.display
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .claim(token);

        info!(
            run = %token,
            instruments = request.instruments.len(),
            start = %request.start_date,
            end = %request.end_date,
            "starting simulation run"
        );

        if let Err(e) = request.validate() {
            self.fail(token, &e);
            return Err(e);
        }

        let result = self.provider.simulate(&request).await;

        if self.current_token() != token {
            warn!(run = %token, latest = %self.current_token(), "discarding response of superseded run");
            return Err(CoreError::Superseded(token.0));
        }

        let series = match result {
            Ok(series) => Arc::new(series),
            Err(e) => {
                self.fail(token, &e);
                return Err(e);
            }
        };

        info!(run = %token, points = series.len(), provider = self.provider.name(), "simulation succeeded");
        apply(&self.state, RunEvent::Succeeded(token, Arc::clone(&series)));

        let state = Arc::clone(&self.state);
        let scheduler = ProgressiveRevealScheduler::start(
            token,
            series,
            Arc::clone(&self.display),
            self.reveal_interval,
            move |t| {
                apply(&state, RunEvent::RevealCompleted(t));
            },
        );

        let mut slot = self.scheduler.lock().unwrap_or_else(|e| e.into_inner());
        if self.current_token() != token {
            // A newer run started between the response and here; `scheduler` drops and cancels.
            return Err(CoreError::Superseded(token.0));
        }
        if let Some(mut previous) = slot.replace(scheduler) {
            previous.cancel();
        }
        Ok(token)
    }

    /// Cancel the active reveal, if any. Idempotent.
    pub fn cancel_reveal(&self) {
        let previous = self
            .scheduler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(mut scheduler) = previous {
            scheduler.cancel();
        }
    }

    /// Back to `Idle`, dropping the displayed result. Ignored while loading.
    pub fn reset(&self) {
        let before = self.state();
        if matches!(before.phase, RunPhase::Loading) {
            debug!(run = %before.token, "reset ignored while loading");
            return;
        }
        self.cancel_reveal();
        let after = apply(&self.state, RunEvent::Reset);
        self.display
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear(after.token);
    }

    /// Teardown: stop any timer so nothing writes to state without an owner.
    /// The run is no longer busy afterwards.
    pub fn shutdown(&self) {
        self.cancel_reveal();
        apply(&self.state, RunEvent::RevealCancelled(self.current_token()));
    }

    /// Resolves when the current reveal finishes. Returns false when there is
    /// no active reveal or it stopped without completing.
    pub async fn wait_for_reveal(&self) -> bool {
        let completion = self
            .scheduler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.completion());
        match completion {
            Some(completion) => completion.await,
            None => false,
        }
    }

    /// The request submitted by the latest run.
    pub fn active_request(&self) -> Option<SimulationRequest> {
        self.active_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|(_, request)| request.clone())
    }

    pub fn state(&self) -> RunState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn current_token(&self) -> RunToken {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).token
    }

    pub fn is_busy(&self) -> bool {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).is_busy()
    }

    /// The prefix currently exposed to the display layer.
    pub fn revealed(&self) -> RevealedPrefix {
        self.display
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .prefix()
            .clone()
    }

    fn fail(&self, token: RunToken, error: &CoreError) {
        let message = error.user_message();
        warn!(run = %token, error = %error, "simulation run failed");
        apply(&self.state, RunEvent::Failed(token, message));
        self.display
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear(token);
    }
}

impl<P: SimulationProvider + ?Sized> Drop for SimulationRequestController<P> {
    fn drop(&mut self) {
        self.cancel_reveal();
    }
}
