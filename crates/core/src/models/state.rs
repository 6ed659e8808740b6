use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::series::SimulationSeries;

/// Identifies one `run()` call. Tokens only grow; the highest one owns the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RunToken(pub u64);

impl std::fmt::Display for RunToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the most recent run.
#[derive(Debug, Clone, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Loading,
    Success(Arc<SimulationSeries>),
    Failure(String),
}

impl RunPhase {
    pub fn name(&self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::Loading => "loading",
            RunPhase::Success(_) => "success",
            RunPhase::Failure(_) => "failure",
        }
    }
}

/// Inputs to [`RunState::transition`].
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A new run was started; it takes ownership regardless of current phase.
    Started(RunToken),
    Succeeded(RunToken, Arc<SimulationSeries>),
    Failed(RunToken, String),
    /// The scheduler of this run exposed its last point.
    RevealCompleted(RunToken),
    /// The reveal of this run was stopped with no newer run taking over.
    RevealCancelled(RunToken),
    /// The user dismissed the result; back to idle.
    Reset,
}

/// Immutable snapshot of the request lifecycle.
///
/// `Idle → Loading → (Success | Failure) → Idle`, with `Started` re-entering
/// `Loading` from any phase. Events carrying a stale token are ignored.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    pub token: RunToken,
    pub phase: RunPhase,
    /// True between `Succeeded` and `RevealCompleted` of the same run.
    pub revealing: bool,
}

impl RunState {
    /// Pure transition function; returns the next state.
    pub fn transition(&self, event: RunEvent) -> RunState {
        match event {
            RunEvent::Started(token) if token > self.token => RunState {
                token,
                phase: RunPhase::Loading,
                revealing: false,
            },
            RunEvent::Succeeded(token, series)
                if token == self.token && matches!(self.phase, RunPhase::Loading) =>
            {
                RunState {
                    token,
                    revealing: !series.is_empty(),
                    phase: RunPhase::Success(series),
                }
            }
            RunEvent::Failed(token, message)
                if token == self.token && matches!(self.phase, RunPhase::Loading) =>
            {
                RunState {
                    token,
                    phase: RunPhase::Failure(message),
                    revealing: false,
                }
            }
            RunEvent::RevealCompleted(token) | RunEvent::RevealCancelled(token)
                if token == self.token && self.revealing =>
            {
                RunState {
                    revealing: false,
                    ..self.clone()
                }
            }
            RunEvent::Reset if !matches!(self.phase, RunPhase::Loading) => RunState {
                token: self.token,
                phase: RunPhase::Idle,
                revealing: false,
            },
            _ => self.clone(),
        }
    }

    /// Fetching, or still animating the result. The submit action is disabled while busy.
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, RunPhase::Loading) || self.revealing
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            RunPhase::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn series(&self) -> Option<&Arc<SimulationSeries>> {
        match &self.phase {
            RunPhase::Success(series) => Some(series),
            _ => None,
        }
    }
}
