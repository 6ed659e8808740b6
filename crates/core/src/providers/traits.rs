use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::instrument::Instrument;
use crate::models::request::SimulationRequest;
use crate::models::series::SimulationSeries;

/// Abstraction over the remote simulation service.
///
/// The HTTP implementation talks to the real backend; tests plug in an
/// in-memory provider. The simulation math lives entirely behind this trait.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SimulationProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// The universe of selectable instruments (`GET /api/tickers`).
    async fn list_instruments(&self) -> Result<Vec<Instrument>, CoreError>;

    /// Run a simulation (`POST /api/simulation`).
    /// Returns the full series, strictly ascending by date.
    async fn simulate(&self, request: &SimulationRequest) -> Result<SimulationSeries, CoreError>;
}
