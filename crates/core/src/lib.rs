pub mod config;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use config::DashboardConfig;
use errors::{CoreError, TICKERS_FAILED};
use models::{
    chart::ChartData,
    instrument::Instrument,
    metrics::{DerivedMetric, MetricCard},
    request::SimulationRequest,
    state::RunToken,
};
use providers::{http::HttpSimulationProvider, traits::SimulationProvider};
use services::{
    chart_service,
    metrics_service::{derive_metrics, metric_card},
    request_controller::SimulationRequestController,
    selection_store::InstrumentSelectionStore,
};

/// Monthly amount pre-filled in the form.
pub const DEFAULT_MONTHLY_INVESTMENT: f64 = 100.0;

/// Placeholder shown under the chart while a run is busy and nothing is revealed.
pub const LOADING_MESSAGE: &str = "Generating chart...";

/// Placeholder shown before the first run.
pub const IDLE_MESSAGE: &str = "Click \"Run Simulation\" to see the investment growth.";

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default()
}

/// Main entry point for the dashboard core.
///
/// Holds the form state (selection, date range, monthly amount) and the
/// request controller. The view layer edits the form, calls
/// [`Dashboard::run_simulation`], and renders [`Dashboard::snapshot`] on every frame.
#[must_use]
pub struct Dashboard<P: SimulationProvider + ?Sized = dyn SimulationProvider> {
    config: DashboardConfig,
    selection: InstrumentSelectionStore,
    start_date: NaiveDate,
    end_date: NaiveDate,
    monthly_investment: f64,
    controller: SimulationRequestController<P>,
    universe_error: Option<String>,
}

impl<P: SimulationProvider + ?Sized> std::fmt::Debug for Dashboard<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("service", &self.config.service_base_url)
            .field("selected", &self.selection.selected())
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("monthly_investment", &self.monthly_investment)
            .field("phase", &self.controller.state().phase.name())
            .finish()
    }
}

/// Everything the view needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub phase: &'static str,
    pub busy: bool,
    pub can_run: bool,
    pub error: Option<String>,
    pub revealed_points: usize,
    pub total_points: usize,
    pub chart: Option<ChartData>,
    pub metrics: Vec<DerivedMetric>,
    pub cards: Vec<MetricCard>,
    /// Placeholder text when there is no chart to draw.
    pub placeholder: Option<&'static str>,
}

impl Dashboard<HttpSimulationProvider> {
    /// Dashboard talking to the HTTP simulation service at `config.service_base_url`.
    pub fn connect(config: DashboardConfig) -> Result<Self, CoreError> {
        let provider = Arc::new(HttpSimulationProvider::new(&config)?);
        Self::with_provider(config, provider)
    }
}

impl<P: SimulationProvider + ?Sized> Dashboard<P> {
    /// Dashboard with default form values and any provider.
    pub fn with_provider(config: DashboardConfig, provider: Arc<P>) -> Result<Self, CoreError> {
        let config = config.validate()?;
        let controller = SimulationRequestController::new(provider, config.reveal_interval());
        Ok(Self {
            config,
            selection: InstrumentSelectionStore::with_defaults(),
            start_date: default_start_date(),
            end_date: chrono::Local::now().date_naive(),
            monthly_investment: DEFAULT_MONTHLY_INVESTMENT,
            controller,
            universe_error: None,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn controller(&self) -> &SimulationRequestController<P> {
        &self.controller
    }

    // ── Instrument universe & selection ─────────────────────────────

    /// Fetch the instrument universe. On failure the error message is kept
    /// for display and the previous universe stays in place.
    pub async fn load_instruments(&mut self) -> Result<usize, CoreError> {
        match self.controller.provider().list_instruments().await {
            Ok(instruments) => {
                self.selection.set_universe(instruments);
                self.universe_error = None;
                let count = self.selection.universe().len();
                info!(count, "instrument universe loaded");
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "failed to load instrument universe");
                self.universe_error = Some(match &e {
                    CoreError::Service { .. } => TICKERS_FAILED.to_string(),
                    other => other.user_message(),
                });
                Err(e)
            }
        }
    }

    pub fn universe_error(&self) -> Option<&str> {
        self.universe_error.as_deref()
    }

    pub fn set_search_term(&mut self, text: impl Into<String>) {
        self.selection.set_search_term(text);
    }

    /// Select `symbol`. No-op (returns false) if already selected.
    pub fn add_instrument(&mut self, symbol: &str) -> bool {
        self.selection.add_instrument(Instrument::new(symbol))
    }

    /// Deselect `symbol`. No-op (returns false) if not selected.
    pub fn remove_instrument(&mut self, symbol: &str) -> bool {
        self.selection.remove_instrument(&Instrument::new(symbol))
    }

    #[must_use]
    pub fn available_instruments(&self) -> Vec<&Instrument> {
        self.selection.available()
    }

    #[must_use]
    pub fn selected_instruments(&self) -> &[Instrument] {
        self.selection.selected()
    }

    pub fn selection(&self) -> &InstrumentSelectionStore {
        &self.selection
    }

    // ── Form fields ─────────────────────────────────────────────────

    pub fn set_start_date(&mut self, date: NaiveDate) {
        self.start_date = date;
    }

    pub fn set_end_date(&mut self, date: NaiveDate) {
        self.end_date = date;
    }

    pub fn set_monthly_investment(&mut self, amount: f64) {
        self.monthly_investment = amount;
    }

    /// Set the amount from raw input text. Unparseable text becomes NaN and
    /// is rejected when the run is validated.
    pub fn set_monthly_investment_text(&mut self, text: &str) {
        self.monthly_investment = text.trim().parse().unwrap_or(f64::NAN);
    }

    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date, self.end_date)
    }

    pub fn monthly_investment(&self) -> f64 {
        self.monthly_investment
    }

    /// The request the current form would submit.
    pub fn request(&self) -> SimulationRequest {
        SimulationRequest::new(
            self.selection.selected().to_vec(),
            self.start_date,
            self.end_date,
            self.monthly_investment,
        )
    }

    // ── Runs ────────────────────────────────────────────────────────

    /// Whether the submit action is enabled.
    #[must_use]
    pub fn can_run(&self) -> bool {
        !self.controller.is_busy() && !self.selection.selected().is_empty()
    }

    /// Submit the current form. See [`SimulationRequestController::run`].
    ///
    /// A new run clears any earlier universe load error from the status line.
    pub async fn run_simulation(&mut self) -> Result<RunToken, CoreError> {
        self.universe_error = None;
        self.controller.run(self.request()).await
    }

    /// Resolves when the active reveal finishes.
    pub async fn wait_for_reveal(&self) -> bool {
        self.controller.wait_for_reveal().await
    }

    /// Dismiss the current result and go back to idle.
    pub fn reset(&self) {
        self.controller.reset();
    }

    /// Stop any active reveal. Call when the view goes away.
    pub fn shutdown(&self) {
        self.controller.shutdown();
    }

    // ── View ────────────────────────────────────────────────────────

    /// Chart, metrics and status for the currently revealed prefix.
    ///
    /// Lines and metrics follow the current selection order; the monthly
    /// amount is the one submitted with the displayed run.
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        let state = self.controller.state();
        let prefix = self.controller.revealed();
        let selected = self.selection.selected();
        let monthly = self
            .controller
            .active_request()
            .map(|r| r.monthly_investment)
            .unwrap_or(self.monthly_investment);

        let chart = chart_service::build_chart(prefix.points(), selected);
        let metrics = if prefix.is_empty() {
            Vec::new()
        } else {
            derive_metrics(prefix.points(), selected, monthly)
        };
        let cards = metrics.iter().map(metric_card).collect();

        let placeholder = match (&chart, state.is_busy()) {
            (Some(_), _) => None,
            (None, true) => Some(LOADING_MESSAGE),
            (None, false) => Some(IDLE_MESSAGE),
        };

        DashboardSnapshot {
            phase: state.phase.name(),
            busy: state.is_busy(),
            can_run: !state.is_busy() && !selected.is_empty(),
            error: state.error().map(str::to_string).or_else(|| self.universe_error.clone()),
            revealed_points: prefix.len(),
            total_points: prefix.series().len(),
            chart,
            metrics,
            cards,
            placeholder,
        }
    }
}
