use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::DashboardConfig;
use crate::errors::{CoreError, TICKERS_FAILED};
use crate::models::instrument::Instrument;
use crate::models::request::SimulationRequest;
use crate::models::series::SimulationSeries;
use super::traits::SimulationProvider;

const TICKERS_PATH: &str = "/api/tickers";
const SIMULATION_PATH: &str = "/api/simulation";

/// HTTP client for the simulation backend.
///
/// - `GET  {base}/api/tickers`    → `["SPY", "QQQ", ...]`
/// - `POST {base}/api/simulation` → `[{ "date": "YYYY-MM-DD", "SPY": 123.4, ... }, ...]`
///
/// Non-2xx simulation responses carry `{ "error": "..." }`; that text is kept
/// verbatim in [`CoreError::Service`].
pub struct HttpSimulationProvider {
    client: Client,
    base_url: String,
}

impl HttpSimulationProvider {
    pub fn new(config: &DashboardConfig) -> Result<Self, CoreError> {
        let config = config.clone().validate()?;
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.request_timeout());
        Ok(Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: config.service_base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

// ── Service response types ──────────────────────────────────────────

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Turn a non-2xx response into `CoreError::Service`, keeping the
/// service-provided message when the body has one.
async fn service_error(resp: Response) -> CoreError {
    let status = resp.status().as_u16();
    let message = match resp.text().await {
        Ok(body) => serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_default(),
        Err(e) => {
            warn!(status, error = %e, "failed to read error body");
            String::new()
        }
    };
    CoreError::Service { status, message }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SimulationProvider for HttpSimulationProvider {
    fn name(&self) -> &str {
        "HTTP simulation service"
    }

    async fn list_instruments(&self) -> Result<Vec<Instrument>, CoreError> {
        let resp = self.client.get(self.url(TICKERS_PATH)).send().await?;

        if !resp.status().is_success() {
            return Err(CoreError::Service {
                status: resp.status().as_u16(),
                message: TICKERS_FAILED.into(),
            });
        }

        let body = resp.text().await?;
        let symbols: Vec<String> = serde_json::from_str(&body)?;
        debug!(count = symbols.len(), "fetched instrument universe");
        Ok(symbols.into_iter().map(Instrument::new).collect())
    }

    async fn simulate(&self, request: &SimulationRequest) -> Result<SimulationSeries, CoreError> {
        let body = request.to_wire();
        debug!(tickers = ?body.tickers, start = %body.start_date, end = %body.end_date, "posting simulation");

        let resp = self
            .client
            .post(self.url(SIMULATION_PATH))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(service_error(resp).await);
        }

        let text = resp.text().await?;
        SimulationSeries::from_json(&text)
    }
}
