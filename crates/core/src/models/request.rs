use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::CoreError;
use super::instrument::Instrument;

/// Date format used on the wire for both request and response.
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parameters of one simulation run.
///
/// Construct freely, then call [`SimulationRequest::validate`] before dispatch;
/// the controller refuses to send a request that fails it.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub instruments: Vec<Instrument>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Amount contributed to each instrument on every month of the range.
    pub monthly_investment: f64,
}

impl SimulationRequest {
    pub fn new(
        instruments: Vec<Instrument>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        monthly_investment: f64,
    ) -> Self {
        Self {
            instruments,
            start_date,
            end_date,
            monthly_investment,
        }
    }

    /// Structural validation performed client-side before any network call.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.instruments.is_empty() {
            return Err(CoreError::ValidationError(
                "Select at least one ticker".into(),
            ));
        }

        let mut seen = HashSet::with_capacity(self.instruments.len());
        for instrument in &self.instruments {
            if !seen.insert(instrument) {
                return Err(CoreError::ValidationError(format!(
                    "Ticker {instrument} is selected more than once"
                )));
            }
        }

        if self.start_date > self.end_date {
            return Err(CoreError::ValidationError(format!(
                "Start date ({}) must not be after end date ({})",
                self.start_date, self.end_date
            )));
        }

        if !self.monthly_investment.is_finite() || self.monthly_investment <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Monthly investment must be a positive number, got {}",
                self.monthly_investment
            )));
        }

        Ok(())
    }

    /// Body of `POST /api/simulation`.
    pub fn to_wire(&self) -> SimulationRequestBody {
        SimulationRequestBody {
            tickers: self.instruments.iter().map(|i| i.symbol().to_string()).collect(),
            start_date: self.start_date.format(WIRE_DATE_FORMAT).to_string(),
            end_date: self.end_date.format(WIRE_DATE_FORMAT).to_string(),
            monthly_investment: self.monthly_investment,
        }
    }
}

/// JSON shape the simulation service expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequestBody {
    pub tickers: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub monthly_investment: f64,
}
