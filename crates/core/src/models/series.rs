use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::CoreError;
use super::instrument::Instrument;
use super::request::WIRE_DATE_FORMAT;

/// One dated snapshot of cumulative invested value per instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationPoint {
    pub date: NaiveDate,
    pub values: BTreeMap<Instrument, f64>,
}

impl SimulationPoint {
    pub fn new(date: NaiveDate, values: impl IntoIterator<Item = (Instrument, f64)>) -> Self {
        Self {
            date,
            values: values.into_iter().collect(),
        }
    }

    /// Value of `instrument` at this point. Missing entries read as 0.
    pub fn value(&self, instrument: &Instrument) -> f64 {
        self.values.get(instrument).copied().unwrap_or(0.0)
    }
}

// ── Wire format: { "date": "YYYY-MM-DD", "<ticker>": number, ... } ──

#[derive(Deserialize)]
struct WirePoint {
    date: String,
    #[serde(flatten)]
    values: BTreeMap<String, f64>,
}

/// Ordered sequence of points, strictly ascending by date.
///
/// Immutable once built; a new run supersedes it with a fresh instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationSeries {
    points: Vec<SimulationPoint>,
}

impl SimulationSeries {
    /// Build a series, rejecting points that are not strictly ascending by date.
    pub fn new(points: Vec<SimulationPoint>) -> Result<Self, CoreError> {
        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(CoreError::Deserialization(format!(
                "series is not strictly ascending: {} followed by {}",
                pair[0].date, pair[1].date
            )));
        }
        Ok(Self { points })
    }

    /// Parse the body of a successful `POST /api/simulation` response.
    pub fn from_json(body: &str) -> Result<Self, CoreError> {
        let wire: Vec<WirePoint> = serde_json::from_str(body)?;
        let points = wire
            .into_iter()
            .map(|p| {
                let date = NaiveDate::parse_from_str(&p.date, WIRE_DATE_FORMAT).map_err(|e| {
                    CoreError::Deserialization(format!("invalid point date '{}': {e}", p.date))
                })?;
                let values = p.values.into_iter().map(|(k, v)| (Instrument::new(k), v));
                Ok(SimulationPoint::new(date, values))
            })
            .collect::<Result<Vec<_>, CoreError>>()?;
        Self::new(points)
    }

    pub fn points(&self) -> &[SimulationPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The first `len` points, clamped to the series length.
    pub fn prefix(&self, len: usize) -> &[SimulationPoint] {
        &self.points[..len.min(self.points.len())]
    }
}

/// The part of a series currently exposed to the display layer.
///
/// Always a prefix of the series it was cut from, so points from two runs
/// can never be interleaved.
#[derive(Debug, Clone, Default)]
pub struct RevealedPrefix {
    series: Arc<SimulationSeries>,
    len: usize,
}

impl RevealedPrefix {
    pub fn new(series: Arc<SimulationSeries>, len: usize) -> Self {
        let len = len.min(series.len());
        Self { series, len }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[SimulationPoint] {
        self.series.prefix(self.len)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the whole series is exposed.
    pub fn is_complete(&self) -> bool {
        self.len == self.series.len()
    }

    pub fn series(&self) -> &Arc<SimulationSeries> {
        &self.series
    }

    pub fn last(&self) -> Option<&SimulationPoint> {
        self.points().last()
    }
}
