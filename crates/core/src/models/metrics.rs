use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::instrument::Instrument;

/// Summary statistics for one instrument over the revealed part of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetric {
    pub instrument: Instrument,

    /// Date of the first point with a strictly positive value; `None` if there is none.
    pub first_contribution_date: Option<NaiveDate>,

    /// Number of points with a strictly positive value.
    pub invested_months: usize,

    /// `monthly_investment * invested_months`
    pub total_invested: f64,

    /// Value at the last revealed point, 0 when nothing is revealed.
    pub final_value: f64,

    /// `(final_value - total_invested) / total_invested * 100`, or exactly 0
    /// when nothing was invested.
    pub return_rate_percent: f64,
}

/// Display-ready strings for one summary card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCard {
    pub instrument: String,
    /// "YYYY-MM-DD" or "N/A"
    pub start_date: String,
    pub final_value: String,
    pub total_invested: String,
    /// e.g. "2.50%"
    pub return_rate: String,
    /// Drives the gain/loss colour.
    pub is_gain: bool,
}
