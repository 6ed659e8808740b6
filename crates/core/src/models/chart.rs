use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single (date, value) sample of one line.
///
/// Generated here; the charting widget only renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One line of the multi-series chart, one per selected instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    /// Instrument symbol, also the legend label.
    pub name: String,

    /// Stroke colour, `#rrggbb`.
    pub color: String,

    pub points: Vec<ChartPoint>,
}

/// Everything the charting widget needs for one frame of the reveal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// X axis categories, one per revealed point.
    pub dates: Vec<NaiveDate>,
    pub lines: Vec<LineSeries>,
}

/// Tooltip row for one line at a hovered date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipEntry {
    pub name: String,
    /// Full currency, e.g. "$1,234.56"
    pub value: String,
}
