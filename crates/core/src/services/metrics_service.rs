use crate::models::instrument::Instrument;
use crate::models::metrics::{DerivedMetric, MetricCard};
use crate::models::series::SimulationPoint;
use crate::services::chart_service::{format_currency, format_percent};

/// Shown instead of a start date when the instrument never held value.
pub const NO_START_DATE: &str = "N/A";

/// Compute the summary statistics of one instrument over a revealed prefix.
///
/// Pure: the same prefix and amount always give the same metric, whether the
/// prefix is the full series or a partial reveal.
pub fn derive_metric(
    prefix: &[SimulationPoint],
    instrument: &Instrument,
    monthly_investment: f64,
) -> DerivedMetric {
    let final_value = prefix.last().map(|p| p.value(instrument)).unwrap_or(0.0);

    let mut first_contribution_date = None;
    let mut invested_months = 0usize;
    for point in prefix {
        if point.value(instrument) > 0.0 {
            first_contribution_date.get_or_insert(point.date);
            invested_months += 1;
        }
    }

    let total_invested = monthly_investment * invested_months as f64;
    let return_rate_percent = if total_invested > 0.0 {
        (final_value - total_invested) / total_invested * 100.0
    } else {
        0.0
    };

    DerivedMetric {
        instrument: instrument.clone(),
        first_contribution_date,
        invested_months,
        total_invested,
        final_value,
        return_rate_percent,
    }
}

/// One metric per selected instrument, in selection order.
pub fn derive_metrics(
    prefix: &[SimulationPoint],
    instruments: &[Instrument],
    monthly_investment: f64,
) -> Vec<DerivedMetric> {
    instruments
        .iter()
        .map(|i| derive_metric(prefix, i, monthly_investment))
        .collect()
}

/// Format a metric for its summary card.
pub fn metric_card(metric: &DerivedMetric) -> MetricCard {
    MetricCard {
        instrument: metric.instrument.to_string(),
        start_date: metric
            .first_contribution_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| NO_START_DATE.to_string()),
        final_value: format_currency(metric.final_value),
        total_invested: format_currency(metric.total_invested),
        return_rate: format_percent(metric.return_rate_percent),
        is_gain: metric.return_rate_percent >= 0.0,
    }
}
