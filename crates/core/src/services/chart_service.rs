use crate::models::chart::{ChartData, ChartPoint, LineSeries, TooltipEntry};
use crate::models::instrument::Instrument;
use crate::models::series::SimulationPoint;

/// Line colours, cycled by the instrument's position in the selection.
pub const PALETTE: [&str; 6] = [
    "#8884d8", "#82ca9d", "#ffc658", "#ff8042", "#0088FE", "#00C49F",
];

/// Compact notation suffixes, largest first.
const COMPACT_UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Colour of the line at `index` in the selected list.
pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Map the revealed prefix to chart lines, one per selected instrument.
///
/// Stateless: called once per reveal tick. Colours depend only on selection
/// order, so they stay put while points are appended. Returns `None` when
/// nothing has been revealed yet (the view shows a placeholder instead).
pub fn build_chart(prefix: &[SimulationPoint], selected: &[Instrument]) -> Option<ChartData> {
    if prefix.is_empty() {
        return None;
    }

    let lines = selected
        .iter()
        .enumerate()
        .map(|(index, instrument)| LineSeries {
            name: instrument.to_string(),
            color: color_for(index).to_string(),
            points: prefix
                .iter()
                .map(|p| ChartPoint {
                    date: p.date,
                    value: p.value(instrument),
                })
                .collect(),
        })
        .collect();

    Some(ChartData {
        dates: prefix.iter().map(|p| p.date).collect(),
        lines,
    })
}

/// Tooltip rows for a hovered point, in selection order.
pub fn tooltip(point: &SimulationPoint, selected: &[Instrument]) -> Vec<TooltipEntry> {
    selected
        .iter()
        .map(|instrument| TooltipEntry {
            name: instrument.to_string(),
            value: format_currency(point.value(instrument)),
        })
        .collect()
}

// ── Formatting ──────────────────────────────────────────────────────

/// US-dollar currency with thousands separators and cents: `$1,234.56`.
pub fn format_currency(value: f64) -> String {
    if let Some(s) = non_finite(value) {
        return s;
    }
    let cents = (value.abs() * 100.0).round() as u128;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}${}.{:02}",
        group_thousands(cents / 100),
        cents % 100
    )
}

/// Axis label in compact notation: `$950`, `$1.2K`, `$12K`, `$3.4M`.
pub fn format_compact_currency(value: f64) -> String {
    if let Some(s) = non_finite(value) {
        return s;
    }
    let abs = value.abs();
    let mut unit_index = COMPACT_UNITS.iter().position(|(size, _)| abs >= *size);
    let mut digits = compact_digits(match unit_index {
        Some(i) => abs / COMPACT_UNITS[i].0,
        None => abs,
    });

    // Rounding can carry into the next unit: 999_999 -> "1000K" -> "1M".
    if digits == "1000" {
        let bigger = match unit_index {
            None => Some(COMPACT_UNITS.len() - 1),
            Some(0) => None,
            Some(i) => Some(i - 1),
        };
        if let Some(i) = bigger {
            unit_index = Some(i);
            digits = "1".to_string();
        }
    }

    let suffix = unit_index.map(|i| COMPACT_UNITS[i].1).unwrap_or("");
    let sign = if value < 0.0 && digits != "0" { "-" } else { "" };
    format!("{sign}${digits}{suffix}")
}

/// Return rate with two decimals: `2.50%`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

fn non_finite(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("$NaN".to_string())
    } else if value.is_infinite() {
        Some(if value < 0.0 { "-$∞" } else { "$∞" }.to_string())
    } else {
        None
    }
}

/// Two significant digits below 10, whole numbers above.
fn compact_digits(x: f64) -> String {
    if x >= 10.0 {
        return format!("{x:.0}");
    }
    if x == 0.0 {
        return "0".to_string();
    }
    let decimals = (1 - x.log10().floor() as i32).max(0) as usize;
    let s = format!("{x:.decimals$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
