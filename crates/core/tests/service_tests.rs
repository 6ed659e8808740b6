// ═══════════════════════════════════════════════════════════════════
// Service Tests — selection store, derived metrics, chart mapping
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use proptest::prelude::*;

use dca_dashboard_core::models::instrument::Instrument;
use dca_dashboard_core::models::series::SimulationPoint;
use dca_dashboard_core::services::chart_service::{
    build_chart, color_for, format_compact_currency, format_currency, format_percent, tooltip,
    PALETTE,
};
use dca_dashboard_core::services::metrics_service::{
    derive_metric, derive_metrics, metric_card, NO_START_DATE,
};
use dca_dashboard_core::services::selection_store::InstrumentSelectionStore;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn point(d: NaiveDate, values: &[(&str, f64)]) -> SimulationPoint {
    SimulationPoint::new(d, values.iter().map(|(s, v)| (Instrument::new(*s), *v)))
}

fn universe(symbols: &[&str]) -> Vec<Instrument> {
    symbols.iter().map(|s| Instrument::new(*s)).collect()
}

fn symbols(list: &[&Instrument]) -> Vec<String> {
    list.iter().map(|i| i.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════════════
// InstrumentSelectionStore
// ═══════════════════════════════════════════════════════════════════

mod selection_store {
    use super::*;

    fn store() -> InstrumentSelectionStore {
        let mut s = InstrumentSelectionStore::new();
        s.set_universe(universe(&["SPY", "QQQ", "VTI", "VOO", "IWM"]));
        s
    }

    #[test]
    fn defaults_select_spy_and_qqq() {
        let s = InstrumentSelectionStore::with_defaults();
        assert_eq!(s.selected(), &universe(&["SPY", "QQQ"])[..]);
    }

    #[test]
    fn available_excludes_selected() {
        let mut s = store();
        s.add_instrument("QQQ".into());
        assert_eq!(symbols(&s.available()), vec!["SPY", "VTI", "VOO", "IWM"]);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let mut s = store();
        s.set_search_term("v");
        assert_eq!(symbols(&s.available()), vec!["VTI", "VOO"]);
        s.set_search_term("Oo");
        assert_eq!(symbols(&s.available()), vec!["VOO"]);
    }

    #[test]
    fn filter_does_not_touch_selection() {
        let mut s = store();
        s.add_instrument("SPY".into());
        s.set_search_term("zzz");
        assert!(s.available().is_empty());
        assert_eq!(s.selected().len(), 1);
    }

    #[test]
    fn add_is_idempotent() {
        let mut s = store();
        assert!(s.add_instrument("SPY".into()));
        assert!(!s.add_instrument("SPY".into()));
        assert_eq!(s.selected(), &universe(&["SPY"])[..]);
    }

    #[test]
    fn add_appends_in_order() {
        let mut s = store();
        s.add_instrument("VTI".into());
        s.add_instrument("SPY".into());
        assert_eq!(s.selected(), &universe(&["VTI", "SPY"])[..]);
    }

    #[test]
    fn remove_unselected_is_noop() {
        let mut s = store();
        s.add_instrument("SPY".into());
        assert!(!s.remove_instrument(&"QQQ".into()));
        assert_eq!(s.selected(), &universe(&["SPY"])[..]);
    }

    #[test]
    fn remove_returns_instrument_to_available() {
        let mut s = store();
        s.add_instrument("SPY".into());
        assert!(s.remove_instrument(&"SPY".into()));
        assert!(s.available().contains(&&Instrument::new("SPY")));
    }

    #[test]
    fn universe_duplicates_dropped() {
        let mut s = InstrumentSelectionStore::new();
        s.set_universe(universe(&["SPY", "QQQ", "SPY"]));
        assert_eq!(s.universe(), &universe(&["SPY", "QQQ"])[..]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_available_and_selected_are_disjoint(
            ops in proptest::collection::vec((0usize..3, 0usize..6), 0..40),
            term in "[a-zA-Z]{0,2}",
        ) {
            let names = ["SPY", "QQQ", "VTI", "VOO", "IWM", "DIA"];
            let mut s = InstrumentSelectionStore::new();
            s.set_universe(universe(&names));
            s.set_search_term(term);

            for (op, idx) in ops {
                let i = Instrument::new(names[idx]);
                match op {
                    0 => { s.add_instrument(i); }
                    1 => { s.remove_instrument(&i); }
                    _ => {
                        let before = s.selected().to_vec();
                        let already = s.is_selected(&i);
                        s.add_instrument(i);
                        if already {
                            prop_assert_eq!(s.selected(), &before[..]);
                        }
                    }
                }

                for a in s.available() {
                    prop_assert!(!s.is_selected(a));
                }
                let mut seen = std::collections::HashSet::new();
                for sel in s.selected() {
                    prop_assert!(seen.insert(sel.clone()));
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Derived metrics
// ═══════════════════════════════════════════════════════════════════

mod metrics {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn two_month_spy_scenario() {
        let prefix = vec![
            point(date(2020, 1, 1), &[("SPY", 100.0)]),
            point(date(2020, 2, 1), &[("SPY", 205.0)]),
        ];
        let m = derive_metric(&prefix, &"SPY".into(), 100.0);
        assert_eq!(m.invested_months, 2);
        assert_eq!(m.total_invested, 200.0);
        assert_eq!(m.final_value, 205.0);
        assert!((m.return_rate_percent - 2.5).abs() < EPS);
        assert_eq!(m.first_contribution_date, Some(date(2020, 1, 1)));
    }

    #[test]
    fn all_zero_instrument_scenario() {
        let prefix = vec![
            point(date(2020, 1, 1), &[("SPY", 0.0)]),
            point(date(2020, 2, 1), &[("SPY", 0.0)]),
        ];
        let m = derive_metric(&prefix, &"SPY".into(), 50.0);
        assert_eq!(m.invested_months, 0);
        assert_eq!(m.total_invested, 0.0);
        assert_eq!(m.return_rate_percent, 0.0);
        assert_eq!(m.first_contribution_date, None);
        assert_eq!(metric_card(&m).start_date, NO_START_DATE);
    }

    #[test]
    fn empty_prefix_is_all_zero() {
        let m = derive_metric(&[], &"SPY".into(), 100.0);
        assert_eq!(m.final_value, 0.0);
        assert_eq!(m.invested_months, 0);
        assert_eq!(m.return_rate_percent, 0.0);
        assert!(!m.return_rate_percent.is_nan());
    }

    #[test]
    fn late_listing_starts_at_first_positive_value() {
        let prefix = vec![
            point(date(2020, 1, 1), &[("SPY", 100.0), ("NEW", 0.0)]),
            point(date(2020, 2, 1), &[("SPY", 210.0), ("NEW", 95.0)]),
            point(date(2020, 3, 1), &[("SPY", 320.0), ("NEW", 180.0)]),
        ];
        let m = derive_metric(&prefix, &"NEW".into(), 100.0);
        assert_eq!(m.first_contribution_date, Some(date(2020, 2, 1)));
        assert_eq!(m.invested_months, 2);
        assert_eq!(m.total_invested, 200.0);
        assert!((m.return_rate_percent - (-10.0)).abs() < EPS);
    }

    #[test]
    fn gap_months_are_not_counted() {
        // A month with no price reads as 0 and does not count.
        let prefix = vec![
            point(date(2020, 1, 1), &[("SPY", 100.0)]),
            point(date(2020, 2, 1), &[]),
            point(date(2020, 3, 1), &[("SPY", 310.0)]),
        ];
        let m = derive_metric(&prefix, &"SPY".into(), 100.0);
        assert_eq!(m.invested_months, 2);
        assert_eq!(m.final_value, 310.0);
    }

    #[test]
    fn final_value_is_last_point_even_if_zero() {
        let prefix = vec![
            point(date(2020, 1, 1), &[("SPY", 100.0)]),
            point(date(2020, 2, 1), &[("SPY", 0.0)]),
        ];
        let m = derive_metric(&prefix, &"SPY".into(), 100.0);
        assert_eq!(m.final_value, 0.0);
        assert!((m.return_rate_percent - (-100.0)).abs() < EPS);
    }

    #[test]
    fn metrics_follow_selection_order() {
        let prefix = vec![point(date(2020, 1, 1), &[("SPY", 100.0), ("QQQ", 100.0)])];
        let ms = derive_metrics(&prefix, &universe(&["QQQ", "SPY"]), 100.0);
        assert_eq!(ms[0].instrument, Instrument::new("QQQ"));
        assert_eq!(ms[1].instrument, Instrument::new("SPY"));
    }

    #[test]
    fn card_formatting() {
        let prefix = vec![
            point(date(2020, 1, 1), &[("SPY", 100.0)]),
            point(date(2020, 2, 1), &[("SPY", 205.0)]),
        ];
        let card = metric_card(&derive_metric(&prefix, &"SPY".into(), 100.0));
        assert_eq!(card.instrument, "SPY");
        assert_eq!(card.start_date, "2020-01-01");
        assert_eq!(card.final_value, "$205.00");
        assert_eq!(card.total_invested, "$200.00");
        assert_eq!(card.return_rate, "2.50%");
        assert!(card.is_gain);
    }

    fn arb_prefix() -> impl Strategy<Value = Vec<SimulationPoint>> {
        proptest::collection::vec(prop_oneof![Just(0.0), 0.0f64..50_000.0], 0..60).prop_map(
            |values| {
                values
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| {
                        let d = date(2000, 1, 1) + chrono::Months::new(i as u32);
                        point(d, &[("SPY", v)])
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_total_invested_is_monthly_times_months(
            prefix in arb_prefix(),
            monthly in 1.0f64..5_000.0,
        ) {
            for len in 0..=prefix.len() {
                let m = derive_metric(&prefix[..len], &"SPY".into(), monthly);
                prop_assert_eq!(m.total_invested, monthly * m.invested_months as f64);
                prop_assert!(m.invested_months <= len);
                if m.total_invested == 0.0 {
                    prop_assert_eq!(m.return_rate_percent, 0.0);
                    prop_assert!(m.first_contribution_date.is_none());
                }
                prop_assert!(m.return_rate_percent.is_finite());
            }
        }

        #[test]
        fn prop_invested_months_grows_with_prefix(prefix in arb_prefix()) {
            let mut last = 0;
            for len in 0..=prefix.len() {
                let m = derive_metric(&prefix[..len], &"SPY".into(), 100.0);
                prop_assert!(m.invested_months >= last);
                last = m.invested_months;
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Chart mapping
// ═══════════════════════════════════════════════════════════════════

mod chart {
    use super::*;

    fn prefix() -> Vec<SimulationPoint> {
        vec![
            point(date(2020, 1, 1), &[("SPY", 100.0), ("QQQ", 100.0)]),
            point(date(2020, 2, 1), &[("SPY", 205.0), ("QQQ", 190.0)]),
        ]
    }

    #[test]
    fn empty_prefix_has_no_chart() {
        assert!(build_chart(&[], &universe(&["SPY"])).is_none());
    }

    #[test]
    fn one_line_per_selected_instrument() {
        let chart = build_chart(&prefix(), &universe(&["SPY", "QQQ"])).unwrap();
        assert_eq!(chart.dates, vec![date(2020, 1, 1), date(2020, 2, 1)]);
        assert_eq!(chart.lines.len(), 2);
        assert_eq!(chart.lines[0].name, "SPY");
        assert_eq!(chart.lines[0].points[1].value, 205.0);
        assert_eq!(chart.lines[1].points[1].value, 190.0);
    }

    #[test]
    fn colours_follow_selection_position() {
        let chart = build_chart(&prefix(), &universe(&["QQQ", "SPY"])).unwrap();
        assert_eq!(chart.lines[0].color, PALETTE[0]);
        assert_eq!(chart.lines[1].color, PALETTE[1]);
    }

    #[test]
    fn colours_stable_across_ticks() {
        let selected = universe(&["SPY", "QQQ"]);
        let p = prefix();
        let short = build_chart(&p[..1], &selected).unwrap();
        let long = build_chart(&p, &selected).unwrap();
        for (a, b) in short.lines.iter().zip(&long.lines) {
            assert_eq!(a.color, b.color);
        }
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(color_for(0), color_for(PALETTE.len()));
        assert_eq!(color_for(7), PALETTE[1]);
    }

    #[test]
    fn unknown_instrument_plots_zero() {
        let chart = build_chart(&prefix(), &universe(&["VTI"])).unwrap();
        assert!(chart.lines[0].points.iter().all(|p| p.value == 0.0));
    }

    #[test]
    fn tooltip_uses_full_currency() {
        let p = point(date(2020, 1, 1), &[("SPY", 1234.5)]);
        let rows = tooltip(&p, &universe(&["SPY"]));
        assert_eq!(rows[0].name, "SPY");
        assert_eq!(rows[0].value, "$1,234.50");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Currency formatting
// ═══════════════════════════════════════════════════════════════════

mod formatting {
    use super::*;

    #[test]
    fn currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(5.0), "$5.00");
        assert_eq!(format_currency(1234.567), "$1,234.57");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-42.1), "-$42.10");
        assert_eq!(format_currency(-0.001), "$0.00");
    }

    #[test]
    fn compact_currency() {
        assert_eq!(format_compact_currency(0.0), "$0");
        assert_eq!(format_compact_currency(1.234), "$1.2");
        assert_eq!(format_compact_currency(950.0), "$950");
        assert_eq!(format_compact_currency(1000.0), "$1K");
        assert_eq!(format_compact_currency(1234.0), "$1.2K");
        assert_eq!(format_compact_currency(12_345.0), "$12K");
        assert_eq!(format_compact_currency(123_456.0), "$123K");
        assert_eq!(format_compact_currency(3_400_000.0), "$3.4M");
        assert_eq!(format_compact_currency(2_500_000_000.0), "$2.5B");
        assert_eq!(format_compact_currency(-1500.0), "-$1.5K");
    }

    #[test]
    fn compact_rounding_carries_to_next_unit() {
        assert_eq!(format_compact_currency(999_999.0), "$1M");
        assert_eq!(format_compact_currency(999.9), "$1K");
    }

    #[test]
    fn non_finite() {
        assert_eq!(format_currency(f64::NAN), "$NaN");
        assert_eq!(format_compact_currency(f64::INFINITY), "$∞");
    }

    #[test]
    fn percent() {
        assert_eq!(format_percent(2.5), "2.50%");
        assert_eq!(format_percent(-10.0), "-10.00%");
        assert_eq!(format_percent(0.0), "0.00%");
    }
}
