use std::collections::HashSet;

use crate::models::instrument::Instrument;

/// Instruments selected when the dashboard first opens.
pub const DEFAULT_SELECTION: [&str; 2] = ["SPY", "QQQ"];

/// Tracks the instrument universe, the search filter and the selected subset.
///
/// The "available" list is always derived, never stored:
/// universe − selected − entries not matching the filter.
#[derive(Debug, Clone, Default)]
pub struct InstrumentSelectionStore {
    universe: Vec<Instrument>,
    search_term: String,
    /// Insertion order matters: it drives chart colours.
    selected: Vec<Instrument>,
}

impl InstrumentSelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with [`DEFAULT_SELECTION`].
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        for symbol in DEFAULT_SELECTION {
            store.add_instrument(Instrument::new(symbol));
        }
        store
    }

    /// Replace the universe. Duplicates are dropped, first occurrence wins.
    pub fn set_universe(&mut self, instruments: Vec<Instrument>) {
        let mut seen = HashSet::with_capacity(instruments.len());
        self.universe = instruments
            .into_iter()
            .filter(|i| seen.insert(i.clone()))
            .collect();
    }

    pub fn set_search_term(&mut self, text: impl Into<String>) {
        self.search_term = text.into();
    }

    /// Append `instrument` to the selection. Returns false (and changes nothing)
    /// if it was already selected.
    pub fn add_instrument(&mut self, instrument: Instrument) -> bool {
        if self.is_selected(&instrument) {
            return false;
        }
        self.selected.push(instrument);
        true
    }

    /// Remove `instrument` from the selection. Returns false if it was not selected.
    pub fn remove_instrument(&mut self, instrument: &Instrument) -> bool {
        let before = self.selected.len();
        self.selected.retain(|i| i != instrument);
        self.selected.len() != before
    }

    pub fn is_selected(&self, instrument: &Instrument) -> bool {
        self.selected.contains(instrument)
    }

    /// Universe entries that are not selected and match the search filter,
    /// in universe order.
    pub fn available(&self) -> Vec<&Instrument> {
        self.universe
            .iter()
            .filter(|i| !self.is_selected(i) && i.matches(&self.search_term))
            .collect()
    }

    pub fn selected(&self) -> &[Instrument] {
        &self.selected
    }

    pub fn universe(&self) -> &[Instrument] {
        &self.universe
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }
}
