use serde::{Deserialize, Serialize};

/// A tradable symbol the user can include in a simulation (e.g. "SPY", "QQQ").
///
/// Opaque: compared byte-for-byte, never case-folded. Only the search filter
/// in the selection store is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instrument(String);

impl Instrument {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn symbol(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match used by the search filter.
    /// An empty term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        term.is_empty() || self.0.to_lowercase().contains(&term.to_lowercase())
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Instrument {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

impl From<String> for Instrument {
    fn from(symbol: String) -> Self {
        Self(symbol)
    }
}

impl AsRef<str> for Instrument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
