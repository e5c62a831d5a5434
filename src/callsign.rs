#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Aircraft identity on the network, case insensitive (stored uppercased).
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Callsign(String);

impl Callsign {
    /// New [Callsign], trimmed and uppercased.
    pub fn new(callsign: impl AsRef<str>) -> Self {
        Self(callsign.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Callsign {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for Callsign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
