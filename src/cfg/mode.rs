use crate::errors::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interpolation engine selection.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// True interpolation between two bracketing network samples.
    /// Smooth, works with any client, lags by one update interval.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "linear"))]
    Linear,

    /// Extrapolation from the latest sample and its velocity vector.
    /// Renders ahead of the newest packet, needs velocity capable
    /// clients. "spline" is accepted as a legacy alias.
    #[cfg_attr(feature = "serde", serde(alias = "velocity", alias = "spline"))]
    Velocity,
}

impl std::str::FromStr for Mode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        match s.trim() {
            "linear" => Ok(Self::Linear),
            "velocity" | "spline" => Ok(Self::Velocity),
            _ => Err(Error::InvalidMode),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Velocity => write!(f, "velocity"),
        }
    }
}
