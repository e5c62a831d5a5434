use crate::constants::{GROUND_FACTOR_EPSILON, ON_GROUND_THRESHOLD};

/// Provenance of a situation's ground state.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundDetails {
    /// Nothing known yet
    #[default]
    NotSet,
    /// Reported by the remote client over the network
    Reported,
    /// Produced by an interpolation step
    Interpolated,
    /// Derived from transmitted aircraft parts (gear state etc.)
    FromParts,
    /// Guessed from the situation history
    Guessed,
}

impl GroundDetails {
    /// Details reliable enough to interpolate the ground factor between
    /// two situations: inbound from the network or derived from parts.
    pub fn usable_for_interpolation(&self) -> bool {
        matches!(self, Self::Reported | Self::FromParts)
    }

    /// Details that arrived with the sample, as opposed to local guessing.
    pub fn is_inbound(&self) -> bool {
        matches!(self, Self::Reported | Self::FromParts)
    }
}

/// Ground contact of an aircraft at one point in time.
///
/// One tagged variant instead of a separate boolean plus factor, so the
/// hysteresis and blend rules stay exhaustive and a factor can never
/// coexist with "no information".
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub enum GroundState {
    /// Confidently airborne (ground factor 0)
    Airborne,
    /// Ground contact with a continuous [0, 1] factor estimate
    OnGround {
        /// Continuous ground contact estimate, 1.0 = firmly on the ground
        factor: f64,
    },
    /// No ground information available
    #[default]
    Unknown,
}

impl GroundState {
    /// Firmly on the ground.
    pub const FULLY_ON_GROUND: Self = Self::OnGround { factor: 1.0 };

    /// State from a continuous factor: negligible factors collapse to
    /// [GroundState::Airborne].
    pub fn from_factor(factor: f64) -> Self {
        if factor <= GROUND_FACTOR_EPSILON {
            Self::Airborne
        } else {
            Self::OnGround {
                factor: factor.clamp(0.0, 1.0),
            }
        }
    }

    /// State from a plain reported boolean.
    pub fn from_reported(on_ground: bool) -> Self {
        if on_ground {
            Self::FULLY_ON_GROUND
        } else {
            Self::Airborne
        }
    }

    /// Continuous ground factor, `None` without any information.
    pub fn factor(&self) -> Option<f64> {
        match self {
            Self::Airborne => Some(0.0),
            Self::OnGround { factor } => Some(*factor),
            Self::Unknown => None,
        }
    }

    /// Thresholded boolean for simulator display.
    pub fn is_on_ground(&self) -> bool {
        match self {
            Self::OnGround { factor } => *factor >= ON_GROUND_THRESHOLD,
            _ => false,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for GroundState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Airborne => write!(f, "airborne"),
            Self::OnGround { factor } => write!(f, "og({:.2})", factor),
            Self::Unknown => write!(f, "og(?)"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::GroundState;

    #[test]
    fn test_from_factor() {
        assert_eq!(GroundState::from_factor(0.0), GroundState::Airborne);
        assert_eq!(GroundState::from_factor(1.0E-9), GroundState::Airborne);
        assert_eq!(
            GroundState::from_factor(2.0),
            GroundState::OnGround { factor: 1.0 }
        );
        assert!(GroundState::from_factor(0.7).is_on_ground());
        assert!(!GroundState::from_factor(0.3).is_on_ground());
    }

    #[test]
    fn test_factor() {
        assert_eq!(GroundState::Airborne.factor(), Some(0.0));
        assert_eq!(GroundState::Unknown.factor(), None);
        assert_eq!(GroundState::FULLY_ON_GROUND.factor(), Some(1.0));
    }
}
