use crate::errors::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reference datum an [Altitude] is expressed against.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AltitudeDatum {
    /// True altitude above mean sea level.
    #[default]
    MeanSeaLevel,
    /// Pressure altitude against the standard atmosphere.
    Pressure,
}

/// Geodetic height with its reference datum.
///
/// Blending two [Altitude]s only makes sense against the same datum,
/// which is why the delta operation is checked.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Altitude {
    /// Height in meters above the reference datum
    pub meters: f64,
    /// Reference datum
    pub datum: AltitudeDatum,
}

impl Altitude {
    /// Mean sea level [Altitude] from meters.
    pub const fn msl(meters: f64) -> Self {
        Self {
            meters,
            datum: AltitudeDatum::MeanSeaLevel,
        }
    }

    /// Pressure [Altitude] from meters.
    pub const fn pressure(meters: f64) -> Self {
        Self {
            meters,
            datum: AltitudeDatum::Pressure,
        }
    }

    /// Difference to `rhs` in meters, requires matching datums.
    pub fn checked_delta_m(&self, rhs: &Self) -> Result<f64, Error> {
        if self.datum != rhs.datum {
            return Err(Error::AltitudeDatumMismatch);
        }
        Ok(self.meters - rhs.meters)
    }

    /// Copy shifted by an offset in meters, preserving the datum.
    pub fn with_offset_m(&self, offset_m: f64) -> Self {
        Self {
            meters: self.meters + offset_m,
            datum: self.datum,
        }
    }
}

impl std::fmt::Display for Altitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.datum {
            AltitudeDatum::MeanSeaLevel => write!(f, "{:.1}m MSL", self.meters),
            AltitudeDatum::Pressure => write!(f, "{:.1}m STD", self.meters),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Altitude, AltitudeDatum};
    use crate::errors::Error;

    #[test]
    fn test_checked_delta() {
        let a = Altitude::msl(120.0);
        let b = Altitude::msl(100.0);
        assert_eq!(a.checked_delta_m(&b), Ok(20.0));

        let p = Altitude::pressure(100.0);
        assert_eq!(a.checked_delta_m(&p), Err(Error::AltitudeDatumMismatch));
    }

    #[test]
    fn test_offset() {
        let a = Altitude::msl(120.0).with_offset_m(-20.0);
        assert_eq!(a.meters, 100.0);
        assert_eq!(a.datum, AltitudeDatum::MeanSeaLevel);
    }
}
