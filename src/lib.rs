#![doc = include_str!("../README.md")]

// private modules
mod callsign;
mod cfg;
mod change;
mod constants;
mod errors;
mod geo;
mod interpolation;
mod math;
mod provider;
mod situation;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::callsign::Callsign;
    pub use crate::cfg::{Mode, Setup};
    pub use crate::change::{
        is_const_ascending, is_const_descending, is_const_not_on_ground, is_const_on_ground,
        is_just_taking_off, is_just_touching_down, is_rotating_up, DeviationAndMean, ModelHints,
        SceneryDeviationHint, SituationChange,
    };
    pub use crate::constants::{
        CORRECTION_TIME_MS, EARTH_RADIUS_M, MAX_EXTRAPOLATION_MS, MAX_SITUATIONS_PER_CALLSIGN,
        SINGLE_POINT_RADIUS_M,
    };
    pub use crate::geo::{Altitude, AltitudeDatum, Coordinate, ElevationInfo, ElevationPlane};
    pub use crate::interpolation::{
        InterpolationLogger, InterpolationResult, InterpolationStatus, Interpolator,
        LinearInterpolant, LinearInterpolator, Pbh, SituationLog, VelocityInterpolant,
        VelocityInterpolator,
    };
    pub use crate::provider::{
        ElevationSource, MemoryElevationSource, MemorySetupSource, MemorySituationSource,
        NullElevationSource, SetupSource, SituationSource,
    };
    pub use crate::situation::{
        AircraftSituation, AircraftVelocity, AltitudeCorrection, GroundDetails, GroundState,
    };
    // re-export
    pub use hifitime::{Duration, Epoch, Unit};
}

// pub export
pub use errors::Error;
