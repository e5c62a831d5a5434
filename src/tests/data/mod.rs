//! Shared builders for the test suites.

use hifitime::{Duration, Epoch, Unit};

use crate::{
    callsign::Callsign,
    geo::{Altitude, Coordinate, ElevationInfo, ElevationPlane},
    situation::{AircraftSituation, GroundDetails, GroundState},
};

/// Fixed base timestamp so every run can be debugged.
pub fn test_epoch() -> Epoch {
    Epoch::from_unix_milliseconds(1_425_000_000_000.0)
}

/// Deterministic situation sample `number` (0 = latest) of a history:
/// every pose value is derived from the number, timestamps walk into the
/// past by `delta`, all samples share the latency `offset`.
pub fn test_situation(
    callsign: &Callsign,
    number: usize,
    ts: Epoch,
    delta: Duration,
    offset: Duration,
) -> AircraftSituation {
    let n = number as f64;
    let position = Coordinate::from_lat_lon_deg(n, n, Altitude::msl(1000.0 + n));
    let mut situation = AircraftSituation::new(
        callsign.clone(),
        position,
        (n * 10.0).to_radians(),
        n.to_radians(),
        n.to_radians(),
        n * 10.0 / 3.6,
    )
    .with_timestamp(ts - delta.to_seconds() * n * Unit::Second)
    .with_time_offset(offset);
    situation.set_ground_elevation_checked(
        Some(ElevationPlane::single_point(position, 0.0)),
        ElevationInfo::Test,
    );
    situation
}

/// Latest-first history of `count` samples built by [test_situation].
pub fn test_history(
    callsign: &Callsign,
    count: usize,
    ts: Epoch,
    delta: Duration,
    offset: Duration,
) -> Vec<AircraftSituation> {
    (0..count)
        .map(|number| test_situation(callsign, number, ts, delta, offset))
        .collect()
}

/// Grounded sample at a fixed airport position.
pub fn grounded_situation(callsign: &Callsign, ts: Epoch, elevation_m: f64) -> AircraftSituation {
    let position = Coordinate::from_lat_lon_deg(48.3538, 11.7861, Altitude::msl(elevation_m + 2.0));
    let mut situation = AircraftSituation::new(callsign.clone(), position, 0.0, 0.0, 0.0, 0.0)
        .with_timestamp(ts)
        .with_ground_state(GroundState::FULLY_ON_GROUND, GroundDetails::Reported);
    situation.cg_m = Some(2.0);
    situation.set_ground_elevation_checked(
        Some(ElevationPlane::single_point(position, elevation_m)),
        ElevationInfo::Test,
    );
    situation
}
