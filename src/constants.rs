use std::f64::consts::PI;

/// Mean Earth radius in meters, used by all great circle calculations.
pub const EARTH_RADIUS_M: f64 = 6_371_000.8;

/// Hard cap on velocity based extrapolation. Beyond this the remote pilot
/// most likely timed out and the aircraft is frozen at the capped position.
pub const MAX_EXTRAPOLATION_MS: i64 = 7_000;

/// Window over which a freshly computed correction delta is blended out
/// by the velocity engine, 1 -> 0 linearly.
pub const CORRECTION_TIME_MS: i64 = 1_000;

/// Validity radius of an elevation sample taken for a single point.
pub const SINGLE_POINT_RADIUS_M: f64 = 250.0;

/// Per callsign situation history cap, oldest entries evicted beyond this.
pub const MAX_SITUATIONS_PER_CALLSIGN: usize = 50;

/// Ground distances below this count as "on the ground" numerically.
pub const DELTA_NEAR_GROUND_M: f64 = 0.5;

/// Altitude/elevation standard deviation considered "almost constant" (3 ft).
pub const ALLOWED_ALTITUDE_DEVIATION_M: f64 = 0.9144;

/// Elevation deltas beyond this cannot be interpolated between two samples (25 ft).
pub const MAX_DELTA_ELEVATION_M: f64 = 7.62;

/// Nose up deviation from the window mean pitch that flags a takeoff rotation (2.5 deg).
pub const ROTATE_UP_PITCH_RAD: f64 = 2.5 * PI / 180.0;

/// Equality margin for ground factors, used by the interpolation hysteresis.
pub const GROUND_FACTOR_EPSILON: f64 = 1.0E-6;

/// Ground factor at or above which a blended ground state counts as on ground.
pub const ON_GROUND_THRESHOLD: f64 = 0.5;

/// Extrapolation distance beyond the split time worth a diagnostic message.
pub const EXTRAPOLATION_LOG_THRESHOLD_MS: i64 = 100;

/// Ground speed above which near ground handling can be skipped (225 kts,
/// faster than any airliner close to the runway).
pub const FAST_AIRCRAFT_SPEED_M_S: f64 = 115.75;

/// Height above known terrain beyond which near ground handling can be skipped.
pub const SKIP_NEAR_GROUND_ALTITUDE_M: f64 = 400.0;

/// Ground speed below which an aircraft counts as stationary (2.5 km/h).
pub const MIN_MOVING_SPEED_M_S: f64 = 2.5 / 3.6;

/// CG fallback when neither the situation nor the model hints carry one.
pub const DEFAULT_CG_M: f64 = 2.5;

/// Rotate speed assumed surely airborne above, when no model hint exists (130 kts).
pub const SURE_ROTATE_SPEED_M_S: f64 = 66.9;

/// Scenery deviation can only be guessed below this AGL spread (2 ft).
pub const MAX_SCENERY_DEVIATION_M: f64 = 0.6096;
