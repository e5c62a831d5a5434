//! Analyzes a short, latest-first window of situations: ascent/descent,
//! takeoff/touchdown transitions, rotation, scenery deviation and local
//! on-ground guessing when the network does not report ground contact.

use itertools::Itertools;
use log::debug;

use hifitime::Epoch;

use crate::{
    callsign::Callsign,
    constants::{
        ALLOWED_ALTITUDE_DEVIATION_M, DEFAULT_CG_M, MAX_SCENERY_DEVIATION_M, ROTATE_UP_PITCH_RAD,
        SURE_ROTATE_SPEED_M_S,
    },
    math::{mean, standard_deviation_and_mean},
    situation::{AircraftSituation, GroundDetails, GroundState},
};

/// Every situation of the window is on the ground.
/// Vacuously true for windows of size 0 and 1.
pub fn is_const_on_ground(window: &[AircraftSituation]) -> bool {
    window.iter().all(|s| s.ground_state.is_on_ground())
}

/// Every situation of the window is airborne.
/// Vacuously true for windows of size 0 and 1.
pub fn is_const_not_on_ground(window: &[AircraftSituation]) -> bool {
    window.iter().all(|s| !s.ground_state.is_on_ground())
}

/// Only the latest situation left the ground, all older ones were on it.
pub fn is_just_taking_off(window: &[AircraftSituation]) -> bool {
    if window.len() < 2 {
        return false;
    }
    !window[0].ground_state.is_on_ground() && is_const_on_ground(&window[1..])
}

/// Only the latest situation touched the ground, all older ones were airborne.
pub fn is_just_touching_down(window: &[AircraftSituation]) -> bool {
    if window.len() < 2 {
        return false;
    }
    window[0].ground_state.is_on_ground() && is_const_not_on_ground(&window[1..])
}

/// Corrected altitude strictly increases towards the latest situation.
pub fn is_const_ascending(window: &[AircraftSituation]) -> bool {
    window
        .iter()
        .tuple_windows()
        .all(|(newer, older)| newer.corrected_altitude().meters > older.corrected_altitude().meters)
}

/// Corrected altitude strictly decreases towards the latest situation.
pub fn is_const_descending(window: &[AircraftSituation]) -> bool {
    window
        .iter()
        .tuple_windows()
        .all(|(newer, older)| newer.corrected_altitude().meters < older.corrected_altitude().meters)
}

/// The latest pitch exceeds the mean pitch of the older situations by the
/// rotation threshold: the nose is being pulled up.
pub fn is_rotating_up(window: &[AircraftSituation]) -> bool {
    if window.len() < 2 {
        return false;
    }
    let older_pitch_mean = mean(&window[1..].iter().map(|s| s.pitch_rad).collect::<Vec<_>>());
    window[0].pitch_rad > older_pitch_mean + ROTATE_UP_PITCH_RAD
}

/// What the guessed scenery deviation was based on.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneryDeviationHint {
    /// Not enough information for a guess
    #[default]
    NoInfo,
    /// Constant AGL distance while on the ground through the whole window
    AllOnGround,
    /// Constant AGL distance while airborne through the past window
    WasAirborne,
    /// Small AGL deviation close to the ground
    SmallAglDeviationNearGround,
}

/// Light per-aircraft facts the excluded model database would provide.
/// Everything is optional, the guessing degrades gracefully.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct ModelHints {
    /// Vertical takeoff aircraft: ground state cannot be guessed from movement
    pub is_vtol: bool,
    /// Center of gravity above ground (m)
    pub cg_m: Option<f64>,
    /// Rotate speed (m/s), airborne above roughly this ground speed
    pub rotate_speed_m_s: Option<f64>,
}

/// Standard deviation and mean of one observable over the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationAndMean {
    pub std_dev: f64,
    pub mean: f64,
}

/// Derived classification of a situation window, latest first.
///
/// Pure function of its input snapshot: computed on demand, never stored
/// beyond the step that needed it. Windows shorter than 2 situations
/// produce a null change on which every predicate reports false.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct SituationChange {
    callsign: Callsign,
    situations_count: usize,
    oldest_adjusted: Option<Epoch>,
    latest_adjusted: Option<Epoch>,

    const_ascending: bool,
    const_descending: bool,
    const_on_ground: bool,
    const_not_on_ground: bool,
    just_takeoff: bool,
    just_touchdown: bool,
    was_on_ground: bool,
    was_not_on_ground: bool,
    rotate_up: bool,

    ground_speed: Option<DeviationAndMean>,
    pitch_rad: Option<DeviationAndMean>,
    altitude_m: Option<DeviationAndMean>,
    elevation_m: Option<DeviationAndMean>,
    ground_distance_m: Option<DeviationAndMean>,
    max_ground_distance_m: Option<f64>,

    scenery_deviation_m: Option<f64>,
    scenery_deviation_cg_m: Option<f64>,
    deviation_hint: SceneryDeviationHint,
}

impl SituationChange {
    /// The null change: what windows shorter than 2 situations produce.
    pub fn null() -> Self {
        Self::default()
    }

    /// Analyzes a latest-first window. `cg_m` feeds the scenery
    /// deviation guess.
    pub fn new(window: &[AircraftSituation], cg_m: Option<f64>) -> Self {
        if window.len() < 2 {
            return Self::null();
        }
        let latest = &window[0];
        let oldest = &window[window.len() - 1];

        let mut change = Self {
            callsign: latest.callsign.clone(),
            situations_count: window.len(),
            oldest_adjusted: Some(oldest.adjusted_time()),
            latest_adjusted: Some(latest.adjusted_time()),
            const_ascending: is_const_ascending(window),
            const_descending: is_const_descending(window),
            const_on_ground: is_const_on_ground(window),
            const_not_on_ground: is_const_not_on_ground(window),
            just_takeoff: is_just_taking_off(window),
            just_touchdown: is_just_touching_down(window),
            rotate_up: is_rotating_up(window),
            ..Self::default()
        };

        if window.len() >= 3 {
            let past = &window[1..];
            change.was_on_ground = is_const_on_ground(past);
            change.was_not_on_ground = is_const_not_on_ground(past);
        }

        change.calculate_deviations(window, cg_m);
        change
    }

    fn calculate_deviations(&mut self, window: &[AircraftSituation], cg_m: Option<f64>) {
        let stats = |values: &[f64]| {
            let (std_dev, mean) = standard_deviation_and_mean(values);
            DeviationAndMean { std_dev, mean }
        };

        let gs: Vec<f64> = window.iter().map(|s| s.ground_speed_m_s).collect();
        self.ground_speed = Some(stats(&gs));

        let pitch: Vec<f64> = window.iter().map(|s| s.pitch_rad).collect();
        self.pitch_rad = Some(stats(&pitch));

        let altitudes: Vec<f64> = window.iter().map(|s| s.altitude().meters).collect();
        self.altitude_m = Some(stats(&altitudes));

        let elevations: Vec<f64> = window.iter().filter_map(|s| s.ground_elevation_m()).collect();
        if elevations.len() == window.len() {
            self.elevation_m = Some(stats(&elevations));

            let ground_distances: Vec<f64> = altitudes
                .iter()
                .zip(elevations.iter())
                .map(|(alt, elv)| alt - elv)
                .collect();
            self.ground_distance_m = Some(stats(&ground_distances));
            self.max_ground_distance_m = ground_distances.iter().copied().reduce(f64::max);

            self.guess_scenery_deviation(cg_m);
        }
    }

    /// Guesses the scenery deviation: how far the remote client's terrain
    /// mesh sits above ours. Only possible while the AGL distance is
    /// almost constant through the window.
    fn guess_scenery_deviation(&mut self, cg_m: Option<f64>) {
        self.scenery_deviation_m = None;
        self.deviation_hint = SceneryDeviationHint::NoInfo;

        let Some(ground_distance) = self.ground_distance_m else {
            return;
        };
        if ground_distance.std_dev > MAX_SCENERY_DEVIATION_M {
            return;
        }

        let hint = if self.const_on_ground {
            SceneryDeviationHint::AllOnGround
        } else if self.was_not_on_ground {
            SceneryDeviationHint::WasAirborne
        } else if self
            .altitude_m
            .map_or(false, |alt| alt.std_dev <= MAX_SCENERY_DEVIATION_M)
            && self
                .max_ground_distance_m
                .zip(cg_m)
                .map_or(false, |(max_dist, cg)| max_dist < cg)
        {
            SceneryDeviationHint::SmallAglDeviationNearGround
        } else {
            return;
        };

        self.scenery_deviation_m = Some(ground_distance.mean);
        self.scenery_deviation_cg_m = cg_m.map(|cg| ground_distance.mean - cg);
        self.deviation_hint = hint;
        debug!(
            "{}: guessed scenery deviation {:.2}m ({:?})",
            self.callsign, ground_distance.mean, hint
        );
    }

    pub fn is_null(&self) -> bool {
        self.situations_count < 2
    }

    pub fn callsign(&self) -> &Callsign {
        &self.callsign
    }

    pub fn situations_count(&self) -> usize {
        self.situations_count
    }

    /// Adjusted timestamp of the oldest situation in the window.
    pub fn oldest_adjusted_time(&self) -> Option<Epoch> {
        self.oldest_adjusted
    }

    /// Adjusted timestamp of the latest situation in the window.
    pub fn latest_adjusted_time(&self) -> Option<Epoch> {
        self.latest_adjusted
    }

    pub fn is_const_ascending(&self) -> bool {
        !self.is_null() && self.const_ascending
    }

    pub fn is_const_descending(&self) -> bool {
        !self.is_null() && self.const_descending
    }

    pub fn is_const_on_ground(&self) -> bool {
        !self.is_null() && self.const_on_ground
    }

    pub fn is_const_not_on_ground(&self) -> bool {
        !self.is_null() && self.const_not_on_ground
    }

    pub fn is_just_taking_off(&self) -> bool {
        self.just_takeoff
    }

    pub fn is_just_touching_down(&self) -> bool {
        self.just_touchdown
    }

    /// All situations before the latest were on the ground (windows >= 3).
    pub fn was_const_on_ground(&self) -> bool {
        self.was_on_ground
    }

    /// All situations before the latest were airborne (windows >= 3).
    pub fn was_const_not_on_ground(&self) -> bool {
        self.was_not_on_ground
    }

    pub fn is_rotating_up(&self) -> bool {
        self.rotate_up
    }

    /// Ground speed spread and mean over the window (m/s).
    pub fn ground_speed_std_dev_and_mean(&self) -> Option<DeviationAndMean> {
        self.ground_speed
    }

    /// Pitch spread and mean over the window (rad).
    pub fn pitch_std_dev_and_mean(&self) -> Option<DeviationAndMean> {
        self.pitch_rad
    }

    /// Altitude spread and mean over the window (m).
    pub fn altitude_std_dev_and_mean(&self) -> Option<DeviationAndMean> {
        self.altitude_m
    }

    /// AGL distance spread and mean over the window (m), when every
    /// situation carried an elevation.
    pub fn ground_distance_std_dev_and_mean(&self) -> Option<DeviationAndMean> {
        self.ground_distance_m
    }

    /// Largest AGL distance seen in the window (m).
    pub fn max_ground_distance_m(&self) -> Option<f64> {
        self.max_ground_distance_m
    }

    /// Elevation spread and mean over the window, when every situation
    /// carried an elevation.
    pub fn elevation_std_dev_and_mean(&self) -> Option<DeviationAndMean> {
        self.elevation_m
    }

    /// Elevation spread small enough to treat the terrain as flat here.
    pub fn has_elevation_dev_within_allowed_range(&self) -> bool {
        self.elevation_m
            .map_or(false, |e| e.std_dev < ALLOWED_ALTITUDE_DEVIATION_M)
    }

    /// Guessed scenery deviation (m), positive = remote sits too high.
    pub fn scenery_deviation_m(&self) -> Option<f64> {
        self.scenery_deviation_m
    }

    /// Scenery deviation with the CG taken out, the value to correct
    /// altitudes by.
    pub fn scenery_deviation_cg_m(&self) -> Option<f64> {
        self.scenery_deviation_cg_m
    }

    pub fn scenery_deviation_hint(&self) -> SceneryDeviationHint {
        self.deviation_hint
    }

    /// Guesses the ground state of `situation` when nothing reliable came
    /// in with it. Returns false when guessing does not apply (inbound
    /// details present, or VTOL with no usable signal).
    pub fn guess_on_ground(&self, situation: &mut AircraftSituation, hints: &ModelHints) -> bool {
        if !situation.should_guess_on_ground() {
            return false;
        }

        // runway aircraft have to move to be airborne
        if !hints.is_vtol {
            let push_back = situation.ground_speed_m_s < 0.0;
            if push_back || !situation.is_moving() {
                situation.ground_state = GroundState::FULLY_ON_GROUND;
                situation.ground_details = GroundDetails::Guessed;
                return true;
            }
        }

        // airborne is the default guess from here on
        situation.ground_state = GroundState::Airborne;
        situation.ground_details = GroundDetails::Guessed;

        let rotate_speed = hints.rotate_speed_m_s;
        let sure_rotate_speed = rotate_speed.map_or(SURE_ROTATE_SPEED_M_S, |v| v * 1.25);

        // attitudes impossible on the ground
        if situation.pitch_rad.abs() > 20_f64.to_radians() {
            return true;
        }
        if situation.bank_rad.abs() > 10_f64.to_radians() {
            return true;
        }
        if situation.ground_speed_m_s > sure_rotate_speed {
            return true;
        }

        // elevation underflow detects "on ground", the overflow direction
        // proves nothing
        let cg = situation.cg_m.or(hints.cg_m).unwrap_or(DEFAULT_CG_M);
        if let Some(above_m) = situation.height_above_ground_m() {
            if above_m <= cg + crate::constants::DELTA_NEAR_GROUND_M {
                situation.ground_state = GroundState::FULLY_ON_GROUND;
                return true;
            }
        }

        if !self.is_null() {
            if !hints.is_vtol && self.was_const_on_ground() {
                if self.is_rotating_up() {
                    return true;
                }
                // stick to the ground until rotation is detected
                situation.ground_state = GroundState::FULLY_ON_GROUND;
                return true;
            }
            if self.is_const_ascending() {
                return true;
            }
        }

        if hints.is_vtol {
            // no movement based conclusion possible
            situation.ground_state = GroundState::Unknown;
            situation.ground_details = GroundDetails::NotSet;
            return false;
        }

        if let Some(rotate_speed) = rotate_speed {
            if situation.ground_speed_m_s < rotate_speed {
                situation.ground_state = GroundState::FULLY_ON_GROUND;
                return true;
            }
        }

        true
    }
}

impl std::fmt::Display for SituationChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            return write!(f, "null change");
        }
        write!(
            f,
            "{}: n={} takeoff={} touchdown={} gnd={}/{} not gnd={}/{} asc={} desc={} rotate={}",
            self.callsign,
            self.situations_count,
            self.just_takeoff,
            self.just_touchdown,
            self.const_on_ground,
            self.was_on_ground,
            self.const_not_on_ground,
            self.was_not_on_ground,
            self.const_ascending,
            self.const_descending,
            self.rotate_up,
        )
    }
}

#[cfg(test)]
mod test {
    use super::{
        is_const_ascending, is_const_on_ground, is_just_taking_off, is_rotating_up, ModelHints,
        SituationChange,
    };
    use crate::{
        callsign::Callsign,
        geo::coordinate::coordinate_msl,
        situation::{AircraftSituation, GroundDetails, GroundState},
    };
    use hifitime::{Duration, Epoch};

    /// Latest-first window of `n` samples, 5s apart, customized per index
    /// (0 = latest).
    fn window(n: usize, f: impl Fn(usize, &mut AircraftSituation)) -> Vec<AircraftSituation> {
        let t0 = Epoch::from_unix_milliseconds(1_425_000_000_000.0);
        (0..n)
            .map(|i| {
                let mut s = AircraftSituation::new(
                    Callsign::new("DLH123"),
                    coordinate_msl(48.0, 11.0, 1000.0),
                    0.0,
                    0.0,
                    0.0,
                    60.0,
                )
                .with_timestamp(t0 - Duration::from_milliseconds(5000.0 * i as f64));
                f(i, &mut s);
                s
            })
            .collect()
    }

    #[test]
    fn test_just_taking_off() {
        let w = window(10, |i, s| {
            let on_ground = i > 0;
            s.ground_state = GroundState::from_reported(on_ground);
            s.ground_details = GroundDetails::Reported;
        });
        assert!(is_just_taking_off(&w));

        let change = SituationChange::new(&w, None);
        assert!(change.is_just_taking_off());
        assert!(!change.is_just_touching_down());
        assert!(!change.is_const_on_ground());
        assert!(change.was_const_on_ground());
    }

    #[test]
    fn test_degenerate_windows() {
        let empty: Vec<AircraftSituation> = vec![];
        assert!(is_const_on_ground(&empty));
        assert!(is_const_ascending(&empty));
        assert!(!is_just_taking_off(&empty));
        assert!(!is_rotating_up(&empty));

        let single = window(1, |_, _| ());
        assert!(is_const_on_ground(&single));
        assert!(is_const_ascending(&single));
        assert!(!is_just_taking_off(&single));

        let change = SituationChange::new(&single, None);
        assert!(change.is_null());
        assert!(!change.is_const_on_ground());
    }

    #[test]
    fn test_const_ascending() {
        // latest first: altitude decreasing with i means ascending over time
        let w = window(5, |i, s| {
            s.set_altitude(crate::geo::Altitude::msl(1000.0 - 10.0 * i as f64));
        });
        let change = SituationChange::new(&w, None);
        assert!(change.is_const_ascending());
        assert!(!change.is_const_descending());
    }

    #[test]
    fn test_rotating_up() {
        let w = window(6, |i, s| {
            s.pitch_rad = if i == 0 { 8_f64.to_radians() } else { 1_f64.to_radians() };
        });
        assert!(is_rotating_up(&w));
        assert!(SituationChange::new(&w, None).is_rotating_up());

        let flat = window(6, |_, s| {
            s.pitch_rad = 1_f64.to_radians();
        });
        assert!(!is_rotating_up(&flat));
    }

    #[test]
    fn test_scenery_deviation_all_on_ground() {
        use crate::geo::{ElevationInfo, ElevationPlane};
        let w = window(6, |_, s| {
            s.ground_state = GroundState::FULLY_ON_GROUND;
            s.ground_details = GroundDetails::Reported;
            s.set_altitude(crate::geo::Altitude::msl(53.0));
            let plane = ElevationPlane::single_point(s.position, 50.0);
            s.set_ground_elevation_checked(Some(plane), ElevationInfo::Test);
        });
        let change = SituationChange::new(&w, Some(2.0));
        assert_eq!(change.scenery_deviation_m(), Some(3.0));
        assert_eq!(change.scenery_deviation_cg_m(), Some(1.0));
        assert_eq!(
            change.scenery_deviation_hint(),
            super::SceneryDeviationHint::AllOnGround
        );
    }

    #[test]
    fn test_guess_on_ground_stationary() {
        let w = window(4, |_, s| s.ground_speed_m_s = 0.0);
        let change = SituationChange::new(&w, None);

        let mut s = w[0].clone();
        s.ground_state = GroundState::Unknown;
        s.ground_details = GroundDetails::NotSet;
        assert!(change.guess_on_ground(&mut s, &ModelHints::default()));
        assert!(s.ground_state.is_on_ground());
        assert_eq!(s.ground_details, GroundDetails::Guessed);
    }

    #[test]
    fn test_guess_on_ground_fast_is_airborne() {
        let w = window(4, |_, s| s.ground_speed_m_s = 120.0);
        let change = SituationChange::new(&w, None);

        let mut s = w[0].clone();
        s.ground_state = GroundState::Unknown;
        s.ground_details = GroundDetails::NotSet;
        assert!(change.guess_on_ground(&mut s, &ModelHints::default()));
        assert!(!s.ground_state.is_on_ground());
    }

    #[test]
    fn test_guess_respects_inbound_details() {
        let w = window(4, |_, _| ());
        let change = SituationChange::new(&w, None);
        let mut s = w[0]
            .clone()
            .with_ground_state(GroundState::FULLY_ON_GROUND, GroundDetails::Reported);
        assert!(!change.guess_on_ground(&mut s, &ModelHints::default()));
        assert!(s.ground_state.is_on_ground());
    }
}
