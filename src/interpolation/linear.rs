use hifitime::{Duration, Epoch, Unit};
use log::{debug, warn};

use crate::{
    constants::{EXTRAPOLATION_LOG_THRESHOLD_MS, GROUND_FACTOR_EPSILON, SINGLE_POINT_RADIUS_M},
    geo::{Altitude, Coordinate, ElevationInfo},
    interpolation::{logger::SituationLog, pbh::Pbh},
    math::epsilon_equal,
    provider::ElevationSource,
    situation::{AircraftSituation, GroundDetails, GroundState},
};

/// Cached bracketing data and blend parameters of the linear engine, from
/// which one situation is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolant {
    start: AircraftSituation,
    end: AircraftSituation,
    /// Blend fraction, clamped into [0; 1]
    time_fraction: f64,
    /// Unclamped fraction, values > 1 signal extrapolation
    raw_time_fraction: f64,
    interpolated_time: Epoch,
    time_offset: Duration,
    pbh: Pbh,
    interpolated: bool,
    recalculated: bool,
}

impl LinearInterpolant {
    /// Degenerate interpolant holding a single situation, the no-bracket
    /// fallback. Not interpolated.
    fn hold(situation: &AircraftSituation) -> Self {
        Self {
            start: situation.clone(),
            end: situation.clone(),
            time_fraction: 0.0,
            raw_time_fraction: 0.0,
            interpolated_time: situation.timestamp,
            time_offset: situation.time_offset,
            pbh: Pbh::hold(situation),
            interpolated: false,
            recalculated: true,
        }
    }

    pub fn start(&self) -> &AircraftSituation {
        &self.start
    }

    pub fn end(&self) -> &AircraftSituation {
        &self.end
    }

    pub fn pbh(&self) -> &Pbh {
        &self.pbh
    }

    pub fn time_fraction(&self) -> f64 {
        self.time_fraction
    }

    pub fn raw_time_fraction(&self) -> f64 {
        self.raw_time_fraction
    }

    pub fn interpolated_time(&self) -> Epoch {
        self.interpolated_time
    }

    pub fn time_offset(&self) -> Duration {
        self.time_offset
    }

    /// False for the degenerate hold cases.
    pub fn is_interpolated(&self) -> bool {
        self.interpolated
    }

    /// True only on the step where the bracketing pair changed.
    pub fn is_recalculated(&self) -> bool {
        self.recalculated
    }

    /// Blended position and altitude.
    ///
    /// The normal vector is blended component wise and NOT renormalized
    /// onto the unit sphere. Accepted approximation: over one sample
    /// spacing the off-sphere error stays below 1e-9.
    pub fn position_and_altitude(&self) -> (Coordinate, Altitude) {
        let start_vec = self.start.position.normal_vector();
        let end_vec = self.end.position.normal_vector();
        let tf = self.time_fraction;
        let blended = start_vec + (end_vec - start_vec) * tf;

        // underflow below terrain is avoided by blending corrected altitudes
        let start_alt = self.start.corrected_altitude();
        let end_alt = self.end.corrected_altitude();
        let altitude = match end_alt.checked_delta_m(&start_alt) {
            Ok(delta_m) => Altitude {
                meters: start_alt.meters + delta_m * tf,
                datum: start_alt.datum,
            },
            Err(e) => {
                debug_assert!(false, "altitude reference mismatch in bracket");
                warn!("{}: {}, holding start altitude", self.start.callsign, e);
                start_alt
            }
        };

        (Coordinate::from_normal_vector(blended, altitude), altitude)
    }

    /// Blended ground state, with hysteresis: endpoints that agree on
    /// "confidently airborne" or "confidently grounded" short circuit the
    /// blend, numerical noise must not flicker the gear.
    pub fn ground_state(&self) -> (GroundState, GroundDetails) {
        let start_factor = self.start.ground_state.factor().unwrap_or(0.0);
        let end_factor = self.end.ground_state.factor().unwrap_or(0.0);

        let state = if epsilon_equal(start_factor, 0.0, GROUND_FACTOR_EPSILON)
            && epsilon_equal(end_factor, 0.0, GROUND_FACTOR_EPSILON)
        {
            GroundState::Airborne
        } else if epsilon_equal(start_factor, 1.0, GROUND_FACTOR_EPSILON)
            && epsilon_equal(end_factor, 1.0, GROUND_FACTOR_EPSILON)
        {
            GroundState::FULLY_ON_GROUND
        } else {
            let factor = (end_factor - start_factor) * self.time_fraction + start_factor;
            GroundState::from_factor(factor)
        };
        (state, GroundDetails::Interpolated)
    }
}

/// Linear engine state for one callsign.
///
/// Owns nothing but the cached bracket: evaluation is a function of
/// (state, history, query time), there is no hidden clock and no live
/// provider needed to unit test it.
#[derive(Debug, Default)]
pub struct LinearInterpolator {
    bracket: Option<(AircraftSituation, AircraftSituation)>,
}

impl LinearInterpolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds (or reuses) the interpolant for the render timestamp `now`.
    ///
    /// The history is latest first by adjusted timestamp. The bracket is
    /// recomputed only when the history changed or `now` moved past the
    /// cached split; otherwise only the time fraction advances.
    /// `None` without any situation.
    pub fn interpolant_at(
        &mut self,
        situations: &[AircraftSituation],
        now: Epoch,
        history_updated: bool,
        elevation: &dyn ElevationSource,
        log: &mut SituationLog,
    ) -> Option<LinearInterpolant> {
        if situations.is_empty() {
            self.bracket = None;
            return None;
        }

        log.interpolator = 'l';

        let new_split = self
            .bracket
            .as_ref()
            .map_or(true, |(_, end)| end.adjusted_time() < now);
        let recalculate = history_updated || new_split;

        if recalculate {
            // partition the latest-first history at the split time
            let pivot = situations
                .iter()
                .position(|s| s.adjusted_time() <= now)
                .unwrap_or(situations.len());
            let (newer, older) = situations.split_at(pivot);

            let (mut start, mut end) = if older.is_empty() {
                // render time before all samples: hold the oldest
                self.bracket = None;
                return Some(LinearInterpolant::hold(newer.last().unwrap()));
            } else if newer.is_empty() && older.len() < 2 {
                // a single sample, nothing to bracket with
                self.bracket = None;
                return Some(LinearInterpolant::hold(&older[0]));
            } else if newer.is_empty() {
                // newest sample already older than now: extrapolate
                // forward from the two most recent samples
                (older[1].clone(), older[0].clone())
            } else {
                // true interpolation between the bracketing pair
                (older[0].clone(), newer.last().unwrap().clone())
            };

            for situation in [&mut start, &mut end] {
                if !situation.has_ground_elevation()
                    && !situation.can_likely_skip_near_ground_interpolation()
                {
                    let plane = elevation
                        .closest_elevation_within_range(&situation.position, SINGLE_POINT_RADIUS_M);
                    situation.set_ground_elevation_checked(plane, ElevationInfo::FromCache);
                }
            }

            self.bracket = Some((start, end));
        }

        let (start, end) = self.bracket.as_ref()?;

        let sample_delta = end.adjusted_time() - start.adjusted_time();
        if sample_delta <= Duration::ZERO {
            // duplicate adjusted timestamps from the network, nothing to blend
            return Some(LinearInterpolant::hold(end));
        }

        // fraction of the sample delta, ideally within [0; 1]:
        // < 0 cannot happen due to the split, > 1 means the next sample is
        // late and we extrapolate, > 2 means no new samples at all
        let distance_to_split = end.adjusted_time() - now;
        let raw_time_fraction =
            (1.0 - distance_to_split.to_seconds() / sample_delta.to_seconds()).max(0.0);

        let mut time_fraction = raw_time_fraction;
        if time_fraction >= 1.0 {
            time_fraction = 1.0;
            let threshold = Duration::from_milliseconds(EXTRAPOLATION_LOG_THRESHOLD_MS as f64);
            if distance_to_split.abs() > threshold {
                debug!(
                    "{}: distance to split {}, extrapolating",
                    start.callsign, distance_to_split
                );
            }
        }

        let interpolated_time =
            start.timestamp + sample_delta.to_seconds() * time_fraction * Unit::Second;
        let offset_delta_s = (end.time_offset - start.time_offset).to_seconds();
        let time_offset = start.time_offset + offset_delta_s * time_fraction * Unit::Second;

        log.sample_delta = sample_delta;
        log.time_fraction = time_fraction;
        log.raw_time_fraction = raw_time_fraction;
        log.interpolated_time = Some(interpolated_time);
        log.recalculated = recalculate;
        log.interpolation_situations = vec![start.clone(), end.clone()]; // oldest first

        Some(LinearInterpolant {
            start: start.clone(),
            end: end.clone(),
            time_fraction,
            raw_time_fraction,
            interpolated_time,
            time_offset,
            pbh: Pbh::new(time_fraction, start.clone(), end.clone()),
            interpolated: true,
            recalculated: recalculate,
        })
    }

    /// Drops the cached bracket (history reset, mode switch).
    pub fn reset(&mut self) {
        self.bracket = None;
    }
}
