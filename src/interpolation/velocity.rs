use hifitime::{Duration, Epoch};
use log::debug;

use crate::{
    constants::{CORRECTION_TIME_MS, MAX_EXTRAPOLATION_MS, SINGLE_POINT_RADIUS_M},
    geo::{Altitude, ElevationInfo},
    interpolation::logger::SituationLog,
    math::shortest_turn_rad,
    provider::ElevationSource,
    situation::{AircraftSituation, AircraftVelocity, GroundDetails, GroundState},
};

use std::f64::consts::{FRAC_PI_2, PI};

/// Velocity engine interpolant: one authoritative situation, its velocity
/// vector, and the correction deltas against the previous interpolant's
/// prediction.
///
/// The deltas are computed once at creation and blended out linearly over
/// the correction window, so a new network update never snaps the
/// aircraft, the discrepancy gets absorbed over roughly one second.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityInterpolant {
    current: AircraftSituation,
    created: Epoch,
    now: Epoch,
    altitude_delta_m: f64,
    latitude_delta_rad: f64,
    longitude_delta_rad: f64,
    bank_delta_rad: f64,
    heading_delta_rad: f64,
    pitch_delta_rad: f64,
    correction_window: Duration,
}

impl VelocityInterpolant {
    /// First interpolant for an aircraft: no prediction exists yet, all
    /// correction deltas start at zero.
    pub fn first(current: AircraftSituation) -> Self {
        let created = current.timestamp;
        Self {
            current,
            created,
            now: created,
            altitude_delta_m: 0.0,
            latitude_delta_rad: 0.0,
            longitude_delta_rad: 0.0,
            bank_delta_rad: 0.0,
            heading_delta_rad: 0.0,
            pitch_delta_rad: 0.0,
            correction_window: Duration::from_milliseconds(CORRECTION_TIME_MS as f64),
        }
    }

    /// Interpolant for a fresh network sample, correcting against where
    /// the outgoing interpolant would have placed the aircraft at the
    /// sample's own timestamp.
    pub fn from_previous(previous: &Self, current: AircraftSituation) -> Self {
        let mut outgoing = previous.clone();
        outgoing.advance(current.timestamp);
        let predicted = outgoing.evaluate();

        let altitude_delta_m =
            predicted.altitude().meters - current.corrected_altitude().meters;
        let latitude_delta_rad =
            predicted.position.latitude_rad() - current.position.latitude_rad();
        let longitude_delta_rad =
            predicted.position.longitude_rad() - current.position.longitude_rad();

        // attitude deltas always take the shortest turn
        let bank_delta_rad = shortest_turn_rad(predicted.bank_rad - current.bank_rad);
        let heading_delta_rad = shortest_turn_rad(predicted.heading_rad - current.heading_rad);
        let pitch_delta_rad = shortest_turn_rad(predicted.pitch_rad - current.pitch_rad);

        let created = current.timestamp;
        Self {
            current,
            created,
            now: created,
            altitude_delta_m,
            latitude_delta_rad,
            longitude_delta_rad,
            bank_delta_rad,
            heading_delta_rad,
            pitch_delta_rad,
            correction_window: previous.correction_window,
        }
    }

    /// Copy with another correction window (defaults to
    /// [CORRECTION_TIME_MS]).
    pub fn with_correction_window(mut self, window: Duration) -> Self {
        self.correction_window = window;
        self
    }

    /// Advances the query clock. Queries before the creation time clamp
    /// to it, reordered samples must not move the clock backwards.
    pub fn advance(&mut self, now: Epoch) {
        self.now = now.max(self.created);
    }

    pub fn created(&self) -> Epoch {
        self.created
    }

    pub fn current_situation(&self) -> &AircraftSituation {
        &self.current
    }

    /// Extrapolates the authoritative situation to the query time.
    ///
    /// value = base + velocity * elapsed + error_fraction * delta, with
    /// elapsed capped at [MAX_EXTRAPOLATION_MS] and the error fraction
    /// decaying 1 -> 0 over the correction window.
    pub fn evaluate(&self) -> AircraftSituation {
        let mut elapsed = self.now - self.created;
        let cap = Duration::from_milliseconds(MAX_EXTRAPOLATION_MS as f64);
        if elapsed > cap {
            // remote client stopped sending, freeze at the capped position
            elapsed = cap;
        }
        let elapsed_s = elapsed.to_seconds();

        let window_s = self.correction_window.to_seconds();
        let error_fraction = if window_s > 0.0 {
            (window_s - elapsed_s.clamp(0.0, window_s)) / window_s
        } else {
            0.0
        };
        debug_assert!((0.0..=1.0).contains(&error_fraction));

        let velocity = self.current.velocity.unwrap_or(AircraftVelocity::ZERO);
        let mut situation = self.current.clone();

        situation.heading_rad = self.current.heading_rad
            + elapsed_s * velocity.heading_rad_s
            + error_fraction * self.heading_delta_rad;
        situation.pitch_rad = self.current.pitch_rad
            + elapsed_s * velocity.pitch_rad_s
            + error_fraction * self.pitch_delta_rad;
        situation.bank_rad = self.current.bank_rad
            + elapsed_s * velocity.roll_rad_s
            + error_fraction * self.bank_delta_rad;

        let altitude_m = self.current.corrected_altitude().meters
            + elapsed_s * velocity.y_m_s
            + error_fraction * self.altitude_delta_m;

        // shift along the meridian, then along the parallel
        let mut position = self.current.position;
        let north_shift_m = velocity.z_m_s * elapsed_s;
        position = position.destination(
            north_shift_m.abs(),
            if north_shift_m >= 0.0 { 0.0 } else { PI },
        );
        let east_shift_m = velocity.x_m_s * elapsed_s;
        position = position.destination(
            east_shift_m.abs(),
            if east_shift_m >= 0.0 { FRAC_PI_2 } else { 1.5 * PI },
        );

        // absorb the remaining correction
        position.set_lat_lon_rad(
            position.latitude_rad() + error_fraction * self.latitude_delta_rad,
            position.longitude_rad() + error_fraction * self.longitude_delta_rad,
        );
        position.set_height(Altitude::msl(altitude_m));
        situation.position = position;

        // ground state straight from the authoritative sample, velocities
        // do not extrapolate ground contact
        situation.ground_state =
            GroundState::from_reported(self.current.ground_state.is_on_ground());
        situation.ground_details = GroundDetails::Interpolated;

        situation.timestamp = self.now;
        situation
    }
}

/// Velocity engine state for one callsign: the active interpolant plus
/// the situation it tracks.
#[derive(Debug, Default)]
pub struct VelocityInterpolator {
    interpolant: Option<VelocityInterpolant>,
    last_situation: Option<AircraftSituation>,
}

impl VelocityInterpolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds or advances the interpolant for the render timestamp `now`.
    /// `None` without any situation.
    pub fn interpolant_at(
        &mut self,
        situations: &[AircraftSituation],
        now: Epoch,
        elevation: &dyn ElevationSource,
        log: &mut SituationLog,
    ) -> Option<VelocityInterpolant> {
        let first = situations.first()?;
        log.interpolator = 'v';

        // latest situation carrying velocities; without any, the latest
        // full update with the stationary assumption
        let mut current = situations
            .iter()
            .find(|s| s.velocity.is_some())
            .cloned()
            .unwrap_or_else(|| first.clone().with_velocity(AircraftVelocity::ZERO));

        // the elevation cache may have dropped this position while no
        // updates arrived (parked aircraft), request it again
        if !current.has_ground_elevation() && !current.can_likely_skip_near_ground_interpolation() {
            let plane =
                elevation.closest_elevation_within_range(&current.position, SINGLE_POINT_RADIUS_M);
            current.set_ground_elevation_checked(plane, ElevationInfo::FromCache);
        }

        match (&mut self.interpolant, &self.last_situation) {
            (Some(_), Some(last)) if *last == current => {
                // steady state: the interpolant stays, only the clock advances
            }
            (Some(interpolant), _) => {
                debug!("{}: new velocity sample, rebasing", current.callsign);
                *interpolant = VelocityInterpolant::from_previous(interpolant, current.clone());
                self.last_situation = Some(current);
            }
            (None, _) => {
                self.interpolant = Some(VelocityInterpolant::first(current.clone()));
                self.last_situation = Some(current);
            }
        }

        let interpolant = self.interpolant.as_mut()?;
        if now > interpolant.created() {
            interpolant.advance(now);
        }
        log.recalculated = true; // at least the time advanced
        log.interpolation_situations = vec![interpolant.current_situation().clone()];
        Some(interpolant.clone())
    }

    /// Drops the engine state (history reset, mode switch).
    pub fn reset(&mut self) {
        self.interpolant = None;
        self.last_situation = None;
    }
}
