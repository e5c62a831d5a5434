//! One point in time sample of a remote aircraft's pose, as received from
//! the network and as produced by the interpolation engines.

use hifitime::{Duration, Epoch};

use crate::{
    callsign::Callsign,
    constants::{
        DELTA_NEAR_GROUND_M, FAST_AIRCRAFT_SPEED_M_S, MAX_DELTA_ELEVATION_M, MIN_MOVING_SPEED_M_S,
        SKIP_NEAR_GROUND_ALTITUDE_M,
    },
    geo::{Altitude, AltitudeDatum, Coordinate, ElevationInfo, ElevationPlane},
};

mod ground;
mod velocity;

pub use ground::{GroundDetails, GroundState};
pub use velocity::AircraftVelocity;

/// What [AircraftSituation::corrected_altitude_with] did to the raw altitude.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltitudeCorrection {
    #[default]
    Unknown,
    /// Value was plausible, nothing changed
    NoCorrection,
    /// No ground elevation known, correction impossible
    NoElevation,
    /// Altitude was below ground, clamped to elevation plus CG
    Underflow,
    /// Reliably on the ground, snapped onto elevation plus CG
    DraggedToGround,
}

impl std::fmt::Display for AltitudeCorrection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::NoCorrection => write!(f, "none"),
            Self::NoElevation => write!(f, "no elv."),
            Self::Underflow => write!(f, "underflow"),
            Self::DraggedToGround => write!(f, "dragged to gnd."),
        }
    }
}

/// One aircraft state sample.
///
/// The altitude lives inside [Coordinate] as its geodetic height, there
/// is no second copy to drift away from the position.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftSituation {
    /// Aircraft identity
    pub callsign: Callsign,

    /// Position including geodetic height
    pub position: Coordinate,

    /// Known ground elevation around the position, if any
    pub ground_elevation: Option<ElevationPlane>,

    /// Where the ground elevation came from
    pub elevation_info: ElevationInfo,

    /// Center of gravity above ground in meters, when known
    pub cg_m: Option<f64>,

    /// True heading (rad)
    pub heading_rad: f64,

    /// Pitch (rad, positive nose up)
    pub pitch_rad: f64,

    /// Bank (rad, positive right wing down)
    pub bank_rad: f64,

    /// Ground speed (m/s)
    pub ground_speed_m_s: f64,

    /// Ground contact state
    pub ground_state: GroundState,

    /// Where the ground state came from
    pub ground_details: GroundDetails,

    /// Sample timestamp as transmitted
    pub timestamp: Epoch,

    /// Per sample offset compensating transmission latency
    pub time_offset: Duration,

    /// Reported velocity vector, for velocity capable clients
    pub velocity: Option<AircraftVelocity>,
}

impl AircraftSituation {
    /// New situation sample from pose values. Timestamp, offset, ground
    /// data and velocity start empty and are set by the feeder.
    pub fn new(
        callsign: Callsign,
        position: Coordinate,
        heading_rad: f64,
        pitch_rad: f64,
        bank_rad: f64,
        ground_speed_m_s: f64,
    ) -> Self {
        Self {
            callsign,
            position,
            heading_rad,
            pitch_rad,
            bank_rad,
            ground_speed_m_s,
            cg_m: None,
            velocity: None,
            ground_elevation: None,
            elevation_info: ElevationInfo::default(),
            ground_state: GroundState::default(),
            ground_details: GroundDetails::default(),
            timestamp: Epoch::default(),
            time_offset: Duration::ZERO,
        }
    }

    /// Copy with the given timestamp.
    pub fn with_timestamp(mut self, timestamp: Epoch) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Copy with the given latency compensation offset.
    pub fn with_time_offset(mut self, offset: Duration) -> Self {
        self.time_offset = offset;
        self
    }

    /// Copy with a reported velocity vector.
    pub fn with_velocity(mut self, velocity: AircraftVelocity) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// Copy with ground state and provenance.
    pub fn with_ground_state(mut self, state: GroundState, details: GroundDetails) -> Self {
        self.ground_state = state;
        self.ground_details = details;
        self
    }

    /// Latency adjusted timestamp: sample timestamp plus offset.
    /// All bracket selection works on adjusted timestamps.
    pub fn adjusted_time(&self) -> Epoch {
        self.timestamp + self.time_offset
    }

    /// Altitude (the position's geodetic height).
    pub fn altitude(&self) -> Altitude {
        self.position.height()
    }

    /// Replaces the altitude.
    pub fn set_altitude(&mut self, altitude: Altitude) {
        self.position.set_height(altitude);
    }

    /// Shifts the altitude by an offset in meters.
    pub fn add_altitude_offset_m(&mut self, offset_m: f64) {
        let alt = self.altitude().with_offset_m(offset_m);
        self.set_altitude(alt);
    }

    pub fn has_ground_elevation(&self) -> bool {
        self.ground_elevation.is_some()
    }

    /// Ground elevation in meters MSL, when known.
    pub fn ground_elevation_m(&self) -> Option<f64> {
        self.ground_elevation.map(|plane| plane.elevation_m)
    }

    /// Attaches a ground elevation if the plane actually covers this
    /// position. Returns whether an elevation is attached afterwards.
    pub fn set_ground_elevation_checked(
        &mut self,
        plane: Option<ElevationPlane>,
        info: ElevationInfo,
    ) -> bool {
        if let Some(plane) = plane {
            if plane.elevation_m.is_finite() && plane.covers(&self.position) {
                self.ground_elevation = Some(plane);
                self.elevation_info = info;
            }
        }
        self.has_ground_elevation()
    }

    /// Adopts the other situation's ground elevation when it is valid for
    /// this position within `radius_m`. Returns true on transfer.
    pub fn adopt_ground_elevation_within(&mut self, other: &Self, radius_m: f64) -> bool {
        let Some(plane) = other.ground_elevation else {
            return false;
        };
        let distance = self.position.great_circle_distance_m(&other.position);
        if distance > radius_m && !plane.covers(&self.position) {
            return false;
        }
        self.ground_elevation = Some(plane);
        self.elevation_info = other.elevation_info;
        true
    }

    /// Height above the known ground elevation in meters.
    pub fn height_above_ground_m(&self) -> Option<f64> {
        let elevation_m = self.ground_elevation_m()?;
        Some(self.altitude().meters - elevation_m)
    }

    /// Ground elevation aware altitude, with the default CG and drag to
    /// ground enabled.
    pub fn corrected_altitude(&self) -> Altitude {
        self.corrected_altitude_with(self.cg_m, true).0
    }

    /// Ground elevation aware altitude.
    ///
    /// Clamps underflows below the terrain to elevation plus CG, snaps
    /// near ground values onto it, and optionally drags a reliably
    /// grounded aircraft onto the terrain. Pressure altitudes cannot be
    /// corrected against an MSL elevation and pass through unchanged.
    pub fn corrected_altitude_with(
        &self,
        cg_m: Option<f64>,
        drag_to_ground: bool,
    ) -> (Altitude, AltitudeCorrection) {
        let altitude = self.altitude();
        let Some(elevation_m) = self.ground_elevation_m() else {
            return (altitude, AltitudeCorrection::NoElevation);
        };
        if altitude.datum != AltitudeDatum::MeanSeaLevel {
            return (altitude, AltitudeCorrection::Unknown);
        }

        let ground_plus_cg = Altitude::msl(elevation_m + cg_m.unwrap_or(0.0));
        let ground_distance_m = altitude.meters - ground_plus_cg.meters;

        if ground_distance_m < 0.0 {
            return (ground_plus_cg, AltitudeCorrection::Underflow);
        }
        if ground_distance_m.abs() < DELTA_NEAR_GROUND_M {
            return (ground_plus_cg, AltitudeCorrection::NoCorrection);
        }

        let reliably_on_ground = self.ground_state.is_on_ground()
            && (self.ground_details.is_inbound() || self.ground_details == GroundDetails::Guessed);
        if drag_to_ground && reliably_on_ground {
            return (ground_plus_cg, AltitudeCorrection::DraggedToGround);
        }

        (altitude, AltitudeCorrection::NoCorrection)
    }

    /// Applies [Self::corrected_altitude_with] in place.
    pub fn correct_altitude(&mut self, cg_m: Option<f64>, drag_to_ground: bool) -> AltitudeCorrection {
        let (altitude, correction) = self.corrected_altitude_with(cg_m, drag_to_ground);
        self.set_altitude(altitude);
        correction
    }

    /// Ground speed says the aircraft is actually moving (>= 2.5 km/h).
    pub fn is_moving(&self) -> bool {
        self.ground_speed_m_s.abs() >= MIN_MOVING_SPEED_M_S
    }

    /// Near ground handling can likely be skipped: reliably on ground
    /// samples never skip, fast aircraft and aircraft far above known
    /// terrain always do.
    pub fn can_likely_skip_near_ground_interpolation(&self) -> bool {
        if self.ground_state.is_on_ground() && self.ground_details.is_inbound() {
            return false;
        }
        if self.ground_speed_m_s > FAST_AIRCRAFT_SPEED_M_S {
            return true;
        }
        if let Some(above_m) = self.height_above_ground_m() {
            if above_m >= SKIP_NEAR_GROUND_ALTITUDE_M {
                return true;
            }
        }
        false
    }

    /// Distance covered within `duration` at the current ground speed,
    /// at least `min_m`. Used to size elevation query radii.
    pub fn distance_per_time_m(&self, duration: Duration, min_m: f64) -> f64 {
        let d = self.ground_speed_m_s.abs() * duration.to_seconds();
        d.max(min_m)
    }

    /// Local ground state guessing still applies (nothing reliable inbound).
    pub fn should_guess_on_ground(&self) -> bool {
        !self.ground_details.is_inbound()
    }

    /// Elevation at `position`, interpolated between two bracketing
    /// situations by distance ratio. Without a position, the mean
    /// elevation at the newer situation is produced.
    ///
    /// `None` without two elevations or when they differ by more than
    /// [MAX_DELTA_ELEVATION_M]. Close to either endpoint (below 5m or
    /// outside the 5%..95% ratio band) the endpoint's plane is returned
    /// directly.
    pub fn interpolated_elevation(
        position: Option<&Coordinate>,
        old: &Self,
        new: &Self,
        distance_m: Option<f64>,
    ) -> Option<ElevationPlane> {
        let old_plane = old.ground_elevation?;
        let new_plane = new.ground_elevation?;
        if old.position.equal_normal_vector(&new.position) {
            return Some(new_plane);
        }

        let delta_elevation_m = new_plane.elevation_m - old_plane.elevation_m;
        if delta_elevation_m.abs() > MAX_DELTA_ELEVATION_M {
            return None;
        }

        let Some(position) = position else {
            // no target position yet: mean elevation around the newer sample
            let elevation_m = 0.5 * (old_plane.elevation_m + new_plane.elevation_m);
            return Some(ElevationPlane::single_point(new.position, elevation_m));
        };

        let distance_to_new_m = position.great_circle_distance_m(&new.position);
        if distance_to_new_m < 5.0 {
            return Some(new_plane);
        }

        let distance_old_new_m =
            distance_m.unwrap_or_else(|| old.position.great_circle_distance_m(&new.position));
        if distance_old_new_m < 5.0 {
            return Some(old_plane);
        }

        let ratio = distance_to_new_m / distance_old_new_m;
        if ratio < 0.05 {
            return Some(new_plane);
        }
        if ratio > 0.95 {
            return Some(old_plane);
        }

        let elevation_m = new_plane.elevation_m - ratio * delta_elevation_m;
        Some(ElevationPlane::single_point(*position, elevation_m))
    }
}

impl std::fmt::Display for AircraftSituation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} hdg={:.1}deg p={:.1}deg b={:.1}deg gs={:.1}m/s {} @{}+{}",
            self.callsign,
            self.position,
            self.altitude(),
            self.heading_rad.to_degrees(),
            self.pitch_rad.to_degrees(),
            self.bank_rad.to_degrees(),
            self.ground_speed_m_s,
            self.ground_state,
            self.timestamp,
            self.time_offset,
        )
    }
}
