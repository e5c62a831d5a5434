//! The interpolation engines and their common front-end: per frame, per
//! aircraft, `interpolate(now)` turns the situation history into one
//! render-ready situation plus status and diagnostics.

use hifitime::{Duration, Epoch};
use log::{debug, warn};

use crate::{
    callsign::Callsign,
    cfg::{Mode, Setup},
    change::{ModelHints, SituationChange},
    constants::SINGLE_POINT_RADIUS_M,
    geo::{ElevationInfo, ElevationPlane},
    provider::{ElevationSource, SetupSource, SituationSource},
    situation::{AircraftSituation, AltitudeCorrection, GroundDetails},
};

mod linear;
mod logger;
mod pbh;
mod velocity;

pub use linear::{LinearInterpolant, LinearInterpolator};
pub use logger::{InterpolationLogger, SituationLog};
pub use pbh::Pbh;
pub use velocity::{VelocityInterpolant, VelocityInterpolator};

/// Outcome classification of one interpolation step.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct InterpolationStatus {
    interpolated: bool,
    same_situation: bool,
    situations_count: usize,
    extra_info: Option<String>,
}

impl InterpolationStatus {
    /// True interpolation/extrapolation happened; false means the
    /// position was held constant (missing or insufficient data).
    pub fn is_interpolated(&self) -> bool {
        self.interpolated
    }

    /// The step fell back to the previous frame's situation.
    pub fn is_same_situation(&self) -> bool {
        self.same_situation
    }

    /// Network situations available for the step.
    pub fn situations_count(&self) -> usize {
        self.situations_count
    }

    /// Human readable detail for the degenerate cases.
    pub fn extra_info(&self) -> Option<&str> {
        self.extra_info.as_deref()
    }
}

/// What one interpolation step hands back to the render loop.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationResult {
    /// The produced situation; `None` only while no data ever arrived
    pub situation: Option<AircraftSituation>,
    /// Step classification
    pub status: InterpolationStatus,
    /// Diagnostic record, when logging is enabled for the callsign
    pub log: Option<SituationLog>,
}

/// Engine state, one of the two per aircraft.
#[derive(Debug)]
enum Engine {
    Linear(LinearInterpolator),
    Velocity(VelocityInterpolator),
}

impl Engine {
    fn new(mode: Mode) -> Self {
        match mode {
            Mode::Linear => Self::Linear(LinearInterpolator::new()),
            Mode::Velocity => Self::Velocity(VelocityInterpolator::new()),
        }
    }

    fn mode(&self) -> Mode {
        match self {
            Self::Linear(_) => Mode::Linear,
            Self::Velocity(_) => Mode::Velocity,
        }
    }
}

/// Per aircraft interpolation front-end.
///
/// Owned and driven by the single render thread; pulls history, setup and
/// elevations through the provider traits (which the network side updates
/// concurrently behind its own lock) and caches nothing but its own
/// engine state. Fully synchronous, no call ever blocks on I/O.
pub struct Interpolator<'p> {
    callsign: Callsign,
    situation_source: &'p dyn SituationSource,
    elevation_source: &'p dyn ElevationSource,
    setup_source: &'p dyn SetupSource,
    hints: ModelHints,

    engine: Engine,
    current_situations: Vec<AircraftSituation>,
    situations_stamp: u64,
    history_fetched: bool,
    past_change: SituationChange,
    scenery_offset_m: Option<f64>,
    last_situation: Option<AircraftSituation>,
    invalid_count: u64,
    last_invalid_log: Option<Epoch>,
}

impl<'p> Interpolator<'p> {
    /// New front-end for one callsign over the given providers.
    pub fn new(
        callsign: Callsign,
        situation_source: &'p dyn SituationSource,
        elevation_source: &'p dyn ElevationSource,
        setup_source: &'p dyn SetupSource,
    ) -> Self {
        let mode = setup_source.setup_for(&callsign).mode;
        Self {
            callsign,
            situation_source,
            elevation_source,
            setup_source,
            hints: ModelHints::default(),
            engine: Engine::new(mode),
            current_situations: Vec::new(),
            situations_stamp: 0,
            history_fetched: false,
            past_change: SituationChange::null(),
            scenery_offset_m: None,
            last_situation: None,
            invalid_count: 0,
            last_invalid_log: None,
        }
    }

    /// Attaches per aircraft model facts (CG, VTOL, rotate speed).
    pub fn with_model_hints(mut self, hints: ModelHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn callsign(&self) -> &Callsign {
        &self.callsign
    }

    /// Scenery offset currently applied to the history, if any.
    pub fn scenery_offset_m(&self) -> Option<f64> {
        self.scenery_offset_m
    }

    /// Invalid steps seen so far (diagnostics).
    pub fn invalid_count(&self) -> u64 {
        self.invalid_count
    }

    /// Forgets the previous frame's situation (teleport, history reset).
    pub fn reset_last_interpolation(&mut self) {
        self.last_situation = None;
    }

    /// One interpolation step for the render timestamp `now`.
    ///
    /// Never panics on malformed input and never returns an error: the
    /// worst case outcome is a held position, flagged in the status.
    pub fn interpolate(&mut self, now: Epoch) -> InterpolationResult {
        let setup = self.setup_source.setup_for(&self.callsign);
        let mut status = InterpolationStatus::default();
        let mut log = SituationLog::default();

        // a mode change invalidates the engine state
        if self.engine.mode() != setup.mode {
            self.engine = Engine::new(setup.mode);
        }

        let history_updated = self.refresh_history(&setup);

        status.situations_count = self.current_situations.len();
        if self.current_situations.is_empty() {
            // nothing for this aircraft (yet): no interpolation possible
            self.last_situation = None;
            status.extra_info = Some(format!("no situations for '{}'", self.callsign));
            return InterpolationResult {
                situation: None,
                status,
                log: None,
            };
        }

        let (produced, interpolated) = self.evaluate_engines(now, history_updated, &setup, &mut log);

        let mut altitude_correction = AltitudeCorrection::Unknown;
        let valid = match produced {
            Some(mut situation) => {
                if situation.position.is_valid_vector_range() {
                    altitude_correction = self.finish_situation(&mut situation, &setup);
                    Some(situation)
                } else {
                    // an engine let an invalid vector through, that is a bug
                    debug_assert!(false, "invalid interpolation vector");
                    None
                }
            }
            None => None,
        };

        let situation = match valid {
            Some(situation) => {
                self.last_situation = Some(situation.clone());
                status.interpolated = interpolated;
                Some(situation)
            }
            None => {
                // degrade: continue with the last good situation
                self.invalid_count += 1;
                self.warn_invalid(now);
                status.same_situation = true;
                self.last_situation.clone()
            }
        };

        let log = if setup.log_interpolation {
            log.current_time = Some(now);
            log.situations_count = self.current_situations.len();
            log.ground_factor = situation
                .as_ref()
                .and_then(|s| s.ground_state.factor());
            log.altitude_correction = altitude_correction;
            log.situation = situation.clone();
            Some(log)
        } else {
            None
        };

        InterpolationResult {
            situation,
            status,
            log,
        }
    }

    /// Re-reads the history when the provider stamp moved, rebuilds the
    /// past change window and applies the scenery offset fix.
    /// Returns whether the history changed.
    fn refresh_history(&mut self, setup: &Setup) -> bool {
        let stamp = self.situation_source.last_modified(&self.callsign);
        if self.history_fetched && stamp == self.situations_stamp {
            return false;
        }
        self.situations_stamp = stamp;
        self.history_fetched = true;
        self.current_situations = self.situation_source.situations(&self.callsign);

        // the change is about the past, the latest situation excluded
        self.past_change = if self.current_situations.len() >= 3 {
            SituationChange::new(&self.current_situations[1..], self.hints.cg_m)
        } else {
            SituationChange::null()
        };

        self.scenery_offset_m = None;
        if setup.fix_scenery_offset && self.hints.cg_m.is_some() {
            if let Some(deviation_m) = self.past_change.scenery_deviation_cg_m() {
                // positive deviation = remote sits too high
                let offset_m = -deviation_m;
                for situation in self.current_situations.iter_mut() {
                    situation.add_altitude_offset_m(offset_m);
                }
                self.scenery_offset_m = Some(deviation_m);
                debug!(
                    "{}: scenery offset fix, altitudes shifted by {:.2}m",
                    self.callsign, offset_m
                );
            }
        }
        true
    }

    /// Runs the selected engine and assembles the raw situation.
    /// Returns (situation, was interpolated).
    fn evaluate_engines(
        &mut self,
        now: Epoch,
        history_updated: bool,
        setup: &Setup,
        log: &mut SituationLog,
    ) -> (Option<AircraftSituation>, bool) {
        match &mut self.engine {
            Engine::Linear(engine) => {
                let Some(interpolant) = engine.interpolant_at(
                    &self.current_situations,
                    now,
                    history_updated,
                    self.elevation_source,
                    log,
                ) else {
                    return (None, false);
                };

                let mut situation = Self::base_situation(
                    &self.callsign,
                    self.last_situation.as_ref(),
                    &self.current_situations,
                    interpolant.start(),
                    interpolant.end(),
                    &self.past_change,
                    self.hints.cg_m,
                );

                // attitude first, the later steps may use it
                let pbh = interpolant.pbh();
                situation.heading_rad = pbh.heading_rad();
                situation.pitch_rad = pbh.pitch_rad();
                situation.bank_rad = pbh.bank_rad();
                situation.ground_speed_m_s = pbh.ground_speed_m_s();

                let (position, altitude) = interpolant.position_and_altitude();
                situation.position = position;
                situation.set_altitude(altitude);
                situation.timestamp = interpolant.interpolated_time();
                situation.time_offset = interpolant.time_offset();

                // ground factor only blends between reliable endpoints
                let blend_ground = setup.aircraft_parts
                    && interpolant.start().ground_details.usable_for_interpolation()
                    && interpolant.end().ground_details.usable_for_interpolation();
                if blend_ground {
                    let (state, details) = interpolant.ground_state();
                    situation.ground_state = state;
                    situation.ground_details = details;
                } else {
                    self.past_change.guess_on_ground(&mut situation, &self.hints);
                }

                // elevation at the blended position, from the bracket
                if !situation.has_ground_elevation() {
                    let position = situation.position;
                    let plane = AircraftSituation::interpolated_elevation(
                        Some(&position),
                        interpolant.start(),
                        interpolant.end(),
                        None,
                    );
                    situation.set_ground_elevation_checked(plane, ElevationInfo::Interpolated);
                }

                (Some(situation), interpolant.is_interpolated())
            }
            Engine::Velocity(engine) => {
                let Some(interpolant) =
                    engine.interpolant_at(&self.current_situations, now, self.elevation_source, log)
                else {
                    return (None, false);
                };

                let base = Self::base_situation(
                    &self.callsign,
                    self.last_situation.as_ref(),
                    &self.current_situations,
                    interpolant.current_situation(),
                    interpolant.current_situation(),
                    &self.past_change,
                    self.hints.cg_m,
                );

                let mut situation = interpolant.evaluate();
                // carry over the preset elevation and CG, the engine only
                // produced the pose
                if !situation.has_ground_elevation() && base.has_ground_elevation() {
                    situation.ground_elevation = base.ground_elevation;
                    situation.elevation_info = base.elevation_info;
                }
                situation.cg_m = base.cg_m;
                situation.callsign = self.callsign.clone();

                log.interpolated_time = Some(situation.timestamp);
                (Some(situation), true)
            }
        }
    }

    /// Initializes the outgoing situation: previous frame's values (or
    /// the latest sample), preset elevation and CG.
    fn base_situation(
        callsign: &Callsign,
        last: Option<&AircraftSituation>,
        situations: &[AircraftSituation],
        start: &AircraftSituation,
        end: &AircraftSituation,
        change: &SituationChange,
        cg_m: Option<f64>,
    ) -> AircraftSituation {
        let mut situation = last.cloned().unwrap_or_else(|| situations[0].clone());
        situation.callsign = callsign.clone();
        situation.cg_m = cg_m.or(situation.cg_m);
        Self::preset_ground_elevation(&mut situation, start, end, change);
        situation
    }

    /// Presets the ground elevation before the position is known: same or
    /// nearly same bracket positions reuse the known plane, a flat change
    /// window provides the mean, otherwise the bracket interpolation.
    fn preset_ground_elevation(
        situation: &mut AircraftSituation,
        start: &AircraftSituation,
        end: &AircraftSituation,
        change: &SituationChange,
    ) -> bool {
        // the blended position is not known yet, nothing can be transferred
        situation.ground_elevation = None;
        situation.elevation_info = ElevationInfo::NoInfo;

        if start.position.equal_normal_vector(&end.position) && start.has_ground_elevation() {
            // not moving between the samples, the plane stays valid
            situation.ground_elevation = start.ground_elevation;
            situation.elevation_info = start.elevation_info;
            return true;
        }

        let distance_m = end.position.great_circle_distance_m(&start.position);
        if distance_m < end.distance_per_time_m(Duration::from_milliseconds(250.0), SINGLE_POINT_RADIUS_M)
            && start.has_ground_elevation()
        {
            situation.ground_elevation = start.ground_elevation;
            situation.elevation_info = start.elevation_info;
            return true;
        }

        if change.has_elevation_dev_within_allowed_range() {
            if let Some(elevation) = change.elevation_std_dev_and_mean() {
                let plane = ElevationPlane::single_point(situation.position, elevation.mean);
                return situation.set_ground_elevation_checked(Some(plane), ElevationInfo::FromChange);
            }
        }

        let plane =
            AircraftSituation::interpolated_elevation(None, start, end, Some(distance_m));
        situation.set_ground_elevation_checked(plane, ElevationInfo::Interpolated)
    }

    /// Post evaluation pipeline: elevation completion, altitude
    /// correction, pitch on ground override.
    fn finish_situation(
        &self,
        situation: &mut AircraftSituation,
        setup: &Setup,
    ) -> AltitudeCorrection {
        if !situation.has_ground_elevation() {
            let radius_m = situation
                .distance_per_time_m(Duration::from_milliseconds(250.0), SINGLE_POINT_RADIUS_M);
            let transferred = self
                .last_situation
                .as_ref()
                .map_or(false, |last| situation.adopt_ground_elevation_within(last, radius_m));
            if !transferred && !situation.can_likely_skip_near_ground_interpolation() {
                let plane = self
                    .elevation_source
                    .closest_elevation_within_range(&situation.position, radius_m);
                situation.set_ground_elevation_checked(plane, ElevationInfo::FromCache);
            }
        }

        let mut correction = AltitudeCorrection::Unknown;
        if situation.ground_details != GroundDetails::Interpolated
            && situation.ground_details != GroundDetails::Guessed
        {
            correction = situation.correct_altitude(situation.cg_m, true);
        }

        if situation.ground_state.is_on_ground() {
            if let Some(pitch_rad) = setup.pitch_on_ground_rad {
                situation.pitch_rad = pitch_rad;
            }
        }

        correction
    }

    /// Flood limited warning about an invalid step.
    fn warn_invalid(&mut self, now: Epoch) {
        let min_gap = self
            .last_situation
            .as_ref()
            .map(|s| s.time_offset)
            .filter(|offset| *offset > Duration::ZERO)
            .unwrap_or_else(|| Duration::from_milliseconds(5000.0));
        let due = self
            .last_invalid_log
            .map_or(true, |last| now - last > min_gap);
        if due {
            self.last_invalid_log = Some(now);
            warn!(
                "{}: invalid situation #{}, continuing with last good position",
                self.callsign, self.invalid_count
            );
        }
    }
}
