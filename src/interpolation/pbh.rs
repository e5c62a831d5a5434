use crate::situation::AircraftSituation;

/// Pitch/bank/heading sub-interpolant: blends the attitude angles and the
/// ground speed between two bracketing situations.
///
/// Angles always blend along the shortest signed path, a heading moving
/// from 350 to 10 degrees passes through 0, never the long way around.
/// At fraction 0 the start attitude is returned exactly, at 1 the end
/// attitude.
#[derive(Debug, Clone, PartialEq)]
pub struct Pbh {
    time_fraction: f64,
    start: AircraftSituation,
    end: AircraftSituation,
}

impl Pbh {
    /// New sub-interpolant over `[start; end]` at `time_fraction` in [0; 1].
    pub fn new(time_fraction: f64, start: AircraftSituation, end: AircraftSituation) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&time_fraction),
            "time fraction must be within [0;1]"
        );
        Self {
            time_fraction: time_fraction.clamp(0.0, 1.0),
            start,
            end,
        }
    }

    /// Degenerate sub-interpolant holding a single situation.
    pub fn hold(situation: &AircraftSituation) -> Self {
        Self::new(0.0, situation.clone(), situation.clone())
    }

    pub fn start(&self) -> &AircraftSituation {
        &self.start
    }

    pub fn end(&self) -> &AircraftSituation {
        &self.end
    }

    pub fn time_fraction(&self) -> f64 {
        self.time_fraction
    }

    pub fn set_time_fraction(&mut self, time_fraction: f64) {
        debug_assert!(
            (0.0..=1.0).contains(&time_fraction),
            "time fraction must be within [0;1]"
        );
        self.time_fraction = time_fraction.clamp(0.0, 1.0);
    }

    /// Shortest path angle blend: begin + t * (end - begin), with the end
    /// angle unwrapped into the half turn around the begin angle.
    fn interpolate_angle_rad(begin_rad: f64, end_rad: f64, fraction: f64) -> f64 {
        use std::f64::consts::PI;
        let mut end_rad = end_rad;
        if end_rad - begin_rad < -PI {
            end_rad += 2.0 * PI;
        } else if end_rad - begin_rad > PI {
            end_rad -= 2.0 * PI;
        }
        (end_rad - begin_rad) * fraction + begin_rad
    }

    /// Blended heading (rad).
    pub fn heading_rad(&self) -> f64 {
        Self::interpolate_angle_rad(self.start.heading_rad, self.end.heading_rad, self.time_fraction)
    }

    /// Blended pitch (rad).
    pub fn pitch_rad(&self) -> f64 {
        Self::interpolate_angle_rad(self.start.pitch_rad, self.end.pitch_rad, self.time_fraction)
    }

    /// Blended bank (rad).
    pub fn bank_rad(&self) -> f64 {
        Self::interpolate_angle_rad(self.start.bank_rad, self.end.bank_rad, self.time_fraction)
    }

    /// Blended ground speed (m/s).
    pub fn ground_speed_m_s(&self) -> f64 {
        (self.end.ground_speed_m_s - self.start.ground_speed_m_s) * self.time_fraction
            + self.start.ground_speed_m_s
    }
}
