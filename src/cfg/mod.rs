//! Interpolation and rendering setup.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod mode;
pub use mode::Mode;

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

/// Settings steering one aircraft's interpolation, applied globally or
/// per callsign (see `SetupSource`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Setup {
    /// Engine selection
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: Mode,

    /// Produce a diagnostic log record per interpolation step
    #[cfg_attr(feature = "serde", serde(default))]
    pub log_interpolation: bool,

    /// Run the full interpolation even when the aircraft does not move
    #[cfg_attr(feature = "serde", serde(default))]
    pub force_full_interpolation: bool,

    /// Aircraft parts (gear etc.) are evaluated for the ground factor
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub aircraft_parts: bool,

    /// Forward the ground flag to the simulator driver
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub send_ground_flag: bool,

    /// Correct altitudes by the guessed scenery deviation
    #[cfg_attr(feature = "serde", serde(default))]
    pub fix_scenery_offset: bool,

    /// Pitch forced while on the ground (rad), some models sit nose up
    #[cfg_attr(feature = "serde", serde(default))]
    pub pitch_on_ground_rad: Option<f64>,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            log_interpolation: false,
            force_full_interpolation: false,
            aircraft_parts: true,
            send_ground_flag: true,
            fix_scenery_offset: false,
            pitch_on_ground_rad: None,
        }
    }
}

impl Setup {
    /// Copy with another [Mode].
    pub fn with_mode(&self, mode: Mode) -> Self {
        let mut s = *self;
        s.mode = mode;
        s
    }

    /// Copy with logging turned on or off.
    pub fn with_logging(&self, log: bool) -> Self {
        let mut s = *self;
        s.log_interpolation = log;
        s
    }

    /// Copy with the scenery offset fix turned on or off.
    pub fn with_scenery_offset_fix(&self, fix: bool) -> Self {
        let mut s = *self;
        s.fix_scenery_offset = fix;
        s
    }
}

impl std::fmt::Display for Setup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "mode={} log={} full={} parts={} gnd.flag={} scenery fix={}",
            self.mode,
            self.log_interpolation,
            self.force_full_interpolation,
            self.aircraft_parts,
            self.send_ground_flag,
            self.fix_scenery_offset,
        )
    }
}

#[cfg(test)]
mod test {
    use super::{Mode, Setup};

    #[test]
    fn test_defaults() {
        let setup = Setup::default();
        assert_eq!(setup.mode, Mode::Linear);
        assert!(setup.aircraft_parts);
        assert!(setup.send_ground_flag);
        assert!(!setup.log_interpolation);
        assert!(!setup.fix_scenery_offset);
        assert!(setup.pitch_on_ground_rad.is_none());
    }

    #[test]
    fn test_builders() {
        let setup = Setup::default()
            .with_mode(Mode::Velocity)
            .with_logging(true)
            .with_scenery_offset_fix(true);
        assert_eq!(setup.mode, Mode::Velocity);
        assert!(setup.log_interpolation);
        assert!(setup.fix_scenery_offset);
    }
}
