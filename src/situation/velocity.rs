/// Instantaneous 6 DOF velocity as transmitted by velocity capable
/// network clients.
///
/// Linear axes follow the transmit convention: `x` east, `y` vertical
/// (positive up), `z` north. Angular rates are body rates in rad/s.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct AircraftVelocity {
    /// Eastward velocity (m/s)
    pub x_m_s: f64,
    /// Vertical velocity (m/s, positive up)
    pub y_m_s: f64,
    /// Northward velocity (m/s)
    pub z_m_s: f64,
    /// Pitch rate (rad/s)
    pub pitch_rad_s: f64,
    /// Roll rate (rad/s)
    pub roll_rad_s: f64,
    /// Heading rate (rad/s)
    pub heading_rad_s: f64,
}

impl AircraftVelocity {
    /// All zero velocity, the stationary aircraft assumption.
    pub const ZERO: Self = Self {
        x_m_s: 0.0,
        y_m_s: 0.0,
        z_m_s: 0.0,
        pitch_rad_s: 0.0,
        roll_rad_s: 0.0,
        heading_rad_s: 0.0,
    };

    /// New [AircraftVelocity] from linear (m/s) and angular (rad/s) rates.
    pub fn new(
        x_m_s: f64,
        y_m_s: f64,
        z_m_s: f64,
        pitch_rad_s: f64,
        roll_rad_s: f64,
        heading_rad_s: f64,
    ) -> Self {
        Self {
            x_m_s,
            y_m_s,
            z_m_s,
            pitch_rad_s,
            roll_rad_s,
            heading_rad_s,
        }
    }
}

impl std::fmt::Display for AircraftVelocity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "v=({:.1}, {:.1}, {:.1})m/s w=({:.3}, {:.3}, {:.3})rad/s",
            self.x_m_s,
            self.y_m_s,
            self.z_m_s,
            self.pitch_rad_s,
            self.roll_rad_s,
            self.heading_rad_s
        )
    }
}
