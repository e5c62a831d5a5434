use crate::{constants::SINGLE_POINT_RADIUS_M, geo::Coordinate};

/// Provenance of a ground elevation attached to a situation.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevationInfo {
    /// No elevation available
    #[default]
    NoInfo,
    /// Straight from the elevation provider (terrain probe)
    FromProvider,
    /// Looked up in the provider cache during interpolation
    FromCache,
    /// Interpolated between two bracketing situations
    Interpolated,
    /// Averaged over a situation change window
    FromChange,
    /// Injected by a test
    Test,
}

/// A known ground elevation around a position, valid within a radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationPlane {
    /// Position the elevation was sampled at
    pub position: Coordinate,
    /// Ground elevation in meters MSL
    pub elevation_m: f64,
    /// Validity radius in meters
    pub radius_m: f64,
}

impl ElevationPlane {
    /// New [ElevationPlane] with an explicit validity radius.
    pub fn new(position: Coordinate, elevation_m: f64, radius_m: f64) -> Self {
        Self {
            position,
            elevation_m,
            radius_m,
        }
    }

    /// Elevation sampled for a single point, valid within
    /// [SINGLE_POINT_RADIUS_M].
    pub fn single_point(position: Coordinate, elevation_m: f64) -> Self {
        Self::new(position, elevation_m, SINGLE_POINT_RADIUS_M)
    }

    /// True when `position` lies within the validity radius.
    pub fn covers(&self, position: &Coordinate) -> bool {
        self.position.great_circle_distance_m(position) <= self.radius_m
    }
}

impl std::fmt::Display for ElevationPlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}m elv. (r={:.0}m)", self.elevation_m, self.radius_m)
    }
}

#[cfg(test)]
mod test {
    use super::ElevationPlane;
    use crate::geo::coordinate::coordinate_msl;

    #[test]
    fn test_covers() {
        let plane = ElevationPlane::single_point(coordinate_msl(48.0, 11.0, 0.0), 447.0);
        assert!(plane.covers(&coordinate_msl(48.0, 11.0, 0.0)));
        // ~111m per 0.001 deg latitude
        assert!(plane.covers(&coordinate_msl(48.001, 11.0, 0.0)));
        assert!(!plane.covers(&coordinate_msl(48.1, 11.0, 0.0)));
    }
}
