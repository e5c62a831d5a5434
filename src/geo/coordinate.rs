use nalgebra::Vector3;

use crate::{
    constants::EARTH_RADIUS_M,
    errors::Error,
    geo::{Altitude, AltitudeDatum},
};

/// Slack beyond the unit sphere tolerated on each vector component,
/// because blended vectors end up slightly inside the sphere.
const VALID_VECTOR_RANGE: f64 = 1.00001;

/// Geodetic position, stored as a unit sphere normal vector plus a
/// separate geodetic height.
///
/// Latitude and longitude are always derived from the vector, never kept
/// alongside it, so the two representations cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    x: f64,
    y: f64,
    z: f64,
    height: Altitude,
}

impl Default for Coordinate {
    fn default() -> Self {
        // normal vector of lat/lon (0, 0)
        Self {
            x: 1.0,
            y: 0.0,
            z: 0.0,
            height: Altitude::default(),
        }
    }
}

impl Coordinate {
    /// Builds a [Coordinate] from latitude/longitude in degrees and a geodetic height.
    pub fn from_lat_lon_deg(lat_deg: f64, lon_deg: f64, height: Altitude) -> Self {
        Self::from_lat_lon_rad(lat_deg.to_radians(), lon_deg.to_radians(), height)
    }

    /// Builds a [Coordinate] from latitude/longitude in radians and a geodetic height.
    pub fn from_lat_lon_rad(lat_rad: f64, lon_rad: f64, height: Altitude) -> Self {
        Self {
            x: lat_rad.cos() * lon_rad.cos(),
            y: lat_rad.cos() * lon_rad.sin(),
            z: lat_rad.sin(),
            height,
        }
    }

    /// Builds a [Coordinate] directly from a normal vector.
    /// The vector is taken as is, within the tolerated interpolation slack.
    pub fn from_normal_vector(nv: Vector3<f64>, height: Altitude) -> Self {
        debug_assert!(
            nv.x.is_finite() && nv.y.is_finite() && nv.z.is_finite(),
            "non finite normal vector"
        );
        Self {
            x: nv.x,
            y: nv.y,
            z: nv.z,
            height,
        }
    }

    /// Fallible variant of [Self::from_normal_vector], for data crossing
    /// the crate boundary.
    pub fn checked_from_normal_vector(nv: Vector3<f64>, height: Altitude) -> Result<Self, Error> {
        if !(nv.x.is_finite() && nv.y.is_finite() && nv.z.is_finite()) {
            return Err(Error::InvalidPositionVector);
        }
        let coord = Self {
            x: nv.x,
            y: nv.y,
            z: nv.z,
            height,
        };
        if !coord.is_valid_vector_range() {
            return Err(Error::InvalidPositionVector);
        }
        Ok(coord)
    }

    /// Normal vector (x, y, z).
    pub fn normal_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Derived latitude in radians.
    pub fn latitude_rad(&self) -> f64 {
        self.z.atan2(self.x.hypot(self.y))
    }

    /// Derived longitude in radians.
    /// At the poles atan2(0, 0) applies, which IEEE resolves to 0: stable, not NaN.
    pub fn longitude_rad(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Derived latitude in degrees.
    pub fn latitude_deg(&self) -> f64 {
        self.latitude_rad().to_degrees()
    }

    /// Derived longitude in degrees.
    pub fn longitude_deg(&self) -> f64 {
        self.longitude_rad().to_degrees()
    }

    /// Geodetic height.
    pub fn height(&self) -> Altitude {
        self.height
    }

    /// Replaces the geodetic height.
    pub fn set_height(&mut self, height: Altitude) {
        self.height = height;
    }

    /// Replaces latitude/longitude, keeping the height.
    pub fn set_lat_lon_rad(&mut self, lat_rad: f64, lon_rad: f64) {
        self.x = lat_rad.cos() * lon_rad.cos();
        self.y = lat_rad.cos() * lon_rad.sin();
        self.z = lat_rad.sin();
    }

    /// True while every component stays within the tolerated range.
    /// Infinite values are out of range, NaN comparisons are false.
    pub fn is_valid_vector_range(&self) -> bool {
        self.x <= VALID_VECTOR_RANGE
            && self.x >= -VALID_VECTOR_RANGE
            && self.y <= VALID_VECTOR_RANGE
            && self.y >= -VALID_VECTOR_RANGE
            && self.z <= VALID_VECTOR_RANGE
            && self.z >= -VALID_VECTOR_RANGE
    }

    /// Clamps each component into [-1, 1], returns how many were clamped.
    pub fn clamp_vector(&mut self) -> usize {
        let mut clamped = 0;
        for c in [&mut self.x, &mut self.y, &mut self.z] {
            if *c < -1.0 {
                *c = -1.0;
                clamped += 1;
            } else if *c > 1.0 {
                *c = 1.0;
                clamped += 1;
            }
        }
        clamped
    }

    /// Component wise vector equality within f64 epsilon.
    pub fn equal_normal_vector(&self, rhs: &Self) -> bool {
        (self.x - rhs.x).abs() <= f64::EPSILON
            && (self.y - rhs.y).abs() <= f64::EPSILON
            && (self.z - rhs.z).abs() <= f64::EPSILON
    }

    /// Squared chord distance between the normal vectors.
    /// Cheap proxy for "almost the same position" checks.
    pub fn chord_distance_squared(&self, rhs: &Self) -> f64 {
        (self.normal_vector() - rhs.normal_vector()).norm_squared()
    }

    /// Great circle distance to `rhs` in meters.
    ///
    /// Cross/dot product formulation, robust near coincident and antipodal
    /// points. A fixed mean Earth radius applies: good enough for
    /// rendering distances, not for geodetic surveying.
    pub fn great_circle_distance_m(&self, rhs: &Self) -> f64 {
        let v1 = self.normal_vector();
        let v2 = rhs.normal_vector();
        EARTH_RADIUS_M * v1.cross(&v2).norm().atan2(v1.dot(&v2))
    }

    /// Initial bearing towards `rhs`, signed (-pi, pi].
    /// The bearing from a point to itself resolves to a stable 0.
    pub fn bearing_rad(&self, rhs: &Self) -> f64 {
        let north_pole = Vector3::new(0.0, 0.0, 1.0);
        let v1 = self.normal_vector();
        let c1 = v1.cross(&rhs.normal_vector());
        let c2 = v1.cross(&north_pole);
        let cross = c1.cross(&c2);
        let sin_theta = cross.norm().copysign(cross.dot(&v1));
        let cos_theta = c1.dot(&c2);
        sin_theta.atan2(cos_theta)
    }

    /// Destination point at `distance_m` along `bearing_rad`, keeping the height.
    ///
    /// Standard destination point formula
    /// (<http://www.movable-type.co.uk/scripts/latlong.html#destPoint>),
    /// longitude normalized to +/-180 deg.
    pub fn destination(&self, distance_m: f64, bearing_rad: f64) -> Self {
        use std::f64::consts::PI;

        debug_assert!(distance_m >= 0.0, "negative distance");
        if distance_m <= 0.0 {
            return *self;
        }

        let lat1 = self.latitude_rad();
        let lon1 = self.longitude_rad();
        let dist_ratio = distance_m / EARTH_RADIUS_M;

        let lat2 = (lat1.sin() * dist_ratio.cos()
            + lat1.cos() * dist_ratio.sin() * bearing_rad.cos())
        .asin();

        const POLE_EPSILON: f64 = 1.0E-6;
        let lon2 = if lat2.cos().abs() < POLE_EPSILON {
            lon1
        } else {
            let lon = lon1
                + (bearing_rad.sin() * dist_ratio.sin() * lat1.cos())
                    .atan2(dist_ratio.cos() - lat1.sin() * lat2.sin());
            (lon + 3.0 * PI).rem_euclid(2.0 * PI) - PI
        };

        Self::from_lat_lon_rad(lat2, lon2, self.height)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.6}deg {:.6}deg {}",
            self.latitude_deg(),
            self.longitude_deg(),
            self.height
        )
    }
}

/// Convenience constructor used across the test suites.
#[cfg(test)]
pub fn coordinate_msl(lat_deg: f64, lon_deg: f64, altitude_m: f64) -> Coordinate {
    Coordinate::from_lat_lon_deg(
        lat_deg,
        lon_deg,
        Altitude {
            meters: altitude_m,
            datum: AltitudeDatum::MeanSeaLevel,
        },
    )
}

#[cfg(test)]
mod test {
    use super::{coordinate_msl, Coordinate};
    use crate::geo::Altitude;
    use nalgebra::Vector3;

    #[test]
    fn test_lat_lon_round_trip() {
        let c = coordinate_msl(48.118433, 16.561090, 100.0);
        assert!((c.latitude_deg() - 48.118433).abs() < 1E-9);
        assert!((c.longitude_deg() - 16.561090).abs() < 1E-9);
        assert_eq!(c.height().meters, 100.0);
    }

    #[test]
    fn test_pole_longitude_is_stable() {
        let north = coordinate_msl(90.0, 0.0, 0.0);
        assert!(north.longitude_rad().is_finite());
        assert_eq!(north.longitude_rad(), 0.0);
    }

    #[test]
    fn test_degenerate_distance_and_bearing() {
        let c = coordinate_msl(-33.946, 151.177, 6.0);
        assert_eq!(c.great_circle_distance_m(&c), 0.0);
        assert!(c.bearing_rad(&c).is_finite());
        assert_eq!(c.bearing_rad(&c), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // EDDF - KJFK, roughly 6200 km
        let eddf = coordinate_msl(50.0379, 8.5622, 111.0);
        let kjfk = coordinate_msl(40.6413, -73.7781, 4.0);
        let d = eddf.great_circle_distance_m(&kjfk);
        assert!(d > 6.1E6 && d < 6.3E6, "implausible distance {}", d);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let c = coordinate_msl(45.0, 10.0, 0.0);
        let north = coordinate_msl(46.0, 10.0, 0.0);
        let east = coordinate_msl(45.0, 11.0, 0.0);
        assert!(c.bearing_rad(&north).abs() < 1E-6);
        let east_bearing = c.bearing_rad(&east).to_degrees();
        assert!((east_bearing - 90.0).abs() < 1.0, "east bearing {}", east_bearing);
    }

    #[test]
    fn test_destination_round_trip() {
        let c = coordinate_msl(51.4700, -0.4543, 25.0);
        let moved = c.destination(10_000.0, 45_f64.to_radians());
        let d = c.great_circle_distance_m(&moved);
        assert!((d - 10_000.0).abs() < 1.0, "distance {}", d);
        assert_eq!(moved.height(), c.height());
    }

    #[test]
    fn test_destination_zero_distance() {
        let c = coordinate_msl(51.4700, -0.4543, 25.0);
        assert_eq!(c.destination(0.0, 1.0), c);
    }

    #[test]
    fn test_vector_validity() {
        let mut c = Coordinate::from_normal_vector(Vector3::new(1.000005, 0.0, 0.0), Altitude::msl(0.0));
        assert!(c.is_valid_vector_range());
        assert_eq!(c.clamp_vector(), 1);
        assert_eq!(c.normal_vector().x, 1.0);

        assert!(Coordinate::checked_from_normal_vector(
            Vector3::new(f64::NAN, 0.0, 0.0),
            Altitude::msl(0.0)
        )
        .is_err());
        assert!(Coordinate::checked_from_normal_vector(
            Vector3::new(2.0, 0.0, 0.0),
            Altitude::msl(0.0)
        )
        .is_err());
    }
}
