//! Geodetic coordinate model: unit sphere normal vectors, great circle
//! math and ground elevation planes.

mod altitude;
mod elevation;

pub(crate) mod coordinate;

pub use altitude::{Altitude, AltitudeDatum};
pub use coordinate::Coordinate;
pub use elevation::{ElevationInfo, ElevationPlane};
