//! Provider traits the engine pulls its inputs through, plus in-memory
//! implementations for tests and simple deployments.
//!
//! The render thread reads while the network thread writes, so the
//! in-memory providers guard their state with a read-write lock. The
//! engine itself never blocks on I/O behind these traits: an elevation
//! miss returns `None`, it does not fetch.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::{
    callsign::Callsign,
    cfg::Setup,
    constants::MAX_SITUATIONS_PER_CALLSIGN,
    errors::Error,
    geo::{Coordinate, ElevationPlane},
    situation::AircraftSituation,
};

/// Per callsign situation history access.
///
/// Histories are latest-first by adjusted timestamp and bounded, the
/// oldest entries are evicted past [MAX_SITUATIONS_PER_CALLSIGN].
pub trait SituationSource {
    /// Latest-first situation history for this callsign.
    fn situations(&self, callsign: &Callsign) -> Vec<AircraftSituation>;

    /// Monotonic modification stamp for this callsign's history, lets
    /// the engine skip re-reading an unchanged history.
    fn last_modified(&self, callsign: &Callsign) -> u64;
}

/// Terrain elevation access. A miss is a normal operating mode, not an
/// error: aircraft far from any probed point simply have no elevation.
pub trait ElevationSource {
    /// Closest known elevation around `position` within `radius_m`.
    fn closest_elevation_within_range(
        &self,
        position: &Coordinate,
        radius_m: f64,
    ) -> Option<ElevationPlane>;
}

/// Per callsign effective setup access.
pub trait SetupSource {
    /// Effective [Setup] for this callsign (global or per callsign override).
    fn setup_for(&self, callsign: &Callsign) -> Setup;
}

#[derive(Default)]
struct History {
    situations: Vec<AircraftSituation>,
    last_modified: u64,
}

/// In-memory [SituationSource], fed by a network client (or a test).
#[derive(Default)]
pub struct MemorySituationSource {
    inner: RwLock<HashMap<Callsign, History>>,
}

impl MemorySituationSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new situation sample, keeping the history latest-first
    /// by adjusted timestamp and bounded. Out of order arrivals are
    /// sorted in, samples with broken position vectors are rejected.
    pub fn insert(&self, situation: AircraftSituation) -> Result<(), Error> {
        if !situation.position.is_valid_vector_range() {
            return Err(Error::InvalidPositionVector);
        }

        let mut inner = self.inner.write().unwrap();
        let history = inner.entry(situation.callsign.clone()).or_default();

        let adjusted = situation.adjusted_time();
        let at = history
            .situations
            .iter()
            .position(|s| s.adjusted_time() <= adjusted)
            .unwrap_or(history.situations.len());
        history.situations.insert(at, situation);
        history.situations.truncate(MAX_SITUATIONS_PER_CALLSIGN);
        history.last_modified += 1;
        Ok(())
    }

    /// Drops the history of this callsign (aircraft left the airspace).
    pub fn remove(&self, callsign: &Callsign) {
        self.inner.write().unwrap().remove(callsign);
    }

    pub fn situations_count(&self, callsign: &Callsign) -> usize {
        self.inner
            .read()
            .unwrap()
            .get(callsign)
            .map_or(0, |h| h.situations.len())
    }
}

impl SituationSource for MemorySituationSource {
    fn situations(&self, callsign: &Callsign) -> Vec<AircraftSituation> {
        self.inner
            .read()
            .unwrap()
            .get(callsign)
            .map_or_else(Vec::new, |h| h.situations.clone())
    }

    fn last_modified(&self, callsign: &Callsign) -> u64 {
        self.inner
            .read()
            .unwrap()
            .get(callsign)
            .map_or(0, |h| h.last_modified)
    }
}

/// In-memory [ElevationSource] over a set of probed planes.
#[derive(Default)]
pub struct MemoryElevationSource {
    planes: RwLock<Vec<ElevationPlane>>,
}

impl MemoryElevationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, plane: ElevationPlane) {
        self.planes.write().unwrap().push(plane);
    }

    pub fn clear(&self) {
        self.planes.write().unwrap().clear();
    }
}

impl ElevationSource for MemoryElevationSource {
    fn closest_elevation_within_range(
        &self,
        position: &Coordinate,
        radius_m: f64,
    ) -> Option<ElevationPlane> {
        let planes = self.planes.read().unwrap();
        planes
            .iter()
            .map(|plane| (plane.position.great_circle_distance_m(position), plane))
            .filter(|(distance_m, plane)| *distance_m <= radius_m.min(plane.radius_m))
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, plane)| *plane)
    }
}

/// Elevation source without any data, for consumers that do not probe
/// terrain at all.
#[derive(Default)]
pub struct NullElevationSource {}

impl ElevationSource for NullElevationSource {
    fn closest_elevation_within_range(&self, _: &Coordinate, _: f64) -> Option<ElevationPlane> {
        None
    }
}

/// In-memory [SetupSource]: one global setup plus per callsign overrides.
pub struct MemorySetupSource {
    global: Setup,
    overrides: RwLock<HashMap<Callsign, Setup>>,
}

impl MemorySetupSource {
    pub fn new(global: Setup) -> Self {
        Self {
            global,
            overrides: RwLock::new(HashMap::new()),
        }
    }

    pub fn set_override(&self, callsign: Callsign, setup: Setup) {
        self.overrides.write().unwrap().insert(callsign, setup);
    }

    pub fn clear_override(&self, callsign: &Callsign) {
        self.overrides.write().unwrap().remove(callsign);
    }
}

impl SetupSource for MemorySetupSource {
    fn setup_for(&self, callsign: &Callsign) -> Setup {
        self.overrides
            .read()
            .unwrap()
            .get(callsign)
            .copied()
            .unwrap_or(self.global)
    }
}
