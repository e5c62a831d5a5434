use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    /// Failed to parse interpolation mode.
    #[error("non supported/invalid interpolation mode")]
    InvalidMode,

    /// Altitudes against different reference datums cannot be blended.
    /// A mixed datum pair is a feeder bug; the engine falls back to
    /// holding the last good altitude when it runs into one.
    #[error("altitude reference datum mismatch")]
    AltitudeDatumMismatch,

    /// A situation carried a non finite or badly out of range position
    /// vector. Such samples are rejected at insertion, they must never
    /// reach the interpolation step.
    #[error("invalid position vector")]
    InvalidPositionVector,
}
