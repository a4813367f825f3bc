//! Error types for volume query operations

use thiserror::Error;

/// Main error type for volume query operations.
///
/// Every variant here is fatal for the operation that raised it. Lookup
/// misses that are legitimate by design (a channel name absent from one
/// section's index) are not errors; they surface as `Option`/skips at the
/// call site.
#[derive(Error, Debug)]
pub enum VolumeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A channel claims volume-space alignment but carries no
    /// "ChannelToVolume" transform. Indicates corrupt volume metadata.
    #[error("channel '{channel}' in section {section} has no ChannelToVolume transform")]
    MissingTransform { channel: String, section: i32 },

    /// Two scales disagree on the unit of measure for a shared axis.
    #[error("unit mismatch on axis '{axis}': '{left}' vs '{right}'")]
    UnitMismatch {
        axis: String,
        left: String,
        right: String,
    },

    /// An axis name resolved to no scale entry on either input.
    #[error("no scale found for axis '{0}'")]
    MissingAxis(String),

    /// No channel in the volume has a registered transform, so bounds are
    /// undefined.
    #[error("volume has no registered channels")]
    EmptyVolume,

    /// A channel has no filter with the requested name.
    #[error("channel '{channel}' has no filter '{filter}'")]
    MissingFilter { channel: String, filter: String },

    /// A tile pyramid has no precomputed tier for the requested level.
    #[error("channel '{channel}' has no pyramid level {level}")]
    MissingLevel { channel: String, level: u32 },

    /// Error reported by the external mosaic-assembly collaborator.
    #[error("mosaic assembly error: {0}")]
    Assembly(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Specialized Result type for volume query operations
pub type Result<T> = std::result::Result<T, VolumeError>;

impl From<serde_json::Error> for VolumeError {
    fn from(err: serde_json::Error) -> Self {
        VolumeError::Serialization(err.to_string())
    }
}
