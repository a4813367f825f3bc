//! volume-query - spatial queries over sectioned volumetric imagery
//!
//! A queryable, multi-resolution view over a volume built from ordered 2D
//! sections, each carrying one or more imaging channels registered into a
//! common coordinate space.
//!
//! # Features
//!
//! - Section-to-channel registration index built from a caller-owned
//!   volume model
//! - Overall bounds from per-channel alignment transforms
//! - Finest-common-resolution reconciliation across channels
//! - Region/resolution/channel-set queries assembled through a
//!   caller-supplied mosaic collaborator
//!
//! # Mosaic assembly
//!
//! Tile decoding and distributed assembly live outside this crate.
//! Implement the `MosaicSource` and `Mosaic` traits over your image
//! registration stack and hand the source to [`Volume::new`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use volume_query::{Bounds, Volume, VolumeModel};
//!
//! # async fn example(source: Arc<dyn volume_query::MosaicSource>) -> volume_query::Result<()> {
//! let model = Arc::new(VolumeModel::from_json_slice(&std::fs::read("volume.json")?)?);
//! let volume = Volume::new(model, source)?;
//!
//! let bounds = volume.bounds().await?;
//! let finest = volume.highest_resolution(None, None).await?;
//! let images = volume.get_data(&bounds, 16.0, None).await?;
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod error;
pub mod index;
pub mod model;
pub mod mosaic;
pub mod scale;
pub mod spatial;

// Re-exports
pub use access::Volume;
pub use error::{Result, VolumeError};
pub use index::{ChannelIndex, RegisteredChannel, TransformPathIndex};
pub use model::{VolumeModel, CHANNEL_TO_VOLUME, LEVELED_FILTER};
pub use mosaic::{AssembledImage, Mosaic, MosaicSource};
pub use scale::{AxisScale, Scale};
pub use spatial::{section_range, Bounds, Rectangle};

/// Version of the volume-query crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
