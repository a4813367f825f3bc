//! Mosaic-assembly collaborator boundary
//!
//! Tile decoding, pyramid storage layout, and distributed assembly belong
//! to an external image-registration library. This crate only describes
//! what it asks of that collaborator: implement [`MosaicSource`] and
//! [`Mosaic`] in your application over your registration stack, the same
//! way a storage backend would be supplied to a data store.

use crate::error::Result;
use crate::spatial::Rectangle;
use async_trait::async_trait;
use ndarray::Array2;

/// One assembled section image with its validity mask.
///
/// The mask marks pixels actually covered by tiles; uncovered pixels in
/// `image` are filler.
#[derive(Debug, Clone)]
pub struct AssembledImage {
    pub image: Array2<f32>,
    pub mask: Array2<bool>,
}

impl AssembledImage {
    pub fn new(image: Array2<f32>, mask: Array2<bool>) -> Self {
        Self { image, mask }
    }

    /// (rows, columns) of the assembled image
    pub fn dim(&self) -> (usize, usize) {
        self.image.dim()
    }
}

/// A loaded alignment mosaic: one channel's transform from local tile
/// space into volume coordinates, plus the machinery to assemble its tiles.
#[async_trait]
pub trait Mosaic: Send + Sync {
    /// Bounding box of the transformed tiles in volume coordinates
    fn bounds(&self) -> Rectangle;

    /// Assemble the tiles under `tiles_path` covering `region`.
    ///
    /// `use_cluster` requests distributed/parallel execution where the
    /// implementation supports it. Potentially long-running; there is no
    /// cancellation contract at this layer.
    async fn assemble_tiles(
        &self,
        tiles_path: &str,
        region: &Rectangle,
        use_cluster: bool,
    ) -> Result<AssembledImage>;
}

/// Loader of alignment mosaics from transform files
#[async_trait]
pub trait MosaicSource: Send + Sync {
    async fn load(&self, path: &str) -> Result<Box<dyn Mosaic>>;
}
