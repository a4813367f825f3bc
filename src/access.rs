//! Volume query façade - main API for querying sectioned volumes

use crate::error::{Result, VolumeError};
use crate::index::TransformPathIndex;
use crate::model::{VolumeModel, LEVELED_FILTER};
use crate::mosaic::{AssembledImage, MosaicSource};
use crate::scale::{Scale, AXIS_X};
use crate::spatial::{Bounds, Rectangle};
use futures::future::try_join_all;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Queryable multi-resolution view over a sectioned volume.
///
/// Composes the registration index, the spatial enumerator, and the
/// external mosaic-assembly collaborator to answer: overall bounds,
/// available channel names, finest common resolution in a region, and
/// per-section image data for a region/resolution/channel-set query.
///
/// The registration index is built at construction, so corrupt volume
/// metadata fails fast. The channel list and bounds are computed once on
/// first access and cached for the lifetime of this value; constructing a
/// new `Volume` is the only way to pick up model changes.
pub struct Volume {
    /// Caller-owned volume model
    model: Arc<VolumeModel>,

    /// External mosaic-assembly collaborator
    mosaics: Arc<dyn MosaicSource>,

    /// Section number → registered channels
    index: TransformPathIndex,

    /// Cached union of channel names declared anywhere in the model
    channels: RwLock<Option<BTreeSet<String>>>,

    /// Cached overall bounding box
    bounds: OnceCell<Bounds>,
}

impl Volume {
    /// Create a query engine over an already-loaded volume model.
    ///
    /// Fails with [`VolumeError::MissingTransform`] if the model's
    /// registration metadata is corrupt.
    pub fn new(model: Arc<VolumeModel>, mosaics: Arc<dyn MosaicSource>) -> Result<Self> {
        let index = TransformPathIndex::build(&model)?;

        Ok(Self {
            model,
            mosaics,
            index,
            channels: RwLock::new(None),
            bounds: OnceCell::new(),
        })
    }

    /// Name of the underlying volume model
    pub fn name(&self) -> &str {
        &self.model.name
    }

    /// The section-to-channel registration index
    pub fn index(&self) -> &TransformPathIndex {
        &self.index
    }

    /// Every channel name declared anywhere in the volume, sorted and
    /// deduplicated.
    ///
    /// Lists all declared channels regardless of registration status; query
    /// resolution only finds the spatially registered subset.
    pub fn channels(&self) -> BTreeSet<String> {
        if let Some(channels) = self.channels.read().as_ref() {
            return channels.clone();
        }

        let computed: BTreeSet<String> = self
            .model
            .sections()
            .flat_map(|s| s.channels.iter().map(|c| c.name.clone()))
            .collect();

        *self.channels.write() = Some(computed.clone());
        computed
    }

    /// Bounding box of the entire volume as
    /// `(min_z, min_y, min_x, max_z, max_y, max_x)`.
    ///
    /// The XY extent is the union of every registered transform's bounding
    /// box; the Z extent spans the lowest and highest known section
    /// numbers. Fails with [`VolumeError::EmptyVolume`] when no channel is
    /// registered.
    pub async fn bounds(&self) -> Result<Bounds> {
        self.bounds
            .get_or_try_init(|| self.compute_bounds())
            .await
            .copied()
    }

    async fn compute_bounds(&self) -> Result<Bounds> {
        let (min_z, max_z) = match (self.index.min_section(), self.index.max_section()) {
            (Some(min), Some(max)) => (min, max),
            _ => return Err(VolumeError::EmptyVolume),
        };

        // One load per distinct transform path, concurrently
        let paths: Vec<&str> = self.index.transform_paths().into_iter().collect();
        let mosaics = try_join_all(paths.iter().map(|path| self.mosaics.load(path))).await?;

        let mut rect: Option<Rectangle> = None;
        for mosaic in &mosaics {
            let mosaic_rect = mosaic.bounds();
            rect = Some(match rect {
                Some(r) => r.union(&mosaic_rect),
                None => mosaic_rect,
            });
        }
        let rect = rect.ok_or(VolumeError::EmptyVolume)?;

        debug!(
            volume = %self.model.name,
            transforms = paths.len(),
            "computed volume bounds"
        );

        Ok(Bounds::from_rectangle(rect, f64::from(min_z), f64::from(max_z)))
    }

    /// Finest resolution available per axis across every requested channel
    /// present in `region`.
    ///
    /// With no region, the full [`Volume::bounds`] is used; with no channel
    /// names, every registered channel counts. The result is a "can go at
    /// least this fine everywhere requested" guarantee, not an average.
    pub async fn highest_resolution(
        &self,
        region: Option<&Bounds>,
        channel_names: Option<&[String]>,
    ) -> Result<Scale> {
        let region = match region {
            Some(r) => *r,
            None => self.bounds().await?,
        };

        let mut scale = Scale::new();
        for number in self.index.sections_in_bounds(&region) {
            let section = match self.index.section(number) {
                Some(section) => section,
                None => continue,
            };

            for channel in section.resolve(channel_names) {
                scale = scale.reconcile(channel.scale())?;
            }
        }

        Ok(scale)
    }

    /// Assemble image data for every (section, channel) pair intersecting
    /// `region`, at the pyramid level closest to `resolution`.
    ///
    /// The pyramid level for a channel is the downsample factor
    /// `resolution / scale.X.units_per_pixel`, truncated to an integer;
    /// the tile tier must be precomputed under the `"Leveled"` filter or
    /// the whole query fails. Assembly is delegated to the collaborator
    /// one (section, channel) pair at a time, with clustered execution
    /// requested. Channel names absent from a section are skipped, so a
    /// name registered nowhere in the region yields an empty map rather
    /// than an error.
    pub async fn get_data(
        &self,
        region: &Bounds,
        resolution: f64,
        channel_names: Option<&[String]>,
    ) -> Result<BTreeMap<(i32, String), AssembledImage>> {
        let rect = region.rectangle_xy();
        let mut images = BTreeMap::new();

        for number in self.index.sections_in_bounds(region) {
            let section = match self.index.section(number) {
                Some(section) => section,
                None => continue,
            };

            for channel in section.resolve(channel_names) {
                let axis = channel
                    .scale()
                    .x()
                    .ok_or_else(|| VolumeError::MissingAxis(AXIS_X.to_string()))?;

                let downsample = resolution / axis.units_per_pixel;
                let level = downsample as u32;
                let tiles_path = channel.tiles_path(LEVELED_FILTER, level)?.to_string();

                debug!(
                    section = number,
                    channel = channel.name(),
                    level,
                    "assembling section image"
                );

                let mosaic = self.mosaics.load(channel.transform_path()).await?;
                let assembled = mosaic.assemble_tiles(&tiles_path, &rect, true).await?;
                images.insert((number, channel.name().to_string()), assembled);
            }
        }

        info!(
            volume = %self.model.name,
            images = images.len(),
            "assembled region data"
        );

        Ok(images)
    }
}
