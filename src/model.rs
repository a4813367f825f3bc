//! Volume model structures consumed by the query engine
//!
//! The model hierarchy (blocks → sections → channels → transforms and
//! filters) is owned and loaded by the caller; the query engine only walks
//! it. Structures here are plain serde-derived records with explicit
//! optional-returning accessors.

use crate::error::Result;
use crate::scale::Scale;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the transform that maps a channel's local tile space into
/// volume coordinates. A channel without this transform is not registered.
pub const CHANNEL_TO_VOLUME: &str = "ChannelToVolume";

/// Name of the filter holding the leveled tile pyramid used for assembly
pub const LEVELED_FILTER: &str = "Leveled";

/// A complete volume model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeModel {
    /// Volume name
    pub name: String,

    /// Creation timestamp, if the producing pipeline recorded one
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Blocks of ordered sections
    pub blocks: Vec<Block>,
}

impl VolumeModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: None,
            blocks: Vec::new(),
        }
    }

    /// Append a block
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Parse a model from JSON bytes
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Iterate over every section in every block
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.blocks.iter().flat_map(|b| b.sections.iter())
    }
}

/// A named group of sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub name: String,
    pub sections: Vec<Section>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }
}

/// One 2D slice of the volume, identified by an integer number giving its
/// position along the Z axis. Section numbers are not necessarily
/// contiguous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub number: i32,
    pub channels: Vec<Channel>,
}

impl Section {
    pub fn new(number: i32) -> Self {
        Self {
            number,
            channels: Vec::new(),
        }
    }

    pub fn add_channel(&mut self, channel: Channel) {
        self.channels.push(channel);
    }

    /// Look up a channel by name
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }
}

/// One imaging modality captured for a section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,

    /// Physical resolution of the channel's full-resolution imagery
    pub scale: Scale,

    /// Alignment transforms, keyed by name via [`Channel::transform`]
    #[serde(default)]
    pub transforms: Vec<Transform>,

    /// Filters holding tile pyramids, keyed by name via [`Channel::filter`]
    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl Channel {
    pub fn new(name: impl Into<String>, scale: Scale) -> Self {
        Self {
            name: name.into(),
            scale,
            transforms: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn add_transform(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }

    pub fn add_filter(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    /// Look up a transform by name
    pub fn transform(&self, name: &str) -> Option<&Transform> {
        self.transforms.iter().find(|t| t.name == name)
    }

    /// Look up a filter by name
    pub fn filter(&self, name: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.name == name)
    }
}

/// A mapping from a channel's local tile space into another coordinate
/// space, stored externally at `full_path`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transform {
    pub name: String,
    pub full_path: String,
}

impl Transform {
    pub fn new(name: impl Into<String>, full_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
        }
    }
}

/// A processed rendition of a channel's imagery with its tile pyramid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub tile_pyramid: TilePyramid,
}

impl Filter {
    pub fn new(name: impl Into<String>, tile_pyramid: TilePyramid) -> Self {
        Self {
            name: name.into(),
            tile_pyramid,
        }
    }
}

/// Precomputed multi-resolution tiers of an image, addressed by integer
/// downsample level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TilePyramid {
    /// Level number → path of that tier's tile directory
    pub levels: BTreeMap<u32, String>,
}

impl TilePyramid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a precomputed tier
    pub fn add_level(&mut self, level: u32, full_path: impl Into<String>) {
        self.levels.insert(level, full_path.into());
    }

    /// Path of the tier for `level`, if precomputed
    pub fn level_path(&self, level: u32) -> Option<&str> {
        self.levels.get(&level).map(|s| s.as_str())
    }
}
