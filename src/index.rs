//! Section-to-channel registration index
//!
//! Maps section number → registered channels for an entire volume model.
//! Only channels carrying a [`CHANNEL_TO_VOLUME`] alignment transform are
//! indexed; a section with no registered channel is omitted entirely.

use crate::error::{Result, VolumeError};
use crate::model::{Channel, TilePyramid, VolumeModel, CHANNEL_TO_VOLUME};
use crate::scale::Scale;
use crate::spatial::{section_range, Bounds};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// A channel with a known alignment into volume coordinates.
///
/// Binds the channel's metadata (name, scale, tile pyramids) to the one
/// transform that maps its local tile space into volume space. The small
/// per-channel metadata is copied out of the model at build time, so the
/// index carries no lifetime tie to it.
#[derive(Debug, Clone)]
pub struct RegisteredChannel {
    name: String,
    scale: Scale,
    transform_path: String,
    filters: BTreeMap<String, TilePyramid>,
}

impl RegisteredChannel {
    /// Build from a model channel.
    ///
    /// Fails with [`VolumeError::MissingTransform`] when the channel has no
    /// `"ChannelToVolume"` transform.
    pub fn from_channel(section: i32, channel: &Channel) -> Result<Self> {
        let transform =
            channel
                .transform(CHANNEL_TO_VOLUME)
                .ok_or_else(|| VolumeError::MissingTransform {
                    channel: channel.name.clone(),
                    section,
                })?;

        Ok(Self {
            name: channel.name.clone(),
            scale: channel.scale.clone(),
            transform_path: transform.full_path.clone(),
            filters: channel
                .filters
                .iter()
                .map(|f| (f.name.clone(), f.tile_pyramid.clone()))
                .collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    /// Path of the channel-to-volume transform file
    pub fn transform_path(&self) -> &str {
        &self.transform_path
    }

    /// Path of the tile tier for `filter_name` at pyramid `level`.
    ///
    /// A missing filter or level signals an absent precomputed resolution
    /// tier and is fatal for this channel's assembly.
    pub fn tiles_path(&self, filter_name: &str, level: u32) -> Result<&str> {
        let pyramid = self
            .filters
            .get(filter_name)
            .ok_or_else(|| VolumeError::MissingFilter {
                channel: self.name.clone(),
                filter: filter_name.to_string(),
            })?;

        pyramid
            .level_path(level)
            .ok_or_else(|| VolumeError::MissingLevel {
                channel: self.name.clone(),
                level,
            })
    }
}

/// Registered channels of one section, keyed by channel name
#[derive(Debug, Clone, Default)]
pub struct ChannelIndex {
    channels: BTreeMap<String, RegisteredChannel>,
}

impl ChannelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, channel: RegisteredChannel) {
        self.channels.insert(channel.name.clone(), channel);
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredChannel> {
        self.channels.get(name)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// All registered channels in index order
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredChannel> {
        self.channels.values()
    }

    /// Resolve a channel-name filter against this index.
    ///
    /// With names given, yields the matching channels in caller-supplied
    /// order; names absent from this section are silently skipped, since a
    /// channel may legitimately be registered in some sections and not
    /// others. With no filter, yields every registered channel in index
    /// order.
    pub fn resolve<'a>(
        &'a self,
        names: Option<&'a [String]>,
    ) -> Box<dyn Iterator<Item = &'a RegisteredChannel> + Send + 'a> {
        match names {
            Some(names) if !names.is_empty() => {
                Box::new(names.iter().filter_map(move |n| self.channels.get(n)))
            }
            _ => Box::new(self.channels.values()),
        }
    }
}

/// Mapping from section number to that section's registered channels.
///
/// Built once from a volume model and never mutated; pick up model changes
/// by building a new index.
#[derive(Debug, Clone, Default)]
pub struct TransformPathIndex {
    sections: BTreeMap<i32, ChannelIndex>,
}

impl TransformPathIndex {
    /// Walk the model and index every registered channel.
    ///
    /// Sections with zero registered channels are omitted rather than
    /// inserted empty. Any registration failure aborts the whole build; a
    /// partially indexed volume is never returned.
    pub fn build(model: &VolumeModel) -> Result<Self> {
        let mut sections = BTreeMap::new();

        for block in &model.blocks {
            for section in &block.sections {
                let mut index = ChannelIndex::new();
                for channel in &section.channels {
                    if channel.transform(CHANNEL_TO_VOLUME).is_some() {
                        index.insert(RegisteredChannel::from_channel(section.number, channel)?);
                    }
                }

                if !index.is_empty() {
                    sections.insert(section.number, index);
                }
            }
        }

        debug!(
            volume = %model.name,
            sections = sections.len(),
            "built transform path index"
        );

        Ok(Self { sections })
    }

    /// Registered channels of one section
    pub fn section(&self, number: i32) -> Option<&ChannelIndex> {
        self.sections.get(&number)
    }

    /// Lowest known section number
    pub fn min_section(&self) -> Option<i32> {
        self.sections.keys().next().copied()
    }

    /// Highest known section number
    pub fn max_section(&self) -> Option<i32> {
        self.sections.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// All indexed sections in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (i32, &ChannelIndex)> {
        self.sections.iter().map(|(n, idx)| (*n, idx))
    }

    /// Known section numbers intersecting the Z extent of `bounds`, in
    /// ascending order. Candidates are generated and tested one at a time.
    pub fn sections_in_bounds<'a>(&'a self, bounds: &Bounds) -> impl Iterator<Item = i32> + 'a {
        section_range(bounds).filter(move |n| self.sections.contains_key(n))
    }

    /// Distinct transform paths across every registered channel
    pub fn transform_paths(&self) -> BTreeSet<&str> {
        self.sections
            .values()
            .flat_map(|idx| idx.iter().map(|c| c.transform_path()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Filter, Section, Transform, LEVELED_FILTER};
    use crate::scale::AXIS_X;

    fn registered_channel(name: &str) -> Channel {
        let mut scale = Scale::new();
        scale.set_axis(AXIS_X, 1.0, "nm");

        let mut pyramid = TilePyramid::new();
        pyramid.add_level(1, format!("/data/{name}/Leveled/001"));

        let mut channel = Channel::new(name, scale);
        channel.add_transform(Transform::new(
            CHANNEL_TO_VOLUME,
            format!("/data/{name}/volume.mosaic"),
        ));
        channel.add_filter(Filter::new(LEVELED_FILTER, pyramid));
        channel
    }

    fn unregistered_channel(name: &str) -> Channel {
        // Has a stage transform but no volume alignment
        let mut channel = Channel::new(name, Scale::new());
        channel.add_transform(Transform::new("Stage", "/data/stage.mosaic"));
        channel
    }

    fn three_section_model() -> VolumeModel {
        let mut model = VolumeModel::new("test");
        let mut block = Block::new("A");

        let mut s1 = Section::new(1);
        s1.add_channel(registered_channel("TEM"));
        block.add_section(s1);

        // Section 2 has a channel but no volume registration
        let mut s2 = Section::new(2);
        s2.add_channel(unregistered_channel("TEM"));
        block.add_section(s2);

        let mut s3 = Section::new(3);
        s3.add_channel(registered_channel("TEM"));
        s3.add_channel(registered_channel("Registered_TEM"));
        block.add_section(s3);

        model.add_block(block);
        model
    }

    #[test]
    fn test_build_omits_unregistered_sections() {
        let index = TransformPathIndex::build(&three_section_model()).unwrap();

        let numbers: Vec<i32> = index.iter().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(index.min_section(), Some(1));
        assert_eq!(index.max_section(), Some(3));
        assert_eq!(index.section(3).unwrap().len(), 2);
        assert!(index.section(2).is_none());
    }

    #[test]
    fn test_registered_channel_requires_transform() {
        let err = RegisteredChannel::from_channel(5, &unregistered_channel("TEM")).unwrap_err();
        assert!(matches!(
            err,
            VolumeError::MissingTransform { section: 5, .. }
        ));
    }

    #[test]
    fn test_resolve_honors_request_order_and_skips_misses() {
        let index = TransformPathIndex::build(&three_section_model()).unwrap();
        let section = index.section(3).unwrap();

        let names = vec![
            "Registered_TEM".to_string(),
            "Missing".to_string(),
            "TEM".to_string(),
        ];
        let resolved: Vec<&str> = section.resolve(Some(&names)).map(|c| c.name()).collect();
        assert_eq!(resolved, vec!["Registered_TEM", "TEM"]);
    }

    #[test]
    fn test_resolve_without_filter_yields_all() {
        let index = TransformPathIndex::build(&three_section_model()).unwrap();
        let section = index.section(3).unwrap();

        let all: Vec<&str> = section.resolve(None).map(|c| c.name()).collect();
        assert_eq!(all, vec!["Registered_TEM", "TEM"]);

        let empty: Vec<String> = Vec::new();
        let from_empty: Vec<&str> = section.resolve(Some(&empty)).map(|c| c.name()).collect();
        assert_eq!(from_empty, all);
    }

    #[test]
    fn test_sections_in_bounds_filters_known() {
        let index = TransformPathIndex::build(&three_section_model()).unwrap();

        let bounds = Bounds::new(1.0, 0.0, 0.0, 3.0, 10.0, 10.0);
        let sections: Vec<i32> = index.sections_in_bounds(&bounds).collect();
        assert_eq!(sections, vec![1, 3]);

        let single = Bounds::new(2.0, 0.0, 0.0, 2.0, 10.0, 10.0);
        assert_eq!(index.sections_in_bounds(&single).count(), 0);
    }

    #[test]
    fn test_tiles_path_lookup() {
        let index = TransformPathIndex::build(&three_section_model()).unwrap();
        let channel = index.section(1).unwrap().get("TEM").unwrap();

        assert_eq!(
            channel.tiles_path(LEVELED_FILTER, 1).unwrap(),
            "/data/TEM/Leveled/001"
        );
        assert!(matches!(
            channel.tiles_path(LEVELED_FILTER, 4).unwrap_err(),
            VolumeError::MissingLevel { level: 4, .. }
        ));
        assert!(matches!(
            channel.tiles_path("Raw", 1).unwrap_err(),
            VolumeError::MissingFilter { .. }
        ));
    }

    #[test]
    fn test_transform_paths_deduplicated() {
        let index = TransformPathIndex::build(&three_section_model()).unwrap();

        // TEM appears in sections 1 and 3 with the same transform path
        let paths = index.transform_paths();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains("/data/TEM/volume.mosaic"));
        assert!(paths.contains("/data/Registered_TEM/volume.mosaic"));
    }
}
