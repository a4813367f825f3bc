//! Spatial value types and section-range enumeration

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Axis-aligned bounding box in volume coordinates.
///
/// Stored as min/max per axis in (Z, Y, X) order, matching the
/// `(min_z, min_y, min_x, max_z, max_y, max_x)` convention of the volume
/// coordinate space. Z spans section numbers; Y and X span the section
/// plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_z: f64,
    pub min_y: f64,
    pub min_x: f64,
    pub max_z: f64,
    pub max_y: f64,
    pub max_x: f64,
}

impl Bounds {
    pub fn new(min_z: f64, min_y: f64, min_x: f64, max_z: f64, max_y: f64, max_x: f64) -> Self {
        Self {
            min_z,
            min_y,
            min_x,
            max_z,
            max_y,
            max_x,
        }
    }

    /// Build from a `(min_z, min_y, min_x, max_z, max_y, max_x)` array
    pub fn from_array(bounds: [f64; 6]) -> Self {
        Self::new(
            bounds[0], bounds[1], bounds[2], bounds[3], bounds[4], bounds[5],
        )
    }

    /// The bounds as a `(min_z, min_y, min_x, max_z, max_y, max_x)` array
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.min_z, self.min_y, self.min_x, self.max_z, self.max_y, self.max_x,
        ]
    }

    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
            && self.min_z <= self.max_z
            && self.min_y <= self.max_y
            && self.min_x <= self.max_x
    }

    /// Project onto the XY plane of a section
    pub fn rectangle_xy(&self) -> Rectangle {
        Rectangle {
            min_x: self.min_x,
            min_y: self.min_y,
            max_x: self.max_x,
            max_y: self.max_y,
        }
    }

    /// Attach a Z extent to an XY rectangle
    pub fn from_rectangle(rect: Rectangle, min_z: f64, max_z: f64) -> Self {
        Self::new(min_z, rect.min_y, rect.min_x, max_z, rect.max_y, rect.max_x)
    }
}

/// Axis-aligned rectangle in the section plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rectangle {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    /// Smallest rectangle containing both inputs
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        Rectangle {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// Integer section numbers intersecting the Z extent of `bounds`.
///
/// Both ends are inclusive: every integer `n` with
/// `bounds.min_z <= n <= bounds.max_z` is produced, in ascending order,
/// one candidate at a time. `min_z == max_z == k` yields exactly `k`; a Z
/// extent containing no integer yields nothing. The returned range is
/// `Clone`, so enumeration can be restarted.
pub fn section_range(bounds: &Bounds) -> RangeInclusive<i32> {
    let start = bounds.min_z.ceil() as i32;
    let end = bounds.max_z.floor() as i32;
    start..=end
}
