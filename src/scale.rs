//! Per-axis physical resolution and scale reconciliation

use crate::error::{Result, VolumeError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Axis name for the X (column) axis
pub const AXIS_X: &str = "X";
/// Axis name for the Y (row) axis
pub const AXIS_Y: &str = "Y";
/// Axis name for the Z (section) axis
pub const AXIS_Z: &str = "Z";

/// Physical resolution along one axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    /// Physical units covered by one pixel (smaller is finer)
    pub units_per_pixel: f64,
    /// Unit of measurement (e.g. "nm", "um")
    pub units_of_measure: String,
}

impl AxisScale {
    pub fn new(units_per_pixel: f64, units_of_measure: impl Into<String>) -> Self {
        Self {
            units_per_pixel,
            units_of_measure: units_of_measure.into(),
        }
    }
}

/// Per-axis physical resolution of a channel.
///
/// Maps axis name to units-per-pixel plus a unit of measure. The default
/// value carries no axes and acts as the identity for [`Scale::reconcile`],
/// so a channel list can be folded starting from `Scale::default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scale {
    axes: BTreeMap<String, AxisScale>,
}

impl Scale {
    /// Create an empty scale with no axes
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resolution for an axis, replacing any existing entry
    pub fn set_axis(
        &mut self,
        name: impl Into<String>,
        units_per_pixel: f64,
        units_of_measure: impl Into<String>,
    ) {
        self.axes.insert(
            name.into(),
            AxisScale::new(units_per_pixel, units_of_measure),
        );
    }

    /// Get the resolution for an axis, if present
    pub fn axis(&self, name: &str) -> Option<&AxisScale> {
        self.axes.get(name)
    }

    /// Resolution along the X axis
    pub fn x(&self) -> Option<&AxisScale> {
        self.axis(AXIS_X)
    }

    /// Resolution along the Y axis
    pub fn y(&self) -> Option<&AxisScale> {
        self.axis(AXIS_Y)
    }

    /// Resolution along the Z axis
    pub fn z(&self) -> Option<&AxisScale> {
        self.axis(AXIS_Z)
    }

    /// Names of all axes with a resolution entry, in sorted order
    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.axes.keys().map(|s| s.as_str())
    }

    /// True if no axis carries a resolution entry
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Combine two scales, keeping the finer resolution per axis.
    ///
    /// For the union of axes present in `self` and `other`: an axis found
    /// in only one input is copied as-is; an axis found in both resolves to
    /// the smaller units-per-pixel value. The inputs must agree on the unit
    /// of measure for every shared axis; a mismatch fails with
    /// [`VolumeError::UnitMismatch`] rather than coercing.
    ///
    /// Commutative and associative, so folding over channels in any order
    /// yields the same result.
    pub fn reconcile(&self, other: &Scale) -> Result<Scale> {
        let mut names: BTreeSet<&str> = self.axes.keys().map(|s| s.as_str()).collect();
        names.extend(other.axes.keys().map(|s| s.as_str()));

        let mut out = Scale::new();
        for name in names {
            match (self.axes.get(name), other.axes.get(name)) {
                (Some(a), Some(b)) => {
                    if a.units_of_measure != b.units_of_measure {
                        return Err(VolumeError::UnitMismatch {
                            axis: name.to_string(),
                            left: a.units_of_measure.clone(),
                            right: b.units_of_measure.clone(),
                        });
                    }
                    out.set_axis(
                        name,
                        a.units_per_pixel.min(b.units_per_pixel),
                        a.units_of_measure.clone(),
                    );
                }
                (Some(a), None) | (None, Some(a)) => {
                    out.set_axis(name, a.units_per_pixel, a.units_of_measure.clone());
                }
                (None, None) => return Err(VolumeError::MissingAxis(name.to_string())),
            }
        }

        Ok(out)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, axis) in &self.axes {
            if !first {
                write!(f, "  ")?;
            }
            write!(f, "{}: {} {}", name, axis.units_per_pixel, axis.units_of_measure)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale(entries: &[(&str, f64, &str)]) -> Scale {
        let mut s = Scale::new();
        for (name, upp, unit) in entries {
            s.set_axis(*name, *upp, *unit);
        }
        s
    }

    #[test]
    fn test_reconcile_takes_finer_axis() {
        let a = scale(&[(AXIS_X, 1.0, "nm"), (AXIS_Y, 1.0, "nm")]);
        let b = scale(&[(AXIS_X, 0.5, "nm"), (AXIS_Y, 2.0, "nm")]);

        let merged = a.reconcile(&b).unwrap();
        assert_eq!(merged.x().unwrap().units_per_pixel, 0.5);
        assert_eq!(merged.y().unwrap().units_per_pixel, 1.0);
    }

    #[test]
    fn test_reconcile_is_commutative() {
        let a = scale(&[(AXIS_X, 1.0, "nm"), (AXIS_Z, 90.0, "nm")]);
        let b = scale(&[(AXIS_X, 2.5, "nm"), (AXIS_Y, 2.0, "nm")]);

        assert_eq!(a.reconcile(&b).unwrap(), b.reconcile(&a).unwrap());
    }

    #[test]
    fn test_reconcile_copies_one_sided_axes() {
        let a = scale(&[(AXIS_X, 1.0, "nm")]);
        let b = scale(&[(AXIS_Y, 4.0, "um")]);

        let merged = a.reconcile(&b).unwrap();
        assert_eq!(merged.x().unwrap().units_per_pixel, 1.0);
        assert_eq!(merged.y().unwrap().units_per_pixel, 4.0);
        assert_eq!(merged.y().unwrap().units_of_measure, "um");
    }

    #[test]
    fn test_reconcile_identity() {
        let a = scale(&[(AXIS_X, 1.0, "nm"), (AXIS_Y, 2.0, "nm")]);

        assert_eq!(Scale::new().reconcile(&a).unwrap(), a);
        assert_eq!(a.reconcile(&Scale::new()).unwrap(), a);
    }

    #[test]
    fn test_reconcile_rejects_unit_mismatch() {
        let a = scale(&[(AXIS_X, 1.0, "nm")]);
        let b = scale(&[(AXIS_X, 1.0, "um")]);

        let err = a.reconcile(&b).unwrap_err();
        assert!(matches!(err, VolumeError::UnitMismatch { .. }));
    }

    #[test]
    fn test_reconcile_is_associative() {
        let a = scale(&[(AXIS_X, 3.0, "nm")]);
        let b = scale(&[(AXIS_X, 1.0, "nm"), (AXIS_Y, 2.0, "nm")]);
        let c = scale(&[(AXIS_Y, 0.5, "nm"), (AXIS_Z, 90.0, "nm")]);

        let left = a.reconcile(&b).unwrap().reconcile(&c).unwrap();
        let right = a.reconcile(&b.reconcile(&c).unwrap()).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn test_display_lists_axes() {
        let s = scale(&[(AXIS_X, 1.0, "nm"), (AXIS_Y, 2.5, "nm")]);
        assert_eq!(s.to_string(), "X: 1 nm  Y: 2.5 nm");
    }
}
