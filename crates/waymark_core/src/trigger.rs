//! Trigger resolvers
//!
//! Convert an element's geometry and an [`Offset`] into the absolute scroll
//! offset (the threshold) at which the checkpoint flips. Every resolver:
//!
//! 1. picks an anchor on the element (top edge, bottom edge, or center),
//! 2. subtracts the converted offset,
//! 3. adds the current scroll offset back for pinned elements,
//! 4. clamps the result into the page bounds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;
use waymark_platform::Geometry;

use crate::error::TrackerError;
use crate::measure::Measurements;
use crate::offset::Offset;

/// Which part of the target element the threshold is anchored to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Top,
    Bottom,
    Center,
}

impl Alignment {
    /// Parse an alignment name, falling back to [`Alignment::Top`]
    ///
    /// Unknown names are not fatal; they are logged and downgraded.
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|err: TrackerError| {
            warn!(alignment = name, "{}, defaulting to top", err);
            Alignment::Top
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Top => "top",
            Alignment::Bottom => "bottom",
            Alignment::Center => "center",
        }
    }
}

impl FromStr for Alignment {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Alignment::Top),
            "bottom" => Ok(Alignment::Bottom),
            "center" => Ok(Alignment::Center),
            _ => Err(TrackerError::InvalidConfiguration(format!(
                "unknown alignment '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold with the element's top edge as anchor
pub fn resolve_top(
    geometry: &Geometry,
    offset: Offset,
    measurements: &Measurements,
    current_offset: f32,
) -> f32 {
    finish(
        geometry.top - measurements.convert_offset(offset),
        geometry,
        measurements,
        current_offset,
    )
}

/// Threshold with the element's bottom edge as anchor
pub fn resolve_bottom(
    geometry: &Geometry,
    offset: Offset,
    measurements: &Measurements,
    current_offset: f32,
) -> f32 {
    finish(
        geometry.bottom() - measurements.convert_offset(offset),
        geometry,
        measurements,
        current_offset,
    )
}

/// Threshold with the element's vertical center as anchor
pub fn resolve_center(
    geometry: &Geometry,
    offset: Offset,
    measurements: &Measurements,
    current_offset: f32,
) -> f32 {
    finish(
        geometry.center() - measurements.convert_offset(offset),
        geometry,
        measurements,
        current_offset,
    )
}

/// Dispatch to the resolver for `alignment`
pub fn resolve(
    alignment: Alignment,
    geometry: &Geometry,
    offset: Offset,
    measurements: &Measurements,
    current_offset: f32,
) -> f32 {
    match alignment {
        Alignment::Top => resolve_top(geometry, offset, measurements, current_offset),
        Alignment::Bottom => resolve_bottom(geometry, offset, measurements, current_offset),
        Alignment::Center => resolve_center(geometry, offset, measurements, current_offset),
    }
}

fn finish(raw: f32, geometry: &Geometry, measurements: &Measurements, current_offset: f32) -> f32 {
    let pinned_shift = if geometry.pinned { current_offset } else { 0.0 };
    measurements.within_page_bounds(raw + pinned_shift)
}
