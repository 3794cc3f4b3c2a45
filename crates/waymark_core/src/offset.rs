//! Checkpoint offsets
//!
//! An offset says where in the viewport a checkpoint's anchor point has to
//! be for the checkpoint to count as crossed. The two forms are anchored at
//! opposite edges of the viewport:
//!
//! - [`Offset::Fraction`] is measured from the viewport top. `0.5` triggers
//!   when the anchor is half a viewport below the top edge.
//! - [`Offset::PixelsFromBottom`] is measured from the viewport bottom.
//!   `20` triggers 20px above the bottom edge, `-20` 20px below it.
//!
//! Neither form is range-checked. A very large offset only pushes the
//! resolved threshold onto a page bound.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Where in the viewport a checkpoint triggers
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OffsetRepr", into = "OffsetRepr")]
pub enum Offset {
    /// Fraction of the viewport height, measured from the top
    Fraction(f32),
    /// Signed pixel distance, measured up from the bottom
    PixelsFromBottom(i64),
}

impl Default for Offset {
    /// One full viewport height below the top, i.e. the viewport bottom
    fn default() -> Self {
        Offset::Fraction(1.0)
    }
}

impl Offset {
    /// Distance from the viewport top at which this offset triggers
    pub fn resolve(&self, viewport_height: f32) -> f32 {
        match *self {
            Offset::Fraction(f) => viewport_height * f,
            Offset::PixelsFromBottom(px) => viewport_height - px as f32,
        }
    }
}

impl FromStr for Offset {
    type Err = TrackerError;

    /// Parse `"0.5"` as a fraction and `"-20px"` / `"+20px"` as pixels
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(px) = s.strip_suffix("px") {
            return px.trim().parse::<i64>().map(Offset::PixelsFromBottom).map_err(|_| {
                TrackerError::InvalidConfiguration(format!("invalid pixel offset '{}'", s))
            });
        }
        match s.parse::<f32>() {
            Ok(f) if f.is_finite() => Ok(Offset::Fraction(f)),
            _ => Err(TrackerError::InvalidConfiguration(format!(
                "invalid offset '{}', expected a fraction or a '<N>px' value",
                s
            ))),
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Fraction(v) => write!(f, "{}", v),
            Offset::PixelsFromBottom(px) => write!(f, "{}px", px),
        }
    }
}

/// Serialized form: a bare number is a fraction, a string is parsed
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OffsetRepr {
    Fraction(f32),
    Text(String),
}

impl TryFrom<OffsetRepr> for Offset {
    type Error = TrackerError;

    fn try_from(repr: OffsetRepr) -> Result<Self, Self::Error> {
        match repr {
            OffsetRepr::Fraction(f) => Ok(Offset::Fraction(f)),
            OffsetRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Offset> for OffsetRepr {
    fn from(offset: Offset) -> Self {
        match offset {
            Offset::Fraction(f) => OffsetRepr::Fraction(f),
            px @ Offset::PixelsFromBottom(_) => OffsetRepr::Text(px.to_string()),
        }
    }
}
