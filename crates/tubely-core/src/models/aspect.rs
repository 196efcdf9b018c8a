use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Width/height ratio of a 16:9 frame.
pub const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;

/// Width/height ratio of a 9:16 frame.
pub const PORTRAIT_RATIO: f64 = 9.0 / 16.0;

/// Maximum distance, in ratio units, from a target ratio that still matches it.
///
/// The windows around the two targets must stay disjoint so that at most one
/// label can ever match.
pub const ASPECT_TOLERANCE: f64 = 0.01;

/// Aspect classification of a video asset; also the first segment of its object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AspectClass {
    Landscape,
    Portrait,
    Other,
}

impl AspectClass {
    /// Classify a width/height ratio.
    pub fn from_ratio(ratio: f64) -> Self {
        if (ratio - LANDSCAPE_RATIO).abs() <= ASPECT_TOLERANCE {
            AspectClass::Landscape
        } else if (ratio - PORTRAIT_RATIO).abs() <= ASPECT_TOLERANCE {
            AspectClass::Portrait
        } else {
            AspectClass::Other
        }
    }

    /// Classify frame dimensions. A zero height has no ratio and classifies as `Other`.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if height == 0 {
            return AspectClass::Other;
        }
        Self::from_ratio(f64::from(width) / f64::from(height))
    }

    /// Key prefix used for objects of this class.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "landscape",
            AspectClass::Portrait => "portrait",
            AspectClass::Other => "other",
        }
    }
}

impl Display for AspectClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
