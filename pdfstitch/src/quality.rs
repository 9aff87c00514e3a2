//! Output quality tiers.
//!
//! A [`QualityTier`] is the coarse knob exposed to users. [`resolve`] turns
//! it into the concrete [`QualitySettings`] the rasterizer works with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StitchError};

/// Coarse output quality selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// Screen resolution, strong compression.
    Low,
    /// Twice screen resolution, balanced compression.
    #[default]
    Medium,
    /// Print resolution, light compression.
    High,
}

impl QualityTier {
    /// All tiers, lowest first.
    pub const ALL: [QualityTier; 3] = [Self::Low, Self::Medium, Self::High];

    /// Lowercase name used on the command line and in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTier {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(StitchError::invalid_config(format!(
                "Invalid quality: {s}. Must be one of: low, medium, high"
            ))),
        }
    }
}

/// Concrete rasterization parameters for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualitySettings {
    /// Multiplier applied to intrinsic image dimensions. Always > 0.
    pub scale_factor: f32,
    /// Lossy encoder quality in (0, 1].
    pub compression_quality: f32,
}

impl QualitySettings {
    /// Encoder quality as the 1..=100 integer JPEG encoders expect.
    pub fn jpeg_quality(&self) -> u8 {
        (self.compression_quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// Map a tier to its fixed settings.
pub fn resolve(tier: QualityTier) -> QualitySettings {
    let (scale_factor, compression_quality) = match tier {
        QualityTier::Low => (1.0, 0.60),
        QualityTier::Medium => (2.0, 0.75),
        QualityTier::High => (3.0, 0.85),
    };

    QualitySettings {
        scale_factor,
        compression_quality,
    }
}
