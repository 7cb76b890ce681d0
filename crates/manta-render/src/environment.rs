//! Shading and compositing settings
//!
//! These control how the multi-pass camera fills its light and AO channels
//! and how the multi-pass handler folds the channels into a final image.

use manta_core::color::Color;
use serde::{Deserialize, Serialize};

/// Settings for the per-pixel shading passes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingSettings {
    // Lighting
    /// Light-channel level every pixel receives, lit or not (255 = unit)
    pub ambient_level: u16,

    // Ambient occlusion
    /// Fill the AO channel; when off it stays zeroed
    pub ambient_occlusion: bool,
    /// Samples taken along the surface normal
    pub ao_samples: u32,
    /// Distance from the surface to the farthest sample
    pub ao_spread: f32,
    /// Occlusion multiplier
    pub ao_strength: f32,
}

impl Default for ShadingSettings {
    fn default() -> Self {
        Self {
            ambient_level: 40,

            ambient_occlusion: true,
            ao_samples: 5,
            ao_spread: 0.12,
            ao_strength: 3.0,
        }
    }
}

/// How the multi-pass handler combines channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeSettings {
    /// Darken by the AO channel (ignored if the frame wrote no AO)
    pub ambient_occlusion: bool,
    /// Blend toward `mist_color` by the mist channel
    pub mist: bool,
    pub mist_color: Color,
}

impl Default for CompositeSettings {
    fn default() -> Self {
        Self {
            ambient_occlusion: true,
            mist: false,
            mist_color: Color::rgb(180, 190, 200),
        }
    }
}
