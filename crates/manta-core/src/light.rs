//! Directional light

use crate::color::Color;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A single directional light shining along `direction`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalLight {
    /// Direction the light travels (from the light toward the scene)
    pub direction: Vec3,
    pub color: Color,
    pub intensity: f32,
}

impl Default for GlobalLight {
    fn default() -> Self {
        Self {
            // Nearly straight down, nudged off-axis
            direction: Vec3::new(0.01, -1.0, 0.01),
            color: Color::WHITE,
            intensity: 1.0,
        }
    }
}

impl GlobalLight {
    pub fn new(direction: Vec3, color: Color, intensity: f32) -> Self {
        Self {
            direction,
            color,
            intensity,
        }
    }

    /// Unit direction from a surface toward the light
    pub fn shadow_direction(&self) -> Vec3 {
        (-self.direction).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn shadow_direction_points_back_at_the_light() {
        let light = GlobalLight::new(Vec3::new(0.0, -4.0, 0.0), Color::WHITE, 2.0);
        assert_abs_diff_eq!(light.shadow_direction(), Vec3::Y, epsilon = 1e-6);
    }

    #[test]
    fn default_light_is_white_and_mostly_downward() {
        let light = GlobalLight::default();
        assert_eq!(light.color, Color::WHITE);
        assert!(light.shadow_direction().y > 0.99);
    }
}
