//! Camera configuration and primary-ray generation

use crate::error::{RenderError, Result};
use manta_core::ray::MarchLimits;
use manta_core::rotation::{rotate_x, rotate_y, rotate_z};
use manta_core::scene::Scene;
use glam::{UVec2, Vec2, Vec3};
use std::sync::Arc;

/// Everything a camera needs to render a frame
///
/// Shared read-only with every worker for the duration of a frame.
#[derive(Debug, Clone)]
pub struct CameraData {
    /// Camera position in world space
    pub position: Vec3,
    /// Euler angles (radians), applied yaw (Y), pitch (X), roll (Z)
    pub rotation: Vec3,
    /// Output size in pixels
    pub dimensions: UVec2,
    /// A step at or below this size is a surface hit
    pub clamp_threshold: f32,
    /// Rays travelling this far are sky
    pub max_distance: f32,
    /// Field of view in radians
    pub fov: f32,
    /// Per-ray iteration cap
    pub max_steps: u32,
    /// Scene to render
    pub scene: Arc<Scene>,
}

impl Default for CameraData {
    fn default() -> Self {
        Self::new(Arc::new(Scene::new()))
    }
}

impl CameraData {
    /// Default camera looking down +X at `scene`
    pub fn new(scene: Arc<Scene>) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            dimensions: UVec2::new(1280, 720),
            clamp_threshold: 0.01,
            max_distance: 100.0,
            fov: 45.0_f32.to_radians(),
            max_steps: 1024,
            scene,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = UVec2::new(width, height);
        self
    }

    /// Check that the settings can produce a frame
    pub fn validate(&self) -> Result<()> {
        if self.dimensions.x == 0 || self.dimensions.y == 0 {
            return Err(RenderError::InvalidCamera(format!(
                "dimensions must be non-zero, got {}x{}",
                self.dimensions.x, self.dimensions.y
            )));
        }
        if self.clamp_threshold.is_nan() || self.clamp_threshold <= 0.0 {
            return Err(RenderError::InvalidCamera(
                "clamp threshold must be positive".into(),
            ));
        }
        if self.max_distance.is_nan() || self.max_distance <= self.clamp_threshold {
            return Err(RenderError::InvalidCamera(
                "max distance must exceed the clamp threshold".into(),
            ));
        }
        if self.max_steps == 0 {
            return Err(RenderError::InvalidCamera("max steps must be positive".into()));
        }
        Ok(())
    }

    /// Termination settings shared by primary and shadow rays
    pub fn limits(&self) -> MarchLimits {
        MarchLimits {
            clamp_threshold: self.clamp_threshold,
            max_distance: self.max_distance,
            max_steps: self.max_steps,
        }
    }

    /// Nearest-surface distance at the camera position
    ///
    /// Computed once per frame and used to seed every primary ray. It is a
    /// valid bound in all directions, so the first step of each ray can
    /// skip straight past empty space around the camera.
    pub fn initial_scene_index(&self) -> f32 {
        self.scene.nearest_distance(self.position)
    }

    /// World-space direction of the primary ray through `pixel`
    pub fn direction_for(&self, pixel: UVec2) -> Vec3 {
        ray_direction(frag_to_factor(pixel, self.dimensions), self.fov, self.rotation)
    }

    pub fn pixel_count(&self) -> usize {
        self.dimensions.x as usize * self.dimensions.y as usize
    }
}

/// Map a pixel to signed factors centered on the frame
///
/// Both axes are normalized by the frame *width*, so the vertical field of
/// view is narrower than the horizontal one on wide frames. The midpoint
/// uses integer halving of the dimensions.
#[inline]
pub fn frag_to_factor(frag: UVec2, dimensions: UVec2) -> Vec2 {
    let half = dimensions / 2;
    let width = dimensions.x as f32;
    Vec2::new(
        (frag.x as f32 - half.x as f32) / width * 2.0,
        (frag.y as f32 - half.y as f32) / width * 2.0,
    )
}

/// Rotate the canonical forward vector (+X) into a ray direction
///
/// The factor offsets are applied first (vertical about Z, then horizontal
/// about Y), followed by the camera orientation: yaw, pitch, roll.
#[inline]
pub fn ray_direction(factor: Vec2, fov: f32, rotation: Vec3) -> Vec3 {
    let v = rotate_z(Vec3::X, fov * factor.y * 0.5);
    let v = rotate_y(v, fov * factor.x * 0.5);

    let v = rotate_y(v, rotation.y);
    let v = rotate_x(v, rotation.x);
    rotate_z(v, rotation.z)
}
