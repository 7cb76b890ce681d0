//! Primary-ray tracing shared by both cameras

use crate::camera::CameraData;
use glam::UVec2;
use manta_core::ray::{MarchResult, Marcher, Ray, march};
use std::sync::atomic::AtomicBool;

/// March the primary ray through `pixel`
///
/// A `seed` advances the ray before its first scene query. It must be a
/// distance that is free of surfaces in every direction from the camera,
/// such as [`CameraData::initial_scene_index`]. Negative seeds (camera
/// inside a surface) are ignored.
pub fn trace_primary(
    data: &CameraData,
    pixel: UVec2,
    seed: Option<f32>,
    cancel: Option<&AtomicBool>,
) -> MarchResult {
    let mut ray = Ray::new(data.position, data.direction_for(pixel), &data.scene);
    if let Some(seed) = seed.filter(|&s| s > 0.0) {
        ray.manual_step(seed);
    }
    march(&mut ray, &data.limits(), cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use manta_core::ray::MarchStatus;
    use manta_core::scene::Scene;
    use manta_core::shape::Shape;
    use std::sync::Arc;

    fn camera_facing_sphere() -> CameraData {
        let mut scene = Scene::new();
        scene.mount_shape(Shape::sphere());
        CameraData::new(Arc::new(scene))
            .with_position(Vec3::new(-10.0, 0.0, 0.0))
            .with_dimensions(64, 64)
    }

    #[test]
    fn seeded_and_unseeded_rays_agree() {
        let data = camera_facing_sphere();
        let center = UVec2::new(32, 32);

        let plain = trace_primary(&data, center, None, None);
        let seeded = trace_primary(&data, center, Some(data.initial_scene_index()), None);
        assert!(plain.is_hit());
        assert!(seeded.is_hit());
        assert!((plain.distance - seeded.distance).abs() < 0.02);
        assert!(seeded.steps <= plain.steps);
    }

    #[test]
    fn corner_ray_misses() {
        let data = camera_facing_sphere();
        let result = trace_primary(&data, UVec2::ZERO, None, None);
        assert_eq!(result.status, MarchStatus::Miss);
    }
}
