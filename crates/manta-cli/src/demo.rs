//! Random test scenes

use manta_core::color::Color;
use manta_core::description::{SceneDescription, ShapeDescription};
use manta_core::light::GlobalLight;
use manta_core::sdf::{Primitive, Transform};
use manta_core::prelude::Vec3;

/// Sky behind the demo scene
pub const DEMO_SKY: Color = Color::rgb(70, 90, 240);

/// `entities` unit shapes with random colors, scattered on integer offsets
/// in `x ∈ [-5, 5)`, `y ∈ [-10, 10)`, `z ∈ [-10, 10)`
///
/// Spheres only unless `boxes` is set, in which case each shape is a coin
/// flip between sphere and box. The same seed always yields the same scene.
pub fn random_scene(entities: usize, seed: Option<u64>, boxes: bool) -> SceneDescription {
    let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

    let shapes = (0..entities)
        .map(|_| {
            let primitive = if boxes && rng.bool() {
                Primitive::Box
            } else {
                Primitive::Sphere
            };
            let color = Color::rgb(rng.u8(..255), rng.u8(..255), rng.u8(..255));
            let offset = Vec3::new(
                rng.i32(-5..5) as f32,
                rng.i32(-10..10) as f32,
                rng.i32(-10..10) as f32,
            );
            ShapeDescription {
                primitive,
                transforms: vec![Transform::translate(offset)],
                color,
            }
        })
        .collect();

    SceneDescription {
        sky_color: DEMO_SKY,
        light: GlobalLight::default(),
        shapes,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn seeded_scenes_repeat() {
        let a = serde_json::to_string(&random_scene(8, Some(7), true)).unwrap();
        let b = serde_json::to_string(&random_scene(8, Some(7), true)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn offsets_stay_in_range() {
        let desc = random_scene(200, Some(1), false);
        assert_eq!(desc.shapes.len(), 200);
        for shape in &desc.shapes {
            assert!(matches!(shape.primitive, Primitive::Sphere));
            let Transform::Translate { offset } = shape.transforms[0] else {
                panic!("expected a translation");
            };
            assert!((-5.0..5.0).contains(&offset.x));
            assert!((-10.0..10.0).contains(&offset.y));
            assert!((-10.0..10.0).contains(&offset.z));
        }
        assert_eq!(desc.build().unwrap().len(), 200);
    }
}
