//! Per-pixel channel computations for the multi-pass camera

use crate::environment::{CompositeSettings, ShadingSettings};
use manta_core::light::GlobalLight;
use manta_core::scene::Scene;
use glam::Vec3;

/// Offset used for central-difference normals
const NORMAL_EPSILON: f32 = 1e-3;

/// Light channel value for one pixel
///
/// Every pixel gets the ambient level; `light.color * intensity` is added
/// only when the pixel can see the light. Alpha is 255.
pub fn light_level(ambient: u16, light: &GlobalLight, lit: bool) -> [u16; 4] {
    let mut level = [ambient, ambient, ambient, u16::from(u8::MAX)];
    if lit {
        for (channel, c) in level.iter_mut().zip(light.color.rgb_array()) {
            let added = (f32::from(c) * light.intensity).clamp(0.0, f32::from(u16::MAX));
            *channel = channel.saturating_add(added.round() as u16);
        }
    }
    level
}

/// Mist channel value: hit distance as a fraction of `max_distance`
#[inline]
pub fn mist_level(distance: f32, max_distance: f32) -> u8 {
    ((distance / max_distance).clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Surface normal from central differences of the scene field
///
/// Returns zero where the field is flat (e.g. an empty scene).
pub fn estimate_normal(scene: &Scene, p: Vec3) -> Vec3 {
    let e = NORMAL_EPSILON;
    let dx = scene.nearest_distance(p + Vec3::X * e) - scene.nearest_distance(p - Vec3::X * e);
    let dy = scene.nearest_distance(p + Vec3::Y * e) - scene.nearest_distance(p - Vec3::Y * e);
    let dz = scene.nearest_distance(p + Vec3::Z * e) - scene.nearest_distance(p - Vec3::Z * e);
    Vec3::new(dx, dy, dz).normalize_or_zero()
}

/// Ambient occlusion at a surface point, 255 = fully open
///
/// Samples the field at increasing heights along the normal. Where the
/// field is smaller than the height, nearby geometry is crowding the point.
/// Closer samples weigh more.
pub fn ambient_occlusion(scene: &Scene, p: Vec3, normal: Vec3, settings: &ShadingSettings) -> u8 {
    if normal == Vec3::ZERO || settings.ao_samples == 0 {
        return u8::MAX;
    }

    let last = settings.ao_samples.saturating_sub(1).max(1) as f32;
    let mut occlusion = 0.0;
    let mut weight = 1.0;
    for i in 0..settings.ao_samples {
        let h = 0.01 + settings.ao_spread * i as f32 / last;
        let d = scene.nearest_distance(p + normal * h);
        occlusion += (h - d) * weight;
        weight *= 0.95;
    }

    let open = (1.0 - settings.ao_strength * occlusion).clamp(0.0, 1.0);
    (open * 255.0).round() as u8
}

/// Fold one pixel's channels into display RGBA
///
/// `albedo * light / 255`, then darkened by AO and blended toward the mist
/// color when those are enabled.
pub fn composite_pixel(
    albedo: &[u8],
    light: &[u16],
    ao: Option<u8>,
    mist: u8,
    settings: &CompositeSettings,
) -> [u8; 4] {
    let ao = match ao {
        Some(ao) if settings.ambient_occlusion => f32::from(ao) / 255.0,
        _ => 1.0,
    };
    let mist = if settings.mist {
        f32::from(mist) / 255.0
    } else {
        0.0
    };
    let mist_color = settings.mist_color.rgb_array();

    let mut out = [0, 0, 0, u8::MAX];
    for c in 0..3 {
        let lit = f32::from(albedo[c]) * f32::from(light[c]) / 255.0 * ao;
        let fogged = lit + (f32::from(mist_color[c]) - lit) * mist;
        out[c] = fogged.round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use manta_core::color::Color;
    use manta_core::shape::Shape;
    use approx::assert_abs_diff_eq;

    #[test]
    fn light_term_only_when_lit() {
        let light = GlobalLight::new(Vec3::NEG_Y, Color::rgb(200, 100, 0), 2.0);
        assert_eq!(light_level(40, &light, false), [40, 40, 40, 255]);
        assert_eq!(light_level(40, &light, true), [440, 240, 40, 255]);
    }

    #[test]
    fn light_term_saturates() {
        let light = GlobalLight::new(Vec3::NEG_Y, Color::WHITE, 1.0e6);
        assert_eq!(light_level(10, &light, true)[0], u16::MAX);
    }

    #[test]
    fn mist_is_clamped_fraction_of_max_distance() {
        assert_eq!(mist_level(0.0, 100.0), 0);
        assert_eq!(mist_level(50.0, 100.0), 128);
        assert_eq!(mist_level(250.0, 100.0), 255);
    }

    #[test]
    fn sphere_normal_points_outward() {
        let mut scene = Scene::new();
        scene.mount_shape(Shape::sphere());
        let n = estimate_normal(&scene, Vec3::new(0.0, 1.0, 0.0));
        assert_abs_diff_eq!(n, Vec3::Y, epsilon = 1e-3);
        assert_eq!(estimate_normal(&Scene::new(), Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn open_surface_is_unoccluded_and_crevice_is_darker() {
        let settings = ShadingSettings::default();

        let mut open = Scene::new();
        open.mount_shape(Shape::sphere());
        let p = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(ambient_occlusion(&open, p, Vec3::Y, &settings), 255);

        // A second sphere resting just above the sampling point
        let mut crowded = open.clone();
        crowded.mount_shape(Shape::sphere().translate(Vec3::new(0.0, 2.05, 0.0)));
        assert!(ambient_occlusion(&crowded, p, Vec3::Y, &settings) < 200);
    }

    #[test]
    fn composite_multiplies_albedo_by_light() {
        let settings = CompositeSettings::default();
        let px = composite_pixel(&[200, 100, 0, 255], &[255, 510, 40, 255], None, 0, &settings);
        assert_eq!(px, [200, 200, 0, 255]);

        let dark = composite_pixel(&[200, 100, 0, 255], &[255, 255, 255, 255], Some(0), 0, &settings);
        assert_eq!(dark, [0, 0, 0, 255]);
    }

    #[test]
    fn composite_mist_blends_toward_mist_color() {
        let settings = CompositeSettings {
            mist: true,
            mist_color: Color::rgb(100, 100, 100),
            ..CompositeSettings::default()
        };
        let px = composite_pixel(&[0, 0, 0, 255], &[255, 255, 255, 255], None, 255, &settings);
        assert_eq!(px, [100, 100, 100, 255]);
    }
}
