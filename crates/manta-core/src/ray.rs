//! Sphere-tracing ray marchers
//!
//! A ray keeps only its current sample point and the distance travelled so
//! far. Each step asks the scene for the nearest-surface bound at that point
//! and advances by exactly that amount. The convergence loop lives in
//! [`march`], outside the rays themselves.

use crate::scene::{MISS_DISTANCE, Nearest, Scene};
use glam::Vec3;
use std::sync::atomic::{AtomicBool, Ordering};

/// Anything that can be stepped through a scene
pub trait Marcher {
    /// Advance by one scene query and return the step size
    fn step(&mut self) -> f32;

    /// Advance by a caller-supplied distance without querying the scene
    fn manual_step(&mut self, distance: f32);

    /// Current sample point
    fn position(&self) -> Vec3;

    /// Accumulated distance travelled
    fn distance(&self) -> f32;
}

// ============================================================================
// Primary rays
// ============================================================================

/// A camera ray
#[derive(Debug, Clone)]
pub struct Ray<'a> {
    scene: &'a Scene,
    position: Vec3,
    direction: Vec3,
    distance: f32,
}

impl<'a> Ray<'a> {
    pub fn new(origin: Vec3, direction: Vec3, scene: &'a Scene) -> Self {
        Self {
            scene,
            position: origin,
            direction,
            distance: 0.0,
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }
}

impl Marcher for Ray<'_> {
    #[inline]
    fn step(&mut self) -> f32 {
        let d = self.scene.nearest_distance(self.position);
        self.manual_step(d);
        d
    }

    #[inline]
    fn manual_step(&mut self, distance: f32) {
        self.position += self.direction * distance;
        self.distance += distance;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn distance(&self) -> f32 {
        self.distance
    }
}

// ============================================================================
// Shadow rays
// ============================================================================

/// A ray cast toward the light from a surface point
///
/// Remembers the nearest shape found by its last step, and can skip one
/// shape index so it does not immediately re-hit the surface it left.
#[derive(Debug, Clone)]
pub struct LightRay<'a> {
    scene: &'a Scene,
    position: Vec3,
    direction: Vec3,
    distance: f32,
    exclude: Option<usize>,
    last_nearest: Option<Nearest>,
}

impl<'a> LightRay<'a> {
    pub fn new(origin: Vec3, direction: Vec3, scene: &'a Scene) -> Self {
        Self {
            scene,
            position: origin,
            direction,
            distance: 0.0,
            exclude: None,
            last_nearest: None,
        }
    }

    /// Skip the shape at `index` on every [`Marcher::step`]
    pub fn excluding(mut self, index: usize) -> Self {
        self.exclude = Some(index);
        self
    }

    /// Step once while ignoring the shape at `index`
    ///
    /// If no other shape exists the step is [`MISS_DISTANCE`].
    pub fn step_excluding(&mut self, index: usize) -> f32 {
        self.advance(Some(index))
    }

    /// Nearest shape found by the most recent scene query
    pub fn last_nearest(&self) -> Option<Nearest> {
        self.last_nearest
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    fn advance(&mut self, exclude: Option<usize>) -> f32 {
        let nearest = match exclude {
            Some(index) => self.scene.nearest_excluding(self.position, index),
            None => self.scene.nearest_shape(self.position),
        };
        self.last_nearest = nearest;
        let d = nearest.map_or(MISS_DISTANCE, |n| n.distance);
        self.manual_step(d);
        d
    }
}

impl Marcher for LightRay<'_> {
    #[inline]
    fn step(&mut self) -> f32 {
        self.advance(self.exclude)
    }

    #[inline]
    fn manual_step(&mut self, distance: f32) {
        self.position += self.direction * distance;
        self.distance += distance;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn distance(&self) -> f32 {
        self.distance
    }
}

// ============================================================================
// Convergence loop
// ============================================================================

/// Termination settings for a march
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchLimits {
    /// A step at or below this size counts as a surface hit
    pub clamp_threshold: f32,
    /// Travelling this far without converging counts as a miss
    pub max_distance: f32,
    /// Hard cap on scene queries per ray
    pub max_steps: u32,
}

impl Default for MarchLimits {
    fn default() -> Self {
        Self {
            clamp_threshold: 0.01,
            max_distance: 100.0,
            max_steps: 1024,
        }
    }
}

/// How a march ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarchStatus {
    /// Converged on a surface before `max_distance`
    Hit,
    /// Reached `max_distance` (sky)
    Miss,
    /// Ran out of steps without converging or escaping
    Exhausted,
    /// Stopped by the cancellation flag
    Cancelled,
}

/// Final state of a marched ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchResult {
    pub status: MarchStatus,
    pub position: Vec3,
    pub distance: f32,
    /// Scene queries performed (manual steps excluded)
    pub steps: u32,
}

impl MarchResult {
    pub fn is_hit(&self) -> bool {
        self.status == MarchStatus::Hit
    }
}

/// Step `ray` until it converges, escapes, runs out of steps or is cancelled
///
/// Stepping continues while the returned step size exceeds
/// `clamp_threshold`; reaching `max_distance` at any point is a miss.
/// The cancellation flag is checked once per step.
pub fn march<M: Marcher>(
    ray: &mut M,
    limits: &MarchLimits,
    cancel: Option<&AtomicBool>,
) -> MarchResult {
    let mut steps = 0u32;

    let status = loop {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            break MarchStatus::Cancelled;
        }
        if steps >= limits.max_steps {
            tracing::trace!(
                distance = ray.distance(),
                steps,
                "ray hit the step limit"
            );
            break MarchStatus::Exhausted;
        }

        let d = ray.step();
        steps += 1;

        if d <= limits.clamp_threshold {
            break if ray.distance() >= limits.max_distance {
                MarchStatus::Miss
            } else {
                MarchStatus::Hit
            };
        }
        if ray.distance() >= limits.max_distance {
            break MarchStatus::Miss;
        }
    };

    MarchResult {
        status,
        position: ray.position(),
        distance: ray.distance(),
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use crate::sdf::Primitive;
    use approx::assert_abs_diff_eq;

    fn sphere_at_ten() -> Scene {
        let mut scene = Scene::new();
        scene.mount_shape(Shape::sphere().translate(Vec3::new(10.0, 0.0, 0.0)));
        scene
    }

    #[test]
    fn step_advances_by_scene_distance() {
        let scene = sphere_at_ten();
        let mut ray = Ray::new(Vec3::ZERO, Vec3::X, &scene);

        let d = ray.step();
        assert_abs_diff_eq!(d, 9.0, epsilon = 1e-5);
        assert_abs_diff_eq!(ray.distance(), 9.0, epsilon = 1e-5);
        assert_abs_diff_eq!(ray.position(), Vec3::new(9.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn ray_converges_on_sphere_surface() {
        let scene = sphere_at_ten();
        let limits = MarchLimits::default();
        let direction = Vec3::new(1.0, 0.02, 0.0).normalize();
        let mut ray = Ray::new(Vec3::ZERO, direction, &scene);

        let result = march(&mut ray, &limits, None);
        assert!(result.is_hit());
        assert!(result.steps < 64);
        assert!((result.distance - 9.0).abs() < 0.05);

        let mut straight = Ray::new(Vec3::ZERO, Vec3::X, &scene);
        let result = march(&mut straight, &limits, None);
        assert!(result.is_hit());
        assert!((result.distance - 9.0).abs() <= limits.clamp_threshold);
    }

    #[test]
    fn ray_pointing_away_is_a_miss() {
        let scene = sphere_at_ten();
        let limits = MarchLimits::default();
        let mut ray = Ray::new(Vec3::ZERO, -Vec3::X, &scene);

        let result = march(&mut ray, &limits, None);
        assert_eq!(result.status, MarchStatus::Miss);
        assert!(result.distance >= limits.max_distance);
    }

    #[test]
    fn empty_scene_misses_on_first_step() {
        let scene = Scene::new();
        let mut ray = Ray::new(Vec3::ZERO, Vec3::Z, &scene);
        let result = march(&mut ray, &MarchLimits::default(), None);
        assert_eq!(result.status, MarchStatus::Miss);
        assert_eq!(result.steps, 1);
    }

    #[test]
    fn manual_step_seeds_without_querying() {
        let scene = sphere_at_ten();
        let mut ray = Ray::new(Vec3::ZERO, Vec3::X, &scene);
        ray.manual_step(4.0);
        assert_abs_diff_eq!(ray.distance(), 4.0);

        let result = march(&mut ray, &MarchLimits::default(), None);
        assert!(result.is_hit());
        assert!((result.distance - 9.0).abs() <= 0.01);
    }

    #[test]
    fn pathological_field_stops_at_step_limit() {
        fn fog(_: Vec3) -> f32 {
            0.02
        }
        let mut scene = Scene::new();
        scene.mount_shape(Shape::new(Primitive::Custom(fog)));

        let limits = MarchLimits {
            max_steps: 100,
            ..MarchLimits::default()
        };
        let mut ray = Ray::new(Vec3::ZERO, Vec3::X, &scene);
        let result = march(&mut ray, &limits, None);
        assert_eq!(result.status, MarchStatus::Exhausted);
        assert_eq!(result.steps, 100);
    }

    #[test]
    fn cancelled_flag_stops_marching() {
        let scene = sphere_at_ten();
        let flag = AtomicBool::new(true);
        let mut ray = Ray::new(Vec3::ZERO, Vec3::X, &scene);
        let result = march(&mut ray, &MarchLimits::default(), Some(&flag));
        assert_eq!(result.status, MarchStatus::Cancelled);
        assert_eq!(result.steps, 0);
    }

    #[test]
    fn light_ray_skips_its_origin_shape() {
        let mut scene = Scene::new();
        let floor = scene.mount_shape(Shape::sphere());
        scene.mount_shape(Shape::sphere().translate(Vec3::new(0.0, 5.0, 0.0)));

        // Leave the top of the first sphere heading up: the only blocker is
        // the second sphere, four units above.
        let mut ray = LightRay::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y, &scene);
        let d = ray.step_excluding(floor);
        assert_abs_diff_eq!(d, 3.0, epsilon = 1e-5);
        assert_eq!(ray.last_nearest().map(|n| n.index), Some(1));

        let mut ray = LightRay::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y, &scene).excluding(floor);
        let result = march(&mut ray, &MarchLimits::default(), None);
        assert!(result.is_hit());
        assert_eq!(ray.last_nearest().map(|n| n.index), Some(1));
    }

    #[test]
    fn light_ray_without_other_shapes_escapes() {
        let mut scene = Scene::new();
        let only = scene.mount_shape(Shape::sphere());
        let mut ray = LightRay::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y, &scene).excluding(only);
        let result = march(&mut ray, &MarchLimits::default(), None);
        assert_eq!(result.status, MarchStatus::Miss);
        assert!(ray.last_nearest().is_none());
    }
}
