//! Scene: shapes, light and nearest-surface queries

use crate::color::Color;
use crate::light::GlobalLight;
use crate::shape::Shape;
use glam::Vec3;

/// Distance reported when no shape participates in a query
///
/// Any realistic `max_distance` is below this, so rays classify as sky on
/// their first step.
pub const MISS_DISTANCE: f32 = u16::MAX as f32;

/// The winner of a nearest-shape query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Mount index of the shape
    pub index: usize,
    pub distance: f32,
}

/// An ordered collection of shapes lit by one directional light
///
/// Mount order defines shape indices. Scenes are assembled up front and
/// then shared read-only (usually behind an `Arc`) with render workers, so
/// indices are stable for the whole render pass.
#[derive(Debug, Clone)]
pub struct Scene {
    shapes: Vec<Shape>,
    light: GlobalLight,
    sky_color: Color,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            light: GlobalLight::default(),
            sky_color: Color::BLACK,
        }
    }

    /// Add a shape and return its index
    pub fn mount_shape(&mut self, shape: Shape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn light(&self) -> &GlobalLight {
        &self.light
    }

    pub fn set_light(&mut self, light: GlobalLight) {
        self.light = light;
    }

    pub fn sky_color(&self) -> Color {
        self.sky_color
    }

    pub fn set_sky_color(&mut self, color: Color) {
        self.sky_color = color;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Smallest distance estimate over all shapes
    ///
    /// Returns [`MISS_DISTANCE`] for an empty scene.
    #[inline]
    pub fn nearest_distance(&self, p: Vec3) -> f32 {
        self.scan(p, None).map_or(MISS_DISTANCE, |n| n.distance)
    }

    /// Nearest shape and its distance; ties go to the lowest index
    #[inline]
    pub fn nearest_shape(&self, p: Vec3) -> Option<Nearest> {
        self.scan(p, None)
    }

    /// Nearest shape ignoring the shape at `exclude`
    ///
    /// Used by shadow rays leaving the surface of `exclude`. Returns `None`
    /// when no other shape exists.
    #[inline]
    pub fn nearest_excluding(&self, p: Vec3, exclude: usize) -> Option<Nearest> {
        self.scan(p, Some(exclude))
    }

    /// Flat color of the nearest shape, or the sky color on an empty scene
    pub fn color_at(&self, p: Vec3) -> Color {
        self.scan(p, None)
            .and_then(|n| self.shapes.get(n.index))
            .map_or(self.sky_color, |shape| shape.color)
    }

    fn scan(&self, p: Vec3, exclude: Option<usize>) -> Option<Nearest> {
        let mut nearest: Option<Nearest> = None;
        for (index, shape) in self.shapes.iter().enumerate() {
            if exclude == Some(index) {
                continue;
            }
            let distance = shape.distance_estimate(p);
            if nearest.is_none_or(|n| distance < n.distance) {
                nearest = Some(Nearest { index, distance });
            }
        }
        nearest
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sphere_and_far_box() -> Scene {
        let mut scene = Scene::new();
        scene.mount_shape(Shape::sphere().with_color(Color::rgb(255, 0, 0)));
        scene.mount_shape(
            Shape::cube()
                .translate(Vec3::new(50.0, 0.0, 0.0))
                .with_color(Color::rgb(0, 0, 255)),
        );
        scene
    }

    #[test]
    fn empty_scene_reports_miss_sentinel() {
        let scene = Scene::new();
        assert_eq!(scene.nearest_distance(Vec3::ZERO), MISS_DISTANCE);
        assert!(scene.nearest_shape(Vec3::ZERO).is_none());
    }

    #[test]
    fn nearest_picks_sphere_near_origin() {
        let scene = sphere_and_far_box();
        let p = Vec3::new(0.0, 1.5, 0.0);

        let nearest = scene.nearest_shape(p).unwrap();
        assert_eq!(nearest.index, 0);
        assert_abs_diff_eq!(nearest.distance, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(scene.nearest_distance(p), 0.5, epsilon = 1e-6);
        assert_eq!(scene.color_at(p), Color::rgb(255, 0, 0));
    }

    #[test]
    fn ties_go_to_the_first_shape() {
        let mut scene = Scene::new();
        scene.mount_shape(Shape::sphere());
        scene.mount_shape(Shape::sphere());
        assert_eq!(scene.nearest_shape(Vec3::splat(3.0)).unwrap().index, 0);
    }

    #[test]
    fn excluding_still_scans_other_shapes() {
        let scene = sphere_and_far_box();
        let p = Vec3::new(0.0, 1.5, 0.0);

        let nearest = scene.nearest_excluding(p, 0).unwrap();
        assert_eq!(nearest.index, 1);
        assert!(nearest.distance > 40.0);
    }

    #[test]
    fn excluding_the_only_shape_finds_nothing() {
        let mut scene = Scene::new();
        let index = scene.mount_shape(Shape::sphere());
        assert!(scene.nearest_excluding(Vec3::ZERO, index).is_none());
    }

    #[test]
    fn color_at_empty_scene_is_sky() {
        let mut scene = Scene::new();
        scene.set_sky_color(Color::rgb(70, 90, 240));
        assert_eq!(scene.color_at(Vec3::ZERO), Color::rgb(70, 90, 240));
    }
}
