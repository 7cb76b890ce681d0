//! Shapes: a distance estimator behind a transform pipeline

use crate::color::Color;
use crate::sdf::{Primitive, Transform, apply_pipeline};
use glam::Vec3;

/// A mountable shape
///
/// Evaluating a shape runs the query point through every pipeline entry in
/// order and then calls the primitive's distance function on the result.
#[derive(Debug, Clone)]
pub struct Shape {
    pub primitive: Primitive,
    pipeline: Vec<Transform>,
    pub color: Color,
}

impl Shape {
    /// Create a shape with an empty pipeline
    pub fn new(primitive: Primitive) -> Self {
        Self {
            primitive,
            pipeline: Vec::new(),
            color: Color::WHITE,
        }
    }

    /// Unit sphere
    pub fn sphere() -> Self {
        Self::new(Primitive::Sphere)
    }

    /// Unit box (half-extent 1)
    pub fn cube() -> Self {
        Self::new(Primitive::Box)
    }

    /// Append a transform to the end of the pipeline
    pub fn push_transform(&mut self, transform: Transform) {
        self.pipeline.push(transform);
    }

    /// Builder form of [`Shape::push_transform`]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.push_transform(transform);
        self
    }

    pub fn translate(self, offset: Vec3) -> Self {
        self.with_transform(Transform::translate(offset))
    }

    pub fn rotate(self, euler: Vec3) -> Self {
        self.with_transform(Transform::rotate(euler))
    }

    pub fn scale(self, factor: Vec3) -> Self {
        self.with_transform(Transform::scale(factor))
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn pipeline(&self) -> &[Transform] {
        &self.pipeline
    }

    /// Signed distance from a world-space point to this shape
    #[inline]
    pub fn distance_estimate(&self, p: Vec3) -> f32 {
        self.primitive.distance(apply_pipeline(&self.pipeline, p))
    }
}
