//! Query-space transforms applied before distance evaluation

use crate::rotation::{rotate_x, rotate_y, rotate_z};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A coordinate-space operator in a shape's pipeline
///
/// Transforms act on the *query point*, not on the shape: the point is
/// mapped into the shape's local space and the primitive's distance function
/// is evaluated there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transform {
    /// Move the shape by `offset`
    Translate { offset: Vec3 },
    /// Rotate about X, then Z, then Y (radians)
    Rotate { euler: Vec3 },
    /// Divide each query axis by `factor`
    ///
    /// Pass the inverse of the desired enlargement. Non-uniform factors break
    /// the Lipschitz bound of the field and are accepted as an approximation.
    /// Zero factors are not guarded and yield non-finite distances.
    Scale { factor: Vec3 },
}

impl Transform {
    pub fn translate(offset: Vec3) -> Self {
        Self::Translate { offset }
    }

    pub fn rotate(euler: Vec3) -> Self {
        Self::Rotate { euler }
    }

    pub fn scale(factor: Vec3) -> Self {
        Self::Scale { factor }
    }

    pub fn uniform_scale(factor: f32) -> Self {
        Self::Scale {
            factor: Vec3::splat(factor),
        }
    }

    /// Map a point into the transformed space
    #[inline]
    pub fn process(&self, p: Vec3) -> Vec3 {
        match *self {
            Transform::Translate { offset } => p - offset,
            Transform::Rotate { euler } => {
                let p = rotate_x(p, euler.x);
                let p = rotate_z(p, euler.z);
                rotate_y(p, euler.y)
            }
            Transform::Scale { factor } => p / factor,
        }
    }
}

/// Run a point through a pipeline, first entry first
#[inline]
pub fn apply_pipeline(pipeline: &[Transform], p: Vec3) -> Vec3 {
    pipeline.iter().fold(p, |acc, t| t.process(acc))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn translate_moves_the_shape() {
        let t = Transform::translate(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.process(Vec3::new(1.0, 2.0, 3.0)), Vec3::ZERO);
    }

    #[test]
    fn rotate_applies_x_then_z_then_y() {
        let euler = Vec3::new(0.4, 1.2, -0.7);
        let p = Vec3::new(0.3, -1.0, 2.0);

        let expected = rotate_y(rotate_z(rotate_x(p, euler.x), euler.z), euler.y);
        let other_order = rotate_z(rotate_y(rotate_x(p, euler.x), euler.y), euler.z);

        let got = Transform::rotate(euler).process(p);
        assert_abs_diff_eq!(got, expected, epsilon = 1e-6);
        assert!(got.distance(other_order) > 1e-3);
    }

    #[test]
    fn scale_divides_query_space() {
        let t = Transform::scale(Vec3::new(2.0, 4.0, 0.5));
        assert_eq!(t.process(Vec3::new(2.0, 2.0, 2.0)), Vec3::new(1.0, 0.5, 4.0));
    }

    #[test]
    fn zero_scale_propagates_non_finite_values() {
        let p = Transform::uniform_scale(0.0).process(Vec3::ONE);
        assert!(!p.is_finite());
    }

    #[test]
    fn pipeline_runs_in_order() {
        let pipeline = [
            Transform::translate(Vec3::X),
            Transform::uniform_scale(2.0),
        ];
        // (3 - 1) / 2, not 3 / 2 - 1
        assert_eq!(apply_pipeline(&pipeline, Vec3::new(3.0, 0.0, 0.0)).x, 1.0);
    }

    #[test]
    fn transforms_deserialize_from_tagged_json() {
        let t: Transform =
            serde_json::from_str(r#"{"type":"translate","offset":[1.0,0.0,-2.0]}"#).unwrap();
        assert_eq!(t, Transform::translate(Vec3::new(1.0, 0.0, -2.0)));
    }
}
