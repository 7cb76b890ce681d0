//! Serializable scene descriptions
//!
//! Scenes built in code never pass through here. This is the validated path
//! for scenes arriving as JSON, and the only place degenerate transforms are
//! rejected.

use crate::color::Color;
use crate::light::GlobalLight;
use crate::scene::Scene;
use crate::sdf::{Primitive, Transform};
use crate::shape::Shape;
use crate::{Error, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One shape in a scene file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeDescription {
    pub primitive: Primitive,
    #[serde(default)]
    pub transforms: Vec<Transform>,
    #[serde(default = "default_shape_color")]
    pub color: Color,
}

fn default_shape_color() -> Color {
    Color::WHITE
}

/// A whole scene: sky, light and shapes in mount order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub sky_color: Color,
    #[serde(default)]
    pub light: GlobalLight,
    #[serde(default)]
    pub shapes: Vec<ShapeDescription>,
}

impl SceneDescription {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Validate and assemble the scene
    pub fn build(&self) -> Result<Scene> {
        if self.light.direction.length_squared() == 0.0 || !self.light.direction.is_finite() {
            return Err(Error::InvalidParameter(
                "light direction must be a finite non-zero vector".into(),
            ));
        }

        let mut scene = Scene::new();
        scene.set_sky_color(self.sky_color);
        scene.set_light(self.light);

        for (index, desc) in self.shapes.iter().enumerate() {
            let primitive = validate_primitive(index, desc.primitive)?;

            let mut shape = Shape::new(primitive).with_color(desc.color);
            for transform in &desc.transforms {
                validate_transform(index, transform)?;
                shape.push_transform(*transform);
            }
            tracing::trace!(
                index,
                kind = primitive.name(),
                transforms = desc.transforms.len(),
                "mounting shape"
            );
            scene.mount_shape(shape);
        }

        tracing::debug!(shapes = scene.len(), "built scene from description");
        Ok(scene)
    }
}

/// Check a primitive's parameters, normalizing plane normals
fn validate_primitive(index: usize, primitive: Primitive) -> Result<Primitive> {
    match primitive {
        Primitive::Plane { normal, .. } if normal.length_squared() == 0.0 => Err(
            Error::InvalidParameter(format!("shape {index}: plane normal must be non-zero")),
        ),
        Primitive::Plane { normal, offset } => Ok(Primitive::plane(normal, offset)),
        Primitive::Torus {
            major_radius,
            minor_radius,
        } if major_radius < 0.0 || minor_radius < 0.0 => Err(Error::InvalidParameter(format!(
            "shape {index}: torus radii must be non-negative"
        ))),
        other => Ok(other),
    }
}

fn validate_transform(index: usize, transform: &Transform) -> Result<()> {
    match *transform {
        Transform::Scale { factor } if factor.cmpeq(Vec3::ZERO).any() || !factor.is_finite() => {
            Err(Error::InvalidParameter(format!(
                "shape {index}: scale factors must be finite and non-zero, got {factor}"
            )))
        }
        Transform::Translate { offset: v } | Transform::Rotate { euler: v } if !v.is_finite() => {
            Err(Error::InvalidParameter(format!(
                "shape {index}: transform components must be finite"
            )))
        }
        _ => Ok(()),
    }
}
