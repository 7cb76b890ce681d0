//! # Manta Core
//!
//! Scene model and sphere tracing for a CPU distance-field renderer.
//!
//! A scene is an ordered list of shapes. Each shape is a closed-form
//! distance estimator behind a pipeline of query-space transforms, plus a
//! flat color. Rays march through the scene by repeatedly stepping the
//! nearest-surface distance until they converge or escape.
//!
//! ## Quick Start
//!
//! ```rust
//! use manta_core::prelude::*;
//!
//! let mut scene = Scene::new();
//! scene.mount_shape(Shape::sphere().translate(Vec3::new(10.0, 0.0, 0.0)));
//!
//! let mut ray = Ray::new(Vec3::ZERO, Vec3::X, &scene);
//! let result = march(&mut ray, &MarchLimits::default(), None);
//! assert!(result.is_hit());
//! ```
//!
//! ## Units and Conventions
//!
//! - **Angles**: radians everywhere
//! - **Precision**: `f32`
//! - **Transforms**: act on the query point; `Scale` divides

pub mod color;
pub mod description;
pub mod light;
pub mod ray;
pub mod rotation;
pub mod scene;
pub mod sdf;
pub mod shape;

mod error;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::color::Color;
    pub use crate::description::{SceneDescription, ShapeDescription};
    pub use crate::light::GlobalLight;
    pub use crate::ray::{LightRay, MarchLimits, MarchResult, MarchStatus, Marcher, Ray, march};
    pub use crate::scene::{MISS_DISTANCE, Nearest, Scene};
    pub use crate::sdf::{DistanceFn, Primitive, Transform};
    pub use crate::shape::Shape;

    // Math (re-export glam)
    pub use glam::{UVec2, Vec2, Vec3};

    // Error handling
    pub use crate::{Error, Result};
}
