//! Distance estimators
//!
//! All primitives are centered at the origin. Use a shape's transform
//! pipeline to position them.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// A pure distance estimator: point in local space to signed distance
pub type DistanceFn = fn(Vec3) -> f32;

// ============================================================================
// Distance functions
// ============================================================================

/// Unit sphere: exact distance
#[inline]
pub fn sphere_de(p: Vec3) -> f32 {
    p.length() - 1.0
}

/// Unit box (half-extent 1 on every axis)
///
/// Exact outside, and inside the distance to the nearest face.
#[inline]
pub fn box_de(p: Vec3) -> f32 {
    let q = p.abs() - Vec3::ONE;
    q.max(Vec3::ZERO).length() + q.x.max(q.y.max(q.z)).min(0.0)
}

/// Torus lying in the XZ plane
#[inline]
pub fn torus_de(p: Vec3, major_radius: f32, minor_radius: f32) -> f32 {
    let q = Vec2::new(Vec2::new(p.x, p.z).length() - major_radius, p.y);
    q.length() - minor_radius
}

/// Half-space below a plane; `normal` must be unit length
#[inline]
pub fn plane_de(p: Vec3, normal: Vec3, offset: f32) -> f32 {
    p.dot(normal) + offset
}

// ============================================================================
// Primitive table
// ============================================================================

/// The distance estimator a shape evaluates after its pipeline
///
/// Built-in kinds carry their parameters inline; anything else plugs in as
/// a plain function through [`Primitive::Custom`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Sphere,
    Box,
    Torus {
        major_radius: f32,
        minor_radius: f32,
    },
    Plane {
        normal: Vec3,
        offset: f32,
    },
    #[serde(skip)]
    Custom(DistanceFn),
}

impl Primitive {
    /// Create a plane, normalizing `normal`
    pub fn plane(normal: Vec3, offset: f32) -> Self {
        Self::Plane {
            normal: normal.normalize(),
            offset,
        }
    }

    /// Evaluate the distance estimator at a local-space point
    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        match *self {
            Primitive::Sphere => sphere_de(p),
            Primitive::Box => box_de(p),
            Primitive::Torus {
                major_radius,
                minor_radius,
            } => torus_de(p, major_radius, minor_radius),
            Primitive::Plane { normal, offset } => plane_de(p, normal, offset),
            Primitive::Custom(de) => de(p),
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Sphere => "sphere",
            Primitive::Box => "box",
            Primitive::Torus { .. } => "torus",
            Primitive::Plane { .. } => "plane",
            Primitive::Custom(_) => "custom",
        }
    }
}
