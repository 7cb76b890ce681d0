//! Fixed-axis rotations shared by the `Rotate` transform and camera rays
//!
//! Each function rotates a point counter-clockwise by `angle` radians when
//! looking down the positive axis toward the origin, with the axis pairs
//! `(y, z)`, `(x, z)` and `(x, y)` respectively.

use glam::Vec3;

/// Rotate about the X axis
#[inline]
pub fn rotate_x(p: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(p.x, p.y * c - p.z * s, p.z * c + p.y * s)
}

/// Rotate about the Y axis
#[inline]
pub fn rotate_y(p: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(p.x * c - p.z * s, p.y, p.z * c + p.x * s)
}

/// Rotate about the Z axis
#[inline]
pub fn rotate_z(p: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(p.x * c - p.y * s, p.y * c + p.x * s, p.z)
}
