//! Signed distance fields
//!
//! A distance field returns the distance from any point in space to the
//! nearest surface. Negative values are inside, positive values are outside,
//! and zero is exactly on the surface.
//!
//! Sphere tracing advances by exactly the returned value, so every estimator
//! here is a lower bound on the true distance: overestimating lets rays leak
//! through thin geometry, underestimating only costs extra steps.

pub mod primitives;
pub mod transforms;

pub use primitives::*;
pub use transforms::*;
