//! Manta Render - multi-threaded CPU ray-marching cameras
//!
//! Two cameras render a [`manta_core::scene::Scene`] by sphere tracing one
//! ray per pixel:
//!
//! - [`ThreadedCamera`] writes flat shape colors into an RGBA8 bitmap;
//! - [`PbrCamera`] writes albedo, light, mist and ambient-occlusion
//!   channels for later compositing.
//!
//! Both split the frame into contiguous column ranges, one per worker, and
//! report through a [`RenderHandler`] before and after the workers run.
//!
//! ## Example
//!
//! ```rust
//! use manta_core::prelude::*;
//! use manta_render::{CameraData, DirectRenderHandler, ThreadedCamera};
//! use std::sync::Arc;
//!
//! let mut scene = Scene::new();
//! scene.mount_shape(Shape::sphere().translate(Vec3::new(5.0, 0.0, 0.0)));
//!
//! let data = CameraData::new(Arc::new(scene)).with_dimensions(64, 48);
//! let handler = Arc::new(DirectRenderHandler::new(data.dimensions));
//! let camera = ThreadedCamera::new(data, handler, 4);
//!
//! let stats = camera.render()?.wait()?;
//! assert_eq!(stats.pixels, 64 * 48);
//! # Ok::<(), manta_render::RenderError>(())
//! ```

pub mod buffer;
pub mod camera;
pub mod environment;
mod error;
pub mod handler;
pub mod job;
pub mod pbr;
pub mod raymarcher;
pub mod scheduler;
pub mod shading;
pub mod threaded;

pub use buffer::PixelBuffer;
pub use camera::{CameraData, frag_to_factor, ray_direction};
pub use environment::{CompositeSettings, ShadingSettings};
pub use error::{RenderError, Result};
pub use handler::{
    ColorHandler, DirectRenderHandler, MultipassHandler, MultipassRenderHandler, PassBuffers,
    RenderHandler,
};
pub use job::{FrameRenderer, RenderJob};
pub use pbr::{PbrCamera, PbrSample};
pub use raymarcher::trace_primary;
pub use scheduler::{ColumnRange, FrameStats, WorkerStrategy, partition_columns};
pub use threaded::ThreadedCamera;
