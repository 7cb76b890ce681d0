//! Column-tiled color camera

use crate::camera::CameraData;
use crate::error::Result;
use crate::handler::ColorHandler;
use crate::job::{FrameRenderer, RenderJob};
use crate::raymarcher::trace_primary;
use crate::scheduler::{ColumnRange, FrameStats, WorkerStrategy, run_frame};
use glam::UVec2;
use manta_core::color::Color;
use manta_core::ray::MarchStatus;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Renders a scene into a handler's RGBA8 bitmap using `workers` threads
///
/// Each worker owns a contiguous range of columns and writes one whole
/// column at a time. Pixels whose ray converges take the color of the
/// nearest shape; all others take the scene's sky color.
pub struct ThreadedCamera<H> {
    data: Arc<CameraData>,
    handler: Arc<H>,
    workers: usize,
    strategy: WorkerStrategy,
}

impl<H> Clone for ThreadedCamera<H> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            handler: Arc::clone(&self.handler),
            workers: self.workers,
            strategy: self.strategy,
        }
    }
}

impl<H: ColorHandler + 'static> ThreadedCamera<H> {
    pub fn new(data: CameraData, handler: Arc<H>, workers: usize) -> Self {
        Self {
            data: Arc::new(data),
            handler,
            workers,
            strategy: WorkerStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: WorkerStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn data(&self) -> &CameraData {
        &self.data
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Start a frame on a background thread
    pub fn render(&self) -> Result<RenderJob> {
        RenderJob::spawn(self.clone())
    }

    /// Render a frame on the calling thread
    pub fn render_blocking(&self) -> Result<FrameStats> {
        self.render_frame(&AtomicBool::new(false))
    }

    /// Color of a single pixel, traced without the per-frame seed
    pub fn cast(&self, pixel: UVec2) -> Color {
        let result = trace_primary(&self.data, pixel, None, None);
        self.shade(result.status, result.position)
    }

    /// Fill the bitmap with a coordinate gradient, bypassing the scene
    ///
    /// Pixel `(x, y)` becomes `(x % 255, y % 255, 0, 255)`.
    pub fn render_test_pattern(&self) {
        let bitmap = self.handler.bitmap();
        self.handler.on_start();
        for x in 0..bitmap.width() {
            let column: Vec<Color> = (0..bitmap.height())
                .map(|y| Color::new((x % 255) as u8, (y % 255) as u8, 0, 255))
                .collect();
            bitmap.write_column(x, bytemuck::cast_slice(&column));
        }
        self.handler.on_finish();
    }

    fn shade(&self, status: MarchStatus, position: glam::Vec3) -> Color {
        match status {
            MarchStatus::Hit => self.data.scene.color_at(position),
            _ => self.data.scene.sky_color(),
        }
    }

    fn render_columns(&self, range: ColumnRange, seed: f32, cancel: &AtomicBool) -> FrameStats {
        let height = self.data.dimensions.y;
        let bitmap = self.handler.bitmap();
        let mut stats = FrameStats::default();
        let mut column = vec![Color::default(); height as usize];

        for x in range.columns() {
            for (y, px) in (0..height).zip(column.iter_mut()) {
                let result = trace_primary(&self.data, UVec2::new(x, y), Some(seed), Some(cancel));
                if result.status == MarchStatus::Cancelled {
                    return stats;
                }
                stats.record_primary(&result);
                *px = self.shade(result.status, result.position);
            }
            bitmap.write_column(x, bytemuck::cast_slice(&column));
        }

        stats
    }
}

impl<H: ColorHandler + 'static> FrameRenderer for ThreadedCamera<H> {
    fn render_frame(&self, cancel: &AtomicBool) -> Result<FrameStats> {
        run_frame(
            &self.data,
            self.handler.as_ref(),
            self.workers,
            self.strategy,
            cancel,
            |range, seed| self.render_columns(range, seed, cancel),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::handler::DirectRenderHandler;
    use glam::Vec3;
    use manta_core::scene::Scene;
    use manta_core::shape::Shape;

    fn red_sphere_camera(workers: usize) -> ThreadedCamera<DirectRenderHandler> {
        let mut scene = Scene::new();
        scene.mount_shape(Shape::sphere().with_color(Color::rgb(255, 0, 0)));
        scene.set_sky_color(Color::rgb(70, 90, 240));

        let data = CameraData::new(Arc::new(scene))
            .with_position(Vec3::new(-5.0, 0.0, 0.0))
            .with_dimensions(32, 24);
        let handler = Arc::new(DirectRenderHandler::new(data.dimensions));
        ThreadedCamera::new(data, handler, workers)
    }

    #[test]
    fn center_is_shape_and_corner_is_sky() {
        let camera = red_sphere_camera(4);
        camera.render_blocking().unwrap();

        let bitmap = camera.handler().bitmap();
        assert_eq!(bitmap.pixel(16, 12).unwrap(), vec![255, 0, 0, 255]);
        assert_eq!(bitmap.pixel(0, 0).unwrap(), vec![70, 90, 240, 255]);
        assert_eq!(camera.cast(UVec2::new(16, 12)), Color::rgb(255, 0, 0));
    }

    #[test]
    fn test_pattern_encodes_coordinates() {
        let camera = red_sphere_camera(1);
        camera.render_test_pattern();
        let bitmap = camera.handler().bitmap();
        assert_eq!(bitmap.pixel(5, 7).unwrap(), vec![5, 7, 0, 255]);
        assert_eq!(bitmap.pixel(31, 23).unwrap(), vec![31, 23, 0, 255]);
        assert_eq!(camera.handler().frames(), 1);
    }

    #[test]
    fn mismatched_handler_is_rejected() {
        let camera = red_sphere_camera(2);
        let other = ThreadedCamera::new(
            camera.data().clone(),
            Arc::new(DirectRenderHandler::new(UVec2::new(8, 8))),
            2,
        );
        assert!(other.render_blocking().is_err());
    }
}
