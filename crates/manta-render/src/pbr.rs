//! Multi-pass camera: albedo, light, mist and ambient occlusion
//!
//! Uses the same column tiling as [`ThreadedCamera`](crate::ThreadedCamera),
//! but instead of one final color it writes four channels into a
//! [`MultipassHandler`]'s [`PassBuffers`](crate::PassBuffers). Combining the
//! channels is left to the handler.
//!
//! For every pixel whose primary ray hits a surface:
//!
//! - **albedo** is the flat color of the nearest shape;
//! - a shadow ray leaves the hit point toward the light, skipping the shape
//!   it starts on; if it converges on another surface the pixel is in
//!   shadow;
//! - **light** is the ambient level, plus the light's color times its
//!   intensity when unshadowed;
//! - **mist** is the hit distance as a fraction of the max distance;
//! - **ao** samples the field along the surface normal.
//!
//! Sky pixels get the sky color as albedo, the fully lit level, mist 255
//! and AO 255.

use crate::camera::CameraData;
use crate::environment::ShadingSettings;
use crate::error::Result;
use crate::handler::MultipassHandler;
use crate::job::{FrameRenderer, RenderJob};
use crate::raymarcher::trace_primary;
use crate::scheduler::{ColumnRange, FrameStats, WorkerStrategy, run_frame};
use crate::shading::{ambient_occlusion, estimate_normal, light_level, mist_level};
use glam::UVec2;
use manta_core::color::Color;
use manta_core::ray::{LightRay, MarchResult, MarchStatus, march};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Channel values for one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PbrSample {
    pub albedo: Color,
    pub light: [u16; 4],
    pub mist: u8,
    pub ao: u8,
    /// `Some(true)` when a shadow ray found an occluder; `None` for sky
    pub shadowed: Option<bool>,
}

pub struct PbrCamera<H> {
    data: Arc<CameraData>,
    handler: Arc<H>,
    workers: usize,
    strategy: WorkerStrategy,
    shading: ShadingSettings,
}

impl<H> Clone for PbrCamera<H> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            handler: Arc::clone(&self.handler),
            workers: self.workers,
            strategy: self.strategy,
            shading: self.shading.clone(),
        }
    }
}

impl<H: MultipassHandler + 'static> PbrCamera<H> {
    pub fn new(data: CameraData, handler: Arc<H>, workers: usize) -> Self {
        Self {
            data: Arc::new(data),
            handler,
            workers,
            strategy: WorkerStrategy::default(),
            shading: ShadingSettings::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: WorkerStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_shading(mut self, shading: ShadingSettings) -> Self {
        self.shading = shading;
        self
    }

    pub fn data(&self) -> &CameraData {
        &self.data
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    pub fn shading(&self) -> &ShadingSettings {
        &self.shading
    }

    pub fn render(&self) -> Result<RenderJob> {
        RenderJob::spawn(self.clone())
    }

    pub fn render_blocking(&self) -> Result<FrameStats> {
        self.render_frame(&AtomicBool::new(false))
    }

    /// Channels of a single pixel, traced without the per-frame seed
    pub fn shade_pixel(&self, pixel: UVec2) -> PbrSample {
        let primary = trace_primary(&self.data, pixel, None, None);
        self.shade(&primary, None, &mut FrameStats::default())
    }

    fn shade(
        &self,
        primary: &MarchResult,
        cancel: Option<&AtomicBool>,
        stats: &mut FrameStats,
    ) -> PbrSample {
        let scene = &self.data.scene;
        let light = scene.light();
        let ao_on = self.shading.ambient_occlusion;

        let hit = primary
            .is_hit()
            .then(|| scene.nearest_shape(primary.position))
            .flatten();
        let Some(nearest) = hit else {
            return PbrSample {
                albedo: scene.sky_color(),
                light: light_level(self.shading.ambient_level, light, true),
                mist: u8::MAX,
                ao: if ao_on { u8::MAX } else { 0 },
                shadowed: None,
            };
        };

        let mut shadow_ray = LightRay::new(primary.position, light.shadow_direction(), scene)
            .excluding(nearest.index);
        let shadow = march(&mut shadow_ray, &self.data.limits(), cancel);
        stats.record_shadow(&shadow);
        let shadowed = shadow.is_hit();

        let ao = if ao_on {
            let normal = estimate_normal(scene, primary.position);
            ambient_occlusion(scene, primary.position, normal, &self.shading)
        } else {
            0
        };

        PbrSample {
            albedo: scene
                .shape(nearest.index)
                .map_or(scene.sky_color(), |shape| shape.color),
            light: light_level(self.shading.ambient_level, light, !shadowed),
            mist: mist_level(primary.distance, self.data.max_distance),
            ao,
            shadowed: Some(shadowed),
        }
    }

    fn render_columns(&self, range: ColumnRange, seed: f32, cancel: &AtomicBool) -> FrameStats {
        let height = self.data.dimensions.y as usize;
        let passes = self.handler.passes();
        let mut stats = FrameStats::default();

        let mut albedo = vec![Color::default(); height];
        let mut light = vec![0u16; height * 4];
        let mut mist = vec![0u8; height];
        let mut ao = vec![0u8; height];

        for x in range.columns() {
            for y in 0..height {
                let pixel = UVec2::new(x, y as u32);
                let primary = trace_primary(&self.data, pixel, Some(seed), Some(cancel));
                if primary.status == MarchStatus::Cancelled {
                    return stats;
                }
                stats.record_primary(&primary);

                let sample = self.shade(&primary, Some(cancel), &mut stats);
                albedo[y] = sample.albedo;
                light[y * 4..y * 4 + 4].copy_from_slice(&sample.light);
                mist[y] = sample.mist;
                ao[y] = sample.ao;
            }

            passes.albedo.write_column(x, bytemuck::cast_slice(&albedo));
            passes.light.write_column(x, &light);
            passes.mist.write_column(x, &mist);
            if self.shading.ambient_occlusion {
                passes.ao.write_column(x, &ao);
            }
        }

        if self.shading.ambient_occlusion {
            passes.mark_ao_written();
        }
        stats
    }
}

impl<H: MultipassHandler + 'static> FrameRenderer for PbrCamera<H> {
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
    use crate::handler::MultipassRenderHandler;
    use glam::Vec3;
    use manta_core::light::GlobalLight;
    use manta_core::scene::Scene;
    use manta_core::shape::Shape;

    fn camera(scene: Scene, shading: ShadingSettings) -> PbrCamera<MultipassRenderHandler> {
        let data = CameraData::new(Arc::new(scene))
            .with_position(Vec3::new(-5.0, 0.0, 0.0))
            .with_dimensions(16, 16);
        let handler = Arc::new(MultipassRenderHandler::new(data.dimensions));
        PbrCamera::new(data, handler, 3).with_shading(shading)
    }

    #[test]
    fn sky_pixels_are_fully_lit_and_misted() {
        let mut scene = Scene::new();
        scene.set_sky_color(Color::rgb(1, 2, 3));
        let camera = camera(scene, ShadingSettings::default());

        let sample = camera.shade_pixel(UVec2::ZERO);
        assert_eq!(sample.albedo, Color::rgb(1, 2, 3));
        assert_eq!(sample.light, [295, 295, 295, 255]);
        assert_eq!(sample.mist, 255);
        assert_eq!(sample.ao, 255);
        assert_eq!(sample.shadowed, None);
    }

    #[test]
    fn frame_fills_every_channel() {
        let mut scene = Scene::new();
        scene.mount_shape(Shape::sphere().with_color(Color::rgb(0, 200, 0)));
        scene.set_light(GlobalLight::new(Vec3::NEG_Y, Color::WHITE, 1.0));
        let camera = camera(scene, ShadingSettings::default());

        let stats = camera.render_blocking().unwrap();
        assert_eq!(stats.pixels, 256);
        assert!(stats.hits > 0);
        assert_eq!(stats.shadow_rays, stats.hits);

        let passes = camera.handler().passes();
        assert!(passes.ao_written());
        assert_eq!(passes.albedo.pixel(8, 8).unwrap(), vec![0, 200, 0, 255]);
        assert!(passes.mist.pixel(8, 8).unwrap()[0] < 20);
        assert_eq!(passes.mist.pixel(0, 0).unwrap(), vec![255]);
        assert_eq!(camera.handler().frames(), 1);
    }

    #[test]
    fn disabled_ao_leaves_channel_zeroed() {
        let mut scene = Scene::new();
        scene.mount_shape(Shape::sphere());
        let shading = ShadingSettings {
            ambient_occlusion: false,
            ..ShadingSettings::default()
        };
        let camera = camera(scene, shading);

        camera.render_blocking().unwrap();
        let passes = camera.handler().passes();
        assert!(!passes.ao_written());
        assert!(passes.ao.snapshot().iter().all(|&v| v == 0));
    }
}
