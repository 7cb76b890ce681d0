//! Frame lifecycle hooks and the buffers cameras render into
//!
//! A camera never owns its output. It writes into buffers exposed by a
//! handler and calls [`RenderHandler::on_start`] before dispatching workers
//! and [`RenderHandler::on_finish`] after all of them have joined.

use crate::buffer::PixelBuffer;
use crate::environment::CompositeSettings;
use crate::shading::composite_pixel;
use glam::UVec2;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Lifecycle hooks for a frame
pub trait RenderHandler: Send + Sync {
    /// Size of the buffers this handler exposes
    fn dimensions(&self) -> UVec2;

    /// Called once before any worker starts
    fn on_start(&self) {}

    /// Called once after every worker has finished
    fn on_finish(&self) {}
}

/// Handler exposing one RGBA8 bitmap
pub trait ColorHandler: RenderHandler {
    fn bitmap(&self) -> &PixelBuffer<u8>;
}

/// Handler exposing the four multi-pass channels
pub trait MultipassHandler: RenderHandler {
    fn passes(&self) -> &PassBuffers;
}

// ============================================================================
// Pass buffers
// ============================================================================

/// Per-pixel output channels of the multi-pass camera
#[derive(Debug)]
pub struct PassBuffers {
    /// Surface color, RGBA8
    pub albedo: PixelBuffer<u8>,
    /// Received light, RGBA16 (255 = unit)
    pub light: PixelBuffer<u16>,
    /// Hit distance over max distance, one byte
    pub mist: PixelBuffer<u8>,
    /// Ambient occlusion, one byte (255 = open)
    pub ao: PixelBuffer<u8>,
    ao_written: AtomicBool,
}

impl PassBuffers {
    pub fn new(dimensions: UVec2) -> Self {
        Self {
            albedo: PixelBuffer::new(dimensions, 4),
            light: PixelBuffer::new(dimensions, 4),
            mist: PixelBuffer::new(dimensions, 1),
            ao: PixelBuffer::new(dimensions, 1),
            ao_written: AtomicBool::new(false),
        }
    }

    pub fn dimensions(&self) -> UVec2 {
        self.albedo.dimensions()
    }

    /// Whether the last frame filled the AO channel
    pub fn ao_written(&self) -> bool {
        self.ao_written.load(Ordering::Acquire)
    }

    pub(crate) fn mark_ao_written(&self) {
        self.ao_written.store(true, Ordering::Release);
    }

    /// Zero every channel
    pub fn clear(&self) {
        self.albedo.clear();
        self.light.clear();
        self.mist.clear();
        self.ao.clear();
        self.ao_written.store(false, Ordering::Release);
    }
}

// ============================================================================
// Stock handlers
// ============================================================================

/// Holds a bitmap and counts finished frames
#[derive(Debug)]
pub struct DirectRenderHandler {
    bitmap: PixelBuffer<u8>,
    frames: AtomicU64,
}

impl DirectRenderHandler {
    pub fn new(dimensions: UVec2) -> Self {
        Self {
            bitmap: PixelBuffer::new(dimensions, 4),
            frames: AtomicU64::new(0),
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }
}

impl RenderHandler for DirectRenderHandler {
    fn dimensions(&self) -> UVec2 {
        self.bitmap.dimensions()
    }

    fn on_finish(&self) {
        let frame = self.frames.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(frame, "bitmap ready");
    }
}

impl ColorHandler for DirectRenderHandler {
    fn bitmap(&self) -> &PixelBuffer<u8> {
        &self.bitmap
    }
}

/// Holds the pass buffers and composites them when a frame finishes
#[derive(Debug)]
pub struct MultipassRenderHandler {
    passes: PassBuffers,
    composite: PixelBuffer<u8>,
    settings: CompositeSettings,
    frames: AtomicU64,
}

impl MultipassRenderHandler {
    pub fn new(dimensions: UVec2) -> Self {
        Self::with_settings(dimensions, CompositeSettings::default())
    }

    pub fn with_settings(dimensions: UVec2, settings: CompositeSettings) -> Self {
        Self {
            passes: PassBuffers::new(dimensions),
            composite: PixelBuffer::new(dimensions, 4),
            settings,
            frames: AtomicU64::new(0),
        }
    }

    /// RGBA8 image built from the passes of the last finished frame
    pub fn composite(&self) -> &PixelBuffer<u8> {
        &self.composite
    }

    pub fn settings(&self) -> &CompositeSettings {
        &self.settings
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Rebuild the composite image from the current passes
    pub fn recomposite(&self) {
        let passes = &self.passes;
        let use_ao = passes.ao_written();

        let albedo = passes.albedo.read();
        let light = passes.light.read();
        let mist = passes.mist.read();
        let ao = passes.ao.read();

        let mut out = self.composite.write();
        for (i, px) in out.chunks_exact_mut(4).enumerate() {
            let rgba = i * 4;
            let value = composite_pixel(
                &albedo[rgba..rgba + 4],
                &light[rgba..rgba + 4],
                use_ao.then(|| ao[i]),
                mist[i],
                &self.settings,
            );
            px.copy_from_slice(&value);
        }
    }
}

impl RenderHandler for MultipassRenderHandler {
    fn dimensions(&self) -> UVec2 {
        self.passes.dimensions()
    }

    fn on_start(&self) {
        self.passes.clear();
    }

    fn on_finish(&self) {
        self.recomposite();
        let frame = self.frames.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(frame, ao = self.passes.ao_written(), "composite ready");
    }
}

impl MultipassHandler for MultipassRenderHandler {
    fn passes(&self) -> &PassBuffers {
        &self.passes
    }
}
