//! Column tiling and fork-join worker dispatch

use crate::camera::CameraData;
use crate::error::{RenderError, Result};
use crate::handler::RenderHandler;
use manta_core::ray::{MarchResult, MarchStatus};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// Tiling
// ============================================================================

/// An inclusive range of frame columns owned by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRange {
    pub start: u32,
    pub end: u32,
}

impl ColumnRange {
    pub fn len(&self) -> u32 {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, x: u32) -> bool {
        self.start <= x && x <= self.end
    }

    pub fn columns(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }
}

/// Split `[0, width)` into contiguous column ranges, one per worker
///
/// With `s = width / n`, worker `i` covers
/// `[i*s + (i > 0), i == n-1 ? width-1 : (i+1)*s]`. The first worker gets
/// one extra column and the last absorbs the remainder; together the ranges
/// cover every column exactly once. `n` is clamped to `[1, width]` and empty
/// ranges are dropped.
pub fn partition_columns(width: u32, workers: usize) -> Vec<ColumnRange> {
    if width == 0 {
        return Vec::new();
    }
    let n = u32::try_from(workers).unwrap_or(u32::MAX).clamp(1, width);
    let subframe = width / n;

    (0..n)
        .map(|i| ColumnRange {
            start: subframe * i + u32::from(i > 0),
            end: if i == n - 1 {
                width - 1
            } else {
                subframe * (i + 1)
            },
        })
        .filter(|range| !range.is_empty())
        .collect()
}

// ============================================================================
// Statistics
// ============================================================================

/// Counters gathered while rendering a frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub workers: usize,
    pub pixels: u64,
    pub hits: u64,
    pub misses: u64,
    /// Primary rays that hit the step limit
    pub exhausted: u64,
    /// Scene queries by primary rays
    pub steps: u64,
    pub shadow_rays: u64,
    /// Shadow rays that were blocked
    pub shadowed: u64,
    /// Scene queries by shadow rays
    pub shadow_steps: u64,
    pub elapsed: Duration,
}

impl FrameStats {
    /// Count one primary ray
    pub fn record_primary(&mut self, result: &MarchResult) {
        self.pixels += 1;
        self.steps += u64::from(result.steps);
        match result.status {
            MarchStatus::Hit => self.hits += 1,
            MarchStatus::Miss => self.misses += 1,
            MarchStatus::Exhausted => self.exhausted += 1,
            MarchStatus::Cancelled => {}
        }
    }

    /// Count one shadow ray
    pub fn record_shadow(&mut self, result: &MarchResult) {
        self.shadow_rays += 1;
        self.shadow_steps += u64::from(result.steps);
        if result.is_hit() {
            self.shadowed += 1;
        }
    }

    /// Fold another worker's counters into this one
    pub fn merge(&mut self, other: &FrameStats) {
        self.pixels += other.pixels;
        self.hits += other.hits;
        self.misses += other.misses;
        self.exhausted += other.exhausted;
        self.steps += other.steps;
        self.shadow_rays += other.shadow_rays;
        self.shadowed += other.shadowed;
        self.shadow_steps += other.shadow_steps;
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// How column ranges are mapped onto threads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStrategy {
    /// A fresh OS thread per range, joined at the end of the frame
    #[default]
    Spawn,
    /// Ranges run on rayon's global thread pool
    Pool,
}

/// Run `work` once per range and collect the per-worker counters
///
/// Returns only after every worker has finished.
pub(crate) fn run_workers<F>(
    ranges: &[ColumnRange],
    strategy: WorkerStrategy,
    work: F,
) -> Result<Vec<FrameStats>>
where
    F: Fn(ColumnRange) -> FrameStats + Sync,
{
    match strategy {
        WorkerStrategy::Spawn => thread::scope(|scope| {
            let work = &work;
            let handles = ranges
                .iter()
                .enumerate()
                .map(|(i, &range)| {
                    thread::Builder::new()
                        .name(format!("manta-worker-{i}"))
                        .spawn_scoped(scope, move || work(range))
                        .map_err(RenderError::ThreadSpawn)
                })
                .collect::<Result<Vec<_>>>()?;

            // Join every worker before reporting, so no panicked thread is
            // left for the scope to re-raise
            let joined: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();
            joined
                .into_iter()
                .map(|result| result.map_err(|_| RenderError::WorkerPanicked))
                .collect()
        }),
        WorkerStrategy::Pool => Ok(ranges.par_iter().map(|&range| work(range)).collect()),
    }
}

/// Orchestrate one frame
///
/// `on_start` runs before any worker, `on_finish` after all of them have
/// joined, both on the calling thread. A cancelled frame joins its workers
/// and skips `on_finish`.
pub(crate) fn run_frame<H, F>(
    data: &CameraData,
    handler: &H,
    workers: usize,
    strategy: WorkerStrategy,
    cancel: &AtomicBool,
    render_columns: F,
) -> Result<FrameStats>
where
    H: RenderHandler + ?Sized,
    F: Fn(ColumnRange, f32) -> FrameStats + Sync,
{
    data.validate()?;
    if handler.dimensions() != data.dimensions {
        return Err(RenderError::InvalidCamera(format!(
            "handler buffers are {}x{} but the camera renders {}x{}",
            handler.dimensions().x,
            handler.dimensions().y,
            data.dimensions.x,
            data.dimensions.y
        )));
    }
    let started = Instant::now();

    let seed = data.initial_scene_index();
    let ranges = partition_columns(data.dimensions.x, workers);
    tracing::debug!(
        width = data.dimensions.x,
        height = data.dimensions.y,
        workers = ranges.len(),
        ?strategy,
        seed,
        shapes = data.scene.len(),
        "starting frame"
    );

    handler.on_start();
    let per_worker = run_workers(&ranges, strategy, |range| {
        let stats = render_columns(range, seed);
        tracing::debug!(
            columns = ?range.columns(),
            pixels = stats.pixels,
            steps = stats.steps,
            "worker done"
        );
        stats
    })?;

    let mut stats = FrameStats {
        workers: ranges.len(),
        ..FrameStats::default()
    };
    for worker in &per_worker {
        stats.merge(worker);
    }

    if cancel.load(Ordering::Relaxed) {
        tracing::debug!(pixels = stats.pixels, "frame cancelled");
        return Err(RenderError::Cancelled);
    }

    handler.on_finish();
    stats.elapsed = started.elapsed();

    if stats.exhausted > 0 {
        tracing::warn!(
            rays = stats.exhausted,
            max_steps = data.max_steps,
            "rays hit the step limit and were shaded as sky"
        );
    }
    tracing::info!(
        pixels = stats.pixels,
        hits = stats.hits,
        misses = stats.misses,
        steps = stats.steps,
        shadowed = stats.shadowed,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "frame finished"
    );

    Ok(stats)
}
