//! Background frame rendering with cancellation

use crate::error::{RenderError, Result};
use crate::scheduler::FrameStats;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// A camera that can render one whole frame on the calling thread
pub trait FrameRenderer: Send + Sync + 'static {
    /// Render a frame, giving up early once `cancel` is set
    fn render_frame(&self, cancel: &AtomicBool) -> Result<FrameStats>;
}

/// A frame being rendered on a background thread
///
/// Dropping the job detaches the thread; the frame still completes.
#[derive(Debug)]
pub struct RenderJob {
    handle: JoinHandle<Result<FrameStats>>,
    cancel: Arc<AtomicBool>,
}

impl RenderJob {
    /// Start rendering `renderer` on a new thread
    pub fn spawn<R: FrameRenderer>(renderer: R) -> Result<Self> {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let handle = thread::Builder::new()
            .name("manta-render".into())
            .spawn(move || renderer.render_frame(&flag))
            .map_err(RenderError::ThreadSpawn)?;
        Ok(Self { handle, cancel })
    }

    /// Ask the workers to stop at their next step
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the frame is done
    ///
    /// Resolves to [`RenderError::Cancelled`] if the frame was cancelled
    /// before finishing.
    pub fn wait(self) -> Result<FrameStats> {
        self.handle
            .join()
            .map_err(|_| RenderError::WorkerPanicked)?
    }
}
