use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc,
};
use std::thread;

use crate::{
    blur::{BlurKernel, box_blur},
    config::BlurConfig,
    core::{Rect, SurfaceSize},
    raster::Raster,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// System-reserved edges excluded from the blurred capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EdgeInsets {
    pub status_bar: u32,
    pub navigation_bar: u32,
    pub rotation: Rotation,
}

impl EdgeInsets {
    /// (left, top, right, bottom) pixel offsets. The navigation bar moves
    /// with rotation: bottom upright, right at 90°, left at 270°.
    fn offsets(self) -> (u32, u32, u32, u32) {
        let nav = self.navigation_bar;
        match self.rotation {
            Rotation::Deg0 => (0, self.status_bar, 0, nav),
            Rotation::Deg90 => (0, self.status_bar, nav, 0),
            Rotation::Deg270 => (nav, self.status_bar, 0, 0),
            Rotation::Deg180 => (0, self.status_bar, 0, 0),
        }
    }
}

/// Host collaborator backing the content behind the spotlight surface.
///
/// All methods run on the interactive context; the pipeline never touches the
/// source from its worker thread.
pub trait CaptureSource {
    fn is_visible(&self) -> bool;
    fn size(&self) -> SurfaceSize;
    /// Raster snapshot of the background content at native resolution, or
    /// `None` when the content has no pixels yet (e.g. right after a resize).
    fn capture(&mut self) -> Option<Raster>;
    /// Force a synchronous re-measure/re-layout; called once before the
    /// single capture retry.
    fn force_layout(&mut self);
    fn insets(&self) -> EdgeInsets {
        EdgeInsets::default()
    }
}

struct BlurJob {
    cancel: Arc<AtomicBool>,
    rx: mpsc::Receiver<Raster>,
    _worker: thread::JoinHandle<()>,
}

/// Asynchronous blurred-background producer.
///
/// Capture happens synchronously on the caller's context; downscale and blur
/// run on a worker thread; the finished raster crosses back via a channel the
/// engine drains on its next tick. At most one job is ever in flight.
pub struct BlurPipeline {
    config: BlurConfig,
    kernel: Option<Arc<dyn BlurKernel>>,
    job: Option<BlurJob>,
    awaiting_visibility: bool,
}

impl BlurPipeline {
    pub fn new(config: BlurConfig) -> Self {
        Self {
            config,
            kernel: None,
            job: None,
            awaiting_visibility: false,
        }
    }

    /// Install an accelerated kernel; the portable box blur remains the
    /// fallback when it errors.
    pub fn with_kernel(mut self, kernel: Arc<dyn BlurKernel>) -> Self {
        self.kernel = Some(kernel);
        self
    }

    pub fn is_idle(&self) -> bool {
        self.job.is_none() && !self.awaiting_visibility
    }

    /// Schedule one blur job, or defer it until the source becomes visible.
    pub fn start_processing(&mut self, source: &mut dyn CaptureSource) {
        if self.job.is_some() {
            return;
        }
        if !source.is_visible() {
            self.awaiting_visibility = true;
            return;
        }
        self.spawn_job(source);
    }

    /// Host signal that the capture source became visible/laid out. Runs a
    /// deferred job exactly once.
    pub fn notify_visible(&mut self, source: &mut dyn CaptureSource) {
        if !self.awaiting_visibility || self.job.is_some() {
            return;
        }
        self.awaiting_visibility = false;
        self.spawn_job(source);
    }

    /// Cancel any in-flight job. The cancelled worker publishes nothing.
    pub fn stop_processing(&mut self) {
        self.awaiting_visibility = false;
        if let Some(job) = self.job.take() {
            job.cancel.store(true, Ordering::Relaxed);
        }
    }

    /// Drain a finished job, if any. Called by the engine on its tick.
    pub fn poll(&mut self) -> Option<Raster> {
        let job = self.job.as_ref()?;
        match job.rx.try_recv() {
            Ok(raster) => {
                self.job = None;
                Some(raster)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                // Worker exited without a result (failed or cancelled).
                self.job = None;
                None
            }
        }
    }

    fn spawn_job(&mut self, source: &mut dyn CaptureSource) {
        let Some(capture) = capture_with_retry(source) else {
            tracing::debug!("background capture unavailable, skipping blur");
            return;
        };
        let source_size = source.size();
        let insets = source.insets();
        let config = self.config;
        let kernel = self.kernel.clone();
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_worker = Arc::clone(&cancel);
        let (tx, rx) = mpsc::channel();

        let worker = thread::spawn(move || {
            if let Some(result) =
                run_blur_job(capture, source_size, insets, config, kernel, &cancel_worker)
            {
                // The receiver may already be gone after stop_processing.
                let _ = tx.send(result);
            }
        });

        self.job = Some(BlurJob {
            cancel,
            rx,
            _worker: worker,
        });
    }
}

fn capture_with_retry(source: &mut dyn CaptureSource) -> Option<Raster> {
    if let Some(raster) = source.capture().filter(|r| !r.is_empty()) {
        return Some(raster);
    }
    // A zero-size capture right after a rotation/resize: force one synchronous
    // re-layout and try again with the fresh measurement.
    source.force_layout();
    source.capture().filter(|r| !r.is_empty())
}

#[tracing::instrument(skip(capture, kernel, cancel), fields(w = capture.width(), h = capture.height()))]
fn run_blur_job(
    capture: Raster,
    source_size: SurfaceSize,
    insets: EdgeInsets,
    config: BlurConfig,
    kernel: Option<Arc<dyn BlurKernel>>,
    cancel: &AtomicBool,
) -> Option<Raster> {
    let (left, top, right, bottom) = insets.offsets();
    let src_rect = Rect::new(
        f64::from(left),
        f64::from(top),
        f64::from(capture.width()) - f64::from(right),
        f64::from(capture.height()) - f64::from(bottom),
    );
    let visible_w = f64::from(source_size.width) - f64::from(left) - f64::from(right);
    let visible_h = f64::from(source_size.height) - f64::from(top) - f64::from(bottom);
    if visible_w <= 0.0 || visible_h <= 0.0 || src_rect.width() <= 0.0 || src_rect.height() <= 0.0
    {
        tracing::debug!("insets leave no visible content, skipping blur");
        return None;
    }

    // Downscale keeps the inset-adjusted aspect ratio.
    let scaled_h = (visible_h / config.downscale_factor).ceil();
    let scaled_w = (visible_w * scaled_h / visible_h).ceil();
    let mut overlay = Raster::new(scaled_w as u32, scaled_h as u32).ok()?;
    overlay
        .blit_stretched(&capture, src_rect, overlay.size().bounds())
        .ok()?;
    drop(capture);

    if cancel.load(Ordering::Relaxed) {
        return None;
    }

    match &kernel {
        Some(kernel) => {
            if let Err(err) = kernel.blur(&mut overlay, config.radius) {
                tracing::warn!(%err, "accelerated blur kernel failed, using portable blur");
                box_blur(&mut overlay, config.radius).ok()?;
            }
        }
        None => box_blur(&mut overlay, config.radius).ok()?,
    }

    if cancel.load(Ordering::Relaxed) {
        return None;
    }
    Some(overlay)
}
