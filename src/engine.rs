use std::sync::Arc;
use std::time::Duration;

use crate::{
    animator::ProgressAnimator,
    blur::BlurKernel,
    blur_engine::{BlurPipeline, CaptureSource},
    config::SpotlightConfig,
    core::{Paint, Rect, Rgba8Premul, SurfaceSize},
    ease::Ease,
    error::SpotlightResult,
    overlay::OverlayPlacement,
    raster::Raster,
    target::Target,
};

pub type OnComplete = Box<dyn FnMut()>;

/// Coarse engine state, derived from the live animators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    SpotlightEntering,
    TargetActive,
    TargetExiting,
    SpotlightExiting,
}

/// Everything the per-frame draw reads. Single writer: only engine methods on
/// the interactive context mutate this, so no locking is involved.
struct RenderState {
    surface: SurfaceSize,
    alpha: f64,
    target: Option<Target>,
    shape_animator: Option<ProgressAnimator>,
    effect_animator: Option<ProgressAnimator>,
    overlay_placement: Option<OverlayPlacement>,
    blurred_background: Option<Raster>,
    blur_src_bounds: Rect,
}

/// Drives the spotlight sequence: surface fade in/out, per-target shape and
/// effect animators, mask compositing, and consumption of the blur pipeline's
/// published background.
///
/// The host calls [`tick`](Self::tick) once per frame with a monotonic clock
/// value, then [`draw`](Self::draw) when a redraw was requested.
pub struct SpotlightEngine {
    config: SpotlightConfig,
    state: RenderState,
    blur: BlurPipeline,
    alpha_animator: Option<ProgressAnimator>,
    alpha_callback: Option<OnComplete>,
    /// Shared completion listener for the current target's animators.
    ///
    /// Mirrors the reference behavior of registering one listener on both the
    /// shape and effect animators: it fires when the shape animator completes
    /// naturally *and again* when `finish_target` cancels the looping effect
    /// animator. Treat it as an at-least-once signal.
    target_callback: Option<OnComplete>,
    effect_paint: Paint,
}

impl SpotlightEngine {
    pub fn new(config: SpotlightConfig, surface: SurfaceSize) -> Self {
        Self {
            blur: BlurPipeline::new(config.blur),
            config,
            state: RenderState {
                surface,
                alpha: 1.0,
                target: None,
                shape_animator: None,
                effect_animator: None,
                overlay_placement: None,
                blurred_background: None,
                blur_src_bounds: Rect::ZERO,
            },
            alpha_animator: None,
            alpha_callback: None,
            target_callback: None,
            effect_paint: Paint::fill(Rgba8Premul::opaque(255, 255, 255)),
        }
    }

    /// Use an accelerated blur kernel for the background pipeline.
    pub fn with_blur_kernel(mut self, kernel: Arc<dyn BlurKernel>) -> Self {
        self.blur = BlurPipeline::new(self.config.blur).with_kernel(kernel);
        self
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.state.surface
    }

    /// Update the surface bounds on a host layout pass. Gravity overlay
    /// margins are measured from the surface height, so placement is
    /// recomputed here.
    pub fn set_surface_size(&mut self, surface: SurfaceSize) {
        self.state.surface = surface;
        if let Some(target) = &self.state.target {
            self.state.overlay_placement = Some(
                target
                    .overlay
                    .layout(surface, target.shape.bounds(target.anchor)),
            );
        }
    }

    pub fn alpha(&self) -> f64 {
        self.state.alpha
    }

    pub fn current_target(&self) -> Option<&Target> {
        self.state.target.as_ref()
    }

    pub fn overlay_placement(&self) -> Option<OverlayPlacement> {
        self.state.overlay_placement
    }

    pub fn shape_progress(&self) -> Option<f64> {
        self.state.shape_animator.as_ref().map(|a| a.value())
    }

    pub fn effect_progress(&self) -> Option<f64> {
        self.state.effect_animator.as_ref().map(|a| a.value())
    }

    pub fn has_blurred_background(&self) -> bool {
        self.state.blurred_background.is_some()
    }

    pub fn phase(&self) -> Phase {
        if let Some(a) = &self.alpha_animator {
            if !a.is_finished() {
                return if a.is_reversing() {
                    Phase::SpotlightExiting
                } else {
                    Phase::SpotlightEntering
                };
            }
            if a.is_reversing() {
                return Phase::Idle;
            }
        }
        match (&self.state.target, &self.state.shape_animator) {
            (Some(_), Some(s)) if s.is_reversing() => Phase::TargetExiting,
            (Some(_), Some(_)) => Phase::TargetActive,
            _ => Phase::Idle,
        }
    }

    /// Fade the surface in (alpha 0→1). `on_complete` fires on natural
    /// completion of the fade.
    pub fn start_spotlight(
        &mut self,
        duration: Duration,
        ease: Ease,
        on_complete: impl FnMut() + 'static,
    ) {
        self.alpha_animator = Some(ProgressAnimator::new(0.0, 1.0, duration, ease));
        self.alpha_callback = Some(Box::new(on_complete));
    }

    /// Fade the surface out (alpha 1→0), symmetric to
    /// [`start_spotlight`](Self::start_spotlight).
    pub fn finish_spotlight(
        &mut self,
        duration: Duration,
        ease: Ease,
        on_complete: impl FnMut() + 'static,
    ) {
        self.alpha_animator = Some(ProgressAnimator::new(1.0, 0.0, duration, ease));
        self.alpha_callback = Some(Box::new(on_complete));
    }

    /// Replace the current target: detach the previous overlay content, lay
    /// out the new target's overlay against its fully-revealed bounds, and
    /// start the shape (run-once) and effect (looping) animators.
    ///
    /// `on_complete` is the shared animator listener described on
    /// [`Self::target_callback`]: an at-least-once completion signal.
    pub fn start_target(&mut self, target: Target, on_complete: impl FnMut() + 'static) {
        self.state.overlay_placement = Some(
            target
                .overlay
                .layout(self.state.surface, target.shape.bounds(target.anchor)),
        );
        self.state.shape_animator = Some(ProgressAnimator::new(
            0.0,
            1.0,
            target.shape.duration(),
            target.shape.ease(),
        ));
        self.state.effect_animator = Some(ProgressAnimator::looping(
            target.effect.duration(),
            target.effect.ease(),
            target.effect.repeat_mode(),
        ));
        self.state.target = Some(target);
        self.target_callback = Some(Box::new(on_complete));
    }

    /// Reverse the current target's shape animation from its *current* value
    /// down to zero and discard the effect animator. No-op when no target or
    /// shape animator is active.
    pub fn finish_target(&mut self, on_complete: impl FnMut() + 'static) {
        let Some(target) = &self.state.target else {
            return;
        };
        let Some(shape_animator) = &self.state.shape_animator else {
            return;
        };
        let current = shape_animator.value();
        self.state.shape_animator = Some(ProgressAnimator::new(
            current,
            0.0,
            target.shape.duration(),
            target.shape.ease(),
        ));
        // Cancelling the looping effect animator delivers a completion signal
        // to the listener registered at start_target.
        if self.state.effect_animator.take().is_some()
            && let Some(callback) = self.target_callback.as_mut()
        {
            callback();
        }
        self.target_callback = Some(Box::new(on_complete));
    }

    /// Start the blur pipeline if blur is configured. Call when the surface
    /// attaches to the host.
    pub fn on_attach(&mut self, source: &mut dyn CaptureSource) {
        if self.config.blur_background {
            self.blur.start_processing(source);
        }
    }

    /// Drop the published background and cancel any in-flight blur job. Call
    /// when the surface detaches.
    pub fn on_detach(&mut self) {
        if self.config.blur_background {
            self.state.blurred_background = None;
            self.state.blur_src_bounds = Rect::ZERO;
            self.blur.stop_processing();
        }
    }

    /// Relay the host's "capture target became visible" signal to a deferred
    /// blur job.
    pub fn notify_capture_visible(&mut self, source: &mut dyn CaptureSource) {
        if self.config.blur_background {
            self.blur.notify_visible(source);
        }
    }

    /// Advance all live animators and drain the blur pipeline. Returns true
    /// when the host should redraw.
    pub fn tick(&mut self, now: Duration) -> bool {
        let mut needs_redraw = false;

        if let Some(raster) = self.blur.poll() {
            self.state.blur_src_bounds = raster.size().bounds();
            self.state.blurred_background = Some(raster);
            needs_redraw = true;
        }

        if let Some(animator) = &mut self.alpha_animator
            && !animator.is_finished()
        {
            let out = animator.tick(now);
            self.state.alpha = out.value;
            needs_redraw = true;
            if out.just_finished
                && let Some(mut callback) = self.alpha_callback.take()
            {
                callback();
            }
        }

        if let Some(animator) = &mut self.state.shape_animator
            && !animator.is_finished()
        {
            let out = animator.tick(now);
            needs_redraw = true;
            if out.just_finished
                && let Some(callback) = self.target_callback.as_mut()
            {
                callback();
            }
        }

        if let Some(animator) = &mut self.state.effect_animator {
            animator.tick(now);
            needs_redraw = true;
        }

        needs_redraw
    }

    /// Compose one frame: blurred background stretched onto the surface, the
    /// opaque background paint, the effect at its current progress, then the
    /// shape mask in clear mode. The effect is drawn before the mask so the
    /// cut-out does not erase it. Finishes by applying the surface alpha.
    pub fn draw(&self, frame: &mut Raster) -> SpotlightResult<()> {
        frame.fill(Rgba8Premul::TRANSPARENT);
        let bounds = self.state.surface.bounds();

        if let Some(background) = &self.state.blurred_background {
            frame.blit_stretched(background, self.state.blur_src_bounds, bounds)?;
        }
        frame.fill_rect(bounds, Paint::fill(self.config.background_color))?;

        if let (Some(target), Some(animator)) = (&self.state.target, &self.state.effect_animator) {
            target
                .effect
                .draw(frame, target.anchor, animator.value(), self.effect_paint)?;
        }
        if let (Some(target), Some(animator)) = (&self.state.target, &self.state.shape_animator) {
            target
                .shape
                .draw(frame, target.anchor, animator.value(), Paint::clear())?;
        }

        frame.apply_alpha(self.state.alpha as f32);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        overlay::{Gravity, Overlay},
        shape::Shape,
    };
    use kurbo::Point;

    fn engine() -> SpotlightEngine {
        SpotlightEngine::new(SpotlightConfig::default(), SurfaceSize::new(400, 800))
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn finish_target_without_target_is_noop() {
        let mut e = engine();
        e.finish_target(|| panic!("must not fire"));
        assert!(e.current_target().is_none());
        assert_eq!(e.phase(), Phase::Idle);
    }

    #[test]
    fn start_target_replaces_overlay_placement() {
        let mut e = engine();
        e.start_target(
            Target::new(Point::new(100.0, 100.0), Shape::circle(50.0)),
            || {},
        );
        assert_eq!(e.overlay_placement(), Some(OverlayPlacement::FillSurface));

        e.start_target(
            Target::new(Point::new(200.0, 400.0), Shape::circle(50.0)).with_overlay(
                Overlay::Gravity {
                    gravity: Gravity::Bottom,
                    margin: 10.0,
                },
            ),
            || {},
        );
        assert_eq!(
            e.overlay_placement(),
            Some(OverlayPlacement::BelowTarget { top_margin: 460.0 })
        );
    }

    #[test]
    fn surface_resize_recomputes_gravity_placement() {
        let mut e = engine();
        e.start_target(
            Target::new(Point::new(200.0, 400.0), Shape::circle(50.0)).with_overlay(
                Overlay::Gravity {
                    gravity: Gravity::Top,
                    margin: 20.0,
                },
            ),
            || {},
        );
        // H - top - margin = 800 - 350 - 20
        assert_eq!(
            e.overlay_placement(),
            Some(OverlayPlacement::AboveTarget {
                bottom_margin: 430.0
            })
        );
        e.set_surface_size(SurfaceSize::new(400, 1000));
        assert_eq!(
            e.overlay_placement(),
            Some(OverlayPlacement::AboveTarget {
                bottom_margin: 630.0
            })
        );
    }

    #[test]
    fn finish_target_reverses_from_current_value() {
        let mut e = engine();
        let shape = Shape::circle(50.0).with_timing(ms(100), Ease::Linear);
        e.start_target(Target::new(Point::new(100.0, 100.0), shape), || {});
        e.tick(ms(0));
        e.tick(ms(60));
        assert!((e.shape_progress().unwrap() - 0.6).abs() < 1e-9);

        e.finish_target(|| {});
        assert!((e.shape_progress().unwrap() - 0.6).abs() < 1e-9);
        assert_eq!(e.phase(), Phase::TargetExiting);
        e.tick(ms(100));
        e.tick(ms(150));
        assert!((e.shape_progress().unwrap() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn spotlight_fade_drives_alpha_and_phase() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut e = engine();
        let entered = Rc::new(Cell::new(false));
        let flag = Rc::clone(&entered);
        e.start_spotlight(ms(100), Ease::Linear, move || flag.set(true));
        assert_eq!(e.phase(), Phase::SpotlightEntering);
        e.tick(ms(0));
        e.tick(ms(50));
        assert!((e.alpha() - 0.5).abs() < 1e-9);
        assert!(!entered.get());
        e.tick(ms(100));
        assert!((e.alpha() - 1.0).abs() < 1e-9);
        assert!(entered.get());

        e.finish_spotlight(ms(100), Ease::Linear, || {});
        assert_eq!(e.phase(), Phase::SpotlightExiting);
        e.tick(ms(200));
        e.tick(ms(300));
        assert!((e.alpha() - 0.0).abs() < 1e-9);
        assert_eq!(e.phase(), Phase::Idle);
    }

    #[test]
    fn tick_reports_redraw_only_while_animating() {
        let mut e = engine();
        assert!(!e.tick(ms(0)));
        e.start_target(
            Target::new(Point::new(10.0, 10.0), Shape::circle(5.0).with_timing(ms(10), Ease::Linear)),
            || {},
        );
        assert!(e.tick(ms(0)));
        // Effect animator loops forever, so redraws keep coming.
        assert!(e.tick(ms(1000)));
    }
}
