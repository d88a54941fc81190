use std::time::Duration;

use crate::{
    animator::RepeatMode,
    core::{Paint, Point, Rgba8Premul},
    ease::Ease,
    error::SpotlightResult,
    raster::Raster,
};

pub const DEFAULT_EFFECT_DURATION: Duration = Duration::from_millis(1000);

/// Decorative glyph drawn at the anchor, independent of the cut-out mask.
///
/// Same contract as [`crate::Shape`] plus a repeat mode; the engine loops the
/// effect animator indefinitely once the target starts.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Effect {
    /// Draws nothing. Default for targets without a decoration.
    Empty,
    /// Circle expanding from the anchor, fading out as it grows.
    Ripple {
        radius: f64,
        color: Rgba8Premul,
        duration: Duration,
        ease: Ease,
    },
    /// Fixed circle whose opacity tracks progress; mirror repeat pulses it.
    Flicker {
        radius: f64,
        color: Rgba8Premul,
        duration: Duration,
        ease: Ease,
    },
}

impl Effect {
    pub fn ripple(radius: f64, color: Rgba8Premul) -> Self {
        Self::Ripple {
            radius,
            color,
            duration: DEFAULT_EFFECT_DURATION,
            ease: Ease::DEFAULT_DECELERATE,
        }
    }

    pub fn flicker(radius: f64, color: Rgba8Premul) -> Self {
        Self::Flicker {
            radius,
            color,
            duration: DEFAULT_EFFECT_DURATION,
            ease: Ease::Linear,
        }
    }

    pub fn with_timing(mut self, duration: Duration, ease: Ease) -> Self {
        match &mut self {
            Self::Empty => {}
            Self::Ripple {
                duration: d,
                ease: e,
                ..
            }
            | Self::Flicker {
                duration: d,
                ease: e,
                ..
            } => {
                *d = duration;
                *e = ease;
            }
        }
        self
    }

    pub fn duration(&self) -> Duration {
        match self {
            Self::Empty => DEFAULT_EFFECT_DURATION,
            Self::Ripple { duration, .. } | Self::Flicker { duration, .. } => *duration,
        }
    }

    pub fn ease(&self) -> Ease {
        match self {
            Self::Empty => Ease::Linear,
            Self::Ripple { ease, .. } | Self::Flicker { ease, .. } => *ease,
        }
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        match self {
            Self::Empty | Self::Ripple { .. } => RepeatMode::Restart,
            Self::Flicker { .. } => RepeatMode::Mirror,
        }
    }

    pub fn draw(
        &self,
        raster: &mut Raster,
        anchor: Point,
        progress: f64,
        paint: Paint,
    ) -> SpotlightResult<()> {
        match *self {
            Self::Empty => Ok(()),
            Self::Ripple { radius, color, .. } => {
                let alpha = (1.0 - progress).clamp(0.0, 1.0) as f32;
                let paint = Paint {
                    color: color.scaled(alpha),
                    ..paint
                };
                raster.fill_circle(anchor, progress.max(0.0) * radius, paint)
            }
            Self::Flicker { radius, color, .. } => {
                let alpha = progress.clamp(0.0, 1.0) as f32;
                let paint = Paint {
                    color: color.scaled(alpha),
                    ..paint
                };
                raster.fill_circle(anchor, radius, paint)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_effect_draws_nothing() {
        let mut raster = Raster::new(8, 8).unwrap();
        Effect::Empty
            .draw(
                &mut raster,
                Point::new(4.0, 4.0),
                0.5,
                Paint::fill(Rgba8Premul::opaque(255, 255, 255)),
            )
            .unwrap();
        assert_eq!(raster.pixel(4, 4).unwrap(), Rgba8Premul::TRANSPARENT);
    }

    #[test]
    fn ripple_fades_as_it_expands() {
        let color = Rgba8Premul::opaque(255, 255, 255);
        let mut early = Raster::new(32, 32).unwrap();
        let mut late = Raster::new(32, 32).unwrap();
        let anchor = Point::new(16.0, 16.0);
        let effect = Effect::ripple(12.0, color);
        effect
            .draw(&mut early, anchor, 0.2, Paint::fill(color))
            .unwrap();
        effect
            .draw(&mut late, anchor, 0.9, Paint::fill(color))
            .unwrap();
        let a_early = early.pixel(16, 16).unwrap().a;
        let a_late = late.pixel(16, 16).unwrap().a;
        assert!(a_early > a_late);
    }

    #[test]
    fn flicker_keeps_radius_and_scales_alpha() {
        let color = Rgba8Premul::opaque(200, 200, 200);
        let effect = Effect::flicker(5.0, color);
        let mut raster = Raster::new(16, 16).unwrap();
        effect
            .draw(&mut raster, Point::new(8.0, 8.0), 1.0, Paint::fill(color))
            .unwrap();
        assert_eq!(raster.pixel(8, 8).unwrap().a, 255);
        // Outside the fixed radius nothing is drawn even at full progress.
        assert_eq!(raster.pixel(8, 1).unwrap(), Rgba8Premul::TRANSPARENT);
    }

    #[test]
    fn repeat_modes_match_effect_kind() {
        assert_eq!(
            Effect::ripple(1.0, Rgba8Premul::TRANSPARENT).repeat_mode(),
            RepeatMode::Restart
        );
        assert_eq!(
            Effect::flicker(1.0, Rgba8Premul::TRANSPARENT).repeat_mode(),
            RepeatMode::Mirror
        );
    }
}
