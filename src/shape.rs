use std::time::Duration;

use crate::{
    core::{Paint, Point, Rect},
    ease::Ease,
    error::SpotlightResult,
    raster::Raster,
};

pub const DEFAULT_SHAPE_DURATION: Duration = Duration::from_millis(500);

/// Geometry of the revealed cut-out region.
///
/// `draw` at progress 0 is a degenerate zero-area region and at progress 1 the
/// nominal size; `bounds` is always the fully-revealed box and is used for
/// overlay layout only.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Shape {
    Circle {
        radius: f64,
        duration: Duration,
        ease: Ease,
    },
    RoundedRectangle {
        width: f64,
        height: f64,
        corner_radius: f64,
        duration: Duration,
        ease: Ease,
    },
}

impl Shape {
    pub fn circle(radius: f64) -> Self {
        Self::Circle {
            radius,
            duration: DEFAULT_SHAPE_DURATION,
            ease: Ease::DEFAULT_DECELERATE,
        }
    }

    pub fn rounded_rectangle(width: f64, height: f64, corner_radius: f64) -> Self {
        Self::RoundedRectangle {
            width,
            height,
            corner_radius,
            duration: DEFAULT_SHAPE_DURATION,
            ease: Ease::DEFAULT_DECELERATE,
        }
    }

    pub fn with_timing(mut self, duration: Duration, ease: Ease) -> Self {
        match &mut self {
            Self::Circle {
                duration: d,
                ease: e,
                ..
            }
            | Self::RoundedRectangle {
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
            Self::Circle { duration, .. } | Self::RoundedRectangle { duration, .. } => *duration,
        }
    }

    pub fn ease(&self) -> Ease {
        match self {
            Self::Circle { ease, .. } | Self::RoundedRectangle { ease, .. } => *ease,
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
            Self::Circle { radius, .. } => raster.fill_circle(anchor, progress * radius, paint),
            Self::RoundedRectangle { corner_radius, .. } => {
                // Corner radius stays fixed while the box grows, matching the
                // reference behavior (corners look non-circular early on).
                raster.fill_round_rect(self.bounds_at(anchor, progress), corner_radius, paint)
            }
        }
    }

    /// Fully-revealed bounding box, used for overlay layout.
    pub fn bounds(&self, anchor: Point) -> Rect {
        self.bounds_at(anchor, 1.0)
    }

    fn bounds_at(&self, anchor: Point, progress: f64) -> Rect {
        match *self {
            Self::Circle { radius, .. } => {
                let r = progress * radius;
                Rect::new(anchor.x - r, anchor.y - r, anchor.x + r, anchor.y + r)
            }
            Self::RoundedRectangle { width, height, .. } => {
                let half_w = width / 2.0 * progress;
                let half_h = height / 2.0 * progress;
                Rect::new(
                    anchor.x - half_w,
                    anchor.y - half_h,
                    anchor.x + half_w,
                    anchor.y + half_h,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rgba8Premul;

    #[test]
    fn circle_bounds_is_full_radius_box() {
        let shape = Shape::circle(50.0);
        let b = shape.bounds(Point::new(100.0, 100.0));
        assert_eq!(b, Rect::new(50.0, 50.0, 150.0, 150.0));
    }

    #[test]
    fn circle_revealed_radius_scales_with_progress() {
        let shape = Shape::circle(40.0);
        let anchor = Point::new(50.0, 50.0);
        let mut raster = Raster::new(100, 100).unwrap();
        raster.fill(Rgba8Premul::opaque(0, 0, 0));
        shape
            .draw(&mut raster, anchor, 0.5, Paint::clear())
            .unwrap();
        // Revealed radius is 20: inside is clear, outside is untouched.
        assert_eq!(raster.pixel(50, 35).unwrap(), Rgba8Premul::TRANSPARENT);
        assert_eq!(raster.pixel(50, 25).unwrap(), Rgba8Premul::opaque(0, 0, 0));
    }

    #[test]
    fn rounded_rect_zero_progress_is_zero_area() {
        let shape = Shape::rounded_rectangle(80.0, 40.0, 8.0);
        let b = shape.bounds_at(Point::new(10.0, 10.0), 0.0);
        assert_eq!(b.width(), 0.0);
        assert_eq!(b.height(), 0.0);
        assert_eq!(b.center(), Point::new(10.0, 10.0));
    }

    #[test]
    fn rounded_rect_full_progress_is_centered_nominal_box() {
        let shape = Shape::rounded_rectangle(80.0, 40.0, 8.0);
        let b = shape.bounds(Point::new(100.0, 60.0));
        assert_eq!(b, Rect::new(60.0, 40.0, 140.0, 80.0));
    }

    #[test]
    fn rounded_rect_half_sizes_scale_linearly() {
        let shape = Shape::rounded_rectangle(80.0, 40.0, 8.0);
        for p in [0.25, 0.5, 0.75] {
            let b = shape.bounds_at(Point::new(0.0, 0.0), p);
            assert!((b.width() - 80.0 * p).abs() < 1e-9);
            assert!((b.height() - 40.0 * p).abs() < 1e-9);
        }
    }

    #[test]
    fn with_timing_overrides_defaults() {
        let shape = Shape::circle(10.0).with_timing(Duration::from_millis(120), Ease::Linear);
        assert_eq!(shape.duration(), Duration::from_millis(120));
        assert_eq!(shape.ease(), Ease::Linear);
    }
}
