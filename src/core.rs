use crate::error::{SpotlightError, SpotlightResult};

pub use kurbo::{Point, Rect};

/// Pixel size of the spotlight render surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Scale all four channels by `alpha` in [0,1], staying premultiplied.
    pub fn scaled(self, alpha: f32) -> Self {
        let alpha = alpha.clamp(0.0, 1.0);
        let scale = |c: u8| ((f32::from(c) * alpha).round().clamp(0.0, 255.0)) as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: scale(self.a),
        }
    }
}

/// How a paint combines with the destination pixel.
///
/// `Clear` is the destructive mode used for the spotlight mask: the covered
/// region becomes fully transparent, revealing whatever sits beneath the
/// surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Blend {
    Over,
    Clear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paint {
    pub color: Rgba8Premul,
    pub blend: Blend,
}

impl Paint {
    pub fn fill(color: Rgba8Premul) -> Self {
        Self {
            color,
            blend: Blend::Over,
        }
    }

    pub fn clear() -> Self {
        Self {
            color: Rgba8Premul::TRANSPARENT,
            blend: Blend::Clear,
        }
    }
}

pub(crate) fn rect_in_surface(rect: Rect, size: SurfaceSize) -> SpotlightResult<Rect> {
    if !rect.x0.is_finite() || !rect.y0.is_finite() || !rect.x1.is_finite() || !rect.y1.is_finite()
    {
        return Err(SpotlightError::validation("rect must be finite"));
    }
    Ok(rect.intersect(size.bounds()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_straight_rgba_premultiplies() {
        let c = Rgba8Premul::from_straight_rgba(255, 255, 255, 128);
        assert_eq!(c.a, 128);
        assert!(c.r == 128);
    }

    #[test]
    fn scaled_zero_is_transparent() {
        let c = Rgba8Premul::opaque(10, 20, 30).scaled(0.0);
        assert_eq!(c, Rgba8Premul::TRANSPARENT);
    }

    #[test]
    fn rect_in_surface_clamps_to_bounds() {
        let size = SurfaceSize::new(10, 10);
        let r = rect_in_surface(Rect::new(-5.0, -5.0, 20.0, 20.0), size).unwrap();
        assert_eq!(r, Rect::new(0.0, 0.0, 10.0, 10.0));
    }
}
