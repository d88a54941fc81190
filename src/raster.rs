use crate::{
    core::{Blend, Paint, Point, Rect, Rgba8Premul, SurfaceSize, rect_in_surface},
    error::{SpotlightError, SpotlightResult},
};

/// CPU raster over a premultiplied RGBA8 buffer.
///
/// Coverage is binary at pixel centers; the engine relies on exact geometry,
/// not antialiasing, so results stay deterministic across platforms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> SpotlightResult<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| SpotlightError::validation("raster size overflow"))?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    pub fn from_pixels(width: u32, height: u32, data: Vec<u8>) -> SpotlightResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| SpotlightError::validation("raster size overflow"))?;
        if data.len() != expected {
            return Err(SpotlightError::validation(
                "raster pixels must match width*height*4",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize * self.width as usize) + x as usize) * 4;
        Some(Rgba8Premul {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        })
    }

    pub fn fill(&mut self, color: Rgba8Premul) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&color.to_array());
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, paint: Paint) -> SpotlightResult<()> {
        let rect = rect_in_surface(rect, self.size())?;
        if rect.is_zero_area() {
            return Ok(());
        }
        self.fill_coverage(rect, paint, |_, _| true);
        Ok(())
    }

    pub fn fill_circle(&mut self, center: Point, radius: f64, paint: Paint) -> SpotlightResult<()> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(SpotlightError::validation("circle radius must be >= 0"));
        }
        if radius == 0.0 {
            return Ok(());
        }
        let bbox = Rect::new(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        );
        let bbox = rect_in_surface(bbox, self.size())?;
        let r2 = radius * radius;
        self.fill_coverage(bbox, paint, |x, y| {
            let dx = x - center.x;
            let dy = y - center.y;
            dx * dx + dy * dy <= r2
        });
        Ok(())
    }

    pub fn fill_round_rect(
        &mut self,
        rect: Rect,
        corner_radius: f64,
        paint: Paint,
    ) -> SpotlightResult<()> {
        if !corner_radius.is_finite() || corner_radius < 0.0 {
            return Err(SpotlightError::validation("corner radius must be >= 0"));
        }
        let clipped = rect_in_surface(rect, self.size())?;
        if clipped.is_zero_area() {
            return Ok(());
        }
        let r = corner_radius
            .min(rect.width() / 2.0)
            .min(rect.height() / 2.0);
        let r2 = r * r;
        self.fill_coverage(clipped, paint, |x, y| {
            if x < rect.x0 || x > rect.x1 || y < rect.y0 || y > rect.y1 {
                return false;
            }
            // Corner test only applies inside the four r-by-r corner squares.
            let cx = if x < rect.x0 + r {
                rect.x0 + r
            } else if x > rect.x1 - r {
                rect.x1 - r
            } else {
                return true;
            };
            let cy = if y < rect.y0 + r {
                rect.y0 + r
            } else if y > rect.y1 - r {
                rect.y1 - r
            } else {
                return true;
            };
            let dx = x - cx;
            let dy = y - cy;
            dx * dx + dy * dy <= r2
        });
        Ok(())
    }

    /// Draw `src_rect` of `src` stretched onto `dst_rect`, bilinear-filtered,
    /// source-over the destination.
    pub fn blit_stretched(
        &mut self,
        src: &Raster,
        src_rect: Rect,
        dst_rect: Rect,
    ) -> SpotlightResult<()> {
        if src.is_empty() || src_rect.is_zero_area() {
            return Ok(());
        }
        // Only the pixel loop is clipped; u/v stay relative to the full
        // destination rect so an off-surface dst_rect crops the source
        // instead of compressing it into the visible remainder.
        let clipped = rect_in_surface(dst_rect, self.size())?;
        if dst_rect.is_zero_area() || clipped.is_zero_area() {
            return Ok(());
        }

        let x0 = clipped.x0.floor().max(0.0) as u32;
        let y0 = clipped.y0.floor().max(0.0) as u32;
        let x1 = (clipped.x1.ceil() as u32).min(self.width);
        let y1 = (clipped.y1.ceil() as u32).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let u = (f64::from(x) + 0.5 - dst_rect.x0) / dst_rect.width();
                let v = (f64::from(y) + 0.5 - dst_rect.y0) / dst_rect.height();
                let sx = src_rect.x0 + u * src_rect.width();
                let sy = src_rect.y0 + v * src_rect.height();
                let color = src.sample_bilinear(sx, sy);
                let i = ((y as usize * self.width as usize) + x as usize) * 4;
                let dst = [
                    self.data[i],
                    self.data[i + 1],
                    self.data[i + 2],
                    self.data[i + 3],
                ];
                let out = over(dst, color.to_array());
                self.data[i..i + 4].copy_from_slice(&out);
            }
        }
        Ok(())
    }

    /// Multiply the whole layer by `alpha`, staying premultiplied.
    pub fn apply_alpha(&mut self, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha >= 1.0 {
            return;
        }
        let q = ((alpha * 255.0).round() as i32).clamp(0, 255) as u16;
        for px in self.data.chunks_exact_mut(4) {
            for c in px.iter_mut() {
                *c = mul_div255(u16::from(*c), q);
            }
        }
    }

    fn sample_bilinear(&self, x: f64, y: f64) -> Rgba8Premul {
        let max_x = f64::from(self.width - 1);
        let max_y = f64::from(self.height - 1);
        let x = (x - 0.5).clamp(0.0, max_x);
        let y = (y - 0.5).clamp(0.0, max_y);
        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = x - f64::from(x0);
        let fy = y - f64::from(y0);

        let p00 = self.pixel(x0, y0).unwrap_or(Rgba8Premul::TRANSPARENT);
        let p10 = self.pixel(x1, y0).unwrap_or(Rgba8Premul::TRANSPARENT);
        let p01 = self.pixel(x0, y1).unwrap_or(Rgba8Premul::TRANSPARENT);
        let p11 = self.pixel(x1, y1).unwrap_or(Rgba8Premul::TRANSPARENT);

        let mix = |a: u8, b: u8, t: f64| f64::from(a) + (f64::from(b) - f64::from(a)) * t;
        let lerp2 = |c00: u8, c10: u8, c01: u8, c11: u8| {
            let top = mix(c00, c10, fx);
            let bot = mix(c01, c11, fx);
            (top + (bot - top) * fy).round().clamp(0.0, 255.0) as u8
        };

        Rgba8Premul {
            r: lerp2(p00.r, p10.r, p01.r, p11.r),
            g: lerp2(p00.g, p10.g, p01.g, p11.g),
            b: lerp2(p00.b, p10.b, p01.b, p11.b),
            a: lerp2(p00.a, p10.a, p01.a, p11.a),
        }
    }

    fn fill_coverage<F>(&mut self, bbox: Rect, paint: Paint, covered: F)
    where
        F: Fn(f64, f64) -> bool,
    {
        let x0 = bbox.x0.floor().max(0.0) as u32;
        let y0 = bbox.y0.floor().max(0.0) as u32;
        let x1 = (bbox.x1.ceil().max(0.0) as u32).min(self.width);
        let y1 = (bbox.y1.ceil().max(0.0) as u32).min(self.height);
        let src = paint.color.to_array();

        for y in y0..y1 {
            for x in x0..x1 {
                let px = f64::from(x) + 0.5;
                let py = f64::from(y) + 0.5;
                if !covered(px, py) {
                    continue;
                }
                let i = ((y as usize * self.width as usize) + x as usize) * 4;
                match paint.blend {
                    Blend::Over => {
                        let dst = [
                            self.data[i],
                            self.data[i + 1],
                            self.data[i + 2],
                            self.data[i + 3],
                        ];
                        let out = over(dst, src);
                        self.data[i..i + 4].copy_from_slice(&out);
                    }
                    Blend::Clear => {
                        self.data[i..i + 4].copy_from_slice(&[0, 0, 0, 0]);
                    }
                }
            }
        }
    }
}

fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = src[i].saturating_add(dc);
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque(r: u8, g: u8, b: u8) -> Rgba8Premul {
        Rgba8Premul::opaque(r, g, b)
    }

    #[test]
    fn fill_rect_covers_only_the_rect() {
        let mut raster = Raster::new(8, 8).unwrap();
        raster
            .fill_rect(
                Rect::new(2.0, 2.0, 6.0, 6.0),
                Paint::fill(opaque(255, 0, 0)),
            )
            .unwrap();
        assert_eq!(raster.pixel(3, 3).unwrap(), opaque(255, 0, 0));
        assert_eq!(raster.pixel(0, 0).unwrap(), Rgba8Premul::TRANSPARENT);
        assert_eq!(raster.pixel(6, 6).unwrap(), Rgba8Premul::TRANSPARENT);
    }

    #[test]
    fn clear_circle_punches_hole() {
        let mut raster = Raster::new(16, 16).unwrap();
        raster.fill(opaque(0, 0, 255));
        raster
            .fill_circle(Point::new(8.0, 8.0), 4.0, Paint::clear())
            .unwrap();
        assert_eq!(raster.pixel(8, 8).unwrap(), Rgba8Premul::TRANSPARENT);
        assert_eq!(raster.pixel(0, 0).unwrap(), opaque(0, 0, 255));
        // Just outside the radius stays painted.
        assert_eq!(raster.pixel(8, 2).unwrap(), opaque(0, 0, 255));
    }

    #[test]
    fn zero_radius_circle_draws_nothing() {
        let mut raster = Raster::new(4, 4).unwrap();
        raster.fill(opaque(9, 9, 9));
        raster
            .fill_circle(Point::new(2.0, 2.0), 0.0, Paint::clear())
            .unwrap();
        assert_eq!(raster.pixel(2, 2).unwrap(), opaque(9, 9, 9));
    }

    #[test]
    fn round_rect_rounds_corners() {
        let mut raster = Raster::new(20, 20).unwrap();
        raster
            .fill_round_rect(
                Rect::new(2.0, 2.0, 18.0, 18.0),
                6.0,
                Paint::fill(opaque(0, 255, 0)),
            )
            .unwrap();
        // Center and edge midpoints covered; extreme corner pixel not.
        assert_eq!(raster.pixel(10, 10).unwrap(), opaque(0, 255, 0));
        assert_eq!(raster.pixel(10, 2).unwrap(), opaque(0, 255, 0));
        assert_eq!(raster.pixel(2, 2).unwrap(), Rgba8Premul::TRANSPARENT);
    }

    #[test]
    fn blit_stretched_scales_source_over_dst() {
        let mut src = Raster::new(2, 2).unwrap();
        src.fill(opaque(100, 100, 100));
        let mut dst = Raster::new(8, 8).unwrap();
        dst.blit_stretched(
            &src,
            Rect::new(0.0, 0.0, 2.0, 2.0),
            Rect::new(0.0, 0.0, 8.0, 8.0),
        )
        .unwrap();
        assert_eq!(dst.pixel(4, 4).unwrap(), opaque(100, 100, 100));
        assert_eq!(dst.pixel(7, 7).unwrap(), opaque(100, 100, 100));
    }

    #[test]
    fn blit_stretched_crops_offscreen_destination() {
        // red | blue source, stretched onto a rect whose left half is off
        // the surface: the visible columns must show the source's right
        // (blue) half, not the whole source squeezed into them.
        let src = Raster::from_pixels(
            2,
            1,
            vec![255, 0, 0, 255, 0, 0, 255, 255],
        )
        .unwrap();
        let mut dst = Raster::new(4, 4).unwrap();
        dst.blit_stretched(
            &src,
            Rect::new(0.0, 0.0, 2.0, 1.0),
            Rect::new(-4.0, 0.0, 4.0, 4.0),
        )
        .unwrap();
        assert_eq!(dst.pixel(3, 1).unwrap(), opaque(0, 0, 255));
        let left = dst.pixel(0, 1).unwrap();
        assert!(left.b > left.r);
    }

    #[test]
    fn apply_alpha_scales_all_channels() {
        let mut raster = Raster::new(1, 1).unwrap();
        raster.fill(opaque(200, 100, 50));
        raster.apply_alpha(0.5);
        let px = raster.pixel(0, 0).unwrap();
        assert!((i32::from(px.a) - 128).abs() <= 1);
        assert!((i32::from(px.r) - 100).abs() <= 1);
    }

    #[test]
    fn from_pixels_rejects_wrong_len() {
        assert!(Raster::from_pixels(2, 2, vec![0u8; 3]).is_err());
    }
}
