use crate::{
    error::{SpotlightError, SpotlightResult},
    raster::Raster,
};

/// Optional accelerated blur primitive supplied by the host.
///
/// Failures are not fatal: the pipeline falls back to [`box_blur_rgba8_premul`]
/// for that job and logs the error.
pub trait BlurKernel: Send + Sync {
    fn blur(&self, raster: &mut Raster, radius: u32) -> SpotlightResult<()>;
}

/// Portable approximate blur: separable box passes with clamp-to-edge, run on
/// premultiplied RGBA8. Cheap enough for the downscaled capture it runs on.
pub fn box_blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
) -> SpotlightResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| SpotlightError::validation("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(SpotlightError::validation(
            "box_blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }

    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];
    horizontal_pass(src, &mut tmp, width, height, radius);
    vertical_pass(&tmp, &mut out, width, height, radius);
    Ok(out)
}

/// In-place convenience over [`box_blur_rgba8_premul`].
pub fn box_blur(raster: &mut Raster, radius: u32) -> SpotlightResult<()> {
    let (w, h) = (raster.width(), raster.height());
    let blurred = box_blur_rgba8_premul(raster.pixels(), w, h, radius)?;
    raster.pixels_mut().copy_from_slice(&blurred);
    Ok(())
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, radius: u32) {
    let r = radius as i64;
    let w = width as i64;
    let window = (2 * r + 1) as u64;
    for y in 0..height as i64 {
        let row = (y * w) as usize * 4;
        let mut acc = [0u64; 4];
        // Prime the window for x = 0 with clamp-to-edge.
        for dx in -r..=r {
            let sx = dx.clamp(0, w - 1) as usize;
            for c in 0..4 {
                acc[c] += u64::from(src[row + sx * 4 + c]);
            }
        }
        for x in 0..w {
            let out = row + x as usize * 4;
            for c in 0..4 {
                dst[out + c] = ((acc[c] + window / 2) / window) as u8;
            }
            let leave = (x - r).clamp(0, w - 1) as usize;
            let enter = (x + r + 1).clamp(0, w - 1) as usize;
            for c in 0..4 {
                acc[c] += u64::from(src[row + enter * 4 + c]);
                acc[c] -= u64::from(src[row + leave * 4 + c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, radius: u32) {
    let r = radius as i64;
    let w = width as i64;
    let h = height as i64;
    let window = (2 * r + 1) as u64;
    for x in 0..w {
        let mut acc = [0u64; 4];
        for dy in -r..=r {
            let sy = dy.clamp(0, h - 1);
            let idx = ((sy * w + x) as usize) * 4;
            for c in 0..4 {
                acc[c] += u64::from(src[idx + c]);
            }
        }
        for y in 0..h {
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = ((acc[c] + window / 2) / window) as u8;
            }
            let leave = (((y - r).clamp(0, h - 1) * w + x) as usize) * 4;
            let enter = (((y + r + 1).clamp(0, h - 1) * w + x) as usize) * 4;
            for c in 0..4 {
                acc[c] += u64::from(src[enter + c]);
                acc[c] -= u64::from(src[leave + c]);
            }
        }
    }
}
