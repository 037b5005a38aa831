//! Deterministic grayscale -> blur -> threshold pipeline.
//!
//! The mask produced here is recomputed at detection time and again
//! whenever cleared feature pixels are regenerated; the regeneration
//! contract in [`crate::features`] only holds because two invocations
//! over the same frame and threshold are bit-identical. Everything in
//! this module is pure integer/float arithmetic with a fixed
//! evaluation order; there is no randomness and no state.

use ndarray::Array2;

use crate::frame::ThermalFrame;

/// Binary hot/cold classification, 0 or 255 per pixel, dimensions
/// matching the frame that produced it. Ephemeral by design — callers
/// recompute rather than persist it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotPixelMask {
    mask: Array2<u8>,
}

impl HotPixelMask {
    pub fn width(&self) -> usize {
        self.mask.dim().1
    }

    pub fn height(&self) -> usize {
        self.mask.dim().0
    }

    pub fn value(&self, x: usize, y: usize) -> u8 {
        self.mask[(y, x)]
    }

    pub fn is_hot(&self, x: usize, y: usize) -> bool {
        self.mask[(y, x)] == 255
    }

    pub fn as_array(&self) -> &Array2<u8> {
        &self.mask
    }
}

/// Linear min/max scaling of the temperature matrix to `0..=255`.
///
/// The scale comes from the frame's own (immutable) statistics, so
/// repeated calls over one frame always agree. A flat frame maps to
/// all zeros.
pub fn intensity_image(frame: &ThermalFrame) -> Array2<u8> {
    let min = frame.stats.min;
    let span = frame.stats.max - frame.stats.min;
    if !(span > 0.) {
        return Array2::zeros(frame.temperatures().raw_dim());
    }
    frame
        .temperatures()
        .mapv(|t| ((t as f64 - min) / span * 255.).round() as u8)
}

/// Fixed 3x3 box blur with clamped borders and round-to-nearest
/// integer division.
fn box_blur_3x3(src: &Array2<u8>) -> Array2<u8> {
    let (height, width) = src.dim();
    let mut out = Array2::zeros((height, width));
    for y in 0..height {
        for x in 0..width {
            let mut sum: u32 = 0;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let sy = (y as i64 + dy).max(0).min(height as i64 - 1) as usize;
                    let sx = (x as i64 + dx).max(0).min(width as i64 - 1) as usize;
                    sum += src[(sy, sx)] as u32;
                }
            }
            out[(y, x)] = ((sum + 4) / 9) as u8;
        }
    }
    out
}

/// Grayscale, blur, binary threshold: blurred intensity >= `threshold`
/// classifies hot (255), everything else cold (0).
pub fn hot_pixel_mask(frame: &ThermalFrame, threshold: u8) -> HotPixelMask {
    let blurred = box_blur_3x3(&intensity_image(frame));
    let mask = blurred.mapv(|v| if v >= threshold { 255 } else { 0 });
    HotPixelMask { mask }
}
