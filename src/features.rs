//! Per-feature hot-pixel storage with lazy regeneration.
//!
//! Long video runs accumulate thousands of features; keeping every
//! pixel list resident is wasteful when the mask pipeline can rebuild
//! them deterministically. A feature's pixel list is therefore either
//! fully populated or cleared (`None`) — never partial — and the only
//! transitions are `Populated -> Cleared` (the caller's memory
//! decision, via [`Feature::clear_pixels`]) and `Cleared -> Populated`
//! (here, via [`regenerate_for_block`]).
//!
//! Regeneration is parallel across features — each feature owns its
//! output and the frame/mask are shared read-only — but must never
//! run twice concurrently on the same feature; callers guarantee one
//! regeneration pass per block at a time.

use itertools::iproduct;
use rayon::prelude::*;
use serde_derive::*;

use crate::frame::ThermalFrame;
use crate::threshold::{hot_pixel_mask, intensity_image};

/// The atomic unit stored per feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HotPixel {
    pub x: u32,
    pub y: u32,
    /// Grayscale intensity of the source pixel before blurring.
    pub original_color: u8,
}

/// Inclusive bounding box in pixel coordinates. May extend outside
/// the frame; scans clamp to the frame on the fly and the box itself
/// is never shrunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelBox {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl PixelBox {
    pub fn new(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> Self {
        PixelBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The box intersected with `[0, width) x [0, height)`, as
    /// inclusive ranges; `None` when the intersection is empty.
    fn clamped(
        &self,
        width: usize,
        height: usize,
    ) -> Option<(std::ops::RangeInclusive<usize>, std::ops::RangeInclusive<usize>)> {
        let min_x = self.min_x.max(0);
        let min_y = self.min_y.max(0);
        let max_x = self.max_x.min(width as i64 - 1);
        let max_y = self.max_y.min(height as i64 - 1);
        if min_x > max_x || min_y > max_y {
            return None;
        }
        Some((
            min_x as usize..=max_x as usize,
            min_y as usize..=max_y as usize,
        ))
    }
}

/// How a feature's pixels come into existence. Only `Thresholded`
/// features are regenerated by this engine; `Learned` features belong
/// to the detector pipeline and are skipped here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeatureKind {
    Thresholded,
    Learned,
}

/// Aggregates derived from a feature's pixel list. Recomputed on
/// every repopulation; retained across clears so displays keep their
/// numbers while the pixels are gone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FeatureStats {
    pub hot_pixel_count: usize,
    pub avg_heat: f64,
    pub max_heat: u8,
}

impl FeatureStats {
    fn from_pixels(pixels: &[HotPixel]) -> Self {
        let mut stats = FeatureStats {
            hot_pixel_count: pixels.len(),
            ..FeatureStats::default()
        };
        if pixels.is_empty() {
            return stats;
        }
        let mut sum = 0u64;
        for pixel in pixels {
            sum += pixel.original_color as u64;
            stats.max_heat = stats.max_heat.max(pixel.original_color);
        }
        stats.avg_heat = sum as f64 / pixels.len() as f64;
        stats
    }
}

/// A detected region of interest. `pixels` is either fully populated
/// or `None` ("cleared"), never partial.
#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    pub id: u64,
    pub kind: FeatureKind,
    pub bounds: PixelBox,
    pixels: Option<Vec<HotPixel>>,
    stats: FeatureStats,
}

impl Feature {
    pub fn new(id: u64, kind: FeatureKind, bounds: PixelBox) -> Self {
        Feature {
            id,
            kind,
            bounds,
            pixels: None,
            stats: FeatureStats::default(),
        }
    }

    pub fn pixels(&self) -> Option<&[HotPixel]> {
        self.pixels.as_deref()
    }

    pub fn stats(&self) -> FeatureStats {
        self.stats
    }

    pub fn is_cleared(&self) -> bool {
        self.pixels.is_none()
    }

    /// Release the pixel list under memory pressure. When and whether
    /// to call this is the caller's decision; the stats keep their
    /// last computed values until the next regeneration.
    pub fn clear_pixels(&mut self) {
        self.pixels = None;
    }

    fn set_pixels(&mut self, pixels: Vec<HotPixel>) {
        self.stats = FeatureStats::from_pixels(&pixels);
        self.pixels = Some(pixels);
    }
}

/// A spatial/temporal grouping owning a contiguous range of feature
/// ids. Lifetime is managed externally.
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub min_feature_id: u64,
    pub max_feature_id: u64,
    pub features: Vec<Feature>,
}

impl Block {
    pub fn new(min_feature_id: u64, max_feature_id: u64) -> Self {
        Block {
            min_feature_id,
            max_feature_id,
            features: vec![],
        }
    }

    pub fn owns(&self, feature_id: u64) -> bool {
        (self.min_feature_id..=self.max_feature_id).contains(&feature_id)
    }

    pub fn push(&mut self, feature: Feature) {
        debug_assert!(self.owns(feature.id), "feature id outside block range");
        self.features.push(feature);
    }
}

/// Rebuild the pixel lists of every cleared, threshold-derived
/// feature in `block` from `frame`.
///
/// The mask is computed by the same [`hot_pixel_mask`] call used at
/// detection time, so a clear-then-regenerate round trip reproduces
/// the original pixel sets exactly. Features that are already
/// populated are left untouched (idempotent no-op), as are `Learned`
/// features. The `exclude` predicate (e.g. a configured dead-zone)
/// sees `(x, y, width, height)` and drops individual pixels. Returns
/// the number of features regenerated.
pub fn regenerate_for_block<E>(
    block: &mut Block,
    frame: &ThermalFrame,
    threshold: u8,
    exclude: E,
) -> usize
where
    E: Fn(u32, u32, usize, usize) -> bool + Sync,
{
    let mask = hot_pixel_mask(frame, threshold);
    let colors = intensity_image(frame);
    let width = frame.width();
    let height = frame.height();

    block
        .features
        .par_iter_mut()
        .filter(|f| f.kind == FeatureKind::Thresholded && f.is_cleared())
        .map(|feature| {
            let mut pixels = Vec::new();
            if let Some((xs, ys)) = feature.bounds.clamped(width, height) {
                for (y, x) in iproduct!(ys, xs) {
                    if exclude(x as u32, y as u32, width, height) {
                        continue;
                    }
                    if mask.is_hot(x, y) {
                        pixels.push(HotPixel {
                            x: x as u32,
                            y: y as u32,
                            original_color: colors[(y, x)],
                        });
                    }
                }
            }
            feature.set_pixels(pixels);
            1
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ramp_frame;

    fn no_exclusion(_: u32, _: u32, _: usize, _: usize) -> bool {
        false
    }

    /// A block with one thresholded feature covering the whole frame.
    fn one_feature_block(bounds: PixelBox) -> Block {
        let mut block = Block::new(1, 10);
        block.push(Feature::new(1, FeatureKind::Thresholded, bounds));
        block
    }

    #[test]
    fn regenerates_cleared_features() {
        let frame = ramp_frame(16, 8);
        let mut block = one_feature_block(PixelBox::new(0, 0, 15, 7));
        let touched = regenerate_for_block(&mut block, &frame, 128, no_exclusion);
        assert_eq!(touched, 1);
        let feature = &block.features[0];
        assert!(!feature.is_cleared());
        let pixels = feature.pixels().unwrap();
        assert!(!pixels.is_empty());
        assert!(pixels.len() < 16 * 8, "threshold should reject cold pixels");
        assert_eq!(feature.stats().hot_pixel_count, pixels.len());
        assert!(feature.stats().max_heat >= 128);
    }

    #[test]
    fn populated_features_are_left_untouched() {
        let frame = ramp_frame(16, 8);
        let mut block = one_feature_block(PixelBox::new(0, 0, 15, 7));
        regenerate_for_block(&mut block, &frame, 128, no_exclusion);
        let before = block.features[0].clone();

        // Different threshold; a regenerate must not apply it to the
        // still-populated feature.
        let touched = regenerate_for_block(&mut block, &frame, 1, no_exclusion);
        assert_eq!(touched, 0);
        assert_eq!(block.features[0].pixels(), before.pixels());
        assert_eq!(block.features[0].stats(), before.stats());
    }

    #[test]
    fn clear_then_regenerate_is_deterministic() {
        let frame = ramp_frame(24, 16);
        let mut block = one_feature_block(PixelBox::new(2, 3, 20, 12));
        regenerate_for_block(&mut block, &frame, 90, no_exclusion);
        let first_pixels = block.features[0].pixels().unwrap().to_vec();
        let first_stats = block.features[0].stats();

        block.features[0].clear_pixels();
        assert!(block.features[0].is_cleared());
        // Stats survive the clear.
        assert_eq!(block.features[0].stats(), first_stats);

        regenerate_for_block(&mut block, &frame, 90, no_exclusion);
        assert_eq!(block.features[0].pixels().unwrap(), &first_pixels[..]);
        assert_eq!(block.features[0].stats(), first_stats);
    }

    #[test]
    fn bounds_outside_frame_are_clamped() {
        let frame = ramp_frame(8, 8);
        let mut block = one_feature_block(PixelBox::new(-5, -5, 100, 100));
        regenerate_for_block(&mut block, &frame, 0, no_exclusion);
        // Threshold 0 marks everything hot; the clamped scan covers
        // exactly the frame.
        assert_eq!(block.features[0].pixels().unwrap().len(), 64);
    }

    #[test]
    fn disjoint_box_yields_empty_population() {
        let frame = ramp_frame(8, 8);
        let mut block = one_feature_block(PixelBox::new(50, 50, 60, 60));
        regenerate_for_block(&mut block, &frame, 0, no_exclusion);
        let feature = &block.features[0];
        assert!(!feature.is_cleared(), "populated-empty, not cleared");
        assert_eq!(feature.pixels().unwrap().len(), 0);
        assert_eq!(feature.stats(), FeatureStats::default());
    }

    #[test]
    fn exclusion_policy_drops_pixels() {
        let frame = ramp_frame(8, 8);
        let mut with_zone = one_feature_block(PixelBox::new(0, 0, 7, 7));
        let mut without = one_feature_block(PixelBox::new(0, 0, 7, 7));
        regenerate_for_block(&mut without, &frame, 0, no_exclusion);
        // Dead-zone: right half of the frame.
        regenerate_for_block(&mut with_zone, &frame, 0, |x, _, width, _| {
            x as usize >= width / 2
        });
        assert_eq!(without.features[0].pixels().unwrap().len(), 64);
        assert_eq!(with_zone.features[0].pixels().unwrap().len(), 32);
        assert!(with_zone.features[0]
            .pixels()
            .unwrap()
            .iter()
            .all(|p| p.x < 4));
    }

    #[test]
    fn learned_features_are_skipped() {
        let frame = ramp_frame(8, 8);
        let mut block = Block::new(1, 10);
        block.push(Feature::new(
            1,
            FeatureKind::Learned,
            PixelBox::new(0, 0, 7, 7),
        ));
        block.push(Feature::new(
            2,
            FeatureKind::Thresholded,
            PixelBox::new(0, 0, 7, 7),
        ));
        let touched = regenerate_for_block(&mut block, &frame, 0, no_exclusion);
        assert_eq!(touched, 1);
        assert!(block.features[0].is_cleared());
        assert!(!block.features[1].is_cleared());
    }

    #[test]
    fn pixels_scan_row_major() {
        let frame = ramp_frame(4, 4);
        let mut block = one_feature_block(PixelBox::new(0, 0, 3, 3));
        regenerate_for_block(&mut block, &frame, 0, no_exclusion);
        let pixels = block.features[0].pixels().unwrap();
        let order: Vec<(u32, u32)> = pixels.iter().map(|p| (p.y, p.x)).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
    }

    #[test]
    fn block_ownership() {
        let block = Block::new(5, 9);
        assert!(block.owns(5));
        assert!(block.owns(9));
        assert!(!block.owns(4));
        assert!(!block.owns(10));
    }
}
