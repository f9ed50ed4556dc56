//! Structure feature groups
//!
//! Edge, texture, direction and shape dimensions. Together with the aspect
//! ratio these carry most of the weight when comparing garments, because they
//! describe cut and silhouette rather than color.

use crate::preprocess::CanonicalImage;
use crate::stats::{max, mean, normalized_histogram, std_dev, variance};
use vismatch_core::FALLBACK_VALUE;

/// Gradient magnitude above which a pixel counts as an edge
pub const EDGE_THRESHOLD: f64 = 30.0;

const CHANNEL_MAX: f64 = 255.0;
const EDGE_BINS: usize = 5;
const BLOCK: u32 = 8;
const DIRECTION_FALLBACK: f32 = 0.33;

/// Sum of absolute per-channel differences
#[inline]
fn channel_diff(a: [u8; 3], b: [u8; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x as i32 - y as i32).unsigned_abs() as f64)
        .sum()
}

/// Gradient magnitudes of the interior pixels of an image
///
/// Each response compares a pixel with its right and bottom neighbour; rows
/// are kept so shape features can look at where edges sit vertically.
pub(crate) struct EdgeMap {
    magnitudes: Vec<f64>,
    rows: Vec<u32>,
    height: u32,
}

impl EdgeMap {
    pub(crate) fn new(image: &CanonicalImage) -> Self {
        let (w, h) = (image.width(), image.height());
        let interior = (w.saturating_sub(2) as usize) * (h.saturating_sub(2) as usize);
        let mut magnitudes = Vec::with_capacity(interior);
        let mut rows = Vec::with_capacity(interior);

        for y in 1..h.saturating_sub(1) {
            for x in 1..w.saturating_sub(1) {
                let center = image.pixel(x, y);
                let gx = channel_diff(center, image.pixel(x + 1, y)) / 3.0;
                let gy = channel_diff(center, image.pixel(x, y + 1)) / 3.0;
                magnitudes.push((gx * gx + gy * gy).sqrt());
                rows.push(y);
            }
        }

        Self {
            magnitudes,
            rows,
            height: h,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Mean, std and max magnitude followed by a 5-bin histogram (8 values)
    pub(crate) fn write_edges(&self, out: &mut Vec<f32>) {
        if self.is_empty() {
            out.extend([FALLBACK_VALUE; 8]);
            return;
        }
        let m = &self.magnitudes;
        out.push((mean(m) / CHANNEL_MAX) as f32);
        out.push((std_dev(m) / CHANNEL_MAX) as f32);
        out.push((max(m) / CHANNEL_MAX) as f32);
        let hist = normalized_histogram(m, EDGE_BINS, 0.0, CHANNEL_MAX);
        out.extend(hist.into_iter().map(|v| v as f32));
    }

    fn strong_edges(&self) -> impl Iterator<Item = (f64, u32)> + '_ {
        self.magnitudes
            .iter()
            .copied()
            .zip(self.rows.iter().copied())
            .filter(|&(e, _)| e > EDGE_THRESHOLD)
    }

    /// Edge counts in the top quarter and bottom quarter, over all strong edges
    fn vertical_concentration(&self) -> (f64, f64) {
        let top_limit = self.height / 4;
        let bottom_limit = 3 * self.height / 4;
        let (mut top, mut bottom, mut total) = (0usize, 0usize, 0usize);
        for (_, y) in self.strong_edges() {
            total += 1;
            if y < top_limit {
                top += 1;
            } else if y > bottom_limit {
                bottom += 1;
            }
        }
        let total = total.max(1) as f64;
        (top as f64 / total, bottom as f64 / total)
    }
}

/// Mean and std of grayscale variance over non-overlapping 8x8 blocks (2 values)
///
/// Only blocks starting strictly before the last 8 rows and columns are
/// sampled, so images no larger than one block fall back.
pub(crate) fn write_texture(image: &CanonicalImage, out: &mut Vec<f32>) {
    let (w, h) = (image.width(), image.height());
    let mut variances = Vec::new();
    let mut block = Vec::with_capacity((BLOCK * BLOCK) as usize);

    for y in (0..h.saturating_sub(BLOCK)).step_by(BLOCK as usize) {
        for x in (0..w.saturating_sub(BLOCK)).step_by(BLOCK as usize) {
            block.clear();
            for by in y..y + BLOCK {
                for bx in x..x + BLOCK {
                    let [r, g, b] = image.pixel(bx, by);
                    block.push((r as f64 + g as f64 + b as f64) / 3.0);
                }
            }
            variances.push(variance(&block));
        }
    }

    if variances.is_empty() {
        out.extend([FALLBACK_VALUE; 2]);
        return;
    }
    let scale = CHANNEL_MAX * CHANNEL_MAX;
    out.push((mean(&variances) / scale) as f32);
    out.push((std_dev(&variances) / scale) as f32);
}

/// Share of horizontal, vertical and diagonal difference energy (3 values)
pub(crate) fn write_direction(image: &CanonicalImage, out: &mut Vec<f32>) {
    let (w, h) = (image.width(), image.height());
    let (mut horizontal, mut vertical, mut diagonal) = (0.0f64, 0.0f64, 0.0f64);

    for y in 0..h.saturating_sub(1) {
        for x in 0..w.saturating_sub(1) {
            let c = image.pixel(x, y);
            horizontal += channel_diff(c, image.pixel(x + 1, y));
            vertical += channel_diff(c, image.pixel(x, y + 1));
            diagonal += channel_diff(c, image.pixel(x + 1, y + 1));
        }
    }

    let total = horizontal + vertical + diagonal;
    if total > 0.0 {
        out.push((horizontal / total) as f32);
        out.push((vertical / total) as f32);
        out.push((diagonal / total) as f32);
    } else {
        out.extend([DIRECTION_FALLBACK; 3]);
    }
}

/// Coarse length class from the aspect ratio
fn length_category(aspect_ratio: f64) -> f64 {
    if aspect_ratio > 1.5 {
        0.9
    } else if aspect_ratio > 1.0 {
        0.6
    } else {
        0.3
    }
}

/// Edge density, length class, top and bottom edge share, dynamic range (5 values)
pub(crate) fn write_shape(
    image: &CanonicalImage,
    edges: &EdgeMap,
    dynamic_range: f64,
    out: &mut Vec<f32>,
) {
    let strong = edges.strong_edges().count();
    let density = if image.is_empty() {
        0.0
    } else {
        strong as f64 / image.pixel_count() as f64
    };
    let (top, bottom) = edges.vertical_concentration();

    out.push(density as f32);
    out.push(length_category(image.aspect_ratio()) as f32);
    out.push(top as f32);
    out.push(bottom as f32);
    out.push(dynamic_range as f32);
}
