//! Color feature groups
//!
//! Writes the color statistics, histogram, brightness and tone groups of the
//! layout. These dimensions are deliberately weak discriminators: two garments
//! of the same cut in different colors should still be judged alike.

use crate::preprocess::CanonicalImage;
use crate::stats::{mean, normalized_histogram, std_dev};
use ahash::AHashSet;

const CHANNEL_MAX: f64 = 255.0;
const HISTOGRAM_BINS: usize = 5;
const DOMINANCE_MARGIN: f64 = 0.1;

/// Per-channel samples and summaries of one image
pub(crate) struct ColorSummary {
    channels: [Vec<f64>; 3],
    brightness: Vec<f64>,
    /// Channel means scaled to [0, 1]
    means: [f64; 3],
}

impl ColorSummary {
    pub(crate) fn new(image: &CanonicalImage) -> Self {
        let n = image.pixel_count();
        let mut channels = [
            Vec::with_capacity(n),
            Vec::with_capacity(n),
            Vec::with_capacity(n),
        ];
        let mut brightness = Vec::with_capacity(n);

        for &[r, g, b] in image.pixels() {
            channels[0].push(r as f64);
            channels[1].push(g as f64);
            channels[2].push(b as f64);
            brightness.push((r as f64 + g as f64 + b as f64) / 3.0);
        }

        let means = [
            mean(&channels[0]) / CHANNEL_MAX,
            mean(&channels[1]) / CHANNEL_MAX,
            mean(&channels[2]) / CHANNEL_MAX,
        ];

        Self {
            channels,
            brightness,
            means,
        }
    }

    /// Channel means then channel standard deviations (6 values)
    pub(crate) fn write_stats(&self, out: &mut Vec<f32>) {
        out.extend(self.means.iter().map(|&m| m as f32));
        out.extend(
            self.channels
                .iter()
                .map(|c| (std_dev(c) / CHANNEL_MAX) as f32),
        );
    }

    /// 5-bin histogram per channel (15 values)
    pub(crate) fn write_histograms(&self, out: &mut Vec<f32>) {
        for channel in &self.channels {
            let hist = normalized_histogram(channel, HISTOGRAM_BINS, 0.0, CHANNEL_MAX);
            out.extend(hist.into_iter().map(|v| v as f32));
        }
    }

    /// Brightness and contrast (2 values)
    pub(crate) fn write_brightness(&self, out: &mut Vec<f32>) {
        out.push((mean(&self.brightness) / CHANNEL_MAX) as f32);
        out.push((std_dev(&self.brightness) / CHANNEL_MAX) as f32);
    }

    /// Dominance flags, warm, cool, saturation mean and std, color complexity (8 values)
    pub(crate) fn write_tone(&self, image: &CanonicalImage, out: &mut Vec<f32>) {
        let [r, g, b] = self.means;
        let flag = |own: f64, a: f64, c: f64| {
            if own > a.max(c) + DOMINANCE_MARGIN {
                1.0
            } else {
                0.0
            }
        };
        out.push(flag(r, g, b));
        out.push(flag(g, r, b));
        out.push(flag(b, r, g));

        let warm = (r + g * 0.5) / 1.5;
        let cool = (b + g * 0.3) / 1.3;
        out.push(warm as f32);
        out.push(cool as f32);

        let saturation: Vec<f64> = image.pixels().iter().map(|&p| saturation(p)).collect();
        out.push(mean(&saturation) as f32);
        out.push(std_dev(&saturation) as f32);

        out.push(color_complexity(image) as f32);
    }

    /// Mean of per-channel (max - min) / 255
    pub(crate) fn dynamic_range(&self) -> f64 {
        let ranges: Vec<f64> = self
            .channels
            .iter()
            .map(|c| {
                let (lo, hi) = c
                    .iter()
                    .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
                if c.is_empty() {
                    0.0
                } else {
                    (hi - lo) / CHANNEL_MAX
                }
            })
            .collect();
        mean(&ranges)
    }
}

/// `(max - min) / max` of one pixel, 0.0 for black
#[inline]
fn saturation([r, g, b]: [u8; 3]) -> f64 {
    let max = r.max(g).max(b) as f64;
    let min = r.min(g).min(b) as f64;
    if max > 0.0 {
        (max - min) / max
    } else {
        0.0
    }
}

/// Distinct colors over pixel count, capped at 1.0
fn color_complexity(image: &CanonicalImage) -> f64 {
    if image.is_empty() {
        return 0.0;
    }
    let distinct: AHashSet<[u8; 3]> = image.pixels().iter().copied().collect();
    (distinct.len() as f64 / image.pixel_count() as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(image: &CanonicalImage) -> Vec<f32> {
        let summary = ColorSummary::new(image);
        let mut out = Vec::new();
        summary.write_stats(&mut out);
        summary.write_histograms(&mut out);
        summary.write_brightness(&mut out);
        summary.write_tone(image, &mut out);
        out
    }

    #[test]
    fn test_group_sizes() {
        let image = CanonicalImage::solid(4, 4, [10, 20, 30]);
        assert_eq!(features(&image).len(), 6 + 15 + 2 + 8);
    }

    #[test]
    fn test_solid_red_image() {
        let image = CanonicalImage::solid(10, 10, [255, 0, 0]);
        let f = features(&image);

        assert!((f[0] - 1.0).abs() < 1e-6);
        assert_eq!(&f[3..6], &[0.0, 0.0, 0.0]);
        // red lands in the last bin, green and blue in the first
        assert_eq!(&f[6..11], &[0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(&f[11..16], &[1.0, 0.0, 0.0, 0.0, 0.0]);
        // red dominant only
        assert_eq!(&f[23..26], &[1.0, 0.0, 0.0]);
        // fully saturated, no spread
        assert!((f[28] - 1.0).abs() < 1e-6);
        assert_eq!(f[29], 0.0);
        // one color over 100 pixels
        assert!((f[30] - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_no_dominance_for_gray() {
        let image = CanonicalImage::solid(3, 3, [128, 128, 128]);
        let f = features(&image);
        assert_eq!(&f[23..26], &[0.0, 0.0, 0.0]);
        // gray is unsaturated
        assert_eq!(f[28], 0.0);
    }

    #[test]
    fn test_brightness_contrast() {
        let image = CanonicalImage::from_fn(2, 1, |x, _| if x == 0 { [0, 0, 0] } else { [255, 255, 255] });
        let f = features(&image);
        assert!((f[21] - 0.5).abs() < 1e-6);
        assert!((f[22] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_saturation_of_black_is_zero() {
        assert_eq!(saturation([0, 0, 0]), 0.0);
        assert!((saturation([200, 100, 100]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_dynamic_range() {
        let image = CanonicalImage::from_fn(2, 1, |x, _| if x == 0 { [0, 0, 0] } else { [255, 51, 0] });
        let summary = ColorSummary::new(&image);
        // (1.0 + 0.2 + 0.0) / 3
        assert!((summary.dynamic_range() - 0.4).abs() < 1e-12);
    }
}
