//! Image preprocessing
//!
//! Brings an arbitrary decoded image into canonical form: RGB8 pixels with
//! the longest side bounded by `max_dimension` (224 by default). Images are
//! only ever downscaled, with a Lanczos3 filter, and keep their aspect ratio.

use crate::error::{Result, VisionError};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader, RgbImage};
use std::path::Path;
use tracing::debug;

/// Default bound on the longest side of a canonical image
pub const MAX_DIMENSION: u32 = 224;

/// An RGB image ready for feature extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalImage {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl CanonicalImage {
    /// Wrap a row-major pixel buffer as-is (no resizing)
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[u8; 3]>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(VisionError::InvalidPixels {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels })
    }

    /// Build an image by evaluating `f(x, y)` for every pixel
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> [u8; 3],
    {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self { width, height, pixels }
    }

    /// A single-color image
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::from_fn(width, height, |_, _| rgb)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.pixels
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel at column `x`, row `y`
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Width over height, 1.0 for a zero-height image
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f64 / self.height as f64
        }
    }
}

impl From<RgbImage> for CanonicalImage {
    fn from(rgb: RgbImage) -> Self {
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .into_raw()
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        Self { width, height, pixels }
    }
}

/// Decodes and normalizes images
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    max_dimension: u32,
    filter: FilterType,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(MAX_DIMENSION)
    }
}

impl Preprocessor {
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
            filter: FilterType::Lanczos3,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Decode raw image bytes, guessing the format from its signature
    pub fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        Ok(image::load_from_memory(bytes)?)
    }

    /// Open and decode an image file
    pub fn open(&self, path: &Path) -> Result<DynamicImage> {
        let io_err = |source| VisionError::Io {
            path: path.to_path_buf(),
            source,
        };
        let reader = ImageReader::open(path)
            .map_err(io_err)?
            .with_guessed_format()
            .map_err(io_err)?;
        Ok(reader.decode()?)
    }

    /// Dimensions after bounding the longest side, never larger than the input
    ///
    /// An image with a zero-length side has no pixels to resample and keeps its size.
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width == 0 || height == 0 {
            return (width, height);
        }
        if width <= self.max_dimension && height <= self.max_dimension {
            return (width, height);
        }

        let scale = self.max_dimension as f64 / width.max(height) as f64;
        let scaled = |side: u32| {
            ((side as f64 * scale).round() as u32).clamp(1, self.max_dimension)
        };
        (scaled(width), scaled(height))
    }

    /// Convert to RGB8 and downscale so the longest side fits `max_dimension`
    pub fn canonicalize(&self, image: &DynamicImage) -> CanonicalImage {
        let (width, height) = image.dimensions();
        let (target_w, target_h) = self.target_dimensions(width, height);

        if (target_w, target_h) == (width, height) {
            return CanonicalImage::from(image.to_rgb8());
        }

        debug!(width, height, target_w, target_h, "downscaling image");
        let resized = image.resize_exact(target_w, target_h, self.filter);
        CanonicalImage::from(resized.to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Luma, Rgb};
    use std::io::Cursor;

    fn encode_png(image: &DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_downscale_preserves_aspect_ratio() {
        let preprocessor = Preprocessor::default();
        let image = DynamicImage::new_rgb8(640, 480);
        let canonical = preprocessor.canonicalize(&image);

        assert_eq!(canonical.width(), 224);
        assert_eq!(canonical.height(), 168);
        assert_eq!(canonical.pixel_count(), 224 * 168);
    }

    #[test]
    fn test_tall_image_bounded_by_height() {
        let preprocessor = Preprocessor::default();
        assert_eq!(preprocessor.target_dimensions(300, 900), (75, 224));
        assert_eq!(preprocessor.target_dimensions(5000, 10), (224, 1));
    }

    #[test]
    fn test_empty_side_is_not_resized() {
        let preprocessor = Preprocessor::default();
        assert_eq!(preprocessor.target_dimensions(0, 500), (0, 500));
        assert_eq!(preprocessor.target_dimensions(900, 0), (900, 0));
        assert!(preprocessor.canonicalize(&DynamicImage::new_rgb8(0, 500)).is_empty());
        assert!(preprocessor.canonicalize(&DynamicImage::new_rgb8(900, 0)).is_empty());
    }

    #[test]
    fn test_custom_filter_still_bounds_size() {
        let preprocessor = Preprocessor::new(32).with_filter(FilterType::Nearest);
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(128, 64, Rgb([5, 6, 7])));
        let canonical = preprocessor.canonicalize(&image);

        assert_eq!((canonical.width(), canonical.height()), (32, 16));
        assert!(canonical.pixels().iter().all(|&p| p == [5, 6, 7]));
    }

    #[test]
    fn test_small_image_is_never_upscaled() {
        let preprocessor = Preprocessor::default();
        let image = DynamicImage::new_rgb8(40, 30);
        let canonical = preprocessor.canonicalize(&image);

        assert_eq!((canonical.width(), canonical.height()), (40, 30));
    }

    #[test]
    fn test_grayscale_converted_to_rgb() {
        let gray = image::GrayImage::from_pixel(4, 4, Luma([77u8]));
        let canonical = Preprocessor::default().canonicalize(&DynamicImage::ImageLuma8(gray));

        assert!(canonical.pixels().iter().all(|&p| p == [77, 77, 77]));
    }

    #[test]
    fn test_decode_png_bytes() {
        let rgb = RgbImage::from_pixel(8, 6, Rgb([10, 20, 30]));
        let bytes = encode_png(&DynamicImage::ImageRgb8(rgb));

        let preprocessor = Preprocessor::default();
        let decoded = preprocessor.decode(&bytes).unwrap();
        let canonical = preprocessor.canonicalize(&decoded);

        assert_eq!((canonical.width(), canonical.height()), (8, 6));
        assert_eq!(canonical.pixel(3, 2), [10, 20, 30]);
    }

    #[test]
    fn test_corrupt_bytes_are_a_decode_error() {
        let preprocessor = Preprocessor::default();
        assert!(matches!(
            preprocessor.decode(b"definitely not an image"),
            Err(VisionError::Decode(_))
        ));
        assert!(matches!(preprocessor.decode(&[]), Err(VisionError::Decode(_))));
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let preprocessor = Preprocessor::default();
        let result = preprocessor.open(Path::new("/nonexistent/vismatch/image.png"));
        assert!(matches!(result, Err(VisionError::Io { .. })));
    }

    #[test]
    fn test_from_pixels_checks_length() {
        assert!(CanonicalImage::from_pixels(2, 2, vec![[0, 0, 0]; 4]).is_ok());
        assert!(matches!(
            CanonicalImage::from_pixels(2, 2, vec![[0, 0, 0]; 3]),
            Err(VisionError::InvalidPixels { expected: 4, actual: 3, .. })
        ));
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let image = CanonicalImage::from_fn(3, 2, |x, y| [x as u8, y as u8, 0]);
        assert_eq!(image.pixels()[4], [1, 1, 0]);
        assert_eq!(image.pixel(2, 1), [2, 1, 0]);
        assert!((image.aspect_ratio() - 1.5).abs() < 1e-12);
    }
}
