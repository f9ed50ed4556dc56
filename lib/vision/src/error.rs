use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VisionError>;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Pixel buffer holds {actual} pixels, expected {expected} for {width}x{height}")]
    InvalidPixels {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}
