//! Codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the three codec operations the pipeline
//! needs from outside: decode, read the orientation tag, and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the mock below.

use super::buffer::PixelBuffer;
use super::orientation::OrientationCode;
use super::params::Quality;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Container format for exported images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Trait for codec backends.
///
/// `Sync` so batch export can share one backend across rayon workers.
pub trait ImageBackend: Sync {
    /// Decode compressed bytes into a live RGBA8 buffer.
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, BackendError>;

    /// Orientation tag of the encoded image. Missing or unreadable metadata
    /// is [`OrientationCode::NORMAL`], never an error.
    fn read_orientation(&self, bytes: &[u8]) -> OrientationCode;

    /// Encode a live buffer.
    fn encode(
        &self,
        buffer: &PixelBuffer,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}
