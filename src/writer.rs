//! The image encoding collaborator.
//!
//! [`FrameWriter`] encodes one decoded frame to a path. [`JpegWriter`] is the
//! production implementation: baseline JPEG at a configurable quality.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use image::{DynamicImage, ImageError, codecs::jpeg::JpegEncoder};

use crate::error::ExtractionError;

/// Encodes and writes extracted frames.
pub trait FrameWriter {
    /// Encode `image` and write it to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::ImageWrite`] if the file cannot be created
    /// or the image cannot be encoded.
    fn write(&self, image: &DynamicImage, path: &Path) -> Result<(), ExtractionError>;
}

/// Writes frames as JPEG files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegWriter {
    quality: u8,
}

impl JpegWriter {
    /// Create a writer with the given quality, clamped to `1..=100`.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// The JPEG quality in use.
    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegWriter {
    fn default() -> Self {
        Self::new(crate::configuration::DEFAULT_JPEG_QUALITY)
    }
}

impl FrameWriter for JpegWriter {
    fn write(&self, image: &DynamicImage, path: &Path) -> Result<(), ExtractionError> {
        let image_write = |source: ImageError| ExtractionError::ImageWrite {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(|error| image_write(ImageError::IoError(error)))?;
        let mut output = BufWriter::new(file);

        // JPEG has no alpha channel.
        let rgb = image.to_rgb8();
        JpegEncoder::new_with_quality(&mut output, self.quality)
            .encode_image(&rgb)
            .map_err(image_write)?;
        output
            .flush()
            .map_err(|error| image_write(ImageError::IoError(error)))?;

        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}
