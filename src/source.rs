//! The media decoding collaborator.
//!
//! The extractor never talks to a decoder directly. It asks a
//! [`MediaBackend`] to open a path and drives the returned [`VideoSource`]
//! through absolute seeks and single-frame reads.
//! [`FfmpegBackend`](crate::FfmpegBackend) is the production implementation; tests
//! substitute their own.
//!
//! A source is released by dropping it. The extractor owns the boxed source
//! for exactly the span of one video, so every exit path releases it once.

use std::path::Path;

use image::DynamicImage;

use crate::{error::ExtractionError, metadata::VideoMetadata};

/// An opened video, positioned by frame number.
pub trait VideoSource {
    /// Timing and format metadata read when the source was opened.
    fn metadata(&self) -> &VideoMetadata;

    /// Position the source so the next [`read_frame`](VideoSource::read_frame)
    /// returns frame `frame_number` (zero-based).
    ///
    /// Seeks are absolute: any frame may follow any other.
    fn seek(&mut self, frame_number: u64) -> Result<(), ExtractionError>;

    /// Decode the frame at the current position and advance by one.
    ///
    /// Returns `Ok(None)` when the stream ends before a frame is produced.
    fn read_frame(&mut self) -> Result<Option<DynamicImage>, ExtractionError>;
}

/// Opens video files as [`VideoSource`]s.
pub trait MediaBackend {
    /// Open `path` for decoding.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::OpenFailed`] if the container or its video
    /// codec cannot be opened.
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, ExtractionError>;
}
