//! Error types for the `video-to-frames` crate.
//!
//! [`ExtractionError`] is the single error type returned by every fallible
//! operation. Variants carry the path involved so a batch summary can say
//! which file failed and why without extra bookkeeping at the call site.
//! [`ErrorKind`] collapses the variants into the coarse categories reported
//! to users.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for frame extraction.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractionError {
    /// The input video (or the batch input directory) does not exist.
    #[error("File not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The decoder could not open the container or its video codec.
    #[error("Could not open video {}: {reason}", path.display())]
    OpenFailed {
        /// Path that was passed to the media backend.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The video reports unusable timing metadata (e.g. a frame rate of 0).
    #[error("Invalid metadata in {}: {reason}", path.display())]
    InvalidMetadata {
        /// Path of the offending video.
        path: PathBuf,
        /// What was wrong with the metadata.
        reason: String,
    },

    /// A frame could not be read. The extractor treats this as the end of
    /// the video; it is only surfaced by [`VideoSource`](crate::VideoSource)
    /// implementations.
    #[error("Failed to decode video frame: {0}")]
    DecodeFailure(String),

    /// The per-video output directory could not be created.
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDirectory {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: IoError,
    },

    /// An extracted frame could not be encoded or written.
    #[error("Failed to write image {}: {source}", path.display())]
    ImageWrite {
        /// Destination of the image.
        path: PathBuf,
        /// Underlying encoder error.
        source: ImageError,
    },

    /// The output directory already holds files and the configured policy
    /// forbids writing into it.
    #[error("Output directory {} is not empty", path.display())]
    OutputNotEmpty {
        /// The non-empty directory.
        path: PathBuf,
    },

    /// A batch directory exists but contains no supported videos.
    #[error("No video files found in {}", directory.display())]
    NoVideosFound {
        /// Directory that was scanned.
        directory: PathBuf,
    },

    /// The sampling rate is not a positive, finite number.
    #[error("Sampling rate must be a positive number of screenshots per second, got {0}")]
    InvalidRate(f64),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// Any other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

/// Coarse classification of an [`ExtractionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing input file or missing batch directory.
    NotFound,
    /// The container or codec could not be opened.
    OpenFailed,
    /// Zero or unreadable frame rate.
    InvalidMetadata,
    /// A frame could not be decoded.
    DecodeFailure,
    /// Directory creation, file listing, or image write failure.
    Io,
    /// The extraction was configured with unusable settings.
    Configuration,
}

impl ExtractionError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::NotFound { .. } | ExtractionError::NoVideosFound { .. } => {
                ErrorKind::NotFound
            }
            ExtractionError::OpenFailed { .. } => ErrorKind::OpenFailed,
            ExtractionError::InvalidMetadata { .. } => ErrorKind::InvalidMetadata,
            ExtractionError::DecodeFailure(_) | ExtractionError::Ffmpeg(_) => {
                ErrorKind::DecodeFailure
            }
            ExtractionError::CreateDirectory { .. }
            | ExtractionError::ImageWrite { .. }
            | ExtractionError::OutputNotEmpty { .. }
            | ExtractionError::Io(_) => ErrorKind::Io,
            ExtractionError::InvalidRate(_) => ErrorKind::Configuration,
        }
    }
}

impl From<FfmpegError> for ExtractionError {
    fn from(error: FfmpegError) -> Self {
        ExtractionError::Ffmpeg(error.to_string())
    }
}
