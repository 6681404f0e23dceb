//! Extraction configuration.
//!
//! [`ExtractionConfig`] carries every tunable of an extraction run: the
//! sampling rate, where output goes, JPEG quality, what to do with output
//! left over from earlier runs, which file extensions count as videos in
//! batch mode, and an optional progress callback. It is built once and
//! handed to [`Extractor::new`](crate::Extractor::new).
//!
//! # Example
//!
//! ```
//! use video_to_frames::{ExistingOutputPolicy, ExtractionConfig};
//!
//! let config = ExtractionConfig::new()
//!     .with_rate(2.0)
//!     .with_output_root("frames")
//!     .with_jpeg_quality(85)
//!     .with_existing_output(ExistingOutputPolicy::Overwrite);
//! assert!(config.validate().is_ok());
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    error::ExtractionError,
    progress::{NoOpProgress, ProgressCallback},
};

/// Default sampling rate, in screenshots per second.
pub const DEFAULT_RATE: f64 = 1.0;

/// Default name of the directory that receives one sub-directory per video.
pub const DEFAULT_OUTPUT_ROOT_NAME: &str = "outputfolder";

/// Default name of the directory scanned in batch mode.
pub const DEFAULT_VIDEOS_DIR_NAME: &str = "videos";

/// Default JPEG quality (matches OpenCV's `imwrite` default).
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Container extensions picked up in batch mode (compared case-insensitively).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "flv", "wmv", "webm"];

/// What to do when a video's output directory already has content.
///
/// Frames are always written as `1.jpg`, `2.jpg`, … so a rerun overwrites
/// same-numbered files. The policies differ in how they treat files past
/// the new run's last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistingOutputPolicy {
    /// Overwrite same-numbered frames; leave any higher-numbered frames from
    /// an earlier, longer run in place.
    Overwrite,
    /// Overwrite same-numbered frames, then delete numbered frames beyond
    /// the count saved by this run. Files not named `<n>.jpg` are kept.
    #[default]
    PruneStale,
    /// Refuse to write into a directory that already contains anything.
    FailIfNotEmpty,
}

/// Configuration for an extraction run.
#[derive(Clone)]
pub struct ExtractionConfig {
    pub(crate) rate: f64,
    pub(crate) output_root: PathBuf,
    pub(crate) jpeg_quality: u8,
    pub(crate) existing_output: ExistingOutputPolicy,
    pub(crate) extensions: Vec<String>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for ExtractionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractionConfig")
            .field("rate", &self.rate)
            .field("output_root", &self.output_root)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("existing_output", &self.existing_output)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionConfig {
    /// Create a configuration with the default settings.
    ///
    /// Defaults: one screenshot per second into `outputfolder`, JPEG quality
    /// 95, [`ExistingOutputPolicy::PruneStale`], the standard extension
    /// allow-list, and no progress callback.
    pub fn new() -> Self {
        Self {
            rate: DEFAULT_RATE,
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT_NAME),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            existing_output: ExistingOutputPolicy::default(),
            extensions: VIDEO_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Set the sampling rate in screenshots per second.
    #[must_use]
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Set the directory that receives one sub-directory per video.
    #[must_use]
    pub fn with_output_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.output_root = root.into();
        self
    }

    /// Set the JPEG quality, clamped to `1..=100`.
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Set the policy for output directories that already have content.
    #[must_use]
    pub fn with_existing_output(mut self, policy: ExistingOutputPolicy) -> Self {
        self.existing_output = policy;
        self
    }

    /// Replace the batch-mode extension allow-list.
    ///
    /// Leading dots are stripped and matching is case-insensitive.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Attach a progress callback, fired after every saved frame.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Sampling rate in screenshots per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Directory that receives one sub-directory per video.
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// JPEG quality used when saving frames.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Policy for output directories that already have content.
    pub fn existing_output(&self) -> ExistingOutputPolicy {
        self.existing_output
    }

    /// Extensions recognised as videos in batch mode.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether `path` has one of the configured video extensions.
    pub fn is_video_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }

    /// Check the settings before any work starts.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::InvalidRate`] if the rate is not a
    /// positive, finite number.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(ExtractionError::InvalidRate(self.rate));
        }
        Ok(())
    }
}
