//! Progress reporting.
//!
//! The extractor fires a [`ProgressCallback`] after every saved frame so a
//! front end can drive a progress bar. Callbacks observe only; they cannot
//! stop an extraction.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use video_to_frames::{
//!     ExtractionConfig, ExtractionError, Extractor, ProgressCallback, ProgressInfo,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("{}: {pct:.1}%", info.video.display());
//!         }
//!     }
//! }
//!
//! let config = ExtractionConfig::new().with_progress(Arc::new(PrintProgress));
//! let extractor = Extractor::ffmpeg(config)?;
//! extractor.extract("input.mp4")?;
//! # Ok::<(), ExtractionError>(())
//! ```

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

/// A snapshot of extraction progress for one video.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// The video being extracted.
    pub video: PathBuf,
    /// Frames saved so far.
    pub current: u64,
    /// Frames the sampling plan expects to save.
    pub total: u64,
    /// Completion percentage (0.0 – 100.0), if `total` is non-zero.
    pub percentage: Option<f32>,
    /// Wall-clock time since extraction of this video started.
    pub elapsed: Duration,
    /// Source frame number of the frame just saved.
    pub frame_number: u64,
    /// Target timestamp of the frame just saved.
    pub timestamp: Duration,
}

/// Receives progress updates during extraction.
pub trait ProgressCallback: Send + Sync {
    /// Called once per saved frame.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards every notification. This is the default.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks timing for one video and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    video: PathBuf,
    total: u64,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, video: &Path, total: u64) -> Self {
        Self {
            callback,
            video: video.to_path_buf(),
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one saved frame and notify the callback.
    pub(crate) fn advance(&mut self, frame_number: u64, timestamp: Duration) {
        self.current += 1;

        let percentage = (self.total > 0)
            .then(|| (self.current as f32 / self.total as f32 * 100.0).min(100.0));

        let info = ProgressInfo {
            video: self.video.clone(),
            current: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
            frame_number,
            timestamp,
        };

        self.callback.on_progress(&info);
    }
}
