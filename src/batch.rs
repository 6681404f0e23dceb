//! Batch processing of a directory of videos.
//!
//! [`discover_videos`] lists the supported videos in a directory, sorted by
//! name, and [`extract_all`] runs an [`Extractor`] over each of them. A
//! failing video is recorded in the [`BatchReport`] and the batch moves on;
//! one bad file never stops the others.
//!
//! # Example
//!
//! ```no_run
//! use video_to_frames::{ExtractionConfig, ExtractionError, Extractor, batch};
//!
//! let extractor = Extractor::ffmpeg(ExtractionConfig::new())?;
//! let report = batch::run_batch(&extractor, "videos")?;
//! println!("{} ok, {} failed", report.succeeded(), report.failed());
//! # Ok::<(), ExtractionError>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    configuration::ExtractionConfig,
    error::ExtractionError,
    extractor::{ExtractionReport, Extractor},
    source::MediaBackend,
    writer::FrameWriter,
};

/// The outcome of one video in a batch.
#[derive(Debug)]
pub struct VideoOutcome {
    /// The video that was processed.
    pub path: PathBuf,
    /// What the extractor returned for it.
    pub result: Result<ExtractionReport, ExtractionError>,
}

impl VideoOutcome {
    /// Whether extraction succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of every video in a batch, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per discovered video.
    pub outcomes: Vec<VideoOutcome>,
}

impl BatchReport {
    /// Number of videos extracted without error.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_success()).count()
    }

    /// Number of videos that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Frames saved across all successful videos.
    pub fn total_frames_saved(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
            .map(|report| report.saved_count)
            .sum()
    }

    /// Whether every video succeeded.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// List the videos in `directory` whose extension is in the configured
/// allow-list, sorted by file name.
///
/// # Errors
///
/// - [`ExtractionError::NotFound`] if `directory` does not exist.
/// - [`ExtractionError::NoVideosFound`] if it holds no matching files.
/// - [`ExtractionError::Io`] if it cannot be listed.
pub fn discover_videos(
    directory: &Path,
    config: &ExtractionConfig,
) -> Result<Vec<PathBuf>, ExtractionError> {
    if !directory.is_dir() {
        return Err(ExtractionError::NotFound {
            path: directory.to_path_buf(),
        });
    }

    let mut videos = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() || !config.is_video_path(&path) {
            continue;
        }
        videos.push(path);
    }

    if videos.is_empty() {
        return Err(ExtractionError::NoVideosFound {
            directory: directory.to_path_buf(),
        });
    }

    videos.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    log::debug!("Found {} video(s) in {}", videos.len(), directory.display());
    Ok(videos)
}

/// Extract every video in `videos`, calling `on_outcome` as each finishes.
pub fn extract_all<B, W, I, F>(
    extractor: &Extractor<B, W>,
    videos: I,
    mut on_outcome: F,
) -> BatchReport
where
    B: MediaBackend,
    W: FrameWriter,
    I: IntoIterator<Item = PathBuf>,
    F: FnMut(&VideoOutcome),
{
    let mut report = BatchReport::default();

    for path in videos {
        let result = extractor.extract(&path);
        if let Err(error) = &result {
            log::warn!("Failed to process {}: {error}", path.display());
        }

        let outcome = VideoOutcome { path, result };
        on_outcome(&outcome);
        report.outcomes.push(outcome);
    }

    report
}

/// Discover and extract every video in `directory`.
///
/// # Errors
///
/// Only directory-level problems are returned (see [`discover_videos`]);
/// per-video failures are recorded in the report.
pub fn run_batch<B, W, P>(
    extractor: &Extractor<B, W>,
    directory: P,
) -> Result<BatchReport, ExtractionError>
where
    B: MediaBackend,
    W: FrameWriter,
    P: AsRef<Path>,
{
    let videos = discover_videos(directory.as_ref(), extractor.config())?;
    Ok(extract_all(extractor, videos, |_| {}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_filters_and_sorts() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        for name in ["b.MKV", "a.mp4", "notes.txt", "c.webm", "cover.jpg"] {
            fs::write(directory.path().join(name), b"x").unwrap();
        }
        fs::create_dir(directory.path().join("nested.mp4")).unwrap();

        let videos = discover_videos(directory.path(), &ExtractionConfig::new()).unwrap();
        let names: Vec<String> = videos
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.mp4", "b.MKV", "c.webm"]);
    }

    #[test]
    fn missing_directory_is_not_found() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let missing = directory.path().join("videos");
        let error = discover_videos(&missing, &ExtractionConfig::new()).unwrap_err();
        assert!(matches!(error, ExtractionError::NotFound { path } if path == missing));
    }

    #[test]
    fn directory_without_videos() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(directory.path().join("readme.md"), b"x").unwrap();
        let error = discover_videos(directory.path(), &ExtractionConfig::new()).unwrap_err();
        assert!(matches!(error, ExtractionError::NoVideosFound { .. }));
    }
}
