//! Single-video frame extraction.
//!
//! [`Extractor`] runs the whole pipeline for one video:
//!
//! 1. check the input exists,
//! 2. prepare `<output_root>/<stem>/`,
//! 3. open the video through a [`MediaBackend`],
//! 4. validate the frame rate,
//! 5. walk the [`SamplingPlan`], seeking and decoding one frame per point,
//! 6. write each frame as `<n>.jpg`, numbering densely from 1.
//!
//! A frame that cannot be read ends the video early; it is not an error.
//! The opened source is dropped, and so released, on every return path.
//!
//! # Example
//!
//! ```no_run
//! use video_to_frames::{ExtractionConfig, ExtractionError, Extractor};
//!
//! let extractor = Extractor::ffmpeg(ExtractionConfig::new().with_rate(2.0))?;
//! let report = extractor.extract("input.mp4")?;
//! println!("saved {} frames to {}", report.saved_count, report.output_directory.display());
//! # Ok::<(), ExtractionError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::{
    configuration::{ExistingOutputPolicy, ExtractionConfig},
    decoder::FfmpegBackend,
    error::ExtractionError,
    metadata::VideoMetadata,
    output::OutputDirectory,
    progress::ProgressTracker,
    sampling::SamplingPlan,
    source::MediaBackend,
    writer::{FrameWriter, JpegWriter},
};

/// Why the sampling loop for a video ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every point of the sampling plan was saved.
    EndOfPlan,
    /// A seek or decode failed (or the stream ended early) before the plan
    /// was exhausted.
    DecodeStopped,
}

/// Outcome of extracting one video.
#[derive(Debug, Clone)]
#[must_use]
pub struct ExtractionReport {
    /// The video that was processed.
    pub video_path: PathBuf,
    /// The video's file name, for display.
    pub file_name: String,
    /// Directory the frames were written to.
    pub output_directory: PathBuf,
    /// Whether the output directory was created by this run.
    pub directory_created: bool,
    /// Metadata reported by the decoder.
    pub metadata: VideoMetadata,
    /// Sampling rate used, in screenshots per second.
    pub rate: f64,
    /// Number of frames the sampling plan asked for.
    pub planned_count: u64,
    /// Number of frames written (`1.jpg ..= <saved_count>.jpg`).
    pub saved_count: u64,
    /// Why extraction stopped.
    pub stop_reason: StopReason,
    /// Stale frames from an earlier run that were removed.
    pub pruned_count: u64,
}

/// Extracts frames from videos according to an [`ExtractionConfig`].
///
/// The media backend and the frame writer are pluggable; [`Extractor::ffmpeg`]
/// wires up FFmpeg decoding and JPEG output.
#[derive(Debug)]
pub struct Extractor<B = FfmpegBackend, W = JpegWriter> {
    config: ExtractionConfig,
    backend: B,
    writer: W,
}

impl Extractor<FfmpegBackend, JpegWriter> {
    /// An extractor that decodes with FFmpeg and writes JPEGs at the
    /// configured quality.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::InvalidRate`] if the configuration is
    /// invalid.
    pub fn ffmpeg(config: ExtractionConfig) -> Result<Self, ExtractionError> {
        let writer = JpegWriter::new(config.jpeg_quality);
        Self::new(config, FfmpegBackend::new(), writer)
    }
}

impl<B: MediaBackend, W: FrameWriter> Extractor<B, W> {
    /// Build an extractor from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::InvalidRate`] if the configuration is
    /// invalid.
    pub fn new(config: ExtractionConfig, backend: B, writer: W) -> Result<Self, ExtractionError> {
        config.validate()?;
        Ok(Self {
            config,
            backend,
            writer,
        })
    }

    /// The configuration this extractor runs with.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract frames from one video.
    ///
    /// # Errors
    ///
    /// - [`ExtractionError::NotFound`] if `video_path` is not an existing
    ///   file. Nothing is created in that case.
    /// - [`ExtractionError::CreateDirectory`] or
    ///   [`ExtractionError::OutputNotEmpty`] if the output directory cannot
    ///   be used.
    /// - [`ExtractionError::OpenFailed`] if the video cannot be opened.
    /// - [`ExtractionError::InvalidMetadata`] if the frame rate is zero or
    ///   unreadable. No frames are written.
    /// - [`ExtractionError::ImageWrite`] if a frame cannot be saved. Frames
    ///   saved before the failure stay on disk.
    pub fn extract<P: AsRef<Path>>(
        &self,
        video_path: P,
    ) -> Result<ExtractionReport, ExtractionError> {
        let video_path = video_path.as_ref();
        if !video_path.is_file() {
            return Err(ExtractionError::NotFound {
                path: video_path.to_path_buf(),
            });
        }

        let file_name = video_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| video_path.display().to_string());

        let output = OutputDirectory::prepare(
            &self.config.output_root,
            video_path,
            self.config.existing_output,
        )?;
        if output.was_created() {
            log::info!("Created directory: {}", output.path().display());
        } else {
            log::info!("Output directory already exists: {}", output.path().display());
        }

        let mut source = self.backend.open(video_path)?;
        let metadata = source.metadata().clone();
        if !metadata.has_usable_frame_rate() {
            return Err(ExtractionError::InvalidMetadata {
                path: video_path.to_path_buf(),
                reason: format!(
                    "frame rate is {}, cannot map timestamps to frames",
                    metadata.frames_per_second
                ),
            });
        }

        log::info!(
            "Processing '{file_name}': {:.3} fps, {} frames, {:.2} s, {} screenshot(s) per second",
            metadata.frames_per_second,
            metadata.frame_count,
            metadata.duration_seconds(),
            self.config.rate,
        );

        let plan = SamplingPlan::new(
            self.config.rate,
            metadata.frames_per_second,
            metadata.frame_count,
        );
        let planned_count = plan.len();
        let mut tracker =
            ProgressTracker::new(self.config.progress.clone(), video_path, planned_count);

        let mut saved_count = 0_u64;
        let mut stop_reason = StopReason::EndOfPlan;

        for point in &plan {
            if let Err(error) = source.seek(point.frame_number) {
                log::warn!(
                    "'{file_name}': seek to frame {} failed, stopping: {error}",
                    point.frame_number
                );
                stop_reason = StopReason::DecodeStopped;
                break;
            }

            let image = match source.read_frame() {
                Ok(Some(image)) => image,
                Ok(None) => {
                    log::debug!(
                        "'{file_name}': stream ended before frame {}",
                        point.frame_number
                    );
                    stop_reason = StopReason::DecodeStopped;
                    break;
                }
                Err(error) => {
                    log::warn!(
                        "'{file_name}': could not read frame {}, stopping: {error}",
                        point.frame_number
                    );
                    stop_reason = StopReason::DecodeStopped;
                    break;
                }
            };

            let frame_path = output.frame_path(saved_count + 1);
            self.writer.write(&image, &frame_path)?;
            saved_count += 1;
            tracker.advance(point.frame_number, point.timestamp());
        }

        drop(source);

        let pruned_count = match self.config.existing_output {
            ExistingOutputPolicy::PruneStale if !output.was_created() => {
                output.prune_stale(saved_count)?
            }
            _ => 0,
        };
        if pruned_count > 0 {
            log::info!("'{file_name}': removed {pruned_count} stale frame(s) from an earlier run");
        }

        log::info!(
            "Done! Saved {saved_count} images to '{}'.",
            output.path().display()
        );

        Ok(ExtractionReport {
            video_path: video_path.to_path_buf(),
            file_name,
            output_directory: output.path().to_path_buf(),
            directory_created: output.was_created(),
            metadata,
            rate: self.config.rate,
            planned_count,
            saved_count,
            stop_reason,
            pruned_count,
        })
    }
}
