//! # video-to-frames
//!
//! Sample still frames from video files at a fixed rate and save them as
//! numbered JPEGs.
//!
//! Given a sampling rate in screenshots per second, every video is walked at
//! timestamps `0, 1/rate, 2/rate, …`. The frame nearest each timestamp is
//! decoded with FFmpeg (via
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next)) and written to
//! `<output_root>/<video_stem>/<n>.jpg`, with `n` counting up from 1.
//!
//! ## Quick Start
//!
//! ### One video
//!
//! ```no_run
//! use video_to_frames::{ExtractionConfig, Extractor};
//!
//! let extractor = Extractor::ffmpeg(ExtractionConfig::new()).unwrap();
//! let report = extractor.extract("input.mp4").unwrap();
//! println!("saved {} frames", report.saved_count);
//! ```
//!
//! ### A directory of videos
//!
//! ```no_run
//! use video_to_frames::{ExtractionConfig, Extractor, batch};
//!
//! let config = ExtractionConfig::new()
//!     .with_rate(0.5)
//!     .with_output_root("frames");
//! let extractor = Extractor::ffmpeg(config).unwrap();
//!
//! let report = batch::run_batch(&extractor, "videos").unwrap();
//! for outcome in &report.outcomes {
//!     match &outcome.result {
//!         Ok(video) => println!("{}: {} frames", video.file_name, video.saved_count),
//!         Err(error) => println!("{}: {error}", outcome.path.display()),
//!     }
//! }
//! ```
//!
//! ## Behaviour
//!
//! - Extraction is sequential: one video at a time, one frame at a time.
//! - A frame that cannot be decoded ends that video early; frames saved so
//!   far are kept and the count is reported normally.
//! - In batch mode each video succeeds or fails on its own.
//! - Output directories are reused on rerun. By default numbered frames left
//!   over from a longer earlier run are pruned (see
//!   [`ExistingOutputPolicy`]).
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod batch;
pub mod configuration;
mod conversion;
pub mod decoder;
pub mod error;
pub mod extractor;
pub mod ffmpeg;
pub mod metadata;
pub mod output;
pub mod progress;
pub mod sampling;
pub mod source;
pub mod writer;

pub use batch::{BatchReport, VideoOutcome};
pub use configuration::{
    DEFAULT_JPEG_QUALITY, DEFAULT_OUTPUT_ROOT_NAME, DEFAULT_RATE, DEFAULT_VIDEOS_DIR_NAME,
    ExistingOutputPolicy, ExtractionConfig, VIDEO_EXTENSIONS,
};
pub use decoder::{FfmpegBackend, FfmpegSource};
pub use error::{ErrorKind, ExtractionError};
pub use extractor::{ExtractionReport, Extractor, StopReason};
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use metadata::VideoMetadata;
pub use output::OutputDirectory;
pub use progress::{ProgressCallback, ProgressInfo};
pub use sampling::{SamplePoint, SamplingPlan};
pub use source::{MediaBackend, VideoSource};
pub use writer::{FrameWriter, JpegWriter};
