use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::{Arc, Mutex},
};

use clap::{Parser, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use video_to_frames::{
    DEFAULT_JPEG_QUALITY, DEFAULT_OUTPUT_ROOT_NAME, DEFAULT_RATE, DEFAULT_VIDEOS_DIR_NAME,
    ErrorKind, ExistingOutputPolicy, ExtractionConfig, ExtractionError, ExtractionReport,
    Extractor, FfmpegLogLevel, ProgressCallback, ProgressInfo, StopReason, VideoOutcome, batch,
};

const CLI_AFTER_HELP: &str = "Examples:\n  \
    video-to-frames                       # every video in ./videos beside the program\n  \
    video-to-frames clip.mp4 --rate 2     # two screenshots per second of one video\n  \
    video-to-frames --output frames --on-existing fail --strict --json";

const PROGRESS_TEMPLATE: &str = "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}";

const SEPARATOR: &str = "----------------------------------------";

/// Exit status when a video (or the batch directory) fails under `--strict`.
const EXIT_FAILURE: u8 = 1;
/// Exit status for unusable settings.
const EXIT_USAGE: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "video-to-frames",
    version,
    about = "Save still frames from videos at a fixed number of screenshots per second",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Video to extract. Without it, every video in the videos directory is processed.
    video: Option<PathBuf>,

    /// Screenshots per second of video.
    #[arg(long, env = "VIDEO_TO_FRAMES_RATE", default_value_t = DEFAULT_RATE)]
    rate: f64,

    /// Output root; each video gets a sub-directory named after it
    /// [default: outputfolder beside the program].
    #[arg(long, env = "VIDEO_TO_FRAMES_OUTPUT")]
    output: Option<PathBuf>,

    /// Directory scanned in batch mode [default: videos beside the program].
    #[arg(long, env = "VIDEO_TO_FRAMES_VIDEOS_DIR")]
    videos_dir: Option<PathBuf>,

    /// JPEG quality (1-100).
    #[arg(
        long,
        default_value_t = DEFAULT_JPEG_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    quality: u8,

    /// What to do with an output directory left by an earlier run.
    #[arg(long, value_enum, default_value_t = OnExisting::Prune)]
    on_existing: OnExisting,

    /// Exit with a non-zero status if any video fails.
    #[arg(long)]
    strict: bool,

    /// Print a machine-readable JSON summary instead of text.
    #[arg(long)]
    json: bool,

    /// Show a progress bar while extracting.
    #[arg(long)]
    progress: bool,

    /// Show debug logging.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, default_value = "error")]
    ffmpeg_log_level: FfmpegLogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OnExisting {
    /// Overwrite frames and delete numbered frames beyond this run's count.
    Prune,
    /// Overwrite frames and keep anything else.
    Overwrite,
    /// Refuse to write into a non-empty directory.
    Fail,
}

impl From<OnExisting> for ExistingOutputPolicy {
    fn from(value: OnExisting) -> Self {
        match value {
            OnExisting::Prune => ExistingOutputPolicy::PruneStale,
            OnExisting::Overwrite => ExistingOutputPolicy::Overwrite,
            OnExisting::Fail => ExistingOutputPolicy::FailIfNotEmpty,
        }
    }
}

/// One progress bar per video, created on the first saved frame.
#[derive(Default)]
struct TerminalProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
    fn finish(&self) {
        if let Ok(mut guard) = self.bar.lock()
            && let Some(bar) = guard.take()
        {
            bar.finish_and_clear();
        }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        let bar = guard.get_or_insert_with(|| {
            let bar = ProgressBar::new(info.total);
            if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
                bar.set_style(style.progress_chars("##-"));
            }
            let name = info
                .video
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            bar.set_message(name);
            bar
        });
        bar.set_position(info.current);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // Also routes `log` records from the library through tracing.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Directory holding the running executable.
fn program_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let executable = env::current_exe()?;
    Ok(executable
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default())
}

fn exit_code(any_failed: bool, strict: bool) -> u8 {
    if any_failed && strict { EXIT_FAILURE } else { 0 }
}

fn print_report(report: &ExtractionReport) {
    let directory = report.output_directory.display();
    if report.directory_created {
        println!("Created directory: {directory}");
    } else {
        println!("Output directory already exists: {directory}");
    }
    println!("Processing '{}'", report.file_name);
    println!("FPS: {}", report.metadata.frames_per_second);
    println!("Total Frames: {}", report.metadata.frame_count);
    println!("Duration: {:.2} seconds", report.metadata.duration_seconds());
    println!("Target: {} screenshot(s) per second", report.rate);

    if report.stop_reason == StopReason::DecodeStopped {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!(
                "stopped after {} of {} planned frames (frame could not be read)",
                report.saved_count, report.planned_count
            )
            .yellow()
        );
    }
    if report.pruned_count > 0 {
        println!("Removed {} stale image(s) from an earlier run", report.pruned_count);
    }

    println!(
        "{} {}",
        "Done!".green().bold(),
        format!("Saved {} images to '{directory}'.", report.saved_count).green()
    );
}

fn print_failure(path: &Path, error: &ExtractionError) {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    eprintln!(
        "{} {}",
        "error:".red().bold(),
        format!("Failed to process {name}: {error}").red()
    );
}

fn kind_name(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "not_found",
        ErrorKind::OpenFailed => "open_failed",
        ErrorKind::InvalidMetadata => "invalid_metadata",
        ErrorKind::DecodeFailure => "decode_failure",
        ErrorKind::Io => "io",
        ErrorKind::Configuration => "configuration",
    }
}

fn outcome_json(path: &Path, result: &Result<ExtractionReport, ExtractionError>) -> Value {
    match result {
        Ok(report) => json!({
            "path": path.display().to_string(),
            "ok": true,
            "output_directory": report.output_directory.display().to_string(),
            "fps": report.metadata.frames_per_second,
            "frame_count": report.metadata.frame_count,
            "duration_seconds": report.metadata.duration_seconds(),
            "planned_count": report.planned_count,
            "saved_count": report.saved_count,
            "stopped_early": (report.stop_reason == StopReason::DecodeStopped),
            "pruned_count": report.pruned_count,
        }),
        Err(error) => json!({
            "path": path.display().to_string(),
            "ok": false,
            "error_kind": kind_name(error.kind()),
            "error": error.to_string(),
        }),
    }
}

fn print_json(payload: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}

fn run_single(
    cli: &Cli,
    extractor: &Extractor,
    progress: Option<&TerminalProgress>,
    video: &Path,
) -> Result<u8, Box<dyn std::error::Error>> {
    let result = extractor.extract(video);
    if let Some(progress) = progress {
        progress.finish();
    }

    if cli.json {
        print_json(&outcome_json(video, &result))?;
    } else {
        match &result {
            Ok(report) => print_report(report),
            Err(error) => print_failure(video, error),
        }
    }

    Ok(exit_code(result.is_err(), cli.strict))
}

fn run_batch(
    cli: &Cli,
    extractor: &Extractor,
    progress: Option<&TerminalProgress>,
    videos_dir: &Path,
) -> Result<u8, Box<dyn std::error::Error>> {
    let videos = match batch::discover_videos(videos_dir, extractor.config()) {
        Ok(videos) => videos,
        Err(error) => {
            if cli.json {
                print_json(&json!({
                    "directory": videos_dir.display().to_string(),
                    "error_kind": kind_name(error.kind()),
                    "error": error.to_string(),
                    "videos": [],
                }))?;
            } else {
                match &error {
                    ExtractionError::NotFound { .. } => {
                        eprintln!(
                            "{} {}",
                            "error:".red().bold(),
                            format!("Could not find videos directory '{}'", videos_dir.display())
                                .red()
                        );
                        eprintln!(
                            "Place your videos in a '{DEFAULT_VIDEOS_DIR_NAME}' folder next to \
                             this program, or pass --videos-dir."
                        );
                    }
                    ExtractionError::NoVideosFound { .. } => {
                        println!("No video files found in '{}'.", videos_dir.display());
                    }
                    other => eprintln!("{} {other}", "error:".red().bold()),
                }
            }
            return Ok(exit_code(true, cli.strict));
        }
    };

    if !cli.json {
        println!(
            "Found {} videos in '{}'. Starting batch processing...",
            videos.len(),
            videos_dir.display()
        );
    }

    let report = batch::extract_all(extractor, videos, |outcome: &VideoOutcome| {
        if let Some(progress) = progress {
            progress.finish();
        }
        if cli.json {
            return;
        }
        println!("{SEPARATOR}");
        match &outcome.result {
            Ok(report) => print_report(report),
            Err(error) => print_failure(&outcome.path, error),
        }
    });

    if cli.json {
        let videos: Vec<Value> = report
            .outcomes
            .iter()
            .map(|outcome| outcome_json(&outcome.path, &outcome.result))
            .collect();
        print_json(&json!({
            "directory": videos_dir.display().to_string(),
            "succeeded": report.succeeded(),
            "failed": report.failed(),
            "total_frames_saved": report.total_frames_saved(),
            "videos": videos,
        }))?;
    } else {
        println!("{SEPARATOR}");
        let summary = format!(
            "Processed {} video(s): {} succeeded, {} failed, {} image(s) saved",
            report.outcomes.len(),
            report.succeeded(),
            report.failed(),
            report.total_frames_saved()
        );
        if report.is_success() {
            println!("{}", summary.green());
        } else {
            println!("{}", summary.yellow());
        }
    }

    Ok(exit_code(!report.is_success(), cli.strict))
}

fn run(cli: &Cli) -> Result<u8, Box<dyn std::error::Error>> {
    video_to_frames::set_ffmpeg_log_level(cli.ffmpeg_log_level);

    let base = program_dir()?;
    let output_root = cli
        .output
        .clone()
        .unwrap_or_else(|| base.join(DEFAULT_OUTPUT_ROOT_NAME));

    let progress = cli.progress.then(|| Arc::new(TerminalProgress::default()));

    let mut config = ExtractionConfig::new()
        .with_rate(cli.rate)
        .with_output_root(output_root)
        .with_jpeg_quality(cli.quality)
        .with_existing_output(cli.on_existing.into());
    if let Some(progress) = &progress {
        config = config.with_progress(progress.clone());
    }

    let extractor = Extractor::ffmpeg(config)?;

    match &cli.video {
        Some(video) => run_single(cli, &extractor, progress.as_deref(), video),
        None => {
            let videos_dir = cli
                .videos_dir
                .clone()
                .unwrap_or_else(|| base.join(DEFAULT_VIDEOS_DIR_NAME));
            run_batch(cli, &extractor, progress.as_deref(), &videos_dir)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            eprintln!("{} {error}", "error:".red().bold());
            ExitCode::from(EXIT_USAGE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_means_batch_mode_with_defaults() {
        let cli = Cli::try_parse_from(["video-to-frames"]).unwrap();
        assert!(cli.video.is_none());
        assert_eq!(cli.rate, 1.0);
        assert_eq!(cli.quality, 95);
        assert_eq!(cli.on_existing, OnExisting::Prune);
        assert_eq!(cli.ffmpeg_log_level, FfmpegLogLevel::Error);
        assert!(!cli.strict);
    }

    #[test]
    fn single_video_with_overrides() {
        let cli = Cli::try_parse_from([
            "video-to-frames",
            "clip.mp4",
            "--rate",
            "2.5",
            "--output",
            "frames",
            "--on-existing",
            "fail",
            "--ffmpeg-log-level",
            "quiet",
        ])
        .unwrap();
        assert_eq!(cli.video, Some(PathBuf::from("clip.mp4")));
        assert_eq!(cli.rate, 2.5);
        assert_eq!(cli.output, Some(PathBuf::from("frames")));
        assert_eq!(
            ExistingOutputPolicy::from(cli.on_existing),
            ExistingOutputPolicy::FailIfNotEmpty
        );
        assert_eq!(cli.ffmpeg_log_level, FfmpegLogLevel::Quiet);
    }

    #[test]
    fn quality_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["video-to-frames", "--quality", "0"]).is_err());
        assert!(Cli::try_parse_from(["video-to-frames", "--quality", "101"]).is_err());
        assert!(Cli::try_parse_from(["video-to-frames", "--ffmpeg-log-level", "loud"]).is_err());
    }

    #[test]
    fn failures_only_change_exit_code_when_strict() {
        assert_eq!(exit_code(false, false), 0);
        assert_eq!(exit_code(true, false), 0);
        assert_eq!(exit_code(false, true), 0);
        assert_eq!(exit_code(true, true), EXIT_FAILURE);
    }

    #[test]
    fn failure_json_carries_kind() {
        let error = ExtractionError::NotFound {
            path: PathBuf::from("gone.mp4"),
        };
        let value = outcome_json(Path::new("gone.mp4"), &Err(error));
        assert_eq!(value["ok"], json!(false));
        assert_eq!(value["error_kind"], json!("not_found"));
    }
}
