//! FFmpeg decoding against real files.
//!
//! Tests that need a video require fixture files from
//! `tests/fixtures/generate_fixtures.sh` and skip when they are missing.

use std::{collections::HashMap, fs, path::Path};

use video_to_frames::{
    ErrorKind, ExtractionConfig, Extractor, FfmpegSource, SamplingPlan, StopReason, VideoSource,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";
const SLOW_VIDEO: &str = "tests/fixtures/slow_video.avi";

fn fixture(path: &str) -> Option<&Path> {
    let path = Path::new(path);
    path.exists().then_some(path)
}

#[test]
fn open_nonexistent_file() {
    let result = FfmpegSource::open("this_file_does_not_exist.mp4");
    let error = result.err().expect("missing file must not open");
    assert_eq!(error.kind(), ErrorKind::OpenFailed);
}

#[test]
fn open_invalid_file() {
    let workspace = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid = workspace.path().join("invalid.mp4");
    fs::write(&invalid, b"this is not a media file").expect("Failed to write invalid file");

    let error = FfmpegSource::open(&invalid).err().expect("garbage must not open");
    assert_eq!(error.kind(), ErrorKind::OpenFailed);
}

#[test]
fn invalid_file_in_extractor_leaves_empty_directory() {
    let workspace = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid = workspace.path().join("corrupt.mp4");
    fs::write(&invalid, b"\x00\x01\x02 definitely not mp4").unwrap();
    let output_root = workspace.path().join("out");

    let extractor =
        Extractor::ffmpeg(ExtractionConfig::new().with_output_root(&output_root)).unwrap();
    let error = extractor.extract(&invalid).expect_err("corrupt file must fail");

    assert_eq!(error.kind(), ErrorKind::OpenFailed);
    assert!(output_root.join("corrupt").is_dir());
    assert_eq!(fs::read_dir(output_root.join("corrupt")).unwrap().count(), 0);
}

#[test]
fn sample_video_metadata() {
    let Some(path) = fixture(SAMPLE_VIDEO) else {
        return;
    };

    let source = FfmpegSource::open(path).expect("Failed to open test video");
    let metadata = source.metadata();
    assert_eq!((metadata.width, metadata.height), (640, 480));
    assert!((metadata.frames_per_second - 30.0).abs() < 0.01);
    assert!(
        (149..=151).contains(&metadata.frame_count),
        "unexpected frame count {}",
        metadata.frame_count
    );
}

#[test]
fn seek_returns_the_exact_requested_frame() {
    let Some(path) = fixture(SAMPLE_VIDEO) else {
        return;
    };

    // Reference pixels from one uninterrupted pass from the start.
    let wanted = [0_u64, 3, 4, 30, 90, 120];
    let mut reference = HashMap::new();
    let mut sequential = FfmpegSource::open(path).expect("Failed to open test video");
    for frame_number in 0..=120 {
        let image = sequential
            .read_frame()
            .expect("read")
            .unwrap_or_else(|| panic!("frame {frame_number} missing"));
        if wanted.contains(&frame_number) {
            reference.insert(frame_number, image.into_bytes());
        }
    }

    // A long jump, a backward seek, a near-forward step, a skip within the
    // forward window, another long jump, and back to the start.
    let mut source = FfmpegSource::open(path).expect("Failed to open test video");
    for frame_number in [90, 3, 4, 30, 120, 0] {
        source.seek(frame_number).expect("seek");
        let image = source
            .read_frame()
            .expect("read")
            .unwrap_or_else(|| panic!("frame {frame_number} missing"));
        assert_eq!((image.width(), image.height()), (640, 480));
        assert!(
            image.as_bytes() == reference[&frame_number].as_slice(),
            "seek to frame {frame_number} returned different pixels"
        );
    }
}

#[test]
fn reading_past_the_end_yields_none() {
    let Some(path) = fixture(SAMPLE_VIDEO) else {
        return;
    };

    let mut source = FfmpegSource::open(path).expect("Failed to open test video");
    source.seek(10_000).expect("seek past the end");
    assert!(source.read_frame().expect("read").is_none());
}

#[test]
fn extracts_one_frame_per_second() {
    let Some(path) = fixture(SAMPLE_VIDEO) else {
        return;
    };

    let workspace = tempfile::tempdir().expect("Failed to create temp dir");
    let output_root = workspace.path().join("outputfolder");
    let extractor =
        Extractor::ffmpeg(ExtractionConfig::new().with_output_root(&output_root)).unwrap();

    let report = extractor.extract(path).expect("extraction");

    assert_eq!(report.saved_count, 5);
    assert_eq!(report.stop_reason, StopReason::EndOfPlan);
    for n in 1..=5 {
        let image = image::open(output_root.join("sample_video").join(format!("{n}.jpg")))
            .expect("saved frame should be a readable JPEG");
        assert_eq!((image.width(), image.height()), (640, 480));
    }
    assert!(!output_root.join("sample_video").join("6.jpg").exists());
}

#[test]
fn slow_video_saves_the_planned_count() {
    let Some(path) = fixture(SLOW_VIDEO) else {
        return;
    };

    let workspace = tempfile::tempdir().expect("Failed to create temp dir");
    let extractor = Extractor::ffmpeg(
        ExtractionConfig::new()
            .with_rate(0.5)
            .with_output_root(workspace.path()),
    )
    .unwrap();

    let report = extractor.extract(path).expect("extraction");
    let plan = SamplingPlan::new(
        0.5,
        report.metadata.frames_per_second,
        report.metadata.frame_count,
    );
    assert_eq!(report.planned_count, plan.len());
    assert_eq!(report.saved_count, plan.len());
}
