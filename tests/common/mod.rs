//! A scripted media backend for integration tests.
//!
//! [`FakeBackend`] serves synthetic videos keyed by file name and records
//! every open, seek and release in a shared [`Journal`] so tests can check
//! how the extractor drove it.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use image::{DynamicImage, Rgb, RgbImage};
use video_to_frames::{ExtractionError, MediaBackend, VideoMetadata, VideoSource};

/// A synthetic video.
#[derive(Debug, Clone)]
pub struct FakeVideo {
    pub frames_per_second: f64,
    pub frame_count: u64,
    /// Frames at or after this number fail to decode.
    pub unreadable_from: Option<u64>,
    /// Frames actually present, when fewer than `frame_count`.
    pub ends_after: Option<u64>,
}

impl FakeVideo {
    pub fn new(frames_per_second: f64, frame_count: u64) -> Self {
        Self {
            frames_per_second,
            frame_count,
            unreadable_from: None,
            ends_after: None,
        }
    }

    pub fn unreadable_from(mut self, frame_number: u64) -> Self {
        self.unreadable_from = Some(frame_number);
        self
    }

    pub fn ends_after(mut self, frames: u64) -> Self {
        self.ends_after = Some(frames);
        self
    }
}

/// Everything the extractor asked of the backend.
#[derive(Debug, Default, Clone)]
pub struct Journal {
    pub opens: Vec<PathBuf>,
    pub seeks: Vec<u64>,
    pub releases: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    videos: HashMap<String, FakeVideo>,
    journal: Arc<Mutex<Journal>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `video` for any path whose file name is `file_name`. Paths
    /// without an entry fail to open, like a corrupt container.
    pub fn with_video(mut self, file_name: &str, video: FakeVideo) -> Self {
        self.videos.insert(file_name.to_string(), video);
        self
    }

    /// A handle on the shared journal that outlives moving the backend.
    pub fn journal(&self) -> Arc<Mutex<Journal>> {
        Arc::clone(&self.journal)
    }
}

impl MediaBackend for FakeBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, ExtractionError> {
        self.journal.lock().unwrap().opens.push(path.to_path_buf());

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let video = self
            .videos
            .get(&name)
            .ok_or_else(|| ExtractionError::OpenFailed {
                path: path.to_path_buf(),
                reason: "Invalid data found when processing input".to_string(),
            })?;

        Ok(Box::new(FakeSource {
            metadata: VideoMetadata {
                width: 4,
                height: 4,
                frames_per_second: video.frames_per_second,
                frame_count: video.frame_count,
                codec: "fake".to_string(),
            },
            unreadable_from: video.unreadable_from,
            available: video.ends_after.unwrap_or(video.frame_count),
            position: 0,
            journal: Arc::clone(&self.journal),
        }))
    }
}

struct FakeSource {
    metadata: VideoMetadata,
    unreadable_from: Option<u64>,
    available: u64,
    position: u64,
    journal: Arc<Mutex<Journal>>,
}

impl VideoSource for FakeSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn seek(&mut self, frame_number: u64) -> Result<(), ExtractionError> {
        self.journal.lock().unwrap().seeks.push(frame_number);
        self.position = frame_number;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Option<DynamicImage>, ExtractionError> {
        if self.position >= self.available {
            return Ok(None);
        }
        if self.unreadable_from.is_some_and(|from| self.position >= from) {
            return Err(ExtractionError::DecodeFailure(format!(
                "corrupt frame {}",
                self.position
            )));
        }

        let shade = (self.position % 256) as u8;
        self.position += 1;
        Ok(Some(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            4,
            4,
            Rgb([shade, shade, shade]),
        ))))
    }
}

impl Drop for FakeSource {
    fn drop(&mut self) {
        self.journal.lock().unwrap().releases += 1;
    }
}

/// Create an (empty) file standing in for a video.
pub fn touch(directory: &Path, file_name: &str) -> PathBuf {
    let path = directory.join(file_name);
    fs::write(&path, b"not really a video").expect("Failed to create stand-in video");
    path
}

/// Names of the files in `directory`, sorted.
pub fn file_names(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(directory)
        .expect("Failed to list directory")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// `["1.jpg", …, "<count>.jpg"]`, sorted the same way as [`file_names`].
pub fn numbered_frames(count: u64) -> Vec<String> {
    let mut names: Vec<String> = (1..=count).map(|n| format!("{n}.jpg")).collect();
    names.sort();
    names
}
