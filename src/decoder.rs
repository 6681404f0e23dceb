//! FFmpeg-backed [`MediaBackend`].
//!
//! [`FfmpegBackend`] opens a container with `ffmpeg-next`, picks the best
//! video stream, and hands back an [`FfmpegSource`] that decodes one frame
//! at a time. Seeking jumps to the nearest keyframe at or before the target
//! and then decodes forward, discarding frames until the target is reached.
//! Targets a short distance ahead of the current position are reached by
//! decoding forward without a container seek.

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{
    conversion::{
        NO_TIMESTAMP, frame_number_to_seek_timestamp, frame_to_buffer, pts_to_frame_number,
        pts_to_seconds, rational_to_f64,
    },
    error::ExtractionError,
    metadata::VideoMetadata,
    source::{MediaBackend, VideoSource},
};

/// Targets at most this many seconds ahead of the decoder are reached by
/// decoding forward instead of seeking.
const FORWARD_DECODE_WINDOW_SECONDS: f64 = 2.0;

/// Opens videos through FFmpeg.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegBackend;

impl FfmpegBackend {
    /// Create the backend. FFmpeg itself is initialised lazily on first open.
    pub fn new() -> Self {
        Self
    }
}

impl MediaBackend for FfmpegBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, ExtractionError> {
        Ok(Box::new(FfmpegSource::open(path)?))
    }
}

/// A video stream decoded with FFmpeg.
pub struct FfmpegSource {
    input_context: Input,
    decoder: VideoDecoder,
    /// Scaler to RGB24, built from the first decoded frame and rebuilt if the
    /// source format or size changes mid-stream.
    scaler: Option<(ScalingContext, Pixel, u32, u32)>,
    video_stream_index: usize,
    time_base: Rational,
    start_time: i64,
    metadata: VideoMetadata,
    /// Frame number the next `read_frame` should return.
    target: u64,
    /// Frame number just after the last frame handed out, if decoding has
    /// not been disturbed by a seek since.
    position: Option<u64>,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    eof_sent: bool,
    path: PathBuf,
}

impl FfmpegSource {
    /// Open `path` and prepare a decoder for its best video stream.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::OpenFailed`] if FFmpeg cannot open the
    /// container, finds no video stream, or has no decoder for its codec.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractionError> {
        let path = path.as_ref();
        let open_failed = |reason: String| ExtractionError::OpenFailed {
            path: path.to_path_buf(),
            reason,
        };

        log::debug!("Opening video: {}", path.display());

        // Safe to call repeatedly.
        ffmpeg_next::init()
            .map_err(|error| open_failed(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_failed(error.to_string()))?;

        let (
            video_stream_index,
            time_base,
            start_time,
            stream_frames,
            stream_duration,
            fps,
            decoder,
        ) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or_else(|| open_failed("no video stream found".to_string()))?;

            let average_rate = rational_to_f64(stream.avg_frame_rate());
            let frames_per_second = if average_rate > 0.0 {
                average_rate
            } else {
                rational_to_f64(stream.rate())
            };

            let decoder_context = CodecContext::from_parameters(stream.parameters())
                .map_err(|error| open_failed(format!("unreadable codec parameters: {error}")))?;
            let decoder = decoder_context
                .decoder()
                .video()
                .map_err(|error| open_failed(format!("no usable video decoder: {error}")))?;

            (
                stream.index(),
                stream.time_base(),
                stream.start_time(),
                stream.frames(),
                stream.duration(),
                frames_per_second,
                decoder,
            )
        };

        let frame_count = resolve_frame_count(
            stream_frames,
            stream_duration,
            time_base,
            input_context.duration(),
            fps,
        );

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second: fps,
            frame_count,
            codec,
        };

        log::debug!(
            "Opened {}: {}x{} {} @ {:.3} fps, {} frames",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.codec,
            metadata.frames_per_second,
            metadata.frame_count,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler: None,
            video_stream_index,
            time_base,
            start_time,
            metadata,
            target: 0,
            position: Some(0),
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            eof_sent: false,
            path: path.to_path_buf(),
        })
    }

    fn forward_window(&self) -> u64 {
        (self.metadata.frames_per_second * FORWARD_DECODE_WINDOW_SECONDS).ceil() as u64
    }

    /// Scale the current `decoded_frame` to RGB24 and wrap it as an image.
    fn convert_current_frame(&mut self) -> Result<DynamicImage, ExtractionError> {
        let format = self.decoded_frame.format();
        let width = self.decoded_frame.width();
        let height = self.decoded_frame.height();

        let stale = !matches!(
            &self.scaler,
            Some((_, f, w, h)) if *f == format && *w == width && *h == height
        );
        if stale {
            let context = ScalingContext::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?;
            self.scaler = Some((context, format, width, height));
        }

        if let Some((scaler, ..)) = self.scaler.as_mut() {
            scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;
        }

        let buffer = frame_to_buffer(&self.rgb_frame, width, height, 3);
        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            ExtractionError::DecodeFailure(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(image))
    }
}

impl VideoSource for FfmpegSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn seek(&mut self, frame_number: u64) -> Result<(), ExtractionError> {
        self.target = frame_number;

        if let Some(position) = self.position
            && frame_number >= position
            && frame_number - position <= self.forward_window()
        {
            return Ok(());
        }

        let timestamp =
            frame_number_to_seek_timestamp(frame_number, self.metadata.frames_per_second);
        log::debug!(
            "Seeking {} to frame {frame_number} ({timestamp} us)",
            self.path.display()
        );

        match self.input_context.seek(timestamp, ..timestamp) {
            Ok(()) => {
                self.decoder.flush();
                self.eof_sent = false;
                self.position = None;
                Ok(())
            }
            Err(error) => match self.position {
                // Unseekable input; fall back to decoding forward.
                Some(position) if frame_number >= position => {
                    log::debug!(
                        "Seek failed in {} ({error}); decoding forward",
                        self.path.display()
                    );
                    Ok(())
                }
                _ => Err(ExtractionError::from(error)),
            },
        }
    }

    fn read_frame(&mut self) -> Result<Option<DynamicImage>, ExtractionError> {
        loop {
            // Drain frames the decoder has already produced.
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let pts = self
                    .decoded_frame
                    .timestamp()
                    .or_else(|| self.decoded_frame.pts())
                    .unwrap_or(0);
                let frame_number = pts_to_frame_number(
                    pts,
                    self.start_time,
                    self.time_base,
                    self.metadata.frames_per_second,
                );

                if frame_number < self.target {
                    continue;
                }

                let image = self.convert_current_frame()?;
                self.target = frame_number + 1;
                self.position = Some(frame_number + 1);
                return Ok(Some(image));
            }

            if self.eof_sent {
                return Ok(None);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index
                        && let Err(error) = self.decoder.send_packet(&packet)
                    {
                        log::debug!(
                            "Skipping undecodable packet in {}: {error}",
                            self.path.display()
                        );
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    return Err(ExtractionError::DecodeFailure(format!(
                        "failed to read packet: {error}"
                    )));
                }
            }
        }
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        log::debug!("Released {}", self.path.display());
    }
}

/// Work out the total frame count the way OpenCV does: the stream's own
/// frame count when the container records one, otherwise duration × fps.
fn resolve_frame_count(
    stream_frames: i64,
    stream_duration: i64,
    time_base: Rational,
    container_duration_microseconds: i64,
    frames_per_second: f64,
) -> u64 {
    if stream_frames > 0 {
        return stream_frames as u64;
    }
    if !(frames_per_second.is_finite() && frames_per_second > 0.0) {
        return 0;
    }

    let seconds = if stream_duration > 0 && stream_duration != NO_TIMESTAMP {
        pts_to_seconds(stream_duration, time_base)
    } else if container_duration_microseconds > 0 {
        container_duration_microseconds as f64 / 1_000_000.0
    } else {
        return 0;
    };

    (seconds * frames_per_second).round() as u64
}
