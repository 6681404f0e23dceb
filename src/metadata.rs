//! Video metadata types.
//!
//! [`VideoMetadata`] is read once when a [`VideoSource`](crate::VideoSource)
//! is opened and drives the sampling plan for that video.

use std::time::Duration;

/// Timing and format information for a video stream.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Total number of frames reported by the container.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
}

impl VideoMetadata {
    /// Whether the frame rate can be used to map timestamps to frames.
    pub fn has_usable_frame_rate(&self) -> bool {
        self.frames_per_second.is_finite() && self.frames_per_second > 0.0
    }

    /// Duration in seconds, derived as `frame_count / frames_per_second`.
    ///
    /// Returns `0.0` when the frame rate is unusable.
    pub fn duration_seconds(&self) -> f64 {
        if self.has_usable_frame_rate() {
            self.frame_count as f64 / self.frames_per_second
        } else {
            0.0
        }
    }

    /// [`duration_seconds`](VideoMetadata::duration_seconds) as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(frames_per_second: f64, frame_count: u64) -> VideoMetadata {
        VideoMetadata {
            width: 640,
            height: 480,
            frames_per_second,
            frame_count,
            codec: "h264".to_string(),
        }
    }

    #[test]
    fn duration_is_frames_over_rate() {
        assert_eq!(metadata(30.0, 150).duration_seconds(), 5.0);
        assert_eq!(metadata(25.0, 10).duration(), Duration::from_millis(400));
    }

    #[test]
    fn zero_rate_has_no_duration() {
        let zero = metadata(0.0, 150);
        assert!(!zero.has_usable_frame_rate());
        assert_eq!(zero.duration_seconds(), 0.0);
        assert!(!metadata(f64::NAN, 10).has_usable_frame_rate());
    }
}
