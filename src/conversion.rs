//! Internal conversion helpers.
//!
//! Pixel-data copying and the timestamp arithmetic that maps between frame
//! numbers, stream PTS values and FFmpeg seek positions.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// FFmpeg's "no timestamp" sentinel (`AV_NOPTS_VALUE`).
pub(crate) const NO_TIMESTAMP: i64 = i64::MIN;

/// Copy pixel data from an FFmpeg video frame into a tightly-packed buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × bpp).
/// The result can be passed directly to [`image::RgbImage::from_raw`].
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == row_bytes {
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_bytes]);
        }
        buffer
    }
}

/// Convert a rational to `f64`, returning `0.0` for a zero denominator.
pub(crate) fn rational_to_f64(value: Rational) -> f64 {
    if value.denominator() == 0 {
        0.0
    } else {
        f64::from(value.numerator()) / f64::from(value.denominator())
    }
}

/// Rescale a PTS value from stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * rational_to_f64(time_base)
}

/// Map a decoded frame's PTS to a zero-based frame number.
///
/// `start_time` is the stream's first PTS (or [`NO_TIMESTAMP`]); it is
/// subtracted so the first frame of a stream is frame 0 even when the
/// container starts its clock later.
pub(crate) fn pts_to_frame_number(
    pts: i64,
    start_time: i64,
    time_base: Rational,
    frames_per_second: f64,
) -> u64 {
    let offset = if start_time == NO_TIMESTAMP { 0 } else { start_time };
    let seconds = pts_to_seconds(pts.saturating_sub(offset), time_base);
    let position = (seconds * frames_per_second).round();
    if position <= 0.0 { 0 } else { position as u64 }
}

/// Convert a frame number to a seek target in `AV_TIME_BASE` (microseconds).
///
/// `Input::seek` (via `avformat_seek_file` with `stream_index = -1`) expects
/// container-level microseconds, not the stream time base.
pub(crate) fn frame_number_to_seek_timestamp(frame_number: u64, frames_per_second: f64) -> i64 {
    let seconds = frame_number as f64 / frames_per_second;
    (seconds * 1_000_000.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rationals() {
        assert_eq!(rational_to_f64(Rational::new(30_000, 1001)), 30_000.0 / 1001.0);
        assert_eq!(rational_to_f64(Rational::new(25, 0)), 0.0);
    }

    #[test]
    fn pts_maps_to_nearest_frame() {
        let time_base = Rational::new(1, 15_360);
        // 512 ticks per frame at 30 fps.
        assert_eq!(pts_to_frame_number(0, NO_TIMESTAMP, time_base, 30.0), 0);
        assert_eq!(pts_to_frame_number(512 * 30, NO_TIMESTAMP, time_base, 30.0), 30);
        assert_eq!(pts_to_frame_number(512 * 30 - 1, NO_TIMESTAMP, time_base, 30.0), 30);
    }

    #[test]
    fn start_time_is_subtracted() {
        let time_base = Rational::new(1, 90_000);
        // Stream starts at 1.4 s; 3000 ticks per frame at 30 fps.
        let start = 126_000;
        assert_eq!(pts_to_frame_number(start, start, time_base, 30.0), 0);
        assert_eq!(pts_to_frame_number(start + 3000 * 5, start, time_base, 30.0), 5);
        assert_eq!(pts_to_frame_number(0, start, time_base, 30.0), 0);
    }

    #[test]
    fn seek_timestamps_are_microseconds() {
        assert_eq!(frame_number_to_seek_timestamp(0, 30.0), 0);
        assert_eq!(frame_number_to_seek_timestamp(60, 30.0), 2_000_000);
        assert_eq!(frame_number_to_seek_timestamp(1, 4.0), 250_000);
    }
}
