//! Timestamp sampling.
//!
//! A [`SamplingPlan`] turns a sampling rate (screenshots per second) and a
//! video's timing metadata into the sequence of frames to extract. Target
//! timestamps are `t_k = k / rate` for `k = 0, 1, 2, …`; each maps to
//! frame `round(t_k * fps)` and the plan ends at the first frame number that
//! is not below the frame count.
//!
//! Rounding is half-to-even, so a timestamp landing exactly between two
//! frames resolves to the even one (`2.5 → 2`, `7.5 → 8`).
//!
//! # Example
//!
//! ```
//! use video_to_frames::SamplingPlan;
//!
//! // 5 seconds of 30 fps video, one screenshot per second.
//! let plan = SamplingPlan::new(1.0, 30.0, 150);
//! let frames: Vec<u64> = plan.iter().map(|point| point.frame_number).collect();
//! assert_eq!(frames, vec![0, 30, 60, 90, 120]);
//! ```

use std::time::Duration;

/// One target of a [`SamplingPlan`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// Zero-based position in the plan (`k`).
    pub index: u64,
    /// Target timestamp in seconds.
    pub timestamp_seconds: f64,
    /// Frame nearest to the timestamp.
    pub frame_number: u64,
}

impl SamplePoint {
    /// The target timestamp as a [`Duration`], saturating at
    /// [`Duration::MAX`].
    pub fn timestamp(&self) -> Duration {
        Duration::try_from_secs_f64(self.timestamp_seconds).unwrap_or(Duration::MAX)
    }
}

/// A finite, restartable description of which frames to sample.
///
/// The plan itself holds no cursor; [`iter`](SamplingPlan::iter) starts a
/// fresh pass every time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPlan {
    rate: f64,
    frames_per_second: f64,
    frame_count: u64,
}

impl SamplingPlan {
    /// Build a plan for `rate` screenshots per second over a video with the
    /// given frame rate and frame count.
    ///
    /// A rate or frame rate that is not positive and finite yields an empty
    /// plan; callers validate both before extracting.
    pub fn new(rate: f64, frames_per_second: f64, frame_count: u64) -> Self {
        let usable = rate.is_finite()
            && rate > 0.0
            && frames_per_second.is_finite()
            && frames_per_second > 0.0;

        Self {
            rate,
            frames_per_second,
            frame_count: if usable { frame_count } else { 0 },
        }
    }

    /// The sample point at position `index`, or `None` past the end.
    pub fn point(&self, index: u64) -> Option<SamplePoint> {
        if self.frame_count == 0 {
            return None;
        }

        // Dividing keeps t_0 at zero even when 1 / rate overflows.
        let timestamp_seconds = index as f64 / self.rate;
        let frame_number = nearest_frame(timestamp_seconds, self.frames_per_second);
        if frame_number >= self.frame_count {
            return None;
        }

        Some(SamplePoint {
            index,
            timestamp_seconds,
            frame_number,
        })
    }

    /// Start a new pass over the plan.
    pub fn iter(&self) -> SamplingIter {
        SamplingIter {
            plan: *self,
            next_index: 0,
            finished: false,
        }
    }

    /// Number of points in the plan.
    pub fn len(&self) -> u64 {
        self.iter().count() as u64
    }

    /// Whether the plan has no points at all.
    pub fn is_empty(&self) -> bool {
        self.point(0).is_none()
    }
}

impl IntoIterator for &SamplingPlan {
    type Item = SamplePoint;
    type IntoIter = SamplingIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the [`SamplePoint`]s of a [`SamplingPlan`].
#[derive(Debug, Clone)]
pub struct SamplingIter {
    plan: SamplingPlan,
    next_index: u64,
    finished: bool,
}

impl Iterator for SamplingIter {
    type Item = SamplePoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.plan.point(self.next_index) {
            Some(point) => {
                self.next_index += 1;
                Some(point)
            }
            None => {
                self.finished = true;
                None
            }
        }
    }
}

impl std::iter::FusedIterator for SamplingIter {}

/// Map a timestamp to the nearest frame number, rounding ties to even.
pub fn nearest_frame(timestamp_seconds: f64, frames_per_second: f64) -> u64 {
    let position = (timestamp_seconds * frames_per_second).round_ties_even();
    if position <= 0.0 { 0 } else { position as u64 }
}
