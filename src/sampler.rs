//! Time-interval frame sampling.
//!
//! Converts a sampling interval in seconds into a stride in frames and walks
//! a [`FrameSource`] at that stride. [`FrameSampler`] is a lazy iterator over
//! `(frame_index, image)` pairs: frames decode one at a time, a decode
//! failure on a single index is logged and skipped, and iteration is finite
//! and strictly increasing.
//!
//! The stride contract: `step = round(interval_seconds * fps)`, clamped to a
//! minimum of 1 frame. At 6.2 fps a 10-second interval samples every 62nd
//! frame.

use image::DynamicImage;

use crate::{error::WebcatError, video::FrameSource};

/// Sampling stride in frames for a given interval and frame rate.
///
/// Rounds `interval_seconds * frames_per_second` to the nearest whole frame
/// and never returns less than 1, so sampling always advances even when the
/// interval is tiny relative to the frame rate.
///
/// # Example
///
/// ```
/// use webcat::sample_step;
///
/// assert_eq!(sample_step(10.0, 6.2), 62);
/// assert_eq!(sample_step(0.01, 30.0), 1);
/// ```
pub fn sample_step(interval_seconds: f64, frames_per_second: f64) -> u64 {
    let step = (interval_seconds * frames_per_second).round();
    if step < 1.0 { 1 } else { step as u64 }
}

/// The sampled frame indices for a video: `0, step, 2*step, ...` strictly
/// below `frame_count`.
///
/// # Example
///
/// ```
/// use webcat::sample_indices;
///
/// let indices: Vec<u64> = sample_indices(62, 62).collect();
/// assert_eq!(indices, vec![0]);
/// ```
pub fn sample_indices(frame_count: u64, step: u64) -> impl Iterator<Item = u64> {
    (0..frame_count).step_by(step.max(1) as usize)
}

/// Lazy iterator over sampled frames of a [`FrameSource`].
///
/// Yields `(frame_index, image)` pairs at the stride derived from the
/// requested interval. Indices whose frames fail to decode are skipped with a
/// warning; a single corrupt frame never aborts the video. Restart sampling
/// by constructing a new sampler over a fresh source.
///
/// # Example
///
/// ```no_run
/// use webcat::{FrameSampler, VideoHandle, VideoLocator};
///
/// let locator = VideoLocator::build("buxtoncoastalcam", 2019, 11, 13, 1000)?;
/// let handle = VideoHandle::open(&locator)?;
/// for (frame_index, image) in FrameSampler::new(handle, 10.0)? {
///     image.save(format!("frame_{frame_index}.jpg"))?;
/// }
/// # Ok::<(), webcat::WebcatError>(())
/// ```
#[must_use]
pub struct FrameSampler<S: FrameSource> {
    source: S,
    step: u64,
    frame_count: u64,
    next_index: u64,
}

impl<S: FrameSource> FrameSampler<S> {
    /// Create a sampler over `source` with the given interval in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`WebcatError::InvalidParameter`] when `interval_seconds` is
    /// not a positive finite number.
    pub fn new(source: S, interval_seconds: f64) -> Result<Self, WebcatError> {
        if !interval_seconds.is_finite() || interval_seconds <= 0.0 {
            return Err(WebcatError::InvalidParameter {
                field: "interval",
                value: interval_seconds.to_string(),
                expected: "a positive number of seconds",
            });
        }
        let step = sample_step(interval_seconds, source.frames_per_second());
        let frame_count = source.frame_count();
        Ok(Self {
            source,
            step,
            frame_count,
            next_index: 0,
        })
    }

    /// The stride between sampled frames, in frames.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Give the source back, ending sampling early.
    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: FrameSource> Iterator for FrameSampler<S> {
    type Item = (u64, DynamicImage);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_index < self.frame_count {
            let frame_index = self.next_index;
            self.next_index += self.step;

            match self.source.read_frame(frame_index) {
                Ok(image) => return Some((frame_index, image)),
                Err(error) => {
                    // Skip the one bad index and keep sampling.
                    log::warn!("Skipping frame {frame_index}: {error}");
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.frame_count.saturating_sub(self.next_index);
        let upper = remaining.div_ceil(self.step) as usize;
        (0, Some(upper))
    }
}

#[cfg(test)]
mod tests {
    use super::{sample_indices, sample_step};

    #[test]
    fn step_rounds_to_nearest_frame() {
        assert_eq!(sample_step(10.0, 6.2), 62);
        assert_eq!(sample_step(10.0, 29.97), 300);
        assert_eq!(sample_step(0.5, 5.0), 3);
    }

    #[test]
    fn step_never_drops_below_one() {
        assert_eq!(sample_step(0.001, 6.2), 1);
    }

    #[test]
    fn indices_stay_below_frame_count() {
        let indices: Vec<u64> = sample_indices(187, 62).collect();
        assert_eq!(indices, vec![0, 62, 124, 186]);
    }
}
