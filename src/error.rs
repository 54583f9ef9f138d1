//! Error types for the `webcat` crate.
//!
//! This module defines [`WebcatError`], the unified error type returned by all
//! fallible operations in the crate. The variants mirror the failure taxonomy
//! of the retrieval pipeline: bad input parameters, transient transport
//! failures, permanently missing archive videos, and decode problems.

use std::io::Error as IoError;

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `webcat` operations.
///
/// Every public method that can fail returns `Result<T, WebcatError>`.
/// Variants carry enough context to diagnose the problem without needing
/// additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WebcatError {
    /// A station/date/time parameter is outside its declared range.
    #[error("Invalid {field} `{value}`: expected {expected}")]
    InvalidParameter {
        /// Name of the offending field (e.g. `"month"`).
        field: &'static str,
        /// The rejected value, rendered as text.
        value: String,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },

    /// A transient transport failure while reaching the archive.
    ///
    /// Retryable by the caller; the core never retries on its own.
    #[error("Network failure for {url}: {reason}")]
    Network {
        /// The locator URL that was being fetched.
        url: String,
        /// Underlying transport error message.
        reason: String,
    },

    /// No video exists at the derived locator (404-equivalent, malformed
    /// container, or a stream with no frames). Not retryable.
    #[error("No video available at {url}: {reason}")]
    VideoUnavailable {
        /// The locator URL that was probed.
        url: String,
        /// Why the resource was judged unavailable.
        reason: String,
    },

    /// The requested frame index exceeds the probed frame count.
    #[error("Frame {frame_index} is out of range (video has {frame_count} frames)")]
    FrameOutOfRange {
        /// The frame index that was requested.
        frame_index: u64,
        /// The total number of frames in the video.
        frame_count: u64,
    },

    /// A single video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecode(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate while encoding a frame.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),
}

impl WebcatError {
    /// Whether the caller may reasonably retry the failed operation.
    ///
    /// Only transient transport failures are retryable; a missing video or a
    /// bad parameter will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebcatError::Network { .. })
    }
}

impl From<FfmpegError> for WebcatError {
    fn from(error: FfmpegError) -> Self {
        WebcatError::Ffmpeg(error.to_string())
    }
}
