//! Video handles over archive streams.
//!
//! [`VideoHandle`] opens the video behind a [`VideoLocator`] through the
//! FFmpeg demuxer (FFmpeg's protocol layer handles the HTTP transport),
//! probes stream-level metadata, and decodes single frames by index. The
//! [`FrameSource`] trait captures the "probe + indexed read" capability so
//! the sampler and orchestrator can run against any source of frames, not
//! just a live network handle.
//!
//! # Example
//!
//! ```no_run
//! use webcat::{VideoHandle, VideoLocator};
//!
//! let locator = VideoLocator::build("buxtoncoastalcam", 2019, 11, 13, 1000)?;
//! let mut handle = VideoHandle::open(&locator)?;
//! println!(
//!     "{}x{} @ {:.1} fps, {} frames",
//!     handle.width(),
//!     handle.height(),
//!     handle.frames_per_second(),
//!     handle.frame_count(),
//! );
//! let first = handle.read_frame(0)?;
//! first.save("first_frame.jpg")?;
//! # Ok::<(), webcat::WebcatError>(())
//! ```

use std::time::Duration;

use ffmpeg_next::{
    Error as FfmpegError, Rational,
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{error::WebcatError, locator::VideoLocator};

/// The "open video source" capability: probed metadata plus indexed frame
/// reads.
///
/// [`VideoHandle`] is the production implementation; tests substitute stub
/// sources that synthesise frames without touching FFmpeg or the network.
pub trait FrameSource {
    /// Frame width in pixels.
    fn width(&self) -> u32;
    /// Frame height in pixels.
    fn height(&self) -> u32;
    /// Total number of frames in the video.
    fn frame_count(&self) -> u64;
    /// Frames per second.
    fn frames_per_second(&self) -> f64;
    /// Decode the frame at a 0-based index.
    ///
    /// # Errors
    ///
    /// [`WebcatError::FrameOutOfRange`] when `frame_index` is at or past
    /// [`frame_count`](FrameSource::frame_count), or
    /// [`WebcatError::VideoDecode`] when the frame cannot be decoded.
    fn read_frame(&mut self, frame_index: u64) -> Result<DynamicImage, WebcatError>;
}

/// An opened archive video: demuxer context plus probed metadata.
///
/// Created by [`VideoHandle::open`]; the probe runs during open, so a handle
/// you hold always carries valid dimensions, frame count, and frame rate.
/// The underlying FFmpeg input is released when the handle drops, on every
/// exit path.
pub struct VideoHandle {
    input: Input,
    url: String,
    video_stream_index: usize,
    width: u32,
    height: u32,
    frame_count: u64,
    frames_per_second: f64,
}

impl std::fmt::Debug for VideoHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoHandle")
            .field("url", &self.url)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("frame_count", &self.frame_count)
            .field("frames_per_second", &self.frames_per_second)
            .finish_non_exhaustive()
    }
}

impl VideoHandle {
    /// Open the video behind a locator.
    ///
    /// Blocks on network I/O while FFmpeg fetches container headers, then
    /// probes the video stream for dimensions, frame rate, and frame count.
    ///
    /// # Errors
    ///
    /// - [`WebcatError::VideoUnavailable`] when nothing usable exists at the
    ///   locator's URL (HTTP 4xx, malformed container, no video stream, a
    ///   stream with no frames or no frame rate).
    /// - [`WebcatError::Network`] for transient transport failures; callers
    ///   may retry these.
    pub fn open(locator: &VideoLocator) -> Result<Self, WebcatError> {
        Self::open_url(locator.url())
    }

    /// Open a video from a raw URL or local path.
    ///
    /// Same contract as [`open`](VideoHandle::open); exposed for callers that
    /// already hold a URL (or a downloaded file) rather than a locator.
    pub fn open_url(url: &str) -> Result<Self, WebcatError> {
        log::debug!("Opening video stream: {url}");

        // Initialise ffmpeg (safe to call multiple times).
        ffmpeg_next::init().map_err(|error| WebcatError::Ffmpeg(error.to_string()))?;

        let input = ffmpeg_next::format::input(&url)
            .map_err(|error| classify_open_error(url, error))?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| WebcatError::VideoUnavailable {
                url: url.to_string(),
                reason: "no video stream in container".to_string(),
            })?;
        let video_stream_index = stream.index();

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| WebcatError::VideoUnavailable {
                url: url.to_string(),
                reason: format!("cannot create video decoder: {error}"),
            })?;
        let width = decoder.width();
        let height = decoder.height();

        let frames_per_second = stream_frame_rate(stream.avg_frame_rate(), stream.rate());
        if frames_per_second <= 0.0 {
            return Err(WebcatError::VideoUnavailable {
                url: url.to_string(),
                reason: "stream declares no usable frame rate".to_string(),
            });
        }

        // Prefer the container's declared frame count; fall back to an
        // estimate from duration x rate when the demuxer doesn't know it.
        let declared_frames = stream.frames();
        let frame_count = if declared_frames > 0 {
            declared_frames as u64
        } else {
            let duration_microseconds = input.duration();
            if duration_microseconds > 0 {
                let duration = Duration::from_micros(duration_microseconds as u64);
                (duration.as_secs_f64() * frames_per_second) as u64
            } else {
                0
            }
        };

        if frame_count == 0 {
            return Err(WebcatError::VideoUnavailable {
                url: url.to_string(),
                reason: "stream contains no frames".to_string(),
            });
        }
        if width == 0 || height == 0 {
            return Err(WebcatError::VideoUnavailable {
                url: url.to_string(),
                reason: format!("invalid frame dimensions {width}x{height}"),
            });
        }

        log::debug!(
            "Probed {url}: {width}x{height}, {frame_count} frames @ {frames_per_second:.3} fps"
        );

        Ok(Self {
            input,
            url: url.to_string(),
            video_stream_index,
            width,
            height,
            frame_count,
            frames_per_second,
        })
    }

    /// The URL this handle was opened from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of frames in the video.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, as declared by the stream.
    pub fn frames_per_second(&self) -> f64 {
        self.frames_per_second
    }

    /// Decode the frame at a 0-based index.
    ///
    /// Seeks to the nearest keyframe before the target, decodes forward until
    /// the requested frame (or the first one past it) is reached, and converts
    /// it to RGB8.
    ///
    /// # Errors
    ///
    /// - [`WebcatError::FrameOutOfRange`] when `frame_index >= frame_count`.
    /// - [`WebcatError::VideoDecode`] when FFmpeg cannot produce the frame.
    pub fn read_frame(&mut self, frame_index: u64) -> Result<DynamicImage, WebcatError> {
        if frame_index >= self.frame_count {
            return Err(WebcatError::FrameOutOfRange {
                frame_index,
                frame_count: self.frame_count,
            });
        }

        let stream = self
            .input
            .stream(self.video_stream_index)
            .ok_or_else(|| WebcatError::VideoDecode("video stream vanished".to_string()))?;
        let time_base = stream.time_base();

        // Build a fresh decoder per read; the demuxer context is reused.
        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| WebcatError::VideoDecode(error.to_string()))?;
        let mut decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| WebcatError::VideoDecode(error.to_string()))?;

        let mut scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            self.width,
            self.height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| WebcatError::VideoDecode(error.to_string()))?;

        let target_timestamp =
            frame_index_to_stream_timestamp(frame_index, self.frames_per_second, time_base);
        self.input
            .seek(target_timestamp, ..target_timestamp)
            .map_err(|error| WebcatError::VideoDecode(error.to_string()))?;

        let mut decoded = VideoFrame::empty();
        let mut rgb = VideoFrame::empty();

        for (stream, packet) in self.input.packets() {
            if stream.index() != self.video_stream_index {
                continue;
            }
            decoder
                .send_packet(&packet)
                .map_err(|error| WebcatError::VideoDecode(error.to_string()))?;

            while decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(0);
                let current = pts_to_frame_index(pts, time_base, self.frames_per_second);

                // Past-the-target frames stand in for targets the seek
                // overshot; the stream never re-emits earlier indices.
                if current >= frame_index {
                    scaler
                        .run(&decoded, &mut rgb)
                        .map_err(|error| WebcatError::VideoDecode(error.to_string()))?;
                    return frame_to_image(&rgb, self.width, self.height);
                }
            }
        }

        // Flush the decoder for tail frames.
        decoder
            .send_eof()
            .map_err(|error| WebcatError::VideoDecode(error.to_string()))?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            let pts = decoded.pts().unwrap_or(0);
            let current = pts_to_frame_index(pts, time_base, self.frames_per_second);
            if current >= frame_index {
                scaler
                    .run(&decoded, &mut rgb)
                    .map_err(|error| WebcatError::VideoDecode(error.to_string()))?;
                return frame_to_image(&rgb, self.width, self.height);
            }
        }

        Err(WebcatError::VideoDecode(format!(
            "could not locate frame {frame_index} in the stream"
        )))
    }
}

impl FrameSource for VideoHandle {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn frames_per_second(&self) -> f64 {
        self.frames_per_second
    }

    fn read_frame(&mut self, frame_index: u64) -> Result<DynamicImage, WebcatError> {
        VideoHandle::read_frame(self, frame_index)
    }
}

/// Frame rate from the stream's average rate, falling back to the raw rate.
fn stream_frame_rate(average: Rational, raw: Rational) -> f64 {
    if average.denominator() != 0 && average.numerator() > 0 {
        average.numerator() as f64 / average.denominator() as f64
    } else if raw.denominator() != 0 && raw.numerator() > 0 {
        raw.numerator() as f64 / raw.denominator() as f64
    } else {
        0.0
    }
}

/// Classify an FFmpeg open failure into the crate's error taxonomy.
///
/// HTTP 4xx and structural problems mean the video does not exist at the
/// locator; HTTP 5xx and OS-level transport errnos are transient.
pub(crate) fn classify_open_error(url: &str, error: FfmpegError) -> WebcatError {
    match error {
        FfmpegError::HttpServerError | FfmpegError::Other { .. } => WebcatError::Network {
            url: url.to_string(),
            reason: error.to_string(),
        },
        _ => WebcatError::VideoUnavailable {
            url: url.to_string(),
            reason: error.to_string(),
        },
    }
}

/// Convert a frame index to a seek timestamp in the stream's time base.
fn frame_index_to_stream_timestamp(
    frame_index: u64,
    frames_per_second: f64,
    time_base: Rational,
) -> i64 {
    let seconds = frame_index as f64 / frames_per_second;
    let numerator = time_base.numerator() as f64;
    let denominator = time_base.denominator() as f64;
    (seconds * denominator / numerator) as i64
}

/// Rescale a PTS value to a frame index.
fn pts_to_frame_index(pts: i64, time_base: Rational, frames_per_second: f64) -> u64 {
    let seconds = pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64;
    (seconds * frames_per_second) as u64
}

/// Convert a scaled RGB24 frame to an [`image::DynamicImage`].
///
/// FFmpeg frames frequently carry per-row padding (stride > width x 3); the
/// padding is stripped so the buffer can feed `RgbImage::from_raw` directly.
fn frame_to_image(
    rgb_frame: &VideoFrame,
    width: u32,
    height: u32,
) -> Result<DynamicImage, WebcatError> {
    let stride = rgb_frame.stride(0);
    let row_bytes = (width as usize) * 3;
    let data = rgb_frame.data(0);

    let buffer = if stride == row_bytes {
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
        for row in 0..(height as usize) {
            let start = row * stride;
            buffer.extend_from_slice(&data[start..start + row_bytes]);
        }
        buffer
    };

    let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        WebcatError::VideoDecode("decoded frame buffer has unexpected size".to_string())
    })?;
    Ok(DynamicImage::ImageRgb8(image))
}

#[cfg(test)]
mod tests {
    use ffmpeg_next::Error as FfmpegError;

    use super::classify_open_error;
    use crate::error::WebcatError;

    const URL: &str = "http://webcat-video.axds.co/cam/raw/2019/2019_11/2019_11_13/cam.2019-11-13_1000.mp4";

    #[test]
    fn http_not_found_means_the_video_is_unavailable() {
        let error = classify_open_error(URL, FfmpegError::HttpNotFound);
        assert!(
            matches!(error, WebcatError::VideoUnavailable { ref url, .. } if url == URL),
            "unexpected classification: {error:?}",
        );
        assert!(!error.is_retryable());
    }

    #[test]
    fn other_4xx_responses_are_unavailable_too() {
        for status in [
            FfmpegError::HttpBadRequest,
            FfmpegError::HttpUnauthorized,
            FfmpegError::HttpForbidden,
            FfmpegError::HttpOther4xx,
        ] {
            let error = classify_open_error(URL, status);
            assert!(matches!(error, WebcatError::VideoUnavailable { .. }));
            assert!(!error.is_retryable());
        }
    }

    #[test]
    fn http_server_errors_are_retryable_network_failures() {
        let error = classify_open_error(URL, FfmpegError::HttpServerError);
        assert!(
            matches!(error, WebcatError::Network { ref url, .. } if url == URL),
            "unexpected classification: {error:?}",
        );
        assert!(error.is_retryable());
    }

    #[test]
    fn transport_errnos_are_retryable_network_failures() {
        // ETIMEDOUT: the connection stalled, not a missing video.
        let error = classify_open_error(URL, FfmpegError::Other { errno: 110 });
        assert!(matches!(error, WebcatError::Network { .. }));
        assert!(error.is_retryable());
    }

    #[test]
    fn malformed_containers_are_unavailable() {
        let error = classify_open_error(URL, FfmpegError::InvalidData);
        assert!(matches!(error, WebcatError::VideoUnavailable { .. }));
        assert!(!error.is_retryable());
    }
}
