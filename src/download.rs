//! Whole-video download.
//!
//! Saves the video behind a locator to a local file by copying stream
//! packets through the demuxer/muxer pair, without re-encoding. This is the
//! counterpart to frame extraction for callers that want the raw segment on
//! disk (equivalent to `ffmpeg -i <url> -c copy <out>.mp4`).
//!
//! # Example
//!
//! ```no_run
//! use webcat::VideoLocator;
//!
//! let locator = VideoLocator::build("buxtoncoastalcam", 2019, 11, 13, 1000)?;
//! webcat::download(&locator, format!("{}.mp4", locator.name()))?;
//! # Ok::<(), webcat::WebcatError>(())
//! ```

use std::path::Path;

use ffmpeg_next::{codec::Id, media::Type};

use crate::{error::WebcatError, locator::VideoLocator};

/// Download the video behind `locator` to `output` by lossless packet copy.
///
/// The output container format is inferred from the file extension; archive
/// segments are MP4, so an `.mp4` output copies bit-for-bit.
///
/// # Errors
///
/// - [`WebcatError::VideoUnavailable`] / [`WebcatError::Network`] when the
///   locator cannot be opened, classified as for
///   [`VideoHandle::open`](crate::VideoHandle::open).
/// - [`WebcatError::Ffmpeg`] when muxing to the output fails.
pub fn download<P: AsRef<Path>>(locator: &VideoLocator, output: P) -> Result<(), WebcatError> {
    download_url(locator.url(), output)
}

/// Download a video from a raw URL; see [`download`].
pub fn download_url<P: AsRef<Path>>(url: &str, output: P) -> Result<(), WebcatError> {
    let output = output.as_ref();
    log::debug!("Downloading {url} -> {}", output.display());

    ffmpeg_next::init().map_err(|error| WebcatError::Ffmpeg(error.to_string()))?;

    let mut input = ffmpeg_next::format::input(&url)
        .map_err(|error| crate::video::classify_open_error(url, error))?;
    let mut output_context = ffmpeg_next::format::output(&output)?;

    // Map copied input streams to their output indices; data and attachment
    // streams are left behind.
    let mut stream_map: Vec<Option<usize>> = Vec::new();
    let mut copied = 0_usize;
    for stream in input.streams() {
        let medium = stream.parameters().medium();
        if matches!(medium, Type::Video | Type::Audio) {
            let mut out_stream = output_context.add_stream(ffmpeg_next::encoder::find(Id::None))?;
            out_stream.set_parameters(stream.parameters());
            // Reset the codec tag to let the muxer choose one valid for the
            // output container.
            unsafe {
                (*out_stream.parameters().as_mut_ptr()).codec_tag = 0;
            }
            stream_map.push(Some(copied));
            copied += 1;
        } else {
            stream_map.push(None);
        }
    }

    if copied == 0 {
        return Err(WebcatError::VideoUnavailable {
            url: url.to_string(),
            reason: "no video or audio streams to copy".to_string(),
        });
    }

    output_context.write_header()?;

    for (stream, mut packet) in input.packets() {
        let Some(output_index) = stream_map.get(stream.index()).copied().flatten() else {
            continue;
        };

        let input_time_base = stream.time_base();
        let output_time_base = output_context
            .stream(output_index)
            .map(|out| out.time_base())
            .unwrap_or(input_time_base);

        packet.set_stream(output_index);
        packet.rescale_ts(input_time_base, output_time_base);
        packet.set_position(-1);
        packet.write_interleaved(&mut output_context)?;
    }

    output_context.write_trailer()?;
    log::debug!("Download complete: {}", output.display());
    Ok(())
}
