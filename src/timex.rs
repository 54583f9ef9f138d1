//! Time-averaged exposure images.
//!
//! Coastal imaging averages many frames of a fixed camera into a single
//! "timex" image: moving water blurs out and stable features (sand bars,
//! shorelines) remain. [`average_frame`] samples every `step`-th frame of a
//! [`FrameSource`] and averages them per pixel channel.

use image::{DynamicImage, RgbImage};

use crate::{error::WebcatError, sampler::sample_indices, video::FrameSource};

/// Average every `step`-th frame of `source` into one RGB image.
///
/// Frames at indices `0, step, 2*step, ...` are decoded, accumulated per
/// channel, and divided by the number of frames that decoded successfully.
/// Indices that fail to decode are skipped with a warning, matching the
/// sampler's per-frame failure policy.
///
/// # Errors
///
/// - [`WebcatError::InvalidParameter`] when `step` is zero.
/// - [`WebcatError::VideoDecode`] when not a single sampled frame decodes.
///
/// # Example
///
/// ```no_run
/// use webcat::{VideoHandle, VideoLocator};
///
/// let locator = VideoLocator::build("buxtoncoastalcam", 2019, 11, 13, 1000)?;
/// let mut handle = VideoHandle::open(&locator)?;
/// let timex = webcat::average_frame(&mut handle, 500)?;
/// timex.save("timex.jpg")?;
/// # Ok::<(), webcat::WebcatError>(())
/// ```
pub fn average_frame<S: FrameSource>(
    source: &mut S,
    step: u64,
) -> Result<DynamicImage, WebcatError> {
    if step == 0 {
        return Err(WebcatError::InvalidParameter {
            field: "step",
            value: step.to_string(),
            expected: "a stride of at least 1 frame",
        });
    }

    let width = source.width();
    let height = source.height();
    let mut sums = vec![0.0_f64; (width as usize) * (height as usize) * 3];
    let mut averaged = 0_u64;

    for frame_index in sample_indices(source.frame_count(), step) {
        let image = match source.read_frame(frame_index) {
            Ok(image) => image,
            Err(error) => {
                log::warn!("Skipping frame {frame_index} in average: {error}");
                continue;
            }
        };
        let rgb = image.to_rgb8();
        for (sum, &sample) in sums.iter_mut().zip(rgb.as_raw()) {
            *sum += f64::from(sample);
        }
        averaged += 1;
    }

    if averaged == 0 {
        return Err(WebcatError::VideoDecode(
            "no frames could be decoded for averaging".to_string(),
        ));
    }

    let pixels: Vec<u8> = sums
        .iter()
        .map(|sum| (sum / averaged as f64).round() as u8)
        .collect();
    let image = RgbImage::from_raw(width, height, pixels).ok_or_else(|| {
        WebcatError::VideoDecode("averaged frame buffer has unexpected size".to_string())
    })?;
    Ok(DynamicImage::ImageRgb8(image))
}
