//! # webcat
//!
//! Locate videos in a networked coastal-webcam archive and extract
//! subsampled frame sequences for downstream analysis.
//!
//! `webcat` builds deterministic retrieval URLs from station/date/time
//! parameters, opens the video behind them through FFmpeg (via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate, whose
//! protocol layer handles the HTTP transport), probes dimensions, frame
//! count, and frame rate, and samples frames at a fixed time interval into
//! [`image::DynamicImage`] values. Batch runs over many stations and dates
//! isolate per-video failures and keep a CSV ledger of every frame's
//! provenance.
//!
//! ## Quick Start
//!
//! ### Locate and sample one video
//!
//! ```no_run
//! use webcat::{FrameSampler, VideoHandle, VideoLocator};
//!
//! let locator = VideoLocator::build("buxtoncoastalcam", 2019, 11, 13, 1000)?;
//! let handle = VideoHandle::open(&locator)?;
//!
//! // One frame every 10 seconds of video.
//! for (frame_index, image) in FrameSampler::new(handle, 10.0)? {
//!     image.save(format!("frame_{frame_index}.jpg"))?;
//! }
//! # Ok::<(), webcat::WebcatError>(())
//! ```
//!
//! ### Run a batch
//!
//! ```no_run
//! use webcat::BatchRequest;
//!
//! let mut request = BatchRequest::new("/data/webcat");
//! request.stations = vec!["buxtoncoastalcam".to_string()];
//! request.years = vec![2019];
//! request.months = vec![11];
//! request.days = vec![13];
//! request.times = vec![1000, 1330, 1510];
//!
//! let summary = webcat::run(&request)?;
//! println!("{} saved, {} failed", summary.successes(), summary.failures());
//! # Ok::<(), webcat::WebcatError>(())
//! ```
//!
//! ## Features
//!
//! - **Deterministic locators** — pure station/date/time → URL + unique
//!   name, validated at construction
//! - **Stream probing** — dimensions, frame count, and frame rate read once
//!   when the video opens
//! - **Interval sampling** — lazy `(index, frame)` iteration with per-frame
//!   failure isolation
//! - **Provenance ledger** — `url,name,frame,path` CSV tables per video
//! - **Resilient batches** — cartesian-product orchestration that skips
//!   failed combinations, reports progress, and supports cooperative
//!   cancellation
//! - **Whole-video download** — lossless packet copy of a located segment
//! - **Timex compositing** — time-averaged exposure images over sampled
//!   frames
//!
//! ## Requirements
//!
//! FFmpeg development libraries (with network protocol support) must be
//! installed on your system.

pub mod batch;
pub mod download;
pub mod error;
pub mod ffmpeg;
pub mod ledger;
pub mod locator;
pub mod progress;
pub mod sampler;
pub mod timex;
pub mod video;

pub use batch::{
    BatchRequest, BatchSummary, CombinationReport, Outcome, run, run_with, run_with_opener,
};
pub use download::{download, download_url};
pub use error::WebcatError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use ledger::{FrameRecord, Ledger};
pub use locator::VideoLocator;
pub use progress::{BatchProgress, CancellationToken, ProgressCallback};
pub use sampler::{FrameSampler, sample_indices, sample_step};
pub use timex::average_frame;
pub use video::{FrameSource, VideoHandle};
