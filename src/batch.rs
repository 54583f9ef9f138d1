//! Batch orchestration over station/date/time selections.
//!
//! A [`BatchRequest`] names the cartesian product of stations, years,
//! months, days, and times to retrieve. [`run`] walks the product in
//! declared order (stations outermost, then year, month, day, time), and for
//! each combination builds the locator, opens the video, samples frames at
//! the requested interval, writes them under
//! `directory/station/name/jpg/frame_<index>.jpg`, and records every write
//! in the run [`Ledger`]. A failed combination is reported and skipped; it
//! never aborts the batch. When metadata persistence is enabled, each
//! successful video gets a `name.csv` table next to its frame directory
//! after the batch completes.
//!
//! # Example
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

use std::{fs, path::PathBuf};

use crate::{
    error::WebcatError,
    ledger::Ledger,
    locator::VideoLocator,
    progress::{BatchProgress, CancellationToken, NoOpProgress, ProgressCallback},
    sampler::FrameSampler,
    video::{FrameSource, VideoHandle},
};

/// One batch of retrieval work, validated once before orchestration.
///
/// The five selector sets span a cartesian product; every field is read-only
/// once [`run`] starts.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Root directory frames are saved under.
    pub directory: PathBuf,
    /// Station names, e.g. `"buxtoncoastalcam"`.
    pub stations: Vec<String>,
    /// 4-digit years.
    pub years: Vec<i32>,
    /// Months, 1–12.
    pub months: Vec<u32>,
    /// Days of month, 1–31.
    pub days: Vec<u32>,
    /// 24-hour HHMM times, e.g. `1000`, `1330`.
    pub times: Vec<u32>,
    /// Seconds between sampled frames.
    pub interval: f64,
    /// Whether to persist per-video CSV ledgers.
    pub write_metadata: bool,
    /// Whether to log per-combination status at `info`/`warn` rather than
    /// `debug` level.
    pub verbose: bool,
}

impl BatchRequest {
    /// A request rooted at `directory` with the default 10-second interval,
    /// metadata persistence on, and empty selector sets.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            stations: Vec::new(),
            years: Vec::new(),
            months: Vec::new(),
            days: Vec::new(),
            times: Vec::new(),
            interval: 10.0,
            write_metadata: true,
            verbose: false,
        }
    }

    /// Check the top-level batch parameters.
    ///
    /// Per-combination parameter ranges are the locator's concern; this only
    /// rejects what would invalidate the whole run.
    ///
    /// # Errors
    ///
    /// Returns [`WebcatError::InvalidParameter`] for an empty selector set, a
    /// non-positive interval, or a missing output directory.
    pub fn validate(&self) -> Result<(), WebcatError> {
        if !self.directory.is_dir() {
            return Err(WebcatError::InvalidParameter {
                field: "directory",
                value: self.directory.display().to_string(),
                expected: "an existing directory",
            });
        }
        for (field, is_empty) in [
            ("stations", self.stations.is_empty()),
            ("years", self.years.is_empty()),
            ("months", self.months.is_empty()),
            ("days", self.days.is_empty()),
            ("times", self.times.is_empty()),
        ] {
            if is_empty {
                return Err(WebcatError::InvalidParameter {
                    field,
                    value: "[]".to_string(),
                    expected: "at least one value",
                });
            }
        }
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(WebcatError::InvalidParameter {
                field: "interval",
                value: self.interval.to_string(),
                expected: "a positive number of seconds",
            });
        }
        Ok(())
    }

    /// Number of combinations the request spans.
    pub fn combination_count(&self) -> u64 {
        (self.stations.len()
            * self.years.len()
            * self.months.len()
            * self.days.len()
            * self.times.len()) as u64
    }
}

/// What happened to one combination.
#[derive(Debug)]
pub enum Outcome {
    /// The video was located, sampled, and persisted.
    Saved {
        /// Number of frame images written.
        frames_saved: u64,
    },
    /// The combination failed at some stage and was skipped.
    Failed {
        /// The failure, classified per the crate taxonomy.
        error: WebcatError,
    },
}

/// Per-combination record in the run summary.
#[derive(Debug)]
pub struct CombinationReport {
    /// Station of this combination.
    pub station: String,
    /// Year of this combination.
    pub year: i32,
    /// Month of this combination.
    pub month: u32,
    /// Day of this combination.
    pub day: u32,
    /// HHMM time of this combination.
    pub time: u32,
    /// Derived video name (`station_year_month_day_time`).
    pub name: String,
    /// How the combination ended.
    pub outcome: Outcome,
}

impl CombinationReport {
    /// Whether this combination saved its frames.
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Saved { .. })
    }
}

/// The inspectable result of a batch run.
#[derive(Debug)]
#[must_use]
pub struct BatchSummary {
    /// One report per processed combination, in iteration order.
    pub reports: Vec<CombinationReport>,
    /// The run ledger: one row per frame written, in write order.
    pub ledger: Ledger,
    /// Whether the batch stopped early on a cancellation request.
    pub cancelled: bool,
}

impl BatchSummary {
    /// Number of combinations that saved frames.
    pub fn successes(&self) -> usize {
        self.reports.iter().filter(|r| r.succeeded()).count()
    }

    /// Number of combinations that failed.
    pub fn failures(&self) -> usize {
        self.reports.len() - self.successes()
    }
}

/// Run a batch with no progress reporting or cancellation.
///
/// See [`run_with`] for the full contract.
///
/// # Errors
///
/// Returns an error only when [`BatchRequest::validate`] rejects the request;
/// per-combination failures surface in the [`BatchSummary`] instead.
pub fn run(request: &BatchRequest) -> Result<BatchSummary, WebcatError> {
    run_with(request, &NoOpProgress, None)
}

/// Run a batch, reporting after each combination and honouring a
/// cancellation token between combinations.
///
/// Videos are opened over the network with [`VideoHandle::open`]; everything
/// else is as [`run_with_opener`].
///
/// # Errors
///
/// Returns an error only when [`BatchRequest::validate`] rejects the request.
pub fn run_with(
    request: &BatchRequest,
    progress: &dyn ProgressCallback,
    cancel: Option<&CancellationToken>,
) -> Result<BatchSummary, WebcatError> {
    run_with_opener(request, VideoHandle::open, progress, cancel)
}

/// Run a batch against an injected video-opening capability.
///
/// `opener` turns a locator into a [`FrameSource`]; production code passes
/// [`VideoHandle::open`], tests pass stubs. Every per-combination failure
/// (invalid parameter, unavailable video, network or I/O trouble) is caught
/// at this boundary, converted into a [`Failed`](Outcome::Failed) report, and
/// the batch moves on. The cancellation token is checked between
/// combinations only, so a cancelled run still finishes the video in flight.
///
/// # Errors
///
/// Returns an error only when [`BatchRequest::validate`] rejects the request.
pub fn run_with_opener<S, F>(
    request: &BatchRequest,
    mut opener: F,
    progress: &dyn ProgressCallback,
    cancel: Option<&CancellationToken>,
) -> Result<BatchSummary, WebcatError>
where
    S: FrameSource,
    F: FnMut(&VideoLocator) -> Result<S, WebcatError>,
{
    request.validate()?;

    let total = request.combination_count();
    let mut ledger = Ledger::new();
    let mut reports: Vec<CombinationReport> = Vec::with_capacity(total as usize);
    // (report index, video name, csv path) for the post-batch metadata pass.
    let mut csv_targets: Vec<(usize, String, PathBuf)> = Vec::new();
    let mut cancelled = false;

    'batch: for station in &request.stations {
        for &year in &request.years {
            for &month in &request.months {
                for &day in &request.days {
                    for &time in &request.times {
                        if cancel.is_some_and(CancellationToken::is_cancelled) {
                            cancelled = true;
                            break 'batch;
                        }

                        let name = format!("{station}_{year}_{month}_{day}_{time}");
                        let outcome = match process_combination(
                            request,
                            &mut opener,
                            &mut ledger,
                            station,
                            year,
                            month,
                            day,
                            time,
                        ) {
                            Ok((frames_saved, csv_path)) => {
                                csv_targets.push((reports.len(), name.clone(), csv_path));
                                Outcome::Saved { frames_saved }
                            }
                            Err(error) => {
                                if request.verbose {
                                    log::warn!("Skipping {name}: {error}");
                                } else {
                                    log::debug!("Skipping {name}: {error}");
                                }
                                Outcome::Failed { error }
                            }
                        };

                        let frames_saved = match &outcome {
                            Outcome::Saved { frames_saved } => *frames_saved,
                            Outcome::Failed { .. } => 0,
                        };
                        reports.push(CombinationReport {
                            station: station.clone(),
                            year,
                            month,
                            day,
                            time,
                            name: name.clone(),
                            outcome,
                        });

                        progress.on_progress(&BatchProgress {
                            name,
                            completed: reports.len() as u64,
                            total,
                            frames_saved,
                            succeeded: reports
                                .last()
                                .is_some_and(CombinationReport::succeeded),
                        });
                    }
                }
            }
        }
    }

    if request.write_metadata {
        for (report_index, name, csv_path) in csv_targets {
            if let Err(error) = ledger.flush_video(&name, &csv_path) {
                log::warn!("Failed to write ledger for {name}: {error}");
                reports[report_index].outcome = Outcome::Failed { error };
            }
        }
    }

    Ok(BatchSummary {
        reports,
        ledger,
        cancelled,
    })
}

/// Locate, open, sample, and persist one combination.
///
/// Returns the number of frames written and the path the per-video CSV
/// should be flushed to.
#[allow(clippy::too_many_arguments)]
fn process_combination<S, F>(
    request: &BatchRequest,
    opener: &mut F,
    ledger: &mut Ledger,
    station: &str,
    year: i32,
    month: u32,
    day: u32,
    time: u32,
) -> Result<(u64, PathBuf), WebcatError>
where
    S: FrameSource,
    F: FnMut(&VideoLocator) -> Result<S, WebcatError>,
{
    let locator = VideoLocator::build(station, year, month, day, time)?;
    let source = opener(&locator)?;

    let video_dir = request.directory.join(station).join(locator.name());
    let jpg_dir = video_dir.join("jpg");
    fs::create_dir_all(&jpg_dir)?;

    if request.verbose {
        log::info!("Saving frames of {}...", locator.name());
    } else {
        log::debug!("Saving frames of {}...", locator.name());
    }

    let mut frames_saved = 0_u64;
    for (frame_index, image) in FrameSampler::new(source, request.interval)? {
        let output_path = jpg_dir.join(format!("frame_{frame_index}.jpg"));
        image.save(&output_path)?;
        ledger.record(locator.url(), locator.name(), frame_index, &output_path);
        frames_saved += 1;
    }

    let csv_path = video_dir.join(format!("{}.csv", locator.name()));
    Ok((frames_saved, csv_path))
}
