//! Batch orchestration tests.
//!
//! These run the full orchestrator against synthetic frame sources, so the
//! directory layout, ledger contents, failure isolation, and cancellation
//! semantics are exercised without FFmpeg or the network.

use std::fs;
use std::path::Path;

use image::DynamicImage;
use webcat::{
    BatchProgress, BatchRequest, CancellationToken, FrameSource, Outcome, ProgressCallback,
    VideoLocator, WebcatError, run_with_opener,
};

/// A synthetic 372-frame, 6.2 fps video; every frame decodes.
struct SyntheticVideo;

impl FrameSource for SyntheticVideo {
    fn width(&self) -> u32 {
        4
    }

    fn height(&self) -> u32 {
        4
    }

    fn frame_count(&self) -> u64 {
        372
    }

    fn frames_per_second(&self) -> f64 {
        6.2
    }

    fn read_frame(&mut self, frame_index: u64) -> Result<DynamicImage, WebcatError> {
        if frame_index >= self.frame_count() {
            return Err(WebcatError::FrameOutOfRange {
                frame_index,
                frame_count: self.frame_count(),
            });
        }
        Ok(DynamicImage::new_rgb8(4, 4))
    }
}

/// With a 10-second interval at 6.2 fps, a 372-frame video samples 6 frames.
const FRAMES_PER_VIDEO: u64 = 6;

struct Silent;

impl ProgressCallback for Silent {
    fn on_progress(&self, _progress: &BatchProgress) {}
}

fn request_for(dir: &Path, times: &[u32]) -> BatchRequest {
    let mut request = BatchRequest::new(dir);
    request.stations = vec!["buxtoncoastalcam".to_string()];
    request.years = vec![2019];
    request.months = vec![11];
    request.days = vec![13];
    request.times = times.to_vec();
    request
}

fn open_always(_locator: &VideoLocator) -> Result<SyntheticVideo, WebcatError> {
    Ok(SyntheticVideo)
}

#[test]
fn three_available_videos_produce_three_full_output_trees() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let request = request_for(dir.path(), &[1000, 1330, 1510]);

    let summary = run_with_opener(&request, open_always, &Silent, None).expect("batch runs");

    assert_eq!(summary.successes(), 3);
    assert_eq!(summary.failures(), 0);
    assert!(!summary.cancelled);
    assert_eq!(summary.ledger.len(), 3 * FRAMES_PER_VIDEO as usize);

    for time in [1000, 1330, 1510] {
        let name = format!("buxtoncoastalcam_2019_11_13_{time}");
        let video_dir = dir.path().join("buxtoncoastalcam").join(&name);
        for frame_index in [0, 62, 124, 186, 248, 310] {
            assert!(
                video_dir.join("jpg").join(format!("frame_{frame_index}.jpg")).is_file(),
                "missing frame {frame_index} for {name}",
            );
        }

        let csv = fs::read_to_string(video_dir.join(format!("{name}.csv"))).expect("csv exists");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "url,name,frame,path");
        assert_eq!(lines.len() as u64, 1 + FRAMES_PER_VIDEO);
        assert!(lines[1].contains(&name));
    }
}

#[test]
fn an_unavailable_middle_video_does_not_disturb_its_neighbours() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let request = request_for(dir.path(), &[1000, 1330, 1510]);

    let opener = |locator: &VideoLocator| {
        if locator.time() == 1330 {
            Err(WebcatError::VideoUnavailable {
                url: locator.url().to_string(),
                reason: "no such segment".to_string(),
            })
        } else {
            Ok(SyntheticVideo)
        }
    };
    let summary = run_with_opener(&request, opener, &Silent, None).expect("batch runs");

    assert_eq!(summary.successes(), 2);
    assert_eq!(summary.failures(), 1);

    let failed = &summary.reports[1];
    assert_eq!(failed.time, 1330);
    assert!(matches!(
        failed.outcome,
        Outcome::Failed { error: WebcatError::VideoUnavailable { .. } },
    ));

    for time in [1000, 1510] {
        let name = format!("buxtoncoastalcam_2019_11_13_{time}");
        let video_dir = dir.path().join("buxtoncoastalcam").join(&name);
        let csv = fs::read_to_string(video_dir.join(format!("{name}.csv"))).expect("csv exists");
        assert_eq!(csv.lines().count() as u64, 1 + FRAMES_PER_VIDEO);
    }
    // Nothing was written for the unavailable combination.
    assert!(
        !dir.path()
            .join("buxtoncoastalcam")
            .join("buxtoncoastalcam_2019_11_13_1330")
            .exists()
    );
}

#[test]
fn an_invalid_time_fails_only_its_own_combination() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let request = request_for(dir.path(), &[1000, 2400]);

    let summary = run_with_opener(&request, open_always, &Silent, None).expect("batch runs");

    assert_eq!(summary.successes(), 1);
    assert_eq!(summary.failures(), 1);
    assert!(matches!(
        summary.reports[1].outcome,
        Outcome::Failed { error: WebcatError::InvalidParameter { field: "time", .. } },
    ));
}

#[test]
fn no_meta_suppresses_csv_files_but_keeps_the_in_memory_ledger() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut request = request_for(dir.path(), &[1000]);
    request.write_metadata = false;

    let summary = run_with_opener(&request, open_always, &Silent, None).expect("batch runs");

    assert_eq!(summary.successes(), 1);
    assert_eq!(summary.ledger.len(), FRAMES_PER_VIDEO as usize);

    let name = "buxtoncoastalcam_2019_11_13_1000";
    let video_dir = dir.path().join("buxtoncoastalcam").join(name);
    assert!(video_dir.join("jpg").join("frame_0.jpg").is_file());
    assert!(!video_dir.join(format!("{name}.csv")).exists());
}

#[test]
fn stations_iterate_outermost_then_times() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut request = request_for(dir.path(), &[1000, 1330]);
    request.stations = vec!["north".to_string(), "south".to_string()];

    let summary = run_with_opener(&request, open_always, &Silent, None).expect("batch runs");

    let names: Vec<&str> = summary.reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "north_2019_11_13_1000",
            "north_2019_11_13_1330",
            "south_2019_11_13_1000",
            "south_2019_11_13_1330",
        ],
    );
}

#[test]
fn empty_selector_sets_are_fatal_to_the_run() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut request = request_for(dir.path(), &[1000]);
    request.stations.clear();

    let error = run_with_opener(&request, open_always, &Silent, None).unwrap_err();
    assert!(matches!(
        error,
        WebcatError::InvalidParameter { field: "stations", .. },
    ));
}

#[test]
fn a_missing_output_directory_is_fatal_to_the_run() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("nope");
    let request = request_for(&missing, &[1000]);

    assert!(run_with_opener(&request, open_always, &Silent, None).is_err());
}

#[test]
fn non_positive_interval_is_fatal_to_the_run() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut request = request_for(dir.path(), &[1000]);
    request.interval = 0.0;

    assert!(run_with_opener(&request, open_always, &Silent, None).is_err());
}

/// Cancels the batch as soon as the first combination reports.
struct CancelAfterFirst {
    token: CancellationToken,
}

impl ProgressCallback for CancelAfterFirst {
    fn on_progress(&self, _progress: &BatchProgress) {
        self.token.cancel();
    }
}

#[test]
fn cancellation_between_combinations_keeps_finished_outputs() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let request = request_for(dir.path(), &[1000, 1330, 1510]);

    let token = CancellationToken::new();
    let progress = CancelAfterFirst {
        token: token.clone(),
    };
    let summary =
        run_with_opener(&request, open_always, &progress, Some(&token)).expect("batch runs");

    assert!(summary.cancelled);
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.successes(), 1);

    // The finished combination's outputs are intact, the rest never started.
    let name = "buxtoncoastalcam_2019_11_13_1000";
    let video_dir = dir.path().join("buxtoncoastalcam").join(name);
    assert!(video_dir.join(format!("{name}.csv")).is_file());
    assert!(
        !dir.path()
            .join("buxtoncoastalcam")
            .join("buxtoncoastalcam_2019_11_13_1330")
            .exists()
    );
}

#[test]
fn progress_reports_arrive_once_per_combination() {
    use std::sync::atomic::{AtomicU64, Ordering};

    struct Counting {
        seen: AtomicU64,
    }

    impl ProgressCallback for Counting {
        fn on_progress(&self, progress: &BatchProgress) {
            self.seen.fetch_add(1, Ordering::SeqCst);
            assert_eq!(progress.total, 3);
            assert_eq!(progress.frames_saved, FRAMES_PER_VIDEO);
            assert!(progress.succeeded);
        }
    }

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let request = request_for(dir.path(), &[1000, 1330, 1510]);
    let progress = Counting {
        seen: AtomicU64::new(0),
    };

    let summary = run_with_opener(&request, open_always, &progress, None).expect("batch runs");

    assert_eq!(summary.reports.len(), 3);
    assert_eq!(progress.seen.load(std::sync::atomic::Ordering::SeqCst), 3);
}
