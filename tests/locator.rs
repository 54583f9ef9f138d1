//! Locator construction tests.
//!
//! The locator is a pure function of its inputs: same parameters, same URL
//! and name, every time, with no I/O.

use webcat::{VideoLocator, WebcatError};

#[test]
fn builds_the_reference_url() {
    let locator = VideoLocator::build("buxtoncoastalcam", 2019, 11, 13, 1000)
        .expect("valid reference parameters");
    assert_eq!(
        locator.url(),
        "http://webcat-video.axds.co/buxtoncoastalcam/raw/2019/2019_11/2019_11_13/buxtoncoastalcam.2019-11-13_1000.mp4",
    );
    assert_eq!(locator.name(), "buxtoncoastalcam_2019_11_13_1000");
}

#[test]
fn is_deterministic() {
    let first = VideoLocator::build("oakislandwest", 2020, 2, 9, 730).expect("valid");
    let second = VideoLocator::build("oakislandwest", 2020, 2, 9, 730).expect("valid");
    assert_eq!(first, second);
    assert_eq!(first.url(), second.url());
    assert_eq!(first.name(), second.name());
}

#[test]
fn pads_single_digit_date_and_time_in_the_url_only() {
    let locator = VideoLocator::build("staugustinepier", 2020, 5, 3, 30).expect("valid");
    assert!(locator.url().contains("/2020/2020_05/2020_05_03/"));
    assert!(locator.url().ends_with("staugustinepier.2020-05-03_0030.mp4"));
    // The derived name keeps the caller's unpadded components.
    assert_eq!(locator.name(), "staugustinepier_2020_5_3_30");
}

#[test]
fn exposes_its_components() {
    let locator = VideoLocator::build("buxtoncoastalcam", 2019, 11, 13, 1510).expect("valid");
    assert_eq!(locator.station(), "buxtoncoastalcam");
    assert_eq!(locator.year(), 2019);
    assert_eq!(locator.month(), 11);
    assert_eq!(locator.day(), 13);
    assert_eq!(locator.time(), 1510);
}

// ── Parameter validation ─────────────────────────────────────────

#[test]
fn rejects_empty_station() {
    let error = VideoLocator::build("", 2019, 11, 13, 1000).unwrap_err();
    assert!(matches!(
        error,
        WebcatError::InvalidParameter { field: "station", .. },
    ));
}

#[test]
fn rejects_station_with_path_separator() {
    assert!(VideoLocator::build("bad/station", 2019, 11, 13, 1000).is_err());
}

#[test]
fn rejects_out_of_range_years() {
    assert!(VideoLocator::build("cam", 999, 11, 13, 1000).is_err());
    assert!(VideoLocator::build("cam", 10_000, 11, 13, 1000).is_err());
    assert!(VideoLocator::build("cam", 2019, 11, 13, 1000).is_ok());
}

#[test]
fn rejects_out_of_range_months() {
    assert!(VideoLocator::build("cam", 2019, 0, 13, 1000).is_err());
    assert!(VideoLocator::build("cam", 2019, 13, 13, 1000).is_err());
    assert!(VideoLocator::build("cam", 2019, 12, 13, 1000).is_ok());
}

#[test]
fn rejects_out_of_range_days() {
    assert!(VideoLocator::build("cam", 2019, 11, 0, 1000).is_err());
    assert!(VideoLocator::build("cam", 2019, 11, 32, 1000).is_err());
    // Days are range-checked, not calendar-checked.
    assert!(VideoLocator::build("cam", 2019, 2, 31, 1000).is_ok());
}

#[test]
fn rejects_malformed_times() {
    assert!(VideoLocator::build("cam", 2019, 11, 13, 2400).is_err());
    assert!(VideoLocator::build("cam", 2019, 11, 13, 1060).is_err());
    assert!(VideoLocator::build("cam", 2019, 11, 13, 0).is_ok());
    assert!(VideoLocator::build("cam", 2019, 11, 13, 2359).is_ok());
}

#[test]
fn invalid_parameter_errors_name_the_field() {
    let error = VideoLocator::build("cam", 2019, 14, 13, 1000).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("month"), "unexpected message: {message}");
    assert!(!error.is_retryable());
}
