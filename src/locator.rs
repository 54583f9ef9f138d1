//! Archive video locators.
//!
//! A [`VideoLocator`] identifies exactly one video segment in the WebCAT
//! archive by station, calendar date, and 24-hour time. Construction derives
//! the canonical retrieval URL and a unique per-video name used for output
//! directories and ledger rows. Locators are pure values: building one
//! performs no I/O and the same inputs always produce the same locator.
//!
//! # Example
//!
//! ```
//! use webcat::VideoLocator;
//!
//! let locator = VideoLocator::build("buxtoncoastalcam", 2019, 11, 13, 1000)?;
//! assert_eq!(
//!     locator.url(),
//!     "http://webcat-video.axds.co/buxtoncoastalcam/raw/2019/2019_11/2019_11_13/buxtoncoastalcam.2019-11-13_1000.mp4",
//! );
//! assert_eq!(locator.name(), "buxtoncoastalcam_2019_11_13_1000");
//! # Ok::<(), webcat::WebcatError>(())
//! ```

use crate::error::WebcatError;

/// Base URL of the archive's video store.
const ARCHIVE_ROOT: &str = "http://webcat-video.axds.co";

/// Identifies one archived video segment and its derived retrieval URL.
///
/// Built via [`VideoLocator::build`], which validates every field. Fields are
/// private so a locator can never hold an out-of-range value or a URL that
/// disagrees with its components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[must_use]
pub struct VideoLocator {
    station: String,
    year: i32,
    month: u32,
    day: u32,
    time: u32,
    url: String,
    name: String,
}

impl VideoLocator {
    /// Build a locator from station/date/time parameters.
    ///
    /// `time` is a 24-hour HHMM value (`1000` for 10:00, `1330` for 13:30);
    /// the archive stores segments rounded to ten-minute marks but any valid
    /// HHMM is accepted here. `day` is range-checked (1–31) but not validated
    /// against the calendar; a nonexistent date simply yields a locator with
    /// no video behind it.
    ///
    /// # Errors
    ///
    /// Returns [`WebcatError::InvalidParameter`] naming the first field out
    /// of its declared range.
    pub fn build(
        station: &str,
        year: i32,
        month: u32,
        day: u32,
        time: u32,
    ) -> Result<Self, WebcatError> {
        if station.is_empty() || station.contains('/') || station.contains(char::is_whitespace) {
            return Err(WebcatError::InvalidParameter {
                field: "station",
                value: station.to_string(),
                expected: "a non-empty name without slashes or whitespace",
            });
        }
        if !(1000..=9999).contains(&year) {
            return Err(WebcatError::InvalidParameter {
                field: "year",
                value: year.to_string(),
                expected: "a 4-digit year",
            });
        }
        if !(1..=12).contains(&month) {
            return Err(WebcatError::InvalidParameter {
                field: "month",
                value: month.to_string(),
                expected: "a month between 1 and 12",
            });
        }
        if !(1..=31).contains(&day) {
            return Err(WebcatError::InvalidParameter {
                field: "day",
                value: day.to_string(),
                expected: "a day between 1 and 31",
            });
        }
        let (hour, minute) = (time / 100, time % 100);
        if hour > 23 || minute > 59 {
            return Err(WebcatError::InvalidParameter {
                field: "time",
                value: format!("{time:04}"),
                expected: "a 24-hour HHMM value between 0000 and 2359",
            });
        }

        // The archive lays videos out per station, then per year / month /
        // day, with the segment file named after station, date, and time.
        let url = format!(
            "{ARCHIVE_ROOT}/{station}/raw/{year}/{year}_{month:02}/{year}_{month:02}_{day:02}/{station}.{year}-{month:02}-{day:02}_{time:04}.mp4"
        );
        // Name components stay unpadded; the name keys output directories and
        // ledger rows, not archive paths.
        let name = format!("{station}_{year}_{month}_{day}_{time}");

        Ok(Self {
            station: station.to_string(),
            year,
            month,
            day,
            time,
            url,
            name,
        })
    }

    /// The station this locator points at.
    pub fn station(&self) -> &str {
        &self.station
    }

    /// The video's year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The video's month (1–12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The video's day of month (1–31).
    pub fn day(&self) -> u32 {
        self.day
    }

    /// The video's 24-hour HHMM time.
    pub fn time(&self) -> u32 {
        self.time
    }

    /// The canonical retrieval URL for this video segment.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The unique per-video name (`station_year_month_day_time`).
    pub fn name(&self) -> &str {
        &self.name
    }
}
