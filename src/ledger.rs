//! Frame provenance ledger.
//!
//! Every extracted frame is recorded as a [`FrameRecord`] naming its source
//! URL, derived video name, frame index, and the image file it was written
//! to. The [`Ledger`] is an append-only, insertion-ordered sequence that can
//! be persisted as a comma-separated table, either whole or filtered to one
//! video's rows.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::error::WebcatError;

/// CSV header shared by every flushed ledger table.
const LEDGER_HEADER: &str = "url,name,frame,path";

/// Provenance of one extracted frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct FrameRecord {
    /// Source URL of the video the frame came from.
    pub url: String,
    /// Derived name of the video (see [`VideoLocator::name`](crate::VideoLocator::name)).
    pub name: String,
    /// 0-based index of the frame within the video.
    pub frame_index: u64,
    /// Path the frame image was written to.
    pub output_path: PathBuf,
}

/// Append-only record of every extracted frame in a run.
///
/// Rows keep insertion order. [`flush`](Ledger::flush) persists the whole
/// ledger; [`flush_video`](Ledger::flush_video) persists a single video's
/// rows, which is what the batch orchestrator writes next to each frame
/// directory.
///
/// # Example
///
/// ```
/// use webcat::Ledger;
///
/// let mut ledger = Ledger::new();
/// ledger.record("http://example/v.mp4", "cam_2019_11_13_1000", 0, "jpg/frame_0.jpg");
/// ledger.record("http://example/v.mp4", "cam_2019_11_13_1000", 62, "jpg/frame_62.jpg");
/// assert_eq!(ledger.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    rows: Vec<FrameRecord>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one row for an extracted frame.
    pub fn record(
        &mut self,
        url: impl Into<String>,
        name: impl Into<String>,
        frame_index: u64,
        output_path: impl Into<PathBuf>,
    ) {
        self.rows.push(FrameRecord {
            url: url.into(),
            name: name.into(),
            frame_index,
            output_path: output_path.into(),
        });
    }

    /// All rows, in insertion order.
    pub fn rows(&self) -> &[FrameRecord] {
        &self.rows
    }

    /// Number of recorded rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the ledger holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Persist the full ledger as a CSV table, overwriting `path`.
    ///
    /// # Errors
    ///
    /// Returns [`WebcatError::Io`] when the file cannot be written.
    pub fn flush<P: AsRef<Path>>(&self, path: P) -> Result<(), WebcatError> {
        self.write_rows(path.as_ref(), |_| true)
    }

    /// Persist only the rows belonging to one video, overwriting `path`.
    ///
    /// # Errors
    ///
    /// Returns [`WebcatError::Io`] when the file cannot be written.
    pub fn flush_video<P: AsRef<Path>>(&self, name: &str, path: P) -> Result<(), WebcatError> {
        self.write_rows(path.as_ref(), |row| row.name == name)
    }

    fn write_rows<F>(&self, path: &Path, mut keep: F) -> Result<(), WebcatError>
    where
        F: FnMut(&FrameRecord) -> bool,
    {
        let mut file = BufWriter::new(File::create(path)?);
        writeln!(file, "{LEDGER_HEADER}")?;
        for row in self.rows.iter().filter(|row| keep(row)) {
            writeln!(
                file,
                "{},{},{},{}",
                row.url,
                row.name,
                row.frame_index,
                row.output_path.display(),
            )?;
        }
        file.flush()?;
        Ok(())
    }
}
