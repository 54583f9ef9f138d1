//! FFmpeg console log level control.
//!
//! FFmpeg has its own logging system, separate from the Rust
//! [`log`](https://crates.io/crates/log) crate, and by default prints
//! warnings and errors straight to stderr. Probing candidate archive URLs is
//! expected to fail often (many station/date/time combinations simply have no
//! video), so an unquieted FFmpeg floods the console with noise that tells
//! the user nothing the batch summary doesn't. The CLI sets the level to
//! [`Quiet`](FfmpegLogLevel::Quiet) unless run with `--verbose`.
//!
//! This controls **FFmpeg's own console output** only; Rust-side diagnostics
//! go through the `log` facade as usual.

use ffmpeg_next::util::log::Level;

/// FFmpeg internal log verbosity level.
///
/// Maps directly to FFmpeg's `AV_LOG_*` constants; setting a level makes
/// FFmpeg suppress all messages below that severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print no output at all.
    Quiet,
    /// Only unrecoverable errors that abort the process.
    Panic,
    /// Only unrecoverable errors (the context becomes invalid).
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default level).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Extremely verbose tracing output.
    Trace,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

/// Set the FFmpeg internal log verbosity level.
///
/// # Example
///
/// ```no_run
/// use webcat::FfmpegLogLevel;
///
/// // Silence FFmpeg while probing archive URLs.
/// webcat::set_ffmpeg_log_level(FfmpegLogLevel::Quiet);
/// ```
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}
