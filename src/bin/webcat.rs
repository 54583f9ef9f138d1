use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use webcat::{
    BatchProgress, BatchRequest, BatchSummary, FfmpegLogLevel, Outcome, ProgressCallback,
    VideoLocator,
};

const CLI_AFTER_HELP: &str = "Examples:\n  webcat --directory ./frames -s buxtoncoastalcam -y 2019 -m 11 -d 13 -t 1000 1330 1510\n  webcat --directory ./frames -s buxtoncoastalcam oakislandwest -y 2019 2020 -m 9 -d 1 -t 1000 -i 5 --no_meta -v\n  webcat --completions zsh > _webcat";

#[derive(Debug, Parser)]
#[command(
    name = "webcat",
    version,
    about = "Save subsampled frames of coastal webcam archive video(s)",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Directory to save frames in (must already exist).
    #[arg(long, value_parser = existing_directory, required_unless_present = "completions")]
    directory: Option<PathBuf>,

    /// Station name(s), e.g. buxtoncoastalcam.
    #[arg(short, long, num_args = 1.., required_unless_present = "completions")]
    station: Vec<String>,

    /// Video year(s), e.g. 2019 2020.
    #[arg(short, long, num_args = 1.., required_unless_present = "completions")]
    year: Vec<i32>,

    /// Video month(s), e.g. 9 10 11.
    #[arg(short, long, num_args = 1.., required_unless_present = "completions")]
    month: Vec<u32>,

    /// Video day(s), e.g. 1 11 21.
    #[arg(short, long, num_args = 1.., required_unless_present = "completions")]
    day: Vec<u32>,

    /// Video time(s) as 24-hour HHMM, e.g. 1000 1330 1510.
    #[arg(short, long, num_args = 1.., required_unless_present = "completions")]
    time: Vec<u32>,

    /// Seconds of video between saved frames.
    #[arg(short, long, default_value_t = 10.0, value_parser = positive_interval)]
    interval: f64,

    /// Don't save a .csv ledger of saved frame metadata.
    #[arg(short, long = "no_meta")]
    no_meta: bool,

    /// Print program status.
    #[arg(short, long)]
    verbose: bool,

    /// Also save each located video itself as <name>.mp4.
    #[arg(long)]
    download: bool,

    /// Print the run summary as JSON.
    #[arg(long)]
    json: bool,

    /// Generate shell completion scripts and exit.
    #[arg(long, value_enum)]
    completions: Option<Shell>,
}

/// Check that a passed directory exists, mirroring the clap error path.
fn existing_directory(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("{value} is not a valid directory path"))
    }
}

/// Reject non-positive intervals at parse time, so a bad `--interval` is an
/// argument error rather than a batch failure.
fn positive_interval(value: &str) -> Result<f64, String> {
    let interval: f64 = value
        .parse()
        .map_err(|_| format!("{value} is not a number of seconds"))?;
    if interval.is_finite() && interval > 0.0 {
        Ok(interval)
    } else {
        Err(format!("{value} is not a positive number of seconds"))
    }
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, progress: &BatchProgress) {
        self.bar.set_message(progress.name.clone());
        self.bar.inc(1);
    }
}

fn summary_json(summary: &BatchSummary) -> serde_json::Value {
    json!({
        "total": summary.reports.len(),
        "saved": summary.successes(),
        "failed": summary.failures(),
        "cancelled": summary.cancelled,
        "videos": summary.reports.iter().map(|report| {
            match &report.outcome {
                Outcome::Saved { frames_saved } => json!({
                    "name": report.name,
                    "station": report.station,
                    "status": "saved",
                    "frames_saved": frames_saved,
                }),
                Outcome::Failed { error } => json!({
                    "name": report.name,
                    "station": report.station,
                    "status": "failed",
                    "error": error.to_string(),
                    "retryable": error.is_retryable(),
                }),
            }
        }).collect::<Vec<_>>(),
    })
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "webcat", &mut std::io::stdout());
        return Ok(());
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "info" } else { "warn" }),
    )
    .init();

    // Probing absent archive URLs is routine; keep FFmpeg quiet about it.
    webcat::set_ffmpeg_log_level(if cli.verbose {
        FfmpegLogLevel::Warning
    } else {
        FfmpegLogLevel::Quiet
    });

    let mut request =
        BatchRequest::new(cli.directory.ok_or("--directory is required")?);
    request.stations = cli.station;
    request.years = cli.year;
    request.months = cli.month;
    request.days = cli.day;
    request.times = cli.time;
    request.interval = cli.interval;
    request.write_metadata = !cli.no_meta;
    request.verbose = cli.verbose;

    let bar = ProgressBar::new(request.combination_count());
    let style =
        ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
    bar.set_style(style.progress_chars("##-"));
    let progress = TerminalProgress { bar };

    let summary = webcat::run_with(&request, &progress, None)?;
    progress.bar.finish_and_clear();

    if cli.download {
        for report in summary.reports.iter().filter(|report| report.succeeded()) {
            let locator = VideoLocator::build(
                &report.station,
                report.year,
                report.month,
                report.day,
                report.time,
            )?;
            let output = request
                .directory
                .join(&report.station)
                .join(locator.name())
                .join(format!("{}.mp4", locator.name()));
            if cli.verbose {
                eprintln!("Saving video {}...", output.display());
            }
            if let Err(error) = webcat::download(&locator, &output) {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("download of {} failed: {error}", report.name).yellow()
                );
            }
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary_json(&summary))?);
        return Ok(());
    }

    if cli.verbose {
        for report in &summary.reports {
            if let Outcome::Failed { error } = &report.outcome {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("{}: {error}... Skipping.", report.name).yellow()
                );
            }
        }
    }

    let frames_total: u64 = summary
        .reports
        .iter()
        .map(|report| match report.outcome {
            Outcome::Saved { frames_saved } => frames_saved,
            Outcome::Failed { .. } => 0,
        })
        .sum();
    println!(
        "{} {}",
        "done:".green().bold(),
        format!(
            "saved {} of {} video(s), {frames_total} frame(s)",
            summary.successes(),
            summary.reports.len(),
        )
        .green()
    );
    if summary.failures() > 0 && !cli.verbose {
        println!(
            "{}",
            format!("{} video(s) skipped; re-run with --verbose for details", summary.failures())
                .yellow()
        );
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{existing_directory, positive_interval};

    #[test]
    fn existing_directory_accepts_a_real_directory() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let value = dir.path().to_str().expect("utf-8 path");
        assert!(existing_directory(value).is_ok());
    }

    #[test]
    fn existing_directory_rejects_missing_paths() {
        let result = existing_directory("definitely/not/a/real/directory");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("not a valid directory"));
    }

    #[test]
    fn positive_interval_accepts_fractional_seconds() {
        assert_eq!(positive_interval("10"), Ok(10.0));
        assert_eq!(positive_interval("0.5"), Ok(0.5));
    }

    #[test]
    fn positive_interval_rejects_zero_negative_and_garbage() {
        assert!(positive_interval("0").is_err());
        assert!(positive_interval("-3").is_err());
        assert!(positive_interval("inf").is_err());
        assert!(positive_interval("soon").is_err());
    }
}
