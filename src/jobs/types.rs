//! Job runner types

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Lookback window of the grouped daily job
pub const GROUPED_DAILY_LOOKBACK_DAYS: i64 = 1460;

/// Lookback window of the aggregates job
pub const AGGREGATES_LOOKBACK_DAYS: i64 = 1095;

/// Which batch job to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum JobKind {
    GroupedDaily,
    Aggregates,
}

impl JobKind {
    /// Default lookback of this job
    pub fn lookback_days(self) -> i64 {
        match self {
            JobKind::GroupedDaily => GROUPED_DAILY_LOOKBACK_DAYS,
            JobKind::Aggregates => AGGREGATES_LOOKBACK_DAYS,
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobKind::GroupedDaily => "grouped_daily",
            JobKind::Aggregates => "aggregates",
        })
    }
}

/// How the date range of a job is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RunMode {
    /// Lookback window ending today; existing files make this incremental
    #[default]
    Latest,
    /// Configured start/end dates
    Historical,
}

impl RunMode {
    /// Resolve the inclusive date range to fetch
    ///
    /// Historical mode falls back to today for a missing end date and to
    /// `end - lookback` for a missing start date.
    pub fn date_range(
        self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        lookback_days: i64,
        today: NaiveDate,
    ) -> (NaiveDate, NaiveDate) {
        let lookback = Duration::days(lookback_days);
        match self {
            RunMode::Latest => (today - lookback, today),
            RunMode::Historical => {
                let end = end.unwrap_or(today);
                (start.unwrap_or(end - lookback), end)
            }
        }
    }
}

/// One unit of work: a single call whose result becomes one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTask {
    pub date: NaiveDate,
    pub ticker: Option<String>,
    pub path: PathBuf,
}

impl fmt::Display for JobTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ticker {
            Some(t) => write!(f, "{t} {}", self.date),
            None => write!(f, "{}", self.date),
        }
    }
}

/// What happened to one task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Written(usize),
    Skipped,
    Empty,
    Failed,
}

/// Counts of a finished job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    /// Files written
    pub written: usize,
    /// Tasks whose file already existed
    pub skipped: usize,
    /// Calls that returned no rows
    pub empty: usize,
    /// Calls that failed
    pub failed: usize,
    /// Rows across all written files
    pub rows: usize,
}

impl JobSummary {
    /// Account for one task
    pub fn record(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Written(rows) => {
                self.written += 1;
                self.rows += rows;
            }
            TaskOutcome::Skipped => self.skipped += 1,
            TaskOutcome::Empty => self.empty += 1,
            TaskOutcome::Failed => self.failed += 1,
        }
    }

    /// Total tasks seen
    pub fn total(&self) -> usize {
        self.written + self.skipped + self.empty + self.failed
    }

    /// True when no task failed
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} written ({} rows), {} skipped, {} empty, {} failed",
            self.written, self.rows, self.skipped, self.empty, self.failed
        )
    }
}
