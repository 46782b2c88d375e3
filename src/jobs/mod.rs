//! Batch job runner
//!
//! Turns a job section of the YAML config into one call per session date
//! (and per ticker for aggregates), writing each non-empty result to its
//! own Parquet file.
//!
//! # Overview
//!
//! - Dates come from a [`TradingCalendar`] over the range picked by [`RunMode`]
//! - A task whose file already exists is skipped unless `overwrite` is set
//! - A failed task is logged and counted; the batch keeps going
//! - Up to `concurrency` tasks are in flight at once
//!
//! Output layout:
//!
//! ```text
//! grouped_daily/{YYYY-MM-DD}.parquet
//! aggregates/{timespan}/{ticker}/{YYYY-MM-DD}.parquet
//! ```

mod types;

pub use types::{
    JobKind, JobSummary, JobTask, RunMode, TaskOutcome, AGGREGATES_LOOKBACK_DAYS,
    GROUPED_DAILY_LOOKBACK_DAYS,
};

use crate::calendar::TradingCalendar;
use crate::client::MarketDataClient;
use crate::config::{AggregatesJob, GroupedDailyJob, JobConfig, TickersJob};
use crate::endpoint::{Aggregates, GroupedDaily, Tickers};
use crate::error::{Error, Result, ResultExt};
use crate::output::{write_batch_to_parquet, ParquetWriterConfig};
use crate::records::{Record, ResultTable};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs grouped daily and aggregates jobs against one client
pub struct JobRunner {
    client: MarketDataClient,
    calendar: Arc<dyn TradingCalendar>,
    concurrency: usize,
    overwrite: bool,
    writer: ParquetWriterConfig,
    today: NaiveDate,
}

impl JobRunner {
    /// Create a runner; today is the current UTC date
    pub fn new(client: MarketDataClient, calendar: impl TradingCalendar + 'static) -> Self {
        Self {
            client,
            calendar: Arc::new(calendar),
            concurrency: 1,
            overwrite: false,
            writer: ParquetWriterConfig::default(),
            today: chrono::Utc::now().date_naive(),
        }
    }

    /// Tasks in flight at once
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Refetch tasks whose file already exists
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Parquet writer settings
    #[must_use]
    pub fn with_writer_config(mut self, writer: ParquetWriterConfig) -> Self {
        self.writer = writer;
        self
    }

    /// Pin the date `latest` mode counts back from
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Run the job `kind` from `config`
    pub async fn run(&self, config: &JobConfig, kind: JobKind, mode: RunMode) -> Result<JobSummary> {
        match kind {
            JobKind::GroupedDaily => {
                let job = config
                    .grouped_daily
                    .as_ref()
                    .ok_or_else(|| Error::missing_field("grouped_daily"))?;
                self.run_grouped_daily(job, mode).await
            }
            JobKind::Aggregates => {
                let job = config
                    .aggregates
                    .as_ref()
                    .ok_or_else(|| Error::missing_field("aggregates"))?;
                self.run_aggregates(job, config.tickers.as_ref(), mode).await
            }
        }
    }

    /// One grouped daily file per session date
    pub async fn run_grouped_daily(&self, job: &GroupedDailyJob, mode: RunMode) -> Result<JobSummary> {
        let dates = self.sessions(mode, job.start_date, job.end_date, JobKind::GroupedDaily);
        let tasks = dates
            .into_iter()
            .map(|date| JobTask {
                date,
                ticker: None,
                path: job.output_dir.join(format!("{date}.parquet")),
            })
            .collect();

        let client = &self.client;
        self.run_tasks(JobKind::GroupedDaily, &job.output_dir, tasks, |task| {
            let params = job.params(task.date);
            async move { into_batch(client.fetch(&GroupedDaily, &params).await?) }
        })
        .await
    }

    /// One aggregates file per ticker and session date
    ///
    /// An empty ticker list is resolved through the ticker list endpoint as
    /// of the last date of the range.
    pub async fn run_aggregates(
        &self,
        job: &AggregatesJob,
        tickers: Option<&TickersJob>,
        mode: RunMode,
    ) -> Result<JobSummary> {
        let dates = self.sessions(mode, job.start_date, job.end_date, JobKind::Aggregates);
        let Some(last) = dates.last().copied() else {
            return Ok(JobSummary::default());
        };
        let symbols = self.resolve_tickers(job, tickers, last).await?;
        let span_dir = job.output_dir.join(job.timespan.as_str());

        let tasks = dates
            .iter()
            .flat_map(|date| {
                let span_dir = &span_dir;
                symbols.iter().map(move |ticker| JobTask {
                    date: *date,
                    ticker: Some(ticker.clone()),
                    path: span_dir.join(ticker).join(format!("{date}.parquet")),
                })
            })
            .collect();

        let client = &self.client;
        self.run_tasks(JobKind::Aggregates, &span_dir, tasks, |task| {
            let params = job.params(task.ticker.as_deref().unwrap_or_default(), task.date);
            async move { into_batch(client.fetch(&Aggregates, &params).await?) }
        })
        .await
    }

    async fn resolve_tickers(
        &self,
        job: &AggregatesJob,
        tickers: Option<&TickersJob>,
        as_of: NaiveDate,
    ) -> Result<Vec<String>> {
        if !job.tickers.is_empty() {
            return Ok(job.tickers.clone());
        }
        let filters = tickers.ok_or_else(|| {
            Error::config("aggregates.tickers is empty and no tickers section is configured")
        })?;

        let table = self.client.fetch(&Tickers, &filters.params(as_of)).await?;
        let symbols: Vec<String> = table.into_iter().map(|t| t.ticker).collect();
        info!("Resolved {} tickers as of {as_of}", symbols.len());
        Ok(symbols)
    }

    fn sessions(
        &self,
        mode: RunMode,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        kind: JobKind,
    ) -> Vec<NaiveDate> {
        let (from, to) = mode.date_range(start, end, kind.lookback_days(), self.today);
        let dates = self.calendar.sessions(from, to);
        info!("{kind}: {} sessions between {from} and {to}", dates.len());
        dates
    }

    /// Fails only when `root` cannot be created; task errors are counted
    async fn run_tasks<F, Fut>(
        &self,
        kind: JobKind,
        root: &Path,
        tasks: Vec<JobTask>,
        fetch: F,
    ) -> Result<JobSummary>
    where
        F: Fn(&JobTask) -> Fut,
        Fut: Future<Output = Result<Option<RecordBatch>>>,
    {
        std::fs::create_dir_all(root)
            .context(format!("Cannot create output directory {}", root.display()))?;

        let start = Instant::now();
        let fetch = &fetch;

        let outcomes: Vec<TaskOutcome> = stream::iter(tasks)
            .map(|task| async move { self.run_task(kind, &task, fetch).await })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut summary = JobSummary::default();
        for outcome in outcomes {
            summary.record(outcome);
        }
        info!("{kind}: {summary} in {:?}", start.elapsed());
        Ok(summary)
    }

    async fn run_task<F, Fut>(&self, kind: JobKind, task: &JobTask, fetch: &F) -> TaskOutcome
    where
        F: Fn(&JobTask) -> Fut,
        Fut: Future<Output = Result<Option<RecordBatch>>>,
    {
        if !self.overwrite && task.path.exists() {
            debug!("{kind} {task}: {} exists, skipping", task.path.display());
            return TaskOutcome::Skipped;
        }

        let batch = match fetch(task).await {
            Ok(Some(batch)) => batch,
            Ok(None) => {
                debug!("{kind} {task}: no rows");
                return TaskOutcome::Empty;
            }
            Err(e) => {
                warn!("{kind} {task}: {e}");
                return TaskOutcome::Failed;
            }
        };

        match self.write(&task.path, &batch) {
            Ok(rows) => {
                info!("{kind} {task}: {rows} rows -> {}", task.path.display());
                TaskOutcome::Written(rows)
            }
            Err(e) => {
                warn!("{kind} {task}: {e}");
                TaskOutcome::Failed
            }
        }
    }

    fn write(&self, path: &Path, batch: &RecordBatch) -> Result<usize> {
        write_batch_to_parquet(path, batch, Some(&self.writer))
    }
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("client", &self.client)
            .field("concurrency", &self.concurrency)
            .field("overwrite", &self.overwrite)
            .field("today", &self.today)
            .finish_non_exhaustive()
    }
}

fn into_batch<R: Record>(table: ResultTable<R>) -> Result<Option<RecordBatch>> {
    if table.is_empty() {
        return Ok(None);
    }
    table.to_record_batch().map(Some)
}
