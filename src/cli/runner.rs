//! CLI runner - executes commands

use crate::auth::redact_url;
use crate::cli::commands::{Cli, Commands, EndpointCommand, OutputFormat};
use crate::client::MarketDataClient;
use crate::config::{GlobalConfig, JobConfig};
use crate::endpoint::{
    Aggregates, AggregatesParams, DailyOpenClose, DailyOpenCloseParams, Endpoint, GroupedDaily,
    GroupedDailyParams, MarketHolidays, Raw, RawParams, TickerDetails, TickerDetailsParams,
    TickerTypes, TickerTypesParams, Tickers, TickersParams,
};
use crate::error::{Error, Result};
use crate::jobs::{JobKind, JobRunner, RunMode};
use crate::output::write_batch_to_parquet;
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command; Ctrl-C cancels it
    pub async fn run(&self) -> Result<()> {
        let start = Instant::now();
        let work = async {
            match &self.cli.command {
                Commands::Fetch {
                    output,
                    deadline,
                    endpoint,
                } => self.fetch(endpoint, output.as_deref(), *deadline).await,
                Commands::Run {
                    config,
                    job,
                    mode,
                    overwrite,
                } => self.run_job(config, *job, *mode, *overwrite).await,
            }
        };

        tokio::select! {
            result = work => result,
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, discarding results in flight");
                Err(Error::Cancelled {
                    after_ms: start.elapsed().as_millis() as u64,
                })
            }
        }
    }

    /// Apply command-line overrides on top of a config's global section
    fn global_config(&self, mut global: GlobalConfig) -> GlobalConfig {
        if let Some(var) = &self.cli.api_key_env {
            global.api_key_env.clone_from(var);
        }
        if let Some(secs) = self.cli.page_delay {
            global.page_delay_secs = secs;
        }
        if let Some(size) = self.cli.pool_size {
            global.pool_size = size.max(1);
        }
        if let Some(retries) = self.cli.max_retries {
            global.max_retries = retries;
        }
        if let Some(secs) = self.cli.timeout {
            global.timeout_secs = secs;
        }
        global
    }

    /// Build the client for `global`
    fn client(&self, global: &GlobalConfig) -> Result<MarketDataClient> {
        let mut client = MarketDataClient::connect(&global.credentials(), global.http_config())?
            .with_pagination(global.pagination_config());
        if let Some(base) = &self.cli.base_url {
            client = client.with_base_url(base)?;
        }
        info!("Using API root {}", redact_url(client.base_url()));
        Ok(client)
    }

    /// Fetch one endpoint
    async fn fetch(
        &self,
        endpoint: &EndpointCommand,
        output: Option<&Path>,
        deadline: Option<u64>,
    ) -> Result<()> {
        let global = self.global_config(GlobalConfig::default());
        let client = self.client(&global)?;
        let deadline = deadline.map(Duration::from_secs);

        match endpoint {
            EndpointCommand::GroupedDaily {
                date,
                locale,
                market_type,
                adjusted,
                include_otc,
            } => {
                let params = GroupedDailyParams {
                    date: *date,
                    locale: locale.clone(),
                    market_type: market_type.clone(),
                    adjusted: *adjusted,
                    include_otc: *include_otc,
                };
                self.fetch_endpoint(&client, &GroupedDaily, &params, output, deadline)
                    .await
            }
            EndpointCommand::Aggregates {
                ticker,
                multiplier,
                timespan,
                from,
                to,
                adjusted,
                sort,
                limit,
            } => {
                let params = AggregatesParams {
                    ticker: ticker.clone(),
                    multiplier: *multiplier,
                    timespan: *timespan,
                    from: *from,
                    to: *to,
                    adjusted: *adjusted,
                    sort: *sort,
                    limit: *limit,
                };
                self.fetch_endpoint(&client, &Aggregates, &params, output, deadline)
                    .await
            }
            EndpointCommand::OpenClose {
                ticker,
                date,
                adjusted,
            } => {
                let params = DailyOpenCloseParams {
                    ticker: ticker.clone(),
                    date: *date,
                    adjusted: *adjusted,
                };
                self.fetch_endpoint(&client, &DailyOpenClose, &params, output, deadline)
                    .await
            }
            EndpointCommand::Tickers {
                ticker,
                ticker_type,
                market,
                exchange,
                date,
                search,
                active,
                limit,
            } => {
                let params = TickersParams {
                    ticker: ticker.clone(),
                    ticker_type: ticker_type.clone(),
                    market: market.clone(),
                    exchange: exchange.clone(),
                    date: *date,
                    search: search.clone(),
                    active: *active,
                    limit: *limit,
                    ..TickersParams::default()
                };
                self.fetch_endpoint(&client, &Tickers, &params, output, deadline)
                    .await
            }
            EndpointCommand::TickerDetails { ticker, date } => {
                let params = TickerDetailsParams {
                    ticker: ticker.clone(),
                    date: *date,
                };
                self.fetch_endpoint(&client, &TickerDetails, &params, output, deadline)
                    .await
            }
            EndpointCommand::TickerTypes { asset_class, locale } => {
                let params = TickerTypesParams {
                    asset_class: asset_class.clone(),
                    locale: locale.clone(),
                };
                self.fetch_endpoint(&client, &TickerTypes, &params, output, deadline)
                    .await
            }
            EndpointCommand::Holidays => {
                self.fetch_endpoint(&client, &MarketHolidays, &(), output, deadline)
                    .await
            }
            EndpointCommand::Raw {
                path,
                params,
                limit,
            } => {
                let mut raw = RawParams::new(path.clone());
                for pair in params {
                    let (key, value) = parse_param(pair)?;
                    raw = raw.param(key, value);
                }
                raw.limit = *limit;
                self.fetch_endpoint(&client, &Raw, &raw, output, deadline).await
            }
        }
    }

    /// Fetch, then print rows or write them to `output`
    async fn fetch_endpoint<E: Endpoint>(
        &self,
        client: &MarketDataClient,
        endpoint: &E,
        params: &E::Params,
        output: Option<&Path>,
        deadline: Option<Duration>,
    ) -> Result<()> {
        let table = match deadline {
            Some(d) => client.fetch_with_deadline(endpoint, params, d).await?,
            None => client.fetch(endpoint, params).await?,
        };

        match output {
            Some(path) if table.is_empty() => {
                warn!("{}: no rows, {} not written", endpoint.name(), path.display());
            }
            Some(path) => {
                let rows = write_batch_to_parquet(path, &table.to_record_batch()?, None)?;
                info!("{}: {rows} rows -> {}", endpoint.name(), path.display());
            }
            None => {
                for record in &table {
                    self.output_message(record);
                }
            }
        }
        Ok(())
    }

    /// Run a batch job
    async fn run_job(
        &self,
        config_path: &Path,
        kind: JobKind,
        mode: RunMode,
        overwrite: bool,
    ) -> Result<()> {
        let config = JobConfig::from_file(config_path)?;
        let global = self.global_config(config.global.clone());
        let client = self.client(&global)?;

        let calendar = global.calendar();
        debug!("Calendar: weekdays minus {} holidays", calendar.holiday_count());

        let runner = JobRunner::new(client, calendar)
            .with_concurrency(global.pool_size)
            .with_overwrite(overwrite);
        let summary = runner.run(&config, kind, mode).await?;
        self.output_message(&summary);

        if summary.is_success() {
            Ok(())
        } else {
            Err(Error::Other(format!("{kind}: {} tasks failed", summary.failed)))
        }
    }

    /// Output one serializable item
    fn output_message<T: Serialize>(&self, msg: &T) {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg),
            OutputFormat::Pretty => serde_json::to_string_pretty(msg),
        };
        match line {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("Failed to serialize output: {e}"),
        }
    }
}

/// Split a `key=value` query argument
fn parse_param(pair: &str) -> Result<(&str, &str)> {
    pair.split_once('=')
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| Error::invalid_value("param", format!("expected key=value, got '{pair}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn runner(args: &[&str]) -> Runner {
        Runner::new(Cli::try_parse_from(args).unwrap())
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("locale=us").unwrap(), ("locale", "us"));
        assert_eq!(parse_param("q=a=b").unwrap(), ("q", "a=b"));
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let r = runner(&[
            "mdfetch", "--page-delay", "0", "--pool-size", "0", "--api-key-env", "K",
            "fetch", "holidays",
        ]);
        let global = r.global_config(GlobalConfig {
            max_retries: 2,
            ..GlobalConfig::default()
        });

        assert_eq!(global.page_delay_secs, 0);
        assert_eq!(global.pool_size, 1);
        assert_eq!(global.api_key_env, "K");
        assert_eq!(global.max_retries, 2);
        assert_eq!(global.timeout_secs, 30);
    }

    #[test]
    fn test_missing_key_fails_before_any_request() {
        let r = runner(&["mdfetch", "--api-key-env", "MDFETCH_TEST_UNSET_KEY", "fetch", "holidays"]);
        let global = r.global_config(GlobalConfig::default());
        let err = r.client(&global).unwrap_err();
        assert!(matches!(err, Error::Credential { .. }));
    }
}
