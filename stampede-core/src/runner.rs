//! Top-level run entry point

use crate::aggregate::{reduce, RunSummary};
use crate::error::LoadTestError;
use crate::form::{Form, FormPool};
use crate::load_shape::LoadShape;
use crate::result::{serialize_millis, UserResult};
use crate::scheduler::{BatchScheduler, CohortPlan};
use crate::simulator::UserSimulator;
use crate::sink::ResultSink;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stampede_config::{LoadTestConfig, RunMode};
use stampede_http::{HttpRequestClient, RequestClient};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use uuid::Uuid;

/// Which scheduling variant a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    /// `num_users` in batches of `batch_size`
    Batch,
    /// Period-by-period load from the `time_series` section
    TimeSeries,
    /// One group per level in the `sweep` section
    Sweep,
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Batch => write!(f, "batch"),
            Schedule::TimeSeries => write!(f, "time_series"),
            Schedule::Sweep => write!(f, "sweep"),
        }
    }
}

impl FromStr for Schedule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "batch" => Ok(Schedule::Batch),
            "time_series" | "time-series" | "timeseries" => Ok(Schedule::TimeSeries),
            "sweep" => Ok(Schedule::Sweep),
            _ => Err(format!("Invalid schedule: {}", s)),
        }
    }
}

/// Summary of a finished run plus the raw results behind it
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub schedule: Schedule,
    pub mode: RunMode,
    pub seed: u64,
    pub summary: RunSummary,
    #[serde(skip)]
    pub results: Vec<UserResult>,
}

/// A configured load test, ready to run once
pub struct LoadTest<C> {
    config: LoadTestConfig,
    client: Arc<C>,
    forms: FormPool,
    sinks: Vec<Box<dyn ResultSink>>,
}

impl LoadTest<HttpRequestClient> {
    /// Validate the configuration and build the shared HTTP client
    pub fn from_config(config: LoadTestConfig) -> Result<Self, LoadTestError> {
        config.validate_all()?;
        let client = HttpRequestClient::from_config(&config.target, &config.retry)?;
        Self::with_client(config, Arc::new(client))
    }
}

impl<C: RequestClient + 'static> LoadTest<C> {
    pub fn with_client(config: LoadTestConfig, client: Arc<C>) -> Result<Self, LoadTestError> {
        config.validate_all()?;
        Ok(Self {
            config,
            client,
            forms: FormPool::generated(),
            sinks: Vec::new(),
        })
    }

    /// Assign these forms round-robin instead of generating them
    pub fn with_forms(mut self, forms: Vec<Form>) -> Self {
        self.forms = FormPool::new(forms);
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn ResultSink>) {
        self.sinks.push(sink);
    }

    /// Run to completion.
    ///
    /// Only configuration problems are errors, and they are reported before
    /// any simulated user starts. Step and user failures end up in the report.
    pub async fn run(self, schedule: Schedule) -> Result<RunReport, LoadTestError> {
        let config = self.config;

        // Resolve everything that can fail before the first request
        let shape = match schedule {
            Schedule::TimeSeries => {
                let section = config.time_series.as_ref().ok_or_else(|| {
                    LoadTestError::configuration("time-series run needs a time_series section")
                })?;
                Some(LoadShape::new(section)?)
            }
            _ => None,
        };
        let levels = match schedule {
            Schedule::Sweep => {
                let levels = config
                    .sweep
                    .as_ref()
                    .map(|s| s.levels.clone())
                    .unwrap_or_default();
                if levels.is_empty() {
                    return Err(LoadTestError::configuration(
                        "sweep run needs a sweep section with at least one level",
                    ));
                }
                levels
            }
            _ => Vec::new(),
        };
        let simulator = Arc::new(UserSimulator::from_config(self.client, &config)?);

        let seed = config.cohort.seed.unwrap_or_else(rand::random::<u64>);
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = Instant::now();

        info!(
            run_id = %run_id,
            schedule = %schedule,
            mode = ?config.cohort.mode,
            seed,
            target = %config.target.base_url,
            "Starting load test"
        );

        let mut scheduler = BatchScheduler::new(simulator, self.forms, seed);
        for sink in self.sinks {
            scheduler.add_sink(sink);
        }

        let max_workers = config.cohort.max_workers;
        let results = match (schedule, shape) {
            (Schedule::TimeSeries, Some(shape)) => scheduler.run_time_series(&shape, max_workers).await,
            (Schedule::Sweep, _) => scheduler.run_sweep(&levels, max_workers).await,
            _ => {
                scheduler
                    .run_cohort(&CohortPlan::from_config(&config.cohort))
                    .await
            }
        };

        let summary = reduce(&results);
        let elapsed = started.elapsed();

        info!(
            run_id = %run_id,
            users = summary.totals.count,
            pass = summary.pass(),
            fail = summary.fail(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Load test complete"
        );

        Ok(RunReport {
            run_id,
            started_at,
            elapsed,
            schedule,
            mode: config.cohort.mode,
            seed,
            summary,
            results,
        })
    }
}
