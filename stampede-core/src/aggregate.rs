//! Reduction of user results into run statistics.
//!
//! [`reduce`] is a pure fold over immutable [`UserResult`] records. Latencies
//! are summed as integer nanoseconds, so any permutation of the input gives
//! an identical [`RunSummary`]. Averages over no data are `None` and
//! serialize as `null`.

use crate::result::{serialize_opt_millis, StepFailure, UserResult};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;

/// Counts of failed steps and aborted users by cause
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FailureBreakdown {
    pub transport: u64,
    pub protocol: u64,
    pub simulated: u64,
    /// Users that never ran a step
    pub aborted: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub count: u64,
    pub pass: u64,
    pub fail: u64,
    pub success_rate: Option<f64>,
    #[serde(rename = "avg_latency_ms", serialize_with = "serialize_opt_millis")]
    pub avg_latency: Option<Duration>,
    #[serde(rename = "max_latency_ms", serialize_with = "serialize_opt_millis")]
    pub max_latency: Option<Duration>,
    /// Only step names that actually ran appear here
    #[serde(rename = "per_step_avg_latency_ms", serialize_with = "serialize_millis_map")]
    pub per_step_avg_latency: BTreeMap<String, Duration>,
    pub per_step_success_rate: BTreeMap<String, f64>,
    #[serde(rename = "per_action_avg_latency_ms", serialize_with = "serialize_millis_map")]
    pub per_action_avg_latency: BTreeMap<String, Duration>,
    pub failures: FailureBreakdown,
}

impl Stats {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Statistics for one batch, period or sweep level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStat {
    pub period: u32,
    /// Highest load any user in the group ran under
    pub load: u32,
    #[serde(flatten)]
    pub stats: Stats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    #[serde(flatten)]
    pub totals: Stats,
    pub periods: Vec<PeriodStat>,
}

impl RunSummary {
    pub fn pass(&self) -> u64 {
        self.totals.pass
    }

    pub fn fail(&self) -> u64 {
        self.totals.fail
    }

    pub fn period(&self, period: u32) -> Option<&PeriodStat> {
        self.periods.iter().find(|p| p.period == period)
    }
}

/// Fold every result into totals and per-period statistics
pub fn reduce(results: &[UserResult]) -> RunSummary {
    let mut groups: BTreeMap<u32, Vec<&UserResult>> = BTreeMap::new();
    for result in results {
        groups.entry(result.period()).or_default().push(result);
    }

    let periods = groups
        .into_iter()
        .map(|(period, members)| PeriodStat {
            period,
            load: members.iter().map(|r| r.load()).max().unwrap_or(0),
            stats: stats_for(members.iter().copied()),
        })
        .collect();

    RunSummary {
        totals: stats_for(results.iter()),
        periods,
    }
}

#[derive(Default)]
struct Accumulator {
    count: u64,
    nanos: u128,
    passed: u64,
}

impl Accumulator {
    fn add(&mut self, latency: Duration, passed: bool) {
        self.count += 1;
        self.nanos += latency.as_nanos();
        if passed {
            self.passed += 1;
        }
    }

    fn average(&self) -> Option<Duration> {
        average(self.nanos, self.count)
    }

    fn rate(&self) -> Option<f64> {
        rate(self.passed, self.count)
    }
}

fn stats_for<'a>(results: impl IntoIterator<Item = &'a UserResult>) -> Stats {
    let mut totals = Accumulator::default();
    let mut max_latency: Option<Duration> = None;
    let mut steps: BTreeMap<&str, Accumulator> = BTreeMap::new();
    let mut actions: BTreeMap<&str, Accumulator> = BTreeMap::new();
    let mut failures = FailureBreakdown::default();

    for result in results {
        let latency = result.total_latency();
        totals.add(latency, result.overall_succeeded());
        max_latency = max_latency.max(Some(latency));

        if result.is_aborted() {
            failures.aborted += 1;
            continue;
        }

        actions
            .entry(result.action())
            .or_default()
            .add(latency, result.overall_succeeded());

        for step in result.steps() {
            steps
                .entry(step.step_name.as_str())
                .or_default()
                .add(step.latency, step.succeeded);
            match &step.failure {
                Some(StepFailure::Transport { .. }) => failures.transport += 1,
                Some(StepFailure::Protocol { .. }) => failures.protocol += 1,
                Some(StepFailure::Simulated) => failures.simulated += 1,
                None => {}
            }
        }
    }

    Stats {
        count: totals.count,
        pass: totals.passed,
        fail: totals.count - totals.passed,
        success_rate: totals.rate(),
        avg_latency: totals.average(),
        max_latency,
        per_step_avg_latency: steps
            .iter()
            .filter_map(|(name, acc)| acc.average().map(|avg| (name.to_string(), avg)))
            .collect(),
        per_step_success_rate: steps
            .iter()
            .filter_map(|(name, acc)| acc.rate().map(|r| (name.to_string(), r)))
            .collect(),
        per_action_avg_latency: actions
            .iter()
            .filter_map(|(name, acc)| acc.average().map(|avg| (name.to_string(), avg)))
            .collect(),
        failures,
    }
}

fn average(nanos: u128, count: u64) -> Option<Duration> {
    if count == 0 {
        return None;
    }
    let avg = nanos / u128::from(count);
    let secs = (avg / 1_000_000_000) as u64;
    let sub = (avg % 1_000_000_000) as u32;
    Some(Duration::new(secs, sub))
}

fn rate(passed: u64, count: u64) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(passed as f64 / count as f64)
    }
}

fn serialize_millis_map<S: Serializer>(
    map: &BTreeMap<String, Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    let mut out = serializer.serialize_map(Some(map.len()))?;
    for (name, latency) in map {
        out.serialize_entry(name, &(latency.as_secs_f64() * 1000.0))?;
    }
    out.end()
}
