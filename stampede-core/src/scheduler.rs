//! Batch, time-series and sweep scheduling over a bounded worker pool.
//!
//! Every group (batch, period or sweep level) is a hard barrier: all of its
//! users are joined before sinks see the results and before the next group
//! starts. Each user gets its own generator seeded from the run seed and its
//! id, so a seeded run draws the same actions whatever the completion order.

use crate::form::FormPool;
use crate::load_shape::LoadShape;
use crate::pool::{TaskOutcome, WorkerPool};
use crate::result::{UserContext, UserResult};
use crate::simulator::UserSimulator;
use crate::sink::{GroupInfo, GroupKind, ResultSink};
use rand::rngs::StdRng;
use rand::SeedableRng;
use stampede_config::{CohortConfig, RunMode};
use stampede_http::RequestClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shape of a batched cohort run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CohortPlan {
    pub total_users: usize,
    pub batch_size: usize,
    pub max_workers: usize,
    pub inter_batch_delay: Duration,
}

impl CohortPlan {
    pub fn from_config(config: &CohortConfig) -> Self {
        Self {
            total_users: config.num_users,
            batch_size: config.batch_size,
            max_workers: config.max_workers,
            inter_batch_delay: config.batch_delay,
        }
    }

    /// Sizes of each batch in order; the last one may be short
    pub fn batch_sizes(&self) -> Vec<usize> {
        let batch_size = self.batch_size.max(1);
        let mut remaining = self.total_users;
        let mut sizes = Vec::new();
        while remaining > 0 {
            let size = remaining.min(batch_size);
            sizes.push(size);
            remaining -= size;
        }
        sizes
    }
}

pub struct BatchScheduler<C> {
    simulator: Arc<UserSimulator<C>>,
    forms: Arc<FormPool>,
    seed: u64,
    sinks: Vec<Box<dyn ResultSink>>,
    next_user_id: u64,
    /// Delays between groups are slept only in live mode
    pacing: bool,
}

impl<C: RequestClient + 'static> BatchScheduler<C> {
    pub fn new(simulator: Arc<UserSimulator<C>>, forms: FormPool, seed: u64) -> Self {
        let pacing = simulator.mode() == RunMode::Live;
        Self {
            simulator,
            forms: Arc::new(forms),
            seed,
            sinks: Vec::new(),
            next_user_id: 1,
            pacing,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn ResultSink>) {
        self.sinks.push(sink);
    }

    /// Run the cohort in consecutive batches, `load` being each batch's size
    pub async fn run_cohort(&mut self, plan: &CohortPlan) -> Vec<UserResult> {
        let pool = WorkerPool::new(plan.max_workers);
        let sizes = plan.batch_sizes();
        let mut results = Vec::with_capacity(plan.total_users);

        info!(
            users = plan.total_users,
            batches = sizes.len(),
            max_workers = plan.max_workers,
            "Starting batched run"
        );

        for (index, size) in sizes.iter().copied().enumerate() {
            if index > 0 {
                self.pause(plan.inter_batch_delay).await;
            }
            let group = GroupInfo {
                kind: GroupKind::Batch,
                index: index as u32,
                load: u32::try_from(size).unwrap_or(u32::MAX),
                size,
            };
            results.extend(self.run_group(&pool, group, None).await);
        }

        self.finish_sinks();
        results
    }

    /// One group per period, `unit_time` apart, sized by the load shape
    pub async fn run_time_series(&mut self, shape: &LoadShape, max_workers: usize) -> Vec<UserResult> {
        let pool = WorkerPool::new(max_workers);
        let mut shape_rng = StdRng::seed_from_u64(self.seed.rotate_left(32));
        let plan = shape.plan(&mut shape_rng);

        info!(
            periods = plan.len(),
            unit_time_ms = shape.unit_time().as_millis() as u64,
            "Starting time-series run"
        );
        debug!(?plan, "Users per period");

        let mut results = Vec::new();
        for (period, users) in plan.into_iter().enumerate() {
            if period > 0 {
                self.pause(shape.unit_time()).await;
            }
            let period = period as u32;
            let group = GroupInfo {
                kind: GroupKind::Period,
                index: period,
                load: users,
                size: users as usize,
            };
            results.extend(self.run_group(&pool, group, Some(period)).await);
        }

        self.finish_sinks();
        results
    }

    /// Run each level's users all at once, capped by `max_workers`
    pub async fn run_sweep(&mut self, levels: &[u32], max_workers: usize) -> Vec<UserResult> {
        let pool = WorkerPool::new(max_workers);
        info!(levels = ?levels, "Starting concurrency sweep");

        let mut results = Vec::new();
        for (index, level) in levels.iter().copied().enumerate() {
            let group = GroupInfo {
                kind: GroupKind::Level,
                index: index as u32,
                load: level,
                size: level as usize,
            };
            results.extend(self.run_group(&pool, group, None).await);
        }

        self.finish_sinks();
        results
    }

    async fn run_group(
        &mut self,
        pool: &WorkerPool,
        group: GroupInfo,
        fatigue_period: Option<u32>,
    ) -> Vec<UserResult> {
        let first_id = self.next_user_id;
        self.next_user_id += group.size as u64;

        let contexts: Vec<UserContext> = (0..group.size as u64)
            .map(|offset| UserContext::new(first_id + offset, group.index, group.load))
            .collect();

        let tasks = contexts.iter().copied().map(|context| {
            let simulator = self.simulator.clone();
            let forms = self.forms.clone();
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(context.user_id));
            async move {
                let form = forms.form_for(context.user_id, &mut rng);
                simulator.run(context, form, fatigue_period, &mut rng).await
            }
        });

        let outcomes = pool.run_all(tasks).await;

        let mut results: Vec<UserResult> = contexts
            .into_iter()
            .zip(outcomes)
            .map(|(context, outcome)| match outcome {
                TaskOutcome::Completed(result) => result,
                TaskOutcome::Failed(message) => {
                    warn!(user_id = context.user_id, error = %message, "Simulated user aborted");
                    UserResult::aborted(context, "unknown", message)
                }
            })
            .collect();
        results.sort_by_key(|r| r.user_id());

        let passed = results.iter().filter(|r| r.overall_succeeded()).count();
        info!(
            group = ?group.kind,
            index = group.index,
            load = group.load,
            users = results.len(),
            passed,
            failed = results.len() - passed,
            "Group complete"
        );

        for sink in &mut self.sinks {
            if let Err(e) = sink.record(&group, &results) {
                warn!(error = %e, "Result sink failed to record group");
            }
        }

        results
    }

    async fn pause(&self, delay: Duration) {
        if self.pacing && !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "Pausing between groups");
            tokio::time::sleep(delay).await;
        }
    }

    fn finish_sinks(&mut self) {
        for sink in &mut self.sinks {
            if let Err(e) = sink.finish() {
                warn!(error = %e, "Result sink failed to finish");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadTestError;
    use crate::success::SuccessModel;
    use crate::workflow::{ActionTable, WorkflowSet};
    use async_trait::async_trait;
    use serde_json::Value;
    use stampede_config::{ActionMix, DurationRange, Jitter, PeakKernel, TimeSeriesConfig, WorkflowsConfig};
    use stampede_http::{HttpMethod, RequestOutcome};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Always 200; tracks peak concurrency
    #[derive(Default)]
    struct CountingClient {
        live: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RequestClient for CountingClient {
        async fn execute(&self, _method: HttpMethod, _path: &str, _payload: Option<&Value>) -> RequestOutcome {
            let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(3)).await;
            self.live.fetch_sub(1, Ordering::SeqCst);
            RequestOutcome::completed(200, Duration::from_millis(3), 1, None)
        }
    }

    /// Remembers every group it was handed
    #[derive(Clone, Default)]
    struct RecordingSink {
        groups: Arc<Mutex<Vec<(GroupInfo, Vec<u64>)>>>,
        finished: Arc<AtomicUsize>,
    }

    impl ResultSink for RecordingSink {
        fn record(&mut self, group: &GroupInfo, results: &[UserResult]) -> Result<(), LoadTestError> {
            let ids = results.iter().map(|r| r.user_id()).collect();
            self.groups.lock().unwrap().push((*group, ids));
            Ok(())
        }

        fn finish(&mut self) -> Result<(), LoadTestError> {
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Snapshots the client's counters each time a group is handed over
    struct SnapshotSink {
        client: Arc<CountingClient>,
        snapshots: Arc<Mutex<Vec<(usize, usize)>>>,
    }

    impl ResultSink for SnapshotSink {
        fn record(&mut self, _group: &GroupInfo, _results: &[UserResult]) -> Result<(), LoadTestError> {
            let calls = self.client.calls.load(Ordering::SeqCst);
            let live = self.client.live.load(Ordering::SeqCst);
            self.snapshots.lock().unwrap().push((calls, live));
            Ok(())
        }
    }

    struct FailingSink;

    impl ResultSink for FailingSink {
        fn record(&mut self, _group: &GroupInfo, _results: &[UserResult]) -> Result<(), LoadTestError> {
            Err(LoadTestError::Sink("disk full".to_string()))
        }
    }

    fn simulator(client: Arc<CountingClient>, mode: RunMode) -> Arc<UserSimulator<CountingClient>> {
        let sim = UserSimulator::new(
            client,
            ActionTable::new(&ActionMix::only("fill_form")).unwrap(),
            WorkflowSet::from_config(&WorkflowsConfig::default().without_think_time()).unwrap(),
            SuccessModel::always(),
        )
        .unwrap()
        .with_mode(mode, DurationRange::from_millis(10, 20));
        Arc::new(sim)
    }

    fn plan(total: usize, batch: usize, workers: usize) -> CohortPlan {
        CohortPlan {
            total_users: total,
            batch_size: batch,
            max_workers: workers,
            inter_batch_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_batch_sizes() {
        assert_eq!(plan(50, 20, 200).batch_sizes(), vec![20, 20, 10]);
        assert_eq!(plan(40, 20, 200).batch_sizes(), vec![20, 20]);
        assert_eq!(plan(3, 10, 1).batch_sizes(), vec![3]);
        assert!(plan(0, 10, 1).batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_cohort_batches_and_ids() {
        let client = Arc::new(CountingClient::default());
        let sink = RecordingSink::default();
        let mut scheduler = BatchScheduler::new(simulator(client.clone(), RunMode::Live), FormPool::generated(), 7);
        scheduler.add_sink(Box::new(sink.clone()));

        let results = scheduler.run_cohort(&plan(50, 20, 200)).await;

        assert_eq!(results.len(), 50);
        assert!(results.iter().all(|r| r.overall_succeeded()));
        let ids: Vec<u64> = results.iter().map(|r| r.user_id()).collect();
        assert_eq!(ids, (1..=50).collect::<Vec<_>>());
        assert_eq!(client.calls.load(Ordering::SeqCst), 150);
        assert!(client.peak.load(Ordering::SeqCst) <= 20);

        let groups = sink.groups.lock().unwrap();
        let sizes: Vec<usize> = groups.iter().map(|(g, _)| g.size).collect();
        assert_eq!(sizes, vec![20, 20, 10]);
        assert_eq!(groups[2].0.load, 10);
        assert_eq!(groups[1].1.first(), Some(&21));
        assert_eq!(sink.finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_max_workers_caps_concurrency() {
        let client = Arc::new(CountingClient::default());
        let mut scheduler = BatchScheduler::new(simulator(client.clone(), RunMode::Live), FormPool::generated(), 1);

        let results = scheduler.run_cohort(&plan(30, 30, 4)).await;

        assert_eq!(results.len(), 30);
        assert!(client.peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_batches_do_not_overlap() {
        let client = Arc::new(CountingClient::default());
        let snapshots = Arc::new(Mutex::new(Vec::new()));
        let mut scheduler = BatchScheduler::new(simulator(client.clone(), RunMode::Live), FormPool::generated(), 13);
        scheduler.add_sink(Box::new(SnapshotSink {
            client: client.clone(),
            snapshots: snapshots.clone(),
        }));

        let mut cohort = plan(25, 10, 200);
        cohort.inter_batch_delay = Duration::ZERO;
        scheduler.run_cohort(&cohort).await;

        // Three steps per user; when a batch is handed over, every call so far
        // belongs to finished batches and nothing from the next one is in flight
        let snapshots = snapshots.lock().unwrap();
        assert_eq!(*snapshots, vec![(30, 0), (60, 0), (75, 0)]);
        assert!(client.peak.load(Ordering::SeqCst) <= 10);
    }

    #[tokio::test]
    async fn test_sink_error_does_not_stop_run() {
        let client = Arc::new(CountingClient::default());
        let mut scheduler = BatchScheduler::new(simulator(client, RunMode::Synthetic), FormPool::generated(), 3);
        scheduler.add_sink(Box::new(FailingSink));

        let results = scheduler.run_cohort(&plan(12, 5, 5)).await;
        assert_eq!(results.len(), 12);
    }

    #[tokio::test]
    async fn test_time_series_periods() {
        let client = Arc::new(CountingClient::default());
        let shape = LoadShape::new(&TimeSeriesConfig {
            unit_time: Duration::from_millis(10),
            total_time: Duration::from_millis(40),
            unit_users: 4,
            amplitude: 0.5,
            peaks: Vec::new(),
            peak_kernel: PeakKernel::None,
            jitter: Jitter::None,
        })
        .unwrap();
        let sink = RecordingSink::default();
        let mut scheduler = BatchScheduler::new(simulator(client, RunMode::Synthetic), FormPool::generated(), 11);
        scheduler.add_sink(Box::new(sink.clone()));

        let results = scheduler.run_time_series(&shape, 50).await;

        // 4 * (1, 1.5, 1, 0.5)
        let loads: Vec<u32> = sink.groups.lock().unwrap().iter().map(|(g, _)| g.load).collect();
        assert_eq!(loads, vec![4, 6, 4, 2]);
        assert_eq!(results.len(), 16);
        assert!(results.iter().filter(|r| r.period() == 1).all(|r| r.load() == 6));
    }

    #[tokio::test]
    async fn test_sweep_levels() {
        let client = Arc::new(CountingClient::default());
        let mut scheduler = BatchScheduler::new(simulator(client, RunMode::Synthetic), FormPool::generated(), 5);

        let results = scheduler.run_sweep(&[5, 10, 15], 100).await;

        assert_eq!(results.len(), 30);
        assert_eq!(results.iter().filter(|r| r.load() == 10).count(), 10);
        assert_eq!(results.last().map(|r| r.period()), Some(2));
    }

    #[tokio::test]
    async fn test_seeded_runs_repeat() {
        let run = |seed| async move {
            let client = Arc::new(CountingClient::default());
            let mut scheduler = BatchScheduler::new(simulator(client, RunMode::Synthetic), FormPool::generated(), seed);
            scheduler.run_cohort(&plan(20, 8, 3)).await
        };
        assert_eq!(run(42).await, run(42).await);
    }
}
