//! One simulated user: draw an action, run its workflow, report the outcome

use crate::error::LoadTestError;
use crate::form::Form;
use crate::result::{StepFailure, StepResult, UserContext, UserResult};
use crate::success::SuccessModel;
use crate::workflow::{ActionTable, Workflow, WorkflowSet, WorkflowStep};
use rand::Rng;
use stampede_config::{DurationRange, LoadTestConfig, PayloadKind, RunMode};
use stampede_http::RequestClient;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Uniform draw from an inclusive window
pub fn sample_duration<R: Rng + ?Sized>(range: &DurationRange, rng: &mut R) -> Duration {
    if range.min >= range.max {
        range.min
    } else {
        rng.random_range(range.min..=range.max)
    }
}

/// Runs simulated users against a [`RequestClient`].
///
/// Holds only read-only state, so one instance is shared by every task.
pub struct UserSimulator<C> {
    client: Arc<C>,
    actions: ActionTable,
    workflows: WorkflowSet,
    success: SuccessModel,
    mode: RunMode,
    synthetic_latency: DurationRange,
}

impl<C: RequestClient> UserSimulator<C> {
    pub fn new(
        client: Arc<C>,
        actions: ActionTable,
        workflows: WorkflowSet,
        success: SuccessModel,
    ) -> Result<Self, LoadTestError> {
        workflows.ensure_covers(&actions)?;
        Ok(Self {
            client,
            actions,
            workflows,
            success,
            mode: RunMode::Live,
            synthetic_latency: DurationRange::from_millis(100, 800),
        })
    }

    pub fn from_config(client: Arc<C>, config: &LoadTestConfig) -> Result<Self, LoadTestError> {
        let simulator = Self::new(
            client,
            ActionTable::new(&config.actions)?,
            WorkflowSet::from_config(&config.workflows)?,
            SuccessModel::new(&config.success),
        )?;
        Ok(simulator.with_mode(config.cohort.mode, config.cohort.synthetic_latency))
    }

    /// Switch between live requests and the reduced-cost synthetic mode
    pub fn with_mode(mut self, mode: RunMode, synthetic_latency: DurationRange) -> Self {
        self.mode = mode;
        self.synthetic_latency = synthetic_latency;
        self
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Run one user. Never fails: every problem is recorded on the result.
    ///
    /// `period` is passed to the success model for fatigue; `context.load`
    /// is the load the coin flips are evaluated at.
    pub async fn run<R: Rng + Send + ?Sized>(
        &self,
        context: UserContext,
        form: Form,
        period: Option<u32>,
        rng: &mut R,
    ) -> UserResult {
        let action = self.actions.sample(rng).to_string();
        let Some(workflow) = self.workflows.get(&action) else {
            return UserResult::aborted(context, action, "no workflow for action");
        };

        trace!(user_id = context.user_id, action = %action, "Starting simulated user");

        let result = match self.mode {
            RunMode::Live => self.run_live(context, &action, workflow, form, period, rng).await,
            RunMode::Synthetic => self.run_synthetic(context, &action, workflow, form, period, rng),
        };

        debug!(
            user_id = result.user_id(),
            action = %result.action(),
            succeeded = result.overall_succeeded(),
            latency_ms = result.total_latency().as_millis() as u64,
            "Simulated user finished"
        );
        result
    }

    async fn run_live<R: Rng + Send + ?Sized>(
        &self,
        context: UserContext,
        action: &str,
        workflow: &Workflow,
        form: Form,
        period: Option<u32>,
        rng: &mut R,
    ) -> UserResult {
        let needs_form = workflow.steps().iter().any(|s| s.payload == PayloadKind::Form);
        let body = if needs_form {
            match form.to_json() {
                Ok(body) => Some(body),
                Err(e) => {
                    return UserResult::aborted(context, action, format!("invalid form: {e}"))
                        .with_payload(form)
                }
            }
        } else {
            None
        };

        let started = Instant::now();
        let mut steps = Vec::with_capacity(workflow.steps().len());
        let mut response = None;

        // Every step runs, even after a failure, so per-step latency stays complete
        for step in workflow.steps() {
            let think = sample_duration(&step.think_time, rng);
            if !think.is_zero() {
                tokio::time::sleep(think).await;
            }

            let payload = match step.payload {
                PayloadKind::Form => body.as_ref(),
                PayloadKind::None => None,
            };
            let outcome = self.client.execute(step.method, &step.path, payload).await;

            if step.payload == PayloadKind::Form {
                response = outcome.body.clone();
            }

            let result = match (outcome.status_code, outcome.error) {
                (Some(200), _) => {
                    if self.success.coinflip(context.load, period, rng) {
                        StepResult::passed(&step.name, outcome.latency, Some(200))
                    } else {
                        StepResult::failed(
                            &step.name,
                            outcome.latency,
                            Some(200),
                            StepFailure::Simulated,
                        )
                    }
                }
                (Some(status), _) => StepResult::failed(
                    &step.name,
                    outcome.latency,
                    Some(status),
                    StepFailure::Protocol { status },
                ),
                (None, error) => StepResult::failed(
                    &step.name,
                    outcome.latency,
                    None,
                    StepFailure::Transport {
                        message: error.unwrap_or_else(|| "no response".to_string()),
                    },
                ),
            };
            steps.push(result);
        }

        let total_latency = started.elapsed();
        let result = UserResult::new(context, action, steps, total_latency).with_response(response);
        if needs_form {
            result.with_payload(form)
        } else {
            result
        }
    }

    /// No network and no sleeping: synthetic latency per step, success from the model only
    fn run_synthetic<R: Rng + ?Sized>(
        &self,
        context: UserContext,
        action: &str,
        workflow: &Workflow,
        form: Form,
        period: Option<u32>,
        rng: &mut R,
    ) -> UserResult {
        let steps: Vec<StepResult> = workflow
            .steps()
            .iter()
            .map(|step: &WorkflowStep| {
                let latency = sample_duration(&self.synthetic_latency, rng);
                if self.success.coinflip(context.load, period, rng) {
                    StepResult::passed(&step.name, latency, None)
                } else {
                    StepResult::failed(&step.name, latency, None, StepFailure::Simulated)
                }
            })
            .collect();

        let total_latency = steps.iter().map(|s| s.latency).sum();
        let result = UserResult::new(context, action, steps, total_latency);
        if workflow.steps().iter().any(|s| s.payload == PayloadKind::Form) {
            result.with_payload(form)
        } else {
            result
        }
    }
}
