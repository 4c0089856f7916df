//! Immutable per-step and per-user result records

use crate::form::Form;
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Why a step did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepFailure {
    /// No response after every retry
    Transport { message: String },
    /// The target answered with something other than 200
    Protocol { status: u16 },
    /// 200 from the target, but the success model's coin flip failed
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub step_name: String,
    pub succeeded: bool,
    #[serde(rename = "latency_ms", serialize_with = "serialize_millis")]
    pub latency: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<StepFailure>,
}

impl StepResult {
    pub fn passed(step_name: impl Into<String>, latency: Duration, status_code: Option<u16>) -> Self {
        Self {
            step_name: step_name.into(),
            succeeded: true,
            latency,
            status_code,
            failure: None,
        }
    }

    pub fn failed(
        step_name: impl Into<String>,
        latency: Duration,
        status_code: Option<u16>,
        failure: StepFailure,
    ) -> Self {
        Self {
            step_name: step_name.into(),
            succeeded: false,
            latency,
            status_code,
            failure: Some(failure),
        }
    }
}

/// Identity of a simulated user within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserContext {
    /// Unique within a run, assigned from 1
    pub user_id: u64,
    /// Batch, period or sweep level index, from 0
    pub period: u32,
    /// Concurrent load the user ran under
    pub load: u32,
}

impl UserContext {
    pub fn new(user_id: u64, period: u32, load: u32) -> Self {
        Self {
            user_id,
            period,
            load,
        }
    }
}

/// Outcome of one simulated user.
///
/// `overall_succeeded` is derived from the steps and the error at
/// construction and cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResult {
    user_id: u64,
    period: u32,
    load: u32,
    action: String,
    steps: Vec<StepResult>,
    overall_succeeded: bool,
    #[serde(rename = "total_latency_ms", serialize_with = "serialize_millis")]
    total_latency: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Form>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl UserResult {
    pub fn new(
        context: UserContext,
        action: impl Into<String>,
        steps: Vec<StepResult>,
        total_latency: Duration,
    ) -> Self {
        let overall_succeeded = steps.iter().all(|s| s.succeeded);
        Self {
            user_id: context.user_id,
            period: context.period,
            load: context.load,
            action: action.into(),
            steps,
            overall_succeeded,
            total_latency,
            payload: None,
            response: None,
            error: None,
        }
    }

    /// A user whose workflow could not run to completion
    pub fn aborted(context: UserContext, action: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(context, action, Vec::new(), Duration::ZERO).with_error(error)
    }

    pub fn with_payload(mut self, payload: Form) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_response(mut self, response: Option<serde_json::Value>) -> Self {
        self.response = response;
        self
    }

    /// Recording an error always fails the user
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self.overall_succeeded = false;
        self
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn load(&self) -> u32 {
        self.load
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    pub fn overall_succeeded(&self) -> bool {
        self.overall_succeeded
    }

    pub fn total_latency(&self) -> Duration {
        self.total_latency
    }

    pub fn payload(&self) -> Option<&Form> {
        self.payload.as_ref()
    }

    pub fn response(&self) -> Option<&serde_json::Value> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// No step ran, e.g. the task panicked
    pub fn is_aborted(&self) -> bool {
        self.steps.is_empty() && self.error.is_some()
    }

    /// Status code per step, `None` where no response arrived
    pub fn status_codes(&self) -> Vec<Option<u16>> {
        self.steps.iter().map(|s| s.status_code).collect()
    }
}

pub(crate) fn serialize_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64() * 1000.0)
}

pub(crate) fn serialize_opt_millis<S: Serializer>(
    value: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serialize_millis(d, serializer),
        None => serializer.serialize_none(),
    }
}
