//! Workflow definitions: action name to ordered request steps

use crate::domains::utils::{validate_duration_range, DurationRange};
use crate::error::ConfigResult;
use crate::validation::{validate_enum_choice, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SUPPORTED_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// What a step sends as its request body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// No body
    #[default]
    None,
    /// The user's form, serialized as JSON
    Form,
}

/// A single named HTTP operation within a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    pub name: String,

    #[serde(default = "default_method")]
    pub method: String,

    pub path: String,

    /// Randomized pause before the request is sent
    #[serde(default)]
    pub think_time: DurationRange,

    #[serde(default)]
    pub payload: PayloadKind,
}

impl StepConfig {
    pub fn new(name: impl Into<String>, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: method.into(),
            path: path.into(),
            think_time: DurationRange::zero(),
            payload: PayloadKind::None,
        }
    }

    pub fn with_think_time(mut self, think_time: DurationRange) -> Self {
        self.think_time = think_time;
        self
    }

    pub fn with_payload(mut self, payload: PayloadKind) -> Self {
        self.payload = payload;
        self
    }
}

/// Mapping from action name to the steps it executes, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowsConfig {
    pub actions: BTreeMap<String, Vec<StepConfig>>,
}

impl WorkflowsConfig {
    pub fn get(&self, action: &str) -> Option<&[StepConfig]> {
        self.actions.get(action).map(Vec::as_slice)
    }

    pub fn insert(&mut self, action: impl Into<String>, steps: Vec<StepConfig>) {
        self.actions.insert(action.into(), steps);
    }

    /// Clear every step's think time; used for tests and dry runs
    pub fn without_think_time(mut self) -> Self {
        for step in self.actions.values_mut().flatten() {
            step.think_time = DurationRange::zero();
        }
        self
    }
}

impl Default for WorkflowsConfig {
    fn default() -> Self {
        let visit_home = StepConfig::new("visit_home", "GET", "/landing_page")
            .with_think_time(DurationRange::from_millis(100, 500));
        let start_form = StepConfig::new("start_form", "POST", "/start_form")
            .with_think_time(DurationRange::from_millis(100, 300));
        let submit_form = StepConfig::new("submit_form", "POST", "/submit_form")
            .with_think_time(DurationRange::from_millis(200, 700))
            .with_payload(PayloadKind::Form);
        let refresh_page = StepConfig::new("refresh_page", "GET", "/landing_page")
            .with_think_time(DurationRange::from_millis(100, 300));

        let mut actions = BTreeMap::new();
        actions.insert("visit_home".to_string(), vec![visit_home.clone()]);
        actions.insert(
            "fill_form".to_string(),
            vec![visit_home, start_form, submit_form],
        );
        actions.insert("refresh_page".to_string(), vec![refresh_page]);

        Self { actions }
    }
}

impl Validatable for WorkflowsConfig {
    fn validate(&self) -> ConfigResult<()> {
        for (action, steps) in &self.actions {
            if steps.is_empty() {
                return Err(self.validation_error(format!(
                    "workflow for action '{}' has no steps",
                    action
                )));
            }

            for step in steps {
                validate_required_string(&step.name, "name", self.domain_name())?;
                validate_enum_choice(&step.method, &SUPPORTED_METHODS, "method", self.domain_name())?;
                if !step.path.starts_with('/') {
                    return Err(self.validation_error(format!(
                        "path '{}' of step '{}' must start with '/'",
                        step.path, step.name
                    )));
                }
                validate_duration_range(&step.think_time, "think_time", self.domain_name())?;
            }
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "workflows"
    }
}

fn default_method() -> String {
    "GET".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_workflows() {
        let workflows = WorkflowsConfig::default();
        assert!(workflows.validate().is_ok());

        let names: Vec<&str> = workflows
            .get("fill_form")
            .unwrap()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["visit_home", "start_form", "submit_form"]);
        assert_eq!(workflows.get("refresh_page").unwrap().len(), 1);
        assert_eq!(
            workflows.get("fill_form").unwrap()[2].payload,
            PayloadKind::Form
        );
    }

    #[test]
    fn test_empty_workflow_rejected() {
        let mut workflows = WorkflowsConfig::default();
        workflows.insert("idle", vec![]);
        assert!(workflows.validate().is_err());
    }

    #[test]
    fn test_bad_step_rejected() {
        let mut workflows = WorkflowsConfig::default();
        workflows.insert("bad", vec![StepConfig::new("x", "FETCH", "/x")]);
        assert!(workflows.validate().is_err());

        let mut workflows = WorkflowsConfig::default();
        workflows.insert("bad", vec![StepConfig::new("x", "GET", "x")]);
        assert!(workflows.validate().is_err());
    }

    #[test]
    fn test_without_think_time() {
        let workflows = WorkflowsConfig::default().without_think_time();
        assert!(workflows
            .actions
            .values()
            .flatten()
            .all(|s| s.think_time.is_zero()));
    }
}
