//! Weighted actions and the request steps each action runs

use crate::error::LoadTestError;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use stampede_config::{ActionMix, DurationRange, PayloadKind, StepConfig, WorkflowsConfig};
use stampede_http::HttpMethod;
use std::collections::BTreeMap;

/// Categorical distribution over action names
#[derive(Debug, Clone)]
pub struct ActionTable {
    names: Vec<String>,
    weights: Vec<f64>,
    index: WeightedIndex<f64>,
}

impl ActionTable {
    /// Weights must be finite and positive; an empty set is rejected
    pub fn new(mix: &ActionMix) -> Result<Self, LoadTestError> {
        if mix.weights.is_empty() {
            return Err(LoadTestError::InvalidActions(
                "at least one action is required".to_string(),
            ));
        }

        if let Some(bad) = mix
            .weights
            .iter()
            .find(|w| !w.weight.is_finite() || w.weight <= 0.0)
        {
            return Err(LoadTestError::InvalidActions(format!(
                "weight for '{}' must be a finite value > 0, got {}",
                bad.action, bad.weight
            )));
        }

        let names: Vec<String> = mix.weights.iter().map(|w| w.action.clone()).collect();
        let weights: Vec<f64> = mix.weights.iter().map(|w| w.weight).collect();
        let index = WeightedIndex::new(&weights)
            .map_err(|e| LoadTestError::InvalidActions(format!("failed to build distribution: {e}")))?;

        Ok(Self {
            names,
            weights,
            index,
        })
    }

    /// Draw one action
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.names[self.index.sample(rng)]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Normalised probability of each action, in declaration order
    pub fn probabilities(&self) -> Vec<(&str, f64)> {
        let total: f64 = self.weights.iter().sum();
        self.names
            .iter()
            .zip(&self.weights)
            .map(|(name, weight)| (name.as_str(), weight / total))
            .collect()
    }
}

/// One request in a workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowStep {
    pub name: String,
    pub method: HttpMethod,
    pub path: String,
    pub think_time: DurationRange,
    pub payload: PayloadKind,
}

impl WorkflowStep {
    fn from_config(action: &str, step: &StepConfig) -> Result<Self, LoadTestError> {
        let method = step
            .method
            .parse::<HttpMethod>()
            .map_err(|e| LoadTestError::InvalidWorkflow {
                action: action.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            name: step.name.clone(),
            method,
            path: step.path.clone(),
            think_time: step.think_time,
            payload: step.payload,
        })
    }
}

/// Ordered steps executed for one action
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    steps: Vec<WorkflowStep>,
}

impl Workflow {
    pub fn new(steps: Vec<WorkflowStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }
}

/// Workflows keyed by action name
#[derive(Debug, Clone, Default)]
pub struct WorkflowSet {
    workflows: BTreeMap<String, Workflow>,
}

impl WorkflowSet {
    pub fn from_config(config: &WorkflowsConfig) -> Result<Self, LoadTestError> {
        let mut workflows = BTreeMap::new();
        for (action, steps) in &config.actions {
            if steps.is_empty() {
                return Err(LoadTestError::InvalidWorkflow {
                    action: action.clone(),
                    message: "workflow has no steps".to_string(),
                });
            }
            let steps = steps
                .iter()
                .map(|step| WorkflowStep::from_config(action, step))
                .collect::<Result<Vec<_>, _>>()?;
            workflows.insert(action.clone(), Workflow::new(steps));
        }
        Ok(Self { workflows })
    }

    pub fn get(&self, action: &str) -> Option<&Workflow> {
        self.workflows.get(action)
    }

    /// Every action in the table must have a workflow
    pub fn ensure_covers(&self, actions: &ActionTable) -> Result<(), LoadTestError> {
        match actions.names().iter().find(|name| !self.workflows.contains_key(*name)) {
            Some(missing) => Err(LoadTestError::InvalidWorkflow {
                action: missing.clone(),
                message: "no workflow defined for this action".to_string(),
            }),
            None => Ok(()),
        }
    }
}
