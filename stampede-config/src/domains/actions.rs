//! Weighted user action mix

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One entry of the action distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionWeight {
    pub action: String,
    pub weight: f64,
}

impl ActionWeight {
    pub fn new(action: impl Into<String>, weight: f64) -> Self {
        Self {
            action: action.into(),
            weight,
        }
    }
}

/// The set of actions a simulated user picks from, one draw per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionMix {
    pub weights: Vec<ActionWeight>,
}

impl ActionMix {
    pub fn new(weights: Vec<ActionWeight>) -> Self {
        Self { weights }
    }

    /// Convenience for a mix with a single action
    pub fn only(action: impl Into<String>) -> Self {
        Self::new(vec![ActionWeight::new(action, 1.0)])
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.iter().map(|w| w.weight).sum()
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.weights.iter().map(|w| w.action.as_str())
    }
}

impl Default for ActionMix {
    fn default() -> Self {
        Self::new(vec![
            ActionWeight::new("fill_form", 0.6),
            ActionWeight::new("visit_home", 0.25),
            ActionWeight::new("refresh_page", 0.15),
        ])
    }
}

impl Validatable for ActionMix {
    fn validate(&self) -> ConfigResult<()> {
        if self.weights.is_empty() {
            return Err(self.validation_error("at least one action must be configured"));
        }

        let mut seen = HashSet::new();
        for entry in &self.weights {
            validate_required_string(&entry.action, "action", self.domain_name())?;

            if !entry.weight.is_finite() || entry.weight <= 0.0 {
                return Err(self.validation_error(format!(
                    "weight for action '{}' must be a finite value > 0, got {}",
                    entry.action, entry.weight
                )));
            }

            if !seen.insert(entry.action.as_str()) {
                return Err(self.validation_error(format!(
                    "action '{}' is listed more than once",
                    entry.action
                )));
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "actions"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mix_is_valid() {
        let mix = ActionMix::default();
        assert!(mix.validate().is_ok());
        assert!((mix.total_weight() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_mix_rejected() {
        assert!(ActionMix::new(vec![]).validate().is_err());
    }

    #[test]
    fn test_non_positive_weights_rejected() {
        let zero = ActionMix::new(vec![ActionWeight::new("fill_form", 0.0)]);
        assert!(zero.validate().is_err());

        let negative = ActionMix::new(vec![
            ActionWeight::new("fill_form", 1.0),
            ActionWeight::new("visit_home", -0.5),
        ]);
        assert!(negative.validate().is_err());

        let nan = ActionMix::new(vec![ActionWeight::new("fill_form", f64::NAN)]);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_duplicate_actions_rejected() {
        let mix = ActionMix::new(vec![
            ActionWeight::new("fill_form", 1.0),
            ActionWeight::new("fill_form", 2.0),
        ]);
        assert!(mix.validate().is_err());
    }

    #[test]
    fn test_mix_deserializes_from_list() {
        let yaml = "- action: fill_form\n  weight: 1.0\n- action: refresh_page\n  weight: 3\n";
        let mix: ActionMix = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(mix.weights.len(), 2);
        assert_eq!(mix.weights[1].weight, 3.0);
    }
}
