//! Typed feedback form submitted by simulated users

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const GENDERS: [&str; 3] = ["male", "female", "other"];

pub const AGE_GROUPS: [&str; 8] = [
    "10以下", "10-20", "20-30", "30-40", "40-50", "50-60", "60-70", "70以上",
];

pub const FEEDBACK_SAMPLES: [&str; 5] = ["非常滿意", "很好", "一般", "不錯", "需要改進"];

/// Willingness flags nested in a [`Form`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Willingness {
    pub to_return: bool,
    pub receive_promotions: bool,
    pub receive_birthday_notifications: bool,
}

/// Body of `POST /submit_form`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    pub gender: String,
    pub age_group: String,
    pub feedback: String,
    pub willing: Willingness,
}

impl Form {
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Draws random forms from the fixed answer sets
#[derive(Debug, Clone, Copy, Default)]
pub struct FormGenerator;

impl FormGenerator {
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Form {
        Form {
            gender: pick(&GENDERS, rng).to_string(),
            age_group: pick(&AGE_GROUPS, rng).to_string(),
            feedback: pick(&FEEDBACK_SAMPLES, rng).to_string(),
            willing: Willingness {
                to_return: rng.random_bool(0.5),
                receive_promotions: rng.random_bool(0.5),
                receive_birthday_notifications: rng.random_bool(0.5),
            },
        }
    }

    pub fn generate_many<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Form> {
        (0..count).map(|_| self.generate(rng)).collect()
    }
}

fn pick<'a, R: Rng + ?Sized>(choices: &[&'a str], rng: &mut R) -> &'a str {
    choices[rng.random_range(0..choices.len())]
}

/// Source of the form each user submits: round-robin over a supplied list,
/// or freshly generated when the list is empty
#[derive(Debug, Clone, Default)]
pub struct FormPool {
    forms: Vec<Form>,
    generator: FormGenerator,
}

impl FormPool {
    pub fn new(forms: Vec<Form>) -> Self {
        Self {
            forms,
            generator: FormGenerator,
        }
    }

    pub fn generated() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Form for a 1-based user id
    pub fn form_for<R: Rng + ?Sized>(&self, user_id: u64, rng: &mut R) -> Form {
        if self.forms.is_empty() {
            return self.generator.generate(rng);
        }
        let index = (user_id.saturating_sub(1) % self.forms.len() as u64) as usize;
        self.forms[index].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_forms_use_known_answers() {
        let mut rng = StdRng::seed_from_u64(3);
        for form in FormGenerator.generate_many(200, &mut rng) {
            assert!(GENDERS.contains(&form.gender.as_str()));
            assert!(AGE_GROUPS.contains(&form.age_group.as_str()));
            assert!(FEEDBACK_SAMPLES.contains(&form.feedback.as_str()));
        }
    }

    #[test]
    fn test_form_json_shape() {
        let form = Form {
            gender: "other".to_string(),
            age_group: "30-40".to_string(),
            feedback: "一般".to_string(),
            willing: Willingness {
                to_return: true,
                receive_promotions: false,
                receive_birthday_notifications: true,
            },
        };

        let value = form.to_json().unwrap();
        assert_eq!(value["willing"]["receive_birthday_notifications"], true);

        let parsed: Form = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, form);
    }

    #[test]
    fn test_pool_round_robin() {
        let mut rng = StdRng::seed_from_u64(1);
        let forms = FormGenerator.generate_many(3, &mut rng);
        let pool = FormPool::new(forms.clone());

        assert_eq!(pool.form_for(1, &mut rng), forms[0]);
        assert_eq!(pool.form_for(3, &mut rng), forms[2]);
        assert_eq!(pool.form_for(4, &mut rng), forms[0]);
    }

    #[test]
    fn test_empty_pool_generates() {
        let mut a = StdRng::seed_from_u64(11);
        let mut b = StdRng::seed_from_u64(11);
        let pool = FormPool::generated();
        assert!(pool.is_empty());
        assert_eq!(pool.form_for(5, &mut a), pool.form_for(5, &mut b));
    }
}
