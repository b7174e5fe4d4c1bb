//! Confidence-threshold policy.
//!
//! Decides, per prediction, whether it counts toward the performative
//! signal. The base threshold is asymmetric: once the scene is
//! performative a lower bar keeps it, while a higher bar is required to
//! first declare it. This composes with the frame-count hysteresis in
//! `hysteresis`; the two anti-flicker mechanisms are independent.

use crate::classify::{classify, Category};
use crate::detect::Prediction;
use crate::hysteresis::DetectionState;
use crate::settings::Settings;

/// Per-category confidence floors layered on top of the enter/exit base
/// threshold. A floor can only raise the requirement, never lower it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CategoryMinimums {
    drink: f32,
    book: f32,
    tin: f32,
}

impl Default for CategoryMinimums {
    fn default() -> Self {
        Self {
            drink: 0.25,
            book: 0.40,
            tin: 0.0,
        }
    }
}

impl CategoryMinimums {
    pub fn floor(&self, category: Category) -> f32 {
        match category {
            Category::Drink => self.drink,
            Category::Book => self.book,
            Category::Tin => self.tin,
        }
    }

    pub fn with_floor(mut self, category: Category, floor: f32) -> Self {
        match category {
            Category::Drink => self.drink = floor,
            Category::Book => self.book = floor,
            Category::Tin => self.tin = floor,
        }
        self
    }
}

/// Pass/fail decision for predictions, parameterized by the category
/// floors. Reads `Settings` fresh on every call; nothing is snapshotted.
#[derive(Clone, Debug, Default)]
pub struct ThresholdPolicy {
    minimums: CategoryMinimums,
}

impl ThresholdPolicy {
    pub fn new(minimums: CategoryMinimums) -> Self {
        Self { minimums }
    }

    pub fn minimums(&self) -> &CategoryMinimums {
        &self.minimums
    }

    /// Score a prediction of `category` must reach, given the current
    /// (pre-update) state.
    pub fn required_score(
        &self,
        category: Category,
        state: &DetectionState,
        settings: &Settings,
    ) -> f32 {
        let base = if state.is_performative() {
            settings.exit_score()
        } else {
            settings.enter_score()
        };
        base.max(self.minimums.floor(category))
    }

    /// A prediction is accepted iff it classifies to a category and its
    /// score reaches the required score for that category.
    pub fn accepts(
        &self,
        prediction: &Prediction,
        state: &DetectionState,
        settings: &Settings,
    ) -> bool {
        match classify(&prediction.label) {
            Some(category) => {
                prediction.score >= self.required_score(category, state, settings)
            }
            None => false,
        }
    }

    /// The frame's pass set: every accepted prediction, in input order.
    pub fn pass_set<'a>(
        &self,
        predictions: &'a [Prediction],
        state: &DetectionState,
        settings: &Settings,
    ) -> Vec<&'a Prediction> {
        predictions
            .iter()
            .filter(|p| self.accepts(p, state, settings))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BBox;

    fn pred(label: &str, score: f32) -> Prediction {
        Prediction::new(label, score, BBox::new(0.0, 0.0, 10.0, 10.0))
    }

    fn performative_state() -> DetectionState {
        let mut state = DetectionState::new();
        while !state.is_performative() {
            state.observe(true, 1, 1);
        }
        state
    }

    #[test]
    fn base_threshold_is_enter_when_nonperformative() {
        let policy = ThresholdPolicy::default();
        let settings = Settings::default();
        let state = DetectionState::new();
        assert!(policy.accepts(&pred("cup", 0.36), &state, &settings));
        assert!(!policy.accepts(&pred("cup", 0.34), &state, &settings));
    }

    #[test]
    fn base_threshold_drops_to_exit_when_performative() {
        let policy = ThresholdPolicy::default();
        let settings = Settings::default();
        let state = performative_state();
        // 0.31 clears exit (0.30) but not enter (0.35).
        assert!(policy.accepts(&pred("cup", 0.31), &state, &settings));
    }

    #[test]
    fn category_floor_overrides_base_threshold() {
        let policy = ThresholdPolicy::default();
        let settings = Settings::default();
        let state = DetectionState::new();
        // 0.36 clears the enter threshold but not the Book floor of 0.40.
        assert!(!policy.accepts(&pred("book", 0.36), &state, &settings));
        assert!(policy.accepts(&pred("book", 0.41), &state, &settings));
    }

    #[test]
    fn floor_never_lowers_the_requirement() {
        let policy = ThresholdPolicy::default();
        let settings = Settings::default();
        let state = DetectionState::new();
        // Drink floor is 0.25; the enter threshold of 0.35 still applies.
        assert!(!policy.accepts(&pred("cup", 0.30), &state, &settings));
    }

    #[test]
    fn unclassified_predictions_never_pass() {
        let policy = ThresholdPolicy::default();
        let settings = Settings::default();
        let state = DetectionState::new();
        assert!(!policy.accepts(&pred("person", 0.99), &state, &settings));
    }

    #[test]
    fn pass_set_keeps_input_order() {
        let policy = ThresholdPolicy::default();
        let settings = Settings::default();
        let state = DetectionState::new();
        let predictions = vec![
            pred("cup", 0.9),
            pred("person", 0.9),
            pred("book", 0.5),
            pred("cup", 0.1),
        ];
        let pass = policy.pass_set(&predictions, &state, &settings);
        let labels: Vec<&str> = pass.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["cup", "book"]);
    }

    #[test]
    fn custom_floor_applies() {
        let policy =
            ThresholdPolicy::new(CategoryMinimums::default().with_floor(Category::Tin, 0.6));
        let settings = Settings::default();
        let state = DetectionState::new();
        assert!(!policy.accepts(&pred("matcha tin", 0.5), &state, &settings));
        assert!(policy.accepts(&pred("matcha tin", 0.65), &state, &settings));
    }
}
