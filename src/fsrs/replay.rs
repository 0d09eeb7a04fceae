use serde::{Deserialize, Serialize};

use super::MemoryModel;
use crate::error::Result;
use crate::types::{Grade, MemoryState, ReviewOutcome};

/// One entry of a review history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStep {
    pub grade: Grade,
    /// Days since the previous step; ignored for the first review
    #[serde(default)]
    pub elapsed_days: f64,
}

impl ReviewStep {
    pub fn new(grade: Grade, elapsed_days: f64) -> Self {
        Self {
            grade,
            elapsed_days,
        }
    }
}

/// Folds a history through the model starting from an unseen item and
/// returns the outcome after every step.
pub fn replay(model: &MemoryModel, history: &[ReviewStep]) -> Result<Vec<ReviewOutcome>> {
    let mut state = MemoryState::Unseen;
    let mut outcomes = Vec::with_capacity(history.len());

    for step in history {
        let prior = state.with_elapsed(step.elapsed_days);
        let outcome = model.compute(step.grade, &prior)?;
        state = outcome.next_state(0.0);
        outcomes.push(outcome);
    }

    tracing::debug!(steps = history.len(), "review history replayed");
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let outcomes = replay(&MemoryModel::default(), &[]).unwrap();
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_first_step_elapsed_ignored() {
        let model = MemoryModel::default();
        let a = replay(&model, &[ReviewStep::new(Grade::Good, 0.0)]).unwrap();
        let b = replay(&model, &[ReviewStep::new(Grade::Good, 12.0)]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_counters_accumulate() {
        let history = [
            ReviewStep::new(Grade::Again, 0.0),
            ReviewStep::new(Grade::Good, 1.0),
            ReviewStep::new(Grade::Again, 2.0),
            ReviewStep::new(Grade::Easy, 1.0),
        ];
        let outcomes = replay(&MemoryModel::default(), &history).unwrap();
        let counters: Vec<(u32, u32)> = outcomes.iter().map(|o| (o.reps, o.lapses)).collect();
        assert_eq!(counters, vec![(1, 1), (2, 1), (3, 2), (4, 2)]);
    }

    #[test]
    fn test_step_json() {
        let step: ReviewStep = serde_json::from_str(r#"{"grade": 4, "elapsedDays": 3}"#).unwrap();
        assert_eq!(step, ReviewStep::new(Grade::Easy, 3.0));
        assert!(serde_json::from_str::<ReviewStep>(r#"{"grade": 0}"#).is_err());
    }
}
