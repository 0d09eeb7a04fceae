//! FSRS-6 Memory Model
//!
//! Each item carries two latent variables:
//! - Stability S: days until recall probability decays to 90%
//! - Difficulty D: in [1, 10], how slowly S grows on successful reviews
//!
//! Forgetting curve (power law, decay w20):
//! - R(t, S) = (1 + F * t / S)^(-w20), F = 0.9^(-1/w20) - 1
//!
//! First review with grade G:
//! - S = w[G-1]
//! - D = clamp(w4 - e^(w5 * (G - 1)) + 1, 1, 10)
//!
//! Subsequent review:
//! - D' = clamp(w7 * D0(easy) + (1 - w7) * (D - w6 * (G - 3) * (10 - D) / 9), 1, 10)
//! - Again: S' = w11 * D'^(-w12) * ((S + 1)^w13 - 1) * e^(w14 * (1 - R))
//! - Otherwise: S' = S * (e^w8 * (11 - D') * S^(-w9) * (e^(w10 * (1 - R)) - 1) * hard * easy + 1)
//!
//! Interval for target retention R*:
//! - I = S / F * (R*^(-1/w20) - 1)
//!
//! References:
//! - Ye, J. (2022). A Stochastic Shortest Path Algorithm for Optimizing Spaced Repetition Scheduling.
//! - open-spaced-repetition, FSRS-6 algorithm notes.

mod replay;

pub use replay::{replay, ReviewStep};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SrsError};
use crate::params::FsrsParams;
use crate::sanitize::{clamp_difficulty, sanitize_prior, validate_target_retention};
use crate::types::{
    Grade, MemoryState, ReviewOutcome, ReviewedState, DEFAULT_TARGET_RETENTION,
    REFERENCE_RETENTION, STABILITY_FLOOR,
};

// ==================== Forgetting curve ====================

/// F = 0.9^(-1/w20) - 1, chosen so that R(S, S) = 0.9.
pub fn curve_factor(decay: f64) -> f64 {
    REFERENCE_RETENTION.powf(-1.0 / decay) - 1.0
}

/// Recall probability after `elapsed_days` for an item with the given stability.
pub fn retrievability(stability: f64, elapsed_days: f64, decay: f64) -> f64 {
    let safe_stability = stability.max(STABILITY_FLOOR);
    (1.0 + curve_factor(decay) * elapsed_days / safe_stability).powf(-decay)
}

/// Days after which recall probability falls to `retention`.
pub fn interval_for_retention(stability: f64, retention: f64, decay: f64) -> f64 {
    stability / curve_factor(decay) * (retention.powf(-1.0 / decay) - 1.0)
}

// ==================== State transitions ====================

pub fn initial_difficulty(params: &FsrsParams, grade: Grade) -> f64 {
    let g = grade.value() as f64;
    clamp_difficulty(
        params.initial_difficulty_base() - (params.initial_difficulty_scale() * (g - 1.0)).exp()
            + 1.0,
    )
}

fn next_difficulty(params: &FsrsParams, difficulty: f64, grade: Grade) -> f64 {
    let g = grade.value() as f64;
    let delta = -params.difficulty_delta() * (g - 3.0);
    let tmp = difficulty + delta * (10.0 - difficulty) / 9.0;

    // Mean reversion towards the difficulty of an item always rated Easy (unclamped)
    let d0_easy = params.initial_difficulty_base()
        - (params.initial_difficulty_scale() * 3.0).exp()
        + 1.0;
    let w7 = params.mean_reversion();
    clamp_difficulty(w7 * d0_easy + (1.0 - w7) * tmp)
}

fn next_forget_stability(params: &FsrsParams, difficulty: f64, stability: f64, r: f64) -> f64 {
    params.forget_base()
        * difficulty.powf(-params.forget_difficulty_exp())
        * ((stability + 1.0).powf(params.forget_stability_exp()) - 1.0)
        * (params.forget_retrievability_gain() * (1.0 - r)).exp()
}

fn next_recall_stability(
    params: &FsrsParams,
    difficulty: f64,
    stability: f64,
    r: f64,
    grade: Grade,
) -> f64 {
    let hard_penalty = if grade == Grade::Hard {
        params.hard_penalty()
    } else {
        1.0
    };
    let easy_bonus = if grade == Grade::Easy {
        params.easy_bonus()
    } else {
        1.0
    };

    let growth = params.recall_growth().exp()
        * (11.0 - difficulty)
        * stability.powf(-params.recall_stability_decay())
        * ((params.recall_retrievability_gain() * (1.0 - r)).exp() - 1.0)
        * hard_penalty
        * easy_bonus;
    stability * (growth + 1.0)
}

/// Runs one review through the model.
///
/// `prior` is replaced wholesale by the returned outcome; the caller is
/// responsible for serialising reviews of the same item.
pub fn compute(
    grade: Grade,
    prior: &MemoryState,
    target_retention: f64,
    params: &FsrsParams,
) -> Result<ReviewOutcome> {
    let target_retention = validate_target_retention(target_retention)?;
    let decay = params.decay();

    let outcome = match prior {
        MemoryState::Unseen => {
            let stability = params.initial_stability(grade);
            ReviewOutcome {
                stability,
                difficulty: initial_difficulty(params, grade),
                interval: interval_for_retention(stability, target_retention, decay),
                reps: 1,
                lapses: u32::from(grade.is_lapse()),
                retrievability: 1.0,
            }
        }
        MemoryState::Reviewed(state) => {
            let ReviewedState {
                stability: s,
                difficulty: d,
                elapsed_days,
                reps,
                lapses,
            } = sanitize_prior(state)?;

            let r = retrievability(s, elapsed_days, decay);
            let difficulty = next_difficulty(params, d, grade);
            let stability = if grade.is_lapse() {
                next_forget_stability(params, difficulty, s, r)
            } else {
                next_recall_stability(params, difficulty, s, r, grade)
            };

            ReviewOutcome {
                stability,
                difficulty,
                interval: interval_for_retention(stability, target_retention, decay),
                reps: reps.saturating_add(1),
                lapses: lapses.saturating_add(u32::from(grade.is_lapse())),
                retrievability: r,
            }
        }
    };

    check_outcome(&outcome)?;

    tracing::debug!(
        grade = %grade,
        first_review = prior.is_unseen(),
        retrievability = outcome.retrievability,
        stability = outcome.stability,
        difficulty = outcome.difficulty,
        interval = outcome.interval,
        "fsrs review computed"
    );

    Ok(outcome)
}

fn check_outcome(outcome: &ReviewOutcome) -> Result<()> {
    if !(outcome.stability.is_finite() && outcome.stability > 0.0) {
        return Err(SrsError::InvalidOutcome {
            field: "stability",
            value: outcome.stability,
        });
    }
    if !(outcome.interval.is_finite() && outcome.interval >= 0.0) {
        return Err(SrsError::InvalidOutcome {
            field: "interval",
            value: outcome.interval,
        });
    }
    Ok(())
}

// ==================== Model handle ====================

/// One independent (grade, state) pair for batch evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub grade: Grade,
    pub state: MemoryState,
}

/// Parameters and target retention bundled for repeated use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryModel {
    params: FsrsParams,
    target_retention: f64,
}

impl Default for MemoryModel {
    fn default() -> Self {
        Self {
            params: FsrsParams::DEFAULT,
            target_retention: DEFAULT_TARGET_RETENTION,
        }
    }
}

impl MemoryModel {
    pub fn new(params: FsrsParams, target_retention: f64) -> Result<Self> {
        Ok(Self {
            params,
            target_retention: validate_target_retention(target_retention)?,
        })
    }

    pub fn params(&self) -> &FsrsParams {
        &self.params
    }

    pub fn target_retention(&self) -> f64 {
        self.target_retention
    }

    pub fn compute(&self, grade: Grade, prior: &MemoryState) -> Result<ReviewOutcome> {
        compute(grade, prior, self.target_retention, &self.params)
    }

    pub fn compute_with_retention(
        &self,
        grade: Grade,
        prior: &MemoryState,
        target_retention: f64,
    ) -> Result<ReviewOutcome> {
        compute(grade, prior, target_retention, &self.params)
    }

    /// Current recall probability of a reviewed item; `None` for an unseen one.
    pub fn retrievability(&self, state: &MemoryState) -> Option<f64> {
        match state {
            MemoryState::Unseen => None,
            MemoryState::Reviewed(s) => Some(retrievability(
                s.stability,
                s.elapsed_days.max(0.0),
                self.params.decay(),
            )),
        }
    }

    pub fn interval(&self, stability: f64) -> f64 {
        interval_for_retention(stability, self.target_retention, self.params.decay())
    }

    /// Evaluates independent reviews in parallel; results keep input order.
    pub fn compute_batch(&self, items: &[BatchItem]) -> Vec<Result<ReviewOutcome>> {
        items
            .par_iter()
            .map(|item| self.compute(item.grade, &item.state))
            .collect()
    }

    pub fn replay(&self, history: &[ReviewStep]) -> Result<Vec<ReviewOutcome>> {
        replay(self, history)
    }
}
