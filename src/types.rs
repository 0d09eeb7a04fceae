use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SrsError};

// ============================================================================
// Constants
// ============================================================================

/// Number of FSRS-6 weights (w0..w20)
pub const PARAM_COUNT: usize = 21;
/// Retention the model's stability is defined against
pub const REFERENCE_RETENTION: f64 = 0.9;
pub const DEFAULT_TARGET_RETENTION: f64 = 0.9;
pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 10.0;
/// Floor applied to a prior stability before it is used as a divisor
pub const STABILITY_FLOOR: f64 = 1e-4;

// ============================================================================
// Grade
// ============================================================================

/// Learner's self-reported recall outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Grade {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    pub fn from_value(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Self::Again),
            2 => Ok(Self::Hard),
            3 => Ok(Self::Good),
            4 => Ok(Self::Easy),
            other => Err(SrsError::InvalidGrade(other)),
        }
    }

    pub fn value(self) -> i64 {
        self as i64
    }

    /// Zero-based position in the initial-stability weights w0..w3.
    pub fn index(self) -> usize {
        self as usize - 1
    }

    pub fn is_lapse(self) -> bool {
        self == Self::Again
    }
}

impl TryFrom<i64> for Grade {
    type Error = SrsError;

    fn try_from(value: i64) -> Result<Self> {
        Self::from_value(value)
    }
}

impl From<Grade> for i64 {
    fn from(grade: Grade) -> Self {
        grade.value()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        };
        f.write_str(name)
    }
}

/// Answer button pressed in the training screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewResult {
    Fail,
    Hard,
    Success,
    Easy,
}

impl ReviewResult {
    pub fn grade(self) -> Grade {
        match self {
            Self::Fail => Grade::Again,
            Self::Hard => Grade::Hard,
            Self::Success => Grade::Good,
            Self::Easy => Grade::Easy,
        }
    }
}

impl FromStr for ReviewResult {
    type Err = SrsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "hard" => Ok(Self::Hard),
            "success" => Ok(Self::Success),
            "easy" => Ok(Self::Easy),
            other => Err(SrsError::UnknownReviewResult(other.to_string())),
        }
    }
}

/// How the review was triggered. Clicking a word to look it up counts as a
/// lapse; the first graded answer on an unseen card is logged as `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewKind {
    #[default]
    Review,
    New,
    Click,
}

// ============================================================================
// Memory state
// ============================================================================

/// Memory of an item that has been reviewed at least once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedState {
    pub stability: f64,
    pub difficulty: f64,
    /// Days elapsed since the previous review (0 if reviewed today)
    #[serde(rename = "lastReview", default)]
    pub elapsed_days: f64,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub lapses: u32,
}

/// Prior memory state handed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MemoryState {
    #[default]
    Unseen,
    Reviewed(ReviewedState),
}

impl MemoryState {
    pub fn reviewed(stability: f64, difficulty: f64, elapsed_days: f64) -> Self {
        Self::Reviewed(ReviewedState {
            stability,
            difficulty,
            elapsed_days,
            reps: 0,
            lapses: 0,
        })
    }

    pub fn is_unseen(&self) -> bool {
        matches!(self, Self::Unseen)
    }

    pub fn reps(&self) -> u32 {
        match self {
            Self::Unseen => 0,
            Self::Reviewed(s) => s.reps,
        }
    }

    pub fn lapses(&self) -> u32 {
        match self {
            Self::Unseen => 0,
            Self::Reviewed(s) => s.lapses,
        }
    }

    /// Same state with the elapsed days replaced; no-op for an unseen item.
    pub fn with_elapsed(self, elapsed_days: f64) -> Self {
        match self {
            Self::Unseen => Self::Unseen,
            Self::Reviewed(s) => Self::Reviewed(ReviewedState { elapsed_days, ..s }),
        }
    }
}

/// Nullable row layout used by the storage layer (`fsrs_stability`, `fsrs_difficulty`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatMemoryState {
    pub stability: Option<f64>,
    pub difficulty: Option<f64>,
    pub last_review: Option<f64>,
    pub reps: Option<u32>,
    pub lapses: Option<u32>,
}

impl TryFrom<FlatMemoryState> for MemoryState {
    type Error = SrsError;

    fn try_from(flat: FlatMemoryState) -> Result<Self> {
        match (flat.stability, flat.difficulty) {
            (None, None) => Ok(Self::Unseen),
            (Some(stability), Some(difficulty)) => Ok(Self::Reviewed(ReviewedState {
                stability,
                difficulty,
                elapsed_days: flat.last_review.unwrap_or(0.0),
                reps: flat.reps.unwrap_or(0),
                lapses: flat.lapses.unwrap_or(0),
            })),
            _ => Err(SrsError::PartialState),
        }
    }
}

impl From<MemoryState> for FlatMemoryState {
    fn from(state: MemoryState) -> Self {
        match state {
            MemoryState::Unseen => Self::default(),
            MemoryState::Reviewed(s) => Self {
                stability: Some(s.stability),
                difficulty: Some(s.difficulty),
                last_review: Some(s.elapsed_days),
                reps: Some(s.reps),
                lapses: Some(s.lapses),
            },
        }
    }
}

// ============================================================================
// Model output
// ============================================================================

/// Result of one review: the replacement memory state plus the next interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub stability: f64,
    pub difficulty: f64,
    /// Days until the next review should be scheduled
    pub interval: f64,
    pub reps: u32,
    pub lapses: u32,
    /// Recall probability at the moment of this review (1.0 on a first review)
    pub retrievability: f64,
}

impl ReviewOutcome {
    /// State to hand back to the model at the next review, `elapsed_days` after this one.
    pub fn next_state(&self, elapsed_days: f64) -> MemoryState {
        MemoryState::Reviewed(ReviewedState {
            stability: self.stability,
            difficulty: self.difficulty,
            elapsed_days,
            reps: self.reps,
            lapses: self.lapses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_rejects_out_of_range() {
        assert!(matches!(Grade::from_value(0), Err(SrsError::InvalidGrade(0))));
        assert!(matches!(Grade::from_value(5), Err(SrsError::InvalidGrade(5))));
        assert!(matches!(Grade::from_value(-1), Err(SrsError::InvalidGrade(-1))));
        assert_eq!(Grade::from_value(3).unwrap(), Grade::Good);
    }

    #[test]
    fn test_grade_serde_as_integer() {
        assert_eq!(serde_json::to_string(&Grade::Easy).unwrap(), "4");
        let g: Grade = serde_json::from_str("2").unwrap();
        assert_eq!(g, Grade::Hard);
        assert!(serde_json::from_str::<Grade>("7").is_err());
    }

    #[test]
    fn test_review_result_mapping() {
        assert_eq!("fail".parse::<ReviewResult>().unwrap().grade(), Grade::Again);
        assert_eq!("hard".parse::<ReviewResult>().unwrap().grade(), Grade::Hard);
        assert_eq!(" Success ".parse::<ReviewResult>().unwrap().grade(), Grade::Good);
        assert_eq!("easy".parse::<ReviewResult>().unwrap().grade(), Grade::Easy);
        assert!("freeze".parse::<ReviewResult>().is_err());
    }

    #[test]
    fn test_flat_state_conversion() {
        let unseen: MemoryState = FlatMemoryState::default().try_into().unwrap();
        assert!(unseen.is_unseen());

        let flat = FlatMemoryState {
            stability: Some(5.0),
            difficulty: Some(5.0),
            last_review: None,
            reps: Some(3),
            lapses: None,
        };
        let state: MemoryState = flat.try_into().unwrap();
        assert_eq!(
            state,
            MemoryState::Reviewed(ReviewedState {
                stability: 5.0,
                difficulty: 5.0,
                elapsed_days: 0.0,
                reps: 3,
                lapses: 0,
            })
        );

        let partial = FlatMemoryState {
            stability: Some(5.0),
            ..Default::default()
        };
        assert!(matches!(
            MemoryState::try_from(partial),
            Err(SrsError::PartialState)
        ));
    }

    #[test]
    fn test_memory_state_json_shape() {
        let state = MemoryState::Reviewed(ReviewedState {
            stability: 2.5,
            difficulty: 4.0,
            elapsed_days: 1.0,
            reps: 2,
            lapses: 1,
        });
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json["status"], "reviewed");
        assert_eq!(json["lastReview"], 1.0);
        let back: MemoryState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
