use thiserror::Error;

use crate::types::PARAM_COUNT;

#[derive(Debug, Error)]
pub enum SrsError {
    #[error("invalid grade {0}: expected 1 (again), 2 (hard), 3 (good) or 4 (easy)")]
    InvalidGrade(i64),
    #[error("unknown review result: {0}")]
    UnknownReviewResult(String),
    #[error("parameter count mismatch: expected {expected}, got {actual}")]
    InvalidParamCount { expected: usize, actual: usize },
    #[error("parameter w{index} is not finite: {value}")]
    NonFiniteParam { index: usize, value: f64 },
    #[error("target retention must lie in (0, 1), got {0}")]
    InvalidTargetRetention(f64),
    #[error("corrupt memory state: {field} is {value}")]
    CorruptState { field: &'static str, value: f64 },
    #[error("computation produced invalid {field}: {value}")]
    InvalidOutcome { field: &'static str, value: f64 },
    #[error("partial memory state: stability and difficulty must both be set or both be empty")]
    PartialState,
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SrsError {
    pub(crate) fn param_count(actual: usize) -> Self {
        Self::InvalidParamCount {
            expected: PARAM_COUNT,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, SrsError>;
