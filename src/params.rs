//! FSRS-6 weight vector.
//!
//! Weights are stored positionally (w0..w20) exactly as they appear in the
//! calibration table, and read through named accessors so the model never
//! indexes the array directly.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SrsError};
use crate::sanitize::first_non_finite;
use crate::types::{Grade, PARAM_COUNT};

/// FSRS-6 default calibration.
pub const FSRS6_DEFAULT_WEIGHTS: [f64; PARAM_COUNT] = [
    0.212, 1.2931, 2.3065, 8.2956, // w0-w3: initial stability per grade
    6.4133, 0.8334, // w4-w5: initial difficulty
    3.0194, 0.001, // w6-w7: difficulty delta, mean reversion
    1.8722, 0.1666, 0.796, // w8-w10: recall stability
    1.4835, 0.0614, 0.2629, 1.6483, // w11-w14: forget stability
    0.6014, 1.8729, // w15-w16: hard penalty, easy bonus
    0.5425, 0.0912, 0.0658, // w17-w19: short-term (same-day) stability
    0.1542, // w20: forgetting curve decay
];

/// Validated FSRS-6 parameters. Always holds exactly 21 finite weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FsrsParams {
    w: [f64; PARAM_COUNT],
}

impl Default for FsrsParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FsrsParams {
    pub const DEFAULT: Self = Self {
        w: FSRS6_DEFAULT_WEIGHTS,
    };

    pub fn new(w: [f64; PARAM_COUNT]) -> Result<Self> {
        if let Some((index, value)) = first_non_finite(&w) {
            return Err(SrsError::NonFiniteParam { index, value });
        }
        Ok(Self { w })
    }

    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let w: [f64; PARAM_COUNT] = values
            .try_into()
            .map_err(|_| SrsError::param_count(values.len()))?;
        Self::new(w)
    }

    /// Parses either a JSON array (`[0.212, 1.2931, ...]`) or a plain
    /// comma-separated list of weights.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.starts_with('[') {
            let values: Vec<f64> = serde_json::from_str(trimmed)?;
            return Self::from_slice(&values);
        }

        let values = trimmed
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<f64>()
                    .map_err(|_| SrsError::Config(format!("invalid weight '{part}'")))
            })
            .collect::<Result<Vec<f64>>>()?;
        Self::from_slice(&values)
    }

    pub fn weights(&self) -> &[f64; PARAM_COUNT] {
        &self.w
    }

    pub fn initial_stability(&self, grade: Grade) -> f64 {
        self.w[grade.index()]
    }

    pub fn initial_difficulty_base(&self) -> f64 {
        self.w[4]
    }

    pub fn initial_difficulty_scale(&self) -> f64 {
        self.w[5]
    }

    pub fn difficulty_delta(&self) -> f64 {
        self.w[6]
    }

    pub fn mean_reversion(&self) -> f64 {
        self.w[7]
    }

    pub fn recall_growth(&self) -> f64 {
        self.w[8]
    }

    pub fn recall_stability_decay(&self) -> f64 {
        self.w[9]
    }

    pub fn recall_retrievability_gain(&self) -> f64 {
        self.w[10]
    }

    pub fn forget_base(&self) -> f64 {
        self.w[11]
    }

    pub fn forget_difficulty_exp(&self) -> f64 {
        self.w[12]
    }

    pub fn forget_stability_exp(&self) -> f64 {
        self.w[13]
    }

    pub fn forget_retrievability_gain(&self) -> f64 {
        self.w[14]
    }

    pub fn hard_penalty(&self) -> f64 {
        self.w[15]
    }

    pub fn easy_bonus(&self) -> f64 {
        self.w[16]
    }

    /// Power-law forgetting curve exponent.
    pub fn decay(&self) -> f64 {
        self.w[20]
    }
}

impl TryFrom<Vec<f64>> for FsrsParams {
    type Error = SrsError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::from_slice(&values)
    }
}

impl From<FsrsParams> for Vec<f64> {
    fn from(params: FsrsParams) -> Self {
        params.w.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_calibration_table() {
        let p = FsrsParams::default();
        assert_eq!(p.initial_stability(Grade::Again), 0.212);
        assert_eq!(p.initial_stability(Grade::Good), 2.3065);
        assert_eq!(p.initial_stability(Grade::Easy), 8.2956);
        assert_eq!(p.hard_penalty(), 0.6014);
        assert_eq!(p.easy_bonus(), 1.8729);
        assert_eq!(p.decay(), 0.1542);
    }

    #[test]
    fn test_rejects_wrong_length() {
        let err = FsrsParams::from_slice(&FSRS6_DEFAULT_WEIGHTS[..17]).unwrap_err();
        assert!(matches!(
            err,
            SrsError::InvalidParamCount {
                expected: 21,
                actual: 17
            }
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut w = FSRS6_DEFAULT_WEIGHTS;
        w[9] = f64::NAN;
        assert!(matches!(
            FsrsParams::new(w),
            Err(SrsError::NonFiniteParam { index: 9, .. })
        ));

        w[9] = f64::INFINITY;
        assert!(FsrsParams::new(w).is_err());
    }

    #[test]
    fn test_parse_json_and_csv() {
        let json = serde_json::to_string(&FSRS6_DEFAULT_WEIGHTS.to_vec()).unwrap();
        assert_eq!(FsrsParams::parse(&json).unwrap(), FsrsParams::DEFAULT);

        let csv = FSRS6_DEFAULT_WEIGHTS
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        assert_eq!(FsrsParams::parse(&csv).unwrap(), FsrsParams::DEFAULT);

        assert!(matches!(
            FsrsParams::parse("1.0, abc"),
            Err(SrsError::Config(_))
        ));
        assert!(matches!(
            FsrsParams::parse("[1.0, 2.0]"),
            Err(SrsError::InvalidParamCount { actual: 2, .. })
        ));
    }

    #[test]
    fn test_serde_as_array() {
        let json = serde_json::to_value(FsrsParams::DEFAULT).unwrap();
        assert_eq!(json.as_array().map(|a| a.len()), Some(PARAM_COUNT));
        assert!(serde_json::from_str::<FsrsParams>("[0.1, 0.2]").is_err());
    }
}
