use crate::error::{Result, SrsError};
use crate::types::{ReviewedState, MAX_DIFFICULTY, MIN_DIFFICULTY, STABILITY_FLOOR};

/// Index and value of the first NaN/Inf entry
pub fn first_non_finite(values: &[f64]) -> Option<(usize, f64)> {
    values
        .iter()
        .copied()
        .enumerate()
        .find(|(_, v)| !v.is_finite())
}

pub fn clamp_difficulty(difficulty: f64) -> f64 {
    difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

pub fn validate_target_retention(target_retention: f64) -> Result<f64> {
    if target_retention.is_finite() && target_retention > 0.0 && target_retention < 1.0 {
        Ok(target_retention)
    } else {
        Err(SrsError::InvalidTargetRetention(target_retention))
    }
}

/// Repairs a prior state read from storage.
///
/// Finite but out-of-range values are pulled back into range: a non-positive
/// stability is replaced by the floor, difficulty is clamped to [1, 10] and
/// negative elapsed days count as a same-day review. NaN/Inf cannot be
/// repaired and is rejected so it never reaches persisted learner state.
pub fn sanitize_prior(state: &ReviewedState) -> Result<ReviewedState> {
    check_finite("stability", state.stability)?;
    check_finite("difficulty", state.difficulty)?;
    check_finite("lastReview", state.elapsed_days)?;

    let sanitized = ReviewedState {
        stability: if state.stability > 0.0 {
            state.stability
        } else {
            STABILITY_FLOOR
        },
        difficulty: clamp_difficulty(state.difficulty),
        elapsed_days: state.elapsed_days.max(0.0),
        ..*state
    };

    if sanitized != *state {
        tracing::warn!(
            stability = state.stability,
            difficulty = state.difficulty,
            elapsed_days = state.elapsed_days,
            "degenerate prior memory state repaired"
        );
    }

    Ok(sanitized)
}

fn check_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SrsError::CorruptState { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(stability: f64, difficulty: f64, elapsed_days: f64) -> ReviewedState {
        ReviewedState {
            stability,
            difficulty,
            elapsed_days,
            reps: 2,
            lapses: 1,
        }
    }

    #[test]
    fn test_first_non_finite() {
        assert_eq!(first_non_finite(&[0.0, 1.0, -3.5]), None);
        assert_eq!(first_non_finite(&[1.0, 2.0, f64::INFINITY]), Some((2, f64::INFINITY)));
    }

    #[test]
    fn test_target_retention_bounds() {
        assert!(validate_target_retention(0.9).is_ok());
        assert!(validate_target_retention(0.0).is_err());
        assert!(validate_target_retention(1.0).is_err());
        assert!(validate_target_retention(f64::NAN).is_err());
    }

    #[test]
    fn test_valid_state_untouched() {
        let s = state(5.0, 5.0, 2.0);
        assert_eq!(sanitize_prior(&s).unwrap(), s);
    }

    #[test]
    fn test_degenerate_state_repaired() {
        let repaired = sanitize_prior(&state(0.0, 14.0, -1.0)).unwrap();
        assert_eq!(repaired.stability, STABILITY_FLOOR);
        assert_eq!(repaired.difficulty, MAX_DIFFICULTY);
        assert_eq!(repaired.elapsed_days, 0.0);
        assert_eq!(repaired.reps, 2);
        assert_eq!(repaired.lapses, 1);

        let low = sanitize_prior(&state(-3.0, 0.2, 1.0)).unwrap();
        assert_eq!(low.stability, STABILITY_FLOOR);
        assert_eq!(low.difficulty, MIN_DIFFICULTY);
    }

    #[test]
    fn test_non_finite_state_rejected() {
        assert!(matches!(
            sanitize_prior(&state(f64::NAN, 5.0, 1.0)),
            Err(SrsError::CorruptState { field: "stability", .. })
        ));
        assert!(matches!(
            sanitize_prior(&state(5.0, f64::INFINITY, 1.0)),
            Err(SrsError::CorruptState { field: "difficulty", .. })
        ));
        assert!(matches!(
            sanitize_prior(&state(5.0, 5.0, f64::NAN)),
            Err(SrsError::CorruptState { field: "lastReview", .. })
        ));
    }
}
