//! # woord-srs - spaced repetition core for the Dutch vocabulary trainer
//!
//! Pure Rust implementation of the FSRS-6 memory model:
//!
//! - **Memory model** - stability/difficulty update per graded review
//! - **Forgetting curve** - retrievability and interval for a target retention
//! - **Review recording** - timestamps in, next review time and log entry out
//! - **Card selection** - most overdue card first, under daily review and new-card limits
//!
//! ## Modules
//!
//! - [`fsrs`] - FSRS-6 formulas, `MemoryModel`, batch evaluation, history replay
//! - [`params`] - validated 21-weight parameter vector
//! - [`review`] - review recording on wall-clock timestamps, next-card selection
//! - [`sanitize`] - numeric validation and repair of stored state
//! - [`types`] - grades, memory state, model output and constants
//! - [`config`] - environment configuration
//! - [`logging`] - tracing subscriber setup
//!
//! ## Example
//!
//! ```rust
//! use woord_srs::{Grade, MemoryModel, MemoryState};
//!
//! let model = MemoryModel::default();
//! let first = model.compute(Grade::Good, &MemoryState::Unseen).unwrap();
//! assert_eq!(first.reps, 1);
//!
//! // three days later
//! let second = model.compute(Grade::Easy, &first.next_state(3.0)).unwrap();
//! assert!(second.stability > first.stability);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod error;
pub mod fsrs;
pub mod logging;
pub mod params;
pub mod review;
pub mod sanitize;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Result, SrsError};
pub use fsrs::{
    compute, interval_for_retention, retrievability, BatchItem, MemoryModel, ReviewStep,
};
pub use params::{FsrsParams, FSRS6_DEFAULT_WEIGHTS};
pub use review::{
    next_card, record_click, record_review, CardStatus, DailyLimits, RecordedReview, ReviewLogEntry,
};
pub use types::*;
