//! Review recording on top of the memory model.
//!
//! Translates a learner response at a wall-clock time into a model call and
//! produces the replacement card status plus a log entry. Also picks the next
//! card to show from a learner's deck and today's log. Persistence and
//! per-card serialisation stay with the caller.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fsrs::MemoryModel;
use crate::types::{Grade, MemoryState, ReviewKind, ReviewResult};

pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Longest interval ever scheduled (100 years).
pub const MAX_INTERVAL_DAYS: f64 = 36_500.0;

/// Scheduling status of one (learner, word, mode) triple.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStatus {
    pub memory: MemoryState,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub next_review_at: Option<DateTime<Utc>>,
    pub last_interval: Option<f64>,
    pub last_grade: Option<Grade>,
    #[serde(default)]
    pub last_result: Option<ReviewResult>,
    /// Times the learner looked this word up while it was on screen
    #[serde(default)]
    pub click_count: u32,
}

impl CardStatus {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_review_at {
            Some(at) => at <= now,
            None => true,
        }
    }
}

/// Per-learner caps on what is shown in one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLimits {
    pub new: u32,
    pub review: u32,
}

impl Default for DailyLimits {
    fn default() -> Self {
        Self {
            new: 10,
            review: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewMetadata {
    pub elapsed_days: Option<f64>,
    pub retrievability: f64,
    pub same_day: bool,
    pub last_reviewed_at_before: Option<DateTime<Utc>>,
    pub click: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLogEntry {
    pub reviewed_at: DateTime<Utc>,
    pub scheduled_at: DateTime<Utc>,
    pub review_type: ReviewKind,
    pub grade: Grade,
    pub interval_after: f64,
    pub stability_before: Option<f64>,
    pub stability_after: f64,
    pub metadata: ReviewMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedReview {
    pub status: CardStatus,
    pub log: ReviewLogEntry,
}

/// Days between two timestamps; negative spans (clock skew) count as zero.
pub fn elapsed_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let days = (to - from).num_milliseconds() as f64 / MS_PER_DAY;
    if days < 0.0 {
        tracing::warn!(%from, %to, "review timestamp precedes previous review");
        return 0.0;
    }
    days
}

/// Due time for an interval, capped at [`MAX_INTERVAL_DAYS`] and at the
/// latest representable timestamp.
pub fn next_review_at(reviewed_at: DateTime<Utc>, interval_days: f64) -> DateTime<Utc> {
    let millis = (interval_days.clamp(0.0, MAX_INTERVAL_DAYS) * MS_PER_DAY).round() as i64;
    reviewed_at
        .checked_add_signed(Duration::milliseconds(millis))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Calendar date as seen by a learner at `utc_offset`.
pub fn local_date(at: DateTime<Utc>, utc_offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&utc_offset).date_naive()
}

pub fn record_review(
    model: &MemoryModel,
    status: &CardStatus,
    result: ReviewResult,
    reviewed_at: DateTime<Utc>,
    utc_offset: FixedOffset,
) -> Result<RecordedReview> {
    record(
        model,
        status,
        result,
        ReviewKind::Review,
        reviewed_at,
        utc_offset,
    )
}

/// Looking a word up while it is on screen counts as a lapse.
pub fn record_click(
    model: &MemoryModel,
    status: &CardStatus,
    reviewed_at: DateTime<Utc>,
    utc_offset: FixedOffset,
) -> Result<RecordedReview> {
    record(
        model,
        status,
        ReviewResult::Fail,
        ReviewKind::Click,
        reviewed_at,
        utc_offset,
    )
}

/// A graded answer on an unseen card is logged as [`ReviewKind::New`] so it
/// counts against the new-card limit instead of the review limit.
pub fn record(
    model: &MemoryModel,
    status: &CardStatus,
    result: ReviewResult,
    kind: ReviewKind,
    reviewed_at: DateTime<Utc>,
    utc_offset: FixedOffset,
) -> Result<RecordedReview> {
    let grade = result.grade();
    let kind = match (kind, &status.memory) {
        (ReviewKind::Review, MemoryState::Unseen) => ReviewKind::New,
        (kind, _) => kind,
    };

    let elapsed_days = match (&status.memory, status.last_reviewed_at) {
        (MemoryState::Unseen, _) => None,
        (MemoryState::Reviewed(_), Some(last)) => Some(elapsed_days_between(last, reviewed_at)),
        (MemoryState::Reviewed(s), None) => Some(s.elapsed_days),
    };

    let prior = match elapsed_days {
        Some(days) => status.memory.with_elapsed(days),
        None => status.memory,
    };
    let stability_before = match &prior {
        MemoryState::Unseen => None,
        MemoryState::Reviewed(s) => Some(s.stability),
    };

    let outcome = model.compute(grade, &prior)?;
    let interval = outcome.interval.min(MAX_INTERVAL_DAYS);
    if interval < outcome.interval {
        tracing::warn!(
            computed = outcome.interval,
            capped = interval,
            "interval capped"
        );
    }
    let scheduled_at = next_review_at(reviewed_at, interval);

    let same_day = status
        .last_reviewed_at
        .map(|last| local_date(last, utc_offset) == local_date(reviewed_at, utc_offset))
        .unwrap_or(false);

    let click = kind == ReviewKind::Click;
    let click_count = status.click_count + u32::from(click);

    tracing::info!(
        grade = %grade,
        kind = ?kind,
        reps = outcome.reps,
        lapses = outcome.lapses,
        interval,
        %scheduled_at,
        "review recorded"
    );

    Ok(RecordedReview {
        status: CardStatus {
            memory: outcome.next_state(0.0),
            last_reviewed_at: Some(reviewed_at),
            next_review_at: Some(scheduled_at),
            last_interval: Some(interval),
            last_grade: Some(grade),
            last_result: Some(result),
            click_count,
        },
        log: ReviewLogEntry {
            reviewed_at,
            scheduled_at,
            review_type: kind,
            grade,
            interval_after: interval,
            stability_before,
            stability_after: outcome.stability,
            metadata: ReviewMetadata {
                elapsed_days,
                retrievability: outcome.retrievability,
                same_day,
                last_reviewed_at_before: status.last_reviewed_at,
                click,
            },
        },
    })
}

/// Index of the card to show next, or `None` when nothing is left for today.
///
/// Due reviewed cards come first, most overdue first, until today's review
/// count reaches `limits.review`. Then unseen cards in deck order until
/// today's new count reaches `limits.new`. "Today" is the learner's local
/// date at `utc_offset`; clicks count against neither limit.
pub fn next_card(
    cards: &[CardStatus],
    log: &[ReviewLogEntry],
    now: DateTime<Utc>,
    limits: DailyLimits,
    utc_offset: FixedOffset,
) -> Option<usize> {
    let today = local_date(now, utc_offset);
    let count_today = |kind: ReviewKind| {
        log.iter()
            .filter(|e| e.review_type == kind && local_date(e.reviewed_at, utc_offset) == today)
            .count()
    };

    if count_today(ReviewKind::Review) < limits.review as usize {
        let overdue = cards
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.memory.is_unseen() && c.is_due(now))
            .min_by_key(|(i, c)| (c.next_review_at.is_none(), c.next_review_at, *i));
        if let Some((index, _)) = overdue {
            return Some(index);
        }
    }

    if count_today(ReviewKind::New) < limits.new as usize {
        return cards.iter().position(|c| c.memory.is_unseen());
    }

    None
}
