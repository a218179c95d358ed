//! Review interval arithmetic.
//!
//! Every function here is pure: it takes a word's current state (if any) and
//! the time the learner finished the exercise, and returns the next state plus
//! a change record describing the transition.
//!
//! - A word seen for the first time and recalled gets a fixed interval.
//! - A word recalled on time (or late) gets `elapsed * good_review_multiplier`.
//! - A word recalled before it was due gets `elapsed * early_review_multiplier`,
//!   but never less than the interval it already had.
//! - A word the learner needed a hint for drops back to the minimum interval.

use crate::TimestampMs;
use crate::progress::{WordIntervalChange, WordProgress};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntervalConfig {
    pub min_interval_seconds: u64,
    pub max_interval_seconds: u64,
    pub early_review_multiplier: f64,
    pub good_review_multiplier: f64,
    pub first_time_success_interval_seconds: u64,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            min_interval_seconds: 30,
            max_interval_seconds: 365 * 24 * 60 * 60,
            early_review_multiplier: 1.05,
            good_review_multiplier: 5.0,
            first_time_success_interval_seconds: 7 * 24 * 60 * 60,
        }
    }
}

impl IntervalConfig {
    /// Round to whole seconds and clamp into `[min_interval_seconds, max_interval_seconds]`.
    pub fn clamp_interval(&self, seconds: f64) -> u64 {
        // f64::max/min rather than clamp: a NaN input lands on the minimum and
        // a misconfigured min > max can't panic.
        let clamped = seconds
            .round()
            .max(self.min_interval_seconds as f64)
            .min(self.max_interval_seconds as f64);
        clamped as u64
    }
}

/// When a word reviewed at `reviewed_at` with `interval_seconds` spacing comes due.
pub fn due_at(reviewed_at: TimestampMs, interval_seconds: u64) -> TimestampMs {
    let interval_ms = i64::try_from(interval_seconds)
        .unwrap_or(i64::MAX)
        .saturating_mul(1000);
    reviewed_at.saturating_add(interval_ms)
}

#[derive(Clone, Debug, PartialEq)]
pub struct IntervalUpdate {
    pub progress: WordProgress,
    pub change: WordIntervalChange,
}

struct Transition<'a> {
    word: &'a str,
    pinyin: &'a str,
    old_interval_seconds: Option<u64>,
    new_interval_seconds: u64,
    consecutive_successes: u32,
    was_early_review: bool,
    was_failure: bool,
}

impl Transition<'_> {
    fn at(self, completed_at: TimestampMs) -> IntervalUpdate {
        let next_review = due_at(completed_at, self.new_interval_seconds);
        IntervalUpdate {
            progress: WordProgress {
                word: self.word.to_string(),
                last_reviewed: completed_at,
                next_review,
                interval_seconds: self.new_interval_seconds,
                consecutive_successes: self.consecutive_successes,
            },
            change: WordIntervalChange {
                word: self.word.to_string(),
                pinyin: self.pinyin.to_string(),
                old_interval_seconds: self.old_interval_seconds,
                new_interval_seconds: self.new_interval_seconds,
                next_review,
                was_early_review: self.was_early_review,
                was_failure: self.was_failure,
            },
        }
    }
}

/// The learner produced `word` without a hint.
pub fn record_success(
    word: &str,
    pinyin: &str,
    previous: Option<&WordProgress>,
    completed_at: TimestampMs,
    config: &IntervalConfig,
) -> IntervalUpdate {
    let Some(previous) = previous else {
        return Transition {
            word,
            pinyin,
            old_interval_seconds: None,
            new_interval_seconds: config.first_time_success_interval_seconds,
            consecutive_successes: 1,
            was_early_review: false,
            was_failure: false,
        }
        .at(completed_at);
    };

    let elapsed_seconds = completed_at.saturating_sub(previous.last_reviewed) as f64 / 1000.0;
    let was_early_review = completed_at < due_at(previous.last_reviewed, previous.interval_seconds);

    let new_interval_seconds = if was_early_review {
        let candidate = config.clamp_interval(elapsed_seconds * config.early_review_multiplier);
        candidate.max(previous.interval_seconds)
    } else {
        config.clamp_interval(elapsed_seconds * config.good_review_multiplier)
    };

    Transition {
        word,
        pinyin,
        old_interval_seconds: Some(previous.interval_seconds),
        new_interval_seconds,
        consecutive_successes: previous.consecutive_successes.saturating_add(1),
        was_early_review,
        was_failure: false,
    }
    .at(completed_at)
}

/// The learner needed a hint for `word`. The change record never carries the
/// old interval, even when there was one.
pub fn record_failure(
    word: &str,
    pinyin: &str,
    _previous: Option<&WordProgress>,
    completed_at: TimestampMs,
    config: &IntervalConfig,
) -> IntervalUpdate {
    Transition {
        word,
        pinyin,
        old_interval_seconds: None,
        new_interval_seconds: config.min_interval_seconds,
        consecutive_successes: 0,
        was_early_review: false,
        was_failure: true,
    }
    .at(completed_at)
}
