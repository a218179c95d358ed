use chrono::{DateTime, Days, NaiveDate, Utc};
use language_utils::OrderedWordList;
use rustc_hash::FxHashMap;

use crate::TimestampMs;
use crate::progress::StudentProgress;
use crate::selection::overdue_words;

const DAY_MS: TimestampMs = 24 * 60 * 60 * 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    /// Words the selector would try to review right now.
    pub due_count: usize,
    pub known_count: usize,
    pub tracked_count: usize,
}

pub fn review_summary(
    progress: &StudentProgress,
    ordered_words: &OrderedWordList,
    now: TimestampMs,
) -> ReviewSummary {
    ReviewSummary {
        due_count: overdue_words(progress, ordered_words, now).len(),
        known_count: progress.words.values().filter(|w| !w.is_due(now)).count(),
        tracked_count: progress.words.len(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct UpcomingReviewStats {
    pub total_reviews: u32,
    pub max_per_day: u32,
}

/// Reviews coming due in `(now, now + days]`, and the busiest 24 hour
/// window among them (counted from `now`, not from midnight).
pub fn upcoming_review_stats(
    progress: &StudentProgress,
    now: TimestampMs,
    days: u32,
) -> UpcomingReviewStats {
    let horizon = now.saturating_add(i64::from(days) * DAY_MS);

    let mut daily_counts: FxHashMap<i64, u32> = FxHashMap::default();
    let mut total_reviews = 0u32;

    for word in progress.words.values() {
        if word.next_review > now && word.next_review <= horizon {
            total_reviews += 1;
            let days_from_now = (word.next_review - now - 1) / DAY_MS;
            *daily_counts.entry(days_from_now).or_insert(0) += 1;
        }
    }

    let max_per_day = daily_counts.values().max().copied().unwrap_or(0);

    UpcomingReviewStats {
        total_reviews,
        max_per_day,
    }
}

/// Consecutive UTC days with recorded study, ending today. A streak that
/// ended yesterday still counts, since today isn't over yet.
pub fn daily_streak(progress: &StudentProgress, now: TimestampMs) -> u32 {
    let Some(today) = DateTime::<Utc>::from_timestamp_millis(now).map(|now| now.date_naive())
    else {
        return 0;
    };
    let studied = |day: NaiveDate| {
        progress
            .daily_metrics_history
            .contains_key(&day.format("%Y-%m-%d").to_string())
    };

    let mut day = if studied(today) {
        today
    } else {
        match today.checked_sub_days(Days::new(1)) {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut streak = 0;
    while studied(day) {
        streak += 1;
        match day.checked_sub_days(Days::new(1)) {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

/// The next curriculum word that has never been studied.
pub fn next_new_word<'a>(
    progress: &StudentProgress,
    ordered_words: &'a OrderedWordList,
) -> Option<&'a str> {
    ordered_words
        .iter()
        .find(|word| progress.word(word).is_none())
}
