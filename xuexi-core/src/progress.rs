use chrono::{DateTime, Utc};
use language_utils::Corpus;

use crate::TimestampMs;
use crate::interval::{self, IntervalConfig};

const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// Memory state of one word the learner has met.
///
/// Only ever built by [`interval::record_success`] / [`interval::record_failure`],
/// which keep `next_review == last_reviewed + interval_seconds * 1000`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct WordProgress {
    pub word: String,
    pub last_reviewed: TimestampMs,
    pub next_review: TimestampMs,
    pub interval_seconds: u64,
    pub consecutive_successes: u32,
}

impl WordProgress {
    pub fn is_due(&self, now: TimestampMs) -> bool {
        self.next_review <= now
    }
}

/// How one completed exercise moved one word's schedule. For display only.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct WordIntervalChange {
    pub word: String,
    pub pinyin: String,
    pub old_interval_seconds: Option<u64>,
    pub new_interval_seconds: u64,
    pub next_review: TimestampMs,
    pub was_early_review: bool,
    pub was_failure: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct ExerciseHistory {
    pub index: usize,
    pub completed_at: TimestampMs,
    /// True iff no word in the exercise needed a hint.
    pub success: bool,
    pub chinese: String,
    pub pinyin: String,
    pub english: String,
    pub changes: Vec<WordIntervalChange>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMetrics {
    /// Words that are not due at the time of the snapshot.
    pub known_words: usize,
    /// Sum of all review intervals, in days.
    pub memory_strength: f64,
}

impl DailyMetrics {
    pub fn measure(words: &im::HashMap<String, WordProgress>, at: TimestampMs) -> Self {
        let known_words = words.values().filter(|word| !word.is_due(at)).count();
        // summed as integers so the result doesn't depend on map iteration order
        let total_interval_seconds: u64 = words
            .values()
            .map(|word| word.interval_seconds)
            .fold(0, u64::saturating_add);
        Self {
            known_words,
            memory_strength: total_interval_seconds as f64 / SECONDS_PER_DAY,
        }
    }
}

/// Classification of a word relative to some `now`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WordState {
    /// Has progress and is not due yet.
    Known,
    /// Has progress and is due.
    Review,
    /// Never recalled.
    Unknown,
}

/// Everything the app remembers about a learner.
///
/// This is a value: every transition returns a new `StudentProgress` that
/// shares structure with the old one, and the old one stays valid.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgress {
    pub words: im::HashMap<String, WordProgress>,
    pub history: im::Vector<ExerciseHistory>,
    pub exercise_last_seen: im::HashMap<usize, TimestampMs>,
    /// Keyed by UTC date, `YYYY-MM-DD`.
    pub daily_metrics_history: im::OrdMap<String, DailyMetrics>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionOutcome {
    pub progress: StudentProgress,
    pub changes: Vec<WordIntervalChange>,
}

impl StudentProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn word(&self, word: &str) -> Option<&WordProgress> {
        self.words.get(word)
    }

    pub fn word_state(&self, word: &str, now: TimestampMs) -> WordState {
        match self.words.get(word) {
            None => WordState::Unknown,
            Some(progress) if progress.is_due(now) => WordState::Review,
            Some(_) => WordState::Known,
        }
    }

    pub fn is_known(&self, word: &str, now: TimestampMs) -> bool {
        self.word_state(word, now) == WordState::Known
    }

    /// When the exercise at `index` was last completed, if ever.
    pub fn last_seen(&self, index: usize) -> Option<TimestampMs> {
        self.exercise_last_seen.get(&index).copied()
    }

    /// Grade a finished exercise.
    ///
    /// Every distinct word in the exercise is rescheduled: words listed in
    /// `hinted_words` as failures, the rest as successes. Returns `None` if
    /// `index` is not in the corpus.
    pub fn complete_exercise(
        &self,
        corpus: &Corpus,
        index: usize,
        hinted_words: &[String],
        completed_at: TimestampMs,
        config: &IntervalConfig,
    ) -> Option<CompletionOutcome> {
        let exercise = corpus.get(index)?;
        let mut progress = self.clone();
        let mut changes = Vec::new();

        for word in exercise.unique_words() {
            let pinyin = exercise.pinyin_for(word).unwrap_or_default();
            let previous = self.words.get(word);
            let update = if hinted_words.iter().any(|hinted| hinted == word) {
                interval::record_failure(word, pinyin, previous, completed_at, config)
            } else {
                interval::record_success(word, pinyin, previous, completed_at, config)
            };
            progress.words.insert(word.to_string(), update.progress);
            changes.push(update.change);
        }

        progress.history.push_back(ExerciseHistory {
            index,
            completed_at,
            success: changes.iter().all(|change| !change.was_failure),
            chinese: exercise.chinese_text(),
            pinyin: exercise.pinyin_text(),
            english: exercise.english.clone(),
            changes: changes.clone(),
        });
        progress.exercise_last_seen.insert(index, completed_at);
        progress.record_daily_metrics(completed_at);

        Some(CompletionOutcome { progress, changes })
    }

    fn record_daily_metrics(&mut self, at: TimestampMs) {
        let Some(key) = date_key(at) else {
            log::warn!("Timestamp {at} is out of range, skipping daily metrics");
            return;
        };
        self.daily_metrics_history
            .insert(key, DailyMetrics::measure(&self.words, at));
    }
}

/// UTC calendar date of `at`, formatted `YYYY-MM-DD`.
pub fn date_key(at: TimestampMs) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(at).map(|date| date.format("%Y-%m-%d").to_string())
}
