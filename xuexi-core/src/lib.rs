pub mod interval;
pub mod progress;
pub mod scoring;
pub mod selection;
pub mod simulation;
pub mod stats;

use std::sync::Arc;

use language_utils::{Corpus, CorpusError, CourseData, OrderedWordList};
use snapshot_store::data_model::{Event, Timestamped};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub use interval::IntervalConfig;
pub use progress::{
    CompletionOutcome, DailyMetrics, ExerciseHistory, StudentProgress, WordIntervalChange,
    WordProgress, WordState,
};
pub use scoring::{CandidateScore, ScoredCandidate, scored_candidates};
pub use selection::{ExerciseSelection, select_next_exercise};
pub use simulation::{DailySimulationIterator, SimulatedDay, SimulatedExercise};
pub use stats::{ReviewSummary, UpcomingReviewStats};

/// Milliseconds since the Unix epoch.
pub type TimestampMs = i64;

/// A learner working through one course.
///
/// The course itself is shared and never changes; progress only moves
/// forward by applying [`StudyEvent`]s.
#[derive(Clone, Debug)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub struct Study {
    corpus: Arc<Corpus>,
    ordered_words: Arc<OrderedWordList>,
    config: IntervalConfig,
    progress: StudentProgress,
    /// Changes from the most recent completed exercise, for display.
    last_changes: Vec<WordIntervalChange>,
}

impl Study {
    pub fn new(corpus: Arc<Corpus>, ordered_words: Arc<OrderedWordList>) -> Self {
        Self::restore(
            corpus,
            ordered_words,
            IntervalConfig::default(),
            StudentProgress::default(),
        )
    }

    /// Resume from a previously saved progress snapshot.
    pub fn restore(
        corpus: Arc<Corpus>,
        ordered_words: Arc<OrderedWordList>,
        config: IntervalConfig,
        progress: StudentProgress,
    ) -> Self {
        Self {
            corpus,
            ordered_words,
            config,
            progress,
            last_changes: Vec::new(),
        }
    }

    pub fn from_course_json(json: &str) -> Result<Self, CorpusError> {
        let (corpus, ordered_words) = CourseData::from_json(json)?.into_parts()?;
        Ok(Self::new(Arc::new(corpus), Arc::new(ordered_words)))
    }

    pub fn with_config(self, config: IntervalConfig) -> Self {
        Self { config, ..self }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn ordered_words(&self) -> &OrderedWordList {
        &self.ordered_words
    }

    pub fn config(&self) -> &IntervalConfig {
        &self.config
    }

    pub fn progress(&self) -> &StudentProgress {
        &self.progress
    }

    pub fn last_changes(&self) -> &[WordIntervalChange] {
        &self.last_changes
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl Study {
    pub fn next_exercise(&self, now: TimestampMs) -> Option<ExerciseSelection> {
        select_next_exercise(&self.corpus, &self.progress, &self.ordered_words, now)
    }

    /// The event recording that the learner finished exercise `index`,
    /// needing hints for `hinted_words`. `None` if there is no such exercise.
    pub fn complete_exercise(&self, index: usize, hinted_words: Vec<String>) -> Option<StudyEvent> {
        self.corpus.get(index)?;
        Some(StudyEvent::ExerciseCompleted {
            index,
            hinted_words,
        })
    }

    pub fn review_summary(&self, now: TimestampMs) -> ReviewSummary {
        stats::review_summary(&self.progress, &self.ordered_words, now)
    }

    pub fn upcoming_review_stats(&self, now: TimestampMs, days: u32) -> UpcomingReviewStats {
        stats::upcoming_review_stats(&self.progress, now, days)
    }

    pub fn daily_streak(&self, now: TimestampMs) -> u32 {
        stats::daily_streak(&self.progress, now)
    }

    pub fn next_new_word(&self) -> Option<String> {
        stats::next_new_word(&self.progress, &self.ordered_words).map(str::to_string)
    }
}

impl snapshot_store::PartialAppState for Study {
    type Event = StudyEvent;
    type Partial = Self;

    fn process_event(mut study: Self::Partial, event: &Timestamped<Self::Event>) -> Self::Partial {
        let completed_at = event.timestamp_millis();
        match &event.event {
            StudyEvent::ExerciseCompleted {
                index,
                hinted_words,
            } => {
                let outcome = study.progress.complete_exercise(
                    &study.corpus,
                    *index,
                    hinted_words,
                    completed_at,
                    &study.config,
                );
                match outcome {
                    Some(CompletionOutcome { progress, changes }) => {
                        study.progress = progress;
                        study.last_changes = changes;
                    }
                    None => {
                        log::warn!("Ignoring completion of unknown exercise {index}");
                    }
                }
            }
            StudyEvent::ResetProgress => {
                log::info!("Resetting progress");
                study.progress = StudentProgress::default();
                study.last_changes.clear();
            }
        }
        study
    }

    fn finalize(partial: Self::Partial) -> Self {
        partial
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub enum StudyEvent {
    #[serde(rename_all = "camelCase")]
    ExerciseCompleted {
        index: usize,
        hinted_words: Vec<String>,
    },
    ResetProgress,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "version")]
pub enum VersionedStudyEvent {
    V1(StudyEvent),
}

impl Event for StudyEvent {
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(VersionedStudyEvent::from(self.clone()))
    }

    fn from_json(json: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value::<VersionedStudyEvent>(json.clone()).map(Into::into)
    }
}

impl From<StudyEvent> for VersionedStudyEvent {
    fn from(event: StudyEvent) -> Self {
        VersionedStudyEvent::V1(event)
    }
}

impl From<VersionedStudyEvent> for StudyEvent {
    fn from(event: VersionedStudyEvent) -> Self {
        match event {
            VersionedStudyEvent::V1(event) => event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use snapshot_store::{AppState, MemorySnapshotStore, SnapshotStore};

    const COURSE: &str = r#"{
        "exercises": [
            {
                "segments": [
                    {"chinese": "我", "pinyin": "wǒ"},
                    {"chinese": "学", "pinyin": "xué"},
                    {"chinese": "中文", "pinyin": "zhōngwén"},
                    {"chinese": "。", "pinyin": ""}
                ],
                "english": "I study Chinese."
            },
            {
                "segments": [
                    {"chinese": "你", "pinyin": "nǐ"},
                    {"chinese": "好", "pinyin": "hǎo"}
                ],
                "english": "Hello."
            }
        ],
        "orderedWords": ["你", "好", "我", "学", "中文"]
    }"#;

    fn study() -> Study {
        Study::from_course_json(COURSE).unwrap()
    }

    fn at(index: usize, event: StudyEvent) -> Timestamped<StudyEvent> {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        Timestamped::new(
            timestamp + chrono::Duration::minutes(index as i64),
            index,
            event,
        )
    }

    #[test]
    fn test_completing_an_exercise() {
        let study = study();
        let selection = study.next_exercise(0).unwrap();
        assert_eq!(selection.index, 1);
        assert_eq!(selection.target_word.as_deref(), Some("你"));

        let event = study
            .complete_exercise(selection.index, vec!["好".to_string()])
            .unwrap();
        let study = study.apply_event(&at(0, event));

        let progress = study.progress();
        assert_eq!(progress.history.len(), 1);
        assert!(!progress.history[0].success);
        assert_eq!(progress.word("你").unwrap().interval_seconds, 604_800);
        assert_eq!(progress.word("好").unwrap().interval_seconds, 30);
        assert_eq!(study.last_changes().len(), 2);
        assert_eq!(study.next_new_word().as_deref(), Some("我"));
    }

    #[test]
    fn test_unknown_exercise_is_ignored() {
        let study = study();
        assert_eq!(study.complete_exercise(9, vec![]), None);

        let event = StudyEvent::ExerciseCompleted {
            index: 9,
            hinted_words: vec![],
        };
        let after = study.clone().apply_event(&at(0, event));
        assert_eq!(after.progress(), study.progress());
    }

    #[test]
    fn test_reset_progress() {
        let events = vec![
            at(
                0,
                StudyEvent::ExerciseCompleted {
                    index: 0,
                    hinted_words: vec![],
                },
            ),
            at(1, StudyEvent::ResetProgress),
        ];
        let study = study().apply_events(&events);
        assert_eq!(*study.progress(), StudentProgress::default());
        assert!(study.last_changes().is_empty());
    }

    #[test]
    fn test_replaying_events_matches_applying_them_one_by_one() {
        let events: Vec<_> = [1, 0, 1]
            .into_iter()
            .enumerate()
            .map(|(i, index)| {
                at(
                    i,
                    StudyEvent::ExerciseCompleted {
                        index,
                        hinted_words: vec![],
                    },
                )
            })
            .collect();

        let replayed = study().apply_events(&events);
        let stepped = events
            .iter()
            .fold(study(), |study, event| study.apply_event(event));
        assert_eq!(replayed.progress(), stepped.progress());
        assert_eq!(replayed.progress().history.len(), 3);
    }

    #[test]
    fn test_event_json_is_versioned() {
        let event = StudyEvent::ExerciseCompleted {
            index: 3,
            hinted_words: vec!["学".to_string()],
        };
        let json = event.to_json().unwrap();
        assert_eq!(json["version"], "V1");
        assert_eq!(json["exerciseCompleted"]["hintedWords"][0], "学");
        assert_eq!(StudyEvent::from_json(&json).unwrap(), event);

        let reset = StudyEvent::ResetProgress.to_json().unwrap();
        assert_eq!(StudyEvent::from_json(&reset).unwrap(), StudyEvent::ResetProgress);
    }

    #[test]
    fn test_progress_survives_a_snapshot() {
        let event = StudyEvent::ExerciseCompleted {
            index: 0,
            hinted_words: vec![],
        };
        let study = study().apply_event(&at(0, event));

        let mut store = MemorySnapshotStore::new();
        store.save(study.progress()).unwrap();
        let saved: StudentProgress = store.load().unwrap().unwrap();

        let restored = Study::restore(
            Arc::new(study.corpus().clone()),
            Arc::new(study.ordered_words().clone()),
            *study.config(),
            saved,
        );
        let now = at(5, StudyEvent::ResetProgress).timestamp_millis();
        assert_eq!(restored.progress(), study.progress());
        assert_eq!(restored.next_exercise(now), study.next_exercise(now));
    }

    #[test]
    fn test_custom_config_is_used() {
        let config = IntervalConfig {
            first_time_success_interval_seconds: 60,
            ..Default::default()
        };
        let event = StudyEvent::ExerciseCompleted {
            index: 1,
            hinted_words: vec![],
        };
        let study = study().with_config(config).apply_event(&at(0, event));
        assert_eq!(study.progress().word("你").unwrap().interval_seconds, 60);
    }
}
