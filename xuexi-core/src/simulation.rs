use chrono::{DateTime, Duration, NaiveDate, Utc};
use snapshot_store::AppState;
use snapshot_store::data_model::Timestamped;

use crate::{Study, StudyEvent};

const DEFAULT_NEW_WORDS_PER_DAY: usize = 10;
const DEFAULT_MAX_EXERCISES_PER_DAY: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedExercise {
    pub index: usize,
    pub target_word: String,
    /// True if the target word had never been studied before.
    pub introduced_new_word: bool,
    pub chinese: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedDay {
    pub date: NaiveDate,
    pub exercises: Vec<SimulatedExercise>,
}

/// Simulates a learner who studies once a day and never needs a hint.
///
/// Each call to `next` plays out one day: every review the selector asks
/// for, plus up to `new_words_per_day` new words. The iterator never ends;
/// use `.take(n)` to simulate `n` days.
#[derive(Clone, Debug)]
pub struct DailySimulationIterator {
    study: Study,
    current_time: DateTime<Utc>,
    event_index: usize,
    new_words_per_day: usize,
    max_exercises_per_day: usize,
}

impl DailySimulationIterator {
    pub fn new(study: Study, current_time: DateTime<Utc>) -> Self {
        Self {
            study,
            current_time,
            event_index: 0,
            new_words_per_day: DEFAULT_NEW_WORDS_PER_DAY,
            max_exercises_per_day: DEFAULT_MAX_EXERCISES_PER_DAY,
        }
    }

    pub fn new_words_per_day(self, new_words_per_day: usize) -> Self {
        Self {
            new_words_per_day,
            ..self
        }
    }

    pub fn max_exercises_per_day(self, max_exercises_per_day: usize) -> Self {
        Self {
            max_exercises_per_day,
            ..self
        }
    }

    /// The simulated learner's state so far.
    pub fn study(&self) -> &Study {
        &self.study
    }

    pub fn into_study(self) -> Study {
        self.study
    }
}

impl Iterator for DailySimulationIterator {
    type Item = SimulatedDay;

    fn next(&mut self) -> Option<Self::Item> {
        let day_start = self.current_time;
        let mut exercises = Vec::new();
        let mut new_words_today = 0;
        // each exercise takes a minute
        let mut now = day_start;

        while exercises.len() < self.max_exercises_per_day {
            let Some(selection) = self.study.next_exercise(now.timestamp_millis()) else {
                break;
            };
            let Some(target_word) = selection.target_word else {
                break;
            };
            let introduced_new_word = self.study.progress().word(&target_word).is_none();
            if introduced_new_word {
                if new_words_today >= self.new_words_per_day {
                    break;
                }
                new_words_today += 1;
            }

            let event = Timestamped::new(
                now,
                self.event_index,
                StudyEvent::ExerciseCompleted {
                    index: selection.index,
                    hinted_words: vec![],
                },
            );
            self.study = self.study.clone().apply_event(&event);
            self.event_index += 1;

            exercises.push(SimulatedExercise {
                index: selection.index,
                target_word,
                introduced_new_word,
                chinese: selection.exercise.chinese_text(),
            });
            now += Duration::minutes(1);
        }

        log::debug!(
            "Simulated {} exercises ({new_words_today} new words) on {}",
            exercises.len(),
            day_start.date_naive()
        );

        self.current_time = day_start + Duration::days(1);
        Some(SimulatedDay {
            date: day_start.date_naive(),
            exercises,
        })
    }
}

impl Study {
    /// Simulate daily study starting at `start_time`. Deterministic for a
    /// given course and start time.
    pub fn simulate_usage(&self, start_time: DateTime<Utc>) -> DailySimulationIterator {
        DailySimulationIterator::new(self.clone(), start_time)
    }
}
