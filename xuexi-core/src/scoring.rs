//! Ranking of the exercises that could be used to practice a word.

use language_utils::{Corpus, Exercise, OrderedWordList};

use crate::TimestampMs;
use crate::progress::{StudentProgress, WordState};

/// How hard an exercise would be to read right now. Lower is better.
///
/// Fields are compared in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateScore {
    /// Unfamiliar words that the curriculum never introduces.
    pub words_not_in_ordered_list: usize,
    pub unknown_or_review_word_count: usize,
    pub has_been_seen: bool,
    /// Curriculum position of the latest-introduced unfamiliar word.
    /// `None` (no unfamiliar word from the curriculum) ranks first.
    pub largest_ordered_word_index: Option<usize>,
    pub chinese_character_count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub index: usize,
    pub score: CandidateScore,
    /// 0 if the exercise was never completed.
    pub last_seen: TimestampMs,
}

impl ScoredCandidate {
    fn sort_key(&self) -> (CandidateScore, TimestampMs, usize) {
        (self.score, self.last_seen, self.index)
    }
}

impl PartialOrd for ScoredCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredCandidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

pub fn score_exercise(
    exercise: &Exercise,
    index: usize,
    progress: &StudentProgress,
    ordered_words: &OrderedWordList,
    now: TimestampMs,
) -> CandidateScore {
    let mut words_not_in_ordered_list = 0;
    let mut unknown_or_review_word_count = 0;
    let mut largest_ordered_word_index = None;

    for word in exercise.unique_words() {
        if progress.word_state(word, now) == WordState::Known {
            continue;
        }
        unknown_or_review_word_count += 1;
        match ordered_words.position(word) {
            Some(position) => {
                largest_ordered_word_index = largest_ordered_word_index.max(Some(position));
            }
            None => words_not_in_ordered_list += 1,
        }
    }

    CandidateScore {
        words_not_in_ordered_list,
        unknown_or_review_word_count,
        has_been_seen: progress.last_seen(index).is_some(),
        largest_ordered_word_index,
        chinese_character_count: exercise.han_character_count(),
    }
}

/// Every exercise containing `target_word`, best first. Empty if the word
/// appears nowhere in the corpus.
pub fn scored_candidates(
    target_word: &str,
    corpus: &Corpus,
    progress: &StudentProgress,
    ordered_words: &OrderedWordList,
    now: TimestampMs,
) -> Vec<ScoredCandidate> {
    let mut candidates: Vec<ScoredCandidate> = corpus
        .exercises_containing(target_word)
        .iter()
        .filter_map(|&index| {
            let exercise = corpus.get(index)?;
            Some(ScoredCandidate {
                index,
                score: score_exercise(exercise, index, progress, ordered_words, now),
                last_seen: progress.last_seen(index).unwrap_or(0),
            })
        })
        .collect();
    candidates.sort();
    candidates
}
