use language_utils::{Corpus, Exercise, OrderedWordList};

use crate::TimestampMs;
use crate::progress::{StudentProgress, WordState};
use crate::scoring::scored_candidates;

/// The exercise to show next.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSelection {
    pub exercise: Exercise,
    pub index: usize,
    /// The word that drove the choice. `None` only when nothing in the
    /// corpus is left to learn or review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_word: Option<String>,
}

impl ExerciseSelection {
    fn new(corpus: &Corpus, index: usize, target_word: Option<&str>) -> Option<Self> {
        Some(Self {
            exercise: corpus.get(index)?.clone(),
            index,
            target_word: target_word.map(str::to_string),
        })
    }
}

/// Words due at `now`, most overdue first. When the curriculum is non-empty,
/// words outside it are never reviewed.
pub fn overdue_words<'a>(
    progress: &'a StudentProgress,
    ordered_words: &OrderedWordList,
    now: TimestampMs,
) -> Vec<&'a str> {
    let mut overdue: Vec<_> = progress
        .words
        .values()
        .filter(|word| word.is_due(now))
        .filter(|word| ordered_words.is_empty() || ordered_words.contains(&word.word))
        .map(|word| (word.next_review, word.word.as_str()))
        .collect();
    // word as a secondary key keeps the order independent of map iteration
    overdue.sort_unstable();
    overdue.into_iter().map(|(_, word)| word).collect()
}

/// An exercise is unlocked for `target_word` when every other word in it is
/// known, so reviewing it won't ask for anything unfamiliar.
pub fn is_unlocked(
    exercise: &Exercise,
    target_word: &str,
    progress: &StudentProgress,
    now: TimestampMs,
) -> bool {
    exercise
        .words()
        .filter(|word| *word != target_word)
        .all(|word| progress.word_state(word, now) == WordState::Known)
}

/// Pick the single best exercise to show at `now`. `None` only for an empty corpus.
pub fn select_next_exercise(
    corpus: &Corpus,
    progress: &StudentProgress,
    ordered_words: &OrderedWordList,
    now: TimestampMs,
) -> Option<ExerciseSelection> {
    if corpus.is_empty() {
        return None;
    }

    review_exercise(corpus, progress, ordered_words, now)
        .or_else(|| new_word_exercise(corpus, progress, ordered_words, now))
        .or_else(|| corpus_scan_exercise(corpus, progress, ordered_words, now))
        .or_else(|| {
            log::debug!("Nothing left to learn or review, falling back to the first exercise");
            ExerciseSelection::new(corpus, 0, None)
        })
}

fn review_exercise(
    corpus: &Corpus,
    progress: &StudentProgress,
    ordered_words: &OrderedWordList,
    now: TimestampMs,
) -> Option<ExerciseSelection> {
    for word in overdue_words(progress, ordered_words, now) {
        let unlocked = scored_candidates(word, corpus, progress, ordered_words, now)
            .into_iter()
            .find(|candidate| {
                corpus
                    .get(candidate.index)
                    .is_some_and(|exercise| is_unlocked(exercise, word, progress, now))
            });
        match unlocked {
            Some(candidate) => {
                log::debug!("Reviewing {word} with exercise {}", candidate.index);
                return ExerciseSelection::new(corpus, candidate.index, Some(word));
            }
            None => log::debug!("No unlocked exercise for overdue word {word}"),
        }
    }
    None
}

fn new_word_exercise(
    corpus: &Corpus,
    progress: &StudentProgress,
    ordered_words: &OrderedWordList,
    now: TimestampMs,
) -> Option<ExerciseSelection> {
    ordered_words
        .iter()
        .filter(|word| progress.word(word).is_none())
        .find_map(|word| {
            let best = scored_candidates(word, corpus, progress, ordered_words, now)
                .into_iter()
                .next()?;
            log::debug!("Introducing {word} with exercise {}", best.index);
            ExerciseSelection::new(corpus, best.index, Some(word))
        })
}

fn corpus_scan_exercise(
    corpus: &Corpus,
    progress: &StudentProgress,
    ordered_words: &OrderedWordList,
    now: TimestampMs,
) -> Option<ExerciseSelection> {
    let word = corpus
        .exercises()
        .iter()
        .find_map(|exercise| exercise.words().find(|word| progress.word(word).is_none()))?;
    let best = scored_candidates(word, corpus, progress, ordered_words, now)
        .into_iter()
        .next()?;
    log::debug!(
        "Curriculum exhausted, introducing {word} with exercise {}",
        best.index
    );
    ExerciseSelection::new(corpus, best.index, Some(word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{self, IntervalConfig};
    use language_utils::Segment;

    const NOW: TimestampMs = 1_704_067_200_000;
    const DAY_MS: TimestampMs = 24 * 60 * 60 * 1000;

    fn exercise(words: &[&str]) -> Exercise {
        let mut segments: Vec<Segment> = words
            .iter()
            .map(|word| Segment::word(*word, "pīnyīn"))
            .collect();
        segments.push(Segment::punctuation("。"));
        Exercise::new(segments, "")
    }

    fn corpus(exercises: &[&[&str]]) -> Corpus {
        Corpus::new(exercises.iter().map(|words| exercise(words)).collect()).unwrap()
    }

    /// Progress where each word was first learned at `learned_at`, so it
    /// comes due a week later.
    fn learned(words: &[(&str, TimestampMs)]) -> StudentProgress {
        let config = IntervalConfig::default();
        let mut progress = StudentProgress::new();
        for (word, learned_at) in words {
            let update = interval::record_success(word, "", None, *learned_at, &config);
            progress.words.insert(word.to_string(), update.progress);
        }
        progress
    }

    fn target(selection: &Option<ExerciseSelection>) -> Option<&str> {
        selection.as_ref()?.target_word.as_deref()
    }

    #[test]
    fn test_empty_corpus_selects_nothing() {
        let corpus = Corpus::new(vec![]).unwrap();
        let selection = select_next_exercise(
            &corpus,
            &StudentProgress::new(),
            &OrderedWordList::default(),
            NOW,
        );
        assert_eq!(selection, None);
    }

    #[test]
    fn test_skips_overdue_word_without_unlocked_exercise() {
        let corpus = corpus(&[&["你", "好"], &["我", "学"]]);
        let ordered = OrderedWordList::new(["我", "你", "好", "学"]).unwrap();
        let week_ago = NOW - 7 * DAY_MS;
        let progress = learned(&[
            ("你", week_ago - 3000),
            ("好", week_ago - 2000),
            ("学", week_ago - 1000),
            ("我", NOW),
        ]);

        let selection = select_next_exercise(&corpus, &progress, &ordered, NOW);
        assert_eq!(target(&selection), Some("学"));
        assert_eq!(selection.unwrap().index, 1);
    }

    #[test]
    fn test_most_overdue_word_comes_first() {
        let corpus = corpus(&[&["我", "学"], &["我", "爱"]]);
        let ordered = OrderedWordList::new(["我", "学", "爱"]).unwrap();
        let week_ago = NOW - 7 * DAY_MS;
        let progress = learned(&[("学", week_ago - 10), ("爱", week_ago - 20), ("我", NOW)]);

        let selection = select_next_exercise(&corpus, &progress, &ordered, NOW);
        assert_eq!(target(&selection), Some("爱"));
    }

    #[test]
    fn test_review_ignores_words_outside_curriculum() {
        let corpus = corpus(&[&["我", "法语"], &["我", "学"]]);
        let ordered = OrderedWordList::new(["我", "学"]).unwrap();
        let progress = learned(&[("法语", NOW - 30 * DAY_MS), ("我", NOW)]);

        let selection = select_next_exercise(&corpus, &progress, &ordered, NOW);
        assert_eq!(target(&selection), Some("学"));
    }

    #[test]
    fn test_without_curriculum_every_overdue_word_is_reviewed() {
        let corpus = corpus(&[&["我", "法语"], &["我", "学"]]);
        let progress = learned(&[("法语", NOW - 30 * DAY_MS), ("我", NOW)]);

        let ordered = OrderedWordList::default();
        let selection = select_next_exercise(&corpus, &progress, &ordered, NOW);
        assert_eq!(target(&selection), Some("法语"));
        assert_eq!(selection.unwrap().index, 0);
    }

    #[test]
    fn test_introduces_next_curriculum_word() {
        let corpus = corpus(&[&["你", "好"], &["我"], &["我", "你"]]);
        let ordered = OrderedWordList::new(["我", "你", "好"]).unwrap();
        let progress = learned(&[("我", NOW)]);

        let selection = select_next_exercise(&corpus, &progress, &ordered, NOW);
        assert_eq!(target(&selection), Some("你"));
        // 我 is known, so exercise 2 only has one unfamiliar word
        assert_eq!(selection.unwrap().index, 2);
    }

    #[test]
    fn test_curriculum_word_without_exercises_is_skipped() {
        let corpus = corpus(&[&["我", "你"]]);
        let ordered = OrderedWordList::new(["猫", "你"]).unwrap();

        let selection = select_next_exercise(&corpus, &StudentProgress::new(), &ordered, NOW);
        assert_eq!(target(&selection), Some("你"));
    }

    #[test]
    fn test_locked_review_falls_back_to_new_word() {
        let corpus = corpus(&[&["你", "好"], &["我"]]);
        let ordered = OrderedWordList::new(["你", "好", "我"]).unwrap();
        let progress = learned(&[("你", NOW - 8 * DAY_MS), ("好", NOW - 8 * DAY_MS)]);

        let selection = select_next_exercise(&corpus, &progress, &ordered, NOW);
        assert_eq!(target(&selection), Some("我"));
    }

    #[test]
    fn test_corpus_scan_when_curriculum_is_exhausted() {
        let corpus = corpus(&[
            &["我"],
            &["我", "学", "中文"],
            &["中文", "我"],
            &["我", "学"],
        ]);
        let ordered = OrderedWordList::new(["我"]).unwrap();
        let progress = learned(&[("我", NOW)]);

        let selection = select_next_exercise(&corpus, &progress, &ordered, NOW);
        // 学 is found first in exercise 1, but exercise 3 has fewer unknown words
        assert_eq!(target(&selection), Some("学"));
        assert_eq!(selection.unwrap().index, 3);
    }

    #[test]
    fn test_everything_known_falls_back_to_first_exercise() {
        let corpus = corpus(&[&["我", "学"], &["学"]]);
        let progress = learned(&[("我", NOW), ("学", NOW)]);

        let selection = select_next_exercise(
            &corpus,
            &progress,
            &OrderedWordList::new(["我", "学"]).unwrap(),
            NOW,
        )
        .unwrap();
        assert_eq!(selection.index, 0);
        assert_eq!(selection.target_word, None);
        assert_eq!(selection.exercise, *corpus.get(0).unwrap());
    }

    #[test]
    fn test_punctuation_only_corpus_falls_back_to_first_exercise() {
        let exercise = Exercise::new(vec![Segment::punctuation("！")], "!");
        let corpus = Corpus::new(vec![exercise]).unwrap();
        let progress = StudentProgress::new();
        let ordered = OrderedWordList::default();
        let selection = select_next_exercise(&corpus, &progress, &ordered, NOW);
        assert_eq!(selection.as_ref().map(|selection| selection.index), Some(0));
        assert_eq!(target(&selection), None);
    }

    #[test]
    fn test_unlocked_requires_other_words_known() {
        let exercise = exercise(&["我", "学", "我"]);
        let progress = learned(&[("我", NOW)]);
        assert!(is_unlocked(&exercise, "学", &progress, NOW));
        assert!(!is_unlocked(&exercise, "我", &progress, NOW));
        // once 我 is due it locks the sentence again
        assert!(!is_unlocked(&exercise, "学", &progress, NOW + 7 * DAY_MS));
    }

    #[test]
    fn test_selection_json_shape() {
        let corpus = corpus(&[&["我"]]);
        let progress = StudentProgress::new();
        let ordered = OrderedWordList::default();
        let selection = select_next_exercise(&corpus, &progress, &ordered, NOW);
        assert!(selection.is_some());
        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json["index"], 0);
        assert_eq!(json["targetWord"], "我");
        assert_eq!(json["exercise"]["segments"][0]["chinese"], "我");
    }
}
