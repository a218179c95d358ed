use indexmap::IndexSet;
use rustc_hash::FxHashMap;

use crate::Exercise;

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("exercise {index} has no segments")]
    EmptyExercise { index: usize },

    #[error("`{word}` appears twice in the ordered word list (positions {first} and {second})")]
    DuplicateOrderedWord {
        word: String,
        first: usize,
        second: usize,
    },

    #[error("invalid course data: {0}")]
    Json(#[from] serde_json::Error),
}

/// The curriculum order in which new words should be introduced.
#[derive(Clone, Debug, Default)]
pub struct OrderedWordList {
    words: IndexSet<String>,
}

impl OrderedWordList {
    pub fn new<I, S>(words: I) -> Result<Self, CorpusError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = IndexSet::new();
        for (position, word) in words.into_iter().enumerate() {
            let word = word.into();
            if let Some(first) = set.get_index_of(&word) {
                return Err(CorpusError::DuplicateOrderedWord {
                    word,
                    first,
                    second: position,
                });
            }
            set.insert(word);
        }
        Ok(Self { words: set })
    }

    pub fn position(&self, word: &str) -> Option<usize> {
        self.words.get_index_of(word)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Read-only collection of exercises, indexed by the words they contain.
#[derive(Clone, Debug, Default)]
pub struct Corpus {
    exercises: Vec<Exercise>,
    /// Exercise indices in ascending order, one entry per distinct word.
    exercises_containing_word: FxHashMap<String, Vec<usize>>,
}

impl Corpus {
    pub fn new(exercises: Vec<Exercise>) -> Result<Self, CorpusError> {
        let mut exercises_containing_word: FxHashMap<String, Vec<usize>> = FxHashMap::default();

        for (index, exercise) in exercises.iter().enumerate() {
            if exercise.segments.is_empty() {
                return Err(CorpusError::EmptyExercise { index });
            }
            for word in exercise.unique_words() {
                exercises_containing_word
                    .entry(word.to_string())
                    .or_default()
                    .push(index);
            }
        }

        Ok(Self {
            exercises,
            exercises_containing_word,
        })
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn get(&self, index: usize) -> Option<&Exercise> {
        self.exercises.get(index)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Exercise)> {
        self.exercises.iter().enumerate()
    }

    /// Indices of every exercise containing `word`, in corpus order.
    pub fn exercises_containing(&self, word: &str) -> &[usize] {
        self.exercises_containing_word
            .get(word)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct words across the whole corpus.
    pub fn vocabulary_size(&self) -> usize {
        self.exercises_containing_word.len()
    }
}

/// The on-disk shape of a course: already-parsed exercises plus the
/// curriculum order.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseData {
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub ordered_words: Vec<String>,
}

impl CourseData {
    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_parts(self) -> Result<(Corpus, OrderedWordList), CorpusError> {
        let corpus = Corpus::new(self.exercises)?;
        let ordered_words = OrderedWordList::new(self.ordered_words)?;
        Ok((corpus, ordered_words))
    }
}
