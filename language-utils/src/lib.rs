pub mod corpus;
pub mod han;

pub use corpus::{Corpus, CorpusError, CourseData, OrderedWordList};

/// One piece of a sentence. A segment with an empty `pinyin` is punctuation
/// (or anything else the learner is not asked to type).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, Hash, Eq, PartialEq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub chinese: String,
    pub pinyin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
}

impl Segment {
    pub fn word(chinese: impl Into<String>, pinyin: impl Into<String>) -> Self {
        Self {
            chinese: chinese.into(),
            pinyin: pinyin.into(),
            transliteration: None,
        }
    }

    pub fn punctuation(chinese: impl Into<String>) -> Self {
        Self {
            chinese: chinese.into(),
            pinyin: String::new(),
            transliteration: None,
        }
    }

    pub fn is_word(&self) -> bool {
        !self.pinyin.is_empty()
    }
}

/// A practice sentence. Exercises are identified by their position in the corpus.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, Hash, Eq, PartialEq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub segments: Vec<Segment>,
    pub english: String,
}

impl Exercise {
    pub fn new(segments: Vec<Segment>, english: impl Into<String>) -> Self {
        Self {
            segments,
            english: english.into(),
        }
    }

    pub fn word_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|segment| segment.is_word())
    }

    /// Words in segment order, repeats included.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.word_segments().map(|segment| segment.chinese.as_str())
    }

    /// Distinct words, in order of first appearance.
    pub fn unique_words(&self) -> Vec<&str> {
        let mut seen = rustc_hash::FxHashSet::default();
        self.words().filter(|word| seen.insert(*word)).collect()
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.words().any(|w| w == word)
    }

    /// Pinyin of the first segment spelling `word`.
    pub fn pinyin_for(&self, word: &str) -> Option<&str> {
        self.word_segments()
            .find(|segment| segment.chinese == word)
            .map(|segment| segment.pinyin.as_str())
    }

    pub fn chinese_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.chinese.as_str())
            .collect()
    }

    pub fn pinyin_text(&self) -> String {
        self.word_segments()
            .map(|segment| segment.pinyin.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn han_character_count(&self) -> usize {
        self.segments
            .iter()
            .map(|segment| han::han_character_count(&segment.chinese))
            .sum()
    }
}
