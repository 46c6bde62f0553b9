//! Turns free-form analysis output into folder and filename labels.
//!
//! Category labels become `Title_Case` folder names, suggested names and
//! descriptions become `lower_snake` filename stems. Everything is
//! transliterated to ASCII first so that the same label always produces the
//! same folder regardless of accents or typography.

use crate::file::{Analysis, InputFile};
use rslug::slugify;
use serde::{Deserialize, Serialize};

/// Folder used for files without a usable category.
pub const FALLBACK_FOLDER: &str = "Others";

/// Quotation marks stripped before slugifying so `"Hello"` doesn't become
/// `-hello-`.
const QUOTES: &[char] = &[
    '\u{0027}', '\u{0022}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201B}', '\u{0060}',
    '\u{00AB}', '\u{00BB}', '\u{2039}', '\u{203A}',
];

/// Words that carry no meaning in a filename derived from a description.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "nor", "of", "in", "on", "at", "to", "for", "with", "from", "by", "about",
    "as", "into", "is", "are", "was", "were", "be", "been", "being", "this", "that", "these", "those", "it", "its",
    "there", "here", "some", "very", "image", "picture", "photo", "photograph", "shows", "showing", "depicts",
    "depicting", "displays", "displaying", "contains", "containing", "features", "featuring",
];

/// Length limits applied to derived labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerOptions {
    /// Maximum folder label length in bytes.
    pub max_folder_len: usize,
    /// Number of meaningful description words used for a filename.
    pub max_filename_words: usize,
    /// Maximum derived filename stem length in bytes.
    pub max_filename_len: usize,
}
impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            max_folder_len: 50,
            max_filename_words: 3,
            max_filename_len: 50,
        }
    }
}

/// Folder label and filename stem for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub folder: String,
    pub stem: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    options: NormalizerOptions,
}
impl Normalizer {
    pub fn new(options: NormalizerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    /// Derives the folder and stem for `file`.
    ///
    /// Never fails and never drops a file: each field falls back on its own,
    /// the folder to [`FALLBACK_FOLDER`] and the stem to the original filename
    /// stem.
    ///
    /// # Examples
    ///
    /// ```
    /// use arrange_engine::{Analysis, InputFile, Normalizer};
    /// use time::OffsetDateTime;
    /// let file = InputFile::new("/in/IMG_0042.jpg", 1, OffsetDateTime::UNIX_EPOCH);
    /// let analysis = Analysis {
    ///     description: Some("A picture of a golden retriever on the beach".to_string()),
    ///     category: Some("pet photos".to_string()),
    ///     suggested_name: None,
    /// };
    /// let normalized = Normalizer::default().normalize(Some(&analysis), &file);
    /// assert_eq!(normalized.folder, "Pet_Photos");
    /// assert_eq!(normalized.stem, "golden_retriever_beach");
    /// ```
    pub fn normalize(&self, analysis: Option<&Analysis>, file: &InputFile) -> Normalized {
        let Some(analysis) = analysis else {
            return Normalized { folder: FALLBACK_FOLDER.to_string(), stem: file.stem() };
        };
        let folder = analysis
            .category
            .as_deref()
            .map(|category| self.folder_label(category))
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| FALLBACK_FOLDER.to_string());
        let stem = analysis
            .suggested_name
            .as_deref()
            .map(|name| self.suggested_stem(name))
            .filter(|stem| !stem.is_empty())
            .or_else(|| {
                analysis.description.as_deref().map(|d| self.description_stem(d)).filter(|stem| !stem.is_empty())
            })
            .unwrap_or_else(|| file.stem());
        Normalized { folder, stem }
    }

    fn folder_label(&self, category: &str) -> String {
        let words = words(category).into_iter().map(|w| title_case(&w));
        join_capped(words, self.options.max_folder_len)
    }

    fn suggested_stem(&self, name: &str) -> String {
        join_capped(words(name), self.options.max_filename_len)
    }

    fn description_stem(&self, description: &str) -> String {
        let meaningful = words(description)
            .into_iter()
            .filter(|w| !STOP_WORDS.contains(&w.as_str()))
            .take(self.options.max_filename_words);
        join_capped(meaningful, self.options.max_filename_len)
    }
}

/// Transliterates to ASCII and splits into lowercase alphanumeric words.
fn words(raw: &str) -> Vec<String> {
    let stripped: String = raw.chars().filter(|c| !QUOTES.contains(c)).collect();
    slugify!(&stripped).split('-').filter(|w| !w.is_empty()).map(str::to_string).collect()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Joins words with `_`, stopping before the word that would exceed
/// `max_len`. A single oversized first word is cut instead.
fn join_capped(words: impl IntoIterator<Item = String>, max_len: usize) -> String {
    let mut joined = String::new();
    for word in words {
        let needed = match joined.is_empty() {
            true => word.len(),
            false => joined.len() + 1 + word.len(),
        };
        if needed > max_len {
            if joined.is_empty() {
                joined.push_str(&word[..word.floor_char_boundary(max_len)]);
            }
            break;
        }
        if !joined.is_empty() {
            joined.push('_');
        }
        joined.push_str(&word);
    }
    joined
}
