//! Input files and the analysis results attached to them.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif", "webp", "heic"];
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "pdf", "doc", "docx", "rtf", "odt", "xls", "xlsx", "ods", "csv", "ppt", "pptx", "odp",
];

/// Broad classification of an input file, used to decide which analysis
/// provider (if any) should look at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Raster images; handled by a vision model.
    Image,
    /// Documents, spreadsheets, presentations and plain text; handled by a
    /// text model after extraction.
    Text,
    /// Everything else. Never analyzed.
    Unsupported,
}
impl FileKind {
    /// Classify a file by its (case-insensitive) extension.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let Some(ext) = extension_of(path.as_ref()) else {
            return Self::Unsupported;
        };
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            Self::Text
        } else {
            Self::Unsupported
        }
    }

    /// Whether files of this kind are offered to an analysis provider.
    pub fn is_analyzable(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}
impl Display for FileKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Image => "image",
            Self::Text => "text",
            Self::Unsupported => "unsupported",
        })
    }
}

/// Output of an external analysis provider for a single file.
///
/// Every field is optional: extraction or inference may fail partway and the
/// [`Normalizer`](crate::Normalizer) falls back field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    /// Short free-text description of the file contents.
    pub description: Option<String>,
    /// Folder category label, e.g. `"Financial Reports"`.
    pub category: Option<String>,
    /// Suggested filename stem, without extension.
    #[serde(alias = "filename", alias = "suggestedName")]
    pub suggested_name: Option<String>,
}
impl Analysis {
    /// An analysis where no field carries any text is as good as no analysis.
    pub fn is_empty(&self) -> bool {
        [&self.description, &self.category, &self.suggested_name]
            .iter()
            .all(|field| field.as_deref().map(str::trim).is_none_or(str::is_empty))
    }
}

/// A file collected for organizing.
///
/// Immutable once collected; the only change allowed before planning is
/// attaching an [`Analysis`] by value via [`with_analysis`](Self::with_analysis).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    path: PathBuf,
    kind: FileKind,
    size: u64,
    modified: OffsetDateTime,
    analysis: Option<Analysis>,
}
impl InputFile {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: OffsetDateTime) -> Self {
        let path = path.into();
        Self {
            kind: FileKind::from_path(&path),
            path,
            size,
            modified,
            analysis: None,
        }
    }

    pub fn with_analysis(mut self, analysis: impl Into<Option<Analysis>>) -> Self {
        self.analysis = analysis.into().filter(|a| !a.is_empty());
        self
    }

    /// Absolute path of the source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Last modification time, used by the date strategy.
    pub fn modified(&self) -> OffsetDateTime {
        self.modified
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    /// Filename without its final extension. Dotfiles (`.bashrc`) keep their
    /// whole name.
    pub fn stem(&self) -> String {
        self.path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
    }

    /// Lowercased final extension, or an empty string.
    pub fn extension(&self) -> String {
        extension_of(&self.path).unwrap_or_default()
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.JPG", FileKind::Image)]
    #[case("scan.tiff", FileKind::Image)]
    #[case("report.pdf", FileKind::Text)]
    #[case("notes.md", FileKind::Text)]
    #[case("budget.xlsx", FileKind::Text)]
    #[case("deck.pptx", FileKind::Text)]
    #[case("archive.zip", FileKind::Unsupported)]
    #[case("Makefile", FileKind::Unsupported)]
    // A dotfile has no extension.
    #[case(".png", FileKind::Unsupported)]
    fn test_kind_from_path(#[case] path: &str, #[case] expected: FileKind) {
        assert_eq!(FileKind::from_path(path), expected);
    }

    #[test]
    fn test_stem_and_extension() {
        let file = InputFile::new("/in/Holiday Photo.JPEG", 10, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(file.stem(), "Holiday Photo");
        assert_eq!(file.extension(), "jpeg");
        let dotfile = InputFile::new("/in/.bashrc", 10, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(dotfile.stem(), ".bashrc");
        assert_eq!(dotfile.extension(), "");
    }

    #[test]
    fn test_empty_analysis_is_dropped() {
        let blank = Analysis {
            description: Some("   ".to_string()),
            category: None,
            suggested_name: Some(String::new()),
        };
        assert!(blank.is_empty());
        let file = InputFile::new("/in/a.png", 1, OffsetDateTime::UNIX_EPOCH).with_analysis(blank);
        assert!(file.analysis().is_none());
    }

    #[test]
    fn test_analysis_deserialize_aliases() {
        let analysis: Analysis =
            serde_json::from_str(r#"{"category":"Receipts","suggestedName":"coffee_receipt"}"#).unwrap();
        assert_eq!(analysis.category.as_deref(), Some("Receipts"));
        assert_eq!(analysis.suggested_name.as_deref(), Some("coffee_receipt"));
        assert!(analysis.description.is_none());
    }
}
