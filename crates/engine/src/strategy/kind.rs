use super::{Mode, PlannedPath, Strategy};
use crate::error::Result;
use crate::file::InputFile;

const IMAGE: &[&str] = &["image_files"];
const DOC: &[&str] = &["text_files", "doc_files"];
const PDF: &[&str] = &["text_files", "pdf_files"];
const PLAIN_TEXT: &[&str] = &["text_files", "plain_text_files"];
const MARKDOWN: &[&str] = &["text_files", "markdown_files"];
const SPREADSHEET: &[&str] = &["spreadsheet_files"];
const PRESENTATION: &[&str] = &["presentation_files"];
const OTHERS: &[&str] = &["others"];

/// Groups files by extension into a fixed folder layout.
///
/// Total: every file, including ones without an extension, gets a path. The
/// plan builder relies on this as its fallback for other strategies.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeStrategy;
impl TypeStrategy {
    /// Folder chain for a lowercase extension (without the dot).
    pub fn folders_for(extension: &str) -> &'static [&'static str] {
        match extension {
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tiff" | "tif" | "webp" | "heic" => IMAGE,
            "doc" | "docx" | "rtf" | "odt" => DOC,
            "pdf" => PDF,
            "txt" => PLAIN_TEXT,
            "md" | "markdown" => MARKDOWN,
            "xls" | "xlsx" | "ods" | "csv" => SPREADSHEET,
            "ppt" | "pptx" | "odp" => PRESENTATION,
            _ => OTHERS,
        }
    }
}
impl Strategy for TypeStrategy {
    fn mode(&self) -> Mode {
        Mode::Type
    }

    fn plan_path(&self, file: &InputFile) -> Result<PlannedPath> {
        let extension = file.extension();
        Ok(PlannedPath {
            folders: Self::folders_for(&extension).iter().map(|f| f.to_string()).collect(),
            stem: file.stem(),
            extension,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::OffsetDateTime;

    #[rstest]
    #[case("/in/a.JPG", &["image_files"])]
    #[case("/in/a.heic", &["image_files"])]
    #[case("/in/a.docx", &["text_files", "doc_files"])]
    #[case("/in/a.pdf", &["text_files", "pdf_files"])]
    #[case("/in/a.txt", &["text_files", "plain_text_files"])]
    #[case("/in/a.markdown", &["text_files", "markdown_files"])]
    #[case("/in/a.csv", &["spreadsheet_files"])]
    #[case("/in/a.pptx", &["presentation_files"])]
    #[case("/in/a.xyz", &["others"])]
    #[case("/in/Makefile", &["others"])]
    #[case("/in/.bashrc", &["others"])]
    fn test_type_folders(#[case] path: &str, #[case] expected: &[&str]) {
        let file = InputFile::new(path, 1, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(TypeStrategy.plan_path(&file).unwrap().folders, expected);
    }

    #[test]
    fn test_keeps_original_stem() {
        let file = InputFile::new("/in/Annual Report.PDF", 1, OffsetDateTime::UNIX_EPOCH);
        let planned = TypeStrategy.plan_path(&file).unwrap();
        assert_eq!(planned.stem, "Annual Report");
        assert_eq!(planned.extension, "pdf");
    }
}
