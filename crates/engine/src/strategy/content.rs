use super::{Mode, PlannedPath, Strategy};
use crate::error::Result;
use crate::file::InputFile;
use crate::normalize::Normalizer;

/// Groups files into one folder per normalized analysis category.
///
/// Files without analysis are still planned, under
/// [`FALLBACK_FOLDER`](crate::normalize::FALLBACK_FOLDER) with their original
/// name.
#[derive(Debug, Clone, Default)]
pub struct ContentStrategy {
    normalizer: Normalizer,
}
impl ContentStrategy {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }
}
impl Strategy for ContentStrategy {
    fn mode(&self) -> Mode {
        Mode::Content
    }

    fn plan_path(&self, file: &InputFile) -> Result<PlannedPath> {
        let normalized = self.normalizer.normalize(file.analysis(), file);
        Ok(PlannedPath {
            folders: vec![normalized.folder],
            stem: normalized.stem,
            extension: file.extension(),
        })
    }
}
