use super::{Mode, PlannedPath, Strategy};
use crate::error::Result;
use crate::file::InputFile;
use time::UtcOffset;

/// Groups files by the year and (English) month of their last modification,
/// e.g. `2024/March/report.pdf`.
///
/// Timestamps are converted to UTC first so that a plan doesn't depend on the
/// machine's timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateStrategy;
impl Strategy for DateStrategy {
    fn mode(&self) -> Mode {
        Mode::Date
    }

    fn plan_path(&self, file: &InputFile) -> Result<PlannedPath> {
        let modified = file.modified().to_offset(UtcOffset::UTC);
        Ok(PlannedPath {
            folders: vec![modified.year().to_string(), modified.month().to_string()],
            stem: file.stem(),
            extension: file.extension(),
        })
    }
}
