use super::{Diagnostic, Exclusion, LinkKind, Plan, PlannedOperation};
use crate::collect::existing_files;
use crate::error::Result;
use crate::file::InputFile;
use crate::resolve::{ClaimSet, resolve};
use crate::strategy::{Strategy, TypeStrategy};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Builds a [`Plan`] from collected files and a [`Strategy`].
///
/// ```
/// use arrange_engine::{InputFile, LinkKind, PlanBuilder, TypeStrategy};
/// use time::OffsetDateTime;
/// let files = [
///     InputFile::new("/in/q1/report.pdf", 1, OffsetDateTime::UNIX_EPOCH),
///     InputFile::new("/in/q2/report.pdf", 1, OffsetDateTime::UNIX_EPOCH),
/// ];
/// let plan = PlanBuilder::new().link(LinkKind::Copy).build(&files, &TypeStrategy);
/// let destinations: Vec<_> = plan.operations().iter().map(|op| op.destination()).collect();
/// assert_eq!(destinations[0], std::path::Path::new("text_files/pdf_files/report.pdf"));
/// assert_eq!(destinations[1], std::path::Path::new("text_files/pdf_files/report_1.pdf"));
/// ```
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    link: LinkKind,
    case_insensitive: bool,
    existing: Vec<PathBuf>,
    exclusions: Vec<Exclusion>,
    diagnostics: Vec<Diagnostic>,
}
impl Default for PlanBuilder {
    fn default() -> Self {
        Self {
            link: LinkKind::default(),
            case_insensitive: true,
            existing: Vec::new(),
            exclusions: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}
impl PlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link(mut self, link: LinkKind) -> Self {
        self.link = link;
        self
    }

    /// Whether destinations differing only in case count as the same path.
    /// Defaults to `true`.
    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    /// Pre-claims destinations (relative to the output root) that are
    /// already occupied.
    pub fn claim_existing(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.existing.extend(paths);
        self
    }

    /// Pre-claims every file already present under `root`, so that a plan
    /// never targets an occupied path. A missing root claims nothing.
    pub async fn with_existing(self, root: impl AsRef<Path>) -> Result<Self> {
        let existing = existing_files(root.as_ref()).await?;
        Ok(self.claim_existing(existing))
    }

    /// Carries exclusions from collection over into the plan.
    pub fn exclusions(mut self, exclusions: impl IntoIterator<Item = Exclusion>) -> Self {
        self.exclusions.extend(exclusions);
        self
    }

    /// Carries diagnostics from analysis over into the plan.
    pub fn diagnostics(mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        self.diagnostics.extend(diagnostics);
        self
    }

    /// Plans every file, in the order given.
    ///
    /// Never fails: a file the strategy can't place is planned by type
    /// instead (with a [`Diagnostic`]), and a file that can't be placed at all
    /// becomes an [`Exclusion`]. Pure, so building twice from the same input
    /// yields equal plans.
    #[instrument(skip_all, fields(mode = %strategy.mode(), files = files.len()))]
    pub fn build(&self, files: &[InputFile], strategy: &dyn Strategy) -> Plan {
        let mut claimed = ClaimSet::new(self.case_insensitive);
        claimed.extend(&self.existing);
        let mut plan = Plan::new(strategy.mode(), claimed);
        self.exclusions.iter().cloned().for_each(|e| plan.exclude(e));
        self.diagnostics.iter().cloned().for_each(|d| plan.diagnose(d));

        for file in files {
            let relative = match strategy.plan_path(file).and_then(|planned| planned.to_relative()) {
                Ok(relative) => relative,
                Err(err) => {
                    warn!(path = %file.path().display(), error = %*err, "falling back to type strategy");
                    plan.diagnose(Diagnostic::new(file.path(), format!("{}; organized by type instead", *err)));
                    match TypeStrategy.plan_path(file).and_then(|planned| planned.to_relative()) {
                        Ok(relative) => relative,
                        Err(err) => {
                            warn!(path = %file.path().display(), error = %*err, "excluding file");
                            plan.exclude(Exclusion::new(file.path(), (*err).to_string()));
                            continue;
                        },
                    }
                },
            };
            let destination = resolve(&relative, &plan.claimed);
            if destination != relative {
                debug!(from = %relative.display(), to = %destination.display(), "resolved duplicate destination");
            }
            plan.claimed.insert(&destination);
            plan.push(PlannedOperation::new(file.path(), destination, self.link));
        }
        info!(operations = plan.len(), excluded = plan.exclusions().len(), "plan built");
        plan
    }
}
