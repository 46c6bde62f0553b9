//! Post-run reporting.

use crate::plan::{Exclusion, LinkKind, Plan, Status};
use crate::strategy::Mode;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

/// Counts and failures of a (possibly partially) executed plan.
///
/// Every file that was collected ends up in exactly one bucket: succeeded,
/// pending, failed or excluded. There is no silent partial success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub mode: Mode,
    pub succeeded: usize,
    pub hardlinked: usize,
    pub copied: usize,
    pub pending: usize,
    /// Source path and reason of every failed operation.
    pub failed: Vec<(PathBuf, String)>,
    pub excluded: Vec<Exclusion>,
    /// Files planned in a degraded way (missing analysis, fallback strategy).
    pub degraded: usize,
}
impl Summary {
    /// Operations in the plan, whatever their status.
    pub fn total(&self) -> usize {
        self.succeeded + self.pending + self.failed.len()
    }

    /// Everything planned was applied and nothing was excluded.
    pub fn is_complete(&self) -> bool {
        self.pending == 0 && self.failed.is_empty() && self.excluded.is_empty()
    }
}
impl From<&Plan> for Summary {
    fn from(plan: &Plan) -> Self {
        let mut summary = Self {
            mode: plan.mode(),
            succeeded: 0,
            hardlinked: 0,
            copied: 0,
            pending: 0,
            failed: Vec::new(),
            excluded: plan.exclusions().to_vec(),
            degraded: plan.diagnostics().len(),
        };
        for op in plan.operations() {
            match op.status() {
                Status::Pending => summary.pending += 1,
                Status::Succeeded => {
                    summary.succeeded += 1;
                    match op.kind() {
                        LinkKind::Hardlink => summary.hardlinked += 1,
                        LinkKind::Copy => summary.copied += 1,
                    }
                },
                Status::Failed { reason } => summary.failed.push((op.source().to_path_buf(), reason.clone())),
            }
        }
        summary
    }
}
impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(
            f,
            "Organized {} of {} files by {} ({} hardlinked, {} copied).",
            self.succeeded,
            self.total(),
            self.mode,
            self.hardlinked,
            self.copied,
        )?;
        if self.pending > 0 {
            writeln!(f, "{} not attempted (cancelled).", self.pending)?;
        }
        if self.degraded > 0 {
            writeln!(f, "{} planned without full analysis.", self.degraded)?;
        }
        if !self.failed.is_empty() {
            writeln!(f, "Failed ({}):", self.failed.len())?;
            for (path, reason) in &self.failed {
                writeln!(f, "  {}: {reason}", path.display())?;
            }
        }
        if !self.excluded.is_empty() {
            writeln!(f, "Excluded ({}):", self.excluded.len())?;
            for exclusion in &self.excluded {
                writeln!(f, "  {exclusion}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Diagnostic, PlannedOperation};
    use crate::resolve::ClaimSet;

    #[test]
    fn test_summary() {
        let mut plan = Plan::new(Mode::Date, ClaimSet::default());
        for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
            plan.push(PlannedOperation::new(format!("/in/{name}"), format!("others/{name}"), LinkKind::Hardlink));
            let ops = plan.operations_mut();
            match i {
                0 => ops[i].settle(LinkKind::Hardlink, Status::Succeeded),
                1 => ops[i].settle(LinkKind::Copy, Status::Succeeded),
                2 => ops[i].settle(LinkKind::Hardlink, Status::Failed { reason: "disk full".to_string() }),
                _ => {},
            }
        }
        plan.exclude(Exclusion::new("/in/e", "does not exist"));
        plan.diagnose(Diagnostic::new("/in/a", "no analysis available"));

        let summary = Summary::from(&plan);
        assert_eq!(summary.total(), 4);
        assert_eq!((summary.succeeded, summary.hardlinked, summary.copied, summary.pending), (2, 1, 1, 1));
        assert!(!summary.is_complete());
        let expected = "\
Organized 2 of 4 files by date (1 hardlinked, 1 copied).
1 not attempted (cancelled).
1 planned without full analysis.
Failed (1):
  /in/c: disk full
Excluded (1):
  /in/e: does not exist
";
        assert_eq!(summary.to_string(), expected);
    }
}
