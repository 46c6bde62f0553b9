//! Plans: the complete, previewable list of operations for one run.
//!
//! A [`Plan`] is built by [`PlanBuilder`] without touching the filesystem
//! (apart from optionally listing what already exists in the output root),
//! can be inspected as a [`PlanTree`], and is consumed exactly once by the
//! [`Executor`](crate::Executor). Every destination in a plan is unique: each
//! one goes through [`resolve`](crate::resolve) and is claimed before the next
//! file is considered.

mod builder;
mod tree;

pub use self::builder::PlanBuilder;
pub use self::tree::PlanTree;

use crate::resolve::ClaimSet;
use crate::strategy::Mode;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::{Result as IoResult, Write};
use std::path::{Path, PathBuf};

/// How a planned file ends up at its destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Hardlink to the source, falling back to a copy when linking fails
    /// (e.g. across filesystems).
    #[default]
    Hardlink,
    /// Always copy.
    Copy,
}
impl Display for LinkKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Hardlink => "hardlink",
            Self::Copy => "copy",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Pending,
    Succeeded,
    Failed {
        reason: String,
    },
}
impl Status {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}
impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed { .. } => "failed",
        })
    }
}

/// A single source to destination mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOperation {
    source: PathBuf,
    destination: PathBuf,
    kind: LinkKind,
    status: Status,
}
impl PlannedOperation {
    pub(crate) fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, kind: LinkKind) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            kind,
            status: Status::Pending,
        }
    }

    /// Absolute path of the source file.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Destination, relative to the output root.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Requested mechanism while pending; the mechanism actually used once
    /// applied.
    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub(crate) fn settle(&mut self, kind: LinkKind, status: Status) {
        self.kind = kind;
        self.status = status;
    }
}

/// A note about a file that was planned in a degraded way, e.g. without
/// analysis or with a fallback strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub message: String,
}
impl Diagnostic {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}
impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// A file that is not part of the plan at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub path: PathBuf,
    pub reason: String,
}
impl Exclusion {
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self { path: path.into(), reason: reason.into() }
    }
}
impl Display for Exclusion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    mode: Mode,
    operations: Vec<PlannedOperation>,
    claimed: ClaimSet,
    exclusions: Vec<Exclusion>,
    diagnostics: Vec<Diagnostic>,
}
impl Plan {
    pub(crate) fn new(mode: Mode, claimed: ClaimSet) -> Self {
        Self {
            mode,
            operations: Vec::new(),
            claimed,
            exclusions: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn operations(&self) -> &[PlannedOperation] {
        &self.operations
    }

    pub(crate) fn operations_mut(&mut self) -> &mut [PlannedOperation] {
        &mut self.operations
    }

    pub(crate) fn push(&mut self, operation: PlannedOperation) {
        self.operations.push(operation);
    }

    /// Every destination claimed while planning, including paths that
    /// already existed in the output root.
    pub fn claimed(&self) -> &ClaimSet {
        &self.claimed
    }

    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn exclude(&mut self, exclusion: Exclusion) {
        self.exclusions.push(exclusion);
    }

    pub fn diagnose(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of operations not yet applied.
    pub fn pending(&self) -> usize {
        self.operations.iter().filter(|op| op.status.is_pending()).count()
    }

    /// A plan is spent as soon as any operation has been applied; it cannot be
    /// executed again and has to be rebuilt.
    pub fn is_spent(&self) -> bool {
        self.operations.iter().any(|op| !op.status.is_pending())
    }

    /// Destinations grouped into a folder tree, for previews.
    pub fn tree(&self) -> PlanTree {
        PlanTree::from_paths(self.operations.iter().map(PlannedOperation::destination))
    }

    /// Writes one tab-separated line per operation and per exclusion:
    /// `status`, `kind`, source, destination, reason.
    ///
    /// Exclusions use `excluded` as status and `-` for the fields they lack.
    pub fn write_log(&self, mut writer: impl Write) -> IoResult<()> {
        for op in &self.operations {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}",
                op.status,
                op.kind,
                op.source.display(),
                op.destination.display(),
                single_line(op.status.reason().unwrap_or("-")),
            )?;
        }
        for exclusion in &self.exclusions {
            writeln!(writer, "excluded\t-\t{}\t-\t{}", exclusion.path.display(), single_line(&exclusion.reason))?;
        }
        writer.flush()
    }
}

fn single_line(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}
