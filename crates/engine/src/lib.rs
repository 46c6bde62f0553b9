//! Organization planning engine.
//!
//! Turns a pile of input files into a conflict-free plan of destinations
//! under a new output root, grouped by content, date or type, and applies
//! that plan without ever touching the sources.
//!
//! A run goes through these steps:
//!
//! 1. [`collect`] walks the inputs into [`InputFile`]s.
//! 2. [`analyze_all`] optionally attaches [`Analysis`] results from an
//!    [`Analyzer`] (content mode only).
//! 3. [`PlanBuilder`] asks a [`Strategy`] where each file belongs, sanitizes
//!    the path and [resolves](resolve) duplicates into a [`Plan`].
//! 4. The plan is previewed ([`Plan::tree`]) and confirmed.
//! 5. [`Executor`] hardlinks (or copies) every file into place and records a
//!    [`Status`] per operation, summarized by [`Summary`].
//!
//! [`session::Session`] strings these together as a type-state machine.

mod analyze;
mod collect;
pub mod error;
mod execute;
mod file;
mod normalize;
mod plan;
mod resolve;
mod sanitize;
pub mod session;
mod strategy;
mod summary;

#[cfg(any(test, feature = "mock"))]
pub use crate::analyze::MockAnalyzer;
pub use crate::analyze::{AnalysisOutcome, AnalyzeOptions, Analyzer, SidecarAnalyzer, analyze_all};
pub use crate::collect::{CollectOptions, Collection, collect};
pub use crate::execute::{ExecuteEvent, ExecuteOptions, Executor};
pub use crate::file::{Analysis, FileKind, InputFile};
pub use crate::normalize::{FALLBACK_FOLDER, Normalized, Normalizer, NormalizerOptions};
pub use crate::plan::{Diagnostic, Exclusion, LinkKind, Plan, PlanBuilder, PlanTree, PlannedOperation, Status};
pub use crate::resolve::{ClaimSet, resolve};
pub use crate::sanitize::{MAX_COMPONENT_BYTES, sanitize_component, sanitize_path, validate as validate_path};
pub use crate::strategy::{ContentStrategy, DateStrategy, Mode, PlannedPath, Strategy, TypeStrategy};
pub use crate::summary::Summary;
pub use tokio_util::sync::CancellationToken;
