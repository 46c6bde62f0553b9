//! Analysis providers and the bounded fan-out over them.
//!
//! The engine never performs inference itself. An [`Analyzer`] hands back an
//! [`Analysis`] (or nothing) for a single file; [`analyze_all`] runs one over
//! a whole collection with bounded concurrency and a per-file timeout, then
//! re-joins the results in input order. Any failure only costs that file its
//! analysis: it is still planned, just without content metadata.

#[cfg(any(test, feature = "mock"))]
mod mock;
mod sidecar;

#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockAnalyzer;
pub use self::sidecar::SidecarAnalyzer;

use crate::error::{ErrorKind, Result};
use crate::file::{Analysis, InputFile};
use crate::plan::Diagnostic;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

// TODO: When `dyn async trait` stabilizes, migrate to native 2024 Edition async traits.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Short name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Analyzes one file. `Ok(None)` means the provider had nothing to say.
    async fn analyze(&self, file: &InputFile) -> Result<Option<Analysis>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Maximum number of analyses in flight at once. Zero is treated as one.
    pub concurrency: usize,
    /// Time allowed for a single file.
    pub timeout: Duration,
}
impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Files with their analysis attached, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub files: Vec<InputFile>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs `analyzer` over every analyzable file.
///
/// At most `concurrency` analyses run at once; more are started as earlier
/// ones finish. Errors, timeouts and empty answers become [`Diagnostic`]s and
/// leave the file without analysis. Unsupported files are passed through
/// untouched without calling the analyzer.
#[instrument(skip_all, fields(analyzer = analyzer.name(), files = files.len()))]
pub async fn analyze_all(files: Vec<InputFile>, analyzer: &dyn Analyzer, options: &AnalyzeOptions) -> AnalysisOutcome {
    let mut results: Vec<Option<Analysis>> = vec![None; files.len()];
    let mut notes: Vec<(usize, Diagnostic)> = Vec::new();
    {
        let mut queue: VecDeque<_> = files
            .iter()
            .enumerate()
            .filter(|(_, file)| file.kind().is_analyzable())
            .map(|(index, file)| analyze_one(index, file, analyzer, options.timeout))
            .collect();
        let mut processing = FuturesUnordered::new();
        processing.extend(queue.drain(..options.concurrency.max(1).min(queue.len())));
        while let Some((index, result)) = processing.next().await {
            let path = files[index].path();
            match result {
                Ok(Some(analysis)) if !analysis.is_empty() => {
                    debug!(path = %path.display(), "analyzed");
                    results[index] = Some(analysis);
                },
                Ok(_) => notes.push((index, Diagnostic::new(path, "no analysis available"))),
                Err(err) => {
                    warn!(path = %path.display(), error = %*err, "analysis failed");
                    notes.push((index, Diagnostic::new(path, (*err).to_string())));
                },
            }
            // Pop-n-push, FIFO.
            if let Some(next) = queue.pop_front() {
                processing.push(next);
            }
        }
    }
    notes.sort_by_key(|(index, _)| *index);
    let analyzed = results.iter().filter(|r| r.is_some()).count();
    info!(analyzed, degraded = notes.len(), "analysis complete");
    AnalysisOutcome {
        files: files
            .into_iter()
            .zip(results)
            .map(|(file, analysis)| match analysis {
                Some(analysis) => file.with_analysis(analysis),
                None => file,
            })
            .collect(),
        diagnostics: notes.into_iter().map(|(_, diagnostic)| diagnostic).collect(),
    }
}

async fn analyze_one(
    index: usize,
    file: &InputFile,
    analyzer: &dyn Analyzer,
    timeout: Duration,
) -> (usize, Result<Option<Analysis>>) {
    let result = match tokio::time::timeout(timeout, analyzer.analyze(file)).await {
        Ok(result) => result,
        Err(_) => Err(ErrorKind::Analysis(format!("timed out after {}s", timeout.as_secs_f32())).into()),
    };
    (index, result)
}
