//! Scripted analyzer for testing.

use super::Analyzer;
use crate::error::{ErrorKind, Result};
use crate::file::{Analysis, InputFile};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Response {
    Analysis(Analysis),
    Failure(String),
    Hang,
}

/// Scripted [`Analyzer`] for testing.
///
/// Responses are keyed by file name. Files without a scripted response get
/// `Ok(None)`. Call counts and the highest number of concurrent calls are
/// recorded so tests can assert on fan-out behaviour.
#[derive(Debug, Default)]
pub struct MockAnalyzer {
    responses: HashMap<String, Response>,
    delays: HashMap<String, Duration>,
    default_delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockAnalyzer {
    pub fn with_analysis(mut self, name: impl Into<String>, analysis: Analysis) -> Self {
        self.responses.insert(name.into(), Response::Analysis(analysis));
        self
    }

    pub fn with_failure(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses.insert(name.into(), Response::Failure(message.into()));
        self
    }

    /// Never answers for this file; only a timeout gets past it.
    pub fn with_hang(mut self, name: impl Into<String>) -> Self {
        self.responses.insert(name.into(), Response::Hang);
        self
    }

    pub fn with_delay(mut self, name: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(name.into(), delay);
        self
    }

    /// Delay applied to every file without its own delay.
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn respond(&self, name: &str) -> Result<Option<Analysis>> {
        if let Some(delay) = self.delays.get(name).copied().or(self.default_delay) {
            tokio::time::sleep(delay).await;
        }
        match self.responses.get(name) {
            Some(Response::Analysis(analysis)) => Ok(Some(analysis.clone())),
            Some(Response::Failure(message)) => exn::bail!(ErrorKind::Analysis(message.clone())),
            Some(Response::Hang) => std::future::pending().await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, file: &InputFile) -> Result<Option<Analysis>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        let name = file.path().file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let result = self.respond(&name).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
