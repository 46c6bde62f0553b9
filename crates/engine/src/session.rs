//! A run of the engine as a compile-time state machine.
//!
//! `Collected → Planned → Confirmed → Done`. Only the transition out of
//! [`Confirmed`] touches the filesystem, and the only way to reach it is
//! through a [`Confirm`] gate, so a plan can't be executed by accident.
//! Callers that don't want the ceremony can use [`PlanBuilder`] and
//! [`Executor`] directly.

use crate::analyze::{AnalyzeOptions, Analyzer, analyze_all};
use crate::collect::Collection;
use crate::error::Result;
use crate::execute::Executor;
use crate::file::InputFile;
use crate::plan::{Diagnostic, Plan, PlanBuilder, PlanTree};
use crate::strategy::Strategy;
use crate::summary::Summary;

/// Decides whether a previewed plan may be executed.
pub trait Confirm {
    fn confirm(&self, plan: &Plan) -> bool;
}
impl<F: Fn(&Plan) -> bool> Confirm for F {
    fn confirm(&self, plan: &Plan) -> bool {
        self(plan)
    }
}

mod sealed {
    pub trait Sealed {}
}
pub trait Stage: sealed::Sealed {
    type State;
}

pub struct Collected;
impl sealed::Sealed for Collected {}
impl Stage for Collected {
    type State = (Collection, Vec<Diagnostic>);
}

pub struct Planned;
impl sealed::Sealed for Planned {}
impl Stage for Planned {
    type State = Plan;
}

pub struct Confirmed;
impl sealed::Sealed for Confirmed {}
impl Stage for Confirmed {
    type State = Plan;
}

pub struct Done;
impl sealed::Sealed for Done {}
impl Stage for Done {
    type State = Plan;
}

pub struct Session<S: Stage = Collected> {
    state: S::State,
}

impl Session {
    pub fn new(collection: Collection) -> Self {
        Self { state: (collection, Vec::new()) }
    }

    pub fn files(&self) -> &[InputFile] {
        &self.state.0.files
    }

    /// Attaches analysis to every file. Failures become diagnostics that are
    /// carried into the plan.
    pub async fn analyze(self, analyzer: &dyn Analyzer, options: &AnalyzeOptions) -> Self {
        let (mut collection, mut diagnostics) = self.state;
        let outcome = analyze_all(std::mem::take(&mut collection.files), analyzer, options).await;
        collection.files = outcome.files;
        diagnostics.extend(outcome.diagnostics);
        Self { state: (collection, diagnostics) }
    }

    pub fn plan(self, builder: PlanBuilder, strategy: &dyn Strategy) -> Session<Planned> {
        let (collection, diagnostics) = self.state;
        let plan = builder.exclusions(collection.exclusions).diagnostics(diagnostics).build(&collection.files, strategy);
        Session { state: plan }
    }
}

impl Session<Planned> {
    pub fn plan(&self) -> &Plan {
        &self.state
    }

    pub fn tree(&self) -> PlanTree {
        self.state.tree()
    }

    /// Passes the plan through `gate`. A declined plan is handed back
    /// unchanged.
    #[allow(clippy::result_large_err)]
    pub fn confirm(self, gate: &impl Confirm) -> std::result::Result<Session<Confirmed>, Self> {
        match gate.confirm(&self.state) {
            true => Ok(Session { state: self.state }),
            false => Err(self),
        }
    }

    pub fn into_plan(self) -> Plan {
        self.state
    }
}

impl Session<Confirmed> {
    pub async fn execute(self, executor: &Executor) -> Result<Session<Done>> {
        let plan = executor.execute(self.state).await?;
        Ok(Session { state: plan })
    }
}

impl Session<Done> {
    pub fn plan(&self) -> &Plan {
        &self.state
    }

    pub fn summary(&self) -> Summary {
        Summary::from(&self.state)
    }

    pub fn into_plan(self) -> Plan {
        self.state
    }
}
