//! Applying a plan to the filesystem.
//!
//! The [`Executor`] is the only part of the engine with filesystem side
//! effects, and the only side effects it has are creating folders and new
//! files under the output root. Sources are never moved, deleted or opened
//! for writing, and an existing destination is never overwritten.
//!
//! Operations run sequentially, in plan order. A failed operation is marked
//! [`Status::Failed`](crate::Status::Failed) and the batch carries on;
//! cancellation is checked between operations, so applied operations stay
//! applied and the rest remain pending.

pub(crate) mod error;
mod file;
mod stream;

pub use self::stream::ExecuteEvent;

use crate::error::{ErrorKind, Result};
use crate::plan::Plan;
use exn::ResultExt;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::fs::{OpenOptions, create_dir_all as sync_create_dir, remove_file as sync_remove_file};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecuteOptions {
    /// Hash every copy with BLAKE3 and compare against the source. Hardlinks
    /// share the source's data and are never verified.
    pub verify_copies: bool,
}

#[derive(Debug, Clone)]
pub struct Executor {
    root: PathBuf,
    options: ExecuteOptions,
    cancel: CancellationToken,
}
impl Executor {
    /// Prepares execution into `root`, creating it if needed.
    ///
    /// # Errors
    /// Returns [`ErrorKind::OutputRoot`] if `root` is relative, is not a
    /// directory, can't be created or can't be written to. Checked up front
    /// so that nothing is attempted against an unusable root.
    pub fn new(root: impl Into<PathBuf>, options: ExecuteOptions) -> Result<Self> {
        let root = root.into();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::OutputRoot(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::OutputRoot(root));
            }
        } else {
            // Use non-async here; it only happens once per run.
            sync_create_dir(&root).or_raise(|| ErrorKind::OutputRoot(root.clone()))?;
        }
        let probe = root.join(format!(".arrange-{}.probe", std::process::id()));
        OpenOptions::new().write(true).create_new(true).open(&probe).or_raise(|| ErrorKind::OutputRoot(root.clone()))?;
        _ = sync_remove_file(&probe);

        Ok(Self { root, options, cancel: CancellationToken::new() })
    }

    /// Uses `token` for cooperative cancellation instead of a private one.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that stops execution before the next operation when
    /// cancelled.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &ExecuteOptions {
        &self.options
    }

    /// Applies every pending operation in `plan` and returns it with each
    /// operation's final [`Status`](crate::Status).
    ///
    /// # Errors
    /// Returns [`ErrorKind::PlanSpent`] if the plan was executed before.
    /// Failures of individual operations are recorded on the plan instead.
    #[instrument(skip_all, fields(root = %self.root.display(), operations = plan.len()))]
    pub async fn execute(&self, mut plan: Plan) -> Result<Plan> {
        {
            let mut events = std::pin::pin!(self.execute_stream(&mut plan));
            while let Some(event) = events.next().await {
                event?;
            }
        }
        Ok(plan)
    }
}
