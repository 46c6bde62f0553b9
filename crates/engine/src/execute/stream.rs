use super::Executor;
use super::file::apply_operation;
use crate::error::{ErrorKind, Result};
use crate::plan::{LinkKind, Plan, Status};
use async_stream::stream;
use futures::Stream;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Progress events emitted by [`Executor::execute_stream`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started), exactly once, with the number of operations.
/// 2. [`Applied`](Self::Applied), zero or more times, one per operation, in
///    plan order.
/// 3. [`Cancelled`](Self::Cancelled), at most once, if cancellation was
///    requested before every operation was applied.
/// 4. [`Complete`](Self::Complete), exactly once.
///
/// A spent plan terminates the stream with an error before
/// [`Started`](Self::Started).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteEvent {
    Started(usize),
    /// An operation was attempted; `kind` is the mechanism actually used.
    Applied {
        index: usize,
        destination: PathBuf,
        kind: LinkKind,
        status: Status,
    },
    /// Execution stopped early; `remaining` operations are still pending.
    Cancelled {
        remaining: usize,
    },
    Complete,
}

impl Executor {
    /// Applies `plan` one operation at a time, reporting progress as it goes.
    ///
    /// The plan is updated in place; once the stream is finished (or dropped)
    /// it holds the status of every attempted operation.
    pub fn execute_stream<'a>(&'a self, plan: &'a mut Plan) -> impl Stream<Item = Result<ExecuteEvent>> + 'a {
        // `rustfmt` does not format macros that use braces. Wrap in parentheses!
        stream!({
            if plan.is_spent() {
                yield Err(exn::Exn::from(ErrorKind::PlanSpent));
                return;
            }
            let total = plan.len();
            info!(total, "executing plan");
            yield Ok(ExecuteEvent::Started(total));

            let mut succeeded = 0usize;
            for index in 0..total {
                if self.cancel.is_cancelled() {
                    let remaining = total - index;
                    warn!(remaining, "execution cancelled");
                    yield Ok(ExecuteEvent::Cancelled { remaining });
                    break;
                }
                let op = &mut plan.operations_mut()[index];
                let (kind, status) = match apply_operation(&self.root, op, self.options.verify_copies).await {
                    Ok(kind) => {
                        debug!(
                            source = %op.source().display(),
                            destination = %op.destination().display(),
                            %kind,
                            "applied"
                        );
                        succeeded += 1;
                        (kind, Status::Succeeded)
                    },
                    Err(err) => {
                        warn!(source = %op.source().display(), error = %*err, "operation failed");
                        (op.kind(), Status::Failed { reason: (*err).to_string() })
                    },
                };
                op.settle(kind, status.clone());
                yield Ok(ExecuteEvent::Applied { index, destination: op.destination().to_path_buf(), kind, status });
            }

            let failed = plan.operations().iter().filter(|op| op.status().is_failed()).count();
            info!(succeeded, failed, "execution finished");
            yield Ok(ExecuteEvent::Complete);
        })
    }
}
