//! Public-facing parse coordinator
//!
//! `ParseController` is what the editor host talks to: bind it to one
//! source unit, then call [`ParseController::parse`] on every edit. The
//! call blocks until the background job reaches a terminal state so the
//! host never observes interleaved or partial trees, even when it
//! re-parses on every keystroke.

use std::sync::atomic::Ordering;
use std::sync::mpsc::Sender;
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;

use thiserror::Error;

use crate::diagnostics::DiagnosticsSink;
use crate::engine::{AmbiguityReporter, ProjectWorkspace};
use crate::handle::HandlePool;
use crate::job::{self, JobContext, ParseRequest, SharedState};
use crate::location::{LocationError, ModuleLocation};
use crate::tree::{ModuleTree, Tokens};

/// Misuse of the controller surface. Parse failures are never errors here;
/// they surface as diagnostics through the sink.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("parse requested before initialize")]
    NotInitialized,
    #[error("controller is already bound to a unit")]
    AlreadyInitialized,
    #[error(transparent)]
    InvalidUnit(#[from] LocationError),
    #[error("parse worker is no longer running")]
    WorkerStopped,
}

/// Coordinates background re-parsing of one source unit.
pub struct ParseController {
    language: String,
    pool: Arc<HandlePool>,
    workspace: Arc<dyn ProjectWorkspace>,
    ambiguity: Arc<dyn AmbiguityReporter>,
    bound: OnceLock<Bound>,
}

/// Unit binding created by `initialize`, immutable afterwards.
struct Bound {
    unit: ModuleLocation,
    shared: Arc<SharedState>,
    jobs: Sender<ParseRequest>,
    // dropping the sender stops the worker; the thread itself is detached
    _worker: JoinHandle<()>,
}

impl ParseController {
    pub fn new(
        language: impl Into<String>,
        pool: Arc<HandlePool>,
        workspace: Arc<dyn ProjectWorkspace>,
        ambiguity: Arc<dyn AmbiguityReporter>,
    ) -> Self {
        Self {
            language: language.into(),
            pool,
            workspace,
            ambiguity,
            bound: OnceLock::new(),
        }
    }

    /// Bind the controller to its source unit, creating the project's
    /// parser handle if this is the first unit seen for that project.
    /// Exactly once; later calls fail with `AlreadyInitialized`.
    pub fn initialize(
        &self,
        unit: ModuleLocation,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Result<(), ControllerError> {
        if self.bound.get().is_some() {
            return Err(ControllerError::AlreadyInitialized);
        }
        unit.validate()?;
        let handle = self.pool.handle_for(unit.project());
        let shared = Arc::new(SharedState::new());
        let ctx = JobContext {
            unit: unit.clone(),
            handle,
            workspace: self.workspace.clone(),
            ambiguity: self.ambiguity.clone(),
            sink,
            shared: shared.clone(),
        };
        let (jobs, worker) = job::spawn_worker(ctx);
        self.bound
            .set(Bound {
                unit,
                shared,
                jobs,
                _worker: worker,
            })
            .map_err(|_| ControllerError::AlreadyInitialized)
    }

    /// Parse a snapshot of the editor buffer.
    ///
    /// Schedules one job and blocks until it reaches a terminal state, then
    /// returns the latest retained tree: the new one on success, the
    /// previous one when the job failed, was superseded, or was skipped.
    /// Once a tree has been produced the result never regresses to `None`.
    pub fn parse(&self, input: Option<&str>) -> Result<Option<Arc<ModuleTree>>, ControllerError> {
        let bound = self.bound.get().ok_or(ControllerError::NotInitialized)?;
        let revision = bound.shared.latest_revision.fetch_add(1, Ordering::SeqCst) + 1;
        let (reply_tx, reply_rx) = std::sync::mpsc::channel();
        bound
            .jobs
            .send(ParseRequest {
                text: input.map(str::to_owned),
                revision,
                reply: reply_tx,
            })
            .map_err(|_| ControllerError::WorkerStopped)?;
        // Blocks the caller while the job executes on the worker. The reply
        // arrives after the terminal transition, so the retained tree is
        // already up to date when we read it.
        reply_rx.recv().map_err(|_| ControllerError::WorkerStopped)?;
        Ok(bound.shared.current_tree())
    }

    /// Latest retained tree, without triggering any work.
    pub fn current_tree(&self) -> Option<Arc<ModuleTree>> {
        self.bound.get().and_then(|bound| bound.shared.current_tree())
    }

    /// Token-iteration view over the current tree, for highlighting and
    /// outline features. `None` before the first successful parse.
    pub fn with_tokens<T>(&self, f: impl FnOnce(Tokens<'_>) -> T) -> Option<T> {
        let tree = self.current_tree()?;
        Some(f(tree.tokens()))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// The bound unit, or `None` before `initialize`.
    pub fn location(&self) -> Option<&ModuleLocation> {
        self.bound.get().map(|bound| &bound.unit)
    }
}
