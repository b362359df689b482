//! Serialized parse jobs and the worker that runs them
//!
//! One worker thread per controller drains a FIFO channel of requests.
//! Each request runs as a single job: clear stale diagnostics, take the
//! parser handle, reload dependencies, parse, classify. Failures never
//! leave a job as panics or errors; every execution ends in a
//! [`ParseOutcome`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::engine::{AmbiguityReporter, LogProgress, ParseFailure, ProgressSink, ProjectWorkspace};
use crate::handle::ParserHandle;
use crate::location::ModuleLocation;
use crate::reload::{self, IgnoreSet};
use crate::translate::{self, Translated};
use crate::tree::ModuleTree;

/// Terminal state of one parse job.
#[derive(Debug)]
pub enum ParseOutcome {
    /// A tree was produced and retained; the ignore-set now holds exactly
    /// this module's name.
    Succeeded(Arc<ModuleTree>),
    /// The failure was classified; any resulting diagnostics went to the
    /// sink (the list is empty for log-only failures).
    Failed(Vec<Diagnostic>),
    /// A newer request superseded this one before it started. Nothing was
    /// emitted, the sink was left untouched.
    Cancelled,
    /// The unit is not currently parseable (no input, or the location lost
    /// its project context). Silent no-op, not a failure.
    Skipped,
}

/// One parse invocation, consumed by exactly one job execution.
pub(crate) struct ParseRequest {
    /// Snapshot of the editor buffer; `None` when the host has no document
    pub text: Option<String>,
    pub revision: u64,
    pub reply: Sender<ParseOutcome>,
}

/// State shared between the controller and its worker.
pub(crate) struct SharedState {
    /// Highest revision handed out by the controller; anything older is
    /// stale on arrival
    pub latest_revision: AtomicU64,
    /// Last successfully produced tree; written only at a job's terminal
    /// transition
    tree: Mutex<Option<Arc<ModuleTree>>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            latest_revision: AtomicU64::new(0),
            tree: Mutex::new(None),
        }
    }

    pub fn current_tree(&self) -> Option<Arc<ModuleTree>> {
        self.tree
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn retain_tree(&self, tree: Arc<ModuleTree>) {
        *self.tree.lock().unwrap_or_else(PoisonError::into_inner) = Some(tree);
    }
}

/// Everything a job needs, passed by value into the worker at spawn time.
pub(crate) struct JobContext {
    pub unit: ModuleLocation,
    pub handle: Arc<ParserHandle>,
    pub workspace: Arc<dyn ProjectWorkspace>,
    pub ambiguity: Arc<dyn AmbiguityReporter>,
    pub sink: Arc<dyn DiagnosticsSink>,
    pub shared: Arc<SharedState>,
}

/// Spawn the worker thread for one controller. The worker exits when the
/// request sender is dropped.
pub(crate) fn spawn_worker(ctx: JobContext) -> (Sender<ParseRequest>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<ParseRequest>();
    let worker = thread::spawn(move || run_worker(ctx, rx));
    (tx, worker)
}

fn run_worker(ctx: JobContext, rx: Receiver<ParseRequest>) {
    let mut ignore = IgnoreSet::new();
    while let Ok(request) = rx.recv() {
        let outcome = run_job(&ctx, &mut ignore, &request);
        if let ParseOutcome::Succeeded(tree) = &outcome {
            ctx.shared.retain_tree(tree.clone());
        }
        // the caller may have given up waiting; that is not our problem
        let _ = request.reply.send(outcome);
    }
    tracing::debug!("parse worker for {} stopped", ctx.unit);
}

fn run_job(ctx: &JobContext, ignore: &mut IgnoreSet, request: &ParseRequest) -> ParseOutcome {
    if request.revision < ctx.shared.latest_revision.load(Ordering::SeqCst) {
        tracing::debug!(
            "discarding stale parse request for {} (revision {})",
            ctx.unit,
            request.revision
        );
        return ParseOutcome::Cancelled;
    }

    // Every parse replaces whatever diagnostics were attached before.
    if let Err(e) = ctx.sink.clear() {
        tracing::warn!("could not clear previous diagnostics completely: {:#}", e);
    }

    let Some(input) = request.text.as_deref() else {
        return ParseOutcome::Skipped;
    };
    if !ctx.unit.is_resolvable() {
        // may happen when the project is deleted while the editor is open
        tracing::debug!("skipping parse for unresolvable unit {}", ctx.unit);
        return ParseOutcome::Skipped;
    }

    let mut progress = LogProgress;
    progress.job_started("parsing", 500);

    // The exclusivity window spans reload and parse so both observe one
    // consistent module universe. The handle recovers poisoning and all
    // other shared state is revision-guarded, so unwinding here is safe
    // to contain.
    let parsed = panic::catch_unwind(AssertUnwindSafe(|| {
        ctx.handle.with_parser(|parser| {
            reload::reload_dependencies(ctx.workspace.as_ref(), &ctx.unit, ignore);
            parser.parse_module(&mut progress, input, &ctx.unit)
        })
    }));

    progress.job_finished("parsing");

    let parsed = match parsed {
        Ok(parsed) => parsed,
        Err(_) => {
            tracing::error!("parser panicked while parsing {}", ctx.unit);
            return ParseOutcome::Failed(Vec::new());
        }
    };

    match parsed {
        Ok(tree) => {
            // do not reload the just-edited module (or its dependents) from
            // disk while it is still being edited
            ignore.retain_only(tree.name.clone());
            ParseOutcome::Succeeded(Arc::new(tree))
        }
        Err(failure) => classify_failure(ctx, &failure, input),
    }
}

fn classify_failure(ctx: &JobContext, failure: &ParseFailure, input: &str) -> ParseOutcome {
    if let ParseFailure::Ambiguity { forest, .. } = failure {
        // Secondary slow path: hand the full forest to the report view.
        // Strictly for visualization; it never changes this job's outcome.
        if let Err(e) = ctx.ambiguity.report_forest(ctx.unit.project(), forest) {
            tracing::warn!("ambiguity forest report failed: {:#}", e);
        }
        tracing::warn!("unexpected ambiguity while parsing {}", ctx.unit);
    }

    match translate::translate(failure, input) {
        Translated::Report(diagnostic) => {
            if let Err(e) = ctx.sink.report(diagnostic.clone()) {
                tracing::warn!("could not attach diagnostic: {:#}", e);
            }
            ParseOutcome::Failed(vec![diagnostic])
        }
        Translated::LogOnly(reason) => {
            tracing::error!("{} for {}: {}", reason, ctx.unit, failure);
            ParseOutcome::Failed(Vec::new())
        }
    }
}
