//! Collaborator seams around the opaque parser/evaluator
//!
//! The grammar engine, the project/dependency system, and the ambiguity
//! report view all live outside this crate. Hosts implement these traits;
//! the coordinator only ever talks through them.

use std::collections::HashSet;

use thiserror::Error;

use crate::location::{ModuleLocation, SourceSpan};
use crate::tree::ModuleTree;

/// The shared, stateful parser/evaluator instance.
///
/// Parsing mutates evaluator state (loaded modules, syntax extensions), so
/// the method takes `&mut self`; exclusivity is enforced by
/// [`crate::handle::ParserHandle`], never by the engine itself.
pub trait ModuleParser: Send {
    fn parse_module(
        &mut self,
        progress: &mut dyn ProgressSink,
        input: &str,
        location: &ModuleLocation,
    ) -> Result<ModuleTree, ParseFailure>;
}

/// Builds one evaluator per project (or one for loose files) on demand.
/// Consulted by [`crate::handle::HandlePool`] the first time a project is
/// seen.
pub trait ParserFactory: Send + Sync {
    fn create_parser(&self, project: Option<&str>) -> Box<dyn ModuleParser>;
}

/// The project/dependency system.
pub trait ProjectWorkspace: Send + Sync {
    /// Reload the project's other modules so syntax definitions declared
    /// there become visible to the parser, skipping every module named in
    /// `ignore`.
    fn reload_project(&self, project: &str, ignore: &HashSet<String>) -> anyhow::Result<()>;
}

/// Secondary, slower full-forest path used purely for visualizing ambiguous
/// parses. Its outcome never feeds back into a parse result.
pub trait AmbiguityReporter: Send + Sync {
    fn report_forest(&self, project: Option<&str>, forest: &ModuleTree) -> anyhow::Result<()>;
}

/// Parse-time progress and warning callbacks handed to the engine.
pub trait ProgressSink {
    fn job_started(&mut self, _name: &str, _work: usize) {}
    fn job_finished(&mut self, _name: &str) {}
    fn warning(&mut self, _message: &str, _span: Option<SourceSpan>) {}
}

/// Progress sink that forwards everything to structured logging.
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn job_started(&mut self, name: &str, work: usize) {
        tracing::debug!("{} started ({} work units)", name, work);
    }

    fn job_finished(&mut self, name: &str) {
        tracing::debug!("{} finished", name);
    }

    fn warning(&mut self, message: &str, span: Option<SourceSpan>) {
        match span {
            Some(span) => tracing::warn!(
                "parse warning at {}:{}: {}",
                span.begin_line,
                span.begin_column,
                message
            ),
            None => tracing::warn!("parse warning: {}", message),
        }
    }
}

/// Workspace for hosts without a project system (loose files only).
#[derive(Debug, Default)]
pub struct NoopWorkspace;

impl ProjectWorkspace for NoopWorkspace {
    fn reload_project(&self, _project: &str, _ignore: &HashSet<String>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Reporter for hosts without an ambiguity view.
#[derive(Debug, Default)]
pub struct NoopReporter;

impl AmbiguityReporter for NoopReporter {
    fn report_forest(&self, _project: Option<&str>, _forest: &ModuleTree) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Everything the engine can fail with, one variant per failure kind.
///
/// Line/column conventions differ by origin: `Syntax` carries parser-native
/// 0-based lines (translated to the public 1-based form later), while the
/// [`SourceSpan`]-carrying variants are already 1-based.
#[derive(Debug, Error)]
pub enum ParseFailure {
    /// The parser could not continue at a concrete input position.
    #[error("parse error at offset {offset}: {message}")]
    Syntax {
        /// Character offset into the input; may equal the input length when
        /// the parser ran off the end
        offset: usize,
        length: usize,
        begin_line: u32,
        begin_column: u32,
        end_line: u32,
        end_column: u32,
        message: String,
    },
    /// A static/semantic check failed while loading the module. The
    /// location may lack offset information entirely.
    #[error("static error: {message}")]
    Static {
        location: Option<SourceSpan>,
        message: String,
    },
    /// The evaluator raised a runtime condition while parsing.
    #[error("runtime error raised during parsing: {message}")]
    Runtime {
        location: SourceSpan,
        message: String,
    },
    /// The grammar produced more than one tree; `forest` is the full
    /// ambiguous parse forest for the report view.
    #[error("ambiguity detected: {message}")]
    Ambiguity {
        location: SourceSpan,
        message: String,
        forest: ModuleTree,
    },
    /// Anything the engine could not classify. Never surfaced to the
    /// editor, only logged.
    #[error("internal parser failure: {message}")]
    Internal { message: String },
}
