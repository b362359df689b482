//! Background re-parse coordination for editors embedding a stateful
//! module parser.
//!
//! An editor that re-parses on every keystroke needs more than a parser
//! call: the evaluator is shared and stateful, parsing one module may
//! require reloading its project siblings, and failures of several kinds
//! must come back as positional diagnostics instead of crashes. This crate
//! is that coordination layer.
//!
//! ## Architecture
//!
//! ```text
//! edit → ParseController::parse(text) → ParseRequest → (worker thread)
//!      → reload guard → parser (handle-exclusive) → translate failures
//!      → retained tree updated → caller unblocks
//! ```
//!
//! The parser engine, the project system, and the ambiguity report view are
//! external collaborators behind the traits in [`engine`].

pub mod controller;
pub mod diagnostics;
pub mod engine;
pub mod handle;
pub mod job;
pub mod location;
pub mod reload;
pub mod trace;
mod translate;
pub mod tree;

// Re-export commonly used types
pub use controller::{ControllerError, ParseController};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticsSink};
pub use engine::{
    AmbiguityReporter, LogProgress, ModuleParser, NoopReporter, NoopWorkspace, ParseFailure,
    ParserFactory, ProgressSink, ProjectWorkspace,
};
pub use handle::{HandlePool, ParserHandle};
pub use job::ParseOutcome;
pub use location::{LocationError, ModuleLocation, SourceSpan};
pub use reload::IgnoreSet;
pub use tree::{ModuleTree, TokenCategory, TokenView, Tokens, TreeNode};
