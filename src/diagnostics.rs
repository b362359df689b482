//! Positional diagnostics and the sink they are surfaced through
//!
//! Diagnostics for a unit are always *replaced*, never accumulated: every
//! parse clears the sink before reporting its own result, so the sink holds
//! exactly the latest outcome's diagnostics.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::location::SourceSpan;

/// One positional diagnostic in the public form consumed by editors.
///
/// Invariant: `offset`, `length` and the line/column values are never
/// negative; lines are 1-based. Failures that report no usable position
/// degrade to the sentinel location instead (see [`Diagnostic::positioned`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub offset: usize,
    pub length: usize,
    pub begin_line: u32,
    pub begin_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub message: String,
}

impl Diagnostic {
    /// Build a diagnostic from a parser-reported span.
    ///
    /// A span whose offset is negative carries no usable position; the
    /// diagnostic then lands on the fixed sentinel location `(0,0,0,0,1,1)`
    /// rather than failing.
    pub fn positioned(span: &SourceSpan, message: impl Into<String>) -> Self {
        if !span.has_position() {
            return Self::sentinel(message);
        }
        Self {
            offset: span.offset as usize,
            length: span.length.max(0) as usize,
            begin_line: span.begin_line,
            begin_column: span.begin_column,
            end_line: span.end_line,
            end_column: span.end_column,
            message: message.into(),
        }
    }

    /// The fixed fallback location for failures without position info.
    pub fn sentinel(message: impl Into<String>) -> Self {
        Self {
            offset: 0,
            length: 0,
            begin_line: 1,
            begin_column: 0,
            end_line: 1,
            end_column: 0,
            message: message.into(),
        }
    }

    /// Inclusive end offset: the last character covered by this diagnostic,
    /// or `offset` itself for zero-length diagnostics.
    pub fn end_offset(&self) -> usize {
        if self.length == 0 {
            self.offset
        } else {
            self.offset + self.length - 1
        }
    }
}

/// Where diagnostics for the bound unit end up (editor markers, an LSP
/// publish call, an in-memory list).
///
/// `clear` wipes everything previously attached for the unit and must be
/// idempotent; the coordinator calls it at the start of every parse.
/// Failures from either method are logged by the coordinator and never
/// propagate into a parse result.
pub trait DiagnosticsSink: Send + Sync {
    fn clear(&self) -> anyhow::Result<()>;
    fn report(&self, diagnostic: Diagnostic) -> anyhow::Result<()>;
}

/// In-memory sink for hosts and tests that keep diagnostics in a list.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the currently attached diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl DiagnosticsSink for CollectingSink {
    fn clear(&self) -> anyhow::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }

    fn report(&self, diagnostic: Diagnostic) -> anyhow::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
        Ok(())
    }
}
