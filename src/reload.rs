//! Dependency reload with edit-loop suppression
//!
//! Before a parse, the project's other modules are reloaded so syntax
//! extensions defined elsewhere are visible. The module currently being
//! edited (and whatever depends on it) must be skipped: the in-editor
//! buffer, not the last-saved file, is authoritative while an edit is in
//! progress.

use std::collections::HashSet;

use crate::engine::ProjectWorkspace;
use crate::location::ModuleLocation;

/// Module names exempt from dependency reload.
///
/// Empty until the first successful parse; afterwards it contains exactly
/// the name of the most recently parsed module. Only a successful parse
/// mutates it.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    names: HashSet<String>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &HashSet<String> {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Drop every previously protected name and protect `name` alone.
    pub fn retain_only(&mut self, name: impl Into<String>) {
        self.names.clear();
        self.names.insert(name.into());
    }
}

/// Reload the unit's project, honoring the ignore-set. No-op for loose
/// files. Reload failures are non-fatal: the parse proceeds against the
/// module universe the evaluator already has.
pub(crate) fn reload_dependencies(
    workspace: &dyn ProjectWorkspace,
    unit: &ModuleLocation,
    ignore: &IgnoreSet,
) {
    let Some(project) = unit.project() else {
        return;
    };
    if let Err(e) = workspace.reload_project(project, ignore.names()) {
        tracing::warn!("dependency reload failed for {}: {:#}", project, e);
    }
}
