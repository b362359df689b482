//! Source unit identity and positional records
//!
//! A source unit is either a loose file (absolute path, no project) or a
//! module inside a project (project name plus a project-relative path).
//! Everything positional that crosses the parser boundary travels as a
//! [`SourceSpan`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of the source unit a controller is bound to.
///
/// Invariant (checked by [`ModuleLocation::validate`]): an absolute path with
/// no project, or a project-relative path with a project. The unit is
/// immutable once a controller has been initialized with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleLocation {
    /// Owning project, or `None` for a loose file
    pub project: Option<String>,
    /// Absolute path (loose file) or project-relative path
    pub path: PathBuf,
}

/// Violation of the loose-file/project path invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("loose file path is not absolute: {0}")]
    RelativeWithoutProject(PathBuf),
    #[error("project module path must be project-relative: {0}")]
    AbsoluteWithinProject(PathBuf),
}

impl ModuleLocation {
    /// A loose file outside any project. The path should be absolute.
    pub fn loose(path: impl Into<PathBuf>) -> Self {
        Self {
            project: None,
            path: path.into(),
        }
    }

    /// A module inside a project. The path should be project-relative.
    pub fn in_project(project: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            project: Some(project.into()),
            path: path.into(),
        }
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check the loose-file/project invariant.
    pub fn validate(&self) -> Result<(), LocationError> {
        match &self.project {
            None if !self.path.is_absolute() => {
                Err(LocationError::RelativeWithoutProject(self.path.clone()))
            }
            Some(_) if self.path.is_absolute() => {
                Err(LocationError::AbsoluteWithinProject(self.path.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Whether a parse can currently address this unit. A relative path with
    /// no project context cannot be resolved (the project may have been
    /// deleted out from under the editor).
    pub fn is_resolvable(&self) -> bool {
        self.path.is_absolute() || self.project.is_some()
    }
}

impl fmt::Display for ModuleLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.project {
            Some(project) => write!(f, "project://{}/{}", project, self.path.display()),
            None => write!(f, "file://{}", self.path.display()),
        }
    }
}

/// Positional record attached to parser failures and tree nodes.
///
/// Lines and columns are the public 1-based/0-based form (lines start at 1,
/// columns at 0). A negative `offset` means "no position available"; see
/// [`crate::diagnostics::Diagnostic::positioned`] for how such spans degrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub offset: i32,
    pub length: i32,
    pub begin_line: u32,
    pub begin_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceSpan {
    pub fn new(
        offset: i32,
        length: i32,
        begin_line: u32,
        begin_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Self {
        Self {
            offset,
            length,
            begin_line,
            begin_column,
            end_line,
            end_column,
        }
    }

    /// A span that carries line information but no usable offset.
    pub fn unpositioned() -> Self {
        Self::new(-1, 0, 0, 0, 0, 0)
    }

    pub fn has_position(&self) -> bool {
        self.offset >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_absolute_path_is_valid() {
        let unit = ModuleLocation::loose("/home/user/Scratch.lang");
        assert!(unit.validate().is_ok());
        assert!(unit.is_resolvable());
    }

    #[test]
    fn loose_relative_path_is_rejected() {
        let unit = ModuleLocation::loose("Scratch.lang");
        assert_eq!(
            unit.validate(),
            Err(LocationError::RelativeWithoutProject("Scratch.lang".into()))
        );
        assert!(!unit.is_resolvable());
    }

    #[test]
    fn project_relative_path_is_valid() {
        let unit = ModuleLocation::in_project("demo", "src/Main.lang");
        assert!(unit.validate().is_ok());
        assert!(unit.is_resolvable());
    }

    #[test]
    fn project_absolute_path_is_rejected() {
        let unit = ModuleLocation::in_project("demo", "/src/Main.lang");
        assert_eq!(
            unit.validate(),
            Err(LocationError::AbsoluteWithinProject("/src/Main.lang".into()))
        );
    }

    #[test]
    fn display_distinguishes_projects_from_loose_files() {
        assert_eq!(
            ModuleLocation::in_project("demo", "src/Main.lang").to_string(),
            "project://demo/src/Main.lang"
        );
        assert_eq!(
            ModuleLocation::loose("/tmp/Scratch.lang").to_string(),
            "file:///tmp/Scratch.lang"
        );
    }

    #[test]
    fn unpositioned_span_has_no_position() {
        assert!(!SourceSpan::unpositioned().has_position());
        assert!(SourceSpan::new(0, 1, 1, 0, 1, 1).has_position());
    }
}
