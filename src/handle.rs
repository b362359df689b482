//! Exclusive access to the shared parser instance
//!
//! One evaluator exists per project (plus one for loose files), and many
//! parse jobs share it. All access funnels through [`ParserHandle::with_parser`]
//! so no caller ever observes a torn evaluator state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::engine::{ModuleParser, ParserFactory};

/// Mutex-guarded owner of one shared parser/evaluator instance.
pub struct ParserHandle {
    parser: Mutex<Box<dyn ModuleParser>>,
}

impl ParserHandle {
    pub fn new(parser: Box<dyn ModuleParser>) -> Self {
        Self {
            parser: Mutex::new(parser),
        }
    }

    /// Run `op` with exclusive access to the parser. Concurrent callers
    /// block until the current holder releases.
    ///
    /// A panicked `op` must not wedge every later parse, so lock poisoning
    /// is recovered rather than propagated.
    pub fn with_parser<T>(&self, op: impl FnOnce(&mut dyn ModuleParser) -> T) -> T {
        let mut parser = self.parser.lock().unwrap_or_else(PoisonError::into_inner);
        op(parser.as_mut())
    }
}

/// Lazily creates and caches one [`ParserHandle`] per project.
///
/// The `None` key is the shared loose-file context. Handles live for the
/// editor session; repeated lookups return the same `Arc`.
pub struct HandlePool {
    factory: Arc<dyn ParserFactory>,
    handles: Mutex<HashMap<Option<String>, Arc<ParserHandle>>>,
}

impl HandlePool {
    pub fn new(factory: Arc<dyn ParserFactory>) -> Self {
        Self {
            factory,
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub fn handle_for(&self, project: Option<&str>) -> Arc<ParserHandle> {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles
            .entry(project.map(str::to_owned))
            .or_insert_with(|| {
                tracing::debug!(
                    "creating parser for {}",
                    project.unwrap_or("loose files")
                );
                Arc::new(ParserHandle::new(self.factory.create_parser(project)))
            })
            .clone()
    }
}
