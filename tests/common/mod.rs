//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use reparse::{
    AmbiguityReporter, CollectingSink, HandlePool, ModuleLocation, ModuleParser, ModuleTree,
    ParseController, ParseFailure, ParserFactory, ProgressSink, ProjectWorkspace, SourceSpan,
    TokenCategory, TreeNode,
};

/// One scripted engine response, consumed before falling back to
/// [`derive_result`].
pub enum Step {
    Fail(ParseFailure),
    Panic,
}

pub type Script = Arc<Mutex<VecDeque<Step>>>;

/// Mock engine: pops scripted steps first, otherwise derives a result from
/// the input text (see [`derive_result`]).
pub struct ScriptedParser {
    script: Script,
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

impl ModuleParser for ScriptedParser {
    fn parse_module(
        &mut self,
        _progress: &mut dyn ProgressSink,
        input: &str,
        _location: &ModuleLocation,
    ) -> Result<ModuleTree, ParseFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let step = self.script.lock().unwrap().pop_front();
        if let Some(step) = step {
            return match step {
                Step::Fail(failure) => Err(failure),
                Step::Panic => panic!("scripted engine panic"),
            };
        }
        derive_result(input)
    }
}

pub struct ScriptedFactory {
    pub script: Script,
    pub calls: Arc<AtomicUsize>,
    pub delay: Duration,
}

impl ParserFactory for ScriptedFactory {
    fn create_parser(&self, _project: Option<&str>) -> Box<dyn ModuleParser> {
        Box::new(ScriptedParser {
            script: self.script.clone(),
            calls: self.calls.clone(),
            delay: self.delay,
        })
    }
}

/// Minimal module-language behavior:
/// - input whose last non-whitespace character is `+` fails right after
///   that `+` (at end of input when nothing follows)
/// - otherwise `module <Name> ...` succeeds with a tree named `<Name>`
///   whose root span covers the whole input
/// - anything else fails at offset 0
pub fn derive_result(input: &str) -> Result<ModuleTree, ParseFailure> {
    let char_len = input.chars().count();
    if input.trim_end().ends_with('+') {
        let chars: Vec<char> = input.chars().collect();
        let plus = chars
            .iter()
            .rposition(|&c| c == '+')
            .expect("trailing '+' just checked");
        let offset = plus + 1;
        return Err(ParseFailure::Syntax {
            offset,
            length: 1,
            begin_line: 0,
            begin_column: offset as u32,
            end_line: 0,
            end_column: offset as u32 + 1,
            message: "unexpected end of expression".into(),
        });
    }
    let name = input
        .strip_prefix("module ")
        .and_then(|rest| rest.split_whitespace().next())
        .map(|word| word.trim_end_matches(';'))
        .filter(|word| !word.is_empty());
    match name {
        Some(name) => Ok(module_tree(name, char_len)),
        None => Err(ParseFailure::Syntax {
            offset: 0,
            length: 1,
            begin_line: 0,
            begin_column: 0,
            end_line: 0,
            end_column: 1,
            message: "expected module header".into(),
        }),
    }
}

pub fn module_tree(name: &str, input_chars: usize) -> ModuleTree {
    let name_len = name.chars().count() as i32;
    ModuleTree::new(
        name,
        TreeNode::Node {
            kind: "module".into(),
            span: SourceSpan::new(0, input_chars as i32, 1, 0, 1, input_chars as u32),
            children: vec![
                TreeNode::Token {
                    category: TokenCategory::Keyword,
                    span: SourceSpan::new(0, 6, 1, 0, 1, 6),
                    text: "module".into(),
                },
                TreeNode::Token {
                    category: TokenCategory::Identifier,
                    span: SourceSpan::new(7, name_len, 1, 7, 1, 7 + name_len as u32),
                    text: name.into(),
                },
            ],
        },
    )
}

/// Workspace that records every reload call with its ignore-set snapshot.
#[derive(Default)]
pub struct RecordingWorkspace {
    pub calls: Mutex<Vec<(String, HashSet<String>)>>,
}

impl RecordingWorkspace {
    pub fn ignore_sets(&self) -> Vec<HashSet<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, ignore)| ignore.clone())
            .collect()
    }
}

impl ProjectWorkspace for RecordingWorkspace {
    fn reload_project(&self, project: &str, ignore: &HashSet<String>) -> anyhow::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((project.to_string(), ignore.clone()));
        Ok(())
    }
}

/// Reporter that records every forest handed to the visualization path.
#[derive(Default)]
pub struct RecordingReporter {
    pub forests: Mutex<Vec<(Option<String>, String)>>,
}

impl AmbiguityReporter for RecordingReporter {
    fn report_forest(&self, project: Option<&str>, forest: &ModuleTree) -> anyhow::Result<()> {
        self.forests
            .lock()
            .unwrap()
            .push((project.map(str::to_owned), forest.name.clone()));
        Ok(())
    }
}

/// A fully wired controller over the scripted engine, bound to one unit.
pub struct Harness {
    pub controller: Arc<ParseController>,
    pub sink: Arc<CollectingSink>,
    pub workspace: Arc<RecordingWorkspace>,
    pub reporter: Arc<RecordingReporter>,
    pub script: Script,
    pub calls: Arc<AtomicUsize>,
}

impl Harness {
    pub fn push(&self, step: Step) {
        self.script.lock().unwrap().push_back(step);
    }

    pub fn parse_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn build(unit: ModuleLocation, delay: Duration) -> Harness {
    let script: Script = Arc::new(Mutex::new(VecDeque::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let factory = ScriptedFactory {
        script: script.clone(),
        calls: calls.clone(),
        delay,
    };
    let workspace = Arc::new(RecordingWorkspace::default());
    let reporter = Arc::new(RecordingReporter::default());
    let sink = Arc::new(CollectingSink::new());
    let controller = ParseController::new(
        "lang",
        Arc::new(HandlePool::new(Arc::new(factory))),
        workspace.clone(),
        reporter.clone(),
    );
    controller
        .initialize(unit, sink.clone())
        .expect("test unit is valid");
    Harness {
        controller: Arc::new(controller),
        sink,
        workspace,
        reporter,
        script,
        calls,
    }
}

/// Harness bound to a module inside project "demo".
pub fn project_harness() -> Harness {
    build(ModuleLocation::in_project("demo", "src/M.lang"), Duration::ZERO)
}

/// Harness bound to a loose file outside any project.
pub fn loose_harness() -> Harness {
    build(ModuleLocation::loose("/tmp/Scratch.lang"), Duration::ZERO)
}

/// Project harness whose engine sleeps on every call, for contention tests.
pub fn slow_harness(delay: Duration) -> Harness {
    build(ModuleLocation::in_project("demo", "src/M.lang"), delay)
}
