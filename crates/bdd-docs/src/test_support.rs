//! Deterministic collaborators and filesystem helpers for tests.
//!
//! The fakes stand in for the grammar parser, the Markdown renderer and the
//! step matcher so tree and resolver behaviour can be tested without the real
//! engines.

use std::collections::HashSet;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::model::Document;
use crate::parser::{GrammarError, GrammarParser, MarkdownRenderer};
use crate::resolver::{MatchedDefinition, StepMatch, StepMatchError, StepMatcher};

/// Step matcher that recognises an exact set of step lines.
#[derive(Debug, Clone, Default)]
pub struct LineSetMatcher {
    lines: HashSet<String>,
}

impl LineSetMatcher {
    /// Match exactly the given full step lines.
    pub fn new<I>(lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl StepMatcher for LineSetMatcher {
    fn match_line(&self, line: &str) -> Result<StepMatch, StepMatchError> {
        if !self.lines.contains(line) {
            return Ok(StepMatch::unmatched());
        }
        Ok(StepMatch::matched(MatchedDefinition {
            pattern: line.to_string(),
            function: "fake_step".to_string(),
            source_path: PathBuf::from("fake_steps.rs"),
            line: 1,
            ..MatchedDefinition::default()
        }))
    }
}

/// Step matcher that fails for every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingMatcher;

impl StepMatcher for FailingMatcher {
    fn match_line(&self, line: &str) -> Result<StepMatch, StepMatchError> {
        Err(StepMatchError::new(line, "matcher offline"))
    }
}

/// Grammar parser that returns the same document for any input.
#[derive(Debug, Clone)]
pub struct FixedGrammar {
    document: Document,
}

impl FixedGrammar {
    /// Always answer with `document`.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl GrammarParser for FixedGrammar {
    fn parse(&self, _source: &str) -> Result<Document, GrammarError> {
        Ok(self.document.clone())
    }
}

/// Markdown renderer that wraps its input in `<md>` markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainMarkdown;

impl MarkdownRenderer for PlainMarkdown {
    fn to_html(&self, markdown: &str) -> String {
        format!("<md>{markdown}</md>")
    }
}

/// Create a temporary directory holding `files`.
///
/// Each entry is a path relative to the directory and the file's contents;
/// parent directories are created as needed.
///
/// # Panics
///
/// Panics if the directory or any file cannot be created.
#[must_use]
#[expect(clippy::expect_used, reason = "test helper fails loudly on setup errors")]
pub fn write_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for (relative, contents) in files {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent directories");
        }
        std::fs::write(&path, contents).expect("write file");
    }
    dir
}
