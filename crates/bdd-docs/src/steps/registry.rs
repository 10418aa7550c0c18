//! Compiled step-definition registry.
//!
//! The registry is built once per run from the configured step sources. Each
//! definition's pattern is compiled with `bdd-docs-patterns`; patterns that
//! fail to compile are logged and skipped so the remaining definitions still
//! register. Definitions keep registration order, which decides the winner
//! when several patterns match the same step.

use std::path::{Path, PathBuf};

use bdd_docs_patterns::{PatternError, StepKeyword, compile_regex_from_pattern, split_step_line};
use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{FunctionId, StepDefinition, StepIndexError, StepSourceIndex, index_rust_file};
use crate::resolver::{MatchedDefinition, StepMatch, StepMatchError, StepMatcher};

/// A step definition with a compiled regular expression.
#[derive(Debug, Clone)]
pub struct CompiledStepDefinition {
    /// Keyword selected by the step attribute.
    pub keyword: StepKeyword,
    /// Original pattern string.
    pub pattern: String,
    /// Whether the pattern was inferred from the function name.
    pub pattern_inferred: bool,
    /// Anchored regular expression matching step text.
    pub regex: Regex,
    /// The implementing function.
    pub function: FunctionId,
    /// Rust source file containing the definition.
    pub source_path: PathBuf,
    /// 1-based line of the function signature.
    pub line: u32,
}

/// Error raised when a step pattern cannot be compiled.
#[derive(Debug, thiserror::Error)]
#[error("failed to compile step pattern '{pattern}' for {keyword} step '{function}' in {path}: {source}")]
pub struct StepPatternCompileError {
    /// Rust source file containing the step.
    pub path: Box<str>,
    /// Fully qualified function name.
    pub function: Box<str>,
    /// Step keyword.
    pub keyword: StepKeyword,
    /// The original pattern string.
    pub pattern: Box<str>,
    /// The underlying pattern compilation error.
    #[source]
    pub source: PatternError,
}

impl StepPatternCompileError {
    fn new(path: &Path, step: &StepDefinition, source: PatternError) -> Self {
        Self {
            path: path.display().to_string().into_boxed_str(),
            function: step.function.to_string().into_boxed_str(),
            keyword: step.keyword,
            pattern: step.pattern.clone().into_boxed_str(),
            source,
        }
    }
}

/// Ordered collection of compiled step definitions.
#[derive(Debug, Default)]
pub struct StepRegistry {
    definitions: Vec<CompiledStepDefinition>,
}

impl StepRegistry {
    /// Index and compile every step definition under `sources`.
    ///
    /// Each source is a Rust file or a directory searched recursively for
    /// `*.rs` files in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`StepIndexError`] when a source cannot be read or parsed.
    pub fn from_sources(sources: &[PathBuf]) -> Result<Self, StepIndexError> {
        let mut registry = Self::default();
        for source in sources {
            for path in rust_files(source)? {
                let index = index_rust_file(&path)?;
                for err in registry.add_index(&index) {
                    warn!(error = %err, "skipping step definition");
                }
            }
        }
        debug!(definitions = registry.len(), "step registry ready");
        Ok(registry)
    }

    /// Compile and append the definitions of one indexed source file.
    ///
    /// Returns the patterns that failed to compile; those definitions are
    /// not registered.
    pub fn add_index(&mut self, index: &StepSourceIndex) -> Vec<StepPatternCompileError> {
        let mut errors = Vec::new();
        for step in &index.step_definitions {
            match compile_step_definition(&index.path, step) {
                Ok(compiled) => self.definitions.push(compiled),
                Err(err) => errors.push(err),
            }
        }
        errors
    }

    /// Registered definitions, in registration order.
    #[must_use]
    pub fn definitions(&self) -> &[CompiledStepDefinition] {
        &self.definitions
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no definitions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Find the first definition matching `text`.
    ///
    /// A primary keyword restricts the search to definitions registered
    /// under it; a conjunction or no keyword searches every definition.
    #[must_use]
    pub fn find(
        &self,
        keyword: Option<StepKeyword>,
        text: &str,
    ) -> Option<(&CompiledStepDefinition, Vec<String>)> {
        self.definitions
            .iter()
            .filter(|definition| match keyword {
                Some(keyword) if !keyword.is_conjunction() => definition.keyword == keyword,
                _ => true,
            })
            .find_map(|definition| {
                let captures = definition.regex.captures(text)?;
                let values = captures
                    .iter()
                    .skip(1)
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_owned()))
                    .collect();
                Some((definition, values))
            })
    }
}

impl StepMatcher for StepRegistry {
    fn match_line(&self, line: &str) -> Result<StepMatch, StepMatchError> {
        let (keyword, text) = split_step_line(line);
        Ok(self
            .find(keyword, text)
            .map_or_else(StepMatch::unmatched, |(definition, captures)| {
                StepMatch::matched(MatchedDefinition {
                    keyword: definition.keyword.to_string(),
                    pattern: definition.pattern.clone(),
                    pattern_inferred: definition.pattern_inferred,
                    function: definition.function.to_string(),
                    source_path: definition.source_path.clone(),
                    line: definition.line,
                    captures,
                })
            }))
    }
}

fn rust_files(source: &Path) -> Result<Vec<PathBuf>, StepIndexError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|err| StepIndexError::Read {
            path: err.path().unwrap_or(source).to_path_buf(),
            source: err.into(),
        })?;
        let is_rust = entry.path().extension().is_some_and(|ext| ext == "rs");
        if entry.file_type().is_file() && (is_rust || entry.depth() == 0) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn compile_step_definition(
    path: &Path,
    step: &StepDefinition,
) -> Result<CompiledStepDefinition, StepPatternCompileError> {
    let regex = compile_regex_from_pattern(&step.pattern)
        .map_err(|err| StepPatternCompileError::new(path, step, err))?;

    Ok(CompiledStepDefinition {
        keyword: step.keyword,
        pattern: step.pattern.clone(),
        pattern_inferred: step.pattern_inferred,
        regex,
        function: step.function.clone(),
        source_path: path.to_path_buf(),
        line: step.line,
    })
}
