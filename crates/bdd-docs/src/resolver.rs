//! Step implementation status.
//!
//! Every step is submitted to a [`StepMatcher`] as its keyword and text
//! concatenated verbatim. A scenario-like child is implemented when all of
//! its steps match; a feature when all of its children are. Optional
//! `Implemented` / `Not Implemented` tags are appended only after those flags
//! have been derived, so the synthetic tags never influence them.

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::model::{Document, ScenarioChild, Step};

/// Tag appended to implemented steps and scenarios.
pub const IMPLEMENTED_TAG: &str = "Implemented";

/// Tag appended to steps and scenarios lacking an implementation.
pub const NOT_IMPLEMENTED_TAG: &str = "Not Implemented";

/// Outcome of matching one step line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepMatch {
    /// Whether any step definition matched.
    pub step_match: bool,
    /// The matching definition, when there is one.
    pub definition: Option<MatchedDefinition>,
}

impl StepMatch {
    /// A result reporting no match.
    #[must_use]
    pub fn unmatched() -> Self {
        Self::default()
    }

    /// A result reporting a match against `definition`.
    #[must_use]
    pub fn matched(definition: MatchedDefinition) -> Self {
        Self {
            step_match: true,
            definition: Some(definition),
        }
    }
}

/// Where a matched step is implemented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedDefinition {
    /// Keyword the definition was registered under.
    pub keyword: String,
    /// Pattern the definition registered.
    pub pattern: String,
    /// Whether the pattern was derived from the function name.
    pub pattern_inferred: bool,
    /// Fully qualified function name within its source file.
    pub function: String,
    /// Source file of the definition.
    pub source_path: PathBuf,
    /// 1-based line of the function signature.
    pub line: u32,
    /// Placeholder values captured from the step text.
    pub captures: Vec<String>,
}

/// Failure raised by a step matcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("step matcher failed for '{line}': {message}")]
pub struct StepMatchError {
    /// The step line being matched.
    pub line: String,
    /// Description of the failure.
    pub message: String,
}

impl StepMatchError {
    /// Describe a failure for `line`.
    #[must_use]
    pub fn new(line: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            message: message.into(),
        }
    }
}

/// Matches full step lines against step implementations.
pub trait StepMatcher {
    /// Match a step line such as `"Given a registered user"`.
    ///
    /// # Errors
    ///
    /// Returns [`StepMatchError`] when the matcher cannot decide.
    fn match_line(&self, line: &str) -> Result<StepMatch, StepMatchError>;
}

/// The synthetic tag describing an implementation flag.
#[must_use]
pub fn implementation_tag(implemented: bool) -> &'static str {
    if implemented {
        IMPLEMENTED_TAG
    } else {
        NOT_IMPLEMENTED_TAG
    }
}

/// Resolves and aggregates step implementation status.
pub struct StepImplementationResolver {
    matcher: Box<dyn StepMatcher>,
    add_implemented_tags: bool,
}

impl StepImplementationResolver {
    /// Create a resolver around `matcher`.
    pub fn new(matcher: impl StepMatcher + 'static, add_implemented_tags: bool) -> Self {
        Self {
            matcher: Box::new(matcher),
            add_implemented_tags,
        }
    }

    /// Match a single step.
    ///
    /// # Errors
    ///
    /// Propagates the matcher's failure.
    pub fn resolve(&self, step: &Step) -> Result<StepMatch, StepMatchError> {
        let line = step.line();
        let result = self.matcher.match_line(&line)?;
        if !result.step_match {
            debug!(%line, "no step definition matched");
        }
        Ok(result)
    }

    /// Resolve every step of `scenario`, then set its `implemented` flag.
    ///
    /// With implementation tags enabled, each step is tagged with the running
    /// result up to and including itself: once a step is unmatched, it and
    /// every later step are tagged `Not Implemented`.
    ///
    /// # Errors
    ///
    /// Propagates the first matcher failure.
    pub fn resolve_scenario(&self, scenario: &mut ScenarioChild) -> Result<bool, StepMatchError> {
        for step in &mut scenario.steps {
            step.implementation = Some(self.resolve(step)?);
        }
        let implemented = scenario.steps.iter().all(step_matched);
        scenario.implemented = implemented;

        if self.add_implemented_tags {
            let mut implemented_so_far = true;
            for step in &mut scenario.steps {
                implemented_so_far &= step_matched(step);
                step.tags.push(implementation_tag(implemented_so_far).to_string());
            }
            scenario.tags.push(implementation_tag(implemented).to_string());
        }
        Ok(implemented)
    }

    /// Resolve every child of `document`, then set its `implemented` flag.
    ///
    /// Every child is resolved even after one turns out unimplemented.
    ///
    /// # Errors
    ///
    /// Propagates the first matcher failure.
    pub fn resolve_document(&self, document: &mut Document) -> Result<bool, StepMatchError> {
        let mut implemented = true;
        for child in &mut document.children {
            implemented &= self.resolve_scenario(child)?;
        }
        document.implemented = implemented;
        Ok(implemented)
    }
}

fn step_matched(step: &Step) -> bool {
    step.implementation
        .as_ref()
        .is_some_and(|result| result.step_match)
}
