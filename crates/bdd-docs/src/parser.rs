//! Feature file parsing.
//!
//! [`FeatureDocumentParser`] reads a `.feature` file, hands the text to a
//! [`GrammarParser`] and converts the feature's and every child's description
//! from Markdown to HTML through a [`MarkdownRenderer`]. Both collaborators
//! are injected so tests can substitute deterministic fakes; the defaults use
//! the `gherkin` crate and `pulldown-cmark`.
//!
//! Scenarios nested in a `Rule` are flattened into the feature's children,
//! carrying the rule's name and appending the rule's tags to their own.

use std::path::{Path, PathBuf};

use gherkin::GherkinEnv;
use thiserror::Error;

use crate::model::{ChildKind, Document, Examples, ScenarioChild, Step, StepArgument};

/// Feature text rejected by the grammar parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GrammarError {
    /// Parser diagnostic.
    pub message: String,
}

impl GrammarError {
    /// Wrap a parser diagnostic.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<gherkin::ParseError> for GrammarError {
    fn from(err: gherkin::ParseError) -> Self {
        Self::new(err.to_string())
    }
}

/// Errors raised while turning a feature file into a [`Document`].
///
/// The tree builder recovers from all of them.
#[derive(Debug, Error)]
pub enum FeatureParseError {
    /// The feature file could not be read.
    #[error("failed to read feature file {}: {source}", path.display())]
    Read {
        /// Path of the feature file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The grammar parser rejected the feature text.
    #[error("failed to parse feature file {}: {source}", path.display())]
    Grammar {
        /// Path of the feature file.
        path: PathBuf,
        /// Parser diagnostic.
        #[source]
        source: GrammarError,
    },
}

/// Parses feature text into a [`Document`] with Markdown descriptions.
pub trait GrammarParser {
    /// Parse the complete text of one feature file.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError`] when the text is not valid Gherkin.
    fn parse(&self, source: &str) -> Result<Document, GrammarError>;
}

/// Converts Markdown to HTML.
pub trait MarkdownRenderer {
    /// Render `markdown` as an HTML fragment.
    fn to_html(&self, markdown: &str) -> String;
}

/// [`GrammarParser`] backed by the `gherkin` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct GherkinParser;

impl GrammarParser for GherkinParser {
    fn parse(&self, source: &str) -> Result<Document, GrammarError> {
        let mut text = source.to_owned();
        normalise_trailing_newline(&mut text);
        let feature = gherkin::Feature::parse(text.as_str(), GherkinEnv::default())?;
        Ok(convert_feature(feature))
    }
}

/// [`MarkdownRenderer`] backed by `pulldown-cmark`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMarkRenderer;

impl MarkdownRenderer for CommonMarkRenderer {
    fn to_html(&self, markdown: &str) -> String {
        let parser = pulldown_cmark::Parser::new(markdown);
        let mut html = String::with_capacity(markdown.len());
        pulldown_cmark::html::push_html(&mut html, parser);
        html
    }
}

/// Reads and parses feature files.
pub struct FeatureDocumentParser {
    grammar: Box<dyn GrammarParser>,
    markdown: Box<dyn MarkdownRenderer>,
}

impl Default for FeatureDocumentParser {
    fn default() -> Self {
        Self::new(GherkinParser, CommonMarkRenderer)
    }
}

impl FeatureDocumentParser {
    /// Create a parser from its two collaborators.
    pub fn new(
        grammar: impl GrammarParser + 'static,
        markdown: impl MarkdownRenderer + 'static,
    ) -> Self {
        Self {
            grammar: Box::new(grammar),
            markdown: Box::new(markdown),
        }
    }

    /// Read and parse the feature file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureParseError`] when the file cannot be read or parsed.
    pub fn parse_feature(&self, path: &Path) -> Result<Document, FeatureParseError> {
        let source = std::fs::read_to_string(path).map_err(|source| FeatureParseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_source(&source)
            .map_err(|source| FeatureParseError::Grammar {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Parse feature text, converting descriptions to HTML.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError`] when the grammar parser rejects the text.
    pub fn parse_source(&self, source: &str) -> Result<Document, GrammarError> {
        let mut document = self.grammar.parse(source)?;
        document.description = self.markdown.to_html(&document.description);
        for child in &mut document.children {
            child.description = self.markdown.to_html(&child.description);
        }
        Ok(document)
    }
}

fn normalise_trailing_newline(text: &mut String) {
    if !text.ends_with('\n') {
        text.push('\n');
    }
}

fn convert_feature(feature: gherkin::Feature) -> Document {
    let mut children = Vec::new();
    if let Some(background) = feature.background {
        children.push(convert_background(background, None));
    }
    children.extend(
        feature
            .scenarios
            .into_iter()
            .map(|scenario| convert_scenario(scenario, None, &[])),
    );
    for rule in feature.rules {
        if let Some(background) = rule.background {
            children.push(convert_background(background, Some(rule.name.as_str())));
        }
        for scenario in rule.scenarios {
            children.push(convert_scenario(scenario, Some(rule.name.as_str()), &rule.tags));
        }
    }

    Document {
        keyword: feature.keyword,
        name: feature.name,
        description: feature.description.unwrap_or_default(),
        tags: feature.tags,
        children,
        implemented: false,
    }
}

fn convert_background(background: gherkin::Background, rule: Option<&str>) -> ScenarioChild {
    ScenarioChild {
        kind: ChildKind::Background,
        keyword: background.keyword,
        name: background.name,
        description: background.description.unwrap_or_default(),
        rule: rule.map(str::to_owned),
        steps: background.steps.into_iter().map(convert_step).collect(),
        ..ScenarioChild::default()
    }
}

fn convert_scenario(
    scenario: gherkin::Scenario,
    rule: Option<&str>,
    rule_tags: &[String],
) -> ScenarioChild {
    let kind = if scenario.examples.is_empty() {
        ChildKind::Scenario
    } else {
        ChildKind::ScenarioOutline
    };
    let mut tags = scenario.tags;
    tags.extend_from_slice(rule_tags);

    ScenarioChild {
        kind,
        keyword: scenario.keyword,
        name: scenario.name,
        description: scenario.description.unwrap_or_default(),
        rule: rule.map(str::to_owned),
        tags,
        steps: scenario.steps.into_iter().map(convert_step).collect(),
        examples: scenario
            .examples
            .into_iter()
            .map(|examples| Examples {
                keyword: examples.keyword,
                tags: examples.tags,
                rows: examples.table.map(|table| table.rows).unwrap_or_default(),
            })
            .collect(),
        ..ScenarioChild::default()
    }
}

fn convert_step(step: gherkin::Step) -> Step {
    let argument = match (step.docstring, step.table) {
        (Some(content), _) => Some(StepArgument::DocString { content }),
        (None, Some(table)) => Some(StepArgument::DataTable { rows: table.rows }),
        (None, None) => None,
    };

    Step {
        keyword: format!("{} ", step.keyword.trim_end()),
        text: step.value,
        argument,
        ..Step::default()
    }
}
