//! Run orchestration.
//!
//! A run builds the tree, flattens its scenarios and indexes their tags, in
//! that order. Nothing is cached between runs.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::DocsConfig;
use crate::error::DocsError;
use crate::model::TreeNode;
use crate::parser::FeatureDocumentParser;
use crate::resolver::StepImplementationResolver;
use crate::steps::StepRegistry;
use crate::tags::{self, TagIndex};
use crate::tree::DirectoryTreeBuilder;

/// The documentation tree plus its tag index, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentationSite {
    /// Tree mirroring the source directory.
    pub root: TreeNode,
    /// Flattened scenarios grouped by tag.
    #[serde(flatten)]
    pub index: TagIndex,
}

impl DocumentationSite {
    /// Serialise the site as JSON, pretty-printed when `pretty` is set.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError::Serialise`] if serialisation fails.
    pub fn to_json(&self, pretty: bool) -> Result<String, DocsError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Builds documentation sites with a fixed parser and resolver.
pub struct DocsProcessor {
    parser: FeatureDocumentParser,
    resolver: StepImplementationResolver,
}

impl DocsProcessor {
    /// Create a processor from explicit collaborators.
    #[must_use]
    pub fn new(parser: FeatureDocumentParser, resolver: StepImplementationResolver) -> Self {
        Self { parser, resolver }
    }

    /// Create a processor whose resolver matches steps against the
    /// definitions found in `config.steps`.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError::StepIndex`] when a step source cannot be indexed.
    pub fn from_config(config: &DocsConfig) -> Result<Self, DocsError> {
        let registry = StepRegistry::from_sources(&config.steps)?;
        Ok(Self::new(
            FeatureDocumentParser::default(),
            StepImplementationResolver::new(registry, config.add_implemented_tags),
        ))
    }

    /// Build the documentation site for the directory at `root`.
    ///
    /// Output paths mirror `root`'s location relative to its parent under
    /// `output_root`.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError`] on filesystem or step matcher failures.
    pub fn process(&self, root: &Path, output_root: &Path) -> Result<DocumentationSite, DocsError> {
        let base_dir = root.parent().unwrap_or_else(|| Path::new(""));
        let builder = DirectoryTreeBuilder::new(&self.parser, &self.resolver, output_root, base_dir);

        let tree = builder.build(root)?;
        let index = tags::index(tree.scenarios());
        info!(
            root = %root.display(),
            scenarios = index.scenaria().len(),
            tags = index.tags().len(),
            "documentation tree built"
        );

        Ok(DocumentationSite { root: tree, index })
    }
}

/// Build the documentation site for `root` using `config`.
///
/// # Errors
///
/// Returns [`DocsError`] when step sources cannot be indexed or the run
/// fails.
pub fn process(
    root: &Path,
    output_root: &Path,
    config: &DocsConfig,
) -> Result<DocumentationSite, DocsError> {
    DocsProcessor::from_config(config)?.process(root, output_root)
}
