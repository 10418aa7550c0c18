//! Document tree handed to the rendering layer.
//!
//! The tree mirrors the source directory: one [`TreeNode`] per filesystem
//! entry. Parsed feature files carry a [`Document`] whose scenario-like
//! children hold steps annotated with their implementation status. All types
//! serialise to camel-cased JSON with a `type` discriminator on nodes.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::resolver::StepMatch;

/// File-name suffix that marks a Gherkin feature file.
pub const FEATURE_SUFFIX: &str = ".feature";

/// One filesystem entry in the documentation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    /// A directory and its entries, in filesystem listing order.
    Directory(DirectoryNode),
    /// A successfully parsed feature file.
    FeatureFile(FeatureFileNode),
    /// Any other file, including feature files that failed to parse.
    File(FileNode),
}

/// A directory node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryNode {
    /// Source path of the directory.
    pub path: PathBuf,
    /// Final path component.
    pub name: String,
    /// Slash-separated path relative to the base directory.
    pub toc_name: String,
    /// Mirrored location under the output root.
    pub write_path: PathBuf,
    /// Child entries.
    pub children: Vec<TreeNode>,
}

/// A parsed feature file node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFileNode {
    /// Source path of the feature file.
    pub path: PathBuf,
    /// Final path component.
    pub name: String,
    /// The feature's name, used in tables of contents.
    pub toc_name: String,
    /// Link to the rendered page relative to the output root.
    pub link: String,
    /// Location of the rendered page under the output root.
    pub write_path: PathBuf,
    /// Relative prefix leading from the rendered page back to the output root.
    pub root_folder: String,
    /// The parsed and annotated feature.
    pub document: Document,
}

/// An opaque file node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    /// Source path of the file.
    pub path: PathBuf,
    /// Final path component.
    pub name: String,
    /// Mirrored location under the output root.
    pub write_path: PathBuf,
}

impl TreeNode {
    /// Display name of the node (the final path component).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Directory(node) => &node.name,
            Self::FeatureFile(node) => &node.name,
            Self::File(node) => &node.name,
        }
    }

    /// Source path of the node.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(node) => &node.path,
            Self::FeatureFile(node) => &node.path,
            Self::File(node) => &node.path,
        }
    }

    /// Destination path under the output root.
    #[must_use]
    pub fn write_path(&self) -> &Path {
        match self {
            Self::Directory(node) => &node.write_path,
            Self::FeatureFile(node) => &node.write_path,
            Self::File(node) => &node.write_path,
        }
    }

    /// Link to the rendered page; only feature files have one.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        match self {
            Self::FeatureFile(node) => Some(&node.link),
            Self::Directory(_) | Self::File(_) => None,
        }
    }

    /// Child entries; only directories have them.
    #[must_use]
    pub fn children(&self) -> Option<&[Self]> {
        match self {
            Self::Directory(node) => Some(&node.children),
            Self::FeatureFile(_) | Self::File(_) => None,
        }
    }

    /// Parsed document; only feature files have one.
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::FeatureFile(node) => Some(&node.document),
            Self::Directory(_) | Self::File(_) => None,
        }
    }

    /// Visit this node and its descendants depth-first, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Self)) {
        visit(self);
        if let Self::Directory(node) = self {
            for child in &node.children {
                child.walk(visit);
            }
        }
    }

    /// Copy every feature's scenario-like children into one flat list.
    ///
    /// Order follows the depth-first traversal, then document order within
    /// each feature.
    #[must_use]
    pub fn scenarios(&self) -> Vec<ScenarioChild> {
        let mut scenarios = Vec::new();
        self.walk(&mut |node| {
            if let Some(document) = node.document() {
                scenarios.extend(document.children.iter().cloned());
            }
        });
        scenarios
    }
}

/// A parsed feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Keyword as written in the source (`Feature`, `Business Need`, ...).
    pub keyword: String,
    /// Feature name.
    pub name: String,
    /// Free-text description; HTML once parsing completes.
    pub description: String,
    /// Feature tags, in source order.
    pub tags: Vec<String>,
    /// Backgrounds, scenarios and outlines, in source order.
    pub children: Vec<ScenarioChild>,
    /// Whether every child is implemented.
    pub implemented: bool,
}

impl Document {
    /// Strip the leading `@` from feature, child and examples tags.
    pub fn normalise_tags(&mut self) {
        normalise_tag_list(&mut self.tags);
        for child in &mut self.children {
            normalise_tag_list(&mut child.tags);
            for examples in &mut child.examples {
                normalise_tag_list(&mut examples.tags);
            }
        }
    }

    /// HTML-escape every doc-string argument.
    pub fn escape_step_arguments(&mut self) {
        for step in self.children.iter_mut().flat_map(|child| &mut child.steps) {
            if let Some(StepArgument::DocString { content }) = &mut step.argument {
                *content = escape_html(content);
            }
        }
    }

    /// Record the feature's tags and name on every child.
    pub fn stamp_feature_context(&mut self) {
        for child in &mut self.children {
            child.feature_tags.clone_from(&self.tags);
            child.feature_name.clone_from(&self.name);
        }
    }
}

/// The kind of a scenario-like child.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChildKind {
    /// Steps shared by the scenarios that follow.
    Background,
    /// A plain scenario.
    #[default]
    Scenario,
    /// A scenario with examples tables.
    ScenarioOutline,
}

/// A background, scenario or scenario outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioChild {
    /// What kind of block this is.
    pub kind: ChildKind,
    /// Keyword as written in the source.
    pub keyword: String,
    /// Name of the block.
    pub name: String,
    /// Free-text description; HTML once parsing completes.
    pub description: String,
    /// Name of the enclosing `Rule`, if any.
    pub rule: Option<String>,
    /// Own tags followed by any synthetic implementation tag.
    pub tags: Vec<String>,
    /// Tags of the enclosing feature.
    pub feature_tags: Vec<String>,
    /// Name of the enclosing feature.
    pub feature_name: String,
    /// Steps, in source order.
    pub steps: Vec<Step>,
    /// Examples tables of a scenario outline.
    pub examples: Vec<Examples>,
    /// Whether every step is implemented.
    pub implemented: bool,
}

impl ScenarioChild {
    /// Own tags followed by the feature's tags, duplicates preserved.
    #[must_use]
    pub fn effective_tags(&self) -> Vec<String> {
        self.tags
            .iter()
            .chain(&self.feature_tags)
            .cloned()
            .collect()
    }
}

/// One step line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Keyword including its trailing space, e.g. `"Given "`.
    pub keyword: String,
    /// Step text after the keyword.
    pub text: String,
    /// Attached doc string or data table.
    pub argument: Option<StepArgument>,
    /// Result of matching the step against step definitions.
    pub implementation: Option<StepMatch>,
    /// Synthetic implementation tag, when enabled.
    pub tags: Vec<String>,
}

impl Step {
    /// Keyword and text concatenated verbatim.
    #[must_use]
    pub fn line(&self) -> String {
        format!("{}{}", self.keyword, self.text)
    }
}

/// Multi-line input attached to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StepArgument {
    /// A doc string; its content is HTML-escaped during tree building.
    DocString {
        /// Doc string body.
        content: String,
    },
    /// A data table, as parsed.
    DataTable {
        /// Table rows, header first.
        rows: Vec<Vec<String>>,
    },
}

/// An examples table belonging to a scenario outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Examples {
    /// Keyword as written in the source.
    pub keyword: String,
    /// Examples tags.
    pub tags: Vec<String>,
    /// Table rows, header first.
    pub rows: Vec<Vec<String>>,
}

/// Strip one leading `@` from a tag name.
#[must_use]
pub fn normalise_tag(tag: &str) -> &str {
    tag.strip_prefix('@').unwrap_or(tag)
}

fn normalise_tag_list(tags: &mut [String]) {
    for tag in tags.iter_mut().filter(|tag| tag.starts_with('@')) {
        *tag = normalise_tag(tag).to_owned();
    }
}

/// Trim and HTML-escape step argument content.
///
/// Escapes `&`, `>`, `<` and `"`, in that order.
#[must_use]
pub fn escape_html(content: &str) -> String {
    content
        .trim()
        .replace('&', "&amp;")
        .replace('>', "&gt;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests use explicit failures for clarity")]
mod tests {
    use super::*;
    use rstest::rstest;

    fn child(tags: &[&str]) -> ScenarioChild {
        ScenarioChild {
            name: "s".into(),
            tags: tags.iter().map(ToString::to_string).collect(),
            ..ScenarioChild::default()
        }
    }

    #[rstest]
    #[case("@smoke", "smoke")]
    #[case("smoke", "smoke")]
    #[case("@@double", "@double")]
    #[case("mail@host", "mail@host")]
    fn normalise_tag_strips_one_leading_at(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalise_tag(raw), expected);
    }

    #[test]
    fn escape_html_trims_and_escapes_ampersand_first() {
        assert_eq!(
            escape_html("  <a href=\"x\">&amp;</a>\n"),
            "&lt;a href=&quot;x&quot;&gt;&amp;amp;&lt;/a&gt;"
        );
    }

    #[test]
    fn normalise_tags_touches_feature_children_and_examples() {
        let mut document = Document {
            tags: vec!["@feature".into()],
            children: vec![ScenarioChild {
                examples: vec![Examples {
                    tags: vec!["@examples".into()],
                    ..Examples::default()
                }],
                ..child(&["@own", "bare"])
            }],
            ..Document::default()
        };

        document.normalise_tags();

        assert_eq!(document.tags, ["feature"]);
        let first = document.children.first().expect("child");
        assert_eq!(first.tags, ["own", "bare"]);
        assert_eq!(
            first.examples.first().map(|ex| ex.tags.clone()),
            Some(vec!["examples".to_string()])
        );
    }

    #[test]
    fn escape_step_arguments_leaves_tables_alone() {
        let mut document = Document {
            children: vec![ScenarioChild {
                steps: vec![
                    Step {
                        argument: Some(StepArgument::DocString {
                            content: "\n<Column 1>\n".into(),
                        }),
                        ..Step::default()
                    },
                    Step {
                        argument: Some(StepArgument::DataTable {
                            rows: vec![vec!["<b>".into()]],
                        }),
                        ..Step::default()
                    },
                ],
                ..ScenarioChild::default()
            }],
            ..Document::default()
        };

        document.escape_step_arguments();

        let steps = &document.children.first().expect("child").steps;
        let arguments: Vec<_> = steps.iter().map(|s| s.argument.clone()).collect();
        assert_eq!(
            arguments,
            vec![
                Some(StepArgument::DocString {
                    content: "&lt;Column 1&gt;".into()
                }),
                Some(StepArgument::DataTable {
                    rows: vec![vec!["<b>".into()]]
                }),
            ]
        );
    }

    #[test]
    fn effective_tags_append_feature_tags_without_deduplicating() {
        let mut scenario = child(&["smoke", "shared"]);
        scenario.feature_tags = vec!["shared".into(), "auth".into()];
        assert_eq!(scenario.effective_tags(), ["smoke", "shared", "shared", "auth"]);

        let mut untagged = child(&[]);
        untagged.feature_tags = vec!["auth".into()];
        assert_eq!(untagged.effective_tags(), ["auth"]);
    }

    #[test]
    fn step_line_concatenates_keyword_and_text_verbatim() {
        let step = Step {
            keyword: "Given ".into(),
            text: "a user".into(),
            ..Step::default()
        };
        assert_eq!(step.line(), "Given a user");
    }

    #[test]
    fn scenarios_flatten_features_depth_first() {
        let feature = |name: &str, scenario: &str| {
            TreeNode::FeatureFile(FeatureFileNode {
                path: PathBuf::from(name),
                name: name.into(),
                toc_name: name.into(),
                link: String::new(),
                write_path: PathBuf::new(),
                root_folder: String::new(),
                document: Document {
                    children: vec![ScenarioChild {
                        name: scenario.into(),
                        ..ScenarioChild::default()
                    }],
                    ..Document::default()
                },
            })
        };
        let tree = TreeNode::Directory(DirectoryNode {
            path: PathBuf::from("root"),
            name: "root".into(),
            toc_name: "root".into(),
            write_path: PathBuf::new(),
            children: vec![
                TreeNode::Directory(DirectoryNode {
                    path: PathBuf::from("root/nested"),
                    name: "nested".into(),
                    toc_name: "root/nested".into(),
                    write_path: PathBuf::new(),
                    children: vec![feature("b.feature", "inner")],
                }),
                feature("a.feature", "outer"),
            ],
        });

        let names: Vec<_> = tree.scenarios().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["inner", "outer"]);
        assert!(tree.children().is_some());
        assert!(tree.document().is_none());
    }
}
