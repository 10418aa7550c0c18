//! Recursive construction of the documentation tree.
//!
//! [`DirectoryTreeBuilder`] walks a source directory depth-first and returns
//! one [`TreeNode`] per entry, keeping the filesystem listing order. Feature
//! files are parsed and annotated; a feature file that cannot be parsed is
//! downgraded to a plain file node with a warning so one malformed file does
//! not abort the run. Every other failure propagates.
//!
//! Building is pure: the builder holds no per-run state, so flattening and
//! tag indexing happen afterwards on the returned tree.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::DocsError;
use crate::model::{DirectoryNode, FEATURE_SUFFIX, FeatureFileNode, FileNode, TreeNode};
use crate::parser::FeatureDocumentParser;
use crate::resolver::StepImplementationResolver;

/// Extension appended to rendered feature pages.
const PAGE_SUFFIX: &str = ".html";

/// Builds [`TreeNode`]s for paths under a base directory.
pub struct DirectoryTreeBuilder<'a> {
    parser: &'a FeatureDocumentParser,
    resolver: &'a StepImplementationResolver,
    output_root: PathBuf,
    base_dir: PathBuf,
}

impl<'a> DirectoryTreeBuilder<'a> {
    /// Create a builder.
    ///
    /// Output locations are computed by replacing `base_dir` with
    /// `output_root` in each source path.
    pub fn new(
        parser: &'a FeatureDocumentParser,
        resolver: &'a StepImplementationResolver,
        output_root: impl Into<PathBuf>,
        base_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            parser,
            resolver,
            output_root: output_root.into(),
            base_dir: base_dir.into(),
        }
    }

    /// Build the node for `path` and, for directories, all of its entries.
    ///
    /// Symbolic links are not followed when deciding whether an entry is a
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError::Io`] when an entry cannot be inspected or a
    /// directory cannot be listed, and [`DocsError::StepMatch`] when the step
    /// matcher fails. Feature parse failures are not errors.
    pub fn build(&self, path: &Path) -> Result<TreeNode, DocsError> {
        let metadata = fs::symlink_metadata(path).map_err(|source| DocsError::io(path, source))?;
        if metadata.is_dir() {
            return self.build_directory(path);
        }

        let name = entry_name(path);
        if name.ends_with(FEATURE_SUFFIX) {
            return self.build_feature(path, name);
        }
        Ok(self.file_node(path, name))
    }

    fn build_directory(&self, path: &Path) -> Result<TreeNode, DocsError> {
        let entries = fs::read_dir(path).map_err(|source| DocsError::io(path, source))?;
        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| DocsError::io(path, source))?;
            children.push(self.build(&entry.path())?);
        }

        let relative = self.relative(path);
        Ok(TreeNode::Directory(DirectoryNode {
            path: path.to_path_buf(),
            name: entry_name(path),
            toc_name: slash_path(relative),
            write_path: self.output_root.join(relative),
            children,
        }))
    }

    fn build_feature(&self, path: &Path, name: String) -> Result<TreeNode, DocsError> {
        let mut document = match self.parser.parse_feature(path) {
            Ok(document) => document,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "treating unparsable feature file as plain file");
                return Ok(self.file_node(path, name));
            }
        };

        document.normalise_tags();
        document.escape_step_arguments();
        self.resolver.resolve_document(&mut document)?;
        document.stamp_feature_context();
        debug!(
            path = %path.display(),
            children = document.children.len(),
            implemented = document.implemented,
            "indexed feature file"
        );

        let relative = self.relative(path);
        let relative_slash = slash_path(relative);
        Ok(TreeNode::FeatureFile(FeatureFileNode {
            path: path.to_path_buf(),
            name,
            toc_name: document.name.clone(),
            link: format!("./{relative_slash}{PAGE_SUFFIX}"),
            write_path: with_suffix(&self.output_root.join(relative), PAGE_SUFFIX),
            root_folder: root_folder(relative),
            document,
        }))
    }

    fn file_node(&self, path: &Path, name: String) -> TreeNode {
        TreeNode::File(FileNode {
            path: path.to_path_buf(),
            name,
            write_path: self.output_root.join(self.relative(path)),
        })
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.base_dir).unwrap_or(path)
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Join the normal components of `path` with `/`.
fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Relative prefix leading from a page at `relative` back to the base.
fn root_folder(relative: &Path) -> String {
    let depth = relative
        .parent()
        .map_or(0, |parent| parent.components().count());
    "../".repeat(depth)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests use explicit failures for clarity")]
mod tests {
    use super::*;
    use crate::model::StepArgument;
    use crate::resolver::NOT_IMPLEMENTED_TAG;
    use crate::test_support::{FailingMatcher, LineSetMatcher, write_tree};
    use rstest::rstest;

    const LOGIN: &str = concat!(
        "@auth\n",
        "Feature: Login\n",
        "  @smoke\n",
        "  Scenario: Valid credentials\n",
        "    Given a registered user\n",
        "      \"\"\"\n",
        "      <user & \"friend\">\n",
        "      \"\"\"\n",
        "    When they log in\n",
    );

    fn resolver(tags: bool) -> StepImplementationResolver {
        StepImplementationResolver::new(LineSetMatcher::new(["Given a registered user"]), tags)
    }

    #[rstest]
    #[case("login.feature", "")]
    #[case("features/login.feature", "../")]
    #[case("features/auth/login.feature", "../../")]
    #[case("features/auth/deep/login.feature", "../../../")]
    fn root_folder_counts_directory_levels(#[case] relative: &str, #[case] expected: &str) {
        assert_eq!(root_folder(Path::new(relative)), expected);
    }

    #[test]
    fn slash_path_drops_non_normal_components() {
        assert_eq!(slash_path(Path::new("./features/auth")), "features/auth");
    }

    #[test]
    fn feature_nodes_are_annotated_and_located() {
        let dir = write_tree(&[("features/auth/login.feature", LOGIN)]);
        let parser = FeatureDocumentParser::default();
        let resolver = resolver(true);
        let builder = DirectoryTreeBuilder::new(&parser, &resolver, "docs", dir.path());

        let tree = builder
            .build(&dir.path().join("features"))
            .expect("build tree");

        let TreeNode::Directory(features) = &tree else {
            panic!("expected directory root");
        };
        assert_eq!(features.toc_name, "features");
        assert_eq!(features.write_path, PathBuf::from("docs/features"));
        let auth = features.children.first().expect("auth directory");
        assert_eq!(auth.write_path(), Path::new("docs/features/auth"));
        let login = auth
            .children()
            .and_then(<[TreeNode]>::first)
            .expect("login feature");
        let TreeNode::FeatureFile(login) = login else {
            panic!("expected feature file node");
        };

        assert_eq!(login.toc_name, "Login");
        assert_eq!(login.link, "./features/auth/login.feature.html");
        assert_eq!(
            login.write_path,
            PathBuf::from("docs/features/auth/login.feature.html")
        );
        assert_eq!(login.root_folder, "../../");

        let document = &login.document;
        assert_eq!(document.tags, ["auth"]);
        assert!(!document.implemented);
        let scenario = document.children.first().expect("scenario");
        assert_eq!(scenario.tags, ["smoke", NOT_IMPLEMENTED_TAG]);
        assert_eq!(scenario.feature_tags, ["auth"]);
        assert_eq!(scenario.feature_name, "Login");
        let argument = scenario
            .steps
            .first()
            .and_then(|step| step.argument.clone())
            .expect("doc string");
        assert_eq!(
            argument,
            StepArgument::DocString {
                content: "&lt;user &amp; &quot;friend&quot;&gt;".into()
            }
        );
    }

    #[test]
    fn unparsable_feature_files_become_plain_files() {
        let dir = write_tree(&[("broken.feature", "not gherkin at all\n")]);
        let parser = FeatureDocumentParser::default();
        let resolver = resolver(false);
        let builder = DirectoryTreeBuilder::new(&parser, &resolver, "docs", dir.path());

        let node = builder
            .build(&dir.path().join("broken.feature"))
            .expect("build node");

        assert!(matches!(node, TreeNode::File(_)));
        assert_eq!(node.write_path(), Path::new("docs/broken.feature"));
        assert!(node.document().is_none());
    }

    #[test]
    fn other_files_are_mirrored_verbatim() {
        let dir = write_tree(&[("notes/readme.md", "# notes\n")]);
        let parser = FeatureDocumentParser::default();
        let resolver = resolver(false);
        let builder = DirectoryTreeBuilder::new(&parser, &resolver, "out", dir.path());

        let node = builder
            .build(&dir.path().join("notes/readme.md"))
            .expect("build node");

        assert_eq!(node.name(), "readme.md");
        assert_eq!(node.write_path(), Path::new("out/notes/readme.md"));
        assert!(node.link().is_none());
    }

    #[test]
    fn missing_paths_are_fatal() {
        let dir = write_tree(&[]);
        let parser = FeatureDocumentParser::default();
        let resolver = resolver(false);
        let builder = DirectoryTreeBuilder::new(&parser, &resolver, "docs", dir.path());

        let err = builder
            .build(&dir.path().join("absent"))
            .expect_err("missing path");
        assert!(matches!(err, DocsError::Io { .. }));
    }

    #[test]
    fn matcher_failures_are_fatal() {
        let dir = write_tree(&[("login.feature", LOGIN)]);
        let parser = FeatureDocumentParser::default();
        let resolver = StepImplementationResolver::new(FailingMatcher, false);
        let builder = DirectoryTreeBuilder::new(&parser, &resolver, "docs", dir.path());

        let err = builder
            .build(&dir.path().join("login.feature"))
            .expect_err("matcher failure");
        assert!(matches!(err, DocsError::StepMatch(_)));
    }
}
