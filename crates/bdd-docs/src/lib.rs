//! Documentation trees for Gherkin feature directories.
//!
//! This crate walks a directory of `.feature` files and produces a tree that
//! mirrors it, ready for an HTML rendering layer:
//!
//! - Feature files are parsed with the `gherkin` crate and their
//!   descriptions converted from Markdown to HTML.
//! - Every step is matched against Rust step definitions annotated with
//!   `#[given]`, `#[when]` or `#[then]`, and scenarios and features are
//!   flagged as implemented when all of their steps match.
//! - Scenarios are flattened and indexed by tag, inheriting their feature's
//!   tags.
//!
//! Malformed feature files are reported and kept as plain files; every other
//! failure aborts the run.
//!
//! # Configuration
//!
//! - `BDD_DOCS_LOG_LEVEL`: Log verbosity (trace, debug, info, warn, error)
//! - `BDD_DOCS_ADD_IMPLEMENTED_TAGS`: Append `Implemented` / `Not Implemented`
//!   tags to steps and scenarios
//! - `BDD_DOCS_STEPS`: Rust files or directories holding step definitions
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use bdd_docs::config::DocsConfig;
//! use bdd_docs::processor::process;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DocsConfig::from_env()?.with_steps(["tests/steps"]);
//! let site = process(Path::new("tests/features"), Path::new("docs"), &config)?;
//! for tag in site.index.tags() {
//!     println!("{}: {}", tag.name, tag.count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod parser;
pub mod processor;
pub mod resolver;
pub mod steps;
pub mod tags;
pub mod tree;

/// Test support utilities for unit and integration tests.
///
/// This module is hidden from documentation as it's intended for internal
/// test use only.
#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;
