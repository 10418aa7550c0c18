//! Step definitions harvested from Rust sources.
//!
//! Rust files are parsed with `syn` and every function annotated with
//! `#[given]`, `#[when]` or `#[then]` becomes a [`StepDefinition`]. The
//! [`StepRegistry`] compiles their patterns and serves as the run's
//! [`StepMatcher`](crate::resolver::StepMatcher).

use std::fmt;
use std::path::PathBuf;

use bdd_docs_patterns::StepKeyword;

mod registry;
mod rust;

pub use registry::{CompiledStepDefinition, StepPatternCompileError, StepRegistry};
pub use rust::{index_rust_file, index_rust_source};

/// Step definitions found in one Rust source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSourceIndex {
    /// Path of the indexed Rust file.
    pub path: PathBuf,
    /// Step definitions in source order.
    pub step_definitions: Vec<StepDefinition>,
}

/// A Rust function annotated with a step attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    /// Keyword named by the attribute (`Given`, `When` or `Then`).
    pub keyword: StepKeyword,
    /// Pattern registered by the attribute.
    pub pattern: String,
    /// Whether the pattern was inferred from the function name.
    pub pattern_inferred: bool,
    /// The implementing function.
    pub function: FunctionId,
    /// 1-based line of the `fn` token.
    pub line: u32,
}

/// A function's name and the inline modules enclosing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionId {
    /// Enclosing modules, outermost first.
    pub module_path: Vec<String>,
    /// Function identifier.
    pub name: String,
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for module in &self.module_path {
            write!(f, "{module}::")?;
        }
        f.write_str(&self.name)
    }
}

/// Errors raised while indexing step-definition sources.
#[derive(Debug, thiserror::Error)]
pub enum StepIndexError {
    /// A step source could not be read or walked.
    #[error("failed to read step source {}: {source}", path.display())]
    Read {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A Rust file could not be parsed.
    #[error("failed to parse rust source {}: {source}", path.display())]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// Parser diagnostic.
        #[source]
        source: syn::Error,
    },
    /// A function carries more than one step attribute.
    #[error("step function '{function}' has multiple step attributes")]
    MultipleStepAttributes {
        /// Function name used for the diagnostic.
        function: String,
    },
    /// A step attribute's arguments are not a single string literal.
    #[error("invalid arguments for #[{attribute}] on step function '{function}': {message}")]
    InvalidStepAttributeArguments {
        /// Function name used for the diagnostic.
        function: String,
        /// Attribute keyword (`given`, `when`, or `then`).
        attribute: &'static str,
        /// Human-readable parse error message.
        message: String,
    },
}
