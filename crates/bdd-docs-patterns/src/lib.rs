//! Step-pattern helpers shared by the `bdd-docs` step-definition registry.
//!
//! Step definitions register human-readable patterns such as
//! `I have {count:u32} cukes`. This crate turns those patterns into anchored
//! regular expressions and splits full Gherkin step lines into their leading
//! keyword and the text the patterns are matched against.

mod errors;
mod keyword;
mod pattern;

pub use errors::PatternError;
pub use keyword::{StepKeyword, StepKeywordParseError, split_step_line};
pub use pattern::{build_regex_from_pattern, compile_regex_from_pattern, type_pattern};
