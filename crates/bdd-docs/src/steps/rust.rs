//! Rust step definition indexing.
//!
//! The indexer follows the step macros' conventions:
//!
//! - Missing attribute arguments infer the pattern from the function name by
//!   replacing underscores with spaces.
//! - A string literal containing only whitespace also triggers inference.
//! - The literal empty string (`""`) registers an empty pattern and does not
//!   infer.

use std::path::{Path, PathBuf};

use bdd_docs_patterns::StepKeyword;
use tracing::debug;

use super::{FunctionId, StepDefinition, StepIndexError, StepSourceIndex};

/// Parse and index a Rust source file from disk.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed as Rust source.
pub fn index_rust_file(path: &Path) -> Result<StepSourceIndex, StepIndexError> {
    let source = std::fs::read_to_string(path).map_err(|source| StepIndexError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    index_rust_source(path.to_path_buf(), &source)
}

/// Parse and index Rust step definitions from source text.
///
/// # Errors
///
/// Returns an error when the source cannot be parsed by `syn` or a step
/// attribute is malformed.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
///
/// use bdd_docs::steps::index_rust_source;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = "#[when]\nfn do_the_thing() {}\n";
/// let index = index_rust_source(PathBuf::from("steps.rs"), source)?;
///
/// let step = index.step_definitions.first().ok_or("no step")?;
/// assert_eq!(step.pattern, "do the thing");
/// assert_eq!(step.line, 2);
/// # Ok(())
/// # }
/// ```
pub fn index_rust_source(path: PathBuf, source: &str) -> Result<StepSourceIndex, StepIndexError> {
    let file = syn::parse_file(source).map_err(|source| StepIndexError::Parse {
        path: path.clone(),
        source,
    })?;
    let mut step_definitions = Vec::new();
    let mut module_path = Vec::new();
    collect_step_definitions(&file.items, &mut module_path, &mut step_definitions)?;
    debug!(path = %path.display(), steps = step_definitions.len(), "indexed step source");

    Ok(StepSourceIndex {
        path,
        step_definitions,
    })
}

fn collect_step_definitions(
    items: &[syn::Item],
    module_path: &mut Vec<String>,
    out: &mut Vec<StepDefinition>,
) -> Result<(), StepIndexError> {
    for item in items {
        match item {
            syn::Item::Fn(item_fn) => {
                if let Some(step) = index_step_function(item_fn, module_path)? {
                    out.push(step);
                }
            }
            syn::Item::Mod(item_mod) => {
                let Some((_, items)) = item_mod.content.as_ref() else {
                    continue;
                };
                module_path.push(item_mod.ident.to_string());
                collect_step_definitions(items, module_path, out)?;
                module_path.pop();
            }
            _ => {}
        }
    }
    Ok(())
}

struct StepAttribute<'a> {
    keyword: StepKeyword,
    attribute: &'static str,
    attr: &'a syn::Attribute,
}

/// Find the single step attribute on a function, if any.
fn find_step_attribute(item_fn: &syn::ItemFn) -> Result<Option<StepAttribute<'_>>, StepIndexError> {
    let mut found: Option<StepAttribute<'_>> = None;

    for attr in &item_fn.attrs {
        let Some((attribute, keyword)) = step_attribute_keyword(attr) else {
            continue;
        };
        if found.is_some() {
            return Err(StepIndexError::MultipleStepAttributes {
                function: item_fn.sig.ident.to_string(),
            });
        }
        found = Some(StepAttribute {
            keyword,
            attribute,
            attr,
        });
    }

    Ok(found)
}

fn step_attribute_keyword(attr: &syn::Attribute) -> Option<(&'static str, StepKeyword)> {
    let ident = attr.path().segments.last()?.ident.to_string();
    match ident.as_str() {
        "given" => Some(("given", StepKeyword::Given)),
        "when" => Some(("when", StepKeyword::When)),
        "then" => Some(("then", StepKeyword::Then)),
        _ => None,
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "line numbers from syn will not exceed u32::MAX in practice"
)]
fn index_step_function(
    item_fn: &syn::ItemFn,
    module_path: &[String],
) -> Result<Option<StepDefinition>, StepIndexError> {
    let Some(step_attribute) = find_step_attribute(item_fn)? else {
        return Ok(None);
    };

    let (pattern, pattern_inferred) = parse_step_pattern(
        step_attribute.attr,
        &item_fn.sig.ident,
        step_attribute.attribute,
    )?;

    Ok(Some(StepDefinition {
        keyword: step_attribute.keyword,
        pattern,
        pattern_inferred,
        function: FunctionId {
            module_path: module_path.to_vec(),
            name: item_fn.sig.ident.to_string(),
        },
        line: item_fn.sig.fn_token.span.start().line as u32,
    }))
}

fn parse_step_pattern(
    attr: &syn::Attribute,
    function_ident: &syn::Ident,
    attribute: &'static str,
) -> Result<(String, bool), StepIndexError> {
    let invalid = |message: String| StepIndexError::InvalidStepAttributeArguments {
        function: function_ident.to_string(),
        attribute,
        message,
    };

    match &attr.meta {
        syn::Meta::Path(_) => Ok((infer_pattern(function_ident), true)),
        syn::Meta::List(meta_list) => {
            if meta_list.tokens.is_empty() {
                return Ok((infer_pattern(function_ident), true));
            }
            let literal = attr
                .parse_args::<syn::LitStr>()
                .map_err(|err| invalid(err.to_string()))?;
            Ok(interpret_pattern_literal(function_ident, literal.value()))
        }
        syn::Meta::NameValue(name_value) => match &name_value.value {
            syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(literal),
                ..
            }) => Ok(interpret_pattern_literal(function_ident, literal.value())),
            _ => Err(invalid("expected string literal value".to_string())),
        },
    }
}

fn interpret_pattern_literal(function_ident: &syn::Ident, raw: String) -> (String, bool) {
    if !raw.is_empty() && raw.trim().is_empty() {
        return (infer_pattern(function_ident), true);
    }
    (raw, false)
}

fn infer_pattern(function_ident: &syn::Ident) -> String {
    function_ident.to_string().replace('_', " ")
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests use explicit failures for clarity")]
mod tests {
    use super::*;

    fn find<'a>(index: &'a StepSourceIndex, name: &str) -> &'a StepDefinition {
        index
            .step_definitions
            .iter()
            .find(|step| step.function.name == name)
            .expect("indexed step")
    }

    #[test]
    fn indexes_step_definitions_and_infers_patterns() {
        let source = concat!(
            "use rstest_bdd_macros::{given, when, then};\n",
            "\n",
            "#[given(\"a message\")]\n",
            "fn has_pattern() {}\n",
            "\n",
            "#[when]\n",
            "fn inferred_from_name() {}\n",
            "\n",
            "#[then(\"   \")]\n",
            "fn inferred_from_whitespace() {}\n",
            "\n",
            "#[given(\"\")]\n",
            "fn empty_pattern() {}\n",
            "\n",
            "#[rstest_bdd_macros::when(\"qualified\")]\n",
            "fn qualified_attribute() {}\n",
            "\n",
            "fn helper() {}\n",
        );

        let index = index_rust_source(PathBuf::from("steps.rs"), source).expect("index source");
        assert_eq!(index.step_definitions.len(), 5);

        let given = find(&index, "has_pattern");
        assert_eq!(given.keyword, StepKeyword::Given);
        assert_eq!(given.pattern, "a message");
        assert!(!given.pattern_inferred);
        assert_eq!(given.line, 4);

        let inferred = find(&index, "inferred_from_name");
        assert_eq!(inferred.keyword, StepKeyword::When);
        assert_eq!(inferred.pattern, "inferred from name");
        assert!(inferred.pattern_inferred);

        let whitespace = find(&index, "inferred_from_whitespace");
        assert_eq!(whitespace.keyword, StepKeyword::Then);
        assert_eq!(whitespace.pattern, "inferred from whitespace");
        assert!(whitespace.pattern_inferred);

        let empty = find(&index, "empty_pattern");
        assert_eq!(empty.pattern, "");
        assert!(!empty.pattern_inferred);

        assert_eq!(find(&index, "qualified_attribute").pattern, "qualified");
    }

    #[test]
    fn records_inline_module_path() {
        let source = concat!(
            "mod auth {\n",
            "    mod login {\n",
            "        #[given(\"a user\")]\n",
            "        fn a_user() {}\n",
            "    }\n",
            "}\n",
            "mod external;\n",
        );

        let index = index_rust_source(PathBuf::from("steps.rs"), source).expect("index source");
        let step = find(&index, "a_user");
        assert_eq!(step.function.to_string(), "auth::login::a_user");
    }

    #[test]
    fn rejects_multiple_step_attributes() {
        let source = "#[given(\"a\")]\n#[when(\"b\")]\nfn twice() {}\n";
        let err = index_rust_source(PathBuf::from("steps.rs"), source).expect_err("two attributes");
        assert!(matches!(
            err,
            StepIndexError::MultipleStepAttributes { ref function } if function == "twice"
        ));
    }

    #[test]
    fn rejects_non_string_arguments() {
        let source = "#[then(42)]\nfn answer() {}\n";
        let err = index_rust_source(PathBuf::from("steps.rs"), source).expect_err("non-string");
        assert!(matches!(
            err,
            StepIndexError::InvalidStepAttributeArguments { attribute: "then", .. }
        ));
    }

    #[test]
    fn reports_unparsable_sources_with_path() {
        let err = index_rust_source(PathBuf::from("broken.rs"), "fn {").expect_err("invalid rust");
        assert!(matches!(err, StepIndexError::Parse { .. }));
        assert!(err.to_string().contains("broken.rs"));
    }
}
