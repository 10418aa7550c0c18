//! Compile step patterns into anchored regular expressions.
//!
//! Pattern syntax:
//!
//! - `{name}` captures lazily, `{name:hint}` captures according to the type
//!   hint (see [`type_pattern`]).
//! - `{{` and `}}` are literal braces; `\x` is a literal `x`.
//! - Any other brace is kept literally but must balance.

use std::iter::Peekable;
use std::str::CharIndices;

use regex::Regex;

use crate::errors::PatternError;

type Cursor<'a> = Peekable<CharIndices<'a>>;

/// Translate a placeholder type hint into a regular-expression fragment.
///
/// Unknown or missing hints fall back to a lazy match of at least one
/// character.
///
/// # Examples
/// ```
/// use bdd_docs_patterns::type_pattern;
///
/// assert_eq!(type_pattern(Some("u32")), r"\d+");
/// assert_eq!(type_pattern(Some("String")), ".+?");
/// ```
#[must_use]
pub fn type_pattern(hint: Option<&str>) -> &'static str {
    match hint {
        Some("u8" | "u16" | "u32" | "u64" | "u128" | "usize") => r"\d+",
        Some("i8" | "i16" | "i32" | "i64" | "i128" | "isize") => r"[+-]?\d+",
        Some("f32" | "f64") => {
            r"(?i:(?:[+-]?(?:\d+\.\d*|\.\d+|\d+)(?:[eE][+-]?\d+)?|nan|inf|infinity))"
        }
        _ => ".+?",
    }
}

/// Build the source of an anchored regular expression for a step pattern.
///
/// # Errors
/// Returns [`PatternError`] when a placeholder is malformed or the braces in
/// the pattern do not balance.
///
/// # Examples
/// ```
/// use bdd_docs_patterns::build_regex_from_pattern;
///
/// let source = build_regex_from_pattern("I have {count:u32} cukes")?;
/// assert_eq!(source, r"^I have (\d+) cukes$");
/// # Ok::<(), bdd_docs_patterns::PatternError>(())
/// ```
pub fn build_regex_from_pattern(pattern: &str) -> Result<String, PatternError> {
    let mut regex = String::with_capacity(pattern.len().saturating_mul(2).saturating_add(2));
    regex.push('^');
    let mut literal = String::new();
    let mut stray_depth = 0usize;
    let mut cursor = pattern.char_indices().peekable();

    while let Some((position, ch)) = cursor.next() {
        match ch {
            '\\' => literal.push(cursor.next().map_or('\\', |(_, escaped)| escaped)),
            '{' if cursor.next_if(|&(_, next)| next == '{').is_some() => literal.push('{'),
            '}' if cursor.next_if(|&(_, next)| next == '}').is_some() => literal.push('}'),
            '{' if cursor.peek().is_some_and(|&(_, next)| starts_placeholder(next)) => {
                flush_literal(&mut literal, &mut regex);
                let hint = parse_placeholder(&mut cursor, position)?;
                regex.push('(');
                regex.push_str(type_pattern(hint.as_deref()));
                regex.push(')');
            }
            '{' => {
                stray_depth = stray_depth.saturating_add(1);
                literal.push('{');
            }
            '}' => {
                if stray_depth == 0 {
                    return Err(PatternError::UnmatchedClosingBrace { position });
                }
                stray_depth -= 1;
                literal.push('}');
            }
            other => literal.push(other),
        }
    }

    if stray_depth != 0 {
        return Err(PatternError::UnbalancedBraces);
    }
    flush_literal(&mut literal, &mut regex);
    regex.push('$');
    Ok(regex)
}

/// Build and compile a regular expression from a step pattern.
///
/// # Errors
/// Returns [`PatternError`] when the pattern is malformed or the generated
/// source cannot be compiled.
pub fn compile_regex_from_pattern(pattern: &str) -> Result<Regex, PatternError> {
    let source = build_regex_from_pattern(pattern)?;
    Ok(Regex::new(&source)?)
}

fn starts_placeholder(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn flush_literal(literal: &mut String, regex: &mut String) {
    if !literal.is_empty() {
        regex.push_str(&regex::escape(literal));
        literal.clear();
    }
}

/// Consume a placeholder after its opening brace, returning the type hint.
fn parse_placeholder(cursor: &mut Cursor<'_>, position: usize) -> Result<Option<String>, PatternError> {
    let mut name = String::new();
    while let Some((_, ch)) = cursor.next_if(|&(_, c)| c.is_ascii_alphanumeric() || c == '_') {
        name.push(ch);
    }

    match cursor.next() {
        Some((_, '}')) => Ok(None),
        Some((_, ':')) => parse_hint(cursor, name, position).map(Some),
        Some(_) => Err(PatternError::InvalidPlaceholder { name, position }),
        None => Err(PatternError::UnclosedPlaceholder { name, position }),
    }
}

fn parse_hint(cursor: &mut Cursor<'_>, name: String, position: usize) -> Result<String, PatternError> {
    let mut hint = String::new();
    loop {
        match cursor.next() {
            Some((_, '}')) if !hint.is_empty() => return Ok(hint),
            Some((_, c)) if c.is_whitespace() || c == '{' || c == '}' => {
                return Err(PatternError::InvalidPlaceholder { name, position });
            }
            Some((_, c)) => hint.push(c),
            None => return Err(PatternError::UnclosedPlaceholder { name, position }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Given a step", "^Given a step$")]
    #[case("I have {count:u32} cukes", r"^I have (\d+) cukes$")]
    #[case("balance is {amount:i64}", r"^balance is ([+-]?\d+)$")]
    #[case("a user named {name}", "^a user named (.+?)$")]
    #[case("{{literal}} {inner}", r"^\{literal\} (.+?)$")]
    #[case(r"costs \{none\}", r"^costs \{none\}$")]
    #[case("{ balanced }", r"^\{ balanced \}$")]
    #[case("it costs $5.00", r"^it costs \$5\.00$")]
    fn builds_regex_sources(#[case] pattern: &str, #[case] expected: &str) {
        let source = build_regex_from_pattern(pattern)
            .unwrap_or_else(|err| panic!("pattern {pattern:?} should compile: {err}"));
        assert_eq!(source, expected);
    }

    #[rstest]
    #[case("broken}")]
    #[case("{value")]
    #[case("{value :u32}")]
    #[case("{value:}")]
    #[case("{value:bad hint}")]
    #[case("{ open")]
    fn rejects_malformed_patterns(#[case] pattern: &str) {
        assert!(
            build_regex_from_pattern(pattern).is_err(),
            "{pattern:?} should be rejected"
        );
    }

    #[test]
    fn reports_offset_of_unmatched_closing_brace() {
        let Err(err) = build_regex_from_pattern("ab}") else {
            panic!("pattern should fail");
        };
        assert!(matches!(
            err,
            PatternError::UnmatchedClosingBrace { position: 2 }
        ));
    }

    #[test]
    fn reports_placeholder_name_when_unclosed() {
        let Err(err) = build_regex_from_pattern("x {count:u32") else {
            panic!("pattern should fail");
        };
        assert!(matches!(
            err,
            PatternError::UnclosedPlaceholder { ref name, position: 2 } if name == "count"
        ));
    }

    #[test]
    fn keeps_multibyte_literals_intact() {
        let regex = compile_regex_from_pattern("ein Büro für {name}")
            .unwrap_or_else(|err| panic!("pattern should compile: {err}"));
        assert!(regex.is_match("ein Büro für Jörg"));
    }

    #[test]
    fn surfaces_regex_compilation_errors() {
        let heavy_pattern = format!("prefix {}", "{value:f64}".repeat(20_000));
        let Err(err) = compile_regex_from_pattern(&heavy_pattern) else {
            panic!("pattern should be too large");
        };
        assert!(matches!(
            err,
            PatternError::Regex(regex::Error::CompiledTooBig(_))
        ));
    }
}
