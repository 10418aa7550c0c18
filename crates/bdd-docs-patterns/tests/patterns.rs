//! Public API checks for step-pattern compilation.
#![expect(clippy::expect_used, reason = "test asserts conversion path")]

use bdd_docs_patterns::{
    PatternError, StepKeyword, compile_regex_from_pattern, split_step_line, type_pattern,
};

#[test]
fn compiled_patterns_match_split_step_text() {
    let regex =
        compile_regex_from_pattern("I have {n:u32} cukes").expect("pattern should compile");
    let (keyword, text) = split_step_line("Given I have 12 cukes");

    assert_eq!(keyword, Some(StepKeyword::Given));
    assert!(regex.is_match(text));
    assert!(!regex.is_match("I have twelve cukes"));
}

#[test]
fn captures_follow_placeholder_order() {
    let regex = compile_regex_from_pattern("{user} pays {amount:f64} to {payee}")
        .expect("pattern should compile");
    let captures = regex
        .captures("alice pays 12.50 to bob")
        .expect("text should match");
    let values: Vec<_> = captures
        .iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str())
        .collect();
    assert_eq!(values, ["alice", "12.50", "bob"]);
}

#[test]
fn malformed_patterns_report_placeholder_errors() {
    let Err(err) = compile_regex_from_pattern("{value:Vec<{u32}>}") else {
        panic!("expected placeholder error");
    };
    assert!(matches!(err, PatternError::InvalidPlaceholder { .. }));
    assert!(err.to_string().contains("value"));
}

#[test]
fn unknown_type_hints_fall_back_to_lazy_match() {
    assert_eq!(type_pattern(Some("Custom")), ".+?");
    assert_eq!(type_pattern(None), ".+?");
}
