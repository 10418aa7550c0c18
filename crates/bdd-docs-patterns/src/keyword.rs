//! Step keywords and full-line splitting.

use std::fmt;
use std::str::FromStr;

/// Keyword that introduces a Gherkin step or names a step definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKeyword {
    /// Setup preconditions for a scenario.
    Given,
    /// Perform an action.
    When,
    /// Assert an outcome.
    Then,
    /// Continue the previous step's keyword.
    And,
    /// Contrast with the previous step's keyword.
    But,
}

impl StepKeyword {
    const ALL: [Self; 5] = [Self::Given, Self::When, Self::Then, Self::And, Self::But];

    /// Return the canonical English spelling of the keyword.
    ///
    /// # Examples
    ///
    /// ```
    /// use bdd_docs_patterns::StepKeyword;
    ///
    /// assert_eq!(StepKeyword::Then.as_str(), "Then");
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
            Self::But => "But",
        }
    }

    /// Whether the keyword borrows its meaning from the preceding step.
    #[must_use]
    pub const fn is_conjunction(&self) -> bool {
        matches!(self, Self::And | Self::But)
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a recognised step keyword.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid step keyword: {0}")]
pub struct StepKeywordParseError(pub String);

impl FromStr for StepKeyword {
    type Err = StepKeywordParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|keyword| keyword.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| StepKeywordParseError(trimmed.to_string()))
    }
}

/// Split a full step line such as `"Given a user"` into its keyword and text.
///
/// The `*` bullet is accepted and yields no keyword, as does a line that
/// does not start with a recognised keyword followed by whitespace. The
/// returned text has its leading whitespace removed.
///
/// # Examples
///
/// ```
/// use bdd_docs_patterns::{StepKeyword, split_step_line};
///
/// assert_eq!(split_step_line("When I log in"), (Some(StepKeyword::When), "I log in"));
/// assert_eq!(split_step_line("* I log in"), (None, "I log in"));
/// assert_eq!(split_step_line("Butter melts"), (None, "Butter melts"));
/// ```
#[must_use]
pub fn split_step_line(line: &str) -> (Option<StepKeyword>, &str) {
    let line = line.trim_start();
    if let Some(rest) = line.strip_prefix('*') {
        return (None, rest.trim_start());
    }

    let Some((word, rest)) = line.split_once(char::is_whitespace) else {
        return (None, line);
    };
    match word.parse::<StepKeyword>() {
        Ok(keyword) => (Some(keyword), rest.trim_start()),
        Err(_) => (None, line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("given", StepKeyword::Given)]
    #[case("WHEN", StepKeyword::When)]
    #[case(" Then ", StepKeyword::Then)]
    #[case("and", StepKeyword::And)]
    #[case("But", StepKeyword::But)]
    fn parses_keywords_case_insensitively(#[case] raw: &str, #[case] expected: StepKeyword) {
        assert_eq!(raw.parse::<StepKeyword>().ok(), Some(expected));
    }

    #[test]
    fn rejects_unknown_keywords() {
        let Err(err) = "Suppose".parse::<StepKeyword>() else {
            panic!("keyword should be rejected");
        };
        assert_eq!(err.to_string(), "invalid step keyword: Suppose");
    }

    #[rstest]
    #[case("Given a user", Some(StepKeyword::Given), "a user")]
    #[case("And   another", Some(StepKeyword::And), "another")]
    #[case("  Then it works", Some(StepKeyword::Then), "it works")]
    #[case("*bulleted", None, "bulleted")]
    #[case("Given", None, "Given")]
    #[case("no keyword here", None, "no keyword here")]
    fn splits_step_lines(
        #[case] line: &str,
        #[case] keyword: Option<StepKeyword>,
        #[case] text: &str,
    ) {
        assert_eq!(split_step_line(line), (keyword, text));
    }

    #[test]
    fn conjunctions_are_flagged() {
        assert!(StepKeyword::And.is_conjunction());
        assert!(StepKeyword::But.is_conjunction());
        assert!(!StepKeyword::Given.is_conjunction());
    }
}
