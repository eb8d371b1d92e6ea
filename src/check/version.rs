//! Version comparison against a configured expectation.
//!
//! Versions like `9.1.0.4` or `2.0.0b4` are tokenized into integers, with
//! the letters `p` (patch), `b` (beta) and `i` (internal) mapped to 2, 1
//! and 0, and compared lexicographically.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use super::State;

/// Version tokenizer errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("version {0:?} contains characters other than digits, '.', 'p', 'b' and 'i'")]
    InvalidCharacters(String),
    #[error("version {0:?} has a component out of range")]
    OutOfRange(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AtLeast,
    Specific,
}

type RawVersionRule = ((Comparison, String), State);

/// Expected version and the state applied on mismatch.
///
/// Deserialized from `[["at_least", "9.1.0"], 1]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawVersionRule")]
pub struct VersionRule {
    pub comparison: Comparison,
    pub expected: String,
    pub severity: State,
}

impl From<RawVersionRule> for VersionRule {
    fn from(((comparison, expected), severity): RawVersionRule) -> Self {
        Self {
            comparison,
            expected,
            severity,
        }
    }
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+|[pbi]").unwrap())
}

/// Split a version into comparable integers.
pub fn tokenize_version(version: &str) -> Result<Vec<u64>, VersionError> {
    if version
        .chars()
        .any(|c| !c.is_ascii_digit() && !matches!(c, '.' | 'p' | 'b' | 'i'))
    {
        return Err(VersionError::InvalidCharacters(version.to_string()));
    }

    token_re()
        .find_iter(version)
        .map(|token| match token.as_str() {
            "p" => Ok(2),
            "b" => Ok(1),
            "i" => Ok(0),
            digits => digits
                .parse()
                .map_err(|_| VersionError::OutOfRange(version.to_string())),
        })
        .collect()
}

/// Compare `actual` against `rule`, returning the state and info text.
pub fn check_version(actual: Option<&str>, rule: Option<&VersionRule>, label: &str) -> (State, String) {
    let Some(actual) = actual else {
        return (State::Unknown, format!("{}: None (no agent info)", label));
    };
    let info = format!("{}: {}", label, actual);
    let Some(rule) = rule else {
        return (State::Ok, info);
    };

    let tokens = tokenize_version(actual).and_then(|actual_tokens| {
        tokenize_version(&rule.expected).map(|expected_tokens| (actual_tokens, expected_tokens))
    });
    let (actual_tokens, expected_tokens) = match tokens {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::debug!("cannot compare versions: {}", e);
            return (
                State::Unknown,
                format!(
                    "{} (cannot compare with {}: only numbers separated by '.', 'p', 'b' or 'i' are allowed)",
                    info, rule.expected
                ),
            );
        }
    };

    match rule.comparison {
        Comparison::AtLeast if actual_tokens < expected_tokens => (
            rule.severity,
            format!("{} (should be at least {})", info, rule.expected),
        ),
        Comparison::Specific if actual_tokens != expected_tokens => (
            rule.severity,
            format!("{} (should be {})", info, rule.expected),
        ),
        _ => (State::Ok, info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(comparison: Comparison, expected: &str, severity: State) -> VersionRule {
        VersionRule {
            comparison,
            expected: expected.to_string(),
            severity,
        }
    }

    #[test]
    fn test_doc_example() {
        let rule = rule(Comparison::AtLeast, "2.0.0p2", State::Crit);
        assert_eq!(
            check_version(Some("2.0.0b4"), Some(&rule), "Doc test"),
            (
                State::Crit,
                "Doc test: 2.0.0b4 (should be at least 2.0.0p2)".to_string()
            )
        );
    }

    #[test]
    fn test_no_rule_is_ok() {
        assert_eq!(
            check_version(Some("2.0.0"), None, "L"),
            (State::Ok, "L: 2.0.0".to_string())
        );
    }

    #[test]
    fn test_missing_version_is_unknown() {
        let rule = rule(Comparison::Specific, "9.1", State::Warn);
        assert_eq!(
            check_version(None, Some(&rule), "L"),
            (State::Unknown, "L: None (no agent info)".to_string())
        );
        assert_eq!(check_version(None, None, "L").0, State::Unknown);
    }

    #[test]
    fn test_token_ordering() {
        let internal = tokenize_version("1.0.0i1").unwrap();
        let beta = tokenize_version("1.0.0b1").unwrap();
        let patch = tokenize_version("1.0.0p1").unwrap();
        let next = tokenize_version("1.0.1").unwrap();
        assert!(internal < beta);
        assert!(beta < patch);
        assert!(patch < next);
        assert_eq!(tokenize_version("2.0.0b4").unwrap(), vec![2, 0, 0, 1, 4]);
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(
            tokenize_version("9.1.0-4"),
            Err(VersionError::InvalidCharacters("9.1.0-4".to_string()))
        );
        let rule = rule(Comparison::AtLeast, "9.1.0", State::Crit);
        let (state, text) = check_version(Some("9.1.x"), Some(&rule), "Version");
        assert_eq!(state, State::Unknown);
        assert!(text.starts_with("Version: 9.1.x (cannot compare with 9.1.0"));
    }

    #[test]
    fn test_at_least() {
        let rule = rule(Comparison::AtLeast, "9.1.0.4", State::Warn);
        assert_eq!(check_version(Some("9.1.0.4"), Some(&rule), "V").0, State::Ok);
        assert_eq!(check_version(Some("9.2"), Some(&rule), "V").0, State::Ok);
        assert_eq!(
            check_version(Some("9.1.0.3"), Some(&rule), "V"),
            (State::Warn, "V: 9.1.0.3 (should be at least 9.1.0.4)".to_string())
        );
    }

    #[test]
    fn test_specific() {
        let rule = rule(Comparison::Specific, "9.1.0.4", State::Crit);
        assert_eq!(check_version(Some("9.1.0.4"), Some(&rule), "V").0, State::Ok);
        assert_eq!(
            check_version(Some("9.1.0.5"), Some(&rule), "V"),
            (State::Crit, "V: 9.1.0.5 (should be 9.1.0.4)".to_string())
        );
    }

    #[test]
    fn test_rule_from_json() {
        let rule: VersionRule = serde_json::from_str(r#"[["at_least", "2.0.0p2"], 2]"#).unwrap();
        assert_eq!(rule, self::rule(Comparison::AtLeast, "2.0.0p2", State::Crit));
    }
}
