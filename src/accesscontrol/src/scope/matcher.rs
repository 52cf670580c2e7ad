//! Glob matching of held scopes against required scopes
//!
//! Held scopes are compiled into anchored regular expressions where `:` and
//! `/` act as segment separators:
//!
//! - `*` matches any run of characters within one segment
//! - `**` matches any run of characters, crossing separators
//! - `?` matches a single character within one segment
//! - `[a-z]`, `[!abc]` match one character from (or outside) a class
//! - `{a,b}` matches any of the alternatives
//! - `\x` matches `x` literally

use regex::Regex;
use std::fmt;
use tracing::trace;

use crate::error::{AccessControlError, Result};
use crate::types::SCOPE_ALL;

/// Matches any run of non-separator characters
const SEGMENT_RUN: &str = "[^:/]*";

/// Matches one non-separator character
const SEGMENT_CHAR: &str = "[^:/]";

/// A held scope compiled for matching
///
/// # Examples
///
/// ```
/// use accesscontrol::scope::ScopePattern;
///
/// let pattern = ScopePattern::compile("settings:**").unwrap();
/// assert!(pattern.is_match("settings:auth.saml:enabled"));
///
/// let pattern = ScopePattern::compile("reports:*").unwrap();
/// assert!(pattern.is_match("reports:1"));
/// assert!(!pattern.is_match("reports:1:pages"));
/// ```
#[derive(Debug, Clone)]
pub struct ScopePattern {
    /// Original held scope
    raw: String,
    /// Compiled expression, `None` for `SCOPE_ALL`
    regex: Option<Regex>,
}

impl ScopePattern {
    /// Compiles a held scope
    ///
    /// # Errors
    ///
    /// Returns `InvalidScopePattern` for unclosed classes or alternations,
    /// empty or reversed classes, and a trailing escape character.
    pub fn compile(pattern: &str) -> Result<Self> {
        if pattern == SCOPE_ALL {
            return Ok(Self {
                raw: pattern.to_string(),
                regex: None,
            });
        }

        let expression = translate(pattern).map_err(|reason| invalid(pattern, reason))?;
        let regex = Regex::new(&expression).map_err(|e| invalid(pattern, e.to_string()))?;

        Ok(Self {
            raw: pattern.to_string(),
            regex: Some(regex),
        })
    }

    /// Checks whether a required scope is covered by this pattern
    pub fn is_match(&self, scope: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(scope),
            None => true,
        }
    }

    /// Returns the held scope this pattern was compiled from
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ScopePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Checks a single held scope against a required scope
pub fn matches(held: &str, required: &str) -> Result<bool> {
    Ok(ScopePattern::compile(held)?.is_match(required))
}

/// Checks whether any held scope covers the required scope
///
/// Every held scope is compiled before matching starts, so an invalid
/// pattern is reported no matter where it sits in the set.
pub fn matches_any<'a, I>(held: I, required: &str) -> Result<bool>
where
    I: IntoIterator<Item = &'a str>,
{
    let patterns = held
        .into_iter()
        .map(ScopePattern::compile)
        .collect::<Result<Vec<_>>>()?;

    let matched = patterns.iter().find(|pattern| pattern.is_match(required));
    trace!(
        "Scope match: required={}, held={}, matched={:?}",
        required,
        patterns.len(),
        matched.map(ScopePattern::as_str)
    );

    Ok(matched.is_some())
}

fn invalid(pattern: &str, reason: impl Into<String>) -> AccessControlError {
    AccessControlError::InvalidScopePattern {
        pattern: pattern.to_string(),
        reason: reason.into(),
    }
}

/// Translates a glob into an anchored regular expression
fn translate(pattern: &str) -> std::result::Result<String, String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 8);
    out.push_str("(?s)^");

    let mut alternation_depth = 0usize;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                out.push_str(".*");
                i += 1;
            }
            '*' => out.push_str(SEGMENT_RUN),
            '?' => out.push_str(SEGMENT_CHAR),
            '[' => i = translate_class(&chars, i + 1, &mut out)?,
            '{' => {
                alternation_depth += 1;
                out.push_str("(?:");
            }
            ',' if alternation_depth > 0 => out.push('|'),
            '}' if alternation_depth > 0 => {
                alternation_depth -= 1;
                out.push(')');
            }
            '\\' => {
                i += 1;
                let escaped = chars
                    .get(i)
                    .ok_or_else(|| "trailing escape character".to_string())?;
                push_literal(&mut out, *escaped);
            }
            c => push_literal(&mut out, c),
        }
        i += 1;
    }

    if alternation_depth > 0 {
        return Err("unclosed alternation '{'".to_string());
    }

    out.push('$');
    Ok(out)
}

/// Translates a character class starting after its `[`
///
/// Returns the index of the closing `]`.
fn translate_class(
    chars: &[char],
    start: usize,
    out: &mut String,
) -> std::result::Result<usize, String> {
    let mut i = start;
    let negated = matches!(chars.get(i), Some('!') | Some('^'));
    if negated {
        i += 1;
    }

    let mut body = String::new();
    loop {
        let lo = match chars.get(i) {
            None => return Err("unclosed character class '['".to_string()),
            Some(']') => break,
            Some('\\') => {
                i += 1;
                *chars
                    .get(i)
                    .ok_or_else(|| "trailing escape character".to_string())?
            }
            Some(c) => *c,
        };
        push_class_char(&mut body, lo);

        // `a-z` range, a `-` before `]` is literal
        if chars.get(i + 1) == Some(&'-') && !matches!(chars.get(i + 2), None | Some(']')) {
            let (hi, consumed) = match chars[i + 2] {
                '\\' => (
                    *chars
                        .get(i + 3)
                        .ok_or_else(|| "trailing escape character".to_string())?,
                    3,
                ),
                c => (c, 2),
            };
            if hi < lo {
                return Err(format!("invalid character range '{}-{}'", lo, hi));
            }
            body.push('-');
            push_class_char(&mut body, hi);
            i += consumed;
        }
        i += 1;
    }

    if body.is_empty() {
        return Err("empty character class".to_string());
    }

    if negated {
        out.push_str("[^:/");
    } else {
        out.push('[');
    }
    out.push_str(&body);
    out.push(']');

    Ok(i)
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

fn push_class_char(out: &mut String, c: char) {
    // `\<` and `\>` are word boundaries, not escapes
    if c.is_ascii_punctuation() && c != '<' && c != '>' {
        out.push('\\');
    }
    out.push(c);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches("reports:1", "reports:1").unwrap());
        assert!(!matches("reports:1", "reports:10").unwrap());
        assert!(!matches("reports:1", "reports").unwrap());
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        assert!(matches("reports:*", "reports:1").unwrap());
        assert!(matches("reports:*", "reports:").unwrap());
        assert!(!matches("reports:*", "reports:1:pages").unwrap());
        assert!(!matches("reports:*", "reports:a/b").unwrap());
    }

    #[test]
    fn test_double_star_crosses_segments() {
        assert!(matches("settings:**", "settings:auth.saml:enabled").unwrap());
        assert!(matches("settings:**", "settings:a/b:c").unwrap());
        assert!(!matches("settings:**", "users:1").unwrap());
    }

    #[test]
    fn test_scope_all() {
        assert!(matches("*", "settings:auth.saml:enabled").unwrap());
        assert!(matches("*", "").unwrap());
    }

    #[test]
    fn test_literal_metacharacters() {
        assert!(matches("settings:auth.saml", "settings:auth.saml").unwrap());
        assert!(!matches("settings:auth.saml", "settings:authXsaml").unwrap());
        assert!(matches(r"files:a\*b", "files:a*b").unwrap());
        assert!(!matches(r"files:a\*b", "files:axxb").unwrap());
    }

    #[test]
    fn test_translate_output() {
        assert_eq!(translate("a:*").unwrap(), "(?s)^a:[^:/]*$");
        assert_eq!(translate("a:**").unwrap(), "(?s)^a:.*$");
        assert_eq!(translate("a:{b,c}").unwrap(), "(?s)^a:(?:b|c)$");
        assert_eq!(translate("a:[!x]").unwrap(), "(?s)^a:[^:/x]$");
    }

    #[test]
    fn test_invalid_patterns() {
        for pattern in ["reports:[", "reports:[]", "reports:{a,b", r"reports:\", "reports:[z-a]"] {
            let err = ScopePattern::compile(pattern).unwrap_err();
            assert!(
                matches!(err, AccessControlError::InvalidScopePattern { .. }),
                "expected pattern error for {}",
                pattern
            );
        }
    }

    #[test]
    fn test_matches_any() {
        let held = ["users:1", "reports:*"];
        assert!(matches_any(held.iter().copied(), "reports:7").unwrap());
        assert!(!matches_any(held.iter().copied(), "teams:7").unwrap());
        assert!(!matches_any(std::iter::empty(), "teams:7").unwrap());
    }

    #[test]
    fn test_matches_any_reports_invalid_pattern() {
        let held = ["reports:*", "reports:["];
        assert!(matches_any(held.iter().copied(), "reports:1").is_err());
    }
}
