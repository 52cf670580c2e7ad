//! Scope templates resolved against request parameters
//!
//! A template is a scope string with `{{key}}` placeholders, for example
//! `reports:{{:reportId}}`. Declarations are written once and resolved per
//! request with [`resolve`] or [`ScopeTemplate::resolve`].

use std::fmt;

use crate::error::{AccessControlError, Result};
use crate::types::ScopeParams;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Separator between scope segments
pub const SEGMENT_SEPARATOR: &str = ":";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Parameter(String),
}

/// A parsed scope template
///
/// # Examples
///
/// ```
/// use accesscontrol::scope::{combine, parameter, ScopeTemplate};
/// use accesscontrol::ScopeParams;
///
/// let template = ScopeTemplate::parse(&combine(["reports", parameter(":reportId").as_str()])).unwrap();
/// let params = ScopeParams::from([(":reportId".to_string(), "1".to_string())]);
/// assert_eq!(template.resolve(&params).unwrap(), "reports:1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTemplate {
    raw: String,
    parts: Vec<Part>,
}

impl ScopeTemplate {
    /// Parses a template
    ///
    /// # Errors
    ///
    /// Returns `MalformedTemplate` if a `{{` is never closed or a placeholder
    /// names an empty or brace-containing key.
    pub fn parse(template: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                parts.push(Part::Literal(rest[..start].to_string()));
            }

            let after = &rest[start + OPEN.len()..];
            let end = after
                .find(CLOSE)
                .ok_or_else(|| malformed(template, "unclosed placeholder '{{'"))?;

            let key = after[..end].trim();
            if key.is_empty() {
                return Err(malformed(template, "empty parameter name"));
            }
            if key.contains('{') || key.contains('}') {
                return Err(malformed(
                    template,
                    format!("invalid parameter name '{}'", key),
                ));
            }

            parts.push(Part::Parameter(key.to_string()));
            rest = &after[end + CLOSE.len()..];
        }

        if !rest.is_empty() {
            parts.push(Part::Literal(rest.to_string()));
        }

        Ok(Self {
            raw: template.to_string(),
            parts,
        })
    }

    /// True when the template has no placeholders
    pub fn is_literal(&self) -> bool {
        self.parts.iter().all(|part| matches!(part, Part::Literal(_)))
    }

    /// Parameter keys referenced by the template, in order of appearance
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Parameter(key) => Some(key.as_str()),
            Part::Literal(_) => None,
        })
    }

    /// Substitutes every placeholder with its value from `params`
    ///
    /// # Errors
    ///
    /// Returns `MissingParameter` for the first key absent from `params`.
    pub fn resolve(&self, params: &ScopeParams) -> Result<String> {
        let mut resolved = String::with_capacity(self.raw.len());

        for part in &self.parts {
            match part {
                Part::Literal(text) => resolved.push_str(text),
                Part::Parameter(key) => {
                    let value = params.get(key).ok_or_else(|| {
                        AccessControlError::MissingParameter {
                            key: key.clone(),
                            template: self.raw.clone(),
                        }
                    })?;
                    resolved.push_str(value);
                }
            }
        }

        Ok(resolved)
    }

    /// Returns the unparsed template
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ScopeTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Resolves a template string against request parameters
pub fn resolve(template: &str, params: &ScopeParams) -> Result<String> {
    ScopeTemplate::parse(template)?.resolve(params)
}

/// Checks whether a scope still carries placeholders
pub fn has_parameters(scope: &str) -> Result<bool> {
    if !scope.contains(OPEN) {
        return Ok(false);
    }
    Ok(!ScopeTemplate::parse(scope)?.is_literal())
}

/// Placeholder for the request parameter `key`
pub fn parameter(key: &str) -> String {
    format!("{}{}{}", OPEN, key, CLOSE)
}

/// Joins scope parts with `:`
pub fn combine<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut combined = String::new();
    for (idx, part) in parts.into_iter().enumerate() {
        if idx > 0 {
            combined.push_str(SEGMENT_SEPARATOR);
        }
        combined.push_str(part.as_ref());
    }
    combined
}

fn malformed(template: &str, reason: impl Into<String>) -> AccessControlError {
    AccessControlError::MalformedTemplate {
        template: template.to_string(),
        reason: reason.into(),
    }
}
