//! Pattern compiler
//!
//! Turns a tag-substituted pattern into a match regex, the ordered list of
//! placeholder variables and the replacer map used for reverse building.
//! Compilation is deterministic: the same pattern and tags always give the
//! same regex text and variable order.

use std::collections::BTreeMap;
use std::ops::Range;

use regex::Regex;

use super::parser::{parse_placeholders, Token};
use crate::error::ValidationError;
use crate::tag::{SubstitutedPattern, TagRegistry};

/// A placeholder as compiled into the match regex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    /// The regex fragment inside this variable's capturing group.
    pub fragment: String,
    /// Index of the capturing group in the match regex.
    pub group: usize,
    /// Byte range of the placeholder text in the source pattern.
    pub source_span: Range<usize>,
}

/// The matchable form of a route pattern.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: String,
    regex_source: String,
    matcher: Regex,
    variables: Vec<Variable>,
    replacer: BTreeMap<String, String>,
    literal_tags: Vec<String>,
}

impl CompiledPattern {
    /// The pattern exactly as registered, before tag substitution.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The synthesized, unanchored regex text.
    pub fn regex_source(&self) -> &str {
        &self.regex_source
    }

    /// The anchored regex used for matching.
    pub fn regex(&self) -> &Regex {
        &self.matcher
    }

    /// Variables in declaration order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }

    /// Placeholder name → the placeholder's literal text in the source pattern.
    pub fn replacer(&self) -> &BTreeMap<String, String> {
        &self.replacer
    }

    /// Tags referenced outside any placeholder, in source order.
    pub fn literal_tags(&self) -> &[String] {
        &self.literal_tags
    }

    /// Whether a concrete path can be rebuilt from variable values alone.
    pub fn is_reversible(&self) -> bool {
        self.literal_tags.is_empty()
    }

    /// Full, anchored match of `path`.
    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    /// Matches `path` and returns the captured values in declaration order.
    pub fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let caps = self.matcher.captures(path)?;
        Some(
            self.variables
                .iter()
                .map(|var| {
                    let value = caps.get(var.group).map_or("", |m| m.as_str());
                    (var.name.clone(), value.to_string())
                })
                .collect(),
        )
    }
}

/// Substitutes tags into `pattern` and compiles the result.
///
/// # Examples
///
/// ```
/// use rhtmx_pathfinder::pattern::compile;
/// use rhtmx_pathfinder::tag::TagRegistry;
///
/// let compiled = compile("/users/{id: [0-9]+}", &TagRegistry::new()).unwrap();
/// assert_eq!(compiled.regex_source(), r"/users/([0-9]+)");
/// assert_eq!(compiled.replacer()["id"], "{id: [0-9]+}");
/// assert!(compiled.is_match("/users/42"));
/// ```
pub fn compile(pattern: &str, tags: &TagRegistry) -> Result<CompiledPattern, ValidationError> {
    let substituted = tags.substitute(pattern)?;
    compile_substituted(&substituted)
}

/// Compiles an already substituted pattern.
pub fn compile_substituted(
    substituted: &SubstitutedPattern,
) -> Result<CompiledPattern, ValidationError> {
    let source = substituted.source();
    let mut regex_source = String::new();
    let mut variables: Vec<Variable> = Vec::new();
    let mut replacer = BTreeMap::new();
    let mut literal_tags = Vec::new();
    let mut next_group = 1;

    for token in parse_placeholders(substituted) {
        match token {
            Token::Literal(run) => regex_source.push_str(&regex::escape(run)),
            Token::Raw { tag, regex } => {
                next_group += count_groups(regex, source)?;
                regex_source.push_str(regex);
                literal_tags.push(tag.to_string());
            }
            Token::Placeholder(placeholder) => {
                if variables.iter().any(|var| var.name == placeholder.name) {
                    return Err(ValidationError::DuplicatePlaceholder {
                        name: placeholder.name.to_string(),
                        pattern: source.to_string(),
                    });
                }

                let fragment = placeholder.fragment();
                regex_source.push('(');
                regex_source.push_str(fragment);
                regex_source.push(')');

                let start = substituted.to_source(placeholder.span.start);
                let end = substituted.to_source(placeholder.span.end).max(start);
                replacer.insert(placeholder.name.to_string(), source[start..end].to_string());

                variables.push(Variable {
                    name: placeholder.name.to_string(),
                    fragment: fragment.to_string(),
                    group: next_group,
                    source_span: start..end,
                });
                next_group += 1 + count_groups(fragment, source)?;
            }
        }
    }

    let matcher = Regex::new(&format!("^(?:{})$", regex_source)).map_err(|source_err| {
        ValidationError::InvalidRegex {
            pattern: source.to_string(),
            source: source_err,
        }
    })?;

    Ok(CompiledPattern {
        pattern: source.to_string(),
        regex_source,
        matcher,
        variables,
        replacer,
        literal_tags,
    })
}

/// Capturing groups a fragment opens on its own.
fn count_groups(fragment: &str, pattern: &str) -> Result<usize, ValidationError> {
    Regex::new(fragment)
        .map(|re| re.captures_len() - 1)
        .map_err(|source| ValidationError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })
}
