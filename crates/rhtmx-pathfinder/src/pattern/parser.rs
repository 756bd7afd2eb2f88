//! Placeholder grammar parser
//!
//! Splits a tag-substituted pattern into literal runs, raw tag fragments and
//! placeholders. Pure functions: same input → same tokens, no side effects
//! beyond a `warn!` for braces that are left literal.
//!
//! # Grammar
//!
//! ```text
//! placeholder := '{' ws* name ws* ( ':' fragment )? '}'
//! name        := [A-Za-z] [A-Za-z0-9_]*
//! fragment    := text with balanced '{' '}' pairs, trimmed
//! ```
//!
//! A missing or empty fragment means [`DEFAULT_FRAGMENT`]. A `{` that does not
//! open a well-formed placeholder is kept as literal text; parsing never fails.

use std::ops::Range;

use tracing::warn;

use crate::tag::SubstitutedPattern;

/// Fragment used by `{name}`: one or more non-separator characters.
pub const DEFAULT_FRAGMENT: &str = "[^/]+";

/// One token of a parsed pattern, borrowing from the substituted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text matched literally.
    Literal(&'a str),
    /// A tag fragment found outside any placeholder; emitted into the regex
    /// as-is.
    Raw { tag: &'a str, regex: &'a str },
    Placeholder(Placeholder<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub name: &'a str,
    /// The trimmed custom fragment, `None` when the default applies.
    pub custom: Option<&'a str>,
    /// Byte range of the whole `{...}` in the substituted text.
    pub span: Range<usize>,
}

impl<'a> Placeholder<'a> {
    /// The regex fragment this placeholder captures with.
    pub fn fragment(&self) -> &'a str {
        self.custom.unwrap_or(DEFAULT_FRAGMENT)
    }
}

/// Tokenizes a substituted pattern in source order.
///
/// # Examples
///
/// ```
/// use rhtmx_pathfinder::pattern::parser::{parse_placeholders, Token};
/// use rhtmx_pathfinder::tag::SubstitutedPattern;
///
/// let pattern = SubstitutedPattern::verbatim("/users/{id: [0-9]+}");
/// let tokens = parse_placeholders(&pattern);
///
/// assert_eq!(tokens[0], Token::Literal("/users/"));
/// assert!(matches!(&tokens[1], Token::Placeholder(p) if p.name == "id" && p.fragment() == "[0-9]+"));
/// ```
pub fn parse_placeholders(pattern: &SubstitutedPattern) -> Vec<Token<'_>> {
    let text = pattern.text();
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        // Tag fragments in literal position are opaque: their braces are
        // regex quantifiers, never placeholders.
        if let Some(span) = pattern.span_starting_at(pos) {
            push_literal(&mut tokens, &text[literal_start..pos]);
            tokens.push(Token::Raw {
                tag: &span.tag,
                regex: &text[span.text.clone()],
            });
            pos = span.text.end;
            literal_start = pos;
            continue;
        }

        if text.as_bytes()[pos] == b'{' {
            match scan_placeholder(text, pos) {
                Some(placeholder) => {
                    push_literal(&mut tokens, &text[literal_start..pos]);
                    pos = placeholder.span.end;
                    literal_start = pos;
                    tokens.push(Token::Placeholder(placeholder));
                    continue;
                }
                None => warn!(
                    pattern = pattern.source(),
                    offset = pattern.to_source(pos),
                    "brace does not open a placeholder; matching it literally"
                ),
            }
        }

        pos += text[pos..].chars().next().map_or(1, char::len_utf8);
    }

    push_literal(&mut tokens, &text[literal_start..]);
    tokens
}

fn push_literal<'a>(tokens: &mut Vec<Token<'a>>, run: &'a str) {
    if !run.is_empty() {
        tokens.push(Token::Literal(run));
    }
}

/// Tries to read a placeholder whose `{` sits at `start`.
fn scan_placeholder(text: &str, start: usize) -> Option<Placeholder<'_>> {
    let bytes = text.as_bytes();
    let mut i = skip_whitespace(bytes, start + 1);

    let name_start = i;
    if !bytes.get(i)?.is_ascii_alphabetic() {
        return None;
    }
    while bytes
        .get(i)
        .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
    {
        i += 1;
    }
    let name = &text[name_start..i];
    i = skip_whitespace(bytes, i);

    match bytes.get(i)? {
        b'}' => Some(Placeholder {
            name,
            custom: None,
            span: start..i + 1,
        }),
        b':' => {
            let fragment_start = i + 1;
            let fragment_end = find_closing_brace(bytes, fragment_start)?;
            let custom = text[fragment_start..fragment_end].trim();
            Some(Placeholder {
                name,
                custom: (!custom.is_empty()).then_some(custom),
                span: start..fragment_end + 1,
            })
        }
        _ => None,
    }
}

/// Finds the `}` closing a fragment, stepping over balanced inner pairs.
fn find_closing_brace(bytes: &[u8], from: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, byte) in bytes[from..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(from + offset),
            b'}' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    i
}
