//! Route tags: named, reusable regex fragments.
//!
//! A tag is referenced from a pattern with the marker `[!:name:!]`. Before a
//! pattern is parsed, every marker of a registered tag is rewritten to the
//! tag's fragment wrapped in a non-capturing group. Markers are matched
//! case-insensitively, so `[!:Year:!]` resolves the tag `year`.
//!
//! ```
//! use rhtmx_pathfinder::tag::TagRegistry;
//!
//! let mut tags = TagRegistry::new();
//! tags.add("year", "[0-9]{4}").unwrap();
//!
//! let substituted = tags.substitute("/archive/[!:year:!]").unwrap();
//! assert_eq!(substituted.text(), "/archive/(?:[0-9]{4})");
//! ```

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::ValidationError;

static TAG_NAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-]+$").unwrap());

// Wider than a valid tag name on purpose: `[!:bad_name:!]` still counts as a
// marker and is reported as unresolved.
static TAG_MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[!:([A-Za-z0-9_\-]+):!\]").unwrap());

/// Returns the literal marker text that references `name` in a pattern.
pub fn marker(name: &str) -> String {
    format!("[!:{}:!]", name)
}

/// Checks a tag name against `[A-Za-z0-9-]+`.
pub fn is_valid_tag_name(name: &str) -> bool {
    TAG_NAME_REGEX.is_match(name)
}

/// Returns the name of the first tag marker left in `text`, if any.
pub fn find_unresolved(text: &str) -> Option<String> {
    TAG_MARKER_REGEX
        .captures(text)
        .map(|caps| caps[1].to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Tag {
    name: String,
    replacement: String,
}

/// Append-only registry of tags, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: Vec<Tag>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` as a substitution for `partial_regex`.
    ///
    /// Adding a name that already exists (compared case-insensitively)
    /// replaces its fragment in place.
    pub fn add(&mut self, name: &str, partial_regex: &str) -> Result<(), ValidationError> {
        if !is_valid_tag_name(name) {
            return Err(ValidationError::InvalidTagName(name.to_string()));
        }

        let replacement = format!("(?:{})", partial_regex);
        debug!(tag = name, %replacement, "registering route tag");

        match self
            .tags
            .iter_mut()
            .find(|tag| tag.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.replacement = replacement,
            None => self.tags.push(Tag {
                name: name.to_string(),
                replacement,
            }),
        }
        Ok(())
    }

    /// Returns the wrapped replacement for a tag, looked up case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.name.eq_ignore_ascii_case(name))
            .map(|tag| tag.replacement.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Tag names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|tag| tag.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Rewrites the markers of each tag in registration order, then fails
    /// with [`ValidationError::UnknownTagReference`] if any marker survives.
    ///
    /// A fragment may reference tags registered after it: their markers are
    /// expanded by the later passes. References to earlier tags stay
    /// unresolved.
    pub fn substitute(&self, pattern: &str) -> Result<SubstitutedPattern, ValidationError> {
        let mut substituted = SubstitutedPattern::verbatim(pattern);
        for tag in &self.tags {
            substituted.expand(tag);
        }

        if let Some(unknown) = find_unresolved(&substituted.text) {
            return Err(ValidationError::UnknownTagReference(unknown));
        }
        Ok(substituted)
    }
}

/// Where a tag marker was replaced: its range in the source pattern and the
/// range its fragment occupies in the substituted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan {
    pub tag: String,
    pub source: Range<usize>,
    pub text: Range<usize>,
}

/// A pattern after tag substitution, remembering where each tag landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutedPattern {
    source: String,
    text: String,
    spans: Vec<TagSpan>,
}

impl SubstitutedPattern {
    /// Wraps a pattern that needs no substitution.
    pub fn verbatim(pattern: &str) -> Self {
        Self {
            source: pattern.to_string(),
            text: pattern.to_string(),
            spans: Vec::new(),
        }
    }

    /// The pattern as written by the caller.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The pattern with every tag marker replaced.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[TagSpan] {
        &self.spans
    }

    /// The tag span starting exactly at `pos` in the substituted text.
    pub fn span_starting_at(&self, pos: usize) -> Option<&TagSpan> {
        self.spans.iter().find(|span| span.text.start == pos)
    }

    /// Replaces every marker of `tag` in the current text.
    ///
    /// A marker inside an earlier fragment grows that fragment's span; any
    /// other marker came from the source and opens a span of its own.
    fn expand(&mut self, tag: &Tag) {
        let markers: Vec<(Range<usize>, String)> = TAG_MARKER_REGEX
            .captures_iter(&self.text)
            .filter(|caps| caps[1].eq_ignore_ascii_case(&tag.name))
            .filter_map(|caps| caps.get(0).map(|whole| (whole.range(), caps[1].to_string())))
            .collect();

        // Back to front so the remaining marker offsets stay valid
        for (range, name) in markers.into_iter().rev() {
            let grown = tag.replacement.len() as isize - range.len() as isize;
            let shift = |pos: usize| (pos as isize + grown) as usize;

            let enclosing = self
                .spans
                .iter()
                .position(|span| span.text.start <= range.start && range.end <= span.text.end);

            let following = match enclosing {
                Some(index) => {
                    self.spans[index].text.end = shift(self.spans[index].text.end);
                    index + 1
                }
                None => {
                    let source_start = self.to_source(range.start);
                    let index = self.spans.partition_point(|span| span.text.end <= range.start);
                    self.spans.insert(
                        index,
                        TagSpan {
                            tag: name,
                            source: source_start..source_start + range.len(),
                            text: range.start..range.start + tag.replacement.len(),
                        },
                    );
                    index + 1
                }
            };

            for span in &mut self.spans[following..] {
                span.text.start = shift(span.text.start);
                span.text.end = shift(span.text.end);
            }
            self.text.replace_range(range, &tag.replacement);
        }
    }

    /// Maps a byte offset in the substituted text back to the source pattern.
    ///
    /// Offsets inside a tag fragment map to the start of its marker.
    pub fn to_source(&self, pos: usize) -> usize {
        let mut delta: isize = 0;
        for span in &self.spans {
            if pos < span.text.start {
                break;
            }
            if pos < span.text.end {
                return span.source.start;
            }
            delta = span.source.end as isize - span.text.end as isize;
        }
        (pos as isize + delta) as usize
    }
}
