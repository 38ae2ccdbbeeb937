//! Attribute Parser
//!
//! Converts a tag's raw attribute slice into an ordered sequence of
//! [`AttributeRecord`]s. Invoked from the tokenizer's post-pass over every
//! `OpenTag`/`SelfCloseTag`, and on demand from the tree builder.

use crate::patterns::PatternLibrary;
use crate::position::LineTracker;
use crate::token::{AttributeRecord, Quote};

/// Parse a tag's raw attribute slice.
///
/// `base` is the byte offset of `slice`'s first character within the whole
/// document, used to compute absolute `name_offset`/`value_offset`.
/// `tracker` resolves those absolute offsets to `(line, column)`.
///
/// Duplicate attribute names are retained in order; de-duplication (if
/// ever needed) is the DOM's responsibility, not the parser's.
pub fn parse_attributes(
    patterns: &PatternLibrary,
    tracker: &LineTracker,
    slice: &str,
    base: usize,
) -> Vec<AttributeRecord> {
    let mut out = Vec::new();
    for caps in patterns.attribute.captures_iter(slice) {
        let whole = caps.get(0).unwrap();
        let name_match = caps.name("name").unwrap();
        let name_original = name_match.as_str().to_string();
        let name_lower = name_original.to_ascii_lowercase();
        let name_offset = base + name_match.start();
        let (line, column) = tracker.locate(name_offset);

        let (value, quote, value_offset) = if let Some(dq) = caps.name("dqval") {
            (Some(dq.as_str().to_string()), Quote::Double, Some(base + dq.start()))
        } else if let Some(sq) = caps.name("sqval") {
            (Some(sq.as_str().to_string()), Quote::Single, Some(base + sq.start()))
        } else if let Some(uq) = caps.name("uqval") {
            (Some(uq.as_str().to_string()), Quote::None, Some(base + uq.start()))
        } else {
            (None, Quote::Absent, None)
        };

        // Guard against a zero-width match (shouldn't occur given the
        // pattern always consumes at least the attribute name, but keeps
        // captures_iter from ever spinning on an empty slice).
        if whole.as_str().is_empty() {
            continue;
        }

        out.push(AttributeRecord {
            name_lower,
            name_original,
            value,
            quote,
            name_offset,
            value_offset,
            line,
            column,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(slice: &str) -> Vec<AttributeRecord> {
        let patterns = PatternLibrary::new();
        let tracker = LineTracker::new(slice);
        parse_attributes(&patterns, &tracker, slice, 0)
    }

    #[test]
    fn mixed_quoting_s5() {
        let attrs = parse(r#" single='v1' double="v2" unq=v3 flag"#);
        assert_eq!(attrs.len(), 4);
        assert_eq!(attrs[0].name_lower, "single");
        assert_eq!(attrs[0].quote, Quote::Single);
        assert_eq!(attrs[0].value.as_deref(), Some("v1"));
        assert_eq!(attrs[1].quote, Quote::Double);
        assert_eq!(attrs[1].value.as_deref(), Some("v2"));
        assert_eq!(attrs[2].quote, Quote::None);
        assert_eq!(attrs[2].value.as_deref(), Some("v3"));
        assert_eq!(attrs[3].quote, Quote::Absent);
        assert_eq!(attrs[3].value, None);
    }

    #[test]
    fn preserves_original_case() {
        let attrs = parse(r#" Data-Id="7""#);
        assert_eq!(attrs[0].name_original, "Data-Id");
        assert_eq!(attrs[0].name_lower, "data-id");
    }

    #[test]
    fn duplicate_names_retained_in_order() {
        let attrs = parse(r#" class="a" class="b""#);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].value.as_deref(), Some("a"));
        assert_eq!(attrs[1].value.as_deref(), Some("b"));
    }
}
