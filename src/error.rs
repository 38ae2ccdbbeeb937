//! Parse Error Surface
//!
//! Errors produced while building the document tree. None of these are
//! fatal: the tree is always delivered in a self-consistent state, and
//! anomalies are recorded here for the caller to inspect on
//! `Document::parse_errors`.

/// Kind of anomaly recorded during parsing.
///
/// Only [`ParseErrorKind::TagNotOpened`] and [`ParseErrorKind::MatcherTimeout`]
/// are ever produced by this core. The rest are reserved for surrounding
/// collaborators (entity decoding, encoding detection) that share this
/// error surface but live outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A closing tag had no matching open element on the stack.
    TagNotOpened,
    /// An open element was never closed (recorded only when a collaborator
    /// opts in; the core's own default recovery is silent implicit close).
    TagNotClosed,
    /// Reserved for an encoding-detection collaborator.
    EncodingError,
    /// Reserved for an attribute-validation collaborator.
    InvalidAttribute,
    /// Reserved for a character-reference-decoding collaborator.
    CharRefInvalid,
    /// Reserved: an end tag was present where none is required (e.g. a void element).
    EndTagNotRequired,
    /// Reserved: an end tag's name does not match any element kind.
    EndTagInvalid,
    /// A matcher (balanced-tag or raw-text body) exceeded its deadline and
    /// the core fell back to a literal substring search.
    MatcherTimeout,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ParseErrorKind::TagNotOpened => "tag not opened",
            ParseErrorKind::TagNotClosed => "tag not closed",
            ParseErrorKind::EncodingError => "encoding error",
            ParseErrorKind::InvalidAttribute => "invalid attribute",
            ParseErrorKind::CharRefInvalid => "invalid character reference",
            ParseErrorKind::EndTagNotRequired => "end tag not required",
            ParseErrorKind::EndTagInvalid => "invalid end tag",
            ParseErrorKind::MatcherTimeout => "matcher timeout",
        };
        write!(f, "{}", label)
    }
}

/// A single recorded parse anomaly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub reason: String,
    /// Present only when `extract_error_source_text` is enabled on the DOM.
    pub snippet: Option<String>,
}

impl ParseError {
    pub fn new(
        kind: ParseErrorKind,
        line: usize,
        column: usize,
        offset: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            line,
            column,
            offset,
            reason: reason.into(),
            snippet: None,
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}:{} (offset {}): {}",
            self.kind, self.line, self.column, self.offset, self.reason
        )?;
        if let Some(snippet) = &self.snippet {
            write!(f, "\n  --> {}", snippet)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Failure of a call's precondition — the only failure mode that aborts
/// `parse` outright rather than being recorded and recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// `parse` was called with no input (`None`, the Rust analogue of null).
    MissingInput,
}

impl std::fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreconditionError::MissingInput => write!(f, "parse called with no input"),
        }
    }
}

impl std::error::Error for PreconditionError {}

/// Cap a source snippet to `max_len` bytes on a char boundary.
pub fn truncate_snippet(source: &str, start: usize, max_len: usize) -> String {
    let end = (start + max_len).min(source.len());
    let mut end = end;
    while end > start && !source.is_char_boundary(end) {
        end -= 1;
    }
    let mut start_adj = start;
    while start_adj < end && !source.is_char_boundary(start_adj) {
        start_adj += 1;
    }
    source[start_adj..end].to_string()
}
