//! Configuration options recognized by the DOM (`spec.md` §6).
//!
//! Plain data, no hidden global state — mirrors the teacher's
//! `ProcessArgs`/`OutputFormat` pair in `src/api.rs`.

/// Default cap on a recorded parse error's source snippet, in bytes.
pub const DEFAULT_ERROR_SNIPPET_MAX_LEN: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Build/maintain the `id` → element index.
    pub use_id_attribute: bool,
    /// Emit `TagNotOpened` for unmatched close tags.
    pub check_syntax: bool,
    /// Mark unclosed elements as implicitly closed on EOF.
    pub auto_close_on_end: bool,
    /// Keep whitespace-only text tokens (they are always kept as tokens;
    /// this controls whether the tree builder appends them as DOM nodes).
    pub preserve_whitespace: bool,
    /// Create Comment nodes for CDATA sections instead of Text.
    pub treat_cdata_as_comment: bool,
    /// Include a source snippet in recorded parse errors.
    pub extract_error_source_text: bool,
    /// Cap on that snippet's length, in bytes.
    pub extract_error_source_text_max_length: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            use_id_attribute: false,
            check_syntax: false,
            auto_close_on_end: true,
            preserve_whitespace: false,
            treat_cdata_as_comment: false,
            extract_error_source_text: false,
            extract_error_source_text_max_length: DEFAULT_ERROR_SNIPPET_MAX_LEN,
        }
    }
}
