//! Pattern Library
//!
//! A fixed catalogue of compiled matchers, built once and shared read-only
//! for the lifetime of a `PatternLibrary`. All patterns are ASCII-only
//! case-insensitive (`(?i-u)`, never full Unicode case folding — invariant
//! 5 of the data model) with single-line semantics (`(?s)`, `.` matches any
//! byte including newline).
//!
//! Group names are normative: the tokenizer and attribute parser read
//! captures by name, not by index.

use regex::Regex;

/// Void elements: forbid content, have no closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr", "basefont", "bgsound", "frame", "isindex", "keygen",
];

/// Raw-text elements: body is not parsed as HTML, ends only at the literal closing tag.
pub const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "plaintext", "listing",
];

/// Block elements, used by the `p`-closes-before-block implicit-close rule
/// and by the element classifier.
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "canvas",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "li",
    "main",
    "nav",
    "noscript",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tfoot",
    "ul",
    "video",
];

const TAG_NAME: &str = r"[A-Za-z][A-Za-z0-9:-]*";
const ATTRS_SECTION: &str = r#"(?:\s+[^\s=/>"']+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>"']+))?)*"#;

fn alternation(names: &[&str]) -> String {
    names.join("|")
}

/// Compiled matchers used by the tokenizer, attribute parser, and tree builder.
///
/// Construct once (`PatternLibrary::new()`) and reuse across calls to
/// `parse` — every field is a read-only, thread-safe compiled `Regex`.
pub struct PatternLibrary {
    /// Anchored, at-position alternation over every token kind. Tried from
    /// the start of whatever suffix of the input is passed to it.
    pub master: Regex,
    /// Iterated over a tag's raw attribute slice, one match per attribute.
    pub attribute: Regex,
    /// Anchored matcher classifying a single lowercased tag name.
    pub element_class: Regex,
    /// Anchored matcher over the string `"<current>:<incoming>"` encoding
    /// the implicit-close pair table.
    pub implicit_close: Regex,
}

impl PatternLibrary {
    pub fn new() -> Self {
        let block_alt = alternation(BLOCK_ELEMENTS);
        let void_alt = alternation(VOID_ELEMENTS);
        let rawtext_alt = alternation(RAW_TEXT_ELEMENTS);

        let master_pattern = format!(
            r#"(?s)(?i-u)^(?:(?P<doctype><!DOCTYPE(?P<doctypecontent>[^>]*)>)|(?P<comment><!--(?P<commentcontent>.*?)-->)|(?P<cdata><!\[CDATA\[(?P<cdatacontent>.*?)\]\]>)|(?P<servercode><%(?P<servercodecontent>.*?)%>)|(?P<selfclose><(?P<scname>{name})(?P<scattrs>{attrs})\s*/\s*>)|(?P<opentag><(?P<otname>{name})(?P<otattrs>{attrs})\s*>)|(?P<closetag></(?P<ctname>{name})\s*>)|(?P<text>[^<]+))"#,
            name = TAG_NAME,
            attrs = ATTRS_SECTION,
        );

        let attribute_pattern = format!(
            r#"(?i-u)(?P<name>[^\s=/>"']+)(?:\s*=\s*(?:"(?P<dqval>[^"]*)"|'(?P<sqval>[^']*)'|(?P<uqval>[^\s>"']+)))?"#
        );

        let element_class_pattern = format!(
            r"(?i-u)^(?:(?P<void>{void})|(?P<rawtext>{rawtext})|(?P<block>{block}))$",
            void = void_alt,
            rawtext = rawtext_alt,
            block = block_alt,
        );

        // Implicit-close pair table, matched against "<current>:<incoming>".
        let implicit_close_pattern = format!(
            r"(?i-u)^(?:p:(?:{block})|li:li|(?:dt|dd):(?:dt|dd)|(?:td|th):(?:td|th|tr)|tr:tr|option:option|optgroup:optgroup|(?:rb|rt|rtc|rp):(?:rb|rt|rtc|rp))$",
            block = block_alt,
        );

        Self {
            master: Regex::new(&master_pattern).expect("master tokenizer pattern must compile"),
            attribute: Regex::new(&attribute_pattern)
                .expect("attribute pattern must compile"),
            element_class: Regex::new(&element_class_pattern)
                .expect("element classifier pattern must compile"),
            implicit_close: Regex::new(&implicit_close_pattern)
                .expect("implicit-close pattern must compile"),
        }
    }

    pub fn is_void(&self, name_lower: &str) -> bool {
        self.element_class
            .captures(name_lower)
            .map(|c| c.name("void").is_some())
            .unwrap_or(false)
    }

    pub fn is_raw_text(&self, name_lower: &str) -> bool {
        self.element_class
            .captures(name_lower)
            .map(|c| c.name("rawtext").is_some())
            .unwrap_or(false)
    }

    pub fn is_block(&self, name_lower: &str) -> bool {
        self.element_class
            .captures(name_lower)
            .map(|c| c.name("block").is_some())
            .unwrap_or(false)
    }

    /// Does `cur:new` match one of the implicit-close pairs?
    pub fn closes_implicitly(&self, cur: &str, new: &str) -> bool {
        let probe = format!("{}:{}", cur, new);
        self.implicit_close.is_match(&probe)
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_void_elements() {
        let patterns = PatternLibrary::new();
        assert!(patterns.is_void("br"));
        assert!(patterns.is_void("IMG".to_lowercase().as_str()));
        assert!(!patterns.is_void("div"));
    }

    #[test]
    fn classifies_raw_text_elements() {
        let patterns = PatternLibrary::new();
        assert!(patterns.is_raw_text("script"));
        assert!(patterns.is_raw_text("textarea"));
        assert!(!patterns.is_raw_text("span"));
    }

    #[test]
    fn p_closes_before_block() {
        let patterns = PatternLibrary::new();
        assert!(patterns.closes_implicitly("p", "div"));
        assert!(patterns.closes_implicitly("p", "h3"));
        assert!(!patterns.closes_implicitly("p", "span"));
    }

    #[test]
    fn li_closes_before_li_only() {
        let patterns = PatternLibrary::new();
        assert!(patterns.closes_implicitly("li", "li"));
        assert!(!patterns.closes_implicitly("li", "p"));
    }

    #[test]
    fn td_th_tr_pairs() {
        let patterns = PatternLibrary::new();
        assert!(patterns.closes_implicitly("td", "tr"));
        assert!(patterns.closes_implicitly("th", "td"));
        assert!(patterns.closes_implicitly("tr", "tr"));
        assert!(!patterns.closes_implicitly("tr", "td"));
    }

    #[test]
    fn master_matches_opentag_at_position() {
        let patterns = PatternLibrary::new();
        let caps = patterns.master.captures("<div class=\"x\">rest").unwrap();
        assert!(caps.name("opentag").is_some());
        assert_eq!(&caps["otname"], "div");
    }

    #[test]
    fn master_prefers_selfclose_over_opentag() {
        let patterns = PatternLibrary::new();
        let caps = patterns.master.captures("<br/>rest").unwrap();
        assert!(caps.name("selfclose").is_some());
        assert!(caps.name("opentag").is_none());
    }

    #[test]
    fn master_matches_text_fallback() {
        let patterns = PatternLibrary::new();
        let caps = patterns.master.captures("hello <div>").unwrap();
        assert!(caps.name("text").is_some());
        assert_eq!(&caps["text"], "hello ");
    }
}
