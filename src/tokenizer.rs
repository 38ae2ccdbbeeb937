//! Tokenizer (`spec.md` §4.2)
//!
//! Walks the input left-to-right with the master matcher, emitting a
//! strictly ordered token list. Raw-text elements (`script`, `style`,
//! `textarea`, `title`, …) take a detour through the quote-aware body
//! scanner in [`crate::balanced`] so their content is never mistaken for
//! markup.

use crate::attributes::parse_attributes;
use crate::balanced::{scan_raw_text_body, Deadline, RawTextBody};
use crate::error::{ParseError, ParseErrorKind};
use crate::patterns::PatternLibrary;
use crate::position::LineTracker;
use crate::token::{Token, TokenKind};

pub struct Tokenizer<'a> {
    input: &'a str,
    patterns: &'a PatternLibrary,
    tracker: LineTracker,
    deadline_budget: Deadline,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str, patterns: &'a PatternLibrary) -> Self {
        Self {
            input,
            patterns,
            tracker: LineTracker::new(input),
            deadline_budget: Deadline::default_budget(),
        }
    }

    /// Run the full tokenizer algorithm: master-matcher walk, raw-text
    /// detours, then the attribute post-pass over every tag token.
    pub fn tokenize_with_attributes(&self) -> (Vec<Token>, Vec<ParseError>) {
        let (mut tokens, errors) = self.tokenize();
        for token in &mut tokens {
            if matches!(token.kind, TokenKind::OpenTag | TokenKind::SelfCloseTag) {
                if let Some(raw) = &token.raw_attributes {
                    let attrs =
                        parse_attributes(self.patterns, &self.tracker, raw, token.attr_base());
                    token.attributes = Some(attrs);
                }
            }
        }
        (tokens, errors)
    }

    fn tokenize(&self) -> (Vec<Token>, Vec<ParseError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        let mut pos = 0usize;
        let len = self.input.len();

        while pos < len {
            let rest = &self.input[pos..];
            match self.patterns.master.captures(rest) {
                Some(caps) => {
                    let (token, group_end) = self.build_token(&caps, pos);
                    let is_raw_text_open = matches!(token.kind, TokenKind::OpenTag)
                        && token
                            .name_lower
                            .as_deref()
                            .map(|n| self.patterns.is_raw_text(n))
                            .unwrap_or(false);

                    tokens.push(token);

                    if is_raw_text_open {
                        let tag_lower = tokens.last().unwrap().name_lower.clone().unwrap();
                        pos = self.consume_raw_text(group_end, &tag_lower, &mut tokens, &mut errors);
                    } else {
                        pos = group_end;
                    }
                }
                None => {
                    // Should not happen: the master alternation's final
                    // `text` branch matches any single `[^<]+` run, and a
                    // lone `<` with nothing recognizable after it still
                    // falls through to `text` only if not at position 0
                    // of a `<`. Fall back to a one-character text token.
                    let (line, column) = self.tracker.locate(pos);
                    let ch_len = rest.chars().next().map(|c| c.len_utf8()).unwrap_or(1);
                    let slice = &self.input[pos..pos + ch_len];
                    tokens.push(Token {
                        kind: TokenKind::Text,
                        name_lower: None,
                        name_original: None,
                        raw_attributes: None,
                        attributes: None,
                        content: Some(slice.to_string()),
                        raw_text: slice.to_string(),
                        offset: pos,
                        length: ch_len,
                        line,
                        column,
                    });
                    pos += ch_len;
                }
            }
        }

        (tokens, errors)
    }

    /// §4.2.1 raw-text subroutine. Returns the advanced position.
    fn consume_raw_text(
        &self,
        start: usize,
        tag_lower: &str,
        tokens: &mut Vec<Token>,
        errors: &mut Vec<ParseError>,
    ) -> usize {
        let result = scan_raw_text_body(self.input, tag_lower, start, self.deadline_budget);
        let (body_end, close_start, close_end, timed_out) = match result {
            RawTextBody::Closed {
                body_end,
                close_start,
                close_end,
                ..
            } => (body_end, close_start, close_end, false),
            RawTextBody::TimedOut {
                body_end,
                close_start,
                close_end,
                ..
            } => (body_end, close_start, close_end, true),
            RawTextBody::Unterminated { .. } => {
                let (line, column) = self.tracker.locate(start);
                let text = &self.input[start..];
                if !text.is_empty() {
                    tokens.push(Token {
                        kind: TokenKind::Text,
                        name_lower: None,
                        name_original: None,
                        raw_attributes: None,
                        attributes: None,
                        content: Some(text.to_string()),
                        raw_text: text.to_string(),
                        offset: start,
                        length: text.len(),
                        line,
                        column,
                    });
                }
                return self.input.len();
            }
        };

        if timed_out {
            let (line, column) = self.tracker.locate(start);
            errors.push(ParseError::new(
                ParseErrorKind::MatcherTimeout,
                line,
                column,
                start,
                format!("raw-text body scan for <{}> exceeded its deadline", tag_lower),
            ));
        }

        if body_end > start {
            let (line, column) = self.tracker.locate(start);
            let text = &self.input[start..body_end];
            tokens.push(Token {
                kind: TokenKind::Text,
                name_lower: None,
                name_original: None,
                raw_attributes: None,
                attributes: None,
                content: Some(text.to_string()),
                raw_text: text.to_string(),
                offset: start,
                length: text.len(),
                line,
                column,
            });
        }

        let (line, column) = self.tracker.locate(close_start);
        tokens.push(Token {
            kind: TokenKind::CloseTag,
            name_lower: Some(tag_lower.to_string()),
            name_original: Some(tag_lower.to_string()),
            raw_attributes: None,
            attributes: None,
            content: None,
            raw_text: self.input[close_start..close_end].to_string(),
            offset: close_start,
            length: close_end - close_start,
            line,
            column,
        });

        close_end
    }

    fn build_token(&self, caps: &regex::Captures, base: usize) -> (Token, usize) {
        let whole = caps.get(0).unwrap();
        let offset = base;
        let length = whole.end();
        let (line, column) = self.tracker.locate(offset);
        let raw_text = whole.as_str().to_string();

        let token = if caps.name("doctype").is_some() {
            let content = caps
                .name("doctypecontent")
                .map(|c| c.as_str().trim().to_string());
            Token {
                kind: TokenKind::DocType,
                name_lower: None,
                name_original: None,
                raw_attributes: None,
                attributes: None,
                content,
                raw_text,
                offset,
                length,
                line,
                column,
            }
        } else if caps.name("comment").is_some() {
            let content = caps.name("commentcontent").map(|c| c.as_str().to_string());
            Token {
                kind: TokenKind::Comment,
                name_lower: None,
                name_original: None,
                raw_attributes: None,
                attributes: None,
                content,
                raw_text,
                offset,
                length,
                line,
                column,
            }
        } else if caps.name("cdata").is_some() {
            let content = caps.name("cdatacontent").map(|c| c.as_str().to_string());
            Token {
                kind: TokenKind::CData,
                name_lower: None,
                name_original: None,
                raw_attributes: None,
                attributes: None,
                content,
                raw_text,
                offset,
                length,
                line,
                column,
            }
        } else if caps.name("servercode").is_some() {
            let content = caps
                .name("servercodecontent")
                .map(|c| c.as_str().to_string());
            Token {
                kind: TokenKind::ServerCode,
                name_lower: None,
                name_original: None,
                raw_attributes: None,
                attributes: None,
                content,
                raw_text,
                offset,
                length,
                line,
                column,
            }
        } else if let Some(name) = caps.name("scname") {
            let raw_attrs = caps.name("scattrs").map(|a| a.as_str().to_string());
            Token {
                kind: TokenKind::SelfCloseTag,
                name_lower: Some(name.as_str().to_ascii_lowercase()),
                name_original: Some(name.as_str().to_string()),
                raw_attributes: raw_attrs,
                attributes: None,
                content: None,
                raw_text,
                offset,
                length,
                line,
                column,
            }
        } else if let Some(name) = caps.name("otname") {
            let raw_attrs = caps.name("otattrs").map(|a| a.as_str().to_string());
            Token {
                kind: TokenKind::OpenTag,
                name_lower: Some(name.as_str().to_ascii_lowercase()),
                name_original: Some(name.as_str().to_string()),
                raw_attributes: raw_attrs,
                attributes: None,
                content: None,
                raw_text,
                offset,
                length,
                line,
                column,
            }
        } else if let Some(name) = caps.name("ctname") {
            Token {
                kind: TokenKind::CloseTag,
                name_lower: Some(name.as_str().to_ascii_lowercase()),
                name_original: Some(name.as_str().to_string()),
                raw_attributes: None,
                attributes: None,
                content: None,
                raw_text,
                offset,
                length,
                line,
                column,
            }
        } else {
            // `text` branch.
            let content = caps.name("text").map(|c| c.as_str().to_string());
            Token {
                kind: TokenKind::Text,
                name_lower: None,
                name_original: None,
                raw_attributes: None,
                attributes: None,
                content,
                raw_text,
                offset,
                length,
                line,
                column,
            }
        };

        (token, offset + length)
    }
}

impl Token {
    /// Byte offset of the start of `raw_attributes` within the whole
    /// document, used by the attribute post-pass. Only meaningful for
    /// `OpenTag`/`SelfCloseTag` tokens, which always have a `name_original`.
    fn attr_base(&self) -> usize {
        let name_len = self.name_original.as_ref().map(|s| s.len()).unwrap_or(0);
        // "<" + name, then raw_attributes begins.
        self.offset + 1 + name_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        let patterns = PatternLibrary::new();
        let tokenizer = Tokenizer::new(input, &patterns);
        tokenizer.tokenize_with_attributes().0
    }

    #[test]
    fn coverage_no_gaps_no_overlap() {
        let input = "<div class=\"x\">Hello <b>world</b></div>";
        let tokens = tokenize(input);
        let mut expected_offset = 0;
        for token in &tokens {
            assert_eq!(token.offset, expected_offset);
            expected_offset += token.length;
        }
        assert_eq!(expected_offset, input.len());
    }

    #[test]
    fn round_trip_raw_text_concat() {
        let input = "<ul><li>A<li>B<li>C</ul>";
        let tokens = tokenize(input);
        let concatenated: String = tokens.iter().map(|t| t.raw_text.as_str()).collect();
        assert_eq!(concatenated, input);
    }

    #[test]
    fn raw_text_opacity_emits_close_tag() {
        let input = "<script>var x = '<div>fake</div>';</script><div>Real</div>";
        let tokens = tokenize(input);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::OpenTag,
                TokenKind::Text,
                TokenKind::CloseTag,
                TokenKind::OpenTag,
                TokenKind::Text,
                TokenKind::CloseTag,
            ]
        );
        assert_eq!(tokens[1].content.as_deref(), Some("var x = '<div>fake</div>';"));
        assert_eq!(tokens[2].name_lower.as_deref(), Some("script"));
    }

    #[test]
    fn void_element_without_self_close_s6() {
        let input = "<p>Line1<br>Line2</p>";
        let tokens = tokenize(input);
        let br = tokens.iter().find(|t| t.name_lower.as_deref() == Some("br"));
        assert!(br.is_some());
        assert_eq!(br.unwrap().kind, TokenKind::OpenTag);
    }

    #[test]
    fn attributes_parsed_with_offsets() {
        let input = "<div id=\"x\" data-n=1>";
        let tokens = tokenize(input);
        let attrs = tokens[0].attributes.as_ref().unwrap();
        assert_eq!(attrs[0].name_lower, "id");
        assert_eq!(attrs[0].value.as_deref(), Some("x"));
        assert_eq!(&input[attrs[0].value_offset.unwrap()..attrs[0].value_offset.unwrap() + 1], "x");
    }
}
