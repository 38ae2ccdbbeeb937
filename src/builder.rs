//! Tree Builder (`spec.md` §4.4)
//!
//! Consumes the token stream in order, maintaining a stack of open
//! elements rooted at the document node, and applies the void,
//! self-close, raw-text, implicit-close, and close-tag-recovery rules.

use ego_tree::NodeId;

use crate::dom::{Document, NodeKind, DOCTYPE_NAME_SENTINEL};
use crate::error::{ParseError, ParseErrorKind};
use crate::patterns::PatternLibrary;
use crate::token::{Token, TokenKind};

pub struct TreeBuilder<'a> {
    patterns: &'a PatternLibrary,
    stack: Vec<NodeId>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(patterns: &'a PatternLibrary) -> Self {
        Self {
            patterns,
            stack: Vec::new(),
        }
    }

    pub fn build(&mut self, doc: &mut Document, tokens: &[Token], input: &str) {
        for token in tokens {
            self.handle_token(doc, token, input);
        }
        self.finish(doc, input.len());
    }

    fn current_parent(&self, doc: &Document) -> NodeId {
        self.stack.last().copied().unwrap_or(doc.root())
    }

    fn current_name(&self, doc: &Document) -> Option<String> {
        self.stack
            .last()
            .and_then(|id| doc.get(*id).name_lower.clone())
    }

    fn handle_token(&mut self, doc: &mut Document, token: &Token, input: &str) {
        match token.kind {
            TokenKind::OpenTag => self.handle_open_tag(doc, token, input),
            TokenKind::SelfCloseTag => self.handle_self_close(doc, token),
            TokenKind::CloseTag => self.handle_close_tag(doc, token),
            TokenKind::Text => self.handle_text(doc, token),
            TokenKind::Comment => self.handle_comment(doc, token),
            TokenKind::DocType => self.handle_doctype(doc, token),
            TokenKind::CData => self.handle_cdata(doc, token),
            TokenKind::ServerCode => self.handle_server_code(doc, token),
        }
    }

    fn handle_open_tag(&mut self, doc: &mut Document, token: &Token, input: &str) {
        let name_lower = token.name_lower.clone().unwrap_or_default();

        self.check_implicit_close(doc, &name_lower, token.offset);

        if self.patterns.is_void(&name_lower) {
            self.append_void_or_self_close(doc, token, &name_lower);
            return;
        }

        let parent = self.current_parent(doc);
        let node = doc.append_child(parent, NodeKind::Element, token.offset, token.line, token.column);
        doc.set_name(node, name_lower.clone());
        if let Some(attrs) = &token.attributes {
            doc.set_attributes(node, attrs.clone());
        }
        let open_tag_end = token.end_offset();
        doc.set_outer(node, token.offset, token.length);
        doc.set_inner(node, open_tag_end, 0);

        if matches!(name_lower.as_str(), "script" | "style") {
            doc.set_hide_inner_text(node, true);
        }

        self.stack.push(node);
        let _ = input;
    }

    fn append_void_or_self_close(&mut self, doc: &mut Document, token: &Token, name_lower: &str) {
        let parent = self.current_parent(doc);
        let node = doc.append_child(parent, NodeKind::Element, token.offset, token.line, token.column);
        doc.set_name(node, name_lower.to_string());
        if let Some(attrs) = &token.attributes {
            doc.set_attributes(node, attrs.clone());
        }
        doc.set_outer(node, token.offset, token.length);
        doc.set_inner(node, token.end_offset(), 0);
        doc.set_end_node(node, node);
    }

    fn handle_self_close(&mut self, doc: &mut Document, token: &Token) {
        let name_lower = token.name_lower.clone().unwrap_or_default();
        self.check_implicit_close(doc, &name_lower, token.offset);
        self.append_void_or_self_close(doc, token, &name_lower);
    }

    fn handle_close_tag(&mut self, doc: &mut Document, token: &Token) {
        let name_lower = token.name_lower.clone().unwrap_or_default();

        let match_index = self
            .stack
            .iter()
            .rposition(|id| doc.get(*id).name_lower.as_deref() == Some(name_lower.as_str()));

        match match_index {
            Some(idx) => {
                // Everything above the match is implicitly closed, ending
                // where this close tag begins.
                let popped: Vec<NodeId> = self.stack.split_off(idx + 1);
                for id in popped {
                    self.close_implicitly(doc, id, token.offset);
                }
                let matched = self.stack.pop().expect("match_index pointed at a real entry");
                let matched_node = doc.get(matched);
                let inner_start = matched_node.inner_start;
                let outer_start = matched_node.outer_start;
                let inner_length = token.offset.saturating_sub(inner_start);
                let outer_length = token.end_offset().saturating_sub(outer_start);
                doc.set_inner(matched, inner_start, inner_length);
                doc.set_outer(matched, outer_start, outer_length);
                doc.set_end_node(matched, matched);
            }
            None => {
                if doc.options.check_syntax {
                    doc.parse_errors.push(ParseError::new(
                        ParseErrorKind::TagNotOpened,
                        token.line,
                        token.column,
                        token.offset,
                        format!("closing tag </{}> has no matching open element", name_lower),
                    ));
                }
                // Silently dropped either way: the stack is unchanged, no
                // node is created for an unmatched close tag.
            }
        }
    }

    /// Pop `id` off (already removed from `self.stack` by the caller) and
    /// finalize it as implicitly closed: `end_node` is itself, and its
    /// inner/outer span ends at `boundary` — the offset of whatever
    /// triggered the implicit close (an incoming tag, or a close tag that
    /// matched an ancestor instead).
    fn close_implicitly(&mut self, doc: &mut Document, id: NodeId, boundary: usize) {
        let data = doc.get(id);
        let inner_start = data.inner_start;
        let outer_start = data.outer_start;
        let inner_length = boundary.saturating_sub(inner_start);
        let outer_length = boundary.saturating_sub(outer_start);
        doc.set_inner(id, inner_start, inner_length);
        doc.set_outer(id, outer_start, outer_length);
        doc.set_end_node(id, id);
    }

    fn check_implicit_close(&mut self, doc: &mut Document, new: &str, boundary: usize) {
        loop {
            let cur = match self.current_name(doc) {
                Some(c) => c,
                None => break,
            };
            if self.patterns.closes_implicitly(&cur, new) {
                let id = self.stack.pop().expect("current_name implies a stack top");
                self.close_implicitly(doc, id, boundary);
            } else {
                break;
            }
        }
    }

    fn handle_text(&mut self, doc: &mut Document, token: &Token) {
        let content = token.content.as_deref().unwrap_or("");
        if content.is_empty() {
            return;
        }
        if content.trim().is_empty() && !doc.options.preserve_whitespace {
            return;
        }
        let parent = self.current_parent(doc);
        let node = doc.append_child(parent, NodeKind::Text, token.offset, token.line, token.column);
        doc.set_outer(node, token.offset, token.length);
        doc.set_inner(node, token.offset, token.length);
    }

    fn handle_comment(&mut self, doc: &mut Document, token: &Token) {
        let parent = self.current_parent(doc);
        let node = doc.append_child(parent, NodeKind::Comment, token.offset, token.line, token.column);
        doc.set_outer(node, token.offset, token.length);
        doc.set_inner(node, token.offset, token.length);
    }

    fn handle_doctype(&mut self, doc: &mut Document, token: &Token) {
        let parent = self.current_parent(doc);
        let node = doc.append_child(parent, NodeKind::Comment, token.offset, token.line, token.column);
        let body = token.content.as_deref().unwrap_or("");
        doc.set_name(node, format!("{}{}", DOCTYPE_NAME_SENTINEL, body));
        doc.set_outer(node, token.offset, token.length);
        doc.set_inner(node, token.offset, token.length);
    }

    fn handle_cdata(&mut self, doc: &mut Document, token: &Token) {
        let parent = self.current_parent(doc);
        let kind = if doc.options.treat_cdata_as_comment {
            NodeKind::Comment
        } else {
            NodeKind::Text
        };
        let node = doc.append_child(parent, kind, token.offset, token.line, token.column);
        doc.set_outer(node, token.offset, token.length);
        doc.set_inner(node, token.offset, token.length);
    }

    fn handle_server_code(&mut self, doc: &mut Document, token: &Token) {
        let parent = self.current_parent(doc);
        let node = doc.append_child(parent, NodeKind::Comment, token.offset, token.line, token.column);
        doc.set_outer(node, token.offset, token.length);
        doc.set_inner(node, token.offset, token.length);
    }

    fn finish(&mut self, doc: &mut Document, input_len: usize) {
        let leftover: Vec<NodeId> = self.stack.drain(..).collect();
        for id in leftover {
            if doc.options.auto_close_on_end {
                let data = doc.get(id);
                let inner_start = data.inner_start;
                let outer_start = data.outer_start;
                doc.set_inner(id, inner_start, input_len.saturating_sub(inner_start));
                doc.set_outer(id, outer_start, input_len.saturating_sub(outer_start));
                doc.set_end_node(id, id);
            }
        }
        let root = doc.root();
        doc.set_outer(root, 0, input_len);
        doc.set_inner(root, 0, input_len);
    }
}
