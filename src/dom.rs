//! DOM Contract
//!
//! `spec.md` treats the DOM node/attribute containers as an external
//! collaborator, out of scope for the core — but a standalone crate still
//! needs *a* concrete implementation to build the tree into and for tests
//! to assert against. This one is built on `ego-tree`, the same crate the
//! teacher repo already reaches for in `src/ast/traversal.rs` to get
//! parent/child/sibling navigation with integer `NodeId`s rather than raw
//! back-references (exactly the substitute `spec.md` §9's ownership note
//! recommends when a language disallows parent pointers).
//!
//! `ego_tree::Tree::append` both allocates and attaches a node in one call,
//! so the spec's separate `create_node`/`append_child` operations are
//! merged into [`Document::append_child`] here; everything else maps
//! one-to-one onto the contract in `spec.md` §3.

use std::collections::HashMap;

use ego_tree::{NodeId, NodeRef, Tree};

use crate::config::ParserOptions;
use crate::error::ParseError;
use crate::token::AttributeRecord;

/// Sentinel prepended to a DOCTYPE node's `name_lower` so it is
/// distinguishable from an ordinary comment (`spec.md` §9's chosen
/// resolution for DOCTYPE representation).
pub const DOCTYPE_NAME_SENTINEL: char = '\u{1}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
}

#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    pub name_lower: Option<String>,
    pub attributes: Vec<AttributeRecord>,
    pub outer_start: usize,
    pub outer_length: usize,
    pub inner_start: usize,
    pub inner_length: usize,
    pub line: usize,
    pub column: usize,
    /// The node standing in for this element's closing tag. Equal to the
    /// element's own id for self-closing/void/implicitly-closed elements.
    pub end_node: Option<NodeId>,
    /// Set for `script`/`style` raw-text elements so a serializer knows not
    /// to treat their text child as ordinary markup-escaped content.
    pub hide_inner_text: bool,
}

impl NodeData {
    fn new(kind: NodeKind, offset: usize, line: usize, column: usize) -> Self {
        Self {
            kind,
            name_lower: None,
            attributes: Vec::new(),
            outer_start: offset,
            outer_length: 0,
            inner_start: offset,
            inner_length: 0,
            line,
            column,
            end_node: None,
            hide_inner_text: false,
        }
    }
}

/// The document tree plus the parse-time bookkeeping (`id` index, recorded
/// errors) that rides alongside it.
pub struct Document {
    pub text: String,
    tree: Tree<NodeData>,
    pub id_index: HashMap<String, NodeId>,
    pub parse_errors: Vec<ParseError>,
    pub options: ParserOptions,
}

impl Document {
    /// A fresh document over `text`, with an empty root `Document` node
    /// spanning the whole input (`spec.md` §4.5 step 2).
    pub fn new(text: String, options: ParserOptions) -> Self {
        let len = text.len();
        let mut root = NodeData::new(NodeKind::Document, 0, 1, 1);
        root.outer_length = len;
        root.inner_length = len;
        Self {
            text,
            tree: Tree::new(root),
            id_index: HashMap::new(),
            parse_errors: Vec::new(),
            options,
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root().id()
    }

    /// Create a node of `kind` at `offset` and append it as the last child
    /// of `parent` (`spec.md` §3's `create_node` + `append_child`, merged
    /// to match `ego_tree`'s allocate-and-attach API).
    pub fn append_child(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        offset: usize,
        line: usize,
        column: usize,
    ) -> NodeId {
        let data = NodeData::new(kind, offset, line, column);
        let mut parent_mut = self.tree.get_mut(parent).expect("parent node must exist");
        parent_mut.append(data).id()
    }

    pub fn set_name(&mut self, node: NodeId, name_lower: impl Into<String>) {
        self.node_mut(node).name_lower = Some(name_lower.into());
    }

    pub fn set_attributes(&mut self, node: NodeId, attributes: Vec<AttributeRecord>) {
        self.node_mut(node).attributes = attributes;
    }

    /// Construct a synthetic attribute record (`spec.md` §3's
    /// `create_attribute`), for collaborators that need to inject an
    /// attribute the tokenizer never saw on the wire.
    pub fn create_attribute(name: &str, value: Option<&str>) -> AttributeRecord {
        use crate::token::Quote;
        AttributeRecord {
            name_lower: name.to_ascii_lowercase(),
            name_original: name.to_string(),
            value: value.map(|v| v.to_string()),
            quote: if value.is_some() {
                Quote::Double
            } else {
                Quote::Absent
            },
            name_offset: 0,
            value_offset: None,
            line: 0,
            column: 0,
        }
    }

    pub fn set_outer(&mut self, node: NodeId, start: usize, length: usize) {
        let n = self.node_mut(node);
        n.outer_start = start;
        n.outer_length = length;
    }

    pub fn set_inner(&mut self, node: NodeId, start: usize, length: usize) {
        let n = self.node_mut(node);
        n.inner_start = start;
        n.inner_length = length;
    }

    pub fn set_end_node(&mut self, node: NodeId, end_node: NodeId) {
        self.node_mut(node).end_node = Some(end_node);
    }

    pub fn set_hide_inner_text(&mut self, node: NodeId, hide: bool) {
        self.node_mut(node).hide_inner_text = hide;
    }

    pub fn get(&self, node: NodeId) -> &NodeData {
        self.tree.get(node).expect("node must exist").value()
    }

    fn node_mut(&mut self, node: NodeId) -> &mut NodeData {
        self.tree.get_mut(node).expect("node must exist").value()
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.tree
            .get(node)
            .expect("node must exist")
            .children()
            .map(|c| c.id())
    }

    /// Case-insensitive attribute lookup; `default` is returned verbatim
    /// when the attribute is absent (`spec.md` §3's `get_attribute_value`).
    pub fn get_attribute_value<'a>(&'a self, node: NodeId, name: &str, default: &'a str) -> &'a str {
        let name_lower = name.to_ascii_lowercase();
        self.get(node)
            .attributes
            .iter()
            .find(|a| a.name_lower == name_lower)
            .and_then(|a| a.value.as_deref())
            .unwrap_or(default)
    }

    /// The raw source slice spanning a node's outer (for text/comment
    /// nodes, outer and inner coincide) range.
    pub fn outer_text(&self, node: NodeId) -> &str {
        let n = self.get(node);
        &self.text[n.outer_start..n.outer_start + n.outer_length]
    }

    /// Concatenated text of all `Text` descendants, in document order —
    /// used by tests and the CLI to assert `InnerText`-style expectations.
    pub fn inner_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_inner_text(node, &mut out);
        out
    }

    fn collect_inner_text(&self, node: NodeId, out: &mut String) {
        let data = self.get(node);
        if data.kind == NodeKind::Text {
            out.push_str(self.outer_text(node));
            return;
        }
        for child in self.children(node) {
            self.collect_inner_text(child, out);
        }
    }

    /// Rebuild the `id` index: first occurrence in document order wins,
    /// keys compared case-insensitively (`spec.md` §4.4/§8 property 8).
    pub fn rebuild_id_index(&mut self) {
        self.id_index.clear();
        let root = self.root();
        self.index_subtree(root);
    }

    fn index_subtree(&mut self, node: NodeId) {
        let data = self.get(node);
        if data.kind == NodeKind::Element {
            let id_value = data
                .attributes
                .iter()
                .find(|a| a.name_lower == "id")
                .and_then(|a| a.value.as_deref())
                .filter(|v| !v.is_empty())
                .map(|v| v.to_ascii_lowercase());
            if let Some(key) = id_value {
                self.id_index.entry(key).or_insert(node);
            }
        }
        let children: Vec<_> = self.children(node).collect();
        for child in children {
            self.index_subtree(child);
        }
    }

    /// Descendant elements in document order, for traversal-style queries
    /// (e.g. the `//div/div` scenario in `spec.md` §8 S1).
    pub fn descendant_elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(self.root(), &mut out);
        out
    }

    fn collect_descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(node) {
            if self.get(child).kind == NodeKind::Element {
                out.push(child);
            }
            self.collect_descendants(child, out);
        }
    }

    pub fn node_ref(&self, node: NodeId) -> NodeRef<'_, NodeData> {
        self.tree.get(node).expect("node must exist")
    }
}
