//! Template node types.
//!
//! A node is one of three kinds (doctype, text, element) and lives in an
//! arena, addressed by [`NodeId`]. Each tree also owns one root container
//! whose children are the top-level nodes of the document. Tree links (parent, children, siblings) are
//! only changed through the [`NodeArena`](crate::NodeArena) operations so the
//! sibling chain always stays consistent.

use std::fmt;
use std::sync::Arc;

use gesso_carton::{SmallVec, String};

use crate::attribute::{escape_quotes, Attribute, Attributes};
use crate::extension::Extension;
use crate::value::Params;

/// Index of a node inside an arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeKind {
    Doctype = 0,
    Text = 1,
    Element = 2,
    /// Container of the top-level nodes, never serialized
    Root = 3,
}

/// Where a node's scope lookups continue after its own parameter bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Walk the physical `parent` pointer
    #[default]
    Physical,
    /// The node stands in for another position; continue resolving at the
    /// linked node (or stop when there is none).
    Origin(Option<NodeId>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Links {
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
}

impl Links {
    #[inline]
    pub(crate) fn is_attached(&self) -> bool {
        self.parent.is_some() || self.prev_sibling.is_some() || self.next_sibling.is_some()
    }
}

/// A template node.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Tag name for elements, the doctype string, or literal text
    pub data: String,
    attributes: Attributes,
    self_closing: bool,
    extensions: SmallVec<[Arc<dyn Extension>; 2]>,
    context: Option<Arc<Params>>,
    scope: Scope,
    pub(crate) links: Links,
}

impl Node {
    fn with_kind(kind: NodeKind, data: impl Into<String>) -> Self {
        Self {
            kind,
            data: data.into(),
            attributes: Attributes::new(),
            self_closing: false,
            extensions: SmallVec::new(),
            context: None,
            scope: Scope::Physical,
            links: Links::default(),
        }
    }

    pub fn element(
        tag: impl Into<String>,
        attributes: impl IntoIterator<Item = Attribute>,
        self_closing: bool,
    ) -> Self {
        let mut node = Self::with_kind(NodeKind::Element, tag);
        node.attributes = attributes.into_iter().collect();
        node.self_closing = self_closing;
        node
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Text, text)
    }

    pub fn doctype(doctype: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Doctype, doctype)
    }

    pub(crate) fn root() -> Self {
        Self::with_kind(NodeKind::Root, "")
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    #[inline]
    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }

    /// Element written without content or end tag, either `<x/>` or a void tag
    pub fn is_leaf_element(&self) -> bool {
        self.is_element() && (self.self_closing || gesso_carton::is_void_tag(&self.data))
    }

    // ========== Attributes ==========

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.has(key)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.add(key, value);
    }

    pub fn replace_attribute(&mut self, key: &str, value: impl Into<String>) -> bool {
        self.attributes.replace(key, value)
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<Attribute> {
        self.attributes.remove(key)
    }

    pub fn attributes_matching(&self, predicate: impl FnMut(&Attribute) -> bool) -> Vec<Attribute> {
        self.attributes.matching(predicate)
    }

    // ========== Extensions ==========

    pub fn extensions(&self) -> &[Arc<dyn Extension>] {
        &self.extensions
    }

    pub fn add_extension(&mut self, extension: Arc<dyn Extension>) {
        self.extensions.push(extension);
    }

    pub fn has_extensions(&self) -> bool {
        !self.extensions.is_empty()
    }

    // ========== Scope ==========

    pub fn context_params(&self) -> Option<&Arc<Params>> {
        self.context.as_ref()
    }

    pub fn set_context_params(&mut self, params: impl Into<Arc<Params>>) {
        self.context = Some(params.into());
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
    }

    // ========== Links ==========

    pub fn parent(&self) -> Option<NodeId> {
        self.links.parent
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.links.first_child
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.links.last_child
    }

    pub fn previous_sibling(&self) -> Option<NodeId> {
        self.links.prev_sibling
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.links.next_sibling
    }

    /// Copy of this node with every tree link cleared
    pub(crate) fn detached(&self) -> Self {
        Self {
            links: Links::default(),
            ..self.clone()
        }
    }

    /// Copy standing in for the node at `original`: shares its children and
    /// resolves scope through it.
    pub(crate) fn overlay(&self, original: NodeId) -> Self {
        Self {
            context: None,
            scope: Scope::Origin(Some(original)),
            links: Links {
                first_child: self.links.first_child,
                last_child: self.links.last_child,
                ..Links::default()
            },
            ..self.clone()
        }
    }

    // ========== Markup ==========

    /// Write the opening markup of this node
    pub fn write_start_tag(&self, out: &mut std::string::String) {
        match self.kind {
            NodeKind::Doctype => {
                out.push_str("<!DOCTYPE ");
                out.push_str(&self.data);
                out.push('>');
            }
            NodeKind::Text => out.push_str(&self.data),
            NodeKind::Element => {
                out.push('<');
                out.push_str(&self.data);
                for attr in &self.attributes {
                    out.push(' ');
                    out.push_str(&attr.key);
                    if !attr.key_only {
                        out.push_str("=\"");
                        out.push_str(&escape_quotes(&attr.value));
                        out.push('"');
                    }
                }
                out.push_str(if self.self_closing { "/>" } else { ">" });
            }
            NodeKind::Root => {}
        }
    }

    /// Write the closing markup of this node, if it has any
    pub fn write_end_tag(&self, out: &mut std::string::String) {
        if self.is_element() && !self.is_leaf_element() {
            out.push_str("</");
            out.push_str(&self.data);
            out.push('>');
        }
    }
}
