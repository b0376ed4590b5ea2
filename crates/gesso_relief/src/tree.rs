//! Node storage and structural mutation.
//!
//! Two arenas share the [`NodeArena`] operations:
//!
//! - [`Tree`]: the parsed template, built once and read-only afterwards
//! - [`RenderArena`]: scratch storage for one render call, layered over a
//!   template [`Tree`]. Template nodes can be read through it but never
//!   mutated; nodes allocated during the render are freely mutable and are
//!   dropped together with the arena.

use gesso_carton::SmallVec;

use crate::errors::TreeError;
use crate::node::{Node, NodeId};

/// Storage for nodes addressed by [`NodeId`].
pub trait NodeArena {
    /// The node stored under `id`.
    ///
    /// Ids are only produced by the arena itself, so an unknown id is a bug in
    /// the caller and panics.
    fn node(&self, id: NodeId) -> &Node;

    /// Mutable access to the node stored under `id`
    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError>;

    /// Whether [`node_mut`](Self::node_mut) will succeed for `id`
    fn is_writable(&self, id: NodeId) -> bool;

    /// Store a new, detached node
    fn alloc(&mut self, node: Node) -> NodeId;

    /// Number of addressable nodes
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_writable(&self, id: NodeId) -> Result<(), TreeError> {
        if self.is_writable(id) {
            Ok(())
        } else {
            Err(TreeError::ReadOnly(id))
        }
    }

    /// Append `child` as the last child of `parent`
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` right before `anchor`, or at the end when
    /// there is no anchor.
    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<(), TreeError> {
        if child == parent || self.node(child).links.is_attached() {
            return Err(TreeError::AlreadyAttached(child));
        }
        if let Some(anchor) = anchor {
            if self.node(anchor).links.parent != Some(parent) {
                return Err(TreeError::AnchorNotAChild { parent, anchor });
            }
        }

        let (prev, next) = match anchor {
            Some(anchor) => (self.node(anchor).links.prev_sibling, Some(anchor)),
            None => (self.node(parent).links.last_child, None),
        };

        // Check every node we are about to touch before changing anything
        for id in [Some(parent), Some(child), prev, next].into_iter().flatten() {
            self.ensure_writable(id)?;
        }

        {
            let links = &mut self.node_mut(child)?.links;
            links.parent = Some(parent);
            links.prev_sibling = prev;
            links.next_sibling = next;
        }
        match prev {
            Some(prev) => self.node_mut(prev)?.links.next_sibling = Some(child),
            None => self.node_mut(parent)?.links.first_child = Some(child),
        }
        match next {
            Some(next) => self.node_mut(next)?.links.prev_sibling = Some(child),
            None => self.node_mut(parent)?.links.last_child = Some(child),
        }
        Ok(())
    }

    /// Detach `child` from `parent`. The child keeps its own subtree.
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let links = self.node(child).links;
        if links.parent != Some(parent) {
            return Err(TreeError::NotAChild { parent, child });
        }
        for id in [Some(parent), Some(child), links.prev_sibling, links.next_sibling]
            .into_iter()
            .flatten()
        {
            self.ensure_writable(id)?;
        }

        match links.prev_sibling {
            Some(prev) => self.node_mut(prev)?.links.next_sibling = links.next_sibling,
            None => self.node_mut(parent)?.links.first_child = links.next_sibling,
        }
        match links.next_sibling {
            Some(next) => self.node_mut(next)?.links.prev_sibling = links.prev_sibling,
            None => self.node_mut(parent)?.links.last_child = links.prev_sibling,
        }

        let links = &mut self.node_mut(child)?.links;
        links.parent = None;
        links.prev_sibling = None;
        links.next_sibling = None;
        Ok(())
    }

    /// Children of `id`, first to last
    fn children(&self, id: NodeId) -> Siblings<'_, Self>
    where
        Self: Sized,
    {
        Siblings {
            arena: self,
            next: self.node(id).first_child(),
        }
    }

    /// Siblings following `id`, nearest first
    fn next_siblings(&self, id: NodeId) -> Siblings<'_, Self>
    where
        Self: Sized,
    {
        Siblings {
            arena: self,
            next: self.node(id).next_sibling(),
        }
    }

    /// Structurally identical, detached deep copy of the subtree at `id`.
    ///
    /// Attributes are copied by value, extensions and context params by
    /// reference. Copying is iterative so deep trees cannot overflow the stack.
    fn copy_subtree(&mut self, id: NodeId) -> Result<NodeId, TreeError>
    where
        Self: Sized,
    {
        let copy = self.alloc(self.node(id).detached());
        let mut pending = vec![(id, copy)];

        while let Some((source, target)) = pending.pop() {
            let children: SmallVec<[NodeId; 8]> = self.children(source).collect();
            for child in children {
                let child_copy = self.alloc(self.node(child).detached());
                self.append_child(target, child_copy)?;
                pending.push((child, child_copy));
            }
        }

        Ok(copy)
    }

    /// A node equivalent to `id` that can be mutated in this arena.
    ///
    /// Writable nodes are returned as is. Read-only nodes get an overlay copy
    /// that shares their children and resolves scope through the original.
    fn make_owned(&mut self, id: NodeId) -> NodeId {
        if self.is_writable(id) {
            id
        } else {
            let overlay = self.node(id).overlay(id);
            self.alloc(overlay)
        }
    }
}

/// Iterator over a run of siblings.
///
/// Stopping early is just a matter of dropping the iterator.
pub struct Siblings<'a, A> {
    arena: &'a A,
    next: Option<NodeId>,
}

impl<'a, A: NodeArena> Iterator for Siblings<'a, A> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.arena.node(current).next_sibling();
        Some(current)
    }
}

/// The parsed node tree of one template.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Id of the container holding the top-level nodes
    pub const ROOT: NodeId = NodeId::from_index(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
        }
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Top-level nodes in document order
    pub fn roots(&self) -> Siblings<'_, Self> {
        self.children(Self::ROOT)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena for Tree {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        Ok(&mut self.nodes[id.index()])
    }

    fn is_writable(&self, _id: NodeId) -> bool {
        true
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Per-render scratch arena over a read-only template [`Tree`].
///
/// Ids below the template's length address template nodes; everything
/// allocated here gets an id after them.
#[derive(Debug)]
pub struct RenderArena<'t> {
    template: &'t Tree,
    scratch: Vec<Node>,
}

impl<'t> RenderArena<'t> {
    pub fn new(template: &'t Tree) -> Self {
        Self {
            template,
            scratch: Vec::new(),
        }
    }

    pub fn template(&self) -> &'t Tree {
        self.template
    }

    /// Number of nodes allocated during this render
    pub fn allocated(&self) -> usize {
        self.scratch.len()
    }

    #[inline]
    fn scratch_index(&self, id: NodeId) -> Option<usize> {
        id.index().checked_sub(self.template.len())
    }
}

impl NodeArena for RenderArena<'_> {
    fn node(&self, id: NodeId) -> &Node {
        match self.scratch_index(id) {
            Some(idx) => &self.scratch[idx],
            None => self.template.node(id),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        match self.scratch_index(id) {
            Some(idx) => Ok(&mut self.scratch[idx]),
            None => Err(TreeError::ReadOnly(id)),
        }
    }

    fn is_writable(&self, id: NodeId) -> bool {
        self.scratch_index(id).is_some()
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_index(self.template.len() + self.scratch.len());
        self.scratch.push(node);
        id
    }

    fn len(&self) -> usize {
        self.template.len() + self.scratch.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;
    use crate::node::Scope;
    use crate::value::Params;

    fn element(tree: &mut Tree, tag: &str) -> NodeId {
        tree.alloc(Node::element(tag, [], false))
    }

    fn tags<A: NodeArena>(arena: &A, parent: NodeId) -> Vec<std::string::String> {
        arena
            .children(parent)
            .map(|id| arena.node(id).data.to_string())
            .collect()
    }

    #[test]
    fn test_append_and_insert() {
        let mut tree = Tree::new();
        let ul = element(&mut tree, "ul");
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        let c = element(&mut tree, "c");

        tree.append_child(tree.root(), ul).unwrap();
        tree.append_child(ul, b).unwrap();
        tree.insert_before(ul, a, Some(b)).unwrap();
        tree.insert_before(ul, c, None).unwrap();

        assert_eq!(tags(&tree, ul), ["a", "b", "c"]);
        assert_eq!(tree.node(ul).first_child(), Some(a));
        assert_eq!(tree.node(ul).last_child(), Some(c));
        assert_eq!(tree.node(b).previous_sibling(), Some(a));
        assert_eq!(tree.node(b).next_sibling(), Some(c));
        assert_eq!(tree.node(c).parent(), Some(ul));
        assert_eq!(tree.roots().collect::<Vec<_>>(), [ul]);
    }

    #[test]
    fn test_insert_attached_node_fails() {
        let mut tree = Tree::new();
        let div = element(&mut tree, "div");
        let span = element(&mut tree, "span");
        tree.append_child(div, span).unwrap();

        assert_eq!(
            tree.append_child(tree.root(), span),
            Err(TreeError::AlreadyAttached(span))
        );
        assert_eq!(tree.append_child(div, div), Err(TreeError::AlreadyAttached(div)));
    }

    #[test]
    fn test_insert_before_foreign_anchor_fails() {
        let mut tree = Tree::new();
        let div = element(&mut tree, "div");
        let orphan = element(&mut tree, "p");
        let span = element(&mut tree, "span");

        assert_eq!(
            tree.insert_before(div, span, Some(orphan)),
            Err(TreeError::AnchorNotAChild {
                parent: div,
                anchor: orphan
            })
        );
        assert_eq!(tree.node(span).parent(), None);
    }

    #[test]
    fn test_remove_child() {
        let mut tree = Tree::new();
        let ul = element(&mut tree, "ul");
        let items: Vec<NodeId> = ["a", "b", "c"].iter().map(|t| element(&mut tree, t)).collect();
        for &item in &items {
            tree.append_child(ul, item).unwrap();
        }

        tree.remove_child(ul, items[1]).unwrap();
        assert_eq!(tags(&tree, ul), ["a", "c"]);
        assert_eq!(tree.node(items[1]).parent(), None);
        assert_eq!(tree.node(items[1]).next_sibling(), None);

        tree.remove_child(ul, items[2]).unwrap();
        tree.remove_child(ul, items[0]).unwrap();
        assert_eq!(tree.node(ul).first_child(), None);
        assert_eq!(tree.node(ul).last_child(), None);

        // The removed node can be inserted again
        tree.append_child(ul, items[1]).unwrap();
        assert_eq!(tags(&tree, ul), ["b"]);
    }

    #[test]
    fn test_remove_from_wrong_parent_fails() {
        let mut tree = Tree::new();
        let div = element(&mut tree, "div");
        let other = element(&mut tree, "section");
        let span = element(&mut tree, "span");
        tree.append_child(div, span).unwrap();

        assert_eq!(
            tree.remove_child(other, span),
            Err(TreeError::NotAChild {
                parent: other,
                child: span
            })
        );
        assert_eq!(tree.node(span).parent(), Some(div));
    }

    #[test]
    fn test_next_siblings_stop_early() {
        let mut tree = Tree::new();
        let ids: Vec<NodeId> = ["a", "b", "c", "d"].iter().map(|t| element(&mut tree, t)).collect();
        for &id in &ids {
            tree.append_child(tree.root(), id).unwrap();
        }

        let found = tree
            .next_siblings(ids[0])
            .find(|&id| tree.node(id).data == "c");
        assert_eq!(found, Some(ids[2]));
        assert_eq!(tree.next_siblings(ids[3]).count(), 0);
    }

    #[test]
    fn test_copy_subtree() {
        let mut tree = Tree::new();
        let ul = tree.alloc(Node::element("ul", [Attribute::new("class", "menu")], false));
        tree.append_child(tree.root(), ul).unwrap();
        for label in ["Tea", "Cake"] {
            let li = element(&mut tree, "li");
            let text = tree.alloc(Node::text(label));
            tree.append_child(li, text).unwrap();
            tree.append_child(ul, li).unwrap();
        }

        let copy = tree.copy_subtree(ul).unwrap();
        assert_ne!(copy, ul);
        assert_eq!(tree.node(copy).parent(), None);
        assert_eq!(tree.node(copy).next_sibling(), None);
        assert_eq!(tree.node(copy).attribute("class"), Some("menu"));

        let copied: Vec<std::string::String> = tree
            .children(copy)
            .map(|li| {
                let text = tree.node(li).first_child().unwrap();
                assert_eq!(tree.node(li).parent(), Some(copy));
                tree.node(text).data.to_string()
            })
            .collect();
        assert_eq!(copied, ["Tea", "Cake"]);
        assert!(tree.children(copy).all(|li| !tree.children(ul).any(|orig| orig == li)));
    }

    #[test]
    fn test_copy_deep_subtree() {
        let mut tree = Tree::new();
        let mut parent = tree.root();
        for _ in 0..50_000 {
            let div = element(&mut tree, "div");
            tree.append_child(parent, div).unwrap();
            parent = div;
        }
        let first = tree.node(tree.root()).first_child().unwrap();
        let before = tree.len();
        tree.copy_subtree(first).unwrap();
        assert_eq!(tree.len(), before + 50_000);
    }

    #[test]
    fn test_render_arena_is_copy_on_write() {
        let mut tree = Tree::new();
        let div = element(&mut tree, "div");
        let text = tree.alloc(Node::text("hi"));
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, text).unwrap();

        let mut arena = RenderArena::new(&tree);
        assert_eq!(arena.node_mut(div).err(), Some(TreeError::ReadOnly(div)));
        assert_eq!(
            arena.remove_child(div, text),
            Err(TreeError::ReadOnly(div))
        );

        let owned = arena.make_owned(div);
        assert_ne!(owned, div);
        assert_eq!(arena.make_owned(owned), owned);
        assert_eq!(arena.node(owned).first_child(), Some(text));
        assert_eq!(arena.node(owned).scope(), Scope::Origin(Some(div)));

        arena.node_mut(owned).unwrap().add_attribute("id", "x");
        arena
            .node_mut(owned)
            .unwrap()
            .set_context_params(Params::new());
        assert_eq!(arena.allocated(), 1);
        assert_eq!(tree.node(div).attribute("id"), None);
    }

    #[test]
    fn test_render_arena_copies_template_subtree() {
        let mut tree = Tree::new();
        let li = element(&mut tree, "li");
        let text = tree.alloc(Node::text("x"));
        tree.append_child(tree.root(), li).unwrap();
        tree.append_child(li, text).unwrap();

        let mut arena = RenderArena::new(&tree);
        let copy = arena.copy_subtree(li).unwrap();
        assert!(arena.is_writable(copy));
        assert_eq!(arena.allocated(), 2);
        let copied_text = arena.node(copy).first_child().unwrap();
        assert!(arena.is_writable(copied_text));
        assert_eq!(arena.node(copied_text).data, "x");
    }
}
