//! Template renderer.
//!
//! Walks the tree in document order with an explicit work stack, running each
//! node's extension pipeline right before the node would be written. Nothing
//! is written to the template itself: nodes produced while rendering live in a
//! [`RenderArena`] that is dropped at the end of the call.

use gesso_relief::{
    apply_extensions, ApplyContext, ExtensionDependencies, NodeArena, NodeId, Params,
    RenderArena, RenderError, Tree,
};

/// Pending work, popped last in first out
#[derive(Debug, Clone, Copy)]
enum Pending {
    /// Run the pipeline, then emit whatever it produced
    Visit(NodeId),
    /// Write the start tag and schedule the children
    Emit(NodeId),
    /// Write the end tag
    Close(NodeId),
}

/// Render `tree` against `params`.
///
/// The first error aborts the render and no partial output is returned.
pub fn render(
    tree: &Tree,
    dependencies: &dyn ExtensionDependencies,
    params: &Params,
) -> Result<String, RenderError> {
    let mut arena = RenderArena::new(tree);
    let mut out = String::new();

    let mut stack: Vec<Pending> = tree.roots().map(Pending::Visit).collect();
    stack.reverse();

    while let Some(pending) = stack.pop() {
        match pending {
            Pending::Visit(node) => {
                let mut cx = ApplyContext::new(&mut arena, dependencies, params);
                let outcome = apply_extensions(&mut cx, node)?;
                stack.extend(outcome.siblings.iter().rev().map(|&id| Pending::Emit(id)));
                stack.extend(outcome.node.map(Pending::Emit));
            }
            Pending::Emit(node) => {
                let current = arena.node(node);
                current.write_start_tag(&mut out);
                if current.is_element() && !current.is_leaf_element() {
                    stack.push(Pending::Close(node));
                    let children: Vec<NodeId> = arena.children(node).collect();
                    stack.extend(children.into_iter().rev().map(Pending::Visit));
                }
            }
            Pending::Close(node) => arena.node(node).write_end_tag(&mut out),
        }
    }

    tracing::debug!(bytes = out.len(), allocated = arena.allocated(), "rendered template");
    Ok(out)
}
