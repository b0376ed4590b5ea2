//! `range` repetition.

use std::sync::Arc;

use gesso_carton::String;
use gesso_relief::{
    apply_extensions, Applied, ApplyContext, Extension, NodeArena, NodeId, ParserOptions,
    RangeParams, RenderError, Scope, Tree, TreeError, Value,
};

/// Replaces the node with one copy per parameter bag of its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeExtension {
    /// Expression yielding a range parameter sequence
    pub source: String,
}

impl Extension for RangeExtension {
    fn apply(&self, cx: &mut ApplyContext<'_, '_>, node: NodeId) -> Result<Applied, RenderError> {
        // Copies run the rest of this node's pipeline and must not expand again
        if cx.suppress_expansion {
            return Ok(Applied::Node(node));
        }

        let range = match cx.evaluate(node, &self.source)? {
            Value::Range(range) => range,
            // `[]` from JSON carries no element type
            Value::List(items) if items.is_empty() => RangeParams::new(),
            other => {
                return Err(RenderError::TypeMismatch {
                    expression: self.source.clone(),
                    found: other.type_name(),
                })
            }
        };

        // Copies keep resolving scope where the template node sits
        let template = cx.arena.node(node);
        let origin = match template.scope() {
            Scope::Physical => template.parent(),
            Scope::Origin(origin) => origin,
        };

        let mut copies = Vec::with_capacity(range.len());
        for bag in &range {
            let copy = cx.arena.copy_subtree(node)?;
            let target = cx.arena.node_mut(copy)?;
            target.set_context_params(Arc::clone(bag));
            target.set_scope(Scope::Origin(origin));

            let outcome = apply_extensions(&mut cx.nested(true), copy)?;
            copies.extend(outcome.node);
            copies.extend(outcome.siblings);
        }

        tracing::trace!(%node, source = %self.source, copies = copies.len(), "range expanded");
        Ok(Applied::Siblings(copies))
    }
}

/// Turn a `range` attribute into a [`RangeExtension`].
pub fn process_range(
    tree: &mut Tree,
    node: NodeId,
    options: &ParserOptions,
) -> Result<(), TreeError> {
    if !tree.node(node).is_element() {
        return Ok(());
    }
    let element = tree.node_mut(node)?;
    if let Some(source) = element.remove_attribute(&options.directive("range")) {
        element.add_extension(Arc::new(RangeExtension {
            source: source.value,
        }));
    }
    Ok(())
}
