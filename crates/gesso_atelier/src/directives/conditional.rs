//! `if` / `elif` / `else` chains.
//!
//! The `if` node collects the `elif` (or `else-if`) siblings that follow it
//! plus an optional closing `else`. Those siblings are detached from the tree
//! at parse time and only come back when their branch is picked.

use gesso_carton::{is_blank, String};
use gesso_relief::{
    apply_extensions, Applied, ApplyContext, Extension, NodeArena, NodeId, ParserOptions,
    RenderError, Scope, Tree, TreeError,
};

/// Node rendered when a branch is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchTarget {
    /// The node carrying the `if` itself
    This,
    /// A detached `elif` sibling
    Sibling(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub condition: String,
    pub target: BranchTarget,
}

/// Picks the first branch whose condition holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalExtension {
    pub branches: Vec<Branch>,
    /// The `else` sibling
    pub fallback: Option<NodeId>,
}

impl ConditionalExtension {
    /// Render `target` in place of the `if` node.
    ///
    /// Detached siblings have no scope of their own, so inside a repeated copy
    /// they are copied and linked to the `if` node first.
    fn settle(
        &self,
        cx: &mut ApplyContext<'_, '_>,
        node: NodeId,
        target: NodeId,
    ) -> Result<Applied, RenderError> {
        let target = if cx.scope(node).is_empty() {
            target
        } else {
            let copy = cx.arena.copy_subtree(target)?;
            cx.arena
                .node_mut(copy)?
                .set_scope(Scope::Origin(Some(node)));
            copy
        };
        let outcome = apply_extensions(&mut cx.nested(false), target)?;
        Ok(Applied::Settled(outcome))
    }
}

impl Extension for ConditionalExtension {
    fn apply(&self, cx: &mut ApplyContext<'_, '_>, node: NodeId) -> Result<Applied, RenderError> {
        for (idx, branch) in self.branches.iter().enumerate() {
            if !cx.evaluate_bool(node, &branch.condition)? {
                continue;
            }
            tracing::trace!(%node, branch = idx, condition = %branch.condition, "conditional branch taken");
            return match branch.target {
                BranchTarget::This => Ok(Applied::Node(node)),
                BranchTarget::Sibling(target) => self.settle(cx, node, target),
            };
        }

        match self.fallback {
            Some(fallback) => {
                tracing::trace!(%node, "conditional else taken");
                self.settle(cx, node, fallback)
            }
            None => {
                tracing::trace!(%node, "conditional renders nothing");
                Ok(Applied::Siblings(Vec::new()))
            }
        }
    }
}

/// Turn an `if` attribute and the chain following it into a [`ConditionalExtension`].
pub fn process_conditional(
    tree: &mut Tree,
    node: NodeId,
    options: &ParserOptions,
) -> Result<(), TreeError> {
    if !tree.node(node).is_element() {
        return Ok(());
    }
    let Some(condition) = tree.node_mut(node)?.remove_attribute(&options.directive("if")) else {
        return Ok(());
    };

    let mut extension = ConditionalExtension {
        branches: vec![Branch {
            condition: condition.value,
            target: BranchTarget::This,
        }],
        fallback: None,
    };

    let elif_keys = [options.directive("elif"), options.directive("else-if")];
    let else_key = options.directive("else");
    let parent = tree.node(node).parent();
    let following: Vec<NodeId> = tree.next_siblings(node).collect();

    for sibling in following {
        let candidate = tree.node(sibling);
        if candidate.is_text() && is_blank(&candidate.data) {
            continue;
        }
        if !candidate.is_element() {
            break;
        }

        let elif = elif_keys
            .iter()
            .find_map(|key| tree.node_mut(sibling).ok()?.remove_attribute(key));
        if let Some(elif) = elif {
            extension.branches.push(Branch {
                condition: elif.value,
                target: BranchTarget::Sibling(sibling),
            });
        } else if tree.node_mut(sibling)?.remove_attribute(&else_key).is_some() {
            extension.fallback = Some(sibling);
        } else {
            break;
        }

        if let Some(parent) = parent {
            tree.remove_child(parent, sibling)?;
        }
        if extension.fallback.is_some() {
            break;
        }
    }

    tree.node_mut(node)?.add_extension(std::sync::Arc::new(extension));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{parse_default, render_template};
    use gesso_relief::params;

    const CHAIN: &str = r#"<div><p go-if="a">A</p><p go-elif="b">B</p><p go-else>C</p></div>"#;

    #[test]
    fn test_chain_is_collected() {
        let tree = parse_default(CHAIN);
        let div = tree.roots().next().unwrap();
        let children: Vec<NodeId> = tree.children(div).collect();
        assert_eq!(children.len(), 1);

        let if_node = tree.node(children[0]);
        assert!(!if_node.has_attribute("go-if"));
        assert_eq!(if_node.extensions().len(), 1);
        let debug = format!("{:?}", if_node.extensions()[0]);
        assert!(debug.contains("condition: \"a\""));
        assert!(debug.contains("condition: \"b\""));
        assert!(debug.contains("fallback: Some"));
    }

    #[test]
    fn test_mutual_exclusion() {
        let cases = [
            (true, true, "<div><p>A</p></div>"),
            (true, false, "<div><p>A</p></div>"),
            (false, true, "<div><p>B</p></div>"),
            (false, false, "<div><p>C</p></div>"),
        ];
        for (a, b, expected) in cases {
            let rendered = render_template(CHAIN, &params! { "a" => a, "b" => b }).unwrap();
            assert_eq!(rendered, expected, "a={a} b={b}");
        }
    }

    #[test]
    fn test_without_else_renders_nothing() {
        let source = r#"<p go-if="a">A</p><p go-else-if="b">B</p><span>after</span>"#;
        let rendered = render_template(source, &params! { "a" => false, "b" => false }).unwrap();
        insta::assert_snapshot!(rendered, @"<span>after</span>");
    }

    #[test]
    fn test_scan_stops_at_plain_sibling() {
        let source = r#"<p go-if="a">A</p><hr><p go-else>C</p>"#;
        let rendered = render_template(source, &params! { "a" => true }).unwrap();
        // The `else` after `<hr>` starts no chain and keeps its attribute
        insta::assert_snapshot!(rendered, @"<p>A</p><hr><p go-else>C</p>");
    }

    #[test]
    fn test_non_bool_condition_fails() {
        let err = render_template(r#"<p go-if="name">A</p>"#, &params! { "name" => "Ann" })
            .unwrap_err();
        assert!(matches!(err, RenderError::Evaluation { ref expression, .. } if expression == "name"));
    }

    #[test]
    fn test_missing_condition_fails() {
        let err = render_template(CHAIN, &params! { "a" => false }).unwrap_err();
        assert!(matches!(err, RenderError::Evaluation { ref expression, .. } if expression == "b"));
    }

    #[test]
    fn test_branch_resolves_repeated_scope() {
        let source = r#"<ul><li go-range="items"><b go-if="hot">{{go:name}}!</b><i go-else>{{go:name}}</i></li></ul>"#;
        let params = params! {
            "items" => gesso_relief::range_params([
                params! { "name" => "tea", "hot" => true },
                params! { "name" => "juice", "hot" => false },
            ]),
        };
        let rendered = render_template(source, &params).unwrap();
        insta::assert_snapshot!(rendered, @"<ul><li><b>tea!</b></li><li><i>juice</i></li></ul>");
    }

    #[test]
    fn test_else_sibling_keeps_its_own_directives() {
        let source = r#"<p go-if="ok">yes</p><p go-else go-if-class-warn="true">{{go:reason}}</p>"#;
        let rendered =
            render_template(source, &params! { "ok" => false, "reason" => "nope" }).unwrap();
        insta::assert_snapshot!(rendered, @r#"<p class="warn">nope</p>"#);
    }
}
