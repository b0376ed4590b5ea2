//! Context resolution.
//!
//! A node's scope chain is the list of parameter bags visible from it,
//! innermost first. Starting at the node itself, every node visited
//! contributes its own bag (when it has one); resolution then continues at
//! the physical parent, or at the linked node for [`Scope::Origin`] nodes.
//!
//! Evaluation tries each bag in turn and keeps the first success. When no bag
//! works the top-level render parameters get the final say, and their error
//! is the one reported.

use std::sync::Arc;

use gesso_carton::{SmallVec, String};

use crate::errors::{EvalError, RenderError};
use crate::evaluator::Evaluator;
use crate::node::{NodeId, Scope};
use crate::tree::NodeArena;
use crate::value::{Params, Value};

/// Parameter bags visible from one node, innermost first.
#[derive(Debug, Clone, Default)]
pub struct ScopeChain {
    bags: SmallVec<[Arc<Params>; 4]>,
}

impl ScopeChain {
    pub fn resolve<A: NodeArena + ?Sized>(arena: &A, node: NodeId) -> Self {
        let mut bags = SmallVec::new();
        let mut current = Some(node);

        while let Some(id) = current {
            let node = arena.node(id);
            if let Some(params) = node.context_params() {
                bags.push(Arc::clone(params));
            }
            current = match node.scope() {
                Scope::Physical => node.parent(),
                Scope::Origin(origin) => origin,
            };
        }

        Self { bags }
    }

    pub fn bags(&self) -> &[Arc<Params>] {
        &self.bags
    }

    pub fn len(&self) -> usize {
        self.bags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bags.is_empty()
    }

    pub fn evaluate(
        &self,
        evaluator: &dyn Evaluator,
        expression: &str,
        params: &Params,
    ) -> Result<Value, RenderError> {
        self.first_success(expression, params, |bag| evaluator.evaluate(expression, bag))
    }

    pub fn evaluate_bool(
        &self,
        evaluator: &dyn Evaluator,
        expression: &str,
        params: &Params,
    ) -> Result<bool, RenderError> {
        self.first_success(expression, params, |bag| {
            evaluator.evaluate_bool(expression, bag)
        })
    }

    pub fn evaluate_string(
        &self,
        evaluator: &dyn Evaluator,
        expression: &str,
        params: &Params,
    ) -> Result<String, RenderError> {
        self.first_success(expression, params, |bag| {
            evaluator.evaluate_string(expression, bag)
        })
    }

    fn first_success<T>(
        &self,
        expression: &str,
        params: &Params,
        mut evaluate: impl FnMut(&Params) -> Result<T, EvalError>,
    ) -> Result<T, RenderError> {
        if let Some(value) = self.bags.iter().find_map(|bag| evaluate(bag).ok()) {
            return Ok(value);
        }
        evaluate(params).map_err(|err| RenderError::evaluation(expression, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::params;
    use crate::tree::Tree;

    struct Lookup;

    impl Evaluator for Lookup {
        fn evaluate(&self, expression: &str, params: &Params) -> Result<Value, EvalError> {
            params
                .lookup(expression)
                .cloned()
                .ok_or_else(|| EvalError::MissingParameter(expression.into()))
        }
    }

    fn element(tree: &mut Tree, parent: NodeId) -> NodeId {
        let id = tree.alloc(Node::element("div", [], false));
        tree.append_child(parent, id).unwrap();
        id
    }

    #[test]
    fn test_physical_chain_skips_nodes_without_params() {
        let mut tree = Tree::new();
        let outer = element(&mut tree, Tree::ROOT);
        let middle = element(&mut tree, outer);
        let inner = element(&mut tree, middle);
        tree.node_mut(outer)
            .unwrap()
            .set_context_params(params! { "level" => "outer" });
        tree.node_mut(inner)
            .unwrap()
            .set_context_params(params! { "level" => "inner" });

        let chain = ScopeChain::resolve(&tree, inner);
        let levels: Vec<&Value> = chain.bags().iter().filter_map(|b| b.get("level")).collect();
        assert_eq!(levels, [&Value::from("inner"), &Value::from("outer")]);
        assert_eq!(ScopeChain::resolve(&tree, middle).len(), 1);
    }

    #[test]
    fn test_origin_chain_follows_link() {
        let mut tree = Tree::new();
        let list = element(&mut tree, Tree::ROOT);
        tree.node_mut(list)
            .unwrap()
            .set_context_params(params! { "title" => "Menu" });

        // A detached copy resolving through `list`, with a child of its own
        let copy = tree.alloc(Node::element("li", [], false));
        tree.node_mut(copy).unwrap().set_context_params(params! { "name" => "Tea" });
        tree.node_mut(copy).unwrap().set_scope(Scope::Origin(Some(list)));
        let span = element(&mut tree, copy);

        let chain = ScopeChain::resolve(&tree, span);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.bags()[0].get("name"), Some(&Value::from("Tea")));
        assert_eq!(chain.bags()[1].get("title"), Some(&Value::from("Menu")));

        tree.node_mut(copy).unwrap().set_scope(Scope::Origin(None));
        assert_eq!(ScopeChain::resolve(&tree, span).len(), 1);
    }

    #[test]
    fn test_evaluate_falls_back_outward() {
        let mut tree = Tree::new();
        let outer = element(&mut tree, Tree::ROOT);
        let inner = element(&mut tree, outer);
        tree.node_mut(outer)
            .unwrap()
            .set_context_params(params! { "a" => "outer-a", "b" => "outer-b" });
        tree.node_mut(inner)
            .unwrap()
            .set_context_params(params! { "a" => "inner-a" });
        let top = params! { "c" => "top-c", "a" => "top-a" };

        let chain = ScopeChain::resolve(&tree, inner);
        let eval = |expr| chain.evaluate_string(&Lookup, expr, &top);
        assert_eq!(eval("a").unwrap(), "inner-a");
        assert_eq!(eval("b").unwrap(), "outer-b");
        assert_eq!(eval("c").unwrap(), "top-c");
        assert_eq!(
            eval("d"),
            Err(RenderError::evaluation(
                "d",
                EvalError::MissingParameter("d".into())
            ))
        );
    }

    #[test]
    fn test_wrong_type_in_inner_bag_falls_through() {
        let mut tree = Tree::new();
        let node = element(&mut tree, Tree::ROOT);
        tree.node_mut(node)
            .unwrap()
            .set_context_params(params! { "flag" => "yes" });

        let chain = ScopeChain::resolve(&tree, node);
        let top = params! { "flag" => true };
        assert_eq!(chain.evaluate_bool(&Lookup, "flag", &top), Ok(true));
        assert!(matches!(
            chain.evaluate_bool(&Lookup, "flag", &Params::new()),
            Err(RenderError::Evaluation { .. })
        ));
    }
}
