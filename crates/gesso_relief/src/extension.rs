//! Render-time extension contract.
//!
//! Node processors attach extensions to template nodes at parse time. At
//! render time a node's extensions run in attachment order: each one receives
//! the node produced by the previous extension and either passes a node on,
//! replaces the node with siblings, or settles the whole pipeline.

use std::fmt;
use std::sync::Arc;

use gesso_carton::{SmallVec, String};

use crate::context::ScopeChain;
use crate::dependencies::{ExtensionDependencies, EVALUATOR};
use crate::errors::RenderError;
use crate::evaluator::Evaluator;
use crate::node::NodeId;
use crate::tree::{NodeArena, RenderArena};
use crate::value::{Params, Value};

/// A render-time transform attached to a node.
///
/// Extensions are shared by every render of a template, possibly from several
/// threads at once, so all render state lives in the [`ApplyContext`].
pub trait Extension: fmt::Debug + Send + Sync {
    fn apply(&self, cx: &mut ApplyContext<'_, '_>, node: NodeId) -> Result<Applied, RenderError>;
}

/// Result of a single extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Hand this node to the next extension
    Node(NodeId),
    /// Replace the node with these siblings and stop
    Siblings(Vec<NodeId>),
    /// Stop with a final outcome
    Settled(Outcome),
}

/// Result of a whole pipeline: what the renderer emits in place of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub node: Option<NodeId>,
    /// Already processed nodes emitted after `node`, in order
    pub siblings: Vec<NodeId>,
}

impl Outcome {
    pub fn node(node: NodeId) -> Self {
        Self {
            node: Some(node),
            siblings: Vec::new(),
        }
    }

    pub fn siblings(siblings: Vec<NodeId>) -> Self {
        Self {
            node: None,
            siblings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_none() && self.siblings.is_empty()
    }
}

/// Everything an extension can touch during one render call.
pub struct ApplyContext<'a, 't> {
    pub arena: &'a mut RenderArena<'t>,
    pub dependencies: &'a dyn ExtensionDependencies,
    /// Top-level render parameters
    pub params: &'a Params,
    /// Set while running the pipeline of a freshly repeated copy
    pub suppress_expansion: bool,
}

impl<'a, 't> ApplyContext<'a, 't> {
    pub fn new(
        arena: &'a mut RenderArena<'t>,
        dependencies: &'a dyn ExtensionDependencies,
        params: &'a Params,
    ) -> Self {
        Self {
            arena,
            dependencies,
            params,
            suppress_expansion: false,
        }
    }

    /// Reborrow for a nested pipeline run
    pub fn nested(&mut self, suppress_expansion: bool) -> ApplyContext<'_, 't> {
        ApplyContext {
            arena: &mut *self.arena,
            dependencies: self.dependencies,
            params: self.params,
            suppress_expansion,
        }
    }

    pub fn evaluator(&self) -> Result<&'a dyn Evaluator, RenderError> {
        self.dependencies
            .evaluator()
            .ok_or(RenderError::MissingDependency(EVALUATOR))
    }

    pub fn scope(&self, node: NodeId) -> ScopeChain {
        ScopeChain::resolve(&*self.arena, node)
    }

    pub fn evaluate(&self, node: NodeId, expression: &str) -> Result<Value, RenderError> {
        self.scope(node)
            .evaluate(self.evaluator()?, expression, self.params)
    }

    pub fn evaluate_bool(&self, node: NodeId, expression: &str) -> Result<bool, RenderError> {
        self.scope(node)
            .evaluate_bool(self.evaluator()?, expression, self.params)
    }

    pub fn evaluate_string(&self, node: NodeId, expression: &str) -> Result<String, RenderError> {
        self.scope(node)
            .evaluate_string(self.evaluator()?, expression, self.params)
    }
}

impl fmt::Debug for ApplyContext<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplyContext")
            .field("allocated", &self.arena.allocated())
            .field("suppress_expansion", &self.suppress_expansion)
            .finish_non_exhaustive()
    }
}

/// Run the extensions attached to `node`.
pub fn apply_extensions(cx: &mut ApplyContext<'_, '_>, node: NodeId) -> Result<Outcome, RenderError> {
    let extensions: SmallVec<[Arc<dyn Extension>; 2]> =
        cx.arena.node(node).extensions().iter().cloned().collect();

    let mut current = node;
    for extension in &extensions {
        match extension.apply(cx, current)? {
            Applied::Node(next) => current = next,
            Applied::Siblings(siblings) => return Ok(Outcome::siblings(siblings)),
            Applied::Settled(outcome) => return Ok(outcome),
        }
    }
    Ok(Outcome::node(current))
}
