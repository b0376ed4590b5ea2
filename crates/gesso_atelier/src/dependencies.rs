//! Default extension dependencies.

use std::sync::Arc;

use gesso_relief::{DependencyMap, Evaluator};

use crate::evaluator::ExpressionEvaluator;

/// Dependency set with the [`ExpressionEvaluator`] registered as `"evaluator"`
pub fn default_dependencies() -> DependencyMap {
    let evaluator: Arc<dyn Evaluator> = Arc::new(ExpressionEvaluator::new());
    DependencyMap::new().with_evaluator(evaluator)
}
