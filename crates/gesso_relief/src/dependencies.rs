//! Named capabilities extensions look up while rendering.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use gesso_carton::{FxHashMap, String};

use crate::evaluator::Evaluator;

/// Key the expression evaluator is registered under.
///
/// The value stored under it must be an `Arc<dyn Evaluator>`.
pub const EVALUATOR: &str = "evaluator";

/// A capability lookup: `get(key)` returns the capability or nothing.
pub trait ExtensionDependencies: Send + Sync {
    fn get(&self, key: &str) -> Option<&(dyn Any + Send + Sync)>;

    /// The evaluator registered under [`EVALUATOR`], if any
    fn evaluator(&self) -> Option<&dyn Evaluator> {
        self.get(EVALUATOR)?
            .downcast_ref::<Arc<dyn Evaluator>>()
            .map(|evaluator| evaluator.as_ref())
    }
}

/// A plain key to capability map.
#[derive(Clone, Default)]
pub struct DependencyMap {
    entries: FxHashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, capability: T) {
        self.entries.insert(key.into(), Arc::new(capability));
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.insert(EVALUATOR, evaluator);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for DependencyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl ExtensionDependencies for DependencyMap {
    fn get(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.entries.get(key).map(|capability| capability.as_ref())
    }
}

/// Ordered override sets queried before a fallback set.
///
/// Sets added later take precedence over sets added earlier.
#[derive(Clone)]
pub struct CompoundDependencies {
    overrides: Vec<Arc<dyn ExtensionDependencies>>,
    fallback: Arc<dyn ExtensionDependencies>,
}

impl CompoundDependencies {
    pub fn new(fallback: Arc<dyn ExtensionDependencies>) -> Self {
        Self {
            overrides: Vec::new(),
            fallback,
        }
    }

    /// Put `dependencies` in front of every set registered so far
    pub fn push(&mut self, dependencies: Arc<dyn ExtensionDependencies>) {
        self.overrides.insert(0, dependencies);
    }

    pub fn overrides(&self) -> usize {
        self.overrides.len()
    }
}

impl fmt::Debug for CompoundDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundDependencies")
            .field("overrides", &self.overrides.len())
            .finish_non_exhaustive()
    }
}

impl ExtensionDependencies for CompoundDependencies {
    fn get(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.overrides
            .iter()
            .find_map(|set| set.get(key))
            .or_else(|| self.fallback.get(key))
    }
}
