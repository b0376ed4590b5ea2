//! Relief - The sculptured node tree for Gesso templates.
//!
//! ## Name Origin
//!
//! **Relief** is a sculptural technique where figures project from a flat
//! background. A parsed template is exactly that: markup raised into a tree of
//! nodes, with directives standing out as extensions attached to them.
//!
//! ## Contents
//!
//! - [`Node`], [`Attributes`]: the template node and its attribute store
//! - [`Tree`], [`RenderArena`], [`NodeArena`]: node storage and mutation
//! - [`ScopeChain`]: context resolution for expressions
//! - [`Extension`], [`apply_extensions`]: the render-time pipeline contract
//! - [`ExtensionDependencies`], [`CompoundDependencies`]: capability lookup
//! - [`Evaluator`], [`Value`], [`Params`]: the expression evaluator contract
//! - [`ParseError`], [`RenderError`], [`TreeError`], [`EvalError`]

pub mod attribute;
pub mod context;
pub mod dependencies;
pub mod errors;
pub mod evaluator;
pub mod extension;
pub mod node;
pub mod options;
pub mod tree;
pub mod value;

pub use attribute::*;
pub use context::*;
pub use dependencies::*;
pub use errors::*;
pub use evaluator::*;
pub use extension::*;
pub use node::*;
pub use options::*;
pub use tree::*;
pub use value::*;
