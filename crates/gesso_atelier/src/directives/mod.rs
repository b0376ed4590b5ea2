//! Directive node processors and their render-time extensions.
//!
//! | Directive | Attributes |
//! |---|---|
//! | Repetition | `range="<expr>"` |
//! | Conditional | `if="<expr>"`, `elif="<expr>"` / `else-if="<expr>"`, `else` |
//! | String interpolation | `{{go:name}}` markers in text and attribute values |
//! | Conditional class | `if-class-<name>="<expr>"` |
//!
//! Directive attribute keys carry the configured prefix (`go-` by default).

pub mod conditional;
pub mod conditional_class;
pub mod interpolation;
pub mod range;

pub use conditional::{process_conditional, Branch, BranchTarget, ConditionalExtension};
pub use conditional_class::{process_conditional_class, ConditionalClassExtension};
pub use interpolation::{
    find_markers, process_interpolation, AttributeInterpolation, Marker, TextInterpolation,
};
pub use range::{process_range, RangeExtension};

use gesso_relief::{NodeProcessor, ParserOptions};

/// The four directive processors in their default order.
///
/// Repetition runs first so that every other directive on a repeated element
/// is evaluated once per copy, inside that copy's scope.
pub fn default_node_processors() -> Vec<NodeProcessor> {
    vec![
        process_range as NodeProcessor,
        process_conditional,
        process_interpolation,
        process_conditional_class,
    ]
}

/// Default parser options with the directive processors installed
pub fn default_parser_options() -> ParserOptions {
    ParserOptions::default().with_processors(default_node_processors())
}
