//! Error taxonomy shared by the parser, the node tree and the renderer.
//!
//! Nothing in Gesso recovers from an error: the first one encountered aborts
//! the parse or render call and is handed back to the caller.

use gesso_carton::String;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::NodeId;

/// Source position in the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    /// Byte offset from start of file
    pub offset: u32,
    /// 1-indexed line number
    pub line: u32,
    /// 1-indexed column number
    pub column: u32,
}

impl Position {
    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Structurally malformed template input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parser: {kind} at {position}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: Position,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: Position) -> Self {
        Self { kind, position }
    }
}

/// What went wrong while assembling the node tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("found an end tag `</{found}>` that does not match the start tag `<{expected}>`")]
    MismatchedEndTag { expected: String, found: String },

    #[error("found an end tag `</{found}>` but there's no start tag available")]
    UnexpectedEndTag { found: String },

    #[error("reached the end of the input unexpectedly, `<{open}>` is still open")]
    UnexpectedEndOfInput { open: String },

    #[error("unexpectedly found a doctype")]
    MisplacedDoctype,

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Misuse of the node tree mutation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} is already a child of another node")]
    AlreadyAttached(NodeId),

    #[error("node {parent} is not the parent of node {child}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("anchor node {anchor} is not a child of node {parent}")]
    AnchorNotAChild { parent: NodeId, anchor: NodeId },

    #[error("node {0} belongs to the template and cannot be modified while rendering")]
    ReadOnly(NodeId),
}

/// Failure reported by an [`Evaluator`](crate::Evaluator).
///
/// Covers both expressions that cannot be parsed and expressions whose
/// result does not have the type the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("evaluator: malformed expression `{expression}`: {reason}")]
    Syntax { expression: String, reason: String },

    #[error("evaluator: no parameter `{0}` found")]
    MissingParameter(String),

    #[error("evaluator: `{expression}` evaluated to {found}, expected {expected}")]
    UnexpectedType {
        expression: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("evaluator: cannot apply `{operator}` to {left} and {right}")]
    InvalidOperands {
        operator: &'static str,
        left: &'static str,
        right: &'static str,
    },
}

/// Fatal error raised while rendering a parsed template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("cannot evaluate `{expression}`: {source}")]
    Evaluation {
        expression: String,
        #[source]
        source: EvalError,
    },

    #[error("the type of `{expression}` is {found}, not a range parameter sequence")]
    TypeMismatch {
        expression: String,
        found: &'static str,
    },

    #[error("cannot find attribute `{key}` to interpolate")]
    MissingAttribute { key: String },

    #[error("no extension dependency registered under `{0}`")]
    MissingDependency(&'static str),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl RenderError {
    pub fn evaluation(expression: &str, source: EvalError) -> Self {
        Self::Evaluation {
            expression: expression.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message() {
        let err = ParseError::new(
            ParseErrorKind::MismatchedEndTag {
                expected: "div".into(),
                found: "span".into(),
            },
            Position::new(12, 2, 4),
        );
        assert_eq!(
            err.to_string(),
            "parser: found an end tag `</span>` that does not match the start tag `<div>` at 2:4"
        );
    }

    #[test]
    fn test_render_error_keeps_source() {
        use std::error::Error as _;

        let err = RenderError::evaluation("name", EvalError::MissingParameter("name".into()));
        assert!(err.to_string().contains("`name`"));
        assert!(err.source().is_some());
    }
}
