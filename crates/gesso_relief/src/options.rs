//! Parser options.

use gesso_carton::{format_compact, String};
use serde::{Deserialize, Serialize};

use crate::errors::TreeError;
use crate::node::NodeId;
use crate::tree::Tree;

/// Recognizes directives on a freshly parsed node and attaches extensions.
///
/// Called once per node, after all of the node's siblings have been parsed.
pub type NodeProcessor = fn(&mut Tree, NodeId, &ParserOptions) -> Result<(), TreeError>;

/// Default directive namespace prefix
pub const DEFAULT_DIRECTIVE_PREFIX: &str = "go-";

/// Directives written as one attribute each
pub const DIRECTIVE_NAMES: [&str; 5] = ["if", "elif", "else-if", "else", "range"];

/// Directive name prefix of the per-class toggles, `if-class-<name>`
pub const CLASS_TOGGLE: &str = "if-class-";

/// Parser options
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Prefix of every directive attribute, `go-` in `go-if`
    pub directive_prefix: String,
    /// Whether to trim text
    pub whitespace: WhitespaceStrategy,
    /// Run in order on every node
    pub node_processors: Vec<NodeProcessor>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            directive_prefix: String::from(DEFAULT_DIRECTIVE_PREFIX),
            whitespace: WhitespaceStrategy::Trim,
            node_processors: Vec::new(),
        }
    }
}

impl ParserOptions {
    pub fn with_processors(mut self, processors: impl IntoIterator<Item = NodeProcessor>) -> Self {
        self.node_processors.extend(processors);
        self
    }

    /// Full attribute key of a directive, e.g. `if` becomes `go-if`
    pub fn directive(&self, name: &str) -> String {
        format_compact!("{}{}", self.directive_prefix, name)
    }

    /// Directive name carried by an attribute key, if it is one.
    ///
    /// Only known directives count, so an empty prefix leaves `href` alone.
    pub fn directive_name<'k>(&self, key: &'k str) -> Option<&'k str> {
        let name = key.strip_prefix(self.directive_prefix.as_str())?;
        let known = DIRECTIVE_NAMES.contains(&name)
            || name.strip_prefix(CLASS_TOGGLE).is_some_and(|class| !class.is_empty());
        known.then_some(name)
    }

    pub fn is_directive(&self, key: &str) -> bool {
        self.directive_name(key).is_some()
    }
}

/// Whitespace handling strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WhitespaceStrategy {
    /// Trim text and drop text that is blank after trimming
    #[default]
    Trim,
    /// Keep text verbatim
    Preserve,
}
