//! Armature - The structural parser framework for Gesso templates.
//!
//! ## Name Origin
//!
//! An **armature** is the internal framework a sculptor builds before adding
//! clay. This crate builds the framework of a template: the tokenizer splits
//! markup into structural events and the parser assembles them into the node
//! tree that the directives are later attached to.
//!
//! ## Example
//!
//! ```
//! use gesso_armature::parse;
//! use gesso_relief::NodeArena;
//!
//! let tree = parse("<ul><li>Tea</li></ul>").unwrap();
//! let ul = tree.roots().next().unwrap();
//! assert_eq!(tree.node(ul).data, "ul");
//! ```

pub mod parser;
pub mod token;
pub mod tokenizer;

pub use parser::{parse, parse_tokens, parse_with_options, Parser};
pub use token::{tokenize, LineIndex, Token, TokenKind};
pub use tokenizer::{Callbacks, QuoteType, Tokenizer, TokenizerError};
