//! Template parser.
//!
//! Consumes the token stream and assembles the node [`Tree`]. Once every
//! child of an element is known (its end tag has been seen, or the input ended
//! for top-level nodes) the children are handed to the configured node
//! processors in document order, which turn directive attributes into
//! extensions.

use gesso_carton::{is_blank, is_void_tag, SmallVec};
use gesso_relief::{
    Attribute, Node, NodeArena, NodeId, NodeKind, ParseError, ParseErrorKind, ParserOptions,
    Position, Tree, WhitespaceStrategy,
};

use crate::token::{lowercase, tokenize, Token, TokenKind};

/// Open element waiting for its end tag
#[derive(Debug)]
struct StackEntry {
    node: NodeId,
    position: Position,
}

/// Parser context for building the tree
pub struct Parser<'o> {
    /// Parser options
    options: &'o ParserOptions,
    /// Tree under construction
    tree: Tree,
    /// Open element stack
    stack: Vec<StackEntry>,
    /// Whether any element or non-blank text has been seen
    has_content: bool,
    /// Position of the token being handled
    position: Position,
}

impl<'o> Parser<'o> {
    pub fn new(options: &'o ParserOptions) -> Self {
        Self {
            options,
            tree: Tree::new(),
            stack: Vec::new(),
            has_content: false,
            position: Position::default(),
        }
    }

    /// Build the tree from a token stream
    pub fn parse<'s>(
        mut self,
        tokens: impl IntoIterator<Item = Token<'s>>,
    ) -> Result<Tree, ParseError> {
        for token in tokens {
            self.position = token.position;
            match token.kind {
                TokenKind::Text(text) => self.on_text(text)?,
                TokenKind::Doctype(doctype) => self.on_doctype(doctype)?,
                TokenKind::StartTag { name, attributes } => {
                    self.on_start_tag(name, attributes, false)?
                }
                TokenKind::SelfClosingTag { name, attributes } => {
                    self.on_start_tag(name, attributes, true)?
                }
                TokenKind::EndTag(name) => self.on_end_tag(name)?,
                TokenKind::Comment(_) => {}
                TokenKind::Error(error) => {
                    tracing::trace!(%error, position = %token.position, "ignoring tokenizer error");
                }
            }
        }

        if let Some(open) = self.stack.last() {
            let tag = self.tree.node(open.node).data.clone();
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedEndOfInput { open: tag },
                open.position,
            ));
        }

        self.process_children(Tree::ROOT)?;

        tracing::debug!(
            roots = self.tree.roots().count(),
            nodes = self.tree.len() - 1,
            "parsed template"
        );
        Ok(self.tree)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.position)
    }

    /// Node new children are added to
    fn container(&self) -> NodeId {
        self.stack.last().map_or(Tree::ROOT, |entry| entry.node)
    }

    fn add_child(&mut self, node: Node) -> Result<NodeId, ParseError> {
        let id = self.tree.alloc(node);
        let parent = self.container();
        self.tree
            .append_child(parent, id)
            .map_err(|err| self.error(err.into()))?;
        Ok(id)
    }

    fn on_text(&mut self, text: &str) -> Result<(), ParseError> {
        let text = match self.options.whitespace {
            WhitespaceStrategy::Trim => text.trim(),
            WhitespaceStrategy::Preserve => text,
        };
        if text.is_empty() {
            return Ok(());
        }
        if !is_blank(text) {
            self.has_content = true;
        }
        self.add_child(Node::text(text))?;
        Ok(())
    }

    fn on_doctype(&mut self, doctype: &str) -> Result<(), ParseError> {
        if self.has_content || !self.stack.is_empty() {
            return Err(self.error(ParseErrorKind::MisplacedDoctype));
        }
        self.has_content = true;
        self.add_child(Node::doctype(doctype))?;
        Ok(())
    }

    fn on_start_tag(
        &mut self,
        name: &str,
        attributes: Vec<Attribute>,
        self_closing: bool,
    ) -> Result<(), ParseError> {
        self.has_content = true;
        let tag = lowercase(name);
        let attributes = attributes.into_iter().map(|attr| Attribute {
            key: lowercase(&attr.key),
            ..attr
        });
        let leaf = self_closing || is_void_tag(&tag);
        let id = self.add_child(Node::element(tag, attributes, self_closing))?;

        if !leaf {
            self.stack.push(StackEntry {
                node: id,
                position: self.position,
            });
        }
        Ok(())
    }

    fn on_end_tag(&mut self, name: &str) -> Result<(), ParseError> {
        let tag = lowercase(name);
        let Some(open) = self.stack.last() else {
            if is_void_tag(&tag) {
                return Ok(());
            }
            return Err(self.error(ParseErrorKind::UnexpectedEndTag { found: tag }));
        };

        let expected = &self.tree.node(open.node).data;
        if *expected != tag {
            // `</br>` and friends close nothing
            if is_void_tag(&tag) {
                return Ok(());
            }
            return Err(self.error(ParseErrorKind::MismatchedEndTag {
                expected: expected.clone(),
                found: tag,
            }));
        }

        let node = open.node;
        self.stack.pop();
        self.process_children(node)
    }

    /// Run the node processors over every child of `parent`.
    ///
    /// Works on a snapshot so children detached by a processor (the branches
    /// of a conditional chain) are still processed.
    fn process_children(&mut self, parent: NodeId) -> Result<(), ParseError> {
        if self.options.node_processors.is_empty() {
            return Ok(());
        }
        let options = self.options;
        let children: SmallVec<[NodeId; 16]> = self.tree.children(parent).collect();
        for child in children {
            if !matches!(self.tree.node(child).kind, NodeKind::Element | NodeKind::Text) {
                continue;
            }
            for processor in &options.node_processors {
                processor(&mut self.tree, child, options).map_err(|err| self.error(err.into()))?;
            }
        }
        Ok(())
    }
}

/// Parse a template with default options
pub fn parse(source: &str) -> Result<Tree, ParseError> {
    parse_with_options(source, &ParserOptions::default())
}

/// Parse a template with options
pub fn parse_with_options(source: &str, options: &ParserOptions) -> Result<Tree, ParseError> {
    Parser::new(options).parse(tokenize(source))
}

/// Build a tree from an already tokenized template
pub fn parse_tokens<'s>(
    tokens: impl IntoIterator<Item = Token<'s>>,
    options: &ParserOptions,
) -> Result<Tree, ParseError> {
    Parser::new(options).parse(tokens)
}
