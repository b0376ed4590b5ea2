//! Token stream consumed by the parser.

use gesso_carton::String;
use gesso_relief::{Attribute, Position};

use crate::tokenizer::{Callbacks, QuoteType, Tokenizer, TokenizerError};

/// One structural event of the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind<'s>,
    /// Where the token starts
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'s> {
    Text(&'s str),
    /// Doctype string, `html` for `<!DOCTYPE html>`
    Doctype(&'s str),
    StartTag {
        name: &'s str,
        attributes: Vec<Attribute>,
    },
    SelfClosingTag {
        name: &'s str,
        attributes: Vec<Attribute>,
    },
    EndTag(&'s str),
    Comment(&'s str),
    Error(TokenizerError),
}

/// Byte offset to line/column mapping for one source.
#[derive(Debug, Clone)]
pub struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        Self {
            newlines: source.match_indices('\n').map(|(idx, _)| idx).collect(),
        }
    }

    /// Get the position for a given byte offset
    pub fn position(&self, offset: usize) -> Position {
        // Binary search for line number
        let line = match self.newlines.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i + 1,
        };

        let column = if line == 1 {
            offset + 1
        } else {
            offset - self.newlines[line - 2]
        };

        Position::new(offset as u32, line as u32, column as u32)
    }
}

/// Split `source` into tokens.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let collector = TokenCollector {
        source,
        lines: LineIndex::new(source),
        tokens: Vec::new(),
        tag: None,
        attribute: None,
    };
    let mut tokenizer = Tokenizer::new(source, collector);
    tokenizer.tokenize();
    tokenizer.into_callbacks().tokens
}

/// Tag being assembled from tokenizer callbacks
struct PendingTag<'s> {
    name: &'s str,
    start: usize,
    attributes: Vec<Attribute>,
}

/// Attribute being assembled from tokenizer callbacks
struct PendingAttribute<'s> {
    key: &'s str,
    value: Option<&'s str>,
}

struct TokenCollector<'s> {
    source: &'s str,
    lines: LineIndex,
    tokens: Vec<Token<'s>>,
    tag: Option<PendingTag<'s>>,
    attribute: Option<PendingAttribute<'s>>,
}

impl<'s> TokenCollector<'s> {
    fn push(&mut self, kind: TokenKind<'s>, start: usize) {
        let position = self.lines.position(start);
        self.tokens.push(Token { kind, position });
    }

    fn finish_tag(&mut self, self_closing: bool) {
        if let Some(tag) = self.tag.take() {
            let kind = if self_closing {
                TokenKind::SelfClosingTag {
                    name: tag.name,
                    attributes: tag.attributes,
                }
            } else {
                TokenKind::StartTag {
                    name: tag.name,
                    attributes: tag.attributes,
                }
            };
            self.push(kind, tag.start);
        }
    }
}

impl Callbacks for TokenCollector<'_> {
    fn on_text(&mut self, start: usize, end: usize) {
        self.push(TokenKind::Text(&self.source[start..end]), start);
    }

    fn on_open_tag_name(&mut self, start: usize, end: usize) {
        self.tag = Some(PendingTag {
            name: &self.source[start..end],
            // Include the `<`
            start: start - 1,
            attributes: Vec::new(),
        });
    }

    fn on_open_tag_end(&mut self, _end: usize) {
        self.finish_tag(false);
    }

    fn on_self_closing_tag(&mut self, _end: usize) {
        self.finish_tag(true);
    }

    fn on_close_tag(&mut self, start: usize, end: usize) {
        // Include the `</`
        self.push(TokenKind::EndTag(&self.source[start..end]), start.saturating_sub(2));
    }

    fn on_attrib_name(&mut self, start: usize, end: usize) {
        self.attribute = Some(PendingAttribute {
            key: &self.source[start..end],
            value: None,
        });
    }

    fn on_attrib_data(&mut self, start: usize, end: usize) {
        if let Some(attribute) = self.attribute.as_mut() {
            attribute.value = Some(&self.source[start..end]);
        }
    }

    fn on_attrib_end(&mut self, quote: QuoteType, _end: usize) {
        let (Some(attribute), Some(tag)) = (self.attribute.take(), self.tag.as_mut()) else {
            return;
        };
        let attribute = match (quote, attribute.value) {
            (QuoteType::NoValue, _) => Attribute::key_only(attribute.key),
            (_, value) => Attribute::new(attribute.key, value.unwrap_or_default()),
        };
        tag.attributes.push(attribute);
    }

    fn on_declaration(&mut self, start: usize, end: usize) {
        let declaration = &self.source[start..end];
        if let Some(doctype) = strip_doctype(declaration) {
            // Include the `<!`
            self.push(TokenKind::Doctype(doctype), start - 2);
        }
    }

    fn on_comment(&mut self, start: usize, end: usize) {
        // Include the `<!--`
        self.push(TokenKind::Comment(&self.source[start..end]), start.saturating_sub(4));
    }

    fn on_end(&mut self) {}

    fn on_error(&mut self, error: TokenizerError, index: usize) {
        self.push(TokenKind::Error(error), index);
    }
}

/// `html` from `DOCTYPE html`, case-insensitively
fn strip_doctype(declaration: &str) -> Option<&str> {
    let keyword = declaration.get(..7)?;
    if !keyword.eq_ignore_ascii_case("doctype") {
        return None;
    }
    let rest = &declaration[7..];
    if !rest.is_empty() && !rest.starts_with(|c: char| c.is_ascii_whitespace()) {
        return None;
    }
    Some(rest.trim())
}

/// Lowercased copy of a tag name or attribute key
pub(crate) fn lowercase(name: &str) -> String {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        name.to_ascii_lowercase().into()
    } else {
        name.into()
    }
}
