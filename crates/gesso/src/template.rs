//! Parsed, reusable template.

use std::io::{Read, Write};
use std::sync::Arc;

use gesso_armature::parse_with_options;
use gesso_atelier::{default_dependencies, default_parser_options, render};
use gesso_relief::{CompoundDependencies, ExtensionDependencies, Params, ParserOptions, Tree};

use crate::Error;

/// A template parsed once and rendered any number of times.
///
/// Rendering never modifies the template, so one `Template` can be shared
/// between threads and rendered concurrently.
#[derive(Debug, Clone)]
pub struct Template {
    tree: Tree,
    dependencies: CompoundDependencies,
}

impl Template {
    /// Parse `source` with the default directives
    pub fn parse(source: &str) -> Result<Self, Error> {
        Self::parse_with_options(source, &default_parser_options())
    }

    /// Read the whole of `reader` and parse it with the default directives
    pub fn from_reader(mut reader: impl Read) -> Result<Self, Error> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Self::parse(&source)
    }

    pub fn parse_with_options(source: &str, options: &ParserOptions) -> Result<Self, Error> {
        Ok(Self::from_tree(parse_with_options(source, options)?))
    }

    /// Wrap an already parsed tree, using the default dependencies
    pub fn from_tree(tree: Tree) -> Self {
        Self {
            tree,
            dependencies: CompoundDependencies::new(Arc::new(default_dependencies())),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Consult `dependencies` before every set registered so far.
    pub fn add_dependencies(&mut self, dependencies: Arc<dyn ExtensionDependencies>) -> &mut Self {
        self.dependencies.push(dependencies);
        self
    }

    pub fn render_string(&self, params: &Params) -> Result<String, Error> {
        Ok(render(&self.tree, &self.dependencies, params)?)
    }

    pub fn render_bytes(&self, params: &Params) -> Result<Vec<u8>, Error> {
        self.render_string(params).map(String::into_bytes)
    }

    /// Render into `writer`. Nothing is written when rendering fails.
    pub fn render_to(&self, params: &Params, mut writer: impl Write) -> Result<(), Error> {
        let output = self.render_string(params)?;
        writer.write_all(output.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesso_relief::params;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_template_is_send_and_sync() {
        assert_send_sync::<Template>();
    }

    #[test]
    fn test_from_reader() {
        let template = Template::from_reader("<p>{{go:x}}</p>".as_bytes()).unwrap();
        assert_eq!(template.render_string(&params! { "x" => "y" }).unwrap(), "<p>y</p>");
    }

    #[test]
    fn test_render_bytes() {
        let template = Template::parse("<b>ok</b>").unwrap();
        assert_eq!(template.render_bytes(&params! {}).unwrap(), b"<b>ok</b>");
    }

    #[test]
    fn test_render_to_writes_nothing_on_error() {
        let template = Template::parse("<p>{{go:missing}}</p>").unwrap();
        let mut out = Vec::new();
        assert!(matches!(
            template.render_to(&params! {}, &mut out),
            Err(Error::Render(_))
        ));
        assert!(out.is_empty());
    }
}
