//! Atelier - The workshop where Gesso templates come to life.
//!
//! ## Name Origin
//!
//! An **atelier** is the workshop where a piece is finished. This crate holds
//! everything that turns a parsed template into markup: the directive node
//! processors and their render-time extensions, the default expression
//! evaluator, and the renderer itself.
//!
//! ## Example
//!
//! ```
//! use gesso_armature::parse_with_options;
//! use gesso_atelier::{default_dependencies, default_parser_options, render};
//! use gesso_relief::params;
//!
//! let tree = parse_with_options(
//!     r#"<p go-if="visible">Hello, {{go:name}}!</p>"#,
//!     &default_parser_options(),
//! )
//! .unwrap();
//! let params = params! { "visible" => true, "name" => "Ann" };
//!
//! let html = render(&tree, &default_dependencies(), &params).unwrap();
//! assert_eq!(html, "<p>Hello, Ann!</p>");
//! ```

pub mod dependencies;
pub mod directives;
pub mod evaluator;
pub mod render;

pub use dependencies::default_dependencies;
pub use directives::{default_node_processors, default_parser_options};
pub use evaluator::ExpressionEvaluator;
pub use render::render;

#[cfg(test)]
pub(crate) mod test_utils {
    use gesso_armature::parse_with_options;
    use gesso_relief::{Params, RenderError, Tree};

    pub fn parse_default(source: &str) -> Tree {
        parse_with_options(source, &crate::default_parser_options()).unwrap()
    }

    pub fn render_template(source: &str, params: &Params) -> Result<String, RenderError> {
        crate::render(&parse_default(source), &crate::default_dependencies(), params)
    }
}
