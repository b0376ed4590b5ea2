//! # Gesso
//!
//! Directive-driven HTML templates written in Rust.
//!
//! ## Name Origin
//!
//! **Gesso** is the white ground painters lay on a canvas before any paint
//! goes on. A template is the same kind of prepared surface: plain markup,
//! primed with a handful of directives, waiting for parameters.
//!
//! ## Example
//!
//! ```
//! use gesso::{params, Template};
//!
//! let template = Template::parse(
//!     r#"<ul><li go-range="items" go-if-class-hot="hot">{{go:name}}</li></ul>"#,
//! )
//! .unwrap();
//!
//! let params = params! {
//!     "items" => gesso::relief::range_params([
//!         params! { "name" => "tea", "hot" => true },
//!         params! { "name" => "juice", "hot" => false },
//!     ]),
//! };
//! assert_eq!(
//!     template.render_string(&params).unwrap(),
//!     r#"<ul><li class="hot">tea</li><li>juice</li></ul>"#,
//! );
//! ```
//!
//! ## Crates
//!
//! - [`carton`] - Shared strings, collections and HTML tables
//! - [`relief`] - Node tree, scopes, values and the extension contract
//! - [`armature`] - Tokenizer and parser
//! - [`atelier`] - Directives, expression evaluator and renderer

pub mod config;
mod error;
mod template;

pub use config::{load_config, read_config, read_params, GessoConfig};
pub use error::Error;
pub use template::Template;

pub use gesso_relief::{params, Params, ParserOptions, Value, WhitespaceStrategy};

/// Shared strings, collections and HTML tables.
pub use gesso_carton as carton;

/// Node tree, scopes, values and the extension contract.
pub use gesso_relief as relief;

/// Tokenizer and parser.
pub use gesso_armature as armature;

/// Directives, expression evaluator and renderer.
pub use gesso_atelier as atelier;
