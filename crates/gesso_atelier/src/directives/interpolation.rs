//! `{{go:name}}` string interpolation.
//!
//! Markers are found once at parse time. At render time every marker's key is
//! evaluated as a string and the first remaining occurrence of the marker is
//! replaced by the result. Values are inserted as is, without escaping.

use std::sync::Arc;

use gesso_carton::String;
use gesso_relief::{
    Applied, ApplyContext, Extension, NodeArena, NodeId, ParserOptions, RenderError, Tree,
    TreeError,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// `{{go:` + dotted alphanumeric identifier + `}}`
static MARKER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\{\{go:([A-Za-z][A-Za-z0-9]*(?:\.[A-Za-z0-9]+)*)\}\}").ok());

/// One marker occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// The marker as written, `{{go:user.name}}`
    pub marker: String,
    /// Expression evaluated in its place, `user.name`
    pub key: String,
}

/// Every marker in `text`, in order of appearance
pub fn find_markers(text: &str) -> Vec<Marker> {
    let Some(pattern) = MARKER.as_ref() else {
        return Vec::new();
    };
    pattern
        .captures_iter(text)
        .filter_map(|captures| {
            Some(Marker {
                marker: captures.get(0)?.as_str().into(),
                key: captures.get(1)?.as_str().into(),
            })
        })
        .collect()
}

/// Evaluate the markers and substitute them into `text`
fn interpolate(
    cx: &ApplyContext<'_, '_>,
    node: NodeId,
    text: &str,
    markers: &[Marker],
) -> Result<String, RenderError> {
    let mut result = std::string::String::from(text);
    for marker in markers {
        let value = cx.evaluate_string(node, &marker.key)?;
        result = result.replacen(marker.marker.as_str(), &value, 1);
    }
    Ok(result.into())
}

/// Interpolates the payload of a text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInterpolation {
    pub markers: Vec<Marker>,
}

impl Extension for TextInterpolation {
    fn apply(&self, cx: &mut ApplyContext<'_, '_>, node: NodeId) -> Result<Applied, RenderError> {
        let text = interpolate(cx, node, &cx.arena.node(node).data, &self.markers)?;

        let owned = cx.arena.make_owned(node);
        cx.arena.node_mut(owned)?.data = text;
        Ok(Applied::Node(owned))
    }
}

/// Interpolates attribute values of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInterpolation {
    /// Markers per attribute key
    pub attributes: Vec<(String, Vec<Marker>)>,
}

impl Extension for AttributeInterpolation {
    fn apply(&self, cx: &mut ApplyContext<'_, '_>, node: NodeId) -> Result<Applied, RenderError> {
        let mut values = Vec::with_capacity(self.attributes.len());
        for (key, markers) in &self.attributes {
            let Some(value) = cx.arena.node(node).attribute(key) else {
                return Err(RenderError::MissingAttribute { key: key.clone() });
            };
            values.push((key, interpolate(cx, node, value, markers)?));
        }

        let owned = cx.arena.make_owned(node);
        let element = cx.arena.node_mut(owned)?;
        for (key, value) in values {
            element.add_attribute(key.clone(), value);
        }
        Ok(Applied::Node(owned))
    }
}

/// Attach interpolation extensions to text nodes and to elements with markers
/// in their (non-directive) attribute values.
pub fn process_interpolation(
    tree: &mut Tree,
    node: NodeId,
    options: &ParserOptions,
) -> Result<(), TreeError> {
    let target = tree.node_mut(node)?;

    if target.is_text() {
        let markers = find_markers(&target.data);
        if !markers.is_empty() {
            target.add_extension(Arc::new(TextInterpolation { markers }));
        }
        return Ok(());
    }

    if !target.is_element() {
        return Ok(());
    }
    let attributes: Vec<(String, Vec<Marker>)> = target
        .attributes()
        .iter()
        .filter(|attr| !attr.key_only && !options.is_directive(&attr.key))
        .map(|attr| (attr.key.clone(), find_markers(&attr.value)))
        .filter(|(_, markers)| !markers.is_empty())
        .collect();
    if !attributes.is_empty() {
        target.add_extension(Arc::new(AttributeInterpolation { attributes }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::render_template;
    use gesso_relief::{params, EvalError, Params};

    fn keys(text: &str) -> Vec<std::string::String> {
        find_markers(text).into_iter().map(|m| m.key.to_string()).collect()
    }

    #[test]
    fn test_find_markers() {
        assert_eq!(keys("Hello, {{go:name}}!"), ["name"]);
        assert_eq!(keys("{{go:a}}{{go:user.address.city}}{{go:a}}"), ["a", "user.address.city", "a"]);
        assert_eq!(keys("{{go:item2.x1}}"), ["item2.x1"]);
    }

    #[test]
    fn test_malformed_markers_are_ignored() {
        for text in [
            "{{go:}}",
            "{{ go:name }}",
            "{{go:1st}}",
            "{{go:a.}}",
            "{{go:a..b}}",
            "{go:name}",
            "{{name}}",
            "{{go:first_name}}",
        ] {
            assert!(find_markers(text).is_empty(), "{text:?}");
        }
    }

    #[test]
    fn test_text() {
        let rendered =
            render_template("<p>Hello, {{go:name}}!</p>", &params! { "name" => "Ann" }).unwrap();
        insta::assert_snapshot!(rendered, @"<p>Hello, Ann!</p>");
    }

    #[test]
    fn test_missing_key_fails() {
        let err = render_template("<p>Hello, {{go:name}}!</p>", &Params::new()).unwrap_err();
        assert_eq!(
            err,
            RenderError::Evaluation {
                expression: "name".into(),
                source: EvalError::MissingParameter("name".into()),
            }
        );
    }

    #[test]
    fn test_non_string_value_fails() {
        let err = render_template("<p>{{go:count}}</p>", &params! { "count" => 3 }).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Evaluation {
                source: EvalError::UnexpectedType { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_repeated_marker_replaces_each_occurrence() {
        let rendered =
            render_template("<p>{{go:x}} and {{go:x}}</p>", &params! { "x" => "y" }).unwrap();
        insta::assert_snapshot!(rendered, @"<p>y and y</p>");
    }

    #[test]
    fn test_attributes() {
        let source = r#"<a href="/users/{{go:user.id}}" title="{{go:user.name}}" go-if="true">{{go:user.name}}</a>"#;
        let params = params! { "user" => params! { "id" => "42", "name" => "Ann" } };
        let rendered = render_template(source, &params).unwrap();
        insta::assert_snapshot!(rendered, @r#"<a href="/users/42" title="Ann">Ann</a>"#);
    }

    #[test]
    fn test_directive_attributes_are_not_scanned() {
        let mut tree = Tree::new();
        let p = tree.alloc(gesso_relief::Node::element(
            "p",
            [
                gesso_relief::Attribute::new("go-if", "{{go:x}}"),
                gesso_relief::Attribute::new("data-x", "{{go:x}}"),
            ],
            false,
        ));
        process_interpolation(&mut tree, p, &ParserOptions::default()).unwrap();

        let extensions = tree.node(p).extensions();
        assert_eq!(extensions.len(), 1);
        let debug = format!("{:?}", extensions[0]);
        assert!(debug.contains("data-x"));
        assert!(!debug.contains("go-if"));
    }

    #[test]
    fn test_values_are_not_escaped() {
        let rendered = render_template("<p>{{go:html}}</p>", &params! { "html" => "<b>&</b>" })
            .unwrap();
        insta::assert_snapshot!(rendered, @"<p><b>&</b></p>");
    }
}
