//! `if-class-<name>` toggles.
//!
//! Each toggle adds `<name>` to the element's class list when its condition
//! holds. Toggles are independent of each other, any subset may apply.

use std::sync::Arc;

use gesso_carton::{split_class_list, String};
use gesso_relief::{
    Applied, ApplyContext, Extension, NodeArena, NodeId, ParserOptions, RenderError, Tree,
    TreeError, CLASS_TOGGLE,
};

const CLASS: &str = "class";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalClassExtension {
    /// `(class name, condition)` in attribute order
    pub toggles: Vec<(String, String)>,
}

impl Extension for ConditionalClassExtension {
    fn apply(&self, cx: &mut ApplyContext<'_, '_>, node: NodeId) -> Result<Applied, RenderError> {
        let mut active = Vec::with_capacity(self.toggles.len());
        for (name, condition) in &self.toggles {
            if cx.evaluate_bool(node, condition)? {
                active.push(name.as_str());
            }
        }
        if active.is_empty() {
            return Ok(Applied::Node(node));
        }

        let owned = cx.arena.make_owned(node);
        let target = cx.arena.node_mut(owned)?;
        // The merged class list always goes last
        let mut classes: Vec<std::string::String> = target
            .remove_attribute(CLASS)
            .map(|attr| split_class_list(&attr.value).map(ToOwned::to_owned).collect())
            .unwrap_or_default();
        classes.extend(active.into_iter().map(ToOwned::to_owned));
        target.add_attribute(CLASS, String::from(classes.join(" ")));

        Ok(Applied::Node(owned))
    }
}

/// Collect the `if-class-<name>` attributes of an element into a
/// [`ConditionalClassExtension`].
pub fn process_conditional_class(
    tree: &mut Tree,
    node: NodeId,
    options: &ParserOptions,
) -> Result<(), TreeError> {
    if !tree.node(node).is_element() {
        return Ok(());
    }
    let prefix = options.directive(CLASS_TOGGLE);
    let element = tree.node_mut(node)?;
    let toggles: Vec<(String, String)> = element
        .attributes()
        .iter()
        .filter_map(|attr| {
            let name = attr.key.strip_prefix(prefix.as_str())?;
            (!name.is_empty()).then(|| (String::from(name), attr.value.clone()))
        })
        .collect();
    if toggles.is_empty() {
        return Ok(());
    }

    for (name, _) in &toggles {
        element.remove_attribute(&format!("{prefix}{name}"));
    }
    element.add_extension(Arc::new(ConditionalClassExtension { toggles }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{parse_default, render_template};
    use gesso_relief::params;

    const MENU: &str =
        r#"<li class="menu-entry" go-if-class-food="isFood" go-if-class-drink="isDrink">Tea</li>"#;

    #[test]
    fn test_toggles_are_collected() {
        let tree = parse_default(MENU);
        let li = tree.node(tree.roots().next().unwrap());
        let keys: Vec<&str> = li.attributes().iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, ["class"]);
        assert_eq!(li.extensions().len(), 1);
    }

    #[test]
    fn test_toggles_are_independent() {
        let cases = [
            (true, false, r#"<li class="menu-entry food">Tea</li>"#),
            (false, true, r#"<li class="menu-entry drink">Tea</li>"#),
            (true, true, r#"<li class="menu-entry food drink">Tea</li>"#),
            (false, false, r#"<li class="menu-entry">Tea</li>"#),
        ];
        for (food, drink, expected) in cases {
            let params = params! { "isFood" => food, "isDrink" => drink };
            assert_eq!(render_template(MENU, &params).unwrap(), expected);
        }
    }

    #[test]
    fn test_without_static_class() {
        let source = r#"<p go-if-class-active="on" id="x">hi</p>"#;
        assert_eq!(
            render_template(source, &params! { "on" => true }).unwrap(),
            r#"<p id="x" class="active">hi</p>"#
        );
        // No class at all stays without a class attribute
        assert_eq!(
            render_template(source, &params! { "on" => false }).unwrap(),
            r#"<p id="x">hi</p>"#
        );
    }

    #[test]
    fn test_merged_class_moves_last() {
        let source = r#"<p class="note" go-if-class-warn="warn" id="x" title="t">hi</p>"#;
        insta::assert_snapshot!(
            render_template(source, &params! { "warn" => true }).unwrap(),
            @r#"<p id="x" title="t" class="note warn">hi</p>"#
        );
        // Nothing active keeps the source order
        insta::assert_snapshot!(
            render_template(source, &params! { "warn" => false }).unwrap(),
            @r#"<p class="note" id="x" title="t">hi</p>"#
        );
    }

    #[test]
    fn test_empty_name_is_not_a_toggle() {
        let tree = parse_default(r#"<p go-if-class-="x">hi</p>"#);
        let p = tree.node(tree.roots().next().unwrap());
        assert!(p.has_attribute("go-if-class-"));
        assert!(!p.has_extensions());
    }

    #[test]
    fn test_template_is_not_mutated() {
        let tree = parse_default(MENU);
        let mut arena = gesso_relief::RenderArena::new(&tree);
        let deps = crate::default_dependencies();
        let params = params! { "isFood" => true, "isDrink" => true };
        let mut cx = ApplyContext::new(&mut arena, &deps, &params);
        let li = tree.roots().next().unwrap();

        let outcome = gesso_relief::apply_extensions(&mut cx, li).unwrap();
        let rendered = outcome.node.unwrap();
        assert_ne!(rendered, li);
        assert_eq!(arena.node(rendered).attribute("class"), Some("menu-entry food drink"));
        assert_eq!(tree.node(li).attribute("class"), Some("menu-entry"));
    }
}
