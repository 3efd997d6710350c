//! Reading `<style>` sheets, only as far as references go.

use simplecss::StyleSheet;

use crate::ast::{Element, Node};
use crate::names::SVG_NS;

/// Whether `elem` is an SVG `<style>` element.
pub fn is_style_element(elem: &Element) -> bool {
    elem.is("style") && elem.ns.as_deref() == Some(SVG_NS)
}

/// Every `(property, value)` declaration in a stylesheet. Rules come back in
/// specificity order, not source order.
pub fn declarations(text: &str) -> Vec<(String, String)> {
    let sheet = StyleSheet::parse(text);
    sheet
        .rules
        .iter()
        .flat_map(|rule| rule.declarations.iter())
        .map(|d| (d.name.to_string(), d.value.to_string()))
        .collect()
}

/// Replace the text of a `<style>` element, keeping it in CDATA if it was.
pub fn set_stylesheet(elem: &mut Element, text: String) {
    let cdata = elem.children.iter().any(|c| matches!(c, Node::CData(_)));
    elem.children = vec![if cdata { Node::CData(text) } else { Node::Text(text) }];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declarations() {
        let mut decls = declarations("/* c */ .a { fill: url(#g); stroke:red } rect{clip-path:url('#c')}");
        decls.sort();
        assert_eq!(
            decls,
            vec![
                ("clip-path".to_string(), "url('#c')".to_string()),
                ("fill".to_string(), "url(#g)".to_string()),
                ("stroke".to_string(), "red".to_string()),
            ]
        );
    }

    #[test]
    fn test_set_stylesheet_keeps_cdata() {
        let mut style = Element::new("style");
        style.children.push(Node::Text("\n".into()));
        style.children.push(Node::CData("a{}".into()));
        set_stylesheet(&mut style, "b{}".into());
        assert_eq!(style.children, vec![Node::CData("b{}".into())]);
    }
}
