//! Removal passes: unreferenced definitions, empty containers, editor
//! namespaces, descriptive elements and comments.

use crate::ast::{Document, Element, Node, NodePath, remove_paths};
use crate::names::{SVG_NS, is_editor_namespace};
use crate::refs::RefGraph;
use crate::stats::Statistics;

/// Children of `<defs>` that survive even when nothing references them.
const ALWAYS_KEEP: &[&str] = &["font", "style", "metadata", "script", "title", "desc"];

/// Unreferenced paint servers removed wherever they are.
const REMOVABLE_OUTSIDE_DEFS: &[&str] = &["linearGradient", "radialGradient", "pattern"];

/// Containers removed when they hold nothing but whitespace.
const EMPTY_CONTAINERS: &[&str] = &["defs", "title", "desc", "metadata", "g"];

/// Remove elements nothing refers to: most children of `<defs>` (unless
/// `keep_defs`) and gradients or patterns anywhere else.
pub fn remove_unreferenced_elements(root: &mut Element, keep_defs: bool, stats: &mut Statistics) -> usize {
    let graph = RefGraph::build(root);
    let mut doomed = Vec::new();

    if !keep_defs {
        for defs_path in root.paths_named("defs") {
            if let Some(defs) = root.element_at(&defs_path) {
                unused_defs(defs, &defs_path, &graph, &mut doomed);
            }
        }
    }

    for (id, path) in &graph.defines {
        if graph.is_referenced(id) {
            continue;
        }
        let Some((_, parent_path)) = path.split_last() else {
            continue;
        };
        let (Some(elem), Some(parent)) = (root.element_at(path), root.element_at(parent_path)) else {
            continue;
        };
        if REMOVABLE_OUTSIDE_DEFS.contains(&elem.name.local.as_str()) && !parent.is("defs") {
            doomed.push(path.clone());
        }
    }

    let removed = remove_paths(root, doomed);
    stats.elements_removed += removed;
    removed
}

fn unused_defs(defs: &Element, defs_path: &[usize], graph: &RefGraph, doomed: &mut Vec<NodePath>) {
    for (i, child) in defs.children.iter().enumerate() {
        let Node::Element(elem) = child else {
            continue;
        };
        if elem.id().is_some_and(|id| graph.is_referenced(id)) {
            continue;
        }
        let mut path = defs_path.to_vec();
        path.push(i);
        if elem.is_svg("g") {
            unused_defs(elem, &path, graph, doomed);
        } else if !ALWAYS_KEEP.contains(&elem.name.local.as_str()) {
            doomed.push(path);
        }
    }
}

fn is_empty_container(elem: &Element) -> bool {
    elem.ns.as_deref() == Some(SVG_NS)
        && elem.name.prefix.is_none()
        && EMPTY_CONTAINERS.contains(&elem.name.local.as_str())
        && elem.children.iter().all(Node::is_blank_text)
}

/// Remove `defs`, `title`, `desc`, `metadata` and `g` elements holding only
/// whitespace. Emptiness cascades upward.
pub fn remove_empty_containers(elem: &mut Element, stats: &mut Statistics) -> usize {
    let mut num = 0;
    for child in elem.child_elements_mut() {
        num += remove_empty_containers(child, stats);
    }
    let before = elem.children.len();
    elem.children
        .retain(|c| !c.as_element().is_some_and(is_empty_container));
    let removed = before - elem.children.len();
    stats.elements_removed += removed;
    num + removed
}

/// Remove every `title`, `desc` or `metadata` named in `tags`.
pub fn remove_descriptive_elements(root: &mut Element, tags: &[&str], stats: &mut Statistics) -> usize {
    if tags.is_empty() {
        return 0;
    }
    let mut doomed = Vec::new();
    root.walk(&mut |path, e| {
        if !path.is_empty() && tags.iter().any(|t| e.is(t)) {
            doomed.push(path.to_vec());
        }
    });
    let removed = remove_paths(root, doomed);
    stats.elements_removed += removed;
    removed
}

/// Remove elements and attributes in editor namespaces, then their
/// declarations on the root.
pub fn remove_editor_data(root: &mut Element, stats: &mut Statistics) {
    stats.elements_removed += remove_namespaced_elements(root);
    stats.attributes_removed += remove_namespaced_attributes(root);

    let before = root.attributes.len();
    root.attributes
        .retain(|a| !(a.name.is_xmlns() && is_editor_namespace(&a.value)));
    stats.attributes_removed += before - root.attributes.len();
}

fn remove_namespaced_elements(elem: &mut Element) -> usize {
    let before = elem.children.len();
    elem.children.retain(|c| {
        !c.as_element()
            .is_some_and(|e| e.ns.as_deref().is_some_and(is_editor_namespace))
    });
    let mut num = before - elem.children.len();
    for child in elem.child_elements_mut() {
        num += remove_namespaced_elements(child);
    }
    num
}

fn remove_namespaced_attributes(elem: &mut Element) -> usize {
    let before = elem.attributes.len();
    elem.attributes
        .retain(|a| !a.ns.as_deref().is_some_and(is_editor_namespace));
    let mut num = before - elem.attributes.len();
    for child in elem.child_elements_mut() {
        num += remove_namespaced_attributes(child);
    }
    num
}

/// Declare the SVG namespace as the default one, drop prefixes bound to it
/// (unprefixing their elements) and drop prefixes nothing uses.
pub fn tidy_namespace_declarations(root: &mut Element, stats: &mut Statistics) {
    if root.get_attr("xmlns") != Some(SVG_NS) {
        root.set_attr("xmlns", SVG_NS);
    }

    let declared: Vec<(String, String)> = root
        .attributes
        .iter()
        .filter(|a| a.name.prefix.as_deref() == Some("xmlns"))
        .map(|a| (a.name.local.clone(), a.value.clone()))
        .collect();

    let mut redundant = Vec::new();
    for (prefix, uri) in declared {
        if uri == SVG_NS {
            redundant.push(prefix.clone());
        } else if namespace_in_use(root, &uri) {
            continue;
        }
        root.remove_attr(&format!("xmlns:{prefix}"));
        stats.attributes_removed += 1;
    }

    for prefix in &redundant {
        unprefix(root, prefix);
    }
}

fn namespace_in_use(root: &Element, uri: &str) -> bool {
    let mut used = false;
    root.walk(&mut |_, e| {
        used |= e.name.prefix.is_some() && e.ns.as_deref() == Some(uri)
            || e.attributes
                .iter()
                .any(|a| !a.name.is_xmlns() && a.ns.as_deref() == Some(uri));
    });
    used
}

fn unprefix(elem: &mut Element, prefix: &str) {
    elem.walk_mut(&mut |e| {
        if e.name.prefix.as_deref() == Some(prefix) {
            e.name.prefix = None;
        }
    });
}

/// Remove `xml:space` from the root element.
pub fn strip_xml_space(root: &mut Element, stats: &mut Statistics) {
    if root.remove_attr("xml:space") {
        stats.attributes_removed += 1;
    }
}

/// Remove every comment, including those around the root element.
pub fn remove_comments(doc: &mut Document, stats: &mut Statistics) -> usize {
    fn strip(nodes: &mut Vec<Node>, stats: &mut Statistics) -> usize {
        let mut num = 0;
        nodes.retain(|n| match n {
            Node::Comment(text) => {
                stats.bytes_saved_in_comments += text.len();
                num += 1;
                false
            }
            _ => true,
        });
        for node in nodes.iter_mut() {
            if let Node::Element(e) = node {
                num += strip(&mut e.children, stats);
            }
        }
        num
    }

    let num = strip(&mut doc.prolog, stats) + strip(&mut doc.root.children, stats) + strip(&mut doc.epilog, stats);
    stats.comments_removed += num;
    num
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_svg;

    fn names(elem: &Element) -> Vec<&str> {
        elem.child_elements().map(|c| c.name.local.as_str()).collect()
    }

    #[test]
    fn test_unreferenced_defs_removed() {
        let mut doc = parse_svg(
            r##"<svg xmlns="http://www.w3.org/2000/svg"><defs><linearGradient id="used"/><linearGradient id="unused"/><style>rect{}</style><g><path id="gone"/><title>t</title></g></defs><rect fill="url(#used)"/></svg>"##,
        )
        .unwrap();
        let mut stats = Statistics::default();
        assert_eq!(remove_unreferenced_elements(&mut doc.root, false, &mut stats), 2);
        let defs = doc.root.element_at(&[0]).unwrap();
        assert_eq!(names(defs), vec!["linearGradient", "style", "g"]);
        assert_eq!(names(defs.element_at(&[2]).unwrap()), vec!["title"]);
    }

    #[test]
    fn test_keep_defs_still_drops_loose_gradients() {
        let mut doc = parse_svg(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><defs><path id="p"/></defs><pattern id="pat"/><rect id="r"/></svg>"#,
        )
        .unwrap();
        assert_eq!(remove_unreferenced_elements(&mut doc.root, true, &mut Statistics::default()), 1);
        assert_eq!(names(&doc.root), vec!["defs", "rect"]);
    }

    #[test]
    fn test_empty_containers_cascade() {
        let mut doc = parse_svg(
            "<svg xmlns=\"http://www.w3.org/2000/svg\"><g>\n  <g> </g>\n</g><defs><!-- keep --></defs><title>x</title><rect/></svg>",
        )
        .unwrap();
        let mut stats = Statistics::default();
        assert_eq!(remove_empty_containers(&mut doc.root, &mut stats), 2);
        assert_eq!(names(&doc.root), vec!["defs", "title", "rect"]);
    }

    #[test]
    fn test_editor_data() {
        let mut doc = parse_svg(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd" inkscape:version="1"><sodipodi:namedview/><rect inkscape:label="r"/></svg>"#,
        )
        .unwrap();
        let mut stats = Statistics::default();
        remove_editor_data(&mut doc.root, &mut stats);
        assert_eq!(stats.elements_removed, 1);
        assert_eq!(stats.attributes_removed, 4);
        assert_eq!(doc.root.attributes.len(), 1);
        assert!(doc.root.element_at(&[0]).unwrap().attributes.is_empty());
    }

    #[test]
    fn test_tidy_namespaces() {
        let mut doc = parse_svg(
            r#"<svg:svg xmlns:svg="http://www.w3.org/2000/svg" xmlns:foo="urn:foo" xmlns:bar="urn:bar"><svg:rect bar:x="1"/></svg:svg>"#,
        )
        .unwrap();
        tidy_namespace_declarations(&mut doc.root, &mut Statistics::default());
        assert_eq!(doc.root.name.full_name(), "svg");
        assert_eq!(doc.root.get_attr("xmlns"), Some(SVG_NS));
        assert!(!doc.root.has_attr("xmlns:svg"));
        assert!(!doc.root.has_attr("xmlns:foo"));
        assert!(doc.root.has_attr("xmlns:bar"));
        assert_eq!(doc.root.element_at(&[0]).unwrap().name.full_name(), "rect");
    }

    #[test]
    fn test_remove_comments() {
        let mut doc =
            parse_svg("<!--lead--><svg xmlns=\"http://www.w3.org/2000/svg\"><!--a--><g><!--bc--></g></svg>").unwrap();
        let mut stats = Statistics::default();
        assert_eq!(remove_comments(&mut doc, &mut stats), 3);
        assert_eq!(stats.bytes_saved_in_comments, 7);
        assert!(doc.prolog.is_empty());
    }

    #[test]
    fn test_remove_descriptive() {
        let mut doc = parse_svg(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><title>t</title><g><desc>d</desc></g><metadata/></svg>"#,
        )
        .unwrap();
        let mut stats = Statistics::default();
        assert_eq!(remove_descriptive_elements(&mut doc.root, &["title", "desc"], &mut stats), 2);
        assert_eq!(names(&doc.root), vec!["g", "metadata"]);
    }
}
