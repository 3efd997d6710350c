//! Group restructuring: collapsing bare `<g>` wrappers, merging identical
//! sibling groups, wrapping runs of alike elements in new groups, and moving
//! inheritable attributes between parents and children.

use crate::ast::{Element, Node};
use crate::names::{ANIMATION_ELEMENTS, GROUPABLE_ELEMENTS, INHERITABLE_ATTRS};
use crate::refs::RefGraph;
use crate::stats::Statistics;

fn has_descriptive_child(elem: &Element) -> bool {
    elem.child_elements()
        .any(|c| c.is_svg("title") || c.is_svg("desc"))
}

fn has_text(elem: &Element) -> bool {
    elem.children
        .iter()
        .any(|c| matches!(c, Node::Text(t) | Node::CData(t) if !t.trim().is_empty()))
}

fn is_animation(elem: &Element) -> bool {
    ANIMATION_ELEMENTS.contains(&elem.name.local.as_str())
}

/// Replace attribute-less `<g>` children by their own children. Children of
/// `<switch>` stay, since each is a separate candidate there.
pub fn remove_nested_groups(elem: &mut Element, stats: &mut Statistics) -> usize {
    let mut num = 0;
    if !elem.is("switch") {
        let old = std::mem::take(&mut elem.children);
        for child in old {
            match child {
                Node::Element(g) if g.is_svg("g") && g.attributes.is_empty() && !has_descriptive_child(&g) => {
                    elem.children.extend(g.children);
                    num += 1;
                }
                other => elem.children.push(other),
            }
        }
    }
    stats.elements_removed += num;
    for child in elem.child_elements_mut() {
        num += remove_nested_groups(child, stats);
    }
    num
}

/// Move inheritable attributes every child agrees on up to the parent. The
/// root `<svg>` itself never receives them.
pub fn move_common_attributes_to_parent_group(root: &mut Element, stats: &mut Statistics) -> usize {
    let graph = RefGraph::build(root);
    let num: usize = root
        .child_elements_mut()
        .map(|child| move_common_attributes(child, &graph))
        .sum();
    stats.attributes_removed += num;
    num
}

fn move_common_attributes(elem: &mut Element, graph: &RefGraph) -> usize {
    let mut num = 0;
    for child in elem.child_elements_mut() {
        num += move_common_attributes(child, graph);
    }
    if has_text(elem) {
        return num;
    }
    // a referenced child is rendered elsewhere too, where the parent's
    // attributes would not follow it
    if elem.child_elements().any(|c| c.id().is_some_and(|id| graph.is_referenced(id))) {
        return num;
    }

    let mut rendered = elem.child_elements().filter(|c| !is_animation(c));
    let Some(first) = rendered.next() else {
        return num;
    };
    let mut common: Vec<(String, String)> = first
        .attributes
        .iter()
        .filter(|a| a.name.prefix.is_none() && INHERITABLE_ATTRS.contains(&a.name.local.as_str()))
        .map(|a| (a.name.local.clone(), a.value.clone()))
        .collect();
    let mut count = 1;
    for child in rendered {
        common.retain(|(name, value)| child.get_attr(name) == Some(value.as_str()));
        count += 1;
    }
    if count < 2 || common.is_empty() {
        return num;
    }

    for child in elem.child_elements_mut().filter(|c| !is_animation(c)) {
        for (name, _) in &common {
            child.remove_attr(name);
        }
    }
    for (name, value) in &common {
        elem.set_attr(name, value.as_str());
    }
    num + (count - 1) * common.len()
}

fn attribute_set(elem: &Element) -> Vec<(String, &str)> {
    let mut set: Vec<(String, &str)> = elem
        .attributes
        .iter()
        .map(|a| (a.name.full_name(), a.value.as_str()))
        .collect();
    set.sort();
    set
}

/// Merge runs of sibling `<g>` elements carrying identical attributes into
/// the first of the run.
pub fn merge_sibling_groups_with_common_attributes(elem: &mut Element, stats: &mut Statistics) -> usize {
    let mut num = 0;
    let old = std::mem::take(&mut elem.children);
    // index of the run's first group in `elem.children`
    let mut primary: Option<usize> = None;
    // non-element nodes seen since the last element
    let mut pending: Vec<Node> = Vec::new();

    for node in old {
        let Node::Element(child) = node else {
            pending.push(node);
            continue;
        };
        let joins_run = child.is_svg("g")
            && !has_descriptive_child(&child)
            && primary
                .and_then(|i| elem.children[i].as_element())
                .is_some_and(|p| attribute_set(p) == attribute_set(&child));
        if joins_run && let Some(Node::Element(p)) = primary.and_then(|i| elem.children.get_mut(i)) {
            p.children.append(&mut pending);
            p.children.extend(child.children);
            num += 1;
            continue;
        }
        elem.children.append(&mut pending);
        primary = (child.is_svg("g") && !child.attributes.is_empty()).then_some(elem.children.len());
        elem.children.push(Node::Element(child));
    }
    elem.children.append(&mut pending);
    stats.elements_removed += num;

    for child in elem.child_elements_mut() {
        num += merge_sibling_groups_with_common_attributes(child, stats);
    }
    num
}

/// Wrap runs of three or more sibling elements sharing an inheritable
/// attribute value in a new `<g>`. The attribute itself is moved later by
/// [`move_common_attributes_to_parent_group`]. New groups are not counted.
pub fn create_groups_for_common_attributes(elem: &mut Element, stats: &mut Statistics) -> usize {
    let mut num = 0;
    for &attr in INHERITABLE_ATTRS {
        num += group_runs(elem, attr);
    }
    for child in elem.child_elements_mut() {
        num += create_groups_for_common_attributes(child, stats);
    }
    num
}

fn run_value<'a>(node: &'a Node, attr: &str) -> Option<&'a str> {
    let e = node.as_element()?;
    if !GROUPABLE_ELEMENTS.contains(&e.name.local.as_str()) || e.name.prefix.is_some() {
        return None;
    }
    e.get_attr(attr).filter(|v| !v.is_empty())
}

fn group_runs(elem: &mut Element, attr: &str) -> usize {
    let mut num = 0;
    let mut cur = elem.children.len();
    while cur > 0 {
        let i = cur - 1;
        let Some(value) = run_value(&elem.children[i], attr).map(str::to_owned) else {
            cur -= 1;
            continue;
        };

        let (mut start, mut end) = (i, i);
        let mut elements = 1;
        while start > 0 {
            let prev = &elem.children[start - 1];
            if prev.as_element().is_some() {
                if run_value(prev, attr) != Some(value.as_str()) {
                    break;
                }
                elements += 1;
            }
            start -= 1;
        }
        if elements < 3 {
            cur -= 1;
            continue;
        }
        while end + 1 < elem.children.len() && elem.children[end + 1].as_element().is_none() {
            end += 1;
        }

        if end - start + 1 == elem.children.len() && elem.is_svg("g") {
            // the group itself can carry it
            break;
        }

        let mut group = Element::new("g");
        group.children = elem.children.drain(start..=end).collect();
        elem.children.insert(start, Node::Element(group));
        num += 1;
        cur = start;
    }
    num
}

/// Drop inheritable attributes from a parent when every child sets its own
/// value for them.
pub fn remove_unused_attributes_on_parent(elem: &mut Element, stats: &mut Statistics) -> usize {
    let mut num = 0;
    for child in elem.child_elements_mut() {
        num += remove_unused_attributes_on_parent(child, stats);
    }
    if elem.child_elements().nth(1).is_none() || has_text(elem) {
        return num;
    }

    let unused: Vec<String> = elem
        .attributes
        .iter()
        .filter(|a| a.name.prefix.is_none() && INHERITABLE_ATTRS.contains(&a.name.local.as_str()))
        .map(|a| a.name.local.clone())
        .filter(|name| {
            elem.child_elements()
                .all(|c| c.get_attr(name).is_some_and(|v| !v.is_empty() && v != "inherit"))
        })
        .collect();
    for name in &unused {
        elem.remove_attr(name);
    }
    stats.attributes_removed += unused.len();
    num + unused.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_svg;

    fn root(svg: &str) -> Element {
        parse_svg(svg).unwrap().root
    }

    fn names(elem: &Element) -> Vec<&str> {
        elem.child_elements().map(|c| c.name.local.as_str()).collect()
    }

    #[test]
    fn test_nested_groups_collapse_to_fixpoint() {
        let mut root = root(r#"<svg xmlns="http://www.w3.org/2000/svg"><g><g><rect/></g></g></svg>"#);
        let mut stats = Statistics::default();
        let mut total = 0;
        loop {
            let n = remove_nested_groups(&mut root, &mut stats);
            if n == 0 {
                break;
            }
            total += n;
        }
        assert_eq!(total, 2);
        assert_eq!(names(&root), vec!["rect"]);
        assert_eq!(stats.elements_removed, 2);
    }

    #[test]
    fn test_nested_groups_kept() {
        let mut root = root(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g><title>t</title><rect/></g><g id="x"/><switch><g><rect/></g></switch></svg>"#,
        );
        assert_eq!(remove_nested_groups(&mut root, &mut Statistics::default()), 0);
        assert_eq!(names(&root), vec!["g", "g", "switch"]);
    }

    #[test]
    fn test_common_attributes_move_up() {
        let mut root = root(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g><rect fill="red" stroke="blue"/><circle fill="red" stroke="green"/><set fill="freeze"/></g></svg>"#,
        );
        let mut stats = Statistics::default();
        assert_eq!(move_common_attributes_to_parent_group(&mut root, &mut stats), 1);
        let g = root.element_at(&[0]).unwrap();
        assert_eq!(g.get_attr("fill"), Some("red"));
        let kids: Vec<&Element> = g.child_elements().collect();
        assert!(!kids[0].has_attr("fill"));
        assert_eq!(kids[0].get_attr("stroke"), Some("blue"));
        assert_eq!(kids[2].get_attr("fill"), Some("freeze"));
    }

    #[test]
    fn test_common_attributes_blocked() {
        let mut root = root(
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><g><rect id="r" fill="red"/><rect fill="red"/></g><text><tspan fill="red"/>hi<tspan fill="red"/></text><use xlink:href="#r"/></svg>"##,
        );
        assert_eq!(move_common_attributes_to_parent_group(&mut root, &mut Statistics::default()), 0);
        assert!(!root.element_at(&[0]).unwrap().has_attr("fill"));
    }

    #[test]
    fn test_merge_sibling_groups() {
        let mut root = root(
            "<svg xmlns=\"http://www.w3.org/2000/svg\"><g fill=\"red\"><rect/></g>\n<g fill=\"red\"><circle/></g><g fill=\"blue\"/></svg>",
        );
        let mut stats = Statistics::default();
        assert_eq!(merge_sibling_groups_with_common_attributes(&mut root, &mut stats), 1);
        assert_eq!(names(&root), vec!["g", "g"]);
        let first = root.child_elements().next().unwrap();
        assert_eq!(names(first), vec!["rect", "circle"]);
        assert_eq!(first.children.len(), 3);
    }

    #[test]
    fn test_merge_skips_group_with_title() {
        let mut root = root(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g fill="red"><rect/></g><g fill="red"><title>t</title></g></svg>"#,
        );
        assert_eq!(merge_sibling_groups_with_common_attributes(&mut root, &mut Statistics::default()), 0);
    }

    #[test]
    fn test_create_groups() {
        let mut root = root(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><circle/><rect fill="red"/><rect fill="red"/><path fill="red"/></svg>"#,
        );
        let mut stats = Statistics::default();
        assert_eq!(create_groups_for_common_attributes(&mut root, &mut stats), 1);
        assert_eq!(stats.elements_removed, 0);
        assert_eq!(names(&root), vec!["circle", "g"]);
        let g = root.element_at(&[1]).unwrap();
        assert_eq!(names(g), vec!["rect", "rect", "path"]);
        assert!(g.attributes.is_empty());
    }

    #[test]
    fn test_no_group_when_parent_group_covers_run() {
        let mut root = root(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g><rect fill="red"/><rect fill="red"/><rect fill="red"/></g></svg>"#,
        );
        assert_eq!(create_groups_for_common_attributes(&mut root, &mut Statistics::default()), 0);
    }

    #[test]
    fn test_unused_attributes_on_parent() {
        let mut root = root(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g fill="red" stroke="blue"><rect fill="green"/><rect fill="blue"/><rect fill="inherit" stroke="red"/></g></svg>"#,
        );
        let mut stats = Statistics::default();
        assert_eq!(remove_unused_attributes_on_parent(&mut root, &mut stats), 0);

        let mut root = root_with_override();
        assert_eq!(remove_unused_attributes_on_parent(&mut root, &mut stats), 1);
        let g = root.element_at(&[0]).unwrap();
        assert!(!g.has_attr("fill"));
        assert_eq!(g.get_attr("stroke"), Some("blue"));
    }

    fn root_with_override() -> Element {
        root(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g fill="red" stroke="blue"><rect fill="green"/><rect fill="blue"/></g></svg>"#,
        )
    }
}
