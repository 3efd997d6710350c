//! Gradient cleanup: repeated stops, gradients that only exist to be
//! inherited by one other gradient, and structurally identical gradients.

use std::collections::{HashMap, HashSet};

use crate::ast::{Element, Node, NodePath, remove_paths};
use crate::decimal::Decimal;
use crate::length::{Length, Unit};
use crate::refs::{RefGraph, rename_references};
use crate::stats::Statistics;

fn is_gradient(elem: &Element) -> bool {
    elem.is_svg("linearGradient") || elem.is_svg("radialGradient")
}

fn gradient_paths(root: &Element) -> Vec<NodePath> {
    let mut out = Vec::new();
    root.walk(&mut |path, e| {
        if is_gradient(e) {
            out.push(path.to_vec());
        }
    });
    out
}

fn stops(elem: &Element) -> impl Iterator<Item = &Element> {
    elem.child_elements().filter(|c| c.is("stop"))
}

/// Offset as a fraction, for comparing `50%` with `.5`.
fn stop_offset(value: &str) -> Option<Decimal> {
    let len = Length::parse(value);
    match len.unit {
        Unit::None => Some(len.value),
        Unit::Percent => Some(Decimal::new(len.value.coefficient(), len.value.exponent() - 2)),
        _ => None,
    }
}

/// Drop a stop when an earlier stop at the same offset has the same color,
/// opacity and style. Offsets are rewritten as plain fractions.
pub fn remove_duplicate_gradient_stops(root: &mut Element, stats: &mut Statistics) -> usize {
    let mut doomed = Vec::new();
    for grad_path in gradient_paths(root) {
        let Some(grad) = root.element_at_mut(&grad_path) else {
            continue;
        };
        let mut seen: HashMap<Decimal, (String, String, String)> = HashMap::new();
        for (i, child) in grad.children.iter_mut().enumerate() {
            let Node::Element(stop) = child else {
                continue;
            };
            if !stop.is("stop") {
                continue;
            }
            let offset = stop_offset(stop.attr_or_empty("offset")).unwrap_or(Decimal::ZERO);
            if stop.has_attr("offset") {
                stop.set_attr("offset", offset.normalize().to_plain_string());
            }
            let props = (
                stop.attr_or_empty("stop-color").to_string(),
                stop.attr_or_empty("stop-opacity").to_string(),
                stop.attr_or_empty("style").to_string(),
            );
            if seen.get(&offset) == Some(&props) {
                let mut path = grad_path.clone();
                path.push(i);
                doomed.push(path);
            }
            seen.insert(offset, props);
        }
    }
    let removed = remove_paths(root, doomed);
    stats.elements_removed += removed;
    removed
}

const INHERITED_GRADIENT_ATTRS: &[&str] = &["gradientUnits", "spreadMethod", "gradientTransform"];

fn is_unset(elem: &Element, name: &str) -> bool {
    elem.get_attr(name).is_none_or(str::is_empty)
}

/// Merge a gradient referenced only by one other gradient into that
/// gradient, then remove it.
pub fn collapse_singly_referenced_gradients(root: &mut Element, stats: &mut Statistics) -> usize {
    let graph = RefGraph::build(root);

    // (donor path, referrer path) pairs
    let mut candidates: Vec<(String, NodePath, NodePath)> = Vec::new();
    for (id, referrers) in &graph.refs {
        if referrers.len() != 1 {
            continue;
        }
        let Some(donor_path) = graph.defines.get(id) else {
            continue;
        };
        let Some(referrer_path) = referrers.iter().next() else {
            continue;
        };
        if referrer_path.starts_with(donor_path) || donor_path.starts_with(referrer_path) {
            continue;
        }
        let (Some(donor), Some(referrer)) = (root.element_at(donor_path), root.element_at(referrer_path)) else {
            continue;
        };
        if is_gradient(donor) && is_gradient(referrer) {
            candidates.push((id.clone(), donor_path.clone(), referrer_path.clone()));
        }
    }
    candidates.sort_by(|a, b| a.1.cmp(&b.1));

    // a referrer that is itself being merged away waits for the next round,
    // or the href it inherits would point at a removed element
    let donors: HashSet<&NodePath> = candidates.iter().map(|(_, d, _)| d).collect();
    let mut doomed = Vec::new();
    for (id, donor_path, referrer_path) in &candidates {
        if donors.contains(referrer_path) {
            continue;
        }
        let Some(donor) = root.element_at(donor_path).cloned() else {
            continue;
        };
        let Some(referrer) = root.element_at_mut(referrer_path) else {
            continue;
        };
        log::debug!("merging gradient #{id} into its only referrer");
        merge_gradient(&donor, referrer);
        doomed.push(donor_path.clone());
    }

    let removed = remove_paths(root, doomed);
    stats.elements_removed += removed;
    removed
}

fn merge_gradient(donor: &Element, referrer: &mut Element) {
    if stops(referrer).next().is_none() {
        for stop in stops(donor) {
            referrer.children.push(Node::Element(stop.clone()));
        }
    }

    let geometry: &[&str] = match (donor.name.local.as_str(), referrer.name.local.as_str()) {
        ("radialGradient", "radialGradient") => &["fx", "fy", "cx", "cy", "r"],
        ("linearGradient", "linearGradient") => &["x1", "y1", "x2", "y2"],
        _ => &[],
    };
    for &name in INHERITED_GRADIENT_ATTRS.iter().chain(geometry) {
        if is_unset(referrer, name)
            && let Some(value) = donor.get_attr(name).filter(|v| !v.is_empty())
        {
            referrer.set_attr(name, value);
        }
    }

    let referrer_href = referrer.href_attr_name();
    match (donor.href(), referrer_href) {
        (Some(target), Some(attr)) => referrer.set_attr(&attr, target),
        (Some(target), None) => referrer.set_attr("xlink:href", target),
        (None, Some(attr)) => {
            referrer.remove_attr(&attr);
        }
        (None, None) => {}
    }
}

const BUCKET_ATTRS: &[&str] = &[
    "gradientUnits",
    "spreadMethod",
    "gradientTransform",
    "x1",
    "y1",
    "x2",
    "y2",
    "cx",
    "cy",
    "fx",
    "fy",
    "r",
];
const STOP_BUCKET_ATTRS: &[&str] = &["offset", "stop-color", "stop-opacity", "style"];

/// Everything that decides how a gradient renders.
fn bucket_key(grad: &Element) -> Vec<String> {
    let mut key = vec![grad.name.local.clone()];
    key.extend(BUCKET_ATTRS.iter().map(|a| grad.attr_or_empty(a).to_string()));
    key.push(grad.href().unwrap_or("").to_string());
    for stop in stops(grad) {
        key.extend(STOP_BUCKET_ATTRS.iter().map(|a| stop.attr_or_empty(a).to_string()));
    }
    key
}

/// Replace structurally identical gradients with one of them, pointing all
/// references at the survivor.
pub fn remove_duplicate_gradients(root: &mut Element, stats: &mut Statistics) -> usize {
    let mut total = 0;
    loop {
        let removed = dedup_round(root);
        if removed == 0 {
            break;
        }
        total += removed;
    }
    stats.elements_removed += total;
    total
}

fn dedup_round(root: &mut Element) -> usize {
    let mut graph = RefGraph::build(root);

    let mut buckets: Vec<(Vec<String>, Vec<NodePath>)> = Vec::new();
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    for path in gradient_paths(root) {
        let Some(grad) = root.element_at(&path) else {
            continue;
        };
        let key = bucket_key(grad);
        match index.get(&key) {
            Some(&i) => buckets[i].1.push(path),
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push((key, vec![path]));
            }
        }
    }

    let mut doomed = Vec::new();
    for (_, mut bucket) in buckets {
        if bucket.len() < 2 {
            continue;
        }
        let id_of = |root: &Element, path: &NodePath| root.element_at(path).and_then(Element::id).map(str::to_owned);
        // the survivor must carry an ID if any of them does
        if id_of(root, &bucket[0]).is_none()
            && let Some(i) = bucket.iter().position(|p| id_of(root, p).is_some())
        {
            bucket.swap(0, i);
        }
        let master_id = id_of(root, &bucket[0]);

        for dup_path in &bucket[1..] {
            if let (Some(master), Some(dup_id)) = (&master_id, id_of(root, dup_path)) {
                let referrers: Vec<NodePath> = graph.referrers(&dup_id).cloned().collect();
                for referrer in referrers {
                    if let Some(elem) = root.element_at_mut(&referrer) {
                        rename_references(elem, &dup_id, master);
                    }
                }
                graph.retarget(&dup_id, master);
            }
            doomed.push(dup_path.clone());
        }
    }
    remove_paths(root, doomed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_svg;

    fn root(svg: &str) -> Element {
        parse_svg(svg).unwrap().root
    }

    #[test]
    fn test_duplicate_stops() {
        let mut root = root(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><linearGradient><stop offset="50%" stop-color="red"/><stop offset="0.5" stop-color="red"/><stop offset=".5" stop-color="blue"/></linearGradient></svg>"#,
        );
        let mut stats = Statistics::default();
        assert_eq!(remove_duplicate_gradient_stops(&mut root, &mut stats), 1);
        let grad = root.element_at(&[0]).unwrap();
        let offsets: Vec<&str> = stops(grad).map(|s| s.attr_or_empty("offset")).collect();
        assert_eq!(offsets, vec!["0.5", "0.5"]);
        assert_eq!(stops(grad).nth(1).unwrap().get_attr("stop-color"), Some("blue"));
    }

    #[test]
    fn test_collapse_single_reference() {
        let mut root = root(
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><defs><linearGradient id="base" x2="0" gradientUnits="userSpaceOnUse"><stop offset="0"/></linearGradient><linearGradient id="used" xlink:href="#base" x2="1"/></defs><rect fill="url(#used)"/></svg>"##,
        );
        let mut stats = Statistics::default();
        assert_eq!(collapse_singly_referenced_gradients(&mut root, &mut stats), 1);
        let defs = root.element_at(&[0]).unwrap();
        assert_eq!(defs.child_elements().count(), 1);
        let used = defs.child_elements().next().unwrap();
        assert_eq!(used.id(), Some("used"));
        assert_eq!(used.get_attr("x2"), Some("1"));
        assert_eq!(used.get_attr("gradientUnits"), Some("userSpaceOnUse"));
        assert!(used.href().is_none());
        assert_eq!(stops(used).count(), 1);
    }

    #[test]
    fn test_collapse_chain_waits_a_round() {
        let mut root = root(
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><linearGradient id="a"><stop offset="1"/></linearGradient><linearGradient id="b" xlink:href="#a"/><linearGradient id="c" xlink:href="#b"/><rect fill="url(#c)"/><rect fill="url(#c)"/></svg>"##,
        );
        let mut stats = Statistics::default();
        while collapse_singly_referenced_gradients(&mut root, &mut stats) > 0 {}
        let grads: Vec<&Element> = root.child_elements().filter(|e| is_gradient(e)).collect();
        assert_eq!(grads.len(), 1);
        assert_eq!(grads[0].id(), Some("c"));
        assert_eq!(stops(grads[0]).count(), 1);
        assert_eq!(stats.elements_removed, 2);
    }

    #[test]
    fn test_duplicate_gradients_share_references() {
        let mut root = root(
            r##"<svg xmlns="http://www.w3.org/2000/svg"><linearGradient id="a"><stop offset="0" stop-color="red"/></linearGradient><linearGradient id="b"><stop offset="0" stop-color="red"/></linearGradient><rect fill="url(#b)"/><rect style="fill:url('#a')"/></svg>"##,
        );
        let mut stats = Statistics::default();
        assert_eq!(remove_duplicate_gradients(&mut root, &mut stats), 1);
        let grads: Vec<&Element> = root.child_elements().filter(|e| is_gradient(e)).collect();
        assert_eq!(grads.len(), 1);
        assert_eq!(grads[0].id(), Some("a"));
        let rect = root.child_elements().find(|e| e.is("rect")).unwrap();
        assert_eq!(rect.get_attr("fill"), Some("url(#a)"));
    }

    #[test]
    fn test_master_prefers_identified_gradient() {
        let mut root = root(
            r##"<svg xmlns="http://www.w3.org/2000/svg"><radialGradient r="1"/><radialGradient id="g" r="1"/><circle fill="url(#g)"/></svg>"##,
        );
        remove_duplicate_gradients(&mut root, &mut Statistics::default());
        let grads: Vec<&Element> = root.child_elements().filter(|e| is_gradient(e)).collect();
        assert_eq!(grads.len(), 1);
        assert_eq!(grads[0].id(), Some("g"));
    }

    #[test]
    fn test_linear_and_radial_never_duplicates() {
        let mut root = root(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><radialGradient id="r"/><linearGradient id="l"/></svg>"#,
        );
        assert_eq!(remove_duplicate_gradients(&mut root, &mut Statistics::default()), 0);
    }
}
