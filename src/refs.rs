//! Who defines which ID, and who points at it.
//!
//! References come from `href`/`xlink:href="#id"`, from `url(#id)` in the
//! paint-server, clip, mask, filter and marker properties (as attributes or
//! in a `style` attribute), and from `url(#id)` anywhere in a `<style>`
//! sheet, in which case the `<style>` element itself is the referrer.
//!
//! Elements are identified by [`NodePath`]. Paths go stale when the tree
//! changes shape, so passes rebuild the graph after removing elements.

use std::collections::{BTreeSet, HashMap};

use crate::ast::{Element, NodePath};
use crate::css;
use crate::names::REFERENCING_PROPS;
use crate::style::Style;

/// The ID inside `url(#id)`, `url('#id')` or `url("#id")` at the start of
/// `value`.
pub fn url_id(value: &str) -> Option<&str> {
    let rest = value.trim().strip_prefix("url(")?;
    let (rest, close) = if let Some(r) = rest.strip_prefix("'#") {
        (r, "')")
    } else if let Some(r) = rest.strip_prefix("\"#") {
        (r, "\")")
    } else {
        (rest.strip_prefix('#')?, ")")
    };
    let id = &rest[..rest.find(close)?];
    (!id.is_empty()).then_some(id)
}

/// Rewrite every `url(#from)` in any quoting style to `url(#to)`.
pub fn rewrite_url_ids(value: &str, from: &str, to: &str) -> String {
    let target = format!("url(#{to})");
    value
        .replace(&format!("url(#{from})"), &target)
        .replace(&format!("url('#{from}')"), &target)
        .replace(&format!("url(\"#{from}\")"), &target)
}

/// IDs `elem` itself refers to, with repeats.
pub fn referenced_ids(elem: &Element) -> Vec<String> {
    let mut out = Vec::new();
    if css::is_style_element(elem) {
        for (name, value) in css::declarations(&elem.text_content()) {
            if REFERENCING_PROPS.contains(&name.as_str())
                && let Some(id) = url_id(&value)
            {
                out.push(id.to_string());
            }
        }
        return out;
    }

    if let Some(id) = elem.href().and_then(|h| h.strip_prefix('#')).filter(|id| !id.is_empty()) {
        out.push(id.to_string());
    }
    let style = Style::from_element(elem);
    for (name, value) in style.iter() {
        if REFERENCING_PROPS.contains(&name)
            && let Some(id) = url_id(value)
        {
            out.push(id.to_string());
        }
    }
    for &prop in REFERENCING_PROPS {
        if let Some(id) = elem.get_attr(prop).and_then(url_id) {
            out.push(id.to_string());
        }
    }
    out
}

#[derive(Debug, Default, Clone)]
pub struct RefGraph {
    /// ID to the element carrying it. The first occurrence wins.
    pub defines: HashMap<String, NodePath>,
    /// ID to the elements referring to it.
    pub refs: HashMap<String, BTreeSet<NodePath>>,
}

impl RefGraph {
    pub fn build(root: &Element) -> Self {
        let mut graph = RefGraph::default();
        root.walk(&mut |path, elem| {
            if let Some(id) = elem.id() {
                graph.defines.entry(id.to_string()).or_insert_with(|| path.to_vec());
            }
            for id in referenced_ids(elem) {
                graph.refs.entry(id).or_default().insert(path.to_vec());
            }
        });
        graph
    }

    pub fn is_referenced(&self, id: &str) -> bool {
        self.refs.get(id).is_some_and(|r| !r.is_empty())
    }

    /// Number of distinct elements referring to `id`.
    pub fn ref_count(&self, id: &str) -> usize {
        self.refs.get(id).map_or(0, BTreeSet::len)
    }

    pub fn referrers(&self, id: &str) -> impl Iterator<Item = &NodePath> {
        self.refs.get(id).into_iter().flatten()
    }

    /// Record that everything referring to `from` now refers to `to`.
    pub fn retarget(&mut self, from: &str, to: &str) {
        if let Some(moved) = self.refs.remove(from) {
            self.refs.entry(to.to_string()).or_default().extend(moved);
        }
    }
}

/// Point every reference to `from` inside `elem` at `to`. Returns the number
/// of bytes the element's text shrank by (negative if it grew).
pub fn rename_references(elem: &mut Element, from: &str, to: &str) -> isize {
    let mut saved = 0isize;
    let mut delta = |old: &str, new: &str| saved += old.len() as isize - new.len() as isize;

    if css::is_style_element(elem) {
        let old = elem.text_content();
        let new = rewrite_url_ids(&old, from, to);
        if new != old {
            delta(&old, &new);
            css::set_stylesheet(elem, new);
        }
    }

    if let Some(attr) = elem.href_attr_name()
        && elem.href() == Some(format!("#{from}").as_str())
    {
        let new = format!("#{to}");
        delta(from, to);
        elem.set_attr(&attr, new);
    }

    if let Some(old) = elem.get_attr("style").map(str::to_owned) {
        let new = rewrite_url_ids(&old, from, to);
        if new != old {
            delta(&old, &new);
            elem.set_attr("style", new);
        }
    }

    for &prop in REFERENCING_PROPS {
        if let Some(old) = elem.get_attr(prop).map(str::to_owned) {
            let new = rewrite_url_ids(&old, from, to);
            if new != old {
                delta(&old, &new);
                elem.set_attr(prop, new);
            }
        }
    }
    saved
}
