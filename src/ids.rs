//! ID shortening and unreferenced-ID stripping.

use std::collections::HashSet;

use crate::ast::Element;
use crate::refs::{RefGraph, rename_references};
use crate::stats::Statistics;

/// IDs the user asked to keep as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdProtection<'a> {
    /// Protect IDs not ending in a digit (those an editor did not generate).
    pub noninkscape: bool,
    pub list: &'a [String],
    pub prefixes: &'a [String],
}

impl IdProtection<'_> {
    pub fn is_protected(&self, id: &str) -> bool {
        (self.noninkscape && !id.ends_with(|c: char| c.is_ascii_digit()))
            || self.list.iter().any(|p| p == id)
            || self.prefixes.iter().any(|p| id.starts_with(p.as_str()))
    }
}

/// The `n`th ID, spreadsheet style: 1 is `a`, 26 is `z`, 27 is `aa`.
pub fn int_to_id(mut n: usize, prefix: &str) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    let mut id = prefix.to_string();
    id.extend(letters.into_iter().map(char::from));
    id
}

/// `(length, count)` pairs: how many IDs of each length are needed to hand
/// out `highest` IDs.
pub fn compute_id_lengths(mut highest: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut len = 0;
    let mut limit = 1usize;
    while highest > 0 {
        len += 1;
        limit = limit.saturating_mul(26);
        out.push((len, limit));
        highest = (highest - 1) / 26;
    }
    out
}

/// Give the most-referenced IDs the shortest names and update every
/// reference. IDs already as short as their rank allows keep their name.
/// Returns the number of IDs renamed.
pub fn shorten_ids(root: &mut Element, prefix: &str, protection: &IdProtection, stats: &mut Statistics) -> usize {
    let graph = RefGraph::build(root);

    let mut defined_in_order = Vec::new();
    root.walk(&mut |_, e| {
        if let Some(id) = e.id() {
            defined_in_order.push(id.to_string());
        }
    });
    let protected: HashSet<&str> = defined_in_order
        .iter()
        .map(String::as_str)
        .filter(|id| protection.is_protected(id))
        .collect();

    let mut ranked: Vec<(usize, &str)> = graph
        .defines
        .keys()
        .filter(|id| !protected.contains(id.as_str()))
        .map(|id| (graph.ref_count(id), id.as_str()))
        .filter(|(count, _)| *count > 0)
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(b.1)));
    let mut ids: Vec<&str> = ranked.into_iter().map(|(_, id)| id).collect();
    let mut listed: HashSet<&str> = ids.iter().copied().collect();
    for id in &defined_in_order {
        if !protected.contains(id.as_str()) && listed.insert(id.as_str()) {
            ids.push(id.as_str());
        }
    }

    // ids of optimal length keep their names; the others queue for a new one
    let mut slots = compute_id_lengths(ids.len() + 1).into_iter();
    let (mut optimal, mut remaining) = (0, 0);
    let mut consumed: HashSet<&str> = HashSet::new();
    let mut need_new = Vec::new();
    for &id in &ids {
        if remaining == 0
            && let Some((len, limit)) = slots.next()
        {
            (optimal, remaining) = (len, limit);
        }
        remaining = remaining.saturating_sub(1);
        if id.len() == optimal + prefix.len() && id.starts_with(prefix) {
            consumed.insert(id);
        } else {
            need_new.push(id);
        }
    }
    let pending: HashSet<&str> = need_new.iter().copied().collect();

    let mut renames = Vec::new();
    let mut next = 1;
    for &old in &need_new {
        let mut new = int_to_id(next, prefix);
        while protected.contains(new.as_str())
            || consumed.contains(new.as_str())
            || (new != old && pending.contains(new.as_str()))
        {
            next += 1;
            new = int_to_id(next, prefix);
        }
        next += 1;
        if new != old {
            renames.push((old.to_string(), new));
        }
    }

    let mut saved = 0isize;
    for (old, new) in &renames {
        if let Some(def) = graph.defines.get(old).and_then(|p| root.element_at_mut(p)) {
            def.set_attr("id", new.as_str());
            saved += old.len() as isize - new.len() as isize;
        }
        for path in graph.referrers(old) {
            if let Some(referrer) = root.element_at_mut(path) {
                saved += rename_references(referrer, old, new);
            }
        }
    }

    stats.ids_shortened += renames.len();
    stats.bytes_saved_in_ids += saved.max(0) as usize;
    renames.len()
}

/// Remove `id` attributes nothing refers to. Fonts and protected IDs keep
/// theirs.
pub fn strip_unreferenced_ids(root: &mut Element, protection: &IdProtection, stats: &mut Statistics) -> usize {
    let graph = RefGraph::build(root);
    let mut num = 0;
    root.walk_mut(&mut |e| {
        let Some(id) = e.id() else {
            return;
        };
        if e.is("font") || graph.is_referenced(id) || protection.is_protected(id) {
            return;
        }
        e.remove_attr("id");
        num += 1;
    });
    stats.ids_removed += num;
    num
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_svg;

    #[test]
    fn test_int_to_id() {
        assert_eq!(int_to_id(1, ""), "a");
        assert_eq!(int_to_id(26, ""), "z");
        assert_eq!(int_to_id(27, ""), "aa");
        assert_eq!(int_to_id(702, ""), "zz");
        assert_eq!(int_to_id(703, "p"), "paaa");
    }

    #[test]
    fn test_compute_id_lengths() {
        assert_eq!(compute_id_lengths(512), vec![(1, 26), (2, 676)]);
        assert_eq!(compute_id_lengths(3), vec![(1, 26)]);
    }

    #[test]
    fn test_protection() {
        let list = vec!["keep".to_string()];
        let prefixes = vec!["icon-".to_string()];
        let p = IdProtection { noninkscape: false, list: &list, prefixes: &prefixes };
        assert!(p.is_protected("keep"));
        assert!(p.is_protected("icon-home"));
        assert!(!p.is_protected("path12"));
        let p = IdProtection { noninkscape: true, ..Default::default() };
        assert!(p.is_protected("logo"));
        assert!(!p.is_protected("path12"));
    }

    #[test]
    fn test_most_referenced_gets_shortest() {
        let mut doc = parse_svg(
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
<defs><path id="rarelyUsed"/><path id="heavilyUsed"/></defs>
<use xlink:href="#heavilyUsed"/><use xlink:href="#heavilyUsed"/><use xlink:href="#heavilyUsed"/>
<use xlink:href="#heavilyUsed"/><use xlink:href="#heavilyUsed"/><use xlink:href="#rarelyUsed"/>
</svg>"##,
        )
        .unwrap();
        let mut stats = Statistics::default();
        assert_eq!(shorten_ids(&mut doc.root, "", &IdProtection::default(), &mut stats), 2);
        let graph = RefGraph::build(&doc.root);
        assert_eq!(graph.ref_count("a"), 5);
        assert_eq!(graph.ref_count("b"), 1);
        assert!(graph.defines.contains_key("a"));
        assert!(graph.defines.contains_key("b"));
        assert!(!graph.defines.contains_key("heavilyUsed"));
    }

    #[test]
    fn test_protected_ids_never_renamed_or_reused() {
        let mut doc = parse_svg(
            r##"<svg xmlns="http://www.w3.org/2000/svg"><rect id="a" fill="url(#long)"/><linearGradient id="long"/></svg>"##,
        )
        .unwrap();
        let list = vec!["a".to_string()];
        let p = IdProtection { list: &list, ..Default::default() };
        shorten_ids(&mut doc.root, "", &p, &mut Statistics::default());
        let rect = doc.root.element_at(&[0]).unwrap();
        assert_eq!(rect.id(), Some("a"));
        assert_eq!(rect.get_attr("fill"), Some("url(#b)"));
    }

    #[test]
    fn test_optimal_ids_kept() {
        let mut doc = parse_svg(
            r##"<svg xmlns="http://www.w3.org/2000/svg"><rect fill="url(#g)"/><linearGradient id="g"/></svg>"##,
        )
        .unwrap();
        assert_eq!(shorten_ids(&mut doc.root, "", &IdProtection::default(), &mut Statistics::default()), 0);
    }

    #[test]
    fn test_strip_unreferenced_ids() {
        let mut doc = parse_svg(
            r##"<svg xmlns="http://www.w3.org/2000/svg"><rect id="r" fill="url(#g)"/><linearGradient id="g"/><font id="f"/><rect id="keep"/></svg>"##,
        )
        .unwrap();
        let list = vec!["keep".to_string()];
        let p = IdProtection { list: &list, ..Default::default() };
        let mut stats = Statistics::default();
        assert_eq!(strip_unreferenced_ids(&mut doc.root, &p, &mut stats), 1);
        assert_eq!(stats.ids_removed, 1);
        assert!(doc.root.element_at(&[0]).unwrap().id().is_none());
    }
}
