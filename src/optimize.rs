//! The pass pipeline: runs every optimization over a parsed document in a
//! fixed order.

use crate::Options;
use crate::ast::*;
use crate::color::convert_colors;
use crate::decimal::NumericContext;
use crate::defaults::{reduce_precision, remove_default_attribute_values, shorten_lengths, shorten_viewbox};
use crate::error::BurnishError;
use crate::gradients::{collapse_singly_referenced_gradients, remove_duplicate_gradient_stops, remove_duplicate_gradients};
use crate::groups::{
    create_groups_for_common_attributes, merge_sibling_groups_with_common_attributes,
    move_common_attributes_to_parent_group, remove_nested_groups, remove_unused_attributes_on_parent,
};
use crate::ids::{IdProtection, shorten_ids, strip_unreferenced_ids};
use crate::length::{Length, Unit};
use crate::number::NumberFormat;
use crate::path_rewrite::{clean_path, clean_polygon, clean_polyline};
use crate::raster::embed_rasters;
use crate::stats::Statistics;
use crate::style::repair_style;
use crate::transform::optimize_transforms;
use crate::vacuum::{
    remove_comments, remove_descriptive_elements, remove_editor_data, remove_empty_containers,
    remove_unreferenced_elements, strip_xml_space, tidy_namespace_declarations,
};

/// Run `pass` until it reports no more changes.
fn until_stable(mut pass: impl FnMut() -> usize) {
    while pass() > 0 {}
}

/// Apply all enabled optimizations to the document.
pub fn optimize(doc: &mut Document, options: &Options) -> Result<Statistics, BurnishError> {
    let mut stats = Statistics::default();
    let fmt = NumberFormat::new(
        NumericContext::new(options.precision, options.control_precision),
        options.renderer_workaround,
    );

    check_flow_text(&doc.root, options.error_on_flowtext)?;

    let root = &mut doc.root;
    remove_descriptive_elements(root, &options.descriptive_tags(), &mut stats);

    if !options.keep_editor_data {
        remove_editor_data(root, &mut stats);
    }
    tidy_namespace_declarations(root, &mut stats);

    if options.strip_comments {
        remove_comments(doc, &mut stats);
    }
    let root = &mut doc.root;
    if options.strip_xml_space {
        strip_xml_space(root, &mut stats);
    }

    repair_style(root, options.style_to_xml, &mut stats);
    if options.simplify_colors {
        convert_colors(root, &mut stats);
    }

    until_stable(|| remove_unreferenced_elements(root, options.keep_unreferenced_defs, &mut stats));
    remove_empty_containers(root, &mut stats);

    let protection = IdProtection {
        noninkscape: options.protect_ids_noninkscape,
        list: &options.protect_ids_list,
        prefixes: &options.protect_ids_prefix,
    };
    if options.strip_ids {
        strip_unreferenced_ids(root, &protection, &mut stats);
    }

    until_stable(|| remove_duplicate_gradient_stops(root, &mut stats));
    until_stable(|| collapse_singly_referenced_gradients(root, &mut stats));
    remove_duplicate_gradients(root, &mut stats);

    if options.group_collapse {
        merge_sibling_groups_with_common_attributes(root, &mut stats);
    }
    // new groups must exist before attributes move up into them
    if options.group_create {
        create_groups_for_common_attributes(root, &mut stats);
    }
    move_common_attributes_to_parent_group(root, &mut stats);
    remove_unused_attributes_on_parent(root, &mut stats);
    if options.group_collapse {
        until_stable(|| remove_nested_groups(root, &mut stats));
    }

    clean_shapes(root, &fmt, &mut stats);

    if options.shorten_ids {
        shorten_ids(root, &options.shorten_ids_prefix, &protection, &mut stats);
    }

    shorten_lengths(root, &fmt, &mut stats);
    shorten_viewbox(root, &fmt);
    reduce_precision(root, &fmt, &mut stats);
    remove_default_attribute_values(root, &mut stats);
    optimize_transforms(root, &fmt, &mut stats);

    if options.embed_rasters {
        embed_rasters(root, options.base_dir.as_deref(), &mut stats);
    }
    if options.enable_viewboxing {
        properly_size_doc(root, &fmt);
    }

    Ok(stats)
}

/// `flowRoot` is an abandoned SVG 1.2 draft feature that browsers do not
/// render.
fn check_flow_text(root: &Element, error_on_flowtext: bool) -> Result<(), BurnishError> {
    let mut count = 0;
    root.walk(&mut |_, e| {
        if e.is("flowRoot") {
            count += 1;
        }
    });
    if count == 0 {
        return Ok(());
    }
    if error_on_flowtext {
        return Err(BurnishError::FlowText(count));
    }
    log::warn!("SVG input document uses {count} flow text elements, which won't render on browsers!");
    Ok(())
}

/// Polygons, polylines and paths. Paths without data are removed.
fn clean_shapes(root: &mut Element, fmt: &NumberFormat, stats: &mut Statistics) {
    let mut empty_paths = Vec::new();
    root.walk(&mut |path, e| {
        if e.is("path") && e.get_attr("d").is_none_or(|d| d.trim().is_empty()) {
            empty_paths.push(path.to_vec());
        }
    });
    stats.elements_removed += remove_paths(root, empty_paths);

    root.walk_mut(&mut |e| {
        if e.is("polygon") {
            clean_polygon(e, fmt, stats);
        } else if e.is("polyline") {
            clean_polyline(e, fmt);
        } else if e.is("path") {
            clean_path(e, fmt, stats);
        }
    });
}

/// Replace a fixed `width`/`height` on the root with an equivalent
/// `viewBox`, so the drawing scales to its container.
fn properly_size_doc(root: &mut Element, fmt: &NumberFormat) {
    let w = Length::parse(root.attr_or_empty("width"));
    let h = Length::parse(root.attr_or_empty("height"));
    let user_units = |l: &Length| matches!(l.unit, Unit::None | Unit::Px);
    if !user_units(&w) || !user_units(&h) {
        return;
    }

    if let Some(view_box) = root.get_attr("viewBox") {
        let parts: Vec<&str> = view_box
            .split(|c: char| c == ',' || c.is_ascii_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        let numbers: Option<Vec<Length>> = parts
            .iter()
            .map(|p| Some(Length::parse(p)).filter(|l| l.unit == Unit::None))
            .collect();
        // an unparseable viewBox is overwritten
        if let Some([x, y, vw, vh]) = numbers.as_deref()
            && (!x.value.is_zero() || !y.value.is_zero() || vw.value != w.value || vh.value != h.value)
        {
            return;
        }
    }

    root.set_attr("viewBox", format!("0 0 {} {}", fmt.number(w.value), fmt.number(h.value)));
    root.remove_attr("width");
    root.remove_attr("height");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_svg;

    fn optimized(svg: &str, options: &Options) -> (Document, Statistics) {
        let mut doc = parse_svg(svg).unwrap();
        let stats = optimize(&mut doc, options).unwrap();
        (doc, stats)
    }

    #[test]
    fn test_flow_text() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><flowRoot/><flowRoot/></svg>"#;
        let options = Options {
            error_on_flowtext: true,
            ..Options::default()
        };
        let mut doc = parse_svg(svg).unwrap();
        assert!(matches!(optimize(&mut doc, &options), Err(BurnishError::FlowText(2))));
        optimized(svg, &Options::default());
    }

    #[test]
    fn test_empty_paths_removed() {
        let (doc, stats) = optimized(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><path d=""/><path/><path d="M1 1H5"/></svg>"#,
            &Options::default(),
        );
        let paths: Vec<&Element> = doc.root.child_elements().collect();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].get_attr("d"), Some("m1 1h4"));
        assert_eq!(stats.elements_removed, 2);
    }

    #[test]
    fn test_viewboxing() {
        let options = Options {
            enable_viewboxing: true,
            ..Options::default()
        };
        let (doc, _) = optimized(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="100.0px" height="50"/>"#,
            &options,
        );
        assert_eq!(doc.root.get_attr("viewBox"), Some("0 0 100 50"));
        assert!(!doc.root.has_attr("width"));

        let (doc, _) = optimized(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50" viewBox="0 0 200 100"/>"#,
            &options,
        );
        assert_eq!(doc.root.get_attr("width"), Some("100"));

        let (doc, _) = optimized(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="10cm" height="5cm"/>"#,
            &options,
        );
        assert!(!doc.root.has_attr("viewBox"));
    }

    #[test]
    fn test_groups_collapse_after_promotion() {
        let (doc, stats) = optimized(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g><g><rect width="1" fill="red"/><rect width="2" fill="red"/></g></g></svg>"#,
            &Options::default(),
        );
        let g = doc.root.element_at(&[0]).unwrap();
        assert!(g.is("g"));
        assert_eq!(g.get_attr("fill"), Some("red"));
        assert_eq!(g.child_elements().count(), 2);
        assert!(stats.elements_removed >= 1);
    }
}
