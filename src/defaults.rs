//! Attributes and properties whose value is the one SVG would assume anyway,
//! and numeric attributes carrying more precision than anyone can see.

use std::collections::HashSet;

use crate::ast::Element;
use crate::decimal::Decimal;
use crate::length::{Length, Unit};
use crate::names::{LENGTH_ATTRS, LENGTH_ELEMENTS, PRECISION_ATTRS};
use crate::number::NumberFormat;
use crate::stats::Statistics;
use crate::style::Style;

/// Initial values of presentation properties. Properties defaulting to
/// `auto` are left out.
const DEFAULT_PROPERTIES: &[(&str, &str)] = &[
    ("baseline-shift", "baseline"),
    ("clip-path", "none"),
    ("clip-rule", "nonzero"),
    ("color", "#000"),
    ("color-interpolation-filters", "linearRGB"),
    ("color-interpolation", "sRGB"),
    ("direction", "ltr"),
    ("display", "inline"),
    ("enable-background", "accumulate"),
    ("fill", "#000"),
    ("fill-opacity", "1"),
    ("fill-rule", "nonzero"),
    ("filter", "none"),
    ("flood-color", "#000"),
    ("flood-opacity", "1"),
    ("font-size-adjust", "none"),
    ("font-size", "medium"),
    ("font-stretch", "normal"),
    ("font-style", "normal"),
    ("font-variant", "normal"),
    ("font-weight", "normal"),
    ("glyph-orientation-horizontal", "0deg"),
    ("letter-spacing", "normal"),
    ("lighting-color", "#fff"),
    ("marker", "none"),
    ("marker-start", "none"),
    ("marker-mid", "none"),
    ("marker-end", "none"),
    ("mask", "none"),
    ("opacity", "1"),
    ("pointer-events", "visiblePainted"),
    ("stop-color", "#000"),
    ("stop-opacity", "1"),
    ("stroke", "none"),
    ("stroke-dasharray", "none"),
    ("stroke-dashoffset", "0"),
    ("stroke-linecap", "butt"),
    ("stroke-linejoin", "miter"),
    ("stroke-miterlimit", "4"),
    ("stroke-opacity", "1"),
    ("stroke-width", "1"),
    ("text-anchor", "start"),
    ("text-decoration", "none"),
    ("unicode-bidi", "normal"),
    ("visibility", "visible"),
    ("word-spacing", "normal"),
    ("writing-mode", "lr-tb"),
    // SVG Tiny 1.2
    ("audio-level", "1"),
    ("solid-color", "#000"),
    ("solid-opacity", "1"),
    ("text-align", "start"),
    ("vector-effect", "none"),
    ("viewport-fill", "none"),
    ("viewport-fill-opacity", "1"),
];

pub fn default_property(name: &str) -> Option<&'static str> {
    DEFAULT_PROPERTIES.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

#[derive(Debug, Clone, Copy)]
enum DefaultValue {
    /// Exact string match.
    Text(&'static str),
    /// Numeric match in any valid unit.
    Number(&'static str),
    /// Numeric match in exactly this unit.
    Length(&'static str, Unit),
    /// Any value, as long as the condition holds.
    Any,
}

#[derive(Debug, Clone, Copy)]
enum Condition {
    Always,
    /// The element's `*Units` attribute is not `userSpaceOnUse`.
    BoundingBoxUnits,
    /// Equal to another attribute's raw value (`fx` falls back to `cx`).
    SameAs(&'static str),
}

struct DefaultAttr {
    name: &'static str,
    value: DefaultValue,
    elements: &'static [&'static str],
    condition: Condition,
}

const fn attr(name: &'static str, value: DefaultValue, elements: &'static [&'static str]) -> DefaultAttr {
    DefaultAttr {
        name,
        value,
        elements,
        condition: Condition::Always,
    }
}

const fn attr_if(
    name: &'static str,
    value: DefaultValue,
    elements: &'static [&'static str],
    condition: Condition,
) -> DefaultAttr {
    DefaultAttr {
        name,
        value,
        elements,
        condition,
    }
}

use DefaultValue::{Any, Length as Len, Number as Num, Text};

const GRADIENTS: &[&str] = &["linearGradient", "radialGradient"];
const FE_FUNCS: &[&str] = &["feFuncA", "feFuncB", "feFuncG", "feFuncR"];
const POSITIONED: &[&str] = &[
    "cursor",
    "fePointLight",
    "feSpotLight",
    "foreignObject",
    "image",
    "pattern",
    "rect",
    "svg",
    "text",
    "use",
];
const FILTER_MASK: &[&str] = &["filter", "mask"];
const EXTERNAL_RESOURCES: &[&str] = &[
    "a",
    "altGlyph",
    "animate",
    "animateColor",
    "animateMotion",
    "animateTransform",
    "circle",
    "clipPath",
    "cursor",
    "defs",
    "ellipse",
    "feImage",
    "filter",
    "font",
    "foreignObject",
    "g",
    "image",
    "line",
    "linearGradient",
    "marker",
    "mask",
    "mpath",
    "path",
    "pattern",
    "polygon",
    "polyline",
    "radialGradient",
    "rect",
    "script",
    "set",
    "svg",
    "switch",
    "symbol",
    "text",
    "textPath",
    "tref",
    "tspan",
    "use",
    "view",
];

/// Per-element attribute defaults, checked in order. `fx`/`fy` come before
/// `cx`/`cy` so a focus equal to a default center still goes.
const DEFAULT_ATTRIBUTES: &[DefaultAttr] = &[
    attr("clipPathUnits", Text("userSpaceOnUse"), &["clipPath"]),
    attr("filterUnits", Text("objectBoundingBox"), &["filter"]),
    attr("gradientUnits", Text("objectBoundingBox"), GRADIENTS),
    attr("maskUnits", Text("objectBoundingBox"), &["mask"]),
    attr("maskContentUnits", Text("userSpaceOnUse"), &["mask"]),
    attr("patternUnits", Text("objectBoundingBox"), &["pattern"]),
    attr("patternContentUnits", Text("userSpaceOnUse"), &["pattern"]),
    attr("primitiveUnits", Text("userSpaceOnUse"), &["filter"]),
    attr("externalResourcesRequired", Text("false"), EXTERNAL_RESOURCES),
    attr("width", Len("100", Unit::Percent), &["svg"]),
    attr("height", Len("100", Unit::Percent), &["svg"]),
    attr("baseProfile", Text("none"), &["svg"]),
    attr(
        "preserveAspectRatio",
        Text("xMidYMid meet"),
        &["feImage", "image", "marker", "pattern", "svg", "symbol", "view"],
    ),
    attr("x", Num("0"), POSITIONED),
    attr("y", Num("0"), POSITIONED),
    attr("z", Num("0"), &["fePointLight", "feSpotLight"]),
    attr("x1", Num("0"), &["line"]),
    attr("y1", Num("0"), &["line"]),
    attr("x2", Num("0"), &["line"]),
    attr("y2", Num("0"), &["line"]),
    attr("cx", Num("0"), &["circle", "ellipse"]),
    attr("cy", Num("0"), &["circle", "ellipse"]),
    attr("markerUnits", Text("strokeWidth"), &["marker"]),
    attr("refX", Num("0"), &["marker"]),
    attr("refY", Num("0"), &["marker"]),
    attr("markerHeight", Num("3"), &["marker"]),
    attr("markerWidth", Num("3"), &["marker"]),
    attr("orient", Num("0"), &["marker"]),
    attr("lengthAdjust", Text("spacing"), &["text", "textPath", "tref", "tspan"]),
    attr("startOffset", Num("0"), &["textPath"]),
    attr("method", Text("align"), &["textPath"]),
    attr("spacing", Text("exact"), &["textPath"]),
    attr("x", Len("-10", Unit::Percent), FILTER_MASK),
    attr_if("x", Len("-0.1", Unit::None), FILTER_MASK, Condition::BoundingBoxUnits),
    attr("y", Len("-10", Unit::Percent), FILTER_MASK),
    attr_if("y", Len("-0.1", Unit::None), FILTER_MASK, Condition::BoundingBoxUnits),
    attr("width", Len("120", Unit::Percent), FILTER_MASK),
    attr_if("width", Len("1.2", Unit::None), FILTER_MASK, Condition::BoundingBoxUnits),
    attr("height", Len("120", Unit::Percent), FILTER_MASK),
    attr_if("height", Len("1.2", Unit::None), FILTER_MASK, Condition::BoundingBoxUnits),
    attr("x1", Num("0"), &["linearGradient"]),
    attr("y1", Num("0"), &["linearGradient"]),
    attr("y2", Num("0"), &["linearGradient"]),
    attr("x2", Len("100", Unit::Percent), &["linearGradient"]),
    attr_if("x2", Len("1", Unit::None), &["linearGradient"], Condition::BoundingBoxUnits),
    attr_if("fx", Any, &["radialGradient"], Condition::SameAs("cx")),
    attr_if("fy", Any, &["radialGradient"], Condition::SameAs("cy")),
    attr("r", Len("50", Unit::Percent), &["radialGradient"]),
    attr_if("r", Len("0.5", Unit::None), &["radialGradient"], Condition::BoundingBoxUnits),
    attr("cx", Len("50", Unit::Percent), &["radialGradient"]),
    attr_if("cx", Len("0.5", Unit::None), &["radialGradient"], Condition::BoundingBoxUnits),
    attr("cy", Len("50", Unit::Percent), &["radialGradient"]),
    attr_if("cy", Len("0.5", Unit::None), &["radialGradient"], Condition::BoundingBoxUnits),
    attr("spreadMethod", Text("pad"), GRADIENTS),
    // filter primitives; number-optional-number attributes compare as text
    attr("amplitude", Num("1"), FE_FUNCS),
    attr("azimuth", Num("0"), &["feDistantLight"]),
    attr("baseFrequency", Text("0"), FE_FUNCS),
    attr("bias", Num("1"), &["feConvolveMatrix"]),
    attr("diffuseConstant", Num("1"), &["feDiffuseLighting"]),
    attr("edgeMode", Text("duplicate"), &["feConvolveMatrix"]),
    attr("elevation", Num("0"), &["feDistantLight"]),
    attr("exponent", Num("1"), FE_FUNCS),
    attr("intercept", Num("0"), FE_FUNCS),
    attr("k1", Num("0"), &["feComposite"]),
    attr("k2", Num("0"), &["feComposite"]),
    attr("k3", Num("0"), &["feComposite"]),
    attr("k4", Num("0"), &["feComposite"]),
    attr("mode", Text("normal"), &["feBlend"]),
    attr("numOctaves", Num("1"), &["feTurbulence"]),
    attr("offset", Num("0"), FE_FUNCS),
    attr("operator", Text("over"), &["feComposite"]),
    attr("operator", Text("erode"), &["feMorphology"]),
    attr("order", Text("3"), &["feConvolveMatrix"]),
    attr("pointsAtX", Num("0"), &["feSpotLight"]),
    attr("pointsAtY", Num("0"), &["feSpotLight"]),
    attr("pointsAtZ", Num("0"), &["feSpotLight"]),
    attr("preserveAlpha", Text("false"), &["feConvolveMatrix"]),
    attr("radius", Text("0"), &["feMorphology"]),
    attr("scale", Num("0"), &["feDisplacementMap"]),
    attr("seed", Num("0"), &["feTurbulence"]),
    attr("specularConstant", Num("1"), &["feSpecularLighting"]),
    attr("specularExponent", Num("1"), &["feSpecularLighting", "feSpotLight"]),
    attr("stdDeviation", Text("0"), &["feGaussianBlur"]),
    attr("stitchTiles", Text("noStitch"), &["feTurbulence"]),
    attr("surfaceScale", Num("1"), &["feDiffuseLighting", "feSpecularLighting"]),
    attr("type", Text("matrix"), &["feColorMatrix"]),
    attr("type", Text("turbulence"), &["feTurbulence"]),
    attr("xChannelSelector", Text("A"), &["feDisplacementMap"]),
    attr("yChannelSelector", Text("A"), &["feDisplacementMap"]),
];

fn units_attr(elem: &Element) -> &'static str {
    match elem.name.local.as_str() {
        "filter" => "filterUnits",
        "mask" => "maskUnits",
        _ => "gradientUnits",
    }
}

fn numeric_matches(value: &str, default: &str, unit: Option<Unit>) -> bool {
    let len = Length::parse(value);
    let Ok(expected) = default.parse::<Decimal>() else {
        return false;
    };
    len.is_valid() && len.value == expected && unit.is_none_or(|u| u == len.unit)
}

impl DefaultAttr {
    fn applies(&self, elem: &Element) -> bool {
        let Some(value) = elem.get_attr(self.name) else {
            return false;
        };
        let matches = match self.value {
            Text(t) => value == t,
            Num(n) => numeric_matches(value, n, None),
            Len(n, unit) => numeric_matches(value, n, Some(unit)),
            Any => true,
        };
        matches
            && match self.condition {
                Condition::Always => true,
                Condition::BoundingBoxUnits => elem.get_attr(units_attr(elem)) != Some("userSpaceOnUse"),
                Condition::SameAs(other) => elem.get_attr(other) == Some(value),
            }
    }
}

/// Add a property to the tainted set; `marker` and its longhands taint each other.
fn taint(tainted: &mut HashSet<String>, name: &str) {
    tainted.insert(name.to_string());
    match name {
        "marker" => {
            for longhand in ["marker-start", "marker-mid", "marker-end"] {
                tainted.insert(longhand.to_string());
            }
        }
        "marker-start" | "marker-mid" | "marker-end" => {
            tainted.insert("marker".to_string());
        }
        _ => {}
    }
}

/// Remove attributes and style properties equal to their defaults. A
/// property an ancestor sets to something else is kept on descendants, since
/// removing it would let the ancestor's value show through.
pub fn remove_default_attribute_values(root: &mut Element, stats: &mut Statistics) {
    stats.attributes_removed += remove_defaults(root, HashSet::new());
}

fn remove_defaults(elem: &mut Element, mut tainted: HashSet<String>) -> usize {
    let mut removed = 0;
    for default in DEFAULT_ATTRIBUTES {
        if default.elements.contains(&elem.name.local.as_str()) && default.applies(elem) {
            elem.remove_attr(default.name);
            removed += 1;
        }
    }

    let names: Vec<String> = elem.attributes.iter().map(|a| a.name.full_name()).collect();
    for name in names {
        if tainted.contains(&name) {
            continue;
        }
        let Some(default) = default_property(&name) else {
            continue;
        };
        if elem.get_attr(&name) == Some(default) {
            elem.remove_attr(&name);
            removed += 1;
        } else {
            taint(&mut tainted, &name);
        }
    }

    let mut style = Style::from_element(elem);
    let before = style.clone();
    for name in style.names() {
        if tainted.contains(&name) {
            continue;
        }
        let Some(default) = default_property(&name) else {
            continue;
        };
        if style.get(&name) == Some(default) {
            style.remove(&name);
            removed += 1;
        } else {
            taint(&mut tainted, &name);
        }
    }
    if style != before {
        style.apply_to(elem);
    }

    for child in elem.child_elements_mut() {
        removed += remove_defaults(child, tainted.clone());
    }
    removed
}

/// Round opacities, widths, spacings and the like to the precision, keeping
/// the result only when it is shorter.
pub fn reduce_precision(elem: &mut Element, fmt: &NumberFormat, stats: &mut Statistics) {
    let mut style = Style::from_element(elem);
    let mut style_changed = false;
    for &name in PRECISION_ATTRS {
        if let Some(old) = elem.get_attr(name)
            && let Some(new) = fmt.length(old)
            && new.len() < old.len()
        {
            stats.bytes_saved_in_lengths += old.len() - new.len();
            elem.set_attr(name, new);
        }
        if let Some(old) = style.get(name)
            && let Some(new) = fmt.length(old)
            && new.len() < old.len()
        {
            stats.bytes_saved_in_lengths += old.len() - new.len();
            style.set(name, new);
            style_changed = true;
        }
    }
    if style_changed {
        style.apply_to(elem);
    }

    for child in elem.child_elements_mut() {
        reduce_precision(child, fmt, stats);
    }
}

/// Rewrite coordinates and sizes on geometry elements. Values that are not
/// lengths (`auto`, `inherit`, ...) stay as they are.
pub fn shorten_lengths(root: &mut Element, fmt: &NumberFormat, stats: &mut Statistics) {
    root.walk_mut(&mut |elem| {
        if elem.ns.as_deref() != Some(crate::names::SVG_NS) || !LENGTH_ELEMENTS.contains(&elem.name.local.as_str()) {
            return;
        }
        for &name in LENGTH_ATTRS {
            if let Some(old) = elem.get_attr(name)
                && let Some(new) = fmt.length(old)
                && new != old
            {
                stats.bytes_saved_in_lengths += old.len().saturating_sub(new.len());
                elem.set_attr(name, new);
            }
        }
    });
}

/// Rewrite `viewBox` numbers unitless, separated by single spaces.
pub fn shorten_viewbox(root: &mut Element, fmt: &NumberFormat) {
    let Some(view_box) = root.get_attr("viewBox") else {
        return;
    };
    let numbers: Option<Vec<String>> = view_box
        .split(|c: char| c == ',' || c.is_ascii_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Decimal>().ok().map(|v| fmt.number(v)))
        .collect();
    match numbers {
        Some(numbers) if !numbers.is_empty() => root.set_attr("viewBox", numbers.join(" ")),
        _ => log::debug!("leaving unparseable viewBox {view_box:?} as is"),
    }
}
