//! Inline `style` attributes: parsing, cleanup of useless declarations, and
//! promotion of presentation properties to XML attributes.

use std::fmt;

use crate::ast::{Element, Node};
use crate::decimal::Decimal;
use crate::length::Length;
use crate::names::{SVG_NS, is_presentation_attr};
use crate::stats::Statistics;

/// Declarations of a `style` attribute, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    decls: Vec<(String, String)>,
}

impl Style {
    /// Parse `name:value` pairs separated by `;`. Separators inside
    /// parentheses or quotes do not split; malformed pieces are dropped.
    pub fn parse(s: &str) -> Self {
        let mut style = Style::default();
        for piece in split_top_level(s, ';') {
            let Some((name, value)) = piece.split_once(':') else {
                continue;
            };
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() {
                continue;
            }
            style.set(name, value);
        }
        style
    }

    pub fn from_element(elem: &Element) -> Self {
        elem.get_attr("style").map(Style::parse).unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.decls.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decls.iter().any(|(n, _)| n == name)
    }

    /// Set a declaration, replacing an existing one in place.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.decls.iter_mut().find(|(n, _)| n == name) {
            Some(decl) => decl.1 = value,
            None => self.decls.push((name.to_string(), value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let i = self.decls.iter().position(|(n, _)| n == name)?;
        Some(self.decls.remove(i).1)
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.decls.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn names(&self) -> Vec<String> {
        self.decls.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Store back on the element, dropping the attribute when nothing is left.
    pub fn apply_to(&self, elem: &mut Element) {
        if self.is_empty() {
            elem.remove_attr("style");
        } else {
            elem.set_attr("style", self.to_string());
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.decls.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{name}:{value}")?;
        }
        Ok(())
    }
}

/// Split on `sep` outside parentheses and quotes.
pub fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                out.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    out.push(&s[start..]);
    out
}

/// Look a property up on the element, style first, then attribute, treating
/// `inherit` as unset.
pub fn own_value<'a>(elem: &'a Element, style: &'a Style, name: &str) -> Option<&'a str> {
    style
        .get(name)
        .filter(|v| *v != "inherit")
        .or_else(|| elem.get_attr(name).filter(|v| !v.is_empty() && *v != "inherit"))
}

/// Whether some descendant could observe `name` set on `elem` through
/// inheritance. Only attributes and inline styles are considered.
pub fn style_inherited_by_child(elem: &Element, name: &str) -> bool {
    if elem.children.is_empty() {
        return false;
    }
    inherited_below(elem, name)
}

fn inherited_below(elem: &Element, name: &str) -> bool {
    for child in &elem.children {
        if let Node::Element(child) = child {
            if child_inherits(child, name) {
                return true;
            }
        }
    }
    !matches!(
        elem.name.local.as_str(),
        "a" | "defs" | "glyph" | "g" | "marker" | "mask" | "missing-glyph" | "pattern" | "svg" | "switch" | "symbol"
    )
}

fn child_inherits(child: &Element, name: &str) -> bool {
    if child.get_attr(name).is_some_and(|v| !v.is_empty() && v != "inherit") {
        return false;
    }
    let style = Style::from_element(child);
    if style.get(name).is_some_and(|v| v != "inherit") {
        return false;
    }
    inherited_below(child, name)
}

/// Whether text could be rendered at or below `elem`. Unknown and foreign
/// elements are assumed to hold text.
pub fn may_contain_text(elem: &Element) -> bool {
    if elem.ns.as_deref() != Some(SVG_NS) {
        return true;
    }
    match elem.name.local.as_str() {
        "rect" | "circle" | "ellipse" | "line" | "polygon" | "polyline" | "path" | "image" | "stop" => false,
        "g" | "clipPath" | "marker" | "mask" | "pattern" | "linearGradient" | "radialGradient" | "symbol" => {
            elem.child_elements().any(may_contain_text)
        }
        _ => true,
    }
}

const OPACITY_ZERO_USELESS: &[&str] = &[
    "fill",
    "fill-opacity",
    "fill-rule",
    "stroke",
    "stroke-linejoin",
    "stroke-opacity",
    "stroke-miterlimit",
    "stroke-linecap",
    "stroke-dasharray",
    "stroke-dashoffset",
];

const STROKE_NONE_USELESS: &[&str] = &[
    "stroke-width",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-linecap",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-opacity",
];

const STROKE_OPACITY_ZERO_USELESS: &[&str] = &[
    "stroke",
    "stroke-width",
    "stroke-linejoin",
    "stroke-linecap",
    "stroke-dasharray",
    "stroke-dashoffset",
];

const STROKE_WIDTH_ZERO_USELESS: &[&str] = &[
    "stroke",
    "stroke-linejoin",
    "stroke-linecap",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-opacity",
];

const TEXT_ONLY_PROPS: &[&str] = &[
    "font-family",
    "font-size",
    "font-stretch",
    "font-size-adjust",
    "font-style",
    "font-variant",
    "font-weight",
    "letter-spacing",
    "line-height",
    "kerning",
    "text-align",
    "text-anchor",
    "text-decoration",
    "text-rendering",
    "unicode-bidi",
    "word-spacing",
    "writing-mode",
];

fn is_zero_number(v: &str) -> bool {
    v.trim().parse::<Decimal>().is_ok_and(Decimal::is_zero)
}

/// Clean up inline styles on `root` and its descendants. With
/// `style_to_xml`, presentation properties become attributes.
pub fn repair_style(root: &mut Element, style_to_xml: bool, stats: &mut Statistics) {
    repair_element(root, true, None, style_to_xml, stats);
}

fn repair_element(
    elem: &mut Element,
    is_root: bool,
    inherited_stroke: Option<&str>,
    style_to_xml: bool,
    stats: &mut Statistics,
) {
    let mut style = Style::from_element(elem);
    if !style.is_empty() {
        stats.style_properties_fixed += repair_declarations(elem, &mut style, is_root, inherited_stroke);
        if style_to_xml {
            for name in style.names() {
                if is_presentation_attr(&name)
                    && let Some(value) = style.remove(&name)
                {
                    elem.set_attr(&name, value);
                }
            }
        }
        style.apply_to(elem);
    }

    // what children inherit for `stroke`: this element's own value if set
    let own = own_value(elem, &Style::from_element(elem), "stroke").map(str::to_owned);
    let passed = own.as_deref().or(inherited_stroke).map(str::to_owned);
    for child in elem.child_elements_mut() {
        repair_element(child, false, passed.as_deref(), style_to_xml, stats);
    }
}

fn repair_declarations(elem: &Element, style: &mut Style, is_root: bool, inherited_stroke: Option<&str>) -> usize {
    let mut fixed = 0;
    let drop_unless_inherited = |style: &mut Style, names: &[&str]| {
        let mut n = 0;
        for name in names {
            if style.contains(name) && !style_inherited_by_child(elem, name) {
                style.remove(name);
                n += 1;
            }
        }
        n
    };

    // `fill: url(#grad) rgb(0, 0, 0)` is an old editor bug; the fallback is noise
    for prop in ["fill", "stroke"] {
        if let Some(value) = style.get(prop)
            && let Some((url, fallback)) = value.split_once(") ")
            && (url.starts_with("url(#") || url.starts_with("url(\"#") || url.starts_with("url('#"))
            && fallback == "rgb(0, 0, 0)"
        {
            let fixed_value = format!("{url})");
            style.set(prop, fixed_value);
            fixed += 1;
        }
    }

    if style.get("opacity").is_some_and(is_zero_number) {
        fixed += drop_unless_inherited(style, OPACITY_ZERO_USELESS);
    }

    if style.get("stroke") == Some("none") {
        fixed += drop_unless_inherited(style, STROKE_NONE_USELESS);
        if !style_inherited_by_child(elem, "stroke") && matches!(inherited_stroke, None | Some("none")) {
            style.remove("stroke");
            fixed += 1;
        }
    }

    if style.get("fill") == Some("none") {
        fixed += drop_unless_inherited(style, &["fill-rule", "fill-opacity"]);
    }

    if style.get("fill-opacity").is_some_and(is_zero_number) {
        fixed += drop_unless_inherited(style, &["fill", "fill-rule"]);
    }

    if style.get("stroke-opacity").is_some_and(is_zero_number) {
        fixed += drop_unless_inherited(style, STROKE_OPACITY_ZERO_USELESS);
    }

    if let Some(width) = style.get("stroke-width").map(Length::parse)
        && width.is_valid()
        && width.value.is_zero()
    {
        fixed += drop_unless_inherited(style, STROKE_WIDTH_ZERO_USELESS);
    }

    if !may_contain_text(elem) {
        for name in TEXT_ONLY_PROPS {
            if style.remove(name).is_some() {
                fixed += 1;
            }
        }
    }

    if style.remove("-inkscape-font-specification").is_some() {
        fixed += 1;
    }

    if let Some(overflow) = style.get("overflow") {
        let applies = matches!(
            elem.name.local.as_str(),
            "svg" | "symbol" | "image" | "foreignObject" | "marker" | "pattern"
        );
        // nested viewports default to hidden, the root to visible
        let redundant = !applies || (!is_root && overflow == "hidden") || (is_root && overflow == "visible");
        if redundant {
            style.remove("overflow");
            fixed += 1;
        }
    }

    fixed
}
