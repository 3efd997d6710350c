//! Namespace URIs and the attribute/element name tables the passes consult.

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";

/// Editor namespaces whose elements and attributes carry no rendering meaning.
pub const EDITOR_NAMESPACES: &[&str] = &[
    "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd",
    "http://www.inkscape.org/namespaces/inkscape",
    "http://ns.adobe.com/AdobeIllustrator/10.0/",
    "http://ns.adobe.com/Graphs/1.0/",
    "http://ns.adobe.com/AdobeSVGViewerExtensions/3.0/",
    "http://ns.adobe.com/Variables/1.0/",
    "http://ns.adobe.com/SaveForWeb/1.0/",
    "http://ns.adobe.com/Extensibility/1.0/",
    "http://ns.adobe.com/Flows/1.0/",
    "http://ns.adobe.com/ImageReplacement/1.0/",
    "http://ns.adobe.com/GenericCustomNamespace/1.0/",
    "http://ns.adobe.com/XPath/1.0/",
    "http://www.bohemiancoding.com/sketch/ns",
];

pub fn is_editor_namespace(uri: &str) -> bool {
    EDITOR_NAMESPACES.contains(&uri)
}

/// Presentation attributes of SVG 1.1 and SVG Tiny 1.2. Only these move
/// between the `style` attribute and XML attributes.
pub const PRESENTATION_ATTRS: &[&str] = &[
    "alignment-baseline",
    "baseline-shift",
    "clip",
    "clip-path",
    "clip-rule",
    "color",
    "color-interpolation",
    "color-interpolation-filters",
    "color-profile",
    "color-rendering",
    "cursor",
    "direction",
    "display",
    "dominant-baseline",
    "enable-background",
    "fill",
    "fill-opacity",
    "fill-rule",
    "filter",
    "flood-color",
    "flood-opacity",
    "font",
    "font-family",
    "font-size",
    "font-size-adjust",
    "font-stretch",
    "font-style",
    "font-variant",
    "font-weight",
    "glyph-orientation-horizontal",
    "glyph-orientation-vertical",
    "image-rendering",
    "kerning",
    "letter-spacing",
    "lighting-color",
    "marker",
    "marker-end",
    "marker-mid",
    "marker-start",
    "mask",
    "opacity",
    "overflow",
    "pointer-events",
    "shape-rendering",
    "stop-color",
    "stop-opacity",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "text-anchor",
    "text-decoration",
    "text-rendering",
    "unicode-bidi",
    "visibility",
    "word-spacing",
    "writing-mode",
    // SVG Tiny 1.2
    "audio-level",
    "buffered-rendering",
    "display-align",
    "line-increment",
    "solid-color",
    "solid-opacity",
    "text-align",
    "vector-effect",
    "viewport-fill",
    "viewport-fill-opacity",
];

pub fn is_presentation_attr(name: &str) -> bool {
    PRESENTATION_ATTRS.contains(&name)
}

/// Properties that may hold a `url(#id)` reference.
pub const REFERENCING_PROPS: &[&str] = &[
    "fill",
    "stroke",
    "filter",
    "clip-path",
    "mask",
    "marker",
    "marker-start",
    "marker-end",
    "marker-mid",
];

/// Properties a `<g>` can hold on behalf of all its children.
pub const INHERITABLE_ATTRS: &[&str] = &[
    "clip-rule",
    "display-align",
    "fill",
    "fill-opacity",
    "fill-rule",
    "font",
    "font-family",
    "font-size",
    "font-size-adjust",
    "font-stretch",
    "font-style",
    "font-variant",
    "font-weight",
    "letter-spacing",
    "pointer-events",
    "shape-rendering",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "text-anchor",
    "text-decoration",
    "text-rendering",
    "visibility",
    "word-spacing",
    "writing-mode",
];

/// Elements the content model allows inside a `<g>`; only these are wrapped
/// into new groups.
pub const GROUPABLE_ELEMENTS: &[&str] = &[
    "animate",
    "animateColor",
    "animateMotion",
    "animateTransform",
    "set",
    "desc",
    "metadata",
    "title",
    "circle",
    "ellipse",
    "line",
    "path",
    "polygon",
    "polyline",
    "rect",
    "defs",
    "g",
    "svg",
    "symbol",
    "use",
    "linearGradient",
    "radialGradient",
    "a",
    "altGlyphDef",
    "clipPath",
    "color-profile",
    "cursor",
    "filter",
    "font",
    "font-face",
    "foreignObject",
    "image",
    "marker",
    "mask",
    "pattern",
    "script",
    "style",
    "switch",
    "text",
    "view",
    // SVG Tiny 1.2
    "animation",
    "audio",
    "discard",
    "handler",
    "listener",
    "prefetch",
    "solidColor",
    "textArea",
    "video",
];

pub const ANIMATION_ELEMENTS: &[&str] = &["set", "animate", "animateColor", "animateTransform", "animateMotion"];

/// Elements whose character data is rendered.
pub const TEXT_CONTENT_ELEMENTS: &[&str] = &[
    "text", "tspan", "tref", "textPath", "altGlyph", "flowDiv", "flowPara", "flowSpan", "flowTref", "flowLine",
];

/// Shapes and containers whose `fill`/`stroke` colors get shortened.
pub const COLORED_ELEMENTS: &[&str] = &[
    "rect", "circle", "ellipse", "polygon", "line", "polyline", "path", "g", "a",
];

/// Attributes whose values are plain numbers and get rounded to the precision.
pub const PRECISION_ATTRS: &[&str] = &[
    "opacity",
    "flood-opacity",
    "fill-opacity",
    "stroke-opacity",
    "stop-opacity",
    "stroke-miterlimit",
    "stroke-dashoffset",
    "letter-spacing",
    "word-spacing",
    "kerning",
    "font-size-adjust",
    "font-size",
    "stroke-width",
];

/// Attributes holding a single length.
pub const LENGTH_ATTRS: &[&str] = &[
    "x", "y", "width", "height", "cx", "cy", "r", "rx", "ry", "x1", "y1", "x2", "y2", "fx", "fy", "offset",
];

/// Elements whose [`LENGTH_ATTRS`] get rewritten.
pub const LENGTH_ELEMENTS: &[&str] = &[
    "svg", "image", "rect", "circle", "ellipse", "line", "linearGradient", "radialGradient", "stop", "filter",
];

/// Attributes emitted first, in this order; then remaining presentation
/// attributes alphabetically, then `style`; unknown attributes go last.
const LEADING_ATTRS: &[&str] = &[
    "id", "xml:id", "class", "transform", "x", "y", "z", "width", "height", "x1", "x2", "y1", "y2", "dx", "dy",
    "rotate", "startOffset", "method", "spacing", "cx", "cy", "r", "rx", "ry", "fx", "fy", "d", "points",
];

/// Output rank of an attribute name.
pub fn attribute_rank(name: &str) -> usize {
    if let Some(i) = LEADING_ATTRS.iter().position(|a| *a == name) {
        return i;
    }
    let base = LEADING_ATTRS.len();
    if is_presentation_attr(name) {
        let below = PRESENTATION_ATTRS.iter().filter(|a| **a < name).count();
        return base + below;
    }
    if name == "style" {
        return base + PRESENTATION_ATTRS.len();
    }
    base + PRESENTATION_ATTRS.len() + 1
}
