//! Color normalization: named colors and `rgb()` to hex, `#rrggbb` to `#rgb`.

use crate::ast::Element;
use crate::names::COLORED_ELEMENTS;
use crate::stats::Statistics;
use crate::style::Style;

/// CSS named colors, sorted for binary search.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("aliceblue", [240, 248, 255]),
    ("antiquewhite", [250, 235, 215]),
    ("aqua", [0, 255, 255]),
    ("aquamarine", [127, 255, 212]),
    ("azure", [240, 255, 255]),
    ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]),
    ("black", [0, 0, 0]),
    ("blanchedalmond", [255, 235, 205]),
    ("blue", [0, 0, 255]),
    ("blueviolet", [138, 43, 226]),
    ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]),
    ("cadetblue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("cornflowerblue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkcyan", [0, 139, 139]),
    ("darkgoldenrod", [184, 134, 11]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkgrey", [169, 169, 169]),
    ("darkkhaki", [189, 183, 107]),
    ("darkmagenta", [139, 0, 139]),
    ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]),
    ("darkorchid", [153, 50, 204]),
    ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]),
    ("darkseagreen", [143, 188, 143]),
    ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]),
    ("darkslategrey", [47, 79, 79]),
    ("darkturquoise", [0, 206, 209]),
    ("darkviolet", [148, 0, 211]),
    ("deeppink", [255, 20, 147]),
    ("deepskyblue", [0, 191, 255]),
    ("dimgray", [105, 105, 105]),
    ("dimgrey", [105, 105, 105]),
    ("dodgerblue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]),
    ("floralwhite", [255, 250, 240]),
    ("forestgreen", [34, 139, 34]),
    ("fuchsia", [255, 0, 255]),
    ("gainsboro", [220, 220, 220]),
    ("ghostwhite", [248, 248, 255]),
    ("gold", [255, 215, 0]),
    ("goldenrod", [218, 165, 32]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("greenyellow", [173, 255, 47]),
    ("grey", [128, 128, 128]),
    ("honeydew", [240, 255, 240]),
    ("hotpink", [255, 105, 180]),
    ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]),
    ("ivory", [255, 255, 240]),
    ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]),
    ("lavenderblush", [255, 240, 245]),
    ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]),
    ("lightblue", [173, 216, 230]),
    ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]),
    ("lightgoldenrodyellow", [250, 250, 210]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lightgrey", [211, 211, 211]),
    ("lightpink", [255, 182, 193]),
    ("lightsalmon", [255, 160, 122]),
    ("lightseagreen", [32, 178, 170]),
    ("lightskyblue", [135, 206, 250]),
    ("lightslategray", [119, 136, 153]),
    ("lightslategrey", [119, 136, 153]),
    ("lightsteelblue", [176, 196, 222]),
    ("lightyellow", [255, 255, 224]),
    ("lime", [0, 255, 0]),
    ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]),
    ("magenta", [255, 0, 255]),
    ("maroon", [128, 0, 0]),
    ("mediumaquamarine", [102, 205, 170]),
    ("mediumblue", [0, 0, 205]),
    ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]),
    ("mediumseagreen", [60, 179, 113]),
    ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]),
    ("mediumturquoise", [72, 209, 204]),
    ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]),
    ("mintcream", [245, 255, 250]),
    ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]),
    ("navajowhite", [255, 222, 173]),
    ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]),
    ("olive", [128, 128, 0]),
    ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]),
    ("orangered", [255, 69, 0]),
    ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]),
    ("palegreen", [152, 251, 152]),
    ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]),
    ("papayawhip", [255, 239, 213]),
    ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]),
    ("pink", [255, 192, 203]),
    ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]),
    ("purple", [128, 0, 128]),
    ("red", [255, 0, 0]),
    ("rosybrown", [188, 143, 143]),
    ("royalblue", [65, 105, 225]),
    ("saddlebrown", [139, 69, 19]),
    ("salmon", [250, 128, 114]),
    ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]),
    ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("slateblue", [106, 90, 205]),
    ("slategray", [112, 128, 144]),
    ("slategrey", [112, 128, 144]),
    ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]),
    ("steelblue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]),
    ("thistle", [216, 191, 216]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("violet", [238, 130, 238]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];

/// RGB triple of a CSS color keyword.
pub fn named_color(name: &str) -> Option<[u8; 3]> {
    NAMED_COLORS
        .binary_search_by(|(n, _)| n.cmp(&name))
        .ok()
        .map(|i| NAMED_COLORS[i].1)
}

/// Parse `rgb(r, g, b)` with integer or percentage channels.
fn parse_rgb(s: &str) -> Option<[u8; 3]> {
    let inner = s.trim().strip_prefix("rgb(")?.strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let [r, g, b] = parts[..] else {
        return None;
    };
    let percent = r.ends_with('%');
    let channel = |p: &str| -> Option<u8> {
        if percent {
            let digits = p.strip_suffix('%')?;
            if !digits.bytes().all(|c| c.is_ascii_digit() || c == b'.') || digits.is_empty() {
                return None;
            }
            let v: f64 = digits.parse().ok()?;
            Some((v * 255.0 / 100.0).min(255.0) as u8)
        } else {
            if p.is_empty() || !p.bytes().all(|c| c.is_ascii_digit()) {
                return None;
            }
            Some(p.parse::<u32>().ok()?.min(255) as u8)
        }
    };
    Some([channel(r)?, channel(g)?, channel(b)?])
}

fn hex(rgb: [u8; 3]) -> String {
    let [r, g, b] = rgb;
    if r >> 4 == r & 0xf && g >> 4 == g & 0xf && b >> 4 == b & 0xf {
        format!("#{:x}{:x}{:x}", r & 0xf, g & 0xf, b & 0xf)
    } else {
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Canonical hex form of a color, or the input unchanged when it is not a
/// color this module understands (`url(...)`, `none`, `currentColor`, ...).
pub fn convert_color(value: &str) -> String {
    if let Some(rgb) = named_color(value).or_else(|| parse_rgb(value)) {
        return hex(rgb);
    }
    if value.starts_with('#') {
        let lower = value.to_ascii_lowercase();
        if lower.len() == 7 && lower[1..].bytes().all(|c| c.is_ascii_hexdigit()) {
            let b = lower.as_bytes();
            if b[1] == b[2] && b[3] == b[4] && b[5] == b[6] {
                return format!("#{}{}{}", b[1] as char, b[3] as char, b[5] as char);
            }
        }
        return lower;
    }
    value.to_string()
}

fn color_attrs(elem: &Element) -> &'static [&'static str] {
    let name = elem.name.local.as_str();
    if COLORED_ELEMENTS.contains(&name) {
        &["fill", "stroke"]
    } else if name == "stop" {
        &["stop-color"]
    } else if name == "solidColor" {
        &["solid-color"]
    } else {
        &[]
    }
}

/// Shorten color values in attributes and inline style, recursively.
pub fn convert_colors(elem: &mut Element, stats: &mut Statistics) {
    let attrs = color_attrs(elem);
    if !attrs.is_empty() {
        let mut style = Style::from_element(elem);
        let mut style_changed = false;
        for &attr in attrs {
            if let Some(old) = elem.get_attr(attr).filter(|v| !v.is_empty()) {
                let new = convert_color(old);
                if new.len() < old.len() {
                    stats.bytes_saved_in_colors += old.len() - new.len();
                    elem.set_attr(attr, new);
                }
            }
            if let Some(old) = style.get(attr) {
                let new = convert_color(old);
                if new.len() < old.len() {
                    stats.bytes_saved_in_colors += old.len() - new.len();
                    style.set(attr, new);
                    style_changed = true;
                }
            }
        }
        if style_changed {
            style.apply_to(elem);
        }
    }

    for child in elem.child_elements_mut() {
        convert_colors(child, stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_table_is_sorted() {
        assert!(NAMED_COLORS.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(named_color("teal"), Some([0, 128, 128]));
        assert_eq!(named_color("Teal"), None);
    }

    #[test]
    fn test_convert_color() {
        assert_eq!(convert_color("#FFFFFF"), "#fff");
        assert_eq!(convert_color("#aabbcc"), "#abc");
        assert_eq!(convert_color("#abcdef"), "#abcdef");
        assert_eq!(convert_color("white"), "#fff");
        assert_eq!(convert_color("red"), "#f00");
        assert_eq!(convert_color("lightgoldenrodyellow"), "#fafad2");
        assert_eq!(convert_color("rgb(255, 0, 0)"), "#f00");
        assert_eq!(convert_color("rgb( 17,34 ,51 )"), "#123");
        assert_eq!(convert_color("rgb(100%, 50%, 0%)"), "#ff7f00");
        assert_eq!(convert_color("url(#grad)"), "url(#grad)");
        assert_eq!(convert_color("none"), "none");
    }

    #[test]
    fn test_convert_colors_only_when_shorter() {
        let mut root = Element::new("svg");
        let mut rect = Element::new("rect");
        rect.set_attr("fill", "red");
        rect.set_attr("stroke", "#FF0000");
        rect.set_attr("style", "fill:rgb(0,0,255);stroke-width:2");
        root.children.push(crate::ast::Node::Element(rect));

        let mut stats = Statistics::default();
        convert_colors(&mut root, &mut stats);
        let rect = root.element_at(&[0]).unwrap();
        assert_eq!(rect.get_attr("fill"), Some("red"));
        assert_eq!(rect.get_attr("stroke"), Some("#f00"));
        assert_eq!(rect.get_attr("style"), Some("fill:#00f;stroke-width:2"));
        assert_eq!(stats.bytes_saved_in_colors, 3 + 8);
    }

    #[test]
    fn test_stop_color() {
        let mut stop = Element::new("stop");
        stop.set_attr("stop-color", "#000000");
        stop.set_attr("fill", "#000000");
        convert_colors(&mut stop, &mut Statistics::default());
        assert_eq!(stop.get_attr("stop-color"), Some("#000"));
        assert_eq!(stop.get_attr("fill"), Some("#000000"));
    }
}
