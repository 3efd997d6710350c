//! End-to-end behavior through the public API.

use burnish::{Options, minify, minify_with_options, minify_with_report, parse_svg};

fn bare() -> Options {
    Options {
        strip_xml_prolog: true,
        ..Options::default()
    }
}

#[test]
fn test_absolute_path_becomes_relative() {
    let out = minify(r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M100 100V80"/></svg>"#).unwrap();
    assert!(out.contains(r#"d="m100 100v-20""#), "{out}");
}

#[test]
fn test_straight_cubic_becomes_line() {
    let out = minify(r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M10 10 C20 20 30 30 40 40 L60 60"/></svg>"#)
        .unwrap();
    assert!(out.contains(r#"d="m10 10 50 50""#), "{out}");
}

#[test]
fn test_empty_segment_depends_on_linecap() {
    let out = minify(r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0 0 l0 0" stroke-linecap="butt"/></svg>"#)
        .unwrap();
    assert!(out.contains(r#"d="m0 0""#), "{out}");

    let out = minify(r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0 0 l0 0" stroke-linecap="round"/></svg>"#)
        .unwrap();
    assert!(out.contains(r#"d="m0 0 0 0""#), "{out}");
    assert!(out.contains(r#"stroke-linecap="round""#));
}

#[test]
fn test_duplicate_gradients_merged() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg">
  <defs>
    <linearGradient id="a"><stop offset="0" stop-color="#00f"/><stop offset="1" stop-color="#fff"/></linearGradient>
    <linearGradient id="b"><stop offset="0" stop-color="#00f"/><stop offset="1" stop-color="#fff"/></linearGradient>
  </defs>
  <rect width="10" height="10" fill="url(#a)"/>
  <rect width="20" height="20" fill="url(#b)"/>
</svg>"##;
    let (out, stats) = minify_with_report(svg, &bare()).unwrap();
    assert_eq!(out.matches("<linearGradient").count(), 1, "{out}");
    assert!(out.contains(r#"id="a""#));
    assert!(!out.contains(r#"id="b""#));
    assert!(!out.contains("url(#b)"));
    assert_eq!(out.matches("url(#a)").count(), 2);
    assert!(stats.elements_removed >= 1);
}

#[test]
fn test_matrix_becomes_rotate() {
    let out = minify(
        r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="1" height="1" transform="matrix(0 1 -1 0 0 0)"/></svg>"#,
    )
    .unwrap();
    assert!(out.contains(r#"transform="rotate(90)""#), "{out}");
}

#[test]
fn test_most_used_id_gets_shortest_name() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
  <defs>
    <rect id="rarelyUsed" width="1" height="1"/>
    <rect id="heavilyUsed" width="2" height="2"/>
  </defs>
  <use xlink:href="#heavilyUsed"/>
  <use xlink:href="#heavilyUsed" x="1"/>
  <use xlink:href="#heavilyUsed" x="2"/>
  <use xlink:href="#heavilyUsed" x="3"/>
  <use xlink:href="#heavilyUsed" x="4"/>
  <use xlink:href="#rarelyUsed" x="5"/>
</svg>"##;
    let options = Options {
        shorten_ids: true,
        ..bare()
    };
    let (out, stats) = minify_with_report(svg, &options).unwrap();
    assert!(out.contains(r#"<rect id="a" width="2" height="2"/>"#), "{out}");
    assert!(out.contains(r#"<rect id="b" width="1" height="1"/>"#), "{out}");
    assert_eq!(out.matches(r##"xlink:href="#a""##).count(), 5);
    assert_eq!(out.matches(r##"xlink:href="#b""##).count(), 1);
    assert!(!out.contains("Used"));
    assert_eq!(stats.ids_shortened, 2);
}

#[test]
fn test_style_promoted_to_attributes() {
    let out = minify_with_options(
        r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="5" height="5" style="fill:#ff0000;stroke:none"/></svg>"#,
        &bare(),
    )
    .unwrap();
    assert!(out.contains(r##"fill="#f00""##), "{out}");
    assert!(!out.contains("style="));
}

#[test]
fn test_editor_data_removed_unless_kept() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
     xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd"
     inkscape:version="1.0">
  <sodipodi:namedview inkscape:zoom="1"/>
  <rect width="100" height="100" inkscape:label="box"/>
</svg>"#;
    let out = minify_with_options(svg, &bare()).unwrap();
    assert!(!out.contains("inkscape"), "{out}");
    assert!(!out.contains("sodipodi"), "{out}");

    let options = Options {
        keep_editor_data: true,
        ..bare()
    };
    let out = minify_with_options(svg, &options).unwrap();
    assert!(out.contains("sodipodi:namedview"));
    assert!(out.contains(r#"inkscape:label="box""#));
}

#[test]
fn test_comments_and_descriptive_elements() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><!-- drawn by hand --><title>Box</title><desc>A box</desc><rect width="1" height="1"/></svg>"#;
    let out = minify_with_options(svg, &bare()).unwrap();
    assert!(out.contains("drawn by hand"));
    assert!(out.contains("<title>Box</title>"));

    let options = Options {
        strip_comments: true,
        remove_descriptive_elements: true,
        ..bare()
    };
    let (out, stats) = minify_with_report(svg, &options).unwrap();
    assert!(!out.contains("drawn by hand"));
    assert!(!out.contains("<title>"));
    assert!(!out.contains("<desc>"));
    assert_eq!(stats.comments_removed, 1);
}

#[test]
fn test_unreferenced_defs() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg"><defs><linearGradient id="unused"/><linearGradient id="used"/></defs><rect width="1" height="1" fill="url(#used)"/></svg>"##;
    let out = minify_with_options(svg, &bare()).unwrap();
    assert!(!out.contains("unused"), "{out}");
    assert!(out.contains(r#"id="used""#));

    let options = Options {
        keep_unreferenced_defs: true,
        ..bare()
    };
    let out = minify_with_options(svg, &options).unwrap();
    assert!(out.contains(r#"id="unused""#));
}

#[test]
fn test_flow_text_is_configurable() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><flowRoot><flowPara>hi</flowPara></flowRoot></svg>"#;
    assert!(minify(svg).is_ok());
    let options = Options {
        error_on_flowtext: true,
        ..Options::default()
    };
    assert!(minify_with_options(svg, &options).is_err());
}

#[test]
fn test_invalid_precision_rejected() {
    let options = Options {
        precision: 0,
        ..Options::default()
    };
    assert!(minify_with_options(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#, &options).is_err());
}

#[test]
fn test_malformed_input_is_an_error() {
    assert!(minify("<svg xmlns=\"http://www.w3.org/2000/svg\"><g></svg>").is_err());
    assert!(minify("not xml at all").is_err());
}

#[test]
fn test_output_is_stable() {
    let svg = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100">
  <defs>
    <linearGradient id="fade"><stop offset="0%" stop-color="#000000"/><stop offset="100%" stop-color="#ffffff"/></linearGradient>
  </defs>
  <g style="fill:#ff0000">
    <rect x="10.000" y="10" width="50" height="50"/>
    <path d="M 10 70 L 60 70 L 60 90 Z" fill="url(#fade)"/>
  </g>
  <circle cx="150" cy="50" r="40" transform="translate(0, 0)" stroke="black" stroke-width="1.0"/>
</svg>"##;
    let once = minify(svg).unwrap();
    let twice = minify(&once).unwrap();
    assert_eq!(once, twice);
    assert!(once.len() < svg.len());
    parse_svg(&once).unwrap();
}
