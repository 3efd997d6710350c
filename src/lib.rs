//! burnish - An SVG optimizer
//!
//! burnish shrinks SVG files without changing how they render: it rewrites
//! path data and transforms into their shortest equivalent form, moves
//! styles into attributes, drops defaults and unreferenced definitions, and
//! merges duplicate gradients and redundant groups.

mod ast;
mod color;
mod css;
mod decimal;
mod defaults;
mod error;
mod gradients;
mod groups;
mod ids;
mod length;
mod names;
mod number;
mod optimize;
mod parse;
mod path;
mod path_rewrite;
mod raster;
mod refs;
mod serialize;
mod stats;
mod style;
mod transform;
mod vacuum;

use std::path::PathBuf;

pub use ast::*;
pub use decimal::{Decimal, NumericContext};
pub use error::*;
pub use optimize::*;
pub use parse::*;
pub use path::{Path, parse_path};
pub use serialize::*;
pub use stats::Statistics;
pub use transform::{Transform, parse_transform};

/// Highest precision accepted; the decimal arithmetic works to this many
/// significant digits.
pub const MAX_PRECISION: u32 = decimal::WORKING_DIGITS;

/// Minify an SVG string with default settings.
pub fn minify(svg: &str) -> Result<String, BurnishError> {
    minify_with_options(svg, &Options::default())
}

/// Minify an SVG string with custom options.
pub fn minify_with_options(svg: &str, options: &Options) -> Result<String, BurnishError> {
    minify_with_report(svg, options).map(|(out, _)| out)
}

/// Minify an SVG string, also returning what was changed.
pub fn minify_with_report(svg: &str, options: &Options) -> Result<(String, Statistics), BurnishError> {
    options.validate()?;
    let mut doc = parse_svg(svg)?;
    let stats = optimize(&mut doc, options)?;
    Ok((serialize(&doc, options), stats))
}

/// Indentation unit for pretty-printed output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Indent {
    #[default]
    Space,
    Tab,
    None,
}

impl Indent {
    pub fn as_str(self) -> &'static str {
        match self {
            Indent::Space => " ",
            Indent::Tab => "\t",
            Indent::None => "",
        }
    }
}

/// Optimization and output options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Significant digits for coordinates and lengths (default: 5)
    pub precision: u32,
    /// Significant digits for Bézier control points (default: same as precision)
    pub control_precision: Option<u32>,
    /// Shorten colors to `#rgb`/`#rrggbb`
    pub simplify_colors: bool,
    /// Move presentation properties from `style` into attributes
    pub style_to_xml: bool,
    /// Merge and collapse redundant groups
    pub group_collapse: bool,
    /// Wrap runs of elements sharing attributes in new groups
    pub group_create: bool,
    /// Keep elements and attributes from editor namespaces
    pub keep_editor_data: bool,
    /// Keep unreferenced children of `<defs>`
    pub keep_unreferenced_defs: bool,
    /// Keep leading zeros and separators that some renderers need
    pub renderer_workaround: bool,
    /// Omit the `<?xml ...?>` declaration
    pub strip_xml_prolog: bool,
    pub remove_titles: bool,
    pub remove_descriptions: bool,
    pub remove_metadata: bool,
    /// Remove titles, descriptions and metadata alike
    pub remove_descriptive_elements: bool,
    pub strip_comments: bool,
    /// Inline linked PNG, JPEG and GIF images
    pub embed_rasters: bool,
    /// Replace root width/height by a viewBox
    pub enable_viewboxing: bool,
    pub indent: Indent,
    /// Indent units per nesting level
    pub indent_depth: usize,
    /// Pretty-print with line breaks; off means a single line
    pub newlines: bool,
    /// Remove `xml:space` from the root element
    pub strip_xml_space: bool,
    /// Remove unreferenced IDs
    pub strip_ids: bool,
    /// Rename IDs to the shortest free names
    pub shorten_ids: bool,
    /// Prefix for shortened IDs
    pub shorten_ids_prefix: String,
    /// Never touch IDs that do not end in a digit
    pub protect_ids_noninkscape: bool,
    /// Never touch these IDs
    pub protect_ids_list: Vec<String>,
    /// Never touch IDs starting with one of these
    pub protect_ids_prefix: Vec<String>,
    /// Fail instead of warning when the document contains flow text
    pub error_on_flowtext: bool,
    /// Directory relative raster links are resolved against
    pub base_dir: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            precision: 5,
            control_precision: None,
            simplify_colors: true,
            style_to_xml: true,
            group_collapse: true,
            group_create: false,
            keep_editor_data: false,
            keep_unreferenced_defs: false,
            renderer_workaround: false,
            strip_xml_prolog: false,
            remove_titles: false,
            remove_descriptions: false,
            remove_metadata: false,
            remove_descriptive_elements: false,
            strip_comments: false,
            embed_rasters: true,
            enable_viewboxing: false,
            indent: Indent::Space,
            indent_depth: 1,
            newlines: true,
            strip_xml_space: false,
            strip_ids: false,
            shorten_ids: false,
            shorten_ids_prefix: String::new(),
            protect_ids_noninkscape: false,
            protect_ids_list: Vec::new(),
            protect_ids_prefix: Vec::new(),
            error_on_flowtext: false,
            base_dir: None,
        }
    }
}

impl Options {
    /// Reject settings the optimizer cannot honor.
    pub fn validate(&self) -> Result<(), BurnishError> {
        if !(1..=MAX_PRECISION).contains(&self.precision) {
            return Err(BurnishError::Config(format!(
                "precision must be between 1 and {MAX_PRECISION}, got {}",
                self.precision
            )));
        }
        match self.control_precision {
            Some(0) => Err(BurnishError::Config("control point precision must be at least 1".into())),
            Some(c) if c > self.precision => {
                log::warn!(
                    "control point precision {c} exceeds precision {}; using {}",
                    self.precision,
                    self.precision
                );
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Names of the descriptive elements to remove.
    pub fn descriptive_tags(&self) -> Vec<&'static str> {
        let all = self.remove_descriptive_elements;
        [
            ("title", self.remove_titles),
            ("desc", self.remove_descriptions),
            ("metadata", self.remove_metadata),
        ]
        .into_iter()
        .filter(|&(_, on)| on || all)
        .map(|(tag, _)| tag)
        .collect()
    }
}
