use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, error::ErrorKind};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use burnish::{BurnishError, Indent, MAX_PRECISION, Options, minify_with_report};

#[derive(Parser)]
#[command(name = "burnish", version)]
#[command(about = "Optimize SVG files without changing how they look", long_about = None)]
struct Cli {
    /// Input file (stdin when omitted or "-"); .svgz and .gz are decompressed
    #[arg(value_name = "INPUT", conflicts_with = "input_flag")]
    input: Option<PathBuf>,

    /// Output file (stdout when omitted or "-"); .svgz and .gz are compressed
    #[arg(value_name = "OUTPUT", conflicts_with = "output_flag")]
    output: Option<PathBuf>,

    #[arg(short = 'i', long = "input", value_name = "INPUT")]
    input_flag: Option<PathBuf>,

    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    output_flag: Option<PathBuf>,

    /// Significant digits for coordinates
    #[arg(short = 'p', long = "set-precision", value_name = "N", default_value_t = 5,
          value_parser = clap::value_parser!(u32).range(1..=MAX_PRECISION as i64))]
    precision: u32,

    /// Significant digits for Bézier control points (defaults to --set-precision)
    #[arg(long = "set-c-precision", value_name = "N",
          value_parser = clap::value_parser!(u32).range(1..=MAX_PRECISION as i64))]
    control_precision: Option<u32>,

    /// Keep colors as written
    #[arg(long)]
    disable_simplify_colors: bool,

    /// Keep presentation properties inside style attributes
    #[arg(long)]
    disable_style_to_xml: bool,

    /// Keep groups as written
    #[arg(long)]
    disable_group_collapsing: bool,

    /// Wrap runs of elements with common attributes in groups
    #[arg(long)]
    create_groups: bool,

    /// Keep Inkscape, Sodipodi, Illustrator and Sketch data
    #[arg(long)]
    keep_editor_data: bool,

    /// Keep unreferenced elements inside <defs>
    #[arg(long)]
    keep_unreferenced_defs: bool,

    /// Work around renderer bugs (librsvg) at a small size cost
    #[arg(long, overrides_with = "no_renderer_workaround")]
    renderer_workaround: bool,

    /// Do not work around renderer bugs
    #[arg(long, overrides_with = "renderer_workaround")]
    no_renderer_workaround: bool,

    /// Omit the <?xml ...?> declaration
    #[arg(long)]
    strip_xml_prolog: bool,

    /// Remove <title> elements
    #[arg(long)]
    remove_titles: bool,

    /// Remove <desc> elements
    #[arg(long)]
    remove_descriptions: bool,

    /// Remove <metadata> elements
    #[arg(long)]
    remove_metadata: bool,

    /// Remove <title>, <desc> and <metadata> elements
    #[arg(long)]
    remove_descriptive_elements: bool,

    /// Remove comments
    #[arg(long)]
    enable_comment_stripping: bool,

    /// Keep raster images as links
    #[arg(long)]
    disable_embed_rasters: bool,

    /// Replace the root width/height with a viewBox
    #[arg(long)]
    enable_viewboxing: bool,

    /// Indentation character
    #[arg(long, value_enum, default_value_t = Indent::Space)]
    indent: Indent,

    /// Indentation units per level
    #[arg(long = "nindent", value_name = "N", default_value_t = 1)]
    indent_depth: usize,

    /// Write everything on one line
    #[arg(long)]
    no_line_breaks: bool,

    /// Remove xml:space from the root element
    #[arg(long)]
    strip_xml_space: bool,

    /// Remove unreferenced IDs
    #[arg(long)]
    enable_id_stripping: bool,

    /// Rename IDs to the shortest free names
    #[arg(long)]
    shorten_ids: bool,

    /// Prefix shortened IDs with this (implies --shorten-ids)
    #[arg(long, value_name = "PREFIX")]
    shorten_ids_prefix: Option<String>,

    /// Never touch IDs that do not end in a digit
    #[arg(long)]
    protect_ids_noninkscape: bool,

    /// Never touch these IDs (comma-separated)
    #[arg(long, value_name = "IDS", value_delimiter = ',')]
    protect_ids_list: Vec<String>,

    /// Never touch IDs starting with these prefixes (comma-separated)
    #[arg(long, value_name = "PREFIXES", value_delimiter = ',')]
    protect_ids_prefix: Vec<String>,

    /// Fail when the document uses flow text
    #[arg(long)]
    error_on_flowtext: bool,

    /// Print nothing but errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print a statistics report
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self, base_dir: Option<PathBuf>) -> Options {
        Options {
            precision: self.precision,
            control_precision: self.control_precision,
            simplify_colors: !self.disable_simplify_colors,
            style_to_xml: !self.disable_style_to_xml,
            group_collapse: !self.disable_group_collapsing,
            group_create: self.create_groups,
            keep_editor_data: self.keep_editor_data,
            keep_unreferenced_defs: self.keep_unreferenced_defs,
            renderer_workaround: self.renderer_workaround && !self.no_renderer_workaround,
            strip_xml_prolog: self.strip_xml_prolog,
            remove_titles: self.remove_titles,
            remove_descriptions: self.remove_descriptions,
            remove_metadata: self.remove_metadata,
            remove_descriptive_elements: self.remove_descriptive_elements,
            strip_comments: self.enable_comment_stripping,
            embed_rasters: !self.disable_embed_rasters,
            enable_viewboxing: self.enable_viewboxing,
            indent: self.indent,
            indent_depth: self.indent_depth,
            newlines: !self.no_line_breaks,
            strip_xml_space: self.strip_xml_space,
            strip_ids: self.enable_id_stripping,
            shorten_ids: self.shorten_ids || self.shorten_ids_prefix.is_some(),
            shorten_ids_prefix: self.shorten_ids_prefix.clone().unwrap_or_default(),
            protect_ids_noninkscape: self.protect_ids_noninkscape,
            protect_ids_list: self.protect_ids_list.clone(),
            protect_ids_prefix: self.protect_ids_prefix.clone(),
            error_on_flowtext: self.error_on_flowtext,
            base_dir,
        }
    }
}

/// Prints `Warning: ...` style lines on stderr.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let label = match record.level() {
            log::Level::Error => "Error",
            log::Level::Warn => "Warning",
            log::Level::Info => "Info",
            log::Level::Debug => "Debug",
            log::Level::Trace => "Trace",
        };
        eprintln!("{label}: {}", record.args());
    }

    fn flush(&self) {}
}

/// Path for a file argument; `-` means the standard stream.
fn file_arg(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| p.as_os_str() != "-")
}

fn is_gzip_name(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svgz") || e.eq_ignore_ascii_case("gz"))
}

fn read_input(path: Option<&Path>) -> Result<String, BurnishError> {
    let raw = match path {
        Some(p) => fs::read(p)?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    let gzipped = raw.starts_with(&[0x1f, 0x8b]) || path.is_some_and(is_gzip_name);
    let bytes = if gzipped {
        let mut out = Vec::new();
        GzDecoder::new(raw.as_slice()).read_to_end(&mut out)?;
        out
    } else {
        raw
    };
    Ok(std::str::from_utf8(&bytes)?.to_string())
}

fn write_output(path: Option<&Path>, text: &str) -> Result<usize, BurnishError> {
    let bytes = match path {
        Some(p) if is_gzip_name(p) => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
            encoder.write_all(text.as_bytes())?;
            encoder.finish()?
        }
        _ => text.as_bytes().to_vec(),
    };
    match path {
        Some(p) => fs::write(p, &bytes)?,
        None => io::stdout().write_all(&bytes)?,
    }
    Ok(bytes.len())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    log::set_logger(&LOGGER)?;
    log::set_max_level(if cli.quiet {
        log::LevelFilter::Off
    } else if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    });

    let input = file_arg(cli.input.clone().or_else(|| cli.input_flag.clone()));
    let output = file_arg(cli.output.clone().or_else(|| cli.output_flag.clone()));
    if let (Some(i), Some(o)) = (&input, &output)
        && same_file(i, o)
    {
        Cli::command()
            .error(ErrorKind::ArgumentConflict, "input and output files must not be the same")
            .exit();
    }

    let base_dir = input
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf);
    let options = cli.options(base_dir);
    if let Err(BurnishError::Config(msg)) = options.validate() {
        Cli::command().error(ErrorKind::ValueValidation, msg).exit();
    }

    let source = read_input(input.as_deref())?;
    let (optimized, stats) = minify_with_report(&source, &options)?;
    let written = write_output(output.as_deref(), &optimized)?;

    if cli.verbose {
        eprint!("{stats}");
    }
    if !cli.quiet {
        let before = source.len();
        let ratio = if before > 0 {
            written as f64 / before as f64 * 100.0
        } else {
            100.0
        };
        eprintln!(
            "{} -> {} bytes ({:.1}% of original)",
            before, written, ratio
        );
    }

    Ok(())
}
