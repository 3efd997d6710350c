use thiserror::Error;

#[derive(Debug, Error)]
pub enum BurnishError {
    #[error("XML parsing error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("Invalid attribute: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("Invalid SVG: {0}")]
    InvalidSvg(String),

    #[error("Invalid path data: {0}")]
    InvalidPath(String),

    #[error("Invalid transform: {0}")]
    InvalidTransform(String),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0} flowRoot element(s) found; flowed text is an SVG 1.2 draft feature most renderers ignore")]
    FlowText(usize),
}
