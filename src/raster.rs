//! Inlining linked PNG, JPEG and GIF images as `data:` URIs.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::prelude::BASE64_STANDARD;

use crate::ast::Element;
use crate::stats::Statistics;

type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// MIME subtype for a raster link, judged by its extension.
fn mime_subtype(href: &str) -> Option<&'static str> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let (_, ext) = name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("png"),
        "jpg" | "jpeg" => Some("jpeg"),
        "gif" => Some("gif"),
        _ => None,
    }
}

/// Local path a non-http link points at. Relative paths are taken from
/// `base_dir`.
fn local_path(href: &str, base_dir: Option<&Path>) -> PathBuf {
    let fixed = href.replace('\\', "/");
    let path = match fixed.strip_prefix("file:") {
        Some(rest) if rest.starts_with('/') => format!("/{}", rest.trim_start_matches('/')),
        Some(rest) => rest.to_string(),
        None => fixed,
    };
    let path = PathBuf::from(path);
    match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path,
    }
}

#[cfg(feature = "remote-rasters")]
fn fetch(url: &str) -> Result<Vec<u8>, FetchError> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    Ok(response.bytes()?.to_vec())
}

#[cfg(not(feature = "remote-rasters"))]
fn fetch(url: &str) -> Result<Vec<u8>, FetchError> {
    Err(format!("cannot fetch {url}: built without remote raster support").into())
}

fn load(href: &str, base_dir: Option<&Path>) -> Result<Vec<u8>, FetchError> {
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        fetch(href)
    } else {
        Ok(std::fs::read(local_path(href, base_dir))?)
    }
}

/// Replace the link of every raster `<image>` with its base64 contents.
/// Links that cannot be read are left alone with a warning.
pub fn embed_rasters(root: &mut Element, base_dir: Option<&Path>, stats: &mut Statistics) -> usize {
    let mut num = 0;
    root.walk_mut(&mut |e| {
        if !e.is("image") {
            return;
        }
        let (Some(attr), Some(href)) = (e.href_attr_name(), e.href().map(str::to_owned)) else {
            return;
        };
        if href.len() < 2 || href.starts_with("data:") {
            return;
        }
        let Some(subtype) = mime_subtype(&href) else {
            return;
        };
        match load(&href, base_dir) {
            Ok(data) if !data.is_empty() => {
                let encoded = BASE64_STANDARD.encode(&data);
                e.set_attr(&attr, format!("data:image/{subtype};base64,{encoded}"));
                num += 1;
            }
            Ok(_) => log::warn!("raster image '{href}' is empty, keeping the reference"),
            Err(err) => log::warn!("could not embed raster image '{href}', keeping the reference: {err}"),
        }
    });
    stats.rasters_embedded += num;
    num
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_subtype() {
        assert_eq!(mime_subtype("a/b/photo.JPG"), Some("jpeg"));
        assert_eq!(mime_subtype("icon.png?v=2"), Some("png"));
        assert_eq!(mime_subtype("anim.gif"), Some("gif"));
        assert_eq!(mime_subtype("vector.svg"), None);
        assert_eq!(mime_subtype("noext"), None);
    }

    #[test]
    fn test_local_path() {
        let base = Path::new("/in");
        assert_eq!(local_path("img.png", Some(base)), PathBuf::from("/in/img.png"));
        assert_eq!(local_path("file:img.png", Some(base)), PathBuf::from("/in/img.png"));
        assert_eq!(local_path("file:///abs/img.png", Some(base)), PathBuf::from("/abs/img.png"));
        assert_eq!(local_path("sub\\img.png", None), PathBuf::from("sub/img.png"));
    }

    #[test]
    fn test_embed_local_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dot.png"), b"\x89PNG").unwrap();

        let mut root = Element::new("svg");
        let mut image = Element::new("image");
        image.set_attr("xlink:href", "dot.png");
        let mut missing = Element::new("image");
        missing.set_attr("xlink:href", "missing.png");
        root.children.push(crate::ast::Node::Element(image));
        root.children.push(crate::ast::Node::Element(missing));

        let mut stats = Statistics::default();
        assert_eq!(embed_rasters(&mut root, Some(dir.path()), &mut stats), 1);
        assert_eq!(
            root.element_at(&[0]).unwrap().href(),
            Some("data:image/png;base64,iVBORw==")
        );
        assert_eq!(root.element_at(&[1]).unwrap().href(), Some("missing.png"));
        assert_eq!(stats.rasters_embedded, 1);
    }
}
