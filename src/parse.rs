//! SVG parsing from XML.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};

use crate::ast::*;
use crate::error::BurnishError;
use crate::names::{XML_NS, XMLNS_NS};

/// Entities declared in the internal DTD subset. Illustrator uses these for
/// namespace URIs.
type Entities = HashMap<String, String>;

/// Prefix bindings in effect, innermost element last.
#[derive(Default)]
struct Scopes(Vec<Vec<(Option<String>, String)>>);

impl Scopes {
    fn resolve(&self, prefix: Option<&str>) -> Option<String> {
        match prefix {
            Some("xml") => return Some(XML_NS.to_string()),
            Some("xmlns") => return Some(XMLNS_NS.to_string()),
            _ => {}
        }
        self.0
            .iter()
            .rev()
            .flatten()
            .find(|(p, _)| p.as_deref() == prefix)
            .map(|(_, uri)| uri.clone())
            .filter(|uri| !uri.is_empty())
    }
}

struct Parser<'a> {
    reader: Reader<&'a [u8]>,
    entities: Entities,
    scopes: Scopes,
}

/// Parse an SVG string into a Document.
pub fn parse_svg(svg: &str) -> Result<Document, BurnishError> {
    let svg = svg.strip_prefix('\u{feff}').unwrap_or(svg);
    let mut parser = Parser {
        reader: Reader::from_str(svg),
        entities: Entities::new(),
        scopes: Scopes::default(),
    };

    let mut xml_declaration = None;
    let mut prolog = Vec::new();
    let mut root = None;
    let mut epilog = Vec::new();

    loop {
        let event = parser.reader.read_event()?;
        let misc = if root.is_none() { &mut prolog } else { &mut epilog };
        match event {
            Event::Decl(decl) => {
                xml_declaration = Some(XmlDeclaration {
                    version: String::from_utf8_lossy(decl.version()?.as_ref()).into_owned(),
                    encoding: decl
                        .encoding()
                        .transpose()
                        .ok()
                        .flatten()
                        .map(|e| String::from_utf8_lossy(e.as_ref()).into_owned()),
                    standalone: decl.standalone().transpose().ok().flatten().map(|s| s.as_ref() == b"yes"),
                });
            }
            Event::DocType(dt) => {
                let text = String::from_utf8_lossy(&dt).into_owned();
                parser.entities = doctype_entities(&text);
                misc.push(Node::DocType(text));
            }
            Event::Start(start) if root.is_none() => {
                root = Some(parser.element(&start, false)?);
            }
            Event::Empty(start) if root.is_none() => {
                root = Some(parser.element(&start, true)?);
            }
            Event::Start(_) | Event::Empty(_) => {
                return Err(BurnishError::InvalidSvg("more than one root element".into()));
            }
            Event::Comment(comment) => misc.push(Node::Comment(String::from_utf8_lossy(&comment).into_owned())),
            Event::PI(pi) => misc.push(processing_instruction(&pi)),
            Event::Eof => break,
            _ => {}
        }
    }

    let root = root.ok_or_else(|| BurnishError::InvalidSvg("no root element found".into()))?;

    Ok(Document {
        xml_declaration,
        prolog,
        root,
        epilog,
    })
}

impl Parser<'_> {
    fn element(&mut self, start: &BytesStart, empty: bool) -> Result<Element, BurnishError> {
        let mut element = self.element_start(start)?;
        if !empty {
            self.children(&mut element)?;
        }
        self.scopes.0.pop();
        Ok(element)
    }

    fn children(&mut self, element: &mut Element) -> Result<(), BurnishError> {
        loop {
            match self.reader.read_event()? {
                Event::Start(start) => {
                    let child = self.element(&start, false)?;
                    element.children.push(Node::Element(child));
                }
                Event::Empty(start) => {
                    let child = self.element(&start, true)?;
                    element.children.push(Node::Element(child));
                }
                Event::End(_) => return Ok(()),
                Event::Text(text) => {
                    let entities = &self.entities;
                    let text =
                        text.unescape_with(|name| entities.get(name).map(String::as_str).or_else(|| resolve_predefined_entity(name)))?;
                    match element.children.last_mut() {
                        Some(Node::Text(prev)) => prev.push_str(&text),
                        _ => element.children.push(Node::Text(text.into_owned())),
                    }
                }
                Event::Comment(comment) => {
                    element
                        .children
                        .push(Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
                }
                Event::CData(cdata) => {
                    element
                        .children
                        .push(Node::CData(String::from_utf8_lossy(&cdata).into_owned()));
                }
                Event::PI(pi) => element.children.push(processing_instruction(&pi)),
                Event::Eof => {
                    return Err(BurnishError::InvalidSvg(format!(
                        "unexpected end of file inside <{}>",
                        element.name.full_name()
                    )));
                }
                _ => {}
            }
        }
    }

    /// Read the tag, pushing a namespace scope the caller must pop.
    fn element_start(&mut self, start: &BytesStart) -> Result<Element, BurnishError> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_string();

        let mut attributes = Vec::new();
        let mut bindings = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let entities = &self.entities;
            let value = attr
                .unescape_value_with(|name| entities.get(name).map(String::as_str).or_else(|| resolve_predefined_entity(name)))?
                .into_owned();
            let qname = QName::parse(key);
            if qname.is_xmlns() {
                let prefix = qname.prefix.as_ref().map(|_| qname.local.clone());
                bindings.push((prefix, value.clone()));
            }
            attributes.push((qname, value));
        }
        self.scopes.0.push(bindings);

        let qname = QName::parse(&name);
        let ns = self.scopes.resolve(qname.prefix.as_deref());
        let attributes = attributes
            .into_iter()
            .map(|(name, value)| {
                let ns = if name.is_xmlns() {
                    Some(XMLNS_NS.to_string())
                } else {
                    name.prefix.as_deref().and_then(|p| self.scopes.resolve(Some(p)))
                };
                Attribute { name, ns, value }
            })
            .collect();

        Ok(Element {
            name: qname,
            ns,
            attributes,
            children: Vec::new(),
        })
    }
}

fn processing_instruction(pi: &[u8]) -> Node {
    let content = String::from_utf8_lossy(pi).into_owned();
    let (target, rest) = content
        .split_once(char::is_whitespace)
        .map(|(t, r)| (t.to_string(), Some(r.trim().to_string())))
        .unwrap_or_else(|| (content, None));
    Node::ProcessingInstruction { target, content: rest }
}

/// `<!ENTITY name "value">` declarations, general entities only.
fn doctype_entities(doctype: &str) -> Entities {
    let mut entities = Entities::new();
    let mut rest = doctype;
    while let Some(at) = rest.find("<!ENTITY") {
        rest = &rest[at + "<!ENTITY".len()..];
        let decl = rest.trim_start();
        if decl.starts_with('%') {
            continue;
        }
        let name_end = decl.find(char::is_whitespace).unwrap_or(decl.len());
        let (name, after) = decl.split_at(name_end);
        let after = after.trim_start();
        let Some(quote) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        if let Some(end) = after[1..].find(quote) {
            entities.insert(name.to_string(), after[1..1 + end].to_string());
        }
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{SVG_NS, XLINK_NS};

    #[test]
    fn test_parse_simple_svg() {
        let svg = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
    <rect x="10" y="10" width="80" height="80" fill="red"/>
</svg>"#;

        let doc = parse_svg(svg).unwrap();
        let decl = doc.xml_declaration.unwrap();
        assert_eq!(decl.standalone, Some(true));
        assert!(doc.root.is_svg("svg"));
        assert_eq!(doc.root.get_attr("width"), Some("100"));
        assert!(doc.root.element_at(&[1]).unwrap().is_svg("rect"));
    }

    #[test]
    fn test_whitespace_and_comments_kept() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
    <!-- This is a comment -->
    <rect/>
</svg>"#;

        let doc = parse_svg(svg).unwrap();
        assert_eq!(doc.root.children.len(), 5);
        assert!(matches!(doc.root.children[1], Node::Comment(ref c) if c == " This is a comment "));
        assert!(doc.root.children[0].is_blank_text());
    }

    #[test]
    fn test_prolog_and_epilog() {
        let svg = "\u{feff}<!DOCTYPE svg><!--before--><svg xmlns=\"http://www.w3.org/2000/svg\"/><!--after-->";
        let doc = parse_svg(svg).unwrap();
        assert_eq!(doc.prolog.len(), 2);
        assert!(matches!(doc.prolog[0], Node::DocType(_)));
        assert_eq!(doc.epilog, vec![Node::Comment("after".into())]);
    }

    #[test]
    fn test_namespaces_resolved() {
        let svg = r##"<svg:svg xmlns:svg="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
    <svg:use xlink:href="#foo" xml:space="preserve"/>
    <g xmlns="urn:other"/>
</svg:svg>"##;

        let doc = parse_svg(svg).unwrap();
        assert_eq!(doc.root.ns.as_deref(), Some(SVG_NS));
        let use_elem = doc.root.element_at(&[1]).unwrap();
        assert_eq!(use_elem.ns.as_deref(), Some(SVG_NS));
        assert_eq!(use_elem.attributes[0].ns.as_deref(), Some(XLINK_NS));
        assert_eq!(use_elem.attributes[1].ns.as_deref(), Some(XML_NS));
        assert_eq!(use_elem.href(), Some("#foo"));
        let g = doc.root.element_at(&[3]).unwrap();
        assert_eq!(g.ns.as_deref(), Some("urn:other"));
        assert!(!g.is_svg("g"));
    }

    #[test]
    fn test_doctype_entities() {
        let svg = r#"<!DOCTYPE svg [
<!ENTITY ns_svg "http://www.w3.org/2000/svg">
<!ENTITY ns_ai 'http://ns.adobe.com/AdobeIllustrator/10.0/'>
]><svg xmlns="&ns_svg;" xmlns:i="&ns_ai;"><text>a &amp; b</text></svg>"#;
        let doc = parse_svg(svg).unwrap();
        assert_eq!(doc.root.ns.as_deref(), Some(SVG_NS));
        assert_eq!(doc.root.get_attr("xmlns:i"), Some("http://ns.adobe.com/AdobeIllustrator/10.0/"));
        assert_eq!(doc.root.element_at(&[0]).unwrap().text_content(), "a & b");
    }

    #[test]
    fn test_errors() {
        assert!(parse_svg("").is_err());
        assert!(parse_svg("<svg><g></svg>").is_err());
        assert!(parse_svg("<svg>").is_err());
    }
}
