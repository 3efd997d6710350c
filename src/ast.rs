//! XML tree the optimizer mutates in place.
//!
//! Nodes are owned by their parent's child list. Passes that need to refer to
//! an element from elsewhere (the reference graph, mostly) use a [`NodePath`],
//! the chain of child indices from the root element.


use crate::names::{SVG_NS, XLINK_NS, XML_NS, XMLNS_NS};

/// Position of an element: child indices walked from the root element.
pub type NodePath = Vec<usize>;

/// A complete SVG document.
#[derive(Debug, Clone)]
pub struct Document {
    /// XML declaration (e.g., `<?xml version="1.0" encoding="UTF-8"?>`)
    pub xml_declaration: Option<XmlDeclaration>,
    /// Doctype, comments and processing instructions before the root
    pub prolog: Vec<Node>,
    /// The root SVG element
    pub root: Element,
    /// Comments and processing instructions after the root
    pub epilog: Vec<Node>,
}

/// XML declaration attributes.
#[derive(Debug, Clone)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

/// An SVG/XML element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Element name with optional prefix (e.g., "svg", "svg:rect")
    pub name: QName,
    /// Namespace URI the prefix resolved to when parsed
    pub ns: Option<String>,
    /// Attributes on this element
    pub attributes: Vec<Attribute>,
    /// Child nodes
    pub children: Vec<Node>,
}

/// A qualified name (possibly with namespace prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace prefix (e.g., "svg", "xlink")
    pub prefix: Option<String>,
    /// Local name (e.g., "rect", "href")
    pub local: String,
}

impl QName {
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local: local.into(),
        }
    }

    /// Parse a qualified name from a string like "prefix:local" or just "local".
    pub fn parse(s: &str) -> Self {
        if let Some((prefix, local)) = s.split_once(':') {
            Self::with_prefix(prefix, local)
        } else {
            Self::new(s)
        }
    }

    /// Check if this is a namespace declaration (xmlns or xmlns:prefix).
    pub fn is_xmlns(&self) -> bool {
        self.prefix.as_deref() == Some("xmlns") || (self.prefix.is_none() && self.local == "xmlns")
    }

    /// Compare against a name written as "prefix:local" or "local".
    pub fn matches(&self, name: &str) -> bool {
        match (&self.prefix, name.split_once(':')) {
            (Some(p), Some((np, nl))) => p == np && self.local == nl,
            (None, None) => self.local == name,
            _ => false,
        }
    }

    /// Get the full name as a string.
    pub fn full_name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.local),
            None => self.local.clone(),
        }
    }
}

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: QName,
    /// Namespace URI; unprefixed attributes have none
    pub ns: Option<String>,
    pub value: String,
}

impl Attribute {
    /// An unprefixed attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: QName::new(name),
            ns: None,
            value: value.into(),
        }
    }
}

/// A node in the SVG tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An element node
    Element(Element),
    /// A text node
    Text(String),
    /// A comment node
    Comment(String),
    /// A CDATA section
    CData(String),
    /// A doctype declaration (only found in the document prolog)
    DocType(String),
    /// A processing instruction (e.g., `<?xml-stylesheet ... ?>`)
    ProcessingInstruction { target: String, content: Option<String> },
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Text nodes made only of whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.chars().all(char::is_whitespace))
    }
}

impl Element {
    /// An unprefixed element in the SVG namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: QName::new(name),
            ns: Some(SVG_NS.to_string()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Get an attribute value by qualified name ("fill", "xlink:href").
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.matches(name))
            .map(|a| a.value.as_str())
    }

    /// Attribute value, or the empty string when unset.
    pub fn attr_or_empty(&self, name: &str) -> &str {
        self.get_attr(name).unwrap_or("")
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name.matches(name))
    }

    /// Set an attribute value, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        if let Some(attr) = self.attributes.iter_mut().find(|a| a.name.matches(name)) {
            attr.value = value.into();
        } else {
            let qname = QName::parse(name);
            let ns = match qname.prefix.as_deref() {
                Some("xlink") => Some(XLINK_NS.to_string()),
                Some("xml") => Some(XML_NS.to_string()),
                Some("xmlns") => Some(XMLNS_NS.to_string()),
                _ if qname.is_xmlns() => Some(XMLNS_NS.to_string()),
                _ => None,
            };
            self.attributes.push(Attribute {
                name: qname,
                ns,
                value: value.into(),
            });
        }
    }

    /// Remove an attribute by qualified name. Returns true if it existed.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| !a.name.matches(name));
        before != self.attributes.len()
    }

    /// Check if this element has a specific unprefixed name.
    pub fn is(&self, name: &str) -> bool {
        self.name.prefix.is_none() && self.name.local == name
    }

    /// Unprefixed element in the SVG namespace.
    pub fn is_svg(&self, name: &str) -> bool {
        self.is(name) && self.ns.as_deref() == Some(SVG_NS)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attr("id").filter(|id| !id.is_empty())
    }

    /// The link target, from `xlink:href` or a plain `href`.
    pub fn href(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local == "href" && (a.ns.as_deref() == Some(XLINK_NS) || a.name.prefix.is_none()))
            .map(|a| a.value.as_str())
    }

    /// Name of the attribute `href()` read, so it can be rewritten in place.
    pub fn href_attr_name(&self) -> Option<String> {
        self.attributes
            .iter()
            .find(|a| a.name.local == "href" && (a.ns.as_deref() == Some(XLINK_NS) || a.name.prefix.is_none()))
            .map(|a| a.name.full_name())
    }

    /// Iterate over child elements only (skip text, comments, etc.).
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Iterate over child elements mutably.
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// Concatenated text and CDATA content of the direct children.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) | Node::CData(t) => out.push_str(t),
                _ => {}
            }
        }
        out
    }

    /// Follow a [`NodePath`] down from this element.
    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        let mut cur = self;
        for &i in path {
            cur = cur.children.get(i)?.as_element()?;
        }
        Some(cur)
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut cur = self;
        for &i in path {
            cur = cur.children.get_mut(i)?.as_element_mut()?;
        }
        Some(cur)
    }

    /// Detach the node at `path`. The empty path (this element) cannot be removed.
    pub fn remove_at(&mut self, path: &[usize]) -> Option<Node> {
        let (&last, parent) = path.split_last()?;
        let parent = self.element_at_mut(parent)?;
        if last < parent.children.len() {
            Some(parent.children.remove(last))
        } else {
            None
        }
    }

    /// Visit this element and all descendants in document order with their paths.
    pub fn walk(&self, f: &mut impl FnMut(&[usize], &Element)) {
        fn visit(elem: &Element, path: &mut NodePath, f: &mut impl FnMut(&[usize], &Element)) {
            f(path, elem);
            for (i, child) in elem.children.iter().enumerate() {
                if let Node::Element(e) = child {
                    path.push(i);
                    visit(e, path, f);
                    path.pop();
                }
            }
        }
        visit(self, &mut Vec::new(), f);
    }

    /// Visit this element and all descendants mutably, parents before children.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in self.child_elements_mut() {
            child.walk_mut(f);
        }
    }

    /// Paths (relative to this element) of descendants with an unprefixed name.
    pub fn paths_named(&self, name: &str) -> Vec<NodePath> {
        let mut out = Vec::new();
        self.walk(&mut |path, e| {
            if !path.is_empty() && e.is(name) {
                out.push(path.to_vec());
            }
        });
        out
    }
}

/// Remove the nodes at `paths`, deepest-last-first so earlier paths stay valid.
pub fn remove_paths(root: &mut Element, mut paths: Vec<NodePath>) -> usize {
    paths.sort();
    paths.dedup();
    // descendants sort right after their ancestor; removing the ancestor covers them
    let mut outermost: Vec<NodePath> = Vec::new();
    for path in paths {
        if outermost.last().is_some_and(|a| path.starts_with(a)) {
            continue;
        }
        outermost.push(path);
    }
    outermost
        .iter()
        .rev()
        .filter(|path| root.remove_at(path).is_some())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Element {
        let mut root = Element::new("svg");
        let mut g = Element::new("g");
        g.children.push(Node::Element(Element::new("rect")));
        g.children.push(Node::Text(" ".into()));
        g.children.push(Node::Element(Element::new("circle")));
        root.children.push(Node::Text("\n".into()));
        root.children.push(Node::Element(g));
        root
    }

    #[test]
    fn test_qname_matches() {
        assert!(QName::parse("xlink:href").matches("xlink:href"));
        assert!(!QName::parse("xlink:href").matches("href"));
        assert!(QName::new("href").matches("href"));
    }

    #[test]
    fn test_element_at_and_walk() {
        let root = tree();
        assert!(root.element_at(&[1, 2]).unwrap().is("circle"));
        assert!(root.element_at(&[0]).is_none());

        let mut seen = Vec::new();
        root.walk(&mut |path, e| seen.push((path.to_vec(), e.name.local.clone())));
        assert_eq!(seen[0], (vec![], "svg".to_string()));
        assert_eq!(seen[2], (vec![1, 0], "rect".to_string()));
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_remove_paths_keeps_indices_valid() {
        let mut root = tree();
        let removed = remove_paths(&mut root, vec![vec![1, 0], vec![1, 2]]);
        assert_eq!(removed, 2);
        let g = root.element_at(&[1]).unwrap();
        assert_eq!(g.child_elements().count(), 0);
    }

    #[test]
    fn test_set_attr_resolves_known_prefixes() {
        let mut e = Element::new("use");
        e.set_attr("xlink:href", "#a");
        assert_eq!(e.attributes[0].ns.as_deref(), Some(XLINK_NS));
        assert_eq!(e.href(), Some("#a"));
        assert_eq!(e.href_attr_name().as_deref(), Some("xlink:href"));
    }
}
