//! Pretty-printing the optimized tree back to SVG text.

use crate::Options;
use crate::ast::*;
use crate::names::{TEXT_CONTENT_ELEMENTS, attribute_rank};

/// Serialize a Document, prolog and surrounding nodes included.
pub fn serialize(doc: &Document, options: &Options) -> String {
    let mut out = String::new();

    if !options.strip_xml_prolog {
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"");
        if doc.xml_declaration.as_ref().and_then(|d| d.standalone) == Some(true) {
            out.push_str(" standalone=\"yes\"");
        }
        out.push_str("?>\n");
    }

    for node in &doc.prolog {
        push_misc(&mut out, node);
        out.push('\n');
    }
    let mut writer = Writer::new(options);
    writer.element(&mut out, &doc.root, 0, false);
    out.push('\n');
    for node in &doc.epilog {
        push_misc(&mut out, node);
        out.push('\n');
    }
    out
}

/// Nodes outside the root element.
fn push_misc(out: &mut String, node: &Node) {
    match node {
        Node::DocType(text) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(text.trim());
            out.push('>');
        }
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::ProcessingInstruction { target, content } => push_pi(out, target, content.as_deref()),
        Node::Element(_) | Node::Text(_) | Node::CData(_) => {}
    }
}

fn push_pi(out: &mut String, target: &str, content: Option<&str>) {
    out.push_str("<?");
    out.push_str(target);
    if let Some(c) = content {
        out.push(' ');
        out.push_str(c);
    }
    out.push_str("?>");
}

struct Writer {
    indent: String,
    newline: &'static str,
}

impl Writer {
    fn new(options: &Options) -> Self {
        if !options.newlines {
            return Self {
                indent: String::new(),
                newline: "",
            };
        }
        Self {
            indent: options.indent.as_str().repeat(options.indent_depth),
            newline: "\n",
        }
    }

    fn element(&mut self, out: &mut String, elem: &Element, depth: usize, mut preserve: bool) {
        let tag = elem.name.full_name();
        out.push_str(&self.indent.repeat(depth));
        out.push('<');
        out.push_str(&tag);

        let mut attrs: Vec<&Attribute> = elem.attributes.iter().collect();
        attrs.sort_by_cached_key(|a| {
            let name = a.name.full_name();
            (attribute_rank(&name), name)
        });
        for attr in attrs {
            let value = if attr.name.matches("style") {
                let mut decls: Vec<&str> = attr.value.split(';').collect();
                decls.sort_unstable();
                decls.join(";")
            } else {
                attr.value.clone()
            };
            out.push(' ');
            out.push_str(&attr.name.full_name());
            out.push('=');
            push_quoted(out, &value);

            if attr.name.matches("xml:space") {
                match attr.value.as_str() {
                    "preserve" => preserve = true,
                    "default" => preserve = false,
                    _ => {}
                }
            }
        }

        let is_text_content =
            elem.name.prefix.is_none() && TEXT_CONTENT_ELEMENTS.contains(&elem.name.local.as_str());
        let inline = preserve || is_text_content;
        let last = elem.children.len().saturating_sub(1);

        let mut inner = String::new();
        let mut on_new_line = false;
        for (i, child) in elem.children.iter().enumerate() {
            match child {
                Node::Element(e) if inline => self.element(&mut inner, e, 0, preserve),
                Node::Element(e) => {
                    inner.push_str(self.newline);
                    self.element(&mut inner, e, depth + 1, preserve);
                    on_new_line = true;
                }
                Node::Text(text) => {
                    let text = if preserve {
                        text.clone()
                    } else if is_text_content {
                        collapse_text(text, i == 0, i == last)
                    } else {
                        text.trim().to_string()
                    };
                    push_escaped(&mut inner, &text, None);
                }
                Node::CData(data) => {
                    inner.push_str("<![CDATA[");
                    inner.push_str(data);
                    inner.push_str("]]>");
                }
                Node::Comment(text) => {
                    inner.push_str(self.newline);
                    inner.push_str(&self.indent.repeat(depth + 1));
                    inner.push_str("<!--");
                    inner.push_str(text);
                    inner.push_str("-->");
                    on_new_line = true;
                }
                Node::ProcessingInstruction { target, content } => {
                    inner.push_str(self.newline);
                    inner.push_str(&self.indent.repeat(depth + 1));
                    push_pi(&mut inner, target, content.as_deref());
                    on_new_line = true;
                }
                Node::DocType(_) => {}
            }
        }

        if inner.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        out.push_str(&inner);
        if on_new_line {
            out.push_str(self.newline);
            out.push_str(&self.indent.repeat(depth));
        }
        out.push_str("</");
        out.push_str(&tag);
        out.push('>');
    }
}

/// Whitespace handling for character data in text content elements.
fn collapse_text(text: &str, first: bool, last: bool) -> String {
    let mut s: String = text
        .chars()
        .filter(|c| *c != '\n')
        .map(|c| if c == '\t' { ' ' } else { c })
        .collect();
    if first {
        s = s.trim_start().to_string();
    }
    if last {
        s = s.trim_end().to_string();
    }
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == ' ' && out.ends_with(' ') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Quote with whichever of `"` and `'` needs less escaping.
fn push_quoted(out: &mut String, value: &str) {
    let double = value.matches('"').count();
    let quote = if double == 0 || double <= value.matches('\'').count() {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    push_escaped(out, value, Some(quote));
    out.push(quote);
}

fn push_escaped(out: &mut String, s: &str, quote: Option<char>) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quote == Some('"') => out.push_str("&quot;"),
            '\'' if quote == Some('\'') => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}
