//! HTML serialization of the live tree.

use super::document::{self, Document, NodeKind};
use super::node::Node;
use super::traits::ElementTraits;

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

fn write_node(doc: &Document, node: Node, out: &mut String) {
    let Some(data) = doc.get(node) else { return };
    match &data.kind {
        NodeKind::Text => escape_text(&data.data, out),
        NodeKind::Fragment => write_children(doc, node, out),
        NodeKind::Element(tag) => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in &data.attributes {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    escape_attribute(value, out);
                    out.push('"');
                }
            }
            out.push('>');
            if data.traits.contains(ElementTraits::VOID) {
                return;
            }
            write_children(doc, node, out);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn write_children(doc: &Document, node: Node, out: &mut String) {
    if let Some(data) = doc.get(node) {
        for child in &data.children {
            write_node(doc, *child, out);
        }
    }
}

impl Node {
    /// Markup for this node and its subtree.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        document::with(|doc| write_node(doc, *self, &mut out));
        out
    }

    /// Markup for this node's children.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        document::with(|doc| write_children(doc, *self, &mut out));
        out
    }
}
