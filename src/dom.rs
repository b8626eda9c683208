//! Mutable document model used as the capture target.
//!
//! HTML is parsed with `scraper` and copied into an arena of nodes with
//! stable `NodeId`s. Unlike the parsed `scraper::Html` tree the arena can be
//! mutated in place: inline styles edited, elements created, appended and
//! removed. Removed nodes stay in the arena but are no longer reachable from
//! the root.

use crate::style::InlineStyle;
use scraper::{ElementRef, Html};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Handle to a node inside a `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub tag: String,
    /// Attributes other than `style`, in source order
    attrs: Vec<(String, String)>,
    pub style: InlineStyle,
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Parse a full HTML document. The root is the `<html>` element.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        Self::from_scraper(&parsed)
    }

    /// Parse a fragment. The root is a synthetic `<html>` element whose
    /// children are the fragment's top-level nodes.
    pub fn parse_fragment(html: &str) -> Self {
        let parsed = Html::parse_fragment(html);
        Self::from_scraper(&parsed)
    }

    fn from_scraper(parsed: &Html) -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        let root_el = parsed.root_element();
        let root = doc.import_element(root_el);
        doc.root = root;
        doc.import_children(root, root_el);
        doc
    }

    fn import_element(&mut self, el: ElementRef<'_>) -> NodeId {
        let value = el.value();
        let id = self.create_element(value.name());
        for (name, val) in value.attrs() {
            self.set_attr(id, name, val);
        }
        id
    }

    fn import_children(&mut self, parent: NodeId, source: ElementRef<'_>) {
        for child in source.children() {
            match child.value() {
                scraper::Node::Text(t) => {
                    let id = self.create_text(&t.text);
                    self.append_child(parent, id);
                }
                scraper::Node::Element(_) => {
                    if let Some(el) = ElementRef::wrap(child) {
                        let id = self.import_element(el);
                        self.append_child(parent, id);
                        self.import_children(id, el);
                    }
                }
                // comments, doctypes and processing instructions are dropped
                _ => {}
            }
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            style: InlineStyle::new(),
        }))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    pub fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0].data
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(node.0)?.data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    /// Attribute value. `style` is not an attribute here; use `style()`.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute. Setting `style` replaces the inline style.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(el) = self.element_mut(node) else {
            return;
        };
        let name = name.to_ascii_lowercase();
        if name == "style" {
            el.style.set_css_text(value);
            return;
        }
        match el.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => el.attrs.push((name, value.to_string())),
        }
    }

    pub fn style(&self, node: NodeId) -> Option<&InlineStyle> {
        self.element(node).map(|e| &e.style)
    }

    pub fn style_mut(&mut self, node: NodeId) -> Option<&mut InlineStyle> {
        self.element_mut(node).map(|e| &mut e.style)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Append `child` to `parent`, detaching it from any previous parent
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.remove(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Detach `node` from its parent. Returns false if it had none.
    pub fn remove(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) else {
            return false;
        };
        self.nodes[parent.0].children.retain(|c| *c != node);
        self.nodes[node.0].parent = None;
        true
    }

    /// Whether `node` is reachable from the root
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == self.root {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    /// Replace the children of `node` with the parsed fragment
    pub fn set_inner_html(&mut self, node: NodeId, html: &str) {
        for child in self.children(node).to_vec() {
            self.remove(child);
        }
        let fragment = Html::parse_fragment(html);
        self.import_children(node, fragment.root_element());
    }

    /// Descendants of `node` in document order, excluding `node` itself
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev());
        }
        out
    }

    /// Descendant elements of `node` with the given tag name
    pub fn elements_by_tag(&self, node: NodeId, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.descendants(node)
            .into_iter()
            .filter(|n| self.tag(*n) == Some(tag.as_str()))
            .collect()
    }

    /// First connected element whose `id` attribute equals `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|n| self.attr(*n, "id") == Some(id))
    }

    pub fn text_content(&self, node: NodeId) -> String {
        match self.data(node) {
            NodeData::Text(t) => t.clone(),
            NodeData::Element(_) => self
                .descendants(node)
                .into_iter()
                .filter_map(|n| match self.data(n) {
                    NodeData::Text(t) => Some(t.as_str()),
                    NodeData::Element(_) => None,
                })
                .collect(),
        }
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, false, &mut out);
        out
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        let raw = matches!(self.tag(node), Some("script") | Some("style"));
        let mut out = String::new();
        for child in self.children(node) {
            self.write_node(*child, raw, &mut out);
        }
        out
    }

    fn write_node(&self, node: NodeId, raw_text: bool, out: &mut String) {
        match self.data(node) {
            NodeData::Text(t) if raw_text => out.push_str(t),
            NodeData::Text(t) => out.push_str(&escape_text(t)),
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
                }
                if !el.style.is_empty() {
                    out.push_str(&format!(" style=\"{}\"", escape_attr(&el.style.css_text())));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                    return;
                }
                out.push_str(&self.inner_html(node));
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}
