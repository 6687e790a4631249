//! dom.rs - Owned arena DOM used by the cleanup passes.
//!
//! Rendered HTML is parsed with `html5ever` into an `RcDom` and then grafted into a
//! flat arena of [`Node`]s addressed by [`NodeId`]. Every cleanup pass is a plain walk
//! over this arena and serialization is a pure function of it, so nothing depends on
//! a host DOM implementation.
//!
//! License: MIT OR APACHE 2.0

use html5ever::tendril::TendrilSink;
use html5ever::{local_name, namespace_url, ns, parse_fragment, ParseOpts, QualName};
use log::debug;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// Elements serialized without an end tag (and without their children).
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img",
    "input", "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text children are serialized verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

/// Index of a node inside a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// An element: lower-case tag name plus attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_ascii_lowercase(), attrs: Vec::new() }
    }

    /// Tag names compare ASCII case-insensitively, like HTML documents do.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Sets an attribute, keeping its position when it already exists.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)) {
            Some(existing) => existing.value = value.to_string(),
            None => self.attrs.push(Attribute { name: name.to_string(), value: value.to_string() }),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.name.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(pos).value)
    }

    /// Class tokens in source order.
    pub fn class_tokens(&self) -> Vec<&str> {
        self.attr("class")
            .map(|c| c.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The root of a parsed fragment or scratch container.
    Fragment,
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An arena-backed HTML fragment. Node 0 is always the fragment root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty fragment (a fresh scratch container).
    pub fn new() -> Self {
        Self {
            nodes: vec![Node { data: NodeData::Fragment, parent: None, children: Vec::new() }],
        }
    }

    /// Parses an HTML fragment in a `<body>` context.
    pub fn parse_fragment(html: &str) -> Self {
        let mut doc = Self::new();
        let root = doc.root();
        doc.append_html(root, html);
        doc
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match &mut self.nodes[id.0].data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Adds a detached node to the arena.
    pub fn create_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { data, parent: None, children: Vec::new() });
        id
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Parses `html` and appends the resulting nodes under `parent`.
    /// Returns the number of top-level nodes appended.
    pub fn append_html(&mut self, parent: NodeId, html: &str) -> usize {
        let dom = parse_fragment(
            RcDom::default(),
            ParseOpts::default(),
            QualName::new(None, ns!(html), local_name!("body")),
            Vec::new(),
        )
        .one(html);

        let before = self.children(parent).len();
        // Fragment parsing wraps the parsed nodes in a synthetic <html> element.
        let wrapper = dom.document.children.borrow().first().cloned();
        if let Some(wrapper) = wrapper {
            self.graft(parent, &wrapper);
        }
        let appended = self.children(parent).len() - before;
        debug!("Appended {} top-level node(s) from {} bytes of HTML.", appended, html.len());
        appended
    }

    fn graft(&mut self, parent: NodeId, handle: &Handle) {
        for child in handle.children.borrow().iter() {
            let data = match child.data {
                RcNodeData::Element { ref name, ref attrs, .. } => {
                    let attrs = attrs
                        .borrow()
                        .iter()
                        .map(|a| Attribute {
                            name: match a.name.prefix {
                                Some(ref prefix) => format!("{}:{}", prefix, a.name.local),
                                None => a.name.local.to_string(),
                            },
                            value: a.value.to_string(),
                        })
                        .collect();
                    NodeData::Element(Element { name: name.local.to_string(), attrs })
                }
                RcNodeData::Text { ref contents } => NodeData::Text(contents.borrow().to_string()),
                RcNodeData::Comment { ref contents } => NodeData::Comment(contents.to_string()),
                _ => continue,
            };
            let id = self.create_node(data);
            self.append_child(parent, id);

            if let RcNodeData::Element { ref template_contents, .. } = child.data {
                if let Some(ref contents) = *template_contents.borrow() {
                    self.graft(id, contents);
                }
            }
            self.graft(id, child);
        }
    }

    /// All nodes below `id` in pre-order (document order), excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Every element under the root, in pre-order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.element(*id).is_some())
            .collect()
    }

    /// Replaces an element's tag name; attributes and children stay in place.
    pub fn rename_element(&mut self, id: NodeId, new_name: &str) -> bool {
        match self.element_mut(id) {
            Some(el) => {
                el.name = new_name.to_ascii_lowercase();
                true
            }
            None => false,
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let NodeData::Text(text) = self.data(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Serializes the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.serialize_node(child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_node(id, &mut out);
        out
    }

    fn serialize_node(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            NodeData::Fragment => {
                for &child in self.children(id) {
                    self.serialize_node(child, out);
                }
            }
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.name);
                for attr in &el.attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    escape_attribute(&attr.value, out);
                    out.push('"');
                }
                out.push('>');
                if is_void_element(&el.name) {
                    return;
                }
                for &child in self.children(id) {
                    self.serialize_node(child, out);
                }
                out.push_str("</");
                out.push_str(&el.name);
                out.push('>');
            }
            NodeData::Text(text) => {
                let raw = self
                    .parent(id)
                    .and_then(|p| self.element(p))
                    .map_or(false, |p| RAW_TEXT_ELEMENTS.contains(&p.name.as_str()));
                if raw {
                    out.push_str(text);
                } else {
                    escape_text(text, out);
                }
            }
            NodeData::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
        }
    }
}

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_serializes_fragment_verbatim() {
        let html = r#"<div id="x" class="keep drop" data-tmp="1"><p>Hello</p></div>"#;
        let doc = Document::parse_fragment(html);
        assert_eq!(doc.inner_html(doc.root()), html);
    }

    #[test]
    fn elements_are_listed_in_document_order() {
        let doc = Document::parse_fragment("<div><p>a</p><ul><li>b</li></ul></div><span></span>");
        let names: Vec<&str> = doc
            .elements()
            .into_iter()
            .filter_map(|id| doc.element(id).map(|e| e.name.as_str()))
            .collect();
        assert_eq!(names, vec!["div", "p", "ul", "li", "span"]);
    }

    #[test]
    fn void_elements_have_no_end_tag() {
        let doc = Document::parse_fragment(r#"<p>a<br>b<img src="x.png"></p>"#);
        assert_eq!(doc.inner_html(doc.root()), r#"<p>a<br>b<img src="x.png"></p>"#);
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let doc = Document::parse_fragment(r#"<a title="say &quot;hi&quot; &amp; go">1 &lt; 2 &amp;&nbsp;3</a>"#);
        assert_eq!(
            doc.inner_html(doc.root()),
            r#"<a title="say &quot;hi&quot; &amp; go">1 &lt; 2 &amp;&nbsp;3</a>"#
        );
    }

    #[test]
    fn raw_text_elements_are_not_escaped() {
        let doc = Document::parse_fragment("<style>p > a { color: red; }</style>");
        assert_eq!(doc.inner_html(doc.root()), "<style>p > a { color: red; }</style>");
    }

    #[test]
    fn comments_survive() {
        let doc = Document::parse_fragment("<p>a<!-- note --></p>");
        assert_eq!(doc.inner_html(doc.root()), "<p>a<!-- note --></p>");
    }

    #[test]
    fn append_html_accumulates_passes() {
        let mut doc = Document::new();
        let root = doc.root();
        assert_eq!(doc.append_html(root, "<h1>Title</h1>"), 1);
        assert_eq!(doc.append_html(root, "<p>one</p><p>two</p>"), 2);
        assert_eq!(doc.inner_html(root), "<h1>Title</h1><p>one</p><p>two</p>");
    }

    #[test]
    fn rename_keeps_attributes_and_children() {
        let mut doc = Document::parse_fragment(r#"<div id="a"><b>x</b></div>"#);
        let div = doc.elements()[0];
        assert!(doc.rename_element(div, "SECTION"));
        assert_eq!(doc.inner_html(doc.root()), r#"<section id="a"><b>x</b></section>"#);
    }

    #[test]
    fn element_attribute_helpers() {
        let mut el = Element::new("DIV");
        assert_eq!(el.name, "div");
        el.set_attr("id", "a");
        el.set_attr("class", "one  two");
        el.set_attr("id", "b");
        assert_eq!(el.attr("ID"), Some("b"));
        assert_eq!(el.class_tokens(), vec!["one", "two"]);
        assert_eq!(el.remove_attr("id").as_deref(), Some("b"));
        assert_eq!(el.attrs.len(), 1);
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let doc = Document::parse_fragment("<p>Hello <b>big</b> world</p>");
        assert_eq!(doc.text_content(doc.root()), "Hello big world");
    }
}
