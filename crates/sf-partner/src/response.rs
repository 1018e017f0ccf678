//! Parsed response tree.

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::error::{Error, ErrorKind, Result};
use crate::namespaces::XSI_NS;

/// An element of a parsed response: resolved namespace, local name,
/// attributes, child elements and concatenated text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    namespace: Option<String>,
    name: String,
    attributes: Vec<XmlAttribute>,
    children: Vec<XmlNode>,
    text: String,
}

#[derive(Debug, Clone, PartialEq)]
struct XmlAttribute {
    namespace: Option<String>,
    name: String,
    value: String,
}

impl XmlNode {
    /// Namespace URI of this element.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Local name of this element.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First child with the given namespace and local name.
    pub fn child(&self, namespace: Option<&str>, name: &str) -> Option<&XmlNode> {
        self.children
            .iter()
            .find(|c| c.name == name && c.namespace.as_deref() == namespace)
    }

    /// First child with the given local name, in any namespace.
    pub fn child_local(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first child with the given local name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child_local(name).map(XmlNode::text)
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    pub fn first_child(&self) -> Option<&XmlNode> {
        self.children.first()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Attribute value by namespace and local name.
    pub fn attribute(&self, namespace: Option<&str>, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name && a.namespace.as_deref() == namespace)
            .map(|a| a.value.as_str())
    }

    /// Text content, with whitespace-only runs dropped.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True for `xsi:nil="true"`.
    pub fn is_nil(&self) -> bool {
        self.attribute(Some(XSI_NS), "nil") == Some("true")
    }

    pub fn into_children(self) -> Vec<XmlNode> {
        self.children
    }

    /// Take the first child with the given local name.
    pub fn into_child(self, name: &str) -> Option<XmlNode> {
        self.children.into_iter().find(|c| c.name == name)
    }
}

fn owned_namespace(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) => Some(String::from_utf8_lossy(ns).into_owned()),
        _ => None,
    }
}

/// Parse a complete document and return its root element.
pub fn parse(xml: &[u8]) -> Result<XmlNode> {
    let mut reader = NsReader::from_reader(xml);
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let namespace = owned_namespace(resolved);

        match event {
            Event::Start(e) | Event::Empty(e) if root.is_some() => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                return Err(Error::new(ErrorKind::Xml(format!(
                    "element <{name}> after the root element"
                ))));
            }
            Event::Start(e) => {
                let node = open_node(&reader, namespace, &e)?;
                stack.push(node);
            }
            Event::Empty(e) => {
                let node = open_node(&reader, namespace, &e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::End(_) => {
                let mut node = stack
                    .pop()
                    .ok_or_else(|| Error::new(ErrorKind::Xml("unbalanced end tag".to_string())))?;
                // indentation between child elements is not content
                if !node.children.is_empty() && node.text.trim().is_empty() {
                    node.text.clear();
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::new(ErrorKind::Xml(format!(
            "document ended with {} open element(s)",
            stack.len()
        ))));
    }
    root.ok_or_else(|| Error::new(ErrorKind::Xml("document has no root element".to_string())))
}

fn open_node(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    e: &quick_xml::events::BytesStart<'_>,
) -> Result<XmlNode> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attr.key);
        attributes.push(XmlAttribute {
            namespace: owned_namespace(resolved),
            name: String::from_utf8_lossy(local.as_ref()).into_owned(),
            value: attr.unescape_value()?.into_owned(),
        });
    }

    Ok(XmlNode {
        namespace,
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

/// The payload of an operation response.
#[derive(Debug, Clone, PartialEq)]
pub enum SoapResult {
    /// The response wrapper held exactly one child.
    Single(XmlNode),
    /// The response wrapper held several children, or list semantics were
    /// requested.
    List(Vec<XmlNode>),
}

impl SoapResult {
    /// All entries, whatever the arity.
    pub fn into_vec(self) -> Vec<XmlNode> {
        match self {
            SoapResult::Single(node) => vec![node],
            SoapResult::List(nodes) => nodes,
        }
    }

    /// The single entry, or an error when the response held a list.
    pub fn into_single(self) -> Result<XmlNode> {
        match self {
            SoapResult::Single(node) => Ok(node),
            SoapResult::List(nodes) => Err(Error::new(ErrorKind::InvalidResponse(format!(
                "expected a single result, got {}",
                nodes.len()
            )))),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, SoapResult::List(_))
    }
}
