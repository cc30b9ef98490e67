use crate::error::ConvertError;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, PartialEq)]
pub struct Name {
    pub(crate) namespace: Option<String>,
    pub(crate) local: String,
}

impl Name {
    pub fn is(&self, namespace: Option<&str>, local: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local == local
    }
}

#[derive(Debug)]
struct Attribute {
    name: Name,
    value: String,
}

#[derive(Debug)]
enum Node {
    Element(Element),
    Text(String),
}

/// An element of a namespace-resolved XML tree. Names are matched by
/// namespace URI, so `tt:p` and a default-namespaced `p` are the same element.
#[derive(Debug)]
pub struct Element {
    name: Name,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

impl Element {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn attribute(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.is(namespace, local))
            .map(|attr| attr.value.as_str())
    }

    pub fn child_elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Every element in this subtree, this one included, in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    pub fn find_all<'a>(
        &'a self,
        namespace: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants()
            .filter(move |element| element.name.is(Some(namespace), local))
    }

    /// Concatenated text of all descendant text nodes, whitespace untouched.
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        let element = self.stack.pop()?;
        self.stack.extend(element.child_elements().rev());
        Some(element)
    }
}

/// Build an element tree from an XML document and return its root element.
pub fn parse(input: &str) -> Result<Element, ConvertError> {
    let mut reader = NsReader::from_str(input);
    reader.config_mut().trim_text(false);
    reader.config_mut().expand_empty_elements = true;

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let namespace = namespace_of(resolved);
        match event {
            Event::Start(start) => {
                let element = start_element(&reader, namespace, &start)?;
                stack.push(element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Element(element)),
                        None => root = Some(element),
                    }
                }
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    let text = text.unescape().map_err(quick_xml::Error::from)?;
                    parent.children.push(Node::Text(text.into_owned()));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    parent.children.push(Node::Text(text));
                }
            }
            Event::Eof => break,
            _ => (),
        }
    }

    root.ok_or(ConvertError::Format)
}

fn start_element(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    start: &BytesStart,
) -> Result<Element, ConvertError> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let name = Name {
            namespace: namespace_of(resolved),
            local: String::from_utf8_lossy(local.as_ref()).into_owned(),
        };
        let value = attr
            .unescape_value()
            .map_err(quick_xml::Error::from)?
            .into_owned();
        attributes.push(Attribute { name, value });
    }

    Ok(Element {
        name: Name {
            namespace,
            local: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        },
        attributes,
        children: Vec::new(),
    })
}

fn namespace_of(resolved: ResolveResult) -> Option<String> {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) => Some(String::from_utf8_lossy(ns).into_owned()),
        // The `xml` prefix is bound implicitly.
        ResolveResult::Unknown(prefix) if prefix == b"xml" => Some(XML_NS.to_string()),
        _ => None,
    }
}
