//! Order- and namespace-preserving in-memory XML tree.
//!
//! Built from a single `quick_xml::Reader` pass, mirroring the event-loop
//! style used for relationship and content-type parsing elsewhere in this
//! crate. This is the substrate both the schema and semantic validators walk.

use crate::error::{PackError, Result};
use crate::namespaces::{uri_for, QName};
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlElement {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local == local)
            .map(|a| a.value.as_str())
    }

    pub fn attr_qname(&self, name: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| &a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Looks up an attribute by a possibly-prefixed name (`r:id`), resolving
    /// the prefix against the well-known namespace table. Attributes are
    /// keyed internally by resolved URI plus local name, not by the source
    /// prefix, so a bare local-name lookup would collide across namespaces.
    pub fn attr_prefixed(&self, name: &str) -> Option<&str> {
        match name.split_once(':') {
            Some((prefix, local)) => {
                let uri = uri_for(prefix).unwrap_or("");
                self.attr_qname(&QName::new(uri, local))
            }
            None => self.attr(name),
        }
    }

    /// Depth-first, document-order iteration over this element and every
    /// descendant, paired with the element-path stack entry
    /// (qualified name, 1-based index among same-named siblings).
    pub fn walk(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        fn visit<'a>(e: &'a XmlElement, out: &mut Vec<&'a XmlElement>) {
            out.push(e);
            for child in &e.children {
                visit(child, out);
            }
        }
        visit(self, &mut out);
        out
    }
}

/// Parses a complete XML document into its root element.
///
/// Namespace bindings are resolved via `quick_xml`'s `NsReader`; unqualified
/// names get an empty `uri`. Whitespace-only text nodes between elements are
/// dropped; mixed content text is concatenated in document order.
pub fn parse_document(xml: &[u8]) -> Result<XmlElement> {
    let mut ns_reader = quick_xml::reader::NsReader::from_reader(xml);
    ns_reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut buf = Vec::new();

    loop {
        let (resolved_ns, event) = ns_reader.read_resolved_event_into(&mut buf)?;
        match event {
            Event::Start(e) => {
                let name = qname_from(&resolved_ns, e.name());
                let attributes = read_attributes(&ns_reader, &e)?;
                stack.push(XmlElement {
                    name,
                    attributes,
                    children: Vec::new(),
                    text: String::new(),
                });
            }
            Event::Empty(e) => {
                let name = qname_from(&resolved_ns, e.name());
                let attributes = read_attributes(&ns_reader, &e)?;
                let elem = XmlElement {
                    name,
                    attributes,
                    children: Vec::new(),
                    text: String::new(),
                };
                push_or_root(&mut stack, &mut root, elem);
            }
            Event::End(_) => {
                let elem = stack
                    .pop()
                    .ok_or_else(|| PackError::NotAContainer("unbalanced XML element".into()))?;
                push_or_root(&mut stack, &mut root, elem);
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    root.ok_or_else(|| PackError::NotAContainer("empty XML document".into()))
}

fn push_or_root(stack: &mut Vec<XmlElement>, root: &mut Option<XmlElement>, elem: XmlElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(elem);
    } else {
        *root = Some(elem);
    }
}

fn qname_from(resolved: &ResolveResult, name: quick_xml::name::QName) -> QName {
    let uri = match resolved {
        ResolveResult::Bound(ns) => String::from_utf8_lossy(ns.as_ref()).into_owned(),
        _ => String::new(),
    };
    let local = String::from_utf8_lossy(name.local_name().as_ref()).into_owned();
    QName::new(uri, local)
}

fn read_attributes(
    reader: &quick_xml::reader::NsReader<&[u8]>,
    e: &quick_xml::events::BytesStart,
) -> Result<Vec<Attribute>> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key;
        // xmlns / xmlns:* declarations are namespace machinery, not data attributes.
        if key.as_ref() == b"xmlns" || key.as_ref().starts_with(b"xmlns:") {
            continue;
        }
        let (resolved, local_name) = reader.resolve_attribute(key);
        let uri = match resolved {
            ResolveResult::Bound(ns) => String::from_utf8_lossy(ns.as_ref()).into_owned(),
            _ => String::new(),
        };
        let local = String::from_utf8_lossy(local_name.as_ref()).into_owned();
        let value = attr.decode_and_unescape_value(reader.decoder())?.into_owned();
        out.push(Attribute {
            name: QName::new(uri, local),
            value,
        });
    }
    Ok(out)
}
