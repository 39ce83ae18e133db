//! Namespace-aware XML element tree
//!
//! Alma returns hierarchical responses whose record rows are appended to one
//! another during pagination, so the tree must be mutable and serializable.
//! Names are resolved against their namespace URI at parse time; the original
//! prefix is kept so the tree can be written back out unchanged.

use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use quick_xml::Writer;
use std::io::Cursor;

/// A resolved element or attribute name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlName {
    /// Namespace URI the name is bound to
    pub namespace: Option<String>,
    /// Local part of the name
    pub local: String,
    /// Prefix used in the source document
    pub prefix: Option<String>,
}

impl XmlName {
    /// Create an unqualified name
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            ..Default::default()
        }
    }

    /// Name as written in markup (`prefix:local` or `local`)
    pub fn raw(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local),
            None => self.local.clone(),
        }
    }

    /// Match against a local name and an optional namespace.
    ///
    /// A `None` namespace matches any namespace.
    pub fn matches(&self, namespace: Option<&str>, local: &str) -> bool {
        self.local == local && namespace.map_or(true, |ns| self.namespace.as_deref() == Some(ns))
    }
}

/// An attribute on an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: XmlName,
    pub value: String,
}

/// An element with its attributes, text content, and child elements
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: XmlName,
    pub attributes: Vec<XmlAttribute>,
    /// Concatenated character data directly inside this element
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an empty element
    pub fn new(name: XmlName) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Parse a document and return its root element
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = NsReader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        loop {
            let (resolved, event) = reader.read_resolved_event()?;
            let namespace = namespace_of(resolved);
            match event {
                Event::Start(start) => {
                    let element = element_from_start(&reader, namespace, &start)?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&reader, namespace, &start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::xml("Unexpected closing tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::xml(format!(
                "Missing closing tag for {}",
                stack[stack.len() - 1].name.raw()
            )));
        }
        root.ok_or_else(|| Error::xml("Document has no root element"))
    }

    /// Serialize the element (and its subtree) to markup
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| Error::xml(format!("Serialized XML is not UTF-8: {e}")))
    }

    fn write_to(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> Result<()> {
        let name = self.name.raw();
        let attrs: Vec<(String, &str)> = self
            .attributes
            .iter()
            .map(|a| (a.name.raw(), a.value.as_str()))
            .collect();
        let start = BytesStart::new(name.as_str())
            .with_attributes(attrs.iter().map(|(k, v)| (k.as_str(), *v)));

        if self.text.is_none() && self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = &self.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
        Ok(())
    }

    /// Local name of the element
    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    /// Text content, if any
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Value of an attribute by local name (any namespace)
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attribute_ns(None, local)
    }

    /// Value of an attribute by namespace and local name
    pub fn attribute_ns(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.matches(namespace, local))
            .map(|a| a.value.as_str())
    }

    /// Set or replace an unqualified attribute
    pub fn set_attribute(&mut self, local: impl Into<String>, value: impl Into<String>) {
        let local = local.into();
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.name.namespace.is_none() && a.name.local == local)
        {
            Some(existing) => existing.value = value,
            None => self.attributes.push(XmlAttribute {
                name: XmlName::local(local),
                value,
            }),
        }
    }

    /// First direct child matching the name
    pub fn find(&self, namespace: Option<&str>, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name.matches(namespace, local))
    }

    /// Text of the first direct child matching the name
    pub fn find_text(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.find(namespace, local).and_then(XmlElement::text)
    }

    /// Direct children matching the name
    pub fn children_named<'a>(
        &'a self,
        namespace: Option<&'a str>,
        local: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children
            .iter()
            .filter(move |c| c.name.matches(namespace, local))
    }

    /// This element and all of its descendants, depth first
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(element) = pending.pop() {
            out.push(element);
            pending.extend(element.children.iter().rev());
        }
        out
    }

    /// First element in document order (self included) matching the name
    pub fn find_descendant(&self, namespace: Option<&str>, local: &str) -> Option<&XmlElement> {
        self.descendants()
            .into_iter()
            .find(|e| e.name.matches(namespace, local))
    }

    /// Mutable variant of [`XmlElement::find_descendant`]
    pub fn find_descendant_mut(
        &mut self,
        namespace: Option<&str>,
        local: &str,
    ) -> Option<&mut XmlElement> {
        if self.name.matches(namespace, local) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|c| c.find_descendant_mut(namespace, local))
    }

    /// Append a child element
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    fn push_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }
}

impl std::fmt::Display for XmlElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let markup = self.to_xml_string().map_err(|_| std::fmt::Error)?;
        f.write_str(&markup)
    }
}

fn namespace_of(resolved: ResolveResult) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.0).into_owned()),
        _ => None,
    }
}

fn element_from_start(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    start: &BytesStart,
) -> Result<XmlElement> {
    let qname = start.name();
    let mut element = XmlElement::new(XmlName {
        namespace,
        local: String::from_utf8_lossy(qname.local_name().as_ref()).into_owned(),
        prefix: qname
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned()),
    });

    for attr in start.attributes() {
        let attr = attr?;
        let key = attr.key;
        let value = attr.unescape_value()?.into_owned();

        // xmlns declarations are kept verbatim so serialization stays valid
        let name = if key.as_namespace_binding().is_some() {
            XmlName {
                namespace: None,
                local: String::from_utf8_lossy(key.as_ref()).into_owned(),
                prefix: None,
            }
        } else {
            let (attr_ns, local) = reader.resolve_attribute(key);
            XmlName {
                namespace: namespace_of(attr_ns),
                local: String::from_utf8_lossy(local.as_ref()).into_owned(),
                prefix: key
                    .prefix()
                    .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned()),
            }
        };
        element.attributes.push(XmlAttribute { name, value });
    }

    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_child(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(Error::xml("Document has more than one root element")),
    }
}
