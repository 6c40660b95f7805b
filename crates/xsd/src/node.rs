//! Owned XML node tree for schema documents.
//!
//! `roxmltree` borrows the document text, but raw type nodes have to outlive
//! the read phase until every namespace is loaded, so the tree is copied into
//! [`SchemaNode`]s while the namespace declarations are collected on the way.

use crate::{Result, XsdError};
use roxmltree::{Document, Node, ParsingOptions};
use url::Url;

/// An element of a schema document, reduced to what classification needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNode {
    /// Namespace URI of the element, if any
    pub namespace: Option<String>,
    /// Local name of the element (`complexType`, `sequence`, ...)
    pub tag: String,
    /// Attributes in document order. Namespaced attributes use `{uri}local`.
    pub attributes: Vec<(String, String)>,
    /// Element children in document order
    pub children: Vec<SchemaNode>,
}

impl SchemaNode {
    /// Create a bare node without namespace, attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            namespace: None,
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: SchemaNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// `true` only for the literal attribute value `"true"`.
    pub fn flag(&self, name: &str) -> bool {
        self.attr(name) == Some("true")
    }

    pub fn name(&self) -> Option<&str> {
        self.attr("name")
    }
}

/// A parsed schema document: its root element plus the root's prefix declarations.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub root: SchemaNode,
    /// `(prefix, uri)` pairs declared on the root element; the default namespace has prefix `""`.
    pub aliases: Vec<(String, String)>,
}

/// Parse schema text fetched from `url`.
pub fn parse_document(url: &Url, text: &str) -> Result<ParsedDocument> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options).map_err(|e| XsdError::XmlParse {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    // only the root's declarations; nested redeclarations must not rebind a prefix
    let root = doc.root_element();
    let aliases = root
        .namespaces()
        .map(|ns| (ns.name().unwrap_or_default().to_string(), ns.uri().to_string()))
        .collect();

    Ok(ParsedDocument {
        root: convert(root),
        aliases,
    })
}

fn convert(node: Node<'_, '_>) -> SchemaNode {
    let attributes = node
        .attributes()
        .map(|attr| {
            let key = match attr.namespace() {
                Some(ns) => format!("{{{}}}{}", ns, attr.name()),
                None => attr.name().to_string(),
            };
            (key, attr.value().to_string())
        })
        .collect();

    SchemaNode {
        namespace: node.tag_name().namespace().map(str::to_string),
        tag: node.tag_name().name().to_string(),
        attributes,
        children: node
            .children()
            .filter(|child| child.is_element())
            .map(convert)
            .collect(),
    }
}
