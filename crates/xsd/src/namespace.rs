//! One namespace's schema content.

use crate::node::SchemaNode;
use crate::types::{TypeArena, TypeId};
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

/// Handle of a [`NamespaceDocument`] in the registry, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NamespaceId(pub(crate) usize);

impl NamespaceId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Everything read for one namespace: the root document of that namespace
/// plus every document it includes.
#[derive(Debug)]
pub struct NamespaceDocument {
    url: Url,
    name: String,
    /// prefix -> namespace URI, only used for qualified names inside this namespace
    aliases: HashMap<String, String>,
    types: Vec<TypeId>,
    elements: Vec<SchemaNode>,
    groups: Vec<SchemaNode>,
    includes: Vec<Url>,
    imports: Vec<NamespaceId>,
}

impl NamespaceDocument {
    pub(crate) fn new(url: Url, name: impl Into<String>) -> Self {
        Self {
            url,
            name: name.into(),
            aliases: HashMap::new(),
            types: Vec::new(),
            elements: Vec::new(),
            groups: Vec::new(),
            includes: Vec::new(),
            imports: Vec::new(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace URI bound to `prefix` in any document of this namespace.
    pub fn alias(&self, prefix: &str) -> Option<&str> {
        self.aliases.get(prefix).map(String::as_str)
    }

    /// Type declarations in read order. Dropped types are removed.
    pub fn types(&self) -> &[TypeId] {
        &self.types
    }

    /// Top-level element declarations, kept for the generator.
    pub fn elements(&self) -> &[SchemaNode] {
        &self.elements
    }

    pub fn groups(&self) -> &[SchemaNode] {
        &self.groups
    }

    /// Included document URLs, in the order they were read.
    pub fn includes(&self) -> &[Url] {
        &self.includes
    }

    pub fn imports(&self) -> &[NamespaceId] {
        &self.imports
    }

    pub(crate) fn record_aliases(&mut self, aliases: impl IntoIterator<Item = (String, String)>) {
        self.aliases.extend(aliases);
    }

    pub(crate) fn push_type(&mut self, id: TypeId) {
        self.types.push(id);
    }

    pub(crate) fn remove_type(&mut self, id: TypeId) {
        self.types.retain(|own| *own != id);
    }

    pub(crate) fn push_element(&mut self, node: SchemaNode) {
        self.elements.push(node);
    }

    pub(crate) fn push_group(&mut self, node: SchemaNode) {
        self.groups.push(node);
    }

    /// Remember an include; `false` if it was already read.
    pub(crate) fn mark_included(&mut self, url: &Url) -> bool {
        if self.includes.contains(url) {
            return false;
        }
        self.includes.push(url.clone());
        true
    }

    pub(crate) fn push_import(&mut self, id: NamespaceId) {
        self.imports.push(id);
    }

    /// Exact local-name lookup among this namespace's own types.
    pub(crate) fn get_raw_type(&self, arena: &TypeArena, name: &str) -> Option<TypeId> {
        self.types
            .iter()
            .copied()
            .find(|id| arena.get(*id).name().matches(name))
    }
}
