//! Schema types and the arena that owns them.
//!
//! Every type of a run lives in one [`TypeArena`] owned by the registry. Types
//! point at each other through [`TypeId`] handles, so a `base` in one
//! namespace and a choice branch in another can refer to each other without
//! owning links.

use crate::element::{ChildMember, Element};
use crate::namespace::NamespaceId;
use crate::node::SchemaNode;
use crate::primitive::Primitive;
use serde::Serialize;
use std::fmt;

/// Placeholder name of types declared without a `name` attribute.
pub const ANONYMOUS_TYPE: &str = "__anonymous_type__";

/// Handle of a [`Type`] in the registry's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub(crate) usize);

impl TypeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What a type reference resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeRef {
    /// A type defined by one of the loaded schemas
    Schema(TypeId),
    /// A built-in primitive of the XML Schema namespace
    Primitive(Primitive),
}

impl TypeRef {
    pub fn as_schema(&self) -> Option<TypeId> {
        match self {
            Self::Schema(id) => Some(*id),
            Self::Primitive(_) => None,
        }
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            Self::Primitive(primitive) => Some(*primitive),
            Self::Schema(_) => None,
        }
    }
}

impl From<TypeId> for TypeRef {
    fn from(id: TypeId) -> Self {
        Self::Schema(id)
    }
}

impl From<Primitive> for TypeRef {
    fn from(primitive: Primitive) -> Self {
        Self::Primitive(primitive)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeName {
    Named(String),
    Anonymous,
}

impl TypeName {
    pub fn from_node(node: &SchemaNode) -> Self {
        match node.name() {
            Some(name) => Self::Named(name.to_string()),
            None => Self::Anonymous,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Anonymous => ANONYMOUS_TYPE,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Anonymous types never match a lookup.
    pub fn matches(&self, name: &str) -> bool {
        matches!(self, Self::Named(own) if own == name)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved structural facets of a type.
///
/// `base` combines with any of the other kinds; of `is_sequence`, `union` and
/// `is_list` at most one describes the type's own content.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledType {
    /// Inherited type, set by `extension` or `restriction`
    pub base: Option<TypeRef>,
    pub is_complex_content: bool,
    pub is_simple_content: bool,
    pub is_sequence: bool,
    pub members: Vec<ChildMember>,
    /// Choice branches (always anonymous schema types) or union member types
    pub union: Vec<TypeRef>,
    pub is_list: bool,
    pub item_type: Option<TypeRef>,
    pub is_abstract: bool,
    pub is_final: bool,
    /// Attribute declarations of the type
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeState {
    /// Read but not compiled yet
    Raw(SchemaNode),
    /// The raw node has been taken by the compiler
    Compiling,
    Compiled(CompiledType),
    /// Dropped from its namespace, e.g. unsupported mixed content in xlink
    Excluded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    namespace: NamespaceId,
    name: TypeName,
    state: TypeState,
}

impl Type {
    pub fn namespace(&self) -> NamespaceId {
        self.namespace
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn state(&self) -> &TypeState {
        &self.state
    }

    pub fn is_compiled(&self) -> bool {
        matches!(self.state, TypeState::Compiled(_))
    }

    /// Compiled facets; `None` until the type went through compilation.
    pub fn compiled(&self) -> Option<&CompiledType> {
        match &self.state {
            TypeState::Compiled(compiled) => Some(compiled),
            _ => None,
        }
    }

    pub fn raw(&self) -> Option<&SchemaNode> {
        match &self.state {
            TypeState::Raw(node) => Some(node),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct TypeArena {
    types: Vec<Type>,
}

impl TypeArena {
    pub(crate) fn alloc(&mut self, namespace: NamespaceId, node: SchemaNode) -> TypeId {
        let id = TypeId(self.types.len());
        self.types.push(Type {
            namespace,
            name: TypeName::from_node(&node),
            state: TypeState::Raw(node),
        });
        id
    }

    pub(crate) fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0]
    }

    /// Swap in the `Compiling` marker and hand out the raw node.
    ///
    /// Returns `None` if the type is not raw anymore.
    pub(crate) fn take_raw(&mut self, id: TypeId) -> Option<SchemaNode> {
        let slot = &mut self.types[id.0].state;
        match std::mem::replace(slot, TypeState::Compiling) {
            TypeState::Raw(node) => Some(node),
            other => {
                *slot = other;
                None
            }
        }
    }

    pub(crate) fn set_state(&mut self, id: TypeId, state: TypeState) {
        self.types[id.0].state = state;
    }

    pub(crate) fn len(&self) -> usize {
        self.types.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_raw_only_once() {
        let mut arena = TypeArena::default();
        let node = SchemaNode::new("complexType").with_attribute("name", "A");
        let id = arena.alloc(NamespaceId(0), node.clone());

        assert_eq!(arena.get(id).name(), &TypeName::Named("A".into()));
        assert_eq!(arena.take_raw(id), Some(node));
        assert_eq!(arena.get(id).state(), &TypeState::Compiling);
        assert_eq!(arena.take_raw(id), None);
        assert_eq!(arena.get(id).state(), &TypeState::Compiling);
    }

    #[test]
    fn test_anonymous_names_never_match() {
        let name = TypeName::from_node(&SchemaNode::new("simpleType"));
        assert!(name.is_anonymous());
        assert_eq!(name.to_string(), ANONYMOUS_TYPE);
        assert!(!name.matches(ANONYMOUS_TYPE));
    }
}
