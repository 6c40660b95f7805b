//! Type-name resolution.
//!
//! A name is resolved by running an ordered plan of [`Lookup`] steps; the
//! first step that finds something wins. The plan depends on the name's shape:
//!
//! | name                             | plan                               |
//! |----------------------------------|------------------------------------|
//! | qualified, namespace loaded      | that namespace only                |
//! | qualified, XML Schema namespace  | built-in primitives                |
//! | qualified, anything else         | `NamespaceNotFound`                |
//! | bare                             | every namespace, then primitives   |

use crate::namespace::NamespaceId;
use crate::primitive::Primitive;
use crate::registry::NamespaceRegistry;
use crate::source::SchemaSource;
use crate::types::TypeRef;
use crate::{Result, XsdError, XS_NAMESPACE};

/// A type name as handed to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifiedName<'a> {
    /// `namespace:local`, the namespace being a full URI
    Qualified { namespace: &'a str, local: &'a str },
    Bare(&'a str),
}

impl<'a> QualifiedName<'a> {
    /// Split at the last `:`. Local names cannot contain colons, namespace
    /// URIs usually do.
    pub fn parse(name: &'a str) -> Self {
        match name.rsplit_once(':') {
            Some((namespace, local)) => Self::Qualified { namespace, local },
            None => Self::Bare(name),
        }
    }

    pub fn local(&self) -> &'a str {
        match self {
            Self::Qualified { local, .. } => local,
            Self::Bare(local) => local,
        }
    }
}

/// One step of a resolution plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup<'a> {
    /// Only this namespace
    Exact(NamespaceId, &'a str),
    /// Every namespace, in load order
    Everywhere(&'a str),
    Builtin(&'a str),
}

impl<S: SchemaSource> NamespaceRegistry<S> {
    /// Resolve a registry-level name: either `namespace-uri:local` or a bare
    /// local name.
    pub fn resolve_type(&self, name: &str) -> Result<TypeRef> {
        self.resolve_name(QualifiedName::parse(name), name)
    }

    /// Resolve a name as written inside namespace `within`.
    ///
    /// Prefixes go through that namespace's alias table. Bare names are
    /// looked up in `within` first, then everywhere else.
    pub fn resolve_in(&self, within: NamespaceId, name: &str) -> Result<TypeRef> {
        let doc = self.namespace(within);
        match name.split_once(':') {
            Some((prefix, local)) => {
                let namespace = doc
                    .alias(prefix)
                    .ok_or_else(|| XsdError::namespace_not_found(prefix))?;
                self.resolve_name(QualifiedName::Qualified { namespace, local }, name)
            }
            None => match self.get_raw_type(within, name) {
                Some(id) => Ok(TypeRef::Schema(id)),
                None => self.resolve_name(QualifiedName::Bare(name), name),
            },
        }
    }

    fn resolve_name(&self, name: QualifiedName<'_>, original: &str) -> Result<TypeRef> {
        self.plan(name)?
            .into_iter()
            .find_map(|step| self.lookup(step))
            .ok_or_else(|| XsdError::type_not_found(original))
    }

    fn plan<'a>(&self, name: QualifiedName<'a>) -> Result<Vec<Lookup<'a>>> {
        match name {
            QualifiedName::Qualified { namespace, local } => match self.namespace_id(namespace) {
                Some(id) => Ok(vec![Lookup::Exact(id, local)]),
                None if namespace == XS_NAMESPACE => Ok(vec![Lookup::Builtin(local)]),
                None => Err(XsdError::namespace_not_found(namespace)),
            },
            QualifiedName::Bare(local) => Ok(vec![Lookup::Everywhere(local), Lookup::Builtin(local)]),
        }
    }

    fn lookup(&self, step: Lookup<'_>) -> Option<TypeRef> {
        match step {
            Lookup::Exact(namespace, local) => self.get_raw_type(namespace, local).map(TypeRef::Schema),
            Lookup::Everywhere(local) => self
                .namespaces()
                .find_map(|(id, _)| self.get_raw_type(id, local))
                .map(TypeRef::Schema),
            Lookup::Builtin(local) => Primitive::from_builtin(local).map(TypeRef::Primitive),
        }
    }
}
