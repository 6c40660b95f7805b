//! # citygml-xsd
//!
//! Loads the CityGML XSD family and compiles it into a cross-referenced type model.
//!
//! ## Architecture
//!
//! 1. **Load** - fetch the root schema, follow every `import` (new namespace) and
//!    `include` (same namespace) and stash the raw type nodes per namespace
//! 2. **Compile** - once every namespace finished reading, turn each raw node into
//!    a compiled [`Type`], resolving references across namespaces by handle
//! 3. **Consume** - hand the compiled model to a code generator
//!
//! ## Modules
//!
//! - `primitive`: built-in XML Schema primitives and their canonical kinds
//! - `node`: owned XML node tree with namespace alias capture
//! - `source`: schema retrieval (HTTP, `file://`, in-memory)
//! - `namespace`: per-namespace documents
//! - `registry`: the namespace cache and load/compile orchestration
//! - `resolve`: qualified/unqualified type lookup with primitive fallback
//! - `types`: the type arena and compiled facets
//! - `compiler`: structural dispatch from raw nodes to compiled types
//! - `element`: attribute and child-element leaves
//! - `citygml`: the CityGML root entry point and debug dumps
//!
//! ## Usage
//!
//! ```no_run
//! use citygml_xsd::{citygml, HttpSource, LoaderConfig};
//!
//! let registry = citygml::load(&LoaderConfig::default(), "3.0", HttpSource::new())?;
//! for id in registry.get_types() {
//!     println!("{}", registry.ty(id).name());
//! }
//! # Ok::<(), citygml_xsd::XsdError>(())
//! ```

pub mod citygml;
pub mod compiler;
pub mod element;
pub mod namespace;
pub mod node;
pub mod primitive;
pub mod registry;
pub mod resolve;
pub mod source;
pub mod types;

use thiserror::Error;

pub use citygml::LoaderConfig;
pub use element::{ChildMember, Element, Usage};
pub use namespace::{NamespaceDocument, NamespaceId};
pub use node::SchemaNode;
pub use primitive::Primitive;
pub use registry::{NamespaceRegistry, TypeSummary};
pub use resolve::QualifiedName;
pub use source::{HttpSource, MemorySource, SchemaSource};
pub use types::{CompiledType, Type, TypeId, TypeName, TypeRef, TypeState};

/// The XML Schema namespace; qualified lookups into it fall back to [`Primitive`].
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

#[derive(Debug, Error)]
pub enum XsdError {
    /// Fetching a schema document failed
    #[error("failed to fetch {url}: {message}")]
    Transport { url: String, message: String },

    #[error("cannot resolve schema location '{location}' against {base}: {source}")]
    InvalidUrl {
        location: String,
        base: String,
        #[source]
        source: url::ParseError,
    },

    #[error("XML parsing error in {url}: {message}")]
    XmlParse { url: String, message: String },

    #[error("namespace {namespace} not found")]
    NamespaceNotFound { namespace: String },

    #[error("type {name} not found")]
    TypeNotFound { name: String },

    /// The schema uses a construct that is invalid or deliberately unsupported
    #[error("{message} on {type_name} in namespace {namespace} ({url})")]
    SchemaViolation {
        message: String,
        type_name: String,
        namespace: String,
        url: String,
    },

    #[error("<{tag}> in {url} is missing the '{attribute}' attribute")]
    MissingAttribute {
        tag: String,
        attribute: String,
        url: String,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl XsdError {
    /// Create a new transport error
    pub fn transport(url: impl ToString, message: impl ToString) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn namespace_not_found(namespace: impl Into<String>) -> Self {
        Self::NamespaceNotFound {
            namespace: namespace.into(),
        }
    }

    pub fn type_not_found(name: impl Into<String>) -> Self {
        Self::TypeNotFound { name: name.into() }
    }

    pub fn is_schema_violation(&self) -> bool {
        matches!(self, Self::SchemaViolation { .. })
    }
}

pub type Result<T> = std::result::Result<T, XsdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_message_carries_context() {
        let err = XsdError::SchemaViolation {
            message: "Double inheritance in restriction".into(),
            type_name: "RoofType".into(),
            namespace: "http://www.opengis.net/citygml/building/3.0".into(),
            url: "https://schemas.opengis.net/citygml/building/3.0/building.xsd".into(),
        };
        let text = err.to_string();
        assert!(text.contains("RoofType"));
        assert!(text.contains("building/3.0"));
        assert!(text.contains("building.xsd"));
        assert!(err.is_schema_violation());
    }
}
