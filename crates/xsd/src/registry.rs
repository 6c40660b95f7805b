//! The namespace cache and the load/compile orchestration.

use crate::citygml::SCHEMA_FAMILY;
use crate::namespace::{NamespaceDocument, NamespaceId};
use crate::node::{self, SchemaNode};
use crate::source::SchemaSource;
use crate::types::{CompiledType, Type, TypeArena, TypeId, TypeRef};
use crate::{Result, XsdError};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use url::Url;

/// Serializable view of one type, for handing the model to a generator.
#[derive(Debug, Clone, Serialize)]
pub struct TypeSummary {
    pub id: TypeId,
    pub namespace: String,
    pub name: String,
    pub compiled: Option<CompiledType>,
}

/// Owns every namespace and every type of one loading run.
///
/// A namespace name maps to exactly one [`NamespaceDocument`] for the
/// lifetime of the registry; loading it again returns the cached document.
///
/// # Example
///
/// ```no_run
/// use citygml_xsd::{HttpSource, NamespaceRegistry};
/// use url::Url;
///
/// let mut registry = NamespaceRegistry::new(HttpSource::new());
/// let root = Url::parse("https://schemas.opengis.net/citygml/profiles/base/3.0/CityGML.xsd")?;
/// registry.load_root(root, "http://www.opengis.net/citygml/profiles/base/3.0")?;
/// println!("{} types", registry.get_types().len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct NamespaceRegistry<S> {
    source: S,
    documents: Vec<NamespaceDocument>,
    by_name: HashMap<String, NamespaceId>,
    pub(crate) types: TypeArena,
    /// URL marker of the schema family; other documents get a warning on compile
    expected_family: Option<String>,
}

impl<S: SchemaSource> NamespaceRegistry<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            documents: Vec::new(),
            by_name: HashMap::new(),
            types: TypeArena::default(),
            expected_family: Some(SCHEMA_FAMILY.to_string()),
        }
    }

    /// Warn about namespaces whose URL does not contain `marker`.
    pub fn with_expected_family(mut self, marker: impl Into<String>) -> Self {
        self.expected_family = Some(marker.into());
        self
    }

    /// Turn the unrelated-URL diagnostic off.
    pub fn without_expected_family(mut self) -> Self {
        self.expected_family = None;
        self
    }

    /// Whether a namespace was loaded from outside the expected schema family.
    pub fn is_outside_family(&self, id: NamespaceId) -> bool {
        self.expected_family
            .as_deref()
            .is_some_and(|marker| !self.documents[id.0].url().as_str().contains(marker))
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load a namespace and, transitively, everything it imports or includes.
    ///
    /// A namespace that is already cached is returned as is, even if `url`
    /// differs from the one it was first loaded from. The document is cached
    /// before it is read, so an import cycle back into it terminates.
    pub fn load(&mut self, url: Url, namespace: &str) -> Result<NamespaceId> {
        if let Some(id) = self.by_name.get(namespace) {
            debug!(namespace, "namespace already loaded");
            return Ok(*id);
        }

        let id = NamespaceId(self.documents.len());
        self.documents
            .push(NamespaceDocument::new(url.clone(), namespace));
        self.by_name.insert(namespace.to_string(), id);

        self.read_document(id, &url)?;
        Ok(id)
    }

    /// [`load`](Self::load) the root namespace, then compile every namespace
    /// in load order.
    pub fn load_root(&mut self, url: Url, namespace: &str) -> Result<NamespaceId> {
        let root = self.load(url, namespace)?;
        info!(
            namespaces = self.documents.len(),
            "Loaded files - compiling now"
        );
        self.compile_all()?;
        Ok(root)
    }

    pub fn compile_all(&mut self) -> Result<()> {
        for index in 0..self.documents.len() {
            self.compile_namespace(NamespaceId(index))?;
        }
        Ok(())
    }

    /// Compile every type declared in one namespace, in read order.
    pub fn compile_namespace(&mut self, id: NamespaceId) -> Result<()> {
        let doc = &self.documents[id.0];
        if self.is_outside_family(id) {
            warn!(namespace = doc.name(), url = %doc.url(), "namespace outside the expected schema family");
        }

        let pending = doc.types().to_vec();
        for ty in pending {
            self.compile_type(ty)?;
        }
        Ok(())
    }

    fn read_document(&mut self, id: NamespaceId, url: &Url) -> Result<()> {
        let text = self.source.fetch(url)?;
        let parsed = node::parse_document(url, &text)?;
        self.documents[id.0].record_aliases(parsed.aliases);
        self.classify(id, url, parsed.root.children)
    }

    /// Sort top-level schema nodes into the namespace, following imports and
    /// includes as they come.
    fn classify(&mut self, id: NamespaceId, url: &Url, nodes: Vec<SchemaNode>) -> Result<()> {
        for node in nodes {
            match node.tag.as_str() {
                // attributes are not needed by the generator; annotations are documentation only
                "attribute" | "attributeGroup" | "annotation" => {}
                "complexType" | "simpleType" => {
                    let ty = self.types.alloc(id, node);
                    self.documents[id.0].push_type(ty);
                }
                "element" => self.documents[id.0].push_element(node),
                "group" => self.documents[id.0].push_group(node),
                "import" => {
                    let target = schema_location(url, &node)?;
                    let namespace = required_attr(url, &node, "namespace")?;
                    let dependency = self.load(target, namespace)?;
                    self.documents[id.0].push_import(dependency);
                }
                "include" => {
                    let target = schema_location(url, &node)?;
                    let doc = &mut self.documents[id.0];
                    if target != *doc.url() && doc.mark_included(&target) {
                        self.read_document(id, &target)?;
                    }
                }
                _ => {
                    debug!("Looking for children in {}", node.tag);
                    self.classify(id, url, node.children)?;
                }
            }
        }
        Ok(())
    }

    pub fn namespace(&self, id: NamespaceId) -> &NamespaceDocument {
        &self.documents[id.0]
    }

    pub fn namespace_id(&self, name: &str) -> Option<NamespaceId> {
        self.by_name.get(name).copied()
    }

    /// All namespaces in load order.
    pub fn namespaces(&self) -> impl Iterator<Item = (NamespaceId, &NamespaceDocument)> {
        self.documents
            .iter()
            .enumerate()
            .map(|(index, doc)| (NamespaceId(index), doc))
    }

    pub fn ty(&self, id: TypeId) -> &Type {
        self.types.get(id)
    }

    /// Number of types in the arena, anonymous ones included.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Local-name lookup restricted to one namespace.
    pub fn get_raw_type(&self, namespace: NamespaceId, name: &str) -> Option<TypeId> {
        self.documents[namespace.0].get_raw_type(&self.types, name)
    }

    /// Every named type of every namespace, namespaces in load order.
    pub fn get_types(&self) -> Vec<TypeId> {
        let mut types = Vec::new();
        for doc in &self.documents {
            info!("Namespace {} has {} types", doc.name(), doc.types().len());
            types.extend_from_slice(doc.types());
        }
        types
    }

    /// Human readable name of a resolved reference.
    pub fn display_ref(&self, type_ref: TypeRef) -> String {
        match type_ref {
            TypeRef::Schema(id) => {
                let ty = self.ty(id);
                format!("{{{}}}{}", self.namespace(ty.namespace()).name(), ty.name())
            }
            TypeRef::Primitive(primitive) => format!("xs:{}", primitive),
        }
    }

    pub fn summaries(&self) -> Vec<TypeSummary> {
        self.get_types()
            .into_iter()
            .map(|id| {
                let ty = self.ty(id);
                TypeSummary {
                    id,
                    namespace: self.namespace(ty.namespace()).name().to_string(),
                    name: ty.name().to_string(),
                    compiled: ty.compiled().cloned(),
                }
            })
            .collect()
    }

    pub(crate) fn remove_from_namespace(&mut self, namespace: NamespaceId, ty: TypeId) {
        self.documents[namespace.0].remove_type(ty);
    }
}

fn required_attr<'n>(url: &Url, node: &'n SchemaNode, attribute: &str) -> Result<&'n str> {
    node.attr(attribute).ok_or_else(|| XsdError::MissingAttribute {
        tag: node.tag.clone(),
        attribute: attribute.to_string(),
        url: url.to_string(),
    })
}

/// `schemaLocation` of an import/include, resolved against the reading document.
fn schema_location(url: &Url, node: &SchemaNode) -> Result<Url> {
    let location = required_attr(url, node, "schemaLocation")?;
    url.join(location).map_err(|source| XsdError::InvalidUrl {
        location: location.to_string(),
        base: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn single(location: &str) -> MemorySource {
        MemorySource::new().with_document(
            location,
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#,
        )
    }

    #[test]
    fn test_family_diagnostic_defaults_to_citygml() {
        let inside = "https://schemas.opengis.net/citygml/3.0/core.xsd";
        let mut registry = NamespaceRegistry::new(single(inside));
        let id = registry.load_root(Url::parse(inside).unwrap(), "urn:core").unwrap();
        assert!(!registry.is_outside_family(id));

        let outside = "https://example.org/other.xsd";
        let mut registry = NamespaceRegistry::new(single(outside));
        let id = registry.load_root(Url::parse(outside).unwrap(), "urn:other").unwrap();
        assert!(registry.is_outside_family(id));

        let registry = registry.with_expected_family("example.org");
        assert!(!registry.is_outside_family(id));
        let registry = registry.without_expected_family();
        assert!(!registry.is_outside_family(id));
    }

    #[test]
    fn test_schema_location_resolution() {
        let base = Url::parse("https://schemas.opengis.net/citygml/3.0/core.xsd").unwrap();
        let relative = SchemaNode::new("include").with_attribute("schemaLocation", "../building/3.0/building.xsd");
        assert_eq!(
            schema_location(&base, &relative).unwrap().as_str(),
            "https://schemas.opengis.net/citygml/building/3.0/building.xsd"
        );

        let absolute = SchemaNode::new("import")
            .with_attribute("schemaLocation", "http://www.w3.org/1999/xlink.xsd");
        assert_eq!(
            schema_location(&base, &absolute).unwrap().as_str(),
            "http://www.w3.org/1999/xlink.xsd"
        );

        let missing = SchemaNode::new("import").with_attribute("namespace", "urn:x");
        assert!(matches!(
            schema_location(&base, &missing),
            Err(XsdError::MissingAttribute { .. })
        ));
    }
}
