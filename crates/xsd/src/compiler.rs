//! Compilation of raw type nodes into [`CompiledType`]s.
//!
//! A [`TypeCompiler`] walks the children of one `complexType`/`simpleType`
//! node and fills a fresh [`CompiledType`]; the arena entry only switches to
//! `Compiled` once the whole walk succeeded. Inline structure (choice
//! branches, union members, inline restriction bases) becomes anonymous types
//! that are allocated and compiled on the spot.

use crate::element::{ChildMember, Element, ElementAttributes};
use crate::namespace::NamespaceId;
use crate::node::SchemaNode;
use crate::registry::NamespaceRegistry;
use crate::source::SchemaSource;
use crate::types::{CompiledType, TypeId, TypeRef, TypeState};
use crate::{Result, XsdError};
use tracing::{error, warn};

/// Namespaces whose name contains this marker may carry mixed content; their
/// mixed types are dropped instead of failing the run.
pub const DISPOSABLE_MIXED_MARKER: &str = "xlink";

impl<S: SchemaSource> NamespaceRegistry<S> {
    /// Compile one type. Already compiled (or dropped) types are left alone.
    pub fn compile_type(&mut self, id: TypeId) -> Result<()> {
        let Some(node) = self.types.take_raw(id) else {
            return Ok(());
        };

        match TypeCompiler::new(self, id).compile(&node) {
            Ok(Some(compiled)) => {
                self.types.set_state(id, TypeState::Compiled(compiled));
                Ok(())
            }
            Ok(None) => {
                self.types.set_state(id, TypeState::Excluded);
                let namespace = self.ty(id).namespace();
                self.remove_from_namespace(namespace, id);
                Ok(())
            }
            Err(e) => {
                let doc = self.namespace(self.ty(id).namespace());
                error!(
                    name = %self.ty(id).name(),
                    namespace = doc.name(),
                    url = %doc.url(),
                    "failed to compile type: {}",
                    e
                );
                self.types.set_state(id, TypeState::Raw(node));
                Err(e)
            }
        }
    }

    /// Allocate an anonymous type for an inline node and compile it right away.
    fn synthesize(&mut self, namespace: NamespaceId, node: SchemaNode) -> Result<TypeId> {
        let id = self.types.alloc(namespace, node);
        self.compile_type(id)?;
        Ok(id)
    }
}

pub(crate) struct TypeCompiler<'r, S> {
    registry: &'r mut NamespaceRegistry<S>,
    namespace: NamespaceId,
    type_name: String,
    facets: CompiledType,
}

impl<'r, S: SchemaSource> TypeCompiler<'r, S> {
    pub(crate) fn new(registry: &'r mut NamespaceRegistry<S>, id: TypeId) -> Self {
        let ty = registry.ty(id);
        let namespace = ty.namespace();
        let type_name = ty.name().to_string();
        Self {
            registry,
            namespace,
            type_name,
            facets: CompiledType::default(),
        }
    }

    /// `Ok(None)` means the type was dropped on purpose.
    pub(crate) fn compile(mut self, node: &SchemaNode) -> Result<Option<CompiledType>> {
        if !(node.is("complexType") || node.is("simpleType")) {
            return Err(self.violation(format!("Unknown type {}", node.tag)));
        }

        if node.flag("mixed") {
            let doc = self.registry.namespace(self.namespace);
            if doc.name().contains(DISPOSABLE_MIXED_MARKER) {
                warn!(
                    "Ignoring type \"{}\" in {} ({}) because of mixed content. Should be unused.",
                    self.type_name,
                    doc.name(),
                    doc.url()
                );
                return Ok(None);
            }
            return Err(self.violation(format!(
                "Mixed content not supported in {}",
                self.type_name
            )));
        }

        self.facets.is_abstract = node.flag("abstract");
        self.facets.is_final = node.flag("final");

        self.parse_children(node)?;
        Ok(Some(self.facets))
    }

    fn parse_children(&mut self, node: &SchemaNode) -> Result<()> {
        for child in &node.children {
            match child.tag.as_str() {
                // not needed for code generation
                "annotation" | "any" | "attributeGroup" | "group" => {}
                "attribute" => self.parse_attribute(child)?,
                "choice" => self.parse_choice(child)?,
                "complexContent" => {
                    self.facets.is_complex_content = true;
                    self.parse_content(child)?;
                }
                "element" => self.facets.members.push(ChildMember::from_node(child)),
                "extension" => self.parse_extension(child)?,
                "list" => self.parse_list(child)?,
                "restriction" => self.parse_restriction(child)?,
                "sequence" => {
                    self.facets.is_sequence = true;
                    self.parse_children(child)?;
                }
                "simpleContent" => {
                    self.facets.is_simple_content = true;
                    self.parse_content(child)?;
                }
                "union" => self.parse_union(child)?,
                other => return Err(self.violation(format!("Unknown tag {}", other))),
            }
        }
        Ok(())
    }

    fn parse_attribute(&mut self, node: &SchemaNode) -> Result<()> {
        let attrs =
            ElementAttributes::classify(node).map_err(|e| self.violation(e.to_string()))?;
        let type_ref = attrs
            .type_name
            .as_deref()
            .map(|name| self.resolve(name))
            .transpose()?;
        self.facets.elements.push(Element::new(attrs, type_ref));
        Ok(())
    }

    /// Every alternative becomes an anonymous complex type wrapping just that
    /// alternative.
    fn parse_choice(&mut self, node: &SchemaNode) -> Result<()> {
        let alternatives = node
            .children
            .iter()
            .filter(|child| child.is("element") || child.is("sequence") || child.is("choice"));

        for alternative in alternatives {
            let wrapper = SchemaNode {
                namespace: node.namespace.clone(),
                ..SchemaNode::new("complexType")
            }
            .with_child(alternative.clone());
            let id = self.registry.synthesize(self.namespace, wrapper)?;
            self.facets.union.push(TypeRef::Schema(id));
        }
        Ok(())
    }

    /// Body of `complexContent`/`simpleContent`: exactly one child, the derivation.
    fn parse_content(&mut self, node: &SchemaNode) -> Result<()> {
        let [child] = node.children.as_slice() else {
            return Err(self.violation(format!("{} node has too many nodes", node.tag)));
        };

        match child.tag.as_str() {
            "extension" => self.parse_extension(child),
            "restriction" => self.parse_restriction(child),
            other => Err(self.violation(format!(
                "Unexpected type {} in {} tag",
                other, node.tag
            ))),
        }
    }

    fn parse_extension(&mut self, node: &SchemaNode) -> Result<()> {
        let Some(base) = node.attr("base") else {
            return Err(self.violation("no base given for extension"));
        };
        self.facets.base = Some(self.resolve(base)?);
        self.parse_children(node)
    }

    /// Facets of the restriction itself (enumerations, patterns, ...) are not
    /// carried over.
    fn parse_restriction(&mut self, node: &SchemaNode) -> Result<()> {
        if let Some(base) = node.attr("base") {
            if self.facets.base.is_some() {
                return Err(self.violation(format!("Double inheritance in {}", node.tag)));
            }
            self.facets.base = Some(self.resolve(base)?);
            return Ok(());
        }

        match node.children.first() {
            Some(inline) if inline.is("simpleType") => {
                let id = self.registry.synthesize(self.namespace, inline.clone())?;
                self.facets.base = Some(TypeRef::Schema(id));
                Ok(())
            }
            _ => Err(self.violation("Unexpected number of children in restriction")),
        }
    }

    fn parse_list(&mut self, node: &SchemaNode) -> Result<()> {
        self.facets.is_list = true;
        if let Some(item_type) = node.attr("itemType") {
            self.facets.item_type = Some(self.resolve(item_type)?);
        }
        Ok(())
    }

    fn parse_union(&mut self, node: &SchemaNode) -> Result<()> {
        let mut members: Vec<TypeRef> = Vec::new();
        if let Some(member_types) = node.attr("memberTypes") {
            for name in member_types.split_whitespace() {
                let member = self.resolve(name)?;
                if !members.contains(&member) {
                    members.push(member);
                }
            }
        }

        for inline in &node.children {
            let id = self.registry.synthesize(self.namespace, inline.clone())?;
            members.push(TypeRef::Schema(id));
        }

        self.facets.union.extend(members);
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<TypeRef> {
        self.registry.resolve_in(self.namespace, name)
    }

    fn violation(&self, message: impl Into<String>) -> XsdError {
        let doc = self.registry.namespace(self.namespace);
        XsdError::SchemaViolation {
            message: message.into(),
            type_name: self.type_name.clone(),
            namespace: doc.name().to_string(),
            url: doc.url().to_string(),
        }
    }
}
