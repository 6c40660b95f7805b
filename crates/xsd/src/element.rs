//! Leaf descriptors produced while compiling a type.

use crate::node::SchemaNode;
use crate::types::TypeRef;
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

/// Placeholder name of attributes declared without `name` or `ref`.
pub const ANONYMOUS_ELEMENT: &str = "__anonymous_element__";

/// Placeholder name of child elements declared without `name`.
pub const ANONYMOUS_MEMBER: &str = "__anonymous_member__";

/// `use` requirement of an attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Usage {
    #[default]
    Optional,
    Required,
    Prohibited,
}

impl FromStr for Usage {
    type Err = AttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "optional" => Ok(Self::Optional),
            "required" => Ok(Self::Required),
            "prohibited" => Ok(Self::Prohibited),
            other => Err(AttributeError::InvalidUse {
                value: other.to_string(),
            }),
        }
    }
}

/// Rejected attribute on an attribute declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("Unknown attribute {name} => {value} on {tag}")]
    Unknown {
        tag: String,
        name: String,
        value: String,
    },

    #[error("Unknown use '{value}'")]
    InvalidUse { value: String },
}

/// The attribute set of an attribute declaration, classified in one pass.
///
/// Anything outside the recognized set fails, so unsupported schema features
/// show up instead of silently disappearing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementAttributes {
    pub name: Option<String>,
    pub reference: Option<String>,
    pub type_name: Option<String>,
    pub default: Option<String>,
    pub fixed: Option<String>,
    pub usage: Usage,
}

impl ElementAttributes {
    pub fn classify(node: &SchemaNode) -> Result<Self, AttributeError> {
        let mut attrs = Self::default();
        for (name, value) in &node.attributes {
            match name.as_str() {
                "default" => attrs.default = Some(value.clone()),
                "name" => attrs.name = Some(value.clone()),
                "ref" => attrs.reference = Some(value.clone()),
                "type" => attrs.type_name = Some(value.clone()),
                "use" => attrs.usage = value.parse()?,
                "fixed" => attrs.fixed = Some(value.clone()),
                _ => {
                    return Err(AttributeError::Unknown {
                        tag: node.tag.clone(),
                        name: name.clone(),
                        value: value.clone(),
                    })
                }
            }
        }
        Ok(attrs)
    }
}

/// An attribute (or attribute reference) attached to a type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub name: String,
    /// Resolved `type`; references usually leave this empty
    #[serde(rename = "type")]
    pub type_ref: Option<TypeRef>,
    pub default: Option<String>,
    pub fixed: Option<String>,
    #[serde(rename = "use")]
    pub usage: Usage,
    /// Declared with `ref` instead of `name`
    pub is_reference: bool,
}

impl Element {
    pub fn new(attrs: ElementAttributes, type_ref: Option<TypeRef>) -> Self {
        let is_reference = attrs.reference.is_some();
        let name = attrs
            .reference
            .or(attrs.name)
            .unwrap_or_else(|| ANONYMOUS_ELEMENT.to_string());

        Self {
            name,
            type_ref,
            default: attrs.default,
            fixed: attrs.fixed,
            usage: attrs.usage,
            is_reference,
        }
    }
}

/// A child element occurrence inside a sequence.
///
/// Only the name is kept for now; occurrence bounds and the element's type
/// are left to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildMember {
    pub name: String,
}

impl ChildMember {
    pub fn from_node(node: &SchemaNode) -> Self {
        Self {
            name: node
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| ANONYMOUS_MEMBER.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Primitive;

    #[test]
    fn test_classify_full_attribute() {
        let node = SchemaNode::new("attribute")
            .with_attribute("name", "srsDimension")
            .with_attribute("type", "positiveInteger")
            .with_attribute("use", "required")
            .with_attribute("default", "3");

        let attrs = ElementAttributes::classify(&node).unwrap();
        assert_eq!(attrs.type_name.as_deref(), Some("positiveInteger"));

        let element = Element::new(attrs, Some(TypeRef::Primitive(Primitive::Integer)));
        assert_eq!(element.name, "srsDimension");
        assert_eq!(element.usage, Usage::Required);
        assert_eq!(element.default.as_deref(), Some("3"));
        assert_eq!(element.fixed, None);
        assert!(!element.is_reference);
    }

    #[test]
    fn test_classify_fixed_value() {
        let node = SchemaNode::new("attribute")
            .with_attribute("name", "version")
            .with_attribute("fixed", "3.0");
        let element = Element::new(ElementAttributes::classify(&node).unwrap(), None);
        assert_eq!(element.fixed.as_deref(), Some("3.0"));
        assert_eq!(element.default, None);
    }

    #[test]
    fn test_reference_takes_ref_name() {
        let node = SchemaNode::new("attribute").with_attribute("ref", "gml:id");
        let element = Element::new(ElementAttributes::classify(&node).unwrap(), None);
        assert_eq!(element.name, "gml:id");
        assert!(element.is_reference);
        assert_eq!(element.usage, Usage::Optional);
        assert_eq!(element.type_ref, None);
    }

    #[test]
    fn test_unknown_attribute_fails_closed() {
        let node = SchemaNode::new("attribute")
            .with_attribute("name", "a")
            .with_attribute("form", "qualified");
        let err = ElementAttributes::classify(&node).unwrap_err();
        assert_eq!(
            err,
            AttributeError::Unknown {
                tag: "attribute".into(),
                name: "form".into(),
                value: "qualified".into(),
            }
        );
    }

    #[test]
    fn test_invalid_use_fails_closed() {
        let node = SchemaNode::new("attribute").with_attribute("use", "sometimes");
        assert!(matches!(
            ElementAttributes::classify(&node),
            Err(AttributeError::InvalidUse { .. })
        ));
    }

    #[test]
    fn test_anonymous_placeholders() {
        let element = Element::new(ElementAttributes::default(), None);
        assert_eq!(element.name, ANONYMOUS_ELEMENT);
        assert_eq!(
            ChildMember::from_node(&SchemaNode::new("element")).name,
            ANONYMOUS_MEMBER
        );
    }
}
