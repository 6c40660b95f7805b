//! Built-in XML Schema primitives.

use serde::Serialize;
use std::fmt;

/// Canonical kind a built-in XML Schema primitive collapses to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Boolean,
    Double,
    Integer,
    String,
}

impl Primitive {
    /// Look up a built-in primitive by its local name.
    ///
    /// Only the names the CityGML family actually uses are mapped; anything
    /// else (`anyType`, `base64Binary`, ...) yields `None`.
    pub fn from_builtin(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(Self::Boolean),
            "double" | "decimal" | "float" => Some(Self::Double),
            "integer" | "negativeInteger" | "nonNegativeInteger" | "nonPositiveInteger"
            | "positiveInteger" => Some(Self::Integer),
            "anyURI" | "date" | "dateTime" | "gDay" | "gMonth" | "gMonthDay" | "gYear"
            | "gYearMonth" | "ID" | "Name" | "NCName" | "normalizedString" | "QName"
            | "string" | "time" | "token" => Some(Self::String),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Double => "double",
            Self::Integer => "integer",
            Self::String => "string",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
