//! CityGML root entry point and debug dumps.

use crate::registry::NamespaceRegistry;
use crate::source::SchemaSource;
use crate::{Result, XsdError};
use std::fs;
use std::path::Path;
use tracing::debug;
use url::Url;

pub const SCHEMA_BASE_URL: &str = "https://schemas.opengis.net/citygml/";

pub const ROOT_NAMESPACE: &str = "http://www.opengis.net/citygml/profiles/base/3.0";

/// Substring every CityGML schema URL contains.
pub const SCHEMA_FAMILY: &str = "citygml";

/// Where [`write_type_names`] dumps by default.
pub const DEFAULT_TYPES_DUMP: &str = "./types.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Prefix the root schema path is appended to
    pub base_url: String,
    /// Namespace name the root schema is registered under
    pub root_namespace: String,
    /// URL marker for the "unrelated namespace" diagnostic
    pub expected_family: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_url: SCHEMA_BASE_URL.to_string(),
            root_namespace: ROOT_NAMESPACE.to_string(),
            expected_family: SCHEMA_FAMILY.to_string(),
        }
    }
}

impl LoaderConfig {
    /// URL of the base profile's root schema for a schema `version`, e.g. `3.0`.
    pub fn root_url(&self, version: &str) -> Result<Url> {
        let location = format!("{}profiles/base/{}/CityGML.xsd", self.base_url, version);
        Url::parse(&location).map_err(|source| XsdError::InvalidUrl {
            location,
            base: self.base_url.clone(),
            source,
        })
    }
}

/// Load and compile the whole CityGML schema family for `version`.
pub fn load<S: SchemaSource>(
    config: &LoaderConfig,
    version: &str,
    source: S,
) -> Result<NamespaceRegistry<S>> {
    let mut registry =
        NamespaceRegistry::new(source).with_expected_family(config.expected_family.clone());
    registry.load_root(config.root_url(version)?, &config.root_namespace)?;
    Ok(registry)
}

/// Write the names of all namespace types, in discovery order.
pub fn write_type_names<S: SchemaSource>(
    registry: &NamespaceRegistry<S>,
    path: impl AsRef<Path>,
) -> Result<()> {
    let names: Vec<String> = registry
        .get_types()
        .into_iter()
        .map(|id| registry.ty(id).name().to_string())
        .collect();

    debug!("{} type names", names.len());
    fs::write(path.as_ref(), format!("{:?}", names))?;
    Ok(())
}

/// Write a JSON snapshot of all namespace types and their compiled facets.
pub fn write_json<S: SchemaSource>(
    registry: &NamespaceRegistry<S>,
    path: impl AsRef<Path>,
) -> Result<()> {
    let payload = serde_json::to_string_pretty(&registry.summaries())?;
    fs::write(path.as_ref(), payload)?;
    Ok(())
}
