//! Schema retrieval.

use crate::{Result, XsdError};
use reqwest::blocking::Client;
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

/// Something that can hand out the text of a schema document by URL.
///
/// Failures must surface as [`XsdError::Transport`]; callers never retry.
pub trait SchemaSource {
    fn fetch(&self, url: &Url) -> Result<String>;
}

/// Fetches `http(s)://` documents with a blocking `reqwest` client and reads
/// `file://` documents from disk.
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl SchemaSource for HttpSource {
    fn fetch(&self, url: &Url) -> Result<String> {
        match url.scheme() {
            "http" | "https" => {
                debug!("retrieving schema at {}...", url);
                let res = self
                    .client
                    .get(url.clone())
                    .send()
                    .map_err(|e| XsdError::transport(url, e))?;
                debug!("retrieved schema with status code: {}", res.status());
                res.error_for_status()
                    .map_err(|e| XsdError::transport(url, e))?
                    .text()
                    .map_err(|e| XsdError::transport(url, e))
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| XsdError::transport(url, "not a local file path"))?;
                debug!("reading schema from {}", path.display());
                std::fs::read_to_string(&path).map_err(|e| XsdError::transport(url, e))
            }
            other => Err(XsdError::transport(
                url,
                format!("unsupported URL scheme '{}'", other),
            )),
        }
    }
}

/// In-memory documents keyed by URL.
///
/// Every request is recorded, including ones for unknown URLs, so tests can
/// assert what the loader asked for.
#[derive(Debug, Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
    requested: RefCell<Vec<Url>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`MemorySource::insert`].
    pub fn with_document(mut self, url: &str, text: impl Into<String>) -> Self {
        self.insert(url, text);
        self
    }

    pub fn insert(&mut self, url: &str, text: impl Into<String>) {
        let key = Url::parse(url)
            .map(String::from)
            .unwrap_or_else(|_| url.to_string());
        self.documents.insert(key, text.into());
    }

    /// All URLs requested so far, in request order.
    pub fn requested(&self) -> Vec<Url> {
        self.requested.borrow().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requested
            .borrow()
            .iter()
            .filter(|requested| requested.as_str() == url)
            .count()
    }
}

impl SchemaSource for MemorySource {
    fn fetch(&self, url: &Url) -> Result<String> {
        self.requested.borrow_mut().push(url.clone());
        self.documents
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| XsdError::transport(url, "404 Not Found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_records_requests() {
        let source = MemorySource::new().with_document("https://example.org/a.xsd", "<schema/>");
        let a = Url::parse("https://example.org/a.xsd").unwrap();
        let b = Url::parse("https://example.org/b.xsd").unwrap();

        assert_eq!(source.fetch(&a).unwrap(), "<schema/>");
        assert!(matches!(source.fetch(&b), Err(XsdError::Transport { .. })));
        assert_eq!(source.requested(), vec![a, b]);
        assert_eq!(source.request_count("https://example.org/a.xsd"), 1);
    }

    #[test]
    fn test_http_source_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.xsd");
        std::fs::write(&path, "<schema/>").unwrap();

        let url = Url::from_file_path(&path).unwrap();
        assert_eq!(HttpSource::new().fetch(&url).unwrap(), "<schema/>");

        let missing = Url::from_file_path(dir.path().join("missing.xsd")).unwrap();
        assert!(matches!(
            HttpSource::new().fetch(&missing),
            Err(XsdError::Transport { .. })
        ));
    }

    #[test]
    fn test_http_source_rejects_unknown_scheme() {
        let url = Url::parse("ftp://example.org/a.xsd").unwrap();
        let err = HttpSource::new().fetch(&url).unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }
}
