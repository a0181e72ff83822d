use std::collections::HashMap;
use std::path::PathBuf;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;

/// Errors from fetching a resource.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Fetches raw bytes by slash-separated path.
pub trait ResourceResolver {
    fn load(&self, path: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, ResourceError>>;
}

/// Fetch and parse a JSON document.
pub async fn load_json<T: DeserializeOwned>(
    resolver: &dyn ResourceResolver,
    path: &str,
) -> Result<T, ResourceError> {
    let bytes = resolver.load(path).await?;
    serde_json::from_slice(&bytes).map_err(|source| ResourceError::Json {
        path: path.to_owned(),
        source,
    })
}

/// Resolves paths under a directory on disk.
#[derive(Debug, Clone)]
pub struct DirResolver {
    root: PathBuf,
}

impl DirResolver {
    /// Serve files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory every path is resolved against.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl ResourceResolver for DirResolver {
    fn load(&self, path: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, ResourceError>> {
        let full = self.root.join(path.trim_start_matches('/'));
        let path = path.to_owned();
        async move {
            std::fs::read(&full).map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    ResourceError::NotFound(path)
                } else {
                    ResourceError::Io { path, source }
                }
            })
        }
        .boxed_local()
    }
}

/// In-memory resource table, for embedding hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryResolver {
    /// An empty resolver; every load fails with `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` under `path`, replacing any previous file.
    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }

    /// Builder form of [`MemoryResolver::insert`].
    pub fn with_file(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ResourceResolver for MemoryResolver {
    fn load(&self, path: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, ResourceError>> {
        let key = path.trim_start_matches('/');
        let result = self
            .files
            .get(key)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(path.to_owned()));
        futures::future::ready(result).boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Doc {
        name: String,
    }

    #[test]
    fn dir_resolver_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("meta")).unwrap();
        std::fs::write(dir.path().join("meta/doc.json"), br#"{"name":"grass"}"#).unwrap();

        let resolver = DirResolver::new(dir.path());
        let bytes = pollster::block_on(resolver.load("/meta/doc.json")).unwrap();
        assert_eq!(bytes, br#"{"name":"grass"}"#);

        let doc: Doc = pollster::block_on(load_json(&resolver, "meta/doc.json")).unwrap();
        assert_eq!(doc.name, "grass");
    }

    #[test]
    fn dir_resolver_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = DirResolver::new(dir.path());
        let err = pollster::block_on(resolver.load("nope.png")).unwrap_err();
        assert!(matches!(err, ResourceError::NotFound(p) if p == "nope.png"));
    }

    #[test]
    fn memory_resolver_serves_inserted_files() {
        let resolver = MemoryResolver::new().with_file("a/b.txt", b"hi".to_vec());
        assert_eq!(pollster::block_on(resolver.load("a/b.txt")).unwrap(), b"hi");
        assert!(pollster::block_on(resolver.load("a/c.txt")).is_err());
    }

    #[test]
    fn malformed_json_is_reported_with_path() {
        let resolver = MemoryResolver::new().with_file("bad.json", b"{".to_vec());
        let err = pollster::block_on(load_json::<Doc>(&resolver, "bad.json")).unwrap_err();
        assert!(matches!(err, ResourceError::Json { ref path, .. } if path == "bad.json"));
    }
}
