use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::camera::{ATTRIBUTE_NAMES, CameraRecord};
use crate::error::{DedupError, Result};
use crate::libxml2::{LibXml2Error, LibXml2Wrapper};

/// Name of the elements holding camera entries
pub const CAMERA_ELEMENT: &str = "camera";

/// Reads camera elements into typed records
///
/// File I/O is async; libxml2 parsing runs on the blocking pool.
pub struct RecordExtractor {
    libxml2: Arc<LibXml2Wrapper>,
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordExtractor {
    pub fn new() -> Self {
        Self {
            libxml2: Arc::new(LibXml2Wrapper::new()),
        }
    }

    /// Extract one record per `camera` child of the root, in document order
    ///
    /// # Errors
    ///
    /// `DedupError::InputNotFound` when `path` is not a readable file,
    /// `DedupError::MalformedInput` when the file is not well-formed XML.
    pub async fn extract_file(&self, path: &Path) -> Result<Vec<CameraRecord>> {
        // Missing, unreadable and non-file paths all count as "not found"
        let data = tokio::fs::read(path).await.map_err(|e| {
            debug!(path = %path.display(), error = %e, "failed to read input");
            DedupError::InputNotFound {
                path: path.to_path_buf(),
            }
        })?;

        let libxml2 = Arc::clone(&self.libxml2);
        let source = path.to_path_buf();
        let records = tokio::task::spawn_blocking(move || parse_with(&libxml2, &data, source))
            .await
            .map_err(|e| DedupError::Concurrency {
                details: format!("Join error: {}", e),
            })??;

        debug!(path = %path.display(), count = records.len(), "extracted camera records");
        Ok(records)
    }

    /// Extract records from an in-memory document
    pub fn parse_bytes(&self, data: &[u8]) -> Result<Vec<CameraRecord>> {
        parse_with(&self.libxml2, data, PathBuf::from("<memory>"))
    }
}

fn parse_with(libxml2: &LibXml2Wrapper, data: &[u8], source: PathBuf) -> Result<Vec<CameraRecord>> {
    let elements = libxml2
        .read_child_elements(data, CAMERA_ELEMENT, &ATTRIBUTE_NAMES)
        .map_err(|e| match e {
            LibXml2Error::MalformedDocument { details } => DedupError::MalformedInput {
                path: source.clone(),
                details,
            },
            other => DedupError::MalformedInput {
                path: source.clone(),
                details: other.to_string(),
            },
        })?;

    Ok(elements
        .into_iter()
        .map(|mut attrs| CameraRecord::from_lookup(|name| attrs.remove(name)))
        .collect())
}
