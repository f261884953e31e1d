//! Reference photo collections.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::CorpusError;

/// File extensions [`DirectoryCorpus`] picks up (compared case-insensitively).
pub const CORPUS_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

/// One reference photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusRecord {
    pub id: String,
    pub filename: String,
    pub photo: Vec<u8>,
}

impl CorpusRecord {
    pub fn new(id: impl Into<String>, filename: impl Into<String>, photo: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            photo,
        }
    }

    pub fn reference(&self) -> RecordRef {
        RecordRef {
            id: self.id.clone(),
            filename: self.filename.clone(),
        }
    }
}

/// Identifies a record in search output without carrying its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRef {
    pub id: String,
    pub filename: String,
}

/// Source of reference photos. Records are read-only; order is the corpus order.
#[async_trait]
pub trait CorpusProvider: Send + Sync {
    async fn records(&self) -> Result<Vec<CorpusRecord>, CorpusError>;
}

/// Fixed records held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    records: Vec<CorpusRecord>,
}

impl InMemoryCorpus {
    pub fn new(records: Vec<CorpusRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CorpusProvider for InMemoryCorpus {
    async fn records(&self) -> Result<Vec<CorpusRecord>, CorpusError> {
        Ok(self.records.clone())
    }
}

/// Image files in one directory (not recursive), re-read on every call.
///
/// Records are sorted by filename and identified by file stem. Files that cannot be
/// read are skipped with a warning.
#[derive(Debug, Clone)]
pub struct DirectoryCorpus {
    root: PathBuf,
}

impl DirectoryCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// `true` if `path` has one of [`CORPUS_EXTENSIONS`].
pub fn is_corpus_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            CORPUS_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

#[async_trait]
impl CorpusProvider for DirectoryCorpus {
    async fn records(&self) -> Result<Vec<CorpusRecord>, CorpusError> {
        let dir_err = |source| CorpusError::Directory {
            path: self.root.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(dir_err)?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(dir_err)? {
            let path = entry.path();
            if is_corpus_image(&path) {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let id = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| filename.clone());

            match tokio::fs::read(&path).await {
                Ok(photo) => records.push(CorpusRecord { id, filename, photo }),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable corpus file");
                }
            }
        }

        debug!(root = %self.root.display(), records = records.len(), "Corpus loaded");
        Ok(records)
    }
}
