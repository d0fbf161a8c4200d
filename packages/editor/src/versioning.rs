//! # Version Snapshots
//!
//! Immutable full-document snapshots and the persistence collaborator.
//!
//! A `DocumentVersion` is created by an explicit snapshot action
//! (`manual`), automatically right before a revert (`safety`), or by a
//! background policy (`auto`). Once created it is never mutated; only a
//! full-document revert consumes one, never a partial merge. Snapshot
//! content sits behind `Arc`, so repeated diff/compare operations share
//! it by reference without copying.
//!
//! Storage itself is out of scope: the core calls a
//! [`PersistenceProvider`], it never implements one. An in-memory
//! provider ships for tests and single-process embedding.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use folio_model::Document;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a snapshot came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    Manual,
    Safety,
    Auto,
}

/// An immutable, timestamped full copy of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub id: String,
    /// Monotonic per document, assigned by the persistence provider.
    pub version_number: u64,
    pub title: String,
    pub content: Arc<Document>,
    pub version_type: VersionType,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Whether a revert secures the current state first.
///
/// The safety snapshot is the default; skipping it is an explicit caller
/// decision, never an implicit fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SafetyPolicy {
    #[default]
    CreateSnapshot,
    Skip,
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Effectful storage collaborator. The core calls these operations and
/// treats their internals as opaque.
pub trait PersistenceProvider {
    fn load(&self, document_id: &str) -> Result<Document, PersistenceError>;

    fn save(&mut self, document: &Document) -> Result<(), PersistenceError>;

    fn list_versions(&self, document_id: &str) -> Result<Vec<DocumentVersion>, PersistenceError>;

    fn create_version(
        &mut self,
        document: &Document,
        label: &str,
        version_type: VersionType,
    ) -> Result<DocumentVersion, PersistenceError>;
}

/// In-memory provider for tests and single-process embedding.
#[derive(Debug)]
pub struct InMemoryPersistence {
    documents: HashMap<String, Document>,
    versions: HashMap<String, Vec<DocumentVersion>>,
    author: String,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::with_author("local")
    }

    pub fn with_author(author: impl Into<String>) -> Self {
        Self {
            documents: HashMap::new(),
            versions: HashMap::new(),
            author: author.into(),
        }
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistenceProvider for InMemoryPersistence {
    fn load(&self, document_id: &str) -> Result<Document, PersistenceError> {
        self.documents
            .get(document_id)
            .cloned()
            .ok_or_else(|| PersistenceError::DocumentNotFound(document_id.to_string()))
    }

    fn save(&mut self, document: &Document) -> Result<(), PersistenceError> {
        self.documents
            .insert(document.id.clone(), document.clone());
        Ok(())
    }

    fn list_versions(&self, document_id: &str) -> Result<Vec<DocumentVersion>, PersistenceError> {
        Ok(self.versions.get(document_id).cloned().unwrap_or_default())
    }

    fn create_version(
        &mut self,
        document: &Document,
        label: &str,
        version_type: VersionType,
    ) -> Result<DocumentVersion, PersistenceError> {
        let versions = self.versions.entry(document.id.clone()).or_default();
        let version_number = versions.last().map(|v| v.version_number).unwrap_or(0) + 1;

        let version = DocumentVersion {
            id: format!("{}-v{}", document.id, version_number),
            version_number,
            title: label.to_string(),
            content: Arc::new(document.clone()),
            version_type,
            created_by: self.author.clone(),
            created_at: Utc::now(),
        };
        versions.push(version.clone());
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_numbers_are_monotonic_per_document() {
        let mut store = InMemoryPersistence::new();
        let doc_a = Document::new("doc-a", "A");
        let doc_b = Document::new("doc-b", "B");

        let v1 = store
            .create_version(&doc_a, "first", VersionType::Manual)
            .unwrap();
        let v2 = store
            .create_version(&doc_a, "second", VersionType::Auto)
            .unwrap();
        let other = store
            .create_version(&doc_b, "first", VersionType::Manual)
            .unwrap();

        assert_eq!(v1.version_number, 1);
        assert_eq!(v2.version_number, 2);
        assert_eq!(other.version_number, 1);
    }

    #[test]
    fn test_snapshot_content_is_isolated_from_later_edits() {
        let mut store = InMemoryPersistence::new();
        let mut doc = Document::new("doc-1", "Before");

        let version = store
            .create_version(&doc, "checkpoint", VersionType::Manual)
            .unwrap();

        doc.title = "After".to_string();
        assert_eq!(version.content.title, "Before");
    }

    #[test]
    fn test_load_unknown_document_fails() {
        let store = InMemoryPersistence::new();
        assert!(matches!(
            store.load("missing"),
            Err(PersistenceError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let mut store = InMemoryPersistence::new();
        let doc = Document::new("doc-1", "Saved");
        store.save(&doc).unwrap();

        let loaded = store.load("doc-1").unwrap();
        assert_eq!(loaded, doc);
    }
}
