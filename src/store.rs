//! In-memory document store.
//!
//! Uploaded documents live for the lifetime of the process: there is no
//! eviction, no size bound, and nothing survives a restart. The store sits
//! behind the [`DocumentStore`] trait so the HTTP layer can be handed a
//! different implementation (a persistent one, or a test double) without
//! changing any handler.
//!
//! ## Which document answers a question?
//!
//! A question normally does not say which document it is about. The store
//! resolves that through an explicit [`ActiveDocumentPolicy`] rather than
//! whatever a hash map happens to iterate first:
//!
//! | Policy | Active document |
//! |--------|-----------------|
//! | `FirstUploaded` (default) | the earliest filename still stored; re-uploading it keeps its position |
//! | `MostRecent` | the filename written most recently |
//!
//! With a single document both policies agree. With several, a caller that
//! cares should name the document in the request.

use crate::error::PdfQaError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// How the active document is picked when a question names none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveDocumentPolicy {
    /// First filename ever inserted (and not cleared). Overwrites keep the slot.
    #[default]
    FirstUploaded,
    /// Filename of the latest `put`, including overwrites.
    MostRecent,
}

/// A document held in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub filename: String,
    /// Full extracted text, one `\n`-terminated chunk per page.
    pub text: Arc<str>,
    pub page_count: usize,
}

/// Keyed storage for extracted document text.
///
/// Implementations must be safe to share across request tasks.
pub trait DocumentStore: Send + Sync {
    /// Insert a document, replacing any previous text for `filename`.
    fn put(&self, filename: &str, text: String, page_count: usize);

    /// Look up a document by filename.
    fn get(&self, filename: &str) -> Option<StoredDocument>;

    /// The document questions are answered against.
    ///
    /// Fails with [`PdfQaError::NoDocument`] when the store is empty.
    fn get_active(&self) -> Result<StoredDocument, PdfQaError>;

    /// Remove every document.
    fn clear(&self);

    /// Number of stored documents.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored filenames in insertion order.
    fn filenames(&self) -> Vec<String>;
}

#[derive(Debug)]
struct Entry {
    doc: StoredDocument,
    /// Sequence number of the first insert of this filename.
    inserted: u64,
    /// Sequence number of the latest write.
    updated: u64,
}

#[derive(Debug, Default)]
struct Inner {
    docs: HashMap<String, Entry>,
    next_seq: u64,
}

/// Process-memory [`DocumentStore`] guarded by a read/write lock.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<Inner>,
    policy: ActiveDocumentPolicy,
}

impl InMemoryDocumentStore {
    pub fn new(policy: ActiveDocumentPolicy) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            policy,
        }
    }

    pub fn policy(&self) -> ActiveDocumentPolicy {
        self.policy
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn put(&self, filename: &str, text: String, page_count: usize) {
        let mut inner = self.inner.write();
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let doc = StoredDocument {
            filename: filename.to_string(),
            text: Arc::from(text),
            page_count,
        };

        match inner.docs.get_mut(filename) {
            Some(entry) => {
                debug!("Overwriting stored document '{}'", filename);
                entry.doc = doc;
                entry.updated = seq;
            }
            None => {
                inner.docs.insert(
                    filename.to_string(),
                    Entry {
                        doc,
                        inserted: seq,
                        updated: seq,
                    },
                );
            }
        }
    }

    fn get(&self, filename: &str) -> Option<StoredDocument> {
        self.inner.read().docs.get(filename).map(|e| e.doc.clone())
    }

    fn get_active(&self) -> Result<StoredDocument, PdfQaError> {
        let inner = self.inner.read();
        let entry = match self.policy {
            ActiveDocumentPolicy::FirstUploaded => inner.docs.values().min_by_key(|e| e.inserted),
            ActiveDocumentPolicy::MostRecent => inner.docs.values().max_by_key(|e| e.updated),
        };
        entry.map(|e| e.doc.clone()).ok_or(PdfQaError::NoDocument)
    }

    fn clear(&self) {
        self.inner.write().docs.clear();
    }

    fn len(&self) -> usize {
        self.inner.read().docs.len()
    }

    fn filenames(&self) -> Vec<String> {
        let inner = self.inner.read();
        let mut entries: Vec<&Entry> = inner.docs.values().collect();
        entries.sort_by_key(|e| e.inserted);
        entries.into_iter().map(|e| e.doc.filename.clone()).collect()
    }
}
