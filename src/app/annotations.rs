// RegSift - app/annotations.rs
//
// Persisted annotation overlay keyed by organisation number.
//
// - Read once at construction; a corrupt or unreadable stored value is logged
//   and the store starts empty.
// - Every merge updates memory first, then writes the full mapping back
//   (write-through, no batching).
// - Entries are never removed, including when a dataset is reloaded.

use crate::core::annotation::{Annotation, AnnotationLookup, AnnotationPatch, DEFAULT_ANNOTATION};
use crate::platform::fs::KeyValueStore;
use crate::util::constants::ANNOTATIONS_KEY;
use crate::util::error::PersistenceError;
use std::collections::{BTreeMap, HashMap};

/// Annotation overlay backed by a key-value store.
#[derive(Debug)]
pub struct AnnotationStore<S: KeyValueStore> {
    backend: S,
    entries: HashMap<String, Annotation>,
}

impl<S: KeyValueStore> AnnotationStore<S> {
    /// Load the stored mapping from `backend`.
    pub fn load(backend: S) -> Self {
        let entries = match read_entries(&backend) {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "Annotations loaded");
                entries
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored annotations unusable, starting empty");
                HashMap::new()
            }
        };
        Self { backend, entries }
    }

    /// Annotation for `org_number`, or the default when none was ever stored.
    pub fn get(&self, org_number: &str) -> &Annotation {
        self.entries.get(org_number).unwrap_or(&DEFAULT_ANNOTATION)
    }

    /// Shallow-merge `patch` over the current-or-default annotation and
    /// persist the whole mapping.
    ///
    /// The in-memory value is updated even when the write fails, so the
    /// running session keeps the user's edit.
    pub fn merge(&mut self, org_number: &str, patch: &AnnotationPatch) -> Result<(), PersistenceError> {
        if patch.is_empty() {
            tracing::trace!(org_number, "Empty annotation patch ignored");
            return Ok(());
        }

        self.entries
            .entry(org_number.to_string())
            .or_default()
            .apply(patch);

        tracing::debug!(
            org_number,
            status = ?patch.status,
            comment_changed = patch.comment.is_some(),
            favorite = ?patch.is_favorite,
            "Annotation merged"
        );

        self.persist()
    }

    /// Flip the favorite flag for `org_number`; returns the new value.
    pub fn toggle_favorite(&mut self, org_number: &str) -> Result<bool, PersistenceError> {
        let is_favorite = !self.get(org_number).is_favorite;
        self.merge(org_number, &AnnotationPatch::favorite(is_favorite))?;
        Ok(is_favorite)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored annotations in organisation-number order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Annotation)> {
        let ordered: BTreeMap<&str, &Annotation> =
            self.entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
        ordered.into_iter()
    }

    fn persist(&self) -> Result<(), PersistenceError> {
        let ordered: BTreeMap<&String, &Annotation> = self.entries.iter().collect();
        let json = serde_json::to_string(&ordered).map_err(|e| PersistenceError::Encode {
            key: ANNOTATIONS_KEY.to_string(),
            source: e,
        })?;
        self.backend.write(ANNOTATIONS_KEY, &json).map_err(|e| {
            tracing::error!(error = %e, "Failed to persist annotations");
            e
        })
    }
}

impl<S: KeyValueStore> AnnotationLookup for AnnotationStore<S> {
    fn annotation(&self, org_number: &str) -> &Annotation {
        self.get(org_number)
    }
}

fn read_entries<S: KeyValueStore>(backend: &S) -> Result<HashMap<String, Annotation>, PersistenceError> {
    let Some(raw) = backend.read(ANNOTATIONS_KEY)? else {
        return Ok(HashMap::new());
    };
    if raw.trim().is_empty() {
        return Ok(HashMap::new());
    }
    serde_json::from_str(&raw).map_err(|e| PersistenceError::Decode {
        key: ANNOTATIONS_KEY.to_string(),
        source: e,
    })
}
