//! Optional per-file metadata store (`metadata.json`).
//!
//! The file maps media file names to display metadata:
//!
//! ```json
//! {
//!   "worker1.png": { "name": "Worker 1", "desc": "Short bio or quote." },
//!   "droneA.gif":  { "name": "Drone A",  "desc": "Villainous and dramatic." }
//! }
//! ```
//!
//! The store is consulted, never required: a missing or malformed file
//! degrades to an empty store (a parse failure is logged once).

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// ItemMeta
// ---------------------------------------------------------------------------

/// Display metadata for a single media file.  Both fields are optional so a
/// partially filled entry still contributes what it has.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemMeta {
    /// Human-readable display name.
    pub name: Option<String>,
    /// Short description shown in the info panel.
    pub desc: Option<String>,
}

// ---------------------------------------------------------------------------
// MetadataStore
// ---------------------------------------------------------------------------

/// File-name keyed metadata lookup.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    entries: HashMap<String, ItemMeta>,
}

impl MetadataStore {
    /// Load the store from `path`.
    ///
    /// Never fails: a missing file yields an empty store, and a malformed
    /// file logs a warning and yields an empty store.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };

        match serde_json::from_str::<HashMap<String, ItemMeta>>(&content) {
            Ok(entries) => Self { entries },
            Err(e) => {
                log::warn!("ignoring malformed {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Look up metadata by media file name (not the full path).
    pub fn get(&self, file_name: &str) -> Option<&ItemMeta> {
        self.entries.get(file_name)
    }

    /// Number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_entries_by_file_name() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("metadata.json");
        std::fs::write(
            &path,
            r#"{ "a.png": { "name": "A", "desc": "first" }, "b.gif": { "name": "B" } }"#,
        )
        .expect("write");

        let store = MetadataStore::load(&path);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a.png").unwrap().name.as_deref(), Some("A"));
        assert_eq!(store.get("a.png").unwrap().desc.as_deref(), Some("first"));
        // Partial entry: desc missing is fine.
        assert!(store.get("b.gif").unwrap().desc.is_none());
        assert!(store.get("missing.png").is_none());
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let store = MetadataStore::load(Path::new("/nonexistent/metadata.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_file_degrades_to_empty() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, "{ not json").expect("write");

        let store = MetadataStore::load(&path);
        assert!(store.is_empty());
    }
}
