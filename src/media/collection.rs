//! The ordered media collection and its cursor.
//!
//! Owned exclusively by the presentation loop: background workers never see
//! a `&mut MediaCollection`, so no locking is needed around it.  Reloads
//! discard all items wholesale; there is no partial mutation.

use std::path::{Path, PathBuf};

use super::item::MediaItem;
use super::metadata::MetadataStore;

/// File extensions scanned during a collection load, lowercase.
const MEDIA_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

// ---------------------------------------------------------------------------
// MediaCollection
// ---------------------------------------------------------------------------

/// An ordered sequence of [`MediaItem`] plus a current-index cursor.
///
/// The cursor is always taken modulo the collection length while the
/// collection is non-empty; navigation on an empty collection is a no-op
/// that yields `None` and leaves the cursor at 0.
#[derive(Debug, Default)]
pub struct MediaCollection {
    items: Vec<MediaItem>,
    cursor: usize,
}

impl MediaCollection {
    /// Load every recognized media file in `dir`, deterministically sorted
    /// by file name.
    ///
    /// Files that fail to decode are logged and skipped; the collection
    /// simply shortens.  A missing or unreadable directory yields an empty
    /// collection (logged), never an error — the viewer stays usable.
    pub fn load(dir: &Path, metadata: &MetadataStore) -> Self {
        let mut paths: Vec<PathBuf> = match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| {
                            MEDIA_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str())
                        })
                })
                .collect(),
            Err(e) => {
                log::warn!("cannot read media directory {}: {e}", dir.display());
                Vec::new()
            }
        };

        // Filesystem iteration order is unspecified; sort by file name for
        // reproducible navigation.
        paths.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));

        let mut items = Vec::with_capacity(paths.len());
        for path in &paths {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match MediaItem::decode(path, metadata.get(&file_name)) {
                Ok(item) => items.push(item),
                Err(e) => log::warn!("skipping {}: {e}", path.display()),
            }
        }

        log::info!("loaded {} media item(s) from {}", items.len(), dir.display());
        Self { items, cursor: 0 }
    }

    /// The item under the cursor, or `None` when the collection is empty.
    pub fn current(&self) -> Option<&MediaItem> {
        self.items.get(self.cursor)
    }

    /// Move the cursor by `delta` (may be negative), wrapping modulo the
    /// collection length, and return the item now under it.
    ///
    /// On an empty collection this is a no-op that returns `None`; the
    /// cursor stays at its prior value.
    pub fn advance(&mut self, delta: isize) -> Option<&MediaItem> {
        let len = self.items.len();
        if len == 0 {
            return None;
        }
        let len = len as isize;
        self.cursor = (self.cursor as isize + delta).rem_euclid(len) as usize;
        self.items.get(self.cursor)
    }

    /// Point the cursor at the item whose path is `path`, if present.
    /// Returns `true` on success.
    pub fn select_path(&mut self, path: &Path) -> bool {
        if let Some(idx) = self.items.iter().position(|i| i.path() == path) {
            self.cursor = idx;
            true
        } else {
            false
        }
    }

    /// Number of items in the collection.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when the collection holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One-based cursor position for the status line, or 0 when empty.
    pub fn position(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.cursor + 1
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_png(dir: &Path, name: &str) {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([0, 0, 0]));
        img.save(dir.join(name)).expect("write png");
    }

    fn load_dir(dir: &Path) -> MediaCollection {
        MediaCollection::load(dir, &MetadataStore::default())
    }

    #[test]
    fn loads_in_lexical_order() {
        let dir = tempdir().expect("temp dir");
        // Write out of order; the load must still sort lexically.
        write_png(dir.path(), "b.png");
        write_png(dir.path(), "a.jpg");

        let col = load_dir(dir.path());
        assert_eq!(col.len(), 2);
        assert_eq!(col.current().unwrap().file_name(), "a.jpg");
    }

    #[test]
    fn ignores_unrecognized_extensions() {
        let dir = tempdir().expect("temp dir");
        write_png(dir.path(), "keep.png");
        std::fs::write(dir.path().join("notes.txt"), "hello").expect("write");
        std::fs::write(dir.path().join("metadata.json"), "{}").expect("write");

        let col = load_dir(dir.path());
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn decode_failure_shortens_collection() {
        let dir = tempdir().expect("temp dir");
        write_png(dir.path(), "good.png");
        std::fs::write(dir.path().join("bad.png"), b"junk").expect("write");

        let col = load_dir(dir.path());
        assert_eq!(col.len(), 1);
        assert_eq!(col.current().unwrap().file_name(), "good.png");
    }

    #[test]
    fn advance_wraps_cyclically() {
        let dir = tempdir().expect("temp dir");
        for name in ["a.png", "b.png", "c.png"] {
            write_png(dir.path(), name);
        }

        let mut col = load_dir(dir.path());
        let start = col.current().unwrap().file_name();

        // N forward steps return to the start (cyclic invariant).
        for _ in 0..col.len() {
            col.advance(1);
        }
        assert_eq!(col.current().unwrap().file_name(), start);

        // Negative wrap: one step back from index 0 lands on the last item.
        col.advance(-1);
        assert_eq!(col.current().unwrap().file_name(), "c.png");
        assert_eq!(col.position(), 3);
    }

    #[test]
    fn advance_on_empty_is_a_noop() {
        let dir = tempdir().expect("temp dir");
        let mut col = load_dir(dir.path());

        assert!(col.is_empty());
        assert!(col.advance(1).is_none());
        assert!(col.advance(-5).is_none());
        assert!(col.current().is_none());
        assert_eq!(col.position(), 0);
    }

    #[test]
    fn missing_directory_yields_empty_collection() {
        let col = load_dir(Path::new("/nonexistent/media"));
        assert!(col.is_empty());
    }

    #[test]
    fn select_path_moves_cursor() {
        let dir = tempdir().expect("temp dir");
        write_png(dir.path(), "a.png");
        write_png(dir.path(), "b.png");

        let mut col = load_dir(dir.path());
        assert!(col.select_path(&dir.path().join("b.png")));
        assert_eq!(col.current().unwrap().file_name(), "b.png");
        assert!(!col.select_path(Path::new("/nope.png")));
        // Failed select leaves the cursor untouched.
        assert_eq!(col.current().unwrap().file_name(), "b.png");
    }
}
