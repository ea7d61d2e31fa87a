//! The tree store — owns the forest and its load / persist lifecycle.
//!
//! Resolution order at startup: the persisted snapshot wins over the source
//! document (the snapshot is what the user last saw), and a forest that can't
//! be read from either place degrades to empty.  Load failures are reported
//! through a log line only; the sidebar always comes up.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::tree::{Forest, NodeId, NodeKind, WireNode};

// ───────────────────────────────────────── errors ────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed sidebar document {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write snapshot {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ───────────────────────────────────────── store ─────────────

/// Owns the in-memory forest plus the snapshot path it persists to.
///
/// All mutation goes through [`append_child`](TreeStore::append_child) /
/// [`append_root`](TreeStore::append_root); callers persist after each
/// mutation so a reload always reproduces the forest the user last saw.
#[derive(Debug)]
pub struct TreeStore {
    pub forest: Forest,
    snapshot_path: PathBuf,
}

impl TreeStore {
    /// Resolve the forest at startup.
    ///
    /// Prefers `snapshot` over `source` unless `fresh` is set.  Never fails:
    /// an unreadable or malformed document logs a diagnostic and the next
    /// candidate (ultimately an empty forest) is used.
    pub async fn load(source: &Path, snapshot: PathBuf, fresh: bool) -> Self {
        let forest = if !fresh && snapshot.exists() {
            match read_forest(&snapshot).await {
                Ok(forest) => forest,
                Err(err) => {
                    tracing::error!("snapshot unusable, trying source: {err}");
                    load_source(source).await
                }
            }
        } else {
            load_source(source).await
        };

        Self {
            forest,
            snapshot_path: snapshot,
        }
    }

    /// A store over an existing forest, for tests and tools.
    pub fn with_forest(forest: Forest, snapshot_path: PathBuf) -> Self {
        Self {
            forest,
            snapshot_path,
        }
    }

    /// Append a node to the end of `parent`'s children.  No duplicate-name
    /// check, matching the permissive sidebar semantics.
    pub fn append_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        kind: NodeKind,
    ) -> NodeId {
        self.forest.add_child(parent, name, kind)
    }

    /// Append a node to the end of the root level.
    pub fn append_root(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        self.forest.add_root(name, kind)
    }

    /// Serialize the full forest to the snapshot path.  Called after every
    /// mutation; the parent directory is created on first write.
    pub fn persist(&self) -> Result<(), StoreError> {
        let path = &self.snapshot_path;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(&self.forest.to_wire()).map_err(|source| {
            StoreError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        std::fs::write(path, json).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })
    }
}

/// Read the source document, degrading to an empty forest on any failure.
async fn load_source(source: &Path) -> Forest {
    match read_forest(source).await {
        Ok(forest) => forest,
        Err(err) => {
            tracing::error!("failed to load sidebar data: {err}");
            Forest::new()
        }
    }
}

/// Read and decode one wire document into a forest.
async fn read_forest(path: &Path) -> Result<Forest, StoreError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let wire: Vec<WireNode> =
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Forest::from_wire(&wire))
}

/// Default snapshot location: `$XDG_DATA_HOME/treebar/sidebar.json`
/// (falling back to `~/.local/share`).
pub fn default_snapshot_path() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".local").join("share")
        });
    data_dir.join("treebar").join("sidebar.json")
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SOURCE_DOC: &str = r#"[
        {"type": "folder", "name": "src", "children": [
            {"type": "file", "name": "a.js"}
        ]},
        {"type": "file", "name": "notes.md"}
    ]"#;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn load_reads_the_source_document() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "sidebar.json", SOURCE_DOC);
        let store = TreeStore::load(&source, dir.path().join("snap.json"), false).await;
        assert_eq!(store.forest.roots.len(), 2);
        assert!(store.forest.find_folder("src").is_some());
    }

    #[tokio::test]
    async fn missing_source_degrades_to_empty_forest() {
        let dir = TempDir::new().unwrap();
        let store = TreeStore::load(
            &dir.path().join("nowhere.json"),
            dir.path().join("snap.json"),
            false,
        )
        .await;
        assert!(store.forest.is_empty());
    }

    #[tokio::test]
    async fn malformed_source_degrades_to_empty_forest() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "sidebar.json", "{ not json");
        let store = TreeStore::load(&source, dir.path().join("snap.json"), false).await;
        assert!(store.forest.is_empty());
    }

    #[tokio::test]
    async fn snapshot_is_preferred_over_source() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "sidebar.json", SOURCE_DOC);
        let snapshot = write(&dir, "snap.json", r#"[{"type": "file", "name": "only.js"}]"#);

        let store = TreeStore::load(&source, snapshot, false).await;
        assert_eq!(store.forest.roots.len(), 1);
        assert_eq!(store.forest.get(store.forest.roots[0]).name, "only.js");
    }

    #[tokio::test]
    async fn fresh_flag_skips_the_snapshot() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "sidebar.json", SOURCE_DOC);
        let snapshot = write(&dir, "snap.json", r#"[{"type": "file", "name": "only.js"}]"#);

        let store = TreeStore::load(&source, snapshot, true).await;
        assert_eq!(store.forest.roots.len(), 2);
    }

    #[tokio::test]
    async fn persist_then_reload_reproduces_the_forest() {
        let dir = TempDir::new().unwrap();
        let source = write(&dir, "sidebar.json", SOURCE_DOC);
        let snapshot = dir.path().join("snap.json");

        let mut store = TreeStore::load(&source, snapshot.clone(), false).await;
        let src = store.forest.find_folder("src").unwrap();
        store.append_child(src, "b.js", NodeKind::File);
        store.append_root("assets", NodeKind::Folder);
        store.persist().unwrap();

        let reloaded = TreeStore::load(&source, snapshot, false).await;
        assert_eq!(reloaded.forest.to_wire(), store.forest.to_wire());
        let src = reloaded.forest.find_folder("src").unwrap();
        assert_eq!(reloaded.forest.get(src).children.len(), 2);
    }

    #[tokio::test]
    async fn persist_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let snapshot = dir.path().join("deep").join("nested").join("snap.json");
        let mut store = TreeStore::with_forest(Forest::new(), snapshot.clone());
        store.append_root("x", NodeKind::File);
        store.persist().unwrap();
        assert!(snapshot.exists());
    }
}
