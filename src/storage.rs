//! Filesystem storage layer.
//!
//! One directory per stage under a data root; an item is the file
//! `<root>/<stage>/<id>`. Only the move processor renames files. Request
//! handlers only read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use crate::error::Result;
use crate::model::{ItemId, Stage};

/// Storage backend. Owns the data root.
#[derive(Debug, Clone)]
pub struct StageStore {
    root: PathBuf,
}

impl StageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory backing `stage`.
    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.dir_name())
    }

    /// File backing item `id` while it is in `stage`.
    pub fn path_for(&self, stage: Stage, id: ItemId) -> PathBuf {
        self.stage_dir(stage).join(id.to_string())
    }

    /// Create every stage directory that does not exist yet.
    pub async fn ensure_layout(&self) -> Result<()> {
        for stage in Stage::ALL {
            tokio::fs::create_dir_all(self.stage_dir(stage)).await?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Scanning
    // -----------------------------------------------------------------------

    /// List the item IDs present in `stage`'s directory.
    ///
    /// Entries whose names are not positive integers are skipped. An
    /// unreadable directory yields an empty list; seeding carries on with
    /// the other stages.
    pub async fn scan(&self, stage: Stage) -> Vec<ItemId> {
        let dir = self.stage_dir(stage);
        match scan_dir(&dir).await {
            Ok(ids) => {
                debug!(%stage, count = ids.len(), "scanned stage directory");
                ids
            }
            Err(e) => {
                error!(dir = %dir.display(), "cannot read stage directory: {e}");
                Vec::new()
            }
        }
    }

    /// Scan every stage and report IDs found in more than one directory,
    /// with the stages holding them.
    pub async fn audit(&self) -> Layout {
        let mut layout = Layout::default();
        for stage in Stage::ALL {
            let ids = self.scan(stage).await;
            for id in &ids {
                layout.locations.entry(*id).or_default().push(stage);
            }
            layout.counts.push((stage, ids.len()));
        }
        layout
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Read the content of item `id` from `stage`.
    pub async fn read(&self, stage: Stage, id: ItemId) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.path_for(stage, id)).await?)
    }

    /// Move the file for `id` from one stage directory to another.
    pub async fn rename(&self, id: ItemId, from: Stage, to: Stage) -> Result<()> {
        let old_path = self.path_for(from, id);
        let new_path = self.path_for(to, id);
        tokio::fs::rename(&old_path, &new_path).await?;
        debug!(
            old = %old_path.display(),
            new = %new_path.display(),
            "item file moved"
        );
        Ok(())
    }
}

/// Result of [`StageStore::audit`].
#[derive(Debug, Default)]
pub struct Layout {
    /// Number of item files per stage, in [`Stage::ALL`] order.
    pub counts: Vec<(Stage, usize)>,
    locations: BTreeMap<ItemId, Vec<Stage>>,
}

impl Layout {
    /// IDs present in more than one stage directory.
    pub fn conflicts(&self) -> Vec<(ItemId, Vec<Stage>)> {
        self.locations
            .iter()
            .filter(|(_, stages)| stages.len() > 1)
            .map(|(id, stages)| (*id, stages.clone()))
            .collect()
    }
}

async fn scan_dir(dir: &Path) -> std::io::Result<Vec<ItemId>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut ids = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        match name.to_str().map(str::parse::<ItemId>) {
            Some(Ok(id)) => ids.push(id),
            _ => warn!(dir = %dir.display(), name = ?name, "skipping non-item file name"),
        }
    }

    ids.sort_unstable();
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> ItemId {
        ItemId::new(n).unwrap()
    }

    #[tokio::test]
    async fn scan_skips_non_numeric_and_zero_names() {
        let tmp = tempfile::tempdir().unwrap();
        let store = StageStore::new(tmp.path());
        store.ensure_layout().await.unwrap();

        let review = store.stage_dir(Stage::Review);
        for name in ["12", "3", "0", "notes.txt", "comment-4"] {
            std::fs::write(review.join(name), b"x").unwrap();
        }

        assert_eq!(store.scan(Stage::Review).await, vec![id(3), id(12)]);
    }

    #[tokio::test]
    async fn scan_of_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = StageStore::new(tmp.path().join("nope"));
        assert!(store.scan(Stage::Accept).await.is_empty());
    }

    #[tokio::test]
    async fn rename_moves_file_between_stage_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let store = StageStore::new(tmp.path());
        store.ensure_layout().await.unwrap();
        std::fs::write(store.path_for(Stage::Review, id(7)), b"body").unwrap();

        store.rename(id(7), Stage::Review, Stage::Reject).await.unwrap();

        assert!(!store.path_for(Stage::Review, id(7)).exists());
        assert_eq!(store.read(Stage::Reject, id(7)).await.unwrap(), b"body");
    }

    #[tokio::test]
    async fn audit_reports_ids_in_two_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let store = StageStore::new(tmp.path());
        store.ensure_layout().await.unwrap();
        std::fs::write(store.path_for(Stage::Review, id(1)), b"a").unwrap();
        std::fs::write(store.path_for(Stage::Review, id(2)), b"b").unwrap();
        std::fs::write(store.path_for(Stage::Accept, id(2)), b"b").unwrap();

        let layout = store.audit().await;
        assert_eq!(
            layout.counts,
            vec![(Stage::Review, 2), (Stage::Accept, 1), (Stage::Reject, 0)]
        );
        assert_eq!(
            layout.conflicts(),
            vec![(id(2), vec![Stage::Review, Stage::Accept])]
        );
    }
}
