//! JSON-file persistence
//!
//! One JSON object per file. Writes go to a temp file in the same directory
//! followed by a rename, so a record file either exists completely or not
//! at all; a crash mid-run never leaves a truncated file behind.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::domain::errors::StoreError;
use crate::domain::product::ProductRecord;

/// Write a value as pretty JSON, atomically.
pub async fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let content = serde_json::to_vec_pretty(value).map_err(|e| StoreError::malformed(path, e))?;

    let mut tmp_path = path.to_path_buf();
    tmp_path.set_extension("json.tmp");

    fs::write(&tmp_path, &content)
        .await
        .map_err(|e| StoreError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;

    Ok(())
}

/// Write-through store for scraped records.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records_dir: PathBuf,
}

impl RecordStore {
    pub fn new(records_dir: impl Into<PathBuf>) -> Self {
        Self {
            records_dir: records_dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.records_dir
    }

    pub async fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.records_dir)
            .await
            .map_err(|e| StoreError::io(&self.records_dir, e))
    }

    /// Persist one record to its own file. The filename is random; nothing
    /// downstream reads meaning into it.
    pub async fn persist(&self, record: &ProductRecord) -> Result<PathBuf, StoreError> {
        let path = self.records_dir.join(format!("{}.json", Uuid::new_v4()));
        atomic_write_json(&path, record).await?;
        debug!("Persisted record from {} to {:?}", record.source_url, path);
        Ok(path)
    }

    /// Read one record file back.
    pub async fn read_record(path: &Path) -> Result<ProductRecord, StoreError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| StoreError::malformed(path, e))
    }

    /// All record file paths under a directory, sorted by name so scans are
    /// deterministic.
    pub async fn record_paths(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
        let mut entries = fs::read_dir(dir).await.map_err(|e| StoreError::io(dir, e))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(dir, e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::PageType;
    use crate::domain::supplier::SupplierIdentity;

    fn record() -> ProductRecord {
        ProductRecord::new(
            "https://shop-a.com/product/1",
            SupplierIdentity::from_host("shop-a.com"),
            PageType::Product,
        )
        .with_field("title", "Chair")
        .with_field("price", 10.0)
    }

    #[tokio::test]
    async fn persist_then_read_roundtrips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        store.ensure_dir().await.unwrap();

        let original = record();
        let path = store.persist(&original).await.unwrap();
        let back = RecordStore::read_record(&path).await.unwrap();
        assert_eq!(back, original);
    }

    #[tokio::test]
    async fn no_temp_files_remain_after_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        store.ensure_dir().await.unwrap();
        store.persist(&record()).await.unwrap();
        store.persist(&record()).await.unwrap();

        let paths = RecordStore::record_paths(dir.path()).await.unwrap();
        assert_eq!(paths.len(), 2);

        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .path()
                    .to_string_lossy()
                    .ends_with(".tmp")
            })
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn malformed_file_is_a_distinct_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = RecordStore::read_record(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[tokio::test]
    async fn record_paths_ignores_non_json_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let paths = RecordStore::record_paths(dir.path()).await.unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }
}
