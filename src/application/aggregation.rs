//! Aggregation stage
//!
//! Consolidates the per-page record files of one or more runs into one
//! JSON file per supplier. The supplier identity is recomputed from each
//! record's source URL rather than trusted from the stored field, so a
//! record always lands in the group its URL actually belongs to. Output is
//! a full rebuild: existing supplier files are replaced, never merged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::domain::errors::StoreError;
use crate::domain::product::{AggregatedSupplierFile, ProductRecord};
use crate::domain::supplier::SupplierIdentity;
use crate::infrastructure::storage::{RecordStore, atomic_write_json};

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct AggregateReport {
    /// Records written per supplier
    pub written: BTreeMap<SupplierIdentity, usize>,

    /// Source files skipped because they could not be read, parsed, or
    /// attributed to a supplier
    pub files_skipped: usize,
}

/// Single-pass, single-writer consolidation of persisted records.
pub struct AggregationStage {
    output_dir: PathBuf,
}

impl AggregationStage {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Aggregate every record file under `source_dir`.
    ///
    /// Per-file failures are logged, counted, and skipped; only failures on
    /// the directories themselves abort the pass.
    pub async fn aggregate(&self, source_dir: &Path) -> Result<AggregateReport, StoreError> {
        let paths = RecordStore::record_paths(source_dir).await?;
        info!(
            "Aggregating {} record files from {:?}",
            paths.len(),
            source_dir
        );

        let mut groups: BTreeMap<SupplierIdentity, Vec<ProductRecord>> = BTreeMap::new();
        let mut files_skipped = 0;

        for path in &paths {
            let record = match RecordStore::read_record(path).await {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable record file: {}", e);
                    files_skipped += 1;
                    continue;
                }
            };

            // Recomputed, not trusted from the stored supplier field.
            let identity = match SupplierIdentity::from_url(&record.source_url) {
                Ok(identity) => identity,
                Err(e) => {
                    warn!("Skipping record with unusable source URL in {:?}: {}", path, e);
                    files_skipped += 1;
                    continue;
                }
            };

            groups.entry(identity).or_default().push(record);
        }

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| StoreError::io(&self.output_dir, e))?;

        let mut report = AggregateReport {
            files_skipped,
            ..AggregateReport::default()
        };

        for (supplier, mut records) in groups {
            // Deterministic order: repeat runs over the same source
            // directory produce byte-identical files.
            records.sort_by(|a, b| {
                (a.source_url.as_str(), a.fetched_at).cmp(&(b.source_url.as_str(), b.fetched_at))
            });

            let path = self.output_dir.join(format!("{supplier}.json"));
            let file = AggregatedSupplierFile {
                supplier: supplier.clone(),
                records,
            };
            if let Err(e) = atomic_write_json(&path, &file).await {
                warn!("Failed to write aggregate for '{}': {}", supplier, e);
                report.files_skipped += 1;
                continue;
            }

            info!("Wrote {} records to {:?}", file.records.len(), path);
            report.written.insert(supplier, file.records.len());
        }

        Ok(report)
    }
}
