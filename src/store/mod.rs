use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::record::PatientRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid record at line {line}: {source}")]
    Decode {
        line: usize,
        source: serde_json::Error,
    },
    #[error("failed to encode record {patient_id}: {source}")]
    Encode {
        patient_id: String,
        source: serde_json::Error,
    },
}

/// Bulk insertion plus the read side used by reporting and dashboards.
pub trait RecordStore {
    fn insert_many(&mut self, records: &[PatientRecord]) -> Result<usize, StoreError>;
    fn query_by_cohort(
        &self,
        cohort: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PatientRecord>, StoreError>;
    fn distinct_cohorts(&self) -> Result<Vec<String>, StoreError>;
    fn count(&self) -> Result<usize, StoreError>;
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// One JSON record per line; inserts append.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored record in insertion order; a missing file is an empty
    /// store.
    #[cfg(test)]
    pub fn load_all(&self) -> Result<Vec<PatientRecord>, StoreError> {
        let mut out = Vec::new();
        self.scan(|record| {
            out.push(record);
            true
        })?;
        Ok(out)
    }

    fn scan(&self, mut visit: impl FnMut(PatientRecord) -> bool) -> Result<(), StoreError> {
        if !self.path.exists() {
            return Ok(());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: PatientRecord = serde_json::from_str(&line)
                .map_err(|source| StoreError::Decode {
                    line: idx + 1,
                    source,
                })?;
            if !visit(record) {
                break;
            }
        }
        Ok(())
    }
}

impl RecordStore for JsonlStore {
    fn insert_many(&mut self, records: &[PatientRecord]) -> Result<usize, StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut w = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut w, record).map_err(|source| StoreError::Encode {
                patient_id: record.patient_id.clone(),
                source,
            })?;
            w.write_all(b"\n")?;
        }
        w.flush()?;
        tracing::info!(
            path = %self.path.display(),
            inserted = records.len(),
            "records stored"
        );
        Ok(records.len())
    }

    fn query_by_cohort(
        &self,
        cohort: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PatientRecord>, StoreError> {
        let mut out = Vec::new();
        if limit == Some(0) {
            return Ok(out);
        }
        self.scan(|record| {
            if record.cancer_cohort == cohort {
                out.push(record);
            }
            limit.is_none_or(|n| out.len() < n)
        })?;
        Ok(out)
    }

    fn distinct_cohorts(&self) -> Result<Vec<String>, StoreError> {
        let mut cohorts = BTreeSet::new();
        self.scan(|record| {
            cohorts.insert(record.cancer_cohort);
            true
        })?;
        Ok(cohorts.into_iter().collect())
    }

    fn count(&self) -> Result<usize, StoreError> {
        let mut n = 0usize;
        self.scan(|_| {
            n += 1;
            true
        })?;
        Ok(n)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        if self.path.exists() {
            File::create(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<PatientRecord>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }
}

#[cfg(test)]
impl RecordStore for MemoryStore {
    fn insert_many(&mut self, records: &[PatientRecord]) -> Result<usize, StoreError> {
        self.records.extend_from_slice(records);
        Ok(records.len())
    }

    fn query_by_cohort(
        &self,
        cohort: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PatientRecord>, StoreError> {
        let matching = self
            .records
            .iter()
            .filter(|r| r.cancer_cohort == cohort)
            .cloned();
        Ok(match limit {
            Some(n) => matching.take(n).collect(),
            None => matching.collect(),
        })
    }

    fn distinct_cohorts(&self) -> Result<Vec<String>, StoreError> {
        let cohorts: BTreeSet<String> = self
            .records
            .iter()
            .map(|r| r.cancer_cohort.clone())
            .collect();
        Ok(cohorts.into_iter().collect())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.len())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.records.clear();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/store/tests.rs"]
mod tests;
