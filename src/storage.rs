//! Append-only record tables
//!
//! One table per entity type. Reads never fail: a missing, unreadable or
//! malformed table (including rows missing a column) loads as empty.
//! Appends are all-or-nothing per call. An append refuses to touch a table it
//! cannot read, and moves a malformed one aside to `*.json.bad` before replacing it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::StorageError;
use crate::types::{EntityType, OpportunityRecord, StudentRecord};

/// A row type with a table of its own.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const ENTITY: EntityType;
}

impl Record for StudentRecord {
    const ENTITY: EntityType = EntityType::Student;
}

impl Record for OpportunityRecord {
    const ENTITY: EntityType = EntityType::Opportunity;
}

/// Single-writer, append-only store. No locking.
pub trait RecordStore {
    fn append_all<R: Record>(&mut self, records: &[R]) -> Result<(), StorageError>;

    fn read_all<R: Record>(&self) -> Vec<R>;
}

/// JSON array per table, e.g. `data/students.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn table_path(&self, entity: EntityType) -> PathBuf {
        self.dir.join(format!("{}.json", entity.table_name()))
    }

    /// Existing rows for an append. A table that exists but does not parse is
    /// flagged so it can be kept as `*.json.bad` instead of being overwritten.
    fn load_for_append<R: Record>(&self, path: &Path) -> Result<(Vec<R>, bool), StorageError> {
        if !path.exists() {
            return Ok((vec![], false));
        }

        let content =
            fs::read_to_string(path).map_err(|source| io_error(R::ENTITY, path, source))?;

        match serde_json::from_str(&content) {
            Ok(rows) => Ok((rows, false)),
            Err(e) => {
                warn!("Existing {} table {:?} is malformed: {}", R::ENTITY, path, e);
                Ok((vec![], true))
            }
        }
    }
}

impl RecordStore for JsonFileStore {
    fn append_all<R: Record>(&mut self, records: &[R]) -> Result<(), StorageError> {
        if records.is_empty() {
            return Ok(());
        }

        let entity = R::ENTITY;
        let path = self.table_path(entity);

        let (mut rows, malformed) = self.load_for_append::<R>(&path)?;
        rows.extend_from_slice(records);

        let json = serde_json::to_string_pretty(&rows)
            .map_err(|source| StorageError::Serialize { entity, source })?;

        fs::create_dir_all(&self.dir).map_err(|source| io_error(entity, &self.dir, source))?;

        // Write aside, then swap in; a failed write leaves the old table intact
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| io_error(entity, &tmp, source))?;

        if malformed {
            let bad = path.with_extension("json.bad");
            fs::rename(&path, &bad).map_err(|source| io_error(entity, &bad, source))?;
            warn!("Moved unreadable {} table aside to {:?}", entity, bad);
        }
        fs::rename(&tmp, &path).map_err(|source| io_error(entity, &path, source))?;

        Ok(())
    }

    fn read_all<R: Record>(&self) -> Vec<R> {
        let path = self.table_path(R::ENTITY);

        if !path.exists() {
            return vec![];
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {:?}, treating as empty: {}", path, e);
                return vec![];
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Discarding malformed {} table {:?}: {}", R::ENTITY, path, e);
            vec![]
        })
    }
}

fn io_error(entity: EntityType, path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        entity,
        path: path.display().to_string(),
        source,
    }
}

/// In-process store; rows go through the same serialization as the file store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: HashMap<EntityType, Vec<serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn append_all<R: Record>(&mut self, records: &[R]) -> Result<(), StorageError> {
        let entity = R::ENTITY;
        let rows = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| StorageError::Serialize { entity, source })?;

        self.tables.entry(entity).or_default().extend(rows);
        Ok(())
    }

    fn read_all<R: Record>(&self) -> Vec<R> {
        let Some(rows) = self.tables.get(&R::ENTITY) else {
            return vec![];
        };

        rows.iter()
            .map(|row| serde_json::from_value(row.clone()))
            .collect::<Result<Vec<R>, _>>()
            .unwrap_or_default()
    }
}
