//! The persistence slot: one key holding the whole serialized collection.

use crate::error::StorageError;
use crate::task::Task;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub const DEFAULT_DATA_FILE: &str = "tasks.json";

/// A single key/value slot. `read` returns `None` when nothing was ever
/// stored.
pub trait Storage {
    fn read(&self) -> Result<Option<String>, StorageError>;
    fn write(&mut self, value: &str) -> Result<(), StorageError>;
}

pub fn load_tasks<S: Storage + ?Sized>(storage: &S) -> Result<Vec<Task>, StorageError> {
    match storage.read()? {
        Some(data) if !data.trim().is_empty() => Ok(serde_json::from_str(&data)?),
        _ => Ok(Vec::new()),
    }
}

pub fn save_tasks<S: Storage + ?Sized>(storage: &mut S, tasks: &[Task]) -> Result<(), StorageError> {
    let data = serde_json::to_string_pretty(tasks)?;
    storage.write(&data)
}

/// Stores the collection as pretty JSON in one file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_DATA_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Storage for JsonFileStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, value: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Write-then-rename so a crash mid-write never truncates the slot.
        let tmp = self.temp_path();
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), bytes = value.len(), "tasks written");
        Ok(())
    }
}

/// In-process slot, used by tests and anywhere a throwaway store is wanted.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    value: Option<String>,
    writes: usize,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Makes every subsequent write fail, as a full or missing disk would.
    pub fn failing(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.value.clone())
    }

    fn write(&mut self, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(std::io::Error::other("storage quota exceeded").into());
        }
        self.value = Some(value.to_string());
        self.writes += 1;
        Ok(())
    }
}
