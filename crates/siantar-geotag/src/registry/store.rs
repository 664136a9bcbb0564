use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::domain::{Business, BusinessId};
use super::repository::{BusinessRepository, RepositoryError};

/// Repository persisting every record as one JSON array on disk.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<Business>, RepositoryError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, records: &[Business]) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        let mut file = fs::File::create(&staging)?;
        serde_json::to_writer_pretty(&mut file, records)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        fs::rename(&staging, &self.path)?;

        debug!(path = %self.path.display(), records = records.len(), "registry snapshot written");
        Ok(())
    }
}

impl BusinessRepository for JsonFileRepository {
    fn load(&self) -> Result<Vec<Business>, RepositoryError> {
        let _guard = self.lock.lock().expect("store mutex poisoned");
        self.read()
    }

    fn append(&self, record: Business) -> Result<Business, RepositoryError> {
        let _guard = self.lock.lock().expect("store mutex poisoned");
        let mut records = self.read()?;
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict(record.id));
        }
        records.push(record.clone());
        self.write(&records)?;
        Ok(record)
    }

    fn delete_by_id(&self, id: &BusinessId) -> Result<Business, RepositoryError> {
        let _guard = self.lock.lock().expect("store mutex poisoned");
        let mut records = self.read()?;
        let position = records
            .iter()
            .position(|existing| &existing.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        let removed = records.remove(position);
        self.write(&records)?;
        Ok(removed)
    }
}
