use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::StoreError;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Record storage keyed by string, one collection per record type.
pub trait Store<V>: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<V>>;

    /// Inserts or replaces the record under `key`.
    fn put(&self, key: &str, value: &V) -> StoreResult<()>;

    /// Removing a missing key is not an error.
    fn delete(&self, key: &str) -> StoreResult<()>;
}

#[derive(Debug)]
pub struct MemoryStore<V> {
    records: Mutex<HashMap<String, V>>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V: Clone + Send> Store<V> for MemoryStore<V> {
    fn get(&self, key: &str) -> StoreResult<Option<V>> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(records.get(key).cloned())
    }

    fn put(&self, key: &str, value: &V) -> StoreResult<()> {
        let mut records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        records.insert(key.to_owned(), value.clone());
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let mut records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        records.remove(key);
        Ok(())
    }
}

/// One pretty-printed JSON file per record under a directory.
#[derive(Debug)]
pub struct JsonFileStore<V> {
    dir: PathBuf,
    _record: PhantomData<fn() -> V>,
}

impl<V> JsonFileStore<V> {
    /// Opens the collection at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        log::debug!("Opened file store at {}", dir.display());
        Ok(Self {
            dir,
            _record: PhantomData,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

/// Keeps ASCII letters, digits, `-` and `_`; everything else is escaped as
/// `%XX` per UTF-8 byte so distinct keys never share a file.
fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            let _ = write!(stem, "%{byte:02X}");
        }
    }
    stem
}

impl<V: Serialize + DeserializeOwned> Store<V> for JsonFileStore<V> {
    fn get(&self, key: &str) -> StoreResult<Option<V>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&self, key: &str, value: &V) -> StoreResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}
