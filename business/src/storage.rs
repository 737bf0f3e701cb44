//! Durable key-value backends for the history slot.
//!
//! - [`MemoryStore`]: in-process map, also the in-memory fallback.
//! - [`FileStore`]: one JSON file per key in the application data directory (native).
//! - [`LocalStorage`]: `window.localStorage` (web).

use std::collections::BTreeMap;

use crate::error::PersistenceError;

/// A string-keyed, string-valued durable slot store.
pub trait KeyValueStore {
    /// Returns `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Overwrites the value under `key` in full.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).set(key, value)
    }
}

/// In-process store with an optional byte quota, mirroring the browser's
/// storage limit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes whose value exceeds `bytes` fail with [`PersistenceError::Write`].
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            values: BTreeMap::new(),
            quota: Some(bytes),
        }
    }

    /// Seeds a raw value, bypassing the quota.
    pub fn with_value(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_owned(), value.into());
        self
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if let Some(quota) = self.quota
            && value.len() > quota
        {
            return Err(PersistenceError::Write(format!(
                "quota exceeded: {} bytes > {quota} bytes",
                value.len()
            )));
        }
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use super::KeyValueStore;
    use crate::error::PersistenceError;

    /// Stores each key as `<dir>/<key>.json`.
    #[derive(Debug, Clone)]
    pub struct FileStore {
        dir: PathBuf,
    }

    impl FileStore {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            Self { dir: dir.into() }
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        pub fn path_for(&self, key: &str) -> PathBuf {
            self.dir.join(format!("{key}.json"))
        }
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
            let path = self.path_for(key);
            match fs::read_to_string(&path) {
                Ok(value) => Ok(Some(value)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(PersistenceError::Read(format!("{}: {err}", path.display()))),
            }
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
            let path = self.path_for(key);
            let write_err = |err: std::io::Error| {
                PersistenceError::Write(format!("{}: {err}", path.display()))
            };

            fs::create_dir_all(&self.dir).map_err(write_err)?;
            // Write then rename so a crash never leaves a half-written slot.
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, value).map_err(write_err)?;
            fs::rename(&tmp, &path).map_err(write_err)?;
            log::debug!("wrote {} bytes to {}", value.len(), path.display());
            Ok(())
        }
    }

}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::KeyValueStore;
    use crate::error::PersistenceError;

    /// The browser's `window.localStorage`.
    pub struct LocalStorage {
        storage: web_sys::Storage,
    }

    impl LocalStorage {
        pub fn new() -> Result<Self, PersistenceError> {
            let window = web_sys::window()
                .ok_or_else(|| PersistenceError::Read("no window".to_owned()))?;
            let storage = window
                .local_storage()
                .map_err(|err| PersistenceError::Read(format!("{err:?}")))?
                .ok_or_else(|| PersistenceError::Read("localStorage is disabled".to_owned()))?;
            Ok(Self { storage })
        }
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
            self.storage
                .get_item(key)
                .map_err(|err| PersistenceError::Read(format!("{err:?}")))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
            self.storage
                .set_item(key, value)
                .map_err(|err| PersistenceError::Write(format!("{err:?}")))
        }
    }
}
