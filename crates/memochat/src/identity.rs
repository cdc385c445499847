use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use memochat_core::identity::IdentityStore;
use serde_json::{Map, Value};

/// An [`IdentityStore`] backed by a JSON object in a file.
///
/// A missing or unreadable file is treated as empty. Storing a value
/// rewrites the file, creating its directory when needed.
#[derive(Clone, Debug)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    /// Creates a store for the file at `path`.
    #[inline]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_values(&self) -> io::Result<Map<String, Value>> {
        let data = fs::read(&self.path)?;
        serde_json::from_slice(&data).map_err(io::Error::other)
    }
}

impl IdentityStore for FileIdentityStore {
    fn load(&self, key: &str) -> Option<String> {
        let values = match self.read_values() {
            Ok(values) => values,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!("failed to read {}: {err}", self.path.display());
                return None;
            }
        };
        values.get(key)?.as_str().map(ToOwned::to_owned)
    }

    fn store(&self, key: &str, value: &str) -> io::Result<()> {
        let mut values = self.read_values().unwrap_or_default();
        values.insert(key.to_owned(), Value::from(value));

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_vec_pretty(&values).map_err(io::Error::other)?;
        fs::write(&self.path, data)
    }
}
