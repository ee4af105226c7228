//! Plain JSON file standing in for the platform secret store.
//!
//! The file is NOT encrypted. It exists so the gates can be exercised from a
//! terminal; a mobile host uses the Keychain or the Android Keystore instead.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use pinkit_core::{SecretStore, StoreError, StoreResult};

const SECRETS_FILENAME: &str = "secrets.json";

pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Opens (and creates if needed) the store under `dir`.
    pub fn open(dir: &Path) -> eyre::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(SECRETS_FILENAME),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StoreResult<BTreeMap<String, String>> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                StoreError::Unavailable(format!("{}: {err}", self.path.display()))
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(map_io_err(&err)),
        }
    }

    /// Writes to a sibling file and renames it over the store, so a failed
    /// write never leaves a truncated file behind.
    fn write_all(&self, values: &BTreeMap<String, String>) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(values)
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|err| map_io_err(&err))?;
        fs::rename(&tmp, &self.path).map_err(|err| map_io_err(&err))
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: String) -> StoreResult<Option<String>> {
        Ok(self.read_all()?.remove(&key))
    }

    fn set(&self, key: String, value: String) -> StoreResult<()> {
        let mut values = self.read_all()?;
        values.insert(key, value);
        self.write_all(&values)
    }

    fn delete(&self, key: String) -> StoreResult<()> {
        let mut values = self.read_all()?;
        if values.remove(&key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

fn map_io_err(err: &std::io::Error) -> StoreError {
    StoreError::Unavailable(format!("secret file I/O error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::open(dir.path()).unwrap();
        assert_eq!(store.get("user_pin".to_string()).unwrap(), None);
        store
            .set("user_pin".to_string(), "123456".to_string())
            .unwrap();

        let reopened = FileSecretStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("user_pin".to_string()).unwrap(),
            Some("123456".to_string())
        );
        reopened.delete("user_pin".to_string()).unwrap();
        reopened.delete("user_pin".to_string()).unwrap();
        assert_eq!(store.get("user_pin".to_string()).unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::open(dir.path()).unwrap();
        fs::write(store.path(), b"{oops").unwrap();
        assert!(matches!(
            store.get("user_pin".to_string()),
            Err(StoreError::Unavailable(_))
        ));
    }
}
