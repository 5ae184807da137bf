use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::debug;

/// Storage key holding the credential token
pub const TOKEN_KEY: &str = "token";

/// Keychain service name
const SERVICE_NAME: &str = "artfolio";

/// Token file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

/// Key/value storage for credentials.
pub trait TokenStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    /// Remove `key`. Clearing a missing key is not an error.
    fn clear(&self, key: &str) -> Result<()>;
}

/// Tokens kept in a JSON map on disk.
pub struct FileTokenStore {
    dir: PathBuf,
    // Serializes read-modify-write of the file
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            lock: Mutex::new(()),
        }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        let path = self.path();
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read token file")?;
        serde_json::from_str(&contents).context("Failed to parse token file")
    }

    fn save(&self, map: &HashMap<String, String>) -> Result<()> {
        let path = self.path();
        if map.is_empty() {
            if path.exists() {
                std::fs::remove_file(&path).context("Failed to remove token file")?;
            }
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir).context("Failed to create token directory")?;
        let contents = serde_json::to_string_pretty(map)?;
        std::fs::write(&path, contents).context("Failed to write token file")?;
        Ok(())
    }
}

impl TokenStorage for FileTokenStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.load()?;
        if map.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        map.insert(key.to_string(), value.to_string());
        self.save(&map)
    }

    fn clear(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            debug!(key, "Cleared stored token");
            self.save(&map)?;
        }
        Ok(())
    }
}

/// Tokens kept in the OS keychain, one entry per key.
pub struct KeyringTokenStore;

impl KeyringTokenStore {
    fn entry(key: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")
    }
}

impl TokenStorage for KeyringTokenStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match Self::entry(key)?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        Self::entry(key)?
            .set_password(value)
            .context("Failed to store token in keychain")
    }

    fn clear(&self, key: &str) -> Result<()> {
        match Self::entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

/// Process-local storage; nothing survives a restart.
#[derive(Default)]
pub struct MemoryTokenStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store
            .values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(TOKEN_KEY.to_string(), token.to_string());
        store
    }
}

impl TokenStorage for MemoryTokenStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.values.lock().unwrap_or_else(|e| e.into_inner()).remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("artfolio"));

        assert_eq!(store.read(TOKEN_KEY).unwrap(), None);
        store.write(TOKEN_KEY, "abc").unwrap();
        assert_eq!(store.read(TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        store.write(TOKEN_KEY, "def").unwrap();
        assert_eq!(store.read(TOKEN_KEY).unwrap().as_deref(), Some("def"));
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());

        store.write(TOKEN_KEY, "abc").unwrap();
        assert!(dir.path().join(TOKEN_FILE).exists());

        store.clear(TOKEN_KEY).unwrap();
        assert_eq!(store.read(TOKEN_KEY).unwrap(), None);
        assert!(!dir.path().join(TOKEN_FILE).exists());

        // Clearing again is fine
        store.clear(TOKEN_KEY).unwrap();
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());

        store.write(TOKEN_KEY, "abc").unwrap();
        store.write("other", "xyz").unwrap();
        store.clear(TOKEN_KEY).unwrap();

        assert_eq!(store.read("other").unwrap().as_deref(), Some("xyz"));
    }

    #[test]
    fn test_file_store_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE), "not json").unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());

        assert!(store.read(TOKEN_KEY).is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::with_token("abc");
        assert_eq!(store.read(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        store.clear(TOKEN_KEY).unwrap();
        assert_eq!(store.read(TOKEN_KEY).unwrap(), None);
        store.clear(TOKEN_KEY).unwrap();
    }
}
