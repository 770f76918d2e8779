use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// String-keyed persistent store. Faults never surface to callers: a failed
/// read is an absent value and a failed write is a no-op, both logged.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// One `<key>.json` file per key under a base directory.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizcraft");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            bail!("invalid store key {key:?}");
        }
        Ok(self.base_dir.join(format!("{key}.json")))
    }

    fn try_get(&self, key: &str) -> Result<Option<String>> {
        let path = self.file_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn try_set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.file_path(key)?;
        let tmp_path = path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn try_remove(&self, key: &str) -> Result<()> {
        let path = self.file_path(key)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.try_get(key).unwrap_or_else(|e| {
            log::warn!("failed to read store key {key}: {e:#}");
            None
        })
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.try_set(key, value) {
            log::warn!("failed to write store key {key}: {e:#}");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.try_remove(key) {
            log::warn!("failed to remove store key {key}: {e:#}");
        }
    }
}

/// In-process store.
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_file_store_set_get_remove() {
        let (_dir, store) = make_test_store();
        assert_eq!(store.get("scores"), None);

        store.set("scores", "[1,2]");
        assert_eq!(store.get("scores").as_deref(), Some("[1,2]"));

        store.set("scores", "[]");
        assert_eq!(store.get("scores").as_deref(), Some("[]"));

        store.remove("scores");
        assert_eq!(store.get("scores"), None);
        // Removing an absent key is a no-op.
        store.remove("scores");
    }

    #[test]
    fn test_file_store_leaves_no_tmp_files() {
        let (dir, store) = make_test_store();
        store.set("bank", "[]");
        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
        assert!(dir.path().join("bank.json").exists());
    }

    #[test]
    fn test_file_store_swallows_faults() {
        let (dir, store) = make_test_store();
        store.set("../escape", "x");
        assert_eq!(store.get("../escape"), None);
        assert!(!dir.path().parent().unwrap().join("escape.json").exists());

        // Writes into a directory that vanished are dropped, not raised.
        let gone = dir.path().join("gone");
        let orphan = FileStore::with_base_dir(gone.clone()).unwrap();
        fs::remove_dir(&gone).unwrap();
        orphan.set("bank", "[]");
        assert_eq!(orphan.get("bank"), None);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        store.set("k", "v");
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k");
        assert_eq!(store.get("k"), None);
    }
}
