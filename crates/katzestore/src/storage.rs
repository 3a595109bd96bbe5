//! Key-value store implementation
//!
//! File layout:
//! - `katze.json`: a JSON object mapping slot names to arbitrary JSON values
//!
//! Every mutation rewrites the whole file through `katze.json.tmp` and a
//! rename, so a crash leaves either the old or the new contents on disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Name of the store file inside the store directory
const STORE_FILE: &str = "katze.json";

/// Name of the scratch file used while persisting
const STORE_TMP_FILE: &str = "katze.json.tmp";

/// KvStore is the handle to a directory of persisted slots
pub struct KvStore {
    /// Path to the store directory
    dir: PathBuf,

    /// In-memory copy of every slot
    slots: RwLock<Map<String, Value>>,

    /// Is the store closed?
    closed: RwLock<bool>,
}

impl KvStore {
    /// Open or create a store at the given directory
    ///
    /// # Arguments
    /// * `path` - Directory holding the store file
    ///
    /// # Returns
    /// * `Result<KvStore>` - Store handle
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let dir = path.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let file = dir.join(STORE_FILE);
        let slots = if file.exists() {
            Self::load(&file)?
        } else {
            Map::new()
        };

        Ok(KvStore {
            dir,
            slots: RwLock::new(slots),
            closed: RwLock::new(false),
        })
    }

    fn load(file: &Path) -> Result<Map<String, Value>> {
        let bytes = fs::read(file)?;
        if bytes.is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(Error::Parse(format!(
                "{} is not a JSON object",
                file.display()
            ))),
            Err(e) => Err(Error::Parse(format!("{}: {}", file.display(), e))),
        }
    }

    /// Read a slot and decode it as `T`
    ///
    /// A missing slot and a slot holding some other shape both read as `None`.
    /// Reads stay available after `close`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.slots
            .read()
            .get(key)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }

    /// Replace a slot and persist the store to disk
    ///
    /// # Arguments
    /// * `key` - Slot name
    /// * `value` - Value to serialize into the slot
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        // Held until the file is written so `close` cannot slip in between.
        let closed = self.closed.read();
        if *closed {
            return Err(Error::Closed);
        }

        let value = serde_json::to_value(value)?;
        let mut slots = self.slots.write();
        slots.insert(key.to_string(), value);
        self.persist(&slots)
    }

    /// Remove a slot and persist the store to disk
    ///
    /// # Returns
    /// * `Result<bool>` - Whether the slot existed
    pub fn remove(&self, key: &str) -> Result<bool> {
        let closed = self.closed.read();
        if *closed {
            return Err(Error::Closed);
        }

        let mut slots = self.slots.write();
        if slots.remove(key).is_none() {
            return Ok(false);
        }
        self.persist(&slots)?;
        Ok(true)
    }

    /// Names of all slots, in key order
    pub fn keys(&self) -> Vec<String> {
        self.slots.read().keys().cloned().collect()
    }

    /// Get the number of slots
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Check if the store has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Path of the store file
    pub fn path(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    /// Flush the store one last time and reject further writes
    pub fn close(&self) -> Result<()> {
        let mut closed = self.closed.write();
        if *closed {
            return Ok(());
        }

        let slots = self.slots.read();
        self.persist(&slots)?;
        *closed = true;

        Ok(())
    }

    fn persist(&self, slots: &Map<String, Value>) -> Result<()> {
        let tmp = self.dir.join(STORE_TMP_FILE);
        let bytes = serde_json::to_vec_pretty(slots)?;

        let mut file = File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, self.path())?;

        Ok(())
    }
}
