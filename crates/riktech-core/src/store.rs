//! Conversation log with a durable snapshot.
//!
//! The whole log is written as one JSON array under a fixed key after each
//! finished turn, and read back once at startup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::state::{Author, ConversationEntry};

/// Key the chat history snapshot is stored under.
pub const HISTORY_KEY: &str = "riktech-ai-chat";

/// A single durable key-value slot holding the serialized log.
pub trait SnapshotSlot: Send {
    /// Raw snapshot bytes, `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> io::Result<Option<Vec<u8>>>;
    fn write(&self, value: &str) -> io::Result<()>;
}

/// Slot backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/<key>.json`
    pub fn in_dir(dir: &Path, key: &str) -> Self {
        Self::new(dir.join(format!("{}.json", key)))
    }

    /// The history file under the platform data directory.
    pub fn default_location() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;

        Ok(Self::in_dir(&data_dir.join("riktech"), HISTORY_KEY))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSlot for FileSlot {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, value: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write beside the target and rename so a crash never leaves half a snapshot
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &self.path)
    }
}

/// In-memory slot. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    value: Arc<Mutex<Option<String>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(value.into()))),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.value.lock().map(|v| v.clone()).unwrap_or(None)
    }
}

impl SnapshotSlot for MemorySlot {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.get().map(String::into_bytes))
    }

    fn write(&self, value: &str) -> io::Result<()> {
        let mut slot = self
            .value
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory slot poisoned"))?;
        *slot = Some(value.to_string());
        Ok(())
    }
}

/// On-disk form of an entry
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    #[serde(rename = "isUser")]
    is_user: bool,
    content: String,
}

impl From<&ConversationEntry> for StoredEntry {
    fn from(entry: &ConversationEntry) -> Self {
        Self {
            is_user: entry.is_user(),
            content: entry.content().to_string(),
        }
    }
}

impl From<StoredEntry> for ConversationEntry {
    fn from(stored: StoredEntry) -> Self {
        let author = if stored.is_user { Author::User } else { Author::Bot };
        ConversationEntry::new(author, stored.content)
    }
}

pub struct ConversationStore {
    entries: Vec<ConversationEntry>,
    slot: Box<dyn SnapshotSlot>,
}

impl ConversationStore {
    /// An empty log over `slot`. Nothing is read until [`restore`](Self::restore).
    pub fn new(slot: impl SnapshotSlot + 'static) -> Self {
        Self {
            entries: Vec::new(),
            slot: Box::new(slot),
        }
    }

    /// Startup path: restore whatever the slot holds, treating an unreadable
    /// snapshot as no history at all.
    pub fn open(slot: impl SnapshotSlot + 'static) -> Self {
        let mut store = Self::new(slot);
        match store.restore() {
            Ok(entries) => info!(count = entries.len(), "restored chat history"),
            Err(e) => warn!(error = %e, "ignoring stored chat history"),
        }
        store
    }

    pub fn append(&mut self, entry: ConversationEntry) {
        self.entries.push(entry);
    }

    pub fn all(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The welcome placeholder is shown only while there is nothing to display.
    pub fn shows_welcome(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_bot_entry(&self) -> Option<&ConversationEntry> {
        self.entries.iter().rev().find(|e| !e.is_user())
    }

    /// Overwrite the snapshot with the full current log.
    pub fn persist(&self) -> Result<(), StoreError> {
        let stored: Vec<StoredEntry> = self.entries.iter().map(StoredEntry::from).collect();
        let json = serde_json::to_string(&stored).map_err(StoreError::Encode)?;
        self.slot.write(&json)?;
        debug!(count = stored.len(), "persisted chat history");
        Ok(())
    }

    /// Replace the in-memory log with the stored snapshot.
    ///
    /// A missing snapshot yields an empty log. On error the in-memory log is
    /// left untouched.
    pub fn restore(&mut self) -> Result<&[ConversationEntry], StoreError> {
        let entries = match self.slot.read()? {
            Some(json) => {
                let stored: Vec<StoredEntry> =
                    serde_json::from_slice(&json).map_err(StoreError::CorruptState)?;
                stored.into_iter().map(ConversationEntry::from).collect()
            }
            None => Vec::new(),
        };
        self.entries = entries;
        Ok(&self.entries)
    }

    /// Drop every entry and persist the empty log.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.persist()
    }
}
