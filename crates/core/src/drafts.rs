//! Client-local draft persistence.
//!
//! Saved drafts live in one serialized collection held by a [`StorageSlot`]. The collection is
//! read and written wholesale on every mutation. Storage problems never reach the caller:
//! unreadable or corrupt storage reads as an empty collection, and failed writes are logged
//! while the in-session state keeps the user's change.
//!
//! There is no protection against concurrent writers. The last write wins.

use crate::content::{PracticePath, PromptPack};
use crate::rhythm::WeekOverrides;
use crate::{AlivenError, AlivenResult};
use aliven_types::{DraftName, WeekNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// A named snapshot of a user's edits to one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDraft {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pack_id: String,
    pub path_id: String,
    #[serde(default)]
    pub draft_prompts: BTreeMap<WeekNumber, String>,
    #[serde(default)]
    pub draft_practices: BTreeMap<WeekNumber, String>,
}

impl SavedDraft {
    /// Creates a draft with a fresh identifier, stamped `now`.
    pub fn new(
        name: DraftName,
        pack: &PromptPack,
        path: &PracticePath,
        overrides: &WeekOverrides,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into_string(),
            created_at: now,
            updated_at: now,
            pack_id: pack.id.to_string(),
            path_id: path.id.to_string(),
            draft_prompts: overrides.prompts.clone(),
            draft_practices: overrides.practices.clone(),
        }
    }

    pub fn overrides(&self) -> WeekOverrides {
        WeekOverrides {
            prompts: self.draft_prompts.clone(),
            practices: self.draft_practices.clone(),
        }
    }
}

/// CRUD over the saved draft collection.
pub trait DraftStore: Send + Sync {
    /// All drafts, most recently updated first.
    fn list(&self) -> Vec<SavedDraft>;

    /// Adds `draft` to the front of the collection.
    fn save(&self, draft: SavedDraft);

    /// Removes the draft with `id`, if any.
    fn delete(&self, id: &str);

    /// Removes every draft.
    fn clear(&self);

    fn get(&self, id: &str) -> Option<SavedDraft> {
        self.list().into_iter().find(|d| d.id == id)
    }
}

/// A single named location holding the serialized draft collection.
pub trait StorageSlot: Send + Sync {
    /// Returns the stored text, or `None` if nothing has been stored yet.
    fn read(&self) -> AlivenResult<Option<String>>;

    fn write(&self, contents: &str) -> AlivenResult<()>;
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

    /// The drafts file inside `data_dir`.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(crate::constants::DRAFTS_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageSlot for FileSlot {
    fn read(&self) -> AlivenResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AlivenError::StorageRead(e)),
        }
    }

    fn write(&self, contents: &str) -> AlivenResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(AlivenError::StorageWrite)?;
            }
        }
        fs::write(&self.path, contents).map_err(AlivenError::StorageWrite)
    }
}

/// Slot held in memory, with switches to simulate unavailable storage.
#[derive(Debug, Default)]
pub struct MemorySlot {
    contents: Mutex<Option<String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<String> {
        lock(&self.contents).clone()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl StorageSlot for MemorySlot {
    fn read(&self) -> AlivenResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AlivenError::StorageUnavailable);
        }
        Ok(lock(&self.contents).clone())
    }

    fn write(&self, contents: &str) -> AlivenResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AlivenError::StorageUnavailable);
        }
        *lock(&self.contents) = Some(contents.to_string());
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// [`DraftStore`] over a [`StorageSlot`].
///
/// The collection is loaded from the slot on first use and kept as session state. Mutations
/// update the session first and then write the whole collection back.
pub struct SlotDraftStore<S: StorageSlot> {
    slot: S,
    session: Mutex<Option<Vec<SavedDraft>>>,
}

impl<S: StorageSlot> SlotDraftStore<S> {
    pub fn new(slot: S) -> Self {
        Self {
            slot,
            session: Mutex::new(None),
        }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Discards session state so the next operation re-reads the slot.
    pub fn reload(&self) {
        *lock(&self.session) = None;
    }

    fn read_collection(&self) -> Vec<SavedDraft> {
        let raw = match self.slot.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("draft storage unreadable, starting empty: {}", e);
                return Vec::new();
            }
        };
        match decode_collection(&raw) {
            Ok(drafts) => drafts,
            Err(e) => {
                tracing::warn!("draft storage corrupt, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut Vec<SavedDraft>) -> R) -> R {
        let mut guard = lock(&self.session);
        let drafts = guard.get_or_insert_with(|| self.read_collection());
        f(drafts)
    }

    fn persist(&self, drafts: &[SavedDraft]) {
        let result = serde_json::to_string(drafts)
            .map_err(AlivenError::Serialization)
            .and_then(|json| self.slot.write(&json));
        if let Err(e) = result {
            tracing::warn!("failed to persist drafts, change kept for this session only: {}", e);
        }
    }
}

impl<S: StorageSlot> DraftStore for SlotDraftStore<S> {
    fn list(&self) -> Vec<SavedDraft> {
        let mut drafts = self.with_session(|drafts| drafts.clone());
        drafts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        drafts
    }

    fn save(&self, draft: SavedDraft) {
        self.with_session(|drafts| {
            drafts.retain(|d| d.id != draft.id);
            drafts.insert(0, draft);
            self.persist(drafts);
        });
    }

    fn delete(&self, id: &str) {
        self.with_session(|drafts| {
            let before = drafts.len();
            drafts.retain(|d| d.id != id);
            if drafts.len() != before {
                self.persist(drafts);
            }
        });
    }

    fn clear(&self) {
        self.with_session(|drafts| {
            drafts.clear();
            self.persist(drafts);
        });
    }
}

/// Decodes the stored collection.
///
/// A value that is not a JSON array decodes as an empty collection. Records that fail to
/// decode are skipped; the rest are kept.
fn decode_collection(raw: &str) -> AlivenResult<Vec<SavedDraft>> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(AlivenError::Deserialization)?;
    let serde_json::Value::Array(items) = value else {
        tracing::warn!("draft storage does not hold a list, ignoring it");
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<SavedDraft>(item) {
            Ok(draft) => Some(draft),
            Err(e) => {
                tracing::warn!("skipping unreadable saved draft: {}", e);
                None
            }
        })
        .collect())
}
