use crate::error::{CoachError, Result};
use crate::{io, paths};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ShortcutRecord
// ---------------------------------------------------------------------------

/// One stored shortcut. Fields this crate does not know are kept in `extra`
/// so a load/save cycle does not strip them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutRecord {
    #[serde(rename = "desc", alias = "description")]
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    /// Only a stored JSON `true` counts; `"yes"`, `1` or `null` read as false.
    #[serde(default, deserialize_with = "strict_bool")]
    pub starred: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ShortcutRecord {
    pub fn new(description: impl Into<String>, starred: bool) -> Self {
        Self {
            description: description.into(),
            starred,
            extra: serde_json::Map::new(),
        }
    }
}

fn strict_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(matches!(value, serde_json::Value::Bool(true)))
}

/// `null` reads as an empty description; other non-strings are corrupt.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// ShortcutCollection
// ---------------------------------------------------------------------------

/// All shortcuts for one application, keyed by key combination ("Cmd+L").
///
/// Backed by an ordered map so the persisted file is deterministic. Display
/// order always comes from [`sorted_view`], never from map order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortcutCollection {
    entries: BTreeMap<String, ShortcutRecord>,
}

impl ShortcutCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, keys: &str) -> Option<&ShortcutRecord> {
        self.entries.get(keys)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ShortcutRecord)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Add or replace the record stored under `keys`. Returns the old record.
    pub fn insert(
        &mut self,
        keys: impl Into<String>,
        record: ShortcutRecord,
    ) -> Option<ShortcutRecord> {
        self.entries.insert(keys.into(), record)
    }

    pub fn set_starred(&mut self, keys: &str, starred: bool) -> Result<()> {
        self.find_mut(keys)?.starred = starred;
        Ok(())
    }

    /// Flip the starred flag and return the new value.
    pub fn toggle_star(&mut self, keys: &str) -> Result<bool> {
        let record = self.find_mut(keys)?;
        record.starred = !record.starred;
        Ok(record.starred)
    }

    pub fn remove(&mut self, keys: &str) -> Result<ShortcutRecord> {
        self.entries
            .remove(keys)
            .ok_or_else(|| CoachError::ShortcutNotFound(keys.to_string()))
    }

    /// Add model-suggested shortcuts. Suggestions go in unstarred unless their
    /// keys are listed in `keep`; a record that is already starred is left
    /// untouched. Returns how many suggestions were added or replaced.
    pub fn merge_suggestions<I>(&mut self, suggestions: I, keep: &[String]) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut merged = 0;
        for (keys, description) in suggestions {
            if self.entries.get(&keys).is_some_and(|r| r.starred) {
                continue;
            }
            let starred = keep.iter().any(|k| k == &keys);
            self.entries.insert(keys, ShortcutRecord::new(description, starred));
            merged += 1;
        }
        merged
    }

    /// Drop every unstarred record. Returns how many were dropped.
    fn retain_starred(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, r| r.starred);
        before - self.entries.len()
    }

    fn find_mut(&mut self, keys: &str) -> Result<&mut ShortcutRecord> {
        self.entries
            .get_mut(keys)
            .ok_or_else(|| CoachError::ShortcutNotFound(keys.to_string()))
    }
}

impl<K: Into<String>> FromIterator<(K, ShortcutRecord)> for ShortcutCollection {
    fn from_iter<I: IntoIterator<Item = (K, ShortcutRecord)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Starred entries first, then by key (byte order) within each group.
pub fn sorted_view(collection: &ShortcutCollection) -> Vec<(&str, &ShortcutRecord)> {
    let mut view: Vec<(&str, &ShortcutRecord)> = collection.iter().collect();
    view.sort_by(|a, b| b.1.starred.cmp(&a.1.starred).then_with(|| a.0.cmp(b.0)));
    view
}

// ---------------------------------------------------------------------------
// ShortcutStore
// ---------------------------------------------------------------------------

/// Persists one [`ShortcutCollection`] per application as
/// `<data_dir>/<app>.json`.
///
/// Loading keeps only starred records. The file is not rewritten by
/// `load`, but a later `save` of the loaded collection makes the drop
/// permanent. There is no locking: if two processes save the same app,
/// the last write wins.
pub struct ShortcutStore {
    data_dir: PathBuf,
}

impl ShortcutStore {
    /// The directory is created lazily on the first `save`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, app_name: &str) -> Result<PathBuf> {
        paths::validate_app_name(app_name)?;
        Ok(paths::shortcut_file(&self.data_dir, app_name))
    }

    /// Load the starred shortcuts for `app_name`. A missing file is an
    /// empty collection.
    pub fn load(&self, app_name: &str) -> Result<ShortcutCollection> {
        let path = self.path_for(app_name)?;
        let Some(data) = io::read_if_exists(&path)? else {
            tracing::debug!(app = %app_name, "no stored shortcuts");
            return Ok(ShortcutCollection::new());
        };
        let mut collection: ShortcutCollection =
            serde_json::from_str(&data).map_err(|source| CoachError::CorruptStorage {
                app: app_name.to_string(),
                path: path.clone(),
                source,
            })?;
        let dropped = collection.retain_starred();
        tracing::debug!(app = %app_name, kept = collection.len(), dropped, "loaded shortcuts");
        Ok(collection)
    }

    /// Replace everything stored for `app_name` with `collection`, unfiltered.
    pub fn save(&self, app_name: &str, collection: &ShortcutCollection) -> Result<()> {
        let path = self.path_for(app_name)?;
        let mut data = serde_json::to_string_pretty(collection)?;
        data.push('\n');
        io::atomic_write(&path, data.as_bytes())?;
        tracing::debug!(app = %app_name, count = collection.len(), "saved shortcuts");
        Ok(())
    }

    /// Names of every app with a stored collection, sorted.
    pub fn list_apps(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut apps = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if !path.is_file() || ext != Some(paths::SHORTCUT_EXT) {
                continue;
            }
            // Stems `load` would reject (".hidden", "a:b") are not apps.
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if paths::validate_app_name(stem).is_ok() => apps.push(stem.to_string()),
                _ => tracing::debug!(path = %path.display(), "skipping non-app file"),
            }
        }
        apps.sort();
        Ok(apps)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
