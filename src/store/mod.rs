mod codec;
mod ini_parser;
mod value;

pub use codec::*;
pub use value::SettingValue;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use eyre::WrapErr;

/// Key/value settings backed by an INI file.
///
/// Keys are `/` separated paths: the first segment names the group. Every
/// mutation is written to disk before it returns.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    entries: BTreeMap<String, SettingValue>,
}

impl SettingsStore {
    /// Opens the store at `path`. A missing or unreadable file gives an empty store.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => ini_parser::parse_ini(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Could not read settings file, using defaults");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn value(&self, key: &str) -> Option<&SettingValue> {
        self.entries.get(key)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.value(key).map(SettingValue::to_text)
    }

    pub fn bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.value(key).map(SettingValue::to_bytes)
    }

    pub fn set_value<V: Into<SettingValue>>(&mut self, key: &str, value: V) -> eyre::Result<()> {
        self.batch(|batch| batch.set(key, value))
    }

    /// Removes `key` together with everything nested below it.
    pub fn remove(&mut self, key: &str) -> eyre::Result<()> {
        self.batch(|batch| batch.remove(key))
    }

    /// Direct children of `group` that have keys below them.
    pub fn child_groups(&self, group: &str) -> Vec<String> {
        let mut groups: Vec<String> = self
            .children(group)
            .filter_map(|rest| rest.split_once('/').map(|(child, _)| child.to_string()))
            .collect();
        groups.dedup();
        groups
    }

    /// Direct children of `group` that hold a value.
    pub fn child_keys(&self, group: &str) -> Vec<String> {
        self.children(group)
            .filter(|rest| !rest.contains('/'))
            .map(str::to_string)
            .collect()
    }

    /// Applies several mutations and persists them with a single write.
    pub fn batch<F>(&mut self, f: F) -> eyre::Result<()>
    where
        F: FnOnce(&mut Batch),
    {
        let mut batch = Batch {
            entries: &mut self.entries,
        };
        f(&mut batch);
        self.sync()
    }

    fn children<'a>(&'a self, group: &str) -> impl Iterator<Item = &'a str> + 'a {
        let prefix = format!("{group}/");
        let skip = prefix.len();
        self.entries
            .range(prefix.clone()..)
            .map(|(key, _)| key.as_str())
            .take_while(move |key| key.starts_with(&prefix))
            .map(move |key| &key[skip..])
            .filter(|rest| !rest.is_empty())
    }

    fn sync(&self) -> eyre::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Could not create folder {parent:?}"))?;
        }
        std::fs::write(&self.path, ini_parser::write_ini(&self.entries))
            .wrap_err_with(|| format!("Could not write settings to {:?}", self.path))
    }
}

pub struct Batch<'a> {
    entries: &'a mut BTreeMap<String, SettingValue>,
}

impl Batch<'_> {
    pub fn set<V: Into<SettingValue>>(&mut self, key: &str, value: V) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        let prefix = format!("{key}/");
        self.entries
            .retain(|existing, _| existing != key && !existing.starts_with(&prefix));
    }
}
