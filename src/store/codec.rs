use std::collections::BTreeMap;

use super::{SettingValue, SettingsStore};

/// Field name to value, as stored for one array element.
pub type RecordFields = BTreeMap<&'static str, String>;

/// `group -> key -> value`, as stored by [`write_dict`].
pub type NestedMap = BTreeMap<String, BTreeMap<String, String>>;

/// A record that is stored as one element of an indexed settings array.
pub trait SettingsRecord: Sized {
    /// Names of the stored fields; every one of them is written for each record.
    const FIELDS: &'static [&'static str];

    /// `fields` holds every name in [`Self::FIELDS`], absent ones as empty strings.
    fn from_fields(fields: RecordFields) -> Self;

    fn to_fields(&self) -> RecordFields;
}

pub fn read_list(store: &SettingsStore, key: &str) -> Vec<String> {
    store.value(key).map(SettingValue::to_list).unwrap_or_default()
}

/// Stores `values` under `key`, an empty list removes the key.
pub fn write_list(store: &mut SettingsStore, key: &str, values: &[String]) -> eyre::Result<()> {
    if values.is_empty() {
        store.remove(key)
    } else {
        store.set_value(key, values)
    }
}

/// Reads the array `key`, elements are stored at `key/<i>/<field>` with `i` in `1..=key/size`.
///
/// `size` is capped at the highest index that has fields stored.
pub fn read_array<R: SettingsRecord>(store: &SettingsStore, key: &str) -> Vec<R> {
    let size = store
        .text(&format!("{key}/size"))
        .and_then(|size| size.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let highest_stored = store
        .child_groups(key)
        .iter()
        .filter_map(|index| index.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    (1..=size.min(highest_stored))
        .map(|index| {
            let fields = R::FIELDS
                .iter()
                .map(|field| {
                    let value = store
                        .text(&format!("{key}/{index}/{field}"))
                        .unwrap_or_default();
                    (*field, value)
                })
                .collect();
            R::from_fields(fields)
        })
        .collect()
}

/// Replaces the array `key` with `records`.
pub fn write_array<R: SettingsRecord>(
    store: &mut SettingsStore,
    key: &str,
    records: &[R],
) -> eyre::Result<()> {
    store.batch(|batch| {
        batch.remove(key);
        for (index, record) in records.iter().enumerate() {
            let mut fields = record.to_fields();
            for field in R::FIELDS {
                let value = fields.remove(field).unwrap_or_default();
                batch.set(&format!("{key}/{}/{field}", index + 1), SettingValue::Text(value));
            }
        }
        batch.set(&format!("{key}/size"), records.len().to_string());
    })
}

pub fn read_dict(store: &SettingsStore, key: &str) -> NestedMap {
    let mut data = NestedMap::new();
    for group in store.child_groups(key) {
        let group_key = format!("{key}/{group}");
        let values = store
            .child_keys(&group_key)
            .into_iter()
            .map(|child| {
                let value = store
                    .text(&format!("{group_key}/{child}"))
                    .unwrap_or_default();
                (child, value)
            })
            .collect();
        data.insert(group, values);
    }
    data
}

/// Replaces the group `key` with the contents of `data`.
pub fn write_dict(store: &mut SettingsStore, key: &str, data: &NestedMap) -> eyre::Result<()> {
    store.batch(|batch| {
        batch.remove(key);
        for (group, values) in data {
            for (child, value) in values {
                batch.set(&format!("{key}/{group}/{child}"), value.as_str());
            }
        }
    })
}
