//! Restore store keys from an export file.
//!
//! The whole payload is validated before the first write, so a rejected
//! import leaves the store exactly as it was.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use super::database::Database;
use super::export::SNAPSHOT_FORMAT_V1;
use super::store::KeyValueStore;
use crate::config::SnapshotConfig;
use crate::engine::ManualClock;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported_keys: Vec<String>,
    pub saved_weights: bool,
    pub backup_key: String,
    pub stats: Vec<KeyStats>,
}

/// Record counts of one imported key, when its value is a database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyStats {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rallies: Option<usize>,
}

impl KeyStats {
    fn of(key: &str, value: &Value) -> Self {
        let count = |field: &str| value.get(field).and_then(Value::as_array).map(Vec::len);
        Self {
            key: key.to_string(),
            players: count("players"),
            matches: count("matches"),
            rallies: count("rallies"),
        }
    }
}

/// Locate the key/value dump inside an export document.
///
/// Accepted shapes, tried in order: `raw.localStorage.dump`, `dump`,
/// a `localStorage-snapshot-v1` document's `keys`, and finally the root
/// itself when one of its keys mentions `db`.
pub fn extract_dump(root: &Value) -> Option<&Map<String, Value>> {
    let nested = root
        .get("raw")
        .and_then(|raw| raw.get("localStorage"))
        .and_then(|ls| ls.get("dump"))
        .and_then(Value::as_object);
    if nested.is_some() {
        return nested;
    }

    if let Some(dump) = root.get("dump").and_then(Value::as_object) {
        return Some(dump);
    }

    if root.get("format").and_then(Value::as_str) == Some(SNAPSHOT_FORMAT_V1) {
        if let Some(keys) = root.get("keys").and_then(Value::as_object) {
            return Some(keys);
        }
    }

    root.as_object().filter(|obj| obj.keys().any(|k| k.contains("db")))
}

fn extract_weights(root: &Value) -> Option<&Value> {
    root.get("weights").filter(|w| !w.is_null())
}

/// Import an export document into `store`.
pub fn import_export_json<S>(
    store: &mut S,
    config: &SnapshotConfig,
    json_text: &str,
    now: DateTime<Utc>,
) -> Result<ImportSummary>
where
    S: KeyValueStore + ?Sized,
{
    let root: Value = serde_json::from_str(json_text)
        .map_err(|e| CoreError::Deserialization(format!("snapshot is not valid JSON: {}", e)))?;

    let dump = extract_dump(&root).ok_or_else(|| {
        CoreError::UnsupportedFormat(
            "expected raw.localStorage.dump, dump, or a localStorage-snapshot-v1 document".to_string(),
        )
    })?;
    if dump.is_empty() {
        return Err(CoreError::EmptyDump);
    }

    if let Some(db) = dump.get(&config.db_key) {
        Database::from_value(db.clone())?.into_scorebook(ManualClock::frozen(now.timestamp_millis()))?;
    }

    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let backup_key = format!("{}{}", config.backup_prefix, stamp);
    let mut backup = Map::new();
    for key in dump.keys() {
        backup.insert(key.clone(), store.get(key).unwrap_or(Value::Null));
    }
    if let Some(previous) = store.get(&config.weights_key) {
        backup.insert(config.weights_key.clone(), previous);
    }
    store.set(&backup_key, Value::Object(backup))?;

    let mut imported_keys = Vec::with_capacity(dump.len());
    for (key, value) in dump {
        store.set(key, value.clone())?;
        imported_keys.push(key.clone());
    }

    let saved_weights = match extract_weights(&root) {
        Some(weights) => {
            store.set(&config.weights_key, weights.clone())?;
            true
        }
        None => false,
    };

    let stats = dump.iter().map(|(key, value)| KeyStats::of(key, value)).collect();
    store.set(
        &config.last_imported_key,
        json!({ "at": stamp, "keys": imported_keys, "backupKey": backup_key }),
    )?;

    info!(keys = imported_keys.len(), saved_weights, backup_key = %backup_key, "snapshot imported");
    Ok(ImportSummary { imported_keys, saved_weights, backup_key, stats })
}
