use std::collections::BTreeMap;

use chrono::{DateTime, Offset, SecondsFormat, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::store::KeyValueStore;
use crate::config::SnapshotConfig;

pub const SNAPSHOT_FORMAT_V1: &str = "localStorage-snapshot-v1";

/// Export file: every configured key of the store, verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub format: String,
    pub exported_at: String,
    pub keys: BTreeMap<String, Value>,
    pub meta: ExportMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMeta {
    /// Minutes to add to local time to get UTC (negative east of Greenwich).
    pub timezone_offset_minutes: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Collect every key covered by the configured prefixes.
pub fn build_snapshot<S, Tz>(
    store: &S,
    config: &SnapshotConfig,
    now: &DateTime<Tz>,
    user_agent: Option<&str>,
) -> ExportSnapshot
where
    S: KeyValueStore + ?Sized,
    Tz: TimeZone,
{
    let keys = store
        .keys()
        .into_iter()
        .filter(|key| config.is_exported(key))
        .filter_map(|key| store.get(&key).map(|value| (key, value)))
        .collect();

    let offset_secs = now.offset().fix().local_minus_utc();
    ExportSnapshot {
        format: SNAPSHOT_FORMAT_V1.to_string(),
        exported_at: now.with_timezone(&chrono::Utc).to_rfc3339_opts(SecondsFormat::Millis, true),
        keys,
        meta: ExportMeta {
            timezone_offset_minutes: -offset_secs / 60,
            user_agent: user_agent.map(str::to_string),
        },
    }
}

/// `<prefix>-YYYYMMDD-HHMMSS.json` in the timestamp's own timezone.
pub fn default_export_filename<Tz>(prefix: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{}-{}.json", prefix, now.format("%Y%m%d-%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::store::MemoryStore;
    use chrono::FixedOffset;
    use serde_json::json;

    fn tokyo_noon() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 4, 12, 5, 9)
            .unwrap()
    }

    #[test]
    fn test_snapshot_collects_prefixed_keys() {
        let mut store = MemoryStore::new();
        store.set("valleyPwa.db.v3", json!({ "players": [] })).unwrap();
        store.set("volleyPwa.legacy", json!("x")).unwrap();
        store.set("unrelated", json!(1)).unwrap();

        let snapshot = build_snapshot(&store, &SnapshotConfig::default(), &tokyo_noon(), Some("vb_cli"));
        assert_eq!(snapshot.format, SNAPSHOT_FORMAT_V1);
        assert_eq!(snapshot.keys.len(), 2);
        assert!(!snapshot.keys.contains_key("unrelated"));
        assert_eq!(snapshot.exported_at, "2025-03-04T03:05:09.000Z");
        assert_eq!(snapshot.meta.timezone_offset_minutes, -540);
        assert_eq!(snapshot.meta.user_agent.as_deref(), Some("vb_cli"));
    }

    #[test]
    fn test_default_filename() {
        assert_eq!(
            default_export_filename("volley-pwa-export", &tokyo_noon()),
            "volley-pwa-export-20250304-120509.json"
        );
    }
}
