//! vb_cli support library
//!
//! File-backed key/value store plus the text rendering used by the binary.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde_json::Value;
use std::fs::{self, rename, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use vb_core::analysis::{pct, summarize_match, PlayerReport};
use vb_core::config::SNAPSHOT_CONFIG_PATH_ENV;
use vb_core::snapshot::{
    build_snapshot, default_export_filename, import_export_json, ImportSummary, KeyValueStore, MemoryStore,
};
use vb_core::{
    Action, ActionKind, Clock, MatchLog, Quality, RallyState, Scorebook, SetCallType, SnapshotConfig,
};

/// Snapshot config from `VB_SNAPSHOT_CONFIG_PATH`, or defaults when unset/blank.
pub fn load_config() -> Result<SnapshotConfig> {
    match std::env::var(SNAPSHOT_CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => {
            let config = SnapshotConfig::load(path.trim())
                .with_context(|| format!("Failed to load snapshot config from {}", path.trim()))?;
            tracing::info!(path = %path.trim(), "loaded snapshot config");
            Ok(config)
        }
        _ => Ok(SnapshotConfig::default()),
    }
}

/// JSON file holding a whole key/value store as one object.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Open `path`; a missing file starts an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store: {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Store is not a JSON object: {}", path.display()))?
        } else {
            MemoryStore::new()
        };
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a temp file, then rename over the store.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&self.inner)?;
        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)
                .with_context(|| format!("Failed to create {}", temp_path.display()))?;
            file.write_all(&data)?;
            file.sync_all()?;
        }
        rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to replace store: {}", self.path.display()))?;
        tracing::debug!(bytes = data.len(), path = %self.path.display(), "store saved");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> vb_core::Result<()> {
        self.inner.set(key, value)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}

/// Write every exported key of `store` as a snapshot file. The keys are
/// copied verbatim, so a store the engine cannot read still exports.
/// Returns the written path and the number of keys.
pub fn export_store<S>(
    store: &S,
    config: &SnapshotConfig,
    out: Option<&Path>,
    now: DateTime<Local>,
) -> Result<(PathBuf, usize)>
where
    S: KeyValueStore + ?Sized,
{
    let user_agent = format!("vb_cli/{}", vb_core::VERSION);
    let snapshot = build_snapshot(store, config, &now, Some(&user_agent));
    let out = match out {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_export_filename(&config.export_file_prefix, &now)),
    };
    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(&out, json).with_context(|| format!("Failed to write export: {}", out.display()))?;
    tracing::info!(keys = snapshot.keys.len(), path = %out.display(), "snapshot exported");
    Ok((out, snapshot.keys.len()))
}

/// Import a snapshot file into `store` and save it.
pub fn import_file(
    store: &mut FileStore,
    config: &SnapshotConfig,
    input: &Path,
    now: DateTime<Utc>,
) -> Result<ImportSummary> {
    let text = fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let summary = import_export_json(store, config, &text, now)
        .with_context(|| format!("Failed to import {}", input.display()))?;
    store.save()?;
    Ok(summary)
}

fn parse_wire<T: serde::de::DeserializeOwned>(what: &str, raw: &str) -> Result<T> {
    serde_json::from_value(Value::String(raw.to_string()))
        .with_context(|| format!("Unknown {}: {}", what, raw))
}

/// Build an action from command-line words, e.g. `receive ok A` or `set ok aQuick`.
pub fn parse_action(kind: &str, result: &str, quality: Option<&str>, tag: Option<&str>) -> Result<Action> {
    let kind: ActionKind = parse_wire("action kind", kind)?;
    let quality = quality.map(|q| parse_wire::<Quality>("quality", q)).transpose()?;
    let tag = tag.map(|t| parse_wire::<SetCallType>("set call", t)).transpose()?;
    Ok(Action::from_parts(kind, result, quality, tag, None)?)
}

/// Resolve a player argument given either as id or as name.
pub fn find_player_id<C: Clock>(book: &Scorebook<C>, id_or_name: &str) -> Option<String> {
    book.player(id_or_name)
        .or_else(|| book.player_by_name(id_or_name))
        .map(|p| p.id.clone())
}

fn player_name<C: Clock>(book: &Scorebook<C>, id: &str) -> String {
    book.player(id).map(|p| p.name.clone()).unwrap_or_else(|| id.to_string())
}

/// One line per match, newest date first.
pub fn match_lines<C: Clock>(book: &Scorebook<C>) -> Vec<String> {
    book.matches_by_date()
        .into_iter()
        .map(|log| {
            let summary = summarize_match(log);
            format!(
                "{}  {}  {} ({} rallies)",
                summary.date, summary.match_id, summary.score, summary.finalized_rallies
            )
        })
        .collect()
}

/// Rally-by-rally score progression of one match.
pub fn timeline_lines<C: Clock>(book: &Scorebook<C>, log: &MatchLog) -> Vec<String> {
    log.timeline()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let winner = match entry.rally.state() {
                RallyState::Finalized(side) => side.as_str(),
                RallyState::Open => "open",
                RallyState::Abandoned => "void",
            };
            let actions: Vec<String> = entry
                .rally
                .actions()
                .iter()
                .map(|r| describe_action(&player_name(book, &r.actor_id), &r.action))
                .collect();
            format!(
                "#{:<3} {:>5} -> {:<5} {:<5} {:?} {}",
                i + 1,
                entry.score_before.to_string(),
                entry.score_after.to_string(),
                winner,
                entry.phase(),
                actions.join(", ")
            )
        })
        .collect()
}

fn describe_action(actor: &str, action: &Action) -> String {
    let mut text = format!("{} {} {}", actor, action.kind(), action.result_str());
    if let Some(q) = action.quality() {
        text.push_str(&format!(" [{}]", q.as_str()));
    }
    if let Some(call) = action.set_call().or_else(|| action.origin_tag()) {
        text.push_str(&format!(" <{}>", call.label()));
    }
    text
}

/// Per-kind counts and success rates for a player report.
pub fn report_lines(name: &str, report: &PlayerReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{}: {} actions in {} matches",
        name,
        report.total_actions(),
        report.matches_played
    )];

    for (kind, stats) in &report.by_kind {
        let errors = stats.count("error");
        let mean = stats.score.mean().map(|m| format!("{:.2}", m)).unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "  {:<8} {:>3} attempts  errors {:>4}  score {}",
            kind,
            stats.attempts,
            pct(errors, stats.attempts),
            mean
        ));
    }

    for (origin, stats) in &report.attack_by_origin {
        let label = origin.map(|c| c.label()).unwrap_or("-");
        let mean = stats.mean().unwrap_or(0.0);
        lines.push(format!("  attack via {:<10} {:>3} attempts  score {:.2}", label, stats.attempts, mean));
    }

    for (pass, stats) in &report.set_by_pass_quality {
        let grade = pass.map(|q| q.as_str()).unwrap_or("-");
        let ok = stats.total.round() as u32;
        lines.push(format!("  set after {} pass  {}", grade, pct(ok.min(stats.attempts), stats.attempts)));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;
    use vb_core::engine::ManualClock;
    use vb_core::snapshot::{load_scorebook, save_scorebook};
    use vb_core::{AttackResult, SetResult, TeamSide, TouchResult};

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = FileStore::open(&path).unwrap();
        assert!(store.keys().is_empty());
        store.set("valleyPwa.db.v3", json!({ "players": [] })).unwrap();
        store.save().unwrap();
        assert!(!path.with_extension("tmp").exists());

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("valleyPwa.db.v3"), Some(json!({ "players": [] })));
    }

    #[test]
    fn test_file_store_rejects_non_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(FileStore::open(&path).is_err());
    }

    #[test]
    fn test_export_and_import_do_not_need_a_readable_scorebook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let config = SnapshotConfig::default();
        fs::write(
            &path,
            json!({ "valleyPwa.db.v3": { "players": "broken" }, "valleyPwa.note": "keep" }).to_string(),
        )
        .unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert!(load_scorebook(&store, &config, ManualClock::frozen(0)).is_err());

        let out = dir.path().join("backup.json");
        let (written, keys) = export_store(&store, &config, Some(&out), Local::now()).unwrap();
        assert_eq!(written, out);
        assert_eq!(keys, 2);
        let exported: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(exported["keys"]["valleyPwa.db.v3"], json!({ "players": "broken" }));

        let snapshot = dir.path().join("good.json");
        fs::write(
            &snapshot,
            json!({ "dump": { "valleyPwa.db.v3": { "players": [], "matches": [], "rallies": [] } } }).to_string(),
        )
        .unwrap();
        let summary = import_file(&mut store, &config, &snapshot, Utc::now()).unwrap();
        assert_eq!(summary.imported_keys, vec!["valleyPwa.db.v3".to_string()]);

        let reopened = FileStore::open(&path).unwrap();
        assert!(load_scorebook(&reopened, &config, ManualClock::frozen(0)).is_ok());
        assert_eq!(reopened.get("valleyPwa.note"), Some(json!("keep")));
    }

    #[test]
    fn test_parse_action() {
        assert_eq!(
            parse_action("receive", "ok", Some("A"), None).unwrap(),
            Action::receive_ok(Some(Quality::A))
        );
        assert_eq!(
            parse_action("set", "ok", None, Some("aQuick")).unwrap(),
            Action::set_ok(Some(SetCallType::AQuick))
        );
        assert_eq!(parse_action("attack", "kill", None, None).unwrap(), Action::attack(AttackResult::Kill));
        assert_eq!(parse_action("dig", "error", None, None).unwrap(), Action::Dig(TouchResult::Error));
        assert_eq!(parse_action("set", "error", None, None).unwrap(), Action::Set(SetResult::Error));

        assert!(parse_action("spike", "kill", None, None).is_err());
        assert!(parse_action("receive", "error", Some("A"), None).is_err());
        assert!(parse_action("attack", "kill", None, Some("left")).is_err());
        assert!(parse_action("receive", "ok", Some("D"), None).is_err());
    }

    #[test]
    fn test_store_backed_scorebook_and_rendering() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let config = SnapshotConfig::default();

        let mut store = FileStore::open(&path).unwrap();
        let mut book = load_scorebook(&store, &config, ManualClock::new(0, 1)).unwrap();
        let setter = book.add_player("Aki").map(|p| p.id.clone()).unwrap();
        let hitter = book.add_player("Ren").map(|p| p.id.clone()).unwrap();
        let mid = book.add_match(Some("2025-06-01"));
        book.assign(&mid, &setter, TeamSide::Home);
        book.assign(&mid, &hitter, TeamSide::Home);
        book.record(&mid, &setter, Action::set_ok(Some(SetCallType::Left)));
        book.record(&mid, &hitter, Action::attack(AttackResult::Kill));
        save_scorebook(&mut store, &config, &book).unwrap();
        store.save().unwrap();

        let store = FileStore::open(&path).unwrap();
        let book = load_scorebook(&store, &config, ManualClock::new(100, 1)).unwrap();
        assert_eq!(find_player_id(&book, "Ren").as_deref(), Some(hitter.as_str()));
        assert_eq!(find_player_id(&book, &setter).as_deref(), Some(setter.as_str()));
        assert_eq!(find_player_id(&book, "nobody"), None);

        let matches = match_lines(&book);
        assert_eq!(matches.len(), 1);
        assert!(matches[0].contains("1-0"));

        let log = book.match_log(&mid).unwrap();
        let lines = timeline_lines(&book, log);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("home"));
        assert!(lines[0].contains("Ren attack kill"));
        assert!(lines[1].contains("open"));

        let report = vb_core::analysis::player_report(&book, &hitter);
        let text = report_lines("Ren", &report);
        assert!(text[0].starts_with("Ren: 1 actions in 1 matches"));
        assert!(text.iter().any(|l| l.contains("attack via")));
    }
}
