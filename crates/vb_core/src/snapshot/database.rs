//! Flat persisted form of a [`Scorebook`]: `{ players, matches, rallies }`.

use std::collections::{BTreeMap, HashSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{Clock, MatchLog, Scorebook};
use crate::error::{CoreError, Result};
use crate::models::{Match, Player, RallyLog};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Database {
    pub players: Vec<Player>,
    pub matches: Vec<Match>,
    pub rallies: Vec<RallyLog>,
}

/// Untyped shell used so that each record can be validated, and reported, on its own.
#[derive(Deserialize)]
struct RawDatabase {
    #[serde(default)]
    players: Vec<Value>,
    #[serde(default)]
    matches: Vec<Value>,
    #[serde(default)]
    rallies: Vec<Value>,
}

fn parse_records<T: DeserializeOwned>(collection: &'static str, raw: Vec<Value>) -> Result<Vec<T>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            let id = value.get("id").and_then(Value::as_str).unwrap_or("?").to_string();
            serde_json::from_value(value)
                .map_err(|e| CoreError::Deserialization(e.to_string()).in_record(collection, index, id))
        })
        .collect()
}

fn ensure_unique_ids<'a>(
    collection: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for (index, id) in ids.enumerate() {
        if !seen.insert(id) {
            return Err(CoreError::Validation("duplicate id".to_string()).in_record(collection, index, id));
        }
    }
    Ok(())
}

impl Database {
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Parse every record, naming the first one that fails.
    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawDatabase = serde_json::from_value(value)?;
        let db = Database {
            players: parse_records("players", raw.players)?,
            matches: parse_records("matches", raw.matches)?,
            rallies: parse_records("rallies", raw.rallies)?,
        };
        ensure_unique_ids("players", db.players.iter().map(|p| p.id.as_str()))?;
        ensure_unique_ids("matches", db.matches.iter().map(|m| m.id.as_str()))?;
        ensure_unique_ids("rallies", db.rallies.iter().map(|r| r.id.as_str()))?;
        Ok(db)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Flatten a scorebook. Rallies of each match are listed in timeline order.
    pub fn from_scorebook<C: Clock>(book: &Scorebook<C>) -> Self {
        let mut matches = Vec::new();
        let mut rallies = Vec::new();
        for log in book.match_logs() {
            matches.push(log.info().clone());
            rallies.extend(log.rallies().cloned());
        }
        Database { players: book.players().to_vec(), matches, rallies }
    }

    /// Rebuild a scorebook. Nothing is built if any record is invalid.
    pub fn into_scorebook<C: Clock>(self, clock: C) -> Result<Scorebook<C>> {
        let mut by_match: BTreeMap<String, Vec<RallyLog>> =
            self.matches.iter().map(|m| (m.id.clone(), Vec::new())).collect();
        for (index, rally) in self.rallies.into_iter().enumerate() {
            match by_match.get_mut(&rally.match_id) {
                Some(list) => list.push(rally),
                None => {
                    let reason = CoreError::NotFound(format!("match {}", rally.match_id));
                    return Err(reason.in_record("rallies", index, rally.id));
                }
            }
        }

        let now = clock.now_ms();
        let mut logs = Vec::with_capacity(self.matches.len());
        for (index, info) in self.matches.into_iter().enumerate() {
            let rallies = by_match.remove(&info.id).unwrap_or_default();
            let id = info.id.clone();
            let log = MatchLog::from_records(info, rallies, now)
                .map_err(|e| e.in_record("matches", index, id))?;
            logs.push(log);
        }
        Ok(Scorebook::from_parts(self.players, logs, clock))
    }
}
