//! Registry of players and matches for one scorekeeper.

use tracing::info;

use super::clock::{Clock, SystemClock};
use super::match_log::{MatchLog, RecordOutcome};
use crate::models::{Action, Match, Player, TeamSide};

/// Players plus one [`MatchLog`] per match, both in insertion order.
///
/// Mutating a match requires `&mut` access to its log, which keeps a single
/// writer per match. Embedders with concurrent writers should guard each
/// `MatchLog` with its own lock; nothing here orders operations across matches.
#[derive(Debug)]
pub struct Scorebook<C: Clock = SystemClock> {
    players: Vec<Player>,
    matches: Vec<MatchLog>,
    clock: C,
}

impl Default for Scorebook<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorebook<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> Scorebook<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { players: Vec::new(), matches: Vec::new(), clock }
    }

    pub(crate) fn from_parts(players: Vec<Player>, matches: Vec<MatchLog>, clock: C) -> Self {
        Self { players, matches, clock }
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name.trim())
    }

    /// Register a player. Blank or already-taken names are ignored.
    pub fn add_player(&mut self, name: &str) -> Option<&Player> {
        let name = name.trim();
        if name.is_empty() || self.players.iter().any(|p| p.name == name) {
            return None;
        }
        let player = Player::new(name, self.clock.now_ms());
        self.players.push(player);
        self.players.last()
    }

    /// Remove a player and take them off every roster. Logged actions stay.
    pub fn remove_player(&mut self, player_id: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != player_id);
        for log in &mut self.matches {
            log.unassign(player_id);
        }
        before != self.players.len()
    }

    /// Create a match dated `date` (today when `None`) and return its id.
    pub fn add_match(&mut self, date: Option<&str>) -> String {
        let now = self.clock.now_ms();
        let date = date.map(str::to_string).unwrap_or_else(|| today_iso(now));
        let log = MatchLog::new(Match::new(date, now), now);
        let id = log.id().to_string();
        info!(match_id = %id, "match created");
        self.matches.push(log);
        id
    }

    pub fn remove_match(&mut self, match_id: &str) -> bool {
        let before = self.matches.len();
        self.matches.retain(|log| log.id() != match_id);
        before != self.matches.len()
    }

    pub fn set_match_date(&mut self, match_id: &str, date: &str) -> bool {
        match self.match_log_mut(match_id) {
            Some(log) => {
                log.set_date(date);
                true
            }
            None => false,
        }
    }

    pub fn match_log(&self, match_id: &str) -> Option<&MatchLog> {
        self.matches.iter().find(|log| log.id() == match_id)
    }

    pub fn match_log_mut(&mut self, match_id: &str) -> Option<&mut MatchLog> {
        self.matches.iter_mut().find(|log| log.id() == match_id)
    }

    pub fn match_logs(&self) -> impl Iterator<Item = &MatchLog> {
        self.matches.iter()
    }

    /// Matches, newest date first.
    pub fn matches_by_date(&self) -> Vec<&MatchLog> {
        let mut logs: Vec<&MatchLog> = self.matches.iter().collect();
        logs.sort_by(|a, b| b.info().date.cmp(&a.info().date));
        logs
    }

    pub fn assign(&mut self, match_id: &str, actor_id: &str, side: TeamSide) -> bool {
        match self.match_log_mut(match_id) {
            Some(log) => {
                log.assign(actor_id, side);
                true
            }
            None => false,
        }
    }

    /// Record an action in a match, stamped with this scorebook's clock.
    pub fn record(&mut self, match_id: &str, actor_id: &str, action: Action) -> Option<RecordOutcome> {
        let now = self.clock.now_ms();
        self.match_log_mut(match_id).map(|log| log.record(actor_id, action, now))
    }

    /// Award the current rally of a match. Returns the finalized rally id.
    pub fn finalize_manually(&mut self, match_id: &str, side: TeamSide) -> Option<String> {
        let now = self.clock.now_ms();
        self.match_log_mut(match_id).map(|log| log.finalize_manually(side, now))
    }

    pub fn delete_rally(&mut self, match_id: &str, rally_id: &str) -> bool {
        let now = self.clock.now_ms();
        self.match_log_mut(match_id).is_some_and(|log| log.delete_rally(rally_id, now))
    }
}

/// `yyyy-mm-dd` in local time for a unix-millisecond instant.
pub fn today_iso(now_ms: i64) -> String {
    use chrono::{Local, TimeZone};
    match Local.timestamp_millis_opt(now_ms).single() {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => Local::now().format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::ManualClock;
    use crate::models::{AttackResult, ServeResult};

    fn book() -> Scorebook<ManualClock> {
        Scorebook::with_clock(ManualClock::new(1_700_000_000_000, 10))
    }

    #[test]
    fn test_add_player_trims_and_dedupes() {
        let mut book = book();
        assert!(book.add_player("  Sato ").is_some());
        assert!(book.add_player("Sato").is_none());
        assert!(book.add_player("   ").is_none());
        assert_eq!(book.players().len(), 1);
        assert_eq!(book.players()[0].name, "Sato");
    }

    #[test]
    fn test_remove_player_clears_rosters_but_keeps_actions() {
        let mut book = book();
        let pid = book.add_player("Ito").map(|p| p.id.clone()).unwrap();
        let mid = book.add_match(Some("2025-04-01"));
        book.assign(&mid, &pid, TeamSide::Home);
        book.record(&mid, &pid, Action::Serve(ServeResult::In));

        assert!(book.remove_player(&pid));
        let log = book.match_log(&mid).unwrap();
        assert!(!log.roster().contains(&pid));
        assert_eq!(log.current().actions().len(), 1);

        let ignored = book.record(&mid, &pid, Action::attack(AttackResult::Kill)).unwrap();
        assert_eq!(ignored.outcome(), None);
    }

    #[test]
    fn test_match_logs_keep_insertion_order() {
        let mut book = book();
        let ids: Vec<String> = ["2025-02-01", "2025-01-01", "2025-03-01"]
            .into_iter()
            .map(|date| book.add_match(Some(date)))
            .collect();
        let listed: Vec<&str> = book.match_logs().map(|log| log.id()).collect();
        assert_eq!(listed, ids.iter().map(String::as_str).collect::<Vec<_>>());

        assert!(book.remove_match(&ids[1]));
        assert!(!book.remove_match(&ids[1]));
        let listed: Vec<&str> = book.match_logs().map(|log| log.id()).collect();
        assert_eq!(listed, vec![ids[0].as_str(), ids[2].as_str()]);
    }

    #[test]
    fn test_matches_sorted_newest_first() {
        let mut book = book();
        book.add_match(Some("2025-01-10"));
        book.add_match(Some("2025-03-02"));
        book.add_match(Some("2024-12-31"));
        let dates: Vec<&str> = book.matches_by_date().iter().map(|m| m.info().date.as_str()).collect();
        assert_eq!(dates, vec!["2025-03-02", "2025-01-10", "2024-12-31"]);
    }

    #[test]
    fn test_manual_points_and_deletion() {
        let mut book = book();
        let mid = book.add_match(None);
        assert_eq!(book.match_log(&mid).unwrap().info().date.len(), 10);

        let first = book.finalize_manually(&mid, TeamSide::Home).unwrap();
        book.finalize_manually(&mid, TeamSide::Away);
        assert_eq!(book.match_log(&mid).unwrap().score().total(), 2);

        assert!(book.delete_rally(&mid, &first));
        assert_eq!(book.match_log(&mid).unwrap().score().home, 0);
        assert!(book.finalize_manually("missing", TeamSide::Home).is_none());
        assert!(book.remove_match(&mid));
        assert!(book.match_log(&mid).is_none());
    }
}
