//! Score leaderboard
//!
//! Persisted to LocalStorage as a plain JSON list, keeps the top 10 sessions.

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore, PersistenceError};

/// Maximum number of records to keep
pub const MAX_ENTRIES: usize = 10;
/// Number of records shown in the leaderboard view
pub const VIEW_ENTRIES: usize = 5;

/// A single finished session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Final score
    pub score: u32,
    /// ISO-8601 timestamp of when the session ended
    pub date: String,
    /// Opaque identity token
    pub id: String,
}

/// Top-10 leaderboard, sorted descending by score
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<ScoreRecord>,
}

impl Leaderboard {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "reactionGameScores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from records in any order (sorted and trimmed)
    pub fn from_records(records: Vec<ScoreRecord>) -> Self {
        let mut board = Self { entries: records };
        board.normalize();
        board
    }

    /// Insert a record after every entry with an equal or higher score, then trim.
    /// Returns the rank achieved (1-indexed) or None if it didn't make the board.
    pub fn record(&mut self, record: ScoreRecord) -> Option<usize> {
        let index = self.entries.partition_point(|e| e.score >= record.score);
        if index >= MAX_ENTRIES {
            return None;
        }
        self.entries.insert(index, record);
        self.entries.truncate(MAX_ENTRIES);
        Some(index + 1)
    }

    /// Stable descending sort (ties keep recording order), then truncate
    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
    }

    /// Highest retained score, zero when empty
    pub fn best(&self) -> u32 {
        self.entries.iter().map(|e| e.score).max().unwrap_or(0)
    }

    pub fn entries(&self) -> &[ScoreRecord] {
        &self.entries
    }

    /// Records shown in the leaderboard view
    pub fn top(&self, count: usize) -> &[ScoreRecord] {
        &self.entries[..count.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read the persisted list. Absent or unreadable data yields an empty board.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match persistence::load_json::<Vec<ScoreRecord>>(store, Self::STORAGE_KEY) {
            Ok(Some(records)) => {
                let board = Self::from_records(records);
                log::info!("Loaded {} scores", board.len());
                board
            }
            Ok(None) => {
                log::info!("No scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Error loading scores, starting fresh: {}", e);
                Self::new()
            }
        }
    }

    /// Persist the list
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), PersistenceError> {
        persistence::save_json(store, Self::STORAGE_KEY, &self.entries)?;
        log::info!("Scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Random 9-character base-36 identity token
pub fn new_record_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    (0..9)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Format a unix timestamp (ms) as an ISO-8601 UTC string, e.g. `2024-03-05T14:07:09.250Z`
pub fn iso8601_from_unix_ms(unix_ms: f64) -> String {
    DateTime::<Utc>::from_timestamp_millis(unix_ms.max(0.0) as i64)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Short display date (`M/D/YYYY`) for a stored ISO-8601 timestamp.
/// Unparseable values are shown as-is.
pub fn format_date(iso: &str) -> String {
    match DateTime::parse_from_rfc3339(iso) {
        Ok(date) => date.format("%-m/%-d/%Y").to_string(),
        Err(_) => iso.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use proptest::prelude::*;

    fn rec(score: u32, id: &str) -> ScoreRecord {
        ScoreRecord {
            score,
            date: "2024-01-01T00:00:00.000Z".to_string(),
            id: id.to_string(),
        }
    }

    #[test]
    fn test_record_sorts_and_truncates() {
        let mut board = Leaderboard::new();
        for i in 0..15u32 {
            board.record(rec(i, &format!("id{}", i)));
        }
        assert_eq!(board.len(), MAX_ENTRIES);
        assert_eq!(board.entries()[0].score, 14);
        assert_eq!(board.entries()[9].score, 5);
        assert_eq!(board.best(), 14);
    }

    #[test]
    fn test_record_returns_rank() {
        let mut board = Leaderboard::new();
        assert_eq!(board.record(rec(5, "a")), Some(1));
        assert_eq!(board.record(rec(9, "b")), Some(1));
        assert_eq!(board.record(rec(5, "c")), Some(3));
        for i in 0..10 {
            board.record(rec(50, &format!("hi{}", i)));
        }
        assert_eq!(board.record(rec(1, "low")), None);
    }

    #[test]
    fn test_rank_ignores_duplicate_ids() {
        let mut board = Leaderboard::from_records(vec![rec(9, "dup"), rec(2, "other")]);
        assert_eq!(board.record(rec(5, "dup")), Some(2));
        let scores: Vec<u32> = board.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![9, 5, 2]);
    }

    #[test]
    fn test_ties_keep_recording_order() {
        let mut board = Leaderboard::new();
        board.record(rec(3, "first"));
        board.record(rec(7, "big"));
        board.record(rec(3, "second"));
        let ids: Vec<&str> = board.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["big", "first", "second"]);
    }

    #[test]
    fn test_best_empty_is_zero() {
        assert_eq!(Leaderboard::new().best(), 0);
    }

    #[test]
    fn test_load_absent_is_empty() {
        let store = MemoryStore::new();
        assert!(Leaderboard::load(&store).is_empty());
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let store = MemoryStore::new();
        for bad in ["not json", "{\"score\": 1}", "[{\"score\": -3}]", "null", ""] {
            store.set(Leaderboard::STORAGE_KEY, bad).unwrap();
            assert!(Leaderboard::load(&store).is_empty(), "value {:?}", bad);
        }
    }

    #[test]
    fn test_load_resorts_unsorted_data() {
        let store = MemoryStore::new();
        store
            .set(
                Leaderboard::STORAGE_KEY,
                r#"[{"score":2,"date":"2024-01-01T00:00:00.000Z","id":"a"},
                    {"score":8,"date":"2024-01-02T00:00:00.000Z","id":"b"}]"#,
            )
            .unwrap();
        let board = Leaderboard::load(&store);
        assert_eq!(board.entries()[0].id, "b");
        assert_eq!(board.best(), 8);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let mut board = Leaderboard::new();
        board.record(rec(4, "x"));
        board.record(rec(6, "y"));
        board.save(&store).unwrap();

        let json = store.get(Leaderboard::STORAGE_KEY).unwrap().unwrap();
        assert!(json.starts_with('['));
        assert_eq!(Leaderboard::load(&store), board);
    }

    #[test]
    fn test_top_view() {
        let board = Leaderboard::from_records((0..8).map(|i| rec(i, &i.to_string())).collect());
        assert_eq!(board.top(VIEW_ENTRIES).len(), 5);
        assert_eq!(board.top(VIEW_ENTRIES)[0].score, 7);
        assert_eq!(Leaderboard::new().top(VIEW_ENTRIES).len(), 0);
    }

    #[test]
    fn test_iso8601() {
        assert_eq!(iso8601_from_unix_ms(0.0), "1970-01-01T00:00:00.000Z");
        assert_eq!(
            iso8601_from_unix_ms(1_709_647_629_250.0),
            "2024-03-05T14:07:09.250Z"
        );
        assert_eq!(iso8601_from_unix_ms(951_782_400_000.0), "2000-02-29T00:00:00.000Z");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05T14:07:09.250Z"), "3/5/2024");
        assert_eq!(format_date("garbage"), "garbage");
    }

    #[test]
    fn test_format_date_rejects_impossible_dates() {
        for bad in ["2024-13-45T00:00:00.000Z", "2023-02-30T00:00:00.000Z", "2024-03-05"] {
            assert_eq!(format_date(bad), bad);
        }
        assert_eq!(format_date("2000-02-29T00:00:00.000Z"), "2/29/2000");
    }

    #[test]
    fn test_record_id_shape() {
        use rand::SeedableRng;
        let mut rng = rand_pcg::Pcg32::seed_from_u64(7);
        let id = new_record_id(&mut rng);
        assert_eq!(id.len(), 9);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    proptest! {
        #[test]
        fn prop_board_is_top_scores_descending(scores in proptest::collection::vec(0u32..30, 0..40)) {
            let mut board = Leaderboard::new();
            for (i, s) in scores.iter().enumerate() {
                board.record(rec(*s, &i.to_string()));
            }

            // Expected: stable sort of (score, order) descending by score, top 10
            let mut expected: Vec<(u32, usize)> = scores.iter().copied().zip(0..).collect();
            expected.sort_by(|a, b| b.0.cmp(&a.0));
            expected.truncate(MAX_ENTRIES);

            let actual: Vec<(u32, usize)> = board
                .entries()
                .iter()
                .map(|e| (e.score, e.id.parse::<usize>().unwrap()))
                .collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
