//! High scores and achievements
//!
//! `Records` watches the game's event stream and keeps the best runs, the
//! number of games played and unlocked achievements. Persisted as JSON.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::persistence::PersistenceStore;
use crate::sim::GameEvent;

/// Maximum number of runs to keep on the leaderboard
pub const MAX_HIGH_SCORES: usize = 10;

/// Kills in a single game for `Decimator`
pub const DECIMATOR_KILLS: u32 = 10;
/// Zero-based wave index for `WaveRider` (wave 5 on screen)
pub const WAVE_RIDER_INDEX: u32 = 4;
/// Simulation units survived for `Survivor` (a minute at normal speed)
pub const SURVIVOR_TIME: f32 = 2400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Achievement {
    /// First kill ever
    FirstBlood,
    Decimator,
    WaveRider,
    Survivor,
}

impl Achievement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstBlood => "First Blood",
            Self::Decimator => "Decimator",
            Self::WaveRider => "Wave Rider",
            Self::Survivor => "Survivor",
        }
    }
}

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Zero-based wave the run ended on
    pub wave: u32,
    /// Simulation time survived
    pub survived: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Records {
    /// Best score ever seen; never decreases
    pub high_score: u64,
    pub games_played: u32,
    /// Best runs, sorted descending by score
    pub entries: Vec<HighScoreEntry>,
    pub achievements: BTreeSet<Achievement>,
    #[serde(skip)]
    kills_this_game: u32,
}

impl Records {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "tether_records";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, achievement: Achievement) -> bool {
        self.achievements.contains(&achievement)
    }

    /// Returns true if this is a new unlock
    pub fn unlock(&mut self, achievement: Achievement) -> bool {
        let fresh = self.achievements.insert(achievement);
        if fresh {
            log::info!("Achievement unlocked: {}", achievement.as_str());
        }
        fresh
    }

    /// Feed one game event; returns achievements it unlocked
    pub fn observe(&mut self, event: &GameEvent) -> Vec<Achievement> {
        let mut earned = Vec::new();
        match event {
            GameEvent::GameStarted => self.kills_this_game = 0,
            GameEvent::EnemyKilled { .. } => {
                self.kills_this_game += 1;
                earned.push(Achievement::FirstBlood);
                if self.kills_this_game >= DECIMATOR_KILLS {
                    earned.push(Achievement::Decimator);
                }
            }
            GameEvent::WaveStarted { index } if *index >= WAVE_RIDER_INDEX => {
                earned.push(Achievement::WaveRider);
            }
            GameEvent::ScoreChanged { score } => {
                self.high_score = self.high_score.max(*score);
            }
            GameEvent::GameEnded {
                score,
                survived,
                wave,
                ..
            } => {
                self.games_played += 1;
                self.add_score(*score, *wave, *survived);
                if *survived >= SURVIVOR_TIME {
                    earned.push(Achievement::Survivor);
                }
            }
            _ => {}
        }
        earned.into_iter().filter(|a| self.unlock(*a)).collect()
    }

    /// Check if a score would make the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Add a finished run. Returns the rank achieved (1-indexed) if it qualified.
    pub fn add_score(&mut self, score: u64, wave: u32, survived: f32) -> Option<usize> {
        self.high_score = self.high_score.max(score);
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            wave,
            survived,
        };
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        let mut records: Self = serde_json::from_str(json).map_err(|source| SimError::Decode {
            what: "records",
            source,
        })?;
        // Hand-edited files may be unsorted or oversized
        records.entries.sort_by(|a, b| b.score.cmp(&a.score));
        records.entries.truncate(MAX_HIGH_SCORES);
        if let Some(top) = records.entries.first() {
            records.high_score = records.high_score.max(top.score);
        }
        Ok(records)
    }

    pub fn to_json(&self) -> String {
        // Plain data; serialisation can't fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Load from the store, falling back to empty records
    pub fn load(store: &dyn PersistenceStore) -> Self {
        let Some(json) = store.get(Self::STORAGE_KEY) else {
            log::info!("No records found, starting fresh");
            return Self::new();
        };
        match Self::from_json(&json) {
            Ok(records) => {
                log::info!(
                    "Loaded records: high score {}, {} games",
                    records.high_score,
                    records.games_played
                );
                records
            }
            Err(err) => {
                log::warn!("Ignoring stored records: {err}");
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &mut dyn PersistenceStore) {
        store.set(Self::STORAGE_KEY, self.to_json());
        log::info!("Records saved ({} entries)", self.entries.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::{EnemyKind, KillCause, TargetKind};

    fn kill(id: u32) -> GameEvent {
        GameEvent::EnemyKilled {
            id,
            kind: EnemyKind::Chaser,
            cause: KillCause::Cable,
        }
    }

    fn ended(score: u64, survived: f32) -> GameEvent {
        GameEvent::GameEnded {
            score,
            survived,
            wave: 0,
            hit: TargetKind::Player,
        }
    }

    #[test]
    fn test_first_blood_unlocks_once() {
        let mut records = Records::new();
        records.observe(&GameEvent::GameStarted);
        assert_eq!(records.observe(&kill(1)), vec![Achievement::FirstBlood]);
        assert!(records.observe(&kill(2)).is_empty());
        assert!(records.has(Achievement::FirstBlood));
    }

    #[test]
    fn test_decimator_counts_kills_per_game() {
        let mut records = Records::new();
        records.observe(&GameEvent::GameStarted);
        for id in 0..9 {
            records.observe(&kill(id));
        }
        // New game resets the tally
        records.observe(&GameEvent::GameStarted);
        records.observe(&kill(100));
        assert!(!records.has(Achievement::Decimator));

        for id in 101..110 {
            records.observe(&kill(id));
        }
        assert!(records.has(Achievement::Decimator));
    }

    #[test]
    fn test_wave_rider_on_fifth_wave() {
        let mut records = Records::new();
        records.observe(&GameEvent::WaveStarted { index: 3 });
        assert!(!records.has(Achievement::WaveRider));
        records.observe(&GameEvent::WaveStarted { index: 4 });
        assert!(records.has(Achievement::WaveRider));
    }

    #[test]
    fn test_survivor_needs_a_minute() {
        let mut records = Records::new();
        records.observe(&ended(3, SURVIVOR_TIME - 1.0));
        assert!(!records.has(Achievement::Survivor));
        records.observe(&ended(3, SURVIVOR_TIME));
        assert!(records.has(Achievement::Survivor));
        assert_eq!(records.games_played, 2);
    }

    #[test]
    fn test_high_score_never_decreases() {
        let mut records = Records::new();
        records.observe(&GameEvent::ScoreChanged { score: 12 });
        records.observe(&ended(12, 10.0));
        records.observe(&GameEvent::GameStarted);
        records.observe(&GameEvent::ScoreChanged { score: 3 });
        records.observe(&ended(3, 10.0));
        assert_eq!(records.high_score, 12);
        assert_eq!(records.entries[0].score, 12);
        assert_eq!(records.entries[1].score, 3);
    }

    #[test]
    fn test_leaderboard_keeps_best_runs() {
        let mut records = Records::new();
        for score in 1..=15 {
            records.add_score(score, 0, 1.0);
        }
        assert_eq!(records.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(records.entries[0].score, 15);
        assert!(!records.qualifies(5));
        assert!(!records.qualifies(0));
        assert_eq!(records.add_score(14, 0, 1.0), Some(2));
    }

    #[test]
    fn test_load_save_round_trip() {
        let mut store = MemoryStore::new();
        let mut records = Records::new();
        records.observe(&kill(1));
        records.observe(&ended(7, 50.0));
        records.save(&mut store);

        let loaded = Records::load(&store);
        assert_eq!(loaded.high_score, 7);
        assert_eq!(loaded.games_played, 1);
        assert!(loaded.has(Achievement::FirstBlood));
    }

    #[test]
    fn test_corrupt_records_fall_back_to_empty() {
        let mut store = MemoryStore::new();
        store.set(Records::STORAGE_KEY, "{not json".to_string());
        assert_eq!(Records::load(&store), Records::new());
        assert!(matches!(
            Records::from_json("42"),
            Err(SimError::Decode { what: "records", .. })
        ));
    }

    #[test]
    fn test_from_json_sorts_and_restores_high_score() {
        let json = r#"{"high_score":0,"entries":[{"score":2,"wave":0,"survived":1.0},{"score":9,"wave":1,"survived":5.0}]}"#;
        let records = Records::from_json(json).unwrap();
        assert_eq!(records.entries[0].score, 9);
        assert_eq!(records.high_score, 9);
    }
}
