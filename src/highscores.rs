//! High score leaderboard and score submission
//!
//! Submissions go through [`ScoreSink`]; the built-in sink is a local top-10
//! leaderboard persisted to LocalStorage.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::GameState;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;
/// Longest player name kept (in chars)
pub const MAX_NAME_LEN: usize = 16;

/// What the game-over screen hands to a sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub name: String,
    pub score: u64,
    pub level: u32,
    pub customers_served: u32,
}

impl ScoreSubmission {
    /// Build a submission from a finished session and a free-text name
    pub fn from_state(name: &str, state: &GameState) -> Self {
        Self {
            name: sanitize_name(name),
            score: state.score,
            level: state.level,
            customers_served: state.customers_served,
        }
    }
}

fn sanitize_name(name: &str) -> String {
    let trimmed: String = name.trim().chars().take(MAX_NAME_LEN).collect();
    let trimmed = trimmed.trim_end();
    if trimmed.is_empty() {
        "Anonymous".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Destination for finished runs. Implementations own retry/backoff.
pub trait ScoreSink {
    /// `timestamp_ms` is wall-clock time of the submission (Unix ms)
    fn submit(&mut self, submission: &ScoreSubmission, timestamp_ms: f64) -> Result<()>;
}

/// A single high score entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
    pub level: u32,
    pub customers_served: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "empanada_rush_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a run to the leaderboard (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add(&mut self, submission: &ScoreSubmission, timestamp: f64) -> Option<usize> {
        if !self.qualifies(submission.score) {
            return None;
        }

        let entry = HighScoreEntry {
            name: submission.name.clone(),
            score: submission.score,
            level: submission.level,
            customers_served: submission.customers_served,
            timestamp,
        };

        // Sorted descending; ties keep the earlier run ahead
        let pos = self.entries.iter().position(|e| submission.score > e.score);
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

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<HighScores>(&json) {
                    Ok(scores) => {
                        log::info!("Loaded {} high scores", scores.entries.len());
                        return scores;
                    }
                    Err(e) => log::warn!("Discarding unreadable high scores: {}", e),
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

impl ScoreSink for HighScores {
    fn submit(&mut self, submission: &ScoreSubmission, timestamp_ms: f64) -> Result<()> {
        match self.add(submission, timestamp_ms) {
            Some(rank) => {
                log::info!("{} placed #{} with {}", submission.name, rank, submission.score);
                self.save();
            }
            None => log::info!("{} did not make the leaderboard", submission.name),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(name: &str, score: u64) -> ScoreSubmission {
        ScoreSubmission {
            name: name.to_string(),
            score,
            level: 1,
            customers_served: 0,
        }
    }

    #[test]
    fn test_name_sanitized() {
        let mut state = GameState::new(1);
        state.score = 120;
        state.level = 2;
        state.customers_served = 11;
        let sub = ScoreSubmission::from_state("   ", &state);
        assert_eq!(sub.name, "Anonymous");
        assert_eq!(sub.score, 120);
        assert_eq!(sub.customers_served, 11);

        let sub = ScoreSubmission::from_state("  Nito the Magnificent Empanadero ", &state);
        assert_eq!(sub.name.chars().count(), MAX_NAME_LEN);
        assert!(sub.name.starts_with("Nito"));
    }

    #[test]
    fn test_submission_json_shape() {
        let json = serde_json::to_value(run("Dani", 50)).unwrap();
        assert_eq!(json["customersServed"], 0);
        assert_eq!(json["name"], "Dani");
    }

    #[test]
    fn test_ranking_and_truncation() {
        let mut scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.add(&run("a", 100), 0.0), Some(1));
        assert_eq!(scores.add(&run("b", 300), 0.0), Some(1));
        assert_eq!(scores.add(&run("c", 200), 0.0), Some(2));
        assert_eq!(scores.top_score(), Some(300));

        for i in 0..MAX_HIGH_SCORES {
            scores.add(&run("filler", 1000 + i as u64), 0.0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(500));
        assert_eq!(scores.potential_rank(5000), Some(1));
    }

    #[test]
    fn test_sink_records_entry() {
        let mut scores = HighScores::new();
        scores.submit(&run("Nito", 75), 42.0).unwrap();
        assert_eq!(scores.entries.len(), 1);
        assert_eq!(scores.entries[0].timestamp, 42.0);
        // Zero never qualifies but is not an error
        assert!(scores.submit(&run("Zero", 0), 43.0).is_ok());
        assert_eq!(scores.entries.len(), 1);
    }
}
